use std::fmt::Write;

use chrono::NaiveDate;

use crate::models::{Alert, DashboardMetrics, TransactionKind, WeekBucket};

pub fn week_label(bucket: &WeekBucket) -> String {
    bucket.week_start.format("%b %-d").to_string()
}

pub fn build_report(user_name: Option<&str>, as_of: NaiveDate, metrics: &DashboardMetrics) -> String {
    let mut output = String::new();
    let name = user_name.unwrap_or("Student");

    let _ = writeln!(output, "# NextStep Dashboard");
    let _ = writeln!(output, "Progress overview for {} as of {}", name, as_of);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Overview");
    let _ = writeln!(
        output,
        "- Current balance: \u{20b1}{:.2} ({})",
        metrics.balance,
        if metrics.balance >= 0.0 {
            "positive balance"
        } else {
            "negative balance"
        }
    );
    let _ = writeln!(
        output,
        "- Task completion: {}/{} ({}% complete)",
        metrics.completed_tasks, metrics.total_tasks, metrics.task_completion_rate
    );
    let _ = writeln!(
        output,
        "- Punctuality rate: {}% ({} on-time)",
        metrics.punctuality_rate, metrics.on_time_count
    );
    let _ = writeln!(output, "- Goal progress: {}%", metrics.task_completion_rate);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Budget Breakdown");

    if metrics.budget_breakdown.is_empty() {
        let _ = writeln!(output, "No expense data available.");
    } else {
        for slice in metrics.budget_breakdown.iter() {
            let _ = writeln!(
                output,
                "- {}: {}% (\u{20b1}{:.2})",
                slice.name, slice.percentage, slice.amount
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Activity");
    let _ = writeln!(output, "- Total income: \u{20b1}{:.2}", metrics.total_income);
    let _ = writeln!(output, "- Total expenses: \u{20b1}{:.2}", metrics.total_expenses);
    let _ = writeln!(output, "- Balance: \u{20b1}{:.2}", metrics.balance);

    if !metrics.recent_transactions.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "Recent transactions:");
        for transaction in metrics.recent_transactions.iter() {
            let (label, sign) = match transaction.kind {
                TransactionKind::Income => ("income", "+"),
                TransactionKind::Expense => ("expense", "-"),
            };
            let _ = writeln!(
                output,
                "- [{}] {} {}\u{20b1}{:.2} on {}",
                label, transaction.category, sign, transaction.amount, transaction.date
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Upcoming Tasks");

    if metrics.upcoming_tasks.is_empty() {
        let _ = writeln!(output, "Nothing due in the next 7 days.");
    } else {
        for task in metrics.upcoming_tasks.iter() {
            let _ = writeln!(
                output,
                "- {} (due {}, {:?} priority)",
                task.title, task.due_date, task.priority
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Punctuality Trend");

    if metrics.weekly_punctuality.is_empty() {
        let _ = writeln!(output, "No punctuality data available.");
    } else {
        for bucket in metrics.weekly_punctuality.iter() {
            let _ = writeln!(
                output,
                "- Week of {}: {}% on-time ({}/{})",
                week_label(bucket),
                bucket.rate,
                bucket.on_time,
                bucket.total
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Alerts");

    if metrics.alerts.is_empty() {
        let _ = writeln!(output, "No alerts at the moment.");
    } else {
        for alert in metrics.alerts.iter() {
            match alert {
                Alert::NegativeBalance => {
                    let _ = writeln!(output, "- Budget alert: negative balance detected");
                }
                Alert::UpcomingDeadline { title } => {
                    let _ = writeln!(output, "- Upcoming deadline: {}", title);
                }
                Alert::ExcellentPunctuality { rate } => {
                    let _ = writeln!(output, "- Great punctuality! {}% on-time rate", rate);
                }
            }
        }
    }

    output
}
