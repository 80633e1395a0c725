use chrono::{Datelike, Duration, NaiveDate};

use crate::models::{
    Alert, AttendanceRecord, AttendanceStatus, BudgetSlice, CategoryTotal, DashboardMetrics,
    Task, Transaction, TransactionKind, WeekBucket,
};

pub const PALETTE: [&str; 7] = [
    "#6b3cc9", "#7c4dff", "#9d6fdb", "#a78bfa", "#c4b5fd", "#ddd6fe", "#ede9fe",
];

const UPCOMING_WINDOW_DAYS: i64 = 7;
const TREND_WEEKS: usize = 6;
const EXCELLENT_PUNCTUALITY: u32 = 90;
const RECENT_TRANSACTIONS: usize = 5;

pub fn derive(
    transactions: &[Transaction],
    tasks: &[Task],
    attendance: &[AttendanceRecord],
    as_of: NaiveDate,
) -> DashboardMetrics {
    let total_income: f64 = transactions
        .iter()
        .filter(|t| t.kind == TransactionKind::Income)
        .map(|t| t.amount)
        .sum();
    let total_expenses: f64 = transactions
        .iter()
        .filter(|t| t.kind == TransactionKind::Expense)
        .map(|t| t.amount)
        .sum();
    let balance = total_income - total_expenses;

    let expenses_by_category = group_expenses(transactions);
    let budget_breakdown = budget_breakdown(&expenses_by_category);

    let completed_tasks = tasks.iter().filter(|t| t.completed).count();
    let total_tasks = tasks.len();
    let task_completion_rate = percentage(completed_tasks, total_tasks);

    let on_time_count = attendance
        .iter()
        .filter(|r| r.status == AttendanceStatus::OnTime)
        .count();
    let attended = attendance
        .iter()
        .filter(|r| r.status != AttendanceStatus::Absent)
        .count();
    let punctuality_rate = percentage(on_time_count, attended);

    let upcoming_tasks = upcoming_tasks(tasks, as_of);
    let recent_transactions: Vec<Transaction> = transactions
        .iter()
        .rev()
        .take(RECENT_TRANSACTIONS)
        .cloned()
        .collect();
    let weekly_punctuality = weekly_punctuality(attendance);

    let mut alerts = Vec::new();
    if balance < 0.0 {
        alerts.push(Alert::NegativeBalance);
    }
    if let Some(task) = upcoming_tasks.first() {
        alerts.push(Alert::UpcomingDeadline {
            title: task.title.clone(),
        });
    }
    if punctuality_rate >= EXCELLENT_PUNCTUALITY {
        alerts.push(Alert::ExcellentPunctuality {
            rate: punctuality_rate,
        });
    }

    DashboardMetrics {
        total_income,
        total_expenses,
        balance,
        expenses_by_category,
        budget_breakdown,
        completed_tasks,
        total_tasks,
        task_completion_rate,
        on_time_count,
        punctuality_rate,
        upcoming_tasks,
        recent_transactions,
        weekly_punctuality,
        alerts,
    }
}

fn group_expenses(transactions: &[Transaction]) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = Vec::new();
    let mut index: std::collections::HashMap<String, usize> = std::collections::HashMap::new();

    for transaction in transactions {
        if transaction.kind != TransactionKind::Expense {
            continue;
        }
        match index.get(&transaction.category) {
            Some(&i) => totals[i].amount += transaction.amount,
            None => {
                index.insert(transaction.category.clone(), totals.len());
                totals.push(CategoryTotal {
                    category: transaction.category.clone(),
                    amount: transaction.amount,
                });
            }
        }
    }

    totals
}

fn budget_breakdown(expenses_by_category: &[CategoryTotal]) -> Vec<BudgetSlice> {
    let total: f64 = expenses_by_category.iter().map(|c| c.amount).sum();

    expenses_by_category
        .iter()
        .enumerate()
        .map(|(i, entry)| BudgetSlice {
            name: entry.category.clone(),
            percentage: if total > 0.0 {
                (entry.amount / total * 100.0).round() as u32
            } else {
                0
            },
            amount: entry.amount,
            color: PALETTE[i % PALETTE.len()],
        })
        .collect()
}

fn upcoming_tasks(tasks: &[Task], as_of: NaiveDate) -> Vec<Task> {
    let window_end = as_of + Duration::days(UPCOMING_WINDOW_DAYS);
    let mut upcoming: Vec<Task> = tasks
        .iter()
        .filter(|t| !t.completed && t.due_date >= as_of && t.due_date <= window_end)
        .cloned()
        .collect();
    // sort_by is stable, so tasks due the same day keep their input order
    upcoming.sort_by(|a, b| a.due_date.cmp(&b.due_date));
    upcoming
}

pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

fn weekly_punctuality(attendance: &[AttendanceRecord]) -> Vec<WeekBucket> {
    let mut buckets: std::collections::BTreeMap<NaiveDate, (usize, usize)> =
        std::collections::BTreeMap::new();

    for record in attendance {
        let entry = buckets.entry(week_start(record.date)).or_insert((0, 0));
        if record.status != AttendanceStatus::Absent {
            entry.1 += 1;
            if record.status == AttendanceStatus::OnTime {
                entry.0 += 1;
            }
        }
    }

    let mut trend: Vec<WeekBucket> = buckets
        .into_iter()
        .map(|(week_start, (on_time, total))| WeekBucket {
            week_start,
            on_time,
            total,
            rate: percentage(on_time, total),
        })
        .collect();

    if trend.len() > TREND_WEEKS {
        trend.drain(..trend.len() - TREND_WEEKS);
    }
    trend
}

fn percentage(numerator: usize, denominator: usize) -> u32 {
    if denominator == 0 {
        return 0;
    }
    (numerator as f64 / denominator as f64 * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Priority, TaskCategory};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // 2026-03-01 is a Sunday
    fn as_of() -> NaiveDate {
        date(2026, 3, 10)
    }

    fn transaction(kind: TransactionKind, amount: f64, category: &str) -> Transaction {
        Transaction {
            id: format!("txn-{category}-{amount}"),
            kind,
            amount,
            category: category.to_string(),
            description: String::new(),
            date: date(2026, 3, 2),
        }
    }

    fn task(title: &str, due: NaiveDate, completed: bool) -> Task {
        Task {
            id: format!("task-{title}"),
            title: title.to_string(),
            description: String::new(),
            category: TaskCategory::Academic,
            priority: Priority::Medium,
            due_date: due,
            completed,
            created_at: date(2026, 3, 1),
        }
    }

    fn attendance(day: NaiveDate, status: AttendanceStatus) -> AttendanceRecord {
        AttendanceRecord {
            id: format!("att-{day}"),
            date: day,
            subject: "Calculus".to_string(),
            scheduled_time: "08:00".to_string(),
            actual_time: "08:00".to_string(),
            status,
            notes: None,
        }
    }

    #[test]
    fn balance_is_income_minus_expenses() {
        let transactions = vec![
            transaction(TransactionKind::Income, 1000.0, "allowance"),
            transaction(TransactionKind::Expense, 300.0, "food"),
            transaction(TransactionKind::Expense, 200.0, "food"),
        ];
        let metrics = derive(&transactions, &[], &[], as_of());

        assert_eq!(metrics.total_income, 1000.0);
        assert_eq!(metrics.total_expenses, 500.0);
        assert_eq!(metrics.balance, 500.0);
        assert_eq!(metrics.expenses_by_category.len(), 1);
        assert_eq!(metrics.expenses_by_category[0].category, "food");
        assert_eq!(metrics.expenses_by_category[0].amount, 500.0);
        assert_eq!(metrics.budget_breakdown.len(), 1);
        assert_eq!(metrics.budget_breakdown[0].percentage, 100);
        assert_eq!(metrics.budget_breakdown[0].amount, 500.0);
    }

    #[test]
    fn balance_may_be_negative() {
        let transactions = vec![
            transaction(TransactionKind::Income, 50.0, "allowance"),
            transaction(TransactionKind::Expense, 120.0, "books"),
        ];
        let metrics = derive(&transactions, &[], &[], as_of());

        assert_eq!(metrics.balance, -70.0);
        assert!(metrics.alerts.contains(&Alert::NegativeBalance));
    }

    #[test]
    fn empty_inputs_produce_zeroed_metrics() {
        let metrics = derive(&[], &[], &[], as_of());

        assert_eq!(metrics.balance, 0.0);
        assert_eq!(metrics.task_completion_rate, 0);
        assert_eq!(metrics.punctuality_rate, 0);
        assert!(metrics.expenses_by_category.is_empty());
        assert!(metrics.budget_breakdown.is_empty());
        assert!(metrics.upcoming_tasks.is_empty());
        assert!(metrics.weekly_punctuality.is_empty());
        assert!(metrics.alerts.is_empty());
    }

    #[test]
    fn categories_keep_first_seen_order() {
        let transactions = vec![
            transaction(TransactionKind::Expense, 40.0, "transport"),
            transaction(TransactionKind::Expense, 60.0, "food"),
            transaction(TransactionKind::Expense, 10.0, "transport"),
        ];
        let metrics = derive(&transactions, &[], &[], as_of());

        let names: Vec<&str> = metrics
            .expenses_by_category
            .iter()
            .map(|c| c.category.as_str())
            .collect();
        assert_eq!(names, vec!["transport", "food"]);
        assert_eq!(metrics.expenses_by_category[0].amount, 50.0);
        assert_eq!(metrics.budget_breakdown[0].color, PALETTE[0]);
        assert_eq!(metrics.budget_breakdown[1].color, PALETTE[1]);
    }

    #[test]
    fn palette_cycles_after_seven_categories() {
        let transactions: Vec<Transaction> = (0..9)
            .map(|i| transaction(TransactionKind::Expense, 10.0, &format!("cat-{i}")))
            .collect();
        let metrics = derive(&transactions, &[], &[], as_of());

        assert_eq!(metrics.budget_breakdown[7].color, PALETTE[0]);
        assert_eq!(metrics.budget_breakdown[8].color, PALETTE[1]);
    }

    #[test]
    fn completion_rate_rounds_to_integer() {
        let tasks = vec![
            task("essay", date(2026, 3, 20), true),
            task("lab", date(2026, 3, 21), false),
            task("quiz", date(2026, 3, 22), false),
        ];
        let metrics = derive(&[], &tasks, &[], as_of());

        assert_eq!(metrics.completed_tasks, 1);
        assert_eq!(metrics.total_tasks, 3);
        assert_eq!(metrics.task_completion_rate, 33);
    }

    #[test]
    fn upcoming_window_is_inclusive_on_both_ends() {
        let tasks = vec![
            task("due-today", as_of(), false),
            task("due-in-7", as_of() + Duration::days(7), false),
            task("due-in-8", as_of() + Duration::days(8), false),
            task("done-tomorrow", as_of() + Duration::days(1), true),
            task("overdue", as_of() - Duration::days(1), false),
        ];
        let metrics = derive(&[], &tasks, &[], as_of());

        let titles: Vec<&str> = metrics
            .upcoming_tasks
            .iter()
            .map(|t| t.title.as_str())
            .collect();
        assert_eq!(titles, vec!["due-today", "due-in-7"]);
    }

    #[test]
    fn upcoming_tasks_sort_ascending_and_stable() {
        let tasks = vec![
            task("later", as_of() + Duration::days(5), false),
            task("first-of-pair", as_of() + Duration::days(2), false),
            task("second-of-pair", as_of() + Duration::days(2), false),
        ];
        let metrics = derive(&[], &tasks, &[], as_of());

        let titles: Vec<&str> = metrics
            .upcoming_tasks
            .iter()
            .map(|t| t.title.as_str())
            .collect();
        assert_eq!(titles, vec!["first-of-pair", "second-of-pair", "later"]);
    }

    #[test]
    fn punctuality_excludes_absences() {
        let records = vec![
            attendance(date(2026, 3, 2), AttendanceStatus::OnTime),
            attendance(date(2026, 3, 3), AttendanceStatus::OnTime),
            attendance(date(2026, 3, 4), AttendanceStatus::Late),
            attendance(date(2026, 3, 5), AttendanceStatus::Absent),
        ];
        let metrics = derive(&[], &[], &records, as_of());

        assert_eq!(metrics.on_time_count, 2);
        assert_eq!(metrics.punctuality_rate, 67);
    }

    #[test]
    fn all_absent_yields_zero_rate() {
        let records = vec![
            attendance(date(2026, 3, 2), AttendanceStatus::Absent),
            attendance(date(2026, 3, 3), AttendanceStatus::Absent),
        ];
        let metrics = derive(&[], &[], &records, as_of());

        assert_eq!(metrics.on_time_count, 0);
        assert_eq!(metrics.punctuality_rate, 0);
        assert!(metrics.alerts.is_empty());
    }

    #[test]
    fn week_start_snaps_to_sunday() {
        assert_eq!(week_start(date(2026, 3, 1)), date(2026, 3, 1));
        assert_eq!(week_start(date(2026, 3, 4)), date(2026, 3, 1));
        assert_eq!(week_start(date(2026, 3, 7)), date(2026, 3, 1));
        assert_eq!(week_start(date(2026, 3, 8)), date(2026, 3, 8));
    }

    #[test]
    fn weekly_trend_keeps_six_most_recent_weeks() {
        // eight consecutive weeks starting 2026-01-04, one record each
        let records: Vec<AttendanceRecord> = (0..8)
            .map(|i| {
                attendance(
                    date(2026, 1, 4) + Duration::days(i * 7 + 2),
                    AttendanceStatus::OnTime,
                )
            })
            .collect();
        let metrics = derive(&[], &[], &records, as_of());

        assert_eq!(metrics.weekly_punctuality.len(), 6);
        assert_eq!(metrics.weekly_punctuality[0].week_start, date(2026, 1, 18));
        assert_eq!(metrics.weekly_punctuality[5].week_start, date(2026, 2, 22));
        assert!(metrics
            .weekly_punctuality
            .windows(2)
            .all(|w| w[0].week_start < w[1].week_start));
    }

    #[test]
    fn absent_only_week_appears_with_zero_rate() {
        let records = vec![
            attendance(date(2026, 3, 2), AttendanceStatus::Absent),
            attendance(date(2026, 3, 9), AttendanceStatus::OnTime),
        ];
        let metrics = derive(&[], &[], &records, as_of());

        assert_eq!(metrics.weekly_punctuality.len(), 2);
        assert_eq!(metrics.weekly_punctuality[0].total, 0);
        assert_eq!(metrics.weekly_punctuality[0].rate, 0);
        assert_eq!(metrics.weekly_punctuality[1].rate, 100);
    }

    #[test]
    fn alerts_coexist_without_suppression() {
        let transactions = vec![transaction(TransactionKind::Expense, 25.0, "food")];
        let tasks = vec![
            task("second", as_of() + Duration::days(3), false),
            task("first", as_of() + Duration::days(1), false),
        ];
        let records = vec![
            attendance(date(2026, 3, 2), AttendanceStatus::OnTime),
            attendance(date(2026, 3, 3), AttendanceStatus::OnTime),
        ];
        let metrics = derive(&transactions, &tasks, &records, as_of());

        assert_eq!(
            metrics.alerts,
            vec![
                Alert::NegativeBalance,
                Alert::UpcomingDeadline {
                    title: "first".to_string()
                },
                Alert::ExcellentPunctuality { rate: 100 },
            ]
        );
    }

    #[test]
    fn recent_transactions_are_last_five_newest_first() {
        let transactions: Vec<Transaction> = (0..7)
            .map(|i| transaction(TransactionKind::Income, i as f64, "allowance"))
            .collect();
        let metrics = derive(&transactions, &[], &[], as_of());

        let amounts: Vec<f64> = metrics.recent_transactions.iter().map(|t| t.amount).collect();
        assert_eq!(amounts, vec![6.0, 5.0, 4.0, 3.0, 2.0]);
    }

    #[test]
    fn derivation_is_deterministic() {
        let transactions = vec![
            transaction(TransactionKind::Income, 800.0, "allowance"),
            transaction(TransactionKind::Expense, 150.0, "food"),
        ];
        let tasks = vec![task("essay", as_of() + Duration::days(2), false)];
        let records = vec![attendance(date(2026, 3, 2), AttendanceStatus::Late)];

        let first = derive(&transactions, &tasks, &records, as_of());
        let second = derive(&transactions, &tasks, &records, as_of());
        assert_eq!(first, second);
    }

    #[test]
    fn percentages_stay_in_bounds() {
        let transactions = vec![
            transaction(TransactionKind::Expense, 1.0, "a"),
            transaction(TransactionKind::Expense, 1.0, "b"),
            transaction(TransactionKind::Expense, 1.0, "c"),
        ];
        let metrics = derive(&transactions, &[], &[], as_of());

        for slice in &metrics.budget_breakdown {
            assert!(slice.percentage <= 100);
        }
        // independent rounding: 33 + 33 + 33 = 99, off by one is expected
        let sum: u32 = metrics.budget_breakdown.iter().map(|s| s.percentage).sum();
        assert!((99..=101).contains(&sum));
    }
}
