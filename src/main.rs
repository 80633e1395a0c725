use std::path::PathBuf;

use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};

mod metrics;
mod models;
mod report;
mod store;

use models::{Alert, DashboardMetrics};

#[derive(Parser)]
#[command(name = "nextstep-dashboard")]
#[command(about = "Dashboard metrics for the NextStep student planner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Inputs {
    #[arg(long, default_value = "data/transactions.csv")]
    transactions: PathBuf,
    #[arg(long, default_value = "data/tasks.csv")]
    tasks: PathBuf,
    #[arg(long, default_value = "data/attendance.csv")]
    attendance: PathBuf,
    /// Reference date for the upcoming-task window, defaults to today
    #[arg(long)]
    as_of: Option<NaiveDate>,
    #[arg(long)]
    user: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write realistic sample CSV snapshots
    Seed {
        #[arg(long, default_value = "data")]
        dir: PathBuf,
    },
    /// Print the dashboard summary
    Summary {
        #[command(flatten)]
        inputs: Inputs,
    },
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        inputs: Inputs,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Print the derived metrics as JSON
    Export {
        #[command(flatten)]
        inputs: Inputs,
    },
}

fn derive_from(inputs: &Inputs) -> anyhow::Result<(DashboardMetrics, NaiveDate)> {
    let transactions = store::load_transactions(&inputs.transactions)?;
    let tasks = store::load_tasks(&inputs.tasks)?;
    let attendance = store::load_attendance(&inputs.attendance)?;
    let as_of = inputs.as_of.unwrap_or_else(|| Utc::now().date_naive());
    Ok((metrics::derive(&transactions, &tasks, &attendance, as_of), as_of))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Seed { dir } => {
            store::seed(&dir, Utc::now().date_naive())?;
            println!("Sample snapshots written to {}.", dir.display());
        }
        Commands::Summary { inputs } => {
            let (derived, as_of) = derive_from(&inputs)?;
            println!("Dashboard summary as of {as_of}:");
            println!(
                "- Balance \u{20b1}{:.2} (income \u{20b1}{:.2}, expenses \u{20b1}{:.2})",
                derived.balance, derived.total_income, derived.total_expenses
            );
            println!(
                "- Tasks {}/{} complete ({}%)",
                derived.completed_tasks, derived.total_tasks, derived.task_completion_rate
            );
            println!(
                "- Punctuality {}% ({} on-time)",
                derived.punctuality_rate, derived.on_time_count
            );
            for slice in derived.budget_breakdown.iter() {
                println!(
                    "- {}: {}% of expenses (\u{20b1}{:.2})",
                    slice.name, slice.percentage, slice.amount
                );
            }

            if derived.alerts.is_empty() {
                println!("No alerts at the moment.");
            } else {
                for alert in derived.alerts.iter() {
                    match alert {
                        Alert::NegativeBalance => println!("! Negative balance detected"),
                        Alert::UpcomingDeadline { title } => {
                            println!("! Upcoming deadline: {title}")
                        }
                        Alert::ExcellentPunctuality { rate } => {
                            println!("! Great punctuality: {rate}% on-time")
                        }
                    }
                }
            }
        }
        Commands::Report { inputs, out } => {
            let (derived, as_of) = derive_from(&inputs)?;
            let report = report::build_report(inputs.user.as_deref(), as_of, &derived);
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
        Commands::Export { inputs } => {
            let (derived, _) = derive_from(&inputs)?;
            println!("{}", serde_json::to_string_pretty(&derived)?);
        }
    }

    Ok(())
}
