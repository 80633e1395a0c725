use std::path::Path;

use anyhow::Context;
use chrono::{Duration, NaiveDate};
use uuid::Uuid;

use crate::models::{
    AttendanceRecord, AttendanceStatus, Priority, Task, TaskCategory, Transaction,
    TransactionKind,
};

pub fn load_transactions(path: &Path) -> anyhow::Result<Vec<Transaction>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open transactions file {}", path.display()))?;
    let mut transactions = Vec::new();

    for result in reader.deserialize::<Transaction>() {
        let row = result
            .with_context(|| format!("invalid transaction row in {}", path.display()))?;
        transactions.push(row);
    }

    Ok(transactions)
}

pub fn load_tasks(path: &Path) -> anyhow::Result<Vec<Task>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open tasks file {}", path.display()))?;
    let mut tasks = Vec::new();

    for result in reader.deserialize::<Task>() {
        let row = result.with_context(|| format!("invalid task row in {}", path.display()))?;
        tasks.push(row);
    }

    Ok(tasks)
}

pub fn load_attendance(path: &Path) -> anyhow::Result<Vec<AttendanceRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open attendance file {}", path.display()))?;
    let mut records = Vec::new();

    for result in reader.deserialize::<AttendanceRecord>() {
        let row = result
            .with_context(|| format!("invalid attendance row in {}", path.display()))?;
        records.push(row);
    }

    Ok(records)
}

pub fn seed(dir: &Path, today: NaiveDate) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create seed directory {}", dir.display()))?;

    let transactions = vec![
        sample_transaction(TransactionKind::Income, 1500.0, "allowance", "Monthly allowance", today - Duration::days(20)),
        sample_transaction(TransactionKind::Income, 450.0, "part-time", "Tutoring sessions", today - Duration::days(12)),
        sample_transaction(TransactionKind::Expense, 320.0, "food", "Groceries", today - Duration::days(10)),
        sample_transaction(TransactionKind::Expense, 180.0, "transport", "Commuter pass", today - Duration::days(9)),
        sample_transaction(TransactionKind::Expense, 95.0, "food", "Campus canteen", today - Duration::days(4)),
        sample_transaction(TransactionKind::Expense, 250.0, "books", "Calculus textbook", today - Duration::days(3)),
        sample_transaction(TransactionKind::Expense, 60.0, "leisure", "Movie night", today - Duration::days(1)),
    ];

    let tasks = vec![
        sample_task("Finish physics lab report", TaskCategory::Academic, Priority::High, today + Duration::days(2), false, today - Duration::days(5)),
        sample_task("Read chapter 7", TaskCategory::Academic, Priority::Medium, today + Duration::days(5), false, today - Duration::days(3)),
        sample_task("Renew library card", TaskCategory::Personal, Priority::Low, today + Duration::days(10), false, today - Duration::days(2)),
        sample_task("Submit scholarship form", TaskCategory::Personal, Priority::High, today - Duration::days(4), true, today - Duration::days(14)),
        sample_task("Group project outline", TaskCategory::Academic, Priority::Medium, today - Duration::days(1), true, today - Duration::days(8)),
    ];

    let mut attendance = Vec::new();
    for week in 1..=7i64 {
        let monday = crate::metrics::week_start(today) - Duration::days(week * 7 - 1);
        attendance.push(sample_attendance("Calculus", monday, AttendanceStatus::OnTime));
        attendance.push(sample_attendance(
            "Physics",
            monday + Duration::days(1),
            if week % 3 == 1 { AttendanceStatus::Late } else { AttendanceStatus::OnTime },
        ));
        attendance.push(sample_attendance(
            "Literature",
            monday + Duration::days(3),
            if week == 5 { AttendanceStatus::Absent } else { AttendanceStatus::OnTime },
        ));
    }

    write_csv(&dir.join("transactions.csv"), &transactions)?;
    write_csv(&dir.join("tasks.csv"), &tasks)?;
    write_csv(&dir.join("attendance.csv"), &attendance)?;

    Ok(())
}

fn write_csv<T: serde::Serialize>(path: &Path, rows: &[T]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn sample_transaction(
    kind: TransactionKind,
    amount: f64,
    category: &str,
    description: &str,
    date: NaiveDate,
) -> Transaction {
    Transaction {
        id: Uuid::new_v4().to_string(),
        kind,
        amount,
        category: category.to_string(),
        description: description.to_string(),
        date,
    }
}

fn sample_task(
    title: &str,
    category: TaskCategory,
    priority: Priority,
    due_date: NaiveDate,
    completed: bool,
    created_at: NaiveDate,
) -> Task {
    Task {
        id: Uuid::new_v4().to_string(),
        title: title.to_string(),
        description: String::new(),
        category,
        priority,
        due_date,
        completed,
        created_at,
    }
}

fn sample_attendance(subject: &str, date: NaiveDate, status: AttendanceStatus) -> AttendanceRecord {
    AttendanceRecord {
        id: Uuid::new_v4().to_string(),
        date,
        subject: subject.to_string(),
        scheduled_time: "08:00".to_string(),
        actual_time: match status {
            AttendanceStatus::OnTime => "07:55".to_string(),
            AttendanceStatus::Late => "08:20".to_string(),
            AttendanceStatus::Absent => String::new(),
        },
        status,
        notes: None,
    }
}
