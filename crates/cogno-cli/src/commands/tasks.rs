/// Task list command handlers
use anyhow::{Context, Result};
use tabled::{Table, Tabled};
use uuid::Uuid;

use cogno_storage::Database;

use super::helpers::truncate_str;

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Due")]
    due: String,
    #[tabled(rename = "Course")]
    course: String,
    #[tabled(rename = "Assignment")]
    assignment: String,
    #[tabled(rename = "Done")]
    done: String,
}

pub fn handle_tasks_list(course: Option<&str>) -> Result<()> {
    let db = Database::new(None)?;
    let tasks = db.get_tasks(course)?;

    if tasks.is_empty() {
        match course {
            Some(c) => println!("No assignments for {c}"),
            None => println!("No assignments imported yet. Try 'cogno import <file> --user <id>'"),
        }
        return Ok(());
    }

    let rows: Vec<TaskRow> = tasks
        .iter()
        .map(|t| TaskRow {
            id: t.id.to_string(),
            due: t.due_date.format("%Y-%m-%d").to_string(),
            course: t.course_code.clone(),
            assignment: truncate_str(&t.assignment_name, 40),
            done: if t.is_completed { "yes" } else { "" }.to_string(),
        })
        .collect();

    println!("{}", Table::new(rows));
    Ok(())
}

pub fn handle_task_done(id: &str) -> Result<()> {
    let task_id = Uuid::parse_str(id).with_context(|| format!("Invalid task ID: {id}"))?;
    let db = Database::new(None)?;
    if db.complete_task(task_id)? {
        println!("Marked {id} as done");
    } else {
        println!("No task with ID {id}");
    }
    Ok(())
}
