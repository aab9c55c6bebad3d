use anyhow::{Context, Result};
use rusqlite::params;
use uuid::Uuid;

use super::helpers::{parse_date, parse_uuid};
use super::Database;
use crate::models::Task;

impl Database {
    // ==================== Task Methods ====================

    /// Insert a batch of tasks atomically: either all rows land or none do
    ///
    /// # Errors
    ///
    /// Returns an error if any insert fails; the transaction is rolled back
    pub fn insert_tasks(&self, tasks: &[Task]) -> Result<usize> {
        let tx = self
            .conn
            .unchecked_transaction()
            .context("Failed to begin task import")?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO tasks (id, user_id, course_code, assignment_name, due_date, is_completed)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for task in tasks {
                stmt.execute(params![
                    task.id.to_string(),
                    task.user_id,
                    task.course_code,
                    task.assignment_name,
                    task.due_date.format("%Y-%m-%d").to_string(),
                    i32::from(task.is_completed),
                ])?;
            }
        }
        tx.commit().context("Failed to commit task import")?;

        log::info!("Imported {} tasks", tasks.len());
        Ok(tasks.len())
    }

    /// List tasks ordered by due date, optionally filtered by course
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub fn get_tasks(&self, course_code: Option<&str>) -> Result<Vec<Task>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, course_code, assignment_name, due_date, is_completed
             FROM tasks
             WHERE ?1 IS NULL OR course_code = ?1
             ORDER BY due_date ASC, course_code ASC",
        )?;

        let tasks = stmt
            .query_map(params![course_code], |row| {
                Ok(Task {
                    id: parse_uuid(&row.get::<_, String>(0)?)?,
                    user_id: row.get(1)?,
                    course_code: row.get(2)?,
                    assignment_name: row.get(3)?,
                    due_date: parse_date(&row.get::<_, String>(4)?)?,
                    is_completed: row.get::<_, i32>(5)? != 0,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(tasks)
    }

    /// Mark a task as completed. Returns `false` if no task has that id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update operation fails
    pub fn complete_task(&self, task_id: Uuid) -> Result<bool> {
        let updated = self.conn.execute(
            "UPDATE tasks SET is_completed = 1 WHERE id = ?1",
            params![task_id.to_string()],
        )?;
        Ok(updated > 0)
    }
}
