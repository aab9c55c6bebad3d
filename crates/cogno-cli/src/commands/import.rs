/// Syllabus import command handler
use anyhow::{Context, Result};
use std::path::Path;

use cogno_core::import::parse_syllabus_csv;
use cogno_storage::Database;

pub fn handle_import_command(file: &Path, user_id: &str) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let tasks = parse_syllabus_csv(&content, user_id)?;

    if tasks.is_empty() {
        println!("No assignments found in {}", file.display());
        return Ok(());
    }

    let db = Database::new(None)?;
    let inserted = db.insert_tasks(&tasks)?;
    println!("Imported {inserted} assignment(s) for {user_id}");
    Ok(())
}
