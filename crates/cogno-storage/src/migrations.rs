use anyhow::Result;
use rusqlite::Connection;

/// Initialize database schema
///
/// # Errors
///
/// Returns an error if database table creation or index creation fails
pub fn init_schema(conn: &Connection) -> Result<()> {
    // Focus sessions - one row per monitoring run
    conn.execute(
        "CREATE TABLE IF NOT EXISTS focus_sessions (
            id TEXT PRIMARY KEY,
            start_time TEXT NOT NULL,
            end_time TEXT,
            focused_ticks INTEGER NOT NULL DEFAULT 0,
            distracted_ticks INTEGER NOT NULL DEFAULT 0,
            alert_count INTEGER NOT NULL DEFAULT 0
        )",
        [],
    )?;

    // Distraction events - continuous distracted stretches within a session
    conn.execute(
        "CREATE TABLE IF NOT EXISTS distraction_events (
            id TEXT PRIMARY KEY,
            session_id TEXT NOT NULL,
            reason TEXT NOT NULL,
            start_time TEXT NOT NULL,
            end_time TEXT,
            FOREIGN KEY (session_id) REFERENCES focus_sessions(id) ON DELETE CASCADE
        )",
        [],
    )?;

    // Tasks - syllabus assignments imported from CSV
    conn.execute(
        "CREATE TABLE IF NOT EXISTS tasks (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            course_code TEXT NOT NULL,
            assignment_name TEXT NOT NULL,
            due_date TEXT NOT NULL,
            is_completed INTEGER NOT NULL DEFAULT 0
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_focus_sessions_start ON focus_sessions(start_time)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_distraction_events_session ON distraction_events(session_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_tasks_course_due ON tasks(course_code, due_date)",
        [],
    )?;

    Ok(())
}
