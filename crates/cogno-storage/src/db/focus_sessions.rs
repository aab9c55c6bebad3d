use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::params;
use uuid::Uuid;

use super::helpers::{parse_datetime, parse_uuid};
use super::Database;
use crate::models::{DistractionEvent, FocusSessionRecord, ReasonSummary};

impl Database {
    // ==================== Focus Session Methods ====================

    /// Create a new focus session starting at `start_time`
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert operation fails
    pub fn create_focus_session(&self, start_time: DateTime<Utc>) -> Result<Uuid> {
        let record = FocusSessionRecord::new(start_time);
        self.conn.execute(
            "INSERT INTO focus_sessions (id, start_time, end_time, focused_ticks, distracted_ticks, alert_count)
             VALUES (?1, ?2, NULL, 0, 0, 0)",
            params![record.id.to_string(), record.start_time.to_rfc3339()],
        )?;
        Ok(record.id)
    }

    /// Overwrite the running tick and alert counters of a session
    ///
    /// # Errors
    ///
    /// Returns an error if the database update operation fails
    pub fn update_focus_session_stats(
        &self,
        session_id: Uuid,
        focused_ticks: u32,
        distracted_ticks: u32,
        alert_count: u32,
    ) -> Result<()> {
        self.conn.execute(
            "UPDATE focus_sessions
             SET focused_ticks = ?1, distracted_ticks = ?2, alert_count = ?3
             WHERE id = ?4",
            params![
                focused_ticks,
                distracted_ticks,
                alert_count,
                session_id.to_string()
            ],
        )?;
        Ok(())
    }

    /// Close a session and any distraction event still open within it
    ///
    /// # Errors
    ///
    /// Returns an error if the database update operation fails
    pub fn finalize_focus_session(&self, session_id: Uuid, end_time: DateTime<Utc>) -> Result<()> {
        let end = end_time.to_rfc3339();
        self.conn.execute(
            "UPDATE distraction_events SET end_time = ?1 WHERE session_id = ?2 AND end_time IS NULL",
            params![end, session_id.to_string()],
        )?;
        self.conn.execute(
            "UPDATE focus_sessions SET end_time = ?1 WHERE id = ?2 AND end_time IS NULL",
            params![end, session_id.to_string()],
        )?;
        Ok(())
    }

    /// Get sessions that started within a date range, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub fn get_focus_sessions(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<FocusSessionRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, start_time, end_time, focused_ticks, distracted_ticks, alert_count
             FROM focus_sessions
             WHERE start_time BETWEEN ?1 AND ?2
             ORDER BY start_time DESC",
        )?;

        let sessions = stmt
            .query_map(params![start.to_rfc3339(), end.to_rfc3339()], |row| {
                Ok(FocusSessionRecord {
                    id: parse_uuid(&row.get::<_, String>(0)?)?,
                    start_time: parse_datetime(&row.get::<_, String>(1)?)?,
                    end_time: row
                        .get::<_, Option<String>>(2)?
                        .map(|s| parse_datetime(&s))
                        .transpose()?,
                    focused_ticks: row.get(3)?,
                    distracted_ticks: row.get(4)?,
                    alert_count: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(sessions)
    }

    // ==================== Distraction Event Methods ====================

    /// Open a distraction event
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert operation fails
    pub fn start_distraction_event(
        &self,
        session_id: Uuid,
        reason: &str,
        start_time: DateTime<Utc>,
    ) -> Result<Uuid> {
        let event = DistractionEvent::new(session_id, reason.to_string(), start_time);
        self.conn.execute(
            "INSERT INTO distraction_events (id, session_id, reason, start_time, end_time)
             VALUES (?1, ?2, ?3, ?4, NULL)",
            params![
                event.id.to_string(),
                event.session_id.to_string(),
                event.reason,
                event.start_time.to_rfc3339(),
            ],
        )?;
        Ok(event.id)
    }

    /// Close a distraction event
    ///
    /// # Errors
    ///
    /// Returns an error if the database update operation fails
    pub fn end_distraction_event(&self, event_id: Uuid, end_time: DateTime<Utc>) -> Result<()> {
        self.conn.execute(
            "UPDATE distraction_events SET end_time = ?1 WHERE id = ?2 AND end_time IS NULL",
            params![end_time.to_rfc3339(), event_id.to_string()],
        )?;
        Ok(())
    }

    /// Get all distraction events of a session in chronological order
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub fn get_distraction_events(&self, session_id: Uuid) -> Result<Vec<DistractionEvent>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, session_id, reason, start_time, end_time
             FROM distraction_events
             WHERE session_id = ?1
             ORDER BY start_time ASC",
        )?;

        let events = stmt
            .query_map(params![session_id.to_string()], |row| {
                Ok(DistractionEvent {
                    id: parse_uuid(&row.get::<_, String>(0)?)?,
                    session_id: parse_uuid(&row.get::<_, String>(1)?)?,
                    reason: row.get(2)?,
                    start_time: parse_datetime(&row.get::<_, String>(3)?)?,
                    end_time: row
                        .get::<_, Option<String>>(4)?
                        .map(|s| parse_datetime(&s))
                        .transpose()?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(events)
    }

    /// Summarize closed distraction events per reason within a date range
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub fn get_distraction_summary(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ReasonSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT reason, start_time, end_time
             FROM distraction_events
             WHERE start_time BETWEEN ?1 AND ?2 AND end_time IS NOT NULL",
        )?;

        let rows = stmt
            .query_map(params![start.to_rfc3339(), end.to_rfc3339()], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    parse_datetime(&row.get::<_, String>(1)?)?,
                    parse_datetime(&row.get::<_, String>(2)?)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut summaries: Vec<ReasonSummary> = Vec::new();
        for (reason, started, ended) in rows {
            let seconds = (ended - started).num_seconds().max(0);
            if let Some(summary) = summaries.iter_mut().find(|s| s.reason == reason) {
                summary.occurrences += 1;
                summary.total_seconds += seconds;
            } else {
                summaries.push(ReasonSummary {
                    reason,
                    occurrences: 1,
                    total_seconds: seconds,
                });
            }
        }
        summaries.sort_by(|a, b| b.total_seconds.cmp(&a.total_seconds));

        Ok(summaries)
    }
}
