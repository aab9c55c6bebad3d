use anyhow::Result;
use chrono::{DateTime, Utc};
use cogno_storage::Database;
use uuid::Uuid;

use crate::classifier::{DistractionReason, FocusState};
use crate::monitor::Classified;

/// Ticks between counter flushes to the database
const FLUSH_EVERY_TICKS: u32 = 300;

/// Persists a monitoring run: tick counters plus one event per continuous
/// distracted stretch
pub struct SessionRecorder {
    database: Database,
    session_id: Option<Uuid>,
    open_event: Option<(Uuid, DistractionReason)>,
    focused_ticks: u32,
    distracted_ticks: u32,
    alert_count: u32,
    unflushed_ticks: u32,
}

impl SessionRecorder {
    #[must_use]
    pub fn new(database: Database) -> Self {
        Self {
            database,
            session_id: None,
            open_event: None,
            focused_ticks: 0,
            distracted_ticks: 0,
            alert_count: 0,
            unflushed_ticks: 0,
        }
    }

    #[must_use]
    pub const fn session_id(&self) -> Option<Uuid> {
        self.session_id
    }

    #[must_use]
    pub const fn database(&self) -> &Database {
        &self.database
    }

    /// Open the session row
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails
    pub fn begin(&mut self, now: DateTime<Utc>) -> Result<Uuid> {
        let id = self.database.create_focus_session(now)?;
        log::info!("Recording focus session: {id}");
        self.session_id = Some(id);
        Ok(id)
    }

    /// Account for one classified tick
    ///
    /// # Errors
    ///
    /// Returns an error if a database write fails
    pub fn observe(&mut self, classified: &Classified, now: DateTime<Utc>) -> Result<()> {
        let Some(session_id) = self.session_id else {
            return Ok(());
        };

        match classified.state {
            FocusState::Distracted(reason) => {
                self.distracted_ticks += 1;
                if self.open_event.map(|(_, open)| open) != Some(reason) {
                    self.close_event(now)?;
                    let event =
                        self.database
                            .start_distraction_event(session_id, reason.description(), now)?;
                    self.open_event = Some((event, reason));
                }
            }
            FocusState::Focused => {
                self.focused_ticks += 1;
                self.close_event(now)?;
            }
            FocusState::Initializing => {}
        }
        if classified.alert {
            self.alert_count += 1;
        }

        self.unflushed_ticks += 1;
        if self.unflushed_ticks >= FLUSH_EVERY_TICKS {
            self.flush()?;
        }
        Ok(())
    }

    /// Flush counters and close the session row
    ///
    /// # Errors
    ///
    /// Returns an error if a database write fails
    pub fn finish(&mut self, now: DateTime<Utc>) -> Result<()> {
        let Some(session_id) = self.session_id else {
            return Ok(());
        };
        self.close_event(now)?;
        self.flush()?;
        self.database.finalize_focus_session(session_id, now)?;
        log::info!(
            "Finalized focus session: {session_id} (focused ticks: {}, distracted ticks: {}, alerts: {})",
            self.focused_ticks,
            self.distracted_ticks,
            self.alert_count
        );
        self.session_id = None;
        Ok(())
    }

    fn close_event(&mut self, now: DateTime<Utc>) -> Result<()> {
        if let Some((event, _)) = self.open_event.take() {
            self.database.end_distraction_event(event, now)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(session_id) = self.session_id {
            self.database.update_focus_session_stats(
                session_id,
                self.focused_ticks,
                self.distracted_ticks,
                self.alert_count,
            )?;
        }
        self.unflushed_ticks = 0;
        Ok(())
    }
}
