use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One monitoring run, from `cogno watch` start to shutdown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FocusSessionRecord {
    pub id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub focused_ticks: u32,
    pub distracted_ticks: u32,
    pub alert_count: u32,
}

/// A continuous stretch of distraction with a single reason
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistractionEvent {
    pub id: Uuid,
    pub session_id: Uuid,
    pub reason: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
}

/// Aggregated distraction time per reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasonSummary {
    pub reason: String,
    pub occurrences: u32,
    pub total_seconds: i64,
}

/// Syllabus assignment imported from CSV
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub user_id: String,
    pub course_code: String,
    pub assignment_name: String,
    pub due_date: NaiveDate,
    pub is_completed: bool,
}

impl FocusSessionRecord {
    #[must_use]
    pub fn new(start_time: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            start_time,
            end_time: None,
            focused_ticks: 0,
            distracted_ticks: 0,
            alert_count: 0,
        }
    }

    /// Share of classified ticks spent focused, in `0.0..=1.0`
    #[must_use]
    pub fn focus_ratio(&self) -> f64 {
        let total = self.focused_ticks + self.distracted_ticks;
        if total == 0 {
            return 0.0;
        }
        f64::from(self.focused_ticks) / f64::from(total)
    }
}

impl DistractionEvent {
    #[must_use]
    pub fn new(session_id: Uuid, reason: String, start_time: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            reason,
            start_time,
            end_time: None,
        }
    }
}

impl Task {
    #[must_use]
    pub fn new(
        user_id: String,
        course_code: String,
        assignment_name: String,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            course_code,
            assignment_name,
            due_date,
            is_completed: false,
        }
    }
}
