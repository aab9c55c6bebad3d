use super::*;
use crate::models::Task;
use chrono::{Duration, NaiveDate, TimeZone, Utc};

fn due(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, day).unwrap()
}

#[test]
fn test_new_creates_file_and_schema() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("cogno.db");
    let db = Database::new(Some(path.clone())).unwrap();
    assert!(path.exists());
    assert!(db.get_tasks(None).unwrap().is_empty());
}

#[test]
fn test_focus_session_lifecycle() {
    let db = Database::in_memory().unwrap();
    let start = Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap();

    let id = db.create_focus_session(start).unwrap();
    db.update_focus_session_stats(id, 30, 10, 2).unwrap();
    db.finalize_focus_session(id, start + Duration::minutes(5))
        .unwrap();

    let sessions = db
        .get_focus_sessions(start - Duration::hours(1), start + Duration::hours(1))
        .unwrap();
    assert_eq!(sessions.len(), 1);
    let session = &sessions[0];
    assert_eq!(session.id, id);
    assert_eq!(session.focused_ticks, 30);
    assert_eq!(session.distracted_ticks, 10);
    assert_eq!(session.alert_count, 2);
    assert_eq!(session.end_time, Some(start + Duration::minutes(5)));
}

#[test]
fn test_finalize_closes_open_distraction_event() {
    let db = Database::in_memory().unwrap();
    let start = Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap();
    let session = db.create_focus_session(start).unwrap();

    db.start_distraction_event(session, "Looking down", start)
        .unwrap();
    db.finalize_focus_session(session, start + Duration::seconds(20))
        .unwrap();

    let events = db.get_distraction_events(session).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].end_time, Some(start + Duration::seconds(20)));
}

#[test]
fn test_distraction_summary_groups_by_reason() {
    let db = Database::in_memory().unwrap();
    let start = Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap();
    let session = db.create_focus_session(start).unwrap();

    let a = db
        .start_distraction_event(session, "Head turned", start)
        .unwrap();
    db.end_distraction_event(a, start + Duration::seconds(5))
        .unwrap();
    let b = db
        .start_distraction_event(session, "Looking down", start + Duration::seconds(10))
        .unwrap();
    db.end_distraction_event(b, start + Duration::seconds(40))
        .unwrap();
    let c = db
        .start_distraction_event(session, "Head turned", start + Duration::seconds(50))
        .unwrap();
    db.end_distraction_event(c, start + Duration::seconds(60))
        .unwrap();
    // Still open, excluded from the summary
    db.start_distraction_event(session, "No face detected", start + Duration::seconds(70))
        .unwrap();

    let summary = db
        .get_distraction_summary(start - Duration::hours(1), start + Duration::hours(1))
        .unwrap();
    assert_eq!(summary.len(), 2);
    assert_eq!(summary[0].reason, "Looking down");
    assert_eq!(summary[0].total_seconds, 30);
    assert_eq!(summary[1].reason, "Head turned");
    assert_eq!(summary[1].occurrences, 2);
    assert_eq!(summary[1].total_seconds, 15);
}

#[test]
fn test_insert_and_filter_tasks() {
    let db = Database::in_memory().unwrap();
    let tasks = vec![
        Task::new("me".into(), "COP2510".into(), "Lab 2".into(), due(12)),
        Task::new("me".into(), "MAC2311".into(), "Quiz 1".into(), due(3)),
        Task::new("me".into(), "COP2510".into(), "Lab 1".into(), due(5)),
    ];
    assert_eq!(db.insert_tasks(&tasks).unwrap(), 3);

    let all = db.get_tasks(None).unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].assignment_name, "Quiz 1");

    let cop = db.get_tasks(Some("COP2510")).unwrap();
    assert_eq!(cop.len(), 2);
    assert_eq!(cop[0].assignment_name, "Lab 1");
    assert_eq!(cop[1].assignment_name, "Lab 2");
}

#[test]
fn test_insert_tasks_is_all_or_nothing() {
    let db = Database::in_memory().unwrap();
    let first = Task::new("me".into(), "COP2510".into(), "Lab 1".into(), due(5));
    let duplicate = first.clone();

    assert!(db.insert_tasks(&[first, duplicate]).is_err());
    assert!(db.get_tasks(None).unwrap().is_empty());
}

#[test]
fn test_complete_task() {
    let db = Database::in_memory().unwrap();
    let task = Task::new("me".into(), "COP2510".into(), "Lab 1".into(), due(5));
    let id = task.id;
    db.insert_tasks(&[task]).unwrap();

    assert!(db.complete_task(id).unwrap());
    assert!(db.get_tasks(None).unwrap()[0].is_completed);
    assert!(!db.complete_task(uuid::Uuid::new_v4()).unwrap());
}
