/// Focus report command handler
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, Utc};
use tabled::{Table, Tabled};

use cogno_storage::{Database, FocusSessionRecord};

use super::helpers::format_duration;

#[derive(Tabled)]
struct ReasonRow {
    #[tabled(rename = "Reason")]
    reason: String,
    #[tabled(rename = "Times")]
    occurrences: u32,
    #[tabled(rename = "Time")]
    time: String,
}

fn period_range(period: &str, now: DateTime<Utc>) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let start = match period {
        "today" => now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .context("Invalid start of day")?
            .and_utc(),
        "week" => now - Duration::days(7),
        "month" => now - Duration::days(30),
        _ => bail!("Unknown period: {period}. Use 'today', 'week', or 'month'"),
    };
    Ok((start, now))
}

fn overall_focus_ratio(sessions: &[FocusSessionRecord]) -> f64 {
    let focused: u32 = sessions.iter().map(|s| s.focused_ticks).sum();
    let distracted: u32 = sessions.iter().map(|s| s.distracted_ticks).sum();
    let total = focused + distracted;
    if total == 0 {
        0.0
    } else {
        f64::from(focused) / f64::from(total)
    }
}

pub fn handle_report_command(period: &str) -> Result<()> {
    let (start, end) = period_range(period, Utc::now())?;
    let db = Database::new(None)?;

    let sessions = db.get_focus_sessions(start, end)?;
    if sessions.is_empty() {
        println!("No focus sessions recorded for period: {period}");
        return Ok(());
    }

    let watched: i64 = sessions
        .iter()
        .filter_map(|s| Some((s.end_time? - s.start_time).num_seconds()))
        .sum();
    let alerts: u32 = sessions.iter().map(|s| s.alert_count).sum();

    println!("\nFocus Report: {period}");
    println!("\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}");
    println!("Sessions:     {}", sessions.len());
    println!("Watched:      {}", format_duration(watched));
    println!(
        "Focused:      {:.1}%",
        overall_focus_ratio(&sessions) * 100.0
    );
    println!("Alerts:       {alerts}");

    let summary = db.get_distraction_summary(start, end)?;
    if summary.is_empty() {
        println!("\nNo distractions recorded.");
        return Ok(());
    }

    let rows: Vec<ReasonRow> = summary
        .into_iter()
        .map(|s| ReasonRow {
            reason: s.reason,
            occurrences: s.occurrences,
            time: format_duration(s.total_seconds),
        })
        .collect();
    println!("\n{}", Table::new(rows));
    Ok(())
}
