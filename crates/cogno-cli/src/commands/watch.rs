/// Focus monitoring command handler
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cogno_core::capture::replay::ReplayLoader;
use cogno_core::capture::synthetic::SyntheticCamera;
use cogno_core::{Config, FocusDaemon, FocusSession, SessionRecorder};
use cogno_storage::Database;

use crate::terminal::{TerminalAlert, TerminalSurface};

#[derive(Debug, Default)]
pub struct WatchOptions {
    pub replay: Option<PathBuf>,
    pub looping: bool,
    pub max_ticks: Option<u64>,
    pub record: bool,
}

pub async fn handle_watch_command(config_path: &Path, options: WatchOptions) -> Result<()> {
    let mut config = Config::load_or_default(config_path)?;
    if let Some(replay) = options.replay {
        config.detector.model_path = replay;
    }
    log::info!(
        "Landmark source: {}",
        config.detector.model_path.display()
    );

    let frame_interval = config.monitor.frame_interval();
    let sound = TerminalAlert::from_config(&config.alert);
    let session = FocusSession::new(
        config,
        Arc::new(SyntheticCamera),
        Arc::new(ReplayLoader::new(options.looping)),
        Box::new(TerminalSurface::default()),
        Box::new(sound),
    );

    let mut daemon = FocusDaemon::new(session, frame_interval);
    if let Some(max_ticks) = options.max_ticks {
        daemon = daemon.with_max_ticks(max_ticks);
    }
    if options.record {
        match Database::new(None) {
            Ok(db) => daemon = daemon.with_recorder(SessionRecorder::new(db)),
            Err(e) => log::warn!("Session will not be recorded: {e}"),
        }
    }

    println!("Watching for distractions. Press Ctrl-C to stop.");
    daemon.run_with_signals().await?;

    if let Some(recorder) = daemon.into_recorder() {
        if let Some(id) = recorder.session_id() {
            print_session_summary(recorder.database(), id)?;
        }
    }
    Ok(())
}

fn print_session_summary(db: &Database, session_id: uuid::Uuid) -> Result<()> {
    let events = db.get_distraction_events(session_id)?;
    let closed: Vec<_> = events.iter().filter_map(|e| Some((e, e.end_time?))).collect();
    let distracted_secs: i64 = closed
        .iter()
        .map(|(e, end)| (*end - e.start_time).num_seconds())
        .sum();

    println!(
        "\nSession {}: {} distraction(s), {} distracted",
        &session_id.to_string()[..8],
        events.len(),
        super::helpers::format_duration(distracted_secs)
    );
    Ok(())
}
