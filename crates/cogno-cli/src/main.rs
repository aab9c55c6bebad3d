mod commands;
mod terminal;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cogno")]
#[command(about = "Webcam focus monitor for study sessions", long_about = None)]
struct Cli {
    /// Path to config.toml (defaults to the data directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Watch the camera and alert when you look away
    Watch {
        /// Landmark recording to replay instead of the configured model path
        #[arg(short, long)]
        replay: Option<PathBuf>,
        /// Restart the recording when it runs out
        #[arg(long = "loop")]
        looping: bool,
        /// Stop after this many frames
        #[arg(long)]
        max_ticks: Option<u64>,
        /// Don't save the session to the database
        #[arg(long)]
        no_record: bool,
    },
    /// Import syllabus assignments from a CSV file
    Import {
        /// CSV file with Date, Course and Assignment columns
        file: PathBuf,
        /// Owner of the imported tasks
        #[arg(short, long)]
        user: String,
    },
    /// List imported assignments
    Tasks {
        /// Only show this course
        #[arg(short, long)]
        course: Option<String>,
        #[command(subcommand)]
        action: Option<TaskAction>,
    },
    /// Summarize recorded focus sessions
    Report {
        /// Time period: today, week, or month
        #[arg(default_value = "today")]
        period: String,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum TaskAction {
    /// Mark an assignment as completed
    Done {
        /// Task ID
        id: String,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
    /// Print the config file location
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let config_path = match cli.config {
        Some(path) => path,
        None => cogno_core::config::default_config_path()?,
    };

    match cli.command {
        Commands::Watch {
            replay,
            looping,
            max_ticks,
            no_record,
        } => {
            let options = commands::watch::WatchOptions {
                replay,
                looping,
                max_ticks,
                record: !no_record,
            };
            commands::watch::handle_watch_command(&config_path, options).await
        }
        Commands::Import { file, user } => commands::import::handle_import_command(&file, &user),
        Commands::Tasks { course, action } => match action {
            Some(TaskAction::Done { id }) => commands::tasks::handle_task_done(&id),
            None => commands::tasks::handle_tasks_list(course.as_deref()),
        },
        Commands::Report { period } => commands::report::handle_report_command(&period),
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::handle_config_show(&config_path),
            ConfigAction::Init { force } => commands::config::handle_config_init(&config_path, force),
            ConfigAction::Path => {
                println!("{}", config_path.display());
                Ok(())
            }
        },
    }
}
