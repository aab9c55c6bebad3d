pub mod config;
pub mod helpers;
pub mod import;
pub mod report;
pub mod tasks;
pub mod watch;
