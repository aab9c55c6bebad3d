pub mod alert;
pub mod capture;
pub mod classifier;
pub mod config;
pub mod driver;
pub mod error;
pub mod import;
pub mod landmarks;
pub mod monitor;
pub mod recorder;
pub mod session;

pub use classifier::{DistractionReason, FocusClassifier, FocusState};
pub use config::Config;
pub use driver::FocusDaemon;
pub use error::MonitorError;
pub use recorder::SessionRecorder;
pub use session::{FocusSession, StopHandle};
