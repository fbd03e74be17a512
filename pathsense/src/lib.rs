pub mod link;
pub mod session;
pub mod sink;

pub use link::{ActuatorLink, LoggingLink};
pub use session::{FrameReport, Session};
pub use sink::ReportSink;

use tracing_subscriber::filter::LevelFilter;

/// Routes `log` records to stdout at info level. Safe to call more than once.
pub fn log_init() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(LevelFilter::INFO)
        .try_init();
}
