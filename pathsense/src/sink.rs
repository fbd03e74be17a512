use crate::session::FrameReport;
use log::warn;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

/// Receives every processed frame. Delivery must not block the pipeline and
/// nothing flows back.
pub trait ReportSink {
    fn deliver(&mut self, report: FrameReport);
}

impl ReportSink for UnboundedSender<FrameReport> {
    fn deliver(&mut self, report: FrameReport) {
        if self.send(report).is_err() {
            warn!("Report receiver dropped, discarding frame report");
        }
    }
}

/// Collects reports in memory.
impl ReportSink for Arc<Mutex<Vec<FrameReport>>> {
    fn deliver(&mut self, report: FrameReport) {
        self.lock().push(report);
    }
}
