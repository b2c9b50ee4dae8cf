//! Report output port for writing sequence reports.

use crate::domain::SequenceReport;

/// Port for outputting stabilization reports.
pub trait ReportOutput: Send + Sync {
    /// Writes a sequence report.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write(&self, report: &SequenceReport) -> anyhow::Result<()>;

    /// Flushes any buffered output.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing fails.
    fn flush(&self) -> anyhow::Result<()>;
}
