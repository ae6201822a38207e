//! Named status channels that count warnings and errors.
//!
//! Every pipeline stage writes to a channel. The core pipeline owns the
//! [`CORE_CHANNEL`]; each configured check module gets a channel named after
//! itself. Each record fans out to the console (through `log`), an optional
//! log file, and an optional [`ReportSink`].

mod channel;
mod registry;
mod report;

pub use channel::{Channel, ChannelOptions, Severity};
pub use registry::{ChannelRegistry, ChannelStatus, CORE_CHANNEL};
pub use report::{MemoryReport, ReportEntry, ReportSink, SharedReportSink, TextReport};
