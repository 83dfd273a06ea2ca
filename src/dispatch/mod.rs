//! Plugin dispatch.
//!
//! For every selected plugin the dispatcher resolves its search patterns
//! through the active seeker, writes one audit entry per pattern, skips the
//! plugin when nothing matched, and otherwise hands the matches to the
//! plugin's parser. A failing, panicking or overrunning parser is recorded
//! and the run moves on to the next plugin.

pub mod audit;
pub mod dispatcher;
pub mod progress;

pub use audit::AuditLog;
pub use dispatcher::{crunch_artifacts, DispatchOptions, DispatchSummary, Dispatcher};
pub use progress::{LogProgress, ProgressSink};
