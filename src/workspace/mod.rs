//! The editor session: settings, audit cache, in-flight paths and the
//! batch operations built on them.

pub mod types;
pub mod guard;
pub mod session;

pub use types::{
    BatchOutput, BatchReport, DocOutcome, Finding, FixOutcome, ScanReport, Severity, SourceFile, UpdatedFile,
};
pub use guard::{InFlight, PathGuard};
pub use session::Workspace;
