//! Service layer for Postdeck
//!
//! Everything that sits between the composer state and the outside world:
//!
//! - `PostAssembler`: validation, assembly and commit to a sink
//! - `CaptionReport`: per-channel caption counts against the soft limit
//! - `EventBus`: composer and commit notifications
//! - `ComposerSession`: one task serializing edits and saves for async callers

pub mod assembler;
pub mod events;
pub mod session;
pub mod validation;

// Re-export commonly used types
pub use assembler::{PendingCommit, PostAssembler};
pub use events::{ComposerEvent, EventBus};
pub use session::{ComposerSession, SessionHandle};
pub use validation::CaptionReport;
