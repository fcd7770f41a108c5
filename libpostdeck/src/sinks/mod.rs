//! Destinations for committed posts
//!
//! A [`PostSink`] records an assembled [`Post`]. The composer core never
//! talks to a network itself; the sink decides what "saving" means (a
//! database row, a scheduler queue, a log line).
//!
//! # Examples
//!
//! ```no_run
//! use libpostdeck::sinks::{PostSink, console::ConsoleSink};
//! use libpostdeck::types::PostStatus;
//! use std::time::Duration;
//!
//! # async fn example(post: libpostdeck::types::Post) -> Result<(), libpostdeck::error::SinkError> {
//! let sink = ConsoleSink::new(Duration::from_millis(250));
//! sink.submit(&post, PostStatus::Draft).await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;

use crate::error::SinkError;
use crate::types::{Post, PostStatus};

pub mod console;

// Mock sink is available for all builds to support integration tests
pub mod mock;

/// Receiver of committed posts
#[async_trait]
pub trait PostSink: Send + Sync {
    /// Record the post with the requested status
    ///
    /// # Errors
    ///
    /// Returns a [`SinkError`] when the post could not be recorded. The
    /// caller keeps its state so the user can retry.
    async fn submit(&self, post: &Post, status: PostStatus) -> Result<(), SinkError>;

    /// Short name used in logs and error messages
    fn name(&self) -> &str;
}
