//! Mock sink for testing
//!
//! A configurable sink that can simulate successes, failures and slow
//! saves. Every submission is recorded so tests can inspect exactly what
//! the assembler handed over.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use super::PostSink;
use crate::error::SinkError;
use crate::types::{Post, PostStatus};

/// Configuration for mock sink behavior
#[derive(Debug, Clone)]
pub struct MockSinkConfig {
    pub name: String,

    /// Error returned from every submission, `None` to succeed
    pub failure: Option<SinkError>,

    /// Delay before completing (simulates a slow backend)
    pub delay: Duration,
}

impl Default for MockSinkConfig {
    fn default() -> Self {
        Self {
            name: "mock".to_string(),
            failure: None,
            delay: Duration::ZERO,
        }
    }
}

/// Mock sink; clones share the same submission log
#[derive(Debug, Clone)]
pub struct MockSink {
    config: MockSinkConfig,
    call_count: Arc<Mutex<usize>>,
    submitted: Arc<Mutex<Vec<(PostStatus, Post)>>>,
}

impl MockSink {
    pub fn new(config: MockSinkConfig) -> Self {
        Self {
            config,
            call_count: Arc::new(Mutex::new(0)),
            submitted: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Sink that accepts everything
    pub fn success() -> Self {
        Self::new(MockSinkConfig::default())
    }

    /// Sink that fails every submission with `error`
    pub fn failing(error: SinkError) -> Self {
        Self::new(MockSinkConfig {
            failure: Some(error),
            ..Default::default()
        })
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self::new(MockSinkConfig {
            delay,
            ..Default::default()
        })
    }

    /// Number of times submit was called, including failures
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Posts that were accepted, in submission order
    pub fn submitted(&self) -> Vec<(PostStatus, Post)> {
        self.submitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl PostSink for MockSink {
    async fn submit(&self, post: &Post, status: PostStatus) -> Result<(), SinkError> {
        *self.call_count.lock().unwrap_or_else(PoisonError::into_inner) += 1;

        if !self.config.delay.is_zero() {
            sleep(self.config.delay).await;
        }

        if let Some(error) = &self.config.failure {
            return Err(error.clone());
        }

        self.submitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((status, post.clone()));
        Ok(())
    }

    fn name(&self) -> &str {
        &self.config.name
    }
}
