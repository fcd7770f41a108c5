//! Simulated save that logs the post

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::info;

use super::PostSink;
use crate::error::SinkError;
use crate::types::{Post, PostStatus};

/// Waits for the configured delay, then logs the post as JSON
pub struct ConsoleSink {
    delay: Duration,
}

impl ConsoleSink {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl PostSink for ConsoleSink {
    async fn submit(&self, post: &Post, status: PostStatus) -> Result<(), SinkError> {
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        let body = serde_json::to_string(post)
            .map_err(|e| SinkError::Rejected(format!("post is not serializable: {}", e)))?;
        info!(
            post_id = %post.id,
            %status,
            channels = post.channels.len(),
            post = %body,
            "post recorded"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}
