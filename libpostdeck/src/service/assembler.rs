//! Post assembly and commit
//!
//! [`PostAssembler`] owns the [`Composer`] and turns its state into a
//! [`Post`]: validation first, then per-channel resolution of caption,
//! media, options and scheduling, then hand-off to a [`PostSink`].
//!
//! A commit never mutates composer state. On failure the user keeps
//! everything they composed and can retry.
//!
//! # Example
//!
//! ```no_run
//! use libpostdeck::composer::Composer;
//! use libpostdeck::service::assembler::PostAssembler;
//! use libpostdeck::sinks::mock::MockSink;
//! use libpostdeck::types::PostStatus;
//!
//! # async fn example() -> libpostdeck::Result<()> {
//! let mut assembler = PostAssembler::new(Composer::with_defaults());
//! assembler.composer_mut().set_master_caption("Launch day");
//! assembler.composer_mut().add_channel("instagram", None)?;
//!
//! let post = assembler.commit(PostStatus::Draft, &MockSink::success()).await?;
//! println!("Saved {}", post.id);
//! # Ok(())
//! # }
//! ```

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::composer::Composer;
use crate::error::{PostdeckError, Result, SaveError, SinkError, ValidationError};
use crate::service::events::{ComposerEvent, EventReceiver};
use crate::sinks::PostSink;
use crate::types::{ChannelPost, Post, PostStatus};

/// An assembled post waiting on its sink
///
/// Produced by [`PostAssembler::begin_commit`] and consumed by
/// [`PostAssembler::finish_commit`].
#[derive(Debug, Clone)]
pub struct PendingCommit {
    pub post: Post,
    pub status: PostStatus,
}

#[derive(Debug)]
pub struct PostAssembler {
    composer: Composer,
    in_flight: bool,
}

impl PostAssembler {
    pub fn new(composer: Composer) -> Self {
        Self {
            composer,
            in_flight: false,
        }
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    pub fn composer_mut(&mut self) -> &mut Composer {
        &mut self.composer
    }

    pub fn into_composer(self) -> Composer {
        self.composer
    }

    pub fn subscribe(&self) -> EventReceiver {
        self.composer.subscribe()
    }

    /// Whether a save is waiting on its sink
    pub fn is_committing(&self) -> bool {
        self.in_flight
    }

    /// Check that the composition can be saved with `status`
    pub fn validate(&self, status: PostStatus) -> std::result::Result<(), ValidationError> {
        let composer = &self.composer;
        if composer.channels().is_empty() {
            return Err(ValidationError::NoChannels);
        }
        if composer.captions().master_caption().trim().is_empty()
            && composer.media().master_media().is_empty()
        {
            return Err(ValidationError::EmptyContent);
        }
        if status == PostStatus::Scheduled && composer.scheduled_channels().is_empty() {
            return Err(ValidationError::NoSchedule);
        }
        Ok(())
    }

    /// Resolve every selected channel into a [`Post`]
    ///
    /// Does not validate; see [`validate`](Self::validate).
    pub fn assemble(&self, status: PostStatus) -> Post {
        let composer = &self.composer;
        let channels = composer
            .channels()
            .iter()
            .map(|channel| {
                let id = channel.platform_id.as_str();
                ChannelPost {
                    platform_id: channel.platform_id.clone(),
                    post_type: channel.post_type.clone(),
                    resolved_caption: composer.effective_caption(id).to_string(),
                    resolved_media: composer
                        .effective_media(id)
                        .iter()
                        .map(|item| (**item).clone())
                        .collect(),
                    options: composer.options().values_for(id),
                    scheduling: composer.schedule().entry(id).cloned().unwrap_or_default(),
                }
            })
            .collect();

        Post {
            id: Uuid::new_v4().to_string(),
            master_caption: composer.captions().master_caption().to_string(),
            master_media: composer
                .media()
                .master_media()
                .iter()
                .map(|item| (**item).clone())
                .collect(),
            channels,
            created_at: Utc::now(),
            status,
        }
    }

    /// Validate, assemble and mark a save as in flight
    ///
    /// # Errors
    ///
    /// - [`PostdeckError::CommitInFlight`] while another save is pending
    /// - [`PostdeckError::Validation`] when the composition is incomplete
    pub fn begin_commit(&mut self, status: PostStatus) -> Result<PendingCommit> {
        if self.in_flight {
            return Err(PostdeckError::CommitInFlight);
        }
        self.validate(status)?;

        let post = self.assemble(status);
        self.in_flight = true;
        info!(
            post_id = %post.id,
            %status,
            channels = post.channels.len(),
            "committing post"
        );
        self.composer.events().emit(ComposerEvent::CommitStarted {
            post_id: post.id.clone(),
            status,
        });
        Ok(PendingCommit { post, status })
    }

    /// Settle a save with the sink's outcome
    pub fn finish_commit(
        &mut self,
        pending: PendingCommit,
        sink_name: &str,
        outcome: std::result::Result<(), SinkError>,
    ) -> Result<Post> {
        self.in_flight = false;
        let PendingCommit { post, status } = pending;

        match outcome {
            Ok(()) => {
                info!(post_id = %post.id, %status, sink = sink_name, "post committed");
                self.composer.events().emit(ComposerEvent::CommitCompleted {
                    post_id: post.id.clone(),
                    status,
                });
                Ok(post)
            }
            Err(source) => {
                warn!(post_id = %post.id, sink = sink_name, error = %source, "commit failed");
                self.composer.events().emit(ComposerEvent::CommitFailed {
                    post_id: post.id.clone(),
                    error: source.to_string(),
                });
                Err(SaveError {
                    sink: sink_name.to_string(),
                    source,
                }
                .into())
            }
        }
    }

    /// Validate, assemble and save in one call
    pub async fn commit(&mut self, status: PostStatus, sink: &dyn PostSink) -> Result<Post> {
        let pending = self.begin_commit(status)?;
        let outcome = sink.submit(&pending.post, status).await;
        self.finish_commit(pending, sink.name(), outcome)
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.composer.has_unsaved_changes()
    }

    /// Throw the composition away
    pub fn discard(&mut self) {
        self.composer.discard();
    }
}
