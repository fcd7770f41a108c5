//! Single-task composer session
//!
//! [`ComposerSession::spawn`] moves a [`PostAssembler`] onto its own tokio
//! task. Callers talk to it through a cloneable [`SessionHandle`]; every
//! command is applied in the order it was queued, so a channel is always
//! initialized before a later edit of that channel is seen.
//!
//! Saves do not block the queue. The sink runs on a separate task while
//! edits keep flowing; a second save during that time is rejected with
//! [`PostdeckError::CommitInFlight`]. A sink that panics settles as
//! [`SinkError::Unavailable`], which releases the guard for a retry.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use libpostdeck::composer::{Composer, ComposerAction};
//! use libpostdeck::service::session::ComposerSession;
//! use libpostdeck::sinks::mock::MockSink;
//! use libpostdeck::types::PostStatus;
//!
//! # async fn example() -> libpostdeck::Result<()> {
//! let session = ComposerSession::spawn(Composer::with_defaults());
//! session.dispatch(ComposerAction::SetMasterCaption("Hi".to_string())).await?;
//! session
//!     .dispatch(ComposerAction::AddChannel {
//!         platform_id: "x".to_string(),
//!         post_type: None,
//!     })
//!     .await?;
//!
//! let post = session.commit(PostStatus::Draft, Arc::new(MockSink::success())).await?;
//! println!("Saved {}", post.id);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::composer::{Composer, ComposerAction};
use crate::error::{PostdeckError, Result, SinkError};
use crate::service::assembler::{PendingCommit, PostAssembler};
use crate::service::events::{EventBus, EventReceiver};
use crate::sinks::PostSink;
use crate::types::{Post, PostStatus};

/// Queue depth for pending commands
const COMMAND_BUFFER: usize = 64;

type Reply<T> = oneshot::Sender<Result<T>>;

enum Command {
    Dispatch {
        action: ComposerAction,
        reply: Reply<()>,
    },
    Commit {
        status: PostStatus,
        sink: Arc<dyn PostSink>,
        reply: Reply<Post>,
    },
    Snapshot {
        reply: oneshot::Sender<Composer>,
    },
    HasUnsavedChanges {
        reply: oneshot::Sender<bool>,
    },
}

/// A sink result coming back to the session task
struct Settled {
    pending: PendingCommit,
    sink_name: String,
    outcome: std::result::Result<(), SinkError>,
    reply: Reply<Post>,
}

pub struct ComposerSession;

impl ComposerSession {
    /// Start a session task owning `composer`
    ///
    /// Must be called from within a tokio runtime. The task ends once every
    /// handle is dropped and any pending save has settled.
    pub fn spawn(composer: Composer) -> SessionHandle {
        let events = composer.events().clone();
        let (commands, receiver) = mpsc::channel(COMMAND_BUFFER);
        tokio::spawn(run(PostAssembler::new(composer), receiver));
        SessionHandle { commands, events }
    }
}

/// Cloneable front end to a running session
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    events: EventBus,
}

impl SessionHandle {
    pub async fn dispatch(&self, action: ComposerAction) -> Result<()> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Dispatch { action, reply }).await?;
        response.await.map_err(|_| PostdeckError::SessionClosed)?
    }

    /// Save the composition; resolves once the sink has answered
    pub async fn commit(&self, status: PostStatus, sink: Arc<dyn PostSink>) -> Result<Post> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Commit {
            status,
            sink,
            reply,
        })
        .await?;
        response.await.map_err(|_| PostdeckError::SessionClosed)?
    }

    /// Copy of the composer state after every command queued so far
    pub async fn snapshot(&self) -> Result<Composer> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Snapshot { reply }).await?;
        response.await.map_err(|_| PostdeckError::SessionClosed)
    }

    pub async fn has_unsaved_changes(&self) -> Result<bool> {
        let (reply, response) = oneshot::channel();
        self.send(Command::HasUnsavedChanges { reply }).await?;
        response.await.map_err(|_| PostdeckError::SessionClosed)
    }

    pub fn subscribe(&self) -> EventReceiver {
        self.events.subscribe()
    }

    async fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| PostdeckError::SessionClosed)
    }
}

async fn run(mut assembler: PostAssembler, mut commands: mpsc::Receiver<Command>) {
    let (settled_tx, mut settled_rx) = mpsc::channel::<Settled>(1);
    let mut accepting = true;

    loop {
        tokio::select! {
            command = commands.recv(), if accepting => match command {
                Some(command) => handle(&mut assembler, command, &settled_tx),
                None => {
                    accepting = false;
                    if !assembler.is_committing() {
                        break;
                    }
                }
            },
            Some(settled) = settled_rx.recv() => {
                let result = assembler.finish_commit(
                    settled.pending,
                    &settled.sink_name,
                    settled.outcome,
                );
                // the caller may have stopped waiting
                let _ = settled.reply.send(result);
                if !accepting {
                    break;
                }
            }
        }
    }
    debug!("composer session stopped");
}

fn handle(assembler: &mut PostAssembler, command: Command, settled_tx: &mpsc::Sender<Settled>) {
    match command {
        Command::Dispatch { action, reply } => {
            let _ = reply.send(assembler.composer_mut().dispatch(action));
        }
        Command::Commit {
            status,
            sink,
            reply,
        } => match assembler.begin_commit(status) {
            Ok(pending) => {
                let settled_tx = settled_tx.clone();
                tokio::spawn(async move {
                    let sink_name = sink.name().to_string();
                    let outcome = submit_guarded(sink, &pending).await;
                    let settled = Settled {
                        pending,
                        sink_name,
                        outcome,
                        reply,
                    };
                    let _ = settled_tx.send(settled).await;
                });
            }
            Err(e) => {
                let _ = reply.send(Err(e));
            }
        },
        Command::Snapshot { reply } => {
            let _ = reply.send(assembler.composer().clone());
        }
        Command::HasUnsavedChanges { reply } => {
            let _ = reply.send(assembler.has_unsaved_changes());
        }
    }
}

/// Run the sink on its own task so a panic settles as a failed save
async fn submit_guarded(
    sink: Arc<dyn PostSink>,
    pending: &PendingCommit,
) -> std::result::Result<(), SinkError> {
    let post = pending.post.clone();
    let status = pending.status;
    let name = sink.name().to_string();

    match tokio::spawn(async move { sink.submit(&post, status).await }).await {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!(sink = %name, error = %e, "sink task did not complete");
            Err(SinkError::Unavailable(format!("sink task failed: {}", e)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::events::ComposerEvent;
    use crate::sinks::mock::MockSink;
    use async_trait::async_trait;
    use std::time::Duration;

    struct PanickingSink;

    #[async_trait]
    impl PostSink for PanickingSink {
        async fn submit(
            &self,
            _post: &Post,
            _status: PostStatus,
        ) -> std::result::Result<(), SinkError> {
            panic!("sink crashed");
        }

        fn name(&self) -> &str {
            "panicking"
        }
    }

    fn add(platform_id: &str) -> ComposerAction {
        ComposerAction::AddChannel {
            platform_id: platform_id.to_string(),
            post_type: None,
        }
    }

    #[tokio::test]
    async fn test_commands_apply_in_order() {
        let session = ComposerSession::spawn(Composer::with_defaults());
        session
            .dispatch(ComposerAction::SetMasterCaption("Hello".to_string()))
            .await
            .unwrap();
        session.dispatch(add("instagram")).await.unwrap();
        session.dispatch(add("tiktok")).await.unwrap();

        let composer = session.snapshot().await.unwrap();
        assert_eq!(composer.effective_caption("tiktok"), "Hello");
        assert!(session.has_unsaved_changes().await.unwrap());
    }

    #[tokio::test]
    async fn test_dispatch_errors_are_returned() {
        let session = ComposerSession::spawn(Composer::with_defaults());
        let err = session.dispatch(add("friendster")).await.unwrap_err();
        assert!(matches!(err, PostdeckError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_second_commit_is_rejected_while_pending() {
        let session = ComposerSession::spawn(Composer::with_defaults());
        session
            .dispatch(ComposerAction::SetMasterCaption("Hello".to_string()))
            .await
            .unwrap();
        session.dispatch(add("x")).await.unwrap();

        let slow: Arc<dyn PostSink> = Arc::new(MockSink::with_delay(Duration::from_millis(200)));
        let first = {
            let session = session.clone();
            let slow = slow.clone();
            tokio::spawn(async move { session.commit(PostStatus::Draft, slow).await })
        };
        // let the first commit reach the session
        tokio::time::sleep(Duration::from_millis(50)).await;

        // edits still go through while the sink is busy
        session.dispatch(add("linkedin")).await.unwrap();
        let err = session
            .commit(PostStatus::Draft, Arc::new(MockSink::success()))
            .await
            .unwrap_err();
        assert!(matches!(err, PostdeckError::CommitInFlight));

        let post = first.await.unwrap().unwrap();
        assert_eq!(post.channels.len(), 1);
        assert_eq!(session.snapshot().await.unwrap().channels().len(), 2);
    }

    #[tokio::test]
    async fn test_commit_failure_is_reported() {
        let session = ComposerSession::spawn(Composer::with_defaults());
        session
            .dispatch(ComposerAction::SetMasterCaption("Hello".to_string()))
            .await
            .unwrap();
        session.dispatch(add("x")).await.unwrap();

        let sink = Arc::new(MockSink::failing(SinkError::Rejected("spam".to_string())));
        let err = session.commit(PostStatus::Published, sink).await.unwrap_err();
        assert!(matches!(err, PostdeckError::Save(_)));

        // state survives the failed save
        assert_eq!(session.snapshot().await.unwrap().channels().len(), 1);
    }

    #[tokio::test]
    async fn test_panicking_sink_settles_as_failure() {
        let session = ComposerSession::spawn(Composer::with_defaults());
        session
            .dispatch(ComposerAction::SetMasterCaption("Hello".to_string()))
            .await
            .unwrap();
        session.dispatch(add("x")).await.unwrap();
        let mut events = session.subscribe();

        let err = session
            .commit(PostStatus::Draft, Arc::new(PanickingSink))
            .await
            .unwrap_err();
        match &err {
            PostdeckError::Save(save) => {
                assert_eq!(save.sink, "panicking");
                assert!(matches!(save.source, SinkError::Unavailable(_)));
            }
            other => panic!("expected a save error, got {:?}", other),
        }

        let mut failed = false;
        while let Ok(event) = events.try_recv() {
            if matches!(event, ComposerEvent::CommitFailed { .. }) {
                failed = true;
            }
        }
        assert!(failed);

        // the guard was released, so a retry goes through
        let sink = Arc::new(MockSink::success());
        let post = session
            .commit(PostStatus::Draft, sink.clone())
            .await
            .unwrap();
        assert_eq!(post.channel("x").unwrap().resolved_caption, "Hello");
        assert_eq!(sink.call_count(), 1);
    }
}
