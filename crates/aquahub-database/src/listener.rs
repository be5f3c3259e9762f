//! Dedicated `LISTEN` connection owned by a single task.
//!
//! The [`ListenerTask`] is the only code that touches the notification
//! connection. `LISTEN`/`UNLISTEN` requests reach it as commands through a
//! [`ListenerHandle`] and are executed one at a time between `recv()` calls,
//! so the connection's listening state cannot be raced. Received
//! notifications are pushed into a bounded queue consumed by the fan-out
//! task.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgListener;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, error, info, warn};

use aquahub_core::error::{AppError, ErrorKind};
use aquahub_core::result::AppResult;
use aquahub_core::traits::ListenCommander;
use aquahub_core::types::Notification;

const COMMAND_BUFFER: usize = 32;

/// A request for the listener task, answered through `ack`.
#[derive(Debug)]
enum ListenCommand {
    Listen {
        channel: String,
        ack: oneshot::Sender<AppResult<()>>,
    },
    Unlisten {
        channel: String,
        ack: oneshot::Sender<AppResult<()>>,
    },
}

/// Cloneable front of the listener task.
#[derive(Debug, Clone)]
pub struct ListenerHandle {
    commands: mpsc::Sender<ListenCommand>,
}

impl ListenerHandle {
    async fn request(
        &self,
        build: impl FnOnce(oneshot::Sender<AppResult<()>>) -> ListenCommand,
    ) -> AppResult<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.commands
            .send(build(ack_tx))
            .await
            .map_err(|_| AppError::listen("Notification listener task is not running"))?;

        ack_rx
            .await
            .map_err(|_| AppError::listen("Notification listener task stopped before replying"))?
    }
}

#[async_trait]
impl ListenCommander for ListenerHandle {
    async fn start_listening(&self, channel: &str) -> AppResult<()> {
        self.request(|ack| ListenCommand::Listen {
            channel: channel.to_string(),
            ack,
        })
        .await
    }

    async fn stop_listening(&self, channel: &str) -> AppResult<()> {
        self.request(|ack| ListenCommand::Unlisten {
            channel: channel.to_string(),
            ack,
        })
        .await
    }
}

/// Owner of the `PgListener` connection.
pub struct ListenerTask {
    listener: PgListener,
    commands: mpsc::Receiver<ListenCommand>,
    notifications: mpsc::Sender<Notification>,
    retry_delay: Duration,
}

impl std::fmt::Debug for ListenerTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerTask")
            .field("retry_delay", &self.retry_delay)
            .finish()
    }
}

impl ListenerTask {
    /// Opens the dedicated listener connection.
    ///
    /// Notifications are delivered into `notifications` in arrival order.
    pub async fn connect(
        pool: &PgPool,
        notifications: mpsc::Sender<Notification>,
        retry_delay: Duration,
    ) -> AppResult<(Self, ListenerHandle)> {
        let listener = PgListener::connect_with(pool).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Listen,
                format!("Failed to open notification listener connection: {e}"),
                e,
            )
        })?;

        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);

        info!(target: "aquahub::database", "Notification listener connected");

        Ok((
            Self {
                listener,
                commands: rx,
                notifications,
                retry_delay,
            },
            ListenerHandle { commands: tx },
        ))
    }

    /// Runs until shutdown is signalled, every [`ListenerHandle`] is dropped,
    /// or the notification consumer goes away.
    ///
    /// While the notification queue is full the received notification is
    /// parked and commands are still served, so the consumer may wait on a
    /// command acknowledgment without stalling this loop.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let ListenerTask {
            mut listener,
            mut commands,
            notifications,
            retry_delay,
        } = self;
        let mut pending: Option<Notification> = None;

        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                command = commands.recv() => match command {
                    Some(command) => execute(&mut listener, command).await,
                    None => break,
                },
                permit = notifications.reserve(), if pending.is_some() => match permit {
                    Ok(permit) => {
                        if let Some(notification) = pending.take() {
                            permit.send(notification);
                        }
                    }
                    Err(_) => {
                        warn!(target: "aquahub::database", "Notification consumer closed, stopping listener");
                        break;
                    }
                },
                received = listener.recv(), if pending.is_none() => match received {
                    Ok(raw) => {
                        debug!(
                            target: "aquahub::database",
                            channel = %raw.channel(),
                            payload = %raw.payload(),
                            "Received notification"
                        );
                        pending = Some(Notification::new(raw.channel(), raw.payload()));
                    }
                    Err(e) => {
                        error!(
                            target: "aquahub::database",
                            error = %e,
                            retry_seconds = retry_delay.as_secs(),
                            "Notification listener connection failed"
                        );
                        tokio::time::sleep(retry_delay).await;
                    }
                },
            }
        }

        if let Err(e) = listener.unlisten_all().await {
            warn!(target: "aquahub::database", error = %e, "Failed to release channels on shutdown");
        }
        info!(target: "aquahub::database", "Notification listener stopped");
    }
}

async fn execute(listener: &mut PgListener, command: ListenCommand) {
    match command {
        ListenCommand::Listen { channel, ack } => {
            let result = listener.listen(&channel).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Listen,
                    format!("LISTEN {channel} failed: {e}"),
                    e,
                )
            });
            if result.is_ok() {
                info!(target: "aquahub::database", channel = %channel, "Listening to channel");
            }
            let _ = ack.send(result);
        }
        ListenCommand::Unlisten { channel, ack } => {
            let result = listener.unlisten(&channel).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Listen,
                    format!("UNLISTEN {channel} failed: {e}"),
                    e,
                )
            });
            if result.is_ok() {
                info!(target: "aquahub::database", channel = %channel, "Stopped listening to channel");
            }
            let _ = ack.send(result);
        }
    }
}
