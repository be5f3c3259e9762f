//! Integration tests for the relay: subscription lifecycle and fan-out.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use aquahub_core::config::RealtimeConfig;
use aquahub_core::error::{AppError, ErrorKind};
use aquahub_core::result::AppResult;
use aquahub_core::traits::ListenCommander;
use aquahub_core::types::{Notification, Principal, Role};
use aquahub_realtime::RelayService;
use aquahub_realtime::subscription::{ListenEvent, RecordingCommander};

fn relay(commander: Arc<RecordingCommander>) -> RelayService {
    let config = RealtimeConfig {
        channels: vec!["SALES".to_string()],
        ..RealtimeConfig::default()
    };
    RelayService::new(config, commander)
}

#[tokio::test]
async fn test_sales_notification_end_to_end() {
    let commander = Arc::new(RecordingCommander::new());
    let relay = relay(commander.clone());
    let (tx, rx) = mpsc::channel(8);
    let fanout = relay.spawn_fanout(rx);

    let (a, mut rx_a) = relay
        .handle_connect(Principal::new(1, Role::Customer))
        .await
        .unwrap();
    let (b, mut rx_b) = relay
        .handle_connect(Principal::new(2, Role::Owner))
        .await
        .unwrap();
    assert_eq!(commander.events(), vec![ListenEvent::Start("SALES".into())]);

    tx.send(Notification::new("SALES", "order:42:created"))
        .await
        .unwrap();
    assert_eq!(rx_a.recv().await.unwrap(), "order:42:created");
    assert_eq!(rx_b.recv().await.unwrap(), "order:42:created");

    relay.handle_disconnect(a).await;
    relay.handle_disconnect(b).await;
    assert_eq!(
        commander.events(),
        vec![
            ListenEvent::Start("SALES".into()),
            ListenEvent::Stop("SALES".into()),
        ]
    );
    assert!(relay.active_channels().await.is_empty());

    relay.shutdown().await;
    fanout.await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_connects_and_disconnects() {
    let commander = Arc::new(RecordingCommander::with_delay(Duration::from_millis(1)));
    let relay = Arc::new(relay(commander.clone()));

    let tasks: Vec<_> = (0..32)
        .map(|i| {
            let relay = relay.clone();
            tokio::spawn(async move {
                let (id, _rx) = relay
                    .handle_connect(Principal::new(i, Role::Customer))
                    .await
                    .unwrap();
                tokio::time::sleep(Duration::from_millis(5)).await;
                relay.handle_disconnect(id).await
            })
        })
        .collect();
    for task in tasks {
        assert!(task.await.unwrap());
    }

    // Every start is followed by exactly one stop, never two of a kind in a row.
    let events = commander.events();
    assert!(!events.is_empty());
    for pair in events.chunks(2) {
        assert_eq!(
            pair,
            [
                ListenEvent::Start("SALES".into()),
                ListenEvent::Stop("SALES".into())
            ]
        );
    }
    assert_eq!(relay.connection_count(), 0);
    assert_eq!(relay.metrics().connections_total, 32);
}

#[tokio::test]
async fn test_dead_client_is_dropped_and_others_continue() {
    let commander = Arc::new(RecordingCommander::new());
    let relay = relay(commander.clone());
    let (tx, rx) = mpsc::channel(8);
    relay.spawn_fanout(rx);

    let (_, mut rx_a) = relay
        .handle_connect(Principal::new(1, Role::Customer))
        .await
        .unwrap();
    let (_, rx_b) = relay
        .handle_connect(Principal::new(2, Role::Customer))
        .await
        .unwrap();
    let (_, mut rx_c) = relay
        .handle_connect(Principal::new(3, Role::Customer))
        .await
        .unwrap();
    drop(rx_b);

    tx.send(Notification::new("SALES", "ping")).await.unwrap();
    assert_eq!(rx_a.recv().await.unwrap(), "ping");
    assert_eq!(rx_c.recv().await.unwrap(), "ping");

    assert!(
        helpers::eventually(|| {
            relay.connection_count() == 2 && relay.metrics().connections_dropped == 1
        })
        .await
    );
    assert_eq!(commander.stops("SALES"), 0);
}

#[tokio::test]
async fn test_listen_failure_rejects_then_recovers() {
    let commander = Arc::new(RecordingCommander::new());
    commander.fail_on("SALES");
    let relay = relay(commander.clone());

    let err = relay
        .handle_connect(Principal::new(1, Role::Staff))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Listen);
    assert_eq!(relay.connection_count(), 0);

    commander.heal();
    let (_, _rx) = relay
        .handle_connect(Principal::new(1, Role::Staff))
        .await
        .unwrap();
    assert_eq!(commander.starts("SALES"), 1);
    assert_eq!(relay.active_channels().await, vec!["SALES"]);
}

type Command = (ListenEvent, oneshot::Sender<AppResult<()>>);

/// Front of a single task that answers listen commands and also produces
/// notifications, like the Postgres listener task.
#[derive(Debug)]
struct SingleTaskCommander {
    commands: mpsc::Sender<Command>,
}

impl SingleTaskCommander {
    async fn request(&self, event: ListenEvent) -> AppResult<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.commands
            .send((event, ack_tx))
            .await
            .map_err(|_| AppError::listen("listener gone"))?;
        ack_rx
            .await
            .map_err(|_| AppError::listen("listener dropped the command"))?
    }
}

#[async_trait]
impl ListenCommander for SingleTaskCommander {
    async fn start_listening(&self, channel: &str) -> AppResult<()> {
        self.request(ListenEvent::Start(channel.to_string())).await
    }

    async fn stop_listening(&self, channel: &str) -> AppResult<()> {
        self.request(ListenEvent::Stop(channel.to_string())).await
    }
}

/// Once listening, pushes `burst` notifications with a blocking send and
/// only serves commands when it has nothing left to push. Returns the
/// commands it acknowledged.
async fn run_single_task_listener(
    mut commands: mpsc::Receiver<Command>,
    notifications: mpsc::Sender<Notification>,
    burst: usize,
) -> Vec<ListenEvent> {
    let mut events = Vec::new();
    let mut sent = 0;
    let mut listening = false;

    loop {
        if !listening && sent == burst {
            break;
        }
        tokio::select! {
            biased;
            _ = std::future::ready(()), if listening && sent < burst => {
                let payload = format!("order:{sent}:created");
                if notifications.send(Notification::new("SALES", payload)).await.is_err() {
                    break;
                }
                sent += 1;
            }
            command = commands.recv() => match command {
                Some((event, ack)) => {
                    listening = matches!(event, ListenEvent::Start(_));
                    events.push(event);
                    let _ = ack.send(Ok(()));
                }
                None => break,
            },
        }
    }
    events
}

#[tokio::test]
async fn test_overflowing_last_client_does_not_wedge_listener() {
    let (command_tx, command_rx) = mpsc::channel(8);
    let (notify_tx, notify_rx) = mpsc::channel(4);
    let listener = tokio::spawn(run_single_task_listener(command_rx, notify_tx, 64));

    let config = RealtimeConfig {
        channels: vec!["SALES".to_string()],
        connection_buffer_size: 1,
        ..RealtimeConfig::default()
    };
    let relay = RelayService::new(
        config,
        Arc::new(SingleTaskCommander {
            commands: command_tx,
        }),
    );
    let fanout = relay.spawn_fanout(notify_rx);

    // Never read: the second payload overflows it.
    let (_id, _rx) = relay
        .handle_connect(Principal::new(1, Role::Customer))
        .await
        .unwrap();

    let events = tokio::time::timeout(Duration::from_secs(5), listener)
        .await
        .expect("listener and fan-out wedged")
        .unwrap();
    assert_eq!(
        events,
        vec![
            ListenEvent::Start("SALES".into()),
            ListenEvent::Stop("SALES".into()),
        ]
    );
    assert!(
        helpers::eventually(|| {
            relay.connection_count() == 0 && relay.metrics().connections_dropped == 1
        })
        .await
    );

    // The relay still takes new connections afterwards.
    let reconnect = tokio::time::timeout(
        Duration::from_secs(1),
        relay.handle_connect(Principal::new(2, Role::Customer)),
    )
    .await;
    assert!(reconnect.is_ok(), "relay stayed locked after the drop");

    relay.shutdown().await;
    fanout.await.unwrap();
}
