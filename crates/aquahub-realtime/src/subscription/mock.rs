//! Recording [`ListenCommander`] for tests.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

use aquahub_core::error::AppError;
use aquahub_core::result::AppResult;
use aquahub_core::traits::ListenCommander;

/// A command observed by [`RecordingCommander`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenEvent {
    Start(String),
    Stop(String),
}

/// Records every successful command. Starts and stops can be made to fail
/// per channel, and stops can be held back until released.
#[derive(Debug)]
pub struct RecordingCommander {
    events: Mutex<Vec<ListenEvent>>,
    failing_starts: Mutex<HashSet<String>>,
    failing_stops: Mutex<HashSet<String>>,
    stops_held: watch::Sender<bool>,
    delay: Option<Duration>,
}

impl Default for RecordingCommander {
    fn default() -> Self {
        Self {
            events: Mutex::default(),
            failing_starts: Mutex::default(),
            failing_stops: Mutex::default(),
            stops_held: watch::Sender::new(false),
            delay: None,
        }
    }
}

impl RecordingCommander {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleeps before acknowledging each command, widening race windows.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    /// Make `start_listening(channel)` fail until [`Self::heal`] is called.
    pub fn fail_on(&self, channel: &str) {
        lock(&self.failing_starts).insert(channel.to_string());
    }

    /// Make `stop_listening(channel)` fail until [`Self::heal`] is called.
    pub fn fail_stop_on(&self, channel: &str) {
        lock(&self.failing_stops).insert(channel.to_string());
    }

    pub fn heal(&self) {
        lock(&self.failing_starts).clear();
        lock(&self.failing_stops).clear();
    }

    /// Block every `stop_listening` call until [`Self::release_stops`].
    pub fn hold_stops(&self) {
        self.stops_held.send_replace(true);
    }

    pub fn release_stops(&self) {
        self.stops_held.send_replace(false);
    }

    pub fn events(&self) -> Vec<ListenEvent> {
        lock(&self.events).clone()
    }

    pub fn starts(&self, channel: &str) -> usize {
        self.count(|e| matches!(e, ListenEvent::Start(c) if c == channel))
    }

    pub fn stops(&self, channel: &str) -> usize {
        self.count(|e| matches!(e, ListenEvent::Stop(c) if c == channel))
    }

    fn count(&self, pred: impl Fn(&ListenEvent) -> bool) -> usize {
        lock(&self.events).iter().filter(|e| pred(e)).count()
    }

    fn record(&self, event: ListenEvent) {
        lock(&self.events).push(event);
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl ListenCommander for RecordingCommander {
    async fn start_listening(&self, channel: &str) -> AppResult<()> {
        self.pause().await;
        if lock(&self.failing_starts).contains(channel) {
            return Err(AppError::listen(format!("LISTEN {channel} refused")));
        }
        self.record(ListenEvent::Start(channel.to_string()));
        Ok(())
    }

    async fn stop_listening(&self, channel: &str) -> AppResult<()> {
        self.pause().await;
        let mut held = self.stops_held.subscribe();
        // The sender lives in `self`, so this only ends on release.
        let _ = held.wait_for(|held| !*held).await;

        if lock(&self.failing_stops).contains(channel) {
            return Err(AppError::listen(format!("UNLISTEN {channel} refused")));
        }
        self.record(ListenEvent::Stop(channel.to_string()));
        Ok(())
    }
}
