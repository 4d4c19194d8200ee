//! Drives a [`Countdown`] from a tokio interval.
//!
//! Each running window owns one ticker task and one `CancellationToken`.
//! Every transition out of running cancels the token while holding the
//! countdown lock, and the ticker re-checks the token under that same lock,
//! so no tick can land after `pause()` or `stop()` returns.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tokio_util::sync::CancellationToken;

use super::countdown::{Countdown, TimerState};
use crate::events::Event;

/// Called once each time a countdown reaches zero.
pub type CompletionHook = Arc<dyn Fn() + Send + Sync>;

struct Ticker {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl Ticker {
    fn cancel(self) {
        self.token.cancel();
        // The task exits on its own once it observes the token.
        drop(self.handle);
    }
}

pub struct TimerDriver {
    countdown: Arc<Mutex<Countdown>>,
    ticker: Option<Ticker>,
    tick_interval: Duration,
    events: Option<mpsc::UnboundedSender<Event>>,
    on_complete: Option<CompletionHook>,
}

impl TimerDriver {
    /// Tick cadence equals the countdown's quantum.
    pub fn new(countdown: Countdown) -> Self {
        let tick_interval = Duration::from_millis(countdown.quantum_ms());
        Self {
            countdown: Arc::new(Mutex::new(countdown)),
            ticker: None,
            tick_interval,
            events: None,
            on_complete: None,
        }
    }

    pub fn on_complete(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_complete = Some(Arc::new(hook));
        self
    }

    /// Receive every event the countdown produces from now on.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<Event> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.events = Some(tx);
        rx
    }

    pub async fn state(&self) -> TimerState {
        self.countdown.lock().await.state()
    }

    pub async fn remaining_ms(&self) -> u64 {
        self.countdown.lock().await.remaining_ms()
    }

    pub async fn start(&mut self, duration_ms: Option<u64>) -> Event {
        let countdown = self.countdown.clone();
        let mut guard = countdown.lock().await;
        self.cancel_ticker();
        let event = guard.start(duration_ms);
        self.emit(event.clone());
        self.spawn_ticker();
        event
    }

    pub async fn pause(&mut self) -> Option<Event> {
        let countdown = self.countdown.clone();
        let mut guard = countdown.lock().await;
        self.cancel_ticker();
        let event = guard.pause();
        if let Some(e) = &event {
            self.emit(e.clone());
        }
        event
    }

    pub async fn resume(&mut self) -> Option<Event> {
        let countdown = self.countdown.clone();
        let mut guard = countdown.lock().await;
        let event = guard.resume()?;
        self.cancel_ticker();
        self.emit(event.clone());
        self.spawn_ticker();
        Some(event)
    }

    pub async fn stop(&mut self) -> Option<Event> {
        let countdown = self.countdown.clone();
        let mut guard = countdown.lock().await;
        self.cancel_ticker();
        let event = guard.stop();
        if let Some(e) = &event {
            self.emit(e.clone());
        }
        event
    }

    fn cancel_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.cancel();
        }
    }

    fn emit(&self, event: Event) {
        if let Some(tx) = &self.events {
            // A dropped receiver just means nobody is listening.
            let _ = tx.send(event);
        }
    }

    fn spawn_ticker(&mut self) {
        let token = CancellationToken::new();
        let countdown = self.countdown.clone();
        let events = self.events.clone();
        let on_complete = self.on_complete.clone();
        let period = self.tick_interval;
        let task_token = token.clone();

        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            loop {
                tokio::select! {
                    _ = task_token.cancelled() => break,
                    _ = interval.tick() => {}
                }

                let event = {
                    let mut guard = countdown.lock().await;
                    if task_token.is_cancelled() {
                        break;
                    }
                    guard.tick()
                };

                let Some(event) = event else { break };
                let completed = matches!(event, Event::TimerCompleted { .. });
                if let Some(tx) = &events {
                    let _ = tx.send(event);
                }
                if completed {
                    tracing::debug!("countdown reached zero");
                    if let Some(hook) = &on_complete {
                        hook();
                    }
                    break;
                }
            }
        });

        self.ticker = Some(Ticker { token, handle });
    }
}

impl Drop for TimerDriver {
    fn drop(&mut self) {
        self.cancel_ticker();
    }
}
