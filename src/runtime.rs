use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent};

use crate::effects::NetworkEvent;

/// Everything the app loop reacts to
#[derive(Debug)]
pub enum JudgeEvent {
    Key(KeyEvent),
    Paste(String),
    FocusGained,
    FocusLost,
    Resize,
    Tick,
    /// Completion of work started by the effect executor
    Network(NetworkEvent),
}

pub type EventSender = Sender<JudgeEvent>;

/// Source of application events (terminal input and network completions)
pub trait JudgeEventSource: Send + 'static {
    /// Waits at most `timeout` for the next queued event.
    fn recv_timeout(&self, timeout: Duration) -> Result<JudgeEvent, RecvTimeoutError>;

    /// Handle for background work to post events into this source.
    fn sender(&self) -> EventSender;
}

/// Reads the terminal on a background thread
pub struct CrosstermEventSource {
    rx: Receiver<JudgeEvent>,
    tx: EventSender,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let input_tx = tx.clone();

        std::thread::spawn(move || loop {
            let ev = match event::read() {
                Ok(CtEvent::Key(key)) => JudgeEvent::Key(key),
                Ok(CtEvent::Paste(text)) => JudgeEvent::Paste(text),
                Ok(CtEvent::FocusGained) => JudgeEvent::FocusGained,
                Ok(CtEvent::FocusLost) => JudgeEvent::FocusLost,
                Ok(CtEvent::Resize(_, _)) => JudgeEvent::Resize,
                Ok(_) => continue,
                Err(err) => {
                    tracing::error!(error = %err, "terminal input reader stopped");
                    break;
                }
            };
            if input_tx.send(ev).is_err() {
                break;
            }
        });

        Self { rx, tx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl JudgeEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<JudgeEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    fn sender(&self) -> EventSender {
        self.tx.clone()
    }
}

/// How long the loop waits for input before ticking
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Constant tick period
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Scripted event source for headless runs
pub struct TestEventSource {
    rx: Receiver<JudgeEvent>,
    tx: EventSender,
}

impl TestEventSource {
    /// Returns the source and a sender that scripts its events.
    pub fn new() -> (Self, EventSender) {
        let (tx, rx) = mpsc::channel();
        (Self { rx, tx: tx.clone() }, tx)
    }
}

impl JudgeEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<JudgeEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    fn sender(&self) -> EventSender {
        self.tx.clone()
    }
}

/// Hands the app loop one event per step
pub struct Runner<E: JudgeEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: JudgeEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    pub fn sender(&self) -> EventSender {
        self.event_source.sender()
    }

    /// Next queued event, or `Tick` when the interval passes with nothing queued
    pub fn step(&self) -> JudgeEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => JudgeEvent::Tick,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_returns_tick_on_timeout() {
        let (es, _tx) = TestEventSource::new();
        let ticker = FixedTicker::new(Duration::from_millis(1));
        let runner = Runner::new(es, ticker);

        let ev = runner.step();
        match ev {
            JudgeEvent::Tick => {}
            _ => panic!("expected Tick on timeout"),
        }
    }

    #[test]
    fn step_passes_through_events() {
        let (es, tx) = TestEventSource::new();
        tx.send(JudgeEvent::FocusLost).unwrap();
        let ticker = FixedTicker::new(Duration::from_millis(10));
        let runner = Runner::new(es, ticker);

        match runner.step() {
            JudgeEvent::FocusLost => {}
            _ => panic!("expected FocusLost event"),
        }
    }

    #[test]
    fn runner_sender_feeds_the_same_queue() {
        let (es, _tx) = TestEventSource::new();
        let runner = Runner::new(es, FixedTicker::new(Duration::from_millis(10)));
        runner
            .sender()
            .send(JudgeEvent::Paste("x".into()))
            .unwrap();

        match runner.step() {
            JudgeEvent::Paste(text) => assert_eq!(text, "x"),
            _ => panic!("expected Paste event"),
        }
    }
}
