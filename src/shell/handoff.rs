use std::fmt;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// The channel has shut down; no further lines will cross it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandoffClosed;

impl fmt::Display for HandoffClosed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handoff channel is closed")
    }
}

impl std::error::Error for HandoffClosed {}

#[derive(Default)]
struct Slot {
    /// The single in-flight command line. Moved, never shared: exactly one
    /// side owns it at any moment.
    line: Option<String>,
    /// Taken by the executor but not yet released back to the reader.
    in_flight: bool,
    /// Set once; both loops recheck it after every wake.
    closed: bool,
}

/// Single-slot mailbox enforcing strict alternation between one producer
/// and one consumer.
///
/// The reader deposits a line and stays blocked until the executor has
/// fully handled it and released the slot, so line N is processed before
/// line N+1 is ever read. Both condition variables wait on predicates
/// over the same locked state, so a signal sent before the matching wait
/// cannot be lost.
pub struct Handoff {
    slot: Mutex<Slot>,
    line_ready: Condvar,
    line_consumed: Condvar,
}

impl Handoff {
    pub fn new() -> Self {
        Handoff {
            slot: Mutex::new(Slot::default()),
            line_ready: Condvar::new(),
            line_consumed: Condvar::new(),
        }
    }

    /// Hands a line to the consumer and blocks until the consumer has
    /// released the slot. Fails once the channel is closed, including a
    /// close that happens while this call is waiting.
    pub fn deposit(&self, line: String) -> Result<(), HandoffClosed> {
        let mut slot = self.lock();

        while (slot.line.is_some() || slot.in_flight) && !slot.closed {
            slot = self.wait_consumed(slot);
        }
        if slot.closed {
            return Err(HandoffClosed);
        }

        slot.line = Some(line);
        self.line_ready.notify_one();

        while (slot.line.is_some() || slot.in_flight) && !slot.closed {
            slot = self.wait_consumed(slot);
        }
        if slot.closed {
            return Err(HandoffClosed);
        }
        Ok(())
    }

    /// Blocks until a line is available, marking it in flight. `None`
    /// means the channel closed with nothing left to drain; a line
    /// deposited before the close is still returned.
    pub fn collect(&self) -> Option<String> {
        let mut slot = self.lock();

        while slot.line.is_none() && !slot.closed {
            slot = self.wait_ready(slot);
        }

        let line = slot.line.take();
        if line.is_some() {
            slot.in_flight = true;
        }
        line
    }

    /// Releases the slot back to the producer. Called only after the
    /// collected line is fully handled, which is what gives the strict
    /// no-pipelining ordering.
    pub fn release(&self) {
        let mut slot = self.lock();
        slot.in_flight = false;
        self.line_consumed.notify_one();
    }

    /// Shuts the channel down. Idempotent; wakes both sides so neither is
    /// left blocked on a wait that can no longer be satisfied.
    pub fn close(&self) {
        let mut slot = self.lock();
        slot.closed = true;
        self.line_ready.notify_all();
        self.line_consumed.notify_all();
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait_ready<'a>(&self, slot: MutexGuard<'a, Slot>) -> MutexGuard<'a, Slot> {
        self.line_ready
            .wait(slot)
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn wait_consumed<'a>(&self, slot: MutexGuard<'a, Slot>) -> MutexGuard<'a, Slot> {
        self.line_consumed
            .wait(slot)
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Handoff {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_lines_arrive_in_order() {
        let handoff = Arc::new(Handoff::new());

        let consumer = {
            let handoff = Arc::clone(&handoff);
            thread::spawn(move || {
                let mut seen = Vec::new();
                while let Some(line) = handoff.collect() {
                    seen.push(line);
                    handoff.release();
                }
                seen
            })
        };

        for line in ["one", "two", "three"] {
            handoff.deposit(line.to_string()).unwrap();
        }
        handoff.close();

        assert_eq!(consumer.join().unwrap(), vec!["one", "two", "three"]);
    }

    #[test]
    fn test_deposit_blocks_until_release() {
        let handoff = Arc::new(Handoff::new());
        let deposited = Arc::new(AtomicBool::new(false));

        let producer = {
            let handoff = Arc::clone(&handoff);
            let deposited = Arc::clone(&deposited);
            thread::spawn(move || {
                handoff.deposit("held".to_string()).unwrap();
                deposited.store(true, Ordering::SeqCst);
            })
        };

        let line = handoff.collect();
        assert_eq!(line.as_deref(), Some("held"));
        // The slot has not been released, so the producer must still be
        // inside deposit regardless of scheduling.
        assert!(!deposited.load(Ordering::SeqCst));

        handoff.release();
        producer.join().unwrap();
        assert!(deposited.load(Ordering::SeqCst));
    }

    #[test]
    fn test_close_wakes_blocked_collector() {
        let handoff = Arc::new(Handoff::new());

        let consumer = {
            let handoff = Arc::clone(&handoff);
            thread::spawn(move || handoff.collect())
        };

        thread::sleep(Duration::from_millis(50));
        handoff.close();
        assert_eq!(consumer.join().unwrap(), None);
    }

    #[test]
    fn test_deposit_after_close_fails() {
        let handoff = Handoff::new();
        handoff.close();
        assert_eq!(handoff.deposit("late".to_string()), Err(HandoffClosed));
    }

    #[test]
    fn test_close_is_idempotent() {
        let handoff = Handoff::new();
        handoff.close();
        handoff.close();
        assert_eq!(handoff.collect(), None);
    }

    #[test]
    fn test_consumer_close_unblocks_producer() {
        // The exit-command path: the consumer takes the line, then closes
        // instead of releasing. The producer must wake with an error and
        // the line must not be lost.
        let handoff = Arc::new(Handoff::new());

        let consumer = {
            let handoff = Arc::clone(&handoff);
            thread::spawn(move || {
                let line = handoff.collect();
                handoff.close();
                line
            })
        };

        let result = handoff.deposit("exit".to_string());
        assert_eq!(result, Err(HandoffClosed));
        assert_eq!(consumer.join().unwrap().as_deref(), Some("exit"));
    }
}
