//! Single-producer, single-consumer one-shot reply channel.
//!
//! Transports exactly one value from a `call` handler back to the caller
//! that is blocked waiting for it. Unlike `std::sync::mpsc` or a condvar,
//! the full round trip is a four-state atomic machine with no heap
//! allocation beyond the cell itself, so `receive` can spin instead of
//! parking the thread through the OS scheduler.

// Layer 1: Standard library imports
use std::cell::UnsafeCell;
use std::fmt;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicU8, Ordering};

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
// (none)

const EMPTY: u8 = 0;
const WRITING: u8 = 1;
const READY: u8 = 2;
const CONSUMED: u8 = 3;

/// One-shot reply slot shared between exactly one sender and one receiver.
///
/// # State machine
///
/// ```text
/// Empty --send--> Writing --(store, release)--> Ready --receive--> Consumed
/// ```
///
/// `send` fails (returns `false`) from any state other than `Empty`.
/// `receive` spins while the state is `Empty` or `Writing`, returns the
/// value once `Ready`, and returns `None` forever after once `Consumed`.
pub struct ReplyChannel<T> {
    state: AtomicU8,
    slot: UnsafeCell<MaybeUninit<T>>,
}

// SAFETY: access to `slot` is gated entirely by the atomic state machine --
// at most one thread ever writes (Empty->Writing->Ready) and at most one
// thread ever reads (Ready->Consumed), so `T: Send` is the only requirement
// for moving the channel itself across threads. `Sync` is likewise safe
// because the state machine excludes concurrent readers/writers from ever
// touching the slot at the same time.
unsafe impl<T: Send> Send for ReplyChannel<T> {}
unsafe impl<T: Send> Sync for ReplyChannel<T> {}

impl<T> ReplyChannel<T> {
    /// Construct a fresh, empty channel.
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(EMPTY),
            slot: UnsafeCell::new(MaybeUninit::uninit()),
        }
    }

    /// Attempt to deposit `value`. Returns `true` on success, `false` if the
    /// channel was not `Empty` (already written, already consumed, or a
    /// concurrent `send` won the race).
    pub fn send(&self, value: T) -> bool {
        if self
            .state
            .compare_exchange(EMPTY, WRITING, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return false;
        }
        // SAFETY: this thread won the Empty->Writing transition, so it has
        // exclusive access to the slot until it publishes Ready.
        unsafe {
            (*self.slot.get()).write(value);
        }
        self.state.store(READY, Ordering::Release);
        true
    }

    /// Block (spinning) until a value is available or the channel is
    /// determined to be permanently empty, returning `None` in the latter
    /// case. Safe to call at most once logically -- a second call always
    /// observes `Consumed` and returns `None`.
    pub fn receive(&self) -> Option<T> {
        loop {
            match self.state.load(Ordering::Acquire) {
                READY => {
                    if self
                        .state
                        .compare_exchange(READY, CONSUMED, Ordering::Acquire, Ordering::Relaxed)
                        .is_ok()
                    {
                        // SAFETY: state was Ready, meaning `send` published a
                        // fully initialised value with a Release store we
                        // just synchronised with via the Acquire CAS above.
                        let value = unsafe { (*self.slot.get()).assume_init_read() };
                        return Some(value);
                    }
                    // Lost a race to another receiver; channel is spoken for.
                    return None;
                }
                CONSUMED => return None,
                _ => std::hint::spin_loop(),
            }
        }
    }

    /// Non-blocking variant of [`receive`](Self::receive): returns `None`
    /// immediately if the value is not yet `Ready` instead of spinning.
    pub fn try_receive(&self) -> Option<T> {
        if self.state.load(Ordering::Acquire) != READY {
            return None;
        }
        if self
            .state
            .compare_exchange(READY, CONSUMED, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
        {
            let value = unsafe { (*self.slot.get()).assume_init_read() };
            return Some(value);
        }
        None
    }

    /// True if a value has been written and not yet consumed.
    pub fn is_ready(&self) -> bool {
        self.state.load(Ordering::Acquire) == READY
    }

    /// True if the value has already been taken by `receive`/`try_receive`.
    pub fn is_consumed(&self) -> bool {
        self.state.load(Ordering::Acquire) == CONSUMED
    }

    /// True if no value has been written yet.
    pub fn is_empty(&self) -> bool {
        self.state.load(Ordering::Acquire) == EMPTY
    }
}

impl<T> Default for ReplyChannel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for ReplyChannel<T> {
    fn drop(&mut self) {
        // A written-but-unconsumed payload (state Ready, e.g. the caller gave
        // up and dropped its Arc before calling receive) must still be
        // dropped in place rather than leaked.
        if *self.state.get_mut() == READY {
            unsafe {
                (*self.slot.get()).assume_init_drop();
            }
        }
    }
}

impl<T> fmt::Debug for ReplyChannel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.state.load(Ordering::Relaxed) {
            EMPTY => "Empty",
            WRITING => "Writing",
            READY => "Ready",
            CONSUMED => "Consumed",
            _ => "Unknown",
        };
        f.debug_struct("ReplyChannel").field("state", &state).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn send_then_receive_roundtrips() {
        let channel = ReplyChannel::new();
        assert!(channel.is_empty());
        assert!(channel.send(42));
        assert!(channel.is_ready());
        assert_eq!(channel.receive(), Some(42));
        assert!(channel.is_consumed());
    }

    #[test]
    fn second_send_fails() {
        let channel = ReplyChannel::new();
        assert!(channel.send(1));
        assert!(!channel.send(2));
        assert_eq!(channel.receive(), Some(1));
    }

    #[test]
    fn receive_after_consumed_returns_none() {
        let channel = ReplyChannel::new();
        channel.send("hello");
        assert_eq!(channel.receive(), Some("hello"));
        assert_eq!(channel.receive(), None);
    }

    #[test]
    fn try_receive_non_blocking() {
        let channel: ReplyChannel<u32> = ReplyChannel::new();
        assert_eq!(channel.try_receive(), None);
        channel.send(7);
        assert_eq!(channel.try_receive(), Some(7));
        assert_eq!(channel.try_receive(), None);
    }

    #[test]
    fn dropping_unconsumed_value_does_not_leak_or_panic() {
        let channel = ReplyChannel::new();
        assert!(channel.send(Box::new(5_i32)));
        drop(channel);
    }

    #[test]
    fn exactly_one_of_two_concurrent_receivers_wins() {
        let channel = Arc::new(ReplyChannel::new());
        channel.send(99);

        let c1 = Arc::clone(&channel);
        let c2 = Arc::clone(&channel);
        let h1 = thread::spawn(move || c1.receive());
        let h2 = thread::spawn(move || c2.receive());

        let r1 = h1.join().unwrap_or(None);
        let r2 = h2.join().unwrap_or(None);

        let results = [r1, r2];
        assert_eq!(results.iter().filter(|r| r.is_some()).count(), 1);
        assert_eq!(results.iter().flatten().next(), Some(&99));
    }

    #[test]
    fn exactly_one_of_two_concurrent_senders_wins() {
        let channel: Arc<ReplyChannel<u32>> = Arc::new(ReplyChannel::new());
        let c1 = Arc::clone(&channel);
        let c2 = Arc::clone(&channel);

        let h1 = thread::spawn(move || c1.send(1));
        let h2 = thread::spawn(move || c2.send(2));

        let ok1 = h1.join().unwrap_or(false);
        let ok2 = h2.join().unwrap_or(false);
        assert_ne!(ok1, ok2);
    }
}
