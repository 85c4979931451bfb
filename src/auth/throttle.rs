use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Gate in front of the login endpoint. `check` records an attempt and
/// answers whether it may proceed; `cleanup` drops state for windows
/// that have already elapsed.
///
/// Behind a trait so the in-memory map could be swapped for a shared
/// store without touching the login path.
pub trait ThrottleGate: Send + Sync {
    fn check(&self, identifier: &str) -> bool;
    fn cleanup(&self);
}

struct WindowSlot {
    count: u32,
    reset_at: Instant,
}

/// Fixed-window counter keyed by client identifier.
///
/// The window starts at the first attempt after a reset, so a burst
/// straddling two adjacent windows can reach twice `max_attempts`.
/// Acceptable for login throttling and kept for its simplicity.
pub struct FixedWindowThrottle {
    max_attempts: u32,
    window: Duration,
    slots: Mutex<HashMap<String, WindowSlot>>,
}

impl FixedWindowThrottle {
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        Self {
            max_attempts,
            window,
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn check_at(&self, identifier: &str, now: Instant) -> bool {
        let mut slots = self.slots.lock();
        match slots.get_mut(identifier) {
            Some(slot) => {
                if now > slot.reset_at {
                    slot.count = 0;
                    slot.reset_at = now + self.window;
                }
                if slot.count >= self.max_attempts {
                    return false;
                }
                slot.count += 1;
                true
            }
            None => {
                if self.max_attempts == 0 {
                    return false;
                }
                slots.insert(
                    identifier.to_owned(),
                    WindowSlot {
                        count: 1,
                        reset_at: now + self.window,
                    },
                );
                true
            }
        }
    }

    fn cleanup_at(&self, now: Instant) {
        self.slots.lock().retain(|_, slot| now <= slot.reset_at);
    }
}

impl ThrottleGate for FixedWindowThrottle {
    fn check(&self, identifier: &str) -> bool {
        self.check_at(identifier, Instant::now())
    }

    fn cleanup(&self) {
        self.cleanup_at(Instant::now());
    }
}
