use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Monotonic millisecond clock used for idle ages and cache windows.
pub trait Clock {
    fn now_millis(&self) -> u64;
}

/// Wall-clock backed monotonic time, measured from construction.
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_millis(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Hand-driven clock. Clones share the same reading, so a harness can keep
/// one copy and give another to the manager.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new(start_millis: u64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_millis)),
        }
    }

    pub fn set(&self, millis: u64) {
        self.now.set(millis);
    }

    pub fn advance(&self, millis: u64) {
        self.now.set(self.now.get() + millis);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.now.get()
    }
}
