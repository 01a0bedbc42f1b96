use std::time::Duration;

use parking_lot::{Condvar, Mutex};

/// One-shot cancellation signal for the acquisition thread.
///
/// Unlike a bare flag, a waiter blocked in `wait_timeout` wakes as soon as
/// the signal is raised.
#[derive(Debug, Default)]
pub(crate) struct StopSignal {
    raised: Mutex<bool>,
    wake: Condvar,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        *self.raised.lock() = true;
        self.wake.notify_all();
    }

    pub fn is_raised(&self) -> bool {
        *self.raised.lock()
    }

    /// Sleep for up to `timeout`. Returns whether the signal is raised.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let mut raised = self.raised.lock();
        if !*raised {
            self.wake.wait_for(&mut raised, timeout);
        }
        *raised
    }
}
