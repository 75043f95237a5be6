//! Clock

use jiff::Timestamp;
use mockall::automock;

/// Source of the current time for order numbers and delivery stamps.
#[automock]
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}
