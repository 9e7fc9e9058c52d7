use std::thread;
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use tracing::debug;

/// Wall-clock local time; the schedule is expressed in it.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Blocks the calling thread. One-shot dry runs skip the settle delays.
pub struct ThreadSleeper {
    skip: bool,
}

impl ThreadSleeper {
    pub fn new(skip: bool) -> Self {
        Self { skip }
    }
}

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        if self.skip {
            debug!("dry-run: skip wait of {}s", duration.as_secs());
            return;
        }
        thread::sleep(duration);
    }
}
