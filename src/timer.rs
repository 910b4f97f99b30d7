//! Countdowns and scoped browser timers.

use serde::{Deserialize, Serialize};

/// What a single tick did to a countdown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
    Running(u32),
    Expired,
}

/// A whole-second countdown. Knows nothing about real time; whoever owns it calls `tick` once a
/// second.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    total: u32,
    remaining: u32,
}

impl Countdown {
    pub fn new(total: u32) -> Self {
        Self {
            total,
            remaining: total,
        }
    }

    pub fn tick(&mut self) -> Tick {
        if self.remaining <= 1 {
            self.remaining = 0;
            return Tick::Expired;
        }
        self.remaining -= 1;
        Tick::Running(self.remaining)
    }

    pub fn reset(&mut self) {
        self.remaining = self.total;
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn is_expired(&self) -> bool {
        self.remaining == 0
    }

    /// Share of the time left, from 1.0 down to 0.0. For progress bars.
    pub fn fraction_left(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        f64::from(self.remaining) / f64::from(self.total)
    }
}

#[cfg(feature = "hydrate")]
mod scoped {
    use gloo_timers::callback::{Interval, Timeout};
    use leptos::prelude::*;

    /// An interval owned by the current reactive scope. Restarting replaces the old interval, and
    /// the interval is cancelled when the scope is cleaned up.
    #[derive(Clone, Copy)]
    pub struct ScopedInterval {
        handle: StoredValue<Option<Interval>, LocalStorage>,
    }

    impl ScopedInterval {
        pub fn new() -> Self {
            let handle = StoredValue::new_local(None);
            on_cleanup(move || {
                handle.try_update_value(|interval| *interval = None);
            });
            Self { handle }
        }

        pub fn start(&self, millis: u32, callback: impl FnMut() + 'static) {
            self.handle
                .try_update_value(|interval| *interval = Some(Interval::new(millis, callback)));
        }

        pub fn stop(&self) {
            self.handle.try_update_value(|interval| *interval = None);
        }
    }

    impl Default for ScopedInterval {
        fn default() -> Self {
            Self::new()
        }
    }

    /// A one-shot timer with the same ownership rules as `ScopedInterval`.
    #[derive(Clone, Copy)]
    pub struct ScopedTimeout {
        handle: StoredValue<Option<Timeout>, LocalStorage>,
    }

    impl ScopedTimeout {
        pub fn new() -> Self {
            let handle = StoredValue::new_local(None);
            on_cleanup(move || {
                handle.try_update_value(|timeout| *timeout = None);
            });
            Self { handle }
        }

        pub fn start(&self, millis: u32, callback: impl FnOnce() + 'static) {
            self.handle
                .try_update_value(|timeout| *timeout = Some(Timeout::new(millis, callback)));
        }

        pub fn cancel(&self) {
            self.handle.try_update_value(|timeout| *timeout = None);
        }
    }

    impl Default for ScopedTimeout {
        fn default() -> Self {
            Self::new()
        }
    }
}

#[cfg(feature = "hydrate")]
pub use scoped::{ScopedInterval, ScopedTimeout};
