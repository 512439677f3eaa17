//! Frame timing.
//!
//! A [`Ticker`] drives a skin at a fixed interval: every tick advances the
//! separator blink and produces a fresh frame.

use std::time::Duration;

use chrono::{NaiveDateTime, TimeDelta};
use log::trace;

use clockface_core::resource::ResourceRef;

use crate::skin::Skin;

#[derive(Debug, Clone)]
pub struct Ticker {
    interval: Duration,
    ticks: u64,
}

impl Ticker {
    pub fn new(interval: Duration) -> Self {
        Self { interval, ticks: 0 }
    }

    /// Creates a ticker from an interval in milliseconds.
    pub fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of ticks processed so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Advances the separator blink, then builds the frame for `time`.
    pub fn tick(&mut self, skin: &mut Skin, time: &NaiveDateTime) -> ResourceRef {
        skin.animate_separator();
        self.ticks += 1;
        trace!(tick = self.ticks, time:% = time; "Tick");
        skin.process(time)
    }

    /// Instants of `count` ticks, the first at `start`.
    pub fn schedule(
        &self,
        start: NaiveDateTime,
        count: usize,
    ) -> impl Iterator<Item = NaiveDateTime> + use<> {
        let step = TimeDelta::from_std(self.interval).unwrap_or(TimeDelta::zero());
        (0..count).scan(start, move |time, _| {
            let current = *time;
            *time = time.checked_add_signed(step).unwrap_or(current);
            Some(current)
        })
    }
}

impl Default for Ticker {
    fn default() -> Self {
        Self::from_millis(500)
    }
}
