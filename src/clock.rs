/*
 *  clock.rs
 *
 *  spectrum-bars - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Millisecond time sources and the interval gate driving bar fall-down
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Millisecond wall clock, the `millis()` of the board.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

/// Milliseconds since construction, backed by `Instant`.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Hand-driven clock. Clones share the same time, so a test can keep one
/// handle and advance the clock a renderer or engine owns.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self { now: Arc::new(AtomicU64::new(start_ms)) }
    }

    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, ms: u64) {
        self.now.store(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Opens at most once per interval.
///
/// Polling re-arms the gate from the time it was observed open, so a late
/// poll never produces a burst of catch-up openings.
#[derive(Debug, Clone)]
pub struct IntervalGate {
    interval_ms: u64,
    next_ms: u64,
}

impl IntervalGate {
    pub fn new(interval_ms: u32) -> Self {
        Self { interval_ms: interval_ms as u64, next_ms: 0 }
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms as u32
    }

    /// Takes effect from the next re-arm; the pending deadline is kept.
    #[inline]
    pub fn set_interval_ms(&mut self, interval_ms: u32) {
        self.interval_ms = interval_ms as u64;
    }

    /// First opening happens one full interval after `now_ms`.
    pub fn arm(&mut self, now_ms: u64) {
        self.next_ms = now_ms.saturating_add(self.interval_ms);
    }

    /// Returns true if the gate is open; if true, it also schedules the next deadline.
    #[inline]
    pub fn poll(&mut self, now_ms: u64) -> bool {
        if now_ms >= self.next_ms {
            self.next_ms = now_ms.saturating_add(self.interval_ms);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::new(10);
        let handle = clock.clone();
        handle.advance(15);
        assert_eq!(clock.now_ms(), 25);
        handle.set(3);
        assert_eq!(clock.now_ms(), 3);
    }

    #[test]
    fn test_gate_opens_once_per_interval() {
        let mut gate = IntervalGate::new(50);
        gate.arm(0);
        assert!(!gate.poll(0));
        assert!(!gate.poll(49));
        assert!(gate.poll(50));
        assert!(!gate.poll(60));
        assert!(!gate.poll(99));
        assert!(gate.poll(100));
    }

    #[test]
    fn test_gate_rearms_from_observed_time() {
        let mut gate = IntervalGate::new(50);
        gate.arm(0);
        assert!(gate.poll(500));
        assert!(!gate.poll(501));
        assert!(gate.poll(550));
    }

    #[test]
    fn test_zero_interval_always_open() {
        let mut gate = IntervalGate::new(0);
        gate.arm(7);
        assert!(gate.poll(7));
        assert!(gate.poll(7));
    }

    #[test]
    fn test_monotonic_clock_does_not_go_backwards() {
        let clock = MonotonicClock::new();
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(b >= a);
    }
}
