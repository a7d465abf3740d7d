// Copyright (c) 2026 hushcore contributors
// SPDX-License-Identifier: GPL-3.0-only

//! Progress reporting for the bit loop.
//!
//! Purely observational: the sink sees throttled snapshots of the bit
//! counters and can never influence control flow. Each embed/extract call
//! owns its own sink; nothing is shared across invocations.

use std::time::{Duration, Instant};

/// Snapshot of bit-channel progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressReport {
    /// Payload bits written or read so far.
    pub bits_used: u64,
    /// Carrier bits that actually flipped (encode only).
    pub bits_changed: u64,
    /// Total bit capacity of the carrier for the active parameters.
    pub capacity_bits: u64,
}

/// Receiver for progress snapshots.
pub trait ProgressSink {
    fn report(&mut self, progress: ProgressReport);
}

/// Sink that discards all reports.
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _progress: ProgressReport) {}
}

impl<F: FnMut(ProgressReport)> ProgressSink for F {
    fn report(&mut self, progress: ProgressReport) {
        self(progress)
    }
}

/// Rate limiter for progress reports, roughly one per 100 ms.
pub(crate) struct Throttle {
    interval: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub(crate) fn new() -> Self {
        Self::with_interval(Duration::from_millis(100))
    }

    pub(crate) fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// True when enough wall clock has passed since the last accepted call.
    /// The first call always passes.
    pub(crate) fn ready(&mut self) -> bool {
        let now = Instant::now();
        match self.last {
            Some(t) if now.duration_since(t) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}
