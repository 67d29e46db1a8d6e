//! Fixed-size trailing window over a stream of observations.
//!
//! Keeps the last `capacity` values in a bounded queue with a running sum of
//! the finite ones. A window that holds any non-finite value reports `None`,
//! so a NaN poisons every window it falls into and nothing after it.

use std::collections::VecDeque;

use crate::stats;

#[derive(Debug, Clone)]
pub struct RollingWindow {
    capacity: usize,
    values: VecDeque<f64>,
    sum: f64,
    non_finite: usize,
}

impl RollingWindow {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 1, "window capacity must be >= 1");
        Self {
            capacity,
            values: VecDeque::with_capacity(capacity + 1),
            sum: 0.0,
            non_finite: 0,
        }
    }

    /// Push a value, evicting the oldest once the window is full.
    pub fn push(&mut self, value: f64) {
        self.values.push_back(value);
        self.add(value);
        if self.values.len() > self.capacity {
            if let Some(leaving) = self.values.pop_front() {
                self.remove(leaving);
            }
        }
    }

    fn add(&mut self, value: f64) {
        if value.is_finite() {
            self.sum += value;
        } else {
            self.non_finite += 1;
        }
    }

    fn remove(&mut self, value: f64) {
        if value.is_finite() {
            self.sum -= value;
        } else {
            self.non_finite -= 1;
        }
    }

    pub fn is_full(&self) -> bool {
        self.values.len() == self.capacity
    }

    fn is_usable(&self) -> bool {
        self.is_full() && self.non_finite == 0
    }

    /// Mean of a full, all-finite window.
    pub fn mean(&self) -> Option<f64> {
        if !self.is_usable() {
            return None;
        }
        stats::finite(self.sum / self.capacity as f64)
    }

    /// Sample standard deviation of a full, all-finite window.
    pub fn sample_std(&self) -> Option<f64> {
        if !self.is_usable() {
            return None;
        }
        let (front, back) = self.values.as_slices();
        if back.is_empty() {
            return stats::sample_std(front).and_then(stats::finite);
        }
        let contiguous: Vec<f64> = self.values.iter().copied().collect();
        stats::sample_std(&contiguous).and_then(stats::finite)
    }
}
