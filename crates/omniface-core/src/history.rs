//! Fixed-capacity sliding window used for the fps/latency charts.

use std::collections::VecDeque;

/// Default number of samples kept per history.
pub const HISTORY_LEN: usize = 60;

/// FIFO window of the most recent samples; the oldest sample is evicted
/// once `capacity` is reached.
#[derive(Debug, Clone, PartialEq)]
pub struct History {
    values: VecDeque<f64>,
    capacity: usize,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, value: f64) {
        while self.values.len() >= self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn last(&self) -> Option<f64> {
        self.values.back().copied()
    }

    /// Samples in arrival order, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.iter().collect()
    }

    /// Arithmetic mean, 0.0 when empty.
    pub fn mean(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(HISTORY_LEN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_keeps_most_recent() {
        let mut h = History::default();
        for i in 0..75 {
            h.push(i as f64);
        }
        assert_eq!(h.len(), HISTORY_LEN);
        let expected: Vec<f64> = (15..75).map(|i| i as f64).collect();
        assert_eq!(h.to_vec(), expected);
        assert_eq!(h.last(), Some(74.0));
    }

    #[test]
    fn test_history_under_capacity() {
        let mut h = History::new(3);
        h.push(1.0);
        h.push(2.0);
        assert_eq!(h.to_vec(), vec![1.0, 2.0]);
        assert!((h.mean() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_history_zero_capacity_clamped() {
        let mut h = History::new(0);
        h.push(1.0);
        h.push(2.0);
        assert_eq!(h.to_vec(), vec![2.0]);
    }

    #[test]
    fn test_history_empty_mean() {
        assert_eq!(History::default().mean(), 0.0);
    }
}
