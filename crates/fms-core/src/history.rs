//! Three-sample coupling history used to detect coupling maxima.

use serde::{Deserialize, Serialize};

/// Newest-first window over the last three coupling magnitudes.
///
/// Unfilled slots read as zero, so the first sample pushed into an empty
/// window always counts as rising.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CouplingWindow {
    samples: [f64; 3],
}

impl CouplingWindow {
    /// Creates an empty (all-zero) window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rotates the window and stores `value` as the newest sample.
    pub fn push(&mut self, value: f64) {
        self.samples.rotate_right(1);
        self.samples[0] = value;
    }

    /// Newest sample.
    pub fn newest(&self) -> f64 {
        self.samples[0]
    }

    /// Sample pushed immediately before the newest one.
    pub fn previous(&self) -> f64 {
        self.samples[1]
    }

    /// Oldest retained sample.
    pub fn oldest(&self) -> f64 {
        self.samples[2]
    }

    /// Samples ordered newest first.
    pub fn samples(&self) -> [f64; 3] {
        self.samples
    }

    /// The newest sample is at least the previous one.
    pub fn non_decreasing(&self) -> bool {
        self.samples[0].abs() >= self.samples[1].abs()
    }

    /// The newest sample exceeds both older samples.
    pub fn rising(&self) -> bool {
        self.samples[0] > self.samples[1] && self.samples[0] > self.samples[2]
    }

    /// The coupling has passed a local maximum: the newest sample is below
    /// the previous one and no larger than the oldest.
    pub fn past_peak(&self) -> bool {
        self.samples[0] < self.samples[1] && self.samples[0] <= self.samples[2]
    }
}

#[cfg(test)]
mod tests {
    use super::CouplingWindow;

    fn window(values: &[f64]) -> CouplingWindow {
        let mut window = CouplingWindow::new();
        for &value in values {
            window.push(value);
        }
        window
    }

    #[test]
    fn push_keeps_newest_first() {
        let w = window(&[0.1, 0.2, 0.3, 0.4]);
        assert_eq!(w.samples(), [0.4, 0.3, 0.2]);
    }

    #[test]
    fn first_sample_rises() {
        let w = window(&[0.05]);
        assert!(w.rising());
        assert!(!w.past_peak());
    }

    #[test]
    fn peak_is_detected_one_sample_late() {
        assert!(!window(&[0.1, 0.2, 0.3]).past_peak());
        assert!(window(&[0.1, 0.2, 0.3, 0.2]).past_peak());
        assert!(window(&[0.2, 0.3, 0.1]).past_peak());
    }

    #[test]
    fn plateau_neither_rises_nor_falls() {
        let w = window(&[0.05, 0.05, 0.05]);
        assert!(!w.rising());
        assert!(!w.past_peak());
        assert!(w.non_decreasing());
    }
}
