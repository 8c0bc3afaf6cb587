//! Edge auto-scroll while a gesture is in progress.

use crate::models::settings::Settings;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AutoScroll {
    /// Distance from a viewport edge that triggers scrolling
    pub edge_px: f32,
    /// Scroll increment per frame
    pub step_px: f32,
}

impl AutoScroll {
    pub fn new(edge_px: f32, step_px: f32) -> Self {
        Self { edge_px, step_px }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.auto_scroll_edge_px, settings.auto_scroll_step_px)
    }

    /// Signed horizontal scroll increment for a pointer at `x`.
    ///
    /// Negative scrolls left, positive scrolls right, zero leaves the
    /// viewport alone. When both edges are in range the nearer one wins.
    pub fn delta(&self, x: f32, viewport_left: f32, viewport_right: f32) -> f32 {
        if !x.is_finite() || viewport_right <= viewport_left {
            return 0.0;
        }

        let from_left = x - viewport_left;
        let from_right = viewport_right - x;
        let near_left = from_left < self.edge_px;
        let near_right = from_right < self.edge_px;

        match (near_left, near_right) {
            (true, true) if from_left <= from_right => -self.step_px,
            (true, true) => self.step_px,
            (true, false) => -self.step_px,
            (false, true) => self.step_px,
            (false, false) => 0.0,
        }
    }
}

impl Default for AutoScroll {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(50.0, -20.0; "near left edge")]
    #[test_case(950.0, 20.0; "near right edge")]
    #[test_case(500.0, 0.0; "middle of viewport")]
    #[test_case(100.0, 0.0; "exactly at threshold")]
    #[test_case(-30.0, -20.0; "outside left edge")]
    fn test_delta(x: f32, expected: f32) {
        let scroll = AutoScroll::new(100.0, 20.0);
        assert_eq!(scroll.delta(x, 0.0, 1000.0), expected);
    }

    #[test]
    fn test_narrow_viewport_prefers_nearer_edge() {
        let scroll = AutoScroll::new(100.0, 20.0);
        assert_eq!(scroll.delta(40.0, 0.0, 150.0), -20.0);
        assert_eq!(scroll.delta(110.0, 0.0, 150.0), 20.0);
    }

    #[test]
    fn test_degenerate_viewport() {
        let scroll = AutoScroll::default();
        assert_eq!(scroll.delta(10.0, 100.0, 100.0), 0.0);
        assert_eq!(scroll.delta(f32::NAN, 0.0, 1000.0), 0.0);
    }
}
