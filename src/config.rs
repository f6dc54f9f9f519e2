//! Overlay configuration

use crate::zoom::ZoomStrategy;
use std::time::Duration;

/// Tunables for a preview overlay
///
/// `Default` matches the scroll-backed preset. Use the `with_*` builders to
/// adjust individual values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewConfig {
    /// Backdrop alpha once the drag has covered half the viewport height
    pub min_backdrop_alpha: f32,
    /// Backdrop alpha at rest
    pub max_backdrop_alpha: f32,
    /// Fraction of half the viewport height a drag must exceed to dismiss
    pub dismiss_threshold: f32,
    /// Duration of the bounce-back and exit animations
    pub animation_duration: Duration,
    /// Duration of the cross-dissolve when shown animated
    pub present_duration: Duration,
    /// Magnification of the double-tap zoom
    pub double_tap_scale: f32,
    pub zoom_strategy: ZoomStrategy,
    /// Cancel any in-flight drag before each layout pass
    pub flush_pan_before_layout: bool,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        PreviewConfig {
            min_backdrop_alpha: 0.25,
            max_backdrop_alpha: 1.0,
            dismiss_threshold: 0.3,
            animation_duration: Duration::from_millis(250),
            present_duration: Duration::from_millis(300),
            double_tap_scale: 4.0,
            zoom_strategy: ZoomStrategy::Scroll { max_scale: 6.0 },
            flush_pan_before_layout: true,
        }
    }
}

impl PreviewConfig {
    /// Content embedded in a zoomable scroll surface
    pub fn scrolling() -> Self {
        Self::default()
    }

    /// Content moved directly, without zoom
    pub fn direct() -> Self {
        Self::default().with_zoom_strategy(ZoomStrategy::Transform)
    }

    pub fn with_backdrop_alpha(mut self, min: f32, max: f32) -> Self {
        self.min_backdrop_alpha = min.clamp(0.0, 1.0);
        self.max_backdrop_alpha = max.clamp(self.min_backdrop_alpha, 1.0);
        self
    }

    pub fn with_dismiss_threshold(mut self, threshold: f32) -> Self {
        self.dismiss_threshold = threshold.max(0.0);
        self
    }

    pub fn with_animation_duration(mut self, duration: Duration) -> Self {
        self.animation_duration = duration;
        self
    }

    pub fn with_present_duration(mut self, duration: Duration) -> Self {
        self.present_duration = duration;
        self
    }

    pub fn with_double_tap_scale(mut self, scale: f32) -> Self {
        self.double_tap_scale = scale.max(1.0);
        self
    }

    pub fn with_zoom_strategy(mut self, strategy: ZoomStrategy) -> Self {
        self.zoom_strategy = strategy;
        self
    }

    pub fn with_flush_pan_before_layout(mut self, flush: bool) -> Self {
        self.flush_pan_before_layout = flush;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PreviewConfig::default();
        assert_eq!(config.min_backdrop_alpha, 0.25);
        assert_eq!(config.max_backdrop_alpha, 1.0);
        assert_eq!(config.dismiss_threshold, 0.3);
        assert_eq!(config.animation_duration, Duration::from_millis(250));
        assert_eq!(config.double_tap_scale, 4.0);
        assert!(config.flush_pan_before_layout);
    }

    #[test]
    fn test_presets() {
        assert_eq!(
            PreviewConfig::scrolling().zoom_strategy,
            ZoomStrategy::Scroll { max_scale: 6.0 }
        );
        assert_eq!(PreviewConfig::direct().zoom_strategy, ZoomStrategy::Transform);
    }

    #[test]
    fn test_backdrop_alpha_is_ordered() {
        let config = PreviewConfig::default().with_backdrop_alpha(0.8, 0.5);
        assert_eq!(config.min_backdrop_alpha, 0.8);
        assert_eq!(config.max_backdrop_alpha, 0.8);
    }
}
