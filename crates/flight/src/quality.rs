//! Quality levels and the frame-rate driven adaptive monitor.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum QualityLevel {
    Low,
    Medium,
    #[default]
    High,
}

/// Budgets attached to a quality level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualitySettings {
    pub max_projectiles: usize,
    /// Fraction of the full starfield to generate.
    pub star_factor: f32,
}

impl QualityLevel {
    pub fn settings(self) -> QualitySettings {
        match self {
            QualityLevel::Low => QualitySettings {
                max_projectiles: 10,
                star_factor: 0.3,
            },
            QualityLevel::Medium => QualitySettings {
                max_projectiles: 20,
                star_factor: 0.6,
            },
            QualityLevel::High => QualitySettings {
                max_projectiles: 30,
                star_factor: 1.0,
            },
        }
    }
}

/// Counts frames over one-second windows and steps the quality level.
///
/// Below 30 fps drops straight to low, below 45 fps high falls to medium,
/// above 55 fps climbs one level.
#[derive(Debug, Clone)]
pub struct AdaptiveQuality {
    level: QualityLevel,
    enabled: bool,
    frames: u32,
    window: f32,
    fps: f32,
}

impl AdaptiveQuality {
    pub fn new(level: QualityLevel, enabled: bool) -> Self {
        Self {
            level,
            enabled,
            frames: 0,
            window: 0.0,
            fps: 60.0,
        }
    }

    pub fn level(&self) -> QualityLevel {
        self.level
    }

    /// Frames counted in the last complete window.
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Record one frame. Returns the new level when it changed.
    pub fn record_frame(&mut self, dt: f32) -> Option<QualityLevel> {
        self.frames += 1;
        self.window += dt.max(0.0);
        if self.window < 1.0 {
            return None;
        }
        self.fps = self.frames as f32 / self.window;
        self.frames = 0;
        self.window = 0.0;
        if !self.enabled {
            return None;
        }

        let next = match self.level {
            _ if self.fps < 30.0 => QualityLevel::Low,
            QualityLevel::High if self.fps < 45.0 => QualityLevel::Medium,
            QualityLevel::Low if self.fps > 55.0 => QualityLevel::Medium,
            QualityLevel::Medium if self.fps > 55.0 => QualityLevel::High,
            level => level,
        };
        if next == self.level {
            return None;
        }
        log::info!("Quality adjusted to {:?} ({:.0} fps)", next, self.fps);
        self.level = next;
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_second(monitor: &mut AdaptiveQuality, fps: u32) -> Option<QualityLevel> {
        let dt = 1.0 / fps as f32;
        let mut change = None;
        for _ in 0..fps + 1 {
            if let Some(level) = monitor.record_frame(dt) {
                change = Some(level);
            }
        }
        change
    }

    #[test]
    fn budgets_grow_with_level() {
        assert!(QualityLevel::Low.settings().max_projectiles < QualityLevel::High.settings().max_projectiles);
        assert_eq!(QualityLevel::Medium.settings().max_projectiles, 20);
    }

    #[test]
    fn slow_frames_drop_to_low() {
        let mut monitor = AdaptiveQuality::new(QualityLevel::High, true);
        assert_eq!(run_second(&mut monitor, 20), Some(QualityLevel::Low));
    }

    #[test]
    fn middling_frames_step_high_to_medium() {
        let mut monitor = AdaptiveQuality::new(QualityLevel::High, true);
        assert_eq!(run_second(&mut monitor, 40), Some(QualityLevel::Medium));
        // 40 fps on medium is neither bad enough nor good enough to move.
        assert_eq!(run_second(&mut monitor, 40), None);
    }

    #[test]
    fn fast_frames_climb_one_level_at_a_time() {
        let mut monitor = AdaptiveQuality::new(QualityLevel::Low, true);
        assert_eq!(run_second(&mut monitor, 60), Some(QualityLevel::Medium));
        assert_eq!(run_second(&mut monitor, 60), Some(QualityLevel::High));
        assert_eq!(run_second(&mut monitor, 60), None);
    }

    #[test]
    fn disabled_monitor_only_measures() {
        let mut monitor = AdaptiveQuality::new(QualityLevel::High, false);
        assert_eq!(run_second(&mut monitor, 20), None);
        assert_eq!(monitor.level(), QualityLevel::High);
        assert!(monitor.fps() < 25.0);
    }
}
