use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{shape::Rect, EyesError, Result};

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub display: DisplayConfig,
    pub animation: AnimationConfig,
}

impl AppConfig {
    /// Reads a JSON config file. Missing fields fall back to their defaults so
    /// a file only needs to mention what it changes.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.display.validate()?;
        self.animation.validate()?;
        self.animation.validate_against(&self.display)
    }
}

/// RGB colour triple, serialised as `[r, g, b]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    pub const BLACK: Color = Color(0, 0, 0);
    pub const WHITE: Color = Color(255, 255, 255);
    pub const YELLOW: Color = Color(255, 255, 0);
}

/// Window and eye placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub screen_width: u32,
    pub screen_height: u32,
    pub eye_width: f32,
    pub eye_height: f32,
    /// Horizontal gap between the inner edges of the two eyes.
    pub eye_distance: f32,
    /// How far above the vertical centre line the eyes sit.
    pub eye_y_offset: f32,
    pub corner_radius: f32,
    pub ink: Color,
    pub backdrop: Color,
    pub accent: Color,
    pub tick_hz: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            screen_width: 1280,
            screen_height: 720,
            eye_width: 240.0,
            eye_height: 240.0,
            eye_distance: 200.0,
            eye_y_offset: 100.0,
            corner_radius: 30.0,
            ink: Color::BLACK,
            backdrop: Color::WHITE,
            accent: Color::YELLOW,
            tick_hz: 60,
        }
    }
}

impl DisplayConfig {
    /// Rest rectangles for the left and right eye, centred horizontally on
    /// the screen.
    pub fn eye_rects(&self) -> (Rect, Rect) {
        let center_x = (self.screen_width / 2) as f32;
        let y = (self.screen_height / 2) as f32 - self.eye_height / 2.0 - self.eye_y_offset;
        let left_x = center_x - self.eye_width - self.eye_distance / 2.0;
        let right_x = center_x + self.eye_distance / 2.0;
        (
            Rect::new(left_x, y, self.eye_width, self.eye_height),
            Rect::new(right_x, y, self.eye_width, self.eye_height),
        )
    }

    fn validate(&self) -> Result<()> {
        if self.tick_hz == 0 {
            return Err(EyesError::config("tick_hz must be positive"));
        }
        if self.eye_width <= 0.0 || self.eye_height <= 0.0 {
            return Err(EyesError::config("eye dimensions must be positive"));
        }
        Ok(())
    }
}

/// Step sizes, thresholds and durations of every expression. Step sizes are
/// per nominal tick and get scaled by the real elapsed time of each tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub blink_speed: f32,
    pub blink_floor: f32,
    pub blink_interval_ms: (f32, f32),

    pub laugh_speed: f32,
    pub laugh_max_offset: f32,
    pub laugh_cycles: u32,

    pub smile_duration_ms: u64,
    /// Vertical offset of the crescent while smiling.
    pub smile_offset: f32,

    pub star_duration_ms: u64,
    pub star_speed: f32,

    pub concentrate_floor: f32,
    pub concentrate_duration_ms: u64,

    /// Whether the idle scheduler also inserts sideways looks.
    pub idle_look: bool,
    pub look_speed: f32,
    pub look_squint: f32,
    pub look_squint_depth: f32,
    pub look_bulge: f32,
    pub look_unbulge: f32,
    pub look_bulge_distance: f32,
    pub look_max_distance: f32,
    pub look_pause_ms: u64,
    pub look_interval_ms: (f32, f32),

    /// Seed for the interval/direction generator. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            blink_speed: 15.0,
            blink_floor: 10.0,
            blink_interval_ms: (2000.0, 4000.0),
            laugh_speed: 2.0,
            laugh_max_offset: 20.0,
            laugh_cycles: 4,
            smile_duration_ms: 2000,
            smile_offset: 10.0,
            star_duration_ms: 3000,
            star_speed: 0.05,
            concentrate_floor: 60.0,
            concentrate_duration_ms: 2000,
            idle_look: false,
            look_speed: 10.0,
            look_squint: 5.0,
            look_squint_depth: 40.0,
            look_bulge: 4.0,
            look_unbulge: 2.0,
            look_bulge_distance: 100.0,
            look_max_distance: 200.0,
            look_pause_ms: 1000,
            look_interval_ms: (10_000.0, 20_000.0),
            seed: None,
        }
    }
}

impl AnimationConfig {
    fn validate(&self) -> Result<()> {
        for (name, (lo, hi)) in [
            ("blink_interval_ms", self.blink_interval_ms),
            ("look_interval_ms", self.look_interval_ms),
        ] {
            if !(lo >= 0.0 && lo < hi) {
                return Err(EyesError::config(format!(
                    "{name} must be an increasing non-negative range, got ({lo}, {hi})"
                )));
            }
        }
        let steps = [
            ("blink_speed", self.blink_speed),
            ("laugh_speed", self.laugh_speed),
            ("star_speed", self.star_speed),
            ("look_speed", self.look_speed),
        ];
        if let Some((name, _)) = steps.iter().find(|(_, v)| *v <= 0.0) {
            return Err(EyesError::config(format!("{name} must be positive")));
        }
        if self.laugh_cycles == 0 {
            return Err(EyesError::config("laugh_cycles must be at least 1"));
        }
        Ok(())
    }

    /// Squint floors only make sense strictly inside the eye's rest height.
    fn validate_against(&self, display: &DisplayConfig) -> Result<()> {
        let height = display.eye_height;
        for (name, value) in [
            ("blink_floor", self.blink_floor),
            ("concentrate_floor", self.concentrate_floor),
            ("look_squint_depth", self.look_squint_depth),
        ] {
            if !(0.0..height).contains(&value) {
                return Err(EyesError::config(format!(
                    "{name} must lie in 0..{height} (eye_height), got {value}"
                )));
            }
        }
        Ok(())
    }
}
