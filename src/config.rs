//! Per-session render configuration and level themes.
//!
//! A [`RenderConfig`] is immutable once handed to the renderer; the only
//! sanctioned mutation is `Raycaster::set_render_scale`, which replaces
//! the off-screen resolution wholesale. Validation happens once at
//! construction, so per-frame code can assume every field is sane.

use thiserror::Error;

use crate::surface::{Rgba, rgb};

/// Wall color used when a wall-type code has no entry in the theme's
/// palette.
pub const FALLBACK_WALL_COLOR: Rgba = rgb(0x6E, 0x6E, 0x6E);

/// Visual identity of one level: background gradient bands, fog color and
/// the wall palette indexed by wall-type code.
#[derive(Clone, Debug)]
pub struct Theme {
    pub name: &'static str,
    pub sky_top: Rgba,
    pub sky_horizon: Rgba,
    pub floor_horizon: Rgba,
    pub floor_bottom: Rgba,
    pub fog_color: Rgba,
    /// `wall_colors[code - 1]` is the flat color for wall-type `code`.
    pub wall_colors: Vec<Rgba>,
}

impl Theme {
    /// Flat color for a wall-type code, neutral gray when unmapped.
    #[inline]
    pub fn wall_color(&self, code: u8) -> Rgba {
        if code == 0 {
            return FALLBACK_WALL_COLOR;
        }
        self.wall_colors
            .get(code as usize - 1)
            .copied()
            .unwrap_or(FALLBACK_WALL_COLOR)
    }
}

/// The stock themes the arcade games ship with.
pub fn default_themes() -> Vec<Theme> {
    vec![
        Theme {
            name: "dungeon",
            sky_top: rgb(0x06, 0x08, 0x12),
            sky_horizon: rgb(0x2A, 0x2E, 0x44),
            floor_horizon: rgb(0x3A, 0x34, 0x2C),
            floor_bottom: rgb(0x14, 0x12, 0x0E),
            fog_color: rgb(0x10, 0x12, 0x1A),
            wall_colors: vec![
                rgb(0x7A, 0x6A, 0x58),
                rgb(0x6B, 0x6B, 0x73),
                rgb(0x5E, 0x72, 0x5A),
                rgb(0x84, 0x5C, 0x48),
                rgb(0x62, 0x52, 0x6E),
            ],
        },
        Theme {
            name: "frost",
            sky_top: rgb(0x0A, 0x14, 0x26),
            sky_horizon: rgb(0x4E, 0x6A, 0x8C),
            floor_horizon: rgb(0x9A, 0xA8, 0xB8),
            floor_bottom: rgb(0x2E, 0x38, 0x46),
            fog_color: rgb(0xB0, 0xC4, 0xD8),
            wall_colors: vec![
                rgb(0x8C, 0xA4, 0xBE),
                rgb(0x6E, 0x86, 0xA2),
                rgb(0x5A, 0x6E, 0x88),
                rgb(0xA4, 0xB6, 0xC8),
                rgb(0x48, 0x5A, 0x74),
            ],
        },
        Theme {
            name: "inferno",
            sky_top: rgb(0x1A, 0x06, 0x04),
            sky_horizon: rgb(0x66, 0x1E, 0x0C),
            floor_horizon: rgb(0x4A, 0x22, 0x12),
            floor_bottom: rgb(0x16, 0x08, 0x04),
            fog_color: rgb(0x3A, 0x0E, 0x06),
            wall_colors: vec![
                rgb(0x8E, 0x3A, 0x22),
                rgb(0x74, 0x46, 0x30),
                rgb(0xA0, 0x52, 0x1E),
                rgb(0x60, 0x30, 0x28),
                rgb(0x86, 0x5A, 0x3A),
            ],
        },
    ]
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("screen dimensions {0}x{1} are degenerate")]
    BadScreen(usize, usize),

    #[error("render scale {0} must be at least 1 and no larger than the screen")]
    BadScale(usize),

    #[error("field of view {0} rad outside (0, pi)")]
    BadFov(f32),

    #[error("fog start fraction {0} outside [0, 1)")]
    BadFogStart(f32),

    #[error("max view depth {0} must be positive")]
    BadDepth(f32),

    #[error("at least one theme is required")]
    NoThemes,

    #[error("theme `{0}` has an empty wall palette")]
    EmptyPalette(&'static str),
}

#[derive(Clone, Debug)]
pub struct RenderConfig {
    pub screen_w: usize,
    pub screen_h: usize,
    /// Horizontal field of view in radians.
    pub fov: f32,
    /// Multiplier applied to `fov` while the player is zoomed (< 1).
    pub zoom_fov_factor: f32,
    /// Integer downsample factor for the off-screen view buffer.
    pub render_scale: usize,
    /// Rays and sprites beyond this distance are not drawn.
    pub max_depth: f32,
    /// Fraction of `max_depth` at which fog starts ramping in.
    pub fog_start: f32,
    /// Flat-color walls when false.
    pub textures: bool,
    pub themes: Vec<Theme>,
}

impl RenderConfig {
    /// Stock configuration for a given window size.
    pub fn new(screen_w: usize, screen_h: usize) -> Self {
        Self {
            screen_w,
            screen_h,
            fov: 66_f32.to_radians(),
            zoom_fov_factor: 0.5,
            render_scale: 2,
            max_depth: 20.0,
            fog_start: 0.55,
            textures: true,
            themes: default_themes(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.screen_w == 0 || self.screen_h == 0 {
            return Err(ConfigError::BadScreen(self.screen_w, self.screen_h));
        }
        if self.render_scale == 0
            || self.render_scale > self.screen_w
            || self.render_scale > self.screen_h
        {
            return Err(ConfigError::BadScale(self.render_scale));
        }
        if !(self.fov > 0.0 && self.fov < std::f32::consts::PI) {
            return Err(ConfigError::BadFov(self.fov));
        }
        if !(0.0..1.0).contains(&self.fog_start) {
            return Err(ConfigError::BadFogStart(self.fog_start));
        }
        if !(self.max_depth > 0.0) {
            return Err(ConfigError::BadDepth(self.max_depth));
        }
        if self.themes.is_empty() {
            return Err(ConfigError::NoThemes);
        }
        for theme in &self.themes {
            if theme.wall_colors.is_empty() {
                return Err(ConfigError::EmptyPalette(theme.name));
            }
        }
        Ok(())
    }

    /// Theme by level index, clamped to the first theme when out of range.
    #[inline]
    pub fn theme(&self, idx: usize) -> &Theme {
        self.themes.get(idx).unwrap_or(&self.themes[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_config_is_valid() {
        assert_eq!(RenderConfig::new(960, 600).validate(), Ok(()));
    }

    #[test]
    fn bad_fields_are_rejected() {
        let mut cfg = RenderConfig::new(960, 600);
        cfg.render_scale = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::BadScale(0)));

        let mut cfg = RenderConfig::new(960, 600);
        cfg.fov = 4.0;
        assert!(matches!(cfg.validate(), Err(ConfigError::BadFov(_))));

        let mut cfg = RenderConfig::new(960, 600);
        cfg.fog_start = 1.0;
        assert!(matches!(cfg.validate(), Err(ConfigError::BadFogStart(_))));

        let mut cfg = RenderConfig::new(960, 600);
        cfg.themes.clear();
        assert_eq!(cfg.validate(), Err(ConfigError::NoThemes));
    }

    #[test]
    fn wall_color_falls_back_to_gray() {
        let themes = default_themes();
        assert_eq!(themes[0].wall_color(99), FALLBACK_WALL_COLOR);
        assert_eq!(themes[0].wall_color(0), FALLBACK_WALL_COLOR);
        assert_ne!(themes[0].wall_color(1), FALLBACK_WALL_COLOR);
    }

    #[test]
    fn out_of_range_theme_clamps() {
        let cfg = RenderConfig::new(320, 200);
        assert_eq!(cfg.theme(50).name, cfg.theme(0).name);
    }
}
