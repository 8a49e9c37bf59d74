//! The renderer facade.
//!
//! [`Raycaster`] owns every per-frame and cached buffer: the off-screen
//! view buffer, the z-buffer, the batched ray scratch, the texture bank
//! and strip cache, both sprite caches, and the background/minimap
//! caches. One `render_frame` call runs the fixed pipeline on the
//! calling thread:
//!
//! ray march → z-buffer → walls → sprites → background → upscale blit
//!
//! The minimap is a separate overlay call because only the caller knows
//! its fog-of-war state.

mod background;
mod minimap;
pub(crate) mod sprites;
pub(crate) mod walls;

use glam::Vec2;
use std::collections::HashSet;

use crate::config::{ConfigError, RenderConfig};
use crate::raycast::{RayBatch, RayHit, cast_single_ray, column_delta};
use crate::surface::Surface;
use crate::textures::TextureBank;
use crate::world::{BotView, Grid, Level, PlayerView, ProjectileView};

pub struct Raycaster {
    config: RenderConfig,
    view: Surface,
    zbuffer: Vec<f32>,
    batch: RayBatch,
    bank: TextureBank,
    bank_theme: Option<usize>,
    sprites: sprites::SpriteCache,
    background: background::BackgroundCache,
    minimap: minimap::MinimapCache,
}

impl Raycaster {
    pub fn new(config: RenderConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let bank = TextureBank::for_theme(config.theme(0));
        Ok(Self {
            config,
            view: Surface::new(0, 0),
            zbuffer: Vec::new(),
            batch: RayBatch::default(),
            bank,
            bank_theme: Some(0),
            sprites: sprites::SpriteCache::default(),
            background: background::BackgroundCache::default(),
            minimap: minimap::MinimapCache::default(),
        })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Change the off-screen downsample factor. The view buffer and
    /// z-buffer re-dimension on the next frame; content caches survive
    /// because they are keyed by target pixel size, not render scale.
    pub fn set_render_scale(&mut self, n: usize) {
        let limit = self.config.screen_w.min(self.config.screen_h).max(1);
        self.config.render_scale = n.clamp(1, limit);
    }

    /// Single-ray gameplay query (hitscan, line of sight). Same DDA and
    /// same numbers as the per-frame batch.
    pub fn cast_single_ray(&self, grid: &Grid, x: f32, y: f32, angle: f32) -> RayHit {
        cast_single_ray(grid, x, y, angle, self.config.max_depth)
    }

    /// Draw one complete frame into `screen` (sized `screen_w` ×
    /// `screen_h`). `vertical_offset` is the caller's view-bob in screen
    /// pixels.
    pub fn render_frame(
        &mut self,
        screen: &mut Surface,
        player: &PlayerView,
        bots: &[BotView],
        projectiles: &[ProjectileView],
        level: &Level,
        vertical_offset: f32,
    ) {
        let scale = self.config.render_scale.max(1);
        let cols = (self.config.screen_w / scale).max(1);
        let rows = (self.config.screen_h / scale).max(1);
        if self.view.width() != cols || self.view.height() != rows {
            self.view = Surface::new(cols, rows);
            self.zbuffer = vec![0.0; cols];
        }
        self.view.clear(0);

        if self.bank_theme != Some(level.theme) {
            self.bank = TextureBank::for_theme(self.config.theme(level.theme));
            self.bank_theme = Some(level.theme);
        }

        let fov = if player.zoomed {
            self.config.fov * self.config.zoom_fov_factor
        } else {
            self.config.fov
        };

        // 1. ray march, one ray per view-buffer column
        self.batch.march(
            level.grid,
            player.pos.x,
            player.pos.y,
            player.heading,
            fov,
            cols,
            self.config.max_depth,
        );

        // 2. z-buffer: perpendicular (fisheye-corrected) distances
        for i in 0..cols {
            self.zbuffer[i] = self.batch.hits[i].distance * column_delta(i, cols, fov).cos();
        }

        // pitch and bob arrive in screen pixels; the view buffer is
        // `scale` times smaller
        let pitch_v = player.pitch / scale as f32;
        let voff_v = vertical_offset / scale as f32;

        // 3. walls
        walls::draw_columns(
            &mut self.view,
            &self.batch.hits,
            &self.zbuffer,
            &self.config,
            self.config.theme(level.theme),
            &mut self.bank,
            pitch_v,
            voff_v,
        );

        // 4. sprites against the completed z-buffer
        sprites::draw_entities(
            &mut self.view,
            &self.zbuffer,
            player,
            bots,
            projectiles,
            fov,
            self.config.max_depth,
            pitch_v,
            voff_v,
            &mut self.sprites,
        );

        // 5. background straight to the screen, then the view on top
        self.background.draw(
            screen,
            level.theme,
            self.config.theme(level.theme),
            player.heading,
            player.pitch,
            vertical_offset,
        );
        self.view.blit_scaled_over(screen, scale);
    }

    /// Standalone minimap overlay; call after `render_frame`.
    pub fn render_minimap(
        &mut self,
        screen: &mut Surface,
        level: &Level,
        player: &PlayerView,
        bots: &[BotView],
        visited: Option<&HashSet<(i32, i32)>>,
        portal: Option<Vec2>,
    ) {
        self.minimap.draw(
            screen,
            level.grid,
            self.config.theme(level.theme),
            level.theme,
            player,
            bots,
            visited,
            portal,
        );
    }
}

/*======================================================================*/
/*                         End-to-end scenarios                         */
/*======================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::defs::EnemyKind;
    use glam::vec2;

    fn renderer(w: usize, h: usize, scale: usize) -> Raycaster {
        let mut cfg = RenderConfig::new(w, h);
        cfg.render_scale = scale;
        Raycaster::new(cfg).unwrap()
    }

    #[test]
    fn rejects_invalid_config() {
        let mut cfg = RenderConfig::new(64, 64);
        cfg.fov = -1.0;
        assert!(Raycaster::new(cfg).is_err());
    }

    #[test]
    fn bordered_room_wall_one_unit_ahead() {
        // 3×3 grid: only the center cell is floor; facing east the wall
        // face sits exactly one unit from the player
        let grid = Grid::bordered(3);
        let level = Level {
            grid: &grid,
            theme: 0,
        };
        let player = PlayerView::new(vec2(1.5, 1.5), 0.0);
        let mut rc = renderer(64, 64, 1);
        let mut screen = Surface::new(64, 64);
        rc.render_frame(&mut screen, &player, &[], &[], &level, 0.0);

        let cols = rc.zbuffer.len();
        let center = cols / 2;
        assert!(
            (rc.zbuffer[center] - 1.0).abs() < 1e-3,
            "center distance {}",
            rc.zbuffer[center]
        );
        // every ray ends on a border wall
        for hit in &rc.batch.hits {
            assert_eq!(hit.wall_type, 1);
        }
    }

    #[test]
    fn sprite_behind_wall_is_fully_occluded() {
        let mut grid = Grid::bordered(7);
        grid.set_cell(3, 3, 2); // wall between player and bot
        let player = PlayerView::new(vec2(1.5, 3.5), 0.0);
        let bot = BotView::new(vec2(5.5, 3.5), EnemyKind::Slime);

        let mut rc = renderer(64, 64, 1);
        let mut with_bot = Surface::new(64, 64);
        let mut without = Surface::new(64, 64);
        let level = Level {
            grid: &grid,
            theme: 0,
        };
        rc.render_frame(&mut with_bot, &player, &[bot], &[], &level, 0.0);
        rc.render_frame(&mut without, &player, &[], &[], &level, 0.0);
        assert_eq!(with_bot, without, "occluded sprite leaked pixels");

        // opening the wall lets the sprite through
        grid.set_cell(3, 3, 0);
        let level = Level {
            grid: &grid,
            theme: 0,
        };
        rc.render_frame(&mut with_bot, &player, &[bot], &[], &level, 0.0);
        rc.render_frame(&mut without, &player, &[], &[], &level, 0.0);
        assert_ne!(with_bot, without, "visible sprite drew nothing");
    }

    #[test]
    fn render_scale_roundtrip_reproduces_the_frame() {
        let grid = Grid::bordered(5);
        let level = Level {
            grid: &grid,
            theme: 0,
        };
        let player = PlayerView::new(vec2(2.5, 2.5), 0.7);
        let mut rc = renderer(64, 64, 1);

        let mut before = Surface::new(64, 64);
        rc.render_frame(&mut before, &player, &[], &[], &level, 0.0);

        rc.set_render_scale(4);
        let mut coarse = Surface::new(64, 64);
        rc.render_frame(&mut coarse, &player, &[], &[], &level, 0.0);
        assert_ne!(before, coarse);

        rc.set_render_scale(1);
        let mut after = Surface::new(64, 64);
        rc.render_frame(&mut after, &player, &[], &[], &level, 0.0);
        assert_eq!(before, after, "scale toggle corrupted cached content");
    }

    #[test]
    fn zoom_narrows_the_fov() {
        let grid = Grid::bordered(9);
        let level = Level {
            grid: &grid,
            theme: 0,
        };
        let mut player = PlayerView::new(vec2(4.5, 4.5), 0.3);
        let mut rc = renderer(32, 32, 1);
        let mut screen = Surface::new(32, 32);

        rc.render_frame(&mut screen, &player, &[], &[], &level, 0.0);
        let spread_wide = rc.zbuffer[0] - rc.zbuffer[rc.zbuffer.len() / 2];
        player.zoomed = true;
        rc.render_frame(&mut screen, &player, &[], &[], &level, 0.0);
        let spread_zoom = rc.zbuffer[0] - rc.zbuffer[rc.zbuffer.len() / 2];
        // a narrower fov flattens the distance spread across columns
        assert!(spread_zoom.abs() < spread_wide.abs());
    }

    #[test]
    fn single_ray_method_uses_configured_depth() {
        let grid = Grid::bordered(4);
        let rc = renderer(32, 32, 1);
        let hit = rc.cast_single_ray(&grid, 1.5, 1.5, 0.0);
        assert_eq!(hit.wall_type, 1);
        assert_eq!(hit.cell, (3, 1));
        assert!((hit.distance - 1.5).abs() < 1e-4);
    }
}
