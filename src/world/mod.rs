//! World-side collaborators as the renderer sees them: the occupancy
//! grid and narrow read-only views of the player, bots and projectiles.
//! Ownership of the real gameplay state stays with the game layer.

pub mod entity;
pub mod grid;
pub mod player;

pub use entity::{BotState, BotView, ProjectileView, WeaponTag};
pub use grid::Grid;
pub use player::PlayerView;

/// Everything level-scoped the renderer needs for one frame: the grid and
/// which theme (sky/floor gradient + wall palette) to draw it with.
#[derive(Clone, Copy)]
pub struct Level<'a> {
    pub grid: &'a Grid,
    pub theme: usize,
}
