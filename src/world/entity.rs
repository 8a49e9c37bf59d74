//! Read-only entity views crossing the gameplay → renderer boundary.
//!
//! The game layer owns its bots and projectiles; each frame it assembles
//! these flat snapshots so the renderer can never mutate gameplay state.
//! Fields are exactly the ones that affect pixels (plus position), which
//! keeps the sprite-cache signature an honest pure function of the view.

use glam::Vec2;

use crate::defs::EnemyKind;
use crate::surface::Rgba;
use bitflags::bitflags;

bitflags! {
    /// Lifecycle and status flags of a bot, as seen by the renderer.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct BotState: u8 {
        const ALIVE   = 0x01;
        const DEAD    = 0x02;
        /// Fully gone; not drawn at all.
        const REMOVED = 0x04;
        const FROZEN  = 0x08;
    }
}

#[derive(Clone, Copy, Debug)]
pub struct BotView {
    pub pos: Vec2,
    pub kind: EnemyKind,
    pub state: BotState,
    /// Free-running walk animation counter, in game tics.
    pub walk_phase: u32,
    /// Tics remaining on the current muzzle-flash, 0 = idle.
    pub shoot_phase: u32,
    /// Tics since death started, 0 while alive.
    pub death_tics: u32,
    /// Tics since disintegration started, 0 = intact.
    pub dissolve_tics: u32,
    /// Per-instance size multiplier on top of the kind's base scale.
    pub scale: f32,
}

impl BotView {
    pub fn new(pos: Vec2, kind: EnemyKind) -> Self {
        Self {
            pos,
            kind,
            state: BotState::ALIVE,
            walk_phase: 0,
            shoot_phase: 0,
            death_tics: 0,
            dissolve_tics: 0,
            scale: 1.0,
        }
    }

    /// Dead bots keep rendering while their death/dissolve animation runs;
    /// only `REMOVED` drops them from the frame.
    #[inline]
    pub fn renderable(&self) -> bool {
        !self.state.contains(BotState::REMOVED)
    }
}

/// Weapon family of a projectile; selects the accent drawn inside the
/// projected disc.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WeaponTag {
    Blaster,
    Scatter,
    Rail,
}

#[derive(Clone, Copy, Debug)]
pub struct ProjectileView {
    pub pos: Vec2,
    /// Height above the floor plane, in world units.
    pub z: f32,
    pub alive: bool,
    pub size: f32,
    pub color: Rgba,
    pub weapon: WeaponTag,
}

impl ProjectileView {
    pub fn new(pos: Vec2, weapon: WeaponTag, color: Rgba) -> Self {
        Self {
            pos,
            z: 0.0,
            alive: true,
            size: 0.25,
            color,
            weapon,
        }
    }
}
