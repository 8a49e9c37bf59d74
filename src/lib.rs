//! Grid-based raycast renderer shared by several first-person arcade games.
//!
//! *The gameplay layer never touches a pixel buffer directly.* It hands the
//! renderer read-only views of the world each frame ([`PlayerView`],
//! [`BotView`], [`ProjectileView`], a [`Grid`] wrapped in a [`Level`]) and
//! the renderer does the rest:
//!
//! * batched DDA ray march, one ray per view-buffer column;
//! * z-buffered wall strips with shading, distance fog and texture strips;
//! * depth-sorted, partially-occluded sprite billboards;
//! * cached sky/floor gradient with starfield and moon;
//! * fog-of-war minimap overlay.
//!
//! Everything runs single-threaded inside [`Raycaster::render_frame`]; the
//! finished frame lands in a caller-owned [`Surface`] whose pixels go
//! straight to `minifb` (see `src/bin/walk.rs`).

pub mod cache;
pub mod config;
pub mod defs;
pub mod raycast;
pub mod render;
pub mod surface;
pub mod textures;
pub mod world;

pub use config::{ConfigError, RenderConfig, Theme};
pub use defs::{EnemyInfo, EnemyKind, VisualStyle};
pub use raycast::{ColumnHit, RayHit, Side, cast_single_ray};
pub use render::Raycaster;
pub use surface::{Rgba, Surface};
pub use world::{BotState, BotView, Grid, Level, PlayerView, ProjectileView, WeaponTag};
