//! Static visual metadata for every enemy kind.
//!
//! One record per [`EnemyKind`]; the sprite compositor resolves a kind to
//! its base color, visual style and scale through [`by_kind`]. Adding an
//! enemy means a new variant plus a table row: styles are a closed enum
//! dispatched by a `match` in the sprite painter, never runtime lookup.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::surface::{Rgba, rgb};

/// Enemy/pickup type id shared with the gameplay layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EnemyKind {
    Slime,
    Warden,
    Spinner,
    Husk,
    MedKit,
    AmmoCell,
}

/// How a kind's base bitmap is painted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisualStyle {
    /// Squat wobbling blob with eyes.
    Blob,
    /// Broad armored torso with a visor slit.
    Armored,
    /// Ring of orbs circling a core.
    Orbiter,
    /// Tall ragged silhouette with torn edges.
    Ragged,
    /// Small floating item box.
    Pickup,
}

#[derive(Clone, Copy, Debug)]
pub struct EnemyInfo {
    pub kind: EnemyKind,
    pub id: &'static str,
    pub base_color: Rgba,
    pub style: VisualStyle,
    /// World-size multiplier applied to the projected billboard.
    pub scale: f32,
    /// Items are skipped by the minimap's enemy markers.
    pub is_item: bool,
}

pub const ENEMY_INFO: &[EnemyInfo] = &[
    EnemyInfo {
        kind: EnemyKind::Slime,
        id: "SLIME",
        base_color: rgb(0x5E, 0xC4, 0x4A),
        style: VisualStyle::Blob,
        scale: 0.8,
        is_item: false,
    },
    EnemyInfo {
        kind: EnemyKind::Warden,
        id: "WARDEN",
        base_color: rgb(0xB8, 0x4A, 0x3C),
        style: VisualStyle::Armored,
        scale: 1.1,
        is_item: false,
    },
    EnemyInfo {
        kind: EnemyKind::Spinner,
        id: "SPINNER",
        base_color: rgb(0xC9, 0xA2, 0x2E),
        style: VisualStyle::Orbiter,
        scale: 0.7,
        is_item: false,
    },
    EnemyInfo {
        kind: EnemyKind::Husk,
        id: "HUSK",
        base_color: rgb(0x8A, 0x7A, 0xB0),
        style: VisualStyle::Ragged,
        scale: 1.0,
        is_item: false,
    },
    EnemyInfo {
        kind: EnemyKind::MedKit,
        id: "MEDKIT",
        base_color: rgb(0xE8, 0xE8, 0xE0),
        style: VisualStyle::Pickup,
        scale: 0.4,
        is_item: true,
    },
    EnemyInfo {
        kind: EnemyKind::AmmoCell,
        id: "AMMOCELL",
        base_color: rgb(0x4A, 0x9E, 0xD8),
        style: VisualStyle::Pickup,
        scale: 0.4,
        is_item: true,
    },
];

/// Neutral fallback so a kind missing from the table degrades to a gray
/// blob instead of failing the frame.
pub const FALLBACK_INFO: EnemyInfo = EnemyInfo {
    kind: EnemyKind::Slime,
    id: "UNKNOWN",
    base_color: rgb(0x80, 0x80, 0x80),
    style: VisualStyle::Blob,
    scale: 1.0,
    is_item: false,
};

static BY_KIND: Lazy<HashMap<EnemyKind, &'static EnemyInfo>> =
    Lazy::new(|| ENEMY_INFO.iter().map(|info| (info.kind, info)).collect());

pub fn by_kind(kind: EnemyKind) -> &'static EnemyInfo {
    BY_KIND.get(&kind).copied().unwrap_or(&FALLBACK_INFO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_a_row() {
        for info in ENEMY_INFO {
            assert_eq!(by_kind(info.kind).id, info.id);
        }
    }

    #[test]
    fn items_are_flagged() {
        assert!(by_kind(EnemyKind::MedKit).is_item);
        assert!(!by_kind(EnemyKind::Warden).is_item);
    }
}
