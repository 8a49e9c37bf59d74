//! Sprite compositor: depth-sorted, z-buffer-occluded billboards.
//!
//! Bots render through two cache layers. The *base* cache holds one
//! padded bitmap per visual-state signature, painted by style with
//! distance shade and frozen tint already applied. The *scaled* cache
//! holds that bitmap resampled to a bucketed target width (multiples of
//! 8) so nearby sizes share one scaling pass. Occlusion happens per
//! column against the z-buffer; contiguous unoccluded columns form
//! visible runs, blitted either from the cached scaled bitmap or, when
//! little of a large sprite shows, by sampling base-bitmap columns
//! directly. Both paths use the same integer sampling, so their output
//! is pixel-identical.
//!
//! Projectiles are the simple variant: a filled disc with a per-weapon
//! accent, no caching, drawn only if the center column is unoccluded.

use glam::Vec2;
use smallvec::SmallVec;
use std::f32::consts::{PI, TAU};

use crate::cache::BoundedCache;
use crate::defs::{self, EnemyInfo, VisualStyle};
use crate::surface::{Rgba, Surface, mix_rgb, mul_rgb, rgb, with_alpha};
use crate::world::{BotState, BotView, PlayerView, ProjectileView, WeaponTag};

/// Logical sprite square inside the base bitmap.
const BASE_SIZE: i32 = 64;
/// Padding on every side so glow effects can bleed past the silhouette.
const PAD: i32 = 8;
const BITMAP_SIZE: i32 = BASE_SIZE + PAD * 2;

/// Angular slack past the half-fov so sprites poking in from the edge
/// still render.
const FOV_MARGIN: f32 = 0.35;

/// Target widths snap to multiples of this before scaling.
const WIDTH_BUCKET: i32 = 8;

/// Strip-vs-whole heuristic (tunable, not load-bearing): scale the whole
/// bitmap when at least this fraction of it is visible, or when it is
/// small enough that a full scale is cheap anyway.
const WHOLE_MIN_VISIBLE_FRAC: f32 = 0.35;
const WHOLE_MAX_WIDTH: i32 = 48;

const SHADE_LEVELS: f32 = 15.0;
const FROST_TINT: Rgba = rgb(0xA8, 0xD8, 0xFF);

const DEATH_BUCKETS: u32 = 5;
const DISSOLVE_BUCKETS: u32 = 7;

/// Visual-state signature of a bot: the exact set of fields that affect
/// its pixels, and nothing else. Two bots with equal keys are
/// pixel-identical by construction (world position is deliberately
/// absent).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct SpriteKey {
    kind: defs::EnemyKind,
    walk: u8,
    shoot: bool,
    death: u8,
    dissolve: u8,
    size_q: u8,
    shade_q: u8,
    frozen: bool,
}

impl SpriteKey {
    pub(crate) fn of(bot: &BotView, shade_q: u8) -> Self {
        Self {
            kind: bot.kind,
            walk: ((bot.walk_phase / 5) % 4) as u8,
            shoot: bot.shoot_phase > 0,
            death: (bot.death_tics / 6).min(DEATH_BUCKETS) as u8,
            dissolve: (bot.dissolve_tics / 4).min(DISSOLVE_BUCKETS) as u8,
            size_q: (bot.scale * 8.0).round().clamp(0.0, 255.0) as u8,
            shade_q,
            frozen: bot.state.contains(BotState::FROZEN),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Hash)]
struct ScaledKey {
    base: SpriteKey,
    w: u16,
}

pub(crate) struct SpriteCache {
    base: BoundedCache<SpriteKey, Surface>,
    scaled: BoundedCache<ScaledKey, Surface>,
}

impl Default for SpriteCache {
    fn default() -> Self {
        Self {
            base: BoundedCache::new(256, 32),
            scaled: BoundedCache::new(512, 64),
        }
    }
}

enum Payload {
    Bot(SpriteKey),
    Shot { color: Rgba, weapon: WeaponTag },
}

struct Billboard {
    dist: f32,
    /// Bots: left edge / width / top / height. Shots: `x0`,`y0` are the
    /// disc center and `w` its radius.
    x0: i32,
    w: i32,
    y0: i32,
    h: i32,
    payload: Payload,
}

/*───────────────────────────── projection ──────────────────────────*/

#[inline]
fn wrap_angle(a: f32) -> f32 {
    let a = a.rem_euclid(TAU);
    if a > PI { a - TAU } else { a }
}

struct Projected {
    dist: f32,
    screen_x: f32,
}

/// Common rejection tests: behind the player, beyond max depth (squared
/// before the sqrt), outside the fov plus margin.
fn project(
    player: &PlayerView,
    pos: Vec2,
    fov: f32,
    max_depth: f32,
    view_w: f32,
) -> Option<Projected> {
    let rel = pos - player.pos;
    let d2 = rel.length_squared();
    if d2 > max_depth * max_depth {
        return None;
    }
    if rel.dot(player.forward()) < 0.0 {
        return None;
    }
    let diff = wrap_angle(rel.y.atan2(rel.x) - player.heading);
    if diff.abs() > fov * 0.5 + FOV_MARGIN {
        return None;
    }
    Some(Projected {
        dist: d2.sqrt(),
        screen_x: (diff / fov + 0.5) * view_w,
    })
}

#[inline]
fn bucket_width(raw: f32) -> i32 {
    (((raw / WIDTH_BUCKET as f32).round() as i32) * WIDTH_BUCKET).max(WIDTH_BUCKET)
}

/// Maximal contiguous spans of `[x_start, x_end)` where the billboard is
/// nearer than the wall in the z-buffer. Returns the runs (half-open)
/// and the total visible column count.
fn visible_runs(
    zbuf: &[f32],
    x_start: i32,
    x_end: i32,
    dist: f32,
) -> (SmallVec<[(i32, i32); 8]>, i32) {
    let mut runs: SmallVec<[(i32, i32); 8]> = SmallVec::new();
    let mut visible = 0;
    let mut open: Option<i32> = None;
    for x in x_start..x_end {
        if dist < zbuf[x as usize] {
            visible += 1;
            if open.is_none() {
                open = Some(x);
            }
        } else if let Some(a) = open.take() {
            runs.push((a, x));
        }
    }
    if let Some(a) = open {
        runs.push((a, x_end));
    }
    (runs, visible)
}

/*───────────────────────────── frame pass ──────────────────────────*/

#[allow(clippy::too_many_arguments)]
pub(crate) fn draw_entities(
    view: &mut Surface,
    zbuf: &[f32],
    player: &PlayerView,
    bots: &[BotView],
    projectiles: &[ProjectileView],
    fov: f32,
    max_depth: f32,
    pitch_v: f32,
    voff_v: f32,
    cache: &mut SpriteCache,
) {
    let view_w = view.width() as f32;
    let view_h = view.height() as f32;
    let mid_y = view_h * 0.5 + pitch_v + voff_v;

    let mut board: Vec<Billboard> = Vec::with_capacity(bots.len() + projectiles.len());

    for bot in bots {
        if !bot.renderable() {
            continue;
        }
        let Some(p) = project(player, bot.pos, fov, max_depth, view_w) else {
            continue;
        };
        let info = defs::by_kind(bot.kind);
        let shade = super::walls::shade_factor(p.dist);
        let shade_q = (shade * SHADE_LEVELS).round() as u8;
        let raw_w = view_h / p.dist.max(0.05) * info.scale * bot.scale;
        let w = bucket_width(raw_w);
        // base bitmaps are square, so the derived height equals the width
        let h = w;
        board.push(Billboard {
            dist: p.dist,
            x0: (p.screen_x - w as f32 * 0.5).round() as i32,
            w,
            y0: (mid_y - h as f32 * 0.5).round() as i32,
            h,
            payload: Payload::Bot(SpriteKey::of(bot, shade_q)),
        });
    }

    for shot in projectiles {
        if !shot.alive {
            continue;
        }
        let Some(p) = project(player, shot.pos, fov, max_depth, view_w) else {
            continue;
        };
        let px_per_unit = view_h / p.dist.max(0.05);
        let r = ((px_per_unit * shot.size * 0.5) as i32).max(1);
        let cy = mid_y - shot.z * px_per_unit;
        board.push(Billboard {
            dist: p.dist,
            x0: p.screen_x.round() as i32,
            w: r,
            y0: cy.round() as i32,
            h: 0,
            payload: Payload::Shot {
                color: shot.color,
                weapon: shot.weapon,
            },
        });
    }

    // farthest first so nearer sprites overdraw
    board.sort_by(|a, b| b.dist.partial_cmp(&a.dist).unwrap());

    for bb in &board {
        match &bb.payload {
            Payload::Bot(key) => draw_bot(view, zbuf, cache, bb, key),
            Payload::Shot { color, weapon } => draw_shot(view, zbuf, bb, *color, *weapon),
        }
    }
}

fn draw_bot(view: &mut Surface, zbuf: &[f32], cache: &mut SpriteCache, bb: &Billboard, key: &SpriteKey) {
    if bb.w <= 0 || bb.h <= 0 {
        return;
    }
    let x_start = bb.x0.max(0);
    let x_end = (bb.x0 + bb.w).min(view.width() as i32);
    if x_start >= x_end {
        return;
    }
    let (runs, visible) = visible_runs(zbuf, x_start, x_end, bb.dist);
    if runs.is_empty() {
        return;
    }

    let SpriteCache { base, scaled } = cache;
    let info = defs::by_kind(key.kind);
    let bitmap = base.get_or_insert_with(key.clone(), || paint_base(key, info));

    let whole = visible as f32 / bb.w as f32 >= WHOLE_MIN_VISIBLE_FRAC || bb.w <= WHOLE_MAX_WIDTH;
    if whole {
        let skey = ScaledKey {
            base: key.clone(),
            w: bb.w as u16,
        };
        if !scaled.contains(&skey) {
            match bitmap.scale_nearest(bb.w as usize, bb.h as usize) {
                Some(s) => scaled.insert(skey.clone(), s),
                None => return, // degenerate target: skip this sprite
            }
        }
        let s = scaled.get(&skey).unwrap();
        blit_whole(view, s, bb, &runs);
    } else {
        blit_strips(view, bitmap, bb, &runs);
    }
}

/// Blit visible runs as sub-rectangles of the cached scaled bitmap.
fn blit_whole(view: &mut Surface, scaled: &Surface, bb: &Billboard, runs: &[(i32, i32)]) {
    let y_start = bb.y0.max(0);
    let y_end = (bb.y0 + bb.h).min(view.height() as i32);
    for &(a, b) in runs {
        for x in a..b {
            for y in y_start..y_end {
                let p = scaled.get((x - bb.x0) as usize, (y - bb.y0) as usize);
                view.blend_at(x, y, p);
            }
        }
    }
}

/// Sample base-bitmap columns directly, one strip per visible column.
/// Index math matches `Surface::scale_nearest`, which is what keeps this
/// path pixel-identical to `blit_whole`.
fn blit_strips(view: &mut Surface, bitmap: &Surface, bb: &Billboard, runs: &[(i32, i32)]) {
    let bw = bitmap.width();
    let bh = bitmap.height();
    let y_start = bb.y0.max(0);
    let y_end = (bb.y0 + bb.h).min(view.height() as i32);
    for &(a, b) in runs {
        for x in a..b {
            let sx = (x - bb.x0) as usize * bw / bb.w as usize;
            for y in y_start..y_end {
                let sy = (y - bb.y0) as usize * bh / bb.h as usize;
                view.blend_at(x, y, bitmap.get(sx, sy));
            }
        }
    }
}

fn draw_shot(view: &mut Surface, zbuf: &[f32], bb: &Billboard, color: Rgba, weapon: WeaponTag) {
    let cx = bb.x0;
    if cx < 0 || cx >= view.width() as i32 || bb.dist >= zbuf[cx as usize] {
        return;
    }
    let cy = bb.y0;
    let r = bb.w;
    view.fill_circle(cx, cy, r, color);
    match weapon {
        WeaponTag::Blaster => {
            view.fill_circle(cx, cy, (r / 2).max(1), mix_rgb(color, rgb(0xFF, 0xFF, 0xFF), 0.6));
        }
        WeaponTag::Scatter => {
            view.fill_circle(cx, cy, (r / 2).max(1), mul_rgb(color, 0.5));
        }
        WeaponTag::Rail => {
            view.fill_circle(cx, cy, (r / 2).max(1), rgb(0xF0, 0xF4, 0xFF));
            view.fill_circle(cx, cy - r, 1, with_alpha(color, 0xA0));
            view.fill_circle(cx, cy + r, 1, with_alpha(color, 0xA0));
        }
    }
}

/*───────────────────────── base bitmap painter ─────────────────────*/

/// Paint the padded base bitmap for one signature. Shade and tint are
/// baked in here so scaled copies inherit them for free.
fn paint_base(key: &SpriteKey, info: &EnemyInfo) -> Surface {
    let mut s = Surface::new(BITMAP_SIZE as usize, BITMAP_SIZE as usize);

    let shade = (key.shade_q as f32 / SHADE_LEVELS).max(super::walls::MIN_SHADE);
    let mut body = mul_rgb(info.base_color, shade);
    if key.frozen {
        body = mix_rgb(body, FROST_TINT, 0.55);
    }
    let death_p = key.death as f32 / DEATH_BUCKETS as f32;
    let size = BASE_SIZE as f32 * (1.0 - 0.5 * death_p);
    let alpha = (255.0 * (1.0 - 0.7 * death_p)) as u8;
    let body = with_alpha(body, alpha);
    let dark = mul_rgb(body, 0.45);
    let bright = mix_rgb(body, rgb(0xFF, 0xFF, 0xFF), 0.5);

    let cx = BITMAP_SIZE / 2;
    let ground = PAD + BASE_SIZE;

    match info.style {
        VisualStyle::Blob => {
            let wobble = [1.0, 0.92, 1.0, 1.08][key.walk as usize % 4];
            let rx = (size * 0.45) as i32;
            let ry = (size * 0.36 * wobble) as i32;
            let cy = ground - ry;
            if key.shoot {
                s.fill_circle(cx, cy, rx + PAD / 2, with_alpha(bright, 0x50));
            }
            fill_ellipse(&mut s, cx, cy, rx, ry, body);
            let eye_y = cy - ry / 3;
            s.fill_circle(cx - rx / 3, eye_y, 2, dark);
            s.fill_circle(cx + rx / 3, eye_y, 2, dark);
        }
        VisualStyle::Armored => {
            let w = (size * 0.38) as i32;
            let h = (size * 0.7) as i32;
            let top = ground - h;
            s.fill_rect(cx - w, top, w * 2, h, body);
            // pauldrons
            s.fill_rect(cx - w - 3, top + 4, 4, h / 3, dark);
            s.fill_rect(cx + w - 1, top + 4, 4, h / 3, dark);
            // visor slit, lit while firing
            let visor = if key.shoot { bright } else { dark };
            s.fill_rect(cx - w / 2, top + h / 6, w, 3, visor);
        }
        VisualStyle::Orbiter => {
            let core_r = (size * 0.18) as i32;
            let orbit = (size * 0.34) as i32;
            let cy = ground - (size * 0.5) as i32;
            if key.shoot {
                s.fill_circle(cx, cy, core_r + PAD / 2, with_alpha(bright, 0x50));
            }
            s.fill_circle(cx, cy, core_r, body);
            let spin = key.walk as f32 * PI / 8.0;
            for k in 0..4 {
                let a = spin + k as f32 * PI / 2.0;
                let ox = cx + (a.cos() * orbit as f32) as i32;
                let oy = cy + (a.sin() * orbit as f32 * 0.5) as i32;
                s.fill_circle(ox, oy, core_r / 2 + 1, dark);
            }
        }
        VisualStyle::Ragged => {
            let rx = (size * 0.28) as i32;
            let ry = (size * 0.48) as i32;
            let cy = ground - ry;
            fill_ellipse(&mut s, cx, cy, rx, ry, body);
            // torn edges: deterministic dropouts keyed by row and phase
            for y in (cy - ry)..(cy + ry) {
                if (y * 31 + key.walk as i32 * 7) % 5 == 0 {
                    s.fill_rect(cx - rx, y, rx / 2, 1, 0);
                    s.fill_rect(cx + rx / 2, y, rx / 2, 1, 0);
                }
            }
            let eye = if key.shoot { bright } else { dark };
            s.fill_circle(cx - rx / 3, cy - ry / 3, 2, eye);
            s.fill_circle(cx + rx / 3, cy - ry / 3, 2, eye);
        }
        VisualStyle::Pickup => {
            let w = (size * 0.3) as i32;
            let top = ground - w * 2;
            s.fill_rect(cx - w, top, w * 2, w * 2, body);
            s.fill_rect(cx - w, top, w * 2, 2, bright);
            // glyph: a simple cross
            s.fill_rect(cx - 1, top + w / 2, 2, w, bright);
            s.fill_rect(cx - w / 2, top + w - 1, w, 2, bright);
        }
    }

    // disintegration: progressively drop scanlines
    if key.dissolve > 0 {
        let keep_mod = (DISSOLVE_BUCKETS + 1 - key.dissolve as u32) as i32;
        for y in 0..BITMAP_SIZE {
            if keep_mod <= 1 || y % (keep_mod + 1) == 0 {
                s.fill_rect(0, y, BITMAP_SIZE, 1, 0);
            }
        }
    }
    s
}

/// Row-scanned filled ellipse; blends so glows underneath survive.
fn fill_ellipse(s: &mut Surface, cx: i32, cy: i32, rx: i32, ry: i32, color: Rgba) {
    if rx <= 0 || ry <= 0 {
        return;
    }
    for dy in -ry..=ry {
        let t = 1.0 - (dy as f32 / ry as f32).powi(2);
        let half = (rx as f32 * t.max(0.0).sqrt()) as i32;
        for dx in -half..=half {
            s.blend_at(cx + dx, cy + dy, color);
        }
    }
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::defs::EnemyKind;
    use glam::vec2;

    fn bot_at(x: f32, y: f32) -> BotView {
        let mut b = BotView::new(vec2(x, y), EnemyKind::Slime);
        b.walk_phase = 12;
        b
    }

    #[test]
    fn key_ignores_world_position() {
        // same distance from the implied viewer, different bearings
        let a = SpriteKey::of(&bot_at(3.0, 0.0), 9);
        let b = SpriteKey::of(&bot_at(0.0, 3.0), 9);
        assert_eq!(a, b);
    }

    #[test]
    fn key_tracks_visual_state() {
        let mut frozen = bot_at(3.0, 0.0);
        frozen.state |= BotState::FROZEN;
        assert_ne!(SpriteKey::of(&bot_at(3.0, 0.0), 9), SpriteKey::of(&frozen, 9));
    }

    #[test]
    fn width_bucketing_snaps_to_multiples_of_eight() {
        assert_eq!(bucket_width(45.0), 48);
        assert_eq!(bucket_width(51.0), 48);
        assert_eq!(bucket_width(53.0), 56);
        assert_eq!(bucket_width(1.0), WIDTH_BUCKET); // never collapses to zero
    }

    #[test]
    fn runs_split_around_occluding_walls() {
        // wall covers columns 4..8
        let mut zbuf = vec![10.0_f32; 12];
        for z in &mut zbuf[4..8] {
            *z = 2.0;
        }
        let (runs, visible) = visible_runs(&zbuf, 2, 11, 5.0);
        assert_eq!(runs.as_slice(), &[(2, 4), (8, 11)]);
        assert_eq!(visible, 5);

        let (runs, visible) = visible_runs(&zbuf, 4, 8, 5.0);
        assert!(runs.is_empty());
        assert_eq!(visible, 0);
    }

    #[test]
    fn whole_and_strip_paths_are_pixel_identical() {
        let key = SpriteKey::of(&bot_at(2.0, 0.0), 12);
        let info = defs::by_kind(EnemyKind::Slime);
        let bitmap = paint_base(&key, info);
        let bb = Billboard {
            dist: 3.0,
            x0: 5,
            w: 72,
            y0: 2,
            h: 72,
            payload: Payload::Bot(key),
        };
        let scaled = bitmap.scale_nearest(bb.w as usize, bb.h as usize).unwrap();
        let runs = [(bb.x0, bb.x0 + bb.w)];

        let mut via_whole = Surface::new(100, 90);
        let mut via_strips = Surface::new(100, 90);
        blit_whole(&mut via_whole, &scaled, &bb, &runs);
        blit_strips(&mut via_strips, &bitmap, &bb, &runs);
        assert_eq!(via_whole, via_strips);
    }

    #[test]
    fn rejects_behind_and_out_of_fov() {
        let player = PlayerView::new(vec2(5.0, 5.0), 0.0);
        let fov = 1.2;
        assert!(project(&player, vec2(2.0, 5.0), fov, 20.0, 100.0).is_none()); // behind
        assert!(project(&player, vec2(5.5, 9.0), fov, 20.0, 100.0).is_none()); // far off-axis
        assert!(project(&player, vec2(90.0, 5.0), fov, 20.0, 100.0).is_none()); // beyond depth
        let p = project(&player, vec2(8.0, 5.0), fov, 20.0, 100.0).unwrap();
        assert!((p.dist - 3.0).abs() < 1e-5);
        assert!((p.screen_x - 50.0).abs() < 1e-3); // dead center
    }
}
