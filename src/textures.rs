//! Procedural wall textures, pre-sliced into 1-pixel vertical strips.
//!
//! Each wall-type code gets one square texture generated from the theme's
//! wall color; the games ship no image assets. Textures are stored
//! column-major so the wall compositor can fetch a single strip without
//! striding through a row-major bitmap, and scaled strips are memoized in
//! a bounded cache keyed by (code, source column, target height).

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::cache::BoundedCache;
use crate::config::Theme;
use crate::surface::{Rgba, mix_rgb, mul_rgb, rgb};

/// Side length of every generated texture.
pub const TEX_SIZE: usize = 64;

/// Strips taller than this are refused; the wall compositor falls back to
/// a flat fill (point-blank walls are clamped well below this anyway).
const MAX_STRIP_HEIGHT: usize = 8192;

const STRIP_CACHE_CAPACITY: usize = 4096;
const STRIP_CACHE_EVICT: usize = 256;

#[derive(Error, Debug, PartialEq)]
pub enum TextureError {
    #[error("wall-type code 0 has no texture")]
    NoSuchTexture,
}

/// One generated wall texture, stored as `TEX_SIZE` vertical columns.
#[derive(Clone, Debug)]
pub struct WallTexture {
    cols: Vec<Vec<Rgba>>,
}

impl WallTexture {
    #[inline]
    pub fn column(&self, x: usize) -> &[Rgba] {
        &self.cols[x.min(TEX_SIZE - 1)]
    }
}

#[derive(Clone, PartialEq, Eq, Hash)]
struct StripKey {
    code: u8,
    col: u16,
    height: u32,
}

/// All textures for one theme plus the scaled-strip cache.
pub struct TextureBank {
    textures: Vec<WallTexture>, // indexed by code - 1
    strips: BoundedCache<StripKey, Vec<Rgba>>,
}

impl TextureBank {
    /// Generate one texture per wall color in `theme`.
    pub fn for_theme(theme: &Theme) -> Self {
        let textures = (1..=theme.wall_colors.len() as u8)
            .map(|code| generate(code, theme.wall_color(code)))
            .collect();
        Self {
            textures,
            strips: BoundedCache::new(STRIP_CACHE_CAPACITY, STRIP_CACHE_EVICT),
        }
    }

    pub fn texture(&self, code: u8) -> Result<&WallTexture, TextureError> {
        if code == 0 {
            return Err(TextureError::NoSuchTexture);
        }
        // codes past the palette reuse the last texture rather than failing
        let idx = (code as usize - 1).min(self.textures.len().saturating_sub(1));
        self.textures.get(idx).ok_or(TextureError::NoSuchTexture)
    }

    /// Fetch the 1-px strip for (`code`, texture coordinate `u`) scaled to
    /// `height` pixels, creating and caching it on miss. `None` signals the
    /// caller to fall back to a flat fill.
    pub fn strip(&mut self, code: u8, u: f32, height: usize) -> Option<&[Rgba]> {
        if code == 0 || height == 0 || height > MAX_STRIP_HEIGHT || self.textures.is_empty() {
            return None;
        }
        let col = ((u.clamp(0.0, 1.0) * TEX_SIZE as f32) as usize).min(TEX_SIZE - 1);
        let key = StripKey {
            code,
            col: col as u16,
            height: height as u32,
        };
        if !self.strips.contains(&key) {
            let idx = (code as usize - 1).min(self.textures.len() - 1);
            let src = self.textures[idx].column(col);
            let mut out = Vec::with_capacity(height);
            for y in 0..height {
                out.push(src[y * TEX_SIZE / height]);
            }
            self.strips.insert(key.clone(), out);
        }
        self.strips.get(&key).map(|v| v.as_slice())
    }

    #[cfg(test)]
    pub(crate) fn strip_cache_len(&self) -> usize {
        self.strips.len()
    }
}

/*──────────────────────── texture generation ───────────────────────*/

/// Paint a 64×64 texture for `code` from its flat color. The pattern is
/// picked by code so neighbouring wall types stay distinguishable.
fn generate(code: u8, base: Rgba) -> WallTexture {
    let mut rng = StdRng::seed_from_u64(0x9E37_79B9 ^ code as u64);
    let dark = mul_rgb(base, 0.55);
    let light = mix_rgb(base, rgb(0xFF, 0xFF, 0xFF), 0.18);

    let mut rows = vec![[0u32; TEX_SIZE]; TEX_SIZE];
    for (y, row) in rows.iter_mut().enumerate() {
        for (x, px) in row.iter_mut().enumerate() {
            let c = match (code - 1) % 4 {
                // brick courses with staggered mortar joints
                0 => {
                    let course = y / 16;
                    let shift = if course % 2 == 0 { 0 } else { 16 };
                    if y % 16 >= 14 || (x + shift) % 32 >= 30 {
                        dark
                    } else {
                        base
                    }
                }
                // large stone blocks with a bevelled edge
                1 => {
                    if y % 32 < 2 || x % 32 < 2 {
                        dark
                    } else if y % 32 < 4 || x % 32 < 4 {
                        light
                    } else {
                        base
                    }
                }
                // riveted metal panel
                2 => {
                    let rivet = (x % 16 == 4 || x % 16 == 12) && (y % 16 == 4 || y % 16 == 12);
                    if rivet {
                        light
                    } else if y % 32 == 0 {
                        dark
                    } else {
                        base
                    }
                }
                // diagonal hazard banding
                _ => {
                    if (x + y) % 24 < 8 {
                        dark
                    } else {
                        base
                    }
                }
            };
            // speckle so flat areas don't band after shading
            let noise = rng.gen_range(-12i32..=12);
            *px = add_noise(c, noise);
        }
    }

    // transpose into column strips
    let cols = (0..TEX_SIZE)
        .map(|x| (0..TEX_SIZE).map(|y| rows[y][x]).collect())
        .collect();
    WallTexture { cols }
}

#[inline]
fn add_noise(c: Rgba, n: i32) -> Rgba {
    let ch = |sh: u32| (((c >> sh) & 0xFF) as i32 + n).clamp(0, 255) as u32;
    (c & 0xFF00_0000) | (ch(16) << 16) | (ch(8) << 8) | ch(0)
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_themes;

    fn bank() -> TextureBank {
        TextureBank::for_theme(&default_themes()[0])
    }

    #[test]
    fn code_zero_has_no_texture() {
        let bank = bank();
        assert_eq!(bank.texture(0).unwrap_err(), TextureError::NoSuchTexture);
        assert!(bank.texture(1).is_ok());
    }

    #[test]
    fn strip_is_cached_once_per_key() {
        let mut bank = bank();
        assert!(bank.strip(1, 0.5, 120).is_some());
        let n = bank.strip_cache_len();
        bank.strip(1, 0.5, 120);
        assert_eq!(bank.strip_cache_len(), n);
        bank.strip(1, 0.5, 121); // different height = different entry
        assert_eq!(bank.strip_cache_len(), n + 1);
    }

    #[test]
    fn strip_scaling_spans_whole_column() {
        let mut bank = bank();
        let tall = bank.strip(2, 0.0, 200).unwrap().to_vec();
        assert_eq!(tall.len(), 200);
        let texture = bank.texture(2).unwrap();
        let col = texture.column(0);
        assert_eq!(tall[0], col[0]);
        assert_eq!(tall[199], col[199 * TEX_SIZE / 200]);
    }

    #[test]
    fn degenerate_heights_are_refused() {
        let mut bank = bank();
        assert!(bank.strip(1, 0.0, 0).is_none());
        assert!(bank.strip(1, 0.0, MAX_STRIP_HEIGHT + 1).is_none());
    }

    #[test]
    fn unmapped_codes_reuse_last_texture() {
        let mut bank = bank();
        assert!(bank.strip(200, 0.25, 50).is_some());
    }
}
