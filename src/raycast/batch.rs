//! Batched per-column ray march.
//!
//! All columns advance together over struct-of-arrays state with a
//! per-column done mask; the shared stepping loop runs until every column
//! has finished or the step budget is gone. Batching is a performance
//! arrangement only: each column performs the same operation sequence as
//! [`super::cast_single_ray`], so results match bit for bit.

use super::{Side, guard_dir, step_budget};
use crate::world::Grid;

/// Per-column ray result for one frame. Same payload as a scalar
/// [`super::RayHit`] minus the hit cell, which only gameplay queries need.
#[derive(Clone, Copy, Debug)]
pub struct ColumnHit {
    pub distance: f32,
    pub wall_type: u8,
    pub tex_u: f32,
    pub side: Side,
}

impl ColumnHit {
    #[inline]
    fn miss(max_depth: f32) -> Self {
        Self {
            distance: max_depth,
            wall_type: 0,
            tex_u: 0.0,
            side: Side::Vertical,
        }
    }
}

/// Angular offset of column `i` of `columns` from the view center; spans
/// [-fov/2, +fov/2] with columns centered on their sub-ray.
#[inline]
pub fn column_delta(i: usize, columns: usize, fov: f32) -> f32 {
    ((i as f32 + 0.5) / columns as f32 - 0.5) * fov
}

/// Reusable scratch for the batched march; arrays are resized once per
/// resolution change and rewritten every frame.
#[derive(Default)]
pub struct RayBatch {
    dir_x: Vec<f32>,
    dir_y: Vec<f32>,
    delta_x: Vec<f32>,
    delta_y: Vec<f32>,
    side_x: Vec<f32>,
    side_y: Vec<f32>,
    step_x: Vec<i32>,
    step_y: Vec<i32>,
    cell_x: Vec<i32>,
    cell_y: Vec<i32>,
    done: Vec<bool>,
    pub hits: Vec<ColumnHit>,
}

impl RayBatch {
    fn resize(&mut self, n: usize, max_depth: f32) {
        self.dir_x.resize(n, 0.0);
        self.dir_y.resize(n, 0.0);
        self.delta_x.resize(n, 0.0);
        self.delta_y.resize(n, 0.0);
        self.side_x.resize(n, 0.0);
        self.side_y.resize(n, 0.0);
        self.step_x.resize(n, 0);
        self.step_y.resize(n, 0);
        self.cell_x.resize(n, 0);
        self.cell_y.resize(n, 0);
        self.done.resize(n, false);
        self.done.fill(false);
        self.hits.clear();
        self.hits.resize(n, ColumnHit::miss(max_depth));
    }

    /// March one ray per column from (`x`, `y`), headings fanned across
    /// `fov` around `heading`. Results land in `self.hits`.
    pub fn march(
        &mut self,
        grid: &Grid,
        x: f32,
        y: f32,
        heading: f32,
        fov: f32,
        columns: usize,
        max_depth: f32,
    ) {
        self.resize(columns, max_depth);

        for i in 0..columns {
            let (sin_a, cos_a) = (heading + column_delta(i, columns, fov)).sin_cos();
            let dx = guard_dir(cos_a);
            let dy = guard_dir(sin_a);
            self.dir_x[i] = dx;
            self.dir_y[i] = dy;
            self.delta_x[i] = (1.0 / dx).abs();
            self.delta_y[i] = (1.0 / dy).abs();
            let cx = x.floor() as i32;
            let cy = y.floor() as i32;
            self.cell_x[i] = cx;
            self.cell_y[i] = cy;
            if dx < 0.0 {
                self.step_x[i] = -1;
                self.side_x[i] = (x - cx as f32) * self.delta_x[i];
            } else {
                self.step_x[i] = 1;
                self.side_x[i] = (cx as f32 + 1.0 - x) * self.delta_x[i];
            }
            if dy < 0.0 {
                self.step_y[i] = -1;
                self.side_y[i] = (y - cy as f32) * self.delta_y[i];
            } else {
                self.step_y[i] = 1;
                self.side_y[i] = (cy as f32 + 1.0 - y) * self.delta_y[i];
            }
        }

        let mut active = columns;
        for _ in 0..step_budget(max_depth) {
            if active == 0 {
                break;
            }
            for i in 0..columns {
                if self.done[i] {
                    continue;
                }
                let (dist, side) = if self.side_x[i] < self.side_y[i] {
                    let d = self.side_x[i];
                    self.side_x[i] += self.delta_x[i];
                    self.cell_x[i] += self.step_x[i];
                    (d, Side::Vertical)
                } else {
                    let d = self.side_y[i];
                    self.side_y[i] += self.delta_y[i];
                    self.cell_y[i] += self.step_y[i];
                    (d, Side::Horizontal)
                };
                if dist > max_depth {
                    self.done[i] = true; // hits[i] already holds the miss
                    active -= 1;
                    continue;
                }
                match grid.wall_type_at(self.cell_x[i], self.cell_y[i]) {
                    None => {
                        self.done[i] = true;
                        active -= 1;
                    }
                    Some(0) => {}
                    Some(code) => {
                        let ortho = match side {
                            Side::Vertical => y + dist * self.dir_y[i],
                            Side::Horizontal => x + dist * self.dir_x[i],
                        };
                        self.hits[i] = ColumnHit {
                            distance: dist,
                            wall_type: code,
                            tex_u: ortho - ortho.floor(),
                            side,
                        };
                        self.done[i] = true;
                        active -= 1;
                    }
                }
            }
        }
        // columns still marching when the budget ran out keep their miss
    }
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::raycast::cast_single_ray;
    use crate::world::Grid;

    fn irregular_room() -> Grid {
        let mut g = Grid::bordered(12);
        g.set_cell(4, 4, 2);
        g.set_cell(5, 4, 2);
        g.set_cell(8, 7, 3);
        g.set_cell(2, 9, 4);
        g
    }

    #[test]
    fn batch_matches_single_rays_column_by_column() {
        let g = irregular_room();
        let (x, y) = (6.3, 6.7);
        let fov = 66_f32.to_radians();
        let max_depth = 20.0;
        let columns = 160;

        let mut batch = RayBatch::default();
        for heading in [0.0_f32, 0.9, 2.4, -1.3] {
            batch.march(&g, x, y, heading, fov, columns, max_depth);
            for i in 0..columns {
                let single =
                    cast_single_ray(&g, x, y, heading + column_delta(i, columns, fov), max_depth);
                let col = batch.hits[i];
                assert_eq!(col.distance.to_bits(), single.distance.to_bits(), "col {i}");
                assert_eq!(col.wall_type, single.wall_type, "col {i}");
                assert_eq!(col.tex_u.to_bits(), single.tex_u.to_bits(), "col {i}");
                assert_eq!(col.side, single.side, "col {i}");
            }
        }
    }

    #[test]
    fn deltas_span_the_fov_symmetrically() {
        let fov = 1.0;
        let n = 100;
        assert!((column_delta(0, n, fov) + column_delta(n - 1, n, fov)).abs() < 1e-6);
        assert!(column_delta(0, n, fov) > -fov / 2.0);
        assert!(column_delta(n - 1, n, fov) < fov / 2.0);
    }

    #[test]
    fn all_columns_terminate_in_open_grid() {
        // borderless grid: every ray leaves and must report a miss
        let g = Grid::from_rows(&["000", "000", "000"]);
        let mut batch = RayBatch::default();
        batch.march(&g, 1.5, 1.5, 0.4, 1.2, 64, 30.0);
        for hit in &batch.hits {
            assert_eq!(hit.wall_type, 0);
            assert!((hit.distance - 30.0).abs() < 1e-6);
        }
    }
}
