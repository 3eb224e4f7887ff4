//! Which grid cells are on screen.
//!
//! The grid is a torus: panning past an edge shows the opposite edge, so the
//! visible window of cells wraps around both axes.

use crate::types::Viewport;

/// Per-cell visibility, indexed by 1-indexed row/col.
///
/// Row 0 and col 0 exist in the mask but are never looked up; the wrap-around
/// walk passes through them.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityMask {
    rows: usize,
    cols: usize,
    cells: Vec<bool>,
}

impl VisibilityMask {
    fn filled(rows: usize, cols: usize, visible: bool) -> Self {
        Self {
            rows,
            cols,
            cells: vec![visible; (rows + 1) * (cols + 1)],
        }
    }

    /// Compute the mask for a `rows` x `cols` grid drawn in `viewport`.
    ///
    /// At or below `zoom_cull_threshold` the whole grid fits on screen and
    /// every cell is visible. Above it, only the scrolled window plus one cell
    /// of margin on each side is.
    pub fn compute(
        rows: usize,
        cols: usize,
        viewport: &Viewport,
        row_distance: f64,
        col_distance: f64,
        zoom_cull_threshold: f64,
    ) -> Self {
        if viewport.zoom_ratio <= zoom_cull_threshold || rows == 0 || cols == 0 {
            return Self::filled(rows, cols, true);
        }

        let first_visible = |translation: f64, distance: f64, length: usize| {
            grid_position(-translation / distance, -1, length)
        };
        let last_visible = |translation: f64, distance: f64, length: usize| {
            let span = length as f64 / viewport.zoom_ratio;
            grid_position(-translation / distance + span, 1, length)
        };

        let min_y = first_visible(viewport.translation_y, row_distance, rows);
        let min_x = first_visible(viewport.translation_x, col_distance, cols);
        let max_y = last_visible(viewport.translation_y, row_distance, rows);
        let max_x = last_visible(viewport.translation_x, col_distance, cols);

        let mut mask = Self::filled(rows, cols, false);

        // Both walks step modulo length + 1, so they always reach max in 1..=length.
        let mut x = min_x;
        loop {
            x = (x + 1) % (cols + 1);
            let mut y = min_y;
            mask.set(y, x);
            loop {
                y = (y + 1) % (rows + 1);
                mask.set(y, x);
                if y == max_y {
                    break;
                }
            }
            if x == max_x {
                break;
            }
        }

        log::debug!(
            "Visible window rows {min_y}..{max_y}, cols {min_x}..{max_x} at zoom {}",
            viewport.zoom_ratio
        );

        mask
    }

    fn set(&mut self, row: usize, col: usize) {
        let idx = row * (self.cols + 1) + col;
        self.cells[idx] = true;
    }

    /// Whether a cell (1-indexed) is visible; out-of-grid cells are not.
    pub fn is_visible(&self, row: usize, col: usize) -> bool {
        if row > self.rows || col > self.cols {
            return false;
        }
        self.cells[row * (self.cols + 1) + col]
    }

    pub fn visible_count(&self) -> usize {
        let mut count = 0;
        for row in 1..=self.rows {
            for col in 1..=self.cols {
                if self.is_visible(row, col) {
                    count += 1;
                }
            }
        }
        count
    }
}

/// Cell holding a fractional grid coordinate, shifted by `offset` cells and
/// wrapped into `1..=length`. Folds before the integer cast so that any finite
/// coordinate stays in range.
fn grid_position(coordinate: f64, offset: i64, length: usize) -> usize {
    let folded = coordinate.floor().rem_euclid(length as f64) as i64;
    wrap_into_grid(folded + offset, length)
}

/// Truncated remainder folded into `1..=length`.
fn wrap_into_grid(value: i64, length: usize) -> usize {
    let length = length as i64;
    let rem = value % length;
    let wrapped = if rem > 0 { rem } else { rem + length };
    wrapped as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_into_grid_stays_in_range() {
        assert_eq!(wrap_into_grid(-1, 4), 3);
        assert_eq!(wrap_into_grid(0, 4), 4);
        assert_eq!(wrap_into_grid(4, 4), 4);
        assert_eq!(wrap_into_grid(5, 4), 1);
        assert_eq!(wrap_into_grid(-9, 4), 3);
    }

    #[test]
    fn low_zoom_shows_everything() {
        let viewport = Viewport::new(100.0, 100.0).with_zoom(1.5);
        let mask = VisibilityMask::compute(4, 4, &viewport, 25.0, 25.0, 1.5);
        assert_eq!(mask.visible_count(), 16);
    }

    #[test]
    fn zoomed_in_culls_far_cells() {
        // 10x10 grid at zoom 4: the window starts one cell before the origin
        // and ends one cell past the 2.5 visible cells.
        let viewport = Viewport::new(100.0, 100.0).with_zoom(4.0);
        let mask = VisibilityMask::compute(10, 10, &viewport, 10.0, 10.0, 1.5);

        assert!(mask.is_visible(1, 1));
        assert!(mask.is_visible(10, 10));
        assert!(mask.is_visible(9, 1));
        assert!(mask.is_visible(3, 3));
        assert!(!mask.is_visible(1, 9));
        assert!(!mask.is_visible(4, 1));
        assert!(!mask.is_visible(6, 6));
        assert_eq!(mask.visible_count(), 20);
    }

    #[test]
    fn window_wraps_around_the_torus() {
        // Panned so the window starts near the bottom-right corner.
        let viewport = Viewport::new(100.0, 100.0)
            .with_zoom(4.0)
            .with_translation(-80.0, -80.0);
        let mask = VisibilityMask::compute(10, 10, &viewport, 10.0, 10.0, 1.5);

        assert!(mask.is_visible(7, 8));
        assert!(mask.is_visible(10, 10));
        assert!(mask.is_visible(1, 1));
        assert!(!mask.is_visible(7, 7));
        assert!(!mask.is_visible(2, 2));
        assert!(!mask.is_visible(5, 5));
    }

    #[test]
    fn grid_position_folds_large_coordinates() {
        assert_eq!(grid_position(-0.5, -1, 10), 8);
        assert_eq!(grid_position(2.5, 1, 10), 3);
        assert_eq!(grid_position(-1008.0, -1, 10), 1);
        for coordinate in [1e300, -1e300, f64::MAX, f64::MIN] {
            assert!((1..=10).contains(&grid_position(coordinate, -1, 10)));
            assert!((1..=10).contains(&grid_position(coordinate, 1, 10)));
        }
    }

    #[test]
    fn panning_by_whole_turns_gives_the_same_window() {
        let at = |tx: f64, ty: f64| {
            let viewport = Viewport::new(100.0, 100.0)
                .with_zoom(4.0)
                .with_translation(tx, ty);
            VisibilityMask::compute(10, 10, &viewport, 10.0, 10.0, 1.5)
        };
        assert_eq!(at(-80.0, -80.0), at(-80.0 - 1e4, -80.0 + 1e6));
    }

    #[test]
    fn huge_translations_stay_on_the_grid() {
        for (tx, ty) in [(1e300, -1e300), (-1e300, 1e300), (f64::MAX, f64::MIN)] {
            let viewport = Viewport::new(100.0, 100.0)
                .with_zoom(4.0)
                .with_translation(tx, ty);
            let mask = VisibilityMask::compute(10, 10, &viewport, 10.0, 10.0, 1.5);
            let visible = mask.visible_count();
            assert!(
                visible > 0 && visible <= 100,
                "{visible} cells for ({tx}, {ty})"
            );
        }
    }

    #[test]
    fn out_of_grid_cells_are_hidden() {
        let mask = VisibilityMask::compute(2, 2, &Viewport::new(10.0, 10.0), 5.0, 5.0, 1.5);
        assert!(!mask.is_visible(3, 1));
    }
}
