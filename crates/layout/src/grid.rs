use multiview_common::{Rect, SurfaceSize};

use crate::error::LayoutError;

/// One cell of a fixed grid, in top-left-origin surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCell {
    pub index: usize,
    pub row: usize,
    pub col: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl GridCell {
    /// Cell snapped to whole pixels. Edges are rounded from their grid line
    /// so neighbouring cells always share an edge.
    pub fn pixel_rect(&self) -> Rect {
        let x0 = (self.col as f32 * self.width).round() as i32;
        let x1 = ((self.col + 1) as f32 * self.width).round() as i32;
        let y0 = (self.row as f32 * self.height).round() as i32;
        let y1 = ((self.row + 1) as f32 * self.height).round() as i32;
        Rect::new(x0, y0, (x1 - x0) as u32, (y1 - y0) as u32)
    }
}

/// Cells placed on a surface by a [`GridPartitioner`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GridLayout {
    surface: SurfaceSize,
    rows: usize,
    cols: usize,
    cell_width: f32,
    cell_height: f32,
    cells: Vec<GridCell>,
}

impl GridLayout {
    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn cell(&self, index: usize) -> Option<&GridCell> {
        self.cells.get(index)
    }

    pub fn surface(&self) -> SurfaceSize {
        self.surface
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cell_width(&self) -> f32 {
        self.cell_width
    }

    pub fn cell_height(&self) -> f32 {
        self.cell_height
    }

    /// Width over height of a single cell, for the cameras drawn into it.
    pub fn cell_aspect(&self) -> f32 {
        if self.cell_height > 0.0 {
            self.cell_width / self.cell_height
        } else {
            self.cell_width
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Validated grid shape and fill count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridPartitioner {
    rows: usize,
    cols: usize,
    count: usize,
}

impl GridPartitioner {
    pub fn new(rows: usize, cols: usize, count: usize) -> Result<Self, LayoutError> {
        if rows == 0 || cols == 0 {
            return Err(LayoutError::EmptyGrid { rows, cols });
        }
        let capacity = rows.saturating_mul(cols);
        if count > capacity {
            return Err(LayoutError::GridOverflow { count, capacity });
        }
        Ok(Self { rows, cols, count })
    }

    /// A grid filled completely.
    pub fn full(rows: usize, cols: usize) -> Result<Self, LayoutError> {
        Self::new(rows, cols, rows.saturating_mul(cols))
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Place `count` cells row-major on a surface of the given size.
    pub fn compute(&self, surface_width: u32, surface_height: u32) -> GridLayout {
        let cell_width = surface_width as f32 / self.cols as f32;
        let cell_height = surface_height as f32 / self.rows as f32;

        let cells = (0..self.count)
            .map(|index| {
                let row = index / self.cols;
                let col = index % self.cols;
                GridCell {
                    index,
                    row,
                    col,
                    x: col as f32 * cell_width,
                    y: row as f32 * cell_height,
                    width: cell_width,
                    height: cell_height,
                }
            })
            .collect();

        tracing::debug!(
            width = surface_width,
            height = surface_height,
            rows = self.rows,
            cols = self.cols,
            count = self.count,
            "grid layout computed"
        );

        GridLayout {
            surface: SurfaceSize::new(surface_width, surface_height),
            rows: self.rows,
            cols: self.cols,
            cell_width,
            cell_height,
            cells,
        }
    }
}

/// One-shot grid partition: validate the shape and place the cells.
pub fn compute_grid_layout(
    surface_width: u32,
    surface_height: u32,
    rows: usize,
    cols: usize,
    count: usize,
) -> Result<GridLayout, LayoutError> {
    Ok(GridPartitioner::new(rows, cols, count)?.compute(surface_width, surface_height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn three_by_two_example() {
        let layout = compute_grid_layout(900, 600, 2, 3, 6).unwrap();
        assert_eq!(layout.len(), 6);
        for cell in layout.cells() {
            assert_eq!(cell.width, 300.0);
            assert_eq!(cell.height, 300.0);
        }
        let positions: Vec<(usize, usize)> =
            layout.cells().iter().map(|c| (c.row, c.col)).collect();
        assert_eq!(
            positions,
            vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]
        );
        assert_eq!(layout.cell(4).unwrap().pixel_rect(), Rect::new(300, 300, 300, 300));
        assert_eq!(layout.cell_aspect(), 1.0);
    }

    #[test]
    fn partial_last_row_omits_cells() {
        let layout = compute_grid_layout(900, 600, 2, 3, 4).unwrap();
        assert_eq!(layout.len(), 4);
        let last = layout.cell(3).unwrap();
        assert_eq!((last.row, last.col), (1, 0));
        assert!(layout.cell(4).is_none());
    }

    #[test]
    fn rejects_invalid_shapes() {
        assert_eq!(
            compute_grid_layout(100, 100, 0, 3, 0),
            Err(LayoutError::EmptyGrid { rows: 0, cols: 3 })
        );
        assert_eq!(
            GridPartitioner::new(2, 3, 7),
            Err(LayoutError::GridOverflow {
                count: 7,
                capacity: 6
            })
        );
    }

    #[test]
    fn recompute_is_idempotent() {
        let partitioner = GridPartitioner::new(2, 3, 5).unwrap();
        assert_eq!(partitioner.compute(901, 601), partitioner.compute(901, 601));
        assert_eq!(partitioner.compute(901, 601), compute_grid_layout(901, 601, 2, 3, 5).unwrap());
    }

    #[test]
    fn uneven_sizes_still_share_edges() {
        let layout = compute_grid_layout(1000, 701, 2, 3, 6).unwrap();
        let rects: Vec<Rect> = layout.cells().iter().map(|c| c.pixel_rect()).collect();
        assert_eq!(rects[0].right(), rects[1].x);
        assert_eq!(rects[1].right(), rects[2].x);
        assert_eq!(rects[2].right(), 1000);
        assert_eq!(rects[0].bottom(), rects[3].y);
        assert_eq!(rects[5].bottom(), 701);
    }

    proptest! {
        #[test]
        fn full_grid_tiles_surface(
            width in 1u32..4000,
            height in 1u32..4000,
            rows in 1usize..8,
            cols in 1usize..8,
        ) {
            let layout = GridPartitioner::full(rows, cols).unwrap().compute(width, height);
            prop_assert_eq!(layout.len(), rows * cols);

            let rects: Vec<Rect> = layout.cells().iter().map(|c| c.pixel_rect()).collect();
            let area: u64 = rects.iter().map(|r| r.area()).sum();
            prop_assert_eq!(area, width as u64 * height as u64);

            for (i, a) in rects.iter().enumerate() {
                prop_assert!(a.x >= 0 && a.y >= 0);
                prop_assert!(a.right() <= width as i32 && a.bottom() <= height as i32);
                for b in &rects[i + 1..] {
                    prop_assert!(!a.overlaps(b));
                }
            }
        }

        #[test]
        fn assignment_is_row_major(rows in 1usize..8, cols in 1usize..8) {
            let layout = GridPartitioner::full(rows, cols).unwrap().compute(800, 600);
            for cell in layout.cells() {
                prop_assert_eq!(cell.row, cell.index / cols);
                prop_assert_eq!(cell.col, cell.index % cols);
            }
        }
    }
}
