/// Contract violations detected when a partitioner is built.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("ratio at index {index} must be finite and greater than zero, got {ratio}")]
    InvalidRatio { index: usize, ratio: f64 },
    #[error("stacked surface would be {total} px tall, more than the {max} px limit")]
    SurfaceTooTall { total: u64, max: u32 },
    #[error("grid needs at least one row and one column, got {rows}x{cols}")]
    EmptyGrid { rows: usize, cols: usize },
    #[error("cannot place {count} cells in a grid with capacity {capacity}")]
    GridOverflow { count: usize, capacity: usize },
}
