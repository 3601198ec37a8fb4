//! Layout Partitioner: divides a drawing surface into per-scene regions.
//!
//! Two modes:
//! - **Stacked**: horizontal bands, one per ratio, each `floor(width * ratio)`
//!   pixels tall, stacked top-down from index 0.
//! - **Grid**: uniform `rows x cols` cells assigned row-major.
//!
//! # Invariants
//! - Layouts are pure functions of their inputs; recomputing with identical
//!   inputs yields identical output.
//! - Layouts are replaced wholesale on every resize, never patched.
//! - Contract violations (non-positive ratios, overfull grids) are rejected
//!   when the partitioner is constructed, not at draw time.

mod error;
mod grid;
mod palette;
mod stacked;

pub use error::LayoutError;
pub use grid::{GridCell, GridLayout, GridPartitioner, compute_grid_layout};
pub use palette::ClearColorPolicy;
pub use stacked::{
    MAX_SURFACE_HEIGHT, Region, StackedLayout, StackedPartitioner, compute_stacked_layout,
};

pub fn crate_info() -> &'static str {
    "multiview-layout v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("layout"));
    }
}
