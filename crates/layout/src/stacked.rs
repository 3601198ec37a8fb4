use multiview_common::{Rect, SurfaceSize};

use crate::error::LayoutError;

/// Tallest stacked surface, so every band edge fits `i32` coordinates.
pub const MAX_SURFACE_HEIGHT: u32 = i32::MAX as u32;

/// One horizontal band of a stacked layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub index: usize,
    pub ratio: f64,
    pub width: u32,
    /// `floor(width * ratio)`.
    pub pixel_height: u32,
    /// Distance from the top edge of the stacked surface.
    pub top: u32,
    /// Distance of the band's bottom edge from the bottom of the surface.
    pub offset_from_bottom: u32,
}

impl Region {
    /// Band in top-left-origin pixel coordinates.
    pub fn rect(&self) -> Rect {
        Rect::new(0, self.top as i32, self.width, self.pixel_height)
    }

    /// Band in bottom-left-origin pixel coordinates.
    pub fn rect_from_bottom(&self) -> Rect {
        Rect::new(
            0,
            self.offset_from_bottom as i32,
            self.width,
            self.pixel_height,
        )
    }

    /// Vertical offset at which the whole shared surface is drawn into this
    /// region's dedicated canvas so that the band lands at the canvas origin.
    pub fn copy_offset(&self) -> i32 {
        -(self.top as i32)
    }

    /// Size of the dedicated canvas that receives this band.
    pub fn canvas_size(&self) -> SurfaceSize {
        SurfaceSize::new(self.width, self.pixel_height)
    }

    /// Width over height for the camera looking into this band.
    pub fn aspect(&self) -> f32 {
        self.canvas_size().aspect()
    }
}

/// Result of partitioning a surface into stacked bands.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StackedLayout {
    width: u32,
    total_height: u32,
    regions: Vec<Region>,
}

impl StackedLayout {
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Surface height needed to hold every band.
    pub fn total_height(&self) -> u32 {
        self.total_height
    }

    pub fn surface_size(&self) -> SurfaceSize {
        SurfaceSize::new(self.width, self.total_height)
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn region(&self, index: usize) -> Option<&Region> {
        self.regions.get(index)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Indices of the regions intersecting a vertical window of the surface,
    /// e.g. the part currently scrolled into view.
    pub fn visible(&self, scroll_top: u32, view_height: u32) -> impl Iterator<Item = &Region> {
        let view = Rect::new(0, scroll_top as i32, self.width.max(1), view_height);
        self.regions
            .iter()
            .filter(move |r| r.rect().overlaps(&view))
    }
}

/// Validated ratio list that can be laid out against any surface width.
#[derive(Debug, Clone, PartialEq)]
pub struct StackedPartitioner {
    ratios: Vec<f64>,
}

impl StackedPartitioner {
    /// Validate the ratios. Every ratio must be finite and strictly positive.
    pub fn new(ratios: impl Into<Vec<f64>>) -> Result<Self, LayoutError> {
        let ratios = ratios.into();
        if let Some((index, &ratio)) = ratios
            .iter()
            .enumerate()
            .find(|(_, r)| !(r.is_finite() && **r > 0.0))
        {
            return Err(LayoutError::InvalidRatio { index, ratio });
        }
        Ok(Self { ratios })
    }

    pub fn ratios(&self) -> &[f64] {
        &self.ratios
    }

    /// Partition a surface of the given width into bands stacked top-down.
    ///
    /// Fails with [`LayoutError::SurfaceTooTall`] when the stacked surface
    /// would not fit in `i32` pixel coordinates.
    pub fn compute(&self, surface_width: u32) -> Result<StackedLayout, LayoutError> {
        let total = self.ratios.iter().fold(0f64, |acc, ratio| {
            acc + (surface_width as f64 * ratio).floor()
        });
        if total > MAX_SURFACE_HEIGHT as f64 {
            return Err(LayoutError::SurfaceTooTall {
                total: total as u64,
                max: MAX_SURFACE_HEIGHT,
            });
        }

        let heights: Vec<u32> = self
            .ratios
            .iter()
            .map(|ratio| (surface_width as f64 * ratio).floor() as u32)
            .collect();
        let total_height: u32 = heights.iter().sum();

        let mut running = 0u32;
        let regions = self
            .ratios
            .iter()
            .zip(&heights)
            .enumerate()
            .map(|(index, (&ratio, &pixel_height))| {
                let top = running;
                running += pixel_height;
                Region {
                    index,
                    ratio,
                    width: surface_width,
                    pixel_height,
                    top,
                    offset_from_bottom: total_height - running,
                }
            })
            .collect();

        tracing::debug!(
            width = surface_width,
            regions = self.ratios.len(),
            total_height,
            "stacked layout computed"
        );

        Ok(StackedLayout {
            width: surface_width,
            total_height,
            regions,
        })
    }
}

/// One-shot stacked partition: validate `ratios` and lay them out.
pub fn compute_stacked_layout(
    surface_width: u32,
    ratios: &[f64],
) -> Result<StackedLayout, LayoutError> {
    StackedPartitioner::new(ratios)?.compute(surface_width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn two_bands_example() {
        let layout = compute_stacked_layout(1000, &[1.0, 0.5]).unwrap();
        assert_eq!(layout.total_height(), 1500);

        let r0 = layout.region(0).unwrap();
        assert_eq!(r0.rect(), Rect::new(0, 0, 1000, 1000));
        assert_eq!(r0.offset_from_bottom, 500);

        let r1 = layout.region(1).unwrap();
        assert_eq!(r1.rect(), Rect::new(0, 1000, 1000, 500));
        assert_eq!(r1.offset_from_bottom, 0);
    }

    #[test]
    fn heights_are_floored() {
        let layout = compute_stacked_layout(333, &[0.5, 1.1]).unwrap();
        let heights: Vec<u32> = layout.regions().iter().map(|r| r.pixel_height).collect();
        assert_eq!(heights, vec![166, 366]);
        assert_eq!(layout.total_height(), 532);
    }

    #[test]
    fn bottom_origin_matches_flipped_top_origin() {
        let layout = compute_stacked_layout(640, &[0.7, 1.2, 0.55]).unwrap();
        for region in layout.regions() {
            assert_eq!(
                region.rect_from_bottom(),
                region.rect().flip_y(layout.total_height())
            );
        }
    }

    #[test]
    fn copy_offset_is_negative_top() {
        let layout = compute_stacked_layout(100, &[1.0, 0.5, 0.25]).unwrap();
        let offsets: Vec<i32> = layout.regions().iter().map(|r| r.copy_offset()).collect();
        assert_eq!(offsets, vec![0, -100, -150]);
        assert_eq!(layout.region(2).unwrap().canvas_size(), SurfaceSize::new(100, 25));
    }

    #[test]
    fn rejects_non_positive_and_non_finite_ratios() {
        assert_eq!(
            compute_stacked_layout(100, &[1.0, 0.0]),
            Err(LayoutError::InvalidRatio {
                index: 1,
                ratio: 0.0
            })
        );
        assert!(matches!(
            StackedPartitioner::new(vec![-0.5]),
            Err(LayoutError::InvalidRatio { index: 0, .. })
        ));
        assert!(StackedPartitioner::new(vec![1.0, f64::NAN]).is_err());
        assert!(StackedPartitioner::new(vec![f64::INFINITY]).is_err());
    }

    #[test]
    fn empty_ratio_list_gives_empty_layout() {
        let layout = compute_stacked_layout(800, &[]).unwrap();
        assert!(layout.is_empty());
        assert_eq!(layout.total_height(), 0);
    }

    #[test]
    fn zero_width_gives_zero_height_bands() {
        let layout = compute_stacked_layout(0, &[1.0, 2.0]).unwrap();
        assert_eq!(layout.total_height(), 0);
        assert!(layout.regions().iter().all(|r| r.pixel_height == 0));
    }

    #[test]
    fn visible_regions_follow_scroll() {
        let layout = compute_stacked_layout(100, &[1.0, 1.0, 1.0]).unwrap();
        let ids: Vec<usize> = layout.visible(150, 100).map(|r| r.index).collect();
        assert_eq!(ids, vec![1, 2]);
        let ids: Vec<usize> = layout.visible(0, 100).map(|r| r.index).collect();
        assert_eq!(ids, vec![0]);
    }

    #[test]
    fn recompute_is_idempotent() {
        let partitioner = StackedPartitioner::new(vec![0.9, 0.6, 1.3]).unwrap();
        assert_eq!(partitioner.compute(777), partitioner.compute(777));
        assert!(partitioner.compute(777).is_ok());
    }

    #[test]
    fn oversized_surface_is_rejected() {
        assert_eq!(
            compute_stacked_layout(1000, &[3.0e6, 3.0e6]),
            Err(LayoutError::SurfaceTooTall {
                total: 6_000_000_000,
                max: MAX_SURFACE_HEIGHT,
            })
        );
        // A single band past the limit is rejected too.
        assert!(matches!(
            compute_stacked_layout(u32::MAX, &[1.0]),
            Err(LayoutError::SurfaceTooTall { .. })
        ));
    }

    #[test]
    fn tallest_allowed_surface_keeps_positive_coordinates() {
        let half = (MAX_SURFACE_HEIGHT / 2) as f64;
        let layout = compute_stacked_layout(1, &[half, half]).unwrap();
        assert_eq!(layout.total_height(), 2 * (MAX_SURFACE_HEIGHT / 2));
        let last = layout.region(1).unwrap();
        assert!(last.rect().y > 0);
        assert_eq!(last.rect().bottom() as u32, layout.total_height());
        assert_eq!(last.copy_offset(), -(last.top as i32));
    }

    proptest! {
        #[test]
        fn bands_tile_without_gaps_or_overlap(
            width in 0u32..4000,
            ratios in prop::collection::vec(0.01f64..3.0, 0..40),
        ) {
            let layout = compute_stacked_layout(width, &ratios).unwrap();
            prop_assert_eq!(layout.len(), ratios.len());

            let expected: u32 = ratios
                .iter()
                .map(|r| (width as f64 * r).floor() as u32)
                .sum();
            prop_assert_eq!(layout.total_height(), expected);

            let mut next_top = 0u32;
            for region in layout.regions() {
                prop_assert_eq!(region.top, next_top);
                next_top += region.pixel_height;
                prop_assert_eq!(region.offset_from_bottom, layout.total_height() - next_top);
            }
            prop_assert_eq!(next_top, layout.total_height());
        }

        #[test]
        fn total_height_grows_with_extra_ratio(
            width in 1u32..4000,
            ratios in prop::collection::vec(0.01f64..3.0, 0..20),
            extra in 0.01f64..3.0,
        ) {
            let base = compute_stacked_layout(width, &ratios).unwrap();
            let mut more = ratios.clone();
            more.push(extra);
            let grown = compute_stacked_layout(width, &more).unwrap();
            prop_assert!(grown.total_height() >= base.total_height());
        }
    }
}
