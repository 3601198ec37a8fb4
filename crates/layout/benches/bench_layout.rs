use std::hint::black_box;
use std::time::Instant;

use multiview_layout::{GridPartitioner, StackedPartitioner};

fn make_ratios(count: usize) -> Vec<f64> {
    (0..count).map(|i| 0.5 + (i % 11) as f64 * 0.1).collect()
}

fn bench_stacked(count: usize, iterations: usize) {
    let partitioner = StackedPartitioner::new(make_ratios(count)).unwrap();

    let start = Instant::now();
    for i in 0..iterations {
        let width = 800 + (i % 640) as u32;
        black_box(partitioner.compute(black_box(width)).unwrap());
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  stacked ({count} regions, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn bench_grid(rows: usize, cols: usize, iterations: usize) {
    let partitioner = GridPartitioner::full(rows, cols).unwrap();

    let start = Instant::now();
    for i in 0..iterations {
        let width = 1280 + (i % 640) as u32;
        let layout = partitioner.compute(black_box(width), black_box(720));
        for cell in layout.cells() {
            black_box(cell.pixel_rect());
        }
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  grid ({rows}x{cols}, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn main() {
    println!("=== multiview-layout benchmarks ===");

    println!("\n-- stacked recompute (per resize) --");
    bench_stacked(6, 10_000);
    bench_stacked(50, 10_000);
    bench_stacked(1_000, 1_000);

    println!("\n-- grid recompute + pixel snapping --");
    bench_grid(2, 3, 10_000);
    bench_grid(16, 16, 1_000);

    println!("\n=== done ===");
}
