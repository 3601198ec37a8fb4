use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use multiview_common::SurfaceSize;
use multiview_layout::{compute_grid_layout, compute_stacked_layout};
use multiview_render::{
    CompositeMode, DebugTextRenderer, DemoCompositor, FramePlan, RecordingCanvas,
    RecordingRenderer, initial_mode,
};
use multiview_scene::{Demo, DemoConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "multiview-cli", about = "Inspect multi-viewport layouts and frame plans")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate versions
    Info,
    /// Partition a surface into stacked bands
    Stacked {
        /// Surface width in pixels
        #[arg(short, long, default_value = "1000")]
        width: u32,
        /// Band heights as multiples of the width
        #[arg(short, long, value_delimiter = ',', default_value = "1.0,0.5")]
        ratios: Vec<f64>,
    },
    /// Partition a surface into a grid of cells
    Grid {
        #[arg(long, default_value = "900")]
        width: u32,
        #[arg(long, default_value = "600")]
        height: u32,
        #[arg(long, default_value = "2")]
        rows: usize,
        #[arg(long, default_value = "3")]
        cols: usize,
        /// Cells to place; defaults to rows * cols
        #[arg(long)]
        count: Option<usize>,
    },
    /// Run one tick of a demo against the recording renderer
    Plan {
        /// stacked, copy-out, toggle or grid
        #[arg(short, long)]
        demo: Option<Demo>,
        #[arg(long)]
        width: Option<u32>,
        #[arg(long)]
        height: Option<u32>,
        #[arg(short, long)]
        seed: Option<u64>,
        /// JSON demo config; flags override its values
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Also print the recorded renderer commands
        #[arg(long)]
        commands: bool,
    },
}

fn load_config(path: Option<&Path>) -> anyhow::Result<DemoConfig> {
    let Some(path) = path else {
        return Ok(DemoConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config = DemoConfig::from_json(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("multiview-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("layout: {}", multiview_layout::crate_info());
            println!("scene: {}", multiview_scene::crate_info());
            println!("render: {}", multiview_render::crate_info());
        }
        Commands::Stacked { width, ratios } => {
            let layout = compute_stacked_layout(width, &ratios)?;
            println!(
                "Stacked layout: width={}, bands={}, total_height={}",
                layout.width(),
                layout.len(),
                layout.total_height()
            );
            for region in layout.regions() {
                println!(
                    "  [{:>3}] ratio={:.3} top={} height={} from_bottom={} copy_dy={}",
                    region.index,
                    region.ratio,
                    region.top,
                    region.pixel_height,
                    region.offset_from_bottom,
                    region.copy_offset()
                );
            }
        }
        Commands::Grid {
            width,
            height,
            rows,
            cols,
            count,
        } => {
            let count = count.unwrap_or(rows.saturating_mul(cols));
            let layout = compute_grid_layout(width, height, rows, cols, count)?;
            println!(
                "Grid layout: {}x{} surface, {}x{} cells of {:.1}x{:.1}",
                width,
                height,
                layout.rows(),
                layout.cols(),
                layout.cell_width(),
                layout.cell_height()
            );
            for cell in layout.cells() {
                let r = cell.pixel_rect();
                println!(
                    "  [{:>3}] row={} col={} rect=({}, {}) {}x{}",
                    cell.index, cell.row, cell.col, r.x, r.y, r.width, r.height
                );
            }
        }
        Commands::Plan {
            demo,
            width,
            height,
            seed,
            config,
            commands,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(demo) = demo {
                config.demo = demo;
            }
            if let Some(width) = width {
                config.width = width;
            }
            if let Some(height) = height {
                config.height = height;
            }
            if let Some(seed) = seed {
                config.seed = seed;
            }

            tracing::debug!(?config, "demo config resolved");

            println!(
                "Demo {}: {}x{}, seed={}",
                config.demo, config.width, config.height, config.seed
            );

            let mut renderer = RecordingRenderer::new();
            let plans: Vec<FramePlan> = match DemoCompositor::build(&config)? {
                DemoCompositor::Stacked(compositor) => match initial_mode(config.demo) {
                    CompositeMode::Scissored => {
                        vec![compositor.draw_scissored(&mut renderer, 0, config.height)?]
                    }
                    CompositeMode::DedicatedCanvases => {
                        let mut canvases: Vec<RecordingCanvas> = Vec::new();
                        compositor.draw_to_canvases(&mut renderer, &mut canvases)?
                    }
                },
                DemoCompositor::Grid(mut compositor) => {
                    let size = SurfaceSize::new(config.width, config.height);
                    vec![compositor.tick(&mut renderer, size, None)?]
                }
            };

            let text = DebugTextRenderer::new();
            for plan in &plans {
                print!("{}", text.render_plan(plan));
            }
            println!("render calls: {}", renderer.render_count());

            if commands {
                println!("Commands:");
                for command in renderer.commands() {
                    println!("  {command:?}");
                }
            }
        }
    }

    Ok(())
}
