//! lightmap-uv CLI - lightmap UV generation from the command line.
//!
//! Usage: lightmap-uv <COMMAND> [OPTIONS] <INPUT> [OUTPUT]
//!
//! Run `lightmap-uv --help` for available commands. Set `RUST_LOG=debug` to
//! see each pipeline step.

use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand};

use lightmap_uv::algo::lightmap::create_lightmap_uv_with_progress;
use lightmap_uv::algo::{CancelToken, Progress};
use lightmap_uv::config::{parse_tolerance, LightmapOptions, TextureSize, DEFAULT_TOLERANCE_DEGREES};
use lightmap_uv::io;
use lightmap_uv::mesh::PolyMesh;

#[derive(Parser)]
#[command(name = "lightmap-uv")]
#[command(author, version, about = "Lightmap UV generation CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display mesh and UV set information
    Info {
        /// Input mesh file
        input: PathBuf,
    },

    /// Create a lightmap UV set and write the result as OBJ
    Create {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file (.obj)
        output: PathBuf,

        /// Weld tolerance in degrees; invalid input falls back to 5
        #[arg(short, long, default_value_t = DEFAULT_TOLERANCE_DEGREES.to_string())]
        tolerance: String,

        /// Lightmap texture size (32, 64, 128, 256, 512, 1024 or 2048)
        #[arg(short = 's', long, default_value_t = TextureSize::default())]
        texture_size: TextureSize,

        /// Keep construction history instead of deleting it first
        #[arg(long)]
        keep_history: bool,

        /// Use single-threaded execution (for benchmarking)
        #[arg(long)]
        sequential: bool,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info { input } => {
            cmd_info(&input)?;
        }

        Commands::Create {
            input,
            output,
            tolerance,
            texture_size,
            keep_history,
            sequential,
        } => {
            cmd_create(&input, &output, &tolerance, texture_size, keep_history, sequential)?;
        }
    }

    Ok(())
}

/// Create a progress reporter that displays a progress bar on the terminal.
fn create_progress() -> Progress {
    let max_percent = Arc::new(AtomicUsize::new(0));

    Progress::new(move |current, total, message| {
        if total == 0 {
            return;
        }

        let raw_percent = if current >= total {
            100
        } else {
            ((current * 100) + (total / 2)) / total
        };

        // Monotonic: redraw only when the percentage grows
        let previous = max_percent.fetch_max(raw_percent, Ordering::Relaxed);
        if raw_percent <= previous && raw_percent != 100 {
            return;
        }

        let bar_width = 30;
        let filled = (raw_percent * bar_width) / 100;
        let bar = "=".repeat(filled);
        let space = " ".repeat(bar_width - filled);

        eprint!("\r[{}{}] {:3}% {}", bar, space, raw_percent, message);
        let _ = std::io::stderr().flush();

        if current >= total {
            eprintln!();
        }
    })
}

/// Cancel the seam pass on the first Ctrl-C, exit on the second.
fn interrupt_token() -> Result<CancelToken, ctrlc::Error> {
    let token = CancelToken::new();
    let handle = token.clone();
    ctrlc::set_handler(move || {
        if handle.is_cancelled() {
            std::process::exit(130);
        }
        eprintln!("\ninterrupt: stopping seam pass (press Ctrl-C again to abort)");
        handle.cancel();
    })?;
    Ok(token)
}

fn cmd_info(input: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let mesh = io::load(input)?;

    println!("File: {}", input.display());
    println!("Vertices: {}", mesh.num_vertices());
    println!("Faces: {}", mesh.num_faces());
    println!("Edges: {}", mesh.num_edges());

    let boundary = mesh.edges().filter(|(_, e)| e.is_boundary()).count();
    let non_manifold = mesh.edges().filter(|(_, e)| e.is_non_manifold()).count();
    if boundary == 0 {
        println!("Topology: Closed (no boundary)");
    } else {
        println!("Topology: Open ({} boundary edges)", boundary);
    }
    if non_manifold > 0 {
        println!("Non-manifold edges: {}", non_manifold);
    }

    println!("Surface area: {:.6}", mesh.surface_area());
    if let Some((min, max)) = mesh.bounding_box() {
        let diag = max - min;
        println!("Dimensions: {:.3} x {:.3} x {:.3}", diag.x, diag.y, diag.z);
    }

    print_uv_sets(&mesh)?;
    Ok(())
}

fn print_uv_sets(mesh: &PolyMesh) -> Result<(), Box<dyn std::error::Error>> {
    let active = mesh.active_uv_set_name();
    println!("UV sets:");
    for name in mesh.uv_set_names() {
        let marker = if Some(name) == active { "*" } else { " " };
        println!("  {} {}", marker, name);
    }
    if active.is_some() {
        println!("Active UV islands: {}", mesh.uv_islands()?.len());
    }
    Ok(())
}

fn cmd_create(
    input: &PathBuf,
    output: &PathBuf,
    tolerance: &str,
    texture_size: TextureSize,
    keep_history: bool,
    sequential: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if io::Format::from_path(output) != Some(io::Format::Obj) {
        return Err(format!("output {} must be an .obj file", output.display()).into());
    }

    let mut mesh = io::load(input)?;
    println!("Loaded: {} vertices, {} faces", mesh.num_vertices(), mesh.num_faces());

    let options = LightmapOptions::default()
        .with_tolerance(parse_tolerance(tolerance))
        .with_texture_size(texture_size)
        .with_delete_history(!keep_history)
        .with_parallel(!sequential);

    let mode = if sequential { "sequential" } else { "parallel" };
    println!(
        "Creating lightmap UVs (tolerance {}°, {}px texture, {})...",
        options.tolerance_degrees, texture_size, mode
    );
    let progress = create_progress().with_cancel(interrupt_token()?);

    let start = Instant::now();
    let report = create_lightmap_uv_with_progress(Some(&mut mesh), &options, &progress)?;
    let elapsed = start.elapsed();

    if let Some(report) = report {
        if report.seams.cancelled {
            println!(
                "Interrupted: seams cover {} of {} faces; remaining faces stay separate islands",
                report.seams.faces_processed, report.seams.total_faces
            );
        }
        println!(
            "Result: {} welds, {} degenerate pairs, {} UV islands",
            report.seams.welded_pair_set().len(),
            report.seams.degenerate_pairs,
            mesh.uv_islands()?.len()
        );
    }
    io::save(&mesh, output)?;
    println!("Saved: {} ({:.2?})", output.display(), elapsed);

    Ok(())
}
