//! Framelet extraction and body mesh generation from the command line.

use clap::{Args, Parser, Subcommand};
use pushframe::camera::TargetBody;
use pushframe::core::{level_from_verbosity, CoordinateExtent};
use pushframe::mesh::{generate_sphere, save_obj, SphereParams};
use pushframe::pipeline::{extract, product_id_from_path, AcquisitionMetadata};
use pushframe::raster::{load_strip, save_normalized_png, write_framelets};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(author, version, about = "Pushframe strip tools")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Split a raw strip into per-band framelet images
    Framelets(FrameletArgs),
    /// Write a lat/lon bounded body mesh as Wavefront OBJ
    Mesh(MeshArgs),
}

#[derive(Args, Debug)]
struct FrameletArgs {
    /// Raw strip image (8- or 16-bit grayscale)
    strip: PathBuf,

    /// Output directory
    #[arg(long)]
    out: PathBuf,

    /// Rows per band framelet
    #[arg(long, default_value_t = 128)]
    band_height: usize,

    /// Exposures dropped from each end of the strip
    #[arg(long, default_value_t = 0)]
    skip_triplets: usize,

    /// Rows trimmed from the top and bottom of every framelet
    #[arg(long, default_value_t = 0)]
    vertical_trim: usize,

    /// File name prefix; defaults to the label's PRODUCT_ID or the strip stem
    #[arg(long)]
    product_id: Option<String>,

    /// PDS label of the strip
    #[arg(long)]
    label: Option<PathBuf>,

    /// Keep framelet files that already exist
    #[arg(long, default_value_t = false)]
    skip_existing: bool,

    /// Also write the whole strip, stretched to the 16-bit range, as PNG
    #[arg(long)]
    preview: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct MeshArgs {
    /// Target body
    #[arg(long, default_value_t = TargetBody::Jupiter)]
    target: TargetBody,

    #[arg(long, default_value_t = -90.0, allow_hyphen_values = true)]
    min_lat: f64,

    #[arg(long, default_value_t = 90.0, allow_hyphen_values = true)]
    max_lat: f64,

    #[arg(long, default_value_t = -180.0, allow_hyphen_values = true)]
    min_lon: f64,

    #[arg(long, default_value_t = 180.0, allow_hyphen_values = true)]
    max_lon: f64,

    #[arg(long, default_value_t = 128)]
    lat_slices: usize,

    #[arg(long, default_value_t = 256)]
    lon_slices: usize,

    /// Multiplier applied to vertex positions (km)
    #[arg(long, default_value_t = 1.0)]
    scalar: f64,

    /// Close the longitude seam
    #[arg(long, default_value_t = false)]
    wrap: bool,

    /// Output OBJ file
    #[arg(long)]
    out: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Framelets(args) => run_framelets(args),
        Command::Mesh(args) => run_mesh(args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(not(feature = "tracing"))]
fn init_logging(verbose: u8) {
    let _ = pushframe::core::init_with_level(level_from_verbosity(verbose));
}

#[cfg(feature = "tracing")]
fn init_logging(verbose: u8) {
    pushframe::core::init_tracing(false);
    log::set_max_level(level_from_verbosity(verbose));
}

fn product_id(args: &FrameletArgs) -> Result<String, Box<dyn std::error::Error>> {
    if let Some(id) = &args.product_id {
        return Ok(id.clone());
    }
    if let Some(label) = &args.label {
        if let Some(id) = AcquisitionMetadata::load(label)?.product_id {
            return Ok(id);
        }
    }
    Ok(product_id_from_path(&args.strip))
}

fn run_framelets(args: FrameletArgs) -> Result<(), Box<dyn std::error::Error>> {
    let prefix = product_id(&args)?;
    let strip = load_strip(&args.strip)?;
    let framelets = extract(&strip.view(), args.band_height)?
        .skip_triplets(args.skip_triplets)
        .trim_vertical(args.vertical_trim)?;
    if framelets.is_empty() {
        return Err(format!("no exposures left after skipping {} triplets", args.skip_triplets).into());
    }

    let written = write_framelets(&framelets, &prefix, &args.out, args.skip_existing)?;
    if let Some(preview) = &args.preview {
        save_normalized_png(&strip, preview)?;
        log::info!("strip preview written to {}", preview.display());
    }
    println!(
        "{} framelets from {} exposures written to {}",
        written.len(),
        framelets.num_exposures(),
        args.out.display()
    );
    Ok(())
}

fn run_mesh(args: MeshArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.min_lat >= args.max_lat || args.min_lon >= args.max_lon {
        return Err("mesh window must have min < max on both axes".into());
    }
    let window = CoordinateExtent::new(args.min_lat, args.max_lat, args.min_lon, args.max_lon);
    let params = SphereParams {
        lat_slices: args.lat_slices,
        lon_slices: args.lon_slices,
        wrap: args.wrap,
    };
    let mesh = generate_sphere(&window, &params, args.target)?;
    save_obj(&mesh, args.scalar, &args.out)?;
    println!(
        "{} mesh with {} vertices and {} faces written to {}",
        args.target,
        mesh.vertices.len(),
        mesh.faces.len(),
        args.out.display()
    );
    Ok(())
}
