use blockmotion::io::{load_gray_image, load_planes, save_planes};
use blockmotion::{
    block_compensate, load_vectors, quality, save_vectors, Algorithm, BlockGrid, EstimateConfig,
    Estimator, OwnedImage,
};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Block matching motion estimation and compensation")]
struct Cli {
    /// Enable tracing output for performance profiling.
    #[arg(long, global = true)]
    trace: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Estimate motion vectors between two frames and save them.
    Estimate(EstimateArgs),
    /// Predict a frame from a previous frame and saved motion vectors.
    Compensate(CompensateArgs),
    /// Compare two images by PSNR.
    Evaluate(EvaluateArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AlgorithmArg {
    #[value(name = "2dfs")]
    FullSearch,
    Pmvfast,
}

impl From<AlgorithmArg> for Algorithm {
    fn from(value: AlgorithmArg) -> Self {
        match value {
            AlgorithmArg::FullSearch => Algorithm::FullSearch,
            AlgorithmArg::Pmvfast => Algorithm::Pmvfast,
        }
    }
}

#[derive(clap::Args, Debug)]
struct EstimateArgs {
    /// Current image.
    #[arg(short, long, value_name = "FILE")]
    current: PathBuf,
    /// Previous image.
    #[arg(short, long, value_name = "FILE")]
    previous: PathBuf,
    /// Output motion vectors file.
    #[arg(short = 'v', long, value_name = "FILE", default_value = "motion_vectors.mv")]
    vectors: PathBuf,
    /// Block size; must divide both image dimensions.
    #[arg(short, long, default_value_t = 16)]
    block_size: usize,
    /// Integer search algorithm.
    #[arg(short, long, value_enum, default_value_t = AlgorithmArg::FullSearch)]
    algorithm: AlgorithmArg,
    /// Skip quarter-pixel refinement.
    #[arg(long)]
    no_subpixel: bool,
    /// Run full search and refinement in parallel.
    #[arg(long)]
    parallel: bool,
    /// Report the time taken by the integer search.
    #[arg(short, long)]
    time: bool,
}

#[derive(clap::Args, Debug)]
struct CompensateArgs {
    /// Previous image.
    #[arg(short, long, value_name = "FILE")]
    previous: PathBuf,
    /// Input motion vectors file.
    #[arg(short = 'v', long, value_name = "FILE")]
    vectors: PathBuf,
    /// Block size used when the vectors were estimated.
    #[arg(short, long, default_value_t = 16)]
    block_size: usize,
    /// Output image.
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,
}

#[derive(clap::Args, Debug)]
struct EvaluateArgs {
    /// Reference image.
    #[arg(value_name = "REFERENCE")]
    reference: PathBuf,
    /// Reconstructed image.
    #[arg(value_name = "RECONSTRUCTED")]
    reconstructed: PathBuf,
}

#[derive(Debug, Serialize)]
struct EstimateReport {
    algorithm: &'static str,
    block_size: usize,
    blocks_wide: usize,
    blocks_high: usize,
    vectors_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_taken_us: Option<u128>,
}

#[derive(Debug, Serialize)]
struct EvaluateReport {
    psnr_db: f64,
    mse: f64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("blockmotion=info".parse()?),
            )
            .with_target(false)
            .init();
    }

    match cli.command {
        Command::Estimate(args) => estimate(args),
        Command::Compensate(args) => compensate(args),
        Command::Evaluate(args) => evaluate(args),
    }
}

fn estimate(args: EstimateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let current = load_gray_image(&args.current)?;
    let previous = load_gray_image(&args.previous)?;

    let estimator = Estimator::new(EstimateConfig {
        algorithm: args.algorithm.into(),
        block_size: args.block_size,
        subpixel: !args.no_subpixel,
        parallel: args.parallel,
    });

    let start = Instant::now();
    let mut field = estimator.estimate_integer(current.view(), previous.view())?;
    let elapsed = start.elapsed();

    if estimator.config().subpixel {
        estimator.refine(current.view(), previous.view(), &mut field)?;
    }
    save_vectors(field.vectors(), &args.vectors)?;

    let grid = field.grid();
    let report = EstimateReport {
        algorithm: estimator.config().algorithm.name(),
        block_size: grid.block_size(),
        blocks_wide: grid.blocks_wide(),
        blocks_high: grid.blocks_high(),
        vectors_path: args.vectors.display().to_string(),
        time_taken_us: args.time.then(|| elapsed.as_micros()),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn compensate(args: CompensateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let planes = load_planes(&args.previous)?;
    let vectors = load_vectors(&args.vectors)?;

    let first = planes.first().ok_or("previous image has no planes")?;
    let grid = BlockGrid::new(first.width(), first.height(), args.block_size)?;
    if vectors.len() != grid.len() {
        return Err(format!(
            "motion vectors do not match the image with block size {}: got {}, expected {}",
            args.block_size,
            vectors.len(),
            grid.len()
        )
        .into());
    }

    tracing::info!(planes = planes.len(), blocks = grid.len(), "compensating");
    let mut outputs = Vec::with_capacity(planes.len());
    for plane in &planes {
        let mut output = OwnedImage::zeros(plane.width(), plane.height())?;
        block_compensate(plane.view(), &vectors, args.block_size, &mut output)?;
        outputs.push(output);
    }
    save_planes(&outputs, &args.output)?;
    Ok(())
}

fn evaluate(args: EvaluateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let reference = load_gray_image(&args.reference)?;
    let reconstructed = load_gray_image(&args.reconstructed)?;
    let report = EvaluateReport {
        psnr_db: quality::psnr(reference.view(), reconstructed.view())?,
        mse: quality::mse(reference.view(), reconstructed.view())?,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
