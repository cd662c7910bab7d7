use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use image::{GrayImage, Luma};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;
use sph_projection::{
    project_with_sinks, Field2, ImageScale, ParticleSet, ProjectionParams, RasterBackend, Vec3,
    ViewAxes,
};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "sph-project")]
#[command(about = "Project a synthetic SPH particle cloud onto an image")]
struct Cli {
    /// JSON file with projection parameters; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(short = 'n', long, default_value = "200000")]
    particles: usize,

    #[arg(long, default_value = "42")]
    seed: u64,

    /// Number of dense clumps seeded into the cloud, each flagged as a sink
    #[arg(long, default_value = "3")]
    clumps: usize,

    #[arg(long)]
    width: Option<f64>,

    #[arg(long)]
    pps: Option<usize>,

    /// Slab thickness as a fraction of the width
    #[arg(long)]
    depth: Option<f64>,

    /// xy, xz or yz
    #[arg(long)]
    axes: Option<String>,

    /// log or linear
    #[arg(long)]
    imscale: Option<String>,

    /// parallel or sequential
    #[arg(long)]
    backend: Option<String>,

    /// Write an 8-bit greyscale preview here (format from the extension, e.g. .png or .pgm)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn load_params(cli: &Cli) -> Result<ProjectionParams> {
    let mut params = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => ProjectionParams {
            width: 4.0,
            pps: 256,
            ..ProjectionParams::default()
        },
    };
    if let Some(width) = cli.width {
        params.width = width;
    }
    if let Some(pps) = cli.pps {
        params.pps = pps;
    }
    if cli.depth.is_some() {
        params.depth = cli.depth;
    }
    if let Some(axes) = &cli.axes {
        params.axes = axes.parse::<ViewAxes>()?;
    }
    if let Some(imscale) = &cli.imscale {
        params.imscale = imscale.parse::<ImageScale>()?;
    }
    if let Some(backend) = &cli.backend {
        params.backend = backend.parse::<RasterBackend>()?;
    }
    Ok(params)
}

/// Gaussian background plus a few compact clumps; the densest particle of each
/// clump is marked as a sink. Also returns the clump centers.
fn synthetic_cloud(n: usize, clumps: usize, seed: u64) -> Result<(ParticleSet, Vec<Vec3>)> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut positions = Vec::with_capacity(n);
    let mut density = Vec::with_capacity(n);
    let mut smoothing = Vec::with_capacity(n);
    let mut masses = Vec::with_capacity(n);
    let mut sinks = Vec::with_capacity(clumps);

    let centers: Vec<Vec3> = (0..clumps)
        .map(|_| {
            Vec3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-0.3..0.3),
            )
        })
        .collect();
    let per_clump = if clumps == 0 { 0 } else { n / (4 * clumps) };

    for k in 0..n {
        let clump = if per_clump > 0 { k / per_clump } else { clumps };
        let (center, spread) = match centers.get(clump) {
            Some(center) => (*center, 0.08),
            None => (Vec3::zero(), 0.8),
        };
        let offset = Vec3::new(
            rng.sample(StandardNormal),
            rng.sample(StandardNormal),
            rng.sample(StandardNormal),
        );
        let r2 = offset.x * offset.x + offset.y * offset.y + offset.z * offset.z;
        let rho = (-0.5 * r2).exp() / (spread * spread * spread);
        if clump < clumps && k % per_clump == 0 {
            sinks.push(k);
            positions.push(center);
            density.push(rho * 10.0);
        } else {
            positions.push(center.add(offset.scale(spread)));
            density.push(rho);
        }
        smoothing.push(0.05 * rho.powf(-1.0 / 3.0));
        masses.push(1.0);
    }

    let particles = ParticleSet::new(positions, density, smoothing)?
        .with_masses(masses)?
        .with_sinks(sinks)?;
    Ok((particles, centers))
}

fn image_to_luma(image: &Field2) -> GrayImage {
    let pps = image.grid().pps();
    let (min_value, max_value) = image.min_max();
    let span = (max_value - min_value).max(f64::MIN_POSITIVE);
    let side = pps as u32;
    // Image rows run top to bottom; flip so +y points up.
    GrayImage::from_fn(side, side, |px, py| {
        let value = image.get(px as usize, pps - 1 - py as usize);
        let t = if value.is_finite() {
            ((value - min_value) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Luma([(t * 255.0) as u8])
    })
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(true).init();

    let cli = Cli::parse();
    let params = load_params(&cli)?;
    let (particles, centers) = synthetic_cloud(cli.particles, cli.clumps, cli.seed)?;
    info!(
        particles = particles.len(),
        sinks = particles.sink_ids().len(),
        axes = %params.axes,
        width = params.width,
        pps = params.pps,
        "projecting synthetic cloud"
    );

    let start = Instant::now();
    let projection = project_with_sinks(&particles, &params, &[&centers[..]])?;
    info!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        skipped = projection.stats.skipped,
        "projection finished"
    );
    for sink in &projection.sinks {
        info!(x = sink.x, y = sink.y, z = sink.z, mass = sink.mass, "sink");
    }
    for center in projection.markers.iter().flatten() {
        info!(x = center.x, y = center.y, depth = center.z, "clump center");
    }

    if let Some(path) = &cli.output {
        image_to_luma(&projection.image)
            .save(path)
            .with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "wrote preview");
    }
    Ok(())
}
