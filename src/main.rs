use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use posterkit::config::{self, DEFAULT_SEED, PosterParams};
use posterkit::palette::{self, PALETTE, PALETTE_TITLE};
use posterkit::render;

/// Render the palette preview and an abstract blob poster to PNG.
#[derive(Parser, Debug)]
#[command(name = "posterkit", version, about)]
struct Args {
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Number of blob layers (clamped to 3..=30).
    #[arg(long, default_value_t = 12)]
    layers: usize,

    /// Per-vertex radius noise (clamped to 0.0..=0.5).
    #[arg(long, default_value_t = 0.2)]
    wobble: f64,

    /// Caption text; empty uses the default caption.
    #[arg(long, default_value = "")]
    caption: String,

    /// 1-based palette indices, e.g. `1,2,3`. Omit for all 20 colors.
    #[arg(long, value_delimiter = ',')]
    colors: Vec<usize>,

    /// Device pixels per figure pixel (clamped to 0.25..=4.0).
    #[arg(long, default_value_t = 1.0)]
    scale: f32,

    /// Also write the SVG figures.
    #[arg(long)]
    svg: bool,

    #[arg(long, default_value = "artifacts")]
    out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let scale = config::clamp_scale(args.scale);

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output directory '{}'", args.out_dir.display()))?;

    let params = PosterParams {
        layers: args.layers,
        wobble: args.wobble,
        seed: args.seed,
        caption: args.caption,
        palette: palette::select(&args.colors),
    }
    .clamped();

    tracing::info!(
        seed = params.seed,
        layers = params.layers,
        wobble = params.wobble,
        colors = params.palette.len(),
        "generating poster"
    );

    let (generated, timings) = posterkit::generate(&params, scale)?;

    eprintln!("\nTimings:");
    for t in &timings {
        eprintln!("  {:20} {:8.1} ms", t.name, t.ms);
    }

    let write = |name: &str, bytes: &[u8]| -> anyhow::Result<()> {
        let path = args.out_dir.join(name);
        std::fs::write(&path, bytes).with_context(|| format!("write '{}'", path.display()))?;
        tracing::info!(path = %path.display(), "saved");
        Ok(())
    };

    // 1. Palette preview
    let palette_fig = render::render_palette(&PALETTE, PALETTE_TITLE);
    let palette_png = palette_fig.rasterize(scale)?.encode_png()?;
    write("palette.png", &palette_png)?;

    // 2. Poster
    write("poster.png", &generated.raster.encode_png()?)?;

    if args.svg {
        write("palette.svg", palette_fig.svg.as_bytes())?;
        write("poster.svg", generated.figure.svg.as_bytes())?;
    }

    eprintln!(
        "\nseed={} layers={} caption=\"{}\"",
        params.seed,
        generated.poster.layers.len(),
        generated.poster.caption
    );

    Ok(())
}
