pub mod blob;
pub mod config;
pub mod error;
pub mod palette;
pub mod poster;
pub mod render;
pub mod rng;
pub mod session;

use std::time::Instant;

use config::PosterParams;
use error::PosterResult;
use poster::Poster;
use render::{Figure, Raster};

pub use poster::draw_poster;
pub use render::render_palette;

/// Everything one generation pass produces.
pub struct Generated {
    pub poster: Poster,
    pub figure: Figure,
    pub raster: Raster,
}

pub struct Timing {
    pub name: &'static str,
    pub ms: f64,
}

/// Compose, lay out and rasterize a poster. `params` are used as given;
/// shells clamp them first.
pub fn generate(params: &PosterParams, scale: f32) -> PosterResult<(Generated, Vec<Timing>)> {
    let mut timings = Vec::new();
    let total_start = Instant::now();

    // 1. Compose layers
    let t = Instant::now();
    let poster = draw_poster(
        params.layers,
        params.wobble,
        &params.palette,
        params.seed,
        &params.caption,
    );
    timings.push(Timing {
        name: "compose",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });

    // 2. Vector figure
    let t = Instant::now();
    let figure = render::poster_figure(&poster);
    timings.push(Timing {
        name: "figure",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });

    // 3. Rasterize
    let t = Instant::now();
    let raster = figure.rasterize(scale)?;
    timings.push(Timing {
        name: "raster",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });

    let total_ms = total_start.elapsed().as_secs_f64() * 1000.0;
    timings.push(Timing {
        name: "TOTAL",
        ms: total_ms,
    });
    tracing::info!(
        seed = params.seed,
        layers = params.layers,
        ms = total_ms,
        "poster generated"
    );

    Ok((
        Generated {
            poster,
            figure,
            raster,
        },
        timings,
    ))
}
