use crate::blob::{DEFAULT_POINTS, generate_blob};
use crate::palette::{Color, FALLBACK};
use crate::rng::Rng;

/// 6x8 in at 100 px/in.
pub const POSTER_WIDTH: u32 = 600;
pub const POSTER_HEIGHT: u32 = 800;
pub const BACKGROUND: Color = Color::new(0.97, 0.97, 0.97);

pub const DEFAULT_CAPTION: &str = "Interactive Poster • My 20-Color Palette";
/// Caption anchor in data coordinates (left, baseline).
pub const CAPTION_POS: [f64; 2] = [0.05, 0.95];
pub const CAPTION_PT: f64 = 12.0;

pub const RADIUS_RANGE: (f64, f64) = (0.15, 0.45);
pub const OPACITY_RANGE: (f64, f64) = (0.3, 0.6);

/// One filled blob. Vertices are in data coordinates, (0,1)x(0,1), y up.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    pub center: [f64; 2],
    pub radius: f64,
    pub vertices: Vec<[f64; 2]>,
    pub color: Color,
    pub opacity: f64,
}

/// A composed poster. Layers are in paint order, back to front.
#[derive(Clone, Debug, PartialEq)]
pub struct Poster {
    pub width: u32,
    pub height: u32,
    pub background: Color,
    pub layers: Vec<Layer>,
    pub caption: String,
}

/// Compose `layers` random blobs from `palette` into a poster.
///
/// All randomness comes from one `Rng` seeded with `seed`, so equal inputs
/// give equal posters. An empty palette uses red/green/blue; an empty caption
/// uses [`DEFAULT_CAPTION`]. Inputs are not range-checked here.
#[tracing::instrument(skip(palette, caption), fields(colors = palette.len()))]
pub fn draw_poster(
    layers: usize,
    wobble: f64,
    palette: &[Color],
    seed: u64,
    caption: &str,
) -> Poster {
    let mut rng = Rng::new(seed);
    let palette = if palette.is_empty() { &FALLBACK[..] } else { palette };

    let mut out = Vec::with_capacity(layers);
    for _ in 0..layers {
        let cx = rng.next_f64();
        let cy = rng.next_f64();
        let radius = rng.range_f64(RADIUS_RANGE.0, RADIUS_RANGE.1);
        let vertices = generate_blob(&mut rng, [cx, cy], radius, DEFAULT_POINTS, wobble);
        let color = palette[rng.range_usize(palette.len())];
        let opacity = rng.range_f64(OPACITY_RANGE.0, OPACITY_RANGE.1);
        out.push(Layer {
            center: [cx, cy],
            radius,
            vertices,
            color,
            opacity,
        });
    }

    let caption = if caption.is_empty() {
        DEFAULT_CAPTION.to_string()
    } else {
        caption.to_string()
    };

    tracing::debug!(layers = out.len(), "poster composed");

    Poster {
        width: POSTER_WIDTH,
        height: POSTER_HEIGHT,
        background: BACKGROUND,
        layers: out,
        caption,
    }
}
