use crate::palette::{self, Color};

pub const MIN_LAYERS: usize = 3;
pub const MAX_LAYERS: usize = 30;
pub const MIN_WOBBLE: f64 = 0.0;
pub const MAX_WOBBLE: f64 = 0.5;
pub const DEFAULT_SEED: u64 = 42;
pub const MIN_SCALE: f32 = 0.25;
pub const MAX_SCALE: f32 = 4.0;

/// Raster scale as accepted from a shell; non-finite values become 1.0.
pub fn clamp_scale(scale: f32) -> f32 {
    if scale.is_finite() {
        scale.clamp(MIN_SCALE, MAX_SCALE)
    } else {
        1.0
    }
}

/// All user-facing poster parameters, exposed as form controls in the frontend.
#[derive(Clone, Debug, PartialEq)]
pub struct PosterParams {
    pub layers: usize,
    pub wobble: f64,
    pub seed: u64,
    /// Empty means the default caption.
    pub caption: String,
    pub palette: Vec<Color>,
}

impl Default for PosterParams {
    fn default() -> Self {
        Self {
            layers: 12,
            wobble: 0.2,
            seed: DEFAULT_SEED,
            caption: String::new(),
            palette: palette::canonical(),
        }
    }
}

impl PosterParams {
    /// Pull values into the ranges the controls allow. An empty palette
    /// becomes the full canonical one.
    pub fn clamped(mut self) -> Self {
        self.layers = self.layers.clamp(MIN_LAYERS, MAX_LAYERS);
        self.wobble = if self.wobble.is_nan() {
            Self::default().wobble
        } else {
            self.wobble.clamp(MIN_WOBBLE, MAX_WOBBLE)
        };
        if self.palette.is_empty() {
            self.palette = palette::canonical();
        }
        self
    }
}
