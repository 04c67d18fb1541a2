use serde::Serialize;

/// RGB color with channels in [0, 1].
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    pub fn to_rgb8(self) -> [u8; 3] {
        let q = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }

    pub fn hex(self) -> String {
        let [r, g, b] = self.to_rgb8();
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }
}

pub const PALETTE_SIZE: usize = 20;

/// The canonical poster palette. User-facing indices are 1-based.
pub const PALETTE: [Color; PALETTE_SIZE] = [
    Color::new(0.1, 0.3, 0.8),
    Color::new(0.9, 0.8, 0.5),
    Color::new(0.9, 0.4, 0.3),
    Color::new(0.2, 0.6, 0.3),
    Color::new(0.9, 0.9, 0.95),
    Color::new(0.4, 0.7, 1.0),
    Color::new(1.0, 0.8, 0.2),
    Color::new(0.3, 0.8, 0.2),
    Color::new(0.9, 0.2, 0.4),
    Color::new(0.7, 0.5, 0.9),
    Color::new(1.0, 1.0, 0.4),
    Color::new(0.6, 0.1, 0.5),
    Color::new(0.5, 1.0, 0.7),
    Color::new(1.0, 0.7, 0.6),
    Color::new(0.5, 0.25, 0.1),
    Color::new(0.8, 0.95, 1.0),
    Color::new(0.6, 0.6, 0.6),
    Color::new(1.0, 0.3, 0.1),
    Color::new(0.1, 0.1, 0.2),
    Color::new(0.7, 0.3, 0.7),
];

/// Color guide names, same order as [`PALETTE`].
pub const NAMES: [&str; PALETTE_SIZE] = [
    "blue", "beige", "orange", "green", "white",
    "sky blue", "gold", "lime", "pink", "lavender",
    "yellow", "purple", "mint", "peach", "brown",
    "ice blue", "gray", "red", "navy", "magenta",
];

pub const PALETTE_TITLE: &str = "My 20-Color Palette";

/// Used by the composer when it is handed an empty palette.
pub const FALLBACK: [Color; 3] = [
    Color::new(1.0, 0.0, 0.0),
    Color::new(0.0, 1.0, 0.0),
    Color::new(0.0, 0.0, 1.0),
];

pub fn canonical() -> Vec<Color> {
    PALETTE.to_vec()
}

/// Pick colors by 1-based index, keeping the caller's order.
/// Unknown indices are skipped; an empty result falls back to the full palette.
pub fn select(indices: &[usize]) -> Vec<Color> {
    let picked: Vec<Color> = indices
        .iter()
        .filter_map(|&i| {
            let c = i.checked_sub(1).and_then(|i| PALETTE.get(i)).copied();
            if c.is_none() {
                tracing::warn!(index = i, "ignoring palette index outside 1..=20");
            }
            c
        })
        .collect();

    if picked.is_empty() {
        canonical()
    } else {
        picked
    }
}
