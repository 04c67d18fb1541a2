use std::fmt::Write as _;
use std::sync::{Arc, OnceLock};

use image::ImageEncoder;
use image::codecs::png::PngEncoder;
use rayon::prelude::*;

use crate::error::{PosterError, PosterResult};
use crate::palette::Color;
use crate::poster::{CAPTION_POS, CAPTION_PT, Poster};

/// Output pixels per inch; font sizes are given in points.
pub const DPI: f64 = 100.0;

const FONT_FAMILY: &str = "DejaVu Sans, Arial, sans-serif";

// Palette preview layout
const SWATCH_WIDTH: u32 = 50;
const PREVIEW_HEIGHT: u32 = 150;
const TITLE_BAND: f64 = 30.0;
const TITLE_PT: f64 = 10.0;
const LABEL_PT: f64 = 8.0;
const PREVIEW_Y_RANGE: (f64, f64) = (-0.3, 1.0);

const MAX_DIM: u32 = 16_384;

#[inline]
fn pt_to_px(pt: f64) -> f64 {
    pt * DPI / 72.0
}

fn svg_color(c: Color) -> String {
    let [r, g, b] = c.to_rgb8();
    format!("rgb({},{},{})", r, g, b)
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => out.push(ch),
            // Not legal in XML 1.0; usvg would reject the document.
            '\u{0}'..='\u{1f}' | '\u{fffe}' | '\u{ffff}' => out.push('\u{fffd}'),
            _ => out.push(ch),
        }
    }
    out
}

/// A rendered image as an SVG document, sized in pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct Figure {
    pub width: u32,
    pub height: u32,
    pub svg: String,
}

/// Straight-alpha RGBA8 pixels, row-major.
#[derive(Clone, Debug)]
pub struct Raster {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl Raster {
    #[cfg(test)]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [self.rgba[i], self.rgba[i + 1], self.rgba[i + 2], self.rgba[i + 3]]
    }

    pub fn encode_png(&self) -> PosterResult<Vec<u8>> {
        let mut buf = Vec::new();
        PngEncoder::new(&mut buf).write_image(
            &self.rgba,
            self.width,
            self.height,
            image::ExtendedColorType::Rgba8,
        )?;
        Ok(buf)
    }
}

fn fontdb() -> Arc<usvg::fontdb::Database> {
    static DB: OnceLock<Arc<usvg::fontdb::Database>> = OnceLock::new();
    DB.get_or_init(|| {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        tracing::debug!(faces = db.len(), "loaded system fonts");
        Arc::new(db)
    })
    .clone()
}

impl Figure {
    /// Rasterize at `scale` device pixels per figure pixel.
    pub fn rasterize(&self, scale: f32) -> PosterResult<Raster> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(PosterError::raster(format!("invalid scale {scale}")));
        }
        let w = ((self.width as f32 * scale).round() as u32).max(1);
        let h = ((self.height as f32 * scale).round() as u32).max(1);
        if w > MAX_DIM || h > MAX_DIM {
            return Err(PosterError::raster(format!(
                "raster size too large: {w}x{h} (max {MAX_DIM}x{MAX_DIM})"
            )));
        }

        let opts = usvg::Options {
            fontdb: fontdb(),
            ..Default::default()
        };
        let tree = usvg::Tree::from_str(&self.svg, &opts)?;

        let mut pixmap = resvg::tiny_skia::Pixmap::new(w, h)
            .ok_or_else(|| PosterError::raster("failed to allocate pixmap"))?;
        resvg::render(
            &tree,
            resvg::tiny_skia::Transform::from_scale(scale, scale),
            &mut pixmap.as_mut(),
        );

        let mut rgba = pixmap.take();
        demultiply(&mut rgba, w as usize);

        Ok(Raster {
            width: w,
            height: h,
            rgba,
        })
    }
}

/// tiny-skia stores premultiplied alpha; PNG wants straight alpha.
fn demultiply(rgba: &mut [u8], width: usize) {
    rgba.par_chunks_mut(width * 4).for_each(|row| {
        for px in row.chunks_exact_mut(4) {
            let a = px[3] as u32;
            if a == 0 || a == 255 {
                continue;
            }
            for c in &mut px[..3] {
                *c = ((*c as u32 * 255 + a / 2) / a).min(255) as u8;
            }
        }
    });
}

/// Vector figure of a composed poster. Data space (0,1)x(0,1) with y up maps
/// onto the whole canvas.
pub fn poster_figure(poster: &Poster) -> Figure {
    let w = poster.width as f64;
    let h = poster.height as f64;
    let to_px = |p: [f64; 2]| (p[0] * w, (1.0 - p[1]) * h);

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{0}" height="{1}" viewBox="0 0 {0} {1}">"#,
        poster.width, poster.height
    );
    let _ = write!(
        svg,
        r#"<rect x="0" y="0" width="{}" height="{}" fill="{}"/>"#,
        poster.width,
        poster.height,
        svg_color(poster.background)
    );

    for layer in &poster.layers {
        svg.push_str(r#"<polygon points=""#);
        for (i, &v) in layer.vertices.iter().enumerate() {
            let (x, y) = to_px(v);
            if i > 0 {
                svg.push(' ');
            }
            let _ = write!(svg, "{:.3},{:.3}", x, y);
        }
        let _ = write!(
            svg,
            r#"" fill="{}" fill-opacity="{:.4}" stroke="none"/>"#,
            svg_color(layer.color),
            layer.opacity
        );
    }

    let (tx, ty) = to_px(CAPTION_POS);
    let _ = write!(
        svg,
        r#"<text x="{:.2}" y="{:.2}" font-family="{}" font-size="{:.2}" font-weight="bold" fill="rgb(0,0,0)">{}</text>"#,
        tx,
        ty,
        FONT_FAMILY,
        pt_to_px(CAPTION_PT),
        escape_xml(&poster.caption)
    );
    svg.push_str("</svg>");

    Figure {
        width: poster.width,
        height: poster.height,
        svg,
    }
}

/// Palette preview: one unit-wide bar per color, left to right, each labeled
/// with its 1-based position, under a bold title. Pure.
pub fn render_palette(palette: &[Color], title: &str) -> Figure {
    let n = palette.len();
    let width = SWATCH_WIDTH * n.max(1) as u32;
    let height = PREVIEW_HEIGHT;

    let (y0, y1) = PREVIEW_Y_RANGE;
    let plot_h = height as f64 - TITLE_BAND;
    let sx = SWATCH_WIDTH as f64;
    let py = |y: f64| TITLE_BAND + (y1 - y) / (y1 - y0) * plot_h;

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{0}" height="{1}" viewBox="0 0 {0} {1}">"#,
        width, height
    );
    let _ = write!(
        svg,
        r#"<rect x="0" y="0" width="{}" height="{}" fill="rgb(255,255,255)"/>"#,
        width, height
    );

    let bar_top = py(1.0);
    let bar_h = py(0.0) - bar_top;
    for (i, &c) in palette.iter().enumerate() {
        let _ = write!(
            svg,
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}"/>"#,
            i as f64 * sx,
            bar_top,
            sx,
            bar_h,
            svg_color(c)
        );
        let _ = write!(
            svg,
            r#"<text x="{:.2}" y="{:.2}" font-family="{}" font-size="{:.2}" text-anchor="middle" dominant-baseline="hanging" fill="rgb(0,0,0)">{}</text>"#,
            (i as f64 + 0.5) * sx,
            py(-0.15),
            FONT_FAMILY,
            pt_to_px(LABEL_PT),
            i + 1
        );
    }

    let _ = write!(
        svg,
        r#"<text x="{:.2}" y="{:.2}" font-family="{}" font-size="{:.2}" font-weight="bold" text-anchor="middle" fill="rgb(0,0,0)">{}</text>"#,
        width as f64 / 2.0,
        TITLE_BAND - 8.0,
        FONT_FAMILY,
        pt_to_px(TITLE_PT),
        escape_xml(title)
    );
    svg.push_str("</svg>");

    Figure { width, height, svg }
}

/// Pixel row at the vertical middle of the palette bars, at scale 1.
#[cfg(test)]
fn palette_bar_mid_y() -> u32 {
    let (y0, y1) = PREVIEW_Y_RANGE;
    let plot_h = PREVIEW_HEIGHT as f64 - TITLE_BAND;
    (TITLE_BAND + (y1 - 0.5) / (y1 - y0) * plot_h) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::PALETTE;
    use crate::poster::draw_poster;

    #[test]
    fn poster_svg_has_one_polygon_per_layer() {
        let p = draw_poster(7, 0.2, &PALETTE, 4, "");
        let fig = poster_figure(&p);
        assert_eq!(fig.svg.matches("<polygon").count(), 7);
        assert_eq!(fig.svg.matches(r#"stroke="none""#).count(), 7);
        assert_eq!((fig.width, fig.height), (600, 800));
    }

    #[test]
    fn poster_svg_keeps_layer_order() {
        let p = draw_poster(3, 0.0, &PALETTE, 8, "");
        let fig = poster_figure(&p);
        let mut last = 0;
        for l in &p.layers {
            let needle = format!(r#"fill="{}" fill-opacity="{:.4}""#, svg_color(l.color), l.opacity);
            let at = fig.svg[last..].find(&needle).map(|i| i + last);
            assert!(at.is_some(), "layer fill missing or out of order");
            last = at.unwrap_or(last) + needle.len();
        }
    }

    #[test]
    fn caption_is_escaped_and_bold() {
        let p = draw_poster(3, 0.0, &PALETTE, 1, "A & <B>");
        let fig = poster_figure(&p);
        assert!(fig.svg.contains("A &amp; &lt;B&gt;"));
        assert!(fig.svg.contains(r#"font-weight="bold""#));
    }

    #[test]
    fn control_characters_in_caption_still_rasterize() {
        for caption in ["bell\u{7}", "nul\0x", "ff\u{c}"] {
            let p = draw_poster(3, 0.0, &PALETTE, 1, caption);
            let fig = poster_figure(&p);
            assert!(fig.rasterize(0.25).is_ok(), "caption {caption:?} failed");
        }
        assert_eq!(escape_xml("a\u{7}b\tc"), "a\u{fffd}b\tc");
    }

    #[test]
    fn palette_figure_has_bars_and_labels() {
        let fig = render_palette(&PALETTE, "My 20-Color Palette");
        assert_eq!(fig.width, 1000);
        assert_eq!(fig.height, 150);
        assert_eq!(fig.svg.matches("<rect").count(), 21);
        for i in 1..=20 {
            assert!(fig.svg.contains(&format!(">{}</text>", i)));
        }
        assert!(fig.svg.contains("My 20-Color Palette"));
    }

    #[test]
    fn palette_raster_matches_colors() {
        let fig = render_palette(&PALETTE[..5], "t");
        let raster = fig.rasterize(1.0).unwrap();
        let y = palette_bar_mid_y();
        for (i, c) in PALETTE[..5].iter().enumerate() {
            let x = i as u32 * SWATCH_WIDTH + SWATCH_WIDTH / 2;
            let px = raster.pixel(x, y);
            let want = c.to_rgb8();
            for ch in 0..3 {
                assert!((px[ch] as i32 - want[ch] as i32).abs() <= 1, "bar {i}: {px:?} vs {want:?}");
            }
            assert_eq!(px[3], 255);
        }
    }

    #[test]
    fn raster_honors_scale() {
        let fig = render_palette(&PALETTE[..2], "t");
        let r = fig.rasterize(2.0).unwrap();
        assert_eq!((r.width, r.height), (200, 300));
        assert_eq!(r.rgba.len(), 200 * 300 * 4);
    }

    #[test]
    fn bad_scale_is_rejected() {
        let fig = render_palette(&PALETTE[..2], "t");
        assert!(fig.rasterize(0.0).is_err());
        assert!(fig.rasterize(f32::NAN).is_err());
    }

    #[test]
    fn png_starts_with_signature() {
        let r = render_palette(&PALETTE[..1], "t").rasterize(1.0).unwrap();
        let png = r.encode_png().unwrap();
        assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }

    #[test]
    fn demultiply_restores_straight_alpha() {
        let mut px = vec![64, 32, 0, 128];
        demultiply(&mut px, 1);
        assert_eq!(px, vec![128, 64, 0, 128]);
    }
}
