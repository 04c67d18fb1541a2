use std::f64::consts::TAU;

use crate::rng::Rng;

pub const DEFAULT_POINTS: usize = 200;
pub const DEFAULT_WOBBLE: f64 = 0.15;

/// Closed polygon around `center`: `points` evenly spaced angles (no repeated
/// endpoint), each vertex radius scaled by `1 + wobble * u`, `u` uniform in
/// [-0.5, 0.5).
///
/// Vertex radii therefore stay within `radius * (1 ± wobble / 2)`. A
/// non-positive `radius` yields a degenerate or inverted polygon; it is not
/// rejected.
pub fn generate_blob(
    rng: &mut Rng,
    center: [f64; 2],
    radius: f64,
    points: usize,
    wobble: f64,
) -> Vec<[f64; 2]> {
    let mut noise = vec![0.0f64; points];
    rng.fill_range_f64(&mut noise, -0.5, 0.5);

    noise
        .iter()
        .enumerate()
        .map(|(i, u)| {
            let angle = TAU * i as f64 / points as f64;
            let r = radius * (1.0 + wobble * u);
            [center[0] + r * angle.cos(), center[1] + r * angle.sin()]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dist(a: [f64; 2], b: [f64; 2]) -> f64 {
        ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt()
    }

    #[test]
    fn zero_wobble_is_a_circle() {
        let mut rng = Rng::new(3);
        let c = [0.4, 0.6];
        let pts = generate_blob(&mut rng, c, 0.25, DEFAULT_POINTS, 0.0);
        assert_eq!(pts.len(), 200);
        for p in pts {
            assert!((dist(p, c) - 0.25).abs() < 1e-12);
        }
    }

    #[test]
    fn wobble_bounds_vertex_radius() {
        let mut rng = Rng::new(11);
        let c = [0.0, 0.0];
        let (r, w) = (0.3, 0.5);
        for p in generate_blob(&mut rng, c, r, 500, w) {
            let d = dist(p, c);
            assert!(d >= r * (1.0 - w / 2.0) - 1e-12);
            assert!(d <= r * (1.0 + w / 2.0) + 1e-12);
        }
    }

    #[test]
    fn default_blob_stays_within_default_wobble() {
        let mut rng = Rng::new(42);
        let c = [0.5, 0.5];
        let pts = generate_blob(&mut rng, c, 0.3, DEFAULT_POINTS, DEFAULT_WOBBLE);
        assert_eq!(pts.len(), DEFAULT_POINTS);
        for p in pts {
            let d = dist(p, c);
            assert!(d >= 0.3 * (1.0 - DEFAULT_WOBBLE / 2.0) - 1e-12);
            assert!(d <= 0.3 * (1.0 + DEFAULT_WOBBLE / 2.0) + 1e-12);
        }
    }

    #[test]
    fn first_vertex_sits_on_positive_x_axis() {
        let mut rng = Rng::new(5);
        let pts = generate_blob(&mut rng, [1.0, 2.0], 0.5, 3, 0.0);
        assert_eq!(pts.len(), 3);
        assert!((pts[0][0] - 1.5).abs() < 1e-12);
        assert!((pts[0][1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn consumes_one_draw_per_vertex() {
        let mut a = Rng::new(21);
        let mut b = Rng::new(21);
        generate_blob(&mut a, [0.5, 0.5], 0.2, 17, 0.3);
        for _ in 0..17 {
            b.next_u64();
        }
        assert_eq!(a.next_u64(), b.next_u64());
    }
}
