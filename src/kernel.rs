// Unnormalized; the rasterizer divides every pixel by its summed weight.
#[inline]
pub fn cubic_spline(r: f64) -> f64 {
    if r > 1.0 {
        0.0
    } else if r > 0.5 {
        let t = 1.0 - r;
        2.0 * t * t * t
    } else {
        1.0 - 6.0 * r * r + 6.0 * r * r * r
    }
}

#[inline]
pub fn cubic_spline_sq(r2: f64) -> f64 {
    if r2 > 1.0 {
        return 0.0;
    }
    cubic_spline(r2.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64, tol: f64) {
        assert!(
            (a - b).abs() <= tol,
            "expected {a} to be within {tol} of {b}"
        );
    }

    #[test]
    fn endpoints() {
        assert_eq!(cubic_spline(0.0), 1.0);
        assert_eq!(cubic_spline(1.0), 0.0);
        assert_eq!(cubic_spline(1.5), 0.0);
    }

    #[test]
    fn branches_meet_at_half() {
        let below = cubic_spline(0.5 - 1e-12);
        let above = cubic_spline(0.5 + 1e-12);
        assert_close(cubic_spline(0.5), 0.25, 1e-12);
        assert_close(below, 0.25, 1e-9);
        assert_close(above, 0.25, 1e-9);
        assert_close(below, above, 1e-9);
    }

    #[test]
    fn non_increasing_on_support() {
        let mut prev = cubic_spline(0.0);
        for step in 1..=1000 {
            let r = step as f64 / 1000.0;
            let w = cubic_spline(r);
            assert!(w <= prev + 1e-15, "W({r}) = {w} rose above {prev}");
            prev = w;
        }
    }

    #[test]
    fn squared_form_matches() {
        for step in 0..=120 {
            let r = step as f64 / 100.0;
            assert_close(cubic_spline_sq(r * r), cubic_spline(r), 1e-12);
        }
    }
}
