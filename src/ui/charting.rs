/// X and Y bounds for the results chart, padded so edge points stay visible
pub fn compute_chart_bounds(points: &[(f64, f64)]) -> ([f64; 2], [f64; 2]) {
    let xs: Vec<f64> = points.iter().map(|p| p.0).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.1).collect();
    (
        padded(fittr::surface::bounds(&xs)),
        padded(fittr::surface::bounds(&ys)),
    )
}

fn padded(range: Option<(f64, f64)>) -> [f64; 2] {
    match range {
        None => [0.0, 1.0],
        Some((lo, hi)) if (hi - lo).abs() < f64::EPSILON => [lo - 0.5, hi + 0.5],
        Some((lo, hi)) => {
            let pad = (hi - lo) * 0.05;
            [lo - pad, hi + pad]
        }
    }
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_chart_bounds_empty() {
        assert_eq!(compute_chart_bounds(&[]), ([0.0, 1.0], [0.0, 1.0]));
    }

    #[test]
    fn test_compute_chart_bounds_pads_range() {
        let (x, y) = compute_chart_bounds(&[(0.0, 1.0), (10.0, 3.0)]);
        assert_eq!(x, [-0.5, 10.5]);
        assert!((y[0] - 0.9).abs() < 1e-12);
        assert!((y[1] - 3.1).abs() < 1e-12);
    }

    #[test]
    fn test_compute_chart_bounds_single_point() {
        assert_eq!(compute_chart_bounds(&[(2.0, 1.5)]), ([1.5, 2.5], [1.0, 2.0]));
    }

    #[test]
    fn test_format_label() {
        assert_eq!(format_label(1.0), "1");
        assert_eq!(format_label(1.2345), "1.23");
    }
}
