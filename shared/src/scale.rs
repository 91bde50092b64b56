use crate::geo::LatLng;

#[derive(Debug, Clone, PartialEq)]
pub struct ScaleBar {
    pub label: String,
    pub width_px: f64,
}

/// Metric scale bar for a horizontal span `max_width_px` wide whose ends
/// sit at `left` and `right`.
pub fn metric_scale(left: LatLng, right: LatLng, max_width_px: f64) -> ScaleBar {
    let max_meters = left.distance_to(&right);
    if !(max_meters > 0.0) || max_width_px <= 0.0 {
        return ScaleBar {
            label: "0 m".to_string(),
            width_px: 0.0,
        };
    }
    let meters = round_down_nice(max_meters);
    let label = if meters < 1000.0 {
        format!("{} m", trim(meters))
    } else {
        format!("{} km", trim(meters / 1000.0))
    };
    ScaleBar {
        label,
        width_px: (max_width_px * meters / max_meters).round(),
    }
}

/// Largest 1, 2, 3 or 5 times a power of ten not above `num`.
pub fn round_down_nice(num: f64) -> f64 {
    let pow10 = 10f64.powf(num.log10().floor());
    let d = num / pow10;
    let d = if d >= 10.0 {
        10.0
    } else if d >= 5.0 {
        5.0
    } else if d >= 3.0 {
        3.0
    } else if d >= 2.0 {
        2.0
    } else {
        1.0
    };
    pow10 * d
}

fn trim(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        let s = format!("{v:.6}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nice_rounding_steps() {
        assert_eq!(round_down_nice(1.4), 1.0);
        assert_eq!(round_down_nice(27.0), 20.0);
        assert_eq!(round_down_nice(349.0), 300.0);
        assert_eq!(round_down_nice(7_999.0), 5_000.0);
        assert_eq!(round_down_nice(10.0), 10.0);
    }

    #[test]
    fn kilometers_above_a_thousand_meters() {
        let bar = metric_scale(LatLng::new(0.0, 0.0), LatLng::new(0.0, 1.0), 100.0);
        assert_eq!(bar.label, "100 km");
        assert_eq!(bar.width_px, 90.0);
    }

    #[test]
    fn meters_below_a_thousand() {
        let bar = metric_scale(LatLng::new(0.0, 0.0), LatLng::new(0.0, 0.004), 100.0);
        assert_eq!(bar.label, "300 m");
        assert!(bar.width_px <= 100.0 && bar.width_px > 0.0);
    }

    #[test]
    fn sub_meter_spans_keep_fraction() {
        let bar = metric_scale(LatLng::new(0.0, 0.0), LatLng::new(0.0, 0.000_005), 100.0);
        assert_eq!(bar.label, "0.5 m");
    }

    #[test]
    fn degenerate_span_is_empty() {
        let p = LatLng::new(10.0, 10.0);
        assert_eq!(metric_scale(p, p, 100.0).width_px, 0.0);
    }
}
