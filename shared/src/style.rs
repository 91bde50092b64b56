/// Stroke and fill parameters for one rendered polygon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathStyle {
    pub color: &'static str,
    pub weight: f64,
    pub opacity: f64,
    pub fill_color: &'static str,
    pub fill_opacity: f64,
}

/// Partial style update; unset fields keep their current value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StylePatch {
    pub color: Option<&'static str>,
    pub weight: Option<f64>,
    pub opacity: Option<f64>,
    pub fill_color: Option<&'static str>,
    pub fill_opacity: Option<f64>,
}

impl PathStyle {
    pub fn patched(self, patch: StylePatch) -> PathStyle {
        PathStyle {
            color: patch.color.unwrap_or(self.color),
            weight: patch.weight.unwrap_or(self.weight),
            opacity: patch.opacity.unwrap_or(self.opacity),
            fill_color: patch.fill_color.unwrap_or(self.fill_color),
            fill_opacity: patch.fill_opacity.unwrap_or(self.fill_opacity),
        }
    }
}

/// Style every flood polygon gets, regardless of its properties.
pub const FLOOD_STYLE: PathStyle = PathStyle {
    color: "#0000ff",
    weight: 2.0,
    opacity: 1.0,
    fill_color: "#3399ff",
    fill_opacity: 0.6,
};

/// Applied on pointer-enter.
pub const HOVER_PATCH: StylePatch = StylePatch {
    color: Some("#0000cc"),
    weight: Some(3.0),
    opacity: None,
    fill_color: None,
    fill_opacity: Some(0.8),
};

/// Per-feature style callback. Constant: the feature is not consulted.
pub fn flood_style<F>(_feature: &F) -> PathStyle {
    FLOOD_STYLE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hover_patch_keeps_fill_color() {
        let hovered = FLOOD_STYLE.patched(HOVER_PATCH);
        assert_eq!(hovered.fill_color, FLOOD_STYLE.fill_color);
        assert_eq!(hovered.opacity, FLOOD_STYLE.opacity);
        assert_eq!(hovered.color, "#0000cc");
        assert_eq!(hovered.weight, 3.0);
        assert_eq!(hovered.fill_opacity, 0.8);
    }

    #[test]
    fn empty_patch_is_identity() {
        assert_eq!(FLOOD_STYLE.patched(StylePatch::default()), FLOOD_STYLE);
    }

    #[test]
    fn style_is_independent_of_feature() {
        assert_eq!(flood_style(&1u8), flood_style(&"anything"));
    }
}
