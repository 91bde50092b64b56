use crate::dataset::{FloodDataset, FloodFeature};
use crate::error::OverlayLoadError;
use crate::geo::LatLngBounds;
use crate::popup::popup_html;
use crate::style::{HOVER_PATCH, PathStyle, flood_style};

/// User-facing notice shown once when the overlay fails to load.
pub const LOAD_FAILURE_NOTICE: &str = "Failed to load flood map.";

/// A feature as rendered: geometry, bound popup and current style.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayFeature {
    pub feature: FloodFeature,
    pub popup: Option<String>,
    pub style: PathStyle,
}

/// The flood overlay layer built from one dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct FloodOverlay {
    features: Vec<OverlayFeature>,
    /// Feature indices, bottom to top.
    draw_order: Vec<usize>,
    bounds: Option<LatLngBounds>,
}

impl FloodOverlay {
    pub fn new(dataset: FloodDataset) -> Self {
        let bounds = dataset.bounds();
        let features: Vec<OverlayFeature> = dataset
            .features
            .into_iter()
            .map(|feature| OverlayFeature {
                style: flood_style(&feature),
                popup: popup_html(feature.properties.as_ref()),
                feature,
            })
            .collect();
        let draw_order = (0..features.len()).collect();
        Self {
            features,
            draw_order,
            bounds,
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn bounds(&self) -> Option<LatLngBounds> {
        self.bounds
    }

    pub fn feature(&self, idx: usize) -> Option<&OverlayFeature> {
        self.features.get(idx)
    }

    pub fn features(&self) -> &[OverlayFeature] {
        &self.features
    }

    /// Features in paint order (last is on top).
    pub fn iter_draw_order(&self) -> impl Iterator<Item = (usize, &OverlayFeature)> + '_ {
        self.draw_order
            .iter()
            .map(move |&idx| (idx, &self.features[idx]))
    }

    /// Topmost feature containing the world point.
    pub fn hit_test(&self, wx: f64, wy: f64) -> Option<usize> {
        self.topmost_of(self.draw_order.iter().copied(), wx, wy)
    }

    /// Topmost among `candidates` containing the world point.
    pub fn topmost_of(
        &self,
        candidates: impl IntoIterator<Item = usize>,
        wx: f64,
        wy: f64,
    ) -> Option<usize> {
        candidates
            .into_iter()
            .filter(|&idx| {
                self.features
                    .get(idx)
                    .is_some_and(|f| f.feature.contains(wx, wy))
            })
            .max_by_key(|&idx| self.draw_rank(idx))
    }

    fn draw_rank(&self, idx: usize) -> usize {
        self.draw_order
            .iter()
            .position(|&i| i == idx)
            .unwrap_or(0)
    }

    /// Emphasize the feature and raise it above the others.
    pub fn pointer_enter(&mut self, idx: usize) {
        let Some(f) = self.features.get_mut(idx) else {
            return;
        };
        f.style = f.style.patched(HOVER_PATCH);
        self.draw_order.retain(|&i| i != idx);
        self.draw_order.push(idx);
    }

    /// Restore the overlay's default style. Draw order is left as is.
    pub fn pointer_leave(&mut self, idx: usize) {
        if let Some(f) = self.features.get_mut(idx) {
            f.style = flood_style(&f.feature);
        }
    }

    /// Popup content to open for a click on the feature, if one is bound.
    pub fn click(&self, idx: usize) -> Option<&str> {
        self.features.get(idx)?.popup.as_deref()
    }
}

/// Proof that a load was started; consumed by [`OverlaySlot::complete`].
#[derive(Debug)]
pub struct LoadTicket {
    _private: (),
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Loaded {
        features: usize,
        skipped: usize,
    },
    Failed {
        diagnostic: String,
        notice: &'static str,
    },
}

/// Owner of the single flood overlay. Empty until one load completes
/// successfully; a second load can never be started.
#[derive(Debug, Clone, Default)]
pub struct OverlaySlot {
    requested: bool,
    overlay: Option<FloodOverlay>,
}

impl OverlaySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a ticket the first time only.
    pub fn begin_load(&mut self) -> Option<LoadTicket> {
        if self.requested {
            return None;
        }
        self.requested = true;
        Some(LoadTicket { _private: () })
    }

    pub fn complete(
        &mut self,
        ticket: LoadTicket,
        result: Result<FloodDataset, OverlayLoadError>,
    ) -> LoadOutcome {
        let LoadTicket { _private: () } = ticket;
        match result {
            Ok(dataset) if dataset.bounds().is_none() => LoadOutcome::Failed {
                diagnostic: "Error loading flood layer: bounds are not valid".to_string(),
                notice: LOAD_FAILURE_NOTICE,
            },
            Ok(dataset) => {
                let skipped = dataset.skipped;
                let overlay = FloodOverlay::new(dataset);
                let features = overlay.len();
                self.overlay = Some(overlay);
                LoadOutcome::Loaded { features, skipped }
            }
            Err(e) => LoadOutcome::Failed {
                diagnostic: format!("Error loading flood layer: {}", e.detail()),
                notice: LOAD_FAILURE_NOTICE,
            },
        }
    }

    pub fn overlay(&self) -> Option<&FloodOverlay> {
        self.overlay.as_ref()
    }

    pub fn overlay_mut(&mut self) -> Option<&mut FloodOverlay> {
        self.overlay.as_mut()
    }

    pub fn is_loaded(&self) -> bool {
        self.overlay.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::parse_dataset;
    use crate::geo::{LatLng, project};
    use crate::style::FLOOD_STYLE;

    const OVERLAPPING: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            { "type": "Feature", "properties": { "id": 1, "name": "Sava" },
              "geometry": { "type": "Polygon", "coordinates":
                [[[15.0, 45.0], [16.0, 45.0], [16.0, 46.0], [15.0, 46.0], [15.0, 45.0]]] } },
            { "type": "Feature", "properties": {},
              "geometry": { "type": "Polygon", "coordinates":
                [[[15.5, 45.5], [16.5, 45.5], [16.5, 46.5], [15.5, 46.5], [15.5, 45.5]]] } },
            { "type": "Feature",
              "geometry": { "type": "Polygon", "coordinates":
                [[[20.0, 40.0], [21.0, 40.0], [21.0, 41.0], [20.0, 40.0]]] } }
        ]
    }"#;

    fn overlay() -> FloodOverlay {
        FloodOverlay::new(parse_dataset(OVERLAPPING).unwrap())
    }

    #[test]
    fn all_features_start_with_the_flood_style() {
        let o = overlay();
        assert_eq!(o.len(), 3);
        assert!(o.features().iter().all(|f| f.style == FLOOD_STYLE));
    }

    #[test]
    fn pointer_enter_emphasizes_and_raises() {
        let mut o = overlay();
        o.pointer_enter(0);
        let s = o.feature(0).unwrap().style;
        assert!(s.weight > FLOOD_STYLE.weight);
        assert_eq!(s.fill_opacity, 0.8);
        assert_eq!(o.iter_draw_order().last().map(|(i, _)| i), Some(0));
    }

    #[test]
    fn pointer_leave_restores_default_exactly() {
        let mut o = overlay();
        o.pointer_enter(1);
        o.pointer_leave(1);
        assert_eq!(o.feature(1).unwrap().style, FLOOD_STYLE);
    }

    #[test]
    fn hit_test_prefers_topmost() {
        let mut o = overlay();
        let w = project(LatLng::new(45.75, 15.75));
        assert_eq!(o.hit_test(w.x, w.y), Some(1));
        o.pointer_enter(0);
        assert_eq!(o.hit_test(w.x, w.y), Some(0));
        let miss = project(LatLng::new(0.0, 0.0));
        assert_eq!(o.hit_test(miss.x, miss.y), None);
    }

    #[test]
    fn click_opens_popup_only_when_bound() {
        let o = overlay();
        let popup = o.click(0).unwrap();
        assert_eq!(popup.matches("<b>").count(), 2);
        assert_eq!(o.click(1), Some("<div style='font-size:14px'></div>"));
        assert_eq!(o.click(2), None);
        assert_eq!(o.click(99), None);
    }

    #[test]
    fn out_of_range_handlers_are_ignored() {
        let mut o = overlay();
        let before = o.clone();
        o.pointer_enter(42);
        o.pointer_leave(42);
        assert_eq!(o, before);
    }

    #[test]
    fn slot_loads_once() {
        let mut slot = OverlaySlot::new();
        let ticket = slot.begin_load().unwrap();
        assert!(slot.begin_load().is_none());
        let outcome = slot.complete(ticket, parse_dataset(OVERLAPPING));
        assert_eq!(
            outcome,
            LoadOutcome::Loaded {
                features: 3,
                skipped: 0
            }
        );
        assert!(slot.is_loaded());
        assert!(slot.begin_load().is_none());
    }

    #[test]
    fn failed_load_leaves_no_overlay() {
        let mut slot = OverlaySlot::new();
        let ticket = slot.begin_load().unwrap();
        let outcome = slot.complete(ticket, parse_dataset("not json"));
        match outcome {
            LoadOutcome::Failed { diagnostic, notice } => {
                assert!(diagnostic.starts_with("Error loading flood layer:"));
                assert_eq!(notice, LOAD_FAILURE_NOTICE);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(slot.overlay().is_none());
        assert!(slot.begin_load().is_none());
    }

    #[test]
    fn dataset_without_polygons_fails_to_load() {
        for doc in [
            r#"{"type":"FeatureCollection","features":[]}"#,
            r#"{"type":"Feature","properties":{"a":1},"geometry":{"type":"Point","coordinates":[1.0,2.0]}}"#,
        ] {
            let mut slot = OverlaySlot::new();
            let ticket = slot.begin_load().unwrap();
            match slot.complete(ticket, parse_dataset(doc)) {
                LoadOutcome::Failed { diagnostic, notice } => {
                    assert_eq!(diagnostic, "Error loading flood layer: bounds are not valid");
                    assert_eq!(notice, LOAD_FAILURE_NOTICE);
                }
                other => panic!("unexpected outcome: {other:?}"),
            }
            assert!(!slot.is_loaded());
        }
    }

    #[test]
    fn network_failure_is_the_same_error_kind() {
        let mut slot = OverlaySlot::new();
        let ticket = slot.begin_load().unwrap();
        let outcome = slot.complete(ticket, Err(OverlayLoadError::new("fetch error: offline")));
        assert!(matches!(outcome, LoadOutcome::Failed { .. }));
        assert!(!slot.is_loaded());
    }
}
