use geojson::{Feature, GeoJson, Geometry};
use serde_json::{Map, Value};

use crate::error::OverlayLoadError;
use crate::geo::{LatLng, LatLngBounds, WorldPoint, project};

/// One polygon in world pixels: the outer ring followed by its holes.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonShape {
    pub rings: Vec<Vec<WorldPoint>>,
}

/// A renderable flood feature.
#[derive(Debug, Clone, PartialEq)]
pub struct FloodFeature {
    pub polygons: Vec<PolygonShape>,
    pub bounds: LatLngBounds,
    /// `(min_x, min_y, max_x, max_y)` in world pixels.
    pub world_bounds: (f64, f64, f64, f64),
    pub properties: Option<Map<String, Value>>,
}

impl FloodFeature {
    /// Even-odd containment test; holes are excluded.
    pub fn contains(&self, wx: f64, wy: f64) -> bool {
        let (min_x, min_y, max_x, max_y) = self.world_bounds;
        if wx < min_x || wx > max_x || wy < min_y || wy > max_y {
            return false;
        }
        self.polygons.iter().any(|poly| {
            poly.rings
                .iter()
                .filter(|ring| ring_crosses(ring, wx, wy))
                .count()
                % 2
                == 1
        })
    }
}

fn ring_crosses(ring: &[WorldPoint], x: f64, y: f64) -> bool {
    let mut inside = false;
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (ring[i], ring[j]);
        if (a.y > y) != (b.y > y) && x < (b.x - a.x) * (y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Parsed flood overlay data.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FloodDataset {
    pub features: Vec<FloodFeature>,
    /// Features dropped because they carried no polygonal geometry.
    pub skipped: usize,
}

impl FloodDataset {
    /// Union of all feature bounds, `None` if there are no features.
    pub fn bounds(&self) -> Option<LatLngBounds> {
        self.features
            .iter()
            .map(|f| f.bounds)
            .reduce(|acc, b| acc.union(&b))
    }
}

/// Parse a GeoJSON document (FeatureCollection, Feature or bare Geometry).
pub fn parse_dataset(text: &str) -> Result<FloodDataset, OverlayLoadError> {
    let geojson: GeoJson = text.parse()?;
    let features: Vec<Feature> = match geojson {
        GeoJson::FeatureCollection(fc) => fc.features,
        GeoJson::Feature(f) => vec![f],
        GeoJson::Geometry(g) => vec![Feature {
            bbox: None,
            geometry: Some(g),
            id: None,
            properties: None,
            foreign_members: None,
        }],
    };

    let mut dataset = FloodDataset::default();
    for feature in features {
        match build_feature(feature) {
            Some(f) => dataset.features.push(f),
            None => dataset.skipped += 1,
        }
    }
    Ok(dataset)
}

fn build_feature(feature: Feature) -> Option<FloodFeature> {
    let geometry = feature.geometry?;
    let mut raw: Vec<Vec<Vec<Vec<f64>>>> = Vec::new();
    collect_polygons(geometry, &mut raw);

    let mut bounds: Option<LatLngBounds> = None;
    let mut polygons = Vec::with_capacity(raw.len());
    for poly in raw {
        let rings: Vec<Vec<WorldPoint>> = poly
            .iter()
            .map(|ring| {
                ring.iter()
                    .filter_map(|pos| {
                        let (lng, lat) = (*pos.first()?, *pos.get(1)?);
                        let ll = LatLng::new(lat, lng);
                        LatLngBounds::extend_opt(&mut bounds, ll);
                        Some(project(ll))
                    })
                    .collect()
            })
            .filter(|ring: &Vec<WorldPoint>| !ring.is_empty())
            .collect();
        if !rings.is_empty() {
            polygons.push(PolygonShape { rings });
        }
    }

    let bounds = bounds?;
    let world_bounds = polygons
        .iter()
        .flat_map(|p| p.rings.iter().flatten())
        .fold(
            (f64::MAX, f64::MAX, f64::MIN, f64::MIN),
            |(x0, y0, x1, y1), w| (x0.min(w.x), y0.min(w.y), x1.max(w.x), y1.max(w.y)),
        );

    Some(FloodFeature {
        polygons,
        bounds,
        world_bounds,
        properties: feature.properties,
    })
}

fn collect_polygons(geometry: Geometry, out: &mut Vec<Vec<Vec<Vec<f64>>>>) {
    match geometry.value {
        geojson::Value::Polygon(poly) => out.push(poly),
        geojson::Value::MultiPolygon(polys) => out.extend(polys),
        geojson::Value::GeometryCollection(geoms) => {
            for g in geoms {
                collect_polygons(g, out);
            }
        }
        _ => {}
    }
}
