use floodmap_shared::FloodOverlay;

const GRID_COLS: usize = 50;
const GRID_ROWS: usize = 50;

/// A flat 2D grid over world space bucketing flood features by bounding
/// box. Built once when the overlay loads; exact polygon containment and
/// draw order are resolved by the overlay itself.
pub struct SpatialGrid {
    cells: Vec<Vec<usize>>,
    min_x: f64,
    min_y: f64,
    cell_w: f64,
    cell_h: f64,
}

impl SpatialGrid {
    pub fn empty() -> Self {
        Self {
            cells: Vec::new(),
            min_x: 0.0,
            min_y: 0.0,
            cell_w: 1.0,
            cell_h: 1.0,
        }
    }

    pub fn build(overlay: &FloodOverlay) -> Self {
        if overlay.is_empty() {
            return Self::empty();
        }

        let (mut min_x, mut min_y, mut max_x, mut max_y) = (f64::MAX, f64::MAX, f64::MIN, f64::MIN);
        for f in overlay.features() {
            let (x1, y1, x2, y2) = f.feature.world_bounds;
            min_x = min_x.min(x1);
            min_y = min_y.min(y1);
            max_x = max_x.max(x2);
            max_y = max_y.max(y2);
        }

        // World pixels are tiny at high zoom; pad relative to the extent.
        let pad_x = ((max_x - min_x) * 0.001).max(1e-9);
        let pad_y = ((max_y - min_y) * 0.001).max(1e-9);
        min_x -= pad_x;
        min_y -= pad_y;
        max_x += pad_x;
        max_y += pad_y;

        let cell_w = (max_x - min_x) / GRID_COLS as f64;
        let cell_h = (max_y - min_y) / GRID_ROWS as f64;

        let mut cells = vec![Vec::new(); GRID_COLS * GRID_ROWS];
        for (idx, f) in overlay.features().iter().enumerate() {
            let (l, t, r, b) = f.feature.world_bounds;

            // Insert into all overlapping grid cells
            let col_start = ((l - min_x) / cell_w).floor().max(0.0) as usize;
            let col_end = ((r - min_x) / cell_w).floor().min(GRID_COLS as f64 - 1.0) as usize;
            let row_start = ((t - min_y) / cell_h).floor().max(0.0) as usize;
            let row_end = ((b - min_y) / cell_h).floor().min(GRID_ROWS as f64 - 1.0) as usize;

            for row in row_start..=row_end {
                for col in col_start..=col_end {
                    cells[row * GRID_COLS + col].push(idx);
                }
            }
        }

        Self {
            cells,
            min_x,
            min_y,
            cell_w,
            cell_h,
        }
    }

    /// Candidate feature indices whose bounding box may contain the point.
    pub fn candidates_at(&self, wx: f64, wy: f64) -> &[usize] {
        if self.cells.is_empty() {
            return &[];
        }

        let col = ((wx - self.min_x) / self.cell_w).floor() as isize;
        let row = ((wy - self.min_y) / self.cell_h).floor() as isize;

        if col < 0 || row < 0 || col >= GRID_COLS as isize || row >= GRID_ROWS as isize {
            return &[];
        }

        &self.cells[row as usize * GRID_COLS + col as usize]
    }

    /// Topmost feature at a world coordinate.
    pub fn find_at(&self, overlay: &FloodOverlay, wx: f64, wy: f64) -> Option<usize> {
        overlay.topmost_of(self.candidates_at(wx, wy).iter().copied(), wx, wy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use floodmap_shared::{LatLng, parse_dataset, project};

    const FIXTURE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            { "type": "Feature", "properties": { "id": 1 },
              "geometry": { "type": "Polygon", "coordinates":
                [[[15.0, 45.0], [16.0, 45.0], [16.0, 46.0], [15.0, 46.0], [15.0, 45.0]]] } },
            { "type": "Feature", "properties": { "id": 2 },
              "geometry": { "type": "Polygon", "coordinates":
                [[[15.5, 45.5], [16.5, 45.5], [16.5, 46.5], [15.5, 46.5], [15.5, 45.5]]] } },
            { "type": "Feature", "properties": { "id": 3 },
              "geometry": { "type": "Polygon", "coordinates":
                [[[18.0, 43.0], [18.2, 43.0], [18.2, 43.2], [18.0, 43.2], [18.0, 43.0]]] } }
        ]
    }"#;

    fn overlay() -> FloodOverlay {
        FloodOverlay::new(parse_dataset(FIXTURE).unwrap())
    }

    #[test]
    fn grid_agrees_with_brute_force() {
        let o = overlay();
        let grid = SpatialGrid::build(&o);
        for (lat, lng) in [
            (45.2, 15.2),
            (45.75, 15.75),
            (46.3, 16.3),
            (43.1, 18.1),
            (44.0, 17.0),
            (10.0, 10.0),
        ] {
            let w = project(LatLng::new(lat, lng));
            assert_eq!(grid.find_at(&o, w.x, w.y), o.hit_test(w.x, w.y), "at {lat},{lng}");
        }
    }

    #[test]
    fn overlap_resolves_to_topmost_feature() {
        let mut o = overlay();
        let grid = SpatialGrid::build(&o);
        let w = project(LatLng::new(45.75, 15.75));
        assert_eq!(grid.find_at(&o, w.x, w.y), Some(1));
        o.pointer_enter(0);
        assert_eq!(grid.find_at(&o, w.x, w.y), Some(0));
    }

    #[test]
    fn empty_grid_finds_nothing() {
        let grid = SpatialGrid::empty();
        assert!(grid.candidates_at(1.0, 1.0).is_empty());
    }
}
