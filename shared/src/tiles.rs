use crate::geo::TILE_SIZE;

/// Slippy-map tile address. `x` is unwrapped so tiles left/right of the
/// antimeridian keep their screen position; use [`TileCoord::wrapped_x`]
/// for the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    pub z: u8,
    pub x: i64,
    pub y: i64,
}

impl TileCoord {
    pub fn wrapped_x(&self) -> i64 {
        let n = 1i64 << self.z;
        self.x.rem_euclid(n)
    }

    /// World-pixel rectangle `(x1, y1, x2, y2)` covered by this tile.
    pub fn world_rect(&self) -> (f64, f64, f64, f64) {
        let size = tile_world_size(self.z);
        let x1 = self.x as f64 * size;
        let y1 = self.y as f64 * size;
        (x1, y1, x1 + size, y1 + size)
    }
}

pub fn tile_world_size(z: u8) -> f64 {
    TILE_SIZE / (1u64 << z) as f64
}

/// Integer zoom the tiles are fetched at for a fractional view zoom.
pub fn tile_zoom(zoom: f64, max_zoom: u8) -> u8 {
    zoom.round().clamp(0.0, max_zoom as f64) as u8
}

/// Expand `{s}`, `{z}`, `{x}` and `{y}` in a tile URL template.
pub fn tile_url(template: &str, subdomains: &[&str], coord: TileCoord) -> String {
    let x = coord.wrapped_x();
    let s = if subdomains.is_empty() {
        ""
    } else {
        subdomains[((x + coord.y).unsigned_abs() as usize) % subdomains.len()]
    };
    template
        .replace("{s}", s)
        .replace("{z}", &coord.z.to_string())
        .replace("{x}", &x.to_string())
        .replace("{y}", &coord.y.to_string())
}

/// Tiles covering the world rectangle at zoom `z`, nearest the rectangle
/// center first. Rows outside the world are dropped; columns wrap.
pub fn visible_tiles(min_x: f64, min_y: f64, max_x: f64, max_y: f64, z: u8) -> Vec<TileCoord> {
    let size = tile_world_size(z);
    let n = 1i64 << z;
    let x_start = (min_x / size).floor() as i64;
    let x_end = (max_x / size).ceil() as i64;
    let y_start = ((min_y / size).floor() as i64).max(0);
    let y_end = ((max_y / size).ceil() as i64).min(n);

    let mut tiles = Vec::new();
    for y in y_start..y_end {
        for x in x_start..x_end {
            tiles.push(TileCoord { z, x, y });
        }
    }

    let cx = (min_x + max_x) / 2.0;
    let cy = (min_y + max_y) / 2.0;
    tiles.sort_by(|a, b| {
        distance_sq(a, cx, cy)
            .total_cmp(&distance_sq(b, cx, cy))
            .then_with(|| a.cmp(b))
    });
    tiles
}

fn distance_sq(tile: &TileCoord, cx: f64, cy: f64) -> f64 {
    let (x1, y1, x2, y2) = tile.world_rect();
    let dx = (x1 + x2) * 0.5 - cx;
    let dy = (y1 + y2) * 0.5 - cy;
    dx * dx + dy * dy
}

#[cfg(test)]
mod tests {
    use super::*;

    const OSM: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";

    #[test]
    fn url_template_expansion_and_subdomain_rotation() {
        let subs = ["a", "b", "c"];
        assert_eq!(
            tile_url(OSM, &subs, TileCoord { z: 3, x: 4, y: 2 }),
            "https://a.tile.openstreetmap.org/3/4/2.png"
        );
        assert_eq!(
            tile_url(OSM, &subs, TileCoord { z: 3, x: 4, y: 3 }),
            "https://b.tile.openstreetmap.org/3/4/3.png"
        );
    }

    #[test]
    fn columns_wrap_around_the_antimeridian() {
        let t = TileCoord { z: 2, x: -1, y: 0 };
        assert_eq!(t.wrapped_x(), 3);
        assert!(tile_url(OSM, &["a"], t).ends_with("/2/3/0.png"));
    }

    #[test]
    fn whole_world_at_zoom_zero_is_one_tile() {
        let tiles = visible_tiles(0.0, 0.0, 256.0, 256.0, 0);
        assert_eq!(tiles, vec![TileCoord { z: 0, x: 0, y: 0 }]);
    }

    #[test]
    fn rows_outside_the_world_are_dropped() {
        let tiles = visible_tiles(0.0, -100.0, 128.0, 400.0, 1);
        assert!(tiles.iter().all(|t| t.y >= 0 && t.y < 2));
        assert_eq!(tiles.len(), 2);
    }

    #[test]
    fn nearest_tile_comes_first() {
        let tiles = visible_tiles(0.0, 0.0, 256.0, 256.0, 2);
        assert_eq!(tiles.len(), 16);
        let (x1, y1, x2, y2) = tiles[0].world_rect();
        assert!(x1 <= 128.0 && x2 >= 128.0 && y1 <= 128.0 && y2 >= 128.0);
    }

    #[test]
    fn tile_zoom_rounds_and_clamps() {
        assert_eq!(tile_zoom(3.4, 19), 3);
        assert_eq!(tile_zoom(3.6, 19), 4);
        assert_eq!(tile_zoom(21.0, 19), 19);
        assert_eq!(tile_zoom(-1.0, 19), 0);
    }
}
