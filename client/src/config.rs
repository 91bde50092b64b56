use floodmap_shared::LatLng;

/// Id of the element the map mounts into.
pub const MOUNT_ELEMENT_ID: &str = "app";

/// Flood polygons, relative to the page.
pub const DATASET_PATH: &str = "data/flood_area_polygons_WGS84.json";

pub const TILE_URL_TEMPLATE: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const TILE_SUBDOMAINS: &[&str] = &["a", "b", "c"];
pub const TILE_ATTRIBUTION: &str = "\u{00A9} OpenStreetMap contributors";
pub const MIN_ZOOM: f64 = 0.0;
pub const MAX_ZOOM: u8 = 19;

/// View shown until the overlay arrives (and for good if it never does).
pub const INITIAL_CENTER: LatLng = LatLng::new(20.0, 0.0);
pub const INITIAL_ZOOM: f64 = 2.0;

/// Wheel pixels per zoom level.
pub const WHEEL_PX_PER_ZOOM_LEVEL: f64 = 60.0;
pub const KEYBOARD_PAN_PX: f64 = 80.0;

pub const TILE_CONCURRENCY: usize = 6;
pub const MAX_CACHED_TILES: usize = 384;

pub const LEGEND_LABEL: &str = "Flooded Area";
pub const SCALE_MAX_WIDTH_PX: f64 = 100.0;
