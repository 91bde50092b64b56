pub mod dataset;
pub mod error;
pub mod geo;
pub mod overlay;
pub mod popup;
pub mod scale;
pub mod style;
pub mod tiles;

pub use dataset::{FloodDataset, FloodFeature, PolygonShape, parse_dataset};
pub use error::OverlayLoadError;
pub use geo::{LatLng, LatLngBounds, WorldPoint, project, unproject};
pub use overlay::{FloodOverlay, LoadOutcome, LoadTicket, OverlayFeature, OverlaySlot};
pub use style::{FLOOD_STYLE, PathStyle};
