use std::fmt;

/// The only runtime failure of the viewer: the flood overlay could not be
/// loaded. Network, HTTP and parse failures are not distinguished; the
/// detail string is for the diagnostic log only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayLoadError {
    detail: String,
}

impl OverlayLoadError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl fmt::Display for OverlayLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "overlay load failed: {}", self.detail)
    }
}

impl std::error::Error for OverlayLoadError {}

impl From<geojson::Error> for OverlayLoadError {
    fn from(e: geojson::Error) -> Self {
        Self::new(format!("parse error: {e}"))
    }
}
