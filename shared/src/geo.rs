/// Side length of the Web Mercator world at zoom 0, in pixels.
pub const TILE_SIZE: f64 = 256.0;

/// Latitude limit of the square Web Mercator world.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_6;

/// Mean earth radius used for ground distances (scale bar).
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Great-circle distance in meters (haversine).
    pub fn distance_to(&self, other: &LatLng) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let sin_dlat = ((other.lat - self.lat).to_radians() / 2.0).sin();
        let sin_dlng = ((other.lng - self.lng).to_radians() / 2.0).sin();
        let a = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlng * sin_dlng;
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_M * c
    }
}

/// Minimal lat/lng rectangle enclosing a set of positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLngBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl LatLngBounds {
    pub fn from_point(p: LatLng) -> Self {
        Self {
            south: p.lat,
            west: p.lng,
            north: p.lat,
            east: p.lng,
        }
    }

    pub fn extend(&mut self, p: LatLng) {
        self.south = self.south.min(p.lat);
        self.north = self.north.max(p.lat);
        self.west = self.west.min(p.lng);
        self.east = self.east.max(p.lng);
    }

    pub fn union(&self, other: &LatLngBounds) -> LatLngBounds {
        LatLngBounds {
            south: self.south.min(other.south),
            west: self.west.min(other.west),
            north: self.north.max(other.north),
            east: self.east.max(other.east),
        }
    }

    /// Fold an optional accumulator with a new point.
    pub fn extend_opt(acc: &mut Option<LatLngBounds>, p: LatLng) {
        match acc {
            Some(b) => b.extend(p),
            None => *acc = Some(LatLngBounds::from_point(p)),
        }
    }

    pub fn contains(&self, other: &LatLngBounds) -> bool {
        other.south >= self.south
            && other.north <= self.north
            && other.west >= self.west
            && other.east <= self.east
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }

    pub fn north_west(&self) -> LatLng {
        LatLng::new(self.north, self.west)
    }

    pub fn south_east(&self) -> LatLng {
        LatLng::new(self.south, self.east)
    }
}

/// A point in zoom-0 Web Mercator pixel space (x east, y south).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldPoint {
    pub x: f64,
    pub y: f64,
}

/// Project a geographic position into zoom-0 world pixels.
pub fn project(p: LatLng) -> WorldPoint {
    let lat = p.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = TILE_SIZE * (0.5 + p.lng / 360.0);
    let merc = (std::f64::consts::FRAC_PI_4 + lat / 2.0).tan().ln();
    let y = TILE_SIZE * (0.5 - merc / (2.0 * std::f64::consts::PI));
    WorldPoint { x, y }
}

/// Inverse of [`project`].
pub fn unproject(w: WorldPoint) -> LatLng {
    let lng = (w.x / TILE_SIZE - 0.5) * 360.0;
    let merc = (0.5 - w.y / TILE_SIZE) * 2.0 * std::f64::consts::PI;
    let lat = (2.0 * merc.exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees();
    LatLng::new(lat, lng)
}

/// Project bounds into world pixels as `(min_x, min_y, max_x, max_y)`.
pub fn project_bounds(b: &LatLngBounds) -> (f64, f64, f64, f64) {
    let nw = project(b.north_west());
    let se = project(b.south_east());
    (nw.x, nw.y, se.x, se.y)
}
