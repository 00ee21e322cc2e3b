use std::fmt;

use geom::LonLat;
use serde::{Deserialize, Serialize};

/// A position on the earth, in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// geom works in (x, y) order
    pub fn to_lonlat(self) -> LonLat {
        LonLat::new(self.lon, self.lat)
    }

    pub fn from_lonlat(pt: LonLat) -> Self {
        Self::new(pt.y(), pt.x())
    }
}

impl fmt::Display for LatLon {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lon)
    }
}
