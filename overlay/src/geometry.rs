//! Pure geometry used by both overlays. Positions are `LatLon`, with longitude as x and latitude
//! as y. The map widget works in `geom` types, so conversions live here too.

use std::f64::consts::PI;

use geom::{Bounds, GPSBounds, LonLat, Pt2D};
use serde::{Deserialize, Serialize};

use transit::LatLon;

pub const MAX_ZOOM: usize = 21;
const TILE_SIZE: f64 = 256.0;
const MAX_MERCATOR_LAT: f64 = 85.05112878;
const EARTH_CIRCUMFERENCE_EQUATOR: f64 = 40_075_016.686;

/// The geographic rectangle currently shown by the map. Recomputed before every draw pass.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub north_west: LatLon,
    pub south_east: LatLon,
}

impl Rectangle {
    pub fn new(north_west: LatLon, south_east: LatLon) -> Self {
        Self {
            north_west,
            south_east,
        }
    }

    /// Map-space bounds of the viewport, like `Canvas::get_screen_bounds`. Map-space y grows
    /// southwards, so the minimum corner is the north-west one.
    pub fn from_screen_bounds(bounds: &Bounds, gps_bounds: &GPSBounds) -> Self {
        let north_west = Pt2D::new(bounds.min_x, bounds.min_y).to_gps(gps_bounds);
        let south_east = Pt2D::new(bounds.max_x, bounds.max_y).to_gps(gps_bounds);
        Self::new(ll_from_gp(north_west), ll_from_gp(south_east))
    }

    pub fn contains(&self, pt: LatLon) -> bool {
        rectangle_contains_point(self.north_west, self.south_east, pt)
    }

    pub fn intersects_segment(&self, src: LatLon, dst: LatLon) -> bool {
        self.clip_segment(src, dst).is_some()
    }

    /// Liang-Barsky clipping against the closed rectangle. Returns the part of the segment
    /// inside, or None if they share no point.
    pub fn clip_segment(&self, src: LatLon, dst: LatLon) -> Option<(LatLon, LatLon)> {
        let (min_x, max_x) = (self.north_west.lon, self.south_east.lon);
        let (min_y, max_y) = (self.south_east.lat, self.north_west.lat);
        let dx = dst.lon - src.lon;
        let dy = dst.lat - src.lat;

        let mut t0: f64 = 0.0;
        let mut t1: f64 = 1.0;
        for (p, q) in [
            (-dx, src.lon - min_x),
            (dx, max_x - src.lon),
            (-dy, src.lat - min_y),
            (dy, max_y - src.lat),
        ] {
            if p == 0.0 {
                // Parallel to this edge, and on the wrong side of it
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                if r > t1 {
                    return None;
                }
                t0 = t0.max(r);
            } else {
                if r < t0 {
                    return None;
                }
                t1 = t1.min(r);
            }
        }

        let along = |t: f64| LatLon::new(src.lat + t * dy, src.lon + t * dx);
        Some((along(t0), along(t1)))
    }
}

/// True only if the point lies strictly inside the rectangle. Points on an edge or corner are
/// outside.
pub fn rectangle_contains_point(north_west: LatLon, south_east: LatLon, pt: LatLon) -> bool {
    pt.lat < north_west.lat
        && pt.lat > south_east.lat
        && pt.lon > north_west.lon
        && pt.lon < south_east.lon
}

/// True if the segment from `src` to `dst` touches the closed rectangle anywhere.
pub fn rectangle_intersects_line(
    north_west: LatLon,
    south_east: LatLon,
    src: LatLon,
    dst: LatLon,
) -> bool {
    Rectangle::new(north_west, south_east).intersects_segment(src, dst)
}

/// Into the map widget's point type
pub fn gp_from_ll(pt: LatLon) -> LonLat {
    pt.to_lonlat()
}

pub fn ll_from_gp(pt: LonLat) -> LatLon {
    LatLon::from_lonlat(pt)
}

/// Into map-canvas space, for drawing
pub fn to_map_pt(pt: LatLon, gps_bounds: &GPSBounds) -> Pt2D {
    gp_from_ll(pt).to_pt(gps_bounds)
}

/// Web Mercator pixel coordinates of a position at some zoom level. The whole world at zoom 0 is
/// one 256px tile.
pub fn to_world_pixels(pt: LatLon, zoom: usize) -> (f64, f64) {
    let size = TILE_SIZE * 2.0_f64.powi(zoom.min(MAX_ZOOM) as i32);
    let x = (pt.lon + 180.0) / 360.0 * size;
    let sin_lat = pt
        .lat
        .clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT)
        .to_radians()
        .sin();
    let y = (0.5 - ((1.0 + sin_lat) / (1.0 - sin_lat)).ln() / (4.0 * PI)) * size;
    (x, y)
}

/// The slippy-map zoom level matching a canvas scale (pixels per meter) at some latitude.
pub fn zoom_level(cam_zoom: f64, latitude: f64) -> usize {
    // https://wiki.openstreetmap.org/wiki/Zoom_levels
    let log_arg = EARTH_CIRCUMFERENCE_EQUATOR * latitude.to_radians().cos() * cam_zoom;
    let zoom = log_arg.log2() - 8.0;
    if !zoom.is_finite() || zoom <= 0.0 {
        return 0;
    }
    (zoom.round() as usize).min(MAX_ZOOM)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> Rectangle {
        Rectangle::new(LatLon::new(49.3, -123.2), LatLon::new(49.2, -123.0))
    }

    #[test]
    fn contains_strictly_inside() {
        let r = rect();
        assert!(r.contains(LatLon::new(49.25, -123.1)));
        assert!(r.contains(LatLon::new(49.2999, -123.1999)));
        assert!(!r.contains(LatLon::new(49.35, -123.1)));
        assert!(!r.contains(LatLon::new(49.25, -122.9)));
    }

    #[test]
    fn edges_and_corners_are_outside() {
        let r = rect();
        for corner in [
            LatLon::new(49.3, -123.2),
            LatLon::new(49.3, -123.0),
            LatLon::new(49.2, -123.2),
            LatLon::new(49.2, -123.0),
        ] {
            assert!(!r.contains(corner), "{corner} should be outside");
        }
        // Midpoints of each edge
        assert!(!r.contains(LatLon::new(49.3, -123.1)));
        assert!(!r.contains(LatLon::new(49.2, -123.1)));
        assert!(!r.contains(LatLon::new(49.25, -123.2)));
        assert!(!r.contains(LatLon::new(49.25, -123.0)));
    }

    #[test]
    fn segments_outside() {
        let r = rect();
        let cases = [
            // Entirely west
            (LatLon::new(49.25, -123.5), LatLon::new(49.28, -123.3)),
            // Entirely north, spanning the whole width
            (LatLon::new(49.4, -123.5), LatLon::new(49.4, -122.5)),
            // Diagonal passing just beyond the north-east corner
            (LatLon::new(49.29, -122.9), LatLon::new(49.4, -123.05)),
            // A point outside
            (LatLon::new(49.1, -123.1), LatLon::new(49.1, -123.1)),
        ];
        for (src, dst) in cases {
            assert!(!r.intersects_segment(src, dst), "{src} -> {dst}");
            assert!(!rectangle_intersects_line(
                r.north_west,
                r.south_east,
                src,
                dst
            ));
        }
    }

    #[test]
    fn segments_inside_or_crossing() {
        let r = rect();
        // Both ends outside, crossing the middle
        assert!(r.intersects_segment(LatLon::new(49.25, -123.5), LatLon::new(49.25, -122.5)));
        // One end inside
        assert!(r.intersects_segment(LatLon::new(49.25, -123.1), LatLon::new(50.0, -120.0)));
        // Fully inside
        assert!(r.intersects_segment(LatLon::new(49.25, -123.1), LatLon::new(49.26, -123.15)));
        // Running along the northern edge
        assert!(r.intersects_segment(LatLon::new(49.3, -123.5), LatLon::new(49.3, -122.5)));
        // Touching only a corner
        assert!(r.intersects_segment(LatLon::new(49.3, -123.0), LatLon::new(49.4, -122.9)));
    }

    #[test]
    fn clip() {
        let r = rect();
        let (src, dst) = r
            .clip_segment(LatLon::new(49.25, -123.4), LatLon::new(49.25, -122.8))
            .unwrap();
        assert!((src.lon - -123.2).abs() < 1e-9);
        assert!((dst.lon - -123.0).abs() < 1e-9);
        assert!((src.lat - 49.25).abs() < 1e-9);
    }

    #[test]
    fn world_pixels() {
        assert_eq!(to_world_pixels(LatLon::new(0.0, 0.0), 0), (128.0, 128.0));
        let (x, y) = to_world_pixels(LatLon::new(0.0, 0.0), 1);
        assert_eq!((x, y), (256.0, 256.0));
        // North is up
        let (_, north_y) = to_world_pixels(LatLon::new(49.3, -123.1), 15);
        let (_, south_y) = to_world_pixels(LatLon::new(49.2, -123.1), 15);
        assert!(north_y < south_y);
    }

    #[test]
    fn zoom_levels() {
        let lat: f64 = 49.25;
        for level in [3, 11, 15] {
            let cam_zoom = 2.0_f64.powi(level + 8)
                / (EARTH_CIRCUMFERENCE_EQUATOR * lat.to_radians().cos());
            assert_eq!(zoom_level(cam_zoom, lat), level as usize);
        }
        assert_eq!(zoom_level(0.0, lat), 0);
        assert_eq!(zoom_level(1e12, lat), MAX_ZOOM);
    }

    #[test]
    fn conversions() {
        let pt = LatLon::new(49.2827, -123.1207);
        let gp = gp_from_ll(pt);
        assert_eq!(gp.x(), pt.lon);
        assert_eq!(gp.y(), pt.lat);

        let mut gps_bounds = GPSBounds::new();
        gps_bounds.update(LonLat::new(-123.2, 49.2));
        gps_bounds.update(LonLat::new(-123.0, 49.3));
        let r = Rectangle::from_screen_bounds(&gps_bounds.to_bounds(), &gps_bounds);
        assert!((r.north_west.lat - 49.3).abs() < 1e-3);
        assert!((r.north_west.lon - -123.2).abs() < 1e-3);
        assert!((r.south_east.lat - 49.2).abs() < 1e-3);
        assert!((r.south_east.lon - -123.0).abs() < 1e-3);
    }
}
