#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod ids;
mod latlon;
mod routes;
mod shapes;
mod stops;
mod trips;

use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;

use abstutil::Timer;
use anyhow::Result;
use geom::{Distance, GPSBounds};
use serde::{Deserialize, Serialize};
use zip::result::ZipError;
use zip::ZipArchive;

pub use ids::{orig, CheapID, IDMapping, RouteNumber, StopID};
pub use latlon::LatLon;
pub use routes::{Route, RoutePattern};
pub use stops::Stop;

/// Nearest stops are only reported within this distance of the user
pub const RADIUS: Distance = Distance::const_meters(10_000.0);

/// Every stop and route known to the app. Loaded once, then only read.
#[derive(Clone, Serialize, Deserialize)]
pub struct Network {
    pub stops: BTreeMap<StopID, Stop>,
    pub routes: BTreeMap<RouteNumber, Route>,
    pub gps_bounds: GPSBounds,
}

impl Network {
    pub fn empty() -> Self {
        Self {
            stops: BTreeMap::new(),
            routes: BTreeMap::new(),
            gps_bounds: GPSBounds::new(),
        }
    }

    /// Assembles a network from stops and routes that are already cross-referenced.
    pub fn new(stops: Vec<Stop>, routes: Vec<Route>) -> Self {
        let mut network = Self::empty();
        for stop in stops {
            network.stops.insert(stop.id, stop);
        }
        for route in routes {
            network.routes.insert(route.number.clone(), route);
        }
        network.update_bounds();
        network
    }

    /// Dispatches on the file extension: a .zip archive or a directory of GTFS files.
    pub fn load(path: &str, timer: &mut Timer) -> Result<Self> {
        if path.ends_with(".zip") {
            let bytes = fs_err::read(path)?;
            let mut archive = ZipArchive::new(std::io::Cursor::new(bytes))?;
            Self::load_from_zip(&mut archive, timer)
        } else {
            Self::load_from_dir(path, timer)
        }
    }

    pub fn load_from_dir(path: &str, timer: &mut Timer) -> Result<Self> {
        let read = |name: &str| -> Result<Vec<u8>> {
            fs_err::read(format!("{path}/{name}")).map_err(|err| err.into())
        };
        let shapes_path = format!("{path}/shapes.txt");
        let raw = RawFiles {
            stops: read("stops.txt")?,
            routes: read("routes.txt")?,
            trips: read("trips.txt")?,
            stop_times: read("stop_times.txt")?,
            shapes: if std::path::Path::new(&shapes_path).exists() {
                Some(fs_err::read(shapes_path)?)
            } else {
                None
            },
        };
        Self::from_raw(raw, timer)
    }

    pub fn load_from_zip<R: std::io::Read + std::io::Seek>(
        archive: &mut ZipArchive<R>,
        timer: &mut Timer,
    ) -> Result<Self> {
        let raw = RawFiles {
            stops: read_zip_file(archive, "stops.txt")?,
            routes: read_zip_file(archive, "routes.txt")?,
            trips: read_zip_file(archive, "trips.txt")?,
            stop_times: read_zip_file(archive, "stop_times.txt")?,
            shapes: read_optional_zip_file(archive, "shapes.txt")?,
        };
        Self::from_raw(raw, timer)
    }

    fn from_raw(raw: RawFiles, timer: &mut Timer) -> Result<Self> {
        timer.start("parse stops and routes");
        let (mut stops, stop_ids) = stops::load(raw.stops.as_slice())?;
        let routes_by_orig = routes::load(raw.routes.as_slice())?;
        let shapes = match raw.shapes {
            Some(bytes) => shapes::load(bytes.as_slice())?,
            None => BTreeMap::new(),
        };
        timer.stop("parse stops and routes");

        timer.start("parse trips");
        let mut trips = trips::load(raw.trips.as_slice())?;
        trips::load_stop_times(raw.stop_times.as_slice(), &stop_ids, &mut trips)?;
        timer.stop("parse trips");

        // Routes sharing a number are merged, so patterns are grouped per number
        let mut route_numbers: BTreeMap<orig::RouteID, RouteNumber> = BTreeMap::new();
        let mut routes: BTreeMap<RouteNumber, Route> = BTreeMap::new();
        for (orig_id, route) in routes_by_orig {
            route_numbers.insert(orig_id.clone(), route.number.clone());
            if routes.contains_key(&route.number) {
                debug!("Merging {:?} into route {}", orig_id, route.number);
            } else {
                routes.insert(route.number.clone(), route);
            }
        }

        timer.start("group trips into patterns");
        let mut seen_patterns: BTreeMap<RouteNumber, BTreeSet<PatternKey>> = BTreeMap::new();
        for trip in trips.values() {
            let route = match route_numbers.get(&trip.route_id) {
                Some(number) => routes.get_mut(number),
                None => None,
            };
            let route = match route {
                Some(route) => route,
                None => bail!("{:?} belongs to unknown {:?}", trip.orig_id, trip.route_id),
            };
            for stop_id in &trip.stops {
                if let Some(stop) = stops.get_mut(stop_id) {
                    stop.routes.insert(route.number.clone());
                }
            }

            let key = match trip.shape_id {
                Some(ref shape_id) if shapes.contains_key(shape_id) => {
                    PatternKey::Shape(shape_id.clone())
                }
                _ if trip.stops.is_empty() => {
                    warn!("{:?} has no shape and no stop times, skipping it", trip.orig_id);
                    continue;
                }
                _ => PatternKey::Stops(trip.stops.clone()),
            };
            if !seen_patterns
                .entry(route.number.clone())
                .or_insert_with(BTreeSet::new)
                .insert(key.clone())
            {
                continue;
            }

            let (name, path) = match key {
                PatternKey::Shape(shape_id) => {
                    let path = shapes[&shape_id].clone();
                    (shape_id.0, path)
                }
                PatternKey::Stops(ids) => (
                    trip.orig_id.0.clone(),
                    ids.iter().map(|id| stops[id].locn).collect(),
                ),
            };
            route.patterns.push(RoutePattern {
                name,
                destination: trip.headsign.clone(),
                direction: trip.direction.clone(),
                path,
            });
        }
        timer.stop("group trips into patterns");

        routes.retain(|number, route| {
            if route.patterns.is_empty() {
                warn!("Route {} has no trips, skipping it", number);
            }
            !route.patterns.is_empty()
        });

        let mut network = Self {
            stops,
            routes,
            gps_bounds: GPSBounds::new(),
        };
        network.update_bounds();
        info!(
            "Loaded {} stops and {} routes",
            network.stops.len(),
            network.routes.len()
        );
        Ok(network)
    }

    fn update_bounds(&mut self) {
        let mut gps_bounds = GPSBounds::new();
        for stop in self.stops.values() {
            gps_bounds.update(stop.locn.to_lonlat());
        }
        for route in self.routes.values() {
            for pattern in &route.patterns {
                for pt in &pattern.path {
                    gps_bounds.update(pt.to_lonlat());
                }
            }
        }
        self.gps_bounds = gps_bounds;
    }

    pub fn stop(&self, id: StopID) -> Option<&Stop> {
        self.stops.get(&id)
    }

    pub fn find_stop_by_number(&self, number: &str) -> Option<StopID> {
        self.stops
            .values()
            .find(|stop| stop.number == number)
            .map(|stop| stop.id)
    }

    /// Routes passing through the stop, in route number order. Route numbers the network doesn't
    /// know about are skipped.
    pub fn routes_of<'a>(&'a self, stop: &'a Stop) -> impl Iterator<Item = &'a Route> + 'a {
        stop.routes.iter().filter_map(move |number| {
            let route = self.routes.get(number);
            if route.is_none() {
                warn!("{:?} lists unknown route {}", stop.id, number);
            }
            route
        })
    }

    /// The stop closest to the position, if any is within RADIUS.
    pub fn find_nearest_to(&self, pt: LatLon) -> Option<StopID> {
        self.find_nearest_within(pt, RADIUS)
    }

    pub fn find_nearest_within(&self, pt: LatLon, radius: Distance) -> Option<StopID> {
        let mut best: Option<(StopID, Distance)> = None;
        for stop in self.stops.values() {
            let dist = pt.to_lonlat().gps_dist(stop.locn.to_lonlat());
            if dist > radius {
                continue;
            }
            // Stops are visited in ID order, so ties keep the lower ID
            if best.map(|(_, best_dist)| dist < best_dist).unwrap_or(true) {
                best = Some((stop.id, dist));
            }
        }
        best.map(|(id, _)| id)
    }
}

struct RawFiles {
    stops: Vec<u8>,
    routes: Vec<u8>,
    trips: Vec<u8>,
    stop_times: Vec<u8>,
    shapes: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord)]
enum PatternKey {
    Shape(orig::ShapeID),
    // Trips without a shape are grouped by the stops they visit
    Stops(Vec<StopID>),
}

// Adds the path in the error message
fn read_zip_file<R: std::io::Read + std::io::Seek>(
    archive: &mut ZipArchive<R>,
    path: &str,
) -> Result<Vec<u8>> {
    let mut file = archive
        .by_name(path)
        .map_err(|err| anyhow!("{path}: {err}"))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(bytes)
}

// Only a missing entry counts as absent. A damaged one is still an error.
fn read_optional_zip_file<R: std::io::Read + std::io::Seek>(
    archive: &mut ZipArchive<R>,
    path: &str,
) -> Result<Option<Vec<u8>>> {
    match archive.by_name(path) {
        Ok(mut file) => {
            let mut bytes = Vec::new();
            file.read_to_end(&mut bytes)
                .map_err(|err| anyhow!("{path}: {err}"))?;
            Ok(Some(bytes))
        }
        Err(ZipError::FileNotFound) => Ok(None),
        Err(err) => bail!("{path}: {err}"),
    }
}
