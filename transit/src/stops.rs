use std::collections::{BTreeMap, BTreeSet};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::{orig, IDMapping, LatLon, RouteNumber, StopID};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Stop {
    pub id: StopID,
    pub orig_id: orig::StopID,
    /// The public stop code, like "50001"
    pub number: String,
    pub name: String,
    pub locn: LatLon,
    /// Filled out after trips are loaded
    pub routes: BTreeSet<RouteNumber>,
}

impl Stop {
    /// "number: name", then one line per route serving the stop
    pub fn describe(&self) -> String {
        let mut title = format!("{}: {}", self.number, self.name);
        for route in &self.routes {
            title.push('\n');
            title.push_str(&route.0);
        }
        title
    }
}

pub fn load<R: std::io::Read>(
    reader: R,
) -> Result<(BTreeMap<StopID, Stop>, IDMapping<orig::StopID, StopID>)> {
    let mut stops = BTreeMap::new();
    let mut ids = IDMapping::new();
    for rec in csv::Reader::from_reader(reader).deserialize() {
        let rec: Record = rec?;
        let id = ids.insert_new(rec.stop_id.clone())?;
        stops.insert(
            id,
            Stop {
                id,
                number: rec.stop_code.unwrap_or_else(|| rec.stop_id.0.clone()),
                name: rec.stop_name.unwrap_or_default(),
                orig_id: rec.stop_id,
                locn: LatLon::new(rec.stop_lat, rec.stop_lon),
                routes: BTreeSet::new(),
            },
        );
    }
    Ok((stops, ids))
}

#[derive(Deserialize)]
struct Record {
    stop_id: orig::StopID,
    stop_code: Option<String>,
    stop_name: Option<String>,
    stop_lat: f64,
    stop_lon: f64,
    // TODO Stations (location_type = 1) are treated like any other stop
}
