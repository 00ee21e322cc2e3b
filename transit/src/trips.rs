use std::collections::BTreeMap;

use anyhow::Result;
use serde::Deserialize;

use crate::{orig, IDMapping, StopID};

/// Only kept while loading; trips get grouped into route patterns.
pub struct Trip {
    pub orig_id: orig::TripID,
    pub route_id: orig::RouteID,
    pub shape_id: Option<orig::ShapeID>,
    pub headsign: Option<String>,
    pub direction: Option<String>,
    // Sorted by stop_sequence
    pub stops: Vec<StopID>,
}

pub fn load<R: std::io::Read>(reader: R) -> Result<BTreeMap<orig::TripID, Trip>> {
    let mut trips = BTreeMap::new();
    for rec in csv::Reader::from_reader(reader).deserialize() {
        let rec: Record = rec?;
        if trips.contains_key(&rec.trip_id) {
            bail!("Duplicate {:?}", rec.trip_id);
        }
        trips.insert(
            rec.trip_id.clone(),
            Trip {
                orig_id: rec.trip_id,
                route_id: rec.route_id,
                shape_id: rec.shape_id,
                headsign: rec.trip_headsign,
                direction: rec.direction_id,
                stops: Vec::new(),
            },
        );
    }
    Ok(trips)
}

#[derive(Deserialize)]
struct Record {
    route_id: orig::RouteID,
    trip_id: orig::TripID,
    shape_id: Option<orig::ShapeID>,
    trip_headsign: Option<String>,
    direction_id: Option<String>,
}

pub fn load_stop_times<R: std::io::Read>(
    reader: R,
    stop_ids: &IDMapping<orig::StopID, StopID>,
    trips: &mut BTreeMap<orig::TripID, Trip>,
) -> Result<()> {
    let mut per_trip: BTreeMap<orig::TripID, Vec<(usize, StopID)>> = BTreeMap::new();
    for rec in csv::Reader::from_reader(reader).deserialize() {
        let rec: StopTimeRecord = rec?;
        if !trips.contains_key(&rec.trip_id) {
            bail!("Stop time for unknown {:?}", rec.trip_id);
        }
        let stop_id = stop_ids.lookup(&rec.stop_id)?;
        per_trip
            .entry(rec.trip_id)
            .or_insert_with(Vec::new)
            .push((rec.stop_sequence, stop_id));
    }

    for (trip_id, mut stops) in per_trip {
        stops.sort_by_key(|(seq, _)| *seq);
        // Checked above
        if let Some(trip) = trips.get_mut(&trip_id) {
            trip.stops = stops.into_iter().map(|(_, id)| id).collect();
        }
    }
    Ok(())
}

#[derive(Deserialize)]
struct StopTimeRecord {
    trip_id: orig::TripID,
    stop_id: orig::StopID,
    stop_sequence: usize,
}
