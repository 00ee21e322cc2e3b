use std::collections::BTreeMap;

use anyhow::Result;
use serde::Deserialize;

use crate::{orig, LatLon};

pub fn load<R: std::io::Read>(reader: R) -> Result<BTreeMap<orig::ShapeID, Vec<LatLon>>> {
    let mut pts_per_shape: BTreeMap<orig::ShapeID, Vec<(usize, LatLon)>> = BTreeMap::new();
    for rec in csv::Reader::from_reader(reader).deserialize() {
        let rec: Record = rec?;
        pts_per_shape.entry(rec.shape_id).or_insert_with(Vec::new).push((
            rec.shape_pt_sequence,
            LatLon::new(rec.shape_pt_lat, rec.shape_pt_lon),
        ));
    }

    let mut shapes = BTreeMap::new();
    for (id, mut pts) in pts_per_shape {
        pts.sort_by_key(|(seq, _)| *seq);
        shapes.insert(id, pts.into_iter().map(|(_, pt)| pt).collect());
    }
    Ok(shapes)
}

#[derive(Deserialize)]
struct Record {
    shape_id: orig::ShapeID,
    shape_pt_lat: f64,
    shape_pt_lon: f64,
    shape_pt_sequence: usize,
}
