use std::collections::BTreeMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::{orig, LatLon, RouteNumber};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Route {
    pub number: RouteNumber,
    pub orig_id: orig::RouteID,
    pub name: Option<String>,

    pub patterns: Vec<RoutePattern>,
}

/// One directional variant of a route
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoutePattern {
    pub name: String,
    pub destination: Option<String>,
    pub direction: Option<String>,
    pub path: Vec<LatLon>,
}

impl Route {
    pub fn describe(&self) -> String {
        match self.name {
            Some(ref name) => format!("{} {}", self.number, name),
            None => self.number.to_string(),
        }
    }

    pub fn export_to_geojson(&self, path: String) -> Result<()> {
        use geojson::{Feature, FeatureCollection, GeoJson};

        let mut features = Vec::new();
        for pattern in &self.patterns {
            let mut feature = Feature {
                bbox: None,
                geometry: Some(geojson::Geometry::new(geojson::Value::LineString(
                    pattern.path.iter().map(|pt| vec![pt.lon, pt.lat]).collect(),
                ))),
                id: None,
                properties: None,
                foreign_members: None,
            };
            feature.set_property("route", self.number.0.clone());
            feature.set_property("pattern", pattern.name.clone());
            if let Some(ref destination) = pattern.destination {
                feature.set_property("destination", destination.clone());
            }
            features.push(feature);
        }

        let gj = GeoJson::FeatureCollection(FeatureCollection {
            features,
            bbox: None,
            foreign_members: None,
        });
        fs_err::write(path, serde_json::to_string_pretty(&gj)?)?;
        Ok(())
    }
}

pub fn load<R: std::io::Read>(reader: R) -> Result<BTreeMap<orig::RouteID, Route>> {
    let mut routes = BTreeMap::new();
    for rec in csv::Reader::from_reader(reader).deserialize() {
        let rec: Record = rec?;
        if routes.contains_key(&rec.route_id) {
            bail!("Duplicate {:?}", rec.route_id);
        }
        routes.insert(
            rec.route_id.clone(),
            Route {
                number: RouteNumber(
                    rec.route_short_name
                        .unwrap_or_else(|| rec.route_id.0.clone()),
                ),
                orig_id: rec.route_id,
                name: rec.route_long_name,

                patterns: Vec::new(),
            },
        );
    }
    Ok(routes)
}

#[derive(Deserialize)]
struct Record {
    route_id: orig::RouteID,
    route_short_name: Option<String>,
    route_long_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_name_is_the_number() {
        let routes = load(
            "route_id,route_short_name,route_long_name\n\
             r9,009,Broadway\n\
             r44,,\n"
                .as_bytes(),
        )
        .unwrap();
        let broadway = &routes[&orig::RouteID("r9".to_string())];
        assert_eq!(broadway.number, RouteNumber("009".to_string()));
        assert_eq!(broadway.describe(), "009 Broadway");
        // Without a short name, the route_id stands in
        assert_eq!(routes[&orig::RouteID("r44".to_string())].describe(), "r44");
    }
}
