use std::collections::{BTreeMap, BTreeSet};

use transit::{LatLon, Network, Stop, StopID};

use crate::cluster::{Cluster, RadiusClusterer};
use crate::geometry::Rectangle;
use crate::OverlayConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerID(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Icon {
    Stop,
    NearestStop,
}

#[derive(Clone, Debug)]
pub struct Marker {
    pub id: MarkerID,
    /// The stop this marker represents
    pub stop: StopID,
    pub position: LatLon,
    pub title: String,
    pub icon: Icon,
}

impl Marker {
    fn new(id: MarkerID, stop: &Stop) -> Self {
        Self {
            id,
            stop: stop.id,
            position: stop.locn,
            title: stop.describe(),
            icon: Icon::Stop,
        }
    }
}

/// Stop to marker, and marker to stop through `Marker::stop`.
#[derive(Default)]
pub struct StopMarkers {
    by_stop: BTreeMap<StopID, MarkerID>,
    markers: BTreeMap<MarkerID, Marker>,
    next_id: usize,
}

impl StopMarkers {
    pub fn marker_of(&self, stop: StopID) -> Option<&Marker> {
        self.by_stop.get(&stop).and_then(|id| self.markers.get(id))
    }

    pub fn get(&self, id: MarkerID) -> Option<&Marker> {
        self.markers.get(&id)
    }

    pub fn stop_of(&self, id: MarkerID) -> Option<StopID> {
        self.markers.get(&id).map(|marker| marker.stop)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.markers.values()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Returns the marker and true if it was just created
    fn get_or_create(&mut self, stop: &Stop) -> (MarkerID, bool) {
        if let Some(id) = self.by_stop.get(&stop.id) {
            return (*id, false);
        }
        let id = MarkerID(self.next_id);
        self.next_id += 1;
        self.by_stop.insert(stop.id, id);
        self.markers.insert(id, Marker::new(id, stop));
        (id, true)
    }

    fn set_icon(&mut self, stop: StopID, icon: Icon) {
        if let Some(marker) = self
            .by_stop
            .get(&stop)
            .and_then(|id| self.markers.get_mut(id))
        {
            marker.icon = icon;
        }
    }

    fn retain<F: Fn(StopID) -> bool>(&mut self, keep: F) {
        let markers = &mut self.markers;
        self.by_stop.retain(|stop, id| {
            if keep(*stop) {
                true
            } else {
                markers.remove(id);
                false
            }
        });
    }
}

/// Plots a marker for every visible stop, and highlights the one nearest to the user.
pub struct StopPlotter {
    config: OverlayConfig,
    markers: StopMarkers,
    nearest: Option<StopID>,
    clusterer: RadiusClusterer,
}

impl StopPlotter {
    pub fn new(config: OverlayConfig) -> Self {
        let clusterer = new_clusterer(&config, config.default_zoom);
        Self {
            config,
            markers: StopMarkers::default(),
            nearest: None,
            clusterer,
        }
    }

    /// Marks every stop strictly inside the area. Stops that were already marked keep their
    /// marker; markers of stops that left the area are dropped, except the nearest one.
    pub fn mark_stops(&mut self, network: &Network, area: &Rectangle, zoom: usize) {
        self.clusterer = new_clusterer(&self.config, zoom);

        let mut visible = BTreeSet::new();
        for stop in network.stops.values() {
            if !area.contains(stop.locn) {
                continue;
            }
            let (id, _) = self.markers.get_or_create(stop);
            self.clusterer.add(id, stop.locn);
            visible.insert(stop.id);
        }

        let nearest = self.nearest;
        self.markers
            .retain(|stop| visible.contains(&stop) || Some(stop) == nearest);
        debug!(
            "{} stops visible, {} markers tracked, cluster radius {}px",
            visible.len(),
            self.markers.len(),
            self.clusterer.radius()
        );
    }

    /// Called when the user's location changes. `None` means no stop is close enough.
    pub fn update_marker_of_nearest(&mut self, nearest: Option<&Stop>) {
        if let Some(prev) = self.nearest.take() {
            self.markers.set_icon(prev, Icon::Stop);
        }

        if let Some(stop) = nearest {
            let (id, created) = self.markers.get_or_create(stop);
            if created {
                self.clusterer.add(id, stop.locn);
            }
            self.markers.set_icon(stop.id, Icon::NearestStop);
            self.nearest = Some(stop.id);
        }
    }

    pub fn nearest(&self) -> Option<StopID> {
        self.nearest
    }

    pub fn nearest_marker(&self) -> Option<&Marker> {
        self.nearest.and_then(|stop| self.markers.marker_of(stop))
    }

    pub fn marker_of(&self, stop: StopID) -> Option<&Marker> {
        self.markers.marker_of(stop)
    }

    pub fn stop_of(&self, marker: MarkerID) -> Option<StopID> {
        self.markers.stop_of(marker)
    }

    pub fn markers(&self) -> &StopMarkers {
        &self.markers
    }

    pub fn clusters(&self) -> Vec<Cluster> {
        self.clusterer.clusters()
    }

    pub fn cluster_radius(&self) -> usize {
        self.clusterer.radius()
    }
}

/// Clusters get tighter as the map zooms in
pub fn cluster_radius(zoom: usize, config: &OverlayConfig) -> usize {
    let zoom = if zoom == 0 { config.default_zoom } else { zoom };
    config.cluster_radius / zoom.max(1)
}

fn new_clusterer(config: &OverlayConfig, zoom: usize) -> RadiusClusterer {
    RadiusClusterer::new(
        cluster_radius(zoom, config),
        zoom,
        config.max_clustering_zoom,
    )
}

#[cfg(test)]
mod tests {
    use transit::{orig, RouteNumber};

    use super::*;

    fn stop(id: usize, lat: f64, lon: f64, routes: &[&str]) -> Stop {
        Stop {
            id: StopID(id),
            orig_id: orig::StopID(id.to_string()),
            number: format!("5000{id}"),
            name: format!("Stop {id}"),
            locn: LatLon::new(lat, lon),
            routes: routes.iter().map(|r| RouteNumber(r.to_string())).collect(),
        }
    }

    fn network() -> Network {
        Network::new(
            vec![
                stop(0, 49.25, -123.15, &["009", "099"]),
                stop(1, 49.26, -123.05, &[]),
                stop(2, 49.22, -123.10, &["025"]),
                // Outside the area
                stop(3, 49.40, -123.10, &[]),
            ],
            Vec::new(),
        )
    }

    fn area() -> Rectangle {
        Rectangle::new(LatLon::new(49.3, -123.2), LatLon::new(49.2, -123.0))
    }

    fn highlighted(plotter: &StopPlotter) -> Vec<StopID> {
        plotter
            .markers()
            .iter()
            .filter(|m| m.icon == Icon::NearestStop)
            .map(|m| m.stop)
            .collect()
    }

    #[test]
    fn markers_survive_redraws() {
        let network = network();
        let mut plotter = StopPlotter::new(OverlayConfig::default());
        plotter.mark_stops(&network, &area(), 15);
        let before: Vec<MarkerID> = (0..3)
            .map(|i| plotter.marker_of(StopID(i)).unwrap().id)
            .collect();
        assert!(plotter.marker_of(StopID(3)).is_none());
        assert_eq!(plotter.markers().len(), 3);

        plotter.mark_stops(&network, &area(), 15);
        let after: Vec<MarkerID> = (0..3)
            .map(|i| plotter.marker_of(StopID(i)).unwrap().id)
            .collect();
        assert_eq!(before, after);
        assert_eq!(plotter.markers().len(), 3);

        for id in after {
            let stop = plotter.stop_of(id).unwrap();
            assert_eq!(plotter.marker_of(stop).unwrap().id, id);
        }
    }

    #[test]
    fn markers_leaving_the_area_are_dropped() {
        let network = network();
        let mut plotter = StopPlotter::new(OverlayConfig::default());
        plotter.mark_stops(&network, &area(), 15);
        let old = plotter.marker_of(StopID(1)).unwrap().id;

        // Only the western half
        let west = Rectangle::new(LatLon::new(49.3, -123.2), LatLon::new(49.2, -123.1));
        plotter.mark_stops(&network, &west, 15);
        assert!(plotter.marker_of(StopID(1)).is_none());
        assert!(plotter.stop_of(old).is_none());
        assert!(plotter.marker_of(StopID(0)).is_some());

        plotter.mark_stops(&network, &area(), 15);
        assert_ne!(plotter.marker_of(StopID(1)).unwrap().id, old);
    }

    #[test]
    fn titles() {
        let network = network();
        let mut plotter = StopPlotter::new(OverlayConfig::default());
        plotter.mark_stops(&network, &area(), 15);
        assert_eq!(
            plotter.marker_of(StopID(0)).unwrap().title,
            "50000: Stop 0\n009\n099"
        );
        assert_eq!(plotter.marker_of(StopID(1)).unwrap().title, "50001: Stop 1");
    }

    #[test]
    fn nearest_moves() {
        let network = network();
        let mut plotter = StopPlotter::new(OverlayConfig::default());
        plotter.mark_stops(&network, &area(), 15);
        assert!(highlighted(&plotter).is_empty());

        plotter.update_marker_of_nearest(network.stop(StopID(0)));
        assert_eq!(highlighted(&plotter), vec![StopID(0)]);
        assert_eq!(plotter.nearest(), Some(StopID(0)));

        plotter.update_marker_of_nearest(network.stop(StopID(2)));
        assert_eq!(plotter.marker_of(StopID(0)).unwrap().icon, Icon::Stop);
        assert_eq!(highlighted(&plotter), vec![StopID(2)]);
        assert_eq!(plotter.nearest_marker().unwrap().stop, StopID(2));
    }

    #[test]
    fn nearest_cleared() {
        let network = network();
        let mut plotter = StopPlotter::new(OverlayConfig::default());
        plotter.mark_stops(&network, &area(), 15);
        plotter.update_marker_of_nearest(network.stop(StopID(1)));
        plotter.update_marker_of_nearest(None);
        assert!(highlighted(&plotter).is_empty());
        assert_eq!(plotter.nearest(), None);
        assert!(plotter.nearest_marker().is_none());
        assert_eq!(plotter.marker_of(StopID(1)).unwrap().icon, Icon::Stop);

        // Clearing twice is fine
        plotter.update_marker_of_nearest(None);
        assert_eq!(plotter.nearest(), None);
    }

    #[test]
    fn nearest_outside_the_area() {
        let network = network();
        let mut plotter = StopPlotter::new(OverlayConfig::default());
        plotter.mark_stops(&network, &area(), 15);
        plotter.update_marker_of_nearest(network.stop(StopID(3)));
        let id = plotter.nearest_marker().unwrap().id;

        // The nearest marker is kept across redraws even though it's not visible
        plotter.mark_stops(&network, &area(), 15);
        assert_eq!(plotter.nearest_marker().unwrap().id, id);
        assert_eq!(highlighted(&plotter), vec![StopID(3)]);

        // Once it's no longer nearest, the next redraw drops it
        plotter.update_marker_of_nearest(network.stop(StopID(0)));
        plotter.mark_stops(&network, &area(), 15);
        assert!(plotter.marker_of(StopID(3)).is_none());
        assert_eq!(highlighted(&plotter), vec![StopID(0)]);
    }

    #[test]
    fn nearest_icon_survives_redraw() {
        let network = network();
        let mut plotter = StopPlotter::new(OverlayConfig::default());
        plotter.mark_stops(&network, &area(), 15);
        plotter.update_marker_of_nearest(network.stop(StopID(2)));
        plotter.mark_stops(&network, &area(), 12);
        assert_eq!(highlighted(&plotter), vec![StopID(2)]);
    }

    #[test]
    fn radius_from_zoom() {
        let config = OverlayConfig::default();
        assert_eq!(cluster_radius(10, &config), 100);
        assert_eq!(cluster_radius(16, &config), 62);
        // Falls back to the default zoom
        assert_eq!(cluster_radius(0, &config), 1000 / 12);

        let mut plotter = StopPlotter::new(config);
        plotter.mark_stops(&network(), &area(), 10);
        assert_eq!(plotter.cluster_radius(), 100);
        // Zoomed out this far, all three visible stops share a cluster
        let clusters = plotter.clusters();
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].markers.len(), 3);
    }
}
