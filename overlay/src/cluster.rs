use transit::LatLon;

use crate::geometry::to_world_pixels;
use crate::MarkerID;

/// Groups markers that would be drawn within some number of pixels of each other.
pub struct RadiusClusterer {
    radius: usize,
    zoom: usize,
    max_clustering_zoom: usize,
    // In insertion order
    items: Vec<(MarkerID, LatLon)>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Cluster {
    /// Where the first marker of the cluster is
    pub position: LatLon,
    pub markers: Vec<MarkerID>,
}

impl Cluster {
    pub fn is_single(&self) -> bool {
        self.markers.len() == 1
    }
}

impl RadiusClusterer {
    pub fn new(radius: usize, zoom: usize, max_clustering_zoom: usize) -> Self {
        Self {
            radius,
            zoom,
            max_clustering_zoom,
            items: Vec::new(),
        }
    }

    pub fn radius(&self) -> usize {
        self.radius
    }

    /// Adding the same marker twice has no effect
    pub fn add(&mut self, marker: MarkerID, position: LatLon) {
        if !self.contains(marker) {
            self.items.push((marker, position));
        }
    }

    pub fn contains(&self, marker: MarkerID) -> bool {
        self.items.iter().any(|(id, _)| *id == marker)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Greedy: each unclustered marker starts a cluster and absorbs every later unclustered
    /// marker within the radius of it.
    pub fn clusters(&self) -> Vec<Cluster> {
        if self.zoom > self.max_clustering_zoom {
            return self
                .items
                .iter()
                .map(|(id, pos)| Cluster {
                    position: *pos,
                    markers: vec![*id],
                })
                .collect();
        }

        let pixels: Vec<(f64, f64)> = self
            .items
            .iter()
            .map(|(_, pos)| to_world_pixels(*pos, self.zoom))
            .collect();
        let radius = self.radius as f64;

        let mut clustered = vec![false; self.items.len()];
        let mut clusters = Vec::new();
        for seed in 0..self.items.len() {
            if clustered[seed] {
                continue;
            }
            clustered[seed] = true;
            let (seed_x, seed_y) = pixels[seed];
            let mut markers = vec![self.items[seed].0];
            for other in (seed + 1)..self.items.len() {
                if clustered[other] {
                    continue;
                }
                let (x, y) = pixels[other];
                if (x - seed_x).hypot(y - seed_y) <= radius {
                    clustered[other] = true;
                    markers.push(self.items[other].0);
                }
            }
            clusters.push(Cluster {
                position: self.items[seed].1,
                markers,
            });
        }
        clusters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearby_markers_merge() {
        // At zoom 15, 0.0001 degrees of longitude is about 2.4px; 0.01 is about 240px
        let mut clusterer = RadiusClusterer::new(66, 15, 17);
        clusterer.add(MarkerID(0), LatLon::new(49.2600, -123.1000));
        clusterer.add(MarkerID(1), LatLon::new(49.2600, -123.0999));
        clusterer.add(MarkerID(2), LatLon::new(49.2600, -123.0900));
        clusterer.add(MarkerID(1), LatLon::new(49.2600, -123.0999));
        assert_eq!(clusterer.len(), 3);

        let clusters = clusterer.clusters();
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].markers, vec![MarkerID(0), MarkerID(1)]);
        assert_eq!(clusters[0].position, LatLon::new(49.2600, -123.1000));
        assert!(clusters[1].is_single());
    }

    #[test]
    fn no_clustering_when_zoomed_in() {
        let mut clusterer = RadiusClusterer::new(66, 18, 17);
        clusterer.add(MarkerID(0), LatLon::new(49.2600, -123.1000));
        clusterer.add(MarkerID(1), LatLon::new(49.2600, -123.1000));
        assert_eq!(clusterer.clusters().len(), 2);
    }

    #[test]
    fn empty() {
        assert!(RadiusClusterer::new(66, 15, 17).clusters().is_empty());
    }
}
