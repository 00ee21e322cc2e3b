use serde::{Deserialize, Serialize};

/// Tunables for both overlays. Missing fields in a config file fall back to the defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Scales line widths for high-density screens
    pub dpi_factor: f64,
    /// Used for clustering when the map reports zoom level 0
    pub default_zoom: usize,
    /// The clustering radius in pixels is this divided by the zoom level
    pub cluster_radius: usize,
    /// Past this zoom level, every marker is drawn individually
    pub max_clustering_zoom: usize,
    pub nearest_radius_meters: f64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            dpi_factor: 1.0,
            default_zoom: 12,
            cluster_radius: 1000,
            max_clustering_zoom: 17,
            nearest_radius_meters: 10_000.0,
        }
    }
}
