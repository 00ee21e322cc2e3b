//! Overlays drawn above the map: the routes through a selected stop, and markers for every stop in
//! view. Nothing here depends on the graphics backend; the viewer turns the output into
//! something drawable.

#[macro_use]
extern crate log;

mod cluster;
mod config;
pub mod geometry;
mod legend;
mod route_drawer;
mod stop_plotter;

pub use self::cluster::{Cluster, RadiusClusterer};
pub use self::config::OverlayConfig;
pub use self::geometry::Rectangle;
pub use self::legend::Legend;
pub use self::route_drawer::{RouteDrawer, RouteSegment};
pub use self::stop_plotter::{cluster_radius, Icon, Marker, MarkerID, StopMarkers, StopPlotter};
