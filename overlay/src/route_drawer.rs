use colorous::Color;

use transit::{LatLon, Network, RouteNumber, Stop};

use crate::geometry::Rectangle;
use crate::{Legend, OverlayConfig};

/// One visible piece of a route pattern
#[derive(Clone, Debug)]
pub struct RouteSegment {
    pub route: RouteNumber,
    pub src: LatLon,
    pub dst: LatLon,
    pub width: f64,
    pub color: Color,
}

/// Draws every route through the selected stop, keeping only the segments that are on screen.
pub struct RouteDrawer {
    dpi_factor: f64,
    legend: Legend,
    segments: Vec<RouteSegment>,
}

impl RouteDrawer {
    pub fn new(config: &OverlayConfig) -> Self {
        Self {
            dpi_factor: config.dpi_factor,
            legend: Legend::new(),
            segments: Vec::new(),
        }
    }

    /// Rebuilds the segments and legend from scratch.
    pub fn plot_routes(
        &mut self,
        network: &Network,
        selected: Option<&Stop>,
        area: &Rectangle,
        zoom: usize,
    ) {
        self.segments.clear();
        self.legend.clear();

        let stop = match selected {
            Some(stop) => stop,
            None => return,
        };
        let width = self.line_width(zoom);
        for route in network.routes_of(stop) {
            let color = self.legend.color(&route.number);
            for pattern in &route.patterns {
                for pair in pattern.path.windows(2) {
                    if area.intersects_segment(pair[0], pair[1]) {
                        self.segments.push(RouteSegment {
                            route: route.number.clone(),
                            src: pair[0],
                            dst: pair[1],
                            width,
                            color,
                        });
                    }
                }
            }
        }
        debug!(
            "Plotted {} segments for {} routes through {:?}",
            self.segments.len(),
            self.legend.len(),
            stop.id
        );
    }

    pub fn segments(&self) -> &[RouteSegment] {
        &self.segments
    }

    pub fn legend(&self) -> &Legend {
        &self.legend
    }

    pub fn line_width(&self, zoom: usize) -> f64 {
        line_width(zoom) * self.dpi_factor
    }
}

fn line_width(zoom: usize) -> f64 {
    if zoom > 14 {
        7.0
    } else if zoom > 10 {
        5.0
    } else {
        2.0
    }
}
