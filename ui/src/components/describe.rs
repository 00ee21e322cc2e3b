use widgetry::{Color, EventCtx, Line, Text, Widget};

use overlay::{Cluster, Legend, StopPlotter};
use transit::{Network, Stop};

pub fn stop(stop: &Stop) -> Text {
    let mut txt = Text::from(Line(format!("Stop {}", stop.number)).small_heading());
    txt.add_line(Line(format!("Name: {}", stop.name)));
    txt.add_line(Line(format!("Location: {}", stop.locn)));
    if stop.routes.is_empty() {
        txt.add_line(Line("No routes stop here"));
    } else {
        txt.add_line(Line(format!(
            "Routes: {}",
            stop.routes
                .iter()
                .map(|r| r.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        )));
    }
    txt
}

/// One line per stop in the cluster, using each marker's title
pub fn cluster(cluster: &Cluster, plotter: &StopPlotter) -> Text {
    let mut txt = Text::from(format!("{} stops", cluster.markers.len()));
    for id in &cluster.markers {
        if let Some(marker) = plotter.markers().get(*id) {
            // Only the "number: name" part
            if let Some(first) = marker.title.lines().next() {
                txt.add_line(Line(first.to_string()));
            }
        }
    }
    txt
}

pub fn marker_title(title: &str) -> Text {
    Text::from_multiline(title.lines().map(|line| Line(line.to_string())).collect())
}

/// Each route's number and long name, in its line color
pub fn legend(ctx: &mut EventCtx, legend: &Legend, network: &Network) -> Widget {
    if legend.is_empty() {
        return Text::from("Click a stop to see its routes").into_widget(ctx);
    }
    let mut txt = Text::from(Line("Routes").small_heading());
    for (route, color) in legend.entries() {
        let label = match network.routes.get(route) {
            Some(route) => route.describe(),
            None => route.to_string(),
        };
        txt.add_line(Line(label).fg(to_color(*color)));
    }
    txt.into_widget(ctx)
}

pub fn to_color(color: colorous::Color) -> Color {
    Color::rgb(color.r as usize, color.g as usize, color.b as usize)
}
