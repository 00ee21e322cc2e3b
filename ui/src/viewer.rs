use geom::{Bounds, Circle, Distance};
use widgetry::mapspace::{ObjectID, World, WorldOutcome};
use widgetry::tools::PopupMsg;
use widgetry::{
    Color, Drawable, EventCtx, GeomBatch, GfxCtx, HorizontalAlignment, Key, Line, Outcome, Panel,
    State, Text, VerticalAlignment, Widget,
};

use overlay::geometry::{ll_from_gp, to_map_pt, zoom_level};
use overlay::{Icon, Rectangle, RouteDrawer, StopPlotter};
use transit::StopID;

use crate::components::describe;
use crate::{App, Transition};

// In pixels, so they're the same size at every zoom
const MARKER_RADIUS: f64 = 8.0;
const CLUSTER_RADIUS: f64 = 14.0;
const OUTLINE_THICKNESS: f64 = 2.0;

pub struct Viewer {
    panel: Panel,
    world: World<Obj>,
    draw_routes: Drawable,
    route_drawer: RouteDrawer,
    stop_plotter: StopPlotter,
    // Both overlays are rebuilt whenever this changes
    screen_bounds: Bounds,
}

impl Viewer {
    pub fn new_state(ctx: &mut EventCtx, app: &App) -> Box<dyn State<App>> {
        let mut state = Self {
            panel: Panel::new_builder(Widget::col(vec![
                Line("Bus Stops").small_heading().into_widget(ctx),
                Widget::placeholder(ctx, "selected"),
                Widget::placeholder(ctx, "legend"),
                Widget::row(vec![
                    ctx.style().btn_outline.text("Export routes").build_def(ctx),
                    ctx.style().btn_outline.text("Clear location").build_def(ctx),
                ]),
                Text::from("Press L to move yourself to the cursor").into_widget(ctx),
            ]))
            .aligned(HorizontalAlignment::Left, VerticalAlignment::Top)
            .build(ctx),
            world: World::unbounded(),
            draw_routes: Drawable::empty(ctx),
            route_drawer: RouteDrawer::new(&app.config),
            stop_plotter: StopPlotter::new(app.config.clone()),
            screen_bounds: Bounds::new(),
        };
        state.update_nearest(app);
        state.redraw(ctx, app);
        Box::new(state)
    }

    fn update_nearest(&mut self, app: &App) {
        let radius = Distance::meters(app.config.nearest_radius_meters);
        let nearest = app
            .location
            .and_then(|pt| app.network.find_nearest_within(pt, radius))
            .and_then(|id| app.network.stop(id));
        if let Some(stop) = nearest {
            info!("Nearest stop is {}: {}", stop.number, stop.name);
        }
        self.stop_plotter.update_marker_of_nearest(nearest);
    }

    fn redraw(&mut self, ctx: &mut EventCtx, app: &App) {
        let gps_bounds = &app.network.gps_bounds;
        self.screen_bounds = ctx.canvas.get_screen_bounds();
        let area = Rectangle::from_screen_bounds(&self.screen_bounds, gps_bounds);
        let center = ll_from_gp(ctx.canvas.center_to_map_pt().to_gps(gps_bounds));
        let zoom = zoom_level(ctx.canvas.cam_zoom, center.lat);

        let selected = app.selected.and_then(|id| app.network.stop(id));
        self.route_drawer
            .plot_routes(&app.network, selected, &area, zoom);
        self.stop_plotter.mark_stops(&app.network, &area, zoom);

        let mut batch = GeomBatch::new();
        for segment in self.route_drawer.segments() {
            let pt1 = to_map_pt(segment.src, gps_bounds);
            let pt2 = to_map_pt(segment.dst, gps_bounds);
            // Zero-length segments have nothing to draw
            if let Ok(line) = geom::Line::new(pt1, pt2) {
                batch.push(
                    describe::to_color(segment.color),
                    line.make_polygons(Distance::meters(segment.width / ctx.canvas.cam_zoom)),
                );
            }
        }
        if let Some(pt) = app.location {
            batch.push(
                Color::CYAN,
                Circle::new(
                    to_map_pt(pt, gps_bounds),
                    Distance::meters(MARKER_RADIUS / ctx.canvas.cam_zoom),
                )
                .to_polygon(),
            );
        }
        self.draw_routes = ctx.upload(batch);

        self.world = self.make_world(ctx, app);

        let legend = describe::legend(ctx, self.route_drawer.legend(), &app.network);
        self.panel.replace(ctx, "legend", legend);
        let selected = match selected {
            Some(stop) => describe::stop(stop),
            None => Text::from("No stop selected"),
        }
        .into_widget(ctx);
        self.panel.replace(ctx, "selected", selected);
    }

    fn make_world(&self, ctx: &mut EventCtx, app: &App) -> World<Obj> {
        let mut world = World::unbounded();
        let gps_bounds = &app.network.gps_bounds;
        let cam_zoom = ctx.canvas.cam_zoom;
        let outline_thickness = Distance::meters(OUTLINE_THICKNESS / cam_zoom);
        let nearest = self.stop_plotter.nearest_marker().map(|marker| marker.id);

        for (idx, cluster) in self.stop_plotter.clusters().into_iter().enumerate() {
            let center = to_map_pt(cluster.position, gps_bounds);

            if cluster.is_single() {
                let marker = match self.stop_plotter.markers().get(cluster.markers[0]) {
                    Some(marker) => marker,
                    None => continue,
                };
                let circle = Circle::new(center, Distance::meters(MARKER_RADIUS / cam_zoom));
                let hitbox = circle.to_polygon();
                let mut batch = GeomBatch::new();
                batch.push(
                    match marker.icon {
                        Icon::Stop => Color::BLUE,
                        Icon::NearestStop => Color::RED,
                    },
                    hitbox.clone(),
                );
                if let Ok(outline) = circle.to_outline(outline_thickness) {
                    batch.push(Color::WHITE, outline);
                }

                world
                    .add(Obj::Stop(marker.stop))
                    .hitbox(hitbox)
                    .draw(batch)
                    .hover_alpha(0.5)
                    .tooltip(describe::marker_title(&marker.title))
                    .clickable()
                    .build(ctx);
                continue;
            }

            let circle = Circle::new(center, Distance::meters(CLUSTER_RADIUS / cam_zoom));
            let hitbox = circle.to_polygon();
            let mut batch = GeomBatch::new();
            // Highlight the cluster hiding the nearest stop
            let color = if cluster.markers.iter().any(|id| Some(*id) == nearest) {
                Color::RED
            } else {
                Color::PURPLE
            };
            batch.push(color, hitbox.clone());
            if let Ok(outline) = circle.to_outline(outline_thickness) {
                batch.push(Color::WHITE, outline);
            }
            batch.append(
                Text::from(Line(cluster.markers.len().to_string()).fg(Color::WHITE))
                    .render_autocropped(ctx)
                    .scale(1.0 / cam_zoom)
                    .centered_on(center),
            );

            world
                .add(Obj::Cluster(idx))
                .hitbox(hitbox)
                .draw(batch)
                .hover_alpha(0.5)
                .tooltip(describe::cluster(&cluster, &self.stop_plotter))
                .build(ctx);
        }

        world.initialize_hover(ctx);
        world
    }

    fn export_routes(&self, ctx: &mut EventCtx, app: &App) -> Transition {
        let stop = match app.selected.and_then(|id| app.network.stop(id)) {
            Some(stop) => stop,
            None => {
                return Transition::Push(PopupMsg::new_state(
                    ctx,
                    "Export",
                    vec!["Select a stop first".to_string()],
                ));
            }
        };

        let mut lines = Vec::new();
        if let Err(err) = fs_err::create_dir_all("data/output") {
            return Transition::Push(PopupMsg::new_state(ctx, "Error", vec![err.to_string()]));
        }
        for route in app.network.routes_of(stop) {
            let path = format!("data/output/route_{}.geojson", route.number);
            match route.export_to_geojson(path.clone()) {
                Ok(()) => lines.push(format!("Wrote {path}")),
                Err(err) => {
                    error!("Couldn't export route {}: {err}", route.number);
                    lines.push(format!("Couldn't write {path}: {err}"));
                }
            }
        }
        if lines.is_empty() {
            lines.push(format!("No routes stop at {}", stop.number));
        }
        Transition::Push(PopupMsg::new_state(ctx, "Export", lines))
    }
}

impl State<App> for Viewer {
    fn event(&mut self, ctx: &mut EventCtx, app: &mut App) -> Transition {
        ctx.canvas_movement();
        if ctx.canvas.get_screen_bounds() != self.screen_bounds {
            self.redraw(ctx, app);
        }

        if let WorldOutcome::ClickedObject(Obj::Stop(id)) = self.world.event(ctx) {
            app.selected = Some(id);
            self.redraw(ctx, app);
            return Transition::Keep;
        }

        if ctx.input.pressed(Key::L) {
            if let Some(pt) = ctx.canvas.get_cursor_in_map_space() {
                app.location = Some(ll_from_gp(pt.to_gps(&app.network.gps_bounds)));
                self.update_nearest(app);
                self.redraw(ctx, app);
            }
        }

        match self.panel.event(ctx) {
            Outcome::Clicked(x) => match x.as_ref() {
                "Export routes" => {
                    return self.export_routes(ctx, app);
                }
                "Clear location" => {
                    app.location = None;
                    self.update_nearest(app);
                    self.redraw(ctx, app);
                }
                _ => unreachable!(),
            },
            _ => {}
        }

        Transition::Keep
    }

    fn draw(&self, g: &mut GfxCtx, _: &App) {
        g.redraw(&self.draw_routes);
        self.world.draw(g);
        self.panel.draw(g);
    }

    fn recreate(&mut self, ctx: &mut EventCtx, app: &mut App) -> Box<dyn State<App>> {
        Self::new_state(ctx, app)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum Obj {
    Stop(StopID),
    // Indexed by position in the current list of clusters
    Cluster(usize),
}
impl ObjectID for Obj {}
