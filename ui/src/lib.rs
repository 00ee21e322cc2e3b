#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod components;
mod viewer;

use abstutil::Timer;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use structopt::StructOpt;
use widgetry::{Canvas, Color, EventCtx, GfxCtx, Settings, SharedAppState};

use overlay::OverlayConfig;
use transit::{LatLon, Network, StopID};

#[derive(StructOpt)]
struct Args {
    /// The path to a GTFS directory or .zip file
    #[structopt(long)]
    gtfs: Option<String>,
    /// The path to a JSON file overriding the overlay settings
    #[structopt(long)]
    config: Option<String>,
    /// The number of a stop to select at startup
    #[structopt(long)]
    stop: Option<String>,
}

impl Args {
    // TODO These args only make sense on native, because they read files
    fn load(&self, timer: &mut Timer) -> Result<(Network, OverlayConfig)> {
        let config = match self.config {
            Some(ref path) => abstio::maybe_read_json::<OverlayConfig>(path.clone(), timer)?,
            None => OverlayConfig::default(),
        };
        let network = match self.gtfs {
            Some(ref path) => Network::load(path, timer)?,
            None => Network::empty(),
        };
        if self.stop.is_some() && network.stops.is_empty() {
            bail!("--stop needs --gtfs");
        }
        Ok((network, config))
    }
}

fn run(settings: Settings) {
    abstutil::logger::setup();

    let args = Args::from_iter(abstutil::cli_args());

    widgetry::run(settings, move |ctx| {
        let (network, config) = ctx.loading_screen("load transit network", |_, timer| {
            args.load(timer).unwrap()
        });

        let mut app = App::new(ctx, network, config);
        if let Some(ref number) = args.stop {
            app.selected = app.network.find_stop_by_number(number);
            if app.selected.is_none() {
                warn!("No stop numbered {number}");
            }
        }

        // This only makes sense on native, with the same network used across different runs.
        if let Ok(savestate) = abstio::maybe_read_json::<Savestate>(
            "data/save.json".to_string(),
            &mut Timer::throwaway(),
        ) {
            ctx.canvas.cam_x = savestate.cam_x;
            ctx.canvas.cam_y = savestate.cam_y;
            ctx.canvas.cam_zoom = savestate.cam_zoom;
            if app.selected.is_none() {
                app.selected = savestate.selected;
            }
        }

        let states = vec![crate::viewer::Viewer::new_state(ctx, &app)];
        (app, states)
    });
}

pub fn main() {
    let settings = Settings::new("Bus Stops");
    run(settings);
}

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn run_wasm() {
    run(Settings::new("Bus Stops").root_dom_element_id("loading".to_string()));
}

pub struct App {
    network: Network,
    config: OverlayConfig,

    /// Routes through this stop are drawn
    selected: Option<StopID>,
    /// Where the user is. There's no GPS on desktop, so this is set by hand.
    location: Option<LatLon>,
}

impl SharedAppState for App {
    fn draw_default(&self, g: &mut GfxCtx) {
        if cfg!(not(target_arch = "wasm32")) {
            g.clear(Color::BLACK);
        }
    }

    fn before_quit(&self, canvas: &Canvas) {
        let ss = Savestate {
            cam_x: canvas.cam_x,
            cam_y: canvas.cam_y,
            cam_zoom: canvas.cam_zoom,
            selected: self.selected,
        };
        abstio::write_json("data/save.json".to_string(), &ss);
    }
}

pub type Transition = widgetry::Transition<App>;

impl App {
    pub fn new(ctx: &mut EventCtx, network: Network, config: OverlayConfig) -> Self {
        // The bounds are meaningless without any stops
        if !network.stops.is_empty() {
            let bounds = network.gps_bounds.to_bounds();
            ctx.canvas.map_dims = (bounds.max_x, bounds.max_y);
            ctx.canvas.center_on_map_pt(bounds.center());
        }

        Self {
            network,
            config,
            selected: None,
            location: None,
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct Savestate {
    cam_x: f64,
    cam_y: f64,
    cam_zoom: f64,
    selected: Option<StopID>,
}
