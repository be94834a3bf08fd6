//! Fowcast - Visibility inspector
//!
//! Loads a map, runs one visibility update from the given (or starting)
//! position and prints every floor's fog grid as text.

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use fowcast::data::{load_map_descriptor, DataManager};
use fowcast::game::{
    vision_radius_or_default, FixedRadius, VisionEngine, VisionRadiusProvider, Weather,
};
use fowcast::world::{Observer, Position, Visibility};

const USAGE: &str = "usage: fowcast <map.json|map.ron> [x y floor] [radius|weather]";

/// Where the vision radius comes from
enum Sight {
    Fixed(FixedRadius),
    Weather(Weather),
}

impl Sight {
    fn provider(&self) -> &dyn VisionRadiusProvider {
        match self {
            Sight::Fixed(radius) => radius,
            Sight::Weather(weather) => weather,
        }
    }

    fn label(&self) -> String {
        match self {
            Sight::Fixed(radius) => format!("radius {}", radius.0),
            Sight::Weather(weather) => format!("weather {}", weather.name()),
        }
    }
}

/// Parsed command line
struct Args {
    map: PathBuf,
    observer: Option<Observer>,
    sight: Option<Sight>,
}

fn parse_number(value: &str, what: &str) -> Result<i32> {
    value
        .parse()
        .with_context(|| format!("invalid {}: '{}'", what, value))
}

/// A number is a fixed radius; anything else must name the weather
fn parse_sight(value: &str) -> Result<Sight> {
    if let Ok(radius) = value.parse() {
        return Ok(Sight::Fixed(FixedRadius(radius)));
    }
    value
        .parse()
        .map(Sight::Weather)
        .map_err(anyhow::Error::msg)
        .with_context(|| format!("expected a radius or one of {:?}", Weather::ALL))
}

fn parse_args() -> Result<Args> {
    let args: Vec<String> = env::args().skip(1).collect();
    let observer = |x: &str, y: &str, floor: &str| -> Result<Observer> {
        Ok(Observer::new(
            parse_number(x, "x")?,
            parse_number(y, "y")?,
            parse_number(floor, "floor")?,
        ))
    };

    match args.as_slice() {
        [map] => Ok(Args {
            map: map.into(),
            observer: None,
            sight: None,
        }),
        [map, radius] => Ok(Args {
            map: map.into(),
            observer: None,
            sight: Some(parse_sight(radius)?),
        }),
        [map, x, y, floor] => Ok(Args {
            map: map.into(),
            observer: Some(observer(x, y, floor)?),
            sight: None,
        }),
        [map, x, y, floor, radius] => Ok(Args {
            map: map.into(),
            observer: Some(observer(x, y, floor)?),
            sight: Some(parse_sight(radius)?),
        }),
        _ => bail!(USAGE),
    }
}

/// One character per cell: `@` observer, `#` visible blocker, `.` visible
fn render_floor(engine: &VisionEngine, floor: i32, observer: Observer) -> String {
    let levels = engine.levels();
    let mut out = String::with_capacity(((levels.width() + 1) * levels.height()) as usize);

    for y in 0..levels.height() {
        for x in 0..levels.width() {
            let glyph = if floor == observer.floor && observer.position() == Position::new(x, y) {
                '@'
            } else {
                match engine.visibility(floor, x, y) {
                    Some(Visibility::Visible) if engine.is_cell_blocking_vision(floor, x, y) => '#',
                    Some(Visibility::Visible) => '.',
                    _ => ' ',
                }
            };
            out.push(glyph);
        }
        out.push('\n');
    }
    out
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting fowcast v{}", env!("CARGO_PKG_VERSION"));

    let args = parse_args()?;
    let data = DataManager::new();
    let descriptor = load_map_descriptor(&args.map)
        .with_context(|| format!("failed to load map {:?}", args.map))?;

    let mut engine = VisionEngine::new(data.classifier());
    engine.load_map(&descriptor);

    let observer = args
        .observer
        .or_else(|| engine.levels().start())
        .context("map has no start position; pass x y floor")?;

    let radius = vision_radius_or_default(args.sight.as_ref().map(Sight::provider));
    engine.update_for(observer, radius);

    let source = args
        .sight
        .as_ref()
        .map_or_else(|| "default radius".to_string(), Sight::label);
    println!(
        "{} from ({}, {}, {}), {} -> {}",
        descriptor.display_name(),
        observer.x,
        observer.y,
        observer.floor,
        source,
        radius
    );
    for floor in engine.fog().floors() {
        let visible = engine
            .fog()
            .grid(floor)
            .map_or(0, |grid| grid.visible_count());
        println!("\nfloor {} ({} visible)", floor, visible);
        print!("{}", render_floor(&engine, floor, observer));
    }

    log::info!("fowcast finished");
    Ok(())
}
