//! Westward Scout CLI - offline testing entry point
//!
//! Runs one analysis pass against a screenshot of the client window, or
//! prints the effective configuration when no screenshot is given. Live
//! analysis goes through an engine bridge embedding the library.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use westward_scout::config::Settings;
use westward_scout::engine::ScreenshotConnector;
use westward_scout::screen::Point;
use westward_scout::Scout;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Settings JSON overriding the calibrated defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Screenshot of the client window to analyze
    #[arg(short, long)]
    screenshot: Option<PathBuf>,

    /// Directory holding the banner bitmap and glyph libraries
    #[arg(short, long, default_value = "lib")]
    resources: PathBuf,

    /// Screen position of the window's top-left corner, as `x,y`
    #[arg(long, default_value = "0,0", value_parser = parse_origin)]
    origin: Point,
}

fn parse_origin(value: &str) -> Result<Point, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected x,y, got {:?}", value))?;
    let parse = |part: &str| part.trim().parse::<i32>().map_err(|e| e.to_string());
    Ok(Point::new(parse(x)?, parse(y)?))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let settings = match &args.config {
        Some(path) => Settings::from_json_file(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::default(),
    }
    .resolve_resources(&args.resources);

    let Some(screenshot) = args.screenshot else {
        println!("{}", serde_json::to_string_pretty(&settings)?);
        return Ok(());
    };

    log::info!("Analyzing {}", screenshot.display());
    let connector = ScreenshotConnector::new(screenshot).with_origin(args.origin);
    let snapshot = Scout::new(connector, settings).analyze();

    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
