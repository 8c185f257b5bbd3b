mod app;
mod camera;
mod catalog;
mod config;
mod controls;
mod displacement;
mod error;
mod geometry;
mod gpu;
mod input;
mod loading;
mod scene;
mod state;
mod ui;

#[cfg(test)]
mod tests;

use std::path::PathBuf;

use catalog::CATALOG;
use config::ViewerConfig;
use controls::DEFAULT_DISPLACEMENT;
use error::{Result, ViewerError};

/// What the command line asked for
#[derive(Debug, Clone, PartialEq)]
enum Command {
    Run,
    List,
    Inspect(usize),
    Help,
}

#[derive(Debug, Clone, PartialEq)]
struct Options {
    command: Command,
    assets: Option<PathBuf>,
    select: Option<usize>,
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_usage();
            std::process::exit(2);
        }
    };

    let mut config = ViewerConfig::default().with_env();
    if let Some(assets) = options.assets {
        config.asset_root = assets;
    }
    if let Some(index) = options.select {
        config.initial_selection = index;
    }

    let result = match options.command {
        Command::Run => app::run(config),
        Command::List => {
            run_list(&config);
            Ok(())
        }
        Command::Inspect(index) => run_inspect(&config, index),
        Command::Help => {
            print_usage();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn parse_args(args: &[String]) -> Result<Options> {
    let mut options = Options {
        command: Command::Run,
        assets: None,
        select: None,
    };

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--assets" => {
                let dir = iter
                    .next()
                    .ok_or_else(|| ViewerError::InvalidArgument("--assets needs a directory".into()))?;
                options.assets = Some(PathBuf::from(dir));
            }
            "--select" => {
                let index = parse_index(iter.next(), "--select")?;
                catalog::entry(index)?;
                options.select = Some(index);
            }
            "--inspect" => {
                let index = parse_index(iter.next(), "--inspect")?;
                catalog::entry(index)?;
                options.command = Command::Inspect(index);
            }
            "--list" => options.command = Command::List,
            "--help" | "-h" => options.command = Command::Help,
            other => {
                return Err(ViewerError::InvalidArgument(format!("unknown argument '{}'", other)));
            }
        }
    }

    Ok(options)
}

fn parse_index(value: Option<&String>, flag: &str) -> Result<usize> {
    let value = value.ok_or_else(|| ViewerError::InvalidArgument(format!("{} needs an index", flag)))?;
    value
        .parse()
        .map_err(|_| ViewerError::InvalidArgument(format!("{} expects an index, got '{}'", flag, value)))
}

fn print_usage() {
    println!("Phantom Viewer");
    println!();
    println!("Usage: phantom_viewer [options]");
    println!("  --assets <dir>   Asset directory (default ./public, or ${})", config::ASSETS_ENV);
    println!("  --select <i>     Start with catalog entry i");
    println!("  --list           Print the catalog and check its files");
    println!("  --inspect <i>    Load entry i and print displacement statistics");
    println!("  --help           Show this text");
}

fn run_list(config: &ViewerConfig) {
    let root = &config.asset_root;
    println!("Catalog ({} entries, root {}):", CATALOG.len(), root.display());
    for (index, entry) in CATALOG.iter().enumerate() {
        let mark = |path: PathBuf| if path.is_file() { "ok" } else { "missing" };
        println!(
            "  {}  {:<15} {:<14} [{}]  {:<18} [{}]",
            index,
            entry.name,
            entry.image_path,
            mark(entry.image_file(root)),
            entry.depth_path,
            mark(entry.depth_file(root)),
        );
    }
}

fn run_inspect(config: &ViewerConfig, index: usize) -> Result<()> {
    use std::time::Instant;

    let entry = catalog::entry(index)?;
    println!("=== {} ===", entry.name);

    let start = Instant::now();
    let pair = loading::load_pair_blocking(&config.asset_root, index)?;
    let load_ms = start.elapsed().as_secs_f64() * 1000.0;

    let plane = geometry::PlaneGeometry::standard();
    let start = Instant::now();
    let stats = displacement::displacement_stats(&plane, &pair.depth, DEFAULT_DISPLACEMENT);
    let stats_ms = start.elapsed().as_secs_f64() * 1000.0;

    println!("  Color:  {}x{}", pair.color.width, pair.color.height);
    println!("  Depth:  {}x{}", pair.depth.width, pair.depth.height);
    println!(
        "  Depth samples: min {:.3}  max {:.3}  mean {:.3}",
        stats.depth_min, stats.depth_max, stats.depth_mean
    );
    println!(
        "  Displaced z at {:.1}: {:.3} .. {:.3}",
        DEFAULT_DISPLACEMENT, stats.z_min, stats.z_max
    );
    println!("  Vertices: {}", plane.vertices.len());
    println!("  Load: {:.1} ms, displacement: {:.1} ms", load_ms, stats_ms);

    Ok(())
}
