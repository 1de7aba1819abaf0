use nandsim::*;

mod repl;
use repl::*;

use clap::Parser;
use log::*;

use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The chip to load, by name or as a path to its .hdl file.
    chip: String,

    /// Where the user's .hdl files live. Defaults to the chip file's directory.
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Compile the chip, report errors and exit.
    #[arg(long, default_value_t = false)]
    check: bool,

    #[arg(short, long, default_value_t = false)]
    debug: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    let (dir, name) = chip_location(&args);
    let mut workspace = Workspace::from_dir(&dir)?;
    debug!("Workspace {} has {} chips", dir.display(), workspace.chip_names().len());

    let mut simulator = HardwareSimulator::new();
    if let Err(error) = simulator.load_gate(&name, &mut workspace) {
        eprintln!("{error}");
        std::process::exit(1);
    }

    if args.check {
        println!("{name}: OK");
        return Ok(());
    }

    let mut repl = Repl::new(simulator, workspace)?;
    repl.run()
}

/// Splits the chip argument into the workspace directory and the chip name.
fn chip_location(args: &Args) -> (PathBuf, String) {
    let path = Path::new(&args.chip);
    let is_path = path.extension().map_or(false, |ext| ext == "hdl") || path.parent().map_or(false, |p| !p.as_os_str().is_empty());
    if !is_path {
        let dir = args.dir.clone().unwrap_or_else(|| PathBuf::from("."));
        return (dir, args.chip.clone());
    }

    let name = path.file_stem().map(|stem| stem.to_string_lossy().to_string()).unwrap_or_default();
    let dir = args.dir.clone().unwrap_or_else(|| match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_owned(),
        _ => PathBuf::from("."),
    });
    (dir, name)
}

fn init_logging(args: &Args) -> anyhow::Result<()> {
    use chrono::{DateTime, Utc};

    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            let now: DateTime<Utc> = Utc::now();
            out.finish(format_args!(
                "[{} {} {}] {}",
                now.format("%Y-%m-%dT%H:%M:%S%.3fZ"),
                record.level(),
                record.target(),
                message
            ))
        })
        .chain(std::io::stderr());

    let level = std::env::var("LEVEL").unwrap_or_default();

    if args.debug || level == "DEBUG" {
        dispatch = dispatch.level(log::LevelFilter::Debug);
    } else if level == "TRACE" {
        dispatch = dispatch.level(log::LevelFilter::Trace);
    } else if args.check {
        dispatch = dispatch.level(log::LevelFilter::Warn);
    } else {
        dispatch = dispatch.level(log::LevelFilter::Info);
    }

    dispatch.apply()?;
    Ok(())
}
