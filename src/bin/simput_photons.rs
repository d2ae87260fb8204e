// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Generate the photons of every source in a catalog and write them out as
//! CSV.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
};

use clap::{AppSettings, Parser};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{debug, info};
use thiserror::Error;

use simput_photons::{
    config::{read_config_file, ConfigError},
    response::{read_arf_file, ResponseError},
    source::{read_catalog_file, SourceError},
    EngineConfig, FileLoader, PhotonEngine, SimputError, SourceCatalog,
};

// Add build-time information from the "built" crate.
include!(concat!(env!("OUT_DIR"), "/built.rs"));

#[derive(Debug, Parser)]
#[clap(
    version,
    author,
    about = "Generate photons of X-ray sources described by a SIMPUT-style catalog"
)]
#[clap(global_setting(AppSettings::DeriveDisplayOrder))]
#[clap(infer_long_args = true)]
struct Args {
    /// The source catalog (yaml or json).
    #[clap(name = "CATALOG", parse(from_os_str))]
    catalog: PathBuf,

    /// The instrument's effective area (yaml or json).
    #[clap(short, long, parse(from_os_str))]
    arf: PathBuf,

    /// The start of the simulated interval [s].
    #[clap(long, default_value = "0")]
    tstart: f64,

    /// The end of the simulated interval [s].
    #[clap(long)]
    tstop: f64,

    /// The MJD that times are relative to [d].
    #[clap(long, default_value = "0")]
    mjdref: f64,

    /// Seed for the random number generator. Overrides the seed in the config
    /// file. If neither is given, the generator is seeded from the clock.
    #[clap(long)]
    seed: Option<u64>,

    /// Engine configuration (toml, yaml or json).
    #[clap(short, long, parse(from_os_str))]
    config: Option<PathBuf>,

    /// Where to write the photons. The default is stdout.
    #[clap(short, long, parse(from_os_str))]
    output: Option<PathBuf>,

    /// Don't draw progress bars.
    #[clap(long)]
    no_progress_bars: bool,

    /// The verbosity of the program. Increase by specifying multiple times
    /// (e.g. -vv). The default is to print only high-level information.
    #[clap(short, long, parse(from_occurrences))]
    verbosity: u8,
}

#[derive(Error, Debug)]
enum CliError {
    #[error("--tstop ({tstop}) must be after --tstart ({tstart})")]
    BadTimeRange { tstart: f64, tstop: f64 },

    #[error("{0}")]
    Simput(#[from] SimputError),

    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Response(#[from] ResponseError),

    #[error("{0}")]
    Source(#[from] SourceError),

    #[error("{0}")]
    IO(#[from] std::io::Error),
}

fn main() {
    let args = Args::parse();
    setup_logging(args.verbosity).expect("Failed to initialise logging.");
    info!("simput-photons {}", env!("CARGO_PKG_VERSION"));
    display_build_info();

    if let Err(e) = run(args) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), CliError> {
    if !(args.tstop > args.tstart) {
        return Err(CliError::BadTimeRange {
            tstart: args.tstart,
            tstop: args.tstop,
        });
    }

    let mut config = match &args.config {
        Some(path) => read_config_file(path)?,
        None => EngineConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    debug!("{config:?}");

    let catalog = read_catalog_file(&args.catalog)?;
    let num_sources = catalog.len();
    info!("{num_sources} sources in {}", args.catalog.display());
    let arf = read_arf_file(&args.arf)?;
    info!(
        "ARF has {} bins from {} keV to {} keV",
        arf.len(),
        arf.e_min(),
        arf.e_max()
    );

    let mut engine =
        PhotonEngine::new(Box::new(catalog), Box::new(FileLoader::new()), config)?.with_arf(arf);

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(std::io::stdout())),
    };
    writeln!(out, "src_id,time,energy,ra,dec")?;

    let pb = ProgressBar::new(num_sources as _)
        .with_style(
            ProgressStyle::default_bar()
                .template("{msg}: [{wide_bar:.blue}] {pos}/{len} sources ({elapsed_precise}<{eta_precise})")
                .unwrap()
                .progress_chars("=> "),
        )
        .with_position(0)
        .with_message("Generating photons");
    if args.no_progress_bars {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    }

    let mut total = 0_usize;
    for row in 0..num_sources {
        let mut time = args.tstart;
        while let Some(photon) = engine.get_photon(row, time, args.mjdref)? {
            if photon.time > args.tstop {
                break;
            }
            writeln!(
                out,
                "{},{},{},{},{}",
                photon.src_id,
                photon.time,
                photon.energy,
                photon.ra.to_degrees(),
                photon.dec.to_degrees()
            )?;
            time = photon.time;
            total += 1;
        }
        pb.inc(1);
    }
    pb.finish();
    out.flush()?;

    info!("Wrote {total} photons");
    Ok(())
}

fn setup_logging(verbosity: u8) -> Result<(), log::SetLoggerError> {
    let mut builder = env_logger::Builder::from_default_env();
    // Photons may be written to stdout.
    builder.target(env_logger::Target::Stderr);
    builder.format_target(false);
    match verbosity {
        0 => builder.filter_level(log::LevelFilter::Info),
        1 => builder.filter_level(log::LevelFilter::Debug),
        2 => builder.filter_level(log::LevelFilter::Trace),
        _ => {
            builder.filter_level(log::LevelFilter::Trace);
            builder.format(|buf, record| {
                let timestamp = buf.timestamp();
                let level = record.level();
                let target = record.target();
                let line = record.line().unwrap_or(0);
                let message = record.args();

                writeln!(buf, "[{timestamp} {level} {target}:{line}] {message}")
            })
        }
    };
    builder.try_init()
}

/// Write many info-level log lines of how this executable was compiled.
fn display_build_info() {
    let dirty = match GIT_DIRTY {
        Some(true) => " (dirty)",
        _ => "",
    };
    match GIT_COMMIT_HASH_SHORT {
        Some(hash) => {
            info!("Compiled on git commit hash: {hash}{dirty}");
        }
        None => info!("Compiled on git commit hash: <no git info>"),
    }
    if let Some(hr) = GIT_HEAD_REF {
        info!("            git head ref: {}", hr);
    }
    info!("            {}", BUILT_TIME_UTC);
    info!("         with compiler {}", RUSTC_VERSION);
    info!("");
}
