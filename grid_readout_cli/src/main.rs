//! # grid_readout_cli
//!
//! Part of the grid_readout crate family.
//!
//! This is the command line application to decode GRID downlink logs.
//!
//! ## Install
//!
//! Use `cargo install grid_readout_cli`
//!
//! ## Use
//!
//! Make a template configuration with
//!
//! ```bash
//! grid_readout_cli new --path my_config.yml
//! ```
//!
//! Fill out the configuration fields and then decode the logs it names with
//!
//! ```bash
//! grid_readout_cli --path my_config.yml
//! ```
//!
//! Status and any decode errors are written to `./grid_readout.log`.

use clap::{Arg, Command};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use libgrid_readout::config::Config;
use libgrid_readout::process::process;

fn make_template_config(path: &Path) {
    let config = Config::default();
    let yaml_str = serde_yaml::to_string(&config).unwrap();
    let mut file = File::create(path).expect("Could create template config file!");
    file.write_all(yaml_str.as_bytes())
        .expect("Failed to write yaml data to file!");
}

fn main() {
    // Create a cli
    let matches = Command::new("grid_readout_cli")
        .arg_required_else_help(true)
        .subcommand(Command::new("new").about("Make a template configuration yaml file"))
        .arg(
            Arg::new("path")
                .short('p')
                .long("path")
                .help("Path to the file"),
        )
        .get_matches();

    // Setup logging to a file
    let file_sink = Arc::new(
        spdlog::sink::FileSink::builder()
            .path(PathBuf::from("./grid_readout.log"))
            .formatter(Box::new(spdlog::formatter::PatternFormatter::new(
                spdlog::formatter::pattern!(
                    "[{date_short} {time_short}] - [thread: {tid}] - [{^{level}}] - {payload}{eol}"
                ),
            )))
            .truncate(true)
            .build()
            .unwrap(),
    );
    let logger = Arc::new(
        spdlog::Logger::builder()
            .flush_level_filter(spdlog::LevelFilter::All)
            .sink(file_sink)
            .build()
            .unwrap(),
    );
    spdlog::set_default_logger(logger);

    // Parse the cli
    let config_path = PathBuf::from(matches.get_one::<String>("path").expect("We require args"));

    if let Some(("new", _)) = matches.subcommand() {
        spdlog::info!(
            "Making a template config at {}...",
            config_path.to_string_lossy()
        );
        make_template_config(&config_path);
        spdlog::info!("Done.");
        return;
    }

    // Load our config
    spdlog::info!("Loading config from {}...", config_path.to_string_lossy());
    let config = match Config::read_config_file(&config_path) {
        Ok(c) => c,
        Err(e) => {
            spdlog::error!("{e}");
            return;
        }
    };
    spdlog::info!("Config successfully loaded.");
    spdlog::info!("Log files: {}", config.log_files.len());
    spdlog::info!("Hex input: {}", config.options.hex_input);
    spdlog::info!("CI mode: {:?}", config.options.ci_mode);
    spdlog::info!("I-V scan: {}", config.options.iv_scan);
    match config.options.run_range {
        Some((first, last)) => spdlog::info!("First Run: {} Last Run: {}", first, last),
        None => spdlog::info!("Keeping all runs"),
    }
    spdlog::info!("Rate style: {:?}", config.options.rate_style);
    spdlog::info!("NewProgramme firmware: {}", config.options.new_programme);
    spdlog::info!("Time cut: {}", config.options.time_cut);

    match process(&config) {
        Ok(streams) => spdlog::info!("Successfully decoded {} log file(s)!", streams.len()),
        Err(e) => spdlog::error!("Decoding failed with error: {e}"),
    }

    spdlog::info!("Done.");
}
