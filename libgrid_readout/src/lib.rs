//! # grid_readout
//!
//! grid_readout is the batch decoder for GRID detector downlink logs, written in Rust.
//! It takes the text logs produced by the ground station downlink in the form of decimal
//! or hexprint byte dumps, recovers the science event and telemetry frames embedded in
//! them, and exposes the decoded per-channel data series for analysis.
//!
//! ## Installation
//!
//! Currently the only method of install is from source, which is laid out below.
//!
//! ### Rust
//!
//! If you have not used Rust before, you will most likely need to install the Rust tool
//! chain. See the [Rust docs](https://www.rust-lang.org/tools/install) for installation
//! instructions.
//!
//! ### Building & Install
//!
//! To build and install the CLI decoder use `cargo install --path ./grid_readout_cli`
//! from the top level grid_readout repository.
//!
//! The binary will be installed to your cargo install location (typically something like
//! `~/.cargo/bin/`). It can be uninstalled by running `cargo uninstall grid_readout_cli`.
//! Once it is installed, it will be in your path, so you can simply invoke it from the
//! command line.
//!
//! ## Configuration
//!
//! Decoding is driven by a YAML configuration file. The format is as follows:
//!
//! ```yml
//! log_files:
//! - /data/grid/downlink_2023_08_14.txt
//! options:
//!   hex_input: false
//!   ci_mode: None
//!   iv_scan: false
//!   run_range: null
//!   rate_style: None
//!   new_programme: false
//!   time_cut: -1.0
//! ```
//!
//! - `log_files`: the downlink logs to decode, in order.
//! - `hex_input`: set when the log is a hexprint capture (frames in fixed 512-byte
//! slots) rather than a decimal byte dump. Hexprint captures carry no charge-injection
//! or I-V scan markup, so those options are ignored for them.
//! - `ci_mode`: `None`, `Single` or `Multi`. In `Multi` the log is segmented into runs
//! by `Begin`/`End` marker lines and samples taken while charge injection is active are
//! kept in their own record.
//! - `iv_scan`: decode `Point` marker lines into an I-V scan record.
//! - `run_range`: either `null` or a `[first, last]` pair of 1-based run numbers to
//! keep; runs outside the range are dropped after decoding.
//! - `rate_style`: `None`, `SinglePacket` or `Packed`; selects how live time intervals
//! are derived from event timestamps.
//! - `new_programme`: set for logs produced by the newProgramme flight software, which
//! uses longer event frames, self-contained CRCs and 0-based channel ids.
//! - `time_cut`: drop all samples with a timestamp at or below this many seconds; the
//! default of `-1.0` keeps everything.
//!
//! ## Output
//!
//! Decoding a log yields a [`stream::DecodedStream`] holding the per-channel event
//! amplitudes and timestamps, the telemetry series (SiPM and ADC temperatures, monitor
//! voltage and current, derived bias voltage), live time intervals, the newProgramme
//! trigger counters and the optional charge-injection and I-V scan records, along with
//! the counts of CRC failures and out-of-bound channel ids seen along the way.
//!
//! The CLI additionally writes a log file with the status of each decode. If an error
//! occurs, the log file will contain the detailed status of the run and indicate the
//! issue that occurred.
pub mod config;
pub mod constants;
pub mod crc;
pub mod error;
pub mod frame;
pub mod livetime;
pub mod log_file;
pub mod process;
pub mod scanner;
pub mod stream;
pub mod units;

#[cfg(test)]
pub mod testutil;
