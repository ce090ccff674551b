//! Downlink log files and the line-level syntax inside them.
//!
//! A log is plain text. Most lines are long runs of space-separated byte
//! tokens holding the binary downlink stream; interspersed are marker lines
//! (charge-injection begin/end) and I-V scan point lines. Which of those are
//! honored depends on the decode options.

use std::path::{Path, PathBuf};

use super::config::{CiMode, DecodeOptions};
use super::constants::{MIN_FRAME_TOKENS, NUM_CHANNELS};
use super::error::LogFileError;
use super::units;

/// An entire downlink log held in memory.
#[derive(Debug, Clone)]
pub struct LogFile {
    pub path: PathBuf,
    contents: String,
    size_bytes: u64,
}

impl LogFile {
    /// Read a log file into memory
    /// Returns a LogFile if successful
    pub fn open(path: &Path) -> Result<Self, LogFileError> {
        if !path.exists() {
            return Err(LogFileError::BadFilePath(path.to_path_buf()));
        }

        let contents = std::fs::read_to_string(path)?;

        Ok(LogFile {
            path: path.to_path_buf(),
            size_bytes: contents.len() as u64,
            contents,
        })
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn lines(&self) -> std::str::Lines<'_> {
        self.contents.lines()
    }
}

/// What a single log line means under the active options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    /// An I-V scan sample line.
    ScanPoint,
    /// Start of a charge-injection run.
    BeginRun,
    /// End of a charge-injection run.
    EndRun,
    /// A candidate byte-token line.
    Tokens,
}

/// Classify a line. Marker matching is by substring, and scan points take
/// precedence over markers, which take precedence over token data.
pub fn classify(line: &str, options: &DecodeOptions) -> LineClass {
    if options.iv_scan && line.contains("Point") {
        return LineClass::ScanPoint;
    }
    if options.ci_mode == CiMode::Multi && line.contains("Begin") {
        return LineClass::BeginRun;
    }
    if line.contains("End") {
        return LineClass::EndRun;
    }
    LineClass::Tokens
}

/// Byte tokens recovered from one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenLine {
    pub bytes: Vec<u8>,
    /// A malformed token cut the line short; `bytes` holds the prefix.
    pub truncated: bool,
}

/// Tokenize a line of space-separated byte values, decimal or hex. Lines
/// with too few tokens to hold a frame are skipped entirely; a bad token
/// truncates the line at the first failure.
pub fn tokenize(line: &str, hex: bool) -> Option<TokenLine> {
    let count = line.split(' ').count();
    if count <= MIN_FRAME_TOKENS {
        return None;
    }

    let mut bytes = Vec::with_capacity(count);
    let mut truncated = false;
    for token in line.split(' ') {
        let parsed = if hex {
            u8::from_str_radix(token, 16)
        } else {
            token.parse::<u8>()
        };
        match parsed {
            Ok(value) => bytes.push(value),
            Err(_) => {
                truncated = true;
                break;
            }
        }
    }
    Some(TokenLine { bytes, truncated })
}

/// One I-V scan sample: the set voltage and the monitor readback per channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanPoint {
    pub v_set: u32,
    pub voltage: [f64; NUM_CHANNELS],
    pub current: [f64; NUM_CHANNELS],
}

/// Parse an I-V scan point line. The comma-separated line carries the set
/// voltage in its fourth field and eight raw samples, voltage and current
/// interleaved per channel, in its fifth. Malformed lines yield `None`.
pub fn parse_scan_point(line: &str) -> Option<ScanPoint> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() < 5 {
        return None;
    }
    let v_set = fields[3].trim().parse::<u32>().ok()?;

    let raws: Vec<&str> = fields[4].split_whitespace().collect();
    if raws.len() < 2 * NUM_CHANNELS {
        return None;
    }
    let mut voltage = [0.0; NUM_CHANNELS];
    let mut current = [0.0; NUM_CHANNELS];
    for channel in 0..NUM_CHANNELS {
        voltage[channel] = units::scan_voltage(raws[2 * channel].parse::<f64>().ok()?);
        current[channel] = units::scan_current(raws[2 * channel + 1].parse::<f64>().ok()?);
    }

    Some(ScanPoint {
        v_set,
        voltage,
        current,
    })
}
