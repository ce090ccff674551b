//! The frame scanner: drives whole log files through line classification,
//! frame recognition, CRC validation and demultiplexing.
//!
//! Token lines are walked byte by byte. Anything that does not start a
//! recognizable frame is stepped over one token at a time; a recognized
//! frame is validated, handed to the output stream and consumed whole. In
//! hexprint captures frames sit in fixed 512-byte slots, so the scanner hops
//! slot to slot instead.

use std::path::Path;

use super::config::DecodeOptions;
use super::constants::HEX_SLOT_LEN;
use super::crc::{self, CrcReconciler, ReconcileOutcome, Validation};
use super::error::{ConfigError, DecodeError};
use super::frame::{self, FrameLayout};
use super::livetime;
use super::log_file::{self, LineClass, LogFile};
use super::stream::{DecodedStream, RunSegmenter};

/// Streaming decoder for one downlink log.
pub struct Decoder {
    options: DecodeOptions,
    event_layout: FrameLayout,
    telemetry_layout: FrameLayout,
    stream: DecodedStream,
    segmenter: RunSegmenter,
    reconciler: Option<CrcReconciler>,
}

impl Decoder {
    pub fn new(options: &DecodeOptions) -> Result<Self, ConfigError> {
        options.validate()?;
        let options = options.normalized();
        let mut stream = DecodedStream::new(options.ci_mode, options.iv_scan);
        let segmenter = RunSegmenter::new(options.ci_mode, &mut stream);
        let reconciler = (!options.new_programme).then(CrcReconciler::new);
        Ok(Decoder {
            event_layout: FrameLayout::event(options.new_programme),
            telemetry_layout: FrameLayout::telemetry(options.new_programme),
            stream,
            segmenter,
            reconciler,
            options,
        })
    }

    /// Feed one log line through the decoder.
    pub fn scan_line(&mut self, line: &str) {
        let line = line.trim_end();
        match log_file::classify(line, &self.options) {
            LineClass::ScanPoint => {
                if let Some(point) = log_file::parse_scan_point(line) {
                    self.stream.record_scan_point(&point);
                }
            }
            LineClass::BeginRun => {
                let run = self.segmenter.begin_run(&mut self.stream);
                match self.options.run_range {
                    Some((first, last)) if run < first || run > last => {
                        spdlog::info!("Run #{} is outside the requested range and will be dropped", run);
                    }
                    _ => spdlog::info!("Run #{}", run),
                }
            }
            LineClass::EndRun => self.segmenter.end_run(),
            LineClass::Tokens => {
                if let Some(tokens) = log_file::tokenize(line, self.options.hex_input) {
                    if tokens.truncated {
                        self.stream.crc_errors += 1;
                    }
                    self.scan_tokens(&tokens.bytes);
                }
            }
        }
    }

    fn scan_tokens(&mut self, bytes: &[u8]) {
        let mut position = 0;
        while position < bytes.len() {
            let window = &bytes[position..];
            if self.event_layout.matches(window) {
                let length = self.event_layout.length;
                self.handle_event(&bytes[position..position + length]);
                position += self.advance(length);
            } else if self.telemetry_layout.matches(window) {
                let length = self.telemetry_layout.length;
                self.handle_telemetry(&bytes[position..position + length]);
                position += self.advance(length);
            } else {
                position += 1;
            }
        }
    }

    fn advance(&self, frame_length: usize) -> usize {
        if self.options.hex_input {
            HEX_SLOT_LEN
        } else {
            frame_length
        }
    }

    fn handle_event(&mut self, frame: &[u8]) {
        let outcome = self
            .reconciler
            .as_mut()
            .map(|reconciler| reconciler.accept_event(frame));
        let accepted = match outcome {
            Some(outcome) => self.absorb_outcome(outcome),
            None => {
                if crc::validate(frame, &self.event_layout) {
                    true
                } else {
                    self.stream.crc_errors += 1;
                    false
                }
            }
        };
        if !accepted {
            return;
        }

        let payload = frame::unpack_event(frame, self.options.new_programme);
        self.stream
            .record_event(&payload, self.segmenter.ci_active(), self.options.new_programme);
        if !self.segmenter.ci_active() {
            for delta in livetime::frame_deltas(self.options.rate_style, &payload.hits) {
                self.stream.live_time.push(delta);
            }
        }
    }

    fn handle_telemetry(&mut self, frame: &[u8]) {
        let outcome = self
            .reconciler
            .as_mut()
            .map(|reconciler| reconciler.accept_telemetry(frame));
        let accepted = match outcome {
            Some(outcome) => self.absorb_outcome(outcome),
            None => {
                if crc::validate(frame, &self.telemetry_layout) {
                    true
                } else {
                    self.stream.crc_errors += 1;
                    false
                }
            }
        };
        if !accepted {
            return;
        }

        let blocks = frame::unpack_telemetry(frame, self.options.new_programme);
        self.stream.record_telemetry(&blocks);
    }

    /// Book the side effects of one reconciler pass and report whether the
    /// newcomer frame itself may be used. A parked frame settled by this
    /// arrival is recorded or counted here; deferral is not an error.
    fn absorb_outcome(&mut self, outcome: ReconcileOutcome) -> bool {
        if outcome.evicted {
            self.stream.crc_errors += 1;
        }
        if let Some(partner) = outcome.partner {
            if partner.accepted {
                let blocks = frame::unpack_telemetry(&partner.frame, false);
                self.stream.record_telemetry(&blocks);
            } else {
                self.stream.crc_errors += 1;
            }
        }
        match outcome.own {
            Validation::Accepted => true,
            Validation::Rejected => {
                self.stream.crc_errors += 1;
                false
            }
            Validation::Deferred => false,
        }
    }

    /// Wrap up after the last line: settle the reconciler, report, then
    /// apply the post-decode corrections, filters and run selection.
    pub fn finish(mut self) -> Result<DecodedStream, DecodeError> {
        if let Some(reconciler) = self.reconciler.as_mut() {
            self.stream.crc_errors += reconciler.flush() as u64;
        }

        spdlog::info!("{} data packs with crc error", self.stream.crc_errors);
        spdlog::info!(
            "{} events with channel out of bound",
            self.stream.index_out_of_bound
        );

        self.stream.halve_current();

        let mask = livetime::outlier_mask(self.stream.live_time.values());
        self.stream.live_time.apply_mask(&mask);

        self.stream.apply_time_cut(self.options.time_cut);

        if let Some((first, last)) = self.options.run_range {
            let runs = self.segmenter.runs_seen();
            if first > runs {
                return Err(DecodeError::EmptyRunSelection(first, last, runs));
            }
            let last_kept = last.min(runs);
            self.stream
                .apply_run_window((first - 1) as usize, (last_kept - 1) as usize);
        }

        Ok(self.stream)
    }
}

/// Decode a log already split into lines, e.g. one held in memory.
pub fn decode_text(text: &str, options: &DecodeOptions) -> Result<DecodedStream, DecodeError> {
    let mut decoder = Decoder::new(options)?;
    for line in text.lines() {
        decoder.scan_line(line);
    }
    decoder.finish()
}

/// Decode an opened log file.
pub fn decode_log(file: &LogFile, options: &DecodeOptions) -> Result<DecodedStream, DecodeError> {
    let mut decoder = Decoder::new(options)?;
    for line in file.lines() {
        decoder.scan_line(line);
    }
    decoder.finish()
}

/// Open and decode the log file at `path`.
pub fn decode_file(path: &Path, options: &DecodeOptions) -> Result<DecodedStream, DecodeError> {
    let file = LogFile::open(path)?;
    decode_log(&file, options)
}
