//! Decoded output series and their charge-injection run structure.
//!
//! Every sample series is a [`RunSeries`]: one flat arena of values plus the
//! spans that carve it into charge-injection runs. Logs without run markers
//! use a single implicit run, so downstream code can treat both shapes the
//! same way. [`DecodedStream`] bundles all series produced by one log.

use super::config::CiMode;
use super::constants::NUM_CHANNELS;
use super::frame::{EventPayload, TelemetryBlock};
use super::log_file::ScanPoint;

/// A sample series segmented into charge-injection runs.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSeries<T> {
    values: Vec<T>,
    /// Per-run `(start, len)` into `values`, contiguous and in order.
    spans: Vec<(usize, usize)>,
    /// Inclusive 0-based run selection; `None` keeps every run.
    window: Option<(usize, usize)>,
}

impl<T> Default for RunSeries<T> {
    fn default() -> Self {
        RunSeries {
            values: Vec::new(),
            spans: Vec::new(),
            window: None,
        }
    }
}

impl<T> RunSeries<T> {
    /// Open a new run bucket. Subsequent pushes land in it.
    pub fn begin_run(&mut self) {
        self.spans.push((self.values.len(), 0));
    }

    /// Append to the current run. Samples arriving before any run has been
    /// opened are dropped.
    pub fn push(&mut self, value: T) {
        if let Some(span) = self.spans.last_mut() {
            span.1 += 1;
            self.values.push(value);
        }
    }

    /// Number of runs after windowing.
    pub fn n_runs(&self) -> usize {
        match self.window {
            Some((first, last)) => last - first + 1,
            None => self.spans.len(),
        }
    }

    /// Samples of one run, indexed relative to the window.
    pub fn run(&self, index: usize) -> &[T] {
        let actual = match self.window {
            Some((first, _)) => first + index,
            None => index,
        };
        let (start, len) = self.spans[actual];
        &self.values[start..start + len]
    }

    /// All retained samples as one contiguous slice.
    pub fn flat(&self) -> &[T] {
        match self.window {
            Some((first, last)) => {
                let start = self.spans[first].0;
                let end = self.spans[last].0 + self.spans[last].1;
                &self.values[start..end]
            }
            None => &self.values,
        }
    }

    pub fn len(&self) -> usize {
        self.flat().len()
    }

    pub fn is_empty(&self) -> bool {
        self.flat().is_empty()
    }

    /// The whole arena regardless of windowing, in decode order.
    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [T] {
        &mut self.values
    }

    /// Keep only the arena positions where `mask` is true, preserving run
    /// structure. The mask covers the whole arena.
    pub fn apply_mask(&mut self, mask: &[bool])
    where
        T: Clone,
    {
        let mut values = Vec::with_capacity(self.values.len());
        let mut spans = Vec::with_capacity(self.spans.len());
        for (start, len) in self.spans.iter().copied() {
            let new_start = values.len();
            for offset in 0..len {
                if mask[start + offset] {
                    values.push(self.values[start + offset].clone());
                }
            }
            spans.push((new_start, values.len() - new_start));
        }
        self.values = values;
        self.spans = spans;
    }

    /// Restrict the series to the inclusive 0-based run range.
    pub fn retain_runs(&mut self, first: usize, last: usize) {
        self.window = Some((first, last));
    }
}

/// One [`RunSeries`] per detector channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSeries<T> {
    pub channels: [RunSeries<T>; NUM_CHANNELS],
}

impl<T> Default for ChannelSeries<T> {
    fn default() -> Self {
        ChannelSeries {
            channels: std::array::from_fn(|_| RunSeries::default()),
        }
    }
}

impl<T> ChannelSeries<T> {
    pub fn begin_run(&mut self) {
        for series in self.channels.iter_mut() {
            series.begin_run();
        }
    }

    pub fn retain_runs(&mut self, first: usize, last: usize) {
        for series in self.channels.iter_mut() {
            series.retain_runs(first, last);
        }
    }
}

/// Event-derived series collected while charge injection is active.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CiRecord {
    pub amplitude: ChannelSeries<u16>,
    pub event_uscount: ChannelSeries<f64>,
    pub effective_count: RunSeries<u32>,
    pub missing_count: RunSeries<u32>,
}

/// I-V scan samples. These are flat, not run-segmented.
#[derive(Debug, Clone, PartialEq)]
pub struct IvScanRecord {
    pub v_set: Vec<u32>,
    pub voltage: [Vec<f64>; NUM_CHANNELS],
    pub current: [Vec<f64>; NUM_CHANNELS],
}

impl Default for IvScanRecord {
    fn default() -> Self {
        IvScanRecord {
            v_set: Vec::new(),
            voltage: std::array::from_fn(|_| Vec::new()),
            current: std::array::from_fn(|_| Vec::new()),
        }
    }
}

/// Which optional records a decoded stream carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Plain,
    WithCi,
    WithScan,
    WithCiAndScan,
}

/// Everything decoded from one downlink log.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedStream {
    /// Event hit amplitudes per channel, outside charge injection.
    pub amplitude: ChannelSeries<u16>,
    /// Event hit timestamps per channel in seconds, outside charge injection.
    pub event_uscount: ChannelSeries<f64>,
    /// Telemetry block timestamps in seconds.
    pub uscount: RunSeries<f64>,
    pub sipm_temperature: ChannelSeries<f64>,
    pub adc_temperature: ChannelSeries<f64>,
    pub voltage: ChannelSeries<f64>,
    pub current: ChannelSeries<f64>,
    pub bias: ChannelSeries<f64>,
    /// Reconstructed live-time deltas in seconds.
    pub live_time: RunSeries<f64>,
    /// Triggers reaching the readout, newProgramme logs only.
    pub effective_count: RunSeries<u32>,
    /// Triggers lost to dead time, newProgramme logs only.
    pub missing_count: RunSeries<u32>,
    pub ci: Option<CiRecord>,
    pub iv_scan: Option<IvScanRecord>,
    pub crc_errors: u64,
    pub index_out_of_bound: u64,
}

impl DecodedStream {
    pub fn new(ci_mode: CiMode, iv_scan: bool) -> Self {
        DecodedStream {
            amplitude: ChannelSeries::default(),
            event_uscount: ChannelSeries::default(),
            uscount: RunSeries::default(),
            sipm_temperature: ChannelSeries::default(),
            adc_temperature: ChannelSeries::default(),
            voltage: ChannelSeries::default(),
            current: ChannelSeries::default(),
            bias: ChannelSeries::default(),
            live_time: RunSeries::default(),
            effective_count: RunSeries::default(),
            missing_count: RunSeries::default(),
            ci: (ci_mode != CiMode::None).then(CiRecord::default),
            iv_scan: iv_scan.then(IvScanRecord::default),
            crc_errors: 0,
            index_out_of_bound: 0,
        }
    }

    pub fn capability(&self) -> Capability {
        match (self.ci.is_some(), self.iv_scan.is_some()) {
            (false, false) => Capability::Plain,
            (true, false) => Capability::WithCi,
            (false, true) => Capability::WithScan,
            (true, true) => Capability::WithCiAndScan,
        }
    }

    /// Open a new run bucket in every run-segmented series.
    pub fn begin_run(&mut self) {
        self.amplitude.begin_run();
        self.event_uscount.begin_run();
        self.uscount.begin_run();
        self.sipm_temperature.begin_run();
        self.adc_temperature.begin_run();
        self.voltage.begin_run();
        self.current.begin_run();
        self.bias.begin_run();
        self.live_time.begin_run();
        self.effective_count.begin_run();
        self.missing_count.begin_run();
        if let Some(ci) = self.ci.as_mut() {
            ci.amplitude.begin_run();
            ci.event_uscount.begin_run();
            ci.effective_count.begin_run();
            ci.missing_count.begin_run();
        }
    }

    /// Demultiplex one event payload into the per-channel series. Hits with
    /// a channel id outside [1, 4] only bump the out-of-bound counter;
    /// newProgramme ids are 0-based on the wire and shifted up first.
    pub fn record_event(&mut self, payload: &EventPayload, ci_active: bool, new_programme: bool) {
        for hit in &payload.hits {
            let channel = if new_programme {
                hit.channel as usize + 1
            } else {
                hit.channel as usize
            };
            if !(1..=NUM_CHANNELS).contains(&channel) {
                self.index_out_of_bound += 1;
                continue;
            }
            let index = channel - 1;
            if ci_active {
                if let Some(ci) = self.ci.as_mut() {
                    ci.amplitude.channels[index].push(hit.amplitude);
                    ci.event_uscount.channels[index].push(hit.uscount);
                }
            } else {
                self.amplitude.channels[index].push(hit.amplitude);
                self.event_uscount.channels[index].push(hit.uscount);
            }
        }

        if let (Some(effective), Some(missing)) = (payload.effective, payload.missing) {
            if ci_active {
                if let Some(ci) = self.ci.as_mut() {
                    ci.effective_count.push(effective);
                    ci.missing_count.push(missing);
                }
            } else {
                self.effective_count.push(effective);
                self.missing_count.push(missing);
            }
        }
    }

    /// Append the housekeeping blocks of one telemetry frame. Telemetry is
    /// never routed through the charge-injection record.
    pub fn record_telemetry(&mut self, blocks: &[TelemetryBlock]) {
        for block in blocks {
            self.uscount.push(block.uscount);
            for channel in 0..NUM_CHANNELS {
                self.sipm_temperature.channels[channel].push(block.sipm_temperature[channel]);
                self.adc_temperature.channels[channel].push(block.adc_temperature[channel]);
                self.voltage.channels[channel].push(block.voltage[channel]);
                self.current.channels[channel].push(block.current[channel]);
                self.bias.channels[channel].push(block.bias[channel]);
            }
        }
    }

    pub fn record_scan_point(&mut self, point: &ScanPoint) {
        if let Some(scan) = self.iv_scan.as_mut() {
            scan.v_set.push(point.v_set);
            for channel in 0..NUM_CHANNELS {
                scan.voltage[channel].push(point.voltage[channel]);
                scan.current[channel].push(point.current[channel]);
            }
        }
    }

    /// The monitor ADC sees half the actual current, corrected here in one
    /// pass once decoding is done. Bias values are left as extracted.
    pub fn halve_current(&mut self) {
        for series in self.current.channels.iter_mut() {
            for value in series.values_mut() {
                *value /= 2.0;
            }
        }
    }

    /// Drop samples with timestamps at or below `cut` seconds. Telemetry
    /// rows are masked by the block timestamp, event samples per channel by
    /// their own timestamps. Charge-injection and live-time series are
    /// never cut.
    pub fn apply_time_cut(&mut self, cut: f64) {
        let telemetry_mask: Vec<bool> = self
            .uscount
            .values()
            .iter()
            .map(|timestamp| *timestamp > cut)
            .collect();
        self.uscount.apply_mask(&telemetry_mask);
        for channel in 0..NUM_CHANNELS {
            self.sipm_temperature.channels[channel].apply_mask(&telemetry_mask);
            self.adc_temperature.channels[channel].apply_mask(&telemetry_mask);
            self.voltage.channels[channel].apply_mask(&telemetry_mask);
            self.current.channels[channel].apply_mask(&telemetry_mask);
            self.bias.channels[channel].apply_mask(&telemetry_mask);
        }

        for channel in 0..NUM_CHANNELS {
            let event_mask: Vec<bool> = self.event_uscount.channels[channel]
                .values()
                .iter()
                .map(|timestamp| *timestamp > cut)
                .collect();
            self.event_uscount.channels[channel].apply_mask(&event_mask);
            self.amplitude.channels[channel].apply_mask(&event_mask);
        }
    }

    /// Restrict every run-segmented series to the inclusive 0-based window.
    pub fn apply_run_window(&mut self, first: usize, last: usize) {
        self.amplitude.retain_runs(first, last);
        self.event_uscount.retain_runs(first, last);
        self.uscount.retain_runs(first, last);
        self.sipm_temperature.retain_runs(first, last);
        self.adc_temperature.retain_runs(first, last);
        self.voltage.retain_runs(first, last);
        self.current.retain_runs(first, last);
        self.bias.retain_runs(first, last);
        self.live_time.retain_runs(first, last);
        self.effective_count.retain_runs(first, last);
        self.missing_count.retain_runs(first, last);
        if let Some(ci) = self.ci.as_mut() {
            ci.amplitude.retain_runs(first, last);
            ci.event_uscount.retain_runs(first, last);
            ci.effective_count.retain_runs(first, last);
            ci.missing_count.retain_runs(first, last);
        }
    }
}

/// Tracks charge-injection state and run boundaries while a log is scanned.
#[derive(Debug)]
pub struct RunSegmenter {
    ci_active: bool,
    runs_seen: u32,
}

impl RunSegmenter {
    /// Logs without begin/end markers get one implicit run opened here; in
    /// multi-run mode nothing is open until the first begin marker.
    pub fn new(mode: CiMode, stream: &mut DecodedStream) -> Self {
        let mut runs_seen = 0;
        if mode != CiMode::Multi {
            stream.begin_run();
            runs_seen = 1;
        }
        RunSegmenter {
            ci_active: mode != CiMode::None,
            runs_seen,
        }
    }

    /// Honor a begin marker. Returns the 1-based number of the new run.
    pub fn begin_run(&mut self, stream: &mut DecodedStream) -> u32 {
        self.ci_active = true;
        self.runs_seen += 1;
        stream.begin_run();
        self.runs_seen
    }

    pub fn end_run(&mut self) {
        self.ci_active = false;
    }

    pub fn ci_active(&self) -> bool {
        self.ci_active
    }

    pub fn runs_seen(&self) -> u32 {
        self.runs_seen
    }
}
