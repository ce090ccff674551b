//! Frame layouts and payload unpacking for the two hardware versions.
//!
//! A frame is identified by a 3-byte magic prefix and a 3-byte sentinel at a
//! version-dependent offset. Everything in between is fixed-layout big-endian
//! data; no field survives a failed CRC check, so unpacking happens only after
//! validation.

use byteorder::{BigEndian, ByteOrder};

use super::constants::*;
use super::units;

/// Geometry of one frame kind: markers, total length and CRC coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    pub magic: [u8; 3],
    pub sentinel: [u8; 3],
    pub sentinel_offset: usize,
    pub length: usize,
    /// CRC input is `frame[0..crc_end]`.
    pub crc_end: usize,
    /// Declared CRC sits big-endian at `frame[crc_offset..crc_offset + 2]`.
    pub crc_offset: usize,
}

impl FrameLayout {
    pub const fn event(new_programme: bool) -> Self {
        if new_programme {
            FrameLayout {
                magic: EVENT_MAGIC,
                sentinel: EVENT_SENTINEL,
                sentinel_offset: EVENT_SENTINEL_OFFSET_NEW,
                length: EVENT_FRAME_LEN_NEW,
                crc_end: EVENT_CRC_END_NEW,
                crc_offset: EVENT_CRC_OFFSET_NEW,
            }
        } else {
            FrameLayout {
                magic: EVENT_MAGIC,
                sentinel: EVENT_SENTINEL,
                sentinel_offset: EVENT_SENTINEL_OFFSET_LEGACY,
                length: EVENT_FRAME_LEN_LEGACY,
                crc_end: EVENT_CRC_END_LEGACY,
                crc_offset: EVENT_CRC_OFFSET_LEGACY,
            }
        }
    }

    pub const fn telemetry(new_programme: bool) -> Self {
        if new_programme {
            FrameLayout {
                magic: TELEMETRY_MAGIC_NEW,
                sentinel: TELEMETRY_SENTINEL_NEW,
                sentinel_offset: TELEMETRY_SENTINEL_OFFSET,
                length: TELEMETRY_FRAME_LEN_NEW,
                crc_end: TELEMETRY_CRC_END_NEW,
                crc_offset: TELEMETRY_CRC_OFFSET,
            }
        } else {
            FrameLayout {
                magic: TELEMETRY_MAGIC_LEGACY,
                sentinel: TELEMETRY_SENTINEL_LEGACY,
                sentinel_offset: TELEMETRY_SENTINEL_OFFSET,
                length: TELEMETRY_FRAME_LEN_LEGACY,
                crc_end: TELEMETRY_CRC_END_LEGACY,
                crc_offset: TELEMETRY_CRC_OFFSET,
            }
        }
    }

    /// Check whether `window` starts a complete frame of this layout.
    pub fn matches(&self, window: &[u8]) -> bool {
        window.len() >= self.length
            && window[..self.magic.len()] == self.magic
            && window[self.sentinel_offset..self.sentinel_offset + self.sentinel.len()]
                == self.sentinel
    }

    /// Declared CRC carried inside the frame.
    pub fn declared_crc(&self, frame: &[u8]) -> u16 {
        BigEndian::read_u16(&frame[self.crc_offset..self.crc_offset + 2])
    }
}

/// A single hit record from an event frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventHit {
    pub channel: u8,
    /// Timestamp in seconds of detector time.
    pub uscount: f64,
    pub amplitude: u16,
}

/// Decoded contents of one event frame.
#[derive(Debug, Clone, PartialEq)]
pub struct EventPayload {
    /// Leading hit followed by the 43 packed hits, in wire order.
    pub hits: Vec<EventHit>,
    /// Trigger count reaching the readout, newProgramme only.
    pub effective: Option<u32>,
    /// Triggers lost to dead time, newProgramme only.
    pub missing: Option<u32>,
}

/// One housekeeping block from a telemetry frame, converted to physical units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryBlock {
    /// Timestamp in seconds of detector time.
    pub uscount: f64,
    pub sipm_temperature: [f64; NUM_CHANNELS],
    pub adc_temperature: [f64; NUM_CHANNELS],
    pub voltage: [f64; NUM_CHANNELS],
    pub current: [f64; NUM_CHANNELS],
    pub bias: [f64; NUM_CHANNELS],
}

fn hit_at(frame: &[u8], channel_at: usize, uscount_at: usize, amplitude_at: usize) -> EventHit {
    EventHit {
        channel: frame[channel_at],
        uscount: units::uscount_seconds(BigEndian::read_u64(&frame[uscount_at..uscount_at + 8])),
        amplitude: BigEndian::read_u16(&frame[amplitude_at..amplitude_at + 2]),
    }
}

/// Unpack a validated event frame. The caller guarantees that `frame` spans
/// a full frame matched against [`FrameLayout::event`].
pub fn unpack_event(frame: &[u8], new_programme: bool) -> EventPayload {
    let mut hits = Vec::with_capacity(HITS_PER_EVENT);
    hits.push(hit_at(
        frame,
        EVENT_FIRST_HIT_CHANNEL,
        EVENT_FIRST_HIT_USCOUNT,
        EVENT_FIRST_HIT_AMPLITUDE,
    ));
    for packed in 0..(HITS_PER_EVENT - 1) {
        let base = EVENT_PACKED_HITS_BASE + packed * EVENT_PACKED_HIT_STRIDE;
        hits.push(hit_at(frame, base, base + 1, base + 9));
    }

    let (effective, missing) = if new_programme {
        (
            Some(BigEndian::read_u32(
                &frame[EVENT_EFFECTIVE_OFFSET..EVENT_EFFECTIVE_OFFSET + 4],
            )),
            Some(BigEndian::read_u32(
                &frame[EVENT_MISSING_OFFSET..EVENT_MISSING_OFFSET + 4],
            )),
        )
    } else {
        (None, None)
    };

    EventPayload {
        hits,
        effective,
        missing,
    }
}

fn channel_fields(frame: &[u8], base: usize, convert: impl Fn(u16) -> f64) -> [f64; NUM_CHANNELS] {
    let mut out = [0.0; NUM_CHANNELS];
    for (channel, value) in out.iter_mut().enumerate() {
        let at = base + 2 * channel;
        *value = convert(BigEndian::read_u16(&frame[at..at + 2]));
    }
    out
}

/// Unpack a validated telemetry frame into its seven housekeeping blocks.
/// The caller guarantees that `frame` spans a full frame matched against
/// [`FrameLayout::telemetry`].
pub fn unpack_telemetry(frame: &[u8], new_programme: bool) -> Vec<TelemetryBlock> {
    let mut blocks = Vec::with_capacity(BLOCKS_PER_TELEMETRY);
    for index in 0..BLOCKS_PER_TELEMETRY {
        let base = TELEMETRY_BLOCKS_BASE + index * TELEMETRY_BLOCK_STRIDE;
        let voltage = channel_fields(frame, base + TELEMETRY_VOLTAGE_OFFSET, units::monitor_voltage);
        let current = channel_fields(frame, base + TELEMETRY_CURRENT_OFFSET, units::monitor_current);
        let mut bias = [0.0; NUM_CHANNELS];
        for channel in 0..NUM_CHANNELS {
            bias[channel] = units::bias_voltage(voltage[channel], current[channel], new_programme);
        }
        blocks.push(TelemetryBlock {
            uscount: units::uscount_seconds(BigEndian::read_u64(&frame[base..base + 8])),
            sipm_temperature: channel_fields(
                frame,
                base + TELEMETRY_SIPM_TEMP_OFFSET,
                units::temperature_celsius,
            ),
            adc_temperature: channel_fields(
                frame,
                base + TELEMETRY_ADC_TEMP_OFFSET,
                units::temperature_celsius,
            ),
            voltage,
            current,
            bias,
        });
    }
    blocks
}
