//! Frame and log-line builders shared by the decoder tests.

use byteorder::{BigEndian, ByteOrder};

use super::constants::*;
use super::crc;

/// Raw register values for a telemetry frame; every block carries the same
/// set so block contents are easy to predict.
#[derive(Debug, Clone)]
pub struct TelemetryFields {
    pub uscount: u64,
    pub sipm_temperature: [u16; 4],
    pub adc_temperature: [u16; 4],
    pub voltage: [u16; 4],
    pub current: [u16; 4],
}

impl Default for TelemetryFields {
    fn default() -> Self {
        TelemetryFields {
            uscount: 48_100_000,
            sipm_temperature: [400, 408, 416, 424],
            adc_temperature: [384, 392, 400, 404],
            voltage: [3500, 3520, 3540, 3560],
            current: [310, 320, 330, 340],
        }
    }
}

fn write_hit(
    frame: &mut [u8],
    channel_at: usize,
    uscount_at: usize,
    amplitude_at: usize,
    hit: (u8, u64, u16),
) {
    frame[channel_at] = hit.0;
    BigEndian::write_u64(&mut frame[uscount_at..uscount_at + 8], hit.1);
    BigEndian::write_u16(&mut frame[amplitude_at..amplitude_at + 2], hit.2);
}

/// Build a valid event frame for either hardware generation. Hits beyond the
/// ones given are padded with channel 0, timestamp 0 and amplitude 0.
pub fn event_frame(new_programme: bool, hits: &[(u8, u64, u16)]) -> Vec<u8> {
    let length = if new_programme {
        EVENT_FRAME_LEN_NEW
    } else {
        EVENT_FRAME_LEN_LEGACY
    };
    let mut frame = vec![0u8; length];
    frame[..3].copy_from_slice(&EVENT_MAGIC);

    let mut padded = [(0u8, 0u64, 0u16); HITS_PER_EVENT];
    for (slot, hit) in padded.iter_mut().zip(hits.iter()) {
        *slot = *hit;
    }
    write_hit(
        &mut frame,
        EVENT_FIRST_HIT_CHANNEL,
        EVENT_FIRST_HIT_USCOUNT,
        EVENT_FIRST_HIT_AMPLITUDE,
        padded[0],
    );
    for (index, hit) in padded.iter().enumerate().skip(1) {
        let base = EVENT_PACKED_HITS_BASE + (index - 1) * EVENT_PACKED_HIT_STRIDE;
        write_hit(&mut frame, base, base + 1, base + 9, *hit);
    }

    if new_programme {
        BigEndian::write_u32(
            &mut frame[EVENT_EFFECTIVE_OFFSET..EVENT_EFFECTIVE_OFFSET + 4],
            77,
        );
        BigEndian::write_u32(&mut frame[EVENT_MISSING_OFFSET..EVENT_MISSING_OFFSET + 4], 3);
        frame[EVENT_SENTINEL_OFFSET_NEW..EVENT_SENTINEL_OFFSET_NEW + 3]
            .copy_from_slice(&EVENT_SENTINEL);
        let checksum = crc::checksum(&frame[..EVENT_CRC_END_NEW]);
        BigEndian::write_u16(&mut frame[EVENT_CRC_OFFSET_NEW..], checksum);
    } else {
        frame[EVENT_SENTINEL_OFFSET_LEGACY..EVENT_SENTINEL_OFFSET_LEGACY + 3]
            .copy_from_slice(&EVENT_SENTINEL);
        let checksum = crc::checksum(&frame[..EVENT_CRC_END_LEGACY]);
        BigEndian::write_u16(&mut frame[EVENT_CRC_OFFSET_LEGACY..], checksum);
    }
    frame
}

fn write_block(frame: &mut [u8], base: usize, fields: &TelemetryFields) {
    BigEndian::write_u64(&mut frame[base..base + 8], fields.uscount);
    for channel in 0..NUM_CHANNELS {
        let lane = 2 * channel;
        let sipm = base + TELEMETRY_SIPM_TEMP_OFFSET + lane;
        BigEndian::write_u16(&mut frame[sipm..sipm + 2], fields.sipm_temperature[channel]);
        let adc = base + TELEMETRY_ADC_TEMP_OFFSET + lane;
        BigEndian::write_u16(&mut frame[adc..adc + 2], fields.adc_temperature[channel]);
        let voltage = base + TELEMETRY_VOLTAGE_OFFSET + lane;
        BigEndian::write_u16(&mut frame[voltage..voltage + 2], fields.voltage[channel]);
        let current = base + TELEMETRY_CURRENT_OFFSET + lane;
        BigEndian::write_u16(&mut frame[current..current + 2], fields.current[channel]);
    }
}

/// Build a valid newProgramme telemetry frame with seven identical blocks.
pub fn telemetry_frame_new(fields: &TelemetryFields) -> Vec<u8> {
    let mut frame = vec![0u8; TELEMETRY_FRAME_LEN_NEW];
    frame[..3].copy_from_slice(&TELEMETRY_MAGIC_NEW);
    for block in 0..BLOCKS_PER_TELEMETRY {
        write_block(
            &mut frame,
            TELEMETRY_BLOCKS_BASE + block * TELEMETRY_BLOCK_STRIDE,
            fields,
        );
    }
    frame[TELEMETRY_SENTINEL_OFFSET..TELEMETRY_SENTINEL_OFFSET + 3]
        .copy_from_slice(&TELEMETRY_SENTINEL_NEW);
    let checksum = crc::checksum(&frame[..TELEMETRY_CRC_END_NEW]);
    BigEndian::write_u16(&mut frame[TELEMETRY_CRC_OFFSET..TELEMETRY_CRC_OFFSET + 2], checksum);
    frame
}

/// Build a legacy event/telemetry pair whose halves reconcile: the event
/// carries the telemetry's true CRC piece at [496, 498) and the telemetry
/// mirrors the event's identity segment, with its declared CRC on the wire
/// where the piece belongs.
pub fn legacy_split_pair(hits: &[(u8, u64, u16)], fields: &TelemetryFields) -> (Vec<u8>, Vec<u8>) {
    let mut event = event_frame(false, hits);
    let piece = [0x5A, 0xA5];
    event[SPLIT_CRC_OFFSET..SPLIT_IDENTITY_OFFSET].copy_from_slice(&piece);
    let checksum = crc::checksum(&event[..EVENT_CRC_END_LEGACY]);
    BigEndian::write_u16(&mut event[EVENT_CRC_OFFSET_LEGACY..], checksum);

    let mut telemetry = vec![0u8; TELEMETRY_FRAME_LEN_LEGACY];
    telemetry[..3].copy_from_slice(&TELEMETRY_MAGIC_LEGACY);
    for block in 0..BLOCKS_PER_TELEMETRY {
        write_block(
            &mut telemetry,
            TELEMETRY_BLOCKS_BASE + block * TELEMETRY_BLOCK_STRIDE,
            fields,
        );
    }
    telemetry[TELEMETRY_SENTINEL_OFFSET..TELEMETRY_SENTINEL_OFFSET + 3]
        .copy_from_slice(&TELEMETRY_SENTINEL_LEGACY);
    telemetry[SPLIT_CRC_OFFSET..SPLIT_IDENTITY_OFFSET].copy_from_slice(&piece);
    telemetry[SPLIT_IDENTITY_OFFSET..SPLIT_SEGMENT_END]
        .copy_from_slice(&event[SPLIT_IDENTITY_OFFSET..SPLIT_SEGMENT_END]);

    // Declared CRC covers the frame with the true piece in place; on the
    // wire the declared value then takes the piece's spot.
    let declared = crc::checksum(&telemetry[..TELEMETRY_CRC_END_LEGACY]);
    BigEndian::write_u16(
        &mut telemetry[SPLIT_CRC_OFFSET..SPLIT_IDENTITY_OFFSET],
        declared,
    );

    (event, telemetry)
}

/// Render frames as one decimal log line with `pad` trailing zero tokens.
pub fn decimal_line(frames: &[&[u8]], pad: usize) -> String {
    let mut tokens: Vec<String> = Vec::new();
    for frame in frames {
        tokens.extend(frame.iter().map(|byte| byte.to_string()));
    }
    tokens.extend(std::iter::repeat(String::from("0")).take(pad));
    tokens.join(" ")
}

/// Render frames as one hexprint log line, each frame padded out to its
/// fixed 512-token slot.
pub fn hex_line(frames: &[&[u8]]) -> String {
    let mut tokens: Vec<String> = Vec::new();
    for frame in frames {
        tokens.extend(frame.iter().map(|byte| format!("{:02X}", byte)));
        tokens.extend(std::iter::repeat(String::from("00")).take(HEX_SLOT_LEN - frame.len()));
    }
    tokens.join(" ")
}
