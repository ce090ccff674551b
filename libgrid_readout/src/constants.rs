//! Frame geometry and hardware constants for the GRID downlink format.
//!
//! All byte offsets are frame-relative. The legacy layouts describe the
//! pre-6th-revision firmware; the newProgramme layouts describe the 6th
//! revision with its extended event frame and self-contained CRCs.

/// Number of detector channels.
pub const NUM_CHANNELS: usize = 4;
/// Hits carried by one event frame: the leading hit plus 43 packed follow-ups.
pub const HITS_PER_EVENT: usize = 44;
/// Housekeeping blocks packed into one telemetry frame.
pub const BLOCKS_PER_TELEMETRY: usize = 7;

/// Magic prefix of an event frame (both hardware versions).
pub const EVENT_MAGIC: [u8; 3] = [0xAA, 0xBB, 0xCC];
/// Trailing sentinel of an event frame (both hardware versions).
pub const EVENT_SENTINEL: [u8; 3] = [0xDD, 0xEE, 0xFF];
/// Magic prefix of a legacy telemetry frame.
pub const TELEMETRY_MAGIC_LEGACY: [u8; 3] = [0x01, 0x23, 0x45];
/// Trailing sentinel of a legacy telemetry frame.
pub const TELEMETRY_SENTINEL_LEGACY: [u8; 3] = [0x67, 0x89, 0x10];
/// Magic prefix of a newProgramme telemetry frame.
pub const TELEMETRY_MAGIC_NEW: [u8; 3] = [0x12, 0x34, 0x56];
/// Trailing sentinel of a newProgramme telemetry frame.
pub const TELEMETRY_SENTINEL_NEW: [u8; 3] = [0x78, 0x9A, 0xBC];

pub const EVENT_FRAME_LEN_LEGACY: usize = 504;
pub const EVENT_FRAME_LEN_NEW: usize = 512;
pub const TELEMETRY_FRAME_LEN_LEGACY: usize = 510;
pub const TELEMETRY_FRAME_LEN_NEW: usize = 498;

pub const EVENT_SENTINEL_OFFSET_LEGACY: usize = 499;
pub const EVENT_SENTINEL_OFFSET_NEW: usize = 507;
/// Telemetry sentinel offset, shared by both hardware versions.
pub const TELEMETRY_SENTINEL_OFFSET: usize = 493;

/// Legacy event CRC covers bytes [0, 502), declared big-endian at [502, 504).
pub const EVENT_CRC_END_LEGACY: usize = 502;
pub const EVENT_CRC_OFFSET_LEGACY: usize = 502;
/// NewProgramme event CRC covers bytes [0, 510), declared at [510, 512).
pub const EVENT_CRC_END_NEW: usize = 510;
pub const EVENT_CRC_OFFSET_NEW: usize = 510;
/// Legacy telemetry CRC covers the whole frame [0, 510); the true bytes at
/// [496, 498) travel in the counterpart frame while the wire carries the
/// declared CRC there instead.
pub const TELEMETRY_CRC_END_LEGACY: usize = 510;
/// NewProgramme telemetry CRC covers bytes [0, 496), declared at [496, 498).
pub const TELEMETRY_CRC_END_NEW: usize = 496;
/// Declared telemetry CRC offset, shared by both hardware versions.
pub const TELEMETRY_CRC_OFFSET: usize = 496;

/// Start of the split-CRC region of a legacy frame.
pub const SPLIT_CRC_OFFSET: usize = 496;
/// Start of the 6-byte pairing identity shared by legacy counterpart frames.
pub const SPLIT_IDENTITY_OFFSET: usize = 498;
/// End of the trailing segment buffered for reconciliation.
pub const SPLIT_SEGMENT_END: usize = 504;

/// Channel id of the leading hit.
pub const EVENT_FIRST_HIT_CHANNEL: usize = 3;
/// Big-endian u64 uscount of the leading hit.
pub const EVENT_FIRST_HIT_USCOUNT: usize = 4;
/// Big-endian u16 amplitude of the leading hit.
pub const EVENT_FIRST_HIT_AMPLITUDE: usize = 12;
/// First packed hit record; each is 11 bytes: channel, uscount, amplitude.
pub const EVENT_PACKED_HITS_BASE: usize = 26;
pub const EVENT_PACKED_HIT_STRIDE: usize = 11;
/// Big-endian u32 effective-count trailer (newProgramme only).
pub const EVENT_EFFECTIVE_OFFSET: usize = 499;
/// Big-endian u32 missing-count trailer (newProgramme only).
pub const EVENT_MISSING_OFFSET: usize = 503;

/// First telemetry block; each block occupies a 70-byte stride.
pub const TELEMETRY_BLOCKS_BASE: usize = 15;
pub const TELEMETRY_BLOCK_STRIDE: usize = 70;
/// Per-channel big-endian u16 fields within a block, 2 bytes per channel.
pub const TELEMETRY_SIPM_TEMP_OFFSET: usize = 8;
pub const TELEMETRY_ADC_TEMP_OFFSET: usize = 16;
pub const TELEMETRY_VOLTAGE_OFFSET: usize = 24;
pub const TELEMETRY_CURRENT_OFFSET: usize = 32;

/// Lines with this many tokens or fewer are never frame-scanned.
pub const MIN_FRAME_TOKENS: usize = 502;
/// Hexprint captures lay frames out in fixed slots of this many bytes.
pub const HEX_SLOT_LEN: usize = 512;

/// Capacity of each reconciliation FIFO (tail segments and parked frames).
pub const RECONCILE_BUFFER_CAPACITY: usize = 500;

/// Detector clock rate used to convert uscount values to seconds.
pub const CLOCK_RATE_HZ: f64 = 24.05e6;
/// Full scale of the housekeeping ADC.
pub const ADC_FULL_SCALE: f64 = 4096.0;
/// ADC reference voltage in volts.
pub const ADC_REFERENCE_VOLTS: f64 = 3.3;
/// Divider ratio of the bias voltage monitor.
pub const VOLTAGE_DIVIDER_RATIO: f64 = 11.0;
/// Gain of the I-V scan current readout.
pub const SCAN_CURRENT_SCALE: f64 = 2.0;
/// Raw temperature readings above this wrap negative.
pub const TEMPERATURE_SIGN_THRESHOLD: u16 = 2048;
/// Span of the signed 12-bit temperature field.
pub const TEMPERATURE_WRAP: f64 = 4096.0;
/// Temperature LSBs per degree Celsius.
pub const TEMPERATURE_LSB_PER_DEGREE: f64 = 16.0;

/// Live-time entries farther than this many standard deviations from the
/// mean are discarded by the post-filter.
pub const LIVE_TIME_SIGMA_CUT: f64 = 20.0;
