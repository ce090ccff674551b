//! CRC-16/XMODEM validation and the legacy split-CRC reconciliation.
//!
//! NewProgramme frames carry a self-contained CRC. Legacy frames instead ship
//! the two true bytes at offsets [496, 498) of each telemetry frame inside the
//! paired counterpart frame, with the declared CRC taking their place on the
//! wire. Both counterparts share the 6 bytes at [498, 504) as a pairing
//! identity, so a telemetry frame can only be checked once a frame with the
//! same identity has been seen. [`CrcReconciler`] holds the bounded buffers
//! that bridge the gap between the two arrivals.

use std::collections::VecDeque;

use crc::{Crc, CRC_16_XMODEM};

use super::constants::*;
use super::frame::FrameLayout;

pub const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

/// CRC-16/XMODEM of `bytes`.
pub fn checksum(bytes: &[u8]) -> u16 {
    CRC16.checksum(bytes)
}

/// Check a self-contained frame against the CRC it declares.
pub fn validate(frame: &[u8], layout: &FrameLayout) -> bool {
    checksum(&frame[..layout.crc_end]) == layout.declared_crc(frame)
}

/// Verdict on one frame after it went through validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    /// The frame checked out and its payload may be used.
    Accepted,
    /// The frame failed its check and must be dropped.
    Rejected,
    /// A legacy telemetry frame parked until its counterpart arrives.
    Deferred,
}

/// Trailing segment kept for every scanned legacy frame: the CRC piece it
/// carries for its counterpart and the pairing identity.
#[derive(Debug, Clone, Copy)]
struct TailRecord {
    candidate: [u8; 2],
    identity: [u8; 6],
}

/// A telemetry frame parked until some counterpart supplies its CRC piece.
#[derive(Debug, Clone)]
struct PendingFrame {
    bytes: Vec<u8>,
    declared: u16,
}

/// A previously parked telemetry frame settled by a newly arrived frame.
#[derive(Debug, Clone)]
pub struct ResolvedPartner {
    /// The parked frame with its true CRC bytes restored.
    pub frame: Vec<u8>,
    pub accepted: bool,
}

/// Everything that happened when one legacy frame hit the reconciler.
#[derive(Debug, Clone)]
pub struct ReconcileOutcome {
    pub own: Validation,
    pub partner: Option<ResolvedPartner>,
    /// An unresolved parked frame was pushed out to make room.
    pub evicted: bool,
}

/// Bounded buffers pairing legacy frames with their split-off CRC bytes.
///
/// Tail segments of every scanned frame go into one FIFO, telemetry frames
/// waiting for their CRC piece into the other. Both are capped at
/// [`RECONCILE_BUFFER_CAPACITY`], evicting oldest-first.
pub struct CrcReconciler {
    event_layout: FrameLayout,
    telemetry_layout: FrameLayout,
    tails: VecDeque<TailRecord>,
    parked: VecDeque<PendingFrame>,
}

impl CrcReconciler {
    pub fn new() -> Self {
        CrcReconciler {
            event_layout: FrameLayout::event(false),
            telemetry_layout: FrameLayout::telemetry(false),
            tails: VecDeque::with_capacity(RECONCILE_BUFFER_CAPACITY),
            parked: VecDeque::with_capacity(RECONCILE_BUFFER_CAPACITY),
        }
    }

    fn tail_of(frame: &[u8]) -> TailRecord {
        let mut candidate = [0u8; 2];
        candidate.copy_from_slice(&frame[SPLIT_CRC_OFFSET..SPLIT_IDENTITY_OFFSET]);
        let mut identity = [0u8; 6];
        identity.copy_from_slice(&frame[SPLIT_IDENTITY_OFFSET..SPLIT_SEGMENT_END]);
        TailRecord { candidate, identity }
    }

    fn push_tail(&mut self, record: TailRecord) {
        if self.tails.len() >= RECONCILE_BUFFER_CAPACITY {
            self.tails.pop_front();
        }
        self.tails.push_back(record);
    }

    /// Settle the first parked frame sharing `identity`, patching in the CRC
    /// piece the newcomer carries. The parked frame leaves the buffer whether
    /// or not the patched bytes check out.
    fn resolve_parked(&mut self, identity: &[u8], piece: [u8; 2]) -> Option<ResolvedPartner> {
        let index = self.parked.iter().position(|pending| {
            pending.bytes[SPLIT_IDENTITY_OFFSET..SPLIT_SEGMENT_END] == *identity
        })?;
        let mut pending = self.parked.remove(index)?;
        pending.bytes[SPLIT_CRC_OFFSET..SPLIT_IDENTITY_OFFSET].copy_from_slice(&piece);
        let accepted =
            checksum(&pending.bytes[..self.telemetry_layout.crc_end]) == pending.declared;
        Some(ResolvedPartner {
            frame: pending.bytes,
            accepted,
        })
    }

    /// Run a legacy event frame through the buffers. Events validate against
    /// their own CRC; the tail segment is buffered either way and may settle
    /// a parked telemetry frame with the same identity.
    pub fn accept_event(&mut self, frame: &[u8]) -> ReconcileOutcome {
        let tail = Self::tail_of(frame);
        self.push_tail(tail);
        let partner = self.resolve_parked(
            &frame[SPLIT_IDENTITY_OFFSET..SPLIT_SEGMENT_END],
            tail.candidate,
        );
        let own = if validate(frame, &self.event_layout) {
            Validation::Accepted
        } else {
            Validation::Rejected
        };
        ReconcileOutcome {
            own,
            partner,
            evicted: false,
        }
    }

    /// Run a legacy telemetry frame through the buffers. If a buffered tail
    /// already carries its CRC piece the frame settles now, otherwise it
    /// parks until a counterpart arrives.
    pub fn accept_telemetry(&mut self, frame: &[u8]) -> ReconcileOutcome {
        let tail = Self::tail_of(frame);
        let candidate = self
            .tails
            .iter()
            .find(|buffered| buffered.identity == tail.identity)
            .map(|buffered| buffered.candidate);
        let partner = self.resolve_parked(
            &frame[SPLIT_IDENTITY_OFFSET..SPLIT_SEGMENT_END],
            tail.candidate,
        );
        self.push_tail(tail);

        let mut evicted = false;
        let own = match candidate {
            Some(piece) => {
                let mut patched = frame.to_vec();
                patched[SPLIT_CRC_OFFSET..SPLIT_IDENTITY_OFFSET].copy_from_slice(&piece);
                if checksum(&patched[..self.telemetry_layout.crc_end])
                    == self.telemetry_layout.declared_crc(frame)
                {
                    Validation::Accepted
                } else {
                    Validation::Rejected
                }
            }
            None => {
                if self.parked.len() >= RECONCILE_BUFFER_CAPACITY {
                    self.parked.pop_front();
                    evicted = true;
                }
                self.parked.push_back(PendingFrame {
                    bytes: frame.to_vec(),
                    declared: self.telemetry_layout.declared_crc(frame),
                });
                Validation::Deferred
            }
        };
        ReconcileOutcome {
            own,
            partner,
            evicted,
        }
    }

    /// Drop all buffered state and report how many parked telemetry frames
    /// never found their counterpart.
    pub fn flush(&mut self) -> usize {
        self.tails.clear();
        let unresolved = self.parked.len();
        self.parked.clear();
        unresolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{event_frame, legacy_split_pair, TelemetryFields};

    #[test]
    fn test_known_check_value() {
        assert_eq!(checksum(b"123456789"), 0x31C3);
    }

    #[test]
    fn test_validate_self_contained() {
        let frame = event_frame(false, &[(1, 1000, 20)]);
        assert!(validate(&frame, &FrameLayout::event(false)));

        let mut corrupt = frame.clone();
        corrupt[40] ^= 0x01;
        assert!(!validate(&corrupt, &FrameLayout::event(false)));

        let frame = event_frame(true, &[(1, 1000, 20)]);
        assert!(validate(&frame, &FrameLayout::event(true)));
    }

    #[test]
    fn test_reconcile_event_first() {
        let (event, telemetry) = legacy_split_pair(&[(1, 500, 30)], &TelemetryFields::default());
        let mut reconciler = CrcReconciler::new();

        let outcome = reconciler.accept_event(&event);
        assert_eq!(outcome.own, Validation::Accepted);
        assert!(outcome.partner.is_none());

        let outcome = reconciler.accept_telemetry(&telemetry);
        assert_eq!(outcome.own, Validation::Accepted);
        assert!(outcome.partner.is_none());
        assert!(!outcome.evicted);
        assert_eq!(reconciler.flush(), 0);
    }

    #[test]
    fn test_reconcile_telemetry_first() {
        let (event, telemetry) = legacy_split_pair(&[(1, 500, 30)], &TelemetryFields::default());
        let mut reconciler = CrcReconciler::new();

        let outcome = reconciler.accept_telemetry(&telemetry);
        assert_eq!(outcome.own, Validation::Deferred);
        assert!(outcome.partner.is_none());

        let outcome = reconciler.accept_event(&event);
        assert_eq!(outcome.own, Validation::Accepted);
        let partner = outcome.partner.unwrap();
        assert!(partner.accepted);
        // The parked frame comes back with the true CRC piece restored.
        assert_eq!(
            partner.frame[SPLIT_CRC_OFFSET..SPLIT_IDENTITY_OFFSET],
            event[SPLIT_CRC_OFFSET..SPLIT_IDENTITY_OFFSET]
        );
        assert_eq!(reconciler.flush(), 0);
    }

    #[test]
    fn test_reconcile_corrupt_piece() {
        let (mut event, telemetry) = legacy_split_pair(&[(1, 500, 30)], &TelemetryFields::default());
        // Corrupt the piece the event carries for its counterpart.
        event[SPLIT_CRC_OFFSET] ^= 0xFF;
        let mut reconciler = CrcReconciler::new();

        reconciler.accept_telemetry(&telemetry);
        let outcome = reconciler.accept_event(&event);
        let partner = outcome.partner.unwrap();
        assert!(!partner.accepted);
        // Settled frames leave the buffer even when rejected.
        assert_eq!(reconciler.flush(), 0);
    }

    #[test]
    fn test_flush_counts_unresolved() {
        let (_, telemetry) = legacy_split_pair(&[(1, 500, 30)], &TelemetryFields::default());
        let mut reconciler = CrcReconciler::new();
        reconciler.accept_telemetry(&telemetry);
        assert_eq!(reconciler.flush(), 1);
        assert_eq!(reconciler.flush(), 0);
    }

    #[test]
    fn test_parked_eviction() {
        let (_, telemetry) = legacy_split_pair(&[(1, 500, 30)], &TelemetryFields::default());
        let mut reconciler = CrcReconciler::new();
        for index in 0..=RECONCILE_BUFFER_CAPACITY {
            let mut frame = telemetry.clone();
            // Distinct identities so nothing pairs up.
            frame[SPLIT_IDENTITY_OFFSET] = (index % 256) as u8;
            frame[SPLIT_IDENTITY_OFFSET + 1] = (index / 256) as u8;
            let outcome = reconciler.accept_telemetry(&frame);
            assert_eq!(outcome.own, Validation::Deferred);
            assert_eq!(outcome.evicted, index == RECONCILE_BUFFER_CAPACITY);
        }
        assert_eq!(reconciler.flush(), RECONCILE_BUFFER_CAPACITY);
    }
}
