//! Live-time reconstruction from event hit timestamps.

use ndarray::aview1;

use super::config::RateStyle;
use super::constants::LIVE_TIME_SIGMA_CUT;
use super::frame::EventHit;

/// Live-time deltas contributed by one event frame. All hits count here,
/// whether or not their channel id is in range.
pub fn frame_deltas(style: RateStyle, hits: &[EventHit]) -> Vec<f64> {
    match style {
        RateStyle::None => Vec::new(),
        RateStyle::SinglePacket => hits
            .windows(2)
            .map(|pair| pair[1].uscount - pair[0].uscount)
            .collect(),
        RateStyle::Packed => match (hits.first(), hits.last()) {
            (Some(first), Some(last)) if hits.len() > 1 => vec![last.uscount - first.uscount],
            _ => Vec::new(),
        },
    }
}

/// Keep positive deltas within 20 standard deviations of the mean. The
/// statistics run over the whole series at once.
pub fn outlier_mask(values: &[f64]) -> Vec<bool> {
    if values.is_empty() {
        return Vec::new();
    }
    let view = aview1(values);
    let mean = view.mean().unwrap_or(0.0);
    let std = view.std(0.0);
    values
        .iter()
        .map(|value| *value > 0.0 && (*value - mean).abs() <= LIVE_TIME_SIGMA_CUT * std)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hits(timestamps: &[f64]) -> Vec<EventHit> {
        timestamps
            .iter()
            .map(|uscount| EventHit {
                channel: 1,
                uscount: *uscount,
                amplitude: 0,
            })
            .collect()
    }

    #[test]
    fn test_single_packet_deltas() {
        let deltas = frame_deltas(RateStyle::SinglePacket, &hits(&[1.0, 1.5, 2.5, 4.0]));
        assert_eq!(deltas, vec![0.5, 1.0, 1.5]);
    }

    #[test]
    fn test_packed_delta() {
        let deltas = frame_deltas(RateStyle::Packed, &hits(&[1.0, 1.5, 2.5, 4.0]));
        assert_eq!(deltas, vec![3.0]);
    }

    #[test]
    fn test_no_rate_style() {
        assert!(frame_deltas(RateStyle::None, &hits(&[1.0, 2.0])).is_empty());
        assert!(frame_deltas(RateStyle::Packed, &hits(&[1.0])).is_empty());
    }

    #[test]
    fn test_outlier_mask() {
        let mut values = vec![0.002; 500];
        values.push(-0.001);
        values.push(50.0);

        let mask = outlier_mask(&values);
        assert_eq!(mask.len(), values.len());
        assert_eq!(mask.iter().filter(|keep| **keep).count(), 500);
        // Negative deltas and the wild outlier both fall out.
        assert!(!mask[500]);
        assert!(!mask[501]);
    }

    #[test]
    fn test_outlier_mask_empty() {
        assert!(outlier_mask(&[]).is_empty());
    }
}
