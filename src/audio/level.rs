/// Largest absolute sample value in a block. Zero for an empty block.
pub fn peak_magnitude(samples: &[i16]) -> i32 {
    samples
        .iter()
        .map(|sample| i32::from(*sample).abs())
        .max()
        .unwrap_or(0)
}

/// Uncalibrated loudness proxy: `20 * log10(peak)`, with the peak floored at 1
/// so silence (or a defective read) maps to 0 dB instead of a NaN/-inf.
pub fn decibels(peak: i32) -> f32 {
    20.0 * (peak.max(1) as f32).log10()
}

/// Reading for one block, or `None` when the read produced no samples.
/// An empty block is a transient condition; the caller skips the tick.
pub(super) fn block_reading(samples: &[i16]) -> Option<f32> {
    if samples.is_empty() {
        return None;
    }
    Some(decibels(peak_magnitude(samples)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decibels_matches_formula_above_floor() {
        assert!((decibels(100) - 40.0).abs() < 1e-5);
        assert!((decibels(1_000) - 60.0).abs() < 1e-4);
        assert!((decibels(1) - 0.0).abs() < 1e-6);
    }

    #[test]
    fn decibels_floors_sub_unit_peaks_at_zero() {
        assert_eq!(decibels(0), 0.0);
        assert_eq!(decibels(-5), 0.0);
    }

    #[test]
    fn peak_magnitude_uses_absolute_value() {
        assert_eq!(peak_magnitude(&[10, -200, 30]), 200);
        assert_eq!(peak_magnitude(&[i16::MIN, 5]), 32_768);
        assert_eq!(peak_magnitude(&[]), 0);
    }

    #[test]
    fn block_reading_skips_empty_blocks() {
        assert_eq!(block_reading(&[]), None);
        let reading = block_reading(&[0, 100, -50]).expect("non-empty block");
        assert!((reading - 40.0).abs() < 1e-5);
    }
}
