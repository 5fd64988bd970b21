//! Sample grids pairing spatial axes with their Fourier conjugates.
//!
//! Every array in this crate sits on a pair of 1D coordinate axes produced
//! here. Axes are uniformly spaced and centered so that the DC / on-axis
//! sample lives at index `n / 2`.

use crate::error::Error;

/// Produce a spatial axis of `samples` points spanning `extent`, symmetric
/// about zero.
///
/// The spacing is `extent / (samples - 1)`. A single-sample axis collapses
/// to `[0.0]`.
pub fn linear_axis(extent: f64, samples: usize) -> Result<Vec<f64>, Error> {
    if samples == 0 || extent <= 0.0 {
        return Err(Error::InvalidSampling { samples, extent });
    }

    if samples == 1 {
        return Ok(vec![0.0]);
    }

    let spacing = extent / (samples - 1) as f64;
    Ok((0..samples)
        .map(|k| k as f64 * spacing - extent / 2.0)
        .collect())
}

/// Produce the frequency axis conjugate to a spatial axis of `samples`
/// points with the given `spacing`.
///
/// Follows the unwrapped discrete-Fourier convention: spacing
/// `1 / (samples * spacing)`, zero frequency at index `samples / 2`.
pub fn frequency_axis(samples: usize, spacing: f64) -> Result<Vec<f64>, Error> {
    if samples == 0 || spacing <= 0.0 {
        return Err(Error::InvalidSampling {
            samples,
            extent: spacing * samples as f64,
        });
    }

    let df = 1.0 / (samples as f64 * spacing);
    let center = (samples / 2) as f64;
    Ok((0..samples).map(|k| (k as f64 - center) * df).collect())
}

/// Produce the frequency axis conjugate to `axis`, deriving the sample
/// spacing from its first two elements.
pub fn conjugate_axis(axis: &[f64]) -> Result<Vec<f64>, Error> {
    if axis.len() < 2 {
        return Err(Error::InvalidSampling {
            samples: axis.len(),
            extent: 0.0,
        });
    }

    frequency_axis(axis.len(), axis[1] - axis[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use quickcheck::quickcheck;
    use rstest::rstest;

    quickcheck! {
        fn frequency_axis_is_centered(samples: u8, spacing: u8) -> bool {
            let samples = samples as usize + 1;
            let spacing = spacing as f64 / 255.0 + 1e-3;
            let axis = frequency_axis(samples, spacing).unwrap();
            axis.len() == samples && axis[samples / 2] == 0.0
        }
    }

    #[rstest]
    #[case(0, 1.0)]
    #[case(16, 0.0)]
    #[case(16, -1.0)]
    fn invalid_linear_axis(#[case] samples: usize, #[case] extent: f64) {
        assert!(matches!(
            linear_axis(extent, samples),
            Err(Error::InvalidSampling { .. })
        ));
    }

    #[test]
    fn linear_axis_spans_extent() {
        let axis = linear_axis(0.127, 128).unwrap();
        assert_eq!(axis.len(), 128);
        assert_relative_eq!(axis[1] - axis[0], 1e-3, max_relative = 1e-12);
        assert_relative_eq!(axis[0], -0.0635, max_relative = 1e-12);
        assert_relative_eq!(axis[127], 0.0635, max_relative = 1e-12);
    }

    #[test]
    fn conjugate_spacing_is_reciprocal_span() {
        let axis = linear_axis(0.127, 128).unwrap();
        let freq = conjugate_axis(&axis).unwrap();
        // df = 1 / (n * dx)
        assert_relative_eq!(freq[1] - freq[0], 1.0 / (128.0 * 1e-3), max_relative = 1e-12);
        assert_eq!(freq[64], 0.0);
    }

    #[test]
    fn single_sample_axis_is_origin() {
        assert_eq!(linear_axis(1.0, 1).unwrap(), vec![0.0]);
    }
}
