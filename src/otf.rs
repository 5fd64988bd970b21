//! Optical and modulation transfer functions.
//!
//! The OTF is the normalized Fourier transform of a PSF; the MTF is its
//! magnitude. An [`Mtf`] is either backed by a sampled grid (interpolated on
//! query) or by the analytic circular-aperture model (evaluated exactly),
//! and every query dispatches through the same interface.

use crate::airy::AiryDisk;
use crate::error::Error;
use crate::fft::fft2c;
use crate::grid::frequency_axis;
use crate::psf::Psf;
use crate::pupil::Pupil;
use crate::query::{self, Azimuths, Samples, broadcast_pair};
use ndarray::Array2;
use num_complex::Complex64;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use uom::si::f64::Length;

/// Conjugate frequency axes (cycles/mm) for a PSF sampled in µm.
fn psf_frequency_axes(psf: &Psf) -> Result<(Vec<f64>, Vec<f64>), Error> {
    if psf.x().len() < 2 || psf.y().len() < 2 {
        return Err(Error::InvalidSampling {
            samples: psf.x().len().min(psf.y().len()),
            extent: 0.0,
        });
    }

    let dx_mm = (psf.x()[1] - psf.x()[0]) / 1e3;
    let dy_mm = (psf.y()[1] - psf.y()[0]) / 1e3;
    Ok((
        frequency_axis(psf.x().len(), dx_mm)?,
        frequency_axis(psf.y().len(), dy_mm)?,
    ))
}

/// Complex optical transfer function on frequency axes in cycles/mm.
///
/// Normalized so the zero-frequency element is exactly `1 + 0i`; before
/// normalization that element carries the PSF's total energy.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Otf {
    data: Array2<Complex64>,
    x: Vec<f64>,
    y: Vec<f64>,
}

impl Otf {
    /// Transform a PSF into its OTF.
    ///
    /// Fails with [`Error::DivideByZero`] if the PSF carries no energy, in
    /// which case no normalization exists.
    pub fn from_psf(psf: &Psf) -> Result<Self, Error> {
        let (x, y) = psf_frequency_axes(psf)?;

        let complex = psf.data().mapv(|v| Complex64::new(v, 0.0));
        let mut transform = fft2c(&complex);

        let dc = transform[[psf.y().len() / 2, psf.x().len() / 2]];
        if dc.norm() == 0.0 {
            return Err(Error::DivideByZero);
        }
        transform.mapv_inplace(|v| v / dc);

        Ok(Self {
            data: transform,
            x,
            y,
        })
    }

    /// Propagate a pupil incoherently and transform the result.
    pub fn from_pupil(pupil: &Pupil, efl: Length) -> Result<Self, Error> {
        Self::from_psf(&Psf::from_pupil(pupil, efl)?)
    }

    pub fn data(&self) -> &Array2<Complex64> {
        &self.data
    }

    /// Frequency samples along the x axis, in cycles/mm.
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// Frequency samples along the y axis, in cycles/mm.
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// The scalar magnitude view of this OTF.
    pub fn mtf(&self) -> Mtf {
        Mtf {
            repr: Repr::Sampled {
                data: self.data.mapv(|v| v.norm()),
                x: self.x.clone(),
                y: self.y.clone(),
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
enum Repr {
    Sampled {
        data: Array2<f64>,
        x: Vec<f64>,
        y: Vec<f64>,
    },
    Analytic(AiryDisk),
}

/// Modulation transfer function: real, non-negative, 1 at zero frequency.
///
/// Sampled variants interpolate their grid bilinearly and refuse queries
/// outside it; the analytic variant evaluates the circular-aperture closed
/// form exactly and has no grid bound.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Mtf {
    repr: Repr,
}

impl Mtf {
    /// Create an MTF from sampled magnitude data on frequency axes
    /// (cycles/mm).
    pub fn new(data: Array2<f64>, x: Vec<f64>, y: Vec<f64>) -> Result<Self, Error> {
        let (rows, cols) = data.dim();
        if rows == 0 || cols == 0 {
            return Err(Error::InvalidSampling {
                samples: rows.min(cols),
                extent: 0.0,
            });
        }
        if rows != y.len() || cols != x.len() {
            return Err(Error::GridMismatch(format!(
                "mtf array is {rows}x{cols} but axes are {}x{}",
                y.len(),
                x.len()
            )));
        }

        Ok(Self {
            repr: Repr::Sampled { data, x, y },
        })
    }

    /// Transform a PSF and keep the magnitude.
    pub fn from_psf(psf: &Psf) -> Result<Self, Error> {
        Ok(Otf::from_psf(psf)?.mtf())
    }

    /// Propagate a pupil incoherently, transform, and keep the magnitude.
    pub fn from_pupil(pupil: &Pupil, efl: Length) -> Result<Self, Error> {
        Ok(Otf::from_pupil(pupil, efl)?.mtf())
    }

    /// The diffraction-limited MTF of an ideal circular aperture, backed by
    /// the closed form rather than samples.
    pub fn diffraction_limited(disk: AiryDisk) -> Self {
        Self {
            repr: Repr::Analytic(disk),
        }
    }

    /// The sampled grid behind this MTF, if any.
    pub fn sampled(&self) -> Option<(&Array2<f64>, &[f64], &[f64])> {
        match &self.repr {
            Repr::Sampled { data, x, y } => Some((data, x, y)),
            Repr::Analytic(_) => None,
        }
    }

    /// Evaluate at one exact Cartesian frequency (cycles/mm).
    pub fn sample_at(&self, x: f64, y: f64) -> Result<f64, Error> {
        match &self.repr {
            Repr::Sampled { data, x: fx, y: fy } => query::bilinear(data, fx, fy, x, y),
            Repr::Analytic(disk) => Ok(disk.mtf(x.hypot(y))),
        }
    }

    /// Evaluate at exact Cartesian frequency coordinates.
    ///
    /// Either argument may be a scalar broadcast against the other, a
    /// sequence, or [`Samples::Default`] (0 on that axis). Sequences must
    /// have equal lengths.
    pub fn exact_xy(&self, x: Samples<'_>, y: Samples<'_>) -> Result<Vec<f64>, Error> {
        let (xs, ys) = broadcast_pair(x, y, 0.0)?;
        xs.iter()
            .zip(&ys)
            .map(|(&xq, &yq)| self.sample_at(xq, yq))
            .collect()
    }

    /// Evaluate at exact polar frequency coordinates.
    ///
    /// Azimuths broadcast against the radii; [`Azimuths::Default`] samples
    /// along the grid's primary axis.
    pub fn exact_polar(&self, freqs: &[f64], azimuths: Azimuths<'_>) -> Result<Vec<f64>, Error> {
        let azimuths = azimuths.materialize(freqs.len())?;
        freqs
            .iter()
            .zip(&azimuths)
            .map(|(&f, &az)| self.sample_at(f * az.cos(), f * az.sin()))
            .collect()
    }

    /// Tangential cut: along the x frequency axis.
    pub fn exact_tan(&self, freqs: &[f64]) -> Result<Vec<f64>, Error> {
        self.exact_xy(Samples::Sequence(freqs), Samples::Default)
    }

    /// Sagittal cut: along the y frequency axis.
    pub fn exact_sag(&self, freqs: &[f64]) -> Result<Vec<f64>, Error> {
        self.exact_xy(Samples::Default, Samples::Sequence(freqs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::linear_axis;
    use approx::assert_relative_eq;
    use uom::si::length::micrometer;

    fn gaussian_psf(samples: usize) -> Psf {
        let axis = linear_axis(100.0, samples).unwrap();
        let data = Array2::from_shape_fn((samples, samples), |(i, j)| {
            let r2 = axis[j] * axis[j] + axis[i] * axis[i];
            (-r2 / 50.0).exp()
        });
        Psf::new(data, axis.clone(), axis).unwrap()
    }

    #[test]
    fn zero_frequency_response_is_unity() {
        let mtf = Mtf::from_psf(&gaussian_psf(64)).unwrap();
        let dc = mtf.sample_at(0.0, 0.0).unwrap();
        assert_relative_eq!(dc, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn scaling_the_psf_does_not_change_the_mtf() {
        let psf = gaussian_psf(32);
        let scaled = Psf::new(psf.data() * 17.0, psf.x().to_vec(), psf.y().to_vec()).unwrap();

        let a = Mtf::from_psf(&psf).unwrap();
        let b = Mtf::from_psf(&scaled).unwrap();
        let (da, ..) = a.sampled().unwrap();
        let (db, ..) = b.sampled().unwrap();
        for (u, v) in da.iter().zip(db.iter()) {
            assert_relative_eq!(u, v, epsilon = 1e-9);
        }
    }

    #[test]
    fn empty_mtf_grid_is_rejected() {
        assert!(matches!(
            Mtf::new(Array2::zeros((0, 0)), vec![], vec![]),
            Err(Error::InvalidSampling { .. })
        ));
    }

    #[test]
    fn empty_psf_has_no_transfer_function() {
        let axis = linear_axis(10.0, 8).unwrap();
        let psf = Psf::new(Array2::zeros((8, 8)), axis.clone(), axis).unwrap();
        assert!(matches!(Mtf::from_psf(&psf), Err(Error::DivideByZero)));
    }

    #[test]
    fn analytic_queries_match_the_closed_form() {
        let disk = AiryDisk::new(8.0, Length::new::<micrometer>(0.6328));
        let mtf = Mtf::diffraction_limited(disk);

        for freq in [0.0, 10.0, 50.0, disk.cutoff(), disk.cutoff() * 3.0] {
            assert_eq!(mtf.sample_at(freq, 0.0).unwrap(), disk.mtf(freq));
        }
    }

    #[test]
    fn sampled_queries_respect_the_grid_extent() {
        let mtf = Mtf::from_psf(&gaussian_psf(32)).unwrap();
        let (_, x, _) = mtf.sampled().unwrap();
        let beyond = x[x.len() - 1] * 2.0;
        assert!(matches!(
            mtf.sample_at(beyond, 0.0),
            Err(Error::OutOfBounds { .. })
        ));
    }
}
