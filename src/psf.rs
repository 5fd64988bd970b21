//! Point spread functions and real-space energy metrics.

use crate::airy::AiryDisk;
use crate::error::Error;
use crate::propagate::{DEFAULT_Q, focus_amplitude};
use crate::pupil::Pupil;
use crate::query;
use ndarray::Array2;
use num_complex::Complex64;
use rayon::prelude::*;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use uom::si::f64::Length;

/// Image-plane irradiance of a point source.
///
/// Axes are in micrometers, centered on the chief ray. The array shape is
/// `(y.len(), x.len())` and the data is non-negative. Instances are value
/// objects: the only mutation path is [`Psf::renorm`], which consumes the
/// instance.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Psf {
    data: Array2<f64>,
    x: Vec<f64>,
    y: Vec<f64>,
    fno: Option<f64>,
    wavelength: Option<Length>,
}

impl Psf {
    /// Create a PSF from an irradiance array and its axes (µm).
    ///
    /// Fails with [`Error::GridMismatch`] if the array shape does not match
    /// the axis lengths.
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
                "psf array is {rows}x{cols} but axes are {}x{}",
                y.len(),
                x.len()
            )));
        }

        Ok(Self {
            data,
            x,
            y,
            fno: None,
            wavelength: None,
        })
    }

    /// Propagate a pupil incoherently with the default oversampling factor.
    ///
    /// The result is the peak-normalized squared magnitude of the
    /// image-plane amplitude. The working f-number `efl / diameter` and the
    /// pupil wavelength are recorded for the diffraction-limited reference
    /// metrics.
    pub fn from_pupil(pupil: &Pupil, efl: Length) -> Result<Self, Error> {
        Self::from_pupil_with_q(pupil, efl, DEFAULT_Q)
    }

    /// Propagate a pupil incoherently, padding the transform by `q`.
    pub fn from_pupil_with_q(pupil: &Pupil, efl: Length, q: f64) -> Result<Self, Error> {
        use uom::si::ratio::ratio;

        let (field, x, y) = focus_amplitude(pupil, efl, q)?;
        let data = field.mapv(|a| a.norm_sqr());

        let psf = Self {
            data,
            x,
            y,
            fno: Some((efl / pupil.diameter()).get::<ratio>()),
            wavelength: Some(pupil.wavelength()),
        };
        Ok(psf.renorm())
    }

    /// Combine independently propagated monochromatic PSFs into a
    /// polychromatic one.
    ///
    /// Each PSF is resampled onto the grid of the first via bilinear
    /// interpolation, summed with the given per-wavelength weights (uniform
    /// when `None`), and peak-normalized. Fails with
    /// [`Error::GridMismatch`] when the weight count is wrong or a PSF's
    /// support lies entirely outside the target extent.
    pub fn polychromatic(psfs: &[Psf], weights: Option<&[f64]>) -> Result<Self, Error> {
        let first = psfs
            .first()
            .ok_or_else(|| Error::GridMismatch("no psfs to combine".into()))?;

        let weights: Vec<f64> = match weights {
            Some(w) if w.len() != psfs.len() => {
                return Err(Error::GridMismatch(format!(
                    "{} weights for {} psfs",
                    w.len(),
                    psfs.len()
                )));
            }
            Some(w) => w.to_vec(),
            None => vec![1.0; psfs.len()],
        };

        let x = first.x.clone();
        let y = first.y.clone();

        for psf in psfs {
            if psf.x.len() < 2 || psf.y.len() < 2 {
                return Err(Error::InvalidSampling {
                    samples: psf.x.len().min(psf.y.len()),
                    extent: 0.0,
                });
            }

            let x_outside = psf.x[psf.x.len() - 1] < x[0] || psf.x[0] > x[x.len() - 1];
            let y_outside = psf.y[psf.y.len() - 1] < y[0] || psf.y[0] > y[y.len() - 1];
            if x_outside || y_outside {
                return Err(Error::GridMismatch(
                    "psf support lies outside the combination grid".into(),
                ));
            }
        }

        let resampled: Vec<Array2<f64>> = psfs
            .par_iter()
            .map(|psf| {
                Array2::from_shape_fn((y.len(), x.len()), |(i, j)| {
                    // Target points past a source grid's edge contribute
                    // nothing.
                    query::bilinear(&psf.data, &psf.x, &psf.y, x[j], y[i]).unwrap_or(0.0)
                })
            })
            .collect();

        let mut data = Array2::zeros((y.len(), x.len()));
        for (weight, contribution) in weights.iter().zip(&resampled) {
            data += &(contribution * *weight);
        }

        let combined = Self {
            data,
            x,
            y,
            fno: None,
            wavelength: None,
        };
        Ok(combined.renorm())
    }

    /// Record the working f-number used by diffraction-limited references.
    pub fn with_fno(mut self, fno: f64) -> Self {
        self.fno = Some(fno);
        self
    }

    /// Record the wavelength used by diffraction-limited references.
    pub fn with_wavelength(mut self, wavelength: Length) -> Self {
        self.wavelength = Some(wavelength);
        self
    }

    /// Rescale the irradiance so its peak equals 1. Idempotent.
    pub fn renorm(mut self) -> Self {
        let peak = self.data.iter().cloned().fold(f64::MIN, f64::max);
        if peak > 0.0 {
            self.data.mapv_inplace(|v| v / peak);
        }
        self
    }

    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    /// Sample positions along the x axis, in µm.
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// Sample positions along the y axis, in µm.
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn fno(&self) -> Option<f64> {
        self.fno
    }

    pub fn wavelength(&self) -> Option<Length> {
        self.wavelength
    }

    /// Sum of the irradiance over the whole grid.
    pub fn total_energy(&self) -> f64 {
        self.data.sum()
    }

    /// Fraction of total energy within `radius` (µm) of the axes' origin.
    ///
    /// A pixel belongs to the disk when its Euclidean distance from (0, 0)
    /// is `<= radius`; no polar resampling is involved, so the sum is exact
    /// for the sampled data.
    pub fn encircled_energy(&self, radius: f64) -> f64 {
        let total = self.total_energy();
        // NaN data would otherwise leak into the fraction and defeat every
        // comparison downstream.
        if !total.is_finite() || total <= 0.0 {
            return 0.0;
        }

        let enclosed: f64 = self
            .data
            .indexed_iter()
            .filter(|((i, j), _)| self.x[*j].hypot(self.y[*i]) <= radius)
            .map(|(_, v)| v)
            .sum();

        enclosed / total
    }

    /// Largest radius wholly contained in the grid: the inscribed circle.
    fn max_radius(&self) -> f64 {
        let half_x = self.x[0].abs().max(self.x[self.x.len() - 1].abs());
        let half_y = self.y[0].abs().max(self.y[self.y.len() - 1].abs());
        half_x.min(half_y)
    }

    /// Smallest radius (µm) whose encircled energy reaches `fraction`.
    ///
    /// Bisection over the monotone encircled-energy curve, bounded by the
    /// grid's inscribed circle. Fails with [`Error::UnreachableFraction`]
    /// when even that bound encloses less than `fraction`.
    pub fn ee_radius(&self, fraction: f64) -> Result<f64, Error> {
        if fraction <= 0.0 {
            return Ok(0.0);
        }

        let mut hi = self.max_radius();
        let attainable = self.encircled_energy(hi);
        if attainable < fraction {
            return Err(Error::UnreachableFraction {
                fraction,
                attainable,
            });
        }

        if self.encircled_energy(0.0) >= fraction {
            return Ok(0.0);
        }

        let spacing = (self.x[1] - self.x[0]).min(self.y[1] - self.y[0]);
        let mut lo = 0.0;
        while hi - lo > spacing * 1e-3 {
            let mid = 0.5 * (lo + hi);
            if self.encircled_energy(mid) < fraction {
                lo = mid;
            } else {
                hi = mid;
            }
        }

        Ok(hi)
    }

    /// Radius (µm) a diffraction-limited aperture with this PSF's f-number
    /// and wavelength needs to enclose `fraction` of its energy.
    pub fn ee_radius_diffraction(&self, fraction: f64) -> Result<f64, Error> {
        self.airy()?.ee_radius(fraction)
    }

    /// Ratio of the real to the diffraction-limited encircled-energy
    /// radius. Greater than 1 for any aberrated system.
    pub fn ee_radius_ratio_to_diffraction(&self, fraction: f64) -> Result<f64, Error> {
        let real = self.ee_radius(fraction)?;
        let reference = self.ee_radius_diffraction(fraction)?;
        if reference == 0.0 {
            return Err(Error::DivideByZero);
        }

        Ok(real / reference)
    }

    fn airy(&self) -> Result<AiryDisk, Error> {
        match (self.fno, self.wavelength) {
            (Some(fno), Some(wavelength)) => Ok(AiryDisk::new(fno, wavelength)),
            _ => Err(Error::MissingDiffractionLimit),
        }
    }
}

/// Image-plane complex amplitude from coherent propagation.
///
/// Kept complex so several sources can be superposed before conversion to
/// irradiance.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CoherentPsf {
    data: Array2<Complex64>,
    x: Vec<f64>,
    y: Vec<f64>,
    fno: Option<f64>,
    wavelength: Option<Length>,
}

impl CoherentPsf {
    /// Propagate a pupil coherently with the default oversampling factor.
    /// The amplitude is returned untouched; no magnitude is taken.
    pub fn from_pupil(pupil: &Pupil, efl: Length) -> Result<Self, Error> {
        use uom::si::ratio::ratio;

        let (data, x, y) = focus_amplitude(pupil, efl, DEFAULT_Q)?;
        Ok(Self {
            data,
            x,
            y,
            fno: Some((efl / pupil.diameter()).get::<ratio>()),
            wavelength: Some(pupil.wavelength()),
        })
    }

    pub fn data(&self) -> &Array2<Complex64> {
        &self.data
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Collapse the amplitude to peak-normalized irradiance.
    pub fn to_irradiance(&self) -> Result<Psf, Error> {
        let mut psf = Psf::new(self.data.mapv(|a| a.norm_sqr()), self.x.clone(), self.y.clone())?;
        if let Some(fno) = self.fno {
            psf = psf.with_fno(fno);
        }
        if let Some(wavelength) = self.wavelength {
            psf = psf.with_wavelength(wavelength);
        }
        Ok(psf.renorm())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::linear_axis;
    use approx::assert_relative_eq;
    use rstest::rstest;
    use uom::si::length::micrometer;

    fn airy_psf(samples: usize, half_width: f64) -> Psf {
        let disk = AiryDisk::new(10.0, Length::new::<micrometer>(0.55));
        let axis = linear_axis(2.0 * half_width, samples).unwrap();
        let data = Array2::from_shape_fn((samples, samples), |(i, j)| {
            disk.psf(axis[j].hypot(axis[i]))
        });
        Psf::new(data, axis.clone(), axis)
            .unwrap()
            .with_fno(10.0)
            .with_wavelength(Length::new::<micrometer>(0.55))
    }

    #[test]
    fn renorm_is_idempotent() {
        let psf = airy_psf(64, 50.0);
        let scaled = Psf::new(psf.data() * 3.5, psf.x().to_vec(), psf.y().to_vec()).unwrap();

        let once = scaled.renorm();
        let twice = once.clone().renorm();
        assert_eq!(once, twice);
        assert_eq!(once.data().iter().cloned().fold(f64::MIN, f64::max), 1.0);
    }

    #[rstest]
    #[case(0.0, 0.3)]
    #[case(0.3, 0.6)]
    #[case(0.6, 0.9)]
    fn encircled_energy_is_monotone(#[case] lo: f64, #[case] hi: f64) {
        let psf = airy_psf(64, 50.0);
        let r = psf.max_radius();
        assert!(psf.encircled_energy(r * lo) <= psf.encircled_energy(r * hi));
    }

    #[test]
    fn encircled_energy_is_a_fraction() {
        let psf = airy_psf(64, 50.0);
        let full = psf.encircled_energy(psf.max_radius() * 2.0);
        assert!(full > 0.99 && full <= 1.0);
    }

    #[test]
    fn unreachable_fraction_is_reported() {
        let psf = airy_psf(64, 50.0);
        assert!(matches!(
            psf.ee_radius(1.0),
            Err(Error::UnreachableFraction { .. })
        ));
    }

    #[test]
    fn diffraction_reference_needs_metadata() {
        let psf = airy_psf(32, 50.0);
        let stripped = Psf::new(psf.data().clone(), psf.x().to_vec(), psf.y().to_vec()).unwrap();
        assert!(matches!(
            stripped.ee_radius_diffraction(0.5),
            Err(Error::MissingDiffractionLimit)
        ));
    }

    #[test]
    fn ee_radius_brackets_the_fraction() {
        let psf = airy_psf(128, 50.0);
        let r = psf.ee_radius(0.8).unwrap();
        assert!(psf.encircled_energy(r) >= 0.8);
        // Just inside, the disk must not yet reach the fraction.
        assert!(psf.encircled_energy(r - (psf.x()[1] - psf.x()[0])) < 0.8);
    }

    #[test]
    fn weight_count_must_match() {
        let psf = airy_psf(32, 50.0);
        let result = Psf::polychromatic(&[psf.clone(), psf], Some(&[1.0]));
        assert!(matches!(result, Err(Error::GridMismatch(_))));
    }

    #[test]
    fn disjoint_supports_cannot_be_combined() {
        let near = airy_psf(32, 50.0);
        let shifted: Vec<f64> = near.x().iter().map(|v| v + 1e3).collect();
        let far = Psf::new(near.data().clone(), shifted.clone(), shifted).unwrap();

        assert!(matches!(
            Psf::polychromatic(&[near, far], None),
            Err(Error::GridMismatch(_))
        ));
    }

    #[test]
    fn empty_grids_are_rejected() {
        assert!(matches!(
            Psf::new(Array2::zeros((0, 0)), vec![], vec![]),
            Err(Error::InvalidSampling { .. })
        ));
    }

    #[test]
    fn non_finite_data_reaches_no_fraction() {
        let axis = linear_axis(10.0, 8).unwrap();
        let psf = Psf::new(Array2::from_elem((8, 8), f64::NAN), axis.clone(), axis).unwrap();

        assert_eq!(psf.encircled_energy(5.0), 0.0);
        assert!(matches!(
            psf.ee_radius(0.5),
            Err(Error::UnreachableFraction { .. })
        ));
    }

    #[test]
    fn ratio_of_sampled_airy_is_near_one() {
        let psf = airy_psf(512, 100.0);
        let got = psf.ee_radius_ratio_to_diffraction(0.8).unwrap();
        assert_relative_eq!(got, 1.0, epsilon = 0.05);
    }
}
