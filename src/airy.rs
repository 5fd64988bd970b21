//! Closed-form diffraction model for an unaberrated circular aperture.
//!
//! The Airy pattern is the exact point spread function of an ideal circular
//! pupil and serves both as ground truth for the sampled pipeline and as the
//! analytic backend for exact frequency queries.

use crate::error::Error;
use scilib::math::bessel;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_4, PI};
use uom::si::{f64::Length, length::micrometer};

/// Radii below this are treated as the on-axis limit of the Airy pattern.
const ON_AXIS_EPS: f64 = 1e-12;

/// scilib evaluates `J_n` by power series, which loses precision as the
/// argument grows; above this the asymptotic expansion takes over.
const BESSEL_SERIES_LIMIT: f64 = 8.0;

// Rational coefficients for the large-argument expansions of J0 and J1
// (Hart fits, as tabulated in Numerical Recipes).

fn bessel_j0(x: f64) -> f64 {
    let x = x.abs();
    if x < BESSEL_SERIES_LIMIT {
        return bessel::j_n(0, x);
    }

    let z = 8.0 / x;
    let y = z * z;
    let p = 1.0
        + y * (-0.1098628627e-2
            + y * (0.2734510407e-4 + y * (-0.2073370639e-5 + y * 0.2093887211e-6)));
    let q = -0.1562499995e-1
        + y * (0.1430488765e-3
            + y * (-0.6911147651e-5 + y * (0.7621095161e-6 + y * -0.934935152e-7)));
    let chi = x - FRAC_PI_4;
    (2.0 / (PI * x)).sqrt() * (chi.cos() * p - z * chi.sin() * q)
}

fn bessel_j1(x: f64) -> f64 {
    let x = x.abs();
    if x < BESSEL_SERIES_LIMIT {
        return bessel::j_n(1, x);
    }

    let z = 8.0 / x;
    let y = z * z;
    let p = 1.0
        + y * (0.183105e-2
            + y * (-0.3516396496e-4 + y * (0.2457520174e-5 + y * -0.240337019e-6)));
    let q = 0.04687499995
        + y * (-0.2002690873e-3
            + y * (0.8449199096e-5 + y * (-0.88228987e-6 + y * 0.105787412e-6)));
    let chi = x - 3.0 * FRAC_PI_4;
    (2.0 / (PI * x)).sqrt() * (chi.cos() * p - z * chi.sin() * q)
}

/// Diffraction model of a circular aperture with a given working f-number
/// and wavelength.
///
/// Spatial arguments are in micrometers, frequencies in cycles/mm, matching
/// the sampled [`Psf`](crate::psf::Psf) and [`Mtf`](crate::otf::Mtf)
/// conventions.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AiryDisk {
    fno: f64,
    wavelength: Length,
}

impl AiryDisk {
    /// Create a model from a working f-number and a wavelength.
    pub fn new(fno: f64, wavelength: Length) -> Self {
        Self { fno, wavelength }
    }

    pub fn fno(&self) -> f64 {
        self.fno
    }

    pub fn wavelength(&self) -> Length {
        self.wavelength
    }

    /// `λ·F`, the diffraction scale, in micrometers.
    fn lambda_fno_um(&self) -> f64 {
        self.wavelength.get::<micrometer>() * self.fno
    }

    /// Incoherent cutoff frequency `1 / (λ·F)` in cycles/mm.
    pub fn cutoff(&self) -> f64 {
        1e3 / self.lambda_fno_um()
    }

    /// PSF irradiance at radial distance `radius` (µm), normalized to 1 on
    /// axis.
    ///
    /// The on-axis 0/0 singularity of `(2·J1(x)/x)²` is removed explicitly;
    /// the limit is exactly 1.
    pub fn psf(&self, radius: f64) -> f64 {
        let x = PI * radius.abs() / self.lambda_fno_um();
        if x < ON_AXIS_EPS {
            return 1.0;
        }

        let jinc = 2.0 * bessel_j1(x) / x;
        jinc * jinc
    }

    /// OTF at radial frequency `freq` (cycles/mm).
    ///
    /// Real-valued, exactly 0 at and beyond the cutoff.
    pub fn otf(&self, freq: f64) -> f64 {
        let s = freq.abs() / self.cutoff();
        if s >= 1.0 {
            return 0.0;
        }

        2.0 / PI * (s.acos() - s * (1.0 - s * s).sqrt())
    }

    /// MTF at radial frequency `freq` (cycles/mm).
    ///
    /// The Airy OTF is real and non-negative, so the MTF coincides with it.
    pub fn mtf(&self, freq: f64) -> f64 {
        self.otf(freq)
    }

    /// Fraction of total energy enclosed within `radius` (µm).
    ///
    /// Uses the closed form `E(r) = 1 - J0²(u) - J1²(u)` with
    /// `u = π·r / (λ·F)`.
    pub fn encircled_energy(&self, radius: f64) -> f64 {
        let u = PI * radius.abs() / self.lambda_fno_um();
        if u < ON_AXIS_EPS {
            return 0.0;
        }

        let j0 = bessel_j0(u);
        let j1 = bessel_j1(u);
        1.0 - j0 * j0 - j1 * j1
    }

    /// Radius (µm) enclosing the energy fraction `fraction`.
    ///
    /// The encircled-energy curve is monotone, so the radius is found by
    /// bisection. Fractions at or above 1 are only reached in the limit and
    /// fail with [`Error::UnreachableFraction`].
    pub fn ee_radius(&self, fraction: f64) -> Result<f64, Error> {
        if !(0.0..1.0).contains(&fraction) {
            return Err(Error::UnreachableFraction {
                fraction,
                attainable: 1.0,
            });
        }

        if fraction == 0.0 {
            return Ok(0.0);
        }

        let mut hi = self.lambda_fno_um();
        while self.encircled_energy(hi) < fraction {
            hi *= 2.0;
        }

        let mut lo = 0.0;
        while hi - lo > hi * 1e-12 {
            let mid = 0.5 * (lo + hi);
            if self.encircled_energy(mid) < fraction {
                lo = mid;
            } else {
                hi = mid;
            }
        }

        Ok(hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use rstest::rstest;

    fn disk() -> AiryDisk {
        AiryDisk::new(10.0, Length::new::<micrometer>(0.55))
    }

    #[test]
    fn on_axis_psf_is_exactly_one() {
        assert_eq!(disk().psf(0.0), 1.0);
    }

    #[test]
    fn first_dark_ring_is_dark() {
        // First zero of J1 at x = 3.8317 -> r = 1.22 * lambda * F.
        let r = 1.22 * 0.55 * 10.0;
        assert_abs_diff_eq!(disk().psf(r), 0.0, epsilon = 1e-5);
    }

    #[rstest]
    #[case(1.0)]
    #[case(1.5)]
    #[case(100.0)]
    fn otf_is_zero_at_and_beyond_cutoff(#[case] scale: f64) {
        let d = disk();
        assert_eq!(d.otf(d.cutoff() * scale), 0.0);
    }

    #[test]
    fn otf_is_strictly_decreasing_below_cutoff() {
        let d = disk();
        let samples = 64;
        let mut last = d.otf(0.0);
        assert_eq!(last, 1.0);
        for k in 1..samples {
            let v = d.otf(d.cutoff() * k as f64 / samples as f64);
            assert!(v < last, "otf not decreasing at step {k}");
            last = v;
        }
    }

    #[test]
    fn encircled_energy_at_first_ring() {
        // The classic 83.8% within the first dark ring.
        let d = disk();
        let r = 1.22 * 0.55 * 10.0;
        assert_relative_eq!(d.encircled_energy(r), 0.838, epsilon = 1e-3);
    }

    #[test]
    fn ee_radius_inverts_encircled_energy() {
        let d = disk();
        for fraction in [0.3, 0.5, 0.8, 0.9] {
            let r = d.ee_radius(fraction).unwrap();
            assert_relative_eq!(d.encircled_energy(r), fraction, epsilon = 1e-9);
        }
    }

    #[rstest]
    #[case(50.0)]
    #[case(80.0)]
    #[case(141.0)]
    #[case(1000.0)]
    fn psf_decays_at_large_radius(#[case] r: f64) {
        // The envelope falls as 8 / (pi * x^3); nothing out here may come
        // near the on-axis peak.
        let v = disk().psf(r);
        assert!(v.is_finite() && (0.0..1e-3).contains(&v), "psf({r}) = {v}");
    }

    #[test]
    fn encircled_energy_saturates_far_out() {
        let e = disk().encircled_energy(2000.0);
        assert!(e.is_finite() && e > 0.999 && e <= 1.0, "ee = {e}");
    }

    #[test]
    fn psf_is_continuous_across_evaluation_regimes() {
        // Series and asymptotic branches meet at x = 8.
        let r = BESSEL_SERIES_LIMIT * 0.55 * 10.0 / PI;
        assert_relative_eq!(
            disk().psf(r - 1e-9),
            disk().psf(r + 1e-9),
            epsilon = 1e-6
        );
    }

    #[test]
    fn full_energy_is_unreachable() {
        assert!(matches!(
            disk().ee_radius(1.0),
            Err(Error::UnreachableFraction { .. })
        ));
    }
}
