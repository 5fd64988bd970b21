//! Pupil-to-image-plane propagation.
//!
//! Far-field (Fraunhofer) propagation: the image-plane amplitude is the
//! Fourier transform of the pupil wavefront. The image-plane axes come from
//! the pupil's conjugate frequency axes scaled by `wavelength * efl` into
//! micrometers.

use crate::error::Error;
use crate::fft::fft2c;
use crate::grid::frequency_axis;
use crate::psf::{CoherentPsf, Psf};
use crate::pupil::Pupil;
use ndarray::{Array2, s};
use num_complex::Complex64;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uom::si::{
    f64::Length,
    length::{micrometer, millimeter},
};

/// Oversampling factor applied before the transform so the PSF is Nyquist
/// sampled out to the aperture cutoff.
pub const DEFAULT_Q: f64 = 2.0;

/// Selects how the image-plane field is reduced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PropagationMode {
    /// Keep the complex amplitude for later superposition.
    Coherent,
    /// Squared magnitude, peak-normalized irradiance.
    #[default]
    Incoherent,
}

impl FromStr for PropagationMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "coherent" => Ok(Self::Coherent),
            "incoherent" => Ok(Self::Incoherent),
            _ => Err(Error::UnsupportedMode { mode: s.into() }),
        }
    }
}

/// A propagated field, coherent or incoherent per the requested mode.
#[derive(Clone, Debug)]
pub enum Focused {
    Coherent(CoherentPsf),
    Incoherent(Psf),
}

/// Propagate `pupil` to the image plane of a system with effective focal
/// length `efl`, reducing the field per `mode`.
pub fn focus(pupil: &Pupil, efl: Length, mode: PropagationMode) -> Result<Focused, Error> {
    match mode {
        PropagationMode::Coherent => Ok(Focused::Coherent(CoherentPsf::from_pupil(pupil, efl)?)),
        PropagationMode::Incoherent => Ok(Focused::Incoherent(Psf::from_pupil(pupil, efl)?)),
    }
}

/// Transform a pupil to its image-plane complex amplitude.
///
/// Returns the field together with its x/y axes in micrometers. The pupil
/// array is zero-padded by `q` before the transform; spacing in the image
/// plane shrinks accordingly.
pub(crate) fn focus_amplitude(
    pupil: &Pupil,
    efl: Length,
    q: f64,
) -> Result<(Array2<Complex64>, Vec<f64>, Vec<f64>), Error> {
    let (rows, cols) = pupil.data().dim();
    if rows < 2 || cols < 2 {
        return Err(Error::InvalidSampling {
            samples: rows.min(cols),
            extent: 0.0,
        });
    }
    if q < 1.0 {
        return Err(Error::InvalidSampling {
            samples: rows,
            extent: q,
        });
    }

    let dx = pupil.x()[1] - pupil.x()[0];
    let dy = pupil.y()[1] - pupil.y()[0];

    let padded_rows = (rows as f64 * q).ceil() as usize;
    let padded_cols = (cols as f64 * q).ceil() as usize;

    let field = if padded_rows == rows && padded_cols == cols {
        fft2c(pupil.data())
    } else {
        let mut padded = Array2::from_elem((padded_rows, padded_cols), Complex64::new(0.0, 0.0));
        let r0 = (padded_rows - rows) / 2;
        let c0 = (padded_cols - cols) / 2;
        padded
            .slice_mut(s![r0..r0 + rows, c0..c0 + cols])
            .assign(pupil.data());
        fft2c(&padded)
    };

    // Image-plane scale: one frequency-domain pixel spans lambda * efl
    // physical units.
    let scale = pupil.wavelength().get::<micrometer>() * efl.get::<millimeter>();
    let x = frequency_axis(padded_cols, dx)?
        .into_iter()
        .map(|f| f * scale)
        .collect();
    let y = frequency_axis(padded_rows, dy)?
        .into_iter()
        .map(|f| f * scale)
        .collect();

    Ok((field, x, y))
}
