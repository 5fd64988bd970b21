//! Complex wavefronts over the aperture plane.

use crate::error::Error;
use ndarray::Array2;
use num_complex::Complex64;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use uom::si::f64::Length;

/// A complex wavefront sampled over aperture coordinates.
///
/// The amplitude is conventionally 1 inside the clear aperture and 0
/// outside; phase carries the wavefront error. Axes are in millimeters,
/// centered on the optical axis, and the array shape is
/// `(y.len(), x.len())`.
///
/// Pupil content (aperture shapes, aberrations) is produced upstream; this
/// crate only consumes it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pupil {
    data: Array2<Complex64>,
    x: Vec<f64>,
    y: Vec<f64>,
    wavelength: Length,
    diameter: Length,
}

impl Pupil {
    /// Create a pupil from a sampled wavefront, its axes (mm), the
    /// wavelength, and the clear-aperture diameter.
    ///
    /// Fails with [`Error::GridMismatch`] if the array shape does not match
    /// the axis lengths.
    pub fn new(
        data: Array2<Complex64>,
        x: Vec<f64>,
        y: Vec<f64>,
        wavelength: Length,
        diameter: Length,
    ) -> Result<Self, Error> {
        let (rows, cols) = data.dim();
        if rows == 0 || cols == 0 {
            return Err(Error::InvalidSampling {
                samples: rows.min(cols),
                extent: 0.0,
            });
        }
        if rows != y.len() || cols != x.len() {
            return Err(Error::GridMismatch(format!(
                "pupil array is {rows}x{cols} but axes are {}x{}",
                y.len(),
                x.len()
            )));
        }

        Ok(Self {
            data,
            x,
            y,
            wavelength,
            diameter,
        })
    }

    pub fn data(&self) -> &Array2<Complex64> {
        &self.data
    }

    /// Sample positions along the x axis, in mm.
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// Sample positions along the y axis, in mm.
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn wavelength(&self) -> Length {
        self.wavelength
    }

    /// Clear-aperture diameter.
    pub fn diameter(&self) -> Length {
        self.diameter
    }
}
