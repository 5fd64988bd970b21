//! Query-argument broadcasting and grid interpolation.
//!
//! Frequency queries accept scalars, sequences, or nothing at all for each
//! coordinate. Rather than sniffing types at every call site, the three
//! shapes are modelled as explicit unions ([`Samples`], [`Azimuths`]) and
//! resolved once, at the query boundary, into plain vectors.

use crate::error::Error;
use ndarray::Array2;
use uom::si::{angle::radian, f64::Angle};

/// A query coordinate: absent, shared scalar, or per-point sequence.
#[derive(Clone, Copy, Debug)]
pub enum Samples<'a> {
    /// Use the grid's canonical default (0 on that axis).
    Default,
    /// One value broadcast against the other coordinate.
    Scalar(f64),
    /// One value per query point.
    Sequence(&'a [f64]),
}

impl Samples<'_> {
    fn len(&self) -> Option<usize> {
        match self {
            Samples::Sequence(s) => Some(s.len()),
            _ => None,
        }
    }

    fn materialize(&self, len: usize, default: f64) -> Vec<f64> {
        match self {
            Samples::Default => vec![default; len],
            Samples::Scalar(v) => vec![*v; len],
            Samples::Sequence(s) => s.to_vec(),
        }
    }
}

impl From<f64> for Samples<'static> {
    fn from(v: f64) -> Self {
        Samples::Scalar(v)
    }
}

impl From<Option<f64>> for Samples<'static> {
    fn from(v: Option<f64>) -> Self {
        match v {
            Some(v) => Samples::Scalar(v),
            None => Samples::Default,
        }
    }
}

impl<'a> From<&'a [f64]> for Samples<'a> {
    fn from(s: &'a [f64]) -> Self {
        Samples::Sequence(s)
    }
}

impl<'a> From<&'a Vec<f64>> for Samples<'a> {
    fn from(s: &'a Vec<f64>) -> Self {
        Samples::Sequence(s)
    }
}

/// Resolve a coordinate pair into two equal-length vectors.
///
/// Sequences fix the broadcast length and must agree; scalars and defaults
/// replicate to match. Two bare scalars produce a single query point.
pub(crate) fn broadcast_pair(
    a: Samples<'_>,
    b: Samples<'_>,
    default: f64,
) -> Result<(Vec<f64>, Vec<f64>), Error> {
    let len = match (a.len(), b.len()) {
        (Some(n), Some(m)) if n != m => {
            return Err(Error::GridMismatch(format!(
                "query sequences have lengths {n} and {m}"
            )));
        }
        (Some(n), _) => n,
        (_, Some(m)) => m,
        (None, None) => 1,
    };

    Ok((a.materialize(len, default), b.materialize(len, default)))
}

/// Azimuth selection for polar queries.
#[derive(Clone, Copy, Debug)]
pub enum Azimuths<'a> {
    /// Sample along the grid's primary axis (0 degrees).
    Default,
    /// One azimuth shared by every radius.
    Scalar(Angle),
    /// One azimuth per radius.
    Sequence(&'a [Angle]),
}

impl From<Angle> for Azimuths<'static> {
    fn from(a: Angle) -> Self {
        Azimuths::Scalar(a)
    }
}

impl From<Option<Angle>> for Azimuths<'static> {
    fn from(a: Option<Angle>) -> Self {
        match a {
            Some(a) => Azimuths::Scalar(a),
            None => Azimuths::Default,
        }
    }
}

impl<'a> From<&'a [Angle]> for Azimuths<'a> {
    fn from(s: &'a [Angle]) -> Self {
        Azimuths::Sequence(s)
    }
}

impl Azimuths<'_> {
    /// Resolve to one angle in radians per radius.
    pub(crate) fn materialize(&self, len: usize) -> Result<Vec<f64>, Error> {
        match self {
            Azimuths::Default => Ok(vec![0.0; len]),
            Azimuths::Scalar(a) => Ok(vec![a.get::<radian>(); len]),
            Azimuths::Sequence(s) => {
                if s.len() != len {
                    return Err(Error::GridMismatch(format!(
                        "{} azimuths for {len} radii",
                        s.len()
                    )));
                }
                Ok(s.iter().map(|a| a.get::<radian>()).collect())
            }
        }
    }
}

/// Find the bracketing interval and interpolation weight for `v` on `axis`.
fn bracket(axis: &[f64], v: f64, name: &'static str) -> Result<(usize, f64), Error> {
    if axis.len() < 2 {
        return Err(Error::InvalidSampling {
            samples: axis.len(),
            extent: 0.0,
        });
    }

    let min = axis[0];
    let max = axis[axis.len() - 1];
    if v < min || v > max {
        return Err(Error::OutOfBounds {
            axis: name,
            value: v,
            min,
            max,
        });
    }

    // First index strictly above v; v == max clamps to the last interval.
    let hi = axis.partition_point(|&a| a <= v);
    if hi == axis.len() {
        return Ok((axis.len() - 2, 1.0));
    }

    let lo = hi - 1;
    Ok((lo, (v - axis[lo]) / (axis[hi] - axis[lo])))
}

/// Bilinear interpolation of a sampled grid at the exact point `(xq, yq)`.
///
/// Queries outside the axes' extent fail with [`Error::OutOfBounds`]; no
/// extrapolation is ever performed.
pub(crate) fn bilinear(
    data: &Array2<f64>,
    x: &[f64],
    y: &[f64],
    xq: f64,
    yq: f64,
) -> Result<f64, Error> {
    let (j, tx) = bracket(x, xq, "x")?;
    let (i, ty) = bracket(y, yq, "y")?;

    let f00 = data[[i, j]];
    let f01 = data[[i, j + 1]];
    let f10 = data[[i + 1, j]];
    let f11 = data[[i + 1, j + 1]];

    Ok(f00 * (1.0 - tx) * (1.0 - ty) + f01 * tx * (1.0 - ty) + f10 * (1.0 - tx) * ty
        + f11 * tx * ty)
}
