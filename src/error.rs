use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("expected a positive sample count and extent but got {samples} samples spanning {extent}")]
    InvalidSampling { samples: usize, extent: f64 },

    #[error("unsupported propagation mode: {mode}")]
    UnsupportedMode { mode: String },

    #[error("grid mismatch: {0}")]
    GridMismatch(String),

    #[error("{axis} = {value} is outside the sampled range [{min}, {max}]")]
    OutOfBounds {
        axis: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("encircled energy fraction {fraction} is not attainable within the grid (max {attainable})")]
    UnreachableFraction { fraction: f64, attainable: f64 },

    #[error("diffraction-limited reference radius is zero; ratio is undefined")]
    DivideByZero,

    #[error("psf carries no f-number or wavelength; the diffraction-limited reference is undefined")]
    MissingDiffractionLimit,
}
