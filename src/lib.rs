// #![warn(missing_docs)]

//! Fourier Optics Image Formation
//!
//! Models diffraction-limited image formation: a complex pupil wavefront is
//! propagated to an image-plane point spread function, from which transfer
//! functions and energy-concentration metrics follow.
//!
//! The pipeline runs strictly downward:
//!
//! ```text
//! Pupil --focus--> Psf --transform--> Otf / Mtf --query--> exact values
//!                   \--integrate--> encircled energy
//! ```
//!
//! Sampled results sit on centered coordinate axes from [`grid`];
//! [`airy::AiryDisk`] supplies closed-form references for ideal circular
//! apertures, used both as ground truth and as the exact backend for
//! analytic [`otf::Mtf`] variants.

#[allow(missing_docs)]
pub mod error;

pub mod airy;
mod fft;
pub mod grid;
pub mod otf;
pub mod propagate;
pub mod psf;
pub mod pupil;
pub mod query;
pub mod wavelengths;

pub use airy::AiryDisk;
pub use error::Error;
pub use otf::{Mtf, Otf};
pub use propagate::{Focused, PropagationMode, focus};
pub use psf::{CoherentPsf, Psf};
pub use pupil::Pupil;
pub use query::{Azimuths, Samples};
