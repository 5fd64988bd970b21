//! Conventional laser and spectral-line wavelengths.
//!
//! A read-only name-to-wavelength table, built once on first use. Values in
//! micrometers.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use uom::si::{f64::Length, length::micrometer};

const TABLE: &[(&str, f64)] = &[
    ("ArF", 0.1935),
    ("KrF", 0.2483),
    ("XeCl", 0.308),
    ("XeF", 0.3512),
    ("HeCd", 0.4416),
    ("Cu", 0.5106),
    ("HeNe", 0.6328),
    ("Ruby", 0.6943),
    ("NdYAG", 1.064),
    ("CO2", 10.6),
];

static NAMED: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| TABLE.iter().copied().collect());

/// Look up a named line, e.g. `"HeNe"`.
pub fn named(name: &str) -> Option<Length> {
    NAMED.get(name).map(|&um| Length::new::<micrometer>(um))
}

/// Helium-neon laser, 632.8 nm.
pub fn he_ne() -> Length {
    Length::new::<micrometer>(0.6328)
}

/// Copper vapor laser, 510.6 nm.
pub fn cu() -> Length {
    Length::new::<micrometer>(0.5106)
}

/// Xenon fluoride excimer laser, 351.2 nm.
pub fn xe_f() -> Length {
    Length::new::<micrometer>(0.3512)
}
