//! Centered 2D Fourier transforms over `ndarray` arrays.
//!
//! The propagation and transfer-function code always wants the DC sample in
//! the middle of the array, matching the centered axes from [`crate::grid`].
//! `fft2c` therefore wraps the raw transform in the usual
//! ifftshift / fft / fftshift sandwich.

use ndarray::Array2;
use num_complex::Complex64;
use rustfft::FftPlanner;

/// Cyclically shift `a` right/down by `s0` rows and `s1` columns.
fn roll2<T: Clone>(a: &Array2<T>, s0: usize, s1: usize) -> Array2<T> {
    let (n0, n1) = a.dim();
    Array2::from_shape_fn((n0, n1), |(i, j)| {
        a[[(i + n0 - s0) % n0, (j + n1 - s1) % n1]].clone()
    })
}

/// Move the zero-frequency sample from index 0 to the array center.
pub(crate) fn fftshift2<T: Clone>(a: &Array2<T>) -> Array2<T> {
    let (n0, n1) = a.dim();
    roll2(a, n0 / 2, n1 / 2)
}

/// Inverse of [`fftshift2`]; exact for odd sizes as well.
pub(crate) fn ifftshift2<T: Clone>(a: &Array2<T>) -> Array2<T> {
    let (n0, n1) = a.dim();
    roll2(a, n0 - n0 / 2, n1 - n1 / 2)
}

/// Unnormalized forward 2D FFT, rows then columns.
pub(crate) fn fft2(a: &Array2<Complex64>) -> Array2<Complex64> {
    let (rows, cols) = a.dim();
    let mut planner = FftPlanner::new();

    let row_fft = planner.plan_fft_forward(cols);
    let mut out = a.to_owned();
    for mut row in out.rows_mut() {
        row_fft.process(
            row.as_slice_mut()
                .expect("rows of a standard-layout array are contiguous"),
        );
    }

    // Transform columns by transposing into a contiguous buffer.
    let mut t = out.t().as_standard_layout().into_owned();
    let col_fft = planner.plan_fft_forward(rows);
    for mut row in t.rows_mut() {
        col_fft.process(
            row.as_slice_mut()
                .expect("rows of a standard-layout array are contiguous"),
        );
    }

    t.t().as_standard_layout().into_owned()
}

/// Forward 2D FFT of an array whose DC sample sits at the center, returning
/// an array with the same convention.
pub(crate) fn fft2c(a: &Array2<Complex64>) -> Array2<Complex64> {
    fftshift2(&fft2(&ifftshift2(a)))
}
