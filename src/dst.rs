//! Two-dimensional discrete sine transform (DST-I) built on a complex FFT.
//!
//! A row `s` of length `n` is extended to the odd sequence
//! `[0, s0, .., s(n-1), 0, -s(n-1), .., -s0]` of length `2n + 2`. The
//! imaginary part of its DFT at bins `1..=n` is `-2 * DST-I(s)`. Applying the
//! same step along both axes gives `4 * S * M * S`, where `S` is the sine
//! matrix `sin(pi * j * k / (n + 1))`.
//!
//! The inverse runs the inverse FFT scaled by `1 / (2n + 2)`, which yields
//! `+S / (n + 1)` per axis. Since `S * S = (n + 1) / 2 * I`, a forward pass
//! followed by an inverse pass is the identity.

use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftDirection, FftPlanner};

use crate::plane::Plane;

/// Sine-transform `matrix` along both axes.
///
/// With `inverse` set, the FFT runs backwards with `1/N` scaling so that
/// `sine_transform(&sine_transform(m, false), true) == m` up to rounding.
/// Each call owns its scratch buffers, so concurrent calls are independent.
#[must_use]
pub fn sine_transform(matrix: &Plane, inverse: bool) -> Plane {
    if matrix.width() == 0 || matrix.height() == 0 {
        return matrix.clone();
    }

    let direction = if inverse {
        FftDirection::Inverse
    } else {
        FftDirection::Forward
    };
    let mut planner = FftPlanner::<f32>::new();

    let along_rows = transform_rows(matrix, &mut planner, direction);
    let along_cols = transform_rows(&along_rows.transpose(), &mut planner, direction);
    along_cols.transpose()
}

/// Odd-extend every row, FFT it, and keep the imaginary part of bins `1..=n`.
fn transform_rows(
    matrix: &Plane,
    planner: &mut FftPlanner<f32>,
    direction: FftDirection,
) -> Plane {
    let n = matrix.width();
    let len = 2 * n + 2;
    let fft: Arc<dyn Fft<f32>> = planner.plan_fft(len, direction);
    #[allow(clippy::cast_precision_loss)]
    let scale = match direction {
        FftDirection::Forward => 1.0,
        FftDirection::Inverse => 1.0 / len as f32,
    };

    let mut buffer = vec![Complex::new(0.0f32, 0.0); len];
    let mut scratch = vec![Complex::new(0.0f32, 0.0); fft.get_inplace_scratch_len()];
    let mut out = Plane::new(n, matrix.height());

    for y in 0..matrix.height() {
        odd_extend(matrix.row(y), &mut buffer);
        fft.process_with_scratch(&mut buffer, &mut scratch);

        let dst_row = &mut out.as_mut_slice()[y * n..(y + 1) * n];
        for (k, v) in dst_row.iter_mut().enumerate() {
            *v = buffer[k + 1].im * scale;
        }
    }

    out
}

fn odd_extend(row: &[f32], buffer: &mut [Complex<f32>]) {
    let n = row.len();
    buffer.fill(Complex::new(0.0, 0.0));
    for (i, &v) in row.iter().enumerate() {
        buffer[i + 1].re = v;
        buffer[n + 2 + i].re = -row[n - 1 - i];
    }
}
