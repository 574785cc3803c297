// Dense kernels used by the forward pass. Every entry point checks its
// dimensions and returns a shape error instead of producing NaN.

use rayon::prelude::*;
use wide::f64x4;

use crate::error::{ensure_len, Result};

// Below this many multiply-adds the row loop stays on the calling thread
const PARALLEL_THRESHOLD: usize = 1 << 14;

// Dot product, four lanes at a time
pub fn dot(a: &[f64], b: &[f64]) -> Result<f64> {
    ensure_len("dot product", a.len(), b.len())?;
    Ok(dot_unchecked(a, b))
}

#[inline]
fn dot_unchecked(a: &[f64], b: &[f64]) -> f64 {
    let a_chunks = a.chunks_exact(4);
    let b_chunks = b.chunks_exact(4);
    let tail: f64 = a_chunks
        .remainder()
        .iter()
        .zip(b_chunks.remainder())
        .map(|(x, y)| x * y)
        .sum();

    let mut acc = f64x4::default();
    for (x, y) in a_chunks.zip(b_chunks) {
        acc += f64x4::from([x[0], x[1], x[2], x[3]]) * f64x4::from([y[0], y[1], y[2], y[3]]);
    }
    let lanes: &[f64; 4] = acc.as_array_ref();
    lanes.iter().sum::<f64>() + tail
}

/// Multiply a row-major `rows x cols` matrix by a column vector of length `cols`.
///
/// Rows are independent, so large products are split across the rayon pool.
/// The matrix is only read.
pub fn mat_vec(matrix: &[f64], rows: usize, cols: usize, input: &[f64]) -> Result<Vec<f64>> {
    ensure_len("matrix-vector product (matrix size)", rows * cols, matrix.len())?;
    ensure_len("matrix-vector product (input length)", cols, input.len())?;
    if cols == 0 {
        return Ok(vec![0.0; rows]);
    }

    let output = if rows * cols >= PARALLEL_THRESHOLD {
        matrix
            .par_chunks(cols)
            .map(|row| dot_unchecked(row, input))
            .collect()
    } else {
        matrix
            .chunks(cols)
            .map(|row| dot_unchecked(row, input))
            .collect()
    };
    Ok(output)
}

// Elementwise `target += other`
pub fn add_assign(target: &mut [f64], other: &[f64]) -> Result<()> {
    ensure_len("vector add", target.len(), other.len())?;
    target.iter_mut().zip(other).for_each(|(t, o)| *t += o);
    Ok(())
}

// Transpose a column-major matrix (one inner list per column) into a flat
// row-major buffer
pub fn transpose_columns(columns: &[Vec<f64>], rows: usize) -> Result<Vec<f64>> {
    let cols = columns.len();
    let mut output = vec![0.0; rows * cols];
    for (col, column) in columns.iter().enumerate() {
        ensure_len("weight column", rows, column.len())?;
        for (row, &value) in column.iter().enumerate() {
            output[row * cols + col] = value;
        }
    }
    Ok(output)
}
