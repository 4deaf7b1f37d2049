//! Small GEMM wrapper used by `Matrix::dot`.
//!
//! This module provides a single abstraction over matrix multiplication:
//! - default: a simple, safe triple-loop implementation
//! - optional: a faster backend via the `matrixmultiply` feature

/// Accumulates `c += a * b` for contiguous row-major buffers.
///
/// Shapes: `a` is `(m, k)`, `b` is `(k, n)`, `c` is `(m, n)`.
#[inline]
pub(crate) fn gemm_f64(m: usize, n: usize, k: usize, a: &[f64], b: &[f64], c: &mut [f64]) {
    debug_assert_eq!(a.len(), m * k);
    debug_assert_eq!(b.len(), k * n);
    debug_assert_eq!(c.len(), m * n);

    if m == 0 || n == 0 || k == 0 {
        return;
    }

    #[cfg(feature = "matrixmultiply")]
    {
        // matrixmultiply supports arbitrary strides; ours are plain row-major.
        unsafe {
            matrixmultiply::dgemm(
                m,
                k,
                n,
                1.0,
                a.as_ptr(),
                k as isize,
                1,
                b.as_ptr(),
                n as isize,
                1,
                1.0,
                c.as_mut_ptr(),
                n as isize,
                1,
            );
        }
    }

    // Contraction dimension outermost, output columns innermost.
    #[cfg(not(feature = "matrixmultiply"))]
    for p in 0..k {
        let b_row = &b[p * n..(p + 1) * n];
        for i in 0..m {
            let av = a[i * k + p];
            let c_row = &mut c[i * n..(i + 1) * n];
            for (cv, &bv) in c_row.iter_mut().zip(b_row) {
                *cv += bv * av;
            }
        }
    }
}
