//! In-place interlacing transforms for burst-error tolerance.
//!
//! A lace is `ibs * N` bytes, where `ibs` (codewords per lace) is `1`, `N`,
//! or `N*N` depending on the interlacing factor (1, 2, 3). For factors 2
//! and 3 the lace is treated as a square or cube of `N`-byte rows and
//! transposed so that a contiguous run of corrupted bytes in the *encoded*
//! stream lands as one scattered byte per codeword in the *decoded* view,
//! rather than many consecutive bytes inside a handful of codewords.
//!
//! Both transforms are their own inverse: applying either twice restores
//! the original buffer.

use crate::rs255::N;

/// Transpose a buffer of `n*n` bytes in place, as an `n x n` row-major
/// matrix. Used for interlacing factor 2, with `n == N`.
pub fn transpose2d(buf: &mut [u8], n: usize) {
    assert_eq!(buf.len(), n * n, "transpose2d: buffer is not n*n bytes");
    for i in 0..n {
        for j in (i + 1)..n {
            buf.swap(i * n + j, j * n + i);
        }
    }
}

/// Transpose a buffer of `n*n*n` bytes in place, as an `n x n x n` cube
/// indexed `mat[i][j][k] = buf[i*n*n + j*n + k]`. Swaps `mat[i,j,k]` with
/// `mat[k,j,i]` for `i < k`, i.e. reverses the first and third axes. Used
/// for interlacing factor 3, with `n == N`.
pub fn transpose3d(buf: &mut [u8], n: usize) {
    assert_eq!(buf.len(), n * n * n, "transpose3d: buffer is not n*n*n bytes");
    let n2 = n * n;
    for i in 0..n {
        for k in (i + 1)..n {
            for j in 0..n {
                buf.swap(i * n2 + j * n + k, k * n2 + j * n + i);
            }
        }
    }
}

/// Apply the interlacing transform for `ifactor` (1, 2 or 3) to a lace
/// buffer. `ifactor == 1` is a no-op (`ibs == 1`, a lace is a single
/// codeword). The same call inverts the transform, since both transposes
/// are involutive.
pub fn apply(buf: &mut [u8], ifactor: u8) {
    match ifactor {
        1 => {}
        2 => transpose2d(buf, N),
        3 => transpose3d(buf, N),
        _ => panic!("invalid interlacing factor {ifactor}"),
    }
}

/// Codewords per lace (`ibs`) for a given interlacing factor.
pub fn lace_codewords(ifactor: u8) -> usize {
    match ifactor {
        1 => 1,
        2 => N,
        3 => N * N,
        _ => panic!("invalid interlacing factor {ifactor}"),
    }
}
