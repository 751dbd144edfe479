//! 2x2 gate application over an amplitude store.
//!
//! Every gate in the crate reduces to [`apply_2x2`]: a 2x2 matrix, two base
//! offsets selecting the "0" and "1" branch of the target bit (with any fixed
//! control bits already OR-ed in), and the sorted powers of every bit that
//! takes part in the gate. The remaining bits are enumerated with
//! [`insert_zero_bits`].

use num_complex::Complex64;
use rayon::prelude::*;

use crate::gate::Matrix2;
use crate::index::{insert_zero_bits, iter_fixed, mask_powers};
use crate::store::{AmplitudeStore, ReadGuard};

const ZERO: Complex64 = Complex64::new(0.0, 0.0);

/// Whether an application also sums the squared magnitudes it writes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NormPolicy {
    Skip,
    /// Sum the written norms, flushing amplitudes whose squared magnitude is
    /// below `threshold` to zero.
    Accumulate { threshold: f64 },
}

/// Apply a 2x2 matrix to one amplitude pair.
///
/// The gate matrix is `[m00, m01, m10, m11]` and transforms:
/// - new_a = m00 * a + m01 * b
/// - new_b = m10 * a + m11 * b
///
/// # Example
/// ```
/// use num_complex::Complex64;
/// use qreg_rs::gate::Gate;
/// use qreg_rs::instruct::u1rows;
///
/// let one = Complex64::new(1.0, 0.0);
/// let zero = Complex64::new(0.0, 0.0);
/// let (a, b) = u1rows(&Gate::X.matrix(), one, zero);
/// assert_eq!((a, b), (zero, one));
/// ```
#[inline]
pub fn u1rows(mtrx: &Matrix2, a: Complex64, b: Complex64) -> (Complex64, Complex64) {
    (mtrx[0] * a + mtrx[1] * b, mtrx[2] * a + mtrx[3] * b)
}

#[inline]
fn flush(c: Complex64, threshold: f64) -> (Complex64, f64) {
    let nrm = c.norm_sqr();
    if nrm < threshold {
        (ZERO, 0.0)
    } else {
        (c, nrm)
    }
}

/// Pairs computed per parallel pass when the store cannot be split into
/// independent blocks. Bounds the scratch buffer.
const PAR_CHUNK: usize = 1 << 14;

/// New values for one pair, plus their summed squared magnitude when
/// `threshold` is set.
#[inline]
fn pair_update(
    mtrx: &Matrix2,
    a: Complex64,
    b: Complex64,
    threshold: Option<f64>,
) -> (Complex64, Complex64, f64) {
    let (c1, c2) = u1rows(mtrx, a, b);
    match threshold {
        Some(t) => {
            let (c1, n1) = flush(c1, t);
            let (c2, n2) = flush(c2, t);
            (c1, c2, n1 + n2)
        }
        None => (c1, c2, 0.0),
    }
}

/// Apply `mtrx` to every amplitude pair `(i | offset1, i | offset2)`, where
/// `i` runs over all indices with zeros at `sorted_powers`.
///
/// `sorted_powers` holds the distinct powers of the target bit(s) and all
/// control bits, ascending. `offset1`/`offset2` carry the fixed values of
/// those bits for the two branches.
///
/// With [`NormPolicy::Accumulate`] the sum of written squared magnitudes is
/// returned. That sum is the full vector norm only when the pairs cover the
/// whole vector, i.e. for a single special power.
///
/// With `parallel` set the pairs fan out across worker threads. Norm partial
/// sums are reduced in no particular order.
#[allow(clippy::too_many_arguments)]
pub fn apply_2x2(
    store: &mut dyn AmplitudeStore,
    n_qubits: usize,
    offset1: usize,
    offset2: usize,
    mtrx: &Matrix2,
    sorted_powers: &[usize],
    norm: NormPolicy,
    parallel: bool,
) -> Option<f64> {
    debug_assert!(
        sorted_powers.windows(2).all(|w| w[0] < w[1]),
        "powers must be distinct and ascending"
    );
    debug_assert!(sorted_powers.len() <= n_qubits);

    let threshold = match norm {
        NormPolicy::Skip => None,
        NormPolicy::Accumulate { threshold } => Some(threshold),
    };

    let total = if !parallel {
        let count = 1usize << (n_qubits - sorted_powers.len());
        let mut total = 0.0;
        for lcv in 0..count {
            let i = insert_zero_bits(lcv, sorted_powers);
            let (i1, i2) = (i | offset1, i | offset2);
            let (c1, c2, nrm) = pair_update(mtrx, store.read(i1), store.read(i2), threshold);
            store.write2(i1, c1, i2, c2);
            total += nrm;
        }
        total
    } else {
        let block = sorted_powers.last().map_or(1, |&top| top << 1);
        let n_blocks = (1usize << n_qubits) / block;
        match store.as_slice_mut() {
            Some(amps) if n_blocks >= rayon::current_num_threads() => {
                par_blocks(amps, block, offset1, offset2, mtrx, sorted_powers, threshold)
            }
            _ => par_chunked(store, n_qubits, offset1, offset2, mtrx, sorted_powers, threshold),
        }
    };

    threshold.map(|_| total)
}

/// Every pair lies inside one block of `block` amplitudes, the span of the
/// highest special power, so disjoint blocks update in parallel in place.
fn par_blocks(
    amps: &mut [Complex64],
    block: usize,
    offset1: usize,
    offset2: usize,
    mtrx: &Matrix2,
    sorted_powers: &[usize],
    threshold: Option<f64>,
) -> f64 {
    let per_block = block >> sorted_powers.len();
    amps.par_chunks_mut(block)
        .map(|chunk| {
            let mut total = 0.0;
            for lcv in 0..per_block {
                let i = insert_zero_bits(lcv, sorted_powers);
                let (i1, i2) = (i | offset1, i | offset2);
                let (c1, c2, nrm) = pair_update(mtrx, chunk[i1], chunk[i2], threshold);
                chunk[i1] = c1;
                chunk[i2] = c2;
                total += nrm;
            }
            total
        })
        .sum()
}

/// Compute up to [`PAR_CHUNK`] pairs in parallel under a read lock, write
/// them back, then move to the next range.
fn par_chunked(
    store: &mut dyn AmplitudeStore,
    n_qubits: usize,
    offset1: usize,
    offset2: usize,
    mtrx: &Matrix2,
    sorted_powers: &[usize],
    threshold: Option<f64>,
) -> f64 {
    let count = 1usize << (n_qubits - sorted_powers.len());
    let mut updates: Vec<(usize, Complex64, usize, Complex64, f64)> =
        Vec::with_capacity(count.min(PAR_CHUNK));
    let mut total = 0.0;
    let mut start = 0;
    while start < count {
        let end = count.min(start + PAR_CHUNK);
        {
            let guard = ReadGuard::acquire(&mut *store);
            let view: &dyn AmplitudeStore = &*guard;
            (start..end)
                .into_par_iter()
                .map(|lcv| {
                    let i = insert_zero_bits(lcv, sorted_powers);
                    let (i1, i2) = (i | offset1, i | offset2);
                    let (c1, c2, nrm) = pair_update(mtrx, view.read(i1), view.read(i2), threshold);
                    (i1, c1, i2, c2, nrm)
                })
                .collect_into_vec(&mut updates);
        }
        total += updates.par_iter().map(|u| u.4).sum::<f64>();
        for &(i1, c1, i2, c2, _) in &updates {
            store.write2(i1, c1, i2, c2);
        }
        start = end;
    }
    total
}

/// Diagonal projector keeping the `result` branch of a single bit, scaled by
/// `nrm`.
pub fn projector(result: bool, nrm: Complex64) -> Matrix2 {
    if result {
        [ZERO, ZERO, ZERO, nrm]
    } else {
        [nrm, ZERO, ZERO, ZERO]
    }
}

/// Keep only amplitudes whose bits under `mask` equal `result`, scaled by
/// `nrm`; zero everything else.
///
/// Survivors are gathered with the fixed-bit enumeration, the store is
/// cleared, and the scaled survivors are written back.
pub fn apply_m_mask(
    store: &mut dyn AmplitudeStore,
    n_qubits: usize,
    mask: usize,
    result: usize,
    nrm: Complex64,
) {
    debug_assert_eq!(result & !mask, 0, "result has bits outside mask");
    let powers = mask_powers(mask);
    let survivors: Vec<(usize, Complex64)> = if store.is_sparse() {
        store
            .nonzero()
            .into_iter()
            .filter(|&(i, _)| i & mask == result)
            .collect()
    } else {
        iter_fixed(n_qubits, &powers, result)
            .map(|i| (i, store.read(i)))
            .filter(|&(_, c)| c != ZERO)
            .collect()
    };
    store.clear();
    for (i, c) in survivors {
        store.write(i, nrm * c);
    }
}

/// Sum of squared magnitudes over the whole store.
///
/// Amplitudes below `threshold` do not contribute.
pub fn norm_sum(store: &dyn AmplitudeStore, threshold: f64, parallel: bool) -> f64 {
    let keep = |nrm: f64| if nrm < threshold { 0.0 } else { nrm };
    if store.is_sparse() {
        store.nonzero().iter().map(|(_, c)| keep(c.norm_sqr())).sum()
    } else if parallel {
        (0..store.capacity())
            .into_par_iter()
            .map(|i| keep(store.read(i).norm_sqr()))
            .sum()
    } else {
        (0..store.capacity()).map(|i| keep(store.read(i).norm_sqr())).sum()
    }
}
