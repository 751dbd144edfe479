//! Amplitude storage backends.
//!
//! Gate application and measurement are written purely against the
//! [`AmplitudeStore`] trait. A register picks one backend at construction:
//!
//! - [`DenseStore`] - one `Complex64` per basis state in an `ndarray::Array1`
//! - [`SparseStore`] - a hash map holding only the non-zero amplitudes

use std::collections::HashMap;
use std::fmt::Debug;
use std::ops::Deref;

use ndarray::{Array1, ArrayView1, ArrayViewMut1, Zip};
use num_complex::Complex64;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);

/// Capability set shared by every amplitude backend.
///
/// Indices are permutation values in `[0, capacity)`. An index outside that
/// range is a caller error and panics.
pub trait AmplitudeStore: Debug + Send + Sync {
    /// Number of amplitudes, `2^N` for an N-qubit register.
    fn capacity(&self) -> usize;

    fn read(&self, i: usize) -> Complex64;

    fn write(&mut self, i: usize, c: Complex64);

    /// Write two amplitudes in one call.
    ///
    /// A backend may elide writes whose value is exactly zero when that does
    /// not change what `read` returns afterwards. A non-zero value is always
    /// written.
    fn write2(&mut self, i1: usize, c1: Complex64, i2: usize, c2: Complex64);

    /// Set every amplitude to zero.
    fn clear(&mut self);

    /// Overwrite the whole vector from a linear buffer of length `capacity`.
    fn copy_in(&mut self, input: &[Complex64]);

    /// Copy the whole vector into a linear buffer of length `capacity`.
    fn copy_out(&self, output: &mut [Complex64]);

    /// Overwrite this store with the contents of another of equal capacity.
    fn copy(&mut self, other: &dyn AmplitudeStore) {
        assert_eq!(self.capacity(), other.capacity(), "store capacity mismatch");
        self.clear();
        for (i, c) in other.nonzero() {
            self.write(i, c);
        }
    }

    /// Squared magnitude of every amplitude into a buffer of length `capacity`.
    fn get_probs(&self, output: &mut [f64]);

    /// Non-zero amplitudes in ascending index order.
    fn nonzero(&self) -> Vec<(usize, Complex64)>;

    fn is_sparse(&self) -> bool;

    /// The whole vector as one contiguous slice, for backends that hold it
    /// that way.
    fn as_slice_mut(&mut self) -> Option<&mut [Complex64]> {
        None
    }

    fn is_read_locked(&self) -> bool;

    fn set_read_lock(&mut self, locked: bool);
}

/// Build the backend selected by `sparse` with `capacity` zeroed amplitudes.
pub fn new_store(capacity: usize, sparse: bool) -> Box<dyn AmplitudeStore> {
    if sparse {
        Box::new(SparseStore::new(capacity))
    } else {
        Box::new(DenseStore::new(capacity))
    }
}

/// Scoped read lock over a store.
///
/// Holds the store's read-lock flag for the lifetime of the guard and only
/// hands out shared access, so a traversal can never interleave with writes.
/// The flag is released on every exit path when the guard drops.
pub struct ReadGuard<'a> {
    store: &'a mut dyn AmplitudeStore,
}

impl<'a> ReadGuard<'a> {
    pub fn acquire(store: &'a mut dyn AmplitudeStore) -> Self {
        store.set_read_lock(true);
        ReadGuard { store }
    }
}

impl<'a> Deref for ReadGuard<'a> {
    type Target = dyn AmplitudeStore + 'a;

    fn deref(&self) -> &Self::Target {
        &*self.store
    }
}

impl Drop for ReadGuard<'_> {
    fn drop(&mut self) {
        self.store.set_read_lock(false);
    }
}

/// Dense array backend.
#[derive(Debug, Clone)]
pub struct DenseStore {
    amps: Array1<Complex64>,
    read_locked: bool,
}

impl DenseStore {
    pub fn new(capacity: usize) -> Self {
        DenseStore {
            amps: Array1::zeros(capacity),
            read_locked: false,
        }
    }
}

impl AmplitudeStore for DenseStore {
    fn capacity(&self) -> usize {
        self.amps.len()
    }

    fn read(&self, i: usize) -> Complex64 {
        self.amps[i]
    }

    fn write(&mut self, i: usize, c: Complex64) {
        debug_assert!(!self.read_locked, "write while read-locked");
        self.amps[i] = c;
    }

    fn write2(&mut self, i1: usize, c1: Complex64, i2: usize, c2: Complex64) {
        debug_assert!(!self.read_locked, "write while read-locked");
        self.amps[i1] = c1;
        self.amps[i2] = c2;
    }

    fn clear(&mut self) {
        self.amps.fill(ZERO);
    }

    fn copy_in(&mut self, input: &[Complex64]) {
        assert_eq!(input.len(), self.amps.len(), "input buffer length mismatch");
        Zip::from(&mut self.amps)
            .and(ArrayView1::from(input))
            .for_each(|amp, &c| *amp = c);
    }

    fn copy_out(&self, output: &mut [Complex64]) {
        assert_eq!(output.len(), self.amps.len(), "output buffer length mismatch");
        Zip::from(ArrayViewMut1::from(output))
            .and(&self.amps)
            .for_each(|out, &c| *out = c);
    }

    fn get_probs(&self, output: &mut [f64]) {
        assert_eq!(output.len(), self.amps.len(), "output buffer length mismatch");
        Zip::from(ArrayViewMut1::from(output))
            .and(&self.amps)
            .for_each(|p, c| *p = c.norm_sqr());
    }

    fn nonzero(&self) -> Vec<(usize, Complex64)> {
        self.amps
            .iter()
            .enumerate()
            .filter(|(_, c)| **c != ZERO)
            .map(|(i, &c)| (i, c))
            .collect()
    }

    fn is_sparse(&self) -> bool {
        false
    }

    fn as_slice_mut(&mut self) -> Option<&mut [Complex64]> {
        debug_assert!(!self.read_locked, "write while read-locked");
        self.amps.as_slice_mut()
    }

    fn is_read_locked(&self) -> bool {
        self.read_locked
    }

    fn set_read_lock(&mut self, locked: bool) {
        self.read_locked = locked;
    }
}

/// Sparse map backend. Zero amplitudes are never stored.
#[derive(Debug, Clone)]
pub struct SparseStore {
    capacity: usize,
    amps: HashMap<usize, Complex64>,
    read_locked: bool,
}

impl SparseStore {
    pub fn new(capacity: usize) -> Self {
        SparseStore {
            capacity,
            amps: HashMap::new(),
            read_locked: false,
        }
    }

    /// Number of stored (non-zero) amplitudes.
    pub fn len(&self) -> usize {
        self.amps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amps.is_empty()
    }
}

impl AmplitudeStore for SparseStore {
    fn capacity(&self) -> usize {
        self.capacity
    }

    fn read(&self, i: usize) -> Complex64 {
        assert!(i < self.capacity, "index {} out of range for capacity {}", i, self.capacity);
        self.amps.get(&i).copied().unwrap_or(ZERO)
    }

    fn write(&mut self, i: usize, c: Complex64) {
        debug_assert!(!self.read_locked, "write while read-locked");
        assert!(i < self.capacity, "index {} out of range for capacity {}", i, self.capacity);
        if c == ZERO {
            self.amps.remove(&i);
        } else {
            self.amps.insert(i, c);
        }
    }

    fn write2(&mut self, i1: usize, c1: Complex64, i2: usize, c2: Complex64) {
        self.write(i1, c1);
        self.write(i2, c2);
    }

    fn clear(&mut self) {
        self.amps.clear();
    }

    fn copy_in(&mut self, input: &[Complex64]) {
        assert_eq!(input.len(), self.capacity, "input buffer length mismatch");
        self.amps.clear();
        for (i, &c) in input.iter().enumerate() {
            if c != ZERO {
                self.amps.insert(i, c);
            }
        }
    }

    fn copy_out(&self, output: &mut [Complex64]) {
        assert_eq!(output.len(), self.capacity, "output buffer length mismatch");
        output.fill(ZERO);
        for (&i, &c) in &self.amps {
            output[i] = c;
        }
    }

    fn get_probs(&self, output: &mut [f64]) {
        assert_eq!(output.len(), self.capacity, "output buffer length mismatch");
        output.fill(0.0);
        for (&i, c) in &self.amps {
            output[i] = c.norm_sqr();
        }
    }

    fn nonzero(&self) -> Vec<(usize, Complex64)> {
        let mut entries: Vec<(usize, Complex64)> = self.amps.iter().map(|(&i, &c)| (i, c)).collect();
        entries.sort_unstable_by_key(|&(i, _)| i);
        entries
    }

    fn is_sparse(&self) -> bool {
        true
    }

    fn is_read_locked(&self) -> bool {
        self.read_locked
    }

    fn set_read_lock(&mut self, locked: bool) {
        self.read_locked = locked;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    fn backends(capacity: usize) -> Vec<Box<dyn AmplitudeStore>> {
        vec![new_store(capacity, false), new_store(capacity, true)]
    }

    #[test]
    fn test_read_write() {
        for mut store in backends(4) {
            store.write(2, c(0.5, -0.5));
            assert_eq!(store.read(2), c(0.5, -0.5));
            assert_eq!(store.read(0), ZERO);
        }
    }

    #[test]
    fn test_write2_keeps_nonzero_and_zeroes() {
        for mut store in backends(4) {
            store.write(1, c(1.0, 0.0));
            store.write2(1, ZERO, 3, c(0.0, 1.0));
            assert_eq!(store.read(1), ZERO);
            assert_eq!(store.read(3), c(0.0, 1.0));
        }
    }

    #[test]
    fn test_clear() {
        for mut store in backends(8) {
            store.write(5, c(1.0, 0.0));
            store.clear();
            assert!(store.nonzero().is_empty());
        }
    }

    #[test]
    fn test_copy_in_out() {
        let input = vec![c(0.5, 0.0), ZERO, c(0.0, 0.5), c(-0.5, 0.5)];
        for mut store in backends(4) {
            store.copy_in(&input);
            let mut out = vec![c(9.0, 9.0); 4];
            store.copy_out(&mut out);
            assert_eq!(out, input);
        }
    }

    #[test]
    fn test_copy_between_backends() {
        let mut dense = new_store(4, false);
        dense.write(3, c(0.6, 0.8));
        let mut sparse = new_store(4, true);
        sparse.write(0, c(1.0, 0.0));
        sparse.copy(dense.as_ref());
        assert_eq!(sparse.read(0), ZERO);
        assert_eq!(sparse.read(3), c(0.6, 0.8));
    }

    #[test]
    fn test_get_probs() {
        for mut store in backends(4) {
            store.write(1, c(0.6, 0.0));
            store.write(2, c(0.0, 0.8));
            let mut probs = vec![1.0; 4];
            store.get_probs(&mut probs);
            assert!((probs[0] - 0.0).abs() < 1e-12);
            assert!((probs[1] - 0.36).abs() < 1e-12);
            assert!((probs[2] - 0.64).abs() < 1e-12);
            assert!((probs[3] - 0.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_sparse_drops_zero_entries() {
        let mut store = SparseStore::new(16);
        store.write(7, c(1.0, 0.0));
        assert_eq!(store.len(), 1);
        store.write(7, ZERO);
        assert!(store.is_empty());
    }

    #[test]
    fn test_nonzero_sorted() {
        let mut store = SparseStore::new(16);
        for i in [9, 3, 12, 0] {
            store.write(i, c(1.0, 0.0));
        }
        let indices: Vec<usize> = store.nonzero().iter().map(|&(i, _)| i).collect();
        assert_eq!(indices, vec![0, 3, 9, 12]);
    }

    #[test]
    fn test_read_guard_releases_on_drop() {
        let mut store = new_store(4, false);
        {
            let guard = ReadGuard::acquire(store.as_mut());
            assert!(guard.is_read_locked());
            assert_eq!(guard.read(0), ZERO);
        }
        assert!(!store.is_read_locked());
    }

    #[test]
    fn test_slice_access_dense_only() {
        let mut dense = new_store(4, false);
        dense.as_slice_mut().unwrap()[2] = c(0.0, 1.0);
        assert_eq!(dense.read(2), c(0.0, 1.0));
        assert!(new_store(4, true).as_slice_mut().is_none());
    }

    #[test]
    fn test_is_sparse() {
        assert!(!new_store(2, false).is_sparse());
        assert!(new_store(2, true).is_sparse());
    }
}
