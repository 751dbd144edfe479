//! Bitmask indexing utilities.
//!
//! A bit position `b` is handled as its power `1 << b`. Gates and probability
//! queries name a sorted set of "special" powers; the functions here map a
//! dense loop counter over the remaining `N - K` bits to a full basis index
//! without ever building an N-bit multi-index.

/// Power of a bit position.
#[inline]
pub fn pow2(bit: usize) -> usize {
    1usize << bit
}

/// Mask covering `length` contiguous bits starting at `start`.
///
/// # Example
/// ```
/// use qreg_rs::index::reg_mask;
/// assert_eq!(reg_mask(2, 3), 0b11100);
/// ```
#[inline]
pub fn reg_mask(start: usize, length: usize) -> usize {
    ((1usize << length) - 1) << start
}

/// Powers of `bits`, sorted ascending.
///
/// Duplicate bits are a caller error.
pub fn sorted_powers(bits: &[usize]) -> Vec<usize> {
    let mut powers: Vec<usize> = bits.iter().map(|&b| pow2(b)).collect();
    powers.sort_unstable();
    debug_assert!(
        powers.windows(2).all(|w| w[0] < w[1]),
        "duplicate bit in {:?}",
        bits
    );
    powers
}

/// Powers of the set bits of `mask`, ascending.
pub fn mask_powers(mask: usize) -> Vec<usize> {
    let mut powers = Vec::with_capacity(mask.count_ones() as usize);
    let mut v = mask;
    while v != 0 {
        let low = v & v.wrapping_neg();
        powers.push(low);
        v ^= low;
    }
    powers
}

/// Powers of the clear bits of `mask` that lie below its highest set bit.
///
/// Inserting zeros at these positions spreads a dense counter over exactly
/// the set bits of `mask`.
///
/// # Example
/// ```
/// use qreg_rs::index::skip_powers;
/// assert_eq!(skip_powers(0b10110), vec![0b00001, 0b01000]);
/// ```
pub fn skip_powers(mask: usize) -> Vec<usize> {
    let mut powers = Vec::new();
    let mut v = !mask;
    while v != 0 {
        let low = v & v.wrapping_neg();
        if low >= mask {
            break;
        }
        powers.push(low);
        v ^= low;
    }
    powers
}

/// Insert a zero bit at each of `sorted_powers` into `value`.
///
/// Processes the powers low to high: the bits of `value` below the current
/// power stay put, everything above shifts left by one. With no powers the
/// value is returned unchanged.
///
/// # Example
/// ```
/// use qreg_rs::index::insert_zero_bits;
/// // 0b111 with zeros inserted at bit 1 and bit 3
/// assert_eq!(insert_zero_bits(0b111, &[0b10, 0b1000]), 0b10101);
/// ```
#[inline]
pub fn insert_zero_bits(value: usize, sorted_powers: &[usize]) -> usize {
    let mut high = value;
    let mut index = 0usize;
    for &power in sorted_powers {
        let low = high & (power - 1);
        index |= low;
        high = (high ^ low) << 1;
        if high == 0 {
            break;
        }
    }
    index | high
}

/// Spread the low bits of `value` over the set bits of `mask`, in order.
///
/// This is the inverse of [`gather_bits`] and enumerates every assignment of
/// the bits inside `mask` as `value` runs over `0..2^popcount(mask)`.
///
/// # Example
/// ```
/// use qreg_rs::index::scatter_bits;
/// assert_eq!(scatter_bits(0b11, 0b1010), 0b1010);
/// assert_eq!(scatter_bits(0b01, 0b1010), 0b0010);
/// ```
pub fn scatter_bits(value: usize, mask: usize) -> usize {
    insert_zero_bits(value, &skip_powers(mask))
}

/// Pack the bits of `index` at the set bits of `mask` into a dense value.
pub fn gather_bits(index: usize, mask: usize) -> usize {
    gather_powers(index, &mask_powers(mask))
}

/// [`gather_bits`] with the mask already split by [`mask_powers`].
#[inline]
pub fn gather_powers(index: usize, powers: &[usize]) -> usize {
    powers
        .iter()
        .enumerate()
        .filter(|&(_, &power)| index & power != 0)
        .fold(0usize, |acc, (p, _)| acc | (1usize << p))
}

/// Iterate the basis indices of an `n_qubits` register whose bits at
/// `sorted_powers` equal the corresponding bits of `fixed`.
///
/// Yields `2^(n_qubits - K)` indices in ascending order.
///
/// # Example
/// ```
/// use qreg_rs::index::iter_fixed;
/// // bit 1 fixed to 1 in a 2-qubit register: |10> and |11>
/// let indices: Vec<usize> = iter_fixed(2, &[0b10], 0b10).collect();
/// assert_eq!(indices, vec![2, 3]);
/// ```
pub fn iter_fixed<'a>(
    n_qubits: usize,
    sorted_powers: &'a [usize],
    fixed: usize,
) -> impl Iterator<Item = usize> + 'a {
    let count = 1usize << (n_qubits - sorted_powers.len());
    (0..count).map(move |lcv| insert_zero_bits(lcv, sorted_powers) | fixed)
}
