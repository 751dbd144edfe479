use qreg_rs::index::{
    gather_bits, insert_zero_bits, iter_fixed, mask_powers, scatter_bits, skip_powers, sorted_powers,
};

/// Every index of an `n`-bit register whose bits under `mask` equal `fixed`,
/// found by filtering all `2^n` indices.
fn brute_force(n: usize, mask: usize, fixed: usize) -> Vec<usize> {
    (0..1usize << n).filter(|i| i & mask == fixed).collect()
}

/// All subsets of `0..n` as bit lists.
fn subsets(n: usize) -> Vec<Vec<usize>> {
    (0..1usize << n)
        .map(|m| (0..n).filter(|b| m & (1 << b) != 0).collect())
        .collect()
}

#[test]
fn test_iter_fixed_matches_brute_force() {
    for n in 0..=6 {
        for bits in subsets(n) {
            let powers = sorted_powers(&bits);
            let mask: usize = powers.iter().sum();
            // every assignment of the special bits
            for v in 0..1usize << bits.len() {
                let fixed = scatter_bits(v, mask);
                let got: Vec<usize> = iter_fixed(n, &powers, fixed).collect();
                assert_eq!(got, brute_force(n, mask, fixed), "n={} bits={:?} fixed={:b}", n, bits, fixed);
            }
        }
    }
}

#[test]
fn test_insert_zero_bits_is_monotone_bijection() {
    // the counter maps one-to-one and in order onto indices with zero special bits
    let n = 7;
    for bits in [vec![0], vec![6], vec![1, 4], vec![0, 1, 2], vec![2, 3, 5, 6]] {
        let powers = sorted_powers(&bits);
        let mask: usize = powers.iter().sum();
        let got: Vec<usize> = (0..1usize << (n - bits.len()))
            .map(|c| insert_zero_bits(c, &powers))
            .collect();
        assert_eq!(got, brute_force(n, mask, 0));
    }
}

#[test]
fn test_scatter_enumerates_mask_subsets_in_order() {
    for mask in 0usize..64 {
        let expected: Vec<usize> = (0..64).filter(|i| i & !mask == 0).collect();
        let got: Vec<usize> = (0..1usize << mask.count_ones())
            .map(|v| scatter_bits(v, mask))
            .collect();
        assert_eq!(got, expected, "mask={:b}", mask);
    }
}

#[test]
fn test_gather_inverts_scatter() {
    for mask in 0usize..128 {
        for i in (0..128).filter(|i| i & !mask == 0) {
            assert_eq!(scatter_bits(gather_bits(i, mask), mask), i);
        }
    }
}

#[test]
fn test_skip_and_mask_powers_partition_span() {
    for mask in 1usize..256 {
        let top = 1usize << (usize::BITS - 1 - mask.leading_zeros());
        let skip: usize = skip_powers(mask).iter().sum();
        let set: usize = mask_powers(mask).iter().sum();
        assert_eq!(skip & set, 0);
        assert_eq!(skip | set, (top << 1) - 1);
    }
}
