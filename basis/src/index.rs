//! Packed indices for permutationally symmetric integral storage.

/// Index of the unordered pair (i, j) in a lower-triangle packing.
#[inline]
pub fn index2(i: usize, j: usize) -> usize {
    if i >= j {
        i * (i + 1) / 2 + j
    } else {
        j * (j + 1) / 2 + i
    }
}

/// Index of (ij|kl) with the full 8-fold permutational symmetry folded out.
#[inline]
pub fn index4(i: usize, j: usize, k: usize, l: usize) -> usize {
    index2(index2(i, j), index2(k, l))
}

/// Number of unique (ij|kl) for `n` basis functions.
pub fn n_unique_eri(n: usize) -> usize {
    let npair = n * (n + 1) / 2;
    npair * (npair + 1) / 2
}
