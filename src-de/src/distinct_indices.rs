use rand::Rng;

/// Draw `k` distinct population indices in `0..n`, all different from `exclude`.
///
/// Requires `n > k`; the population floor (`MIN_POPULATION`) guarantees it for
/// every strategy in this crate.
pub(crate) fn distinct_indices<R: Rng + ?Sized>(
    exclude: usize,
    k: usize,
    n: usize,
    rng: &mut R,
) -> Vec<usize> {
    debug_assert!(n > k, "population of {} too small to draw {} indices", n, k);
    let mut picked = Vec::with_capacity(k);
    while picked.len() < k {
        let r = rng.random_range(0..n);
        if r != exclude && !picked.contains(&r) {
            picked.push(r);
        }
    }
    picked
}
