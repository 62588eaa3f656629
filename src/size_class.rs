//! Maps byte requests to a size class `k`, where a block of class `k`
//! occupies exactly `2^k` bytes, header included.

/// Minimum size class. `2^SMALLEST_K` must be large enough to hold a block
/// header; see `block::tests::header_fits_in_the_smallest_block`.
pub const SMALLEST_K: u8 = 6;

/// Size class an arena is given when [`crate::Arena::new`] is asked for the
/// "default" size (a `requested_size` of zero).
pub const DEFAULT_K: u8 = 30;

/// Upper bound on representable size classes. [`classify`] saturates here;
/// any request this large cannot be satisfied by any arena this crate can
/// build, since an arena's class is always strictly less than `MAX_K`.
pub const MAX_K: u8 = 48;

/// Returns the smallest `k >= SMALLEST_K` such that `2^k >= bytes`.
///
/// Saturates at [`MAX_K`] when `bytes` exceeds `2^(MAX_K - 1)`; callers treat
/// that as an overflow sentinel rather than a real class.
///
/// `bytes` is expected to already include the block header's size for
/// allocation paths — callers add [`crate::block::HEADER_SIZE`] (pub(crate))
/// before classifying, so the returned class always has room for both the
/// header and the requested payload.
pub fn classify(bytes: usize) -> u8 {
    let mut k = SMALLEST_K;
    let mut size: usize = 1 << k;
    while size < bytes && k < MAX_K {
        k += 1;
        size = 1usize.checked_shl(k as u32).unwrap_or(usize::MAX);
    }
    k
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_matches_exact_powers_of_two() {
        for k in SMALLEST_K..MAX_K {
            let size = 1usize << k;
            assert_eq!(classify(size), k, "classify(2^{k}) should be {k}");
        }
    }

    #[test]
    fn classify_rounds_up_past_a_power_of_two() {
        for k in SMALLEST_K..MAX_K - 1 {
            let size = (1usize << k) + 1;
            assert_eq!(classify(size), k + 1, "classify(2^{k} + 1) should be {}", k + 1);
        }
    }

    #[test]
    fn classify_never_returns_below_smallest_k() {
        assert_eq!(classify(0), SMALLEST_K);
        assert_eq!(classify(1), SMALLEST_K);
    }

    #[test]
    fn classify_saturates_at_max_k_for_oversized_requests() {
        let huge = (1usize << (MAX_K - 1)) + 1;
        assert_eq!(classify(huge), MAX_K);
        assert_eq!(classify(usize::MAX), MAX_K);
    }

    #[test]
    fn classify_rounds_1024_and_1025_correctly() {
        assert_eq!(classify(1024), 10);
        assert_eq!(classify(1025), 11);
    }
}
