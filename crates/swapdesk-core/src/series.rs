//! Triangular sums `1 + 2 + … + n`.
//!
//! Four interchangeable implementations. Each returns `None` when the sum does
//! not fit in a `u64`, which happens for every `n > 6_074_000_999`.

/// Largest `n` whose triangular sum fits in a `u64`.
pub const MAX_SUMMABLE: u64 = 6_074_000_999;

/// Folds over `1..=n`.
pub fn sum_to_n_iter(n: u64) -> Option<u64> {
    (1..=n).try_fold(0u64, u64::checked_add)
}

/// Accumulates in an explicit loop.
pub fn sum_to_n_loop(n: u64) -> Option<u64> {
    let mut total: u64 = 0;
    let mut i = 0;
    while i <= n {
        total = total.checked_add(i)?;
        if i == u64::MAX {
            break;
        }
        i += 1;
    }
    Some(total)
}

/// Pairs terms from both ends (`1 + n`, `2 + (n - 1)`, …) and adds the middle
/// term once when `n` is odd.
pub fn sum_to_n_pairs(n: u64) -> Option<u64> {
    let mut total: u64 = 0;
    let (mut start, mut end) = (1, n);
    while start < end {
        total = total.checked_add(start.checked_add(end)?)?;
        start += 1;
        end -= 1;
    }
    if start == end {
        total = total.checked_add(start)?;
    }
    Some(total)
}

/// Closed form `n * (n + 1) / 2`, halving whichever factor is even first so
/// the intermediate product does not overflow early.
pub fn sum_to_n_formula(n: u64) -> Option<u64> {
    let next = n.checked_add(1)?;
    if n % 2 == 0 {
        (n / 2).checked_mul(next)
    } else {
        n.checked_mul(next / 2)
    }
}
