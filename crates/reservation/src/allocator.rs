// Copyright (c) 2023 -  Restate Software, Inc., Restate GmbH.
// All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Uniform sampling of quota numbers. Pure selection functions; the engine
//! decides what the candidate set is and what to do with the picks.

use rand::Rng;

use rifa_types::identifiers::QuotaNumber;

use crate::error::ReservationError;

/// Picks `k` distinct numbers uniformly at random from `candidates` using
/// a partial Fisher-Yates shuffle restricted to the first `k` positions.
///
/// Quota numbers carry monetary value, so callers must supply a
/// cryptographically secure generator in production paths; a predictable
/// generator would let buyers cherry-pick numbers.
pub fn pick_random<R: Rng + ?Sized>(
    mut candidates: Vec<QuotaNumber>,
    k: usize,
    rng: &mut R,
) -> Result<Vec<QuotaNumber>, ReservationError> {
    let n = candidates.len();
    if k > n {
        return Err(ReservationError::InsufficientInventory {
            requested: k as u32,
            available: n as u32,
        });
    }

    for i in 0..k {
        let j = i + rng.random_range(0..n - i);
        candidates.swap(i, j);
    }

    candidates.truncate(k);
    Ok(candidates)
}

/// Uniform choice of a single element, for the draw.
pub fn pick_one<'a, T, R: Rng + ?Sized>(items: &'a [T], rng: &mut R) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    items.get(rng.random_range(0..items.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use rifa_test_util::{assert, assert_eq, let_assert};

    fn numbers(n: u32) -> Vec<QuotaNumber> {
        (1..=n).map(QuotaNumber::new).collect()
    }

    #[test]
    fn picks_distinct_numbers_from_the_candidates() {
        let mut rng = StdRng::seed_from_u64(17);
        let candidates = numbers(100);

        let picked = pick_random(candidates.clone(), 10, &mut rng).unwrap();
        assert_eq!(picked.len(), 10);

        let distinct: HashSet<_> = picked.iter().copied().collect();
        assert_eq!(distinct.len(), 10);
        assert!(picked.iter().all(|n| candidates.contains(n)));
    }

    #[test]
    fn full_draw_is_a_permutation() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut picked = pick_random(numbers(25), 25, &mut rng).unwrap();
        picked.sort_unstable();
        assert_eq!(picked, numbers(25));
    }

    #[test]
    fn zero_request_yields_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(pick_random(Vec::new(), 0, &mut rng).unwrap(), Vec::new());
        assert_eq!(pick_random(numbers(3), 0, &mut rng).unwrap(), Vec::new());
    }

    #[test]
    fn shortfall_is_reported_with_counts() {
        let mut rng = StdRng::seed_from_u64(1);
        let result = pick_random(numbers(3), 5, &mut rng);
        let_assert!(
            Err(ReservationError::InsufficientInventory {
                requested: 5,
                available: 3,
            }) = result
        );
    }

    #[test]
    fn every_candidate_is_reachable() {
        // coarse uniformity check: over many draws of 1 out of 8, every
        // candidate must come up
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = HashSet::new();
        for _ in 0..1_000 {
            let picked = pick_random(numbers(8), 1, &mut rng).unwrap();
            seen.insert(picked[0]);
        }
        assert_eq!(seen.len(), 8);
    }

    #[test]
    fn pick_one_covers_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        let empty: [QuotaNumber; 0] = [];
        assert!(pick_one(&empty, &mut rng).is_none());

        let single = [QuotaNumber::new(9)];
        assert_eq!(pick_one(&single, &mut rng), Some(&QuotaNumber::new(9)));
    }
}
