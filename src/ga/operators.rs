//! Feasibility-preserving genetic operators for [`GraphChromosome`].
//!
//! # Crossover
//!
//! - **Order**: rank-sum merge. Activities are sorted by the sum of their
//!   positions across all parents. A precedence pair ordered the same way in
//!   every parent keeps that order in the child, so topological validity is
//!   inherited.
//! - **Matching**: slot-by-slot reconciliation. For every slot (in random
//!   order) a random parent's resource is imposed on the other candidates;
//!   a resource already claimed elsewhere is chased along the chain of
//!   claims until a free one closes the cycle.
//!
//! # Mutation
//!
//! Both mutations act on an *unrelated section*: a maximal contiguous window
//! of the order containing no precedence-linked pair, grown outwards from a
//! random position.
//! - **Order mutation** shuffles a random sub-window of the section.
//! - **Resource mutation** re-matches the activities of a random sub-window
//!   under shuffled per-resource weights, raising the weight of every
//!   resource just used so later activities in the window prefer others.

use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;

use super::chromosome::{GraphChromosome, UNSCORED};
use super::transform::PrecedenceGraph;
use super::types::MutationRates;
use crate::error::MspspError;

// ======================== Crossover operators ========================

/// Merges parent orders by ascending position sum.
///
/// Ties are broken by activity index so the result is deterministic.
pub fn rank_sum_order(orders: &[&[usize]]) -> Vec<usize> {
    let n = orders.first().map_or(0, |o| o.len());
    let mut rank_sum = vec![0usize; n];
    for order in orders {
        for (pos, &act) in order.iter().enumerate() {
            rank_sum[act] += pos;
        }
    }
    let mut merged: Vec<usize> = (0..n).collect();
    merged.sort_by_key(|&act| (rank_sum[act], act));
    merged
}

/// Reconciles per-slot resource assignments of several parents into one.
///
/// Every input must be a valid matching of the same requirement graph; the
/// result is then a valid matching too, since it is only ever rearranged by
/// moving resources along chains of conflicting claims.
pub fn reconcile_matching<R: Rng>(assignments: &[&[usize]], rng: &mut R) -> Vec<usize> {
    let mut targets: Vec<Vec<usize>> = assignments.iter().map(|a| a.to_vec()).collect();
    if targets.len() < 2 {
        return targets.pop().unwrap_or_default();
    }

    let mut slots: Vec<usize> = (0..targets[0].len()).collect();
    slots.shuffle(rng);
    for slot in slots {
        let lead_idx = rng.random_range(0..targets.len());
        let lead = targets[lead_idx].clone();
        for (k, target) in targets.iter_mut().enumerate() {
            if k != lead_idx && target[slot] != lead[slot] {
                adopt_slot(&lead, target, slot);
            }
        }
    }

    targets.swap_remove(0)
}

/// Makes `target[slot] == lead[slot]`, displacing along the claim chain.
fn adopt_slot(lead: &[usize], target: &mut [usize], slot: usize) {
    let mut j = slot;
    while let Some(claimant) = target.iter().position(|&r| r == lead[j]) {
        target[j] = lead[j];
        j = claimant;
    }
    target[j] = lead[j];
}

/// Produces an unscored child of age zero from one or more parents.
///
/// All parents must share the same transformed instance.
pub fn recombine<R: Rng>(parents: &[&GraphChromosome], rng: &mut R) -> GraphChromosome {
    debug_assert!(!parents.is_empty(), "recombine needs at least one parent");
    let first = parents[0];
    debug_assert!(parents
        .iter()
        .all(|p| Arc::ptr_eq(&p.context, &first.context)));

    let orders: Vec<&[usize]> = parents.iter().map(|p| p.order.as_slice()).collect();
    let order = rank_sum_order(&orders);

    let matching = (0..first.matching.len())
        .map(|act| {
            let per_parent: Vec<&[usize]> =
                parents.iter().map(|p| p.matching[act].as_slice()).collect();
            reconcile_matching(&per_parent, rng)
        })
        .collect();

    GraphChromosome::new(Arc::clone(&first.context), order, matching)
}

// ======================== Mutation operators ========================

/// Finds a maximal window `[start, end]` of `order` around a random position
/// such that no two activities inside are precedence-linked.
///
/// Grows one side at a time (randomly while both are open); a side closes
/// as soon as its next activity is a direct predecessor or successor of
/// something already inside. Since the order is topological, any indirect
/// link would run through an activity between the two, so checking direct
/// neighbors is enough.
pub fn unrelated_section<R: Rng>(
    order: &[usize],
    precedence: &PrecedenceGraph,
    rng: &mut R,
) -> (usize, usize) {
    let n = order.len();
    if n == 0 {
        return (0, 0);
    }
    let mut start = rng.random_range(0..n);
    let mut end = start;
    let mut newest = order[start];
    let mut excluded = vec![false; precedence.len()];
    let mut open_start = start > 0;
    let mut open_end = end + 1 < n;

    while open_start || open_end {
        for nb in precedence.neighbors(newest) {
            excluded[nb] = true;
        }
        if open_start && (!open_end || rng.random_bool(0.5)) {
            let candidate = order[start - 1];
            if excluded[candidate] {
                open_start = false;
            } else {
                start -= 1;
                newest = candidate;
                open_start = start > 0;
            }
        } else {
            let candidate = order[end + 1];
            if excluded[candidate] {
                open_end = false;
            } else {
                end += 1;
                newest = candidate;
                open_end = end + 1 < n;
            }
        }
    }

    (start, end)
}

/// Picks a random sub-window `[s, e]` within `[start, end]`.
fn random_subwindow<R: Rng>(start: usize, end: usize, rng: &mut R) -> (usize, usize) {
    let length = rng.random_range(0..=end - start);
    let s = rng.random_range(start..=end - length);
    (s, s + length)
}

/// Shuffles a random sub-window of an unrelated section of the order.
pub fn order_mutation<R: Rng>(chromosome: &mut GraphChromosome, rng: &mut R) {
    if chromosome.order.len() < 2 {
        return;
    }
    let (start, end) = unrelated_section(&chromosome.order, &chromosome.context.precedence, rng);
    let (s, e) = random_subwindow(start, end, rng);
    chromosome.order[s..=e].shuffle(rng);
}

/// Re-matches the activities of a random unrelated window.
///
/// Resources get a shuffled rank `1..=n_resources` as weight; after each
/// activity the weights of the resources it took grow by a random amount in
/// `1..=2·n_resources`.
///
/// # Errors
/// [`MspspError::Internal`] if a matching cannot saturate its slots, which
/// transform-time checks rule out.
pub fn resource_mutation<R: Rng>(
    chromosome: &mut GraphChromosome,
    rng: &mut R,
) -> Result<(), MspspError> {
    if chromosome.order.is_empty() {
        return Ok(());
    }
    let context = Arc::clone(&chromosome.context);
    let (start, end) = unrelated_section(&chromosome.order, &context.precedence, rng);
    let (s, e) = random_subwindow(start, end, rng);

    let mut activities = chromosome.order[s..=e].to_vec();
    activities.shuffle(rng);

    let n_res = context.n_resources() as i64;
    let mut weights: Vec<i64> = (1..=n_res).collect();
    weights.shuffle(rng);

    for act in activities {
        let matched = context.requirements[act]
            .min_weight_matching(|_, res| weights[res])
            .ok_or_else(|| {
                MspspError::Internal(format!(
                    "resource mutation left activity {act} unsaturated"
                ))
            })?;
        for &res in &matched {
            weights[res] += rng.random_range(1..=2 * n_res);
        }
        chromosome.matching[act] = matched;
    }

    Ok(())
}

/// Applies order and resource mutation, each with its own probability.
///
/// The score is invalidated; callers rescore afterwards.
pub fn mutate<R: Rng>(
    chromosome: &mut GraphChromosome,
    rates: MutationRates,
    rng: &mut R,
) -> Result<(), MspspError> {
    if rng.random::<f64>() < rates.activity {
        order_mutation(chromosome, rng);
    }
    if rng.random::<f64>() < rates.resource {
        resource_mutation(chromosome, rng)?;
    }
    chromosome.score = UNSCORED;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::transform::{transform, TransformedInstance};
    use crate::models::Instance;
    use crate::validation::is_valid;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    /// Two chains 0→1→2 and 3→4, plus a free activity 5; three skills.
    fn sample_context() -> Arc<TransformedInstance> {
        let inst = Instance::new(3)
            .with_activity(2, vec![1, 0, 0])
            .with_activity(3, vec![0, 1, 1])
            .with_activity(1, vec![2, 0, 0])
            .with_activity(4, vec![0, 0, 1])
            .with_activity(2, vec![1, 1, 0])
            .with_activity(3, vec![0, 2, 0])
            .with_resource(vec![true, true, false])
            .with_resource(vec![true, false, true])
            .with_resource(vec![false, true, true])
            .with_resource(vec![true, true, true])
            .with_precedence(0, 1)
            .with_precedence(1, 2)
            .with_precedence(3, 4)
            .with_default_eligibility();
        transform(inst).unwrap()
    }

    #[test]
    fn test_rank_sum_order() {
        let a = [0, 3, 1, 4, 2, 5];
        let b = [3, 0, 4, 5, 1, 2];
        // sums: 0→1, 1→6, 2→9, 3→1, 4→5, 5→8
        assert_eq!(rank_sum_order(&[&a, &b]), vec![0, 3, 4, 1, 5, 2]);
    }

    #[test]
    fn test_rank_sum_single_parent_is_identity() {
        let a = [2, 0, 1];
        assert_eq!(rank_sum_order(&[&a]), vec![2, 0, 1]);
    }

    #[test]
    fn test_reconcile_identical_parents() {
        let mut rng = SmallRng::seed_from_u64(1);
        let m = [4, 1, 7];
        assert_eq!(reconcile_matching(&[&m, &m, &m], &mut rng), vec![4, 1, 7]);
    }

    #[test]
    fn test_reconcile_yields_permutation_of_claims() {
        let mut rng = SmallRng::seed_from_u64(5);
        // Same resource pool, different slot assignment.
        let a = [1, 2, 3, 4];
        let b = [2, 3, 4, 1];
        for _ in 0..20 {
            let mut m = reconcile_matching(&[&a, &b], &mut rng);
            m.sort_unstable();
            assert_eq!(m, vec![1, 2, 3, 4]);
        }
    }

    #[test]
    fn test_adopt_slot_chain() {
        let lead = [1, 2, 3];
        let mut target = vec![2, 3, 1];
        adopt_slot(&lead, &mut target, 0);
        assert_eq!(target[0], 1);
        let mut sorted = target.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![1, 2, 3]);
    }

    #[test]
    fn test_adopt_slot_free_resource() {
        let lead = [9, 2];
        let mut target = vec![5, 2];
        adopt_slot(&lead, &mut target, 0);
        assert_eq!(target, vec![9, 2]);
    }

    #[test]
    fn test_recombine_keeps_invariants() {
        let ctx = sample_context();
        let mut rng = SmallRng::seed_from_u64(42);
        for parent_count in 1..=4 {
            for _ in 0..20 {
                let parents: Vec<GraphChromosome> = (0..parent_count)
                    .map(|_| GraphChromosome::random(&ctx, &mut rng).unwrap())
                    .collect();
                let refs: Vec<&GraphChromosome> = parents.iter().collect();
                let child = recombine(&refs, &mut rng);
                assert!(child.is_valid());
                assert_eq!(child.age, 0);
                assert_eq!(child.score, UNSCORED);
            }
        }
    }

    #[test]
    fn test_recombine_identical_parents() {
        let ctx = sample_context();
        let mut rng = SmallRng::seed_from_u64(9);
        let parent = GraphChromosome::random(&ctx, &mut rng).unwrap();
        let child = recombine(&[&parent, &parent], &mut rng);
        assert_eq!(child.order, parent.order);
        assert_eq!(child.matching, parent.matching);
        assert!(child.is_valid());
    }

    #[test]
    fn test_unrelated_section_has_no_links() {
        let ctx = sample_context();
        let mut rng = SmallRng::seed_from_u64(11);
        for _ in 0..100 {
            let ch = GraphChromosome::random(&ctx, &mut rng).unwrap();
            let (start, end) = unrelated_section(&ch.order, &ctx.precedence, &mut rng);
            assert!(start <= end && end < ch.order.len());
            let window = &ch.order[start..=end];
            for &a in window {
                for nb in ctx.precedence.neighbors(a) {
                    assert!(!window.contains(&nb));
                }
            }
        }
    }

    #[test]
    fn test_unrelated_section_unconstrained_spans_all() {
        let inst = Instance::new(1)
            .with_activity(1, vec![1])
            .with_activity(1, vec![1])
            .with_activity(1, vec![1])
            .with_resource(vec![true])
            .with_default_eligibility();
        let ctx = transform(inst).unwrap();
        let mut rng = SmallRng::seed_from_u64(2);
        for _ in 0..20 {
            assert_eq!(unrelated_section(&[2, 0, 1], &ctx.precedence, &mut rng), (0, 2));
        }
    }

    #[test]
    fn test_unrelated_section_on_chain_is_single() {
        let inst = Instance::new(1)
            .with_activity(1, vec![1])
            .with_activity(1, vec![1])
            .with_activity(1, vec![1])
            .with_resource(vec![true])
            .with_precedence(0, 1)
            .with_precedence(1, 2)
            .with_default_eligibility();
        let ctx = transform(inst).unwrap();
        let mut rng = SmallRng::seed_from_u64(2);
        for _ in 0..20 {
            let (s, e) = unrelated_section(&[0, 1, 2], &ctx.precedence, &mut rng);
            assert_eq!(s, e);
        }
    }

    #[test]
    fn test_order_mutation_keeps_topology() {
        let ctx = sample_context();
        let mut rng = SmallRng::seed_from_u64(17);
        let mut ch = GraphChromosome::random(&ctx, &mut rng).unwrap();
        let mut changed = false;
        for _ in 0..200 {
            let before = ch.order.clone();
            order_mutation(&mut ch, &mut rng);
            assert!(ch.is_valid());
            changed |= before != ch.order;
        }
        assert!(changed, "order mutation should eventually reorder something");
    }

    #[test]
    fn test_resource_mutation_keeps_matching_valid() {
        let ctx = sample_context();
        let mut rng = SmallRng::seed_from_u64(23);
        let mut ch = GraphChromosome::random(&ctx, &mut rng).unwrap();
        let original = ch.matching.clone();
        let mut changed = false;
        for _ in 0..200 {
            resource_mutation(&mut ch, &mut rng).unwrap();
            assert!(ch.is_valid());
            changed |= ch.matching != original;
        }
        assert!(changed, "resource mutation should eventually re-staff something");
    }

    #[test]
    fn test_mutate_rescored_schedule_is_feasible() {
        let ctx = sample_context();
        let mut rng = SmallRng::seed_from_u64(31);
        let rates = MutationRates {
            activity: 1.0,
            resource: 1.0,
        };
        let mut ch = GraphChromosome::random(&ctx, &mut rng).unwrap();
        for _ in 0..50 {
            mutate(&mut ch, rates, &mut rng).unwrap();
            assert_eq!(ch.score, UNSCORED);
            assert!(ch.is_valid());
            assert!(is_valid(&ch.to_schedule(), &ctx.instance));
        }
    }

    #[test]
    fn test_mutate_with_zero_rates_is_noop() {
        let ctx = sample_context();
        let mut rng = SmallRng::seed_from_u64(37);
        let rates = MutationRates {
            activity: 0.0,
            resource: 0.0,
        };
        let mut ch = GraphChromosome::random(&ctx, &mut rng).unwrap();
        let before = (ch.order.clone(), ch.matching.clone());
        mutate(&mut ch, rates, &mut rng).unwrap();
        assert_eq!((ch.order.clone(), ch.matching.clone()), before);
    }
}
