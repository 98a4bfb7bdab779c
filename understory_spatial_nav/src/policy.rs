// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Candidate ranking policies.
//!
//! The engine hands a policy the origin rectangle, a direction, and a
//! read-only [`FocusSpace`] of sibling candidates. The policy returns the
//! winner, or `None` when no candidate qualifies, in which case the engine
//! escalates one level up the tree.

use alloc::vec::Vec;
use core::cmp::Ordering;

use kurbo::Rect;

use crate::geometry::{
    Direction, OVERLAP_THRESHOLD, is_ahead, line_segment, overlaps_by, primary_axis_distance,
    secondary_axis_distance,
};

/// A single candidate within a [`FocusSpace`].
#[derive(Clone, Debug)]
pub struct FocusEntry<K> {
    /// Identifier for this candidate.
    pub id: K,
    /// Bounds in the shared coordinate space of the surrounding [`FocusSpace`].
    pub rect: Rect,
    /// Whether this candidate may receive focus.
    ///
    /// Disabled entries are skipped by policies.
    pub enabled: bool,
}

/// A read-only view of candidates.
///
/// Policies should treat it as an immutable snapshot, and all entries must use
/// the same coordinate space as the origin rectangle.
#[derive(Clone, Debug)]
pub struct FocusSpace<'a, K> {
    /// Candidates in collection order.
    pub nodes: &'a [FocusEntry<K>],
}

/// Trait for directional ranking policies.
pub trait FocusPolicy<K>
where
    K: Copy + Eq,
{
    /// Pick the next focus target when leaving `origin` in `direction`.
    fn next(&self, origin: Rect, direction: Direction, space: &FocusSpace<'_, K>) -> Option<K>;
}

/// Weighted edge-distance policy.
///
/// Each candidate that is not behind the origin is scored from the origin's
/// leading edge and the candidate's near edge:
///
/// - If the edges overlap on the cross axis, the movement-axis distance is the
///   primary term and the cross-axis gap the secondary term.
/// - Otherwise the roles swap.
///
/// `score = (primary * main_coordinate_weight + secondary + 1) / w`, where `w`
/// is `overlap_weight` for overlapping candidates and `separate_gap_weight`
/// otherwise. The lowest score wins and ties keep collection order.
#[derive(Copy, Clone, Debug)]
pub struct DefaultPolicy {
    /// Fraction of the origin edge a candidate must cover to overlap.
    pub overlap_threshold: f64,
    /// Multiplier for the primary distance term.
    pub main_coordinate_weight: f64,
    /// Divisor applied to overlapping candidates.
    pub overlap_weight: f64,
    /// Divisor applied to non-overlapping candidates.
    pub separate_gap_weight: f64,
}

impl Default for DefaultPolicy {
    fn default() -> Self {
        Self {
            overlap_threshold: OVERLAP_THRESHOLD,
            main_coordinate_weight: 5.0,
            overlap_weight: 5.0,
            separate_gap_weight: 1.0,
        }
    }
}

impl DefaultPolicy {
    /// Score `candidate` relative to `origin`; lower is better.
    pub fn priority(&self, origin: Rect, candidate: Rect, direction: Direction) -> f64 {
        let is_vertical = direction.is_vertical();
        let origin_segment = line_segment(direction, false, origin);
        let dest_segment = line_segment(direction, true, candidate);
        let overlap = overlaps_by(
            &origin_segment,
            &dest_segment,
            is_vertical,
            self.overlap_threshold,
        );

        let along = primary_axis_distance(&origin_segment, &dest_segment, is_vertical);
        let gap = secondary_axis_distance(&origin_segment, &dest_segment, is_vertical);
        let (primary, secondary) = if overlap { (along, gap) } else { (gap, along) };

        // +1 keeps the overlap divisor meaningful at zero distance.
        let total = primary * self.main_coordinate_weight + secondary;
        let weight = if overlap {
            self.overlap_weight
        } else {
            self.separate_gap_weight
        };
        (total + 1.0) / weight
    }

    /// All qualifying candidates, best first.
    ///
    /// The sort is stable, so equal scores keep collection order.
    pub fn ranked<K: Copy>(
        &self,
        origin: Rect,
        direction: Direction,
        space: &FocusSpace<'_, K>,
    ) -> Vec<(K, f64)> {
        let mut scored: Vec<(K, f64)> = space
            .nodes
            .iter()
            .filter(|e| e.enabled && is_ahead(direction, origin, e.rect))
            .map(|e| (e.id, self.priority(origin, e.rect, direction)))
            .filter(|(_, score)| score.is_finite())
            .collect();
        scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
        scored
    }
}

impl<K> FocusPolicy<K> for DefaultPolicy
where
    K: Copy + Eq,
{
    fn next(&self, origin: Rect, direction: Direction, space: &FocusSpace<'_, K>) -> Option<K> {
        let mut best: Option<(K, f64)> = None;
        for entry in space.nodes {
            if !entry.enabled || !is_ahead(direction, origin, entry.rect) {
                continue;
            }
            let score = self.priority(origin, entry.rect, direction);
            if !score.is_finite() {
                continue;
            }
            #[cfg(feature = "tracing")]
            tracing::trace!(%direction, score, "candidate priority");
            // Strictly lower only, so the earliest of equal scores is kept.
            if best.is_none_or(|(_, s)| score < s) {
                best = Some((entry.id, score));
            }
        }
        best.map(|(id, _)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn entry(id: u32, left: f64, top: f64, width: f64, height: f64) -> FocusEntry<u32> {
        FocusEntry {
            id,
            rect: Rect::new(left, top, left + width, top + height),
            enabled: true,
        }
    }

    #[test]
    fn overlapping_candidate_beats_diagonal_one() {
        let origin = Rect::new(0.0, 0.0, 10.0, 10.0);
        let entries = vec![
            // Diagonal, closer along x.
            entry(1, 12.0, 30.0, 10.0, 10.0),
            // In line, further along x.
            entry(2, 40.0, 0.0, 10.0, 10.0),
        ];
        let space = FocusSpace { nodes: &entries };
        assert_eq!(DefaultPolicy::default().next(origin, Direction::Right, &space), Some(2));
    }

    #[test]
    fn nearer_in_line_candidate_wins() {
        let origin = Rect::new(0.0, 0.0, 10.0, 10.0);
        let entries = vec![entry(1, 40.0, 0.0, 10.0, 10.0), entry(2, 20.0, 0.0, 10.0, 10.0)];
        let space = FocusSpace { nodes: &entries };
        assert_eq!(DefaultPolicy::default().next(origin, Direction::Right, &space), Some(2));
    }

    #[test]
    fn candidates_behind_the_origin_are_ignored() {
        let origin = Rect::new(0.0, 0.0, 10.0, 10.0);
        let entries = vec![entry(1, -30.0, 0.0, 10.0, 10.0)];
        let space = FocusSpace { nodes: &entries };
        let policy = DefaultPolicy::default();
        assert_eq!(policy.next(origin, Direction::Right, &space), None);
        assert_eq!(policy.next(origin, Direction::Left, &space), Some(1));
    }

    #[test]
    fn disabled_entries_are_skipped() {
        let origin = Rect::new(0.0, 0.0, 10.0, 10.0);
        let mut near = entry(1, 20.0, 0.0, 10.0, 10.0);
        near.enabled = false;
        let entries = vec![near, entry(2, 60.0, 0.0, 10.0, 10.0)];
        let space = FocusSpace { nodes: &entries };
        assert_eq!(DefaultPolicy::default().next(origin, Direction::Right, &space), Some(2));
    }

    #[test]
    fn ties_keep_collection_order() {
        let origin = Rect::new(0.0, 20.0, 10.0, 30.0);
        // Mirror images above and below the origin's row.
        let entries = vec![entry(7, 20.0, 0.0, 10.0, 10.0), entry(3, 20.0, 40.0, 10.0, 10.0)];
        let space = FocusSpace { nodes: &entries };
        let policy = DefaultPolicy::default();
        assert_eq!(policy.next(origin, Direction::Right, &space), Some(7));
        let ranked = policy.ranked(origin, Direction::Right, &space);
        assert_eq!(ranked.iter().map(|(id, _)| *id).collect::<Vec<_>>(), vec![7, 3]);
    }

    #[test]
    fn priority_formula() {
        let policy = DefaultPolicy::default();
        let origin = Rect::new(0.0, 0.0, 10.0, 10.0);
        // Overlapping: along = 10, gap = 0 -> (10 * 5 + 0 + 1) / 5.
        let p = policy.priority(origin, Rect::new(20.0, 0.0, 30.0, 10.0), Direction::Right);
        assert_eq!(p, 51.0 / 5.0);
        // Not overlapping: gap = 10 is primary, along = 10 secondary -> (50 + 10 + 1) / 1.
        let p = policy.priority(origin, Rect::new(20.0, 20.0, 30.0, 30.0), Direction::Right);
        assert_eq!(p, 61.0);
    }
}
