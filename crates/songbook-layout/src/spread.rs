//! Spread grouping
//!
//! Groups a layout plan into facing-page pairs for review. The cover sits
//! alone on the right of the first spread, the way a bound book opens, so
//! grouping works over the plan with one empty position prepended.

use crate::types::{PageSlot, Spread};

/// Group a plan into spreads, cover first.
///
/// The first spread has an empty verso and the cover as recto. A plan
/// ending on a verso leaves the last spread's recto empty. An empty plan
/// yields no spreads.
pub fn group_spreads(plan: &[PageSlot]) -> Vec<Spread> {
    if plan.is_empty() {
        return Vec::new();
    }

    let mut padded: Vec<Option<PageSlot>> = Vec::with_capacity(plan.len() + 2);
    padded.push(None);
    padded.extend(plan.iter().copied().map(Some));
    if padded.len() % 2 != 0 {
        padded.push(None);
    }

    padded
        .chunks(2)
        .map(|pair| Spread {
            verso: pair[0],
            recto: pair[1],
        })
        .collect()
}
