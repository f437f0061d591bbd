use std::iter::FusedIterator;

use log::trace;

use crate::ecs::{component::IdSet, registry::Id};

/// Lazy enumeration of the subsets of an [`IdSet`], from most to least specific.
///
/// For a set of `n` ids the order is:
///
/// 1. the full set;
/// 2. for each size `k` from `n` down to 1, every combination of `k` index positions in
///    ascending lexicographic order (`0, 1, .., k - 1` first).
///
/// Step 2 starts with the full set again, so a non-empty set is emitted twice and the total is
/// `2^n` emissions. An empty set yields exactly one emission, the empty set.
///
/// Only the current index combination is held; every subset is built on demand.
///
/// ```rust,ignore
/// let subsets: Vec<_> = IdSet::new([Id::new(1), Id::new(3)]).subsets().collect();
/// // {1, 3}, {1, 3}, {1}, {3}
/// ```
#[derive(Debug, Clone)]
pub struct Subsets<'a> {
    ids: &'a [Id],
    state: State,
}

#[derive(Debug, Clone)]
enum State {
    /// The leading full-set emission.
    Full,
    /// Walking the combinations of `indices.len()` positions.
    Combining { indices: Vec<usize> },
    Done,
}

impl<'a> Subsets<'a> {
    /// Enumerate the subsets of `ids`, which must be ascending and duplicate free.
    #[inline]
    pub(crate) fn new(ids: &'a [Id]) -> Self {
        Self {
            ids,
            state: State::Full,
        }
    }
}

impl Iterator for Subsets<'_> {
    type Item = IdSet;

    fn next(&mut self) -> Option<IdSet> {
        let subset = match std::mem::replace(&mut self.state, State::Done) {
            State::Done => return None,
            State::Full => {
                if !self.ids.is_empty() {
                    self.state = State::Combining {
                        indices: (0..self.ids.len()).collect(),
                    };
                }
                IdSet::from_sorted(self.ids.to_vec())
            }
            State::Combining { mut indices } => {
                let subset = indices.iter().map(|&i| self.ids[i]).collect();

                if advance(&mut indices, self.ids.len()) {
                    self.state = State::Combining { indices };
                } else if indices.len() > 1 {
                    // Next size down, starting from the first combination.
                    let k = indices.len() - 1;
                    indices.clear();
                    indices.extend(0..k);
                    self.state = State::Combining { indices };
                }

                IdSet::from_sorted(subset)
            }
        };

        trace!("subset {:?} of {:?}", subset.ids(), self.ids);
        Some(subset)
    }
}

impl FusedIterator for Subsets<'_> {}

/// Step `indices` to the next combination of `0..n` in lexicographic order.
///
/// Returns false when `indices` already holds the last combination.
fn advance(indices: &mut [usize], n: usize) -> bool {
    let k = indices.len();
    // Right-most position that has not reached its maximum of `n - k + i`.
    let Some(i) = (0..k).rev().find(|&i| indices[i] < n - k + i) else {
        return false;
    };

    indices[i] += 1;
    for j in i + 1..k {
        indices[j] = indices[j - 1] + 1;
    }
    true
}
