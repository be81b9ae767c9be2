use std::hash::Hash;

use crate::alignment::cost::CostModel;
use crate::alignment::match_index::MatchIndex;
use crate::types::{AlignmentOp, Shift};

/// Which positions the current alignment gets wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ErrorPattern {
    /// Working positions taking part in a substitution or insertion.
    pub herr: Vec<bool>,
    /// Reference positions taking part in a substitution or deletion.
    pub rerr: Vec<bool>,
    /// Working position aligned to each reference position. For deletions
    /// this is the last working position consumed before the gap (`-1` at
    /// the front).
    pub ralign: Vec<isize>,
}

impl ErrorPattern {
    pub fn from_path(path: &[AlignmentOp], hyp_len: usize, ref_len: usize) -> Self {
        let mut herr = vec![false; hyp_len];
        let mut rerr = vec![false; ref_len];
        let mut ralign = vec![-1isize; ref_len];

        let mut hpos: isize = -1;
        let mut rpos: isize = -1;
        for op in path {
            if op.advances_hyp() {
                hpos += 1;
            }
            if op.advances_ref() {
                rpos += 1;
            }
            match op {
                AlignmentOp::Match => {
                    herr[hpos as usize] = false;
                    rerr[rpos as usize] = false;
                    ralign[rpos as usize] = hpos;
                }
                AlignmentOp::Substitute => {
                    herr[hpos as usize] = true;
                    rerr[rpos as usize] = true;
                    ralign[rpos as usize] = hpos;
                }
                AlignmentOp::Insert => {
                    herr[hpos as usize] = true;
                }
                AlignmentOp::Delete => {
                    rerr[rpos as usize] = true;
                    ralign[rpos as usize] = hpos;
                }
            }
        }

        Self { herr, rerr, ralign }
    }
}

/// Limits on which shifts are generated.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ShiftLimits {
    pub max_size: usize,
    pub max_dist: usize,
}

/// Candidate shifts grouped by block size: `classes[k]` holds blocks of
/// `k + 1` tokens, in generation order.
pub(crate) fn gather_candidates<T, C>(
    working: &[T],
    index: &MatchIndex<'_, T>,
    errors: &ErrorPattern,
    cost_model: &C,
    limits: ShiftLimits,
) -> Vec<Vec<Shift<T>>>
where
    T: Eq + Hash + Clone,
    C: CostModel<T> + ?Sized,
{
    if limits.max_size == 0 || limits.max_dist == 0 {
        return Vec::new();
    }

    let max_dist = limits.max_dist as isize;
    let ralign = &errors.ralign;
    let mut classes: Vec<Vec<Shift<T>>> = (0..limits.max_size).map(|_| Vec::new()).collect();

    for start in 0..working.len() {
        let Some(first_offsets) = index.offsets(&working[start..=start]) else {
            continue;
        };
        let s = start as isize;
        let reachable = first_offsets.iter().any(|&m| {
            ralign[m] != s && ralign[m] - s <= max_dist && s - ralign[m] - 1 <= max_dist
        });
        if !reachable {
            continue;
        }

        let mut extendable = true;
        let mut end = start;
        while extendable && end < working.len() && end < start + limits.max_size {
            let block = &working[start..=end];
            let e = end as isize;
            extendable = false;
            let Some(offsets) = index.offsets(block) else {
                end += 1;
                continue;
            };

            // Moving an already-correct block cannot pay for itself.
            if !errors.herr[start..=end].iter().any(|&err| err) {
                extendable = true;
                end += 1;
                continue;
            }

            for &moveto in offsets {
                let target = ralign[moveto];
                if target == s || (s..=e).contains(&target) {
                    continue;
                }
                if target - s > max_dist || s - target > max_dist {
                    continue;
                }
                extendable = true;

                let size = end - start + 1;
                if !errors.rerr[moveto..moveto + size].iter().any(|&err| err) {
                    continue;
                }

                for roff in -1..=(end - start) as isize {
                    let dest = moveto as isize + roff;
                    let (moveto_at, newloc) = if roff == -1 && moveto == 0 {
                        (-1, -1)
                    } else {
                        let newloc = ralign[dest as usize];
                        if newloc == s || (roff != 0 && newloc == target) {
                            continue;
                        }
                        (dest, newloc)
                    };
                    let mut shift = Shift {
                        start,
                        end,
                        moveto: moveto_at,
                        newloc,
                        moved: block.to_vec(),
                        cost: 0.0,
                    };
                    shift.cost = cost_model.shift_cost(&shift);
                    classes[end - start].push(shift);
                }
            }
            end += 1;
        }
    }

    classes
}
