use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Reference subsequences that could serve as shift destinations.
///
/// Every run of reference tokens that all occur somewhere in the hypothesis,
/// up to `max_block` tokens long, is keyed by its exact contents and maps to
/// the ascending reference offsets where that run starts.
#[derive(Debug, Clone)]
pub struct MatchIndex<'r, T> {
    locations: HashMap<&'r [T], Vec<usize>>,
}

impl<'r, T: Eq + Hash> MatchIndex<'r, T> {
    pub fn build(hyp: &[T], reference: &'r [T], max_block: usize) -> Self {
        let hyp_tokens: HashSet<&T> = hyp.iter().collect();
        let coverable: Vec<bool> = reference.iter().map(|t| hyp_tokens.contains(t)).collect();

        let mut locations: HashMap<&'r [T], Vec<usize>> = HashMap::new();
        for start in 0..reference.len() {
            let mut end = start;
            while end < reference.len() && end - start < max_block && coverable[end] {
                // Starts are visited in ascending order, so each list stays sorted.
                locations
                    .entry(&reference[start..=end])
                    .or_default()
                    .push(start);
                end += 1;
            }
        }

        Self { locations }
    }

    /// Reference offsets where `block` occurs, if it is indexed.
    pub fn offsets(&self, block: &[T]) -> Option<&[usize]> {
        self.locations.get(block).map(Vec::as_slice)
    }
}

impl<T> MatchIndex<'_, T> {
    /// Number of distinct indexed blocks.
    pub(crate) fn len(&self) -> usize {
        self.locations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(s: &str) -> Vec<&str> {
        s.split_whitespace().collect()
    }

    #[test]
    fn indexes_runs_of_coverable_tokens() {
        let hyp = words("b a c");
        let reference = words("a b x a b");
        let index = MatchIndex::build(&hyp, &reference, 10);

        assert_eq!(index.offsets(&["a"]), Some(&[0usize, 3][..]));
        assert_eq!(index.offsets(&["a", "b"]), Some(&[0usize, 3][..]));
        assert_eq!(index.offsets(&["b"]), Some(&[1usize, 4][..]));
        // "x" is absent from the hypothesis and breaks the run.
        assert!(index.offsets(&["x"]).is_none());
        assert!(index.offsets(&["b", "x"]).is_none());
        assert!(index.offsets(&["a", "b", "x"]).is_none());
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn block_length_is_capped() {
        let hyp = words("a b c d");
        let reference = words("a b c d");
        let index = MatchIndex::build(&hyp, &reference, 2);
        assert!(index.offsets(&["a", "b"]).is_some());
        assert!(index.offsets(&["a", "b", "c"]).is_none());
        assert_eq!(index.len(), 7);
    }

    #[test]
    fn zero_block_size_indexes_nothing() {
        let hyp = words("a b");
        let reference = words("a b");
        let index = MatchIndex::build(&hyp, &reference, 0);
        assert_eq!(index.len(), 0);
    }

    #[test]
    fn offsets_leave_room_for_the_block() {
        let hyp = words("a b a b c a");
        let reference = words("a b c a b a b c");
        let index = MatchIndex::build(&hyp, &reference, 4);
        for size in 1..=4 {
            for start in 0..=reference.len() - size {
                let block = &reference[start..start + size];
                if let Some(offsets) = index.offsets(block) {
                    assert!(offsets.iter().all(|&o| o + size <= reference.len()));
                    assert!(offsets.windows(2).all(|w| w[0] < w[1]));
                }
            }
        }
    }
}
