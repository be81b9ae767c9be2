/// Source indices, in output order, for moving `start..=end` after `target`.
///
/// `target == -1` moves the block to the front. A target inside the block
/// slides it right by `target - start` positions, bounded by the sequence end.
fn shifted_order(len: usize, start: usize, end: usize, target: isize) -> Vec<usize> {
    assert!(
        start <= end && end < len,
        "shift block {start}..={end} out of bounds for length {len}"
    );
    let mut order = Vec::with_capacity(len);
    let block = start..=end;

    if target < 0 {
        order.extend(block);
        order.extend(0..start);
        order.extend(end + 1..len);
    } else {
        let target = target as usize;
        if target < start {
            order.extend(0..=target);
            order.extend(block);
            order.extend(target + 1..start);
            order.extend(end + 1..len);
        } else if target > end {
            let target = target.min(len - 1);
            order.extend(0..start);
            order.extend(end + 1..=target);
            order.extend(block);
            order.extend(target + 1..len);
        } else {
            let run_end = (end + (target - start)).min(len - 1);
            order.extend(0..start);
            order.extend(end + 1..=run_end);
            order.extend(block);
            order.extend(run_end + 1..len);
        }
    }
    order
}

/// Moves `seq[start..=end]` so it lands right after position `target`.
///
/// Relative order inside the block and inside the untouched runs is kept.
pub fn perform_shift<T: Clone>(seq: &[T], start: usize, end: usize, target: isize) -> Vec<T> {
    shifted_order(seq.len(), start, end, target)
        .into_iter()
        .map(|i| seq[i].clone())
        .collect()
}

/// Same as [`perform_shift`], permuting a parallel per-token array in lock-step.
pub fn perform_shift_with<T: Clone, A: Clone>(
    seq: &[T],
    aux: &[A],
    start: usize,
    end: usize,
    target: isize,
) -> (Vec<T>, Vec<A>) {
    assert_eq!(
        seq.len(),
        aux.len(),
        "auxiliary array must have one entry per token"
    );
    let order = shifted_order(seq.len(), start, end, target);
    let shifted = order.iter().map(|&i| seq[i].clone()).collect();
    let shifted_aux = order.iter().map(|&i| aux[i].clone()).collect();
    (shifted, shifted_aux)
}
