use super::SkillSlot;
use std::collections::BTreeSet;

/// Greedy combo matching in declaration order.
///
/// A requirement is prepared when all of its slots are in `ready`; its slots
/// are then removed before the next requirement is checked, so an earlier
/// combo wins any slot it shares with a later one. Returns the prepared
/// indices in declaration order.
pub fn match_requirements(
    ready: &mut BTreeSet<SkillSlot>,
    requirements: &[Vec<SkillSlot>],
) -> Vec<usize> {
    let mut prepared = Vec::new();
    for (idx, req) in requirements.iter().enumerate() {
        if req.is_empty() || !req.iter().all(|s| ready.contains(s)) {
            continue;
        }
        for slot in req {
            ready.remove(slot);
        }
        prepared.push(idx);
    }
    prepared
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_declared_combo_wins_shared_slot() {
        let mut ready: BTreeSet<_> = [0, 1, 2].into_iter().collect();
        let reqs = vec![vec![0, 1], vec![1, 2], vec![2]];
        let prepared = match_requirements(&mut ready, &reqs);
        assert_eq!(prepared, vec![0, 2]);
        assert!(ready.is_empty());
    }

    #[test]
    fn test_incomplete_combo_leaves_ready_untouched() {
        let mut ready: BTreeSet<_> = [0, 3].into_iter().collect();
        let prepared = match_requirements(&mut ready, &[vec![0, 1]]);
        assert!(prepared.is_empty());
        assert_eq!(ready.len(), 2);
    }
}
