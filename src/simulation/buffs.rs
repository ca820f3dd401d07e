use super::timeline::{AttackSource, SimBuff};
use crate::stats::StatKind;
use std::cmp::Ordering;
use std::collections::BTreeMap;

type BuffKey = (AttackSource, StatKind, u64);

fn canonical_order(a: &SimBuff, b: &SimBuff) -> Ordering {
    a.start_time
        .total_cmp(&b.start_time)
        .then_with(|| a.source.cmp(&b.source))
        .then_with(|| a.stat.cmp(&b.stat))
        .then_with(|| a.value.total_cmp(&b.value))
        .then_with(|| a.end_time.total_cmp(&b.end_time))
}

/// Merges overlapping windows of the same buff into disjoint intervals.
///
/// A buff is identified by its source skill, stat and value, so a skill that
/// grants several stats keeps each of them. Touching windows
/// (`next.start == prev.end`) merge. Output is sorted by start time.
pub fn merge_buffs(buffs: &[SimBuff]) -> Vec<SimBuff> {
    let mut grouped: BTreeMap<BuffKey, Vec<SimBuff>> = BTreeMap::new();
    for buff in buffs {
        grouped
            .entry((buff.source, buff.stat, buff.value.to_bits()))
            .or_default()
            .push(*buff);
    }

    let mut merged: Vec<SimBuff> = Vec::with_capacity(buffs.len());
    for mut group in grouped.into_values() {
        group.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
        let mut iter = group.into_iter();
        let Some(mut current) = iter.next() else {
            continue;
        };
        for buff in iter {
            if buff.start_time <= current.end_time {
                current.end_time = current.end_time.max(buff.end_time);
            } else {
                merged.push(current);
                current = buff;
            }
        }
        merged.push(current);
    }

    merged.sort_by(canonical_order);
    merged
}
