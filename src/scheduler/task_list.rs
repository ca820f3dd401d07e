use super::cooldown::CooldownTracker;
use super::link::match_requirements;
use super::SkillSlot;
use crate::preset::PresetConfiguration;
use std::collections::{BTreeSet, VecDeque};
use tracing::debug;

/// A slot waiting for dispatch. `combo` is the index of the automatic link
/// skill that queued it, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Task {
    pub slot: SkillSlot,
    pub combo: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Combo(usize),
    Single(SkillSlot),
    Nothing,
}

/// Mutable scheduling state of one run. Never shared between runs or trials.
#[derive(Debug, Clone)]
pub struct SchedulingState {
    pub tracker: CooldownTracker,
    pub ready: BTreeSet<SkillSlot>,
    pub queue: VecDeque<Task>,
}

impl SchedulingState {
    pub fn new(tracker: CooldownTracker) -> Self {
        Self {
            tracker,
            ready: BTreeSet::new(),
            queue: VecDeque::new(),
        }
    }

    pub fn is_queued(&self, slot: SkillSlot) -> bool {
        self.queue.iter().any(|t| t.slot == slot)
    }

    /// Pops the next task and starts its cooldown.
    pub fn dispatch_next(&mut self, now_ms: u64) -> Option<Task> {
        let task = self.queue.pop_front()?;
        self.tracker.mark_used(task.slot, now_ms);
        Some(task)
    }

    /// Earliest time a cooling slot becomes ready, ignoring slots already
    /// ready or queued.
    pub fn next_ready_at(&self, slots: &[SkillSlot]) -> Option<u64> {
        slots
            .iter()
            .filter(|&&s| !self.ready.contains(&s) && !self.is_queued(s))
            .filter_map(|&s| self.tracker.ready_at(s))
            .min()
    }
}

/// Static, per-run view of a preset: which slots exist, in which order they
/// are scanned, and which combos run automatically.
#[derive(Debug, Clone)]
pub struct SchedulePlan {
    pub equipped: Vec<SkillSlot>,
    pub sequence: Vec<SkillSlot>,
    pub requirements: Vec<Vec<SkillSlot>>,
    pub members: Vec<Vec<SkillSlot>>,
    link_members: BTreeSet<SkillSlot>,
    use_automatically: Vec<bool>,
    use_alone: Vec<bool>,
}

impl SchedulePlan {
    pub fn from_preset(preset: &PresetConfiguration) -> Self {
        let requirements = preset.auto_link_requirements();
        let link_members = requirements.iter().flatten().copied().collect();
        let (use_automatically, use_alone) = (0..preset.equipped.len())
            .map(|slot| match preset.skill_at(slot) {
                Some(id) => {
                    let usage = preset.usage_of(id);
                    (usage.use_automatically, usage.use_alone)
                }
                None => (false, false),
            })
            .unzip();
        Self {
            equipped: preset.equipped_slots(),
            sequence: preset.skill_sequence(),
            members: preset.auto_link_members(),
            requirements,
            link_members,
            use_automatically,
            use_alone,
        }
    }

    pub fn is_link_member(&self, slot: SkillSlot) -> bool {
        self.link_members.contains(&slot)
    }

    /// Whether a ready slot may be queued on its own.
    pub fn usable_alone(&self, slot: SkillSlot) -> bool {
        if self.is_link_member(slot) {
            self.use_alone[slot]
        } else {
            self.use_automatically[slot]
        }
    }
}

/// Appends at most one combo, or one single skill, to the queue per tick.
#[derive(Debug, Clone)]
pub struct TaskListBuilder {
    plan: SchedulePlan,
}

impl TaskListBuilder {
    pub fn new(plan: SchedulePlan) -> Self {
        Self { plan }
    }

    pub fn plan(&self) -> &SchedulePlan {
        &self.plan
    }

    fn refresh_ready(&self, state: &mut SchedulingState, now_ms: u64) {
        for &slot in &self.plan.equipped {
            if state.ready.contains(&slot) || state.is_queued(slot) {
                continue;
            }
            if state.tracker.is_ready(slot, now_ms) {
                state.ready.insert(slot);
            }
        }
    }

    pub fn tick(&self, state: &mut SchedulingState, now_ms: u64) -> TickOutcome {
        self.refresh_ready(state, now_ms);

        // Matching runs on a scratch copy: only the first prepared combo is
        // queued, the others keep their slots for the next tick.
        let mut scratch = state.ready.clone();
        let prepared = match_requirements(&mut scratch, &self.plan.requirements);
        if let Some(&combo) = prepared.first() {
            for slot in &self.plan.requirements[combo] {
                state.ready.remove(slot);
            }
            for &slot in &self.plan.members[combo] {
                state.queue.push_back(Task {
                    slot,
                    combo: Some(combo),
                });
            }
            debug!(combo, now_ms, "queued link skill");
            return TickOutcome::Combo(combo);
        }

        let pick = self
            .plan
            .sequence
            .iter()
            .copied()
            .find(|&slot| state.ready.contains(&slot) && self.plan.usable_alone(slot));
        match pick {
            Some(slot) => {
                state.ready.remove(&slot);
                state.queue.push_back(Task { slot, combo: None });
                debug!(slot, now_ms, "queued skill");
                TickOutcome::Single(slot)
            }
            None => TickOutcome::Nothing,
        }
    }

    /// Replays the builder on a virtual clock over `[start_ms, end_ms)`.
    ///
    /// The builder is consulted only when the queue is empty. Each dispatch
    /// advances the clock by `delay_ms`; an idle clock jumps to the next
    /// `unit_ms` tick at which some slot comes off cooldown, and stops when
    /// no slot is cooling. `on_dispatch` returns `false` to stop early.
    pub fn drive_virtual<F>(
        &self,
        state: &mut SchedulingState,
        start_ms: u64,
        end_ms: u64,
        delay_ms: u64,
        unit_ms: u64,
        mut on_dispatch: F,
    ) where
        F: FnMut(Task, u64) -> bool,
    {
        let unit_ms = unit_ms.max(1);
        let mut now = start_ms;
        while now < end_ms {
            if state.queue.is_empty() {
                self.tick(state, now);
            }
            if let Some(task) = state.dispatch_next(now) {
                if !on_dispatch(task, now) {
                    return;
                }
                now += delay_ms;
                continue;
            }
            match state.next_ready_at(&self.plan.equipped) {
                Some(at) => {
                    let aligned = at.div_ceil(unit_ms) * unit_ms;
                    now = aligned.max(now + unit_ms);
                }
                None => return,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::{LinkSkillDef, LinkUseType, UsageSetting};

    fn plan_for(n: usize, links: Vec<Vec<SkillSlot>>) -> (SchedulePlan, PresetConfiguration) {
        let mut preset = PresetConfiguration {
            equipped: (0..n).map(|i| Some(format!("s{}", i))).collect(),
            ..Default::default()
        };
        for members in links {
            preset.link_skills.push(LinkSkillDef {
                use_type: LinkUseType::Auto,
                key: None,
                member_slots: members,
            });
        }
        (SchedulePlan::from_preset(&preset), preset)
    }

    #[test]
    fn test_refresh_skips_queued_slots() {
        let (plan, _) = plan_for(2, vec![]);
        let builder = TaskListBuilder::new(plan);
        let mut state = SchedulingState::new(CooldownTracker::new(vec![Some(0), Some(0)]));
        assert_eq!(builder.tick(&mut state, 0), TickOutcome::Single(0));
        // Slot 0 is queued but unused: it must not come back as ready.
        assert_eq!(builder.tick(&mut state, 10), TickOutcome::Single(1));
        assert_eq!(builder.tick(&mut state, 20), TickOutcome::Nothing);
        assert_eq!(state.queue.len(), 2);
    }

    #[test]
    fn test_link_member_without_use_alone_is_never_queued_alone() {
        let (_, mut preset) = plan_for(3, vec![vec![0, 1]]);
        preset.usage.insert(
            "s2".into(),
            UsageSetting {
                use_automatically: false,
                ..Default::default()
            },
        );
        // Slot 1 is never ready, so the combo can't fire.
        let plan = SchedulePlan::from_preset(&preset);
        let builder = TaskListBuilder::new(plan);
        let mut state =
            SchedulingState::new(CooldownTracker::new(vec![Some(1000), None, Some(1000)]));
        assert_eq!(builder.tick(&mut state, 0), TickOutcome::Nothing);
        assert!(state.ready.contains(&0));
    }
}
