use super::SkillSlot;
use crate::catalog::SkillCatalog;
use crate::error::MacroResult;
use crate::preset::PresetConfiguration;

/// Per-slot cooldown timers on an integer millisecond clock.
///
/// Cooldowns are scaled by the reduction once, at construction, so every
/// readiness check is an exact integer comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CooldownTracker {
    cooldowns_ms: Vec<Option<u64>>,
    last_used_at: Vec<Option<u64>>,
}

impl CooldownTracker {
    /// `None` entries are empty slots and never become ready.
    pub fn new(cooldowns_ms: Vec<Option<u64>>) -> Self {
        let last_used_at = vec![None; cooldowns_ms.len()];
        Self {
            cooldowns_ms,
            last_used_at,
        }
    }

    /// The reduction must already be clamped to the configured bounds.
    pub fn from_preset(
        preset: &PresetConfiguration,
        catalog: &SkillCatalog,
        reduction_pct: u32,
    ) -> MacroResult<Self> {
        debug_assert!(reduction_pct < 100, "cooldown reduction must be pre-clamped");
        let mut cooldowns = Vec::with_capacity(preset.equipped.len());
        for slot in 0..preset.equipped.len() {
            cooldowns.push(match preset.skill_at(slot) {
                Some(id) => Some(catalog.get(id)?.cooldown_ms(reduction_pct)),
                None => None,
            });
        }
        Ok(Self::new(cooldowns))
    }

    pub fn slot_count(&self) -> usize {
        self.cooldowns_ms.len()
    }

    pub fn cooldown_ms(&self, slot: SkillSlot) -> Option<u64> {
        self.cooldowns_ms.get(slot).copied().flatten()
    }

    pub fn mark_used(&mut self, slot: SkillSlot, now_ms: u64) {
        if let Some(t) = self.last_used_at.get_mut(slot) {
            *t = Some(now_ms);
        }
    }

    /// Absolute time the slot (re)becomes ready. A never-used slot is ready at 0.
    pub fn ready_at(&self, slot: SkillSlot) -> Option<u64> {
        let cooldown = self.cooldown_ms(slot)?;
        Some(match self.last_used_at[slot] {
            Some(used) => used.saturating_add(cooldown),
            None => 0,
        })
    }

    pub fn is_ready(&self, slot: SkillSlot, now_ms: u64) -> bool {
        self.ready_at(slot).is_some_and(|at| now_ms >= at)
    }

    pub fn remaining_ms(&self, slot: SkillSlot, now_ms: u64) -> Option<u64> {
        self.ready_at(slot).map(|at| at.saturating_sub(now_ms))
    }
}
