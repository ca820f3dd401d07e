use crate::catalog::{Effect, SkillCatalog};
use crate::config::Config;
use crate::consts::{BASIC_ATTACK_ID, BASIC_ATTACK_SLOT};
use crate::error::MacroResult;
use crate::preset::PresetConfiguration;
use crate::scheduler::{CooldownTracker, SchedulePlan, SchedulingState, SkillSlot, TaskListBuilder};
use crate::stats::{StatKind, Stats};
use std::collections::HashMap;
use std::sync::Arc;

/// Where an attack or buff came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttackSource {
    BasicAttack,
    Skill(SkillSlot),
}

impl AttackSource {
    /// Slot index with the basic attack mapped to `-1`.
    pub fn slot_index(self) -> i32 {
        match self {
            Self::BasicAttack => BASIC_ATTACK_SLOT,
            Self::Skill(slot) => slot as i32,
        }
    }
}

/// One dispatch of an equipped skill on the virtual clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimSkill {
    pub slot: SkillSlot,
    pub time: f64,
    pub combo: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimAttack {
    pub source: AttackSource,
    pub time: f64,
    pub damage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimBuff {
    pub start_time: f64,
    pub end_time: f64,
    pub stat: StatKind,
    pub value: f64,
    pub source: AttackSource,
}

impl SimBuff {
    pub fn covers(&self, t: f64) -> bool {
        self.start_time <= t && t <= self.end_time
    }
}

/// Time-sorted skill uses, attacks and buffs of one 60 s window.
#[derive(Debug, Clone, Default)]
pub struct AttackTimeline {
    pub skills: Vec<SimSkill>,
    pub attacks: Vec<SimAttack>,
    pub buffs: Vec<SimBuff>,
    /// Skill id per slot, for labelling.
    pub slot_ids: Arc<Vec<Option<String>>>,
}

impl AttackTimeline {
    pub fn source_id(&self, source: AttackSource) -> &str {
        match source {
            AttackSource::BasicAttack => BASIC_ATTACK_ID,
            AttackSource::Skill(slot) => self
                .slot_ids
                .get(slot)
                .and_then(|s| s.as_deref())
                .unwrap_or("?"),
        }
    }
}

fn round_centis(seconds: f64) -> f64 {
    (seconds * 100.0).round() / 100.0
}

/// Replays the scheduler over a virtual clock and resolves skill effects.
pub struct TimelineGenerator<'a> {
    catalog: &'a SkillCatalog,
    preset: &'a PresetConfiguration,
    config: &'a Config,
}

impl<'a> TimelineGenerator<'a> {
    pub fn new(
        catalog: &'a SkillCatalog,
        preset: &'a PresetConfiguration,
        config: &'a Config,
    ) -> Self {
        Self {
            catalog,
            preset,
            config,
        }
    }

    /// Basic attacks every `(100 - ATK_SPD)%` of the base interval.
    fn basic_attacks(&self, stats: &Stats) -> Vec<SimAttack> {
        let params = &self.config.simulation;
        let scale = ((100.0 - stats.atk_spd) * 0.01).max(0.0);
        let interval = ((scale * params.basic_attack_base_ms as f64) as u64).max(1);
        (0..params.duration_ms)
            .step_by(interval as usize)
            .map(|t| SimAttack {
                source: AttackSource::BasicAttack,
                time: round_centis(t as f64 * 0.001),
                damage: 1.0,
            })
            .collect()
    }

    /// Skill dispatch times in milliseconds.
    pub fn dispatches(&self) -> MacroResult<Vec<SimSkill>> {
        let settings = &self.config.macro_settings;
        let delay = settings.check_delay(self.preset.effective_delay_ms(settings))?;
        let reduction = settings
            .check_cooldown_reduction(self.preset.effective_cooldown_reduction(settings))?;

        let builder = TaskListBuilder::new(SchedulePlan::from_preset(self.preset));
        let tracker = CooldownTracker::from_preset(self.preset, self.catalog, reduction)?;
        let mut state = SchedulingState::new(tracker);

        let mut used = Vec::new();
        builder.drive_virtual(
            &mut state,
            0,
            self.config.simulation.duration_ms,
            delay,
            settings.unit_time_ms,
            |task, now| {
                used.push(SimSkill {
                    slot: task.slot,
                    time: round_centis(now as f64 * 0.001),
                    combo: task.combo,
                });
                true
            },
        );
        Ok(used)
    }

    pub fn generate(
        &self,
        stats: &Stats,
        skill_levels: &HashMap<String, u32>,
    ) -> MacroResult<AttackTimeline> {
        let mut attacks = self.basic_attacks(stats);
        let mut buffs = Vec::new();
        let skills = self.dispatches()?;

        let mut effects: HashMap<SkillSlot, &[Effect]> = HashMap::new();
        for slot in self.preset.equipped_slots() {
            if let Some(id) = self.preset.skill_at(slot) {
                let level = skill_levels.get(id).copied().unwrap_or(1);
                effects.insert(slot, self.catalog.effects(id, level)?);
            }
        }

        for used in &skills {
            let source = AttackSource::Skill(used.slot);
            for effect in effects.get(&used.slot).copied().unwrap_or_default() {
                match *effect {
                    Effect::Damage { time_offset, value } => attacks.push(SimAttack {
                        source,
                        time: round_centis(used.time + time_offset),
                        damage: value,
                    }),
                    Effect::Buff {
                        time_offset,
                        stat,
                        value,
                        duration,
                    } => buffs.push(SimBuff {
                        start_time: round_centis(used.time + time_offset),
                        end_time: round_centis(used.time + time_offset + duration),
                        stat,
                        value,
                        source,
                    }),
                    Effect::Heal { .. } => {}
                }
            }
        }

        attacks.sort_by(|a, b| a.time.total_cmp(&b.time));
        buffs.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));

        Ok(AttackTimeline {
            skills,
            attacks,
            buffs,
            slot_ids: Arc::new(self.preset.equipped.clone()),
        })
    }
}
