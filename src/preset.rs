use crate::catalog::SkillCatalog;
use crate::config::MacroSettings;
use crate::error::{MacroError, MacroResult};
use crate::scheduler::SkillSlot;
use crate::stats::Stats;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;
use strum_macros::{Display, EnumString};
use tracing::warn;

/// Per-skill switches. `priority == 0` means unranked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsageSetting {
    pub use_automatically: bool,
    pub use_alone: bool,
    pub priority: u32,
}

impl Default for UsageSetting {
    fn default() -> Self {
        Self {
            use_automatically: true,
            use_alone: false,
            priority: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LinkUseType {
    Auto,
    Manual,
}

/// A user-defined combo. A slot may repeat when its skill allows several
/// uses per readiness window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSkillDef {
    pub use_type: LinkUseType,
    #[serde(default)]
    pub key: Option<String>,
    pub member_slots: Vec<SkillSlot>,
}

impl LinkSkillDef {
    /// Distinct slots, in first-appearance order.
    pub fn requirement(&self) -> Vec<SkillSlot> {
        let mut seen = BTreeSet::new();
        self.member_slots
            .iter()
            .copied()
            .filter(|s| seen.insert(*s))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkSkillWarning {
    /// `link` uses `skill` `used` times but one window only allows `max`.
    ExceedsComboCount {
        link: usize,
        skill: String,
        used: u32,
        max: u32,
    },
}

impl std::fmt::Display for LinkSkillWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExceedsComboCount {
                link,
                skill,
                used,
                max,
            } => write!(
                f,
                "link skill #{} exceeds usable combo count for '{}' ({} > {})",
                link, skill, used, max
            ),
        }
    }
}

/// Target-side inputs of the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct SimDetails {
    pub normal_naegong: i64,
    pub boss_naegong: i64,
    pub potion_heal: u32,
}

impl Default for SimDetails {
    fn default() -> Self {
        Self {
            normal_naegong: 10,
            boss_naegong: 10,
            potion_heal: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PresetConfiguration {
    pub name: String,
    /// Skill id per slot; `None` is an empty slot.
    pub equipped: Vec<Option<String>>,
    /// In-game hotkey per slot.
    pub skill_keys: Vec<String>,
    pub usage: HashMap<String, UsageSetting>,
    pub link_skills: Vec<LinkSkillDef>,
    pub use_custom_delay: bool,
    pub custom_delay_ms: u64,
    pub use_custom_cooldown_reduction: bool,
    pub custom_cooldown_reduction: u32,
    pub stats: Stats,
    pub skill_levels: HashMap<String, u32>,
    pub sim_details: SimDetails,
}

impl Default for PresetConfiguration {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            equipped: vec![None; 6],
            skill_keys: ["1", "2", "3", "4", "5", "6"]
                .iter()
                .map(|k| k.to_string())
                .collect(),
            usage: HashMap::new(),
            link_skills: Vec::new(),
            use_custom_delay: false,
            custom_delay_ms: 150,
            use_custom_cooldown_reduction: false,
            custom_cooldown_reduction: 0,
            stats: Stats::default(),
            skill_levels: HashMap::new(),
            sim_details: SimDetails::default(),
        }
    }
}

impl PresetConfiguration {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> MacroResult<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn skill_at(&self, slot: SkillSlot) -> Option<&str> {
        self.equipped.get(slot).and_then(|s| s.as_deref())
    }

    pub fn slot_of(&self, skill: &str) -> Option<SkillSlot> {
        self.equipped
            .iter()
            .position(|s| s.as_deref() == Some(skill))
    }

    pub fn equipped_slots(&self) -> Vec<SkillSlot> {
        (0..self.equipped.len())
            .filter(|&s| self.equipped[s].is_some())
            .collect()
    }

    pub fn usage_of(&self, skill: &str) -> UsageSetting {
        self.usage.get(skill).copied().unwrap_or_default()
    }

    pub fn skill_level(&self, skill: &str) -> u32 {
        self.skill_levels.get(skill).copied().unwrap_or(1)
    }

    pub fn effective_delay_ms(&self, settings: &MacroSettings) -> u64 {
        if self.use_custom_delay {
            self.custom_delay_ms
        } else {
            settings.default_delay_ms
        }
    }

    pub fn effective_cooldown_reduction(&self, settings: &MacroSettings) -> u32 {
        if self.use_custom_cooldown_reduction {
            self.custom_cooldown_reduction
        } else {
            settings.default_cooldown_reduction
        }
    }

    /// Requirements of the automatic combos, in declaration order.
    pub fn auto_link_requirements(&self) -> Vec<Vec<SkillSlot>> {
        self.link_skills
            .iter()
            .filter(|l| l.use_type == LinkUseType::Auto)
            .map(LinkSkillDef::requirement)
            .collect()
    }

    /// Member lists of the automatic combos, aligned with `auto_link_requirements`.
    pub fn auto_link_members(&self) -> Vec<Vec<SkillSlot>> {
        self.link_skills
            .iter()
            .filter(|l| l.use_type == LinkUseType::Auto)
            .map(|l| l.member_slots.clone())
            .collect()
    }

    /// Equipped slots ordered by `(ranked first, priority, equip index)`.
    pub fn skill_sequence(&self) -> Vec<SkillSlot> {
        let mut slots = self.equipped_slots();
        slots.sort_by_key(|&slot| {
            let priority = self
                .skill_at(slot)
                .map(|id| self.usage_of(id).priority)
                .unwrap_or(0);
            (priority == 0, priority, slot)
        });
        slots
    }

    fn max_priority(&self) -> u32 {
        self.usage.values().map(|u| u.priority).max().unwrap_or(0)
    }

    /// Ranks an unranked skill last, or unranks a ranked one and closes the gap.
    pub fn toggle_priority(&mut self, skill: &str) -> MacroResult<u32> {
        if self.slot_of(skill).is_none() {
            return Err(MacroError::Validation(format!(
                "cannot rank '{}': not equipped",
                skill
            )));
        }
        let current = self.usage_of(skill).priority;
        if current == 0 {
            let next = self.max_priority() + 1;
            self.usage.entry(skill.to_string()).or_default().priority = next;
            Ok(next)
        } else {
            self.clear_priority(skill);
            Ok(0)
        }
    }

    /// Removes a rank and shifts every higher rank down by one.
    pub fn clear_priority(&mut self, skill: &str) {
        let removed = match self.usage.get_mut(skill) {
            Some(u) if u.priority != 0 => std::mem::take(&mut u.priority),
            _ => return,
        };
        for setting in self.usage.values_mut() {
            if setting.priority > removed {
                setting.priority -= 1;
            }
        }
    }

    /// Empties a slot, dropping its rank and every combo that referenced it.
    pub fn unequip(&mut self, slot: SkillSlot) -> Option<String> {
        let removed = self.equipped.get_mut(slot)?.take()?;
        self.clear_priority(&removed);
        self.link_skills.retain(|l| !l.member_slots.contains(&slot));
        Some(removed)
    }

    pub fn link_skill_warnings(&self, catalog: &SkillCatalog) -> Vec<LinkSkillWarning> {
        let mut warnings = Vec::new();
        for (idx, link) in self.link_skills.iter().enumerate() {
            let mut counts: HashMap<SkillSlot, u32> = HashMap::new();
            for &slot in &link.member_slots {
                *counts.entry(slot).or_default() += 1;
            }
            let mut slots: Vec<_> = counts.into_iter().collect();
            slots.sort_unstable();
            for (slot, used) in slots {
                let Some(id) = self.skill_at(slot) else {
                    continue;
                };
                let Ok(def) = catalog.get(id) else {
                    continue;
                };
                if used > def.max_combo_count {
                    let w = LinkSkillWarning::ExceedsComboCount {
                        link: idx,
                        skill: id.to_string(),
                        used,
                        max: def.max_combo_count,
                    };
                    warn!("⚠️  {}", w);
                    warnings.push(w);
                }
            }
        }
        warnings
    }

    /// Hard consistency checks the core relies on.
    pub fn validate(&self, settings: &MacroSettings, catalog: &SkillCatalog) -> MacroResult<()> {
        settings.check_delay(self.effective_delay_ms(settings))?;
        settings.check_cooldown_reduction(self.effective_cooldown_reduction(settings))?;

        if self.skill_keys.len() < self.equipped.len() {
            return Err(MacroError::Validation(format!(
                "{} slots but only {} skill keys",
                self.equipped.len(),
                self.skill_keys.len()
            )));
        }

        let mut seen = BTreeSet::new();
        for id in self.equipped.iter().flatten() {
            if !seen.insert(id.as_str()) {
                return Err(MacroError::Validation(format!(
                    "skill '{}' equipped twice",
                    id
                )));
            }
            catalog.effects(id, self.skill_level(id))?;
        }

        let mut ranks: Vec<u32> = Vec::new();
        for (id, setting) in &self.usage {
            if setting.priority == 0 {
                continue;
            }
            if self.slot_of(id).is_none() {
                return Err(MacroError::Validation(format!(
                    "skill '{}' has priority {} but is not equipped",
                    id, setting.priority
                )));
            }
            ranks.push(setting.priority);
        }
        ranks.sort_unstable();
        if ranks.iter().enumerate().any(|(i, &p)| p as usize != i + 1) {
            return Err(MacroError::Validation(format!(
                "priorities must be 1..=n without gaps, got {:?}",
                ranks
            )));
        }

        for (idx, link) in self.link_skills.iter().enumerate() {
            if link.member_slots.is_empty() {
                return Err(MacroError::Validation(format!(
                    "link skill #{} has no members",
                    idx
                )));
            }
            if let Some(&slot) = link.member_slots.iter().find(|&&s| self.skill_at(s).is_none()) {
                return Err(MacroError::Validation(format!(
                    "link skill #{} references empty slot {}",
                    idx, slot
                )));
            }
        }

        let bad = self.stats.out_of_range();
        if !bad.is_empty() {
            return Err(MacroError::Validation(format!(
                "stats out of range: {:?}",
                bad
            )));
        }
        Ok(())
    }
}
