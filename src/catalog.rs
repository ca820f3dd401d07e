use crate::error::{MacroError, MacroResult};
use crate::stats::StatKind;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// One timed effect of a skill level. Parsed once when the catalog loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Effect {
    Damage {
        #[serde(default, alias = "time")]
        time_offset: f64,
        #[serde(alias = "damage")]
        value: f64,
    },
    Heal {
        #[serde(default, alias = "time")]
        time_offset: f64,
        value: f64,
    },
    Buff {
        #[serde(default, alias = "time")]
        time_offset: f64,
        stat: StatKind,
        value: f64,
        duration: f64,
    },
}

impl Effect {
    pub fn time_offset(&self) -> f64 {
        match self {
            Self::Damage { time_offset, .. }
            | Self::Heal { time_offset, .. }
            | Self::Buff { time_offset, .. } => *time_offset,
        }
    }
}

fn default_combo_count() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillDef {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(alias = "cooltime")]
    pub cooldown_seconds: f64,
    /// How many times one readiness window may be spent across combos.
    #[serde(default = "default_combo_count")]
    pub max_combo_count: u32,
    /// Casting skills need a confirming click after the key press.
    #[serde(default)]
    pub is_casting: bool,
    pub levels: BTreeMap<u32, Vec<Effect>>,
}

impl SkillDef {
    /// Effective cooldown in whole milliseconds after a percent reduction.
    pub fn cooldown_ms(&self, reduction_pct: u32) -> u64 {
        debug_assert!(reduction_pct < 100, "cooldown reduction must be pre-clamped");
        (self.cooldown_seconds * f64::from(100 - reduction_pct) * 10.0) as u64
    }

    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

/// Read-only registry of skill definitions keyed by id.
#[derive(Debug, Clone, Default)]
pub struct SkillCatalog {
    skills: HashMap<String, SkillDef>,
}

impl SkillCatalog {
    pub fn from_skills(defs: Vec<SkillDef>) -> MacroResult<Self> {
        let mut skills = HashMap::with_capacity(defs.len());
        for def in defs {
            if def.cooldown_seconds.is_nan() || def.cooldown_seconds < 0.0 {
                return Err(MacroError::Validation(format!(
                    "skill '{}' has invalid cooldown {}",
                    def.id, def.cooldown_seconds
                )));
            }
            if def.max_combo_count == 0 {
                return Err(MacroError::Validation(format!(
                    "skill '{}' has max_combo_count 0",
                    def.id
                )));
            }
            if skills.contains_key(&def.id) {
                return Err(MacroError::Validation(format!(
                    "duplicate skill id '{}'",
                    def.id
                )));
            }
            skills.insert(def.id.clone(), def);
        }
        Ok(Self { skills })
    }

    pub fn from_reader<R: Read>(reader: R) -> MacroResult<Self> {
        let defs: Vec<SkillDef> = serde_json::from_reader(reader)?;
        Self::from_skills(defs)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> MacroResult<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn get(&self, id: &str) -> MacroResult<&SkillDef> {
        self.skills
            .get(id)
            .ok_or_else(|| MacroError::UnknownSkill(id.to_string()))
    }

    pub fn effects(&self, id: &str, level: u32) -> MacroResult<&[Effect]> {
        let def = self.get(id)?;
        def.levels
            .get(&level)
            .map(Vec::as_slice)
            .ok_or_else(|| MacroError::UnknownSkillLevel {
                skill: id.to_string(),
                level,
            })
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.skills.keys().map(String::as_str)
    }
}
