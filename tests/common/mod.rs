#![allow(dead_code)] // Not every test binary uses every helper.

use skillmacro::api::MacroEngine;
use skillmacro::catalog::{Effect, SkillCatalog, SkillDef};
use skillmacro::config::Config;
use skillmacro::preset::{LinkSkillDef, LinkUseType, PresetConfiguration, UsageSetting};
use skillmacro::scheduler::{CancelToken, Clock, KeySink};
use skillmacro::stats::{StatKind, Stats};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Builder for SkillDef to keep catalogs short in tests.
pub struct SkillBuilder {
    def: SkillDef,
}

impl SkillBuilder {
    pub fn new(id: &str, cooldown_seconds: f64) -> Self {
        Self {
            def: SkillDef {
                id: id.to_string(),
                name: String::new(),
                cooldown_seconds,
                max_combo_count: 1,
                is_casting: false,
                levels: BTreeMap::from([(1, Vec::new())]),
            },
        }
    }

    pub fn damage(mut self, time_offset: f64, value: f64) -> Self {
        self.level_mut(1).push(Effect::Damage { time_offset, value });
        self
    }

    pub fn buff(mut self, stat: StatKind, value: f64, duration: f64) -> Self {
        self.level_mut(1).push(Effect::Buff {
            time_offset: 0.0,
            stat,
            value,
            duration,
        });
        self
    }

    pub fn casting(mut self) -> Self {
        self.def.is_casting = true;
        self
    }

    pub fn combo_count(mut self, n: u32) -> Self {
        self.def.max_combo_count = n;
        self
    }

    fn level_mut(&mut self, level: u32) -> &mut Vec<Effect> {
        self.def.levels.entry(level).or_default()
    }

    pub fn build(self) -> SkillDef {
        self.def
    }
}

pub fn catalog(defs: Vec<SkillDef>) -> Arc<SkillCatalog> {
    Arc::new(SkillCatalog::from_skills(defs).unwrap())
}

/// Builder for PresetConfiguration. Keys default to "1".."n".
pub struct PresetBuilder {
    preset: PresetConfiguration,
}

impl PresetBuilder {
    pub fn new(ids: &[&str]) -> Self {
        let preset = PresetConfiguration {
            name: "test".into(),
            equipped: ids.iter().map(|s| Some(s.to_string())).collect(),
            skill_keys: (1..=ids.len()).map(|i| i.to_string()).collect(),
            ..Default::default()
        };
        Self { preset }
    }

    pub fn empty_slots(n: usize) -> Self {
        let preset = PresetConfiguration {
            name: "empty".into(),
            equipped: vec![None; n],
            skill_keys: (1..=n).map(|i| i.to_string()).collect(),
            ..Default::default()
        };
        Self { preset }
    }

    pub fn usage(mut self, id: &str, use_automatically: bool, use_alone: bool, priority: u32) -> Self {
        self.preset.usage.insert(
            id.to_string(),
            UsageSetting {
                use_automatically,
                use_alone,
                priority,
            },
        );
        self
    }

    pub fn auto_link(mut self, slots: &[usize]) -> Self {
        self.preset.link_skills.push(LinkSkillDef {
            use_type: LinkUseType::Auto,
            key: None,
            member_slots: slots.to_vec(),
        });
        self
    }

    pub fn manual_link(mut self, key: &str, slots: &[usize]) -> Self {
        self.preset.link_skills.push(LinkSkillDef {
            use_type: LinkUseType::Manual,
            key: Some(key.to_string()),
            member_slots: slots.to_vec(),
        });
        self
    }

    pub fn delay(mut self, ms: u64) -> Self {
        self.preset.use_custom_delay = true;
        self.preset.custom_delay_ms = ms;
        self
    }

    pub fn cooldown_reduction(mut self, pct: u32) -> Self {
        self.preset.use_custom_cooldown_reduction = true;
        self.preset.custom_cooldown_reduction = pct;
        self
    }

    pub fn stats(mut self, stats: Stats) -> Self {
        self.preset.stats = stats;
        self
    }

    pub fn build(self) -> PresetConfiguration {
        self.preset
    }
}

/// Two damage skills with 3 s and 5 s cooldowns.
pub fn two_skill_catalog() -> Arc<SkillCatalog> {
    catalog(vec![
        SkillBuilder::new("a", 3.0).damage(0.0, 2.0).build(),
        SkillBuilder::new("b", 5.0).damage(0.0, 3.0).build(),
    ])
}

pub fn engine(catalog: Arc<SkillCatalog>, preset: PresetConfiguration) -> MacroEngine {
    MacroEngine::new(catalog, preset, Config::default()).unwrap()
}

/// Virtual clock: sleeping advances time instantly. Cancels `token` once
/// `deadline_ms` is reached.
pub struct FakeClock {
    now: AtomicU64,
    deadline_ms: u64,
    token: CancelToken,
}

impl FakeClock {
    pub fn new(deadline_ms: u64, token: CancelToken) -> Self {
        Self {
            now: AtomicU64::new(0),
            deadline_ms,
            token,
        }
    }
}

impl Clock for FakeClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }

    fn sleep_ms(&self, ms: u64) {
        let now = self.now.fetch_add(ms.max(1), Ordering::SeqCst) + ms.max(1);
        if now >= self.deadline_ms {
            self.token.cancel();
        }
    }
}

/// Records every key event as a string ("1", "click", ...).
#[derive(Default)]
pub struct RecordingSink {
    pub events: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl KeySink for RecordingSink {
    fn press(&self, key: &str) {
        self.events.lock().unwrap().push(key.to_string());
    }

    fn click(&self) {
        self.events.lock().unwrap().push("click".to_string());
    }
}
