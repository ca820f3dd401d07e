use crate::catalog::SkillCatalog;
use crate::config::Config;
use crate::error::{MacroError, MacroResult};
use crate::preset::{LinkSkillWarning, PresetConfiguration, SimDetails};
use crate::scheduler::{CancelToken, Clock, KeySink, MacroScheduler, ManualTrigger, SkillSlot};
use crate::simulation::required::required_stat_increase;
use crate::simulation::{SimResult, Simulator};
use crate::stats::{StatKind, Stats};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::path::Path;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use strum::EnumCount;
use tracing::{debug, info};
use typed_builder::TypedBuilder;

type PowerKey = ([u64; StatKind::COUNT], SimDetails, Vec<(String, u32)>);

/// Memo of deterministic powers, evicting oldest entries first.
#[derive(Default)]
struct PowerCache {
    map: HashMap<PowerKey, [f64; 4]>,
    order: VecDeque<PowerKey>,
}

impl PowerCache {
    fn get(&self, key: &PowerKey) -> Option<[f64; 4]> {
        self.map.get(key).copied()
    }

    fn insert(&mut self, key: PowerKey, value: [f64; 4], capacity: usize) {
        if capacity == 0 || self.map.contains_key(&key) {
            return;
        }
        while self.map.len() >= capacity {
            match self.order.pop_front() {
                Some(old) => {
                    self.map.remove(&old);
                }
                None => break,
            }
        }
        self.order.push_back(key.clone());
        self.map.insert(key, value);
    }

    fn clear(&mut self) {
        self.map.clear();
        self.order.clear();
    }
}

/// Everything an engine is assembled from.
#[derive(TypedBuilder)]
pub struct EngineBuildParams {
    pub catalog: Arc<SkillCatalog>,
    pub preset: PresetConfiguration,
    #[builder(default)]
    pub config: Config,
}

impl EngineBuildParams {
    pub fn load_from_disk<P1: AsRef<Path>, P2: AsRef<Path>>(
        catalog_path: P1,
        preset_path: P2,
        config: Option<Config>,
    ) -> MacroResult<MacroEngine> {
        let catalog = SkillCatalog::load_from_file(catalog_path)?;
        let preset = PresetConfiguration::load_from_file(preset_path)?;
        EngineBuildParams::builder()
            .catalog(Arc::new(catalog))
            .preset(preset)
            .config(config.unwrap_or_default())
            .build()
            .build_engine()
    }

    pub fn build_engine(self) -> MacroResult<MacroEngine> {
        MacroEngine::new(self.catalog, self.preset, self.config)
    }
}

/// Facade over one validated preset: live scheduling, preview and simulation.
pub struct MacroEngine {
    catalog: Arc<SkillCatalog>,
    preset: PresetConfiguration,
    config: Config,
    scheduler: MacroScheduler,
    cache: Mutex<PowerCache>,
}

impl fmt::Debug for MacroEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MacroEngine")
            .field("preset", &self.preset.name)
            .field("skills", &self.catalog.len())
            .field("delay_ms", &self.scheduler.delay_ms())
            .finish_non_exhaustive()
    }
}

impl MacroEngine {
    pub fn new(
        catalog: Arc<SkillCatalog>,
        preset: PresetConfiguration,
        config: Config,
    ) -> MacroResult<Self> {
        config.macro_settings.validate()?;
        preset.validate(&config.macro_settings, &catalog)?;
        let scheduler = MacroScheduler::new(&preset, &catalog, &config.macro_settings)?;
        info!(
            "API: Engine ready for preset '{}' ({} skills equipped)",
            preset.name,
            preset.equipped_slots().len()
        );
        Ok(Self {
            catalog,
            preset,
            config,
            scheduler,
            cache: Mutex::new(PowerCache::default()),
        })
    }

    pub fn preset(&self) -> &PresetConfiguration {
        &self.preset
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> &SkillCatalog {
        &self.catalog
    }

    /// Swaps in an edited preset; cached powers are discarded.
    pub fn replace_preset(&mut self, preset: PresetConfiguration) -> MacroResult<()> {
        preset.validate(&self.config.macro_settings, &self.catalog)?;
        self.scheduler = MacroScheduler::new(&preset, &self.catalog, &self.config.macro_settings)?;
        self.preset = preset;
        self.lock_cache()?.clear();
        Ok(())
    }

    fn lock_cache(&self) -> MacroResult<std::sync::MutexGuard<'_, PowerCache>> {
        self.cache
            .lock()
            .map_err(|_| MacroError::Runtime("power cache poisoned".into()))
    }

    pub fn link_skill_warnings(&self) -> Vec<LinkSkillWarning> {
        self.preset.link_skill_warnings(&self.catalog)
    }

    /// Next `k` dispatches; follows the live run while one is active.
    pub fn preview_next(&self, k: usize) -> Vec<SkillSlot> {
        self.scheduler.preview_next(k)
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn manual_trigger_handle(&self) -> Sender<ManualTrigger> {
        self.scheduler.manual_trigger_handle()
    }

    /// Blocks until `cancel` fires. Meant for a dedicated thread.
    pub fn run_live(
        &self,
        cancel: &CancelToken,
        sink: &dyn KeySink,
        clock: &dyn Clock,
    ) -> MacroResult<()> {
        let warnings = self.link_skill_warnings();
        if !warnings.is_empty() {
            info!("API: Starting with {} link skill warning(s)", warnings.len());
        }
        self.scheduler.run_live(cancel, sink, clock)
    }

    fn simulator(&self) -> Simulator<'_> {
        Simulator::new(&self.catalog, &self.preset, &self.config)
    }

    /// Expected-value powers, memoized on `(stats, sim_details, skill_levels)`.
    pub fn simulate_deterministic(
        &self,
        stats: &Stats,
        sim_details: &SimDetails,
        skill_levels: Option<&HashMap<String, u32>>,
    ) -> MacroResult<[f64; 4]> {
        let levels = skill_levels.unwrap_or(&self.preset.skill_levels);
        let mut sorted: Vec<(String, u32)> =
            levels.iter().map(|(k, v)| (k.clone(), *v)).collect();
        sorted.sort_unstable();
        let key: PowerKey = (stats.to_bits(), *sim_details, sorted);

        if let Some(hit) = self.lock_cache()?.get(&key) {
            debug!("API: power cache hit");
            return Ok(hit);
        }
        let powers = self.simulator().powers(stats, sim_details, levels)?;
        self.lock_cache()?
            .insert(key, powers, self.config.simulation.cache_capacity);
        Ok(powers)
    }

    pub fn simulate_stochastic(
        &self,
        stats: &Stats,
        sim_details: &SimDetails,
        seed: u64,
    ) -> MacroResult<SimResult> {
        info!("API: Stochastic simulation for preset '{}'", self.preset.name);
        self.simulator()
            .run_stochastic(stats, sim_details, &self.preset.skill_levels, seed)
    }

    /// Increase of `stat` needed for power `power_index` to reach `target`.
    pub fn required_stat(
        &self,
        stats: &Stats,
        sim_details: &SimDetails,
        stat: StatKind,
        power_index: usize,
        target: f64,
    ) -> MacroResult<f64> {
        if power_index >= 4 {
            return Err(MacroError::Config(format!(
                "power index {} out of range 0..4",
                power_index
            )));
        }
        required_stat_increase(stats, stat, target, |s| {
            Ok(self.simulate_deterministic(s, sim_details, None)?[power_index])
        })
    }
}
