use crate::consts::{BASIC_ATTACK_BASE_MS, DEFAULT_TRIALS, DEFAULT_UNIT_TIME_MS, SIM_DURATION_MS};
use crate::error::{MacroError, MacroResult};
use clap::{parser::ValueSource, ArgMatches, Args};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Args, Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    #[command(flatten)]
    pub macro_settings: MacroSettings,
    #[command(flatten)]
    pub simulation: SimulationParams,
}

/// Pacing and bounds for live scheduling.
#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MacroSettings {
    #[arg(long, default_value_t = DEFAULT_UNIT_TIME_MS)]
    pub unit_time_ms: u64,

    // === DELAY (ms between dispatched keys) ===
    #[arg(long, default_value_t = 50)]
    pub min_delay_ms: u64,
    #[arg(long, default_value_t = 1000)]
    pub max_delay_ms: u64,
    #[arg(long, default_value_t = 150)]
    pub default_delay_ms: u64,

    // === COOLDOWN REDUCTION (percent) ===
    #[arg(long, default_value_t = 0)]
    pub min_cooldown_reduction: u32,
    #[arg(long, default_value_t = 50)]
    pub max_cooldown_reduction: u32,
    #[arg(long, default_value_t = 0)]
    pub default_cooldown_reduction: u32,
}

impl Default for MacroSettings {
    fn default() -> Self {
        Self {
            unit_time_ms: DEFAULT_UNIT_TIME_MS,
            min_delay_ms: 50,
            max_delay_ms: 1000,
            default_delay_ms: 150,
            min_cooldown_reduction: 0,
            max_cooldown_reduction: 50,
            default_cooldown_reduction: 0,
        }
    }
}

impl MacroSettings {
    /// Rejects a delay outside `[min_delay_ms, max_delay_ms]`.
    pub fn check_delay(&self, delay_ms: u64) -> MacroResult<u64> {
        if delay_ms < self.min_delay_ms || delay_ms > self.max_delay_ms {
            return Err(MacroError::Config(format!(
                "delay {}ms outside [{}, {}]",
                delay_ms, self.min_delay_ms, self.max_delay_ms
            )));
        }
        Ok(delay_ms)
    }

    /// Rejects a cooldown reduction outside the configured percent range.
    pub fn check_cooldown_reduction(&self, pct: u32) -> MacroResult<u32> {
        if pct < self.min_cooldown_reduction || pct > self.max_cooldown_reduction {
            return Err(MacroError::Config(format!(
                "cooldown reduction {}% outside [{}, {}]",
                pct, self.min_cooldown_reduction, self.max_cooldown_reduction
            )));
        }
        Ok(pct)
    }

    pub fn clamp_delay(&self, delay_ms: u64) -> u64 {
        delay_ms.clamp(self.min_delay_ms, self.max_delay_ms)
    }

    pub fn clamp_cooldown_reduction(&self, pct: u32) -> u32 {
        pct.clamp(self.min_cooldown_reduction, self.max_cooldown_reduction)
    }

    /// Internal consistency of the bounds themselves.
    pub fn validate(&self) -> MacroResult<()> {
        if self.unit_time_ms == 0 {
            return Err(MacroError::Config("unit_time_ms must be positive".into()));
        }
        if self.min_delay_ms > self.max_delay_ms {
            return Err(MacroError::Config(
                "min_delay_ms exceeds max_delay_ms".into(),
            ));
        }
        if self.max_cooldown_reduction >= 100
            || self.min_cooldown_reduction > self.max_cooldown_reduction
        {
            return Err(MacroError::Config(
                "cooldown reduction bounds must satisfy min <= max < 100".into(),
            ));
        }
        self.check_delay(self.default_delay_ms)?;
        self.check_cooldown_reduction(self.default_cooldown_reduction)?;
        Ok(())
    }
}

/// Knobs of the combat simulator.
#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    #[arg(long, default_value_t = DEFAULT_TRIALS)]
    pub trials: usize,
    #[arg(long, default_value_t = SIM_DURATION_MS)]
    pub duration_ms: u64,
    #[arg(long, default_value_t = BASIC_ATTACK_BASE_MS)]
    pub basic_attack_base_ms: u64,

    // === POWER COEFFICIENTS ===
    #[arg(long, default_value_t = 1.0)]
    pub coef_boss_dmg: f64,
    #[arg(long, default_value_t = 1.3)]
    pub coef_normal_dmg: f64,
    #[arg(long, default_value_t = 0.0002)]
    pub coef_boss: f64,
    #[arg(long, default_value_t = 0.7)]
    pub coef_normal: f64,

    #[arg(long, default_value_t = 1024)]
    pub cache_capacity: usize,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            trials: DEFAULT_TRIALS,
            duration_ms: SIM_DURATION_MS,
            basic_attack_base_ms: BASIC_ATTACK_BASE_MS,
            coef_boss_dmg: 1.0,
            coef_normal_dmg: 1.3,
            coef_boss: 0.0002,
            coef_normal: 0.7,
            cache_capacity: 1024,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> MacroResult<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.macro_settings.validate()?;
        Ok(config)
    }

    /// Overlays only the arguments the user actually typed on top of `self`.
    pub fn merge_from_cli(&mut self, cli: &Config, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($group:ident, $field:ident) => {
                if matches.value_source(stringify!($field)) == Some(ValueSource::CommandLine) {
                    self.$group.$field = cli.$group.$field;
                }
            };
        }

        update_if_present!(macro_settings, unit_time_ms);
        update_if_present!(macro_settings, min_delay_ms);
        update_if_present!(macro_settings, max_delay_ms);
        update_if_present!(macro_settings, default_delay_ms);
        update_if_present!(macro_settings, min_cooldown_reduction);
        update_if_present!(macro_settings, max_cooldown_reduction);
        update_if_present!(macro_settings, default_cooldown_reduction);

        update_if_present!(simulation, trials);
        update_if_present!(simulation, duration_ms);
        update_if_present!(simulation, basic_attack_base_ms);
        update_if_present!(simulation, coef_boss_dmg);
        update_if_present!(simulation, coef_normal_dmg);
        update_if_present!(simulation, coef_boss);
        update_if_present!(simulation, coef_normal);
        update_if_present!(simulation, cache_capacity);
    }
}
