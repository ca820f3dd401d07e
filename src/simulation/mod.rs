pub mod analysis;
pub mod buffs;
pub mod damage;
pub mod required;
pub mod timeline;

use crate::catalog::SkillCatalog;
use crate::config::Config;
use crate::error::MacroResult;
use crate::preset::{PresetConfiguration, SimDetails};
use crate::stats::Stats;
use analysis::{compute_powers, PercentileSummary};
use buffs::merge_buffs;
use damage::{PreparedTarget, Roll, Target};
use rayon::prelude::*;
use std::collections::HashMap;
use timeline::{AttackTimeline, SimAttack, TimelineGenerator};
use tracing::info;

pub use analysis::{percentile, population_std_dev, skill_contributions, Contribution};
pub use timeline::{AttackSource, SimBuff, SimSkill};

/// Boss and normal-mob variants of the same data.
#[derive(Debug, Clone, Default)]
pub struct PerTarget<T> {
    pub boss: T,
    pub normal: T,
}

#[derive(Debug, Clone)]
pub struct SimResult {
    pub powers: [f64; 4],
    /// Boss DPS, boss DPM, normal DPS, normal DPM.
    pub analysis: [PercentileSummary; 4],
    pub deterministic_attacks: PerTarget<Vec<SimAttack>>,
    pub random_attack_trials: PerTarget<Vec<Vec<SimAttack>>>,
    pub timeline: AttackTimeline,
}

pub const ANALYSIS_LABELS: [&str; 4] = ["Boss DPS", "Boss DPM", "Normal DPS", "Normal DPM"];

fn total(attacks: &[SimAttack]) -> f64 {
    attacks.iter().map(|a| a.damage).sum()
}

/// Stateless entry point tying timeline, damage model and analysis together.
pub struct Simulator<'a> {
    catalog: &'a SkillCatalog,
    preset: &'a PresetConfiguration,
    config: &'a Config,
}

impl<'a> Simulator<'a> {
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

    fn prepare(
        &self,
        stats: &Stats,
        details: &SimDetails,
        skill_levels: &HashMap<String, u32>,
    ) -> MacroResult<(AttackTimeline, PerTarget<PreparedTarget>)> {
        let timeline =
            TimelineGenerator::new(self.catalog, self.preset, self.config).generate(stats, skill_levels)?;
        let merged = merge_buffs(&timeline.buffs);
        let targets = PerTarget {
            boss: PreparedTarget::new(
                &timeline.attacks,
                &merged,
                stats,
                Target {
                    is_boss: true,
                    naegong: details.boss_naegong,
                },
            ),
            normal: PreparedTarget::new(
                &timeline.attacks,
                &merged,
                stats,
                Target {
                    is_boss: false,
                    naegong: details.normal_naegong,
                },
            ),
        };
        Ok((timeline, targets))
    }

    /// Expected-value powers; no randomness involved.
    pub fn powers(
        &self,
        stats: &Stats,
        details: &SimDetails,
        skill_levels: &HashMap<String, u32>,
    ) -> MacroResult<[f64; 4]> {
        let (_, targets) = self.prepare(stats, details, skill_levels)?;
        let boss = total(&targets.boss.resolve(&mut Roll::Expected));
        let normal = total(&targets.normal.resolve(&mut Roll::Expected));
        Ok(compute_powers(boss, normal, stats, details, &self.config.simulation))
    }

    /// Expected powers plus the spread of `trials` random runs per target.
    /// Trial `i` is seeded with `seed + i` (boss) and `seed + trials + i`
    /// (normal), so results depend only on the inputs and `seed`.
    pub fn run_stochastic(
        &self,
        stats: &Stats,
        details: &SimDetails,
        skill_levels: &HashMap<String, u32>,
        seed: u64,
    ) -> MacroResult<SimResult> {
        let params = &self.config.simulation;
        let trials = params.trials;
        info!("🎲 Running {} trials per target (seed {})", trials, seed);

        let (timeline, targets) = self.prepare(stats, details, skill_levels)?;
        let expected = PerTarget {
            boss: targets.boss.resolve(&mut Roll::Expected),
            normal: targets.normal.resolve(&mut Roll::Expected),
        };
        let boss_total = total(&expected.boss);
        let normal_total = total(&expected.normal);
        let powers = compute_powers(boss_total, normal_total, stats, details, params);

        let run_trials = |target: &PreparedTarget, offset: u64| -> Vec<Vec<SimAttack>> {
            (0..trials)
                .into_par_iter()
                .map(|i| {
                    let mut rng = fastrand::Rng::with_seed(seed.wrapping_add(offset + i as u64));
                    target.resolve(&mut Roll::Random(&mut rng))
                })
                .collect()
        };
        let random = PerTarget {
            boss: run_trials(&targets.boss, 0),
            normal: run_trials(&targets.normal, trials as u64),
        };

        let boss_totals: Vec<f64> = random.boss.iter().map(Vec::as_slice).map(total).collect();
        let normal_totals: Vec<f64> = random.normal.iter().map(Vec::as_slice).map(total).collect();
        let per_second = 1000.0 / params.duration_ms.max(1) as f64;
        let boss_summary = PercentileSummary::from_samples(boss_total, &boss_totals);
        let normal_summary = PercentileSummary::from_samples(normal_total, &normal_totals);

        Ok(SimResult {
            powers,
            analysis: [
                boss_summary.scaled(per_second),
                boss_summary,
                normal_summary.scaled(per_second),
                normal_summary,
            ],
            deterministic_attacks: expected,
            random_attack_trials: random,
            timeline,
        })
    }
}
