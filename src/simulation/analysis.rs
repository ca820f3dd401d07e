use super::timeline::{AttackSource, SimAttack};
use crate::config::SimulationParams;
use crate::preset::SimDetails;
use crate::stats::Stats;
use serde::Serialize;
use std::collections::BTreeMap;

/// Point estimate plus the spread of the Monte-Carlo trials.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PercentileSummary {
    pub value: f64,
    pub min: f64,
    pub max: f64,
    pub std: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
}

impl PercentileSummary {
    /// Summary of `samples` around the point estimate `value`.
    pub fn from_samples(value: f64, samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self {
                value,
                ..Default::default()
            };
        }
        let mut sorted = samples.to_vec();
        sorted.sort_by(f64::total_cmp);
        Self {
            value,
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            std: population_std_dev(&sorted),
            p25: percentile(&sorted, 25.0),
            p50: percentile(&sorted, 50.0),
            p75: percentile(&sorted, 75.0),
        }
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            value: self.value * factor,
            min: self.min * factor,
            max: self.max * factor,
            std: self.std * factor,
            p25: self.p25 * factor,
            p50: self.p50 * factor,
            p75: self.p75 * factor,
        }
    }
}

/// Linear-interpolated rank percentile of an ascending slice.
/// `rank = p/100 * (n-1) + 1`, one-based.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    let rank = p * 0.01 * (n - 1) as f64 + 1.0;
    let lower = (rank.floor() as usize).saturating_sub(1).min(n - 1);
    let frac = rank - rank.floor();
    if lower + 1 < n {
        sorted[lower] + frac * (sorted[lower + 1] - sorted[lower])
    } else {
        sorted[lower]
    }
}

pub fn population_std_dev(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let n = data.len() as f64;
    let mean = data.iter().sum::<f64>() / n;
    let var = data.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    var.sqrt()
}

/// `0.0` instead of NaN/Inf for a non-positive denominator.
pub fn safe_ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 && den.is_finite() {
        num / den
    } else {
        0.0
    }
}

/// The four power scores: boss damage, normal damage, boss survivability,
/// normal farming.
pub fn compute_powers(
    boss_total: f64,
    normal_total: f64,
    stats: &Stats,
    details: &SimDetails,
    params: &SimulationParams,
) -> [f64; 4] {
    let damage_reduction = stats.def * 0.5 + stats.hp * stats.res * 0.001;
    let recovery = stats.hp * 0.1 * 0.2
        + f64::from(details.potion_heal) * (1.0 + stats.pot_heal * 0.01) * 0.5;

    let boss = boss_total * params.coef_boss_dmg;
    let normal = normal_total * params.coef_normal_dmg;
    let endurance = stats.hp + damage_reduction * 5.0 + recovery * 5.0;

    [
        boss,
        normal,
        safe_ratio(boss * endurance, 1.0 - stats.dodge * 0.01) * params.coef_boss,
        normal
            * (1.0 + stats.luk * 0.01)
            * (1.0 + stats.status_res * 0.001)
            * (1.0 + stats.exp * 0.01)
            * params.coef_normal,
    ]
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contribution {
    pub source: AttackSource,
    pub total: f64,
    pub percent: f64,
}

/// Damage share per source, largest first. Percentages are 0 when nothing
/// dealt damage.
pub fn skill_contributions(attacks: &[SimAttack]) -> Vec<Contribution> {
    let mut totals: BTreeMap<AttackSource, f64> = BTreeMap::new();
    for attack in attacks {
        *totals.entry(attack.source).or_default() += attack.damage;
    }
    let grand: f64 = totals.values().sum();
    let mut out: Vec<Contribution> = totals
        .into_iter()
        .map(|(source, total)| Contribution {
            source,
            total,
            percent: safe_ratio(total * 100.0, grand),
        })
        .collect();
    out.sort_by(|a, b| b.total.total_cmp(&a.total).then(a.source.cmp(&b.source)));
    out
}
