use super::timeline::{AttackSource, SimAttack, SimBuff};
use crate::consts::{DAMAGE_ROLL_MAX, DAMAGE_ROLL_MEAN, DAMAGE_ROLL_MIN, NAEGONG_BANDS};
use crate::stats::Stats;

/// Expected value, or one random draw per hit.
pub enum Roll<'r> {
    Expected,
    Random(&'r mut fastrand::Rng),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub is_boss: bool,
    pub naegong: i64,
}

/// Multiplier for `mob_naegong - attacker_naegong`; 0.0 outside every band.
pub fn naegong_coefficient(attacker_naegong: f64, mob_naegong: i64) -> f64 {
    let diff = mob_naegong - attacker_naegong as i64;
    NAEGONG_BANDS
        .iter()
        .find(|((lo, hi), _)| *lo <= diff && diff <= *hi)
        .map_or(0.0, |(_, m)| *m)
}

/// Base stats plus every buff covering `t`, applied additively in list order.
pub fn current_stats(base: &Stats, t: f64, buffs: &[SimBuff]) -> Stats {
    let mut stats = *base;
    for buff in buffs.iter().filter(|b| b.covers(t)) {
        stats.add(buff.stat, buff.value);
    }
    stats
}

/// Damage before the roll and crit: attack, stats, naegong band and boss bonus.
pub fn pre_roll_damage(stats: &Stats, target: Target) -> f64 {
    let mut damage = stats.atk
        * (stats.strength + stats.intellect)
        * (1.0 + stats.pwr * 0.01)
        * naegong_coefficient(stats.naegong, target.naegong)
        * 0.01;
    if target.is_boss {
        damage *= 1.0 + stats.boss_dmg * 0.01;
    }
    damage
}

fn apply_roll(damage: f64, crit_rate: f64, crit_dmg: f64, roll: &mut Roll<'_>) -> f64 {
    match roll {
        Roll::Expected => {
            let crit_prob = crit_rate.min(100.0);
            damage * (1.0 + crit_prob * crit_dmg * 0.0001) * DAMAGE_ROLL_MEAN
        }
        Roll::Random(rng) => {
            let spread = DAMAGE_ROLL_MIN + (DAMAGE_ROLL_MAX - DAMAGE_ROLL_MIN) * rng.f64();
            let mut damage = damage * spread;
            if rng.f64() < crit_rate * 0.01 {
                damage *= 1.0 + crit_dmg * 0.01;
            }
            damage
        }
    }
}

pub fn damage(stats: &Stats, target: Target, roll: &mut Roll<'_>) -> f64 {
    apply_roll(
        pre_roll_damage(stats, target),
        stats.crit_rate,
        stats.crit_dmg,
        roll,
    )
}

#[derive(Debug, Clone, Copy)]
struct PreparedHit {
    source: AttackSource,
    time: f64,
    base: f64,
    crit_rate: f64,
    crit_dmg: f64,
}

/// Per-hit buffed stats resolved once, so repeated trials only roll dice.
#[derive(Debug, Clone)]
pub struct PreparedTarget {
    hits: Vec<PreparedHit>,
}

impl PreparedTarget {
    pub fn new(attacks: &[SimAttack], merged_buffs: &[SimBuff], base: &Stats, target: Target) -> Self {
        let hits = attacks
            .iter()
            .map(|attack| {
                let stats = current_stats(base, attack.time, merged_buffs);
                PreparedHit {
                    source: attack.source,
                    time: attack.time,
                    base: pre_roll_damage(&stats, target) * attack.damage,
                    crit_rate: stats.crit_rate,
                    crit_dmg: stats.crit_dmg,
                }
            })
            .collect();
        Self { hits }
    }

    pub fn resolve(&self, roll: &mut Roll<'_>) -> Vec<SimAttack> {
        self.hits
            .iter()
            .map(|hit| SimAttack {
                source: hit.source,
                time: hit.time,
                damage: apply_roll(hit.base, hit.crit_rate, hit.crit_dmg, roll),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}
