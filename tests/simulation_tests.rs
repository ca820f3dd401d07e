mod common;

use common::{catalog, two_skill_catalog, PresetBuilder, SkillBuilder};
use skillmacro::api::MacroEngine;
use skillmacro::catalog::Effect;
use skillmacro::config::Config;
use skillmacro::error::MacroError;
use skillmacro::preset::SimDetails;
use skillmacro::simulation::timeline::TimelineGenerator;
use skillmacro::simulation::{skill_contributions, AttackSource};
use skillmacro::stats::{StatKind, Stats};
use std::collections::HashMap;

fn quick_config(trials: usize) -> Config {
    let mut config = Config::default();
    config.simulation.trials = trials;
    config
}

#[test]
fn test_empty_preset_only_basic_attacks() {
    println!("\n=== TEST: Basic Attacks Only ===");
    let cat = two_skill_catalog();
    let preset = PresetBuilder::empty_slots(6).build();
    let config = Config::default();
    let timeline = TimelineGenerator::new(&cat, &preset, &config)
        .generate(&Stats::default(), &HashMap::new())
        .unwrap();

    assert!(timeline.skills.is_empty());
    assert!(timeline.buffs.is_empty());
    // ATK_SPD 15 -> one swing every 850 ms over 60 s
    assert_eq!(timeline.attacks.len(), 71);
    assert!(timeline
        .attacks
        .iter()
        .all(|a| a.source == AttackSource::BasicAttack));
    assert_eq!(timeline.attacks[1].time, 0.85);
    println!("✅ {} basic attacks", timeline.attacks.len());
}

#[test]
fn test_dispatch_times_follow_delay_and_cooldowns() {
    let cat = two_skill_catalog();
    let preset = PresetBuilder::new(&["a", "b"]).delay(150).build();
    let config = Config::default();
    let skills = TimelineGenerator::new(&cat, &preset, &config)
        .dispatches()
        .unwrap();

    let head: Vec<(usize, f64)> = skills.iter().take(4).map(|s| (s.slot, s.time)).collect();
    assert_eq!(head, vec![(0, 0.0), (1, 0.15), (0, 3.0), (1, 5.15)]);
    assert!(skills.iter().all(|s| s.time < 60.0));
}

#[test]
fn test_deterministic_powers_are_bit_identical() {
    let preset = PresetBuilder::new(&["a", "b"]).build();
    let first = common::engine(two_skill_catalog(), preset.clone());
    let second = common::engine(two_skill_catalog(), preset);
    let stats = Stats::default();
    let details = SimDetails::default();

    let a = first.simulate_deterministic(&stats, &details, None).unwrap();
    let cached = first.simulate_deterministic(&stats, &details, None).unwrap();
    let b = second.simulate_deterministic(&stats, &details, None).unwrap();
    for i in 0..4 {
        assert_eq!(a[i].to_bits(), cached[i].to_bits());
        assert_eq!(a[i].to_bits(), b[i].to_bits());
    }
    assert!(a[0] > 0.0);
}

#[test]
fn test_skill_levels_override_changes_powers() {
    let mut def = SkillBuilder::new("a", 3.0).damage(0.0, 2.0).build();
    def.levels.insert(
        2,
        vec![Effect::Damage {
            time_offset: 0.0,
            value: 20.0,
        }],
    );
    let engine = common::engine(catalog(vec![def]), PresetBuilder::new(&["a"]).build());
    let stats = Stats::default();
    let details = SimDetails::default();

    let base = engine.simulate_deterministic(&stats, &details, None).unwrap();
    let levels = HashMap::from([("a".to_string(), 2)]);
    let boosted = engine
        .simulate_deterministic(&stats, &details, Some(&levels))
        .unwrap();
    assert!(boosted[0] > base[0]);
    // Unknown level for an equipped skill is an error, not a silent zero.
    let missing = HashMap::from([("a".to_string(), 9)]);
    assert!(engine
        .simulate_deterministic(&stats, &details, Some(&missing))
        .is_err());
}

#[test]
fn test_same_seed_same_analysis() {
    let preset = PresetBuilder::new(&["a", "b"]).build();
    let engine = MacroEngine::new(two_skill_catalog(), preset, quick_config(200)).unwrap();
    let stats = Stats::default();
    let details = SimDetails::default();

    let a = engine.simulate_stochastic(&stats, &details, 42).unwrap();
    let b = engine.simulate_stochastic(&stats, &details, 42).unwrap();
    let c = engine.simulate_stochastic(&stats, &details, 43).unwrap();

    assert_eq!(a.analysis, b.analysis);
    assert_ne!(a.analysis[1].p50, c.analysis[1].p50);
    assert_eq!(a.random_attack_trials.boss.len(), 200);
    assert_eq!(a.random_attack_trials.normal.len(), 200);
    assert!((a.analysis[0].value - a.analysis[1].value / 60.0).abs() < 1e-6);
}

#[test]
fn test_spread_matches_roll_variance_without_crit() {
    println!("\n=== TEST: Monte-Carlo Spread ===");
    let mut stats = Stats::default();
    stats.crit_rate = 0.0;
    let preset = PresetBuilder::new(&["a", "b"]).stats(stats).build();
    let engine = MacroEngine::new(two_skill_catalog(), preset, quick_config(400)).unwrap();
    let result = engine
        .simulate_stochastic(&stats, &SimDetails::default(), 7)
        .unwrap();

    // Each hit is base * U(1.0, 1.2), so its variance is base^2 * 0.04 / 12.
    let variance: f64 = result
        .deterministic_attacks
        .boss
        .iter()
        .map(|a| (a.damage / 1.1).powi(2) * 0.04 / 12.0)
        .sum();
    let analytic = variance.sqrt();
    let boss = result.analysis[1];
    println!("std {:.2} vs analytic {:.2}", boss.std, analytic);
    assert!((boss.std - analytic).abs() < analytic * 0.2);
    assert!((boss.p50 - boss.value).abs() < boss.value * 0.02);
    assert!(boss.min <= boss.p25 && boss.p25 <= boss.p50);
    assert!(boss.p50 <= boss.p75 && boss.p75 <= boss.max);
}

#[test]
fn test_buff_raises_damage_inside_window_only() {
    let cat = catalog(vec![SkillBuilder::new("war_cry", 30.0)
        .buff(StatKind::Atk, 100.0, 5.0)
        .build()]);
    let engine = MacroEngine::new(cat, PresetBuilder::new(&["war_cry"]).build(), quick_config(10))
        .unwrap();
    let result = engine
        .simulate_stochastic(&Stats::default(), &SimDetails::default(), 1)
        .unwrap();

    let at = |t: f64| {
        result
            .deterministic_attacks
            .boss
            .iter()
            .find(|a| (a.time - t).abs() < 1e-9)
            .map(|a| a.damage)
            .unwrap()
    };
    let buffed = at(0.85);
    let plain = at(5.95);
    assert!((buffed / plain - 2.0).abs() < 1e-9, "{} vs {}", buffed, plain);
}

#[test]
fn test_contributions_sum_to_hundred() {
    let engine = MacroEngine::new(
        two_skill_catalog(),
        PresetBuilder::new(&["a", "b"]).build(),
        quick_config(10),
    )
    .unwrap();
    let result = engine
        .simulate_stochastic(&Stats::default(), &SimDetails::default(), 3)
        .unwrap();
    let shares = skill_contributions(&result.deterministic_attacks.boss);

    assert_eq!(shares.len(), 3);
    let sum: f64 = shares.iter().map(|c| c.percent).sum();
    assert!((sum - 100.0).abs() < 1e-9);
    assert!(shares.windows(2).all(|w| w[0].total >= w[1].total));
    assert_eq!(result.timeline.source_id(AttackSource::BasicAttack), "builtin:basic_attack");
}

#[test]
fn test_full_dodge_zeroes_survival_power() {
    let engine = common::engine(two_skill_catalog(), PresetBuilder::new(&["a"]).build());
    let mut stats = Stats::default();
    stats.dodge = 100.0;
    let powers = engine
        .simulate_deterministic(&stats, &SimDetails::default(), None)
        .unwrap();
    assert_eq!(powers[2], 0.0);
    assert!(powers[0] > 0.0);
}

#[test]
fn test_required_stat_for_ten_percent_more() {
    let engine = common::engine(two_skill_catalog(), PresetBuilder::new(&["a", "b"]).build());
    let stats = Stats::default();
    let details = SimDetails::default();
    let current = engine.simulate_deterministic(&stats, &details, None).unwrap()[0];

    // Boss damage is linear in ATK, so +10% needs +10 ATK from 100.
    let needed = engine
        .required_stat(&stats, &details, StatKind::Atk, 0, current * 1.1)
        .unwrap();
    assert!((needed - 10.0).abs() < 0.05, "{}", needed);

    let met = engine
        .required_stat(&stats, &details, StatKind::Atk, 0, current * 0.5)
        .unwrap();
    assert_eq!(met, 0.0);
    assert!(engine
        .required_stat(&stats, &details, StatKind::Atk, 4, current)
        .is_err());
}

#[test]
fn test_unknown_skill_is_rejected() {
    let preset = PresetBuilder::new(&["a", "missing"]).build();
    let err = MacroEngine::new(two_skill_catalog(), preset, Config::default()).unwrap_err();
    assert!(matches!(err, MacroError::UnknownSkill(ref id) if id == "missing"));
}

#[test]
fn test_out_of_range_delay_is_rejected() {
    let preset = PresetBuilder::new(&["a"]).delay(10).build();
    let err = MacroEngine::new(two_skill_catalog(), preset, Config::default()).unwrap_err();
    assert!(matches!(err, MacroError::Config(_)));
}

#[test]
fn test_replace_preset_recomputes_powers() {
    let mut engine = common::engine(two_skill_catalog(), PresetBuilder::new(&["a"]).build());
    let stats = Stats::default();
    let details = SimDetails::default();
    let one = engine.simulate_deterministic(&stats, &details, None).unwrap();

    engine
        .replace_preset(PresetBuilder::new(&["a", "b"]).build())
        .unwrap();
    let two = engine.simulate_deterministic(&stats, &details, None).unwrap();
    assert!(two[0] > one[0]);
}
