/// Slot index reserved for the synthetic basic attack.
pub const BASIC_ATTACK_SLOT: i32 = -1;

/// Catalog id used for basic-attack events in simulation output.
pub const BASIC_ATTACK_ID: &str = "builtin:basic_attack";

/// Length of one simulated combat window, in milliseconds.
pub const SIM_DURATION_MS: u64 = 60_000;

/// Number of Monte-Carlo trials per target type.
pub const DEFAULT_TRIALS: usize = 1000;

/// Default tick period of the live scheduler (and the simulation clock).
pub const DEFAULT_UNIT_TIME_MS: u64 = 50;

/// Base interval between basic attacks before attack-speed scaling.
pub const BASIC_ATTACK_BASE_MS: u64 = 1000;

/// Expected value of the uniform [1.0, 1.2] damage roll.
pub const DAMAGE_ROLL_MEAN: f64 = 1.1;
pub const DAMAGE_ROLL_MIN: f64 = 1.0;
pub const DAMAGE_ROLL_MAX: f64 = 1.2;

/// Live sleeps are shortened slightly so the loop keeps pace with the
/// nominal period despite scheduler jitter.
pub const SLEEP_COEFFICIENT_UNIT: f64 = 0.97;

/// Bands keyed on `mob_naegong - attacker_naegong` (inclusive bounds).
/// A difference outside every band negates the hit.
pub const NAEGONG_BANDS: [((i64, i64), f64); 16] = [
    ((6, 1000), 0.0),
    ((5, 5), 0.3),
    ((4, 4), 0.5),
    ((3, 3), 0.7),
    ((2, 2), 0.85),
    ((1, 1), 0.95),
    ((0, 0), 1.0),
    ((-1, -1), 1.025),
    ((-2, -2), 1.05),
    ((-4, -3), 1.075),
    ((-6, -5), 1.1),
    ((-9, -7), 1.15),
    ((-13, -10), 1.2),
    ((-18, -14), 1.3),
    ((-25, -19), 1.4),
    ((-1000, -26), 1.5),
];

/// Convergence window for the required-stat bisection.
pub const REQ_STAT_EPSILON: f64 = 0.05;
pub const REQ_STAT_MAX_EXPANSIONS: usize = 10;
pub const REQ_STAT_MAX_BISECTIONS: usize = 15;
