use crate::consts::{REQ_STAT_EPSILON, REQ_STAT_MAX_BISECTIONS, REQ_STAT_MAX_EXPANSIONS};
use crate::error::MacroResult;
use crate::stats::{StatKind, Stats};

/// Smallest increase of `stat` lifting `power_of` to at least `target`.
///
/// Doubles the search bracket up to ten times, then bisects to within 0.05.
/// Returns 0.0 when the target is already met, or when it can't be reached
/// without leaving the stat's valid range. A met target short-circuits
/// before any bisection, so the answer is exactly 0.0 rather than the
/// smallest probed step.
pub fn required_stat_increase<F>(
    base: &Stats,
    stat: StatKind,
    target: f64,
    mut power_of: F,
) -> MacroResult<f64>
where
    F: FnMut(&Stats) -> MacroResult<f64>,
{
    let mut stats = *base;
    let origin = base.get(stat);
    let (_, upper) = stat.range();
    let headroom = upper - origin;

    let mut current = power_of(&stats)?;
    if current >= target {
        return Ok(0.0);
    }

    let mut low = 0.0_f64;
    let mut high = 1.0_f64.min(headroom);
    let mut step = 1.0_f64;
    let mut expansions = 0;
    loop {
        if high <= low || !stat.in_range(origin + low) {
            return Ok(0.0);
        }
        stats.set(stat, origin + high);
        current = power_of(&stats)?;
        if current >= target {
            break;
        }
        expansions += 1;
        if expansions == REQ_STAT_MAX_EXPANSIONS {
            return Ok(0.0);
        }
        low = high;
        high = (high + step).min(headroom);
        step *= 2.0;
    }

    let mut bisections = 0;
    while high - low > REQ_STAT_EPSILON && bisections < REQ_STAT_MAX_BISECTIONS {
        let mid = (low + high) * 0.5;
        stats.set(stat, origin + mid);
        if power_of(&stats)? < target {
            low = mid;
        } else {
            high = mid;
        }
        bisections += 1;
    }
    Ok((low + high) * 0.5)
}
