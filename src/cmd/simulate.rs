use crate::reports;
use clap::Args;
use skillmacro::api::MacroEngine;
use skillmacro::config::Config;
use skillmacro::error::MacroResult;
use skillmacro::simulation::skill_contributions;
use std::time::Instant;

#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub config: Config,

    /// Seed for the Monte-Carlo trials; random when omitted.
    #[arg(short = 'S', long)]
    pub seed: Option<u64>,

    /// Only print the expected-value powers.
    #[arg(long, default_value_t = false)]
    pub deterministic: bool,
}

pub fn run(args: SimulateArgs, engine: &MacroEngine) -> MacroResult<()> {
    let preset = engine.preset();
    let start = Instant::now();

    if args.deterministic {
        let powers =
            engine.simulate_deterministic(&preset.stats, &preset.sim_details, None)?;
        reports::print_powers(&powers);
        println!("⏱️  {:.1?}", start.elapsed());
        return Ok(());
    }

    let seed = args.seed.unwrap_or_else(|| fastrand::Rng::new().u64(..));
    println!("\n🎲 === COMBAT SIMULATION (seed {}) === 🎲", seed);
    let result = engine.simulate_stochastic(&preset.stats, &preset.sim_details, seed)?;

    reports::print_powers(&result.powers);
    reports::print_analysis(&result.analysis);
    reports::print_contributions(
        &result.timeline,
        &skill_contributions(&result.deterministic_attacks.boss),
    );
    reports::print_usage(&result.timeline);
    println!("⏱️  {:.1?}", start.elapsed());
    Ok(())
}
