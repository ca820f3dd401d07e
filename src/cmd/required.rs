use clap::Args;
use skillmacro::api::MacroEngine;
use skillmacro::config::Config;
use skillmacro::error::MacroResult;
use skillmacro::stats::StatKind;

#[derive(Args, Debug, Clone)]
pub struct RequiredArgs {
    #[command(flatten)]
    pub config: Config,

    /// Stat to raise, e.g. ATK or CRIT_RATE.
    #[arg(long)]
    pub stat: String,

    /// Desired power per index (boss, normal, boss survival, farming).
    #[arg(long, num_args = 1..=4, value_delimiter = ',')]
    pub targets: Vec<f64>,
}

const POWER_LABELS: [&str; 4] = ["Boss", "Normal", "Boss (survival)", "Farming"];

pub fn run(args: RequiredArgs, engine: &MacroEngine) -> MacroResult<()> {
    let stat = StatKind::from_name(&args.stat)?;
    let preset = engine.preset();
    let current = engine.simulate_deterministic(&preset.stats, &preset.sim_details, None)?;

    println!("\n📈 Required {} increase", stat);
    for (idx, target) in args.targets.iter().enumerate() {
        let needed =
            engine.required_stat(&preset.stats, &preset.sim_details, stat, idx, *target)?;
        println!(
            "  {:<16} {:>12.0} -> {:>12.0}: +{:.2}",
            POWER_LABELS[idx], current[idx], target, needed
        );
    }
    Ok(())
}
