use clap::Args;
use skillmacro::api::MacroEngine;
use skillmacro::config::Config;
use skillmacro::error::MacroResult;

#[derive(Args, Debug, Clone)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub config: Config,

    #[arg(short = 'n', long, default_value_t = 10)]
    pub count: usize,
}

pub fn run(args: PreviewArgs, engine: &MacroEngine) -> MacroResult<()> {
    let preset = engine.preset();
    let upcoming = engine.preview_next(args.count);
    println!("\n🔮 Next {} skills:", upcoming.len());
    for (i, slot) in upcoming.iter().enumerate() {
        let id = preset.skill_at(*slot).unwrap_or("?");
        let key = preset.skill_keys.get(*slot).map(String::as_str).unwrap_or("?");
        println!("  {:>2}. [{}] {} (slot {})", i + 1, key, id, slot);
    }
    Ok(())
}
