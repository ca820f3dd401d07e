use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use skillmacro::api::EngineBuildParams;
use skillmacro::config::Config;
use std::process;
use tracing::info;

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(global = true, short, long, default_value = "data/catalog.json")]
    catalog: String,

    #[arg(global = true, short, long, default_value = "data/preset.json")]
    preset: String,

    /// JSON file with macro/simulation settings; CLI flags override it.
    #[arg(global = true, long)]
    settings: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Simulate(cmd::simulate::SimulateArgs),
    Preview(cmd::preview::PreviewArgs),
    Required(cmd::required::RequiredArgs),
    DryRun(cmd::dry_run::DryRunArgs),
}

fn fatal(context: &str, err: impl std::fmt::Display) -> ! {
    eprintln!("\n❌ {}:", context);
    eprintln!("   {}", err);
    process::exit(1);
}

fn main() {
    tracing_subscriber::fmt::init();

    // Raw matches tell user input apart from clap defaults.
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    info!("🚀 Initializing skill macro engine...");

    let (cli_config, sub_name) = match &cli.command {
        Commands::Simulate(a) => (&a.config, "simulate"),
        Commands::Preview(a) => (&a.config, "preview"),
        Commands::Required(a) => (&a.config, "required"),
        Commands::DryRun(a) => (&a.config, "dry-run"),
    };
    let config = match &cli.settings {
        Some(path) => {
            info!("⚖️  Loading settings from: {}", path);
            let mut file_config =
                Config::load_from_file(path).unwrap_or_else(|e| fatal("Invalid settings file", e));
            if let Some(sub_matches) = matches.subcommand_matches(sub_name) {
                file_config.merge_from_cli(cli_config, sub_matches);
            }
            file_config
        }
        None => cli_config.clone(),
    };

    info!("📂 Loading catalog: {}", cli.catalog);
    info!("📂 Loading preset: {}", cli.preset);
    let engine = EngineBuildParams::load_from_disk(&cli.catalog, &cli.preset, Some(config))
        .unwrap_or_else(|e| fatal("Failed to build engine", e));
    for warning in engine.link_skill_warnings() {
        eprintln!("⚠️  {}", warning);
    }

    let result = match cli.command {
        Commands::Simulate(args) => cmd::simulate::run(args, &engine),
        Commands::Preview(args) => cmd::preview::run(args, &engine),
        Commands::Required(args) => cmd::required::run(args, &engine),
        Commands::DryRun(args) => cmd::dry_run::run(args, &engine),
    };
    if let Err(e) = result {
        fatal("Command failed", e);
    }
}
