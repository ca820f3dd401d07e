use clap::Args;
use skillmacro::api::MacroEngine;
use skillmacro::config::Config;
use skillmacro::error::MacroResult;
use skillmacro::scheduler::{CancelToken, KeySink, SystemClock};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

#[derive(Args, Debug, Clone)]
pub struct DryRunArgs {
    #[command(flatten)]
    pub config: Config,

    /// How long to run the live loop, in seconds.
    #[arg(short = 'T', long, default_value_t = 5)]
    pub time: u64,
}

/// Prints key events instead of injecting them.
struct ConsoleSink {
    started: Instant,
    presses: AtomicUsize,
}

impl KeySink for ConsoleSink {
    fn press(&self, key: &str) {
        self.presses.fetch_add(1, Ordering::Relaxed);
        println!("  {:>7.3}s  ⌨️  {}", self.started.elapsed().as_secs_f64(), key);
    }

    fn click(&self) {
        println!("  {:>7.3}s  🖱️  click", self.started.elapsed().as_secs_f64());
    }
}

pub fn run(args: DryRunArgs, engine: &MacroEngine) -> MacroResult<()> {
    let cancel = CancelToken::new();
    let sink = ConsoleSink {
        started: Instant::now(),
        presses: AtomicUsize::new(0),
    };
    let clock = SystemClock::new();

    println!("\n▶️  Dry run for {}s (keys are printed, not sent)", args.time);
    thread::scope(|s| {
        let stopper = cancel.clone();
        s.spawn(move || {
            thread::sleep(Duration::from_secs(args.time));
            stopper.cancel();
        });
        engine.run_live(&cancel, &sink, &clock)
    })?;
    println!("✅ {} key presses", sink.presses.load(Ordering::Relaxed));
    Ok(())
}
