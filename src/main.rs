//! Demo binary (ambient addition, A9): runs NRPA over one of the two demo
//! boards end to end, in the teacher's plain `match`-on-`argv` style (no
//! `clap`).

use std::process::ExitCode;

use nrpa_search::{LineWalk, MorpionBoard, NrpaConfig, NrpaSearch};
use tracing_subscriber::EnvFilter;

fn usage() -> &'static str {
    "usage: nrpa-search-demo <linewalk|morpion> [num_level] [num_iter] [timeout_secs]"
}

fn run_linewalk(config: NrpaConfig) -> bool {
    let outcome = NrpaSearch::<LineWalk<50>>::new(config).run();
    match outcome {
        Ok(result) => {
            println!(
                "best score: {} (length {}, cut short: {})",
                result.best_score,
                result.best_rollout.length(),
                result.cut_short
            );
            true
        }
        Err(err) => {
            eprintln!("search failed: {err}");
            false
        }
    }
}

fn run_morpion(config: NrpaConfig) -> bool {
    let outcome = NrpaSearch::<MorpionBoard>::new(config).run();
    match outcome {
        Ok(result) => {
            println!(
                "best score: {} (length {}, cut short: {})",
                result.best_score,
                result.best_rollout.length(),
                result.cut_short
            );
            true
        }
        Err(err) => {
            eprintln!("search failed: {err}");
            false
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("{}", usage());
        return ExitCode::FAILURE;
    }

    let mut config = NrpaConfig::default();
    config.num_level = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(2);
    config.num_iter = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(100);
    config.timeout_secs = args.get(4).and_then(|s| s.parse().ok()).unwrap_or(0);

    if let Err(err) = config.validate() {
        eprintln!("invalid configuration: {err}");
        return ExitCode::FAILURE;
    }

    let succeeded = match args[1].as_str() {
        "linewalk" => run_linewalk(config),
        "morpion" => run_morpion(config),
        other => {
            eprintln!("unknown board {other:?}\n{}", usage());
            return ExitCode::FAILURE;
        }
    };

    if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
