//! Pluginfuzz - randomized long-session fuzzing of audio processors
//!
//! Entry point for the command-line fuzzer.

use anyhow::Result;
use pluginfuzz::cli::{self, Command};
use std::process::ExitCode;
use tracing::{error, info};

fn main() -> Result<ExitCode> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pluginfuzz=info".parse()?)
                .add_directive("pluginfuzz_core=info".parse()?),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli_args = match cli::parse_args(&args) {
        Ok(Command::Run(cli_args)) => cli_args,
        Ok(Command::Help) => {
            cli::print_help();
            return Ok(ExitCode::SUCCESS);
        }
        Ok(Command::Version) => {
            println!(
                "pluginfuzz {} (built {})",
                pluginfuzz::VERSION,
                pluginfuzz::BUILD_DATE
            );
            return Ok(ExitCode::SUCCESS);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            cli::print_help();
            return Ok(ExitCode::from(2));
        }
    };

    println!("╔════════════════════════════════════════════════════════════╗");
    println!(
        "║          Pluginfuzz v{} - Audio Processor Fuzzer          ║",
        pluginfuzz::VERSION
    );
    println!("╚════════════════════════════════════════════════════════════╝");
    println!();

    let report = match cli::run(&cli_args) {
        Ok(report) => report,
        Err(e) => {
            error!("Fuzz run failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    println!();
    println!(
        "Seed: {:#x}  Processor: {}",
        report.seed,
        report.processor.name()
    );
    println!(
        "{:>10} {:>14} {:>12} {:>9} {:>9} {:>10}",
        "Rate", "Samples", "Sub-blocks", "Failures", "Warnings", "Realtime"
    );
    for session in &report.sessions {
        println!(
            "{:>10.0} {:>14} {:>12} {:>9} {:>9} {:>9.1}x",
            session.sample_rate,
            session.samples_processed,
            session.sub_blocks,
            session.failures,
            session.warnings,
            session.realtime_factor()
        );
    }
    println!();

    for failure in report.failures.iter().take(10) {
        println!(
            "  FAILED: {} (expected {}, got {})",
            failure.name, failure.expected, failure.actual
        );
    }

    if report.passed() {
        info!(passed = report.assertions_passed, "All assertions passed");
        println!("PASSED: {} assertions", report.assertions_passed);
        Ok(ExitCode::SUCCESS)
    } else {
        println!(
            "FAILED: {} of {} assertions (rerun with --seed {:#x})",
            report.assertions_failed,
            report.assertions_passed + report.assertions_failed,
            report.seed
        );
        Ok(ExitCode::FAILURE)
    }
}
