mod commands;
mod logging;
mod progress;

use std::io::{self, Write};
use std::process;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use commands::Cli;
use dotenv::dotenv;
use indicatif::HumanBytes;
use progress::CliReporter;
use pruner_core::{AppConfig, BackupEntry, ScanOptions};
use tracing::{debug, error, info, warn};

fn main() {
    dotenv().ok();

    let args = Cli::parse();
    let _guard = logging::init_logger(args.verbose);

    info!(
        "Pruner v{} - prune backups and keep daily/weekly/monthly/yearly files.",
        env!("CARGO_PKG_VERSION")
    );

    if let Err(err) = run(&args) {
        error!("Error: {:#}", err);
        process::exit(1);
    }
}

fn run(args: &Cli) -> Result<()> {
    let mut config =
        pruner_core::config::load_configuration().context("Error loading configuration")?;
    args.apply_to(&mut config);
    log_policy(&config);

    if args.filenames.is_empty() {
        info!(
            "Not given specific files to process - scanning the current directory for {} files.",
            config.extension
        );
    }

    let entries = pruner_core::collect_entries(&args.filenames, &ScanOptions::from(&config))
        .context("Error collecting backup files")?;
    if entries.is_empty() {
        warn!(
            "No files found to process. Did you forget to use the -e option? Currently using {} file extension.",
            config.extension
        );
        return Ok(());
    }

    let to_prune = pruner_core::list_entries_to_prune(&entries, &config.retention)?;
    print_prune_list(&to_prune);

    if to_prune.is_empty() || args.dry_run {
        return Ok(());
    }

    eprintln!(
        "\n{}",
        "=============================== WARNING ===============================".yellow()
    );
    eprintln!(
        "{}",
        format!(
            "You are going to delete all the files listed above ({} files in total).",
            to_prune.len()
        )
        .yellow()
    );
    eprintln!(
        "{}",
        "Please review them carefully once more and confirm the deletion.".yellow()
    );

    let confirmed = prompt_confirm(
        &"Do you want to proceed and delete all the files listed above?"
            .red()
            .to_string(),
        Some(false),
    )?;
    if !confirmed {
        println!("{}", "No changes made.".green());
        return Ok(());
    }

    countdown(config.safety_delay_secs);

    let reporter = CliReporter::new();
    let deleted = pruner_core::execute_prune(&to_prune, &reporter)?;
    println!("{}", format!("Deleted {} files.", deleted).green());

    Ok(())
}

fn log_policy(config: &AppConfig) {
    debug!("Using the following retention policy:");
    debug!("- keep up to {} daily files", config.retention.daily);
    debug!("- keep up to {} weekly files", config.retention.weekly);
    debug!("- keep up to {} monthly files", config.retention.monthly);
    debug!("- keep up to {} yearly files", config.retention.yearly);
}

fn print_prune_list(to_prune: &[BackupEntry]) {
    println!("\n{}", "The following files are to be deleted:".bold());
    if to_prune.is_empty() {
        println!("[no files]");
        return;
    }

    for entry in to_prune {
        match entry.size() {
            Some(size) => println!("{}  {}", entry.base_name(), HumanBytes(size).to_string().dimmed()),
            None => println!("{}", entry.base_name()),
        }
    }

    let total: u64 = to_prune.iter().filter_map(BackupEntry::size).sum();
    if total > 0 {
        println!(
            "{} files, {} in total",
            to_prune.len(),
            HumanBytes(total).to_string().cyan()
        );
    }
}

/// Give the user a last chance to interrupt with Ctrl+C.
fn countdown(secs: u64) {
    if secs == 0 {
        return;
    }
    eprintln!(
        "{}",
        format!(
            "Proceeding with removing in {} seconds, this is your last chance\nto interrupt the script using Ctrl+C!",
            secs
        )
        .yellow()
    );
    for remaining in (1..=secs).rev() {
        if remaining > secs / 2 {
            eprintln!("{}", remaining.to_string().yellow());
        } else {
            eprintln!("{}", remaining.to_string().red());
        }
        thread::sleep(Duration::from_secs(1));
    }
}

fn prompt_confirm(prompt: &str, default: Option<bool>) -> io::Result<bool> {
    let mut input = String::new();

    loop {
        input.clear();

        match default {
            Some(true) => print!("{} (Y/n): ", prompt),
            Some(false) | None => print!("{} (y/N): ", prompt),
        }
        io::stdout().flush()?;

        if io::stdin().read_line(&mut input)? == 0 {
            return Ok(default.unwrap_or(false));
        }

        match input.trim().to_uppercase().as_str() {
            "Y" => return Ok(true),
            "N" => return Ok(false),
            "" => match default {
                Some(default) => return Ok(default),
                None => continue,
            },
            _ => continue,
        }
    }
}
