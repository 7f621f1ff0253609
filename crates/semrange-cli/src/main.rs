use std::io::{self, BufRead};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use semrange::{Range, RangeOptions, Semrange, Version};

#[derive(Parser, Debug)]
#[command(name = "semrange")]
#[command(about = "Match semantic versions against npm-style ranges")]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check whether a version is in a range (exit code 0 = match)
    Check {
        /// The range expression, e.g. "^1.2.3 || ~2.0"
        range: String,

        /// The version to test
        version: String,

        /// Make every prerelease visible, not only anchored ones
        #[arg(long)]
        pre: bool,
    },

    /// Print the versions that satisfy a range, in input order
    Filter {
        /// The range expression
        range: String,

        /// Versions to filter; read from stdin when omitted
        versions: Vec<String>,

        /// Print only the highest matching version
        #[arg(long, conflicts_with = "min")]
        max: bool,

        /// Print only the lowest matching version
        #[arg(long, conflicts_with = "max")]
        min: bool,
    },

    /// Parse a range and print its canonical comparator form
    Parse {
        /// The range expression
        range: String,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {:#}", "error:".red().bold(), err);
            ExitCode::from(2)
        }
    }
}

fn run(args: Args) -> Result<ExitCode> {
    match args.command {
        Commands::Check {
            range,
            version,
            pre,
        } => check(&range, &version, pre),
        Commands::Filter {
            range,
            versions,
            max,
            min,
        } => filter(&range, versions, max, min),
        Commands::Parse { range } => parse(&range),
    }
}

fn check(range: &str, version: &str, pre: bool) -> Result<ExitCode> {
    let options = RangeOptions {
        include_all_prerelease: pre,
    };

    // Diagnose bad inputs explicitly; the facade would just say "no"
    let parsed_range = Range::parse_with(range, options)
        .with_context(|| format!("invalid range \"{}\"", range))?;
    let parsed_version = Version::parse_lenient(version)
        .with_context(|| format!("invalid version \"{}\"", version))?;

    log::debug!("checking {} against {}", parsed_version, parsed_range);

    if parsed_range.contains(&parsed_version.without_build_metadata()) {
        println!("{} {} matches {}", "yes:".green().bold(), version, range);
        Ok(ExitCode::SUCCESS)
    } else {
        println!("{} {} does not match {}", "no:".yellow().bold(), version, range);
        Ok(ExitCode::FAILURE)
    }
}

fn filter(range: &str, versions: Vec<String>, max: bool, min: bool) -> Result<ExitCode> {
    Range::parse(range).with_context(|| format!("invalid range \"{}\"", range))?;

    let versions = if versions.is_empty() {
        read_stdin_versions()?
    } else {
        versions
    };
    let refs: Vec<&str> = versions.iter().map(String::as_str).collect();

    let matched = if max {
        Semrange::max_satisfying(&refs, range).into_iter().collect()
    } else if min {
        Semrange::min_satisfying(&refs, range).into_iter().collect()
    } else {
        Semrange::satisfied_by(&refs, range)
    };

    log::debug!("{} of {} versions matched", matched.len(), refs.len());

    for version in &matched {
        println!("{}", version);
    }

    if matched.is_empty() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn parse(range: &str) -> Result<ExitCode> {
    let parsed = Range::parse(range).with_context(|| format!("invalid range \"{}\"", range))?;
    println!("{}", parsed);
    Ok(ExitCode::SUCCESS)
}

fn read_stdin_versions() -> Result<Vec<String>> {
    let mut versions = Vec::new();
    for line in io::stdin().lock().lines() {
        let line = line.context("reading versions from stdin")?;
        for word in line.split_whitespace() {
            versions.push(word.to_string());
        }
    }
    Ok(versions)
}
