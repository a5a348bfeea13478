mod cli;
mod cocomo;
mod coordinator;
mod counter;
mod error;
mod gc;
mod job;
mod languages;
mod output;
mod reader;
mod stats;
mod walker;

use clap::Parser;
use cli::Cli;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{self, Write};
use std::process::ExitCode;
use std::time::{Duration, Instant};

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.languages {
        print_languages();
        return ExitCode::SUCCESS;
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("codetally: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), error::Error> {
    let resolved = cli.resolve()?;
    let start = Instant::now();

    // Total file count isn't known ahead of a streaming walk, so this is a
    // spinner rather than the teacher's length-bound bar; it draws to
    // stderr, so it never interleaves with piped stdout output.
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] counting files...")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));

    let jobs = coordinator::run(&resolved.coordinator)?;
    spinner.finish_and_clear();

    let mut summary = stats::Summary::from_jobs(&jobs, start.elapsed(), resolved.output.by_file);
    summary.sort_languages(resolved.sort);

    let mut sink: Box<dyn Write> = match &resolved.output_path {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout()),
    };
    output::render(&summary, &resolved.output, &mut sink)?;

    if resolved.show_cocomo {
        let estimate = cocomo::estimate(summary.total_code, resolved.avg_wage);
        print_cocomo(&estimate, &mut sink)?;
    }

    Ok(())
}

fn print_cocomo(estimate: &cocomo::CocomoEstimate, out: &mut impl Write) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Estimated Cost to Develop (organic) ${:.2}", estimate.estimated_cost)?;
    writeln!(out, "Estimated Schedule Effort {:.2} months", estimate.schedule_months)?;
    writeln!(out, "Estimated People Required {:.2}", estimate.people_required)
}

fn print_languages() {
    let mut names: Vec<_> = languages::list_languages().map(|(name, _)| name).collect();
    names.sort_unstable();
    for name in names {
        println!("{name}");
    }
}
