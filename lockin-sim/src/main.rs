mod simulation;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use lockin_core::PathId;
use simulation::{SimConfig, SimReport, run_simulation};

#[derive(Debug, Parser)]
#[command(name = "lockin-sim", version = "0.1.0")]
#[command(about = "Headless QA simulation for the LockIn habit engine")]
struct Args {
    /// Seeds to run (comma-separated)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Simulated days per run
    #[arg(long, default_value_t = 90)]
    days: u32,

    /// Path to play (PRODUCTIVE, STRONGER, EXTROVERT, DISCIPLINE,
    /// MENTAL_HEALTH, OTHER)
    #[arg(long, default_value = "DISCIPLINE")]
    path: String,

    /// Missions completed per simulated day
    #[arg(long, default_value_t = 4)]
    completions_per_day: usize,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "console"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    println!("{}", "🔒 LockIn Engine Simulator".bright_cyan().bold());
    println!("{}", "================================".cyan());

    let path: PathId = args
        .path
        .parse()
        .map_err(|()| anyhow!("unknown path: {}", args.path))?;
    let seeds = parse_seeds(&args.seeds)?;

    let start_time = Instant::now();
    let mut reports = Vec::with_capacity(seeds.len());
    for seed in seeds {
        let config = SimConfig {
            seed,
            days: args.days,
            path,
            completions_per_day: args.completions_per_day,
            verbose: args.verbose,
        };
        let report = run_simulation(&config);
        announce_run(&report);
        reports.push(report);
    }

    write_reports(&args, &reports, start_time)?;

    if reports.iter().any(|r| !r.passed()) {
        std::process::exit(1);
    }
    Ok(())
}

fn parse_seeds(seeds_arg: &str) -> Result<Vec<u64>> {
    seeds_arg
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .parse::<u64>()
                .with_context(|| format!("invalid seed: {token}"))
        })
        .collect()
}

fn announce_run(report: &SimReport) {
    if report.passed() {
        println!(
            "✅ [seed {}] {} days on {}: level {}, streak {}, {} frames",
            report.seed,
            report.days,
            report.path.green(),
            report.final_level,
            report.final_streak,
            report.unlocked_frames.len()
        );
    } else {
        eprintln!(
            "❌ [seed {}] {} violations on {}",
            report.seed,
            report.violations.len(),
            report.path.red()
        );
        for violation in &report.violations {
            eprintln!("   {violation}");
        }
    }
}

fn write_reports(args: &Args, reports: &[SimReport], start_time: Instant) -> Result<()> {
    let mut target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => {
            let json = serde_json::to_string_pretty(reports)?;
            writeln!(&mut target, "{json}")?;
        }
        _ => {
            writeln!(&mut target)?;
            writeln!(&mut target, "Simulation Summary")?;
            writeln!(&mut target, "------------------")?;
            for report in reports {
                writeln!(
                    &mut target,
                    "seed {:>10}  level {:>3}  xp {:>5}  streak {:>3}  rank {:12}  OVR {:>3}  {}",
                    report.seed,
                    report.final_level,
                    report.final_xp,
                    report.final_streak,
                    report.final_rank,
                    report.ratings.overall,
                    if report.passed() { "pass" } else { "FAIL" }
                )?;
            }
        }
    }

    let duration = start_time.elapsed();
    writeln!(&mut target)?;
    writeln!(&mut target, "🏁 Total time: {duration:?}")?;
    target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
