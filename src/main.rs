//! pcbench CLI - parallel CPU benchmark and system diagnostics
//!
//! Runs the benchmark by default; `report` and `analyze` cover system
//! introspection.

use chrono::Local;
use clap::Parser;
use pcbench::config::{parse_size, BenchmarkConfig, CliArgs, Commands, OutputFormat, ReportOptions};
use pcbench::core::BenchmarkRunner;
use pcbench::error::{BenchError, Result};
use pcbench::report::{host_name, FileSink, JsonSink, MultiSink, SystemReport, SystemReportInputs, TextSink};
use pcbench::system::{
    default_probes, run_probes, DiskIoCounters, DiskSpeedTest, SystemInfo, UsageSnapshot,
};
use std::path::Path;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Interval over which CPU usage is sampled for snapshots
const USAGE_SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

fn main() {
    // Parse CLI arguments
    let args = CliArgs::parse();

    init_logging(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: CliArgs) -> Result<()> {
    if let Some(command) = &args.command {
        return handle_command(command);
    }

    let config = BenchmarkConfig::from_cli(&args)?;
    let options = ReportOptions::from_cli(&args);

    if args.verbose > 0 && options.format == OutputFormat::Text {
        print_config(&config, &options);
    }

    cmd_benchmark(&config, &options)
}

fn handle_command(command: &Commands) -> Result<()> {
    match command {
        Commands::Report {
            output_dir,
            skip_disk_test,
            disk_test_size,
        } => cmd_report(output_dir, *skip_disk_test, disk_test_size),
        Commands::Analyze => cmd_analyze(),
    }
}

fn cmd_benchmark(config: &BenchmarkConfig, options: &ReportOptions) -> Result<()> {
    let mut sinks = MultiSink::new();

    if !options.quiet {
        match options.format {
            OutputFormat::Text => sinks.push(Box::new(TextSink::stdout())),
            OutputFormat::Json => sinks.push(Box::new(JsonSink::stdout())),
        }
    }

    let mut saved_path = None;
    if options.save {
        let snapshot = if options.snapshot {
            Some(UsageSnapshot::collect(USAGE_SAMPLE_INTERVAL).render())
        } else {
            None
        };
        let sink = FileSink::new(&options.output_dir).with_snapshot(snapshot);
        saved_path = Some(sink.path().to_path_buf());
        sinks.push(Box::new(sink));
    } else if options.snapshot {
        tracing::warn!("--snapshot has no effect without --save");
    }

    let mut runner = BenchmarkRunner::new().with_sink(Box::new(sinks));
    runner.run(config)?;

    if let Some(path) = saved_path {
        // Keep stdout a valid JSON document
        if options.format == OutputFormat::Json {
            eprintln!("Report saved to: {}", path.display());
        } else {
            println!("Report saved to: {}", path.display());
        }
    }

    Ok(())
}

fn cmd_report(output_dir: &Path, skip_disk_test: bool, disk_test_size: &str) -> Result<()> {
    let test_size = parse_size(disk_test_size)
        .map_err(|e| BenchError::config(format!("Invalid disk test size: {}", e)))?;

    println!("Collecting system information...");
    let info = SystemInfo::collect();
    let capabilities = run_probes(&default_probes());
    let usage = UsageSnapshot::collect(USAGE_SAMPLE_INTERVAL);
    let disk_io = DiskIoCounters::collect();
    if let Err(reason) = &disk_io {
        tracing::warn!("Disk I/O counters unavailable: {}", reason);
    }

    let disk_speed = if skip_disk_test {
        None
    } else {
        println!(
            "Running disk speed test ({})...",
            humansize::format_size(test_size, humansize::BINARY)
        );
        Some(DiskSpeedTest::new(test_size).run(output_dir).map_err(|e| e.to_string()))
    };

    let report = SystemReport::from_inputs(
        host_name(),
        Local::now(),
        SystemReportInputs {
            info: &info,
            capabilities: &capabilities,
            usage: &usage,
            disk_io,
            disk_speed,
        },
    );

    let path = report.save(output_dir)?;
    println!("Report saved to: {}", path.display());

    Ok(())
}

fn cmd_analyze() -> Result<()> {
    println!("Analyzing system resources...\n");

    let system_info = SystemInfo::collect();
    system_info.print_summary();

    Ok(())
}

fn print_config(config: &BenchmarkConfig, options: &ReportOptions) {
    println!("=== Configuration ===");
    println!("Iterations:  {}", config.iteration_count_per_worker);
    println!("Workers:     {}", config.worker_count);
    println!("Repeat:      {}", config.iteration_repeat_count);
    match config.iteration_timeout {
        Some(timeout) => println!("Timeout:     {}", humantime::format_duration(timeout)),
        None => println!("Timeout:     none"),
    }
    println!("Format:      {:?}", options.format);
    if options.save {
        println!("Output dir:  {}", options.output_dir.display());
    }
    println!();
}
