//! kerntrace: replay a kernel trace into timed execution and status logs.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use log::{debug, info};

use kerntrace::config::{parse_device_table, parse_program_catalog, parse_vector_table, SimConfig};
use kerntrace::parse::parse_trace;
use kerntrace::sim::io::DirTraceSource;
use kerntrace::sim::Simulator;

/// Paths resolved from the command line.
struct Options {
    trace: PathBuf,
    vectors: PathBuf,
    devices: PathBuf,
    programs: PathBuf,
    out_dir: PathBuf,
}

fn print_usage(exe: &str) {
    eprintln!(
        "usage: {exe} <trace-file> [--vectors <file>] [--devices <file>] [--programs <file>] [--out <dir>]\n\
         \n\
         Replays <trace-file> and writes execution.txt and system_status.txt to the output\n\
         directory (default: current directory). The vector table, device table, and program\n\
         catalog default to vector_table.txt, device_table.txt, and external_files.txt next\n\
         to the trace file. Nested EXEC traces resolve as <program>.txt next to the trace file."
    );
}

fn parse_args() -> Options {
    let mut args = env::args();
    let exe = args.next().unwrap_or_else(|| "kerntrace".to_string());

    let mut trace = None;
    let mut vectors = None;
    let mut devices = None;
    let mut programs = None;
    let mut out_dir = None;

    while let Some(arg) = args.next() {
        let mut flag_value = |name: &str| match args.next() {
            Some(v) => v,
            None => {
                eprintln!("{exe}: {name} requires a value");
                std::process::exit(2);
            }
        };
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage(&exe);
                std::process::exit(0);
            }
            "--vectors" => vectors = Some(PathBuf::from(flag_value("--vectors"))),
            "--devices" => devices = Some(PathBuf::from(flag_value("--devices"))),
            "--programs" => programs = Some(PathBuf::from(flag_value("--programs"))),
            "--out" => out_dir = Some(PathBuf::from(flag_value("--out"))),
            _ if arg.starts_with('-') => {
                eprintln!("{exe}: unrecognized option {arg}");
                print_usage(&exe);
                std::process::exit(2);
            }
            _ if trace.is_none() => trace = Some(PathBuf::from(arg)),
            _ => {
                eprintln!("{exe}: unexpected argument {arg}");
                print_usage(&exe);
                std::process::exit(2);
            }
        }
    }

    let Some(trace) = trace else {
        print_usage(&exe);
        std::process::exit(2);
    };
    let trace_dir = trace.parent().unwrap_or(Path::new(".")).to_path_buf();
    Options {
        vectors: vectors.unwrap_or_else(|| trace_dir.join("vector_table.txt")),
        devices: devices.unwrap_or_else(|| trace_dir.join("device_table.txt")),
        programs: programs.unwrap_or_else(|| trace_dir.join("external_files.txt")),
        out_dir: out_dir.unwrap_or_else(|| PathBuf::from(".")),
        trace,
    }
}

fn read(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("cannot open {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let opts = parse_args();

    let config = SimConfig {
        vectors: parse_vector_table(&read(&opts.vectors)?),
        delays: parse_device_table(&read(&opts.devices)?)
            .with_context(|| format!("bad device table {}", opts.devices.display()))?,
        programs: parse_program_catalog(&read(&opts.programs)?)
            .with_context(|| format!("bad program catalog {}", opts.programs.display()))?,
    };
    for (name, size) in config.programs.iter() {
        debug!("known program: {name} ({size} Mb)");
    }

    let trace = parse_trace(&read(&opts.trace)?)
        .with_context(|| format!("bad trace file {}", opts.trace.display()))?;

    let trace_dir = opts.trace.parent().unwrap_or(Path::new(".")).to_path_buf();
    let mut sim = Simulator::new(config, DirTraceSource::new(trace_dir));
    let outcome = sim.run(&trace)?;

    let mut execution = String::new();
    for event in &outcome.execution {
        execution.push_str(&event.to_string());
        execution.push('\n');
    }
    let mut status = String::new();
    for snapshot in &outcome.status {
        status.push_str(&snapshot.to_string());
    }

    fs::create_dir_all(&opts.out_dir)
        .with_context(|| format!("cannot create {}", opts.out_dir.display()))?;
    let execution_path = opts.out_dir.join("execution.txt");
    let status_path = opts.out_dir.join("system_status.txt");
    fs::write(&execution_path, execution)
        .with_context(|| format!("cannot write {}", execution_path.display()))?;
    fs::write(&status_path, status)
        .with_context(|| format!("cannot write {}", status_path.display()))?;

    info!(
        "simulated {} events and {} snapshots over {} ticks",
        outcome.execution.len(),
        outcome.status.len(),
        outcome.end_time
    );
    Ok(())
}
