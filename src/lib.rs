//! A discrete-event simulator for kernel traces.
//!
//! This crate replays a textual trace of a single process's behavior
//! (CPU bursts, system calls, I/O completions, `fork`, and `exec`) and
//! produces two artifacts: a chronological execution log with one timed
//! record per simulated hardware/kernel step, and a sequence of
//! process-table snapshots taken at every control-transfer point.
//!
//! # Usage
//!
//! A trace file must first be parsed into directives:
//! ```
//! use kerntrace::parse::parse_trace;
//!
//! let trace = parse_trace("
//! CPU, 5,
//! SYSCALL, 0,
//! CPU, 3,
//! ").unwrap();
//! ```
//!
//! Once parsed, the trace can be interpreted by a simulator built from
//! the three configuration tables and a source for nested `EXEC` traces:
//! ```
//! # use kerntrace::parse::parse_trace;
//! # let trace = parse_trace("CPU, 5,\nSYSCALL, 0,\nCPU, 3,\n").unwrap();
//! use kerntrace::config::{ProgramCatalog, SimConfig};
//! use kerntrace::sim::io::MemTraceSource;
//! use kerntrace::sim::Simulator;
//!
//! let config = SimConfig {
//!     vectors: vec!["0X01E3".to_string()],
//!     delays: vec![7],
//!     programs: ProgramCatalog::default(),
//! };
//!
//! let mut sim = Simulator::new(config, MemTraceSource::new());
//! let outcome = sim.run(&trace).unwrap(); // <-- Result can be handled accordingly
//!
//! for event in &outcome.execution {
//!     println!("{event}");
//! }
//! assert_eq!(outcome.end_time, 27);
//! ```
//!
//! See the [`sim`] module for the simulation model and the meaning of
//! the returned logs.
#![warn(missing_docs)]

pub mod parse;
pub mod trace;
pub mod config;
pub mod sim;
pub mod err;
