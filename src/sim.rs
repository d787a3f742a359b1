//! Interpreting traces.
//!
//! This module is the core of the crate: it walks a parsed directive
//! sequence and produces the timed execution log and the status-snapshot
//! log that a run of the simulated machine would emit.
//!
//! This module consists of:
//! - [`Simulator`]: the struct that owns the simulation state and
//!   interprets traces.
//! - [`mem`]: the module handling the simulated memory partitions.
//! - [`process`]: the module handling process descriptors (PCBs).
//! - [`status`]: the module handling process-table snapshots.
//! - [`io`]: the module handling how nested `EXEC` traces are loaded.
//!
//! # Usage
//!
//! To simulate a trace, parse it, then hand it to a [`Simulator`] built
//! from a [`SimConfig`] and a [`TraceSource`]:
//!
//! ```
//! use kerntrace::config::{ProgramCatalog, SimConfig};
//! use kerntrace::parse::parse_trace;
//! use kerntrace::sim::io::MemTraceSource;
//! use kerntrace::sim::Simulator;
//!
//! let config = SimConfig {
//!     vectors: vec!["0X01E3".to_string()],
//!     delays: vec![7],
//!     programs: ProgramCatalog::default(),
//! };
//! let trace = parse_trace("CPU, 5,\nSYSCALL, 0,\nCPU, 3,\n").unwrap();
//!
//! let mut sim = Simulator::new(config, MemTraceSource::new());
//! let outcome = sim.run(&trace).unwrap();
//! assert_eq!(outcome.end_time, 27);
//! ```
//!
//! # Model
//!
//! Exactly one descriptor is "current" at any instant. Control transfer
//! is entirely structural: a `FORK` suspends the current descriptor on
//! the wait queue and interprets the child branch to completion before
//! the parent resumes, and an `EXEC` replaces the current descriptor's
//! image and abandons the rest of its branch. There is no preemption and
//! no scheduler beyond this nesting, so the simulated timeline is a
//! single non-preemptive thread of execution.
//!
//! Recursion depth equals the fork/exec nesting depth of the trace;
//! pathologically nested traces will exhaust the stack rather than be
//! rejected.
//!
//! [`TraceSource`]: io::TraceSource

pub mod io;
pub mod mem;
pub mod process;
pub mod status;

use std::ops::Range;

use log::debug;

use crate::config::SimConfig;
use crate::parse::TraceErr;
use crate::trace::{Directive, DirectiveKind};
use io::TraceSource;
use mem::PartitionTable;
use process::Pcb;
use status::Snapshot;

/// Cost of switching to kernel mode on a trap, in ticks.
const KERNEL_MODE_SWITCH: u64 = 1;
/// Cost of saving the execution context on a trap, in ticks.
const CONTEXT_SAVE: u64 = 10;
/// Cost of returning from a trap, in ticks.
const IRET: u64 = 1;
/// Program load rate on `EXEC`, in ticks per MB.
const LOAD_RATE: u64 = 15;
/// Cost of marking a partition as occupied on `EXEC`, in ticks.
const MARK_PARTITION: u64 = 3;
/// Cost of updating the PCB on `EXEC`, in ticks.
const UPDATE_PCB: u64 = 6;

/// Errors that can occur during simulation.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum SimErr {
    /// A `SYSCALL`/`END_IO` device index is out of range for the
    /// configured vector and device tables.
    UnknownDevice(u64),
    /// An `EXEC` named a program absent from the program catalog.
    UnknownProgram(String),
    /// No free partition fits the named program's size. The simulation
    /// cannot proceed with an invalid memory state.
    AllocationFailure {
        /// The program that could not be placed.
        program: String,
        /// Its declared size in MB.
        size: u64,
    },
    /// A branch marker reached the scan outside of any fork region,
    /// which means the trace's nesting is malformed.
    StrayMarker(DirectiveKind),
    /// A `FORK` is not immediately followed by `IF_CHILD`.
    MissingChildBranch,
    /// A fork region was opened but its `ENDIF` is missing.
    UnclosedRegion,
    /// A nested `EXEC` trace exists but cannot be parsed.
    BadSubTrace {
        /// The program whose trace failed to parse.
        program: String,
        /// The underlying parse error.
        source: TraceErr,
    },
}
impl std::fmt::Display for SimErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimErr::UnknownDevice(d)  => write!(f, "device {d} is not in the device tables"),
            SimErr::UnknownProgram(p) => write!(f, "program {p:?} is not in the program catalog"),
            SimErr::AllocationFailure { program, size } => {
                write!(f, "no free partition fits {program:?} ({size} Mb)")
            }
            SimErr::StrayMarker(k)      => write!(f, "{k} outside of a fork region"),
            SimErr::MissingChildBranch  => f.write_str("FORK is not followed by IF_CHILD"),
            SimErr::UnclosedRegion      => f.write_str("fork region has no matching ENDIF"),
            SimErr::BadSubTrace { program, source } => {
                write!(f, "trace of {program:?} failed to parse: {source}")
            }
        }
    }
}
impl std::error::Error for SimErr {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimErr::BadSubTrace { source, .. } => Some(source),
            _ => None,
        }
    }
}
impl crate::err::Error for SimErr {
    fn help(&self) -> Option<std::borrow::Cow<'_, str>> {
        match self {
            SimErr::UnknownDevice(_)  => Some("device indices must be valid for both the vector table and the device table".into()),
            SimErr::UnknownProgram(_) => Some("declare the program and its size in the program catalog".into()),
            SimErr::StrayMarker(_)    => Some("IF_CHILD, IF_PARENT, and ENDIF only appear inside a FORK's region".into()),
            _ => None,
        }
    }
}

/// One record of the execution log.
///
/// Renders as `"<time>, <duration>, <description>"`.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Event {
    /// Simulated time at which the step began.
    pub time: u64,
    /// How many ticks the step consumed.
    pub duration: u64,
    /// What the hardware/kernel did during the step.
    pub description: String,
}
impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}, {}", self.time, self.duration, self.description)
    }
}

/// Everything one `interpret` call produced.
///
/// Logs are threaded through the recursion as return values: each
/// recursive call's effects stay local until the caller absorbs them, so
/// a branch's output can be inspected in isolation.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Outcome {
    /// The execution log, one event per simulated step.
    pub execution: Vec<Event>,
    /// The status log, one snapshot per control-transfer point.
    pub status: Vec<Snapshot>,
    /// Simulated time when the interpreted sequence finished.
    pub end_time: u64,
}

impl Outcome {
    fn new(start_time: u64) -> Self {
        Outcome {
            execution: Vec::new(),
            status: Vec::new(),
            end_time: start_time,
        }
    }

    /// Appends an event at the current time and advances the clock by its
    /// duration. Every logged step goes through here, which is what keeps
    /// the clock monotonic and duration-conserving.
    fn emit(&mut self, duration: u64, description: impl Into<String>) {
        self.execution.push(Event {
            time: self.end_time,
            duration,
            description: description.into(),
        });
        self.end_time += duration;
    }

    /// The fixed kernel-entry boilerplate every trap pays before its
    /// device-specific work: mode switch, then context save.
    fn trap_entry(&mut self) {
        self.emit(KERNEL_MODE_SWITCH, "switch to kernel mode");
        self.emit(CONTEXT_SAVE, "context saved");
    }

    /// Adopts a recursive call's logs and clock.
    fn absorb(&mut self, sub: Outcome) {
        self.execution.extend(sub.execution);
        self.status.extend(sub.status);
        self.end_time = sub.end_time;
    }
}

/// Interprets traces.
///
/// The simulator owns everything shared across the recursion: the
/// configuration tables, the partition table, the pid counter, and the
/// source of nested `EXEC` traces. The per-branch state (current
/// descriptor, wait queue, clock) is threaded through
/// [`Simulator::interpret`].
pub struct Simulator {
    /// The configuration tables.
    pub config: SimConfig,
    /// The simulated partition table.
    pub partitions: PartitionTable,
    /// Next pid to hand out. Strictly increasing across the whole run.
    next_pid: u32,
    loader: Box<dyn TraceSource>,
}

impl Simulator {
    /// Creates a simulator with a default partition table.
    pub fn new(config: SimConfig, loader: impl TraceSource + 'static) -> Self {
        Simulator {
            config,
            partitions: PartitionTable::default(),
            next_pid: 1,
            loader: Box::new(loader),
        }
    }

    /// Runs a root trace from time 0 with a fresh `init` process.
    ///
    /// This is the entry point the driver uses: it creates the `init`
    /// descriptor, places it in memory, and interprets the trace with an
    /// empty wait queue.
    pub fn run(&mut self, trace: &[Directive]) -> Result<Outcome, SimErr> {
        let mut current = Pcb::init();
        if !self.partitions.allocate(&mut current) {
            return Err(SimErr::AllocationFailure {
                program: current.program_name,
                size: current.size,
            });
        }
        let mut wait_queue = Vec::new();
        self.interpret(trace, 0, &mut current, &mut wait_queue)
    }

    /// Interprets one directive sequence.
    ///
    /// `current` is the descriptor executing this sequence and
    /// `wait_queue` holds every descriptor suspended by an enclosing
    /// `FORK`. The call returns when the sequence is exhausted or an
    /// `EXEC` replaces the process image; either way `current` is the
    /// same process that entered (possibly with a new image), and the
    /// wait queue is exactly as it was on entry.
    pub fn interpret(
        &mut self,
        trace: &[Directive],
        start_time: u64,
        current: &mut Pcb,
        wait_queue: &mut Vec<Pcb>,
    ) -> Result<Outcome, SimErr> {
        let mut out = Outcome::new(start_time);
        // ENDIF markers that close regions whose parent branch we are
        // currently executing; the scan skips exactly these.
        let mut pending_endifs: Vec<usize> = Vec::new();

        let mut i = 0;
        while i < trace.len() {
            match &trace[i] {
                Directive::Cpu(d) => {
                    out.emit(*d, "CPU Burst");
                }
                Directive::Syscall(dev) | Directive::EndIo(dev) => {
                    let isr = match trace[i].kind() {
                        DirectiveKind::Syscall => "SYSCALL ISR",
                        _ => "ENDIO ISR",
                    };
                    out.trap_entry();
                    out.emit(self.device_delay(*dev)?, isr);
                    out.emit(IRET, "IRET");
                }
                Directive::Fork(clone_cost) => {
                    out.trap_entry();
                    out.emit(*clone_cost, "cloning the PCB");
                    out.emit(0, "scheduler called");
                    out.emit(IRET, "IRET");

                    let mut child = current.forked(self.alloc_pid());
                    if !self.partitions.allocate(&mut child) {
                        return Err(SimErr::AllocationFailure {
                            program: child.program_name,
                            size: child.size,
                        });
                    }
                    debug!("pid {} forked pid {} at t={}", current.pid, child.pid, out.end_time);

                    // The parent suspends while the child branch runs.
                    wait_queue.push(current.clone());
                    out.status.push(Snapshot::capture(
                        out.end_time,
                        format!("FORK, {clone_cost}"),
                        &child,
                        wait_queue,
                    ));

                    let region = fork_region(trace, i)?;
                    let sub = self.interpret(&trace[region.child], out.end_time, &mut child, wait_queue)?;
                    out.absorb(sub);

                    // The child ran to completion: release its memory and
                    // restore the parent as current.
                    self.partitions.free(&mut child);
                    wait_queue.pop();
                    if let Some(endif) = region.pending_endif {
                        pending_endifs.push(endif);
                    }
                    i = region.resume;
                    continue;
                }
                Directive::Exec(program) => {
                    out.trap_entry();

                    // Free before re-allocating, or the old partition leaks.
                    self.partitions.free(current);
                    let size = self
                        .config
                        .programs
                        .size_of(program)
                        .ok_or_else(|| SimErr::UnknownProgram(program.clone()))?;
                    current.program_name = program.clone();
                    current.size = size;
                    if !self.partitions.allocate(current) {
                        return Err(SimErr::AllocationFailure {
                            program: program.clone(),
                            size,
                        });
                    }
                    debug!("pid {} exec {program} ({size} Mb) at t={}", current.pid, out.end_time);

                    out.emit(0, format!("Program is {size} Mb large"));
                    out.emit(size * LOAD_RATE, "loading program into memory");
                    out.emit(MARK_PARTITION, "marking partition as occupied");
                    out.emit(UPDATE_PCB, "updating PCB");
                    out.emit(0, "scheduler called");
                    out.emit(IRET, "IRET");
                    out.status.push(Snapshot::capture(
                        out.end_time,
                        format!("EXEC {program}"),
                        current,
                        wait_queue,
                    ));

                    let sub_trace = self
                        .loader
                        .load(program)
                        .map_err(|source| SimErr::BadSubTrace {
                            program: program.clone(),
                            source,
                        })?;
                    if let Some(sub_trace) = sub_trace {
                        let sub = self.interpret(&sub_trace, out.end_time, current, wait_queue)?;
                        out.absorb(sub);
                    }

                    // The process image has been replaced; the rest of
                    // this branch never executes.
                    return Ok(out);
                }
                Directive::EndIf => {
                    if pending_endifs.last() == Some(&i) {
                        pending_endifs.pop();
                    } else {
                        return Err(SimErr::StrayMarker(DirectiveKind::EndIf));
                    }
                }
                Directive::IfChild | Directive::IfParent => {
                    return Err(SimErr::StrayMarker(trace[i].kind()));
                }
            }
            i += 1;
        }
        Ok(out)
    }

    /// Bounds-checked device lookup across both configuration tables.
    fn device_delay(&self, device: u64) -> Result<u64, SimErr> {
        usize::try_from(device)
            .ok()
            .filter(|&d| d < self.config.vectors.len())
            .and_then(|d| self.config.delays.get(d).copied())
            .ok_or(SimErr::UnknownDevice(device))
    }

    fn alloc_pid(&mut self) -> u32 {
        let pid = self.next_pid;
        self.next_pid += 1;
        pid
    }
}

/// The boundaries of one `IF_CHILD .. [IF_PARENT ..] ENDIF` region.
#[derive(Debug, PartialEq, Eq, Clone)]
struct ForkRegion {
    /// Indices of the child branch's directives.
    child: Range<usize>,
    /// Index at which the parent's scan resumes.
    resume: usize,
    /// Index of the region's `ENDIF`, when the resumed scan will run
    /// through it (i.e., when a parent branch exists).
    pending_endif: Option<usize>,
}

/// Locates the region opened by the `FORK` at `fork_at`.
///
/// The scan keeps a nesting depth so that regions of nested forks inside
/// the child branch are passed over whole. The child branch is truncated
/// at a top-level `EXEC` (inclusive): the image replacement discards
/// everything after it anyway. The parent resumes right after the
/// region's `IF_PARENT` if one exists (the parent branch is the parent's
/// continuation), otherwise right after the `ENDIF`.
fn fork_region(trace: &[Directive], fork_at: usize) -> Result<ForkRegion, SimErr> {
    if trace.get(fork_at + 1) != Some(&Directive::IfChild) {
        return Err(SimErr::MissingChildBranch);
    }

    let child_start = fork_at + 2;
    let mut depth = 1usize;
    let mut if_parent = None;
    let mut exec_cut = None;
    let mut endif = None;

    for (j, directive) in trace.iter().enumerate().skip(child_start) {
        match directive {
            Directive::IfChild => depth += 1,
            Directive::EndIf => {
                depth -= 1;
                if depth == 0 {
                    endif = Some(j);
                    break;
                }
            }
            Directive::IfParent if depth == 1 && if_parent.is_none() => if_parent = Some(j),
            Directive::Exec(_) if depth == 1 && if_parent.is_none() && exec_cut.is_none() => {
                exec_cut = Some(j);
            }
            _ => {}
        }
    }
    let endif = endif.ok_or(SimErr::UnclosedRegion)?;

    let child_end = match exec_cut {
        // everything after a child-level EXEC is dead
        Some(cut) => cut + 1,
        None => if_parent.unwrap_or(endif),
    };
    let resume = match if_parent {
        Some(p) => p + 1,
        None => endif + 1,
    };
    Ok(ForkRegion {
        child: child_start..child_end,
        resume,
        pending_endif: if_parent.map(|_| endif),
    })
}
