//! Process-table snapshots.
//!
//! At every control-transfer point (`FORK`, `EXEC`) the simulator
//! captures a [`Snapshot`] of the process table: the current descriptor
//! marked `running` and every wait-queue descriptor marked `waiting`, in
//! queue order. Snapshots render as the fixed-width table of the status
//! log.

use super::process::Pcb;

const BORDER: &str = "+------------------------------------------------------+";
const HEADER: &str = "| PID |program name |partition number | size | state |";

/// Scheduling state of a row in a [`Snapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcState {
    /// The descriptor currently executing.
    Running,
    /// A descriptor suspended on the wait queue.
    Waiting,
}
impl std::fmt::Display for ProcState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcState::Running => f.write_str("running"),
            ProcState::Waiting => f.write_str("waiting"),
        }
    }
}

/// One row of a snapshot table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRow {
    /// Process id.
    pub pid: u32,
    /// Program identity at snapshot time.
    pub program_name: String,
    /// Held partition number, or -1 if unassigned.
    pub partition: i64,
    /// Memory footprint in MB.
    pub size: u64,
    /// Whether the process was running or waiting.
    pub state: ProcState,
}

impl StatusRow {
    fn new(pcb: &Pcb, state: ProcState) -> Self {
        StatusRow {
            pid: pcb.pid,
            program_name: pcb.program_name.clone(),
            partition: pcb.partition.map_or(-1, i64::from),
            size: pcb.size,
            state,
        }
    }
}

/// One process-table snapshot of the status log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Simulated time at which the snapshot was taken.
    pub time: u64,
    /// Description of the directive that triggered the snapshot.
    pub trace_desc: String,
    /// Table rows: the running descriptor first, then the wait queue in order.
    pub rows: Vec<StatusRow>,
}

impl Snapshot {
    /// Captures the process table: `current` as running, then the wait
    /// queue in order as waiting.
    pub fn capture(time: u64, trace_desc: String, current: &Pcb, wait_queue: &[Pcb]) -> Self {
        let mut rows = vec![StatusRow::new(current, ProcState::Running)];
        rows.extend(wait_queue.iter().map(|p| StatusRow::new(p, ProcState::Waiting)));
        Snapshot { time, trace_desc, rows }
    }
}

impl std::fmt::Display for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "time: {}; current trace: {}", self.time, self.trace_desc)?;
        writeln!(f, "{BORDER}")?;
        writeln!(f, "{HEADER}")?;
        writeln!(f, "{BORDER}")?;
        for row in &self.rows {
            writeln!(
                f,
                "| {} | {} | {} | {} | {} |",
                row.pid, row.program_name, row.partition, row.size, row.state
            )?;
        }
        writeln!(f, "{BORDER}")
    }
}
