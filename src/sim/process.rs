//! Process descriptors.
//!
//! A [`Pcb`] is the simulated process control block: the identity and
//! memory footprint of one logical process. Exactly one descriptor is
//! "current" at any instant of the simulation; descriptors suspended by
//! a `FORK` sit in the wait queue until their child's branch returns.

/// The state of one simulated process.
///
/// The `init` descriptor is created once at simulation start. Every
/// `FORK` creates a new descriptor with a fresh pid; `EXEC` mutates the
/// current descriptor in place and never changes its pid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pcb {
    /// Process id, unique within a simulation run.
    pub pid: u32,
    /// Pid of the parent process, or `None` for the root process.
    pub parent_pid: Option<u32>,
    /// Human-readable program identity.
    pub program_name: String,
    /// Simulated memory footprint in MB.
    pub size: u64,
    /// Number of the memory partition currently held, if any.
    pub partition: Option<u32>,
}

impl Pcb {
    /// The root descriptor: pid 0, program `init`, 1 MB, no partition yet.
    pub fn init() -> Self {
        Pcb {
            pid: 0,
            parent_pid: None,
            program_name: "init".to_string(),
            size: 1,
            partition: None,
        }
    }

    /// A child of this descriptor, as created by `FORK`.
    ///
    /// The child copies the program identity and size but starts with no
    /// partition; the interpreter allocates one for it immediately.
    pub fn forked(&self, pid: u32) -> Self {
        Pcb {
            pid,
            parent_pid: Some(self.pid),
            program_name: self.program_name.clone(),
            size: self.size,
            partition: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Pcb;

    #[test]
    fn test_init() {
        let init = Pcb::init();
        assert_eq!(init.pid, 0);
        assert_eq!(init.parent_pid, None);
        assert_eq!(init.program_name, "init");
        assert_eq!(init.size, 1);
        assert_eq!(init.partition, None);
    }

    #[test]
    fn test_forked_inherits_identity() {
        let mut parent = Pcb::init();
        parent.program_name = "program1".to_string();
        parent.size = 15;
        parent.partition = Some(2);

        let child = parent.forked(3);
        assert_eq!(child.pid, 3);
        assert_eq!(child.parent_pid, Some(0));
        assert_eq!(child.program_name, "program1");
        assert_eq!(child.size, 15);
        // the child does not inherit the parent's partition
        assert_eq!(child.partition, None);
    }
}
