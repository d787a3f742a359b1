//! Simulated memory partitions.
//!
//! The machine's memory is a fixed, ordered set of [`Partition`]s. A
//! process occupies at most one partition at a time, and a partition is
//! occupied by at most one process. [`PartitionTable::allocate`] performs
//! best-fit placement; there is no compaction or swapping.

use super::process::Pcb;

/// Capacities (in MB) of the default partition layout, numbered 1..=6.
const DEFAULT_CAPACITIES: [u64; 6] = [40, 25, 15, 10, 8, 2];

/// One fixed-capacity memory partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    /// Partition number. Numbering starts at 1.
    pub number: u32,
    /// Capacity in MB.
    pub capacity: u64,
    /// Pid of the occupying process, if any.
    pub occupant: Option<u32>,
}

/// The simulated partition table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionTable {
    partitions: Vec<Partition>,
}

impl Default for PartitionTable {
    fn default() -> Self {
        Self::with_capacities(&DEFAULT_CAPACITIES)
    }
}

impl PartitionTable {
    /// Builds a table with the given capacities, numbered from 1 in order.
    pub fn with_capacities(capacities: &[u64]) -> Self {
        let partitions = capacities
            .iter()
            .enumerate()
            .map(|(i, &capacity)| Partition {
                number: i as u32 + 1,
                capacity,
                occupant: None,
            })
            .collect();
        Self { partitions }
    }

    /// Best-fit allocation for `pcb`.
    ///
    /// Assigns the smallest free partition whose capacity is at least
    /// `pcb.size` (lowest number on a capacity tie), records `pcb.pid` as
    /// the occupant, and sets `pcb.partition`. Returns `false` without
    /// mutating anything if no free partition fits; the caller must treat
    /// that as fatal.
    pub fn allocate(&mut self, pcb: &mut Pcb) -> bool {
        let best = self
            .partitions
            .iter_mut()
            .filter(|p| p.occupant.is_none() && p.capacity >= pcb.size)
            .min_by_key(|p| (p.capacity, p.number));
        match best {
            Some(partition) => {
                partition.occupant = Some(pcb.pid);
                pcb.partition = Some(partition.number);
                true
            }
            None => false,
        }
    }

    /// Releases the partition held by `pcb`, if any.
    ///
    /// Must be called before re-allocating on `EXEC`, or the old
    /// partition leaks.
    pub fn free(&mut self, pcb: &mut Pcb) {
        if let Some(number) = pcb.partition.take() {
            if let Some(partition) = self.partitions.iter_mut().find(|p| p.number == number) {
                partition.occupant = None;
            }
        }
    }

    /// The partitions, in table order.
    pub fn partitions(&self) -> &[Partition] {
        &self.partitions
    }
}

#[cfg(test)]
mod tests {
    use super::super::process::Pcb;
    use super::PartitionTable;

    fn pcb(pid: u32, size: u64) -> Pcb {
        Pcb {
            pid,
            parent_pid: None,
            program_name: format!("p{pid}"),
            size,
            partition: None,
        }
    }

    #[test]
    fn test_best_fit_picks_smallest() {
        let mut table = PartitionTable::default();

        // init (1 MB) lands in the 2 MB partition, which is number 6
        let mut init = pcb(0, 1);
        assert!(table.allocate(&mut init));
        assert_eq!(init.partition, Some(6));

        // 9 MB does not fit the 8 MB partition, so it takes the 10 MB one
        let mut p = pcb(1, 9);
        assert!(table.allocate(&mut p));
        assert_eq!(p.partition, Some(4));

        // an exact fit takes its own capacity
        let mut q = pcb(2, 25);
        assert!(table.allocate(&mut q));
        assert_eq!(q.partition, Some(2));
    }

    #[test]
    fn test_allocation_failure_mutates_nothing() {
        let mut table = PartitionTable::default();
        let before = table.clone();

        let mut huge = pcb(0, 41);
        assert!(!table.allocate(&mut huge));
        assert_eq!(huge.partition, None);
        assert_eq!(table, before);
    }

    #[test]
    fn test_occupied_partition_is_skipped() {
        let mut table = PartitionTable::default();
        let mut a = pcb(0, 2);
        let mut b = pcb(1, 2);
        assert!(table.allocate(&mut a));
        assert!(table.allocate(&mut b));
        assert_eq!(a.partition, Some(6));
        // partition 6 is taken, so the next-smallest fitting one is used
        assert_eq!(b.partition, Some(5));
        assert_ne!(a.partition, b.partition);
    }

    #[test]
    fn test_free_then_reallocate() {
        let mut table = PartitionTable::default();
        let mut a = pcb(0, 2);
        assert!(table.allocate(&mut a));
        table.free(&mut a);
        assert_eq!(a.partition, None);

        let mut b = pcb(1, 2);
        assert!(table.allocate(&mut b));
        assert_eq!(b.partition, Some(6));
    }

    #[test]
    fn test_exhaustion() {
        let mut table = PartitionTable::with_capacities(&[4, 4]);
        let mut a = pcb(0, 3);
        let mut b = pcb(1, 3);
        let mut c = pcb(2, 3);
        assert!(table.allocate(&mut a));
        assert!(table.allocate(&mut b));
        assert!(!table.allocate(&mut c));
    }
}
