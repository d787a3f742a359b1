//! Simulation configuration tables.
//!
//! The simulator consults three tables, each read from a plain-text file:
//!
//! - the **vector table** ([`parse_vector_table`]): one ISR memory address
//!   per line. Addresses are kept verbatim; the simulator only checks a
//!   device index against the table's length.
//! - the **device table** ([`parse_device_table`]): one service delay
//!   (in ticks) per line, indexed by device number.
//! - the **program catalog** ([`ProgramCatalog`]): `name, size` per line,
//!   declaring the memory footprint (in MB) of every program an `EXEC`
//!   directive may name.
//!
//! [`SimConfig`] bundles all three for the simulator.

/// All configuration tables the simulator needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimConfig {
    /// ISR addresses, indexed by device number.
    pub vectors: Vec<String>,
    /// Device service delays in ticks, indexed by device number.
    pub delays: Vec<u64>,
    /// Declared sizes of the programs `EXEC` can load.
    pub programs: ProgramCatalog,
}

/// The catalog of known external programs and their declared sizes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramCatalog {
    entries: Vec<(String, u64)>,
}

impl ProgramCatalog {
    /// Builds a catalog from `(name, size)` pairs.
    pub fn new(entries: Vec<(String, u64)>) -> Self {
        Self { entries }
    }

    /// Looks up the declared size (in MB) of a program, if it is known.
    pub fn size_of(&self, name: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|&(_, size)| size)
    }

    /// Iterates over the catalog in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|&(ref n, size)| (n.as_str(), size))
    }
}

/// Parses a vector table: one ISR address per line.
///
/// Addresses are opaque to the simulator, so any non-blank line is
/// accepted verbatim.
pub fn parse_vector_table(src: &str) -> Vec<String> {
    nonblank_lines(src).map(|(_, line)| line.to_string()).collect()
}

/// Parses a device table: one delay (in ticks) per line.
pub fn parse_device_table(src: &str) -> Result<Vec<u64>, CfgErr> {
    nonblank_lines(src)
        .map(|(n, line)| {
            line.parse::<u64>().map_err(|_| CfgErr {
                line: n,
                kind: CfgErrKind::BadDelay(line.to_string()),
            })
        })
        .collect()
}

/// Parses a program catalog: `name, size` per line.
pub fn parse_program_catalog(src: &str) -> Result<ProgramCatalog, CfgErr> {
    let mut entries = Vec::new();
    for (n, line) in nonblank_lines(src) {
        let (name, size) = line
            .split_once(',')
            .ok_or(CfgErr { line: n, kind: CfgErrKind::MissingSize })?;
        let name = name.trim();
        if name.is_empty() {
            return Err(CfgErr { line: n, kind: CfgErrKind::MissingName });
        }
        let size = size.trim().parse::<u64>().map_err(|_| CfgErr {
            line: n,
            kind: CfgErrKind::BadSize(size.trim().to_string()),
        })?;
        entries.push((name.to_string(), size));
    }
    Ok(ProgramCatalog::new(entries))
}

fn nonblank_lines(src: &str) -> impl Iterator<Item = (usize, &str)> {
    src.lines()
        .enumerate()
        .map(|(n, line)| (n + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
}

/// Kinds of errors that can occur from parsing a configuration table.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum CfgErrKind {
    /// A device-table line is not an integer delay.
    BadDelay(String),
    /// A catalog line's size field is not an integer.
    BadSize(String),
    /// A catalog line has no `, size` field.
    MissingSize,
    /// A catalog line has an empty program name.
    MissingName,
}
impl std::fmt::Display for CfgErrKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CfgErrKind::BadDelay(s) => write!(f, "invalid device delay {s:?}"),
            CfgErrKind::BadSize(s)  => write!(f, "invalid program size {s:?}"),
            CfgErrKind::MissingSize => f.write_str("expected `name, size`"),
            CfgErrKind::MissingName => f.write_str("program name is empty"),
        }
    }
}

/// An error from parsing a configuration table, with the offending line.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct CfgErr {
    /// 1-based line number of the line that failed to parse.
    pub line: usize,
    /// What went wrong on that line.
    pub kind: CfgErrKind,
}
impl std::fmt::Display for CfgErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.kind)
    }
}
impl std::error::Error for CfgErr {}
impl crate::err::Error for CfgErr {
    fn help(&self) -> Option<std::borrow::Cow<'_, str>> {
        match self.kind {
            CfgErrKind::BadDelay(_) => Some("device-table lines hold one delay in ticks, e.g. `110`".into()),
            _ => Some("catalog lines hold a name and a size in MB, e.g. `program1, 15`".into()),
        }
    }
}
