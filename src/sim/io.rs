//! Loading nested trace files.
//!
//! An `EXEC` directive replaces the running process's image with another
//! program, whose own trace must then be interpreted. The simulator
//! resolves those traces through the [`TraceSource`] trait so that the
//! core never touches the filesystem directly: the driver plugs in
//! [`DirTraceSource`], while tests and embedders can use
//! [`MemTraceSource`].

use std::collections::HashMap;
use std::path::PathBuf;

use crate::parse::{parse_trace, TraceErr};
use crate::trace::Directive;

/// Resolves a program name to that program's own trace.
pub trait TraceSource {
    /// Loads the trace for `program`.
    ///
    /// Returns `Ok(None)` if the program has no trace (a missing file is
    /// not an error; the process image simply has no further
    /// instructions). Returns `Err` only if a trace exists but cannot be
    /// parsed.
    fn load(&self, program: &str) -> Result<Option<Vec<Directive>>, TraceErr>;
}

/// Loads `<program>.txt` from a fixed directory.
#[derive(Debug, Clone)]
pub struct DirTraceSource {
    root: PathBuf,
}

impl DirTraceSource {
    /// Creates a source that resolves traces relative to `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl TraceSource for DirTraceSource {
    fn load(&self, program: &str) -> Result<Option<Vec<Directive>>, TraceErr> {
        let path = self.root.join(format!("{program}.txt"));
        match std::fs::read_to_string(&path) {
            Ok(src) => parse_trace(&src).map(Some),
            Err(e) => {
                log::debug!("no trace for {program} at {}: {e}", path.display());
                Ok(None)
            }
        }
    }
}

/// An in-memory trace source, keyed by program name.
///
/// Programs not present in the map resolve to no trace, like a missing
/// file would.
#[derive(Debug, Clone, Default)]
pub struct MemTraceSource {
    programs: HashMap<String, Vec<Directive>>,
}

impl MemTraceSource {
    /// Creates an empty source: every program resolves to no trace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a trace for `program`, replacing any previous one.
    pub fn insert(&mut self, program: impl Into<String>, trace: Vec<Directive>) {
        self.programs.insert(program.into(), trace);
    }
}

impl TraceSource for MemTraceSource {
    fn load(&self, program: &str) -> Result<Option<Vec<Directive>>, TraceErr> {
        Ok(self.programs.get(program).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::{MemTraceSource, TraceSource};
    use crate::trace::Directive;

    #[test]
    fn test_mem_source() {
        let mut source = MemTraceSource::new();
        source.insert("progA", vec![Directive::Cpu(3)]);

        assert_eq!(source.load("progA").unwrap(), Some(vec![Directive::Cpu(3)]));
        assert_eq!(source.load("progB").unwrap(), None);
    }
}
