//! The trace data model.
//!
//! A trace file is an ordered sequence of [`Directive`]s, one per line.
//! Each directive describes one step of the simulated process's behavior:
//! a CPU burst, a trap (`SYSCALL`, `END_IO`, `FORK`, `EXEC`), or a
//! structural marker delimiting a fork's child and parent branches
//! (`IF_CHILD`, `IF_PARENT`, `ENDIF`).
//!
//! Directives are produced by the [`parse`] module and consumed by the
//! [`sim`] module.
//!
//! [`parse`]: crate::parse
//! [`sim`]: crate::sim

use std::str::FromStr;

/// One parsed trace instruction.
///
/// Durations are simulated ticks, except for [`Syscall`] and [`EndIo`],
/// where the number is a device index into the configured device tables.
///
/// [`Syscall`]: Directive::Syscall
/// [`EndIo`]: Directive::EndIo
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Directive {
    /// A CPU burst of the given length.
    Cpu(u64),
    /// A system call to the given device.
    Syscall(u64),
    /// An I/O completion interrupt from the given device.
    EndIo(u64),
    /// Process duplication, with the given PCB clone cost.
    Fork(u64),
    /// Process-image replacement with the named program.
    Exec(String),
    /// Opens the child branch of a fork region.
    IfChild,
    /// Opens the parent branch of a fork region.
    IfParent,
    /// Closes a fork region.
    EndIf,
}

impl Directive {
    /// The kind of this directive, with any payload stripped.
    pub fn kind(&self) -> DirectiveKind {
        match self {
            Directive::Cpu(_)     => DirectiveKind::Cpu,
            Directive::Syscall(_) => DirectiveKind::Syscall,
            Directive::EndIo(_)   => DirectiveKind::EndIo,
            Directive::Fork(_)    => DirectiveKind::Fork,
            Directive::Exec(_)    => DirectiveKind::Exec,
            Directive::IfChild    => DirectiveKind::IfChild,
            Directive::IfParent   => DirectiveKind::IfParent,
            Directive::EndIf      => DirectiveKind::EndIf,
        }
    }

    /// Whether this directive is a branch marker
    /// (`IF_CHILD`, `IF_PARENT`, or `ENDIF`).
    pub fn is_marker(&self) -> bool {
        matches!(self, Directive::IfChild | Directive::IfParent | Directive::EndIf)
    }
}

/// The kind of a [`Directive`].
///
/// Kinds correspond one-to-one with the case-sensitive keywords of the
/// trace file format. The keyword spelling is available through
/// [`Display`], and [`FromStr`] performs the reverse (exact) match.
///
/// [`Display`]: std::fmt::Display
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum DirectiveKind {
    /// `CPU`
    Cpu,
    /// `SYSCALL`
    Syscall,
    /// `END_IO`
    EndIo,
    /// `FORK`
    Fork,
    /// `EXEC`
    Exec,
    /// `IF_CHILD`
    IfChild,
    /// `IF_PARENT`
    IfParent,
    /// `ENDIF`
    EndIf,
}

impl FromStr for DirectiveKind {
    type Err = ();

    // Keywords are case-sensitive: "cpu" is not a directive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CPU"       => Ok(DirectiveKind::Cpu),
            "SYSCALL"   => Ok(DirectiveKind::Syscall),
            "END_IO"    => Ok(DirectiveKind::EndIo),
            "FORK"      => Ok(DirectiveKind::Fork),
            "EXEC"      => Ok(DirectiveKind::Exec),
            "IF_CHILD"  => Ok(DirectiveKind::IfChild),
            "IF_PARENT" => Ok(DirectiveKind::IfParent),
            "ENDIF"     => Ok(DirectiveKind::EndIf),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DirectiveKind::Cpu      => f.write_str("CPU"),
            DirectiveKind::Syscall  => f.write_str("SYSCALL"),
            DirectiveKind::EndIo    => f.write_str("END_IO"),
            DirectiveKind::Fork     => f.write_str("FORK"),
            DirectiveKind::Exec     => f.write_str("EXEC"),
            DirectiveKind::IfChild  => f.write_str("IF_CHILD"),
            DirectiveKind::IfParent => f.write_str("IF_PARENT"),
            DirectiveKind::EndIf    => f.write_str("ENDIF"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Directive, DirectiveKind};

    #[test]
    fn test_kind_round_trip() {
        let kinds = [
            DirectiveKind::Cpu, DirectiveKind::Syscall, DirectiveKind::EndIo,
            DirectiveKind::Fork, DirectiveKind::Exec, DirectiveKind::IfChild,
            DirectiveKind::IfParent, DirectiveKind::EndIf,
        ];
        for kind in kinds {
            assert_eq!(kind.to_string().parse(), Ok(kind));
        }
    }

    #[test]
    fn test_kind_case_sensitive() {
        assert_eq!("cpu".parse::<DirectiveKind>(), Err(()));
        assert_eq!("Fork".parse::<DirectiveKind>(), Err(()));
        assert_eq!("END_io".parse::<DirectiveKind>(), Err(()));
    }

    #[test]
    fn test_markers() {
        assert!(Directive::IfChild.is_marker());
        assert!(Directive::IfParent.is_marker());
        assert!(Directive::EndIf.is_marker());
        assert!(!Directive::Cpu(4).is_marker());
        assert!(!Directive::Exec("p".to_string()).is_marker());
    }
}
