//! Error reporting utilities.
//!
//! All of the fatal error types in this crate ([`LexErr`], [`TraceErr`],
//! [`CfgErr`], [`SimErr`]) implement this module's [`Error`] trait,
//! which extends [`std::error::Error`] with an optional help message
//! that a frontend can surface next to the diagnostic.
//!
//! [`LexErr`]: crate::parse::lex::LexErr
//! [`TraceErr`]: crate::parse::TraceErr
//! [`CfgErr`]: crate::config::CfgErr
//! [`SimErr`]: crate::sim::SimErr

use std::borrow::Cow;

/// Unified error interface for this crate.
pub trait Error: std::error::Error {
    /// A hint on how the user might resolve this error, if one exists.
    fn help(&self) -> Option<Cow<'_, str>> {
        None
    }
}
