//! Error types and diagnostics.
//!
//! Every failure in this crate is reported through [`Error`]. Which channel
//! carries it is decided at build time: by default [`raise`] returns
//! `Err(error)`; with the `panic-on-error` feature it panics with the error's
//! message instead. The signatures are the same in both builds, so call
//! sites never change.
//!
//! The engine keeps a process-wide (per-thread) record of its most recent
//! problem. [`last_error`] reads it back as a [`Diagnostic`], which is also
//! what a parse failure carries.
#![allow(unsafe_code)]

use std::fmt;

use crate::sys;
use crate::tree::DocumentKind;
use crate::util::strings;
use crate::xpath::XPathKind;

/// Severity level of an engine diagnostic, matching libxml2's `xmlErrorLevel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorSeverity {
    /// A non-fatal issue that doesn't prevent parsing.
    Warning,
    /// A recoverable error; the document is malformed.
    Error,
    /// An unrecoverable error.
    Fatal,
}

impl ErrorSeverity {
    fn from_level(level: i32) -> Self {
        match level {
            sys::XML_ERR_WARNING | sys::XML_ERR_NONE => Self::Warning,
            sys::XML_ERR_ERROR => Self::Error,
            _ => Self::Fatal,
        }
    }
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
            Self::Fatal => write!(f, "fatal error"),
        }
    }
}

/// Source location reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    /// 1-based line number, 0 when unknown.
    pub line: u32,
    /// 1-based column number, 0 when unknown.
    pub column: u32,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A single diagnostic recorded by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The severity of this diagnostic.
    pub severity: ErrorSeverity,
    /// Human-readable message, without the engine's trailing newline.
    pub message: String,
    /// Where in the input the problem was detected.
    pub location: SourceLocation,
}

impl Diagnostic {
    /// A diagnostic for failures the engine did not describe.
    pub(crate) fn unknown(message: &str) -> Self {
        Self {
            severity: ErrorSeverity::Fatal,
            message: message.to_owned(),
            location: SourceLocation::default(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} at {}",
            self.severity, self.message, self.location
        )
    }
}

/// The error type of this crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// The engine could not produce a document from the input.
    #[error("failed to parse {kind} document: {diagnostic}")]
    Parse {
        /// Which parser was used.
        kind: DocumentKind,
        /// The engine's description of the failure.
        diagnostic: Diagnostic,
    },

    /// An `XPath` expression could not be compiled or evaluated.
    #[error("XPath expression `{expression}` failed: {message}")]
    XPath {
        /// The expression as given.
        expression: String,
        /// The engine's description of the failure.
        message: String,
    },

    /// A typed accessor was called on a result of another kind.
    #[error("XPath result is a {found}, not a {expected}")]
    TypeMismatch {
        /// The kind the caller asked for.
        expected: XPathKind,
        /// The kind the result actually has.
        found: XPathKind,
    },

    /// A node-set cursor was dereferenced outside the set.
    #[error("index {index} is out of range for a node-set of length {len}")]
    IndexOutOfRange {
        /// The offending position.
        index: isize,
        /// Length of the node-set.
        len: usize,
    },

    /// A string passed to the engine contains a NUL byte.
    #[error("string contains an interior NUL byte at offset {offset}")]
    InteriorNul {
        /// Byte offset of the first NUL.
        offset: usize,
    },

    /// Input is longer than the engine can address.
    #[error("input of {len} bytes exceeds the engine's size limit")]
    InputTooLarge {
        /// Length of the rejected input.
        len: usize,
    },

    /// The engine returned no object where one was required.
    #[error("libxml2 could not allocate {what}")]
    Allocation {
        /// What was being created.
        what: &'static str,
    },

    /// A [`Library`](crate::Library) guard is already alive.
    #[error("the library is already initialized by another guard")]
    AlreadyInitialized,
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Reports `error` through the configured channel.
///
/// # Errors
///
/// Always returns `Err(error)` in the default build.
///
/// # Panics
///
/// With the `panic-on-error` feature this panics with the error's message.
#[track_caller]
pub fn raise<T>(error: Error) -> Result<T> {
    if cfg!(feature = "panic-on-error") {
        panic!("{error}");
    }
    Err(error)
}

/// Returns the engine's most recent diagnostic on this thread, if any.
///
/// The engine overwrites it as a side effect of later operations, so read it
/// right after the call you are interested in.
pub fn last_error() -> Option<Diagnostic> {
    // SAFETY: the engine returns null or a pointer to its own error record,
    // valid until the next engine call on this thread.
    let err = unsafe { sys::xmlGetLastError() };
    if err.is_null() {
        return None;
    }
    // SAFETY: non-null, checked above.
    let err = unsafe { &*err };
    if err.code == 0 {
        return None;
    }
    // SAFETY: `message` is null or a NUL-terminated string owned by the record.
    let message = unsafe { strings::borrowed(err.message.cast()) }
        .map(|m| m.trim_end().to_owned())
        .unwrap_or_default();
    Some(Diagnostic {
        severity: ErrorSeverity::from_level(err.level),
        message,
        location: SourceLocation {
            line: u32::try_from(err.line).unwrap_or(0),
            column: u32::try_from(err.int2).unwrap_or(0),
        },
    })
}

/// Clears the engine's most recent diagnostic on this thread.
pub fn clear_last_error() {
    // SAFETY: resets engine-owned state; no pointers are involved.
    unsafe { sys::xmlResetLastError() };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_location_display() {
        let loc = SourceLocation { line: 10, column: 5 };
        assert_eq!(loc.to_string(), "10:5");
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic {
            severity: ErrorSeverity::Warning,
            message: "attribute value not quoted".to_string(),
            location: SourceLocation { line: 3, column: 10 },
        };
        assert_eq!(
            diag.to_string(),
            "warning: attribute value not quoted at 3:10"
        );
    }

    #[test]
    fn test_error_severity_from_level() {
        assert_eq!(ErrorSeverity::from_level(1), ErrorSeverity::Warning);
        assert_eq!(ErrorSeverity::from_level(2), ErrorSeverity::Error);
        assert_eq!(ErrorSeverity::from_level(3), ErrorSeverity::Fatal);
    }

    #[test]
    fn test_type_mismatch_display() {
        let err = Error::TypeMismatch {
            expected: XPathKind::Number,
            found: XPathKind::NodeSet,
        };
        assert_eq!(err.to_string(), "XPath result is a node-set, not a number");
    }

    #[test]
    fn test_parse_error_display() {
        let err = Error::Parse {
            kind: DocumentKind::Xml,
            diagnostic: Diagnostic {
                severity: ErrorSeverity::Fatal,
                message: "Opening and ending tag mismatch: b line 1 and a".to_string(),
                location: SourceLocation { line: 1, column: 11 },
            },
        };
        assert_eq!(
            err.to_string(),
            "failed to parse XML document: fatal error: \
             Opening and ending tag mismatch: b line 1 and a at 1:11"
        );
    }

    #[test]
    #[cfg(not(feature = "panic-on-error"))]
    fn test_raise_returns_err() {
        let r: Result<()> = raise(Error::AlreadyInitialized);
        assert!(matches!(r, Err(Error::AlreadyInitialized)));
    }

    #[test]
    #[cfg(feature = "panic-on-error")]
    #[should_panic(expected = "already initialized")]
    fn test_raise_panics() {
        let _: Result<()> = raise(Error::AlreadyInitialized);
    }

    #[test]
    fn test_error_is_error_trait() {
        let err = Error::InputTooLarge { len: 1 };
        let _: &dyn std::error::Error = &err;
    }

    #[test]
    fn test_clear_last_error() {
        clear_last_error();
        assert_eq!(last_error(), None);
    }
}
