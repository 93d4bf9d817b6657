//! Utility modules for xmlhandle.
//!
//! Contains the string conversions used at the engine boundary.

pub(crate) mod strings;
