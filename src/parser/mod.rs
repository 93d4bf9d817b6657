//! Parser configuration.
//!
//! Parsing itself is done by libxml2; this module only describes *how* it
//! should parse. [`ParseOptions`] is a builder over the engine's option
//! bitmask, shared by the XML and HTML parsers.

use std::fmt;
use std::os::raw::c_int;

use crate::sys;

/// Parse options controlling parser behavior.
///
/// Use the builder pattern to configure options:
///
/// ```
/// use xmlhandle::ParseOptions;
///
/// let opts = ParseOptions::default()
///     .recover(false)
///     .no_blanks(true);
/// assert!(!opts.recover);
/// ```
///
/// The default enables `no_blanks`, `no_error`, `no_warning`, `no_network`
/// and `recover`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[allow(clippy::struct_excessive_bools)]
pub struct ParseOptions {
    /// Attempt to recover from malformed input and produce a partial tree.
    pub recover: bool,
    /// Drop ignorable whitespace-only text nodes.
    pub no_blanks: bool,
    /// Do not report errors on stderr.
    pub no_error: bool,
    /// Do not report warnings on stderr.
    pub no_warning: bool,
    /// Forbid network access while resolving entities and DTDs.
    pub no_network: bool,
    /// Do not generate XInclude start/end marker nodes.
    pub no_xinclude_nodes: bool,
    /// Replace entity references by their content.
    pub substitute_entities: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            recover: true,
            no_blanks: true,
            no_error: true,
            no_warning: true,
            no_network: true,
            no_xinclude_nodes: false,
            substitute_entities: false,
        }
    }
}

impl ParseOptions {
    /// The default options without error recovery: malformed input is
    /// rejected instead of repaired.
    #[must_use]
    pub fn strict() -> Self {
        Self::default().recover(false)
    }

    /// Enables or disables error recovery mode.
    #[must_use]
    pub fn recover(mut self, yes: bool) -> Self {
        self.recover = yes;
        self
    }

    /// Enables or disables stripping of blank text nodes.
    #[must_use]
    pub fn no_blanks(mut self, yes: bool) -> Self {
        self.no_blanks = yes;
        self
    }

    /// Enables or disables suppression of error reports.
    #[must_use]
    pub fn no_error(mut self, yes: bool) -> Self {
        self.no_error = yes;
        self
    }

    /// Enables or disables suppression of warning reports.
    #[must_use]
    pub fn no_warning(mut self, yes: bool) -> Self {
        self.no_warning = yes;
        self
    }

    /// Enables or disables network access.
    #[must_use]
    pub fn no_network(mut self, yes: bool) -> Self {
        self.no_network = yes;
        self
    }

    /// Enables or disables XInclude marker nodes.
    #[must_use]
    pub fn no_xinclude_nodes(mut self, yes: bool) -> Self {
        self.no_xinclude_nodes = yes;
        self
    }

    /// Enables or disables entity substitution.
    #[must_use]
    pub fn substitute_entities(mut self, yes: bool) -> Self {
        self.substitute_entities = yes;
        self
    }

    /// The engine bitmask for these options.
    #[must_use]
    pub fn bits(&self) -> c_int {
        let flags = [
            (self.recover, sys::XML_PARSE_RECOVER),
            (self.no_blanks, sys::XML_PARSE_NOBLANKS),
            (self.no_error, sys::XML_PARSE_NOERROR),
            (self.no_warning, sys::XML_PARSE_NOWARNING),
            (self.no_network, sys::XML_PARSE_NONET),
            (self.no_xinclude_nodes, sys::XML_PARSE_NOXINCNODE),
            (self.substitute_entities, sys::XML_PARSE_NOENT),
        ];
        flags
            .iter()
            .filter(|(on, _)| *on)
            .fold(0, |acc, (_, bit)| acc | bit)
    }

    /// Builds options from an engine bitmask. Bits this type does not model
    /// are ignored.
    #[must_use]
    pub fn from_bits(bits: c_int) -> Self {
        let has = |bit: c_int| bits & bit != 0;
        Self {
            recover: has(sys::XML_PARSE_RECOVER),
            no_blanks: has(sys::XML_PARSE_NOBLANKS),
            no_error: has(sys::XML_PARSE_NOERROR),
            no_warning: has(sys::XML_PARSE_NOWARNING),
            no_network: has(sys::XML_PARSE_NONET),
            no_xinclude_nodes: has(sys::XML_PARSE_NOXINCNODE),
            substitute_entities: has(sys::XML_PARSE_NOENT),
        }
    }
}

impl fmt::Debug for ParseOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseOptions")
            .field("recover", &self.recover)
            .field("no_blanks", &self.no_blanks)
            .field("no_error", &self.no_error)
            .field("no_warning", &self.no_warning)
            .field("no_network", &self.no_network)
            .field("no_xinclude_nodes", &self.no_xinclude_nodes)
            .field("substitute_entities", &self.substitute_entities)
            .field("bits", &format_args!("{:#x}", self.bits()))
            .finish()
    }
}
