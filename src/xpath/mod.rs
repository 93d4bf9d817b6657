//! `XPath` queries.
//!
//! Expressions are compiled and evaluated by libxml2. This module owns the
//! results and exposes them with typed, checked accessors.
//!
//! # Quick Start
//!
//! ```
//! use xmlhandle::XmlDocument;
//!
//! let doc = XmlDocument::parse("<root><a>1</a><b>2</b></root>").unwrap();
//! let ctx = doc.xpath_context().unwrap();
//! let result = ctx.eval("count(/root/*)").unwrap();
//! assert_eq!(result.as_number().unwrap(), 2.0);
//!
//! let names: Vec<String> = ctx
//!     .eval("/root/*")
//!     .unwrap()
//!     .iter()
//!     .unwrap()
//!     .map(|n| n.name())
//!     .collect();
//! assert_eq!(names, ["a", "b"]);
//! ```
//!
//! # Submodules
//!
//! - [`context`]: evaluation contexts and compiled expressions.
//! - [`object`]: owned results and their kinds.
//! - [`nodeset`]: node-set views, cursors and iterators.

pub mod context;
pub mod nodeset;
pub mod object;

pub use context::{XPathContext, XPathExpression};
pub use nodeset::{Namespace, NodeSetCursor, NodeSetIter, XPathNodeSet};
pub use object::{XPathKind, XPathObject, XPathValue};
