//! # xmlhandle
//!
//! Ownership-safe handles over libxml2: documents, nodes and `XPath`
//! results with clear rules about who frees what.
//!
//! - Owning handles ([`Document`], [`Node`], [`XPathObject`],
//!   [`XPathContext`]) free their resource exactly once, on drop.
//! - Borrowed handles ([`DocumentRef`], [`NodeRef`], [`XPathNodeSet`]) are
//!   `Copy` views whose lifetimes keep them from outliving their owner.
//!
//! ## Quick Start
//!
//! ```
//! use xmlhandle::{Node, XmlDocument};
//!
//! let doc = XmlDocument::parse("<a><b>x</b><c>y</c></a>").unwrap();
//! let root = doc.root_node();
//! assert_eq!(root.name(), "a");
//! for child in root.children() {
//!     assert!(child.is_element());
//! }
//! let hits = root.xpath("//c").unwrap();
//! assert_eq!(hits.as_nodeset().unwrap().len(), 1);
//!
//! let mut fresh = XmlDocument::new();
//! fresh.set_root(Node::new("root").unwrap());
//! assert!(fresh.to_string(false).contains("<root/>"));
//! ```
//!
//! ## Errors
//!
//! Fallible operations return [`Result`]. Building with the
//! `panic-on-error` feature turns every such failure into a panic instead;
//! signatures do not change.
//!
//! ## Threads
//!
//! Handles hold raw engine pointers and are neither `Send` nor `Sync`.

pub mod error;
pub mod library;
pub mod parser;
pub mod sys;
pub mod tree;
mod util;
pub mod xpath;

// Re-export primary types at the crate root for convenience.
pub use error::{last_error, Diagnostic, Error, ErrorSeverity, Result, SourceLocation};
pub use library::Library;
pub use parser::ParseOptions;
pub use tree::{
    ChildCursor, Children, Document, DocumentKind, DocumentRef, HtmlDocument, Node, NodeChildren,
    NodeRef, NodeType, XmlDocument,
};
pub use xpath::{
    Namespace, NodeSetCursor, NodeSetIter, XPathContext, XPathExpression, XPathKind, XPathNodeSet,
    XPathObject, XPathValue,
};
