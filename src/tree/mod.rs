//! Documents and nodes.
//!
//! The tree itself lives in libxml2. This module wraps it in two kinds of
//! handle:
//!
//! - owning handles ([`Document`], [`Node`]) free what they hold on drop and
//!   can only be moved;
//! - borrowed handles ([`DocumentRef`], [`NodeRef`]) are `Copy` views whose
//!   lifetime is tied to the owning handle they came from.
//!
//! Borrowed handles never free anything. Moving a [`Node`] into a tree
//! (`append_child`, `set_root`) hands its memory to the document.

mod children;
mod document;
mod node;

pub use children::{ChildCursor, Children, NodeChildren};
pub use document::{Document, DocumentKind, DocumentRef, HtmlDocument, XmlDocument};
pub use node::{Node, NodeRef, NodeType};
