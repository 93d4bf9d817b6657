//! Iteration over a node's direct children.
//!
//! Two styles are offered. [`Children`] is an ordinary double-ended
//! iterator. [`ChildCursor`] is a position that can step both ways and be
//! compared with [`NodeChildren::end`], for code that needs to hold on to a
//! place in the sibling chain.

use std::iter::FusedIterator;

use super::node::NodeRef;

/// The children of one node, as a lightweight view.
///
/// Holds the first and last child as they were at creation and follows the
/// live sibling links from there. Removing or freeing a node that is being
/// visited (for example through [`NodeRef::set_content`] on the parent)
/// leaves the view pointing at freed memory; do not mutate the structure
/// while iterating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeChildren<'a> {
    first: NodeRef<'a>,
    last: NodeRef<'a>,
}

impl<'a> NodeChildren<'a> {
    pub(crate) fn new(first: NodeRef<'a>, last: NodeRef<'a>) -> Self {
        Self { first, last }
    }

    /// Returns true if the node had no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.first.is_null()
    }

    /// The first child (null if none).
    #[must_use]
    pub fn first(&self) -> NodeRef<'a> {
        self.first
    }

    /// The last child (null if none).
    #[must_use]
    pub fn last(&self) -> NodeRef<'a> {
        self.last
    }

    /// A cursor at the first child, equal to [`end`](Self::end) when empty.
    #[must_use]
    pub fn begin(&self) -> ChildCursor<'a> {
        ChildCursor {
            prev: NodeRef::null(),
            cur: self.first,
        }
    }

    /// The past-the-end cursor. Stepping back from it reaches the last child.
    #[must_use]
    pub fn end(&self) -> ChildCursor<'a> {
        ChildCursor {
            prev: self.last,
            cur: NodeRef::null(),
        }
    }

    /// Iterates the children in document order.
    #[must_use]
    pub fn iter(&self) -> Children<'a> {
        Children {
            front: self.first,
            back: self.last,
        }
    }
}

impl<'a> IntoIterator for NodeChildren<'a> {
    type Item = NodeRef<'a>;
    type IntoIter = Children<'a>;

    fn into_iter(self) -> Children<'a> {
        self.iter()
    }
}

/// A bidirectional position in a sibling chain.
///
/// Holds the current node and the one before it, so a cursor at the end
/// (current node null) can still step back. Two cursors are equal when they
/// point at the same node; all end cursors are equal.
#[derive(Debug, Clone, Copy)]
pub struct ChildCursor<'a> {
    prev: NodeRef<'a>,
    cur: NodeRef<'a>,
}

impl<'a> ChildCursor<'a> {
    /// The node under the cursor (null at the end).
    #[must_use]
    pub fn get(&self) -> NodeRef<'a> {
        self.cur
    }

    /// Returns true if the cursor is past the last child.
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.cur.is_null()
    }

    /// Steps to the next sibling. Returns false, without moving, at the end.
    pub fn move_next(&mut self) -> bool {
        if self.cur.is_null() {
            return false;
        }
        self.prev = self.cur;
        self.cur = self.cur.next_sibling();
        true
    }

    /// Steps to the previous sibling. Returns false, without moving, at the
    /// first child.
    pub fn move_prev(&mut self) -> bool {
        if self.prev.is_null() {
            return false;
        }
        self.cur = self.prev;
        self.prev = self.cur.previous_sibling();
        true
    }
}

impl PartialEq for ChildCursor<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cur == other.cur
    }
}

impl Eq for ChildCursor<'_> {}

/// Iterator over a node's children, from both ends.
#[derive(Debug, Clone)]
pub struct Children<'a> {
    front: NodeRef<'a>,
    back: NodeRef<'a>,
}

impl<'a> Iterator for Children<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<NodeRef<'a>> {
        let node = self.front.non_null()?;
        if node == self.back {
            self.front = NodeRef::null();
            self.back = NodeRef::null();
        } else {
            self.front = node.next_sibling();
        }
        Some(node)
    }
}

impl DoubleEndedIterator for Children<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let node = self.back.non_null()?;
        if node == self.front {
            self.front = NodeRef::null();
            self.back = NodeRef::null();
        } else {
            self.back = node.previous_sibling();
        }
        Some(node)
    }
}

impl FusedIterator for Children<'_> {}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::tree::{Node, XmlDocument};

    #[test]
    fn test_iterate_forward_and_back() {
        let doc = XmlDocument::parse("<r><a/><b/><c/></r>").unwrap();
        let kids = doc.root_node().children();
        let names: Vec<_> = kids.iter().map(|n| n.name()).collect();
        assert_eq!(names, ["a", "b", "c"]);
        let names: Vec<_> = kids.iter().rev().map(|n| n.name()).collect();
        assert_eq!(names, ["c", "b", "a"]);
    }

    #[test]
    fn test_iterate_from_both_ends_meets_once() {
        let doc = XmlDocument::parse("<r><a/><b/><c/></r>").unwrap();
        let mut it = doc.root_node().children().iter();
        assert_eq!(it.next().unwrap().name(), "a");
        assert_eq!(it.next_back().unwrap().name(), "c");
        assert_eq!(it.next().unwrap().name(), "b");
        assert!(it.next().is_none());
        assert!(it.next_back().is_none());
    }

    #[test]
    fn test_empty_children() {
        let node = Node::new("leaf").unwrap();
        let kids = node.view().children();
        assert!(kids.is_empty());
        assert_eq!(kids.begin(), kids.end());
        assert_eq!(kids.iter().count(), 0);
    }

    #[test]
    fn test_cursor_walk() {
        let doc = XmlDocument::parse("<r><a/><b/></r>").unwrap();
        let kids = doc.root_node().children();
        let mut cur = kids.begin();
        assert_eq!(cur.get().name(), "a");
        assert!(!cur.move_prev());
        assert!(cur.move_next());
        assert_eq!(cur.get().name(), "b");
        assert!(cur.move_next());
        assert_eq!(cur, kids.end());
        assert!(cur.is_end());
        assert!(!cur.move_next());
        assert!(cur.move_prev());
        assert_eq!(cur.get().name(), "b");
        assert!(cur.move_prev());
        assert_eq!(cur, kids.begin());
    }

    #[test]
    fn test_end_steps_back_to_last() {
        let doc = XmlDocument::parse("<r><a/><b/></r>").unwrap();
        let kids = doc.root_node().children();
        let mut end = kids.end();
        assert!(end.move_prev());
        assert_eq!(end.get(), kids.last());
    }
}
