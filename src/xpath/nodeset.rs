//! Node-set views, cursors and iterators.
#![allow(unsafe_code)]

use std::cmp::Ordering;
use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::ptr;

use crate::error::{raise, Error, Result};
use crate::sys;
use crate::tree::NodeRef;
use crate::util::strings;

/// A namespace node from a `namespace::` step, copied out of the result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace {
    /// The bound prefix, `None` for the default namespace.
    pub prefix: Option<String>,
    /// The namespace URI.
    pub uri: String,
}

/// A borrowed view of the nodes in an [`XPathObject`](super::XPathObject).
///
/// `'o` ties the view to the result object that owns the node array; `'a`
/// is the document borrow the nodes carry. Nodes come in document order.
///
/// Namespace nodes are not part of the tree: the result object holds
/// private copies of them. They count towards [`len`](Self::len), but
/// [`at`](Self::at) and the iterators yield a null [`NodeRef`] in their
/// place. Read them with [`namespace_at`](Self::namespace_at).
#[derive(Clone, Copy)]
pub struct XPathNodeSet<'o, 'a> {
    set: *mut sys::XmlNodeSet,
    _owner: PhantomData<&'o sys::XmlXPathObject>,
    _doc: PhantomData<NodeRef<'a>>,
}

impl<'o, 'a> XPathNodeSet<'o, 'a> {
    pub(crate) fn from_ptr(set: *mut sys::XmlNodeSet) -> Self {
        Self {
            set,
            _owner: PhantomData,
            _doc: PhantomData,
        }
    }

    /// Number of nodes. A missing set counts as empty.
    #[must_use]
    pub fn len(&self) -> usize {
        if self.set.is_null() {
            return 0;
        }
        // SAFETY: the owning object keeps the set alive for 'o.
        usize::try_from(unsafe { (*self.set).nodeNr }).unwrap_or(0)
    }

    /// Alias of [`len`](Self::len).
    #[must_use]
    pub fn size(&self) -> usize {
        self.len()
    }

    /// Alias of [`len`](Self::len).
    #[must_use]
    pub fn length(&self) -> usize {
        self.len()
    }

    /// Returns true if the set has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, index: usize) -> *mut sys::XmlNode {
        if index >= self.len() {
            return ptr::null_mut();
        }
        // SAFETY: `index < nodeNr`, so the slot is initialized.
        unsafe { *(*self.set).nodeTab.add(index) }
    }

    fn namespace_slot(&self, index: usize) -> Option<*const sys::XmlNs> {
        let slot = self.slot(index);
        if slot.is_null() {
            return None;
        }
        // SAFETY: live member; `type` has the same offset in `xmlNs`.
        let is_ns = unsafe { (*slot).type_ } == sys::XML_NAMESPACE_DECL;
        is_ns.then_some(slot.cast_const().cast())
    }

    /// The node at `index`, or a null [`NodeRef`] when out of range or when
    /// the member is a namespace node.
    #[must_use]
    pub fn at(&self, index: usize) -> NodeRef<'a> {
        if self.namespace_slot(index).is_some() {
            return NodeRef::null();
        }
        NodeRef::from_ptr(self.slot(index))
    }

    /// Returns true if the member at `index` is a namespace node.
    #[must_use]
    pub fn is_namespace(&self, index: usize) -> bool {
        self.namespace_slot(index).is_some()
    }

    /// The namespace node at `index`, if that member is one.
    #[must_use]
    pub fn namespace_at(&self, index: usize) -> Option<Namespace> {
        let ns = self.namespace_slot(index)?;
        // SAFETY: the result object owns the copy for 'o; both strings are
        // null or NUL-terminated.
        unsafe {
            Some(Namespace {
                prefix: strings::borrowed((*ns).prefix),
                uri: strings::borrowed((*ns).href).unwrap_or_default(),
            })
        }
    }

    /// The node at `index`, if in range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<NodeRef<'a>> {
        self.at(index).non_null()
    }

    /// A cursor at the first node.
    #[must_use]
    pub fn begin(&self) -> NodeSetCursor<'o, 'a> {
        NodeSetCursor {
            set: *self,
            index: 0,
        }
    }

    /// The past-the-end cursor, `len()` positions after [`begin`](Self::begin).
    #[must_use]
    pub fn end(&self) -> NodeSetCursor<'o, 'a> {
        NodeSetCursor {
            set: *self,
            index: isize::try_from(self.len()).unwrap_or(isize::MAX),
        }
    }

    /// Iterates the nodes in order.
    #[must_use]
    pub fn iter(&self) -> NodeSetIter<'o, 'a> {
        NodeSetIter {
            set: *self,
            front: 0,
            back: self.len(),
        }
    }

    fn same_set(&self, other: &Self) -> bool {
        ptr::eq(self.set, other.set)
    }
}

impl PartialEq for XPathNodeSet<'_, '_> {
    fn eq(&self, other: &Self) -> bool {
        self.same_set(other)
    }
}

impl fmt::Debug for XPathNodeSet<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'o, 'a> IntoIterator for XPathNodeSet<'o, 'a> {
    type Item = NodeRef<'a>;
    type IntoIter = NodeSetIter<'o, 'a>;

    fn into_iter(self) -> NodeSetIter<'o, 'a> {
        self.iter()
    }
}

/// A random-access position in a node-set.
///
/// Cursors support offset arithmetic and signed distance. Moving outside
/// the set is allowed; only [`get`](Self::get) checks the bounds. Offsets
/// saturate at the `isize` limits instead of overflowing. Cursors over
/// different sets are unequal and unordered.
#[derive(Debug, Clone, Copy)]
pub struct NodeSetCursor<'o, 'a> {
    set: XPathNodeSet<'o, 'a>,
    index: isize,
}

impl<'a> NodeSetCursor<'_, 'a> {
    /// The position, counted from [`XPathNodeSet::begin`].
    #[must_use]
    pub fn index(&self) -> isize {
        self.index
    }

    /// The node under the cursor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] unless `0 <= index < len`.
    pub fn get(&self) -> Result<NodeRef<'a>> {
        let len = self.set.len();
        match usize::try_from(self.index) {
            Ok(i) if i < len => Ok(self.set.at(i)),
            _ => raise(Error::IndexOutOfRange {
                index: self.index,
                len,
            }),
        }
    }
}

impl PartialEq for NodeSetCursor<'_, '_> {
    fn eq(&self, other: &Self) -> bool {
        self.set.same_set(&other.set) && self.index == other.index
    }
}

impl Eq for NodeSetCursor<'_, '_> {}

impl PartialOrd for NodeSetCursor<'_, '_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.set
            .same_set(&other.set)
            .then(|| self.index.cmp(&other.index))
    }
}

impl AddAssign<isize> for NodeSetCursor<'_, '_> {
    fn add_assign(&mut self, rhs: isize) {
        self.index = self.index.saturating_add(rhs);
    }
}

impl SubAssign<isize> for NodeSetCursor<'_, '_> {
    fn sub_assign(&mut self, rhs: isize) {
        self.index = self.index.saturating_sub(rhs);
    }
}

impl<'o, 'a> Add<isize> for NodeSetCursor<'o, 'a> {
    type Output = NodeSetCursor<'o, 'a>;

    fn add(mut self, rhs: isize) -> Self::Output {
        self += rhs;
        self
    }
}

impl<'o, 'a> Sub<isize> for NodeSetCursor<'o, 'a> {
    type Output = NodeSetCursor<'o, 'a>;

    fn sub(mut self, rhs: isize) -> Self::Output {
        self -= rhs;
        self
    }
}

impl Sub for NodeSetCursor<'_, '_> {
    type Output = isize;

    /// Signed distance between two cursors over the same set.
    fn sub(self, rhs: Self) -> isize {
        debug_assert!(
            self.set.same_set(&rhs.set),
            "distance between cursors of different node-sets"
        );
        self.index.saturating_sub(rhs.index)
    }
}

/// Iterator over the nodes of a node-set.
#[derive(Debug, Clone)]
pub struct NodeSetIter<'o, 'a> {
    set: XPathNodeSet<'o, 'a>,
    front: usize,
    back: usize,
}

impl<'a> Iterator for NodeSetIter<'_, 'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<NodeRef<'a>> {
        if self.front >= self.back {
            return None;
        }
        let node = self.set.at(self.front);
        self.front += 1;
        Some(node)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.back.saturating_sub(self.front);
        (n, Some(n))
    }

    fn nth(&mut self, n: usize) -> Option<NodeRef<'a>> {
        self.front = self.front.saturating_add(n).min(self.back);
        self.next()
    }
}

impl DoubleEndedIterator for NodeSetIter<'_, '_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        Some(self.set.at(self.back))
    }
}

impl ExactSizeIterator for NodeSetIter<'_, '_> {}

impl FusedIterator for NodeSetIter<'_, '_> {}
