//! Node handles.
//!
//! [`NodeRef`] is a borrowed, copyable view of one node in an engine tree.
//! [`Node`] owns a node that is not (yet) part of any document and frees it
//! when dropped. Attaching a `Node` to a tree consumes it, which is how
//! ownership passes from the wrapper to the document.
#![allow(unsafe_code)]

use std::fmt;
use std::marker::PhantomData;
use std::os::raw::c_int;
use std::ptr;

use tracing::debug;

use super::children::NodeChildren;
use super::document::DocumentRef;
use crate::error::{raise, Error, Result};
use crate::sys;
use crate::util::strings;
use crate::xpath::{XPathContext, XPathObject};

/// The kind of a node, corresponding to libxml2's `xmlElementType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    /// An element, e.g. `<div class="x">`.
    Element,
    /// An attribute node (only reachable through `XPath` results).
    Attribute,
    /// Character data.
    Text,
    /// A `<![CDATA[...]]>` section.
    CData,
    /// An unexpanded entity reference.
    EntityRef,
    /// An entity declaration.
    Entity,
    /// A processing instruction.
    ProcessingInstruction,
    /// A comment.
    Comment,
    /// An XML document node.
    Document,
    /// A document type node.
    DocumentType,
    /// A document fragment.
    DocumentFragment,
    /// A notation.
    Notation,
    /// An HTML document node.
    HtmlDocument,
    /// A DTD node.
    Dtd,
    /// Any other engine node type (declarations, namespaces, XInclude markers).
    Other(i32),
}

impl NodeType {
    pub(crate) fn from_raw(raw: c_int) -> Self {
        match raw {
            sys::XML_ELEMENT_NODE => Self::Element,
            sys::XML_ATTRIBUTE_NODE => Self::Attribute,
            sys::XML_TEXT_NODE => Self::Text,
            sys::XML_CDATA_SECTION_NODE => Self::CData,
            sys::XML_ENTITY_REF_NODE => Self::EntityRef,
            sys::XML_ENTITY_NODE => Self::Entity,
            sys::XML_PI_NODE => Self::ProcessingInstruction,
            sys::XML_COMMENT_NODE => Self::Comment,
            sys::XML_DOCUMENT_NODE => Self::Document,
            sys::XML_DOCUMENT_TYPE_NODE => Self::DocumentType,
            sys::XML_DOCUMENT_FRAG_NODE => Self::DocumentFragment,
            sys::XML_NOTATION_NODE => Self::Notation,
            sys::XML_HTML_DOCUMENT_NODE => Self::HtmlDocument,
            sys::XML_DTD_NODE => Self::Dtd,
            other => Self::Other(other),
        }
    }

    /// Whether the engine stores this node's text in its `content` field.
    fn has_content_field(self) -> bool {
        matches!(
            self,
            Self::Text | Self::CData | Self::Comment | Self::ProcessingInstruction
        )
    }
}

/// A borrowed reference to a node.
///
/// `NodeRef` is `Copy` and compares by node identity. It never frees
/// anything; the node belongs to the document (or [`Node`]) it was reached
/// from, and the lifetime `'a` keeps the reference from outliving that owner.
///
/// A null `NodeRef` means "no such node": a missing parent or sibling, an
/// out-of-range node-set index, the end of a child sequence. Check
/// [`is_null`](Self::is_null) (or use [`non_null`](Self::non_null)) before
/// calling accessors; every accessor panics on a null reference.
///
/// Mutation through a `NodeRef` is allowed because the engine owns the
/// memory. Mutations that remove nodes from the tree (see
/// [`set_content`](Self::set_content)) invalidate references to the removed
/// nodes and any child iteration in progress over them.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef<'a> {
    node: *mut sys::XmlNode,
    _owner: PhantomData<&'a sys::XmlNode>,
}

impl Default for NodeRef<'_> {
    fn default() -> Self {
        Self::null()
    }
}

impl<'a> NodeRef<'a> {
    /// The null reference.
    #[must_use]
    pub fn null() -> Self {
        Self::from_ptr(ptr::null_mut())
    }

    pub(crate) fn from_ptr(node: *mut sys::XmlNode) -> Self {
        Self {
            node,
            _owner: PhantomData,
        }
    }

    /// Wraps a raw engine node without taking ownership.
    ///
    /// # Safety
    ///
    /// `node` must be null or a live engine node that stays alive, and is
    /// not freed by anyone else, for all of `'a`. Namespace declarations
    /// (`xmlNs`) are not nodes; every accessor panics on one.
    #[must_use]
    pub unsafe fn from_raw(node: *mut sys::XmlNode) -> Self {
        Self::from_ptr(node)
    }

    /// The raw engine pointer.
    #[must_use]
    pub fn as_ptr(&self) -> *mut sys::XmlNode {
        self.node
    }

    /// Returns true if this is the null reference.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.node.is_null()
    }

    /// `Some(self)` unless this is the null reference.
    #[must_use]
    pub fn non_null(self) -> Option<Self> {
        (!self.is_null()).then_some(self)
    }

    /// The pointer, after checking the caller's non-null obligation.
    #[track_caller]
    fn checked(&self, op: &str) -> *mut sys::XmlNode {
        assert!(!self.node.is_null(), "NodeRef::{op} called on a null node");
        // SAFETY: live for 'a; `type` has the same offset in `xmlNs`.
        let kind = unsafe { (*self.node).type_ };
        assert!(
            kind != sys::XML_NAMESPACE_DECL,
            "NodeRef::{op} called on a namespace declaration"
        );
        self.node
    }

    #[track_caller]
    fn raw_type(&self, op: &str) -> c_int {
        let node = self.checked(op);
        // SAFETY: non-null and alive for 'a; `type` shares its offset in
        // every engine node layout.
        unsafe { (*node).type_ }
    }

    // -- Type predicates ---------------------------------------------------

    /// The node's type.
    pub fn node_type(&self) -> NodeType {
        NodeType::from_raw(self.raw_type("node_type"))
    }

    /// True for text and CDATA nodes.
    pub fn is_text(&self) -> bool {
        let node = self.checked("is_text");
        // SAFETY: live node.
        unsafe { sys::xmlNodeIsText(node) != 0 }
    }

    /// True for comments.
    pub fn is_comment(&self) -> bool {
        self.raw_type("is_comment") == sys::XML_COMMENT_NODE
    }

    /// True for elements.
    pub fn is_element(&self) -> bool {
        self.raw_type("is_element") == sys::XML_ELEMENT_NODE
    }

    /// True for XML and HTML document nodes.
    pub fn is_document(&self) -> bool {
        matches!(
            self.raw_type("is_document"),
            sys::XML_DOCUMENT_NODE | sys::XML_HTML_DOCUMENT_NODE
        )
    }

    /// True for text nodes that contain only whitespace.
    pub fn is_blank(&self) -> bool {
        let node = self.checked("is_blank");
        // SAFETY: live node.
        unsafe { sys::xmlIsBlankNode(node) == 1 }
    }

    // -- Content -----------------------------------------------------------

    /// The node's own text, for text, CDATA, comment and PI nodes.
    ///
    /// Unlike [`content`](Self::content) this does not collect descendant
    /// text, so it is `None` for elements.
    pub fn value(&self) -> Option<String> {
        let node = self.checked("value");
        if !self.node_type().has_content_field() {
            return None;
        }
        // SAFETY: text-like nodes use the full `xmlNode` layout; `content`
        // is null or a NUL-terminated string owned by the node.
        unsafe { strings::borrowed((*node).content) }
    }

    /// The text content of the node and all its descendants.
    pub fn content(&self) -> String {
        let node = self.checked("content");
        // SAFETY: the engine allocates a fresh string for us.
        unsafe { strings::adopt(sys::xmlNodeGetContent(node)) }.unwrap_or_default()
    }

    /// Replaces the node's content.
    ///
    /// For elements this removes and frees all existing children and
    /// replaces them with a single text node; any `NodeRef` to a removed
    /// child is dangling afterwards and must not be used.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InputTooLarge`] if `content` does not fit the engine.
    pub fn set_content(&self, content: &str) -> Result<()> {
        let node = self.checked("set_content");
        let len = strings::to_c_len(content.len())?;
        // SAFETY: live node; the engine copies `len` bytes.
        unsafe { sys::xmlNodeSetContentLen(node, content.as_ptr(), len) };
        Ok(())
    }

    /// Appends text to the node's content.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InputTooLarge`] if `content` does not fit the engine.
    pub fn add_content(&self, content: &str) -> Result<()> {
        let node = self.checked("add_content");
        let len = strings::to_c_len(content.len())?;
        // SAFETY: live node; the engine copies `len` bytes.
        unsafe { sys::xmlNodeAddContentLen(node, content.as_ptr(), len) };
        Ok(())
    }

    // -- Name --------------------------------------------------------------

    /// The node's name. Text nodes are named `text`, comments `comment`.
    pub fn name(&self) -> String {
        let node = self.checked("name");
        // SAFETY: `name` is null or a NUL-terminated string owned by the tree.
        unsafe { strings::borrowed((*node).name) }.unwrap_or_default()
    }

    /// Renames the node.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InteriorNul`] if `name` contains a NUL byte.
    pub fn set_name(&self, name: &str) -> Result<()> {
        let node = self.checked("set_name");
        let name = strings::to_xml_string(name)?;
        // SAFETY: live node; the engine copies the name.
        unsafe { sys::xmlNodeSetName(node, name.as_ptr().cast()) };
        Ok(())
    }

    // -- Attributes --------------------------------------------------------

    /// The value of attribute `name`, or `None` if it is not set.
    pub fn attribute(&self, name: &str) -> Option<String> {
        let node = self.checked("attribute");
        let name = strings::to_xml_string(name).ok()?;
        // SAFETY: live node; the returned string is ours to free.
        unsafe { strings::adopt(sys::xmlGetProp(node, name.as_ptr().cast())) }
    }

    /// Returns true if attribute `name` is present.
    pub fn has_attribute(&self, name: &str) -> bool {
        let node = self.checked("has_attribute");
        let Ok(name) = strings::to_xml_string(name) else {
            return false;
        };
        // SAFETY: live node; the returned attribute stays owned by the tree.
        unsafe { !sys::xmlHasProp(node, name.as_ptr().cast()).is_null() }
    }

    /// All attributes of an element as `(name, value)` pairs, in document
    /// order. Empty for non-elements.
    pub fn attributes(&self) -> Vec<(String, String)> {
        let node = self.checked("attributes");
        let mut out = Vec::new();
        if !self.is_element() {
            return out;
        }
        // SAFETY: elements use the full `xmlNode` layout and own their
        // attribute list; we only read it.
        unsafe {
            let mut attr = (*node).properties;
            while !attr.is_null() {
                let name = strings::borrowed((*attr).name).unwrap_or_default();
                let value =
                    strings::adopt(sys::xmlNodeListGetString((*node).doc, (*attr).children, 1))
                        .unwrap_or_default();
                out.push((name, value));
                attr = (*attr).next;
            }
        }
        out
    }

    /// Sets (or replaces) attribute `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InteriorNul`] if `name` or `value` contains a NUL byte.
    ///
    /// # Panics
    ///
    /// Panics if the node is null or not an element.
    pub fn set_attribute(&self, name: &str, value: &str) -> Result<()> {
        let node = self.checked("set_attribute");
        assert!(
            self.is_element(),
            "NodeRef::set_attribute called on a {:?} node",
            self.node_type()
        );
        let name = strings::to_xml_string(name)?;
        let value = strings::to_xml_string(value)?;
        // SAFETY: live element; the engine copies both strings.
        let attr = unsafe { sys::xmlSetProp(node, name.as_ptr().cast(), value.as_ptr().cast()) };
        if attr.is_null() {
            return raise(Error::Allocation { what: "attribute" });
        }
        Ok(())
    }

    /// Removes attribute `name`. Returns true if it was present.
    pub fn remove_attribute(&self, name: &str) -> bool {
        let node = self.checked("remove_attribute");
        let Ok(name) = strings::to_xml_string(name) else {
            return false;
        };
        // SAFETY: live node; the engine frees the attribute it unlinks.
        unsafe { sys::xmlUnsetProp(node, name.as_ptr().cast()) == 0 }
    }

    // -- Navigation --------------------------------------------------------

    /// The parent node. Root elements have the document node as parent;
    /// the document node and detached nodes have none (null).
    pub fn parent(&self) -> NodeRef<'a> {
        let node = self.checked("parent");
        // SAFETY: live node.
        NodeRef::from_ptr(unsafe { (*node).parent })
    }

    /// A view over this node's children.
    pub fn children(&self) -> NodeChildren<'a> {
        NodeChildren::new(self.first_child(), self.last_child())
    }

    /// The first child (null if none).
    pub fn first_child(&self) -> NodeRef<'a> {
        let node = self.checked("first_child");
        // SAFETY: live node.
        NodeRef::from_ptr(unsafe { (*node).children })
    }

    /// The last child (null if none).
    pub fn last_child(&self) -> NodeRef<'a> {
        let node = self.checked("last_child");
        // SAFETY: live node.
        NodeRef::from_ptr(unsafe { (*node).last })
    }

    /// The next sibling (null if none).
    pub fn next_sibling(&self) -> NodeRef<'a> {
        let node = self.checked("next_sibling");
        // SAFETY: live node.
        NodeRef::from_ptr(unsafe { (*node).next })
    }

    /// The previous sibling (null if none).
    pub fn previous_sibling(&self) -> NodeRef<'a> {
        let node = self.checked("previous_sibling");
        // SAFETY: live node.
        NodeRef::from_ptr(unsafe { (*node).prev })
    }

    /// The document this node belongs to (null for nodes never attached).
    pub fn document(&self) -> DocumentRef<'a> {
        let node = self.checked("document");
        // SAFETY: live node.
        DocumentRef::from_ptr(unsafe { (*node).doc })
    }

    /// The source line the parser recorded for this node.
    pub fn line(&self) -> Option<u32> {
        let node = self.checked("line");
        // SAFETY: live node.
        let line = unsafe { sys::xmlGetLineNo(node) };
        u32::try_from(line).ok().filter(|l| *l > 0)
    }

    /// The engine's path expression for this node, e.g. `/a/c[2]`.
    pub fn path(&self) -> Option<String> {
        let node = self.checked("path");
        // SAFETY: live node; the returned string is ours to free.
        unsafe { strings::adopt(sys::xmlGetNodePath(node)) }
    }

    // -- Serialization -----------------------------------------------------

    /// Serializes this node and its subtree.
    pub fn to_string(&self, format: bool) -> String {
        let node = self.checked("to_string");
        // SAFETY: the buffer is created, read and freed here; the node is live.
        unsafe {
            let buf = sys::xmlBufferCreate();
            if buf.is_null() {
                return String::new();
            }
            sys::xmlNodeDump(buf, (*node).doc, node, 0, c_int::from(format));
            let text = strings::borrowed(sys::xmlBufferContent(buf)).unwrap_or_default();
            sys::xmlBufferFree(buf);
            text
        }
    }

    // -- Queries -----------------------------------------------------------

    /// Evaluates `expression` with this node as the context node.
    ///
    /// This builds and discards an [`XPathContext`] on every call. When
    /// running many queries against one document, create one context with
    /// [`DocumentRef::xpath_context`] and reuse it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::XPath`] if the expression is invalid.
    pub fn xpath(&self, expression: &str) -> Result<XPathObject<'a>> {
        let ctxt = XPathContext::new(self.document())?;
        ctxt.eval_at(*self, expression)
    }

    // -- Tree building -----------------------------------------------------

    /// Creates a new element named `name` as the last child of this node.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InteriorNul`] for names containing NUL, or
    /// [`Error::Allocation`] if the engine refused to create the element.
    pub fn create_element(&self, name: &str) -> Result<NodeRef<'a>> {
        let node = self.checked("create_element");
        let name = strings::to_xml_string(name)?;
        // SAFETY: live parent; the child is owned by the tree from here on.
        let child =
            unsafe { sys::xmlNewChild(node, ptr::null_mut(), name.as_ptr().cast(), ptr::null()) };
        if child.is_null() {
            return raise(Error::Allocation { what: "element" });
        }
        Ok(NodeRef::from_ptr(child))
    }

    /// Moves a detached node into the tree as the last child of this node.
    ///
    /// The tree takes ownership. Adjacent text may be merged by the engine,
    /// so the returned reference is the node that actually holds the content.
    ///
    /// # Panics
    ///
    /// Panics if this node is null or `child` is an attribute node; use
    /// [`set_attribute`](Self::set_attribute) for attributes.
    pub fn append_child(&self, child: Node) -> NodeRef<'a> {
        let parent = self.checked("append_child");
        if let Some(kind) = child.view().non_null().map(|n| n.node_type()) {
            assert!(
                kind != NodeType::Attribute,
                "NodeRef::append_child called with an attribute node"
            );
        }
        let child = child.into_raw();
        if child.is_null() {
            return NodeRef::null();
        }
        // SAFETY: `child` is a detached node we own; on success the tree owns it.
        let added = unsafe { sys::xmlAddChild(parent, child) };
        if added.is_null() {
            // SAFETY: the engine did not take `child`, so it is still ours.
            drop(unsafe { Node::from_raw(child) });
        }
        NodeRef::from_ptr(added)
    }

    /// Deep-copies this node into a new detached [`Node`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Allocation`] if the engine could not copy the subtree.
    ///
    /// # Panics
    ///
    /// Panics on document nodes; use
    /// [`DocumentRef::clone_document`](super::DocumentRef::clone_document).
    pub fn clone_node(&self) -> Result<Node> {
        let node = self.checked("clone_node");
        assert!(
            !self.is_document(),
            "NodeRef::clone_node called on a document node"
        );
        // SAFETY: live node; a null target document yields strings that do
        // not live in any document dictionary.
        let copy = unsafe { sys::xmlDocCopyNode(node, ptr::null_mut(), 1) };
        if copy.is_null() {
            return raise(Error::Allocation { what: "node copy" });
        }
        Ok(Node { node: copy })
    }
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return f.write_str("NodeRef(null)");
        }
        f.debug_struct("NodeRef")
            .field("type", &self.node_type())
            .field("name", &self.name())
            .field("ptr", &self.node)
            .finish()
    }
}

/// A detached node with exclusive ownership.
///
/// `Node` frees its subtree when dropped. It is neither `Copy` nor `Clone`;
/// moving it transfers ownership. Use [`view`](Self::view) to navigate or
/// modify it through a [`NodeRef`].
///
/// A default (or [`detach`](Self::detach)ed) `Node` is null and frees nothing.
pub struct Node {
    node: *mut sys::XmlNode,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            node: ptr::null_mut(),
        }
    }
}

impl Node {
    /// Creates a detached element named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InteriorNul`] for names containing NUL, or
    /// [`Error::Allocation`] if the engine could not create the node.
    pub fn new(name: &str) -> Result<Self> {
        let name = strings::to_xml_string(name)?;
        // SAFETY: the engine copies the name; the new node is ours.
        let node = unsafe { sys::xmlNewNode(ptr::null_mut(), name.as_ptr().cast()) };
        Self::created(node, "element")
    }

    /// Creates a detached text node.
    ///
    /// # Errors
    ///
    /// Same as [`Node::new`].
    pub fn new_text(content: &str) -> Result<Self> {
        let content = strings::to_xml_string(content)?;
        // SAFETY: the engine copies the content; the new node is ours.
        let node = unsafe { sys::xmlNewText(content.as_ptr().cast()) };
        Self::created(node, "text node")
    }

    /// Creates a detached comment node.
    ///
    /// # Errors
    ///
    /// Same as [`Node::new`].
    pub fn new_comment(content: &str) -> Result<Self> {
        let content = strings::to_xml_string(content)?;
        // SAFETY: the engine copies the content; the new node is ours.
        let node = unsafe { sys::xmlNewComment(content.as_ptr().cast()) };
        Self::created(node, "comment")
    }

    fn created(node: *mut sys::XmlNode, what: &'static str) -> Result<Self> {
        if node.is_null() {
            return raise(Error::Allocation { what });
        }
        Ok(Self { node })
    }

    /// Takes ownership of a raw engine node.
    ///
    /// # Safety
    ///
    /// `node` must be null or a node that is not linked into any tree, that
    /// nothing else frees, and whose strings do not belong to the dictionary
    /// of a document that may be freed first.
    #[must_use]
    pub unsafe fn from_raw(node: *mut sys::XmlNode) -> Self {
        Self { node }
    }

    /// A borrowed view of this node.
    #[must_use]
    pub fn view(&self) -> NodeRef<'_> {
        NodeRef::from_ptr(self.node)
    }

    /// Returns true if this wrapper owns nothing.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.node.is_null()
    }

    /// Gives up ownership, leaving this wrapper null.
    ///
    /// The caller becomes responsible for freeing the node (or re-wrapping
    /// it with [`Node::from_raw`]); dropping the pointer leaks it.
    #[must_use = "the detached node leaks unless it is re-wrapped or freed"]
    pub fn detach(&mut self) -> *mut sys::XmlNode {
        std::mem::replace(&mut self.node, ptr::null_mut())
    }

    /// Consumes the wrapper and returns the raw node without freeing it.
    #[must_use = "the returned node leaks unless it is re-wrapped or freed"]
    pub fn into_raw(mut self) -> *mut sys::XmlNode {
        self.detach()
    }

    /// Frees the currently owned node, then takes ownership of `other`'s.
    pub fn assign(&mut self, other: Node) {
        *self = other;
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        if self.node.is_null() {
            return;
        }
        debug!(ptr = ?self.node, "freeing detached node");
        // SAFETY: we exclusively own a detached node.
        unsafe { sys::xmlFreeNode(self.node) };
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Node").field(&self.view()).finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_null_ref() {
        let n = NodeRef::null();
        assert!(n.is_null());
        assert_eq!(n.non_null(), None);
        assert_eq!(n, NodeRef::default());
        assert_eq!(format!("{n:?}"), "NodeRef(null)");
    }

    #[test]
    #[should_panic(expected = "NodeRef::name called on a null node")]
    fn test_null_ref_accessor_panics() {
        let _ = NodeRef::null().name();
    }

    #[test]
    fn test_new_node_is_detached_element() {
        let node = Node::new("root").unwrap();
        let view = node.view();
        assert!(view.is_element());
        assert_eq!(view.name(), "root");
        assert!(view.parent().is_null());
        assert!(view.document().is_null());
    }

    #[test]
    fn test_detach_nulls_wrapper() {
        let mut node = Node::new("x").unwrap();
        let raw = node.detach();
        assert!(node.is_null());
        assert!(!raw.is_null());
        let node = unsafe { Node::from_raw(raw) };
        assert_eq!(node.view().name(), "x");
    }

    #[test]
    fn test_assign_replaces() {
        let mut a = Node::new("a").unwrap();
        a.assign(Node::new("b").unwrap());
        assert_eq!(a.view().name(), "b");
        a.assign(Node::default());
        assert!(a.is_null());
    }

    #[test]
    fn test_build_detached_subtree() {
        let root = Node::new("list").unwrap();
        let item = root.view().create_element("item").unwrap();
        item.set_attribute("id", "1").unwrap();
        item.add_content("one").unwrap();
        root.view().append_child(Node::new_comment("end").unwrap());

        let children: Vec<String> = root.view().children().into_iter().map(|c| c.name()).collect();
        assert_eq!(children, ["item", "comment"]);
        assert_eq!(item.attribute("id").as_deref(), Some("1"));
        assert_eq!(root.view().content(), "one");
        assert_eq!(
            root.view().to_string(false),
            "<list><item id=\"1\">one</item><!--end--></list>"
        );
    }

    #[test]
    fn test_attributes_roundtrip() {
        let el = Node::new("e").unwrap();
        let v = el.view();
        v.set_attribute("a", "1").unwrap();
        v.set_attribute("b", "2").unwrap();
        v.set_attribute("a", "3").unwrap();
        assert_eq!(
            v.attributes(),
            vec![("a".to_owned(), "3".to_owned()), ("b".to_owned(), "2".to_owned())]
        );
        assert!(v.has_attribute("b"));
        assert!(v.remove_attribute("b"));
        assert!(!v.remove_attribute("b"));
        assert_eq!(v.attribute("b"), None);
    }

    #[test]
    fn test_text_node_value() {
        let t = Node::new_text("hello").unwrap();
        assert!(t.view().is_text());
        assert_eq!(t.view().value().as_deref(), Some("hello"));
        assert_eq!(t.view().node_type(), NodeType::Text);
        let el = Node::new("e").unwrap();
        assert_eq!(el.view().value(), None);
    }

    #[test]
    fn test_set_name_and_content() {
        let el = Node::new("old").unwrap();
        el.view().create_element("child").unwrap();
        el.view().set_name("new").unwrap();
        el.view().set_content("text").unwrap();
        assert_eq!(el.view().to_string(false), "<new>text</new>");
        assert!(el.view().first_child().is_text());
    }

    #[test]
    #[cfg(not(feature = "panic-on-error"))]
    fn test_interior_nul_rejected() {
        assert!(matches!(
            Node::new("a\0b"),
            Err(Error::InteriorNul { offset: 1 })
        ));
        let el = Node::new("e").unwrap();
        assert!(el.view().set_name("x\0").is_err());
        assert_eq!(el.view().attribute("x\0"), None);
    }

    #[test]
    fn test_clone_node_is_deep_and_detached() {
        let el = Node::new("e").unwrap();
        el.view().create_element("c").unwrap();
        let copy = el.view().clone_node().unwrap();
        assert_ne!(copy.view(), el.view());
        assert_eq!(copy.view().to_string(false), "<e><c/></e>");
        drop(el);
        assert_eq!(copy.view().first_child().name(), "c");
    }

    #[test]
    #[should_panic(expected = "append_child called with an attribute node")]
    fn test_append_child_rejects_attribute() {
        let el = Node::new("e").unwrap();
        let doc = crate::tree::XmlDocument::parse("<r k=\"v\"/>").unwrap();
        let attr = doc.root_node().xpath("@k").unwrap();
        let owned = attr.as_nodeset().unwrap().at(0).clone_node().unwrap();
        el.view().append_child(owned);
    }
}
