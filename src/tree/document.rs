//! Document handles and factories.
#![allow(unsafe_code)]

use std::fmt;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::os::raw::{c_char, c_int};
use std::ptr;

use tracing::{debug, warn};

use super::node::{Node, NodeRef, NodeType};
use crate::error::{clear_last_error, last_error, raise, Diagnostic, Error, Result};
use crate::parser::ParseOptions;
use crate::sys;
use crate::util::strings;
use crate::xpath::XPathContext;

/// Which parser built a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    /// Well-formed XML.
    Xml,
    /// HTML, parsed leniently.
    Html,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Xml => f.write_str("XML"),
            Self::Html => f.write_str("HTML"),
        }
    }
}

/// A borrowed reference to a document.
///
/// Like [`NodeRef`], this is `Copy`, compares by identity, never frees
/// anything, and may be null.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentRef<'a> {
    doc: *mut sys::XmlDoc,
    _owner: PhantomData<&'a sys::XmlDoc>,
}

impl Default for DocumentRef<'_> {
    fn default() -> Self {
        Self::from_ptr(ptr::null_mut())
    }
}

impl<'a> DocumentRef<'a> {
    pub(crate) fn from_ptr(doc: *mut sys::XmlDoc) -> Self {
        Self {
            doc,
            _owner: PhantomData,
        }
    }

    /// Wraps a raw engine document without taking ownership.
    ///
    /// # Safety
    ///
    /// `doc` must be null or a live document that nobody frees during `'a`.
    #[must_use]
    pub unsafe fn from_raw(doc: *mut sys::XmlDoc) -> Self {
        Self::from_ptr(doc)
    }

    /// The raw engine pointer.
    #[must_use]
    pub fn as_ptr(&self) -> *mut sys::XmlDoc {
        self.doc
    }

    /// Returns true if this is the null reference.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.doc.is_null()
    }

    #[track_caller]
    fn checked(&self, op: &str) -> *mut sys::XmlDoc {
        assert!(!self.doc.is_null(), "DocumentRef::{op} called on a null document");
        self.doc
    }

    /// Which parser family the document belongs to.
    pub fn kind(&self) -> DocumentKind {
        let doc = self.checked("kind");
        // SAFETY: live document.
        if unsafe { (*doc).type_ } == sys::XML_HTML_DOCUMENT_NODE {
            DocumentKind::Html
        } else {
            DocumentKind::Xml
        }
    }

    /// The document node itself, as a node.
    ///
    /// This is the parent of the root element and the context node of
    /// [`XPathContext::eval`].
    pub fn as_node(&self) -> NodeRef<'a> {
        NodeRef::from_ptr(self.checked("as_node").cast())
    }

    /// The root element (null for a document without one).
    pub fn root_node(&self) -> NodeRef<'a> {
        let doc = self.checked("root_node");
        // SAFETY: live document; the root stays owned by it.
        NodeRef::from_ptr(unsafe { sys::xmlDocGetRootElement(doc) })
    }

    /// The XML version from the declaration, e.g. `1.0`.
    pub fn version(&self) -> Option<String> {
        let doc = self.checked("version");
        // SAFETY: `version` is null or a string owned by the document.
        unsafe { strings::borrowed((*doc).version) }
    }

    /// The declared encoding, if the input had one.
    pub fn encoding(&self) -> Option<String> {
        let doc = self.checked("encoding");
        // SAFETY: `encoding` is null or a string owned by the document.
        unsafe { strings::borrowed((*doc).encoding) }
    }

    /// Serializes the document as XML, in its declared encoding.
    pub fn to_bytes(&self, format: bool) -> Vec<u8> {
        let doc = self.checked("to_bytes");
        // SAFETY: live document; the engine hands us a buffer to free.
        unsafe {
            dump(doc, format, |d, mem, size, fmt| {
                sys::xmlDocDumpFormatMemory(d, mem, size, fmt)
            })
        }
    }

    /// Serializes the document as XML text, XML declaration included.
    pub fn to_string(&self, format: bool) -> String {
        strings::decode(&self.to_bytes(format), self.encoding().as_deref())
    }

    /// Serializes the document with the HTML serializer.
    ///
    /// This works on XML documents too, but is meant for documents built by
    /// [`HtmlDocument`].
    pub fn to_html_string(&self, format: bool) -> String {
        let doc = self.checked("to_html_string");
        // SAFETY: live document; the engine hands us a buffer to free.
        let bytes = unsafe {
            dump(doc, format, |d, mem, size, fmt| sys::htmlDocDumpMemoryFormat(d, mem, size, fmt))
        };
        strings::decode(&bytes, self.encoding().as_deref())
    }

    /// Deep-copies the document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Allocation`] if the engine could not copy it.
    pub fn clone_document(&self) -> Result<Document> {
        let doc = self.checked("clone_document");
        // SAFETY: live document; the copy is ours.
        let copy = unsafe { sys::xmlCopyDoc(doc, 1) };
        if copy.is_null() {
            return raise(Error::Allocation { what: "document copy" });
        }
        debug!(from = ?doc, to = ?copy, "copied document");
        Ok(Document { doc: copy })
    }

    /// Creates an `XPath` context bound to this document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Allocation`] if the engine could not create it.
    pub fn xpath_context(&self) -> Result<XPathContext<'a>> {
        XPathContext::new(*self)
    }
}

/// Runs one of the engine's "dump to memory" serializers and copies out the
/// result.
///
/// # Safety
///
/// `doc` must be a live document and `serialize` one of the engine's
/// document dump functions.
unsafe fn dump(
    doc: *mut sys::XmlDoc,
    format: bool,
    serialize: impl FnOnce(*mut sys::XmlDoc, *mut *mut sys::XmlChar, *mut c_int, c_int),
) -> Vec<u8> {
    let mut mem: *mut sys::XmlChar = ptr::null_mut();
    let mut size: c_int = 0;
    serialize(doc, &mut mem, &mut size, c_int::from(format));
    if mem.is_null() {
        return Vec::new();
    }
    let len = usize::try_from(size).unwrap_or(0);
    // SAFETY: the engine wrote `size` bytes at `mem`.
    let bytes = unsafe { std::slice::from_raw_parts(mem, len) }.to_vec();
    // SAFETY: `mem` was allocated by the engine for us.
    unsafe { sys::free(mem.cast()) };
    bytes
}

impl fmt::Debug for DocumentRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return f.write_str("DocumentRef(null)");
        }
        f.debug_struct("DocumentRef")
            .field("kind", &self.kind())
            .field("ptr", &self.doc)
            .finish()
    }
}

/// An owned document.
///
/// Dropping a `Document` frees it together with every node in its tree, so
/// all [`NodeRef`]s into it borrow from the `Document`. A default (or
/// [`detach`](Self::detach)ed) `Document` is null and frees nothing.
///
/// Usually obtained through [`XmlDocument`] or [`HtmlDocument`].
pub struct Document {
    doc: *mut sys::XmlDoc,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            doc: ptr::null_mut(),
        }
    }
}

impl Document {
    /// Takes ownership of a raw engine document.
    ///
    /// # Safety
    ///
    /// `doc` must be null or a document that nothing else frees.
    #[must_use]
    pub unsafe fn from_raw(doc: *mut sys::XmlDoc) -> Self {
        Self { doc }
    }

    /// A borrowed view of this document.
    #[must_use]
    pub fn view(&self) -> DocumentRef<'_> {
        DocumentRef::from_ptr(self.doc)
    }

    /// Returns true if this wrapper owns nothing.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.doc.is_null()
    }

    /// The root element (null for a document without one).
    pub fn root_node(&self) -> NodeRef<'_> {
        self.view().root_node()
    }

    /// Serializes the document as XML text.
    pub fn to_string(&self, format: bool) -> String {
        self.view().to_string(format)
    }

    /// The XML version from the declaration.
    pub fn version(&self) -> Option<String> {
        self.view().version()
    }

    /// Deep-copies the document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Allocation`] if the engine could not copy it.
    pub fn clone_document(&self) -> Result<Document> {
        self.view().clone_document()
    }

    /// Creates an `XPath` context bound to this document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Allocation`] if the engine could not create it.
    pub fn xpath_context(&self) -> Result<XPathContext<'_>> {
        self.view().xpath_context()
    }

    /// Installs `root` as the root element and returns the element it
    /// replaced as a detached [`Node`] (null if there was none).
    ///
    /// Taking `&mut self` ends every outstanding borrow of the tree, so no
    /// `NodeRef` to the replaced root can survive the call.
    ///
    /// # Panics
    ///
    /// Panics if the document is null or `root` is not an element.
    pub fn set_root(&mut self, root: Node) -> Node {
        assert!(!self.doc.is_null(), "Document::set_root called on a null document");
        let kind = root.view().non_null().map(|n| n.node_type());
        assert!(
            kind == Some(NodeType::Element),
            "Document::set_root needs an element, got {kind:?}"
        );
        let root = root.into_raw();
        // SAFETY: `root` is a detached node we own; the document takes it.
        let old = unsafe { sys::xmlDocSetRootElement(self.doc, root) };
        if old.is_null() {
            return Node::default();
        }
        // The old root's strings may live in this document's dictionary,
        // which dies with the document. Hand out a copy that owns its
        // strings and free the original while the dictionary is still here.
        // SAFETY: `old` is unlinked and ours; the document is alive.
        unsafe {
            let copy = sys::xmlDocCopyNode(old, ptr::null_mut(), 1);
            sys::xmlFreeNode(old);
            Node::from_raw(copy)
        }
    }

    /// Gives up ownership, leaving this wrapper null.
    #[must_use = "the detached document leaks unless it is re-wrapped or freed"]
    pub fn detach(&mut self) -> *mut sys::XmlDoc {
        std::mem::replace(&mut self.doc, ptr::null_mut())
    }

    /// Consumes the wrapper and returns the raw document without freeing it.
    #[must_use = "the returned document leaks unless it is re-wrapped or freed"]
    pub fn into_raw(mut self) -> *mut sys::XmlDoc {
        self.detach()
    }

    /// Frees the currently owned document, then takes ownership of `other`'s.
    pub fn assign(&mut self, other: Document) {
        *self = other;
    }
}

impl Drop for Document {
    fn drop(&mut self) {
        if self.doc.is_null() {
            return;
        }
        debug!(ptr = ?self.doc, "freeing document");
        // SAFETY: we exclusively own the document and nothing borrows it.
        unsafe { sys::xmlFreeDoc(self.doc) };
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Document").field(&self.view()).finish()
    }
}

fn parse(kind: DocumentKind, text: &str, options: ParseOptions) -> Result<Document> {
    let len = strings::to_c_len(text.len())?;
    let bits = options.bits();
    let buffer = text.as_ptr().cast::<c_char>();
    let encoding = c"UTF-8".as_ptr();
    clear_last_error();
    // SAFETY: `text` outlives the call and `len` is its exact length; the
    // returned document (if any) is ours.
    let doc = unsafe {
        match kind {
            DocumentKind::Xml => sys::xmlReadMemory(buffer, len, ptr::null(), encoding, bits),
            DocumentKind::Html => sys::htmlReadMemory(buffer, len, ptr::null(), encoding, bits),
        }
    };
    if doc.is_null() {
        let diagnostic = last_error()
            .unwrap_or_else(|| Diagnostic::unknown("the parser produced no document"));
        warn!(%kind, %diagnostic, "parse failed");
        return raise(Error::Parse { kind, diagnostic });
    }
    debug!(%kind, bytes = text.len(), ?options, ptr = ?doc, "parsed document");
    Ok(Document { doc })
}

macro_rules! document_newtype {
    ($name:ident) => {
        impl Deref for $name {
            type Target = Document;
            fn deref(&self) -> &Document {
                &self.0
            }
        }

        impl DerefMut for $name {
            fn deref_mut(&mut self) -> &mut Document {
                &mut self.0
            }
        }

        impl From<$name> for Document {
            fn from(doc: $name) -> Self {
                doc.0
            }
        }

        impl $name {
            /// Unwraps the underlying [`Document`].
            #[must_use]
            pub fn into_inner(self) -> Document {
                self.0
            }
        }
    };
}

/// An XML document.
///
/// ```
/// use xmlhandle::XmlDocument;
///
/// let doc = XmlDocument::parse("<a><b>x</b><c>y</c></a>").unwrap();
/// let root = doc.root_node();
/// assert_eq!(root.name(), "a");
/// assert_eq!(root.children().into_iter().count(), 2);
/// ```
#[derive(Debug)]
pub struct XmlDocument(Document);

document_newtype!(XmlDocument);

impl XmlDocument {
    /// Parses `text` with the default [`ParseOptions`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if no document could be built.
    pub fn parse(text: &str) -> Result<Self> {
        Self::parse_with_options(text, ParseOptions::default())
    }

    /// Parses `text` with explicit options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if no document could be built, or
    /// [`Error::InputTooLarge`] for inputs the engine cannot address.
    pub fn parse_with_options(text: &str, options: ParseOptions) -> Result<Self> {
        parse(DocumentKind::Xml, text, options).map(Self)
    }

    /// Creates an empty XML 1.0 document.
    ///
    /// # Panics
    ///
    /// Panics if the engine cannot allocate a document.
    #[must_use]
    pub fn new() -> Self {
        match Self::with_version("1.0") {
            Ok(doc) => doc,
            Err(err) => panic!("{err}"),
        }
    }

    /// Creates an empty document declaring `version`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InteriorNul`] if `version` contains NUL, or
    /// [`Error::Allocation`] if the engine could not create the document.
    pub fn with_version(version: &str) -> Result<Self> {
        let version = strings::to_xml_string(version)?;
        // SAFETY: the engine copies the version string; the document is ours.
        let doc = unsafe { sys::xmlNewDoc(version.as_ptr().cast()) };
        if doc.is_null() {
            return raise(Error::Allocation { what: "document" });
        }
        debug!(ptr = ?doc, "created XML document");
        Ok(Self(Document { doc }))
    }
}

impl Default for XmlDocument {
    fn default() -> Self {
        Self::new()
    }
}

/// An HTML document.
///
/// The HTML parser accepts tag soup and always produces a tree for
/// non-empty input.
#[derive(Debug)]
pub struct HtmlDocument(Document);

document_newtype!(HtmlDocument);

impl HtmlDocument {
    /// Parses `text` with the default [`ParseOptions`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if no document could be built.
    pub fn parse(text: &str) -> Result<Self> {
        Self::parse_with_options(text, ParseOptions::default())
    }

    /// Parses `text` with explicit options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if no document could be built, or
    /// [`Error::InputTooLarge`] for inputs the engine cannot address.
    pub fn parse_with_options(text: &str, options: ParseOptions) -> Result<Self> {
        parse(DocumentKind::Html, text, options).map(Self)
    }

    /// Creates an empty HTML document with the default doctype.
    ///
    /// # Panics
    ///
    /// Panics if the engine cannot allocate a document.
    #[must_use]
    pub fn new() -> Self {
        match Self::with_ids(None, None) {
            Ok(doc) => doc,
            Err(err) => panic!("{err}"),
        }
    }

    /// Creates an empty HTML document whose doctype uses the given system
    /// URI and public identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InteriorNul`] if an identifier contains NUL, or
    /// [`Error::Allocation`] if the engine could not create the document.
    pub fn with_ids(uri: Option<&str>, external_id: Option<&str>) -> Result<Self> {
        let uri = uri.map(strings::to_xml_string).transpose()?;
        let external_id = external_id.map(strings::to_xml_string).transpose()?;
        let as_ptr = |s: &Option<std::ffi::CString>| {
            s.as_ref().map_or(ptr::null(), |s| s.as_ptr().cast::<sys::XmlChar>())
        };
        // SAFETY: the engine copies both identifiers; the document is ours.
        let doc = unsafe { sys::htmlNewDoc(as_ptr(&uri), as_ptr(&external_id)) };
        if doc.is_null() {
            return raise(Error::Allocation { what: "document" });
        }
        debug!(ptr = ?doc, "created HTML document");
        Ok(Self(Document { doc }))
    }
}

impl Default for HtmlDocument {
    fn default() -> Self {
        Self::new()
    }
}
