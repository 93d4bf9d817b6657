//! Raw libxml2 declarations.
//!
//! This is the whole boundary between `xmlhandle` and the engine: the
//! `#[repr(C)]` layouts of the structures the wrappers read through, and the
//! `extern "C"` entry points they call. Only structure prefixes that libxml2
//! has kept stable across the 2.9 - 2.13 series are declared; the structures
//! are always allocated by libxml2 and never constructed on the Rust side.
//!
//! Everything here is `unsafe` to use. The safe API lives in [`crate::tree`]
//! and [`crate::xpath`].
#![allow(unsafe_code, non_snake_case, non_upper_case_globals, missing_docs)]

use std::os::raw::{c_char, c_int, c_long, c_ushort, c_void};

/// libxml2's `xmlChar` (UTF-8 code unit).
pub type XmlChar = u8;

// ---------------------------------------------------------------------------
// Node types (xmlElementType)
// ---------------------------------------------------------------------------

pub const XML_ELEMENT_NODE: c_int = 1;
pub const XML_ATTRIBUTE_NODE: c_int = 2;
pub const XML_TEXT_NODE: c_int = 3;
pub const XML_CDATA_SECTION_NODE: c_int = 4;
pub const XML_ENTITY_REF_NODE: c_int = 5;
pub const XML_ENTITY_NODE: c_int = 6;
pub const XML_PI_NODE: c_int = 7;
pub const XML_COMMENT_NODE: c_int = 8;
pub const XML_DOCUMENT_NODE: c_int = 9;
pub const XML_DOCUMENT_TYPE_NODE: c_int = 10;
pub const XML_DOCUMENT_FRAG_NODE: c_int = 11;
pub const XML_NOTATION_NODE: c_int = 12;
pub const XML_HTML_DOCUMENT_NODE: c_int = 13;
pub const XML_DTD_NODE: c_int = 14;
/// Namespace declarations are `xmlNs`, not `xmlNode`; only `type_` lines up.
pub const XML_NAMESPACE_DECL: c_int = 18;

// ---------------------------------------------------------------------------
// Parser options (xmlParserOption / htmlParserOption share these bits)
// ---------------------------------------------------------------------------

pub const XML_PARSE_RECOVER: c_int = 1 << 0;
pub const XML_PARSE_NOENT: c_int = 1 << 1;
pub const XML_PARSE_NOERROR: c_int = 1 << 5;
pub const XML_PARSE_NOWARNING: c_int = 1 << 6;
pub const XML_PARSE_NOBLANKS: c_int = 1 << 8;
pub const XML_PARSE_NONET: c_int = 1 << 11;
pub const XML_PARSE_NOXINCNODE: c_int = 1 << 15;

// ---------------------------------------------------------------------------
// XPath object types (xmlXPathObjectType)
// ---------------------------------------------------------------------------

pub const XPATH_UNDEFINED: c_int = 0;
pub const XPATH_NODESET: c_int = 1;
pub const XPATH_BOOLEAN: c_int = 2;
pub const XPATH_NUMBER: c_int = 3;
pub const XPATH_STRING: c_int = 4;

// ---------------------------------------------------------------------------
// Error levels (xmlErrorLevel)
// ---------------------------------------------------------------------------

pub const XML_ERR_NONE: c_int = 0;
pub const XML_ERR_WARNING: c_int = 1;
pub const XML_ERR_ERROR: c_int = 2;
pub const XML_ERR_FATAL: c_int = 3;

// ---------------------------------------------------------------------------
// Structures
// ---------------------------------------------------------------------------

/// `struct _xmlNode`.
#[repr(C)]
pub struct XmlNode {
    pub _private: *mut c_void,
    pub type_: c_int,
    pub name: *const XmlChar,
    pub children: *mut XmlNode,
    pub last: *mut XmlNode,
    pub parent: *mut XmlNode,
    pub next: *mut XmlNode,
    pub prev: *mut XmlNode,
    pub doc: *mut XmlDoc,
    pub ns: *mut XmlNs,
    pub content: *mut XmlChar,
    pub properties: *mut XmlAttr,
    pub nsDef: *mut XmlNs,
    pub psvi: *mut c_void,
    pub line: c_ushort,
    pub extra: c_ushort,
}

/// Leading fields of `struct _xmlDoc`.
#[repr(C)]
pub struct XmlDoc {
    pub _private: *mut c_void,
    pub type_: c_int,
    pub name: *mut c_char,
    pub children: *mut XmlNode,
    pub last: *mut XmlNode,
    pub parent: *mut XmlNode,
    pub next: *mut XmlNode,
    pub prev: *mut XmlNode,
    pub doc: *mut XmlDoc,
    pub compression: c_int,
    pub standalone: c_int,
    pub intSubset: *mut c_void,
    pub extSubset: *mut c_void,
    pub oldNs: *mut XmlNs,
    pub version: *const XmlChar,
    pub encoding: *const XmlChar,
}

/// Leading fields of `struct _xmlAttr`.
#[repr(C)]
pub struct XmlAttr {
    pub _private: *mut c_void,
    pub type_: c_int,
    pub name: *const XmlChar,
    pub children: *mut XmlNode,
    pub last: *mut XmlNode,
    pub parent: *mut XmlNode,
    pub next: *mut XmlAttr,
    pub prev: *mut XmlAttr,
    pub doc: *mut XmlDoc,
}

/// `struct _xmlNodeSet`.
#[repr(C)]
pub struct XmlNodeSet {
    pub nodeNr: c_int,
    pub nodeMax: c_int,
    pub nodeTab: *mut *mut XmlNode,
}

/// `struct _xmlXPathObject`.
#[repr(C)]
pub struct XmlXPathObject {
    pub type_: c_int,
    pub nodesetval: *mut XmlNodeSet,
    pub boolval: c_int,
    pub floatval: f64,
    pub stringval: *mut XmlChar,
    pub user: *mut c_void,
    pub index: c_int,
    pub user2: *mut c_void,
    pub index2: c_int,
}

/// Leading fields of `struct _xmlXPathContext`.
#[repr(C)]
pub struct XmlXPathContext {
    pub doc: *mut XmlDoc,
    pub node: *mut XmlNode,
}

/// `struct _xmlError`.
#[repr(C)]
pub struct XmlError {
    pub domain: c_int,
    pub code: c_int,
    pub message: *mut c_char,
    pub level: c_int,
    pub file: *mut c_char,
    pub line: c_int,
    pub str1: *mut c_char,
    pub str2: *mut c_char,
    pub str3: *mut c_char,
    pub int1: c_int,
    pub int2: c_int,
    pub ctxt: *mut c_void,
    pub node: *mut c_void,
}

/// Leading fields of `struct _xmlNs`.
///
/// `XPath` node-sets hold private copies of these for `namespace::` results,
/// with `next` pointing at the owning element.
#[repr(C)]
pub struct XmlNs {
    pub next: *mut XmlNs,
    pub type_: c_int,
    pub href: *const XmlChar,
    pub prefix: *const XmlChar,
}

/// Opaque `xmlBuffer`.
#[repr(C)]
pub struct XmlBuffer {
    _opaque: [u8; 0],
}

/// Opaque `xmlXPathCompExpr`.
#[repr(C)]
pub struct XmlXPathCompExpr {
    _opaque: [u8; 0],
}

pub type XmlFreeFunc = unsafe extern "C" fn(*mut c_void);
pub type XmlMallocFunc = unsafe extern "C" fn(usize) -> *mut c_void;
pub type XmlReallocFunc = unsafe extern "C" fn(*mut c_void, usize) -> *mut c_void;
pub type XmlStrdupFunc = unsafe extern "C" fn(*const c_char) -> *mut c_char;

// ---------------------------------------------------------------------------
// Functions
// ---------------------------------------------------------------------------

#[link(name = "xml2")]
extern "C" {
    // -- Globals and memory ----------------------------------------------
    pub static xmlFree: Option<XmlFreeFunc>;

    pub fn xmlInitParser();
    pub fn xmlCleanupParser();

    pub fn xmlMemSetup(
        free_func: XmlFreeFunc,
        malloc_func: XmlMallocFunc,
        realloc_func: XmlReallocFunc,
        strdup_func: XmlStrdupFunc,
    ) -> c_int;
    pub fn xmlMemMalloc(size: usize) -> *mut c_void;
    pub fn xmlMemRealloc(ptr: *mut c_void, size: usize) -> *mut c_void;
    pub fn xmlMemFree(ptr: *mut c_void);
    pub fn xmlMemoryStrdup(s: *const c_char) -> *mut c_char;
    pub fn xmlMemBlocks() -> c_int;

    // -- Errors ----------------------------------------------------------
    pub fn xmlGetLastError() -> *const XmlError;
    pub fn xmlResetLastError();

    // -- Documents -------------------------------------------------------
    pub fn xmlReadMemory(
        buffer: *const c_char,
        size: c_int,
        url: *const c_char,
        encoding: *const c_char,
        options: c_int,
    ) -> *mut XmlDoc;
    pub fn htmlReadMemory(
        buffer: *const c_char,
        size: c_int,
        url: *const c_char,
        encoding: *const c_char,
        options: c_int,
    ) -> *mut XmlDoc;
    pub fn xmlNewDoc(version: *const XmlChar) -> *mut XmlDoc;
    pub fn htmlNewDoc(uri: *const XmlChar, external_id: *const XmlChar) -> *mut XmlDoc;
    pub fn xmlFreeDoc(doc: *mut XmlDoc);
    pub fn xmlCopyDoc(doc: *mut XmlDoc, recursive: c_int) -> *mut XmlDoc;
    pub fn xmlDocGetRootElement(doc: *const XmlDoc) -> *mut XmlNode;
    pub fn xmlDocSetRootElement(doc: *mut XmlDoc, root: *mut XmlNode) -> *mut XmlNode;
    pub fn xmlDocDumpFormatMemory(
        doc: *mut XmlDoc,
        mem: *mut *mut XmlChar,
        size: *mut c_int,
        format: c_int,
    );
    pub fn htmlDocDumpMemoryFormat(
        doc: *mut XmlDoc,
        mem: *mut *mut XmlChar,
        size: *mut c_int,
        format: c_int,
    );

    // -- Nodes -----------------------------------------------------------
    pub fn xmlNewNode(ns: *mut XmlNs, name: *const XmlChar) -> *mut XmlNode;
    pub fn xmlNewText(content: *const XmlChar) -> *mut XmlNode;
    pub fn xmlNewComment(content: *const XmlChar) -> *mut XmlNode;
    pub fn xmlNewChild(
        parent: *mut XmlNode,
        ns: *mut XmlNs,
        name: *const XmlChar,
        content: *const XmlChar,
    ) -> *mut XmlNode;
    pub fn xmlFreeNode(node: *mut XmlNode);
    pub fn xmlDocCopyNode(node: *mut XmlNode, doc: *mut XmlDoc, extended: c_int) -> *mut XmlNode;
    pub fn xmlAddChild(parent: *mut XmlNode, cur: *mut XmlNode) -> *mut XmlNode;
    pub fn xmlNodeIsText(node: *const XmlNode) -> c_int;
    pub fn xmlIsBlankNode(node: *const XmlNode) -> c_int;
    pub fn xmlNodeGetContent(node: *const XmlNode) -> *mut XmlChar;
    pub fn xmlNodeSetContentLen(node: *mut XmlNode, content: *const XmlChar, len: c_int);
    pub fn xmlNodeAddContentLen(node: *mut XmlNode, content: *const XmlChar, len: c_int);
    pub fn xmlNodeSetName(node: *mut XmlNode, name: *const XmlChar);
    pub fn xmlNodeListGetString(
        doc: *mut XmlDoc,
        list: *const XmlNode,
        in_line: c_int,
    ) -> *mut XmlChar;
    pub fn xmlGetLineNo(node: *const XmlNode) -> c_long;
    pub fn xmlGetNodePath(node: *const XmlNode) -> *mut XmlChar;

    // -- Attributes ------------------------------------------------------
    pub fn xmlGetProp(node: *const XmlNode, name: *const XmlChar) -> *mut XmlChar;
    pub fn xmlHasProp(node: *const XmlNode, name: *const XmlChar) -> *mut XmlAttr;
    pub fn xmlSetProp(
        node: *mut XmlNode,
        name: *const XmlChar,
        value: *const XmlChar,
    ) -> *mut XmlAttr;
    pub fn xmlUnsetProp(node: *mut XmlNode, name: *const XmlChar) -> c_int;

    // -- Node serialization ----------------------------------------------
    pub fn xmlBufferCreate() -> *mut XmlBuffer;
    pub fn xmlBufferFree(buf: *mut XmlBuffer);
    pub fn xmlBufferContent(buf: *const XmlBuffer) -> *const XmlChar;
    pub fn xmlBufferLength(buf: *const XmlBuffer) -> c_int;
    pub fn xmlNodeDump(
        buf: *mut XmlBuffer,
        doc: *mut XmlDoc,
        node: *mut XmlNode,
        level: c_int,
        format: c_int,
    ) -> c_int;

    // -- XPath -----------------------------------------------------------
    pub fn xmlXPathNewContext(doc: *mut XmlDoc) -> *mut XmlXPathContext;
    pub fn xmlXPathFreeContext(ctxt: *mut XmlXPathContext);
    pub fn xmlXPathRegisterNs(
        ctxt: *mut XmlXPathContext,
        prefix: *const XmlChar,
        ns_uri: *const XmlChar,
    ) -> c_int;
    pub fn xmlXPathEvalExpression(
        expr: *const XmlChar,
        ctxt: *mut XmlXPathContext,
    ) -> *mut XmlXPathObject;
    pub fn xmlXPathCompile(expr: *const XmlChar) -> *mut XmlXPathCompExpr;
    pub fn xmlXPathCompiledEval(
        comp: *mut XmlXPathCompExpr,
        ctxt: *mut XmlXPathContext,
    ) -> *mut XmlXPathObject;
    pub fn xmlXPathFreeCompExpr(comp: *mut XmlXPathCompExpr);
    pub fn xmlXPathFreeObject(obj: *mut XmlXPathObject);
    pub fn xmlXPathObjectCopy(obj: *mut XmlXPathObject) -> *mut XmlXPathObject;
    pub fn xmlXPathCastToBoolean(obj: *mut XmlXPathObject) -> c_int;
    pub fn xmlXPathCastToNumber(obj: *mut XmlXPathObject) -> f64;
    pub fn xmlXPathCastToString(obj: *mut XmlXPathObject) -> *mut XmlChar;
}

/// Releases memory handed out by libxml2 through its configured deallocator.
///
/// Reads the process-wide `xmlFree` hook, so a custom allocator installed with
/// [`xmlMemSetup`] must be installed from the main thread.
///
/// # Safety
///
/// `ptr` must be null or a block allocated by libxml2 that the caller owns.
pub unsafe fn free(ptr: *mut c_void) {
    if ptr.is_null() {
        return;
    }
    // SAFETY: reading the engine's allocator hook; it is only written by
    // `xmlMemSetup`, which callers run before any other engine call.
    if let Some(f) = unsafe { xmlFree } {
        // SAFETY: caller guarantees `ptr` came from the engine allocator.
        unsafe { f(ptr) };
    }
}

