//! `XPath` result objects.
#![allow(unsafe_code)]

use std::fmt;
use std::marker::PhantomData;
use std::os::raw::c_int;

use super::nodeset::{NodeSetIter, XPathNodeSet};
use crate::error::{raise, Error, Result};
use crate::sys;
use crate::tree::NodeRef;
use crate::util::strings;

/// The four kinds of `XPath` result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XPathKind {
    /// An ordered set of nodes.
    NodeSet,
    /// A boolean.
    Boolean,
    /// An IEEE double.
    Number,
    /// A string.
    String,
}

impl XPathKind {
    fn from_raw(raw: c_int) -> Option<Self> {
        match raw {
            sys::XPATH_NODESET => Some(Self::NodeSet),
            sys::XPATH_BOOLEAN => Some(Self::Boolean),
            sys::XPATH_NUMBER => Some(Self::Number),
            sys::XPATH_STRING => Some(Self::String),
            _ => None,
        }
    }
}

impl fmt::Display for XPathKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NodeSet => "node-set",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::String => "string",
        })
    }
}

/// A result value, borrowed from an [`XPathObject`].
#[derive(Debug, Clone, PartialEq)]
pub enum XPathValue<'o, 'a> {
    /// Nodes in document order.
    NodeSet(XPathNodeSet<'o, 'a>),
    /// A boolean result.
    Boolean(bool),
    /// A numeric result.
    Number(f64),
    /// A string result.
    String(String),
}

/// The owned result of evaluating an `XPath` expression.
///
/// The object is freed on drop. Nodes it refers to belong to the document,
/// so the object borrows the document for `'a`. Cloning deep-copies the
/// result (the node-set array, not the nodes).
///
/// The typed accessors check the kind first and fail with
/// [`Error::TypeMismatch`] on any other kind. The `to_*` methods instead
/// apply `XPath` conversion rules and never fail.
pub struct XPathObject<'a> {
    obj: *mut sys::XmlXPathObject,
    kind: XPathKind,
    _doc: PhantomData<NodeRef<'a>>,
}

impl<'a> XPathObject<'a> {
    /// Wraps a fresh evaluation result, rejecting kinds this crate does not
    /// model (the engine's XPointer extensions).
    pub(crate) fn from_engine(obj: *mut sys::XmlXPathObject, expression: &str) -> Result<Self> {
        // SAFETY: callers pass a non-null object they own.
        let raw = unsafe { (*obj).type_ };
        if let Some(kind) = XPathKind::from_raw(raw) {
            return Ok(Self {
                obj,
                kind,
                _doc: PhantomData,
            });
        }
        // SAFETY: still ours; nothing else refers to it.
        unsafe { sys::xmlXPathFreeObject(obj) };
        raise(Error::XPath {
            expression: expression.to_owned(),
            message: format!("unsupported result type {raw}"),
        })
    }

    /// Takes ownership of a raw engine result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::XPath`] if `obj` is null, or (after freeing it) if
    /// the result is not one of the four standard kinds.
    ///
    /// # Safety
    ///
    /// `obj` must be null or a result that nothing else frees, and any
    /// nodes it refers to must stay alive for `'a`.
    pub unsafe fn from_raw(obj: *mut sys::XmlXPathObject) -> Result<Self> {
        if obj.is_null() {
            return raise(Error::XPath {
                expression: String::new(),
                message: "null result object".to_owned(),
            });
        }
        Self::from_engine(obj, "")
    }

    /// Gives up ownership and returns the raw engine result.
    #[must_use = "the returned object leaks unless it is re-wrapped or freed"]
    pub fn into_raw(self) -> *mut sys::XmlXPathObject {
        let obj = self.obj;
        std::mem::forget(self);
        obj
    }

    /// The raw engine pointer, still owned by `self`.
    #[must_use]
    pub fn as_ptr(&self) -> *mut sys::XmlXPathObject {
        self.obj
    }

    /// The kind of result.
    #[must_use]
    pub fn kind(&self) -> XPathKind {
        self.kind
    }

    /// Returns true for node-set results.
    #[must_use]
    pub fn is_nodeset(&self) -> bool {
        self.kind == XPathKind::NodeSet
    }

    /// Returns true for boolean results.
    #[must_use]
    pub fn is_boolean(&self) -> bool {
        self.kind == XPathKind::Boolean
    }

    /// Returns true for number results.
    #[must_use]
    pub fn is_number(&self) -> bool {
        self.kind == XPathKind::Number
    }

    /// Returns true for string results.
    #[must_use]
    pub fn is_string(&self) -> bool {
        self.kind == XPathKind::String
    }

    fn expect(&self, expected: XPathKind) -> Result<()> {
        if self.kind == expected {
            Ok(())
        } else {
            raise(Error::TypeMismatch {
                expected,
                found: self.kind,
            })
        }
    }

    /// The boolean value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] unless the result is a boolean.
    pub fn as_boolean(&self) -> Result<bool> {
        self.expect(XPathKind::Boolean)?;
        // SAFETY: owned, live object.
        Ok(unsafe { (*self.obj).boolval } != 0)
    }

    /// The numeric value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] unless the result is a number.
    pub fn as_number(&self) -> Result<f64> {
        self.expect(XPathKind::Number)?;
        // SAFETY: owned, live object.
        Ok(unsafe { (*self.obj).floatval })
    }

    /// The string value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] unless the result is a string.
    pub fn as_string(&self) -> Result<String> {
        self.expect(XPathKind::String)?;
        // SAFETY: `stringval` is null or owned by the object.
        Ok(unsafe { strings::borrowed((*self.obj).stringval) }.unwrap_or_default())
    }

    /// The node-set. A node-set result without a set is treated as empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] unless the result is a node-set.
    pub fn as_nodeset(&self) -> Result<XPathNodeSet<'_, 'a>> {
        self.expect(XPathKind::NodeSet)?;
        // SAFETY: `nodesetval` is null or owned by the object.
        Ok(XPathNodeSet::from_ptr(unsafe { (*self.obj).nodesetval }))
    }

    /// Iterates the nodes of a node-set result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] unless the result is a node-set.
    pub fn iter(&self) -> Result<NodeSetIter<'_, 'a>> {
        Ok(self.as_nodeset()?.iter())
    }

    /// The result as a [`XPathValue`].
    #[must_use]
    pub fn value(&self) -> XPathValue<'_, 'a> {
        // SAFETY: owned, live object whose kind was validated on creation.
        unsafe {
            match self.kind {
                XPathKind::NodeSet => {
                    XPathValue::NodeSet(XPathNodeSet::from_ptr((*self.obj).nodesetval))
                }
                XPathKind::Boolean => XPathValue::Boolean((*self.obj).boolval != 0),
                XPathKind::Number => XPathValue::Number((*self.obj).floatval),
                XPathKind::String => XPathValue::String(
                    strings::borrowed((*self.obj).stringval).unwrap_or_default(),
                ),
            }
        }
    }

    /// Converts to a boolean with `XPath`'s `boolean()` rules: a node-set is
    /// true when non-empty, a string when non-empty, a number when neither
    /// zero nor NaN.
    #[must_use]
    pub fn to_boolean(&self) -> bool {
        // SAFETY: the engine only reads the object.
        unsafe { sys::xmlXPathCastToBoolean(self.obj) != 0 }
    }

    /// Converts to a number with `XPath`'s `number()` rules.
    #[must_use]
    pub fn to_number(&self) -> f64 {
        // SAFETY: the engine only reads the object.
        unsafe { sys::xmlXPathCastToNumber(self.obj) }
    }

    /// Converts to a string with `XPath`'s `string()` rules; a node-set
    /// gives the string value of its first node.
    #[must_use]
    pub fn to_string_value(&self) -> String {
        // SAFETY: the engine only reads the object and returns a fresh string.
        unsafe { strings::adopt(sys::xmlXPathCastToString(self.obj)) }.unwrap_or_default()
    }
}

impl Clone for XPathObject<'_> {
    fn clone(&self) -> Self {
        // SAFETY: the engine copies a live object into a new one we own.
        let copy = unsafe { sys::xmlXPathObjectCopy(self.obj) };
        assert!(!copy.is_null(), "libxml2 could not copy an XPath object");
        Self {
            obj: copy,
            kind: self.kind,
            _doc: PhantomData,
        }
    }
}

impl Drop for XPathObject<'_> {
    fn drop(&mut self) {
        // SAFETY: we own the object; node-set members belong to the document.
        unsafe { sys::xmlXPathFreeObject(self.obj) };
    }
}

impl fmt::Debug for XPathObject<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("XPathObject").field(&self.value()).finish()
    }
}

impl<'o, 'a> IntoIterator for &'o XPathObject<'a> {
    type Item = NodeRef<'a>;
    type IntoIter = NodeSetIter<'o, 'a>;

    /// Iterates a node-set result.
    ///
    /// # Panics
    ///
    /// Panics if the result is not a node-set; use
    /// [`XPathObject::iter`] to get an error instead.
    fn into_iter(self) -> NodeSetIter<'o, 'a> {
        match self.iter() {
            Ok(it) => it,
            Err(err) => panic!("{err}"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tree::XmlDocument;

    #[test]
    fn test_kind_display() {
        assert_eq!(XPathKind::NodeSet.to_string(), "node-set");
        assert_eq!(XPathKind::String.to_string(), "string");
    }

    #[test]
    fn test_typed_accessors() {
        let doc = XmlDocument::parse("<r><i>1</i><i>2</i></r>").unwrap();
        let ctx = doc.xpath_context().unwrap();

        let n = ctx.eval("count(//i)").unwrap();
        assert!(n.is_number());
        assert_eq!(n.as_number().unwrap(), 2.0);

        let b = ctx.eval("count(//i) = 2").unwrap();
        assert!(b.as_boolean().unwrap());

        let s = ctx.eval("string(/r/i[2])").unwrap();
        assert_eq!(s.as_string().unwrap(), "2");

        let set = ctx.eval("//i").unwrap();
        assert_eq!(set.as_nodeset().unwrap().len(), 2);
    }

    #[test]
    #[cfg(not(feature = "panic-on-error"))]
    fn test_type_mismatch() {
        let doc = XmlDocument::parse("<r/>").unwrap();
        let ctx = doc.xpath_context().unwrap();
        let n = ctx.eval("1 + 1").unwrap();
        assert!(matches!(
            n.as_nodeset(),
            Err(Error::TypeMismatch {
                expected: XPathKind::NodeSet,
                found: XPathKind::Number
            })
        ));
        assert!(n.as_string().is_err());
        assert!(n.as_boolean().is_err());
        assert!(n.iter().is_err());
    }

    #[test]
    fn test_conversions() {
        let doc = XmlDocument::parse("<r><i>7</i></r>").unwrap();
        let ctx = doc.xpath_context().unwrap();
        let set = ctx.eval("//i").unwrap();
        assert!(set.to_boolean());
        assert_eq!(set.to_number(), 7.0);
        assert_eq!(set.to_string_value(), "7");
        let empty = ctx.eval("//missing").unwrap();
        assert!(!empty.to_boolean());
        assert!(empty.to_number().is_nan());
    }

    #[test]
    fn test_value_enum() {
        let doc = XmlDocument::parse("<r/>").unwrap();
        let ctx = doc.xpath_context().unwrap();
        assert_eq!(ctx.eval("'x'").unwrap().value(), XPathValue::String("x".into()));
        assert_eq!(ctx.eval("true()").unwrap().value(), XPathValue::Boolean(true));
        let res = ctx.eval("/r").unwrap();
        match res.value() {
            XPathValue::NodeSet(set) => assert_eq!(set.at(0).name(), "r"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_clone_is_independent() {
        let doc = XmlDocument::parse("<r><a/><b/></r>").unwrap();
        let ctx = doc.xpath_context().unwrap();
        let set = ctx.eval("/r/*").unwrap();
        let copy = set.clone();
        drop(set);
        let names: Vec<_> = copy.iter().unwrap().map(|n| n.name()).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn test_into_raw_roundtrip() {
        let doc = XmlDocument::parse("<r/>").unwrap();
        let ctx = doc.xpath_context().unwrap();
        let raw = ctx.eval("42").unwrap().into_raw();
        let obj = unsafe { XPathObject::from_raw(raw) }.unwrap();
        assert_eq!(obj.as_number().unwrap(), 42.0);
    }

    #[test]
    fn test_for_loop_over_nodeset() {
        let doc = XmlDocument::parse("<r><a/><b/></r>").unwrap();
        let ctx = doc.xpath_context().unwrap();
        let set = ctx.eval("/r/*").unwrap();
        let mut seen = 0;
        for node in &set {
            assert!(node.is_element());
            seen += 1;
        }
        assert_eq!(seen, 2);
    }
}
