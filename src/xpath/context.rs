//! Reusable evaluation contexts and compiled expressions.
#![allow(unsafe_code)]

use std::fmt;

use tracing::debug;

use super::object::XPathObject;
use crate::error::{clear_last_error, last_error, raise, Error, Result};
use crate::sys;
use crate::tree::{DocumentRef, NodeRef};
use crate::util::strings;

/// An `XPath` evaluation context bound to one document.
///
/// Creating a context has a cost; reuse one for many queries against the
/// same document. Each evaluation sets the context node explicitly, so
/// earlier calls never influence later ones: [`eval`](Self::eval) starts
/// from the document node, [`eval_at`](Self::eval_at) from a given node.
///
/// Results borrow the document, not the context, so they may outlive it.
pub struct XPathContext<'a> {
    ctxt: *mut sys::XmlXPathContext,
    doc: DocumentRef<'a>,
}

impl<'a> XPathContext<'a> {
    /// Creates a context for `doc`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Allocation`] if the engine could not create it.
    pub fn new(doc: DocumentRef<'a>) -> Result<Self> {
        // SAFETY: `doc` is null or alive for 'a; the context is ours.
        let ctxt = unsafe { sys::xmlXPathNewContext(doc.as_ptr()) };
        if ctxt.is_null() {
            return raise(Error::Allocation { what: "XPath context" });
        }
        debug!(doc = ?doc.as_ptr(), ctxt = ?ctxt, "created XPath context");
        Ok(Self { ctxt, doc })
    }

    /// The document this context evaluates against.
    #[must_use]
    pub fn document(&self) -> DocumentRef<'a> {
        self.doc
    }

    /// Binds `prefix` to `uri` for use in expressions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InteriorNul`] for strings containing NUL, or
    /// [`Error::XPath`] if the engine rejected the binding.
    pub fn register_namespace(&mut self, prefix: &str, uri: &str) -> Result<()> {
        let c_prefix = strings::to_xml_string(prefix)?;
        let c_uri = strings::to_xml_string(uri)?;
        // SAFETY: live context; the engine copies both strings.
        let rc = unsafe {
            sys::xmlXPathRegisterNs(self.ctxt, c_prefix.as_ptr().cast(), c_uri.as_ptr().cast())
        };
        if rc != 0 {
            return raise(Error::XPath {
                expression: format!("xmlns:{prefix}"),
                message: format!("could not register namespace `{uri}`"),
            });
        }
        Ok(())
    }

    /// Evaluates `expression` with the document node as context node.
    ///
    /// # Errors
    ///
    /// Returns [`Error::XPath`] if the expression is invalid or fails.
    pub fn eval(&self, expression: &str) -> Result<XPathObject<'a>> {
        self.eval_at(self.document_node(), expression)
    }

    /// Evaluates `expression` with `node` as context node.
    ///
    /// # Errors
    ///
    /// Returns [`Error::XPath`] if the expression is invalid or fails.
    pub fn eval_at(&self, node: NodeRef<'a>, expression: &str) -> Result<XPathObject<'a>> {
        let expr = strings::to_xml_string(expression)?;
        self.run(node, expression, |ctxt| {
            // SAFETY: live context and NUL-terminated expression.
            unsafe { sys::xmlXPathEvalExpression(expr.as_ptr().cast(), ctxt) }
        })
    }

    /// Compiles `expression` for repeated evaluation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::XPath`] if the expression does not compile.
    #[allow(clippy::unused_self)]
    pub fn compile(&self, expression: &str) -> Result<XPathExpression> {
        XPathExpression::compile(expression)
    }

    /// Evaluates a compiled expression with the document node as context.
    ///
    /// # Errors
    ///
    /// Returns [`Error::XPath`] if evaluation fails.
    pub fn eval_compiled(&self, expression: &XPathExpression) -> Result<XPathObject<'a>> {
        self.eval_compiled_at(self.document_node(), expression)
    }

    /// Evaluates a compiled expression with `node` as context.
    ///
    /// # Errors
    ///
    /// Returns [`Error::XPath`] if evaluation fails.
    pub fn eval_compiled_at(
        &self,
        node: NodeRef<'a>,
        expression: &XPathExpression,
    ) -> Result<XPathObject<'a>> {
        self.run(node, &expression.source, |ctxt| {
            // SAFETY: live context and live compiled expression.
            unsafe { sys::xmlXPathCompiledEval(expression.comp, ctxt) }
        })
    }

    /// Frees the current context and takes over `other`.
    pub fn assign(&mut self, other: XPathContext<'a>) {
        *self = other;
    }

    /// The raw engine pointer, still owned by `self`.
    #[must_use]
    pub fn as_ptr(&self) -> *mut sys::XmlXPathContext {
        self.ctxt
    }

    fn document_node(&self) -> NodeRef<'a> {
        if self.doc.is_null() {
            NodeRef::null()
        } else {
            self.doc.as_node()
        }
    }

    fn run(
        &self,
        node: NodeRef<'a>,
        expression: &str,
        evaluate: impl FnOnce(*mut sys::XmlXPathContext) -> *mut sys::XmlXPathObject,
    ) -> Result<XPathObject<'a>> {
        // SAFETY: live context; the node belongs to the bound document.
        unsafe { (*self.ctxt).node = node.as_ptr() };
        clear_last_error();
        let obj = evaluate(self.ctxt);
        if obj.is_null() {
            let message = last_error().map_or_else(
                || "evaluation produced no result".to_owned(),
                |d| d.message,
            );
            debug!(expression, %message, "XPath evaluation failed");
            return raise(Error::XPath {
                expression: expression.to_owned(),
                message,
            });
        }
        let result = XPathObject::from_engine(obj, expression)?;
        debug!(expression, kind = %result.kind(), "evaluated XPath expression");
        Ok(result)
    }
}

impl Drop for XPathContext<'_> {
    fn drop(&mut self) {
        debug!(ctxt = ?self.ctxt, "freeing XPath context");
        // SAFETY: we own the context; results it produced are independent.
        unsafe { sys::xmlXPathFreeContext(self.ctxt) };
    }
}

impl fmt::Debug for XPathContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XPathContext")
            .field("ctxt", &self.ctxt)
            .field("doc", &self.doc)
            .finish()
    }
}

/// A compiled `XPath` expression, independent of any document.
pub struct XPathExpression {
    comp: *mut sys::XmlXPathCompExpr,
    source: String,
}

impl XPathExpression {
    /// Compiles `expression`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::XPath`] if the expression does not compile.
    pub fn compile(expression: &str) -> Result<Self> {
        let expr = strings::to_xml_string(expression)?;
        clear_last_error();
        // SAFETY: NUL-terminated expression; the result is ours.
        let comp = unsafe { sys::xmlXPathCompile(expr.as_ptr().cast()) };
        if comp.is_null() {
            let message = last_error()
                .map_or_else(|| "compilation failed".to_owned(), |d| d.message);
            return raise(Error::XPath {
                expression: expression.to_owned(),
                message,
            });
        }
        Ok(Self {
            comp,
            source: expression.to_owned(),
        })
    }

    /// The expression text as given.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl Drop for XPathExpression {
    fn drop(&mut self) {
        // SAFETY: we own the compiled expression.
        unsafe { sys::xmlXPathFreeCompExpr(self.comp) };
    }
}

impl fmt::Debug for XPathExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("XPathExpression").field(&self.source).finish()
    }
}
