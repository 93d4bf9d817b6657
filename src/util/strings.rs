//! String hand-off between Rust and the engine.
//!
//! The engine speaks NUL-terminated UTF-8 (`xmlChar *`). Some strings it
//! returns are borrowed from the tree, others are freshly allocated and
//! must be released through its allocator; the two constructors here keep
//! those cases apart.
#![allow(unsafe_code)]

use std::borrow::Cow;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};

use crate::error::{raise, Error, Result};
use crate::sys::{self, XmlChar};

/// Converts a Rust string into a NUL-terminated engine string.
///
/// # Errors
///
/// Returns [`Error::InteriorNul`] if `s` contains a NUL byte.
pub(crate) fn to_xml_string(s: &str) -> Result<CString> {
    match CString::new(s) {
        Ok(cs) => Ok(cs),
        Err(e) => raise(Error::InteriorNul {
            offset: e.nul_position(),
        }),
    }
}

/// Converts an engine length into the `int` the engine's API takes.
///
/// # Errors
///
/// Returns [`Error::InputTooLarge`] past `c_int::MAX`.
pub(crate) fn to_c_len(len: usize) -> Result<c_int> {
    match c_int::try_from(len) {
        Ok(n) => Ok(n),
        Err(_) => raise(Error::InputTooLarge { len }),
    }
}

/// Copies a string that is still owned by the engine (tree fields, dictionary
/// entries). Returns `None` for a null pointer.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string that stays alive
/// for the duration of the call.
pub(crate) unsafe fn borrowed(ptr: *const XmlChar) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    // SAFETY: non-null and NUL-terminated per the caller's contract.
    let s = unsafe { CStr::from_ptr(ptr.cast::<c_char>()) };
    Some(s.to_string_lossy().into_owned())
}

/// Takes ownership of a string the engine allocated for the caller, copies it
/// and releases the engine allocation. Returns `None` for a null pointer.
///
/// # Safety
///
/// `ptr` must be null or a NUL-terminated string allocated by the engine
/// that nothing else will free.
pub(crate) unsafe fn adopt(ptr: *mut XmlChar) -> Option<String> {
    // SAFETY: forwarded caller contract.
    let s = unsafe { borrowed(ptr) };
    // SAFETY: `ptr` belongs to us now and is not used after this point.
    unsafe { sys::free(ptr.cast()) };
    s
}

/// Decodes serializer output that is in `encoding` (the document's declared
/// encoding, UTF-8 when absent) into a Rust string.
///
/// Unknown labels and malformed sequences fall back to lossy UTF-8 so that a
/// serialized document is always representable.
pub(crate) fn decode(bytes: &[u8], encoding: Option<&str>) -> String {
    let label = encoding.unwrap_or("UTF-8");
    match encoding_rs::Encoding::for_label(label.as_bytes()) {
        Some(enc) if enc != encoding_rs::UTF_8 => {
            let (text, _, _) = enc.decode(bytes);
            text.into_owned()
        }
        _ => match String::from_utf8_lossy(bytes) {
            Cow::Borrowed(s) => s.to_owned(),
            Cow::Owned(s) => s,
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(feature = "panic-on-error"))]
    fn test_to_xml_string_rejects_interior_nul() {
        let err = to_xml_string("a\0b").unwrap_err();
        assert!(matches!(err, Error::InteriorNul { offset: 1 }));
    }

    #[test]
    fn test_to_xml_string_plain() {
        let cs = to_xml_string("root").unwrap();
        assert_eq!(cs.as_bytes(), b"root");
    }

    #[test]
    fn test_borrowed_null_is_none() {
        assert_eq!(unsafe { borrowed(std::ptr::null()) }, None);
    }

    #[test]
    fn test_decode_latin1() {
        assert_eq!(decode(b"caf\xe9", Some("ISO-8859-1")), "café");
    }

    #[test]
    fn test_decode_defaults_to_utf8() {
        assert_eq!(decode("naïve".as_bytes(), None), "naïve");
        assert_eq!(decode(b"plain", Some("no-such-encoding")), "plain");
    }
}
