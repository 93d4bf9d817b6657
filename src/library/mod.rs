//! Engine lifetime guard.
//!
//! libxml2 initializes itself lazily on first use, so this guard is
//! optional. Holding one makes setup explicit and makes teardown happen at a
//! known point: when the guard drops, the engine's global state is released.
//! Do not drop it while documents, contexts or results are still alive, or
//! while other threads use the engine.
#![allow(unsafe_code)]

use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::error::{raise, Error, Result};
use crate::sys;

static ACTIVE: AtomicBool = AtomicBool::new(false);

/// Scoped engine initialization.
///
/// At most one guard exists at a time. It is neither `Send` nor `Sync`, so
/// teardown happens on the thread that initialized.
///
/// ```no_run
/// let _lib = xmlhandle::Library::init().unwrap();
/// let doc = xmlhandle::XmlDocument::parse("<a/>").unwrap();
/// assert_eq!(doc.root_node().name(), "a");
/// ```
#[derive(Debug)]
pub struct Library {
    _not_send: PhantomData<*const ()>,
}

impl Library {
    /// Initializes the engine.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyInitialized`] while another guard is alive.
    pub fn init() -> Result<Self> {
        if ACTIVE.swap(true, Ordering::AcqRel) {
            return raise(Error::AlreadyInitialized);
        }
        // SAFETY: idempotent global setup.
        unsafe { sys::xmlInitParser() };
        debug!("initialized libxml2");
        Ok(Self {
            _not_send: PhantomData,
        })
    }

    /// Returns true while a guard is alive.
    #[must_use]
    pub fn is_active() -> bool {
        ACTIVE.load(Ordering::Acquire)
    }
}

impl Drop for Library {
    fn drop(&mut self) {
        // SAFETY: the guard's owner promises no engine objects outlive it.
        unsafe { sys::xmlCleanupParser() };
        ACTIVE.store(false, Ordering::Release);
        debug!("cleaned up libxml2");
    }
}
