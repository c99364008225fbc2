//! Shared ownership of the engine handle.
//!
//! The [`crate::Context`] owns the only strong reference; proxies keep a
//! [`Weak`] one. The cell is `None` once the context has been closed.

use boa_engine::{Context as Engine, JsError};
use core_types::{BridgeError, BridgeResult};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

pub(crate) type EngineCell = RefCell<Option<Engine>>;

/// Runs `f` with exclusive access to the engine.
///
/// Fails with [`BridgeError::ContextBusy`] while an evaluation holds the
/// engine and with [`BridgeError::ContextDestroyed`] after close.
pub(crate) fn with_engine<T>(
    cell: &EngineCell,
    f: impl FnOnce(&mut Engine) -> BridgeResult<T>,
) -> BridgeResult<T> {
    let mut slot = cell.try_borrow_mut().map_err(|_| BridgeError::ContextBusy)?;
    let engine = slot.as_mut().ok_or(BridgeError::ContextDestroyed)?;
    f(engine)
}

/// Like [`with_engine`] but through a weak reference.
pub(crate) fn with_weak_engine<T>(
    cell: &Weak<EngineCell>,
    f: impl FnOnce(&mut Engine) -> BridgeResult<T>,
) -> BridgeResult<T> {
    let cell: Rc<EngineCell> = cell.upgrade().ok_or(BridgeError::ContextDestroyed)?;
    with_engine(&cell, f)
}

/// Returns the guest's `String(error)` form of a thrown value.
pub(crate) fn error_message(error: &JsError, engine: &mut Engine) -> String {
    let thrown = error.to_opaque(engine);
    match thrown.to_string(engine) {
        Ok(text) => text.to_std_string_escaped(),
        Err(_) => error.to_string(),
    }
}
