// magick/src/core/lifecycle.rs
//! Process-wide setup and teardown.
//!
//! `genesis` is called once before any handle is created and `terminus` once at
//! shutdown. Both are idempotent. Constructors never call them.

use std::sync::atomic::{AtomicBool, Ordering};

static INSTANTIATED: AtomicBool = AtomicBool::new(false);

pub fn genesis() {
    if INSTANTIATED.swap(true, Ordering::SeqCst) {
        return;
    }

    // The host may already own the logger.
    let _ = env_logger::Builder::from_default_env().try_init();

    log::debug!("magick library initialized");
}

pub fn terminus() {
    if INSTANTIATED.swap(false, Ordering::SeqCst) {
        log::debug!("magick library terminated");
    }
}

pub fn is_instantiated() -> bool {
    INSTANTIATED.load(Ordering::SeqCst)
}
