//! Global config handle.
//!
//! Uses `arc-swap` for lock-free reads from request threads and the relay.

use crate::config::LabConfig;
use arc_swap::ArcSwap;
use std::sync::{Arc, LazyLock};

/// Global config storage.
pub static CONFIG: LazyLock<ArcSwap<LabConfig>> =
    LazyLock::new(|| ArcSwap::from_pointee(LabConfig::default()));

#[inline]
pub fn cfg() -> Arc<LabConfig> {
    CONFIG.load_full()
}

#[inline]
pub fn init_config(config: LabConfig) -> Arc<LabConfig> {
    let arc = Arc::new(config);
    CONFIG.store(Arc::clone(&arc));
    arc
}
