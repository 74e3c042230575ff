//! Shared test infrastructure: logging setup and pool fixtures

#![allow(dead_code)] // Test utilities may not all be used in every test file

use std::sync::Once;

use ordo::model::{PackageId, Pool};

static INIT: Once = Once::new();

/// Initialize tracing once per test binary; honors `RUST_LOG`.
pub fn init_test_env() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// An installed package providing its own name.
pub fn installed(pool: &mut Pool, name: &str, version: &str) -> PackageId {
    let id = pool.add_package(name, version);
    pool.set_installed(id, true);
    pool.add_provides(id, name);
    id
}

/// An available (not installed) package providing its own name.
pub fn available(pool: &mut Pool, name: &str, version: &str) -> PackageId {
    let id = pool.add_package(name, version);
    pool.add_provides(id, name);
    id
}
