#![allow(dead_code)]

pub mod stub_filters;

/// Enable `log` output in tests when `RUST_LOG` is set.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
