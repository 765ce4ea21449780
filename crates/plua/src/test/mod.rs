pub mod test_clone;
pub mod test_state_pool;

/// Route `log` output through the test harness; safe to call repeatedly.
pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
