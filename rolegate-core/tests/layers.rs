use rolegate_core::{default_trace, init_tracing};

#[test]
fn init_tracing_tolerates_repeated_calls() {
    let first = init_tracing();
    let second = init_tracing();
    // Another test in this binary may have installed a subscriber first.
    assert!(!second);
    let _ = first;
    tracing::info!("tracing initialised");
}

#[test]
fn default_trace_builds() {
    let _layer = default_trace();
}
