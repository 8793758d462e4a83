use lazy_static::lazy_static;
use prometheus::{proto::MetricFamily, IntCounterVec, Opts, Registry};

lazy_static! {
    /// Dedicated registry so the embedding application can gather client
    /// metrics without this crate touching the default registry.
    pub static ref REGISTRY: Registry = Registry::new();

    pub static ref API_CALLS_TOTAL: IntCounterVec = register(
        "apikit_api_calls_total",
        "Total API calls issued",
        &["endpoint"],
    );

    pub static ref API_SERVER_ERRORS_TOTAL: IntCounterVec = register(
        "apikit_api_server_errors_total",
        "Total classified server failures",
        &["code"],
    );

    pub static ref API_TRANSPORT_ERRORS_TOTAL: IntCounterVec = register(
        "apikit_api_transport_errors_total",
        "Total failures below the envelope layer",
        &["kind"],
    );

    pub static ref API_RATE_LIMIT_WAITS_TOTAL: IntCounterVec = register(
        "apikit_rate_limit_waits_total",
        "Total times the client throttle caused a wait",
        &[],
    );
}

fn register(name: &str, help: &str, labels: &[&str]) -> IntCounterVec {
    let counter = IntCounterVec::new(Opts::new(name, help), labels).unwrap();
    REGISTRY.register(Box::new(counter.clone())).unwrap();
    counter
}

/// Force registration of all metrics up front.
pub fn init_metrics() {
    lazy_static::initialize(&API_CALLS_TOTAL);
    lazy_static::initialize(&API_SERVER_ERRORS_TOTAL);
    lazy_static::initialize(&API_TRANSPORT_ERRORS_TOTAL);
    lazy_static::initialize(&API_RATE_LIMIT_WAITS_TOTAL);
}

/// Snapshot of everything in the client registry.
pub fn gather() -> Vec<MetricFamily> {
    REGISTRY.gather()
}
