use once_cell::sync::Lazy;
use prometheus::{register_histogram, register_int_counter_vec, Histogram, IntCounterVec};

pub static QUERIES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "tipi_queries_total",
        "Search queries built, by outcome",
        &["outcome"]
    )
    .unwrap()
});

pub static QUERY_BUILD_SECONDS: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "tipi_query_build_seconds",
        "Time to turn request parameters into a store filter",
        vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]
    )
    .unwrap()
});

/// Forces registration so `/metrics` lists the series before first use.
pub fn register() {
    Lazy::force(&QUERIES_TOTAL);
    Lazy::force(&QUERY_BUILD_SECONDS);
}
