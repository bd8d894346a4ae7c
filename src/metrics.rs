use prometheus::{
    register_histogram, register_int_counter_vec, register_int_gauge, Histogram, IntCounterVec,
    IntGauge,
};

lazy_static::lazy_static! {
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "lookalike_http_requests_total", "Total HTTP requests", &["method", "path", "status"]
    ).unwrap();
    pub static ref RECOMMEND_DURATION: Histogram = register_histogram!(
        "lookalike_recommend_duration_seconds", "Nearest neighbor search duration",
        vec![0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]
    ).unwrap();
    pub static ref RECOMMENDATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "lookalike_recommendations_total", "Recommendation requests by outcome", &["status"]
    ).unwrap();
    pub static ref ACTIVE_RECOMMENDATIONS: IntGauge = register_int_gauge!(
        "lookalike_active_recommendations", "Recommendations currently being computed"
    ).unwrap();
    pub static ref REFERENCE_SET_SIZE: IntGauge = register_int_gauge!(
        "lookalike_reference_set_size", "Number of reference embeddings in the index"
    ).unwrap();
}

pub fn init() {
    lazy_static::initialize(&HTTP_REQUESTS_TOTAL);
    lazy_static::initialize(&RECOMMEND_DURATION);
    lazy_static::initialize(&RECOMMENDATIONS_TOTAL);
    lazy_static::initialize(&ACTIVE_RECOMMENDATIONS);
    lazy_static::initialize(&REFERENCE_SET_SIZE);
}

/// Decrements the gauge when dropped.
pub struct GaugeGuard<'a>(pub &'a IntGauge);

impl Drop for GaugeGuard<'_> {
    fn drop(&mut self) {
        self.0.dec();
    }
}
