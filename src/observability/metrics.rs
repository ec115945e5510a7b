use prometheus::{Encoder, IntCounterVec, IntGaugeVec, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub requests_total: IntCounterVec,
    pub pipeline_rejections_total: IntCounterVec,
    pub collection_records: IntGaugeVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let requests_total = IntCounterVec::new(
            Opts::new("requests_total", "Handled requests by resource, operation and outcome"),
            &["resource", "operation", "outcome"],
        )
        .expect("valid requests_total metric");

        let pipeline_rejections_total = IntCounterVec::new(
            Opts::new(
                "pipeline_rejections_total",
                "Requests halted by a validation stage",
            ),
            &["stage"],
        )
        .expect("valid pipeline_rejections_total metric");

        let collection_records = IntGaugeVec::new(
            Opts::new("collection_records", "Records currently held per collection"),
            &["collection"],
        )
        .expect("valid collection_records metric");

        registry
            .register(Box::new(requests_total.clone()))
            .expect("register requests_total");
        registry
            .register(Box::new(pipeline_rejections_total.clone()))
            .expect("register pipeline_rejections_total");
        registry
            .register(Box::new(collection_records.clone()))
            .expect("register collection_records");

        Self {
            registry,
            requests_total,
            pipeline_rejections_total,
            collection_records,
        }
    }

    pub fn observe_request(&self, resource: &str, operation: &str, succeeded: bool) {
        let outcome = if succeeded { "success" } else { "error" };
        self.requests_total
            .with_label_values(&[resource, operation, outcome])
            .inc();
    }

    pub fn observe_rejection(&self, stage: &str) {
        self.pipeline_rejections_total
            .with_label_values(&[stage])
            .inc();
    }

    pub fn set_collection_size(&self, collection: &str, size: usize) {
        self.collection_records
            .with_label_values(&[collection])
            .set(size as i64);
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
