use metrics::describe_counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder. Call once per process.
    pub fn init() -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new().install_recorder()?;
        describe();
        Ok(Self { handle })
    }

    /// A handle backed by a recorder that is NOT installed globally (tests).
    pub fn detached() -> Self {
        let recorder = PrometheusBuilder::new().build_recorder();
        Self {
            handle: recorder.handle(),
        }
    }

    pub fn render(&self) -> String {
        self.handle.render()
    }
}

fn describe() {
    describe_counter!(
        "genre_classified_total",
        "Stories classified, labelled by final genre (including [UNMAPPED])."
    );
    describe_counter!("oracle_calls_total", "Oracle calls attempted, by operation.");
    describe_counter!(
        "oracle_failures_total",
        "Oracle calls that degraded to the safe default, by operation."
    );
    describe_counter!(
        "ambiguity_detected_total",
        "Stories where sci-fi/cyberpunk and romance signals fired together."
    );
}
