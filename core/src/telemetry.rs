use serde::Serialize;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        // CloudWatch stamps every line itself and does not render colours.
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .without_time(),
        )
        .init();
}

/// Outcome of a handler that works through a batch of event records.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct BatchMetrics {
    pub records: usize,
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchMetrics {
    pub fn merge(&mut self, other: &BatchMetrics) {
        self.records += other.records;
        self.processed += other.processed;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}
