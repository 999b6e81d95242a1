use partforge_models::{BomNode, TruncationReason};
use partforge_utils::PartforgeResult;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder};
use std::time::Duration;

/// Prometheus collectors for the BOM endpoints, kept on their own registry.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    resolutions: IntCounterVec,
    truncations: IntCounterVec,
    rollup_duration: Histogram,
}

impl Metrics {
    pub fn new(namespace: &str) -> prometheus::Result<Self> {
        let registry = Registry::new_custom(Some(namespace.to_string()), None)?;

        let resolutions = IntCounterVec::new(
            Opts::new("bom_resolutions_total", "BOM resolutions by outcome"),
            &["outcome"],
        )?;
        let truncations = IntCounterVec::new(
            Opts::new("bom_truncations_total", "Truncated BOM branches by reason"),
            &["reason"],
        )?;
        let rollup_duration = Histogram::with_opts(HistogramOpts::new(
            "bom_rollup_duration_seconds",
            "Time spent rolling up BOM costs",
        ))?;

        registry.register(Box::new(resolutions.clone()))?;
        registry.register(Box::new(truncations.clone()))?;
        registry.register(Box::new(rollup_duration.clone()))?;

        Ok(Self {
            registry,
            resolutions,
            truncations,
            rollup_duration,
        })
    }

    pub fn record_resolution(&self, result: &PartforgeResult<BomNode>) {
        match result {
            Ok(tree) => {
                self.resolutions.with_label_values(&["ok"]).inc();
                let reasons: Vec<TruncationReason> = tree
                    .placeholders()
                    .iter()
                    .filter_map(|placeholder| placeholder.truncated)
                    .collect();
                self.record_truncations(&reasons);
            }
            Err(e) => {
                let outcome = e.error_code().to_lowercase();
                self.resolutions.with_label_values(&[outcome.as_str()]).inc();
            }
        }
    }

    pub fn record_truncations(&self, reasons: &[TruncationReason]) {
        for reason in reasons {
            self.truncations.with_label_values(&[reason.as_str()]).inc();
        }
    }

    pub fn observe_rollup(&self, elapsed: Duration) {
        self.rollup_duration.observe(elapsed.as_secs_f64());
    }

    /// Renders the registry in the Prometheus text format
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&self.registry.gather(), &mut buffer) {
            return format!("# Error encoding metrics: {}", e);
        }
        String::from_utf8(buffer).unwrap_or_else(|_| "# Error encoding metrics".to_string())
    }
}
