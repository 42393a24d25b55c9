//! # Prometheus Metrics
//!
//! Counters for the settlement engine, registered in a dedicated
//! [`prometheus::Registry`] under the `agora` prefix. `run --metrics` dumps
//! them in the text exposition format once the script has executed.

use std::time::Duration;

use agora_contracts::{ErrorKind, MarketError, Outcome};
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

/// Holds all Prometheus metric handles for the engine.
#[derive(Clone)]
pub struct EngineMetrics {
    registry: Registry,
    /// Transactions whose effects were committed.
    pub transactions_committed_total: IntCounter,
    /// Transactions rolled back on error.
    pub transactions_aborted_total: IntCounter,
    /// Executions by operation name and status (`committed`/`aborted`).
    pub operations_total: IntCounterVec,
    /// Resale attempts refused because the receipt or listing is soulbound.
    pub soulbound_rejections_total: IntCounter,
    /// Receipts minted by purchases.
    pub receipts_minted_total: IntCounter,
    /// Sum of purchase prices paid by buyers.
    pub settled_volume_total: IntCounter,
    /// Sum of fees routed to the marketplace operator.
    pub fees_collected_total: IntCounter,
    /// Wall-clock time spent in `Runtime::execute`.
    pub execution_latency_seconds: Histogram,
}

impl EngineMetrics {
    /// Creates and registers all metrics.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("agora".into()), None)?;

        let transactions_committed_total = IntCounter::new(
            "transactions_committed_total",
            "Total number of committed transactions",
        )?;
        registry.register(Box::new(transactions_committed_total.clone()))?;

        let transactions_aborted_total = IntCounter::new(
            "transactions_aborted_total",
            "Total number of aborted transactions",
        )?;
        registry.register(Box::new(transactions_aborted_total.clone()))?;

        let operations_total = IntCounterVec::new(
            Opts::new("operations_total", "Executions by operation and status"),
            &["operation", "status"],
        )?;
        registry.register(Box::new(operations_total.clone()))?;

        let soulbound_rejections_total = IntCounter::new(
            "soulbound_rejections_total",
            "Resale attempts refused because the target is soulbound",
        )?;
        registry.register(Box::new(soulbound_rejections_total.clone()))?;

        let receipts_minted_total =
            IntCounter::new("receipts_minted_total", "Total number of receipts minted")?;
        registry.register(Box::new(receipts_minted_total.clone()))?;

        let settled_volume_total = IntCounter::new(
            "settled_volume_total",
            "Sum of purchase prices paid by buyers",
        )?;
        registry.register(Box::new(settled_volume_total.clone()))?;

        let fees_collected_total = IntCounter::new(
            "fees_collected_total",
            "Sum of marketplace fees paid to the operator",
        )?;
        registry.register(Box::new(fees_collected_total.clone()))?;

        let execution_latency_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "execution_latency_seconds",
                "Time spent executing one transaction, in seconds",
            )
            .buckets(vec![0.000_01, 0.000_05, 0.000_1, 0.000_5, 0.001, 0.005, 0.01, 0.05]),
        )?;
        registry.register(Box::new(execution_latency_seconds.clone()))?;

        Ok(Self {
            registry,
            transactions_committed_total,
            transactions_aborted_total,
            operations_total,
            soulbound_rejections_total,
            receipts_minted_total,
            settled_volume_total,
            fees_collected_total,
            execution_latency_seconds,
        })
    }

    /// Records the result of one execution.
    pub fn observe(
        &self,
        operation: &str,
        result: &Result<Outcome, MarketError>,
        elapsed: Duration,
    ) {
        self.execution_latency_seconds.observe(elapsed.as_secs_f64());

        match result {
            Ok(outcome) => {
                self.transactions_committed_total.inc();
                self.operations_total
                    .with_label_values(&[operation, "committed"])
                    .inc();
                if let Outcome::ServicePurchased(settlement) = outcome {
                    self.receipts_minted_total.inc();
                    self.settled_volume_total.inc_by(settlement.total_paid());
                    self.fees_collected_total.inc_by(settlement.marketplace_fee);
                }
            }
            Err(err) => {
                self.transactions_aborted_total.inc();
                self.operations_total
                    .with_label_values(&[operation, "aborted"])
                    .inc();
                if err.kind() == ErrorKind::Soulbound {
                    self.soulbound_rejections_total.inc();
                }
            }
        }
    }

    /// Encodes all registered metrics into the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_contracts::settlement::Settlement;
    use agora_protocol::identity::Address;

    #[test]
    fn purchase_updates_volume_and_fees() {
        let metrics = EngineMetrics::new().unwrap();
        let settlement = Settlement {
            receipt: Address::new([1u8; 32]),
            receipt_asset: Address::new([2u8; 32]),
            vendor_proceeds: 900,
            marketplace_fee: 100,
        };
        metrics.observe(
            "purchase_service",
            &Ok(Outcome::ServicePurchased(settlement)),
            Duration::from_micros(20),
        );

        assert_eq!(metrics.transactions_committed_total.get(), 1);
        assert_eq!(metrics.settled_volume_total.get(), 1_000);
        assert_eq!(metrics.fees_collected_total.get(), 100);
        assert_eq!(metrics.receipts_minted_total.get(), 1);
    }

    #[test]
    fn soulbound_abort_is_counted() {
        let metrics = EngineMetrics::new().unwrap();
        metrics.observe(
            "resell_service",
            &Err(MarketError::SoulboundViolation),
            Duration::from_micros(5),
        );
        assert_eq!(metrics.transactions_aborted_total.get(), 1);
        assert_eq!(metrics.soulbound_rejections_total.get(), 1);

        let text = metrics.encode().unwrap();
        assert!(text.contains("agora_soulbound_rejections_total 1"));
        assert!(text.contains(r#"agora_operations_total{operation="resell_service",status="aborted"} 1"#));
    }
}
