//! Prometheus metrics (lock-free atomics, zero allocation on hot path).

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    // --- Traffic ---
    pub trades_total: AtomicU64,
    pub trades_success: AtomicU64,
    pub trades_reverted: AtomicU64,
    pub trades_error: AtomicU64,

    // --- Latency (μs, updated via CAS) ---
    pub trade_duration_us_sum: AtomicU64,
    pub trade_duration_us_max: AtomicU64,

    // --- RPC ---
    pub rpc_errors: AtomicU64,
}

impl Metrics {
    const fn new() -> Self {
        Self {
            trades_total: AtomicU64::new(0),
            trades_success: AtomicU64::new(0),
            trades_reverted: AtomicU64::new(0),
            trades_error: AtomicU64::new(0),
            trade_duration_us_sum: AtomicU64::new(0),
            trade_duration_us_max: AtomicU64::new(0),
            rpc_errors: AtomicU64::new(0),
        }
    }

    pub fn record_trade_duration(&self, start: Instant) {
        let us = start.elapsed().as_micros() as u64;
        self.trade_duration_us_sum.fetch_add(us, Ordering::Relaxed);
        // CAS loop for max tracking
        let mut cur = self.trade_duration_us_max.load(Ordering::Relaxed);
        while us > cur {
            match self.trade_duration_us_max.compare_exchange_weak(
                cur,
                us,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(actual) => cur = actual,
            }
        }
    }

    /// Render in Prometheus text exposition format.
    pub fn render(&self) -> String {
        let trades_total = self.trades_total.load(Ordering::Relaxed);
        let trades_success = self.trades_success.load(Ordering::Relaxed);
        let trades_reverted = self.trades_reverted.load(Ordering::Relaxed);
        let trades_error = self.trades_error.load(Ordering::Relaxed);
        let dur_sum = self.trade_duration_us_sum.load(Ordering::Relaxed);
        let dur_max = self.trade_duration_us_max.swap(0, Ordering::Relaxed);
        let rpc_errors = self.rpc_errors.load(Ordering::Relaxed);

        // Convert μs to seconds for Prometheus conventions
        let dur_sum_s = dur_sum as f64 / 1_000_000.0;
        let dur_max_s = dur_max as f64 / 1_000_000.0;

        format!(
            "\
# HELP relayer_trades_total Total trade requests received.\n\
# TYPE relayer_trades_total counter\n\
relayer_trades_total {trades_total}\n\
# HELP relayer_trades_success_total Trades mined successfully.\n\
# TYPE relayer_trades_success_total counter\n\
relayer_trades_success_total {trades_success}\n\
# HELP relayer_trades_reverted_total Trades mined but reverted on-chain.\n\
# TYPE relayer_trades_reverted_total counter\n\
relayer_trades_reverted_total {trades_reverted}\n\
# HELP relayer_trades_error_total Trades that failed before or during mining.\n\
# TYPE relayer_trades_error_total counter\n\
relayer_trades_error_total {trades_error}\n\
# HELP relayer_trade_duration_seconds_sum Total handler time (seconds).\n\
# TYPE relayer_trade_duration_seconds_sum counter\n\
relayer_trade_duration_seconds_sum {dur_sum_s:.6}\n\
# HELP relayer_trade_duration_seconds_max Max handler time since last scrape (seconds).\n\
# TYPE relayer_trade_duration_seconds_max gauge\n\
relayer_trade_duration_seconds_max {dur_max_s:.6}\n\
# HELP relayer_rpc_errors_total RPC errors.\n\
# TYPE relayer_rpc_errors_total counter\n\
relayer_rpc_errors_total {rpc_errors}\n"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_lists_every_series() {
        let metrics = Metrics::new();
        metrics.trades_total.fetch_add(3, Ordering::Relaxed);
        metrics.trades_reverted.fetch_add(1, Ordering::Relaxed);

        let body = metrics.render();
        assert!(body.contains("relayer_trades_total 3"));
        assert!(body.contains("relayer_trades_reverted_total 1"));
        assert!(body.contains("relayer_rpc_errors_total 0"));
        assert!(body.contains("relayer_trade_duration_seconds_sum"));
    }

    #[test]
    fn test_duration_max_resets_on_scrape() {
        let metrics = Metrics::new();
        metrics.trade_duration_us_max.store(5_000_000, Ordering::Relaxed);
        let first = metrics.render();
        assert!(first.contains("relayer_trade_duration_seconds_max 5.000000"));
        let second = metrics.render();
        assert!(second.contains("relayer_trade_duration_seconds_max 0.000000"));
    }
}
