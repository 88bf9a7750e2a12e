use std::sync::atomic::{AtomicU64, Ordering};

use backend_domain::InventorySource;

#[derive(Debug, Default)]
pub struct Metrics {
    keyword_decisions: AtomicU64,
    ad_decisions: AtomicU64,
    blocked_decisions: AtomicU64,
    bot_rejections: AtomicU64,
    upstream_fallbacks: AtomicU64,
    capacity_fallbacks: AtomicU64,
    impressions_recorded: AtomicU64,
    clicks_recorded: AtomicU64,
    telemetry_errors: AtomicU64,
}

impl Metrics {
    pub fn record_keyword_decision(&self, source: InventorySource) {
        self.keyword_decisions.fetch_add(1, Ordering::Relaxed);
        self.record_source(source);
    }

    pub fn record_ad_decision(&self, source: InventorySource) {
        self.ad_decisions.fetch_add(1, Ordering::Relaxed);
        self.record_source(source);
    }

    pub fn record_blocked(&self) {
        self.blocked_decisions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_bot_rejection(&self) {
        self.bot_rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_capacity_fallback(&self) {
        self.capacity_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_impressions(&self, count: usize) {
        self.impressions_recorded
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_click(&self) {
        self.clicks_recorded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_telemetry_error(&self) {
        self.telemetry_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn upstream_fallbacks(&self) -> u64 {
        self.upstream_fallbacks.load(Ordering::Relaxed)
    }

    pub fn capacity_fallbacks(&self) -> u64 {
        self.capacity_fallbacks.load(Ordering::Relaxed)
    }

    pub fn blocked_decisions(&self) -> u64 {
        self.blocked_decisions.load(Ordering::Relaxed)
    }

    pub fn telemetry_errors(&self) -> u64 {
        self.telemetry_errors.load(Ordering::Relaxed)
    }

    fn record_source(&self, source: InventorySource) {
        if source.is_fallback() {
            self.upstream_fallbacks.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn render_prometheus(&self) -> String {
        let keyword = self.keyword_decisions.load(Ordering::Relaxed);
        let ads = self.ad_decisions.load(Ordering::Relaxed);
        let blocked = self.blocked_decisions.load(Ordering::Relaxed);
        let bots = self.bot_rejections.load(Ordering::Relaxed);
        let upstream = self.upstream_fallbacks.load(Ordering::Relaxed);
        let capacity = self.capacity_fallbacks.load(Ordering::Relaxed);
        let impressions = self.impressions_recorded.load(Ordering::Relaxed);
        let clicks = self.clicks_recorded.load(Ordering::Relaxed);
        let errors = self.telemetry_errors.load(Ordering::Relaxed);

        format!(
            "# TYPE adserve_keyword_decisions_total counter\n\
adserve_keyword_decisions_total {}\n\
# TYPE adserve_ad_decisions_total counter\n\
adserve_ad_decisions_total {}\n\
# TYPE adserve_blocked_decisions_total counter\n\
adserve_blocked_decisions_total {}\n\
# TYPE adserve_bot_rejections_total counter\n\
adserve_bot_rejections_total {}\n\
# TYPE adserve_upstream_fallbacks_total counter\n\
adserve_upstream_fallbacks_total {}\n\
# TYPE adserve_capacity_fallbacks_total counter\n\
adserve_capacity_fallbacks_total {}\n\
# TYPE adserve_impressions_recorded_total counter\n\
adserve_impressions_recorded_total {}\n\
# TYPE adserve_clicks_recorded_total counter\n\
adserve_clicks_recorded_total {}\n\
# TYPE adserve_telemetry_errors_total counter\n\
adserve_telemetry_errors_total {}\n",
            keyword, ads, blocked, bots, upstream, capacity, impressions, clicks, errors
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_decisions_count_as_upstream_fallbacks() {
        let metrics = Metrics::default();
        metrics.record_keyword_decision(InventorySource::Upstream);
        metrics.record_ad_decision(InventorySource::Fallback);
        assert_eq!(metrics.upstream_fallbacks(), 1);
        let rendered = metrics.render_prometheus();
        assert!(rendered.contains("adserve_keyword_decisions_total 1\n"));
        assert!(rendered.contains("adserve_upstream_fallbacks_total 1\n"));
    }
}
