use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct MetricsRegistry {
    received_total: AtomicU64,
    succeeded_total: AtomicU64,
    failed_total: AtomicU64,
    timed_out_total: AtomicU64,
    rejected_total: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn received(&self) {
        self.received_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn succeeded(&self) {
        self.succeeded_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn failed(&self) {
        self.failed_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn timed_out(&self) {
        self.timed_out_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn rejected(&self) {
        self.rejected_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn render_prometheus(&self) -> String {
        format!(
            concat!(
                "# TYPE execute_received_total counter\n",
                "execute_received_total {}\n",
                "# TYPE execute_succeeded_total counter\n",
                "execute_succeeded_total {}\n",
                "# TYPE execute_failed_total counter\n",
                "execute_failed_total {}\n",
                "# TYPE execute_timed_out_total counter\n",
                "execute_timed_out_total {}\n",
                "# TYPE execute_rejected_total counter\n",
                "execute_rejected_total {}\n"
            ),
            self.received_total.load(Ordering::Relaxed),
            self.succeeded_total.load(Ordering::Relaxed),
            self.failed_total.load(Ordering::Relaxed),
            self.timed_out_total.load(Ordering::Relaxed),
            self.rejected_total.load(Ordering::Relaxed),
        )
    }
}
