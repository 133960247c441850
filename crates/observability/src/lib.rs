use std::any::Any;
use std::backtrace::Backtrace;
use std::panic;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceCell<()> = OnceCell::new();
static PANIC_HOOK_INIT: OnceCell<()> = OnceCell::new();
static PANICS_REPORTED: AtomicU64 = AtomicU64::new(0);

/// Process-wide turn counters. Every increment is mirrored to the `metrics`
/// facade; the atomics back `/health` and tests.
#[derive(Debug, Default)]
pub struct AppMetrics {
    turns_total: AtomicU64,
    crisis_total: AtomicU64,
    trigger_hits_total: AtomicU64,
    fallback_total: AtomicU64,
    provider_failures_total: AtomicU64,
    rejected_total: AtomicU64,
    total_latency_millis: AtomicU64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub turns_total: u64,
    pub crisis_total: u64,
    pub trigger_hits_total: u64,
    pub fallback_total: u64,
    pub provider_failures_total: u64,
    pub rejected_total: u64,
    pub avg_latency_millis: f64,
}

impl AppMetrics {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn inc_turn(&self) {
        self.turns_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("vera_turns_total").increment(1);
    }

    pub fn inc_crisis(&self) {
        self.crisis_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("vera_crisis_turns_total").increment(1);
    }

    pub fn inc_trigger_hit(&self, code: &'static str) {
        self.trigger_hits_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("vera_trigger_hits_total", "code" => code).increment(1);
    }

    pub fn inc_fallback(&self) {
        self.fallback_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("vera_fallback_replies_total").increment(1);
    }

    pub fn inc_provider_failure(&self, category: &'static str) {
        self.provider_failures_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("vera_provider_failures_total", "category" => category).increment(1);
    }

    pub fn inc_rejected(&self) {
        self.rejected_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("vera_rejected_turns_total").increment(1);
    }

    pub fn observe_latency(&self, duration: Duration) {
        self.total_latency_millis
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
        metrics::histogram!("vera_turn_latency_seconds").record(duration.as_secs_f64());
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let turns = self.turns_total.load(Ordering::Relaxed);
        let latency = self.total_latency_millis.load(Ordering::Relaxed);

        MetricsSnapshot {
            turns_total: turns,
            crisis_total: self.crisis_total.load(Ordering::Relaxed),
            trigger_hits_total: self.trigger_hits_total.load(Ordering::Relaxed),
            fallback_total: self.fallback_total.load(Ordering::Relaxed),
            provider_failures_total: self.provider_failures_total.load(Ordering::Relaxed),
            rejected_total: self.rejected_total.load(Ordering::Relaxed),
            avg_latency_millis: if turns == 0 {
                0.0
            } else {
                latency as f64 / turns as f64
            },
        }
    }
}

pub fn init_tracing(service_name: &str) {
    TRACING_INIT.get_or_init(|| {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter(service_name, "info"))
            .with_current_span(true)
            .with_span_list(true)
            .init();
    });
}

/// CLI variant: logs go to stderr at `warn` so stdout stays readable for
/// replies and printed reports. `RUST_LOG` still overrides the level.
pub fn init_cli_tracing(service_name: &str) {
    TRACING_INIT.get_or_init(|| {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter(service_name, "warn"))
            .with_writer(std::io::stderr)
            .init();
    });
}

fn env_filter(service_name: &str, level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(service_name, level)))
}

fn default_directives(service_name: &str, level: &str) -> String {
    format!("{service_name}={level},vera_api={level},vera_agents={level},vera_llm={level}")
}

/// Logs every panic with a captured backtrace before unwinding starts.
/// The previous hook still runs afterwards.
pub fn install_panic_hook() {
    PANIC_HOOK_INIT.get_or_init(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            PANICS_REPORTED.fetch_add(1, Ordering::Relaxed);
            let backtrace = Backtrace::force_capture();
            let location = info
                .location()
                .map(|location| format!("{}:{}", location.file(), location.line()))
                .unwrap_or_else(|| "unknown".to_string());
            tracing::error!(
                panic = %panic_payload(info.payload()),
                location = %location,
                backtrace = %backtrace,
                "panic captured"
            );
            previous(info);
        }));
    });
}

/// Number of panics seen by the hook installed with [`install_panic_hook`].
pub fn panics_reported() -> u64 {
    PANICS_REPORTED.load(Ordering::Relaxed)
}

pub fn panic_payload(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
