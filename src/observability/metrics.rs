//! Metrics collection for `flipclock`.
//!
//! Prometheus-compatible counters and gauges for the countdown engine.
//! Every recorder call is a no-op until [`init_metrics`] installs one.

use std::sync::atomic::{AtomicBool, Ordering};

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::countdown::Unit;
use crate::error::FlipclockError;

static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initializes the global metrics recorder.
///
/// When `port` is `Some`, a Prometheus HTTP listener is started on
/// `127.0.0.1:<port>`. Otherwise the recorder is installed without an
/// endpoint. Subsequent calls are ignored.
///
/// # Errors
///
/// Returns `FlipclockError::Io` if the recorder or listener cannot be
/// installed (e.g. port already in use).
pub fn init_metrics(port: Option<u16>) -> Result<(), FlipclockError> {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        tracing::debug!("metrics already initialized, skipping");
        return Ok(());
    }
    port.map_or_else(
        || PrometheusBuilder::new().install_recorder().map(|_| ()),
        |p| {
            PrometheusBuilder::new()
                .with_http_listener(([127, 0, 0, 1], p))
                .install()
        },
    )
    .map_err(|e| FlipclockError::Io(std::io::Error::other(e.to_string())))?;

    describe_metrics();
    Ok(())
}

fn describe_metrics() {
    describe_counter!("flipclock_ticks_total", "Countdown ticks evaluated");
    describe_counter!("flipclock_flips_total", "Unit value changes rendered");
    describe_counter!(
        "flipclock_units_skipped_total",
        "Unit renders skipped because the display has no slot"
    );
    describe_counter!("flipclock_arrivals_total", "Countdowns that reached zero");
    describe_gauge!(
        "flipclock_remaining_seconds",
        "Seconds remaining at the last tick"
    );
}

/// Records one tick and the remaining time it observed.
#[allow(clippy::cast_precision_loss)]
pub fn record_tick(remaining_ms: i64) {
    counter!("flipclock_ticks_total").increment(1);
    gauge!("flipclock_remaining_seconds").set(remaining_ms.max(0) as f64 / 1000.0);
}

/// Records a rendered value change.
pub fn record_flip(unit: Unit) {
    counter!("flipclock_flips_total", "unit" => unit.name()).increment(1);
}

/// Records a render skipped for a missing display slot.
pub fn record_unit_skipped(unit: Unit) {
    counter!("flipclock_units_skipped_total", "unit" => unit.name()).increment(1);
}

/// Records the terminal arrival transition.
pub fn record_arrival() {
    counter!("flipclock_arrivals_total").increment(1);
    gauge!("flipclock_remaining_seconds").set(0.0);
}
