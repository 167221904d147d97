//! Metrics collection.
//!
//! # Metrics
//! - `compiler_passes_total` (counter): compilation passes by `outcome`
//!   (`ok`, `error`)
//! - `compiler_warnings_total` (counter): warnings recorded by successful passes
//! - `compiler_routes_total` (counter): routes emitted by successful passes
//! - `compiler_reloads_total` (counter): reload attempts by `outcome`
//!   (`applied`, `rejected`)
//!
//! # Design Decisions
//! - Recording without an installed recorder is a no-op, so library users
//!   and tests pay nothing

pub fn record_pass(ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    ::metrics::counter!("compiler_passes_total", "outcome" => outcome).increment(1);
}

pub fn record_warnings(count: usize) {
    ::metrics::counter!("compiler_warnings_total").increment(count as u64);
}

pub fn record_routes(count: usize) {
    ::metrics::counter!("compiler_routes_total").increment(count as u64);
}

pub fn record_reload(applied: bool) {
    let outcome = if applied { "applied" } else { "rejected" };
    ::metrics::counter!("compiler_reloads_total", "outcome" => outcome).increment(1);
}
