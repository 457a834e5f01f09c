//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter filtered
//! by `RUST_LOG`. Module paths are hidden (`with_target(false)`); the actor
//! logs carry an `entity_type` field instead.
//!
//! ```bash
//! RUST_LOG=info pack-status show 1042
//! RUST_LOG=debug pack-status complete 1042      # request payloads
//! RUST_LOG=pack_status::service=debug pack-status show 1042
//! ```
//!
//! What shows up at `info`:
//!
//! ```text
//! INFO open{id=OrderId(1042)}: Order opened status=Opened
//! INFO begin_completion_countdown{id=OrderId(1042)}: Countdown started seconds=30
//! INFO Countdown elapsed, committing completion order_id=1042
//! WARN Distributed target update failed order_id=1042 error=...
//! ```
//!
//! The swallowed distributed-target failure is only visible here.

/// Defaults to `info` when `RUST_LOG` is unset.
pub fn setup_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
