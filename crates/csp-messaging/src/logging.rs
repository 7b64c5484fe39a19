//! Tracing setup shared by anything embedding `csp-messaging`. Never
//! invoked by this crate itself — call it once from the binary's `main`,
//! same as `summitd` does for its own daemon process.
//!
//! `RUST_LOG=debug` (or any other `tracing_subscriber::EnvFilter`
//! expression) controls verbosity; with no variable set, only `info` and
//! above are emitted.

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}
