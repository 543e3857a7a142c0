//! System-wide constants for the Matchfund allocation engine.

/// Default cap on compensation attempts after an overshooting decrement.
/// Each attempt is one counter-store round trip, so the cap is the only
/// bound on self-healing latency.
pub const DEFAULT_MAX_COMPENSATION_ATTEMPTS: usize = 6;

/// Namespace prefix for real-time counter keys. Versioned so a key-format
/// change can never silently alias keys written by an older release.
pub const BALANCE_KEY_PREFIX: &str = "matchfund:v1";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "Matchfund";
