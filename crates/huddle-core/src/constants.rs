//! Package-level constants.

/// Current version of huddle (sourced from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Package name.
pub const NAME: &str = "huddle";

/// Display name used when an identity cannot be resolved.
pub const UNKNOWN_DISPLAY_NAME: &str = "Someone";
