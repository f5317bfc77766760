//! Version information for the console, populated at build time.

/// Get the build date in RFC3339 format
pub fn build_date() -> &'static str {
    env!("BUILD_DATE")
}

/// Get the git commit hash (short)
pub fn build_commit() -> &'static str {
    env!("BUILD_COMMIT")
}

/// Get the package version
pub fn build_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Full version line for `roster --version`: `0.1.0 (abc1234 2026-08-06T…)`.
pub fn long_version() -> String {
    format!("{} ({} {})", build_version(), build_commit(), build_date())
}
