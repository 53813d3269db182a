/// Hazard Report - community environmental incident reporting
///
/// This is the root crate that provides workspace-level documentation.
/// Actual implementation is in the subcrates:
/// - `hazard-report-core`: incident model, validation schema, store and submission service
/// - `hazard-report-server`: HTTP API serving the submission service
/// - `hazard-report-client`: client library with the offline submission queue

/// Returns the version of the package.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
