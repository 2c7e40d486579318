use crate::wire::HealthRes;

/// Simple health service for the REST API and any future transport.
///
/// This service provides a standardised way to check the health status of the
/// medication catalog.
pub struct HealthService;

impl HealthService {
    /// Static method to check health without creating an instance
    ///
    /// # Returns
    /// A `HealthRes` indicating the service is healthy.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "Medication catalog is alive".into(),
        }
    }
}
