use std::sync::Arc;

use waybill_core::Generator;
use waybill_limiter::AdmissionController;

use crate::middleware::Credentials;

#[derive(Clone)]
pub struct AppState {
    generator: Arc<dyn Generator>,
    limiter: Arc<AdmissionController>,
    credentials: Arc<Credentials>,
}

impl AppState {
    pub fn new(
        generator: Arc<dyn Generator>,
        limiter: Arc<AdmissionController>,
        credentials: Credentials,
    ) -> Self {
        Self {
            generator,
            limiter,
            credentials: Arc::new(credentials),
        }
    }

    pub fn generator(&self) -> &dyn Generator {
        self.generator.as_ref()
    }

    pub fn limiter(&self) -> &AdmissionController {
        &self.limiter
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Seconds a rejected client is told to wait, one refill interval.
    pub fn retry_after_secs(&self) -> u64 {
        self.limiter.settings().refill_interval.as_secs().max(1)
    }
}
