mod auth;
mod correlation;
mod rate_limit;

pub use auth::{require_basic_auth, Credentials};
pub use correlation::{correlation_id, X_CORRELATION_ID};
pub use rate_limit::rate_limit;
