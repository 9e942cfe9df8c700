pub mod auth;
pub mod errors;
pub mod rate_limit;
pub mod response;

pub use auth::{require_auth, MaybePrincipal};
pub use errors::{enforce_envelope, route_not_found, JsonBody, PanicEnvelope};
pub use rate_limit::{rate_limit, RateLimiter};
pub use response::{ApiResponse, ApiResult};
