mod pipeline;
mod session;

pub use pipeline::{authenticated, confirmed, Flow, Pipeline, RequestScope, Step, StepContext};
pub use session::Authenticated;

/// Request header carrying the encoded session token (`X-DELAY-AUTH`)
pub const AUTH_HEADER: &str = "x-delay-auth";

/// Response header set to `false` when the session's user has not confirmed their email
pub const CONFIRMED_HEADER: &str = "x-delay-confirmed";
