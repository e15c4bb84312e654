mod errors;
mod internal;

pub use errors::*;
pub use internal::{
    ProductionSessionManager,
    SessionManagerImpl,
    SessionPhase,
};

/// Request-decorating hook: yields the current bearer token for
/// authenticated resource requests. Implemented by the session manager.
pub trait AccessTokenSource: Send + Sync {
    fn access_token(&self) -> Option<String>;
}
