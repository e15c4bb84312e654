mod errors;
mod internal;

pub use errors::*;
pub use internal::{Query, ResourceClient};
