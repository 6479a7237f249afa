pub mod dispatcher;
pub mod registry;

pub use crate::domain::model::{Payload, RequestKind, Scope, Specialities};
pub use crate::domain::ports::Request;
pub use crate::utils::error::Result;
