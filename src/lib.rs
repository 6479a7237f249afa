pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::channel::{channel_request, ChannelPeer, ChannelRequest};
pub use config::ScenarioConfig;
pub use crate::core::dispatcher::{DispatchOutcome, Dispatcher, DispatcherConfig, EmptyOrderPolicy};
pub use crate::core::registry::{StaffMember, StaffRegistry};
pub use domain::model::{Payload, RequestKind, Scope, Specialities};
pub use domain::ports::Request;
pub use utils::error::{DispatchError, Result};
