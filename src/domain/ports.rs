use crate::domain::model::{Payload, Scope};
use crate::utils::error::Result;
use async_trait::async_trait;

/// A request handed to the dispatcher by the hosting runtime.
///
/// Staff channels are requests too: a worker coming on duty stays registered
/// through the request it arrived on, and orders are forwarded over it.
#[async_trait]
pub trait Request: Send + Sync {
    fn scope(&self) -> &Scope;

    /// Waits for the next body from the far side of the channel.
    async fn receive(&self) -> Result<Payload>;

    /// Delivers a body to the far side, returning once it is accepted.
    async fn send(&self, payload: Payload) -> Result<()>;
}
