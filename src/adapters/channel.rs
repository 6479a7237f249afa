use crate::domain::model::{Payload, Scope};
use crate::domain::ports::Request;
use crate::utils::error::{DispatchError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

pub const DEFAULT_CHANNEL_BUFFER: usize = 16;

/// A [`Request`] backed by a pair of tokio mpsc queues.
///
/// The dispatcher side holds the `ChannelRequest`; whoever opened the
/// request (an ordering customer, a worker) holds the [`ChannelPeer`].
#[derive(Debug)]
pub struct ChannelRequest {
    scope: Scope,
    inbound: Mutex<mpsc::Receiver<Payload>>,
    outbound: mpsc::Sender<Payload>,
}

/// Far end of a [`ChannelRequest`].
#[derive(Debug)]
pub struct ChannelPeer {
    to_request: mpsc::Sender<Payload>,
    from_request: mpsc::Receiver<Payload>,
}

pub fn channel_request(scope: Scope) -> (Arc<ChannelRequest>, ChannelPeer) {
    channel_request_with_buffer(scope, DEFAULT_CHANNEL_BUFFER)
}

pub fn channel_request_with_buffer(scope: Scope, buffer: usize) -> (Arc<ChannelRequest>, ChannelPeer) {
    let (to_request, inbound) = mpsc::channel(buffer);
    let (outbound, from_request) = mpsc::channel(buffer);

    let request = ChannelRequest {
        scope,
        inbound: Mutex::new(inbound),
        outbound,
    };
    let peer = ChannelPeer {
        to_request,
        from_request,
    };
    (Arc::new(request), peer)
}

#[async_trait]
impl Request for ChannelRequest {
    fn scope(&self) -> &Scope {
        &self.scope
    }

    async fn receive(&self) -> Result<Payload> {
        let mut inbound = self.inbound.lock().await;
        inbound
            .recv()
            .await
            .ok_or_else(|| DispatchError::channel("peer closed before sending a body"))
    }

    async fn send(&self, payload: Payload) -> Result<()> {
        self.outbound
            .send(payload)
            .await
            .map_err(|_| DispatchError::channel("peer closed before accepting a body"))
    }
}

impl ChannelPeer {
    pub async fn send(&self, payload: Payload) -> Result<()> {
        self.to_request
            .send(payload)
            .await
            .map_err(|_| DispatchError::channel("request side closed"))
    }

    /// Next body from the request side, or `None` once it is dropped.
    pub async fn recv(&mut self) -> Option<Payload> {
        self.from_request.recv().await
    }
}
