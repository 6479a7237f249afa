// Adapters layer: concrete implementations of the request port.

pub mod channel;

pub use channel::{channel_request, ChannelPeer, ChannelRequest};
