use bevy::prelude::*;
use crossbeam_channel::Receiver;
use std::net::SocketAddr;
use tokio::sync::mpsc::UnboundedSender;

/// Connection events raised by the server thread.
#[derive(Debug, Clone)]
pub enum WsEvent {
    Connected(SocketAddr),
    Disconnected(SocketAddr),
    TextMessage { client: SocketAddr, text: String },
}

/// A serialized packet for one client.
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    pub client: SocketAddr,
    pub text: String,
}

#[derive(Resource)]
pub struct WsRecvChannel(pub Receiver<WsEvent>);

/// Unbounded so the tick never waits on a slow client.
#[derive(Resource)]
pub struct WsOutbound(pub UnboundedSender<OutboundMessage>);
