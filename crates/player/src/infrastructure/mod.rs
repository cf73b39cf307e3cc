pub mod http_client;
pub mod messaging;
pub mod platform;
pub mod websocket;

pub use http_client::HttpServerApi;
pub use messaging::ConnectionState;
pub use websocket::SocketIoTransport;
