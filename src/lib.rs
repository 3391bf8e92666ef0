//! Tracedeck Telemetry Distribution Library

pub mod arguments;
pub mod auth;
pub mod broker;
pub mod config;
pub mod errors;
pub mod logger;
pub mod publisher;
pub mod telemetry;
pub mod traces;
pub mod webserver;

pub use auth::{TokenClaims, TokenValidator};
pub use broker::Broker;
pub use config::Config;
pub use publisher::EventPublisher;
pub use telemetry::Envelope;
pub use webserver::ws::registry::ConnectionRegistry;
pub use webserver::ws::router::ChannelRouter;
