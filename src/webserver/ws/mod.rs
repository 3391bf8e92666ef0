/// Real-time telemetry stream: gateway, session registry, channel routing
pub mod gateway;
pub mod liveness;
pub mod message;
pub mod registry;
pub mod router;

pub use gateway::routes;
pub use message::{ClientMessage, ServerMessage};
pub use registry::{ConnectionRegistry, Session, SessionId};
pub use router::ChannelRouter;
