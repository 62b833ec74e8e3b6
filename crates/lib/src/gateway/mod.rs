//! Gateway: HTTP intake for pushes.
//!
//! `POST {api.path}` with `Authorization: Bearer <token>` and a JSON body
//! `{ "message", "umo"? }`. The recipient falls back to `api.default_umo`; the
//! message is put on the delivery queue and the request is acknowledged without
//! waiting for delivery.

mod auth;
mod error;
mod protocol;
mod server;

pub use auth::{authorize, bearer_token};
pub use error::GatewayError;
pub use protocol::{ErrorBody, HealthStatus, PushAck, PushRequest};
pub use server::{build_registry, router, run_gateway, serve, GatewayState};
