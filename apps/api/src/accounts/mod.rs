// Account lifecycle: credential storage behind `AccountManager`, with
// registration, login gating and profile cascades layered on top as
// separate stages that share one unit of work per request.

pub mod gate;
pub mod handlers;
pub mod manager;
pub mod profile_sync;
pub mod provisioning;
pub mod session;
pub mod views;
