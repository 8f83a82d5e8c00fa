//! End-to-end tests for the Cardloom propagation pipeline
//!
//! These tests wire real crate instances together (authorized store,
//! dispatcher, cluster bus, gateway) and drive complete units of work
//! through them:
//! - audience computation from mutation to per-channel cluster events
//! - authorization outcomes across the anonymous/user/admin spectrum
//! - cluster loop-back, remote ingress and deduplication
//! - live WebSocket sessions against a running gateway


#[cfg(test)]
mod audience_flow;

#[cfg(test)]
mod authorization_flow;


#[cfg(test)]
mod gateway_session;
