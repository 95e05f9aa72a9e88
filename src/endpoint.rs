//! Host Audio Endpoint Contract
//!
//! This module defines the crate's only view of the host audio subsystem.
//! An endpoint is one patchable point (a Web Audio node in the browser, a
//! bay jack in the native host); the graph layer drives it exclusively
//! through [`AudioEndpoint::connect`] and [`AudioEndpoint::disconnect`],
//! plus the live [`AudioEndpoint::reduction`] reading on dynamics
//! processors.

use crate::graph::PatchError;
use std::sync::Arc;

/// Unique identifier for an endpoint within its host
pub type EndpointId = u64;

/// One patchable point in the host audio subsystem.
///
/// Endpoints are owned by the host; the graph never creates or destroys
/// them, it only re-routes them. The connection primitives are strict the
/// way the underlying audio APIs are: connecting an already-connected pair
/// or disconnecting a link that does not exist is an error, not a no-op —
/// either one means the caller's topology bookkeeping has drifted, and
/// retrying cannot fix it.
pub trait AudioEndpoint: Send + Sync {
    /// Stable identity of this endpoint within its host
    fn endpoint_id(&self) -> EndpointId;

    /// Route this endpoint's output into `target`
    ///
    /// One physical connection is made. Connecting the same pair twice
    /// fails with [`PatchError::AlreadyConnected`].
    fn connect(&self, target: &dyn AudioEndpoint) -> Result<(), PatchError>;

    /// Remove the physical connection into `target`
    ///
    /// Fails with [`PatchError::NotConnected`] when no such connection
    /// exists.
    fn disconnect(&self, target: &dyn AudioEndpoint) -> Result<(), PatchError>;

    /// Instantaneous gain reduction in dB
    ///
    /// Dynamics processors report the attenuation they are currently
    /// applying (a non-positive figure); every other endpoint reads 0.0.
    fn reduction(&self) -> f64 {
        0.0
    }
}

/// Shared handle to a host endpoint
pub type EndpointHandle = Arc<dyn AudioEndpoint>;
