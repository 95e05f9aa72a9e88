//! Virtual Patch Bay
//!
//! A host-side implementation of the endpoint contract for running the
//! panel outside a browser and for exercising topology in tests. The bay
//! owns a single link table shared by all the jacks it issues and enforces
//! the same strictness as the underlying audio APIs: duplicate connects
//! and disconnects of missing links are hard errors.
//!
//! Jack flavors mirror the node kinds the panel patches: plain jacks,
//! a dynamics processor (parameter storage plus a live gain-reduction
//! figure), a makeup-gain stage, and named media sources carrying the
//! shared play state.

use crate::bridge::{AtomicF64, PlayState};
use crate::endpoint::{AudioEndpoint, EndpointHandle, EndpointId};
use crate::graph::PatchError;
use crate::params::DynamicsParam;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type LinkTable = BTreeSet<(EndpointId, EndpointId)>;

/// Issues jacks and owns the connection table they share
///
/// Cheap to clone: clones are handles onto the same bay.
#[derive(Clone)]
pub struct PatchBay {
    inner: Arc<BayInner>,
}

struct BayInner {
    links: Mutex<LinkTable>,
    media: Mutex<HashMap<String, Arc<MediaJack>>>,
    next_id: AtomicU64,
}

impl PatchBay {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BayInner {
                links: Mutex::new(BTreeSet::new()),
                media: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Issue a plain jack (e.g. a destination or tap point)
    pub fn jack(&self) -> EndpointHandle {
        Arc::new(Jack {
            socket: self.socket(),
        })
    }

    /// Issue a dynamics-processor jack
    pub fn dynamics(&self) -> Arc<DynamicsJack> {
        let params = DynamicsParam::ALL.map(|p| AtomicF64::new(p.spec().default));
        Arc::new(DynamicsJack {
            socket: self.socket(),
            params,
            reduction: AtomicF64::new(0.0),
        })
    }

    /// Issue a gain-stage jack
    pub fn gain(&self) -> Arc<GainJack> {
        Arc::new(GainJack {
            socket: self.socket(),
            level: AtomicF64::new(DynamicsParam::Gain.spec().default),
        })
    }

    /// Register a named media source and return its jack
    ///
    /// Registering the same name again returns the existing jack.
    pub fn media(&self, name: &str) -> Arc<MediaJack> {
        let mut media = lock(&self.inner.media);
        if let Some(existing) = media.get(name) {
            return Arc::clone(existing);
        }
        let jack = Arc::new(MediaJack {
            socket: self.socket(),
            playing: Arc::new(PlayState::new(false)),
        });
        media.insert(name.to_string(), Arc::clone(&jack));
        jack
    }

    /// Look up a registered media source by name
    pub fn find_media(&self, name: &str) -> Option<Arc<MediaJack>> {
        lock(&self.inner.media).get(name).cloned()
    }

    /// Deterministic snapshot of the current connection set
    pub fn links(&self) -> LinkTable {
        lock(&self.inner.links).clone()
    }

    /// Whether a physical connection `from -> to` exists
    pub fn connected(&self, from: &dyn AudioEndpoint, to: &dyn AudioEndpoint) -> bool {
        lock(&self.inner.links).contains(&(from.endpoint_id(), to.endpoint_id()))
    }

    fn socket(&self) -> Socket {
        Socket {
            id: self.inner.next_id.fetch_add(1, Ordering::Relaxed),
            bay: self.clone(),
        }
    }

    fn plug(&self, from: EndpointId, to: EndpointId) -> Result<(), PatchError> {
        if !lock(&self.inner.links).insert((from, to)) {
            return Err(PatchError::AlreadyConnected { from, to });
        }
        Ok(())
    }

    fn unplug(&self, from: EndpointId, to: EndpointId) -> Result<(), PatchError> {
        if !lock(&self.inner.links).remove(&(from, to)) {
            return Err(PatchError::NotConnected { from, to });
        }
        Ok(())
    }
}

impl Default for PatchBay {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Identity plus a handle back to the owning bay; shared by all jack kinds
struct Socket {
    id: EndpointId,
    bay: PatchBay,
}

impl Socket {
    fn connect(&self, target: &dyn AudioEndpoint) -> Result<(), PatchError> {
        self.bay.plug(self.id, target.endpoint_id())
    }

    fn disconnect(&self, target: &dyn AudioEndpoint) -> Result<(), PatchError> {
        self.bay.unplug(self.id, target.endpoint_id())
    }
}

/// A plain patchable point
pub struct Jack {
    socket: Socket,
}

impl AudioEndpoint for Jack {
    fn endpoint_id(&self) -> EndpointId {
        self.socket.id
    }

    fn connect(&self, target: &dyn AudioEndpoint) -> Result<(), PatchError> {
        self.socket.connect(target)
    }

    fn disconnect(&self, target: &dyn AudioEndpoint) -> Result<(), PatchError> {
        self.socket.disconnect(target)
    }
}

/// A dynamics-processor endpoint
///
/// Parameter values live in per-parameter atomics so the main thread can
/// write them while the host's processing side reads them. The host also
/// publishes the live gain-reduction figure here, which the metering tap
/// reads through the endpoint contract.
pub struct DynamicsJack {
    socket: Socket,
    params: [AtomicF64; DynamicsParam::ALL.len()],
    reduction: AtomicF64,
}

impl DynamicsJack {
    pub fn set_param(&self, param: DynamicsParam, value: f64) {
        self.params[param.index()].set(value);
    }

    pub fn param(&self, param: DynamicsParam) -> f64 {
        self.params[param.index()].get()
    }

    /// Host-side: publish the current gain-reduction reading
    pub fn set_reduction(&self, db: f64) {
        self.reduction.set(db);
    }
}

impl AudioEndpoint for DynamicsJack {
    fn endpoint_id(&self) -> EndpointId {
        self.socket.id
    }

    fn connect(&self, target: &dyn AudioEndpoint) -> Result<(), PatchError> {
        self.socket.connect(target)
    }

    fn disconnect(&self, target: &dyn AudioEndpoint) -> Result<(), PatchError> {
        self.socket.disconnect(target)
    }

    fn reduction(&self) -> f64 {
        self.reduction.get()
    }
}

/// A gain-stage endpoint (makeup gain after the compressor)
pub struct GainJack {
    socket: Socket,
    level: AtomicF64,
}

impl GainJack {
    pub fn set_level(&self, level: f64) {
        self.level.set(level);
    }

    pub fn level(&self) -> f64 {
        self.level.get()
    }
}

impl AudioEndpoint for GainJack {
    fn endpoint_id(&self) -> EndpointId {
        self.socket.id
    }

    fn connect(&self, target: &dyn AudioEndpoint) -> Result<(), PatchError> {
        self.socket.connect(target)
    }

    fn disconnect(&self, target: &dyn AudioEndpoint) -> Result<(), PatchError> {
        self.socket.disconnect(target)
    }
}

/// A named media source: an endpoint plus the shared play state
pub struct MediaJack {
    socket: Socket,
    playing: Arc<PlayState>,
}

impl MediaJack {
    /// The play flag shared with the metering side
    pub fn play_state(&self) -> Arc<PlayState> {
        Arc::clone(&self.playing)
    }
}

impl AudioEndpoint for MediaJack {
    fn endpoint_id(&self) -> EndpointId {
        self.socket.id
    }

    fn connect(&self, target: &dyn AudioEndpoint) -> Result<(), PatchError> {
        self.socket.connect(target)
    }

    fn disconnect(&self, target: &dyn AudioEndpoint) -> Result<(), PatchError> {
        self.socket.disconnect(target)
    }
}
