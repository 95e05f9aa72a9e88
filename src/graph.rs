//! Signal Graph
//!
//! This module provides the ordered chain of signal nodes at the center of
//! the panel: assembly of the effect chain, feeding it from an upstream
//! source, routing its tail to one or more external outputs, and the
//! symmetric bypass/restore pair that lifts the chain out of the signal
//! path (and back) without touching its internal wiring.
//!
//! Topology bookkeeping and physical connections must always agree: every
//! operation validates before it mutates, and a mutation performed out of
//! order surfaces as a hard error from the endpoint layer rather than a
//! silently wrong routing.

use crate::endpoint::{AudioEndpoint, EndpointHandle, EndpointId};
use slotmap::{new_key_type, SlotMap};
use std::collections::HashMap;

new_key_type! {
    /// Unique identifier for a node in the signal graph
    pub struct NodeKey;
}

/// Error types for patching operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchError {
    /// Operation requires a head/tail but the graph has no nodes
    EmptyChain,
    /// Bypass/restore requires at least one routed output
    NoOutputs,
    /// A node with this name is already registered
    DuplicateName(String),
    /// No node with this name is registered
    UnknownNode(String),
    /// The pair is already physically connected
    AlreadyConnected { from: EndpointId, to: EndpointId },
    /// No physical connection exists between the pair
    NotConnected { from: EndpointId, to: EndpointId },
    /// The named media source is not present in the host
    MediaNotFound(String),
}

impl std::fmt::Display for PatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PatchError::EmptyChain => write!(f, "operation on an empty chain"),
            PatchError::NoOutputs => write!(f, "no outputs routed from the chain tail"),
            PatchError::DuplicateName(name) => write!(f, "duplicate node name: {}", name),
            PatchError::UnknownNode(name) => write!(f, "unknown node: {}", name),
            PatchError::AlreadyConnected { from, to } => {
                write!(f, "endpoints {} -> {} are already connected", from, to)
            }
            PatchError::NotConnected { from, to } => {
                write!(f, "endpoints {} -> {} are not connected", from, to)
            }
            PatchError::MediaNotFound(name) => write!(f, "media source not found: {}", name),
        }
    }
}

impl std::error::Error for PatchError {}

/// Descriptor for one node in a [`SignalGraph::chain`] call
pub struct NodeSpec {
    pub name: String,
    pub endpoint: EndpointHandle,
}

impl NodeSpec {
    pub fn new(name: impl Into<String>, endpoint: EndpointHandle) -> Self {
        Self {
            name: name.into(),
            endpoint,
        }
    }
}

/// One named member of the chain
///
/// The `next` link is the node's exclusive claim on the downstream
/// connection; `prev` is a back-reference only. In the steady state (after
/// [`SignalGraph::chain`] completes) a set `next` link corresponds to a
/// physical connection between the two endpoints.
pub struct SignalNode {
    name: String,
    endpoint: EndpointHandle,
    prev: Option<NodeKey>,
    next: Option<NodeKey>,
}

impl SignalNode {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The underlying host endpoint (owned externally)
    pub fn endpoint(&self) -> &EndpointHandle {
        &self.endpoint
    }
}

/// An ordered chain of signal nodes with name lookup and an output set
///
/// Created once at session start; bypass/restore mutates connection state
/// without destroying nodes, so a bypassed chain stays addressable and
/// ready to be repatched.
#[derive(Default)]
pub struct SignalGraph {
    nodes: SlotMap<NodeKey, SignalNode>,
    names: HashMap<String, NodeKey>,
    head: Option<NodeKey>,
    tail: Option<NodeKey>,
    outputs: Vec<EndpointHandle>,
}

impl SignalGraph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node as the new tail
    ///
    /// An empty graph makes the node both head and tail with no links.
    /// List-only: no physical connection is made — callers complete the
    /// wiring through [`SignalGraph::chain`].
    pub fn push(
        &mut self,
        name: impl Into<String>,
        endpoint: EndpointHandle,
    ) -> Result<NodeKey, PatchError> {
        let name = name.into();
        if self.names.contains_key(&name) {
            return Err(PatchError::DuplicateName(name));
        }

        let prev_tail = self.tail;
        let key = self.nodes.insert(SignalNode {
            name: name.clone(),
            endpoint,
            prev: prev_tail,
            next: None,
        });

        match prev_tail {
            Some(tail_key) => self.nodes[tail_key].next = Some(key),
            None => self.head = Some(key),
        }
        self.tail = Some(key);
        self.names.insert(name, key);
        Ok(key)
    }

    /// Construct nodes from descriptors, push each in order, then wire the
    /// chain
    ///
    /// Postcondition: every adjacent pair in the list is physically
    /// connected; no external endpoint is connected. On a non-empty graph
    /// the wiring walk starts at the previous tail, so pairs wired by an
    /// earlier call are not re-connected.
    pub fn chain(&mut self, specs: Vec<NodeSpec>) -> Result<(), PatchError> {
        let wire_from = self.tail;
        for spec in specs {
            self.push(spec.name, spec.endpoint)?;
        }

        let mut cursor = wire_from.or(self.head);
        while let Some(key) = cursor {
            let next = self.nodes[key].next;
            if let Some(next_key) = next {
                let from = &self.nodes[key].endpoint;
                let to = &self.nodes[next_key].endpoint;
                from.connect(to.as_ref())?;
            }
            cursor = next;
        }
        Ok(())
    }

    /// Connect an upstream source into the chain head
    ///
    /// The source is upstream glue (e.g. the raw media element output); it
    /// is not entered into the name lookup.
    pub fn feed_from(&self, source: &dyn AudioEndpoint) -> Result<(), PatchError> {
        let head = self.head.ok_or(PatchError::EmptyChain)?;
        source.connect(self.nodes[head].endpoint.as_ref())
    }

    /// Route the chain tail into an external output and record it in the
    /// output set
    pub fn route_to(&mut self, output: EndpointHandle) -> Result<(), PatchError> {
        let tail = self.tail.ok_or(PatchError::EmptyChain)?;
        let tail_endpoint = &self.nodes[tail].endpoint;
        if self
            .outputs
            .iter()
            .any(|o| o.endpoint_id() == output.endpoint_id())
        {
            return Err(PatchError::AlreadyConnected {
                from: tail_endpoint.endpoint_id(),
                to: output.endpoint_id(),
            });
        }

        tail_endpoint.connect(output.as_ref())?;
        self.outputs.push(output);
        Ok(())
    }

    /// Disconnect the chain tail from an output and remove it from the
    /// output set
    pub fn unroute_from(&mut self, output: &dyn AudioEndpoint) -> Result<(), PatchError> {
        let tail = self.tail.ok_or(PatchError::EmptyChain)?;
        let tail_endpoint = &self.nodes[tail].endpoint;
        let position = self
            .outputs
            .iter()
            .position(|o| o.endpoint_id() == output.endpoint_id())
            .ok_or(PatchError::NotConnected {
                from: tail_endpoint.endpoint_id(),
                to: output.endpoint_id(),
            })?;

        tail_endpoint.disconnect(output)?;
        self.outputs.remove(position);
        Ok(())
    }

    /// Bypass: lift the chain out of the signal path
    ///
    /// Disconnects `upstream` from the head, then for every routed output
    /// disconnects the tail and connects `upstream` directly. Audio flows
    /// upstream -> each output, skipping the chain; the chain's internal
    /// connections stay untouched so [`SignalGraph::patch_into`] can
    /// restore it seamlessly.
    pub fn unpatch_from(&self, upstream: &dyn AudioEndpoint) -> Result<(), PatchError> {
        let (head, tail) = self.ends()?;
        if self.outputs.is_empty() {
            return Err(PatchError::NoOutputs);
        }

        upstream.disconnect(self.nodes[head].endpoint.as_ref())?;
        let tail_endpoint = &self.nodes[tail].endpoint;
        for output in &self.outputs {
            tail_endpoint.disconnect(output.as_ref())?;
            upstream.connect(output.as_ref())?;
        }
        Ok(())
    }

    /// Restore: patch the chain back into the signal path
    ///
    /// Exact inverse of [`SignalGraph::unpatch_from`]: undoes the direct
    /// upstream -> output wiring, connects `upstream` into the head once,
    /// and reconnects the tail to every routed output. A bypass/restore
    /// pair in either order reproduces the prior connection set exactly.
    pub fn patch_into(&self, upstream: &dyn AudioEndpoint) -> Result<(), PatchError> {
        let (head, tail) = self.ends()?;
        if self.outputs.is_empty() {
            return Err(PatchError::NoOutputs);
        }

        for output in &self.outputs {
            upstream.disconnect(output.as_ref())?;
        }
        upstream.connect(self.nodes[head].endpoint.as_ref())?;
        let tail_endpoint = &self.nodes[tail].endpoint;
        for output in &self.outputs {
            tail_endpoint.connect(output.as_ref())?;
        }
        Ok(())
    }

    /// Look up a node by name
    pub fn access(&self, name: &str) -> Option<&SignalNode> {
        self.names.get(name).map(|&key| &self.nodes[key])
    }

    /// The downstream neighbor's endpoint, or `None` when absent
    pub fn next_endpoint(&self, name: &str) -> Option<EndpointHandle> {
        let key = *self.names.get(name)?;
        let next = self.nodes[key].next?;
        Some(self.nodes[next].endpoint.clone())
    }

    /// The upstream neighbor's endpoint, or `None` when absent
    pub fn prev_endpoint(&self, name: &str) -> Option<EndpointHandle> {
        let key = *self.names.get(name)?;
        let prev = self.nodes[key].prev?;
        Some(self.nodes[prev].endpoint.clone())
    }

    /// The head node's endpoint
    pub fn head_endpoint(&self) -> Option<EndpointHandle> {
        self.head.map(|key| self.nodes[key].endpoint.clone())
    }

    /// The tail node's endpoint
    pub fn tail_endpoint(&self) -> Option<EndpointHandle> {
        self.tail.map(|key| self.nodes[key].endpoint.clone())
    }

    /// External endpoints currently routed from the tail
    pub fn outputs(&self) -> &[EndpointHandle] {
        &self.outputs
    }

    /// Node names in chain order, head to tail
    pub fn order(&self) -> Vec<&str> {
        let mut names = Vec::with_capacity(self.nodes.len());
        let mut cursor = self.head;
        while let Some(key) = cursor {
            names.push(self.nodes[key].name.as_str());
            cursor = self.nodes[key].next;
        }
        names
    }

    /// Number of nodes in the chain
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn ends(&self) -> Result<(NodeKey, NodeKey), PatchError> {
        match (self.head, self.tail) {
            (Some(head), Some(tail)) => Ok((head, tail)),
            _ => Err(PatchError::EmptyChain),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bay::PatchBay;

    fn two_node_graph(bay: &PatchBay) -> SignalGraph {
        let mut graph = SignalGraph::new();
        graph
            .chain(vec![
                NodeSpec::new("a", bay.jack()),
                NodeSpec::new("b", bay.jack()),
            ])
            .unwrap();
        graph
    }

    #[test]
    fn test_push_empty_graph_sets_head_and_tail() {
        let bay = PatchBay::new();
        let mut graph = SignalGraph::new();
        let jack = bay.jack();

        graph.push("only", jack.clone()).unwrap();

        assert_eq!(graph.len(), 1);
        assert_eq!(
            graph.head_endpoint().unwrap().endpoint_id(),
            jack.endpoint_id()
        );
        assert_eq!(
            graph.tail_endpoint().unwrap().endpoint_id(),
            jack.endpoint_id()
        );
        // List-only primitive: nothing is physically connected yet
        assert!(bay.links().is_empty());
    }

    #[test]
    fn test_push_rejects_duplicate_name() {
        let bay = PatchBay::new();
        let mut graph = SignalGraph::new();
        graph.push("dup", bay.jack()).unwrap();

        let result = graph.push("dup", bay.jack());
        assert_eq!(result, Err(PatchError::DuplicateName("dup".into())));
    }

    #[test]
    fn test_chain_connects_consecutive_pairs_only() {
        let bay = PatchBay::new();
        let a = bay.jack();
        let b = bay.jack();
        let c = bay.jack();

        let mut graph = SignalGraph::new();
        graph
            .chain(vec![
                NodeSpec::new("a", a.clone()),
                NodeSpec::new("b", b.clone()),
                NodeSpec::new("c", c.clone()),
            ])
            .unwrap();

        assert!(bay.connected(a.as_ref(), b.as_ref()));
        assert!(bay.connected(b.as_ref(), c.as_ref()));
        // No pair of non-consecutive nodes is connected
        assert!(!bay.connected(a.as_ref(), c.as_ref()));
        assert_eq!(bay.links().len(), 2);
        assert_eq!(graph.order(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_chain_resumes_from_previous_tail() {
        let bay = PatchBay::new();
        let mut graph = two_node_graph(&bay);
        let before = bay.links();

        graph
            .chain(vec![NodeSpec::new("c", bay.jack())])
            .unwrap();

        // The a->b link is not re-connected; only b->c is added
        assert_eq!(bay.links().len(), before.len() + 1);
        assert_eq!(graph.order(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_push_after_chain_updates_tail_and_lookup() {
        let bay = PatchBay::new();
        let mut graph = two_node_graph(&bay);
        let c = bay.jack();

        graph.push("c", c.clone()).unwrap();

        let node = graph.access("c").expect("pushed node is addressable");
        assert_eq!(node.name(), "c");
        assert_eq!(
            graph.tail_endpoint().unwrap().endpoint_id(),
            c.endpoint_id()
        );
        assert_eq!(graph.len(), 3);
    }

    #[test]
    fn test_neighbor_accessors() {
        let bay = PatchBay::new();
        let graph = two_node_graph(&bay);
        let a = graph.access("a").unwrap().endpoint().clone();
        let b = graph.access("b").unwrap().endpoint().clone();

        assert_eq!(
            graph.next_endpoint("a").unwrap().endpoint_id(),
            b.endpoint_id()
        );
        assert_eq!(
            graph.prev_endpoint("b").unwrap().endpoint_id(),
            a.endpoint_id()
        );
        assert!(graph.next_endpoint("b").is_none());
        assert!(graph.prev_endpoint("a").is_none());
        assert!(graph.next_endpoint("missing").is_none());
    }

    #[test]
    fn test_feed_and_route() {
        let bay = PatchBay::new();
        let source = bay.jack();
        let dest = bay.jack();
        let mut graph = two_node_graph(&bay);

        graph.feed_from(source.as_ref()).unwrap();
        graph.route_to(dest.clone()).unwrap();

        let head = graph.head_endpoint().unwrap();
        let tail = graph.tail_endpoint().unwrap();
        assert!(bay.connected(source.as_ref(), head.as_ref()));
        assert!(bay.connected(tail.as_ref(), dest.as_ref()));
        assert_eq!(graph.outputs().len(), 1);
    }

    #[test]
    fn test_route_to_same_output_twice_fails() {
        let bay = PatchBay::new();
        let dest = bay.jack();
        let mut graph = two_node_graph(&bay);

        graph.route_to(dest.clone()).unwrap();
        let result = graph.route_to(dest.clone());
        assert!(matches!(result, Err(PatchError::AlreadyConnected { .. })));
        assert_eq!(graph.outputs().len(), 1);
    }

    #[test]
    fn test_unroute_removes_link_and_entry() {
        let bay = PatchBay::new();
        let dest = bay.jack();
        let mut graph = two_node_graph(&bay);
        graph.route_to(dest.clone()).unwrap();

        graph.unroute_from(dest.as_ref()).unwrap();

        let tail = graph.tail_endpoint().unwrap();
        assert!(!bay.connected(tail.as_ref(), dest.as_ref()));
        assert!(graph.outputs().is_empty());

        let again = graph.unroute_from(dest.as_ref());
        assert!(matches!(again, Err(PatchError::NotConnected { .. })));
    }

    #[test]
    fn test_bypass_reroutes_outputs_directly() {
        let bay = PatchBay::new();
        let source = bay.jack();
        let dest = bay.jack();
        let mut graph = two_node_graph(&bay);
        graph.feed_from(source.as_ref()).unwrap();
        graph.route_to(dest.clone()).unwrap();

        let a = graph.access("a").unwrap().endpoint().clone();
        let b = graph.access("b").unwrap().endpoint().clone();

        graph.unpatch_from(source.as_ref()).unwrap();

        // Source feeds the destination directly, tail is lifted out
        assert!(bay.connected(source.as_ref(), dest.as_ref()));
        assert!(!bay.connected(b.as_ref(), dest.as_ref()));
        // Chain-internal wiring is untouched
        assert!(bay.connected(a.as_ref(), b.as_ref()));
    }

    #[test]
    fn test_bypass_restore_round_trip_is_exact() {
        let bay = PatchBay::new();
        let source = bay.jack();
        let tap = bay.jack();
        let dest = bay.jack();
        let mut graph = two_node_graph(&bay);
        graph.feed_from(source.as_ref()).unwrap();
        graph.route_to(tap).unwrap();
        graph.route_to(dest).unwrap();

        let engaged = bay.links();
        graph.unpatch_from(source.as_ref()).unwrap();
        let bypassed = bay.links();
        assert_ne!(engaged, bypassed);

        graph.patch_into(source.as_ref()).unwrap();
        assert_eq!(bay.links(), engaged);

        // And the inverse order round-trips too
        graph.unpatch_from(source.as_ref()).unwrap();
        assert_eq!(bay.links(), bypassed);
    }

    #[test]
    fn test_repeated_bypass_fails_fast() {
        let bay = PatchBay::new();
        let source = bay.jack();
        let dest = bay.jack();
        let mut graph = two_node_graph(&bay);
        graph.feed_from(source.as_ref()).unwrap();
        graph.route_to(dest).unwrap();

        graph.unpatch_from(source.as_ref()).unwrap();
        let again = graph.unpatch_from(source.as_ref());
        assert!(matches!(again, Err(PatchError::NotConnected { .. })));
    }

    #[test]
    fn test_empty_graph_operations_fail_fast() {
        let bay = PatchBay::new();
        let external = bay.jack();
        let mut graph = SignalGraph::new();

        assert_eq!(
            graph.feed_from(external.as_ref()),
            Err(PatchError::EmptyChain)
        );
        assert_eq!(
            graph.route_to(external.clone()),
            Err(PatchError::EmptyChain)
        );
        assert_eq!(
            graph.unpatch_from(external.as_ref()),
            Err(PatchError::EmptyChain)
        );
        assert_eq!(
            graph.patch_into(external.as_ref()),
            Err(PatchError::EmptyChain)
        );
    }

    #[test]
    fn test_bypass_without_outputs_fails_fast() {
        let bay = PatchBay::new();
        let source = bay.jack();
        let graph = two_node_graph(&bay);
        graph.feed_from(source.as_ref()).unwrap();

        assert_eq!(
            graph.unpatch_from(source.as_ref()),
            Err(PatchError::NoOutputs)
        );
        assert_eq!(
            graph.patch_into(source.as_ref()),
            Err(PatchError::NoOutputs)
        );
    }

    #[test]
    fn test_error_display() {
        let err = PatchError::DuplicateName("comp".into());
        assert_eq!(err.to_string(), "duplicate node name: comp");

        let err = PatchError::NotConnected { from: 1, to: 2 };
        assert_eq!(err.to_string(), "endpoints 1 -> 2 are not connected");
    }
}
