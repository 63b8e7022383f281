//! Node registration facade and request dispatch.
//!
//! A deliberately thin stand-in for the full node/reference graph of a
//! standards-based server: registered nodes live in a flat map keyed by
//! `NodeId`, and read/write requests dispatch to the node's stored value
//! or its bound data source. No reference graph, no wire encoding.
//!
//! Constructed at startup, populated via the `add_*` methods, and
//! dispatched into by the request loop. No global state.

use std::collections::HashMap;

use opal_common::status::StatusCode;
use opal_common::value::{DataValue, NodeId, NumericRange, ReadRequest, Value, WriteRequest};
use opal_hal::source::DataSource;
use thiserror::Error;

/// Node identifier of the objects root, present in every address space.
const OBJECTS_ROOT_ID: u32 = 85;

/// First identifier handed out to nodes registered without an explicit
/// one.
const FIRST_ASSIGNED_ID: u32 = 51000;

/// Error during node registration.
#[derive(Debug, Error)]
pub enum AddressSpaceError {
    /// The given parent node does not exist.
    #[error("unknown parent node: {0}")]
    UnknownParent(NodeId),

    /// A node with the requested identifier already exists.
    #[error("node already registered: {0}")]
    DuplicateNodeId(NodeId),
}

enum NodeKind {
    Object,
    Static(Value),
    Source(Box<dyn DataSource>),
}

struct Node {
    browse_name: String,
    #[allow(dead_code)]
    parent: Option<NodeId>,
    kind: NodeKind,
}

/// The server's addressable object model.
pub struct AddressSpace {
    nodes: HashMap<NodeId, Node>,
    objects_root: NodeId,
    next_id: u32,
}

impl AddressSpace {
    /// Create an address space holding only the objects root.
    pub fn new() -> Self {
        let objects_root = NodeId::numeric(0, OBJECTS_ROOT_ID);
        let mut nodes = HashMap::new();
        nodes.insert(
            objects_root.clone(),
            Node {
                browse_name: "Objects".to_string(),
                parent: None,
                kind: NodeKind::Object,
            },
        );
        Self {
            nodes,
            objects_root,
            next_id: FIRST_ASSIGNED_ID,
        }
    }

    /// Identifier of the objects root.
    pub fn objects_root(&self) -> NodeId {
        self.objects_root.clone()
    }

    /// Number of registered nodes, the root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether only the root is registered.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Whether a node with the given identifier exists.
    pub fn contains(&self, node: &NodeId) -> bool {
        self.nodes.contains_key(node)
    }

    /// Browse name of a node, if registered.
    pub fn browse_name(&self, node: &NodeId) -> Option<&str> {
        self.nodes.get(node).map(|n| n.browse_name.as_str())
    }

    /// Register an object node.
    ///
    /// # Arguments
    /// * `requested` - Explicit identifier, or `None` to assign one
    /// * `parent` - Parent node the object hangs under
    /// * `name` - Browse name
    ///
    /// # Errors
    /// Returns an error if the parent is unknown or the identifier is
    /// taken.
    pub fn add_object_node(
        &mut self,
        requested: Option<NodeId>,
        parent: &NodeId,
        name: &str,
    ) -> Result<NodeId, AddressSpaceError> {
        self.insert(requested, parent, name, NodeKind::Object)
    }

    /// Register a variable node holding a static value.
    ///
    /// # Errors
    /// Returns an error if the parent is unknown or the identifier is
    /// taken.
    pub fn add_variable_node(
        &mut self,
        requested: Option<NodeId>,
        parent: &NodeId,
        name: &str,
        value: Value,
    ) -> Result<NodeId, AddressSpaceError> {
        self.insert(requested, parent, name, NodeKind::Static(value))
    }

    /// Register a variable node backed by a data source.
    ///
    /// The source serves every read of the node with a fresh value;
    /// writes reach it only if it declares itself writable.
    ///
    /// # Errors
    /// Returns an error if the parent is unknown or the identifier is
    /// taken.
    pub fn add_data_source_node(
        &mut self,
        requested: Option<NodeId>,
        parent: &NodeId,
        name: &str,
        source: Box<dyn DataSource>,
    ) -> Result<NodeId, AddressSpaceError> {
        self.insert(requested, parent, name, NodeKind::Source(source))
    }

    fn insert(
        &mut self,
        requested: Option<NodeId>,
        parent: &NodeId,
        name: &str,
        kind: NodeKind,
    ) -> Result<NodeId, AddressSpaceError> {
        if !self.nodes.contains_key(parent) {
            return Err(AddressSpaceError::UnknownParent(parent.clone()));
        }
        let id = match requested {
            Some(id) => {
                if self.nodes.contains_key(&id) {
                    return Err(AddressSpaceError::DuplicateNodeId(id));
                }
                id
            }
            None => self.assign_id(),
        };
        self.nodes.insert(
            id.clone(),
            Node {
                browse_name: name.to_string(),
                parent: Some(parent.clone()),
                kind,
            },
        );
        Ok(id)
    }

    fn assign_id(&mut self) -> NodeId {
        loop {
            let id = NodeId::numeric(1, self.next_id);
            self.next_id += 1;
            if !self.nodes.contains_key(&id) {
                return id;
            }
        }
    }

    /// Serve a read request against a node.
    ///
    /// Always returns a well-formed envelope; unknown nodes and
    /// value-less nodes are reported on its status.
    pub fn read(
        &self,
        node: &NodeId,
        wants_source_timestamp: bool,
        range: Option<NumericRange>,
    ) -> DataValue {
        let Some(n) = self.nodes.get(node) else {
            return DataValue::rejected(StatusCode::BadNodeIdUnknown);
        };
        match &n.kind {
            NodeKind::Source(source) => source.read(&ReadRequest {
                node: node.clone(),
                wants_source_timestamp,
                range,
            }),
            NodeKind::Static(value) => {
                if range.is_some() {
                    return DataValue::rejected(StatusCode::BadIndexRangeInvalid);
                }
                DataValue::new(value.clone())
            }
            NodeKind::Object => DataValue::rejected(StatusCode::BadNotReadable),
        }
    }

    /// Serve a write request against a node.
    ///
    /// Writes reach a data source only when it declares itself writable;
    /// everything else is rejected here, upstream of the binding.
    pub fn write(
        &self,
        node: &NodeId,
        value: Option<Value>,
        range: Option<NumericRange>,
    ) -> StatusCode {
        let Some(n) = self.nodes.get(node) else {
            return StatusCode::BadNodeIdUnknown;
        };
        match &n.kind {
            NodeKind::Source(source) if source.writable() => source.write(&WriteRequest {
                node: node.clone(),
                value,
                range,
            }),
            _ => StatusCode::BadNotWritable,
        }
    }
}

impl Default for AddressSpace {
    fn default() -> Self {
        Self::new()
    }
}
