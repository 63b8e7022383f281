//! Scalar values, result envelopes and request types.
//!
//! This module defines the data structures exchanged between the
//! address space and its data sources:
//! - `Value` - Typed scalar produced fresh on every read
//! - `DataValue` - Read result envelope (value + status + timestamp)
//! - `ReadRequest` / `WriteRequest` - Dispatch parameters
//! - `NodeId` - Address-space node identifier
//! - `NumericRange` - Requested sub-range of an array/string value

use std::fmt;
use std::time::SystemTime;

use crate::status::StatusCode;

/// A typed scalar value.
///
/// Values are constructed fresh on every read and never aliased across
/// calls; a `DataValue` owns its payload outright.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A point in time.
    DateTime(SystemTime),
    /// A 64-bit floating point value.
    Double(f64),
    /// A boolean value.
    Boolean(bool),
    /// A signed 32-bit integer.
    Int32(i32),
}

impl Value {
    /// Name of the scalar kind, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DateTime(_) => "DateTime",
            Self::Double(_) => "Double",
            Self::Boolean(_) => "Boolean",
            Self::Int32(_) => "Int32",
        }
    }
}

/// Result envelope for a read operation.
///
/// A well-formed envelope is returned even when the read is rejected:
/// the status carries the rejection and the payload stays empty.
#[derive(Debug, Clone, Default)]
pub struct DataValue {
    /// The value read, absent when the read was rejected.
    pub value: Option<Value>,
    /// Outcome of the read.
    pub status: StatusCode,
    /// When the underlying value was sampled. Only populated when the
    /// request asked for it.
    pub source_timestamp: Option<SystemTime>,
}

impl DataValue {
    /// Envelope carrying a successfully read value.
    pub fn new(value: Value) -> Self {
        Self {
            value: Some(value),
            status: StatusCode::Good,
            source_timestamp: None,
        }
    }

    /// Empty envelope carrying only a rejection status.
    pub fn rejected(status: StatusCode) -> Self {
        Self {
            value: None,
            status,
            source_timestamp: None,
        }
    }

    /// Attach a source timestamp to the envelope.
    pub fn with_source_timestamp(mut self, ts: SystemTime) -> Self {
        self.source_timestamp = Some(ts);
        self
    }
}

/// Identifier of a node in the address space.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeId {
    /// Numeric identifier within a namespace.
    Numeric {
        /// Namespace index.
        ns: u16,
        /// Identifier value.
        id: u32,
    },
    /// String identifier within a namespace.
    String {
        /// Namespace index.
        ns: u16,
        /// Identifier value.
        id: String,
    },
}

impl NodeId {
    /// Numeric identifier in namespace `ns`.
    pub fn numeric(ns: u16, id: u32) -> Self {
        Self::Numeric { ns, id }
    }

    /// String identifier in namespace `ns`.
    pub fn string(ns: u16, id: impl Into<String>) -> Self {
        Self::String { ns, id: id.into() }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric { ns, id } => write!(f, "ns={ns};i={id}"),
            Self::String { ns, id } => write!(f, "ns={ns};s={id}"),
        }
    }
}

/// Requested sub-range of an array or string value.
///
/// Carried as parsed `(low, high)` bounds per dimension. None of the
/// hardware-backed sources serve partitioned values, so in practice only
/// the presence of a range is ever inspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumericRange {
    /// Inclusive bounds per dimension.
    pub dimensions: Vec<(u32, u32)>,
}

impl NumericRange {
    /// Range over a single dimension.
    pub fn new(low: u32, high: u32) -> Self {
        Self {
            dimensions: vec![(low, high)],
        }
    }
}

/// Parameters of a read dispatched to a data source.
#[derive(Debug, Clone)]
pub struct ReadRequest {
    /// Target node.
    pub node: NodeId,
    /// Whether the caller wants a source timestamp on the result.
    pub wants_source_timestamp: bool,
    /// Requested sub-range, if any.
    pub range: Option<NumericRange>,
}

impl ReadRequest {
    /// Whole-value read of `node` without a source timestamp.
    pub fn new(node: NodeId) -> Self {
        Self {
            node,
            wants_source_timestamp: false,
            range: None,
        }
    }

    /// Request a source timestamp on the result.
    pub fn with_source_timestamp(mut self) -> Self {
        self.wants_source_timestamp = true;
        self
    }

    /// Restrict the read to a sub-range.
    pub fn with_range(mut self, range: NumericRange) -> Self {
        self.range = Some(range);
        self
    }
}

/// Parameters of a write dispatched to a data source.
#[derive(Debug, Clone)]
pub struct WriteRequest {
    /// Target node.
    pub node: NodeId,
    /// New value. A write with no payload is accepted as a no-op.
    pub value: Option<Value>,
    /// Requested sub-range, if any.
    pub range: Option<NumericRange>,
}

impl WriteRequest {
    /// Whole-value write of `value` to `node`.
    pub fn new(node: NodeId, value: Value) -> Self {
        Self {
            node,
            value: Some(value),
            range: None,
        }
    }

    /// Write carrying no payload.
    pub fn empty(node: NodeId) -> Self {
        Self {
            node,
            value: None,
            range: None,
        }
    }

    /// Restrict the write to a sub-range.
    pub fn with_range(mut self, range: NumericRange) -> Self {
        self.range = Some(range);
        self
    }
}
