//! The crate's error taxonomy, grounded on spec.md §7.
//!
//! Each variant corresponds to one of the internal error kinds the engine
//! distinguishes: bad input graphs, unresolved start vertices, failure to
//! Eulerize/traverse an Euler trail, actor failures routed through the
//! executor, and malformed plugin specs at the driver boundary.

use thiserror::Error;

use crate::codec::CodecError;

#[derive(Debug, Error)]
pub enum GraphError {
	#[error("dangling edge {edge:?}: endpoint {endpoint:?} is not a vertex in this graph")]
	DanglingEndpoint { edge: String, endpoint: String },
	#[error("duplicate id {0:?} appears in both vertex and edge id spaces")]
	DuplicateId(String),
	#[error("sanity check failed: edge {edge:?} missing from outgoing/incoming view of its endpoints")]
	BrokenAdjacency { edge: String },
	#[error("attempt to duplicate a non-existing edge between {0:?} and {1:?}")]
	NoSuchEdgeBetween(String, String),
}

#[derive(Debug, Error)]
pub enum ActorError {
	#[error("no dispatch target for method {0:?}")]
	NoSuchMethod(String),
	#[error("actor method {method:?} failed: {reason}")]
	Failed { method: String, reason: String },
}

#[derive(Debug, Error)]
pub enum GraphWalkerError {
	#[error("bad graph: {0}")]
	BadGraph(#[from] GraphError),
	#[error("start vertex {0:?} not found")]
	StartNotFound(String),
	#[error("graph has sinks and cannot be made eulerian")]
	NotEulerizable,
	#[error("graph is not eulerian")]
	NotEulerian,
	#[error("graph is not connected")]
	NotConnected,
	#[error("actor failure: {0}")]
	Actor(#[from] ActorError),
	#[error("bad plugin spec: {0}")]
	BadSpec(String),
	#[error("codec error: {0}")]
	Codec(#[from] CodecError),
	#[error("io error: {0}")]
	Io(#[from] std::io::Error),
}
