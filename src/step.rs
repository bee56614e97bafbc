//! The step type planners emit and the executor/halt conditions consume.

use serde::Serialize;

use crate::graph::{Edge, Vertex};
use crate::ids::{EdgeId, VertexId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
	Vertex,
	Edge,
	/// Injected by the Interactive planner's `f` command; never backed by a
	/// real graph id, and exempt from "every step id is a real graph id"
	/// (see property 6 in spec.md §8).
	Synthetic,
}

/// One vertex or edge visited by a planner.
///
/// `id` is the vertex or edge id (or, for synthetic steps, the injected
/// word itself); `label` is the name used both for dispatch and for
/// progress reporting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Step {
	pub id: VertexId,
	pub label: String,
	pub kind: StepKind,
}

impl Step {
	pub fn from_vertex(v: &Vertex) -> Self {
		Step { id: v.id.clone(), label: v.name.clone(), kind: StepKind::Vertex }
	}

	pub fn from_edge(e: &Edge) -> Self {
		Step { id: e.id.clone(), label: e.name.clone(), kind: StepKind::Edge }
	}

	pub fn synthetic(word: &str) -> Self {
		Step { id: EdgeId::from(word), label: word.to_string(), kind: StepKind::Synthetic }
	}

	pub fn is_empty_label(&self) -> bool {
		self.label.is_empty()
	}
}
