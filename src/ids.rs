//! Lightweight identifiers and label parsing shared by the graph model.

use std::sync::Arc;

use indexmap::IndexMap;

/// A vertex identifier, opaque and unique within a [`crate::graph::Graph`].
pub type VertexId = Arc<str>;
/// An edge identifier, opaque and unique within a [`crate::graph::Graph`]
/// (and across the union of vertex and edge ids, see the Graph invariants).
pub type EdgeId = Arc<str>;

/// A value carried by a vertex or edge's `extras` mapping.
///
/// `BLOCKED` and bare `key` lines parse to `Bool(true)`; `key=value` lines
/// parse to `Text(value)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExtraValue {
	Bool(bool),
	Text(String),
}

impl ExtraValue {
	pub fn is_truthy(&self) -> bool {
		match self {
			ExtraValue::Bool(b) => *b,
			ExtraValue::Text(s) => !s.is_empty(),
		}
	}

	pub fn as_text(&self) -> Option<&str> {
		match self {
			ExtraValue::Text(s) => Some(s),
			ExtraValue::Bool(_) => None,
		}
	}
}

pub type Extras = IndexMap<String, ExtraValue>;

/// Parses a label of the form `first_line\nkey[=value]\n...` into a name and
/// an insertion-ordered extras mapping, per the label grammar.
pub fn parse_label(raw: &str) -> (String, Extras) {
	let mut lines = raw.split('\n');
	let name = lines.next().unwrap_or("").to_string();
	let mut extras = Extras::new();

	for line in lines {
		let line = line.trim_end_matches('\r');
		if let Some(eq) = line.find('=') {
			let key = line[..eq].trim().to_string();
			let value = line[eq + 1..].trim().to_string();
			extras.insert(key, ExtraValue::Text(value));
		} else {
			let key = line.trim();
			if !key.is_empty() {
				extras.insert(key.to_string(), ExtraValue::Bool(true));
			}
		}
	}

	(name, extras)
}

pub fn is_blocked(extras: &Extras) -> bool {
	extras.get("BLOCKED").map_or(false, ExtraValue::is_truthy)
}
