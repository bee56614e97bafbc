//! Trivial Graph Format: a vertex section, a `#` separator line, then an
//! edge section. `id name` per vertex line; `src tgt [label]` per edge line.

use std::collections::HashSet;

use indexmap::IndexMap;
use itertools::Itertools;

use super::{Codec, CodecError, RawEdge, RawVertex};
use crate::graph::{Edge, Vertex};
use crate::ids::{EdgeId, VertexId};

pub struct Tgf;

impl Codec for Tgf {
	fn deserialize(&self, data: &[u8]) -> Result<(Vec<RawVertex>, Vec<RawEdge>), CodecError> {
		let text = std::str::from_utf8(data)?;
		let (vert_section, edge_section) =
			text.split_once("\n#\n").ok_or_else(|| CodecError::Parse("missing '#' section separator".into()))?;

		let verts: Vec<RawVertex> = vert_section
			.lines()
			.filter(|l| !l.is_empty())
			.map(|line| {
				let mut it = line.splitn(2, char::is_whitespace);
				let id = it.next().unwrap_or_default().to_string();
				let name = it.next().unwrap_or_default().trim().to_string();
				(id, name)
			})
			.collect();

		let edges: Vec<RawEdge> = edge_section
			.lines()
			.filter(|l| !l.is_empty())
			.enumerate()
			.map(|(i, line)| {
				let mut it = line.splitn(3, char::is_whitespace);
				let src = it.next().unwrap_or_default().to_string();
				let tgt = it.next().unwrap_or_default().to_string();
				let label = it.next().unwrap_or_default().trim().to_string();
				(format!("e{}", i), label, src, tgt)
			})
			.collect();

		Ok((verts, edges))
	}

	fn serialize(
		&self,
		vertices: &IndexMap<VertexId, Vertex>,
		edges: &IndexMap<EdgeId, Edge>,
		_name: &str,
		_highlight: &HashSet<String>,
	) -> Result<Vec<u8>, CodecError> {
		let mut s = String::new();
		for v in vertices.values().sorted_by_key(|v| &v.id) {
			s += &format!("{} {}\n", v.id, v.name);
		}
		s += "#\n";
		for e in edges.values().sorted_by_key(|e| &e.id) {
			s += &format!("{} {} {}\n", e.src, e.tgt, e.name);
		}
		Ok(s.into_bytes())
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn parses_vertex_and_edge_sections() {
		let data = b"1 Start\n2 Running\n#\n1 2 go\n";
		let (verts, edges) = Tgf.deserialize(data).unwrap();
		assert_eq!(verts, vec![("1".to_string(), "Start".to_string()), ("2".to_string(), "Running".to_string())]);
		assert_eq!(edges, vec![("e0".to_string(), "go".to_string(), "1".to_string(), "2".to_string())]);
	}
}
