//! Plain text codec: a whitespace-separated list of vertex names (with
//! `#`/`//` line comments and `/* ... */` block comments stripped) describing
//! a single chain, starting implicitly from `Start` if not named explicitly.

use std::collections::HashSet;

use indexmap::IndexMap;
use itertools::Itertools;

use super::{Codec, CodecError, RawEdge, RawVertex};
use crate::graph::{Edge, Vertex};
use crate::ids::{EdgeId, VertexId};

pub struct Txt;

fn strip_comments(s: &str) -> String {
	let mut out = String::with_capacity(s.len());
	let chars: Vec<char> = s.chars().collect();
	let mut i = 0;
	while i < chars.len() {
		if chars[i] == '#' || (chars[i] == '/' && chars.get(i + 1) == Some(&'/')) {
			while i < chars.len() && chars[i] != '\n' {
				i += 1;
			}
		} else if chars[i] == '/' && chars.get(i + 1) == Some(&'*') {
			i += 2;
			while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
				i += 1;
			}
			i = (i + 2).min(chars.len());
			out.push(' ');
		} else {
			out.push(chars[i]);
			i += 1;
		}
	}
	out
}

impl Codec for Txt {
	fn deserialize(&self, data: &[u8]) -> Result<(Vec<RawVertex>, Vec<RawEdge>), CodecError> {
		let text = std::str::from_utf8(data)?;
		let cleaned = strip_comments(text);
		let mut names: Vec<&str> = cleaned.split_whitespace().collect();
		if names.first() != Some(&"Start") {
			names.insert(0, "Start");
		}

		let verts: Vec<RawVertex> = names.iter().enumerate().map(|(i, name)| (format!("v{}", i), name.to_string())).collect();
		let edges: Vec<RawEdge> =
			(0..names.len().saturating_sub(1)).map(|i| (format!("e{}", i), String::new(), format!("v{}", i), format!("v{}", i + 1))).collect();

		Ok((verts, edges))
	}

	fn serialize(
		&self,
		vertices: &IndexMap<VertexId, Vertex>,
		_edges: &IndexMap<EdgeId, Edge>,
		_name: &str,
		_highlight: &HashSet<String>,
	) -> Result<Vec<u8>, CodecError> {
		let s = vertices.values().sorted_by_key(|v| &v.id).map(|v| v.name.as_str()).join(" ");
		Ok(s.into_bytes())
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn inserts_implicit_start() {
		let (verts, edges) = Txt.deserialize(b"Login Logout").unwrap();
		assert_eq!(verts.iter().map(|(_, n)| n.as_str()).collect::<Vec<_>>(), vec!["Start", "Login", "Logout"]);
		assert_eq!(edges.len(), 2);
	}

	#[test]
	fn strips_comments() {
		let (verts, _) = Txt.deserialize(b"Start # a comment\nLogin // another\n/* skip this */ Logout").unwrap();
		assert_eq!(verts.iter().map(|(_, n)| n.as_str()).collect::<Vec<_>>(), vec!["Start", "Login", "Logout"]);
	}
}
