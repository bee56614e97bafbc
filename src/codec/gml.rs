//! GML (Graph Modelling Language) codec.
//!
//! Implements the constrained grammar actually needed here: a top-level
//! `graph [ ... ]` block containing `node [ id ... label ... ]` and
//! `edge [ source ... target ... label ... ]` entries. Comments starting
//! with `#` run to end of line.

use std::collections::HashSet;

use indexmap::IndexMap;
use itertools::Itertools;

use super::{Codec, CodecError, RawEdge, RawVertex};
use crate::graph::{Edge, Vertex};
use crate::ids::{EdgeId, VertexId};

pub struct Gml;

#[derive(Debug, Clone, PartialEq)]
enum Tok {
	Key(String),
	Str(String),
	Num(String),
	LBracket,
	RBracket,
}

fn strip_comments(s: &str) -> String {
	let mut out = String::with_capacity(s.len());
	let mut chars = s.chars().peekable();
	let mut in_comment = false;
	while let Some(c) = chars.next() {
		if in_comment {
			if c == '\n' {
				in_comment = false;
				out.push(c);
			}
			continue;
		}
		if c == '#' {
			in_comment = true;
			continue;
		}
		out.push(c);
	}
	out
}

fn tokenize(s: &str) -> Vec<Tok> {
	let cleaned = strip_comments(s);
	let chars: Vec<char> = cleaned.chars().collect();
	let mut toks = Vec::new();
	let mut i = 0;
	while i < chars.len() {
		let c = chars[i];
		match c {
			' ' | '\t' | '\r' | '\n' => i += 1,
			'[' => {
				toks.push(Tok::LBracket);
				i += 1;
			}
			']' => {
				toks.push(Tok::RBracket);
				i += 1;
			}
			'"' => {
				let start = i + 1;
				i += 1;
				while i < chars.len() && chars[i] != '"' {
					i += 1;
				}
				toks.push(Tok::Str(chars[start..i].iter().collect()));
				i += 1;
			}
			_ => {
				let start = i;
				while i < chars.len() && !chars[i].is_whitespace() && chars[i] != '[' && chars[i] != ']' {
					i += 1;
				}
				let word: String = chars[start..i].iter().collect();
				if word.chars().next().map_or(false, |c| c.is_ascii_digit() || c == '-' || c == '+') {
					toks.push(Tok::Num(word));
				} else {
					toks.push(Tok::Key(word));
				}
			}
		}
	}
	toks
}

/// One parsed `key value` pair; `value` is `None` for nested `[ ... ]` blocks
/// (their contents are parsed separately by the caller).
struct Entry {
	key: String,
	text: Option<String>,
	block_start: Option<usize>,
	block_end: Option<usize>,
}

/// Finds the matching `]` for the `[` at `toks[open]`.
fn find_block_end(toks: &[Tok], open: usize) -> usize {
	let mut depth = 0;
	for (i, t) in toks.iter().enumerate().skip(open) {
		match t {
			Tok::LBracket => depth += 1,
			Tok::RBracket => {
				depth -= 1;
				if depth == 0 {
					return i;
				}
			}
			_ => {}
		}
	}
	toks.len().saturating_sub(1)
}

fn parse_entries(toks: &[Tok], start: usize, end: usize) -> Vec<Entry> {
	let mut entries = Vec::new();
	let mut i = start;
	while i < end {
		if let Tok::Key(key) = &toks[i] {
			let key = key.clone();
			i += 1;
			match toks.get(i) {
				Some(Tok::LBracket) => {
					let block_end = find_block_end(toks, i);
					entries.push(Entry { key, text: None, block_start: Some(i + 1), block_end: Some(block_end) });
					i = block_end + 1;
				}
				Some(Tok::Str(s)) => {
					entries.push(Entry { key, text: Some(s.clone()), block_start: None, block_end: None });
					i += 1;
				}
				Some(Tok::Num(n)) => {
					entries.push(Entry { key, text: Some(n.clone()), block_start: None, block_end: None });
					i += 1;
				}
				_ => i += 1,
			}
		} else {
			i += 1;
		}
	}
	entries
}

impl Codec for Gml {
	fn deserialize(&self, data: &[u8]) -> Result<(Vec<RawVertex>, Vec<RawEdge>), CodecError> {
		let text = std::str::from_utf8(data)?;
		let toks = tokenize(text);

		let top = parse_entries(&toks, 0, toks.len());
		let graph = top
			.iter()
			.find(|e| e.key.eq_ignore_ascii_case("graph"))
			.ok_or_else(|| CodecError::Parse("no top-level 'graph' block".into()))?;
		let (gs, ge) = (graph.block_start.unwrap(), graph.block_end.unwrap());
		let fields = parse_entries(&toks, gs, ge);

		let mut verts = Vec::new();
		let mut edges = Vec::new();
		let mut serial = 0usize;

		for f in &fields {
			if f.key.eq_ignore_ascii_case("node") {
				let (bs, be) = (f.block_start.unwrap(), f.block_end.unwrap());
				let node_fields = parse_entries(&toks, bs, be);
				let id = node_fields.iter().find(|e| e.key.eq_ignore_ascii_case("id")).and_then(|e| e.text.clone());
				let label = node_fields.iter().find(|e| e.key.eq_ignore_ascii_case("label")).and_then(|e| e.text.clone());
				let id = id.ok_or_else(|| CodecError::Parse("node missing id".into()))?;
				verts.push((id.clone(), label.unwrap_or(id)));
			} else if f.key.eq_ignore_ascii_case("edge") {
				let (bs, be) = (f.block_start.unwrap(), f.block_end.unwrap());
				let edge_fields = parse_entries(&toks, bs, be);
				let label = edge_fields.iter().find(|e| e.key.eq_ignore_ascii_case("label")).and_then(|e| e.text.clone());
				let src = edge_fields.iter().find(|e| e.key.eq_ignore_ascii_case("source")).and_then(|e| e.text.clone());
				let tgt = edge_fields.iter().find(|e| e.key.eq_ignore_ascii_case("target")).and_then(|e| e.text.clone());
				let src = src.ok_or_else(|| CodecError::Parse("edge missing source".into()))?;
				let tgt = tgt.ok_or_else(|| CodecError::Parse("edge missing target".into()))?;
				edges.push((format!("e{}", serial), label.unwrap_or_default(), src, tgt));
				serial += 1;
			}
		}

		Ok((verts, edges))
	}

	fn serialize(
		&self,
		vertices: &IndexMap<VertexId, Vertex>,
		edges: &IndexMap<EdgeId, Edge>,
		_name: &str,
		_highlight: &HashSet<String>,
	) -> Result<Vec<u8>, CodecError> {
		let mut s = String::from("graph [\n");
		for v in vertices.values().sorted_by_key(|v| &v.id) {
			s += &format!("  node [ id \"{}\" label \"{}\" ]\n", v.id, v.name.replace('"', "'"));
		}
		for e in edges.values().sorted_by_key(|e| &e.id) {
			s += &format!("  edge [ source \"{}\" target \"{}\" label \"{}\" ]\n", e.src, e.tgt, e.name.replace('"', "'"));
		}
		s += "]\n";
		Ok(s.into_bytes())
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn parses_nodes_and_edges() {
		let data = br#"
graph [
  node [ id 1 label "Start" ]
  node [ id 2 label "Running" ]
  edge [ source 1 target 2 label "go" ]
]
"#;
		let (verts, edges) = Gml.deserialize(data).unwrap();
		assert_eq!(verts, vec![("1".to_string(), "Start".to_string()), ("2".to_string(), "Running".to_string())]);
		assert_eq!(edges, vec![("e0".to_string(), "go".to_string(), "1".to_string(), "2".to_string())]);
	}

	#[test]
	fn node_without_label_uses_id() {
		let data = br#"graph [ node [ id 7 ] ]"#;
		let (verts, _) = Gml.deserialize(data).unwrap();
		assert_eq!(verts, vec![("7".to_string(), "7".to_string())]);
	}
}
