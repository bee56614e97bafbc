//! Graphviz DOT codec.
//!
//! Handles the constrained subset actually produced by [`Dot::serialize`]
//! and consumed in practice: a single `digraph`/`graph` block, one
//! statement per line, `"id" [label="...", ...];` node statements and
//! `"a" -> "b" [label="...", ...];` / `"a" -- "b" [...]` edge statements.

use std::collections::HashSet;

use indexmap::IndexMap;
use itertools::Itertools;

use super::{quote, unquote, Codec, CodecError, RawEdge, RawVertex};
use crate::graph::{Edge, Vertex};
use crate::ids::{EdgeId, VertexId};

pub struct Dot;

#[derive(Debug, PartialEq, Eq, Clone)]
enum Tok {
	Id(String),
	Arrow,
	DashDash,
	LBrace,
	RBrace,
	LBracket,
	RBracket,
	Eq,
	Semi,
	Comma,
}

fn tokenize(s: &str) -> Vec<Tok> {
	let mut toks = Vec::new();
	let chars: Vec<char> = s.chars().collect();
	let mut i = 0;
	while i < chars.len() {
		let c = chars[i];
		match c {
			' ' | '\t' | '\r' | '\n' => i += 1,
			'{' => {
				toks.push(Tok::LBrace);
				i += 1;
			}
			'}' => {
				toks.push(Tok::RBrace);
				i += 1;
			}
			'[' => {
				toks.push(Tok::LBracket);
				i += 1;
			}
			']' => {
				toks.push(Tok::RBracket);
				i += 1;
			}
			'=' => {
				toks.push(Tok::Eq);
				i += 1;
			}
			';' => {
				toks.push(Tok::Semi);
				i += 1;
			}
			',' => {
				toks.push(Tok::Comma);
				i += 1;
			}
			'-' if chars.get(i + 1) == Some(&'>') => {
				toks.push(Tok::Arrow);
				i += 2;
			}
			'-' if chars.get(i + 1) == Some(&'-') => {
				toks.push(Tok::DashDash);
				i += 2;
			}
			'"' => {
				let start = i;
				i += 1;
				while i < chars.len() && chars[i] != '"' {
					i += 1;
				}
				i += 1;
				let raw: String = chars[start..i.min(chars.len())].iter().collect();
				toks.push(Tok::Id(unquote(&raw).to_string()));
			}
			_ => {
				let start = i;
				while i < chars.len() && !" \t\r\n{}[]=;,".contains(chars[i]) && !(chars[i] == '-' && matches!(chars.get(i + 1), Some('>') | Some('-'))) {
					i += 1;
				}
				if i == start {
					i += 1;
				} else {
					toks.push(Tok::Id(chars[start..i].iter().collect()));
				}
			}
		}
	}
	toks
}

fn parse_attrs(toks: &[Tok], i: &mut usize) -> IndexMap<String, String> {
	let mut attrs = IndexMap::new();
	if toks.get(*i) != Some(&Tok::LBracket) {
		return attrs;
	}
	*i += 1;
	while *i < toks.len() && toks[*i] != Tok::RBracket {
		if let Tok::Id(key) = &toks[*i] {
			let key = key.clone();
			*i += 1;
			if toks.get(*i) == Some(&Tok::Eq) {
				*i += 1;
				if let Some(Tok::Id(val)) = toks.get(*i) {
					attrs.insert(key, val.clone());
					*i += 1;
				}
			}
		} else {
			*i += 1;
		}
		if toks.get(*i) == Some(&Tok::Comma) {
			*i += 1;
		}
	}
	if toks.get(*i) == Some(&Tok::RBracket) {
		*i += 1;
	}
	attrs
}

impl Codec for Dot {
	fn deserialize(&self, data: &[u8]) -> Result<(Vec<RawVertex>, Vec<RawEdge>), CodecError> {
		let text = std::str::from_utf8(data)?;
		let toks = tokenize(text);
		let mut i = 0;

		// skip `[ "strict" ] ( "graph" | "digraph" ) [ name ] "{"`
		// whether the graph block itself says "graph" or "digraph" doesn't
		// change how we read it: each edge statement carries its own `->`
		// or `--` operator, which is what actually decides directedness.
		while i < toks.len() {
			match &toks[i] {
				Tok::Id(w) if w.eq_ignore_ascii_case("strict") => i += 1,
				Tok::Id(w) if w.eq_ignore_ascii_case("graph") || w.eq_ignore_ascii_case("digraph") => {
					i += 1;
					break;
				}
				_ => return Err(CodecError::Parse("expected 'graph' or 'digraph'".into())),
			}
		}
		if let Some(Tok::Id(_)) = toks.get(i) {
			i += 1;
		}
		if toks.get(i) != Some(&Tok::LBrace) {
			return Err(CodecError::Parse("expected '{'".into()));
		}
		i += 1;

		let mut verts = Vec::new();
		let mut edges = Vec::new();
		let mut next_edge_seq = 0usize;

		while i < toks.len() && toks[i] != Tok::RBrace {
			let a = match &toks[i] {
				Tok::Id(a) => a.clone(),
				_ => {
					i += 1;
					continue;
				}
			};
			i += 1;

			if toks.get(i) == Some(&Tok::Arrow) || toks.get(i) == Some(&Tok::DashDash) {
				let directed_edge = toks[i] == Tok::Arrow;
				i += 1;
				let b = match toks.get(i) {
					Some(Tok::Id(b)) => b.clone(),
					_ => return Err(CodecError::Parse("expected edge target".into())),
				};
				i += 1;
				let attrs = parse_attrs(&toks, &mut i);
				let label = attrs.get("label").cloned().unwrap_or_default();
				let eid = format!("e{}", next_edge_seq);
				next_edge_seq += 1;
				edges.push((eid, label.clone(), a.clone(), b.clone()));
				if !directed_edge {
					let eid = format!("e{}", next_edge_seq);
					next_edge_seq += 1;
					edges.push((eid, label, b, a));
				}
			} else {
				let attrs = parse_attrs(&toks, &mut i);
				if !matches!(a.as_str(), "graph" | "node" | "edge") {
					let label = attrs.get("label").cloned().unwrap_or_else(|| a.clone());
					verts.push((a, label));
				}
			}

			if toks.get(i) == Some(&Tok::Semi) {
				i += 1;
			}
		}

		Ok((verts, edges))
	}

	fn serialize(
		&self,
		vertices: &IndexMap<VertexId, Vertex>,
		edges: &IndexMap<EdgeId, Edge>,
		name: &str,
		highlight: &HashSet<String>,
	) -> Result<Vec<u8>, CodecError> {
		let highlight_attrs = ",color=red,fontcolor=red,style=filled,fillcolor=\"#ffeeee\"";
		let mut s = format!("digraph {} {{\n", quote(name));

		let vs = vertices.values().sorted_by_key(|v| &v.id);
		for v in vs {
			let extra = if highlight.contains(v.id.as_ref()) { highlight_attrs } else { "" };
			s += &format!("  {} [label={}{}];\n", quote(&v.id), quote(&v.name), extra);
		}

		s += "\n";

		let es = edges.values().sorted_by_key(|e| &e.id);
		for e in es {
			let extra = if highlight.contains(e.id.as_ref()) { highlight_attrs } else { "" };
			s += &format!("  {} -> {} [label={}{}];\n", quote(&e.src), quote(&e.tgt), quote(&e.name), extra);
		}

		s += "}\n";
		Ok(s.into_bytes())
	}
}
