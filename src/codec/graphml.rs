//! GraphML codec (the yFiles-flavored dialect): `node`/`edge` elements carry
//! their text in a nested `NodeLabel`/`EdgeLabel` element rather than as an
//! attribute. Nodes without a label are skipped; edges without one get an
//! empty name.

use std::collections::HashSet;

use indexmap::IndexMap;
use itertools::Itertools;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::{Codec, CodecError, RawEdge, RawVertex};
use crate::graph::{Edge, Vertex};
use crate::ids::{EdgeId, VertexId};

pub struct GraphMl;

fn local_name(e: &BytesStart) -> String {
	let name = e.name();
	let full = String::from_utf8_lossy(name.as_ref()).into_owned();
	full.rsplit(':').next().unwrap_or(&full).to_string()
}

fn attr(e: &BytesStart, key: &str) -> Option<String> {
	e.attributes().filter_map(Result::ok).find(|a| a.key.as_ref() == key.as_bytes()).map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

#[derive(Default)]
struct Current {
	id: Option<String>,
	source: Option<String>,
	target: Option<String>,
	label: Option<String>,
}

impl Codec for GraphMl {
	fn deserialize(&self, data: &[u8]) -> Result<(Vec<RawVertex>, Vec<RawEdge>), CodecError> {
		let text = std::str::from_utf8(data)?;
		let mut reader = Reader::from_str(text);
		reader.trim_text(true);

		let mut verts = Vec::new();
		let mut edges = Vec::new();
		let mut stack: Vec<String> = Vec::new();
		let mut cur: Option<Current> = None;
		let mut in_label = false;
		let mut buf = Vec::new();

		loop {
			match reader.read_event(&mut buf).map_err(|e| CodecError::Parse(e.to_string()))? {
				Event::Eof => break,
				Event::Start(e) => {
					let name = local_name(&e);
					match name.as_str() {
						"node" => cur = Some(Current { id: attr(&e, "id"), ..Default::default() }),
						"edge" => {
							cur = Some(Current { id: attr(&e, "id"), source: attr(&e, "source"), target: attr(&e, "target"), ..Default::default() })
						}
						"NodeLabel" | "EdgeLabel" => in_label = true,
						_ => {}
					}
					stack.push(name);
				}
				Event::Empty(e) => {
					let name = local_name(&e);
					if name == "node" {
						verts.push((attr(&e, "id").unwrap_or_default(), String::new()));
					} else if name == "edge" {
						edges.push((
							attr(&e, "id").unwrap_or_default(),
							String::new(),
							attr(&e, "source").unwrap_or_default(),
							attr(&e, "target").unwrap_or_default(),
						));
					}
				}
				Event::Text(t) if in_label => {
					if let Some(c) = cur.as_mut() {
						let unescaped = t.unescaped().map_err(|e| CodecError::Parse(e.to_string()))?;
						let unescaped_str = std::str::from_utf8(&unescaped).map_err(|e| CodecError::Parse(e.to_string()))?;
						c.label = Some(unescaped_str.trim().to_string());
					}
				}
				Event::End(_) => {
					let name = stack.pop().unwrap_or_default();
					match name.as_str() {
						"NodeLabel" | "EdgeLabel" => in_label = false,
						"node" => {
							if let Some(c) = cur.take() {
								if let (Some(id), Some(label)) = (c.id, c.label) {
									verts.push((id, label));
								}
							}
						}
						"edge" => {
							if let Some(c) = cur.take() {
								if let (Some(id), Some(src), Some(tgt)) = (c.id, c.source, c.target) {
									edges.push((id, c.label.unwrap_or_default(), src, tgt));
								}
							}
						}
						_ => {}
					}
				}
				_ => {}
			}
			buf.clear();
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
		let mut s = String::new();
		s += "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";
		s += "<graphml xmlns=\"http://graphml.graphdrawing.org/xmlns\" xmlns:y=\"http://www.yworks.com/xml/graphml\">\n";
		s += "<graph edgedefault=\"directed\">\n";

		for v in vertices.values().sorted_by_key(|v| &v.id) {
			s += &format!(
				"  <node id=\"{}\"><data><y:ShapeNode><y:NodeLabel>{}</y:NodeLabel></y:ShapeNode></data></node>\n",
				v.id,
				escape(&v.name)
			);
		}

		for e in edges.values().sorted_by_key(|e| &e.id) {
			s += &format!(
				"  <edge id=\"{}\" source=\"{}\" target=\"{}\"><data><y:PolyLineEdge><y:EdgeLabel>{}</y:EdgeLabel></y:PolyLineEdge></data></edge>\n",
				e.id,
				e.src,
				e.tgt,
				escape(&e.name)
			);
		}

		s += "</graph>\n</graphml>\n";
		Ok(s.into_bytes())
	}
}

fn escape(s: &str) -> String {
	s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
