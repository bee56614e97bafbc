//! File format codecs: each translates between bytes on disk and the
//! `(vertices, edges)` tuples [`crate::graph::Graph::build`] consumes, plus
//! the reverse direction used by [`crate::graph::Graph::write`].
//!
//! A codec is picked by file extension (spec.md §5); the registry below is
//! the Rust analogue of the original's `get_codec` extension dispatch.

mod dot;
mod gml;
mod graphml;
mod tgf;
mod txt;

use std::collections::HashSet;
use std::path::Path;

use indexmap::IndexMap;
use thiserror::Error;

use crate::graph::{Edge, Vertex};
use crate::ids::{EdgeId, VertexId};

pub type RawVertex = (String, String);
pub type RawEdge = (String, String, String, String);

#[derive(Debug, Error)]
pub enum CodecError {
	#[error("no codec registered for file extension {0:?}")]
	UnknownExtension(String),
	#[error("path has no file extension")]
	NoExtension,
	#[error("parse error: {0}")]
	Parse(String),
	#[error("malformed utf-8 in source file: {0}")]
	Utf8(#[from] std::str::Utf8Error),
}

pub trait Codec {
	fn deserialize(&self, data: &[u8]) -> Result<(Vec<RawVertex>, Vec<RawEdge>), CodecError>;

	fn serialize(
		&self,
		vertices: &IndexMap<VertexId, Vertex>,
		edges: &IndexMap<EdgeId, Edge>,
		name: &str,
		highlight: &HashSet<String>,
	) -> Result<Vec<u8>, CodecError>;
}

pub fn for_path(path: &Path) -> Result<Box<dyn Codec>, CodecError> {
	let ext = path.extension().and_then(|e| e.to_str()).ok_or(CodecError::NoExtension)?;
	for_extension(ext)
}

pub fn for_extension(ext: &str) -> Result<Box<dyn Codec>, CodecError> {
	match ext.to_ascii_lowercase().as_str() {
		"dot" | "gv" => Ok(Box::new(dot::Dot)),
		"gml" => Ok(Box::new(gml::Gml)),
		"tgf" => Ok(Box::new(tgf::Tgf)),
		"txt" => Ok(Box::new(txt::Txt)),
		"graphml" | "xml" => Ok(Box::new(graphml::GraphMl)),
		other => Err(CodecError::UnknownExtension(other.to_string())),
	}
}

/// Shared by the `dot`/`gml` serializers: quotes a string the way the
/// original's DOT writer does (plain double-quote wrapping, no escaping of
/// embedded quotes since vertex/edge names never carry them in practice).
pub(crate) fn quote(s: &str) -> String {
	format!("\"{}\"", s.replace('\n', " "))
}

pub(crate) fn unquote(s: &str) -> &str {
	let bytes = s.as_bytes();
	if bytes.len() >= 2 && (bytes[0] == b'"' || bytes[0] == b'\'') && bytes[0] == bytes[bytes.len() - 1] {
		&s[1..s.len() - 1]
	} else {
		s
	}
}
