//! The graph data model: vertices, edges, structural mutation, all-pairs
//! shortest paths and Eulerization.
//!
//! Vertices and edges reference each other only by id; the `vertices`/`edges`
//! maps are the single source of truth; `outgoing`/`incoming` on a [`Vertex`]
//! are derived views kept consistent on every mutation.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::codec;
use crate::error::{GraphError, GraphWalkerError};
use crate::ids::{is_blocked, parse_label, EdgeId, Extras, VertexId};

/// Sentinel standing in for "unreachable" in the all-pairs shortest path
/// table. Large enough that `INF + INF` never overflows `i64`.
pub const INF: i64 = i64::MAX / 4;

#[derive(Clone, Debug)]
pub struct Vertex {
	pub id: VertexId,
	pub name: String,
	pub outgoing: Vec<EdgeId>,
	pub incoming: Vec<EdgeId>,
	pub extras: Extras,
}

impl Vertex {
	pub fn blocked(&self) -> bool {
		is_blocked(&self.extras)
	}
}

#[derive(Clone, Debug)]
pub struct Edge {
	pub id: EdgeId,
	pub name: String,
	pub src: VertexId,
	pub tgt: VertexId,
	pub extras: Extras,
}

impl Edge {
	pub fn blocked(&self) -> bool {
		is_blocked(&self.extras)
	}

	/// The edge's `weight` extra, if any, exactly as written in the label
	/// (a bare number or a `N%` percentage) — interpreted by the `Random`
	/// planner, not by the graph itself.
	pub fn weight_raw(&self) -> Option<&str> {
		self.extras.get("weight").and_then(|v| v.as_text())
	}
}

/// `(cost, path)` for one (source, target) pair in the all-pairs shortest
/// path table. `path` is the sequence of vertex ids from source (exclusive)
/// to destination (inclusive); empty when `cost == 0`.
pub type ApspEntry = (i64, Vec<VertexId>);
pub type Apsp = HashMap<(VertexId, VertexId), ApspEntry>;

#[derive(Clone, Debug, Default)]
pub struct Graph {
	vertices: IndexMap<VertexId, Vertex>,
	edges: IndexMap<EdgeId, Edge>,
	next_vertex_seq: Cell<u64>,
	next_edge_seq: Cell<u64>,
	apsp_cache: RefCell<Option<Rc<Apsp>>>,
}

impl Graph {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn vertex(&self, id: &str) -> Option<&Vertex> {
		self.vertices.get(id)
	}

	pub fn edge(&self, id: &str) -> Option<&Edge> {
		self.edges.get(id)
	}

	pub fn vertices(&self) -> impl Iterator<Item = (&VertexId, &Vertex)> {
		self.vertices.iter()
	}

	pub fn edges(&self) -> impl Iterator<Item = (&EdgeId, &Edge)> {
		self.edges.iter()
	}

	pub fn vertex_count(&self) -> usize {
		self.vertices.len()
	}

	pub fn edge_count(&self) -> usize {
		self.edges.len()
	}

	fn changed(&self) {
		*self.apsp_cache.borrow_mut() = None;
	}

	/// Verifies the integrity invariants of spec.md §3: every edge endpoint
	/// exists, every edge is reflected in its endpoints' adjacency views,
	/// and vertex/edge ids never collide across the shared namespace.
	pub fn sanity_check(&self) -> Result<(), GraphError> {
		for (eid, edge) in &self.edges {
			if !self.vertices.contains_key(&edge.src) {
				return Err(GraphError::DanglingEndpoint { edge: eid.to_string(), endpoint: edge.src.to_string() });
			}
			if !self.vertices.contains_key(&edge.tgt) {
				return Err(GraphError::DanglingEndpoint { edge: eid.to_string(), endpoint: edge.tgt.to_string() });
			}
			let src = &self.vertices[&edge.src];
			if !src.outgoing.iter().any(|e| e.as_ref() == eid.as_ref()) {
				return Err(GraphError::BrokenAdjacency { edge: eid.to_string() });
			}
			let tgt = &self.vertices[&edge.tgt];
			if !tgt.incoming.iter().any(|e| e.as_ref() == eid.as_ref()) {
				return Err(GraphError::BrokenAdjacency { edge: eid.to_string() });
			}
		}

		for vid in self.vertices.keys() {
			if self.edges.contains_key(vid) {
				return Err(GraphError::DuplicateId(vid.to_string()));
			}
		}

		Ok(())
	}

	/// Fresh edge id of the form `e<N>`, not colliding with either map.
	/// Stable across repeated calls until actually consumed by [`Graph::add_edge`].
	pub fn new_edge_id(&self) -> EdgeId {
		let mut i = self.next_edge_seq.get();
		loop {
			let candidate = format!("e{}", i);
			if !self.vertices.contains_key(candidate.as_str()) && !self.edges.contains_key(candidate.as_str()) {
				self.next_edge_seq.set(i);
				return Arc::from(candidate);
			}
			i += 1;
		}
	}

	/// Fresh vertex id of the form `v<N>`; see [`Graph::new_edge_id`].
	pub fn new_vertex_id(&self) -> VertexId {
		let mut i = self.next_vertex_seq.get();
		loop {
			let candidate = format!("v{}", i);
			if !self.vertices.contains_key(candidate.as_str()) && !self.edges.contains_key(candidate.as_str()) {
				self.next_vertex_seq.set(i);
				return Arc::from(candidate);
			}
			i += 1;
		}
	}

	pub fn add_vertex(&mut self, id: VertexId, name: Option<&str>) -> &Vertex {
		let name = name.unwrap_or(&id).to_string();
		self.vertices.insert(
			id.clone(),
			Vertex { id: id.clone(), name, outgoing: Vec::new(), incoming: Vec::new(), extras: Extras::new() },
		);
		self.changed();
		&self.vertices[&id]
	}

	pub fn add_edge(&mut self, src: &VertexId, tgt: &VertexId, id: Option<EdgeId>, name: Option<&str>) -> Result<EdgeId, GraphError> {
		if !self.vertices.contains_key(src) {
			return Err(GraphError::DanglingEndpoint { edge: "<new>".into(), endpoint: src.to_string() });
		}
		if !self.vertices.contains_key(tgt) {
			return Err(GraphError::DanglingEndpoint { edge: "<new>".into(), endpoint: tgt.to_string() });
		}

		let id = id.unwrap_or_else(|| self.new_edge_id());
		let name = name.unwrap_or("").to_string();
		self.edges.insert(id.clone(), Edge { id: id.clone(), name, src: src.clone(), tgt: tgt.clone(), extras: Extras::new() });
		self.vertices[src].outgoing.push(id.clone());
		self.vertices[tgt].incoming.push(id.clone());
		self.changed();
		Ok(id)
	}

	pub fn del_edge(&mut self, id: &str) {
		if let Some(edge) = self.edges.shift_remove(id) {
			if let Some(src) = self.vertices.get_mut(&edge.src) {
				src.outgoing.retain(|e| e.as_ref() != id);
			}
			if let Some(tgt) = self.vertices.get_mut(&edge.tgt) {
				tgt.incoming.retain(|e| e.as_ref() != id);
			}
			self.changed();
		}
	}

	/// Deletes a vertex, first deleting all edges incident to it.
	pub fn del_vertex(&mut self, id: &str) {
		let incident: Vec<EdgeId> = self
			.edges
			.iter()
			.filter(|(_, e)| e.src.as_ref() == id || e.tgt.as_ref() == id)
			.map(|(eid, _)| eid.clone())
			.collect();
		for eid in incident {
			self.del_edge(&eid);
		}
		self.vertices.shift_remove(id);
		self.changed();
	}

	/// Creates a parallel edge with a fresh id, same endpoints and name.
	pub fn copy_edge(&mut self, id: &str) -> Result<EdgeId, GraphError> {
		let (name, src, tgt) = {
			let edge = self.edges.get(id).ok_or_else(|| GraphError::NoSuchEdgeBetween(id.to_string(), String::new()))?;
			(edge.name.clone(), edge.src.clone(), edge.tgt.clone())
		};
		Ok(self.add_edge(&src, &tgt, None, Some(&name)).expect("endpoints of an existing edge must exist"))
	}

	/// Vertex union by id; duplicate ids are rejected with [`GraphError::DuplicateId`].
	pub fn combine(&self, other: &Graph) -> Result<Graph, GraphError> {
		let mut out = self.clone();
		for (vid, v) in &other.vertices {
			if out.vertices.contains_key(vid) {
				return Err(GraphError::DuplicateId(vid.to_string()));
			}
			out.vertices.insert(vid.clone(), v.clone());
		}
		for (eid, e) in &other.edges {
			if out.edges.contains_key(eid) || out.vertices.contains_key(eid) {
				return Err(GraphError::DuplicateId(eid.to_string()));
			}
			out.edges.insert(eid.clone(), e.clone());
		}
		out.changed();
		Ok(out)
	}

	/// `(incoming_count, outgoing_count)` per vertex id.
	pub fn vertex_degrees(&self) -> (HashMap<VertexId, usize>, HashMap<VertexId, usize>) {
		let incoming = self.vertices.iter().map(|(id, v)| (id.clone(), v.incoming.len())).collect();
		let outgoing = self.vertices.iter().map(|(id, v)| (id.clone(), v.outgoing.len())).collect();
		(incoming, outgoing)
	}

	/// `(innies, outies)`: vertex ids repeated once per unit of in/out
	/// degree imbalance.
	pub fn odd_vertices(&self) -> (Vec<VertexId>, Vec<VertexId>) {
		let (incoming, outgoing) = self.vertex_degrees();
		let mut innies = Vec::new();
		let mut outies = Vec::new();
		for (id, _) in &self.vertices {
			let i = incoming[id];
			let o = outgoing[id];
			if i > o {
				innies.extend(std::iter::repeat(id.clone()).take(i - o));
			} else if o > i {
				outies.extend(std::iter::repeat(id.clone()).take(o - i));
			}
		}
		(innies, outies)
	}

	/// Floyd-Warshall all-pairs shortest path, memoized until the next
	/// mutation. Direct neighbors cost `1`; unreachable pairs are
	/// `(INF, [])`; ties break on first edge found (insertion order).
	pub fn all_pairs_shortest_path(&self) -> Rc<Apsp> {
		if let Some(cached) = self.apsp_cache.borrow().as_ref() {
			return cached.clone();
		}

		let ids: Vec<VertexId> = self.vertices.keys().cloned().collect();
		let mut dist: Apsp = HashMap::with_capacity(ids.len() * ids.len());

		for i in &ids {
			for j in &ids {
				if i == j {
					dist.insert((i.clone(), j.clone()), (0, Vec::new()));
					continue;
				}
				let mut found = None;
				for eid in &self.vertices[i].outgoing {
					let edge = &self.edges[eid];
					if &edge.tgt == j {
						found = Some((1, vec![j.clone()]));
						break;
					}
				}
				dist.insert((i.clone(), j.clone()), found.unwrap_or((INF, Vec::new())));
			}
		}

		for k in &ids {
			for i in &ids {
				for j in &ids {
					let (dik, dkj) = (dist[&(i.clone(), k.clone())].clone(), dist[&(k.clone(), j.clone())].clone());
					let alt_cost = dik.0 + dkj.0;
					let current = dist[&(i.clone(), j.clone())].clone();
					if current.0 > alt_cost {
						let mut path = dik.1.clone();
						path.extend(dkj.1.iter().cloned());
						dist.insert((i.clone(), j.clone()), (alt_cost, path));
					}
				}
			}
		}

		let rc = Rc::new(dist);
		*self.apsp_cache.borrow_mut() = Some(rc.clone());
		rc
	}

	/// True iff no other vertex is reachable from `v` with finite cost.
	pub fn is_stuck(&self, v: &str) -> bool {
		let d = self.all_pairs_shortest_path();
		for ((fm, to), (cost, _)) in d.iter() {
			if fm.as_ref() == v && to.as_ref() != v && *cost < INF {
				return false;
			}
		}
		true
	}

	fn duplicate_edge_between(&mut self, fm: &str, to: &str) -> Result<(), GraphError> {
		let eid = self.vertices[fm]
			.outgoing
			.iter()
			.find(|eid| self.edges[*eid].tgt.as_ref() == to)
			.cloned()
			.ok_or_else(|| GraphError::NoSuchEdgeBetween(fm.to_string(), to.to_string()))?;
		self.copy_edge(&eid)?;
		Ok(())
	}

	/// Minimally duplicates edges until every vertex has equal in- and
	/// out-degree (spec.md §4.1). A no-op when the graph has no imbalance.
	pub fn eulerize(&mut self) -> Result<(), GraphWalkerError> {
		let (mut innies, mut outies) = self.odd_vertices();
		if innies.is_empty() {
			return Ok(());
		}

		let d = self.all_pairs_shortest_path();
		let mut tries: Vec<(i64, VertexId, VertexId, Vec<VertexId>)> = d
			.iter()
			.filter(|((fm, to), (cost, _))| *cost < INF && innies.contains(fm) && outies.contains(to))
			.map(|((fm, to), (cost, path))| (*cost, fm.clone(), to.clone(), path.clone()))
			.collect();
		tries.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)).then_with(|| a.2.cmp(&b.2)));

		while !innies.is_empty() {
			let mut matched = false;
			for (_, fm, to, path) in &tries {
				if innies.contains(fm) && outies.contains(to) {
					outies.retain(|v| v != to);
					innies.retain(|v| v != fm);

					let mut a = fm.clone();
					for b in path {
						self.duplicate_edge_between(&a, b)?;
						a = b.clone();
					}
					matched = true;
					break;
				}
			}
			if !matched {
				return Err(GraphWalkerError::NotEulerizable);
			}
		}

		Ok(())
	}

	/// Builds a graph from codec output, applying the blocked filter: any
	/// vertex with `BLOCKED` truthy is dropped; any edge with `BLOCKED`
	/// truthy, or whose endpoints were dropped, is dropped.
	pub fn build(verts: Vec<(String, String)>, edges: Vec<(String, String, String, String)>) -> Graph {
		let mut g = Graph::new();

		for (id, raw_name) in verts {
			let (name, extras) = parse_label(&raw_name);
			if is_blocked(&extras) {
				continue;
			}
			let id: VertexId = Arc::from(id.as_str());
			g.vertices.insert(id.clone(), Vertex { id, name, outgoing: Vec::new(), incoming: Vec::new(), extras });
		}

		for (id, raw_name, src, tgt) in edges {
			let (name, extras) = parse_label(&raw_name);
			if is_blocked(&extras) {
				continue;
			}
			let src: VertexId = Arc::from(src.as_str());
			let tgt: VertexId = Arc::from(tgt.as_str());
			if !g.vertices.contains_key(&src) || !g.vertices.contains_key(&tgt) {
				continue;
			}
			let id: EdgeId = Arc::from(id.as_str());
			g.vertices[&src].outgoing.push(id.clone());
			g.vertices[&tgt].incoming.push(id.clone());
			g.edges.insert(id.clone(), Edge { id, name, src, tgt, extras });
		}

		g
	}

	/// Resolves a codec by file extension, decodes, then [`Graph::build`]s.
	pub fn read(path: impl AsRef<Path>) -> Result<Graph, GraphWalkerError> {
		let path = path.as_ref();
		let bytes = std::fs::read(path)?;
		let codec = codec::for_path(path)?;
		let (verts, edges) = codec.deserialize(&bytes)?;
		Ok(Graph::build(verts, edges))
	}

	pub fn write(&self, path: impl AsRef<Path>, graph_name: &str, highlight: &std::collections::HashSet<String>) -> Result<(), GraphWalkerError> {
		let path = path.as_ref();
		let codec = codec::for_path(path)?;
		let bytes = codec.serialize(&self.vertices, &self.edges, graph_name, highlight)?;
		std::fs::write(path, bytes)?;
		Ok(())
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn chain(spec: &str) -> Graph {
		let mut g = Graph::new();
		let verts: std::collections::BTreeSet<char> = spec.chars().filter(|c| !c.is_whitespace()).collect();
		for v in verts {
			g.add_vertex(Arc::from(v.to_string().as_str()), None);
		}
		for pair in spec.split_whitespace() {
			let chars: Vec<char> = pair.chars().collect();
			let (src, tgt): (VertexId, VertexId) = (Arc::from(chars[0].to_string().as_str()), Arc::from(chars[1].to_string().as_str()));
			g.add_edge(&src, &tgt, None, None).unwrap();
		}
		g
	}

	#[test]
	fn sanity_check_passes_for_well_formed_graph() {
		let g = chain("ab bc");
		g.sanity_check().unwrap();
	}

	#[test]
	fn new_ids_do_not_collide_and_are_stable_until_consumed() {
		let g = chain("ab bc");
		let e1 = g.new_edge_id();
		let e2 = g.new_edge_id();
		assert_eq!(e1, e2);
		assert!(!g.edges.contains_key(&e1));
	}

	#[test]
	fn new_id_changes_once_consumed() {
		let mut g = chain("ab");
		let e1 = g.new_edge_id();
		let a: VertexId = Arc::from("a");
		let b: VertexId = Arc::from("b");
		g.add_edge(&a, &b, Some(e1.clone()), None).unwrap();
		let e2 = g.new_edge_id();
		assert_ne!(e1, e2);
	}

	#[test]
	fn del_vertex_removes_incident_edges() {
		let mut g = chain("ab bc");
		g.del_vertex("b");
		assert!(g.vertex("b").is_none());
		assert_eq!(g.edge_count(), 0);
		g.sanity_check().unwrap();
	}

	#[test]
	fn odd_vertices_matches_degree_imbalance() {
		let g = chain("ab bc");
		let (innies, outies) = g.odd_vertices();
		assert_eq!(innies, vec![Arc::<str>::from("c")]);
		assert_eq!(outies, vec![Arc::<str>::from("a")]);
	}

	#[test]
	fn apsp_direct_neighbor_and_unreachable() {
		let g = chain("ab");
		let d = g.all_pairs_shortest_path();
		assert_eq!(d[&(Arc::<str>::from("a"), Arc::<str>::from("a"))], (0, vec![]));
		assert_eq!(d[&(Arc::<str>::from("a"), Arc::<str>::from("b"))], (1, vec![Arc::<str>::from("b")]));
		assert_eq!(d[&(Arc::<str>::from("b"), Arc::<str>::from("a"))].0, INF);
	}

	#[test]
	fn apsp_triangle_inequality_holds() {
		let g = chain("ab bc ac");
		let d = g.all_pairs_shortest_path();
		let ids: Vec<VertexId> = vec![Arc::from("a"), Arc::from("b"), Arc::from("c")];
		for i in &ids {
			for j in &ids {
				for k in &ids {
					let dij = d[&(i.clone(), j.clone())].0;
					let dik = d[&(i.clone(), k.clone())].0;
					let dkj = d[&(k.clone(), j.clone())].0;
					assert!(dij <= dik + dkj);
				}
			}
		}
	}

	#[test]
	fn is_stuck_detects_sinks() {
		let g = chain("ab");
		assert!(!g.is_stuck("a"));
		assert!(g.is_stuck("b"));
	}

	#[test]
	fn eulerize_balances_degrees() {
		let mut g = chain("ab ac bd cd de ea");
		assert_eq!(g.odd_vertices(), (vec![Arc::<str>::from("d")], vec![Arc::<str>::from("a")]));
		g.eulerize().unwrap();
		assert_eq!(g.odd_vertices(), (vec![], vec![]));
	}

	#[test]
	fn eulerize_on_balanced_graph_is_noop() {
		let mut g = chain("ab ba");
		let before = g.edge_count();
		g.eulerize().unwrap();
		assert_eq!(g.edge_count(), before);
	}

	#[test]
	fn copy_is_independent() {
		let g0 = chain("ab");
		let mut g1 = g0.clone();
		let a: VertexId = Arc::from("x");
		g1.add_vertex(a, None);
		assert_eq!(g0.vertex_count(), 2);
		assert_eq!(g1.vertex_count(), 3);
	}

	#[test]
	fn blocked_vertex_and_its_edges_are_dropped() {
		let verts = vec![("a".into(), "a".into()), ("b".into(), "b\nBLOCKED".into()), ("c".into(), "c".into())];
		let edges = vec![
			("e0".into(), "ab".into(), "a".into(), "b".into()),
			("e1".into(), "bc".into(), "b".into(), "c".into()),
			("e2".into(), "ac".into(), "a".into(), "c".into()),
		];
		let g = Graph::build(verts, edges);
		let mut vids: Vec<&str> = g.vertices().map(|(id, _)| id.as_ref()).collect();
		vids.sort();
		assert_eq!(vids, vec!["a", "c"]);
		assert_eq!(g.edge_count(), 1);
	}
}
