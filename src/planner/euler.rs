//! Euler planner: drains the forced single-edge prefix from the start
//! vertex, eulerizes a working copy of the remaining graph, finds a closed
//! Euler trail with Hierholzer's algorithm, and emits the concatenation
//! step by step.
//!
//! The trail is built all at once, before any step is emitted, against an
//! internal `Never` halt condition — construction always runs to
//! completion even if the real halt condition is already satisfied.
//! Emission afterwards does check the real halt condition to decide
//! whether to keep handing out steps, but never calls `add` on it itself;
//! that bookkeeping belongs to the caller's run loop. Preserved
//! deliberately rather than "fixed" into early-aborting construction.

use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use crate::error::GraphWalkerError;
use crate::graph::Graph;
use crate::halt::HaltCondition;
use crate::ids::{EdgeId, VertexId};
use crate::planner::Planner;
use crate::step::Step;

#[derive(Debug)]
pub struct Euler {
	circuit: VecDeque<Step>,
}

impl Euler {
	pub fn new(graph: &Rc<Graph>, start: &VertexId) -> Result<Self, GraphWalkerError> {
		let mut working = (**graph).clone();
		if working.vertex(start).is_none() {
			return Err(GraphWalkerError::StartNotFound(start.to_string()));
		}

		let mut prefix = Vec::new();
		let mut at = start.clone();
		loop {
			let (incoming, outgoing) = {
				let v = working.vertex(&at).expect("at always names a live vertex in working");
				(v.incoming.len(), v.outgoing.clone())
			};
			if incoming != 0 || outgoing.len() != 1 {
				break;
			}
			let eid = outgoing[0].clone();
			let tgt = working.edge(&eid).expect("outgoing edge id is always present in the edge map").tgt.clone();
			prefix.push(Step::from_edge(working.edge(&eid).unwrap()));
			prefix.push(Step::from_vertex(working.vertex(&tgt).unwrap()));
			working.del_vertex(&at);
			at = tgt;
		}

		working.eulerize()?;

		let mut circuit = hierholzer(&working, &at)?;
		if circuit.iter().filter(|s| matches!(s.kind, crate::step::StepKind::Edge)).count() != working.edge_count() {
			return Err(GraphWalkerError::NotConnected);
		}

		// hierholzer's own output leads with a vertex step at `at`; the
		// prefix, if any, already ended on that same vertex.
		if !prefix.is_empty() && !circuit.is_empty() {
			circuit.remove(0);
		}

		prefix.append(&mut circuit);
		Ok(Euler { circuit: prefix.into() })
	}
}

impl Planner for Euler {
	fn next(&mut self, halt: &dyn HaltCondition) -> Option<Step> {
		if halt.is_done() {
			return None;
		}
		self.circuit.pop_front()
	}
}

/// Directed-multigraph Hierholzer: repeatedly walks unused outgoing edges
/// until stuck, backtracking onto the circuit in reverse. Returns the full
/// alternating vertex/edge step sequence starting at `start`.
fn hierholzer(graph: &Graph, start: &VertexId) -> Result<Vec<Step>, GraphWalkerError> {
	if graph.vertex(start).is_none() {
		return Err(GraphWalkerError::StartNotFound(start.to_string()));
	}

	let mut remaining: HashMap<VertexId, VecDeque<EdgeId>> =
		graph.vertices().map(|(id, v)| (id.clone(), v.outgoing.clone().into())).collect();

	let mut walk: Vec<(Option<EdgeId>, VertexId)> = vec![(None, start.clone())];
	let mut circuit: Vec<(Option<EdgeId>, VertexId)> = Vec::new();

	while let Some((_, v)) = walk.last().cloned() {
		let next_edge = remaining.get_mut(&v).and_then(|q| q.pop_front());
		match next_edge {
			Some(eid) => {
				let tgt = graph.edge(&eid).expect("edge id came from this graph's own adjacency").tgt.clone();
				walk.push((Some(eid), tgt));
			}
			None => {
				circuit.push(walk.pop().expect("loop invariant: walk is non-empty while iterating"));
			}
		}
	}
	circuit.reverse();

	let mut steps = Vec::with_capacity(circuit.len() * 2);
	steps.push(Step::from_vertex(graph.vertex(&circuit[0].1).unwrap()));
	for (eid, vid) in circuit.iter().skip(1) {
		let eid = eid.as_ref().expect("every non-initial circuit entry arrived via an edge");
		steps.push(Step::from_edge(graph.edge(eid).unwrap()));
		steps.push(Step::from_vertex(graph.vertex(vid).unwrap()));
	}

	Ok(steps)
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::halt::Never;
	use std::sync::Arc;

	fn square() -> Rc<Graph> {
		let mut g = Graph::new();
		for id in ["a", "b", "c", "d"] {
			g.add_vertex(Arc::from(id), None);
		}
		let ids: Vec<VertexId> = vec!["a", "b", "c", "d"].into_iter().map(Arc::from).collect();
		for w in ids.windows(2) {
			g.add_edge(&w[0], &w[1], None, None).unwrap();
		}
		g.add_edge(&ids[3], &ids[0], None, None).unwrap();
		Rc::new(g)
	}

	#[test]
	fn covers_every_edge_exactly_once_on_an_already_eulerian_graph() {
		let g = square();
		let mut p = Euler::new(&g, &Arc::from("a")).unwrap();
		let halt = Never;
		let mut edge_count = 0;
		while let Some(step) = p.next(&halt) {
			if matches!(step.kind, crate::step::StepKind::Edge) {
				edge_count += 1;
			}
		}
		assert_eq!(edge_count, g.edge_count());
	}

	#[test]
	fn drains_a_single_out_source_prefix_before_eulerizing() {
		// Start --> a --> b --> c --> a (a/b/c form a cycle; Start is a pure
		// source feeding into it). Without draining Start first, eulerize()
		// can't pair the cycle's entry innie with Start's unreachable outie.
		let mut g = Graph::new();
		for id in ["Start", "a", "b", "c"] {
			g.add_vertex(Arc::from(id), None);
		}
		let ids: Vec<VertexId> = vec!["Start", "a", "b", "c"].into_iter().map(Arc::from).collect();
		g.add_edge(&ids[0], &ids[1], None, None).unwrap();
		g.add_edge(&ids[1], &ids[2], None, None).unwrap();
		g.add_edge(&ids[2], &ids[3], None, None).unwrap();
		g.add_edge(&ids[3], &ids[1], None, None).unwrap();
		let g = Rc::new(g);

		let mut p = Euler::new(&g, &ids[0]).unwrap();
		let halt = Never;
		let mut visited = Vec::new();
		let mut edge_count = 0;
		while let Some(step) = p.next(&halt) {
			match step.kind {
				crate::step::StepKind::Vertex => visited.push(step.id.to_string()),
				crate::step::StepKind::Edge => edge_count += 1,
				crate::step::StepKind::Synthetic => unreachable!(),
			}
		}
		assert_eq!(edge_count, g.edge_count());
		assert_eq!(visited.first(), Some(&"a".to_string()));
		assert_eq!(visited.last(), Some(&"a".to_string()));
	}

	#[test]
	fn eulerizes_an_imbalanced_graph_before_planning() {
		let mut g = Graph::new();
		for id in ["a", "b", "c"] {
			g.add_vertex(Arc::from(id), None);
		}
		let (a, b, c): (VertexId, VertexId, VertexId) = (Arc::from("a"), Arc::from("b"), Arc::from("c"));
		g.add_edge(&a, &b, None, None).unwrap();
		g.add_edge(&b, &c, None, None).unwrap();
		g.add_edge(&c, &a, None, None).unwrap();
		g.add_edge(&a, &b, None, None).unwrap();
		let g = Rc::new(g);
		let p = Euler::new(&g, &a);
		assert!(p.is_ok());
	}

	#[test]
	fn disconnected_graph_is_rejected() {
		let mut g = Graph::new();
		for id in ["a", "b", "x", "y"] {
			g.add_vertex(Arc::from(id), None);
		}
		let (a, b, x, y): (VertexId, VertexId, VertexId, VertexId) = (Arc::from("a"), Arc::from("b"), Arc::from("x"), Arc::from("y"));
		g.add_edge(&a, &b, None, None).unwrap();
		g.add_edge(&b, &a, None, None).unwrap();
		g.add_edge(&x, &y, None, None).unwrap();
		g.add_edge(&y, &x, None, None).unwrap();
		let g = Rc::new(g);
		let err = Euler::new(&g, &a).unwrap_err();
		assert!(matches!(err, GraphWalkerError::NotConnected));
	}
}
