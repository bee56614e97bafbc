//! Halt conditions: the predicate a planner consults to decide when a walk
//! is done. A condition observes every step as it's emitted via `add`, then
//! `is_done` is polled by the executor/planner after each one.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;
use std::time::Instant;

use crate::error::GraphWalkerError;
use crate::graph::Graph;
use crate::spec::parse_spec;
use crate::step::Step;

pub trait HaltCondition {
	fn add(&mut self, step: &Step);
	fn is_done(&self) -> bool;
}

/// Never halts on its own; a planner exhausting its own logic (or the
/// surrounding driver) ends the walk instead.
#[derive(Default)]
pub struct Never;

impl HaltCondition for Never {
	fn add(&mut self, _step: &Step) {}
	fn is_done(&self) -> bool {
		false
	}
}

/// Halts once `timeout` seconds have elapsed since construction.
pub struct Seconds {
	start: Instant,
	timeout: f64,
}

impl Seconds {
	pub fn new(timeout: f64) -> Self {
		Seconds { start: Instant::now(), timeout }
	}
}

impl HaltCondition for Seconds {
	fn add(&mut self, _step: &Step) {}
	fn is_done(&self) -> bool {
		self.start.elapsed().as_secs_f64() >= self.timeout
	}
}

/// Halts once every step label in `targets` has been seen at least once.
pub struct SeenSteps {
	targets: HashSet<String>,
	seen: HashSet<String>,
}

impl SeenSteps {
	pub fn new(targets: impl IntoIterator<Item = String>) -> Self {
		SeenSteps { targets: targets.into_iter().collect(), seen: HashSet::new() }
	}
}

impl HaltCondition for SeenSteps {
	fn add(&mut self, step: &Step) {
		self.seen.insert(step.label.clone());
	}
	fn is_done(&self) -> bool {
		self.targets.is_subset(&self.seen)
	}
}

/// Halts after a fixed number of steps.
pub struct CountSteps {
	limit: u64,
	count: Cell<u64>,
}

impl CountSteps {
	pub fn new(limit: u64) -> Self {
		CountSteps { limit, count: Cell::new(0) }
	}
}

impl HaltCondition for CountSteps {
	fn add(&mut self, _step: &Step) {
		self.count.set(self.count.get() + 1);
	}
	fn is_done(&self) -> bool {
		self.count.get() >= self.limit
	}
}

/// Halts once the fraction of distinct vertices and/or edges visited
/// reaches the configured percentage. Defaults to 100% edge coverage when
/// neither `vertices` nor `edges` is given, matching the original.
pub struct Coverage {
	graph: Rc<Graph>,
	want_vertices: Option<f64>,
	want_edges: Option<f64>,
	seen_v: RefCell<HashSet<String>>,
	seen_e: RefCell<HashSet<String>>,
}

impl Coverage {
	pub fn new(graph: Rc<Graph>, vertices: Option<f64>, edges: Option<f64>) -> Self {
		let (want_vertices, want_edges) = if vertices.unwrap_or(0.0) == 0.0 && edges.unwrap_or(0.0) == 0.0 { (None, Some(100.0)) } else { (vertices, edges) };
		Coverage { graph, want_vertices, want_edges, seen_v: RefCell::new(HashSet::new()), seen_e: RefCell::new(HashSet::new()) }
	}
}

impl HaltCondition for Coverage {
	fn add(&mut self, step: &Step) {
		if self.graph.vertex(&step.id).is_some() {
			self.seen_v.borrow_mut().insert(step.id.to_string());
		}
		if self.graph.edge(&step.id).is_some() {
			self.seen_e.borrow_mut().insert(step.id.to_string());
		}
	}

	fn is_done(&self) -> bool {
		if let Some(want) = self.want_vertices {
			let total = self.graph.vertex_count().max(1) as f64;
			if (self.seen_v.borrow().len() as f64) * 100.0 / total < want {
				return false;
			}
		}
		if let Some(want) = self.want_edges {
			let total = self.graph.edge_count().max(1) as f64;
			if (self.seen_e.borrow().len() as f64) * 100.0 / total < want {
				return false;
			}
		}
		true
	}
}

/// Resolves a `name:args` plugin spec string into a built-in halt condition.
pub fn build(spec: &str, graph: &Rc<Graph>) -> Result<Box<dyn HaltCondition>, GraphWalkerError> {
	let s = parse_spec(spec);
	match s.name.as_str() {
		"Never" => Ok(Box::new(Never)),
		"Seconds" => {
			let secs: f64 = s.args.get(0).ok_or_else(|| GraphWalkerError::BadSpec("Seconds requires a timeout argument".into()))?.parse().map_err(
				|_| GraphWalkerError::BadSpec("Seconds timeout must be a number".into()),
			)?;
			Ok(Box::new(Seconds::new(secs)))
		}
		"SeenSteps" => Ok(Box::new(SeenSteps::new(s.args.into_iter()))),
		"CountSteps" => {
			let n: u64 = s.args.get(0).ok_or_else(|| GraphWalkerError::BadSpec("CountSteps requires a count argument".into()))?.parse().map_err(
				|_| GraphWalkerError::BadSpec("CountSteps count must be an integer".into()),
			)?;
			Ok(Box::new(CountSteps::new(n)))
		}
		"Coverage" => {
			let vertices = s.kw("vertices").map(|v| v.parse()).transpose().map_err(|_| GraphWalkerError::BadSpec("Coverage vertices must be a number".into()))?;
			let edges = s.kw("edges").map(|v| v.parse()).transpose().map_err(|_| GraphWalkerError::BadSpec("Coverage edges must be a number".into()))?;
			Ok(Box::new(Coverage::new(graph.clone(), vertices, edges)))
		}
		other => Err(GraphWalkerError::BadSpec(format!("unknown halt condition {:?}", other))),
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::graph::Graph;
	use std::sync::Arc;

	fn small_graph() -> Rc<Graph> {
		let mut g = Graph::new();
		let a: crate::ids::VertexId = Arc::from("a");
		let b: crate::ids::VertexId = Arc::from("b");
		g.add_vertex(a.clone(), None);
		g.add_vertex(b.clone(), None);
		g.add_edge(&a, &b, Some(Arc::from("e0")), None).unwrap();
		Rc::new(g)
	}

	#[test]
	fn never_never_halts() {
		let mut h = Never;
		h.add(&Step::synthetic("x"));
		assert!(!h.is_done());
	}

	#[test]
	fn count_steps_halts_at_limit() {
		let mut h = CountSteps::new(2);
		assert!(!h.is_done());
		h.add(&Step::synthetic("a"));
		assert!(!h.is_done());
		h.add(&Step::synthetic("b"));
		assert!(h.is_done());
	}

	#[test]
	fn seen_steps_requires_all_targets() {
		let mut h = SeenSteps::new(vec!["a".to_string(), "b".to_string()]);
		h.add(&Step::synthetic("a"));
		assert!(!h.is_done());
		h.add(&Step::synthetic("b"));
		assert!(h.is_done());
	}

	#[test]
	fn coverage_defaults_to_100_percent_edges() {
		let g = small_graph();
		let mut h = Coverage::new(g.clone(), None, None);
		assert!(!h.is_done());
		let edge = g.edge("e0").unwrap();
		h.add(&Step::from_edge(edge));
		assert!(h.is_done());
	}

	#[test]
	fn coverage_with_both_targets_explicitly_zero_still_defaults_to_100_percent_edges() {
		let g = small_graph();
		let mut h = Coverage::new(g.clone(), Some(0.0), Some(0.0));
		assert!(!h.is_done());
		let edge = g.edge("e0").unwrap();
		h.add(&Step::from_edge(edge));
		assert!(h.is_done());
	}

	#[test]
	fn build_resolves_by_name() {
		let g = small_graph();
		let h = build("CountSteps:5", &g).unwrap();
		assert!(!h.is_done());
	}
}
