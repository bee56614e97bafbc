//! Planners: pull-driven sequences of [`Step`]s over a [`Graph`].
//!
//! A planner is asked for one step at a time via [`Planner::next`]; it may
//! consult the halt condition to decide whether it has more to offer, but
//! registering a step as seen (`HaltCondition::add`) is the caller's job,
//! not the planner's — this keeps halt bookkeeping in one place (the
//! executor's run loop) regardless of which planner is active.

mod euler;
mod goto;
mod interactive;
mod master_plan;
mod random_walk;

pub use euler::Euler;
pub use goto::Goto;
pub use interactive::Interactive;
pub use master_plan::MasterPlan;
pub use random_walk::{EvenRandom, Random};

use std::rc::Rc;

use crate::error::GraphWalkerError;
use crate::graph::Graph;
use crate::halt::HaltCondition;
use crate::ids::VertexId;
use crate::spec::parse_spec;
use crate::step::Step;

pub trait Planner {
	/// Produces the next step, or `None` if the planner has nothing further
	/// to offer regardless of halt state (a dead end, an exhausted Euler
	/// circuit, a quit command).
	fn next(&mut self, halt: &dyn HaltCondition) -> Option<Step>;

	/// Repositions the planner at `at`, used by [`MasterPlan`] when handing
	/// off from one sub-planner to the next.
	fn resume_from(&mut self, _at: &VertexId) {}
}

/// Resolves a `name:args` plugin spec string into a built-in planner.
pub fn build(spec: &str, graph: &Rc<Graph>, start: &VertexId) -> Result<Box<dyn Planner>, GraphWalkerError> {
	let s = parse_spec(spec);
	let seed: Option<u64> = s.kw("seed").map(|v| v.parse()).transpose().map_err(|_| GraphWalkerError::BadSpec("seed must be an integer".into()))?;
	match s.name.as_str() {
		"EvenRandom" => Ok(Box::new(EvenRandom::new(graph.clone(), start.clone(), seed))),
		"Random" => Ok(Box::new(Random::new(graph.clone(), start.clone(), seed))),
		"Euler" => Ok(Box::new(Euler::new(graph, start)?)),
		"Goto" => {
			let repeat: u64 = s.kw("repeat").map(|v| v.parse()).transpose().map_err(|_| GraphWalkerError::BadSpec("Goto repeat must be an integer".into()))?.unwrap_or(1);
			Ok(Box::new(Goto::new(graph.clone(), start.clone(), s.args, repeat, seed)))
		}
		"Interactive" => Ok(Box::new(Interactive::new(graph.clone(), start.clone()))),
		other => Err(GraphWalkerError::BadSpec(format!("unknown planner {:?}", other))),
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::graph::Graph;
	use crate::halt::Never;
	use std::sync::Arc;

	fn triangle() -> Rc<Graph> {
		let mut g = Graph::new();
		for id in ["a", "b", "c"] {
			g.add_vertex(Arc::from(id), None);
		}
		let (a, b, c): (VertexId, VertexId, VertexId) = (Arc::from("a"), Arc::from("b"), Arc::from("c"));
		g.add_edge(&a, &b, None, None).unwrap();
		g.add_edge(&b, &c, None, None).unwrap();
		g.add_edge(&c, &a, None, None).unwrap();
		Rc::new(g)
	}

	#[test]
	fn seed_kwarg_is_parsed_and_threaded_through() {
		let g = triangle();
		let start: VertexId = Arc::from("a");
		let run = || {
			let mut p = build("EvenRandom:seed=123", &g, &start).unwrap();
			let halt = Never;
			(0..6).filter_map(|_| p.next(&halt).map(|s| s.id.to_string())).collect::<Vec<_>>()
		};
		assert_eq!(run(), run());
	}

	#[test]
	fn bad_seed_is_a_bad_spec_error() {
		let g = triangle();
		let start: VertexId = Arc::from("a");
		assert!(build("Random:seed=not-a-number", &g, &start).is_err());
	}
}
