//! Chains several planners end to end: once the active one has nothing
//! more to offer, the next takes over from wherever the walk currently is.

use std::collections::VecDeque;

use crate::halt::HaltCondition;
use crate::ids::VertexId;
use crate::planner::Planner;
use crate::step::Step;

pub struct MasterPlan {
	planners: VecDeque<Box<dyn Planner>>,
	last_vertex: Option<VertexId>,
}

impl MasterPlan {
	pub fn new(planners: Vec<Box<dyn Planner>>) -> Self {
		MasterPlan { planners: planners.into(), last_vertex: None }
	}
}

impl Planner for MasterPlan {
	fn next(&mut self, halt: &dyn HaltCondition) -> Option<Step> {
		loop {
			let front = self.planners.front_mut()?;
			match front.next(halt) {
				Some(step) => {
					if matches!(step.kind, crate::step::StepKind::Vertex) {
						self.last_vertex = Some(step.id.clone());
					}
					return Some(step);
				}
				None => {
					self.planners.pop_front();
					if let (Some(next_planner), Some(at)) = (self.planners.front_mut(), &self.last_vertex) {
						next_planner.resume_from(at);
					}
				}
			}
		}
	}

	fn resume_from(&mut self, at: &VertexId) {
		self.last_vertex = Some(at.clone());
		if let Some(front) = self.planners.front_mut() {
			front.resume_from(at);
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::graph::Graph;
	use crate::halt::Never;
	use crate::planner::EvenRandom;
	use std::rc::Rc;
	use std::sync::Arc;

	#[test]
	fn falls_through_to_the_next_planner_at_a_dead_end() {
		let mut g = Graph::new();
		for id in ["a", "b"] {
			g.add_vertex(Arc::from(id), None);
		}
		let (a, b): (VertexId, VertexId) = (Arc::from("a"), Arc::from("b"));
		g.add_edge(&a, &b, None, None).unwrap();
		let g = Rc::new(g);

		let first: Box<dyn Planner> = Box::new(EvenRandom::new(g.clone(), a.clone(), None));
		let second: Box<dyn Planner> = Box::new(EvenRandom::new(g, a, None));
		let mut mp = MasterPlan::new(vec![first, second]);
		let halt = Never;

		assert!(mp.next(&halt).is_some());
		assert!(mp.next(&halt).is_none());
	}
}
