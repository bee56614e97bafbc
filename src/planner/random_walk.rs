//! `EvenRandom` and `Random` share everything but how an outgoing edge is
//! picked; that difference is factored into the [`EdgeChoice`] trait so the
//! walk logic itself — stop on a dead end, advance, track position — lives
//! in one place.

use std::collections::VecDeque;
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::graph::Graph;
use crate::halt::HaltCondition;
use crate::ids::{EdgeId, VertexId};
use crate::planner::Planner;
use crate::step::Step;

pub trait EdgeChoice {
	fn choose(&mut self, graph: &Graph, rng: &mut StdRng, outgoing: &[EdgeId]) -> Option<EdgeId>;
}

pub struct RandomWalk<C> {
	graph: Rc<Graph>,
	current: VertexId,
	rng: StdRng,
	choice: C,
	pending: VecDeque<Step>,
}

impl<C: EdgeChoice> RandomWalk<C> {
	fn new_with(graph: Rc<Graph>, start: VertexId, choice: C, seed: Option<u64>) -> Self {
		let rng = match seed {
			Some(s) => StdRng::seed_from_u64(s),
			None => StdRng::from_entropy(),
		};
		RandomWalk { graph, current: start, rng, choice, pending: VecDeque::new() }
	}
}

impl<C: EdgeChoice> Planner for RandomWalk<C> {
	fn next(&mut self, _halt: &dyn HaltCondition) -> Option<Step> {
		if let Some(step) = self.pending.pop_front() {
			return Some(step);
		}

		let outgoing = &self.graph.vertex(&self.current)?.outgoing;
		let eid = self.choice.choose(&self.graph, &mut self.rng, outgoing)?;
		let edge = self.graph.edge(&eid)?;
		self.pending.push_back(Step::from_edge(edge));
		self.current = edge.tgt.clone();
		self.pending.push_back(Step::from_vertex(self.graph.vertex(&self.current)?));
		self.pending.pop_front()
	}

	fn resume_from(&mut self, at: &VertexId) {
		self.current = at.clone();
		self.pending.clear();
	}
}

#[derive(Default)]
pub struct Uniform;

impl EdgeChoice for Uniform {
	fn choose(&mut self, _graph: &Graph, rng: &mut StdRng, outgoing: &[EdgeId]) -> Option<EdgeId> {
		if outgoing.is_empty() {
			return None;
		}
		let i = rng.gen_range(0..outgoing.len());
		Some(outgoing[i].clone())
	}
}

/// Weighted choice among outgoing edges: an edge's `weight` extra, when a
/// plain number, is a relative weight; when a `N%` percentage, is an
/// absolute share of the total. Edges without a `weight` extra split
/// whatever share percentages leave unclaimed. A percentage total over
/// 100, or a weight that fails to parse, is logged and treated as if the
/// edge had no weight at all.
#[derive(Default)]
pub struct Weighted;

impl EdgeChoice for Weighted {
	fn choose(&mut self, graph: &Graph, rng: &mut StdRng, outgoing: &[EdgeId]) -> Option<EdgeId> {
		if outgoing.is_empty() {
			return None;
		}

		let mut percent_total = 0.0f64;
		let mut has_percent = false;
		let mut weighted: Vec<(EdgeId, f64)> = Vec::new();
		let mut unweighted: Vec<EdgeId> = Vec::new();

		for eid in outgoing {
			let edge = match graph.edge(eid) {
				Some(e) => e,
				None => continue,
			};
			match edge.weight_raw() {
				None => unweighted.push(eid.clone()),
				Some(raw) => {
					if let Some(pct) = raw.strip_suffix('%') {
						match pct.trim().parse::<f64>() {
							Ok(p) => {
								percent_total += p;
								has_percent = true;
								weighted.push((eid.clone(), p));
							}
							Err(_) => {
								log::warn!("planner: edge {} has unparseable weight {:?}, treating as unweighted", eid, raw);
								unweighted.push(eid.clone());
							}
						}
					} else {
						match raw.trim().parse::<f64>() {
							Ok(w) => weighted.push((eid.clone(), w)),
							Err(_) => {
								log::warn!("planner: edge {} has unparseable weight {:?}, treating as unweighted", eid, raw);
								unweighted.push(eid.clone());
							}
						}
					}
				}
			}
		}

		if percent_total > 100.1 {
			log::warn!("planner: probabilities supplied exceed unity ({}% over 100)", percent_total);
		}

		let remaining = 100.0 - percent_total;
		if !unweighted.is_empty() {
			if has_percent && remaining <= 0.0 {
				log::warn!("planner: unweighted edges get zero probability");
			}
			let share = remaining.max(0.0) / unweighted.len() as f64;
			for eid in &unweighted {
				weighted.push((eid.clone(), share));
			}
		} else if has_percent && percent_total < 99.0 {
			log::warn!("planner: weighted edges sum to less than unity ({}%)", percent_total);
		}

		let total: f64 = weighted.iter().map(|(_, w)| w).sum();
		if total <= 0.0 {
			let i = rng.gen_range(0..outgoing.len());
			return Some(outgoing[i].clone());
		}

		let mut pick = rng.gen_range(0.0..total);
		for (eid, w) in &weighted {
			if pick < *w {
				return Some(eid.clone());
			}
			pick -= w;
		}
		weighted.last().map(|(eid, _)| eid.clone())
	}
}

pub type EvenRandom = RandomWalk<Uniform>;
pub type Random = RandomWalk<Weighted>;

impl EvenRandom {
	pub fn new(graph: Rc<Graph>, start: VertexId, seed: Option<u64>) -> Self {
		RandomWalk::new_with(graph, start, Uniform, seed)
	}
}

impl Random {
	pub fn new(graph: Rc<Graph>, start: VertexId, seed: Option<u64>) -> Self {
		RandomWalk::new_with(graph, start, Weighted, seed)
	}
}
