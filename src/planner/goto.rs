//! Goto planner: drives the actor through a fixed sequence of named goal
//! vertices (or `"random"` for a randomly chosen one each time), repeating
//! `repeat` times. `repeat == 0` means repeat forever — a deliberately
//! preserved hazard: paired with a halt condition that never trips, this
//! never stops. A goal that turns out unreachable from the current
//! position is logged and skipped; the loop over the remaining goals (and
//! remaining repeats) carries on rather than aborting the whole plan.

use std::collections::VecDeque;
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::graph::{Graph, INF};
use crate::halt::HaltCondition;
use crate::ids::VertexId;
use crate::planner::Planner;
use crate::step::Step;

enum Goal {
	Named(String),
	Random,
}

pub struct Goto {
	graph: Rc<Graph>,
	goals: Vec<Goal>,
	repeat: u64,
	rng: StdRng,
	current: VertexId,
	goal_idx: usize,
	loops_done: u64,
	pending: VecDeque<Step>,
}

impl Goto {
	pub fn new(graph: Rc<Graph>, start: VertexId, goal_names: Vec<String>, repeat: u64, seed: Option<u64>) -> Self {
		let goals = goal_names.into_iter().map(|name| if name == "random" { Goal::Random } else { Goal::Named(name) }).collect();
		let rng = match seed {
			Some(s) => StdRng::seed_from_u64(s),
			None => StdRng::from_entropy(),
		};
		Goto { graph, goals, repeat, rng, current: start, goal_idx: 0, loops_done: 0, pending: VecDeque::new() }
	}

	/// Picks the minimum-cost reachable vertex whose name or id matches
	/// `goal`, excluding the current vertex itself.
	fn resolve_named(&self, goal: &str) -> Option<VertexId> {
		let d = self.graph.all_pairs_shortest_path();
		self.graph
			.vertices()
			.filter(|(id, v)| (v.name == goal || id.as_ref() == goal) && id.as_ref() != self.current.as_ref())
			.filter_map(|(id, _)| d.get(&(self.current.clone(), id.clone())).filter(|(cost, _)| *cost < INF).map(|(cost, _)| (*cost, id.clone())))
			.min_by_key(|(cost, _)| *cost)
			.map(|(_, id)| id)
	}

	fn resolve(&mut self, goal: usize) -> Option<VertexId> {
		match &self.goals[goal] {
			Goal::Named(name) => self.resolve_named(name),
			Goal::Random => {
				let n = self.graph.vertex_count();
				if n == 0 {
					return None;
				}
				let i = self.rng.gen_range(0..n);
				self.graph.vertices().nth(i).map(|(id, _)| id.clone())
			}
		}
	}

	fn queue_path_to(&mut self, target: &VertexId) {
		if target.as_ref() == self.current.as_ref() {
			return;
		}
		let d = self.graph.all_pairs_shortest_path();
		match d.get(&(self.current.clone(), target.clone())) {
			Some((cost, path)) if *cost < INF => {
				let mut cur = self.current.clone();
				for v in path {
					if let Some(eid) = self.graph.vertex(&cur).and_then(|vert| vert.outgoing.iter().find(|eid| self.graph.edge(eid).map_or(false, |e| &e.tgt == v)).cloned()) {
						self.pending.push_back(Step::from_edge(self.graph.edge(&eid).unwrap()));
					}
					self.pending.push_back(Step::from_vertex(self.graph.vertex(v).unwrap()));
					cur = v.clone();
				}
				self.current = target.clone();
			}
			_ => {
				log::warn!("Goto: {:?} is unreachable from {:?}, skipping this goal", target, self.current);
			}
		}
	}
}

impl Planner for Goto {
	fn next(&mut self, halt: &dyn HaltCondition) -> Option<Step> {
		loop {
			if let Some(step) = self.pending.pop_front() {
				return Some(step);
			}
			if halt.is_done() || self.goals.is_empty() {
				return None;
			}
			if self.goal_idx >= self.goals.len() {
				self.goal_idx = 0;
				self.loops_done += 1;
				if self.repeat != 0 && self.loops_done >= self.repeat {
					return None;
				}
			}
			let idx = self.goal_idx;
			self.goal_idx += 1;
			match self.resolve(idx) {
				Some(target) => self.queue_path_to(&target),
				None => {
					if let Goal::Named(name) = &self.goals[idx] {
						log::warn!("Goto: {:?} is unreachable from {:?}, skipping this goal", name, self.current);
					}
				}
			}
		}
	}

	fn resume_from(&mut self, at: &VertexId) {
		self.current = at.clone();
		self.pending.clear();
		self.goal_idx = 0;
		self.loops_done = 0;
	}
}
