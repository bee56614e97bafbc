//! Interactive planner: prompts on stdin for which outgoing edge to take.
//!
//! Command table: a digit picks that outgoing edge by index, yielding the
//! edge step followed by the vertex step it lands on; `h`/`?` print help
//! and re-prompt; `g <vertex>` routes there through an internal [`Goto`]
//! planner, yielding every step of the computed path; `j <vertex>` jumps
//! straight there without yielding a step, like a debugger repositioning
//! the walk; `d` drops into the debugger; `f <words>` injects one
//! synthetic step per whitespace-separated word; `q` ends the walk; an
//! empty line or an unrecognized command reprints the prompt.

use std::collections::VecDeque;
use std::io::BufRead;
use std::rc::Rc;

use crate::graph::Graph;
use crate::halt::{HaltCondition, Never};
use crate::ids::VertexId;
use crate::planner::{Goto, Planner};
use crate::step::Step;

pub struct Interactive<R> {
	graph: Rc<Graph>,
	current: VertexId,
	input: R,
	pending: VecDeque<Step>,
	done: bool,
}

impl Interactive<std::io::BufReader<std::io::Stdin>> {
	pub fn new(graph: Rc<Graph>, start: VertexId) -> Self {
		Interactive { graph, current: start, input: std::io::BufReader::new(std::io::stdin()), pending: VecDeque::new(), done: false }
	}
}

impl<R: BufRead> Interactive<R> {
	pub fn with_input(graph: Rc<Graph>, start: VertexId, input: R) -> Self {
		Interactive { graph, current: start, input, pending: VecDeque::new(), done: false }
	}

	fn outgoing_menu(&self) -> Vec<(usize, String)> {
		match self.graph.vertex(&self.current) {
			Some(v) => v
				.outgoing
				.iter()
				.enumerate()
				.filter_map(|(i, eid)| self.graph.edge(eid).map(|e| (i, e.name.clone())))
				.collect(),
			None => Vec::new(),
		}
	}

	fn print_help(&self) {
		println!("commands:");
		println!("  <n>        take outgoing edge n");
		println!("  g <vert>   route to vert via the shortest path");
		println!("  j <vert>   jump straight to vert");
		println!("  f <words>  inject one synthetic step per word");
		println!("  d          drop into the debugger");
		println!("  h, ?       show this help");
		println!("  q          end the walk");
		for (i, name) in self.outgoing_menu() {
			println!("  {}: {}", i, name);
		}
	}

	/// Finds a vertex by name-or-id, preferring an exact id match.
	fn find_vertex(&self, token: &str) -> Option<VertexId> {
		if let Some(v) = self.graph.vertex(token) {
			return Some(v.id.clone());
		}
		self.graph.vertices().find(|(_, v)| v.name == token).map(|(id, _)| id.clone())
	}

	fn take_edge(&mut self, index: usize) -> Option<Step> {
		let eid = self.graph.vertex(&self.current)?.outgoing.get(index)?.clone();
		let edge = self.graph.edge(&eid)?;
		self.current = edge.tgt.clone();
		Some(Step::from_edge(edge))
	}

	fn read_command(&mut self) -> Option<String> {
		let mut line = String::new();
		match self.input.read_line(&mut line) {
			Ok(0) => None,
			Ok(_) => Some(line.trim().to_string()),
			Err(_) => None,
		}
	}
}

impl<R: BufRead> Planner for Interactive<R> {
	fn next(&mut self, _halt: &dyn HaltCondition) -> Option<Step> {
		if let Some(step) = self.pending.pop_front() {
			return Some(step);
		}

		if self.done {
			return None;
		}

		loop {
			let cmd = match self.read_command() {
				Some(c) => c,
				None => {
					self.done = true;
					return None;
				}
			};

			if cmd.is_empty() {
				println!("huh?");
				continue;
			}

			let mut parts = cmd.splitn(2, char::is_whitespace);
			let head = parts.next().unwrap_or("");
			let rest = parts.next().unwrap_or("").trim();

			if let Ok(i) = head.parse::<usize>() {
				match self.take_edge(i) {
					Some(edge_step) => {
						self.pending.push_back(edge_step);
						self.pending.push_back(Step::from_vertex(self.graph.vertex(&self.current).expect("take_edge moved to a real vertex")));
						return self.pending.pop_front();
					}
					None => {
						println!("huh?");
						continue;
					}
				}
			}

			match head {
				"h" | "?" => {
					self.print_help();
				}
				"j" => match self.find_vertex(rest) {
					Some(v) => self.current = v,
					None => println!("huh?"),
				},
				"g" => match self.find_vertex(rest) {
					Some(v) => {
						let mut router = Goto::new(self.graph.clone(), self.current.clone(), vec![v.to_string()], 1, None);
						let never = Never;
						while let Some(step) = router.next(&never) {
							if matches!(step.kind, crate::step::StepKind::Vertex) {
								self.current = step.id.clone();
							}
							self.pending.push_back(step);
						}
						if let Some(step) = self.pending.pop_front() {
							return Some(step);
						}
						println!("huh?");
					}
					None => println!("huh?"),
				},
				"d" => {
					log::debug!("interactive: breakpoint requested at {:?}", self.current);
				}
				"f" => {
					for word in rest.split_whitespace() {
						self.pending.push_back(Step::synthetic(word));
					}
					if let Some(step) = self.pending.pop_front() {
						return Some(step);
					}
					println!("huh?");
				}
				"q" => {
					self.done = true;
					return None;
				}
				_ => println!("huh?"),
			}
		}
	}

	fn resume_from(&mut self, at: &VertexId) {
		self.current = at.clone();
		self.pending.clear();
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use std::sync::Arc;

	fn square() -> Rc<Graph> {
		let mut g = Graph::new();
		for id in ["a", "b", "c"] {
			g.add_vertex(Arc::from(id), None);
		}
		let (a, b, c): (VertexId, VertexId, VertexId) = (Arc::from("a"), Arc::from("b"), Arc::from("c"));
		g.add_edge(&a, &b, None, None).unwrap();
		g.add_edge(&a, &c, None, None).unwrap();
		Rc::new(g)
	}

	#[test]
	fn digit_picks_the_nth_outgoing_edge() {
		let g = square();
		let input = std::io::Cursor::new(b"0\n".to_vec());
		let mut p = Interactive::with_input(g, Arc::from("a"), input);
		let edge_step = p.next(&crate::halt::Never).unwrap();
		assert_eq!(edge_step.kind, crate::step::StepKind::Edge);
		let vertex_step = p.next(&crate::halt::Never).unwrap();
		assert_eq!(vertex_step.id.as_ref(), "b");
	}

	#[test]
	fn j_jumps_without_yielding_a_step() {
		let g = square();
		let input = std::io::Cursor::new(b"j c\n0\n".to_vec());
		let mut p = Interactive::with_input(g, Arc::from("a"), input);
		// after jumping to c, c has no outgoing edges, so "0" falls through
		// to the reprompt and only "q" (implicit EOF here) ends the walk.
		assert!(p.next(&crate::halt::Never).is_none());
	}

	#[test]
	fn g_routes_through_a_goto_planner() {
		let g = square();
		let input = std::io::Cursor::new(b"g c\n".to_vec());
		let mut p = Interactive::with_input(g, Arc::from("a"), input);
		let step = p.next(&crate::halt::Never).unwrap();
		assert_eq!(step.kind, crate::step::StepKind::Edge);
		let step = p.next(&crate::halt::Never).unwrap();
		assert_eq!(step.id.as_ref(), "c");
	}

	#[test]
	fn f_injects_one_synthetic_step_per_word() {
		let g = square();
		let input = std::io::Cursor::new(b"f one two\n".to_vec());
		let mut p = Interactive::with_input(g, Arc::from("a"), input);
		let first = p.next(&crate::halt::Never).unwrap();
		assert_eq!(first.label, "one");
		let second = p.next(&crate::halt::Never).unwrap();
		assert_eq!(second.label, "two");
	}

	#[test]
	fn f_injects_a_synthetic_step() {
		let g = square();
		let input = std::io::Cursor::new(b"f oops\n".to_vec());
		let mut p = Interactive::with_input(g, Arc::from("a"), input);
		let step = p.next(&crate::halt::Never).unwrap();
		assert_eq!(step.label, "oops");
		assert_eq!(step.kind, crate::step::StepKind::Synthetic);
	}

	#[test]
	fn q_ends_the_walk() {
		let g = square();
		let input = std::io::Cursor::new(b"q\n".to_vec());
		let mut p = Interactive::with_input(g, Arc::from("a"), input);
		assert!(p.next(&crate::halt::Never).is_none());
	}

	#[test]
	fn unknown_command_reprompts_then_reads_next_line() {
		let g = square();
		let input = std::io::Cursor::new(b"zzz\n0\n".to_vec());
		let mut p = Interactive::with_input(g, Arc::from("a"), input);
		p.next(&crate::halt::Never).unwrap(); // the edge step
		let step = p.next(&crate::halt::Never).unwrap();
		assert_eq!(step.id.as_ref(), "b");
	}
}
