//! End-to-end scenarios exercising planner + halt + executor together.

use std::collections::HashSet;
use std::rc::Rc;
use std::sync::Arc;

use graphwalker::error::ActorError;
use graphwalker::executor::{Actor, Executor, NoDebugger, StepOutcome};
use graphwalker::graph::Graph;
use graphwalker::halt;
use graphwalker::ids::VertexId;
use graphwalker::planner::{self, EvenRandom, Goto};
use graphwalker::reporter::PathRecorder;

fn linear_graph() -> Rc<Graph> {
	let verts = vec![("v0".into(), "Start".into()), ("v1".into(), "a".into()), ("v2".into(), "b".into()), ("v3".into(), "c".into())];
	let edges = vec![
		("e0".into(), "edge0".into(), "v0".into(), "v1".into()),
		("e1".into(), "edge1".into(), "v1".into(), "v2".into()),
		("e2".into(), "edge2".into(), "v2".into(), "v3".into()),
	];
	Rc::new(Graph::build(verts, edges))
}

#[derive(Default)]
struct RecordingActor {
	calls: Vec<String>,
}

impl Actor for RecordingActor {
	fn call(&mut self, method: &str) -> Result<(), ActorError> {
		self.calls.push(method.to_string());
		Ok(())
	}
}

#[test]
fn linear_walk_covers_every_edge_and_then_halts() {
	let g = linear_graph();
	let mut planner: Box<dyn planner::Planner> = Box::new(EvenRandom::new(g.clone(), Arc::from("v0"), None));
	let mut halt = halt::build("Coverage:edges=100", &g).unwrap();
	let mut actor = RecordingActor::default();
	let mut reporter = PathRecorder::default();
	let mut debugger = NoDebugger;

	{
		let mut exec = Executor {
			planner: planner.as_mut(),
			halt: halt.as_mut(),
			actor: &mut actor,
			reporter: &mut reporter,
			debugger: &mut debugger,
			test_name: "test",
		};
		exec.run().unwrap();
	}

	assert_eq!(actor.calls, vec!["edge0", "a", "edge1", "b", "edge2"]);
	assert_eq!(reporter.path.len(), 5);
}

#[test]
fn goto_visits_each_named_goal_in_order_around_a_cycle() {
	let mut g = Graph::new();
	for id in ["a", "b", "c", "d"] {
		g.add_vertex(Arc::from(id), None);
	}
	let ids: Vec<VertexId> = vec!["a", "b", "c", "d"].into_iter().map(Arc::from).collect();
	g.add_edge(&ids[0], &ids[1], None, None).unwrap();
	g.add_edge(&ids[1], &ids[2], None, None).unwrap();
	g.add_edge(&ids[2], &ids[3], None, None).unwrap();
	g.add_edge(&ids[3], &ids[0], None, None).unwrap();
	let g = Rc::new(g);

	let mut p = Goto::new(g.clone(), Arc::from("a"), vec!["d".into(), "c".into(), "b".into(), "a".into()], 1, None);
	let halt = halt::Never;
	let mut visited = Vec::new();
	while let Some(step) = planner::Planner::next(&mut p, &halt) {
		if matches!(step.kind, graphwalker::step::StepKind::Vertex) {
			visited.push(step.id.to_string());
		}
	}
	assert_eq!(visited, vec!["b", "c", "d", "a", "b", "c", "d", "a", "b", "c", "d", "a"]);
}

struct FailsOn(String);

impl Actor for FailsOn {
	fn call(&mut self, method: &str) -> Result<(), ActorError> {
		if method == self.0 {
			return Err(ActorError::Failed { method: method.to_string(), reason: "boom".to_string() });
		}
		Ok(())
	}
}

#[test]
fn actor_failure_aborts_the_run_but_still_tears_down() {
	let g = linear_graph();
	let mut planner: Box<dyn planner::Planner> = Box::new(EvenRandom::new(g.clone(), Arc::from("v0"), None));
	let mut halt = halt::build("Never", &g).unwrap();
	let mut actor = FailsOn("edge1".to_string());
	let mut reporter = PathRecorder::default();
	let mut debugger = NoDebugger;

	let result = {
		let mut exec = Executor {
			planner: planner.as_mut(),
			halt: halt.as_mut(),
			actor: &mut actor,
			reporter: &mut reporter,
			debugger: &mut debugger,
			test_name: "test",
		};
		exec.run()
	};

	assert!(result.is_err());
	assert_eq!(reporter.path.last().unwrap().label, "edge1");
}

struct RecoveringActor {
	fails_on: String,
	calls: Vec<String>,
}

impl Actor for RecoveringActor {
	fn call(&mut self, method: &str) -> Result<(), ActorError> {
		self.calls.push(method.to_string());
		if method == self.fails_on {
			return Err(ActorError::Failed { method: method.to_string(), reason: "boom".to_string() });
		}
		Ok(())
	}

	fn step_end(&mut self, _step: &graphwalker::step::Step, failed: Option<&ActorError>) -> StepOutcome {
		if failed.is_some() {
			StepOutcome::Recover
		} else {
			StepOutcome::Continue
		}
	}
}

#[test]
fn actor_recovering_from_a_step_failure_keeps_the_run_going() {
	let g = linear_graph();
	let mut planner: Box<dyn planner::Planner> = Box::new(EvenRandom::new(g.clone(), Arc::from("v0"), None));
	let mut halt = halt::build("Coverage:edges=100", &g).unwrap();
	let mut actor = RecoveringActor { fails_on: "edge1".to_string(), calls: Vec::new() };
	let mut reporter = PathRecorder::default();
	let mut debugger = NoDebugger;

	let result = {
		let mut exec = Executor {
			planner: planner.as_mut(),
			halt: halt.as_mut(),
			actor: &mut actor,
			reporter: &mut reporter,
			debugger: &mut debugger,
			test_name: "test",
		};
		exec.run()
	};

	assert!(result.is_ok());
	assert_eq!(actor.calls, vec!["edge0", "a", "edge1", "b", "edge2"]);
}

#[test]
fn combine_rejects_duplicate_vertex_ids() {
	let mut a = Graph::new();
	a.add_vertex(Arc::from("x"), None);
	let mut b = Graph::new();
	b.add_vertex(Arc::from("x"), None);
	assert!(a.combine(&b).is_err());
}

#[test]
fn seeded_random_walk_is_reproducible_across_runs() {
	let verts = vec![("a".into(), "a".into()), ("b".into(), "b".into()), ("c".into(), "c".into())];
	let edges = vec![
		("e0".into(), "to-b\nweight=50%".into(), "a".into(), "b".into()),
		("e1".into(), "to-c\nweight=50%".into(), "a".into(), "c".into()),
	];
	let g = Rc::new(Graph::build(verts, edges));

	let run = || {
		let mut p = planner::build("Random:seed=7", &g, &Arc::from("a")).unwrap();
		let halt = halt::Never;
		(0..6).filter_map(|_| planner::Planner::next(p.as_mut(), &halt).map(|s| s.id.to_string())).collect::<Vec<_>>()
	};

	assert_eq!(run(), run());
}

#[test]
fn dot_codec_round_trips_through_a_file() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("model.dot");

	let verts = vec![("v0".into(), "Start".into()), ("v1".into(), "Done".into())];
	let edges = vec![("e0".into(), "go".into(), "v0".into(), "v1".into())];
	let g = Graph::build(verts, edges);
	g.write(&path, "G", &HashSet::new()).unwrap();

	let reloaded = Graph::read(&path).unwrap();
	assert_eq!(reloaded.vertex_count(), 2);
	assert_eq!(reloaded.edge_count(), 1);
}
