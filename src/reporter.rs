//! Reporters observe a run's lifecycle without influencing it: `initiate`
//! once at the start, `step_begin`/`step_end` around every dispatched step,
//! `finalize` once at the end (even on failure).

use crate::error::ActorError;
use crate::step::Step;

pub trait Reporter {
	/// Called once per driver invocation, before any test's steps run.
	fn start_suite(&mut self, _suite: &str) {}
	/// Called once per test, before its first step.
	fn initiate(&mut self, _test: &str) {}
	fn step_begin(&mut self, _step: &Step) {}
	fn step_end(&mut self, _step: &Step, _result: Result<(), &ActorError>) {}
	fn finalize(&mut self) {}
}

/// Prints each step's label to stdout as it's dispatched.
#[derive(Default)]
pub struct Print;

impl Reporter for Print {
	fn start_suite(&mut self, suite: &str) {
		println!("=== {} ===", suite);
	}

	fn initiate(&mut self, test: &str) {
		println!("--- {} ---", test);
	}

	fn step_end(&mut self, step: &Step, result: Result<(), &ActorError>) {
		match result {
			Ok(()) => println!("{}", step.label),
			Err(e) => println!("{} FAILED: {}", step.label, e),
		}
	}
}

/// Mirrors [`Print`] through the `log` crate instead of stdout.
#[derive(Default)]
pub struct Log;

impl Reporter for Log {
	fn start_suite(&mut self, suite: &str) {
		log::info!("suite {} started", suite);
	}

	fn initiate(&mut self, test: &str) {
		log::info!("test {} started", test);
	}

	fn step_end(&mut self, step: &Step, result: Result<(), &ActorError>) {
		match result {
			Ok(()) => log::info!("{}", step.label),
			Err(e) => log::error!("{} failed: {}", step.label, e),
		}
	}

	fn finalize(&mut self) {
		log::info!("run finished");
	}
}

/// Accumulates every step seen into an in-memory path, for tests and for
/// `--dry-run` summaries.
#[derive(Default)]
pub struct PathRecorder {
	pub path: Vec<Step>,
}

impl Reporter for PathRecorder {
	fn step_end(&mut self, step: &Step, _result: Result<(), &ActorError>) {
		self.path.push(step.clone());
	}
}

/// Fans every lifecycle call out to a list of sub-reporters, in order.
#[derive(Default)]
pub struct ReporterHerd {
	reporters: Vec<Box<dyn Reporter>>,
}

impl ReporterHerd {
	pub fn new(reporters: Vec<Box<dyn Reporter>>) -> Self {
		ReporterHerd { reporters }
	}
}

impl Reporter for ReporterHerd {
	fn start_suite(&mut self, suite: &str) {
		for r in &mut self.reporters {
			r.start_suite(suite);
		}
	}

	fn initiate(&mut self, test: &str) {
		for r in &mut self.reporters {
			r.initiate(test);
		}
	}

	fn step_begin(&mut self, step: &Step) {
		for r in &mut self.reporters {
			r.step_begin(step);
		}
	}

	fn step_end(&mut self, step: &Step, result: Result<(), &ActorError>) {
		for r in &mut self.reporters {
			r.step_end(step, result);
		}
	}

	fn finalize(&mut self) {
		for r in &mut self.reporters {
			r.finalize();
		}
	}
}
