//! Drives a planner against an actor: pulls steps, dispatches each step's
//! label to a method call on the actor, reports progress, and stops on the
//! halt condition or the first actor failure.

use crate::error::{ActorError, GraphWalkerError};
use crate::halt::HaltCondition;
use crate::planner::Planner;
use crate::reporter::Reporter;
use crate::step::Step;

/// What an actor's `step_end` hook decides for a step that failed:
/// swallow the failure and keep walking, or let it propagate and end the
/// run. Has no effect on a step that succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
	Continue,
	Recover,
}

/// What the executor dispatches each step to. `call` receives the method
/// name already extracted from the step's label (see [`method_name`]);
/// empty-labeled steps are never dispatched at all.
pub trait Actor {
	fn setup(&mut self) -> Result<(), ActorError> {
		Ok(())
	}

	/// Consulted right before a non-empty-label step is dispatched, mirroring
	/// the reporter's own `step_begin`.
	fn step_begin(&mut self, _step: &Step) {}

	fn call(&mut self, method: &str) -> Result<(), ActorError>;

	/// Consulted after every dispatched step, whether or not it failed.
	/// Returning [`StepOutcome::Recover`] for a failed step clears the
	/// failure and lets the run continue instead of aborting.
	fn step_end(&mut self, _step: &Step, _failed: Option<&ActorError>) -> StepOutcome {
		StepOutcome::Continue
	}

	fn teardown(&mut self) -> Result<(), ActorError> {
		Ok(())
	}
}

/// An actor that does nothing and always succeeds, used when no real actor
/// is configured (dry runs, planner-only smoke tests).
#[derive(Default)]
pub struct Mute;

impl Actor for Mute {
	fn call(&mut self, _method: &str) -> Result<(), ActorError> {
		Ok(())
	}
}

/// An actor that logs every call at info level and always succeeds, handy
/// for watching a plan unfold without wiring up a real system under test.
#[derive(Default)]
pub struct Logger;

impl Actor for Logger {
	fn call(&mut self, method: &str) -> Result<(), ActorError> {
		log::info!("actor call: {}", method);
		Ok(())
	}
}

/// A debugger hook consulted when a dispatched step's actor call fails,
/// e.g. to drop into a breakpoint. Purely a side effect: it cannot itself
/// fail the run or clear the captured failure (that's `step_end`'s job).
pub trait Debugger {
	fn on_failure(&mut self, step: &Step, error: &ActorError);
}

/// A no-op debugger, the default when none is configured.
pub struct NoDebugger;

impl Debugger for NoDebugger {
	fn on_failure(&mut self, _step: &Step, _error: &ActorError) {}
}

/// Logs the failing step at debug level; the portable stand-in for the
/// original's `pdb.set_trace()` hook, which has no equivalent outside an
/// interactive Python session.
pub struct PrintDebugger;

impl Debugger for PrintDebugger {
	fn on_failure(&mut self, step: &Step, error: &ActorError) {
		log::debug!("breakpoint: step {:?} failed: {}", step.label, error);
	}
}

/// Resolves a `--debugger` spec name into a built-in debugger.
pub fn build_debugger(spec: &str) -> Box<dyn Debugger> {
	match spec {
		"Print" => Box::new(PrintDebugger),
		_ => Box::new(NoDebugger),
	}
}

/// Extracts the dispatch method name from a step label: everything up to
/// (but not including) the first `[` or `/`, whichever comes first.
pub fn method_name(label: &str) -> &str {
	let cut = label.find(['[', '/']).unwrap_or(label.len());
	label[..cut].trim()
}

pub struct Executor<'a> {
	pub planner: &'a mut dyn Planner,
	pub halt: &'a mut dyn HaltCondition,
	pub actor: &'a mut dyn Actor,
	pub reporter: &'a mut dyn Reporter,
	pub debugger: &'a mut dyn Debugger,
	pub test_name: &'a str,
}

impl<'a> Executor<'a> {
	/// Runs the plan to completion: until the halt condition trips, the
	/// planner has nothing more to offer, or the actor/debugger fails on a
	/// step — whichever comes first. Always calls `teardown` and
	/// `reporter.finalize`, even on failure.
	pub fn run(&mut self) -> Result<(), GraphWalkerError> {
		self.reporter.initiate(self.test_name);
		self.actor.setup().map_err(GraphWalkerError::Actor)?;

		let result = self.drive();

		let teardown_result = self.actor.teardown();
		self.reporter.finalize();

		result.and(teardown_result.map_err(GraphWalkerError::Actor))
	}

	fn drive(&mut self) -> Result<(), GraphWalkerError> {
		while !self.halt.is_done() {
			let step = match self.planner.next(self.halt) {
				Some(step) => step,
				None => break,
			};

			self.reporter.step_begin(&step);

			let mut failure: Option<ActorError> = None;
			if !step.is_empty_label() {
				self.actor.step_begin(&step);
				let method = method_name(&step.label);
				if let Err(e) = self.actor.call(method) {
					failure = Some(e);
				}
			}

			if let Some(e) = &failure {
				self.debugger.on_failure(&step, e);
			}

			let outcome = self.actor.step_end(&step, failure.as_ref());
			self.reporter.step_end(&step, failure.as_ref().map_or(Ok(()), Err));
			self.halt.add(&step);

			if let Some(e) = failure {
				if outcome != StepOutcome::Recover {
					return Err(GraphWalkerError::Actor(e));
				}
			}
		}
		Ok(())
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn method_name_strips_bracket_suffix() {
		assert_eq!(method_name("login[admin]"), "login");
	}

	#[test]
	fn method_name_strips_slash_suffix() {
		assert_eq!(method_name("login/retry"), "login");
	}

	#[test]
	fn method_name_keeps_plain_label() {
		assert_eq!(method_name("login"), "login");
	}

	#[test]
	fn method_name_prefers_earliest_delimiter() {
		assert_eq!(method_name("a/b[c]"), "a");
		assert_eq!(method_name("a[b]/c"), "a");
	}
}
