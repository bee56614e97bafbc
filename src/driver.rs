//! CLI wiring: reads one or more model files, combines them into a single
//! graph, resolves the planner/halt-condition/reporter specs, picks an
//! actor, and drives the run.

use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::{crate_version, App, Arg};

use crate::error::GraphWalkerError;
use crate::executor::{self, Actor, Executor, Logger, Mute, NoDebugger};
use crate::graph::Graph;
use crate::halt;
use crate::ids::VertexId;
use crate::planner::{self, MasterPlan, Planner};
use crate::reporter::{Log, PathRecorder, Print, Reporter, ReporterHerd};
use crate::step::Step;

pub struct RunConfig {
	pub positional: Vec<String>,
	pub start: Option<String>,
	pub planner_specs: Vec<String>,
	pub halt_spec: String,
	pub reporter_specs: Vec<String>,
	pub suite_name: Option<String>,
	pub test_name: Option<String>,
	pub debug: bool,
	pub debugger_spec: Option<String>,
	pub dry_run: bool,
	pub output: Option<String>,
}

pub fn cli() -> App<'static, 'static> {
	App::new("graphwalker")
		.version(crate_version!())
		.about("Plans and drives traversals of a graph-based finite-state model")
		.after_help("A plugin spec is \"Name:a,b,kw=val\": positional and keyword arguments are all passed to the plugin as strings.")
		.arg(Arg::with_name("modact").takes_value(true).required(true).multiple(true).value_name("MODEL|ACTOR").help(
			"One or more paths: all but the last are model files, combined in load order; the last is either another model (actor then defaults to a silent stub) or an actor plugin spec",
		))
		.arg(Arg::with_name("start").long("start").takes_value(true).help("Start vertex id (defaults to the model's own 'Start')"))
		.arg(Arg::with_name("planner").long("planner").alias("planners").takes_value(true).multiple(true).number_of_values(1).help(
			"Planner spec, e.g. 'Goto:Checkout,repeat=3' or 'Random:seed=42'; repeatable, chained into a MasterPlan in order given (default: Random)",
		))
		.arg(
			Arg::with_name("stopcond")
				.long("stopcond")
				.visible_aliases(&["halt", "halter", "stop", "until"])
				.takes_value(true)
				.default_value("Coverage")
				.help("Halt condition spec"),
		)
		.arg(Arg::with_name("reporter").long("reporter").alias("reporters").takes_value(true).multiple(true).number_of_values(1).help("Reporter spec(s); repeatable"))
		.arg(Arg::with_name("suite-name").long("suite-name").alias("suite").takes_value(true).help("Test suite name (default: \"graphwalker\")"))
		.arg(Arg::with_name("test-name").long("test-name").alias("test").takes_value(true).help("Test name (default: model basename + timestamp)"))
		.arg(Arg::with_name("debug").long("debug").takes_value(false).help("Enable the debugger hook before each step"))
		.arg(Arg::with_name("debugger").long("debugger").takes_value(true).help("Debugger spec, used only with --debug"))
		.arg(Arg::with_name("dry-run").short("n").long("dry-run").takes_value(false).help("Plan without dispatching to the actor"))
		.arg(Arg::with_name("output").short("o").long("output").takes_value(true).help("With --dry-run, write the planned path as JSON here instead of stdout"))
		.arg(Arg::with_name("list-planners").long("list-planners").takes_value(false).help("List built-in planners and exit"))
		.arg(Arg::with_name("list-stopconds").long("list-stopconds").alias("list-halter").takes_value(false).help("List built-in halt conditions and exit"))
		.arg(Arg::with_name("list-reporters").long("list-reporters").takes_value(false).help("List built-in reporters and exit"))
}

pub fn run_from_args() -> Result<(), GraphWalkerError> {
	let matches = cli().get_matches();

	if matches.is_present("list-planners") {
		for name in ["EvenRandom", "Random", "Euler", "Goto", "Interactive"] {
			println!("{}", name);
		}
		return Ok(());
	}
	if matches.is_present("list-stopconds") {
		for name in ["Never", "Seconds", "SeenSteps", "CountSteps", "Coverage"] {
			println!("{}", name);
		}
		return Ok(());
	}
	if matches.is_present("list-reporters") {
		for name in ["Print", "Log", "PathRecorder"] {
			println!("{}", name);
		}
		return Ok(());
	}

	let config = RunConfig {
		positional: matches.values_of("modact").unwrap().map(str::to_string).collect(),
		start: matches.value_of("start").map(str::to_string),
		planner_specs: matches.values_of("planner").map(|v| v.map(str::to_string).collect()).unwrap_or_else(|| vec!["Random".to_string()]),
		halt_spec: matches.value_of("stopcond").unwrap().to_string(),
		reporter_specs: matches.values_of("reporter").map(|v| v.map(str::to_string).collect()).unwrap_or_default(),
		suite_name: matches.value_of("suite-name").map(str::to_string),
		test_name: matches.value_of("test-name").map(str::to_string),
		debug: matches.is_present("debug"),
		debugger_spec: matches.value_of("debugger").map(str::to_string),
		dry_run: matches.is_present("dry-run"),
		output: matches.value_of("output").map(str::to_string),
	};

	run(config)
}

fn resolve_start(graph: &Graph, requested: Option<&str>) -> Result<VertexId, GraphWalkerError> {
	if let Some(id) = requested {
		return graph.vertex(id).map(|v| v.id.clone()).ok_or_else(|| GraphWalkerError::StartNotFound(id.to_string()));
	}
	graph
		.vertices()
		.find(|(_, v)| v.name == "Start")
		.or_else(|| graph.vertices().next())
		.map(|(id, _)| id.clone())
		.ok_or_else(|| GraphWalkerError::StartNotFound("Start".to_string()))
}

fn build_reporter(specs: &[String]) -> Box<dyn Reporter> {
	if specs.is_empty() {
		return Box::new(Print);
	}
	let members: Vec<Box<dyn Reporter>> = specs
		.iter()
		.map(|s| -> Box<dyn Reporter> {
			match s.as_str() {
				"Log" => Box::new(Log),
				"PathRecorder" => Box::new(PathRecorder::default()),
				_ => Box::new(Print),
			}
		})
		.collect();
	Box::new(ReporterHerd::new(members))
}

/// Resolves an actor plugin spec (a bare built-in name, since this crate
/// has no dynamic class loader) into an actor. `None` (no actor path was
/// given) falls back to a silent `Mute` actor, matching
/// `load_model_actor`'s `actor = 'graphwalker.dummy.Mute'` default.
fn build_actor(spec: Option<&str>) -> Box<dyn Actor> {
	match spec {
		Some("Logger") => Box::new(Logger),
		_ => Box::new(Mute),
	}
}

fn default_test_name(models: &[String]) -> String {
	let stamp = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0);
	let base = models.first().map(|p| p.rsplit('/').next().unwrap_or(p)).and_then(|f| f.split('.').next()).unwrap_or("graphwalker");
	format!("{}-{}", base, stamp)
}

pub fn run(config: RunConfig) -> Result<(), GraphWalkerError> {
	let (graph, actor_spec) = load_model_and_actor(&config.positional)?;
	let graph = Rc::new(graph);
	let start = resolve_start(&graph, config.start.as_deref())?;

	let mut planner = build_planner_chain(&config.planner_specs, &graph, &start)?;
	let mut halt = halt::build(&config.halt_spec, &graph)?;

	if config.dry_run {
		return dry_run(planner.as_mut(), halt.as_mut(), config.output.as_deref());
	}

	let mut reporter = build_reporter(&config.reporter_specs);
	let mut actor = build_actor(actor_spec.as_deref());
	let mut debugger: Box<dyn executor::Debugger> =
		if config.debug { executor::build_debugger(config.debugger_spec.as_deref().unwrap_or("Print")) } else { Box::new(NoDebugger) };

	let suite_name = config.suite_name.clone().unwrap_or_else(|| "graphwalker".to_string());
	let test_name = config.test_name.clone().unwrap_or_else(|| default_test_name(&config.positional));
	reporter.start_suite(&suite_name);

	let mut executor = Executor {
		planner: planner.as_mut(),
		halt: halt.as_mut(),
		actor: actor.as_mut(),
		reporter: reporter.as_mut(),
		debugger: debugger.as_mut(),
		test_name: &test_name,
	};
	executor.run()
}

/// Loads the model graph from `positional`, trying to fold every path into
/// it; the last path that fails to parse as a model is instead treated as
/// the actor's plugin spec, per spec.md §6.
fn load_model_and_actor(positional: &[String]) -> Result<(Graph, Option<String>), GraphWalkerError> {
	let mut iter = positional.iter();
	let first = iter.next().ok_or_else(|| GraphWalkerError::BadSpec("at least one model or actor path is required".into()))?;
	let mut graph = Graph::read(first)?;

	let rest: Vec<&String> = iter.collect();
	let (leading, last) = match rest.split_last() {
		Some((last, leading)) => (leading, Some(last)),
		None => (&rest[..], None),
	};

	for path in leading {
		graph = graph.combine(&Graph::read(*path)?)?;
	}

	let actor_spec = match last {
		None => None,
		Some(path) => match Graph::read(path) {
			Ok(other) => {
				graph = graph.combine(&other)?;
				None
			}
			Err(_) => Some((*path).clone()),
		},
	};

	graph.sanity_check()?;
	Ok((graph, actor_spec))
}

/// Builds every configured planner spec and chains them into a `MasterPlan`
/// when there's more than one, matching `planning.build`'s
/// `sum(planners, [])` flattening of repeated `--planner` flags.
fn build_planner_chain(specs: &[String], graph: &Rc<Graph>, start: &VertexId) -> Result<Box<dyn Planner>, GraphWalkerError> {
	let mut built: Vec<Box<dyn Planner>> = specs.iter().map(|s| planner::build(s, graph, start)).collect::<Result<_, _>>()?;
	if built.len() == 1 {
		Ok(built.pop().unwrap())
	} else {
		Ok(Box::new(MasterPlan::new(built)))
	}
}

/// Plans a full run without dispatching a single step to an actor, then
/// writes the resulting path as JSON to `output` (or stdout).
fn dry_run(planner: &mut dyn Planner, halt: &mut dyn halt::HaltCondition, output: Option<&str>) -> Result<(), GraphWalkerError> {
	let mut path: Vec<Step> = Vec::new();
	while !halt.is_done() {
		let step = match planner.next(halt) {
			Some(step) => step,
			None => break,
		};
		halt.add(&step);
		path.push(step);
	}

	let result = match output {
		Some(path_str) => serde_json::to_writer(&std::fs::File::create(path_str)?, &path),
		None => serde_json::to_writer(std::io::stdout(), &path),
	};
	result.map_err(|e| GraphWalkerError::BadSpec(format!("failed to write dry-run output: {}", e)))
}
