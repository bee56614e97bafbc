//! Plugin spec string parsing: `module.Class:a,b,kw=val,kw2=val2`.
//!
//! The original loads `module.Class` by reflection; the portable equivalent
//! (spec.md §9) is a built-in registry keyed by the class name, so here we
//! only keep the name (ignoring any module qualification) plus positional
//! and keyword arguments.

use indexmap::IndexMap;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PluginSpec {
	pub name: String,
	pub args: Vec<String>,
	pub kwargs: IndexMap<String, String>,
}

impl PluginSpec {
	pub fn kw(&self, key: &str) -> Option<&str> {
		self.kwargs.get(key).map(String::as_str)
	}

	pub fn kw_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
		self.kw(key).unwrap_or(default)
	}
}

pub fn parse_spec(spec: &str) -> PluginSpec {
	let (head, rest) = match spec.split_once(':') {
		Some((h, r)) => (h, r),
		None => (spec, ""),
	};
	let name = head.rsplit('.').next().unwrap_or(head).to_string();

	let mut args = Vec::new();
	let mut kwargs = IndexMap::new();
	for part in rest.split(',') {
		if part.is_empty() {
			continue;
		}
		match part.split_once('=') {
			Some((k, v)) => {
				kwargs.insert(k.to_string(), v.to_string());
			}
			None => args.push(part.to_string()),
		}
	}

	PluginSpec { name, args, kwargs }
}
