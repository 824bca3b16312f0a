//! The public router matcher: route registration, removal and resolution.
//!
//! [`RouterMatcher`] owns a [`MatcherTree`] and is the only way to mutate it.
//! Registration is atomic: a definition (with its aliases and children) is
//! either fully reachable afterwards or the tree is left untouched.

use crate::config::{MatcherConfig, ParserOptions, RouteTable};
use crate::error::{ConfigResult, MatcherError, MatcherResult};
use crate::location::{LocationRequest, MatcherLocation, RouteRef};
use crate::matcher::{MatcherId, RecordMatcher};
use crate::record::{RawParams, RouteDefinition, RouteMeta, RouteName, RouteParams, RouteRecord};
use crate::tree::MatcherTree;
use crate::validation::{
	check_legacy_catch_all, check_missing_params_in_absolute_path, check_same_name_as_ancestor,
	check_same_params,
};
use std::sync::Arc;

/// Handle returned by [`RouterMatcher::add_route`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteRegistration {
	id: MatcherId,
}

impl RouteRegistration {
	/// The canonical matcher created for the definition.
	pub fn id(&self) -> MatcherId {
		self.id
	}

	/// Removes the registered route with its children and aliases.
	///
	/// Returns `false` if it was already removed.
	pub fn remove(self, matcher: &mut RouterMatcher) -> bool {
		matcher.remove_matcher(self.id)
	}
}

/// Matchers created by one `add_route` call.
#[derive(Debug, Default)]
struct Registration {
	// every stored matcher, for rollback
	created: Vec<MatcherId>,
	// matchable ones, in insertion order
	pending: Vec<MatcherId>,
}

/// Resolves locations against a set of registered routes.
///
/// # Examples
///
/// ```
/// use waymark_matcher::{LocationRequest, MatcherLocation, RouteDefinition, RouterMatcher};
///
/// let matcher = RouterMatcher::with_routes(
///     [
///         RouteDefinition::new("/").with_name("home"),
///         RouteDefinition::new("/users/:id").with_name("user"),
///     ],
///     Default::default(),
/// )
/// .unwrap();
///
/// let location = matcher
///     .resolve(
///         &LocationRequest::named("user").with_param("id", "1"),
///         &MatcherLocation::start(),
///     )
///     .unwrap();
///
/// assert_eq!(location.path, "/users/1");
/// ```
#[derive(Debug, Clone, Default)]
pub struct RouterMatcher {
	tree: MatcherTree,
	config: MatcherConfig,
}

fn join_paths(parent: &str, path: &str) -> String {
	if path.starts_with('/') {
		return path.to_string();
	}
	let mut joined = parent.to_string();
	if !path.is_empty() {
		if !parent.ends_with('/') {
			joined.push('/');
		}
		joined.push_str(path);
	}
	joined
}

fn name_field(name: Option<&RouteName>) -> String {
	name.map(ToString::to_string).unwrap_or_default()
}

fn apply_params(target: &mut RouteParams, params: &RawParams) {
	for (key, value) in params {
		match value {
			Some(value) => {
				target.insert(key.clone(), value.clone());
			}
			None => {
				target.remove(key);
			}
		}
	}
}

impl RouterMatcher {
	/// Creates an empty matcher.
	pub fn new(config: MatcherConfig) -> Self {
		Self {
			tree: MatcherTree::new(),
			config,
		}
	}

	/// Creates a matcher and registers `routes` in order.
	pub fn with_routes(
		routes: impl IntoIterator<Item = RouteDefinition>,
		config: MatcherConfig,
	) -> MatcherResult<Self> {
		let mut matcher = Self::new(config);
		for route in routes {
			matcher.add_route(&route, None)?;
		}
		Ok(matcher)
	}

	/// Creates a matcher from a declarative route table.
	pub fn from_table(table: RouteTable) -> MatcherResult<Self> {
		table.into_matcher()
	}

	/// Creates a matcher from a TOML route table.
	pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
		Ok(RouteTable::from_toml_str(source)?.into_matcher()?)
	}

	/// Creates a matcher from a JSON route table.
	pub fn from_json_str(source: &str) -> ConfigResult<Self> {
		Ok(RouteTable::from_json_str(source)?.into_matcher()?)
	}

	/// Global configuration.
	pub fn config(&self) -> &MatcherConfig {
		&self.config
	}

	/// Registers a definition, its aliases and its children.
	///
	/// `parent` nests the definition under an existing matcher. Any
	/// non-alias record, nested or not, whose name is already registered
	/// replaces the route holding that name once the new one is in place.
	///
	/// # Errors
	///
	/// Pattern errors and validation failures are returned before anything
	/// becomes reachable; the tree is left as it was.
	pub fn add_route(
		&mut self,
		definition: &RouteDefinition,
		parent: Option<MatcherId>,
	) -> MatcherResult<RouteRegistration> {
		if let Some(id) = parent
			&& !self.tree.contains(id)
		{
			return Err(MatcherError::MatcherNotFound {
				location: format!("parent matcher {id}"),
			});
		}

		let mut registration = Registration::default();
		let id = match self.register(definition, parent, None, &mut registration) {
			Ok(id) => id,
			Err(e) => {
				for id in registration.created.iter().rev() {
					self.tree.remove(*id);
				}
				tracing::debug!(path = %definition.path, error = %e, "route rejected");
				return Err(e);
			}
		};

		for pending in registration.pending {
			self.evict_same_name(pending);
			self.tree.insert(pending);
			if let Some(matcher) = self.tree.get(pending) {
				tracing::debug!(
					path = %matcher.path(),
					name = %name_field(matcher.name()),
					alias = matcher.is_alias(),
					"route registered"
				);
			}
		}

		Ok(RouteRegistration { id })
	}

	// Removes the route currently holding the name of a canonical matcher
	// about to be indexed, at any nesting level.
	fn evict_same_name(&mut self, id: MatcherId) {
		let previous = self
			.tree
			.get(id)
			.filter(|matcher| !matcher.is_alias())
			.and_then(RecordMatcher::name)
			.and_then(|name| self.tree.get_by_name(name))
			.map(RecordMatcher::id)
			.filter(|previous| *previous != id);

		if let Some(previous) = previous {
			if let Some(name) = self.tree.get(previous).and_then(RecordMatcher::name) {
				tracing::debug!(name = %name, "replacing route with the same name");
			}
			self.remove_matcher(previous);
		}
	}

	/// Registers a definition as a child of the route named `parent`.
	pub fn add_child_route(
		&mut self,
		parent: &RouteName,
		definition: &RouteDefinition,
	) -> MatcherResult<RouteRegistration> {
		let parent = self
			.tree
			.get_by_name(parent)
			.map(RecordMatcher::id)
			.ok_or_else(|| MatcherError::MatcherNotFound {
				location: format!("parent route \"{parent}\""),
			})?;
		self.add_route(definition, Some(parent))
	}

	fn register(
		&mut self,
		definition: &RouteDefinition,
		parent: Option<MatcherId>,
		original: Option<MatcherId>,
		registration: &mut Registration,
	) -> MatcherResult<MatcherId> {
		check_legacy_catch_all(&definition.path)?;
		for alias in &definition.alias {
			check_legacy_catch_all(alias)?;
		}

		let options = ParserOptions::resolve(&self.config.options, &definition.options);
		let parent_path = parent
			.and_then(|id| self.tree.get(id))
			.map(|matcher| matcher.path().to_string());
		let compose = |path: &str| match &parent_path {
			Some(parent_path) => join_paths(parent_path, path),
			None => path.to_string(),
		};

		let mut main = RouteRecord::new(definition, compose(&definition.path));
		main.alias_of = original.and_then(|id| self.tree.get(id)).map(|m| Arc::clone(&m.record));
		let main = Arc::new(main);
		let alias_target = main.alias_of.clone().unwrap_or_else(|| Arc::clone(&main));

		let mut records = vec![(definition.path.as_str(), main)];
		for alias in &definition.alias {
			records.push((alias.as_str(), Arc::new(RouteRecord::alias(&alias_target, compose(alias)))));
		}

		let mut original = original;
		let mut main_id = None;

		for (raw_path, record) in records {
			let id = self.tree.allocate_id();
			let mut matcher = RecordMatcher::compile(id, record, parent, options)?;

			if let Some(parent) = parent.and_then(|id| self.tree.get(id))
				&& raw_path.starts_with('/')
			{
				check_missing_params_in_absolute_path(&matcher, parent)?;
			}
			if original.is_none()
				&& let Some(name) = matcher.name()
			{
				check_same_name_as_ancestor(&self.tree, name, parent)?;
			}

			matcher.alias_of = original;
			let is_alias = matcher.is_alias();
			self.tree.store(matcher);
			registration.created.push(id);

			if let Some(parent) = parent.and_then(|id| self.tree.get_mut(id))
				&& parent.is_alias() == is_alias
			{
				parent.children.push(id);
			}

			if let Some(original_id) = original {
				if let Some(canonical) = self.tree.get_mut(original_id) {
					canonical.alias.push(id);
				}
				if let (Some(canonical), Some(alias)) = (self.tree.get(original_id), self.tree.get(id)) {
					check_same_params(canonical, alias)?;
				}
			}

			for (index, child) in definition.children.iter().enumerate() {
				let child_original = original
					.and_then(|id| self.tree.get(id))
					.and_then(|canonical| canonical.children().get(index).copied());
				self.register(child, Some(id), child_original, registration)?;
			}

			original = original.or(Some(id));
			main_id = main_id.or(Some(id));

			if self.tree.get(id).is_some_and(RecordMatcher::is_matchable) {
				registration.pending.push(id);
			}
		}

		main_id.ok_or_else(|| MatcherError::MatcherNotFound {
			location: format!("path \"{}\"", definition.path),
		})
	}

	/// Removes a route with its children and aliases.
	///
	/// Returns `false` when nothing was registered under the reference.
	pub fn remove_route(&mut self, route: impl Into<RouteRef>) -> bool {
		match route.into() {
			RouteRef::Name(name) => match self.tree.get_by_name(&name).map(RecordMatcher::id) {
				Some(id) => self.remove_matcher(id),
				None => false,
			},
			RouteRef::Matcher(id) => self.remove_matcher(id),
		}
	}

	/// Removes a matcher, then its children and aliases recursively.
	pub fn remove_matcher(&mut self, id: MatcherId) -> bool {
		let Some(matcher) = self.tree.remove(id) else {
			return false;
		};
		tracing::debug!(
			path = %matcher.path(),
			name = %name_field(matcher.name()),
			"route removed"
		);
		for child in matcher.children {
			self.remove_matcher(child);
		}
		for alias in matcher.alias {
			self.remove_matcher(alias);
		}
		true
	}

	/// Every matchable route: exact paths first, then the trie depth-first.
	pub fn get_routes(&self) -> Vec<&RecordMatcher> {
		self.tree.to_array()
	}

	/// The canonical matcher registered under `name`.
	pub fn get_record_matcher(&self, name: &RouteName) -> Option<&RecordMatcher> {
		self.tree.get_by_name(name)
	}

	/// A matcher by id, including grouping records.
	pub fn get_matcher(&self, id: MatcherId) -> Option<&RecordMatcher> {
		self.tree.get(id)
	}

	/// Whether a route is registered under `name`.
	pub fn has_route(&self, name: &RouteName) -> bool {
		self.tree.get_by_name(name).is_some()
	}

	/// Removes every route.
	pub fn clear_routes(&mut self) {
		self.tree.clear();
		tracing::debug!("routes cleared");
	}

	/// Resolves a location request.
	///
	/// `current` is only read for named and relative requests.
	///
	/// # Errors
	///
	/// - [`MatcherError::MatcherNotFound`] for an unknown name, or a relative request
	///   whose current location resolves to nothing
	/// - [`MatcherError::Stringify`] when the merged params do not fit the pattern
	///
	/// A path that matches nothing is not an error: the result has an empty
	/// `matched` list.
	pub fn resolve(
		&self,
		location: &LocationRequest,
		current: &MatcherLocation,
	) -> MatcherResult<MatcherLocation> {
		let (matcher, path, params) = match location {
			LocationRequest::Named { name, params } => {
				let matcher =
					self.tree
						.get_by_name(name)
						.ok_or_else(|| MatcherError::MatcherNotFound {
							location: format!("name \"{name}\""),
						})?;
				let keys = matcher.parser().keys();

				let discarded: Vec<&str> = params
					.keys()
					.filter(|param| !keys.iter().any(|key| &key.name == *param))
					.map(String::as_str)
					.collect();
				if !discarded.is_empty() {
					tracing::warn!(
						name = %name,
						params = ?discarded,
						"discarded invalid params for named route"
					);
				}

				let parent_optional: Vec<&str> = matcher
					.parent()
					.and_then(|id| self.tree.get(id))
					.map(|parent| {
						parent
							.parser()
							.keys()
							.iter()
							.filter(|key| key.optional)
							.map(|key| key.name.as_str())
							.collect()
					})
					.unwrap_or_default();

				let mut merged: RouteParams = current
					.params
					.iter()
					.filter(|(param, _)| {
						keys.iter().any(|key| !key.optional && &key.name == *param)
							|| parent_optional.contains(&param.as_str())
					})
					.map(|(param, value)| (param.clone(), value.clone()))
					.collect();
				let requested: RawParams = params
					.iter()
					.filter(|(param, _)| keys.iter().any(|key| &key.name == *param))
					.map(|(param, value)| (param.clone(), value.clone()))
					.collect();
				apply_params(&mut merged, &requested);

				let path = matcher.parser().stringify(&merged)?;
				(Some(matcher), path, merged)
			}
			LocationRequest::Path(path) => {
				if !path.starts_with('/') {
					tracing::warn!(
						path = %path,
						"path should be absolute; relative paths are not resolved"
					);
				}
				match self.tree.find(path) {
					Some(matcher) => {
						let params = matcher.parser().parse(path).unwrap_or_default();
						(Some(matcher), path.clone(), params)
					}
					None => {
						tracing::debug!(path = %path, "no match found for path");
						(None, path.clone(), RouteParams::new())
					}
				}
			}
			LocationRequest::Relative { params } => {
				let matcher = match &current.name {
					Some(name) => self.tree.get_by_name(name),
					None => self.tree.find(&current.path),
				}
				.ok_or_else(|| MatcherError::MatcherNotFound {
					location: format!("current location \"{}\"", current.path),
				})?;

				let mut merged = current.params.clone();
				apply_params(&mut merged, params);
				let path = matcher.parser().stringify(&merged)?;
				(Some(matcher), path, merged)
			}
		};

		let matched = self.matched_chain(matcher);
		let mut meta = RouteMeta::new();
		for record in &matched {
			meta.extend(record.meta.clone());
		}

		Ok(MatcherLocation {
			name: matcher.and_then(RecordMatcher::name).cloned(),
			path,
			params,
			matched,
			meta,
		})
	}

	fn matched_chain(&self, matcher: Option<&RecordMatcher>) -> Vec<Arc<RouteRecord>> {
		let mut matched = Vec::new();
		let mut current = matcher;
		while let Some(matcher) = current {
			matched.push(Arc::clone(matcher.record()));
			current = matcher.parent().and_then(|id| self.tree.get(id));
		}
		matched.reverse();
		matched
	}
}
