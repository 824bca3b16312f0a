//! Registration-time checks on record matchers.
//!
//! Duplicate param names within one pattern are rejected by the pattern
//! compiler; the checks here span several matchers.

use crate::error::{MatcherError, MatcherResult};
use crate::matcher::{MatcherId, RecordMatcher};
use crate::parser::ParamKey;
use crate::record::RouteName;
use crate::tree::MatcherTree;

/// Legacy bare catch-all path.
const LEGACY_CATCH_ALL: &str = "*";

fn has_same_param(keys: &[ParamKey], key: &ParamKey) -> bool {
	keys.iter().any(|candidate| candidate.same_shape(key))
}

/// Checks that an alias and its canonical matcher declare the same required
/// params, with the same modifiers, in both directions.
pub fn check_same_params(original: &RecordMatcher, alias: &RecordMatcher) -> MatcherResult<()> {
	let mismatch = |param: &ParamKey| MatcherError::AliasParamMismatch {
		alias: alias.path().to_string(),
		original: original.path().to_string(),
		param: param.name.clone(),
	};

	let original_keys = original.parser().keys();
	let alias_keys = alias.parser().keys();

	if let Some(key) = original_keys
		.iter()
		.find(|key| !key.optional && !has_same_param(alias_keys, key))
	{
		return Err(mismatch(key));
	}
	if let Some(key) = alias_keys
		.iter()
		.find(|key| !key.optional && !has_same_param(original_keys, key))
	{
		return Err(mismatch(key));
	}
	Ok(())
}

/// Checks that a child declared with an absolute path keeps every param of
/// its parent.
pub fn check_missing_params_in_absolute_path(
	matcher: &RecordMatcher,
	parent: &RecordMatcher,
) -> MatcherResult<()> {
	let keys = matcher.parser().keys();
	match parent
		.parser()
		.keys()
		.iter()
		.find(|key| !has_same_param(keys, key))
	{
		Some(key) => Err(MatcherError::MissingAncestorParam {
			path: matcher.path().to_string(),
			parent: parent.path().to_string(),
			param: key.name.clone(),
		}),
		None => Ok(()),
	}
}

/// Checks that no ancestor of a new record already uses `name`.
pub fn check_same_name_as_ancestor(
	tree: &MatcherTree,
	name: &RouteName,
	parent: Option<MatcherId>,
) -> MatcherResult<()> {
	let mut current = parent.and_then(|id| tree.get(id));
	while let Some(ancestor) = current {
		if ancestor.name() == Some(name) {
			return Err(MatcherError::SameNameAsAncestor {
				name: name.to_string(),
			});
		}
		current = ancestor.parent().and_then(|id| tree.get(id));
	}
	Ok(())
}

/// Rejects the pre-param catch-all syntax.
pub fn check_legacy_catch_all(path: &str) -> MatcherResult<()> {
	if path == LEGACY_CATCH_ALL {
		return Err(MatcherError::LegacyCatchAll {
			path: path.to_string(),
		});
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::ParserOptions;
	use crate::record::{RouteDefinition, RouteRecord};
	use rstest::rstest;
	use std::sync::Arc;

	fn matcher(path: &str) -> RecordMatcher {
		let record = Arc::new(RouteRecord::new(&RouteDefinition::new(path), path.to_string()));
		RecordMatcher::compile(MatcherId(0), record, None, ParserOptions::default()).unwrap()
	}

	#[rstest]
	#[case("/:p/:c", "/:p/c", Some("c"))]
	#[case("/:p/c", "/:p/:c", Some("c"))]
	#[case("/:p", "/x/:p", None)]
	#[case("/:p/:c?", "/:p", None)]
	#[case("/:p+", "/x/:p", Some("p"))]
	fn test_same_params(#[case] original: &str, #[case] alias: &str, #[case] missing: Option<&str>) {
		let result = check_same_params(&matcher(original), &matcher(alias));
		match missing {
			Some(param) => assert_eq!(
				result,
				Err(MatcherError::AliasParamMismatch {
					alias: alias.to_string(),
					original: original.to_string(),
					param: param.to_string(),
				})
			),
			None => assert_eq!(result, Ok(())),
		}
	}

	#[rstest]
	#[case("/users/:id/edit", "/users/:id", true)]
	#[case("/edit", "/users/:id", false)]
	#[case("/edit/:id?", "/users/:id", false)]
	fn test_absolute_child_params(#[case] child: &str, #[case] parent: &str, #[case] ok: bool) {
		let result = check_missing_params_in_absolute_path(&matcher(child), &matcher(parent));
		assert_eq!(result.is_ok(), ok);
	}

	#[rstest]
	#[case("*", true)]
	#[case("/*", false)]
	#[case("/:pathMatch(.*)*", false)]
	fn test_legacy_catch_all(#[case] path: &str, #[case] rejected: bool) {
		assert_eq!(check_legacy_catch_all(path).is_err(), rejected);
	}
}
