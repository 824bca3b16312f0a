//! Property-based tests for pattern compilation and matching
//!
//! Uses proptest to verify:
//! 1. Stringified params parse back to the same params
//! 2. Lookups do not depend on registration order when scores differ
//! 3. Repeated lookups return the same matcher

use proptest::prelude::*;
use waymark_matcher::config::ParserOptions;
use waymark_matcher::parser::compile_path;
use waymark_matcher::prelude::*;
use waymark_matcher::RouteParams;

const PATTERNS: &[&str] = &[
	"/",
	"/users/new",
	"/users/:id",
	"/users/:id(\\d+)",
	"/users/:id/posts",
	"/users/:id/:tab?",
	"/files/:path+",
	"/:path(.*)*",
];

const PATHS: &[&str] = &[
	"/",
	"/users",
	"/users/new",
	"/users/42",
	"/users/abc",
	"/users/42/posts",
	"/users/42/settings",
	"/files/a/b",
	"/elsewhere/entirely",
];

// includes characters that must be percent-encoded in a path
fn segment() -> impl Strategy<Value = String> {
	"[a-zA-Z0-9_%/ éü中-]{1,12}"
}

fn matcher_for(patterns: &[&str]) -> RouterMatcher {
	RouterMatcher::with_routes(
		patterns
			.iter()
			.map(|pattern| RouteDefinition::new(*pattern).with_name(*pattern)),
		MatcherConfig::default(),
	)
	.unwrap()
}

fn matched_names(matcher: &RouterMatcher) -> Vec<Option<RouteName>> {
	PATHS
		.iter()
		.map(|path| {
			matcher
				.resolve(&LocationRequest::path(*path), &MatcherLocation::start())
				.unwrap()
				.name
		})
		.collect()
}

// ============================================================================
// Round-trip
// ============================================================================

proptest! {
	#![proptest_config(ProptestConfig::with_cases(64))]

	/// Property: parse(stringify(params)) == params for required and repeatable params
	#[test]
	fn test_stringify_parse_round_trip(
		id in segment(),
		rest in prop::collection::vec(segment(), 1..5),
	) {
		let parser = compile_path("/users/:id/files/:rest+", ParserOptions::default()).unwrap();
		let mut params = RouteParams::new();
		params.insert("id".to_string(), ParamValue::from(id));
		params.insert("rest".to_string(), ParamValue::from(rest));

		let path = parser.stringify(&params).unwrap();

		prop_assert_eq!(parser.parse(&path), Some(params));
	}

	/// Property: an absent optional param stays absent after a round-trip
	#[test]
	fn test_optional_round_trip(a in segment(), b in prop::option::of(segment())) {
		let parser = compile_path("/:a/:b?", ParserOptions::default()).unwrap();
		let mut params = RouteParams::new();
		params.insert("a".to_string(), ParamValue::from(a));
		if let Some(b) = b {
			params.insert("b".to_string(), ParamValue::from(b));
		}

		let path = parser.stringify(&params).unwrap();

		prop_assert_eq!(parser.parse(&path), Some(params));
	}
}

// ============================================================================
// Determinism
// ============================================================================

proptest! {
	#![proptest_config(ProptestConfig::with_cases(32))]

	/// Property: distinct-score patterns resolve the same in any registration order
	#[test]
	fn test_registration_order_does_not_change_matches(
		shuffled in Just(PATTERNS.to_vec()).prop_shuffle(),
	) {
		let reference = matched_names(&matcher_for(PATTERNS));
		let candidate = matched_names(&matcher_for(&shuffled));

		prop_assert_eq!(candidate, reference);
	}

	/// Property: resolving the same path twice yields the same record
	#[test]
	fn test_repeated_lookups_are_stable(index in 0..PATHS.len()) {
		let matcher = matcher_for(PATTERNS);
		let request = LocationRequest::path(PATHS[index]);

		let first = matcher.resolve(&request, &MatcherLocation::start()).unwrap();
		let second = matcher.resolve(&request, &MatcherLocation::start()).unwrap();

		prop_assert_eq!(first, second);
	}
}
