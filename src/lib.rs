//! # Waymark
//!
//! Client-side URL routing: turns route definitions into ranked patterns and
//! resolves every navigation target into a matched chain of records.
//!
//! This crate is a facade over the following internal crates:
//!
//! - `waymark-matcher`: tokenizer, pattern compiler, ranking, matcher tree and resolver
//!
//! ## Quick Example
//!
//! ```rust
//! use waymark::prelude::*;
//!
//! let table = RouteTable::from_toml_str(r#"
//!     [[routes]]
//!     path = "/"
//!     name = "home"
//!
//!     [[routes]]
//!     path = "/users/:id"
//!     name = "user"
//! "#).unwrap();
//! let matcher = RouterMatcher::from_table(table).unwrap();
//!
//! let location = matcher
//!     .resolve(&LocationRequest::path("/users/7"), &MatcherLocation::start())
//!     .unwrap();
//! assert_eq!(location.name, Some(RouteName::from("user")));
//! ```
//!
//! Query strings and hashes are not interpreted; strip them before calling
//! [`RouterMatcher::resolve`](matcher::RouterMatcher::resolve).

#![cfg_attr(docsrs, feature(doc_cfg))]

pub use waymark_matcher as matcher;

pub use waymark_matcher::{
	LocationRequest, MatcherConfig, MatcherError, MatcherLocation, MatcherResult, RouteDefinition,
	RouteName, RouteTable, RouterMatcher,
};

/// Commonly used types.
pub mod prelude {
	pub use waymark_matcher::prelude::*;
}
