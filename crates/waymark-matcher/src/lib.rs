//! Route matching engine for client-side URL routing.
//!
//! Turns route definitions into compiled patterns, ranks them, and resolves
//! raw locations (a path, a named route with params, or params relative to
//! the current location) into a matched chain of records with concrete
//! params and merged metadata.
//!
//! # Quick Start
//!
//! ```
//! use waymark_matcher::prelude::*;
//!
//! let matcher = RouterMatcher::with_routes(
//!     [
//!         RouteDefinition::new("/").with_name("home"),
//!         RouteDefinition::new("/users/:id(\\d+)")
//!             .with_name("user")
//!             .with_alias("/u/:id(\\d+)"),
//!     ],
//!     MatcherConfig::default(),
//! )
//! .unwrap();
//!
//! let location = matcher
//!     .resolve(&LocationRequest::path("/u/42"), &MatcherLocation::start())
//!     .unwrap();
//!
//! assert_eq!(location.name, Some(RouteName::from("user")));
//! assert_eq!(location.params.get("id"), Some(&ParamValue::from("42")));
//! ```
//!
//! # Architecture
//!
//! - [`tokenizer`] - Splits a pattern into segments of static and param tokens
//! - [`parser`] - Compiles tokens into a regexp, a score and a stringifier
//! - [`score`] - Orders compiled patterns by specificity
//! - [`matcher`] - Binds a normalized [`RouteRecord`] to its pattern
//! - [`tree`] - Exact map plus segment trie holding every matcher
//! - [`resolver`] - [`RouterMatcher`], the registration and resolve surface
//! - [`config`] - Parsing options and declarative route tables

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod error;
pub mod location;
pub mod matcher;
pub mod parser;
pub mod prelude;
pub mod record;
pub mod resolver;
pub mod score;
pub mod tokenizer;
pub mod tree;
pub mod validation;

// Re-export commonly used types at crate root
pub use config::{MatcherConfig, ParserOptions, PathParserOptions, RouteTable};
pub use error::{ConfigError, ConfigResult, MatcherError, MatcherResult, PathParserError, StringifyError};
pub use location::{LocationRequest, MatcherLocation, RouteRef};
pub use matcher::{MatcherId, RecordMatcher};
pub use parser::{PathParser, compile_path};
pub use record::{
	ParamValue, RawParams, RouteDefinition, RouteMeta, RouteName, RouteParams, RouteRecord,
	RouteSymbol,
};
pub use resolver::{RouteRegistration, RouterMatcher};
