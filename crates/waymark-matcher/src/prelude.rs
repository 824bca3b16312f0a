//! Commonly used types.

pub use crate::config::{MatcherConfig, PathParserOptions, RouteTable};
pub use crate::error::{MatcherError, MatcherResult};
pub use crate::location::{LocationRequest, MatcherLocation};
pub use crate::record::{ParamValue, RouteDefinition, RouteName, RouteSymbol};
pub use crate::resolver::{RouteRegistration, RouterMatcher};
