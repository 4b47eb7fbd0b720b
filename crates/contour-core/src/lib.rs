//! # contour-core: Data-Shape Validation
//!
//! Describe the expected shape of a JSON value with ordinary literals, then
//! check (and optionally coerce) arbitrary values against it. A failed check
//! reports which sub-schema rejected which sub-value, why, and where.
//!
//! ## Building Blocks
//!
//! 1. **Leaves** ([`Leaf`], [`leaves`]). Single-value checks with an
//!    explicit two-outcome contract: accept as-is, or accept and coerce.
//!
//! 2. **Shapes** ([`Shape`]). Literal trees of leaves, lists and maps. A
//!    one-element list is a sequence template, a longer list is a fixed
//!    sequence, a single-entry map with a schema key is a map template and
//!    any other map is a record.
//!
//! 3. **Schemas** ([`Schema`]). The dispatched form of a shape, produced once
//!    by [`Schema::compile`] and reused for every check.
//!
//! 4. **Validators** ([`Validator`], [`make_validator`]). A schema bound to a
//!    name, an enable predicate and a coercion flag.
//!
//! 5. **Validated functions** ([`validated`]). A function guarded by an
//!    input validator and an output validator.
//!
//! ## Example
//!
//! ```
//! use contour_core::{leaves, make_validator, Schema, Shape};
//! use serde_json::json;
//!
//! let shape = Shape::record([
//!     ("name", Shape::from(leaves::string())),
//!     ("scores", Shape::map_of(leaves::string(), leaves::integer())),
//! ]);
//! let schema = Schema::compile(&shape).unwrap();
//! let validator = make_validator(schema, "player", None, true);
//!
//! let out = validator.validate(json!({"name": "ada", "scores": {"round1": "7"}})).unwrap();
//! assert_eq!(out, json!({"name": "ada", "scores": {"round1": 7}}));
//! ```
//!
//! ## Crate Policy
//!
//! - Validation has no side effects beyond those of the leaves themselves.
//! - Every public type is `Send + Sync`; validators are shared, not cloned
//!   per thread.
//! - No `.unwrap()` outside tests and doc examples.

pub mod error;
pub mod failure;
pub mod func;
pub mod leaf;
pub mod leaves;
pub mod matchers;
pub mod path;
pub mod schema;
pub mod validator;

#[cfg(test)]
mod strategies;

// Re-export primary types for ergonomic imports.
pub use error::{ContourError, SchemaError};
pub use failure::{Failure, FailureCause, ValidationError, ValueKind, UNNAMED};
pub use func::{validated, CallError, ValidatedFn, ValidationOptions};
pub use leaf::{Checked, Leaf, LeafError, LeafResult};
pub use matchers::validate;
pub use path::{render_path, PathSegment};
pub use schema::{classify, Key, Schema, SchemaVariant, Shape};
pub use validator::{check, make_validator, Predicate, Validator};
