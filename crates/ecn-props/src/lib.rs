//! ecn-props: state-dependent property lookup for the solver core.
//!
//! Lookup tables are prepared externally (file loading is out of scope) and
//! handed in as validated, strongly-typed interpolation structures. The
//! solvers consume properties through the [`PropertyResolver`] trait so that
//! table-backed and constant implementations are interchangeable.

pub mod error;
pub mod resolver;
pub mod table;

pub use error::{LookupError, LookupResult};
pub use resolver::{ConstResolver, PropertyResolver, TableResolver};
pub use table::{Extrapolation, Lut1d, Lut2d};
