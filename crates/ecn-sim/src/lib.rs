//! Transient electro-thermal cell simulation.
//!
//! Ties the electrical and thermal solvers together into a fixed-step
//! time loop with an inner coupling iteration per step. `Simulation`
//! owns the committed state; each step solves the electrical network at
//! the latest temperature estimate, feeds the resulting heat into the
//! thermal step, and repeats until the temperature iterate settles.
//! State is committed only after both solves succeed, so a fault never
//! leaves a half-updated history behind.

pub mod error;
pub mod profile;
pub mod stepper;
pub mod store;

pub use error::{SimError, SimResult};
pub use profile::{ExcitationKind, ExcitationProfile};
pub use stepper::{SimOptions, SimPhase, Simulation};
pub use store::{StateStore, StepState};
