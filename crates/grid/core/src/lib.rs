//! Deterministic command representation for a simulated power grid.
//!
//! `grid-core` defines the canonical, vectorized form of a single control
//! command — forced line statuses, status toggles, bus assignments, bus
//! toggles, injections, redispatch — and the validation that keeps
//! ambiguous or unauthorized commands away from the simulator. All
//! mutation flows through [`Action::update`] and all reads through
//! [`Action::materialize`]; the simulator itself is an external consumer
//! of the [`CanonicalAction`] view re-exported here.
pub mod action;
pub mod error;
pub mod grid;
pub mod rng;

pub use action::{
    Action, ActionError, ActionUpdate, AmbiguousAction, CanonicalAction, Capabilities, Diagnostic,
    Diagnostics, FieldKey, FieldValue, IllegalAction, InjectionMap, ToggleUpdate, VectorUpdate,
};
pub use error::{ErrorSeverity, GridError};
pub use grid::{GridLayout, LayoutError};
pub use rng::{EntropySource, PcgRng};
