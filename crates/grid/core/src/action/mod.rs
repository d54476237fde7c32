//! Action domain — vectorized command representation and validation.
//!
//! A command is a set of named, independently-settable fields, each backed
//! by a fixed-size vector sized to the grid. Callers merge partial commands
//! with [`Action::update`] and read the validated result with
//! [`Action::materialize`]; everything in between — capability policy,
//! conflict detection, domain checks — lives here.
//!
//! # Module Structure
//!
//! - `capability`: which fields an instance permits callers to populate
//! - `types`: field names, digestion forms, the canonical output view
//! - `command`: the partial-command record and its loose-entry boundary
//! - `diagnostics`: non-fatal findings collected while merging
//! - `error`: `AmbiguousAction` / `IllegalAction` / `ActionError`
//! - `core`: the `Action` itself (storage, merge, materialization)
//! - `validate`: the ambiguity and domain checks behind `materialize`
//! - `topology`: the topology-restricted configuration

mod capability;
mod command;
mod core;
mod diagnostics;
mod error;
mod topology;
mod types;
mod validate;

pub use self::capability::Capabilities;
pub use self::command::{ActionUpdate, FieldValue};
pub use self::core::Action;
pub use self::diagnostics::{Diagnostic, Diagnostics};
pub use self::error::{ActionError, AmbiguousAction, IllegalAction};
pub use self::types::{CanonicalAction, FieldKey, InjectionMap, ToggleUpdate, VectorUpdate};
