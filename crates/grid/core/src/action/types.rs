//! Core command types and structures.
//!
//! This module defines the fundamental types for the command system:
//! - `FieldKey`: the named, independently-settable command fields
//! - `VectorUpdate` / `ToggleUpdate`: the digestion forms a field accepts
//! - `CanonicalAction`: the materialized view consumed by a simulator

use std::collections::BTreeMap;

use crate::action::capability::Capabilities;

/// Injection content: canonical key (`load_p`, `load_q`, `prod_p`, `prod_v`)
/// to one value per load or generator.
pub type InjectionMap = BTreeMap<String, Vec<f64>>;

/// Canonical injection keys and the element class their vectors size to.
pub(crate) const LOAD_INJECTION_KEYS: [&str; 2] = ["load_p", "load_q"];
pub(crate) const GEN_INJECTION_KEYS: [&str; 2] = ["prod_p", "prod_v"];

// ============================================================================
// Field Key
// ============================================================================

/// The named fields of a grid command.
///
/// The snake_case string form is the wire key callers use when building a
/// command from loose entries, and the name diagnostics print.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum FieldKey {
    /// Force powerlines connected or disconnected.
    SetLineStatus,
    /// Toggle the current status of powerlines.
    SwitchLineStatus,
    /// Assign connectivity slots to a bus, or disconnect them.
    SetTopoVect,
    /// Toggle the bus assignment of connectivity slots.
    ChangeBusVect,
    /// Set load/generator injection values.
    Injection,
    /// Shift generator production relative to the dispatch.
    Redispatch,
}

impl FieldKey {
    /// The capability bit guarding this field.
    pub fn capability(self) -> Capabilities {
        match self {
            Self::SetLineStatus => Capabilities::SET_LINE_STATUS,
            Self::SwitchLineStatus => Capabilities::SWITCH_LINE_STATUS,
            Self::SetTopoVect => Capabilities::SET_TOPO_VECT,
            Self::ChangeBusVect => Capabilities::CHANGE_BUS_VECT,
            Self::Injection => Capabilities::INJECTION,
            Self::Redispatch => Capabilities::REDISPATCH,
        }
    }
}

// ============================================================================
// Digestion Forms
// ============================================================================

/// How a set-style field receives its values.
///
/// `Dense` replaces the whole vector (the length must match); `Sparse`
/// overwrites only the addressed slots.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VectorUpdate<T> {
    /// One value per slot, replacing the whole vector.
    Dense(Vec<T>),
    /// `(index, value)` pairs overwriting only the addressed slots.
    Sparse(Vec<(usize, T)>),
}

/// How a toggle-style field receives its values.
///
/// Toggles OR into the vector: a slot already marked stays marked.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ToggleUpdate {
    /// One flag per slot; `true` marks the slot for toggling.
    Mask(Vec<bool>),
    /// Indices of the slots to toggle.
    Indices(Vec<usize>),
}

// ============================================================================
// Canonical View
// ============================================================================

/// The validated command, in the exact field order of the simulator contract.
///
/// Borrowed views over the action's own vectors: materialization allocates
/// nothing and leaves the instance untouched.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanonicalAction<'a> {
    /// Injection values; permanently empty on configurations without the
    /// injection capability.
    pub injection: &'a InjectionMap,
    /// One entry per line: -1 force-disconnect, 0 leave alone, 1 force-connect.
    pub set_line_status: &'a [i32],
    /// One entry per line: `true` toggles the current status.
    pub switch_line_status: &'a [bool],
    /// One entry per connectivity slot: -1 disconnect, 0 leave alone,
    /// `b >= 1` assign to bus `b`.
    pub set_topo_vect: &'a [i32],
    /// One entry per connectivity slot: `true` toggles the bus assignment.
    pub change_bus_vect: &'a [bool],
    /// One entry per generator; permanently zero on configurations without
    /// the redispatch capability.
    pub redispatch: &'a [f64],
}
