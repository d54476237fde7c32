//! The partial command record and its loose-entry parse boundary.
//!
//! A command reaches an [`Action`](crate::action::Action) as an
//! [`ActionUpdate`]: one optional slot per known field. Typed callers fill
//! the slots directly with the builder methods; callers holding loosely
//! keyed data go through [`ActionUpdate::from_entries`], where unknown keys
//! become parse-time diagnostics instead of runtime lookups.

use crate::action::diagnostics::{Diagnostic, Diagnostics};
use crate::action::error::IllegalAction;
use crate::action::types::{FieldKey, InjectionMap, ToggleUpdate, VectorUpdate};

/// A partially-specified command: only the populated fields are merged.
///
/// An empty update is a valid no-op command; merging it leaves the action
/// all-neutral.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionUpdate {
    /// Force powerlines connected (1) or disconnected (-1).
    pub set_line_status: Option<VectorUpdate<i32>>,
    /// Toggle the current status of powerlines.
    pub switch_line_status: Option<ToggleUpdate>,
    /// Assign connectivity slots to a bus (>= 1) or disconnect them (-1).
    pub set_topo_vect: Option<VectorUpdate<i32>>,
    /// Toggle the bus assignment of connectivity slots.
    pub change_bus_vect: Option<ToggleUpdate>,
    /// Injection values keyed by `load_p`, `load_q`, `prod_p`, `prod_v`.
    pub injection: Option<InjectionMap>,
    /// Generator production shifts.
    pub redispatch: Option<VectorUpdate<f64>>,
}

impl ActionUpdate {
    /// An update populating no field.
    pub fn new() -> Self {
        Self::default()
    }

    /// Populates the forced line statuses (builder pattern).
    #[must_use]
    pub fn with_set_line_status(mut self, update: VectorUpdate<i32>) -> Self {
        self.set_line_status = Some(update);
        self
    }

    /// Populates the line status toggles (builder pattern).
    #[must_use]
    pub fn with_switch_line_status(mut self, update: ToggleUpdate) -> Self {
        self.switch_line_status = Some(update);
        self
    }

    /// Populates the bus assignments (builder pattern).
    #[must_use]
    pub fn with_set_topo_vect(mut self, update: VectorUpdate<i32>) -> Self {
        self.set_topo_vect = Some(update);
        self
    }

    /// Populates the bus assignment toggles (builder pattern).
    #[must_use]
    pub fn with_change_bus_vect(mut self, update: ToggleUpdate) -> Self {
        self.change_bus_vect = Some(update);
        self
    }

    /// Populates the injection content (builder pattern).
    #[must_use]
    pub fn with_injection(mut self, injection: InjectionMap) -> Self {
        self.injection = Some(injection);
        self
    }

    /// Populates the redispatch amounts (builder pattern).
    #[must_use]
    pub fn with_redispatch(mut self, update: VectorUpdate<f64>) -> Self {
        self.redispatch = Some(update);
        self
    }

    /// True if no field is populated.
    pub fn is_empty(&self) -> bool {
        self.set_line_status.is_none()
            && self.switch_line_status.is_none()
            && self.set_topo_vect.is_none()
            && self.change_bus_vect.is_none()
            && self.injection.is_none()
            && self.redispatch.is_none()
    }

    /// Builds an update from loosely keyed `(key, value)` entries.
    ///
    /// Keys are matched against the snake_case field names. Entries with an
    /// unknown key are dropped and reported in the returned [`Diagnostics`];
    /// a recognized key carrying a value shape its field cannot digest fails
    /// immediately with [`IllegalAction::TypeMismatch`]. When a key appears
    /// twice, the later entry wins.
    pub fn from_entries<K, I>(entries: I) -> Result<(Self, Diagnostics), IllegalAction>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, FieldValue)>,
    {
        let mut update = Self::new();
        let mut diagnostics = Diagnostics::default();

        for (key, value) in entries {
            let Ok(field) = key.as_ref().parse::<FieldKey>() else {
                diagnostics.push(Diagnostic::UnknownKey {
                    key: key.as_ref().to_owned(),
                });
                continue;
            };
            update.assign(field, value)?;
        }

        Ok((update, diagnostics))
    }

    fn assign(&mut self, field: FieldKey, value: FieldValue) -> Result<(), IllegalAction> {
        match (field, value) {
            (FieldKey::SetLineStatus, FieldValue::IntVector(values)) => {
                self.set_line_status = Some(VectorUpdate::Dense(values));
            }
            (FieldKey::SetLineStatus, FieldValue::IntEntries(entries)) => {
                self.set_line_status = Some(VectorUpdate::Sparse(entries));
            }
            (FieldKey::SetTopoVect, FieldValue::IntVector(values)) => {
                self.set_topo_vect = Some(VectorUpdate::Dense(values));
            }
            (FieldKey::SetTopoVect, FieldValue::IntEntries(entries)) => {
                self.set_topo_vect = Some(VectorUpdate::Sparse(entries));
            }
            (FieldKey::SwitchLineStatus, FieldValue::BoolVector(mask)) => {
                self.switch_line_status = Some(ToggleUpdate::Mask(mask));
            }
            (FieldKey::SwitchLineStatus, FieldValue::Indices(indices)) => {
                self.switch_line_status = Some(ToggleUpdate::Indices(indices));
            }
            (FieldKey::ChangeBusVect, FieldValue::BoolVector(mask)) => {
                self.change_bus_vect = Some(ToggleUpdate::Mask(mask));
            }
            (FieldKey::ChangeBusVect, FieldValue::Indices(indices)) => {
                self.change_bus_vect = Some(ToggleUpdate::Indices(indices));
            }
            (FieldKey::Injection, FieldValue::Injection(map)) => {
                self.injection = Some(map);
            }
            (FieldKey::Redispatch, FieldValue::FloatVector(values)) => {
                self.redispatch = Some(VectorUpdate::Dense(values));
            }
            (FieldKey::Redispatch, FieldValue::FloatEntries(entries)) => {
                self.redispatch = Some(VectorUpdate::Sparse(entries));
            }
            (field, value) => {
                return Err(IllegalAction::TypeMismatch {
                    field,
                    got: value.kind(),
                });
            }
        }
        Ok(())
    }
}

/// A loosely typed field value, as received at the parse boundary.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FieldValue {
    /// Dense integer vector (forced statuses or bus assignments).
    IntVector(Vec<i32>),
    /// Sparse `(index, value)` integer entries.
    IntEntries(Vec<(usize, i32)>),
    /// Dense toggle mask.
    BoolVector(Vec<bool>),
    /// Indices of slots to toggle.
    Indices(Vec<usize>),
    /// Dense float vector (redispatch).
    FloatVector(Vec<f64>),
    /// Sparse `(index, value)` float entries.
    FloatEntries(Vec<(usize, f64)>),
    /// Injection content.
    Injection(InjectionMap),
}

impl FieldValue {
    /// Human-readable shape name for diagnostics and errors.
    fn kind(&self) -> &'static str {
        match self {
            Self::IntVector(_) => "an integer vector",
            Self::IntEntries(_) => "integer (index, value) entries",
            Self::BoolVector(_) => "a toggle mask",
            Self::Indices(_) => "a list of indices",
            Self::FloatVector(_) => "a float vector",
            Self::FloatEntries(_) => "float (index, value) entries",
            Self::Injection(_) => "an injection mapping",
        }
    }
}
