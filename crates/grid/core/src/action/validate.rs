//! Command validation — capability policy, element conflicts, domains.
//!
//! Validation is separated from merging so that `materialize` stays a pure
//! query: every check below reads the current vectors and nothing else.
//! Check order is fixed — capability policy first, so an instance-level
//! violation is reported apart from element-level conflicts, then
//! conflicts, then value domains.

use strum::IntoEnumIterator;

use crate::action::core::{Action, injection_expected_len};
use crate::action::error::{AmbiguousAction, IllegalAction};
use crate::action::types::FieldKey;

impl Action {
    /// Rejects content sitting in a field whose capability was removed.
    pub(super) fn check_removed_capabilities(&self) -> Result<(), AmbiguousAction> {
        for field in FieldKey::iter() {
            if !self.capabilities.permits(field) && !self.field_is_neutral(field) {
                return Err(AmbiguousAction::RemovedCapability { field });
            }
        }
        Ok(())
    }

    /// Rejects elements targeted by both a set-style and a toggle-style
    /// instruction: the net effect on such an element is undefined.
    pub(super) fn check_element_conflicts(&self) -> Result<(), AmbiguousAction> {
        for (line, (&forced, &toggled)) in self
            .set_line_status
            .iter()
            .zip(&self.switch_line_status)
            .enumerate()
        {
            if forced != 0 && toggled {
                return Err(AmbiguousAction::LineStatusConflict { line });
            }
        }

        for (slot, (&assigned, &toggled)) in self
            .set_topo_vect
            .iter()
            .zip(&self.change_bus_vect)
            .enumerate()
        {
            if assigned != 0 && toggled {
                return Err(AmbiguousAction::BusAssignmentConflict { slot });
            }
        }

        Ok(())
    }

    /// Rejects stored values outside their field's domain.
    pub(super) fn check_domains(&self) -> Result<(), IllegalAction> {
        for (line, &status) in self.set_line_status.iter().enumerate() {
            if !(-1..=1).contains(&status) {
                return Err(IllegalAction::LineStatusOutOfRange {
                    line,
                    value: status,
                });
            }
        }

        let max_bus = self.layout.n_busbar();
        for (slot, &bus) in self.set_topo_vect.iter().enumerate() {
            if bus < -1 || bus > max_bus as i32 {
                return Err(IllegalAction::BusOutOfRange {
                    slot,
                    value: bus,
                    max_bus,
                });
            }
        }

        for (key, values) in &self.injection {
            // Unknown keys never reach storage; digestion drops them.
            let expected = injection_expected_len(&self.layout, key)
                .expect("stored injection keys are canonical");
            if values.len() != expected {
                return Err(IllegalAction::InjectionLengthMismatch {
                    key: key.clone(),
                    expected,
                    got: values.len(),
                });
            }
        }

        for (generator, &amount) in self.redispatch.iter().enumerate() {
            if !amount.is_finite() {
                return Err(IllegalAction::NonFiniteRedispatch { generator });
            }
        }

        Ok(())
    }

    fn field_is_neutral(&self, field: FieldKey) -> bool {
        match field {
            FieldKey::SetLineStatus => self.set_line_status.iter().all(|&s| s == 0),
            FieldKey::SwitchLineStatus => !self.switch_line_status.iter().any(|&t| t),
            FieldKey::SetTopoVect => self.set_topo_vect.iter().all(|&b| b == 0),
            FieldKey::ChangeBusVect => !self.change_bus_vect.iter().any(|&t| t),
            FieldKey::Injection => self.injection.is_empty(),
            FieldKey::Redispatch => self.redispatch.iter().all(|&a| a == 0.0),
        }
    }
}
