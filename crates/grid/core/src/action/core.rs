//! The vectorized command core: field storage, merge, and materialization.
//!
//! An [`Action`] owns one fixed-length vector per field, sized once from the
//! [`GridLayout`] it is bound to. It is mutated only through
//! [`Action::update`] (which starts from neutral on every call) and read
//! only through [`Action::materialize`] (which re-validates on every call).

use std::fmt;
use std::sync::Arc;

use crate::action::capability::Capabilities;
use crate::action::command::ActionUpdate;
use crate::action::diagnostics::{Diagnostic, Diagnostics};
use crate::action::error::{ActionError, IllegalAction};
use crate::action::types::{
    CanonicalAction, FieldKey, GEN_INJECTION_KEYS, InjectionMap, LOAD_INJECTION_KEYS,
    ToggleUpdate, VectorUpdate,
};
use crate::grid::GridLayout;
use crate::rng::EntropySource;

/// Expected vector length for a canonical injection key, if the key is known.
pub(super) fn injection_expected_len(layout: &GridLayout, key: &str) -> Option<usize> {
    if LOAD_INJECTION_KEYS.contains(&key) {
        Some(layout.n_load())
    } else if GEN_INJECTION_KEYS.contains(&key) {
        Some(layout.n_gen())
    } else {
        None
    }
}

/// A single control command over a grid topology.
///
/// The instance is bound to immutable grid metadata at construction; the
/// vectors are sized once and never reallocate, and materialization borrows
/// them without copying. The capability set decides which fields callers
/// may populate — restricted configurations (see
/// [`Action::topology`]) narrow it, nothing ever widens it.
#[derive(Clone, Debug, PartialEq)]
pub struct Action {
    pub(super) layout: Arc<GridLayout>,
    pub(super) capabilities: Capabilities,
    pub(super) set_line_status: Vec<i32>,
    pub(super) switch_line_status: Vec<bool>,
    pub(super) set_topo_vect: Vec<i32>,
    pub(super) change_bus_vect: Vec<bool>,
    pub(super) injection: InjectionMap,
    pub(super) redispatch: Vec<f64>,
}

impl Action {
    /// Builds an unrestricted action: every field may be populated.
    pub fn new(layout: Arc<GridLayout>) -> Self {
        Self::with_capabilities(layout, Capabilities::all())
    }

    /// Builds an action with an explicit capability set.
    ///
    /// This is the data-driven seam restricted configurations go through;
    /// `update` and `materialize` consult the set uniformly, so there is no
    /// per-configuration dispatch anywhere else.
    pub fn with_capabilities(layout: Arc<GridLayout>, capabilities: Capabilities) -> Self {
        let n_line = layout.n_line();
        let dim_topo = layout.dim_topo();
        let n_gen = layout.n_gen();
        Self {
            capabilities,
            set_line_status: vec![0; n_line],
            switch_line_status: vec![false; n_line],
            set_topo_vect: vec![0; dim_topo],
            change_bus_vect: vec![false; dim_topo],
            injection: InjectionMap::new(),
            redispatch: vec![0.0; n_gen],
            layout,
        }
    }

    /// The grid metadata this action is bound to.
    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    /// The fields this instance permits callers to populate.
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Sets every field back to neutral without validating anything.
    pub fn reset(&mut self) -> &mut Self {
        self.set_line_status.fill(0);
        self.switch_line_status.fill(false);
        self.set_topo_vect.fill(0);
        self.change_bus_vect.fill(false);
        self.injection.clear();
        self.redispatch.fill(0.0);
        self
    }

    /// Resets to neutral, then merges the populated fields of `command`.
    ///
    /// Each call starts from neutral: fields the command does not mention end
    /// up neutral, not carried over from the previous call. Fields outside
    /// the capability set are still digested but reported in the returned
    /// [`Diagnostics`], and [`Action::materialize`] will refuse the instance
    /// until they are cleared — unauthorized content is never silently handed
    /// to the simulator.
    ///
    /// # Errors
    ///
    /// Fails immediately with [`IllegalAction`] when a value cannot be
    /// digested at all: a dense vector or mask of the wrong length, or a
    /// sparse entry addressing a slot that does not exist. Out-of-domain
    /// values (say, bus 12 on a two-busbar grid) are stored as supplied and
    /// reported by the next materialization.
    pub fn update(&mut self, command: &ActionUpdate) -> Result<Diagnostics, IllegalAction> {
        self.reset();
        let mut diagnostics = Diagnostics::default();

        if let Some(update) = &command.set_line_status {
            self.note_unauthorized(FieldKey::SetLineStatus, &mut diagnostics);
            digest_set(&mut self.set_line_status, FieldKey::SetLineStatus, update)?;
        }
        if let Some(update) = &command.switch_line_status {
            self.note_unauthorized(FieldKey::SwitchLineStatus, &mut diagnostics);
            digest_toggle(
                &mut self.switch_line_status,
                FieldKey::SwitchLineStatus,
                update,
            )?;
        }
        if let Some(update) = &command.set_topo_vect {
            self.note_unauthorized(FieldKey::SetTopoVect, &mut diagnostics);
            digest_set(&mut self.set_topo_vect, FieldKey::SetTopoVect, update)?;
        }
        if let Some(update) = &command.change_bus_vect {
            self.note_unauthorized(FieldKey::ChangeBusVect, &mut diagnostics);
            digest_toggle(&mut self.change_bus_vect, FieldKey::ChangeBusVect, update)?;
        }
        if let Some(map) = &command.injection {
            self.note_unauthorized(FieldKey::Injection, &mut diagnostics);
            self.digest_injection(map, &mut diagnostics);
        }
        if let Some(update) = &command.redispatch {
            self.note_unauthorized(FieldKey::Redispatch, &mut diagnostics);
            digest_set(&mut self.redispatch, FieldKey::Redispatch, update)?;
        }

        Ok(diagnostics)
    }

    /// Validates the current vectors and exposes them in canonical order.
    ///
    /// The checks are a pure function of the current state and run on every
    /// call: a caller can materialize, hit an error, correct the command with
    /// another [`Action::update`], and materialize again.
    ///
    /// # Errors
    ///
    /// - [`ActionError::Ambiguous`] when content sits in a field whose
    ///   capability was removed (checked first, so policy violations are
    ///   reported apart from element conflicts), or when a set-style and a
    ///   toggle-style instruction collide on one element.
    /// - [`ActionError::Illegal`] when a stored value lies outside its
    ///   field's domain.
    pub fn materialize(&self) -> Result<CanonicalAction<'_>, ActionError> {
        self.check_removed_capabilities()?;
        self.check_element_conflicts()?;
        self.check_domains()?;

        Ok(CanonicalAction {
            injection: &self.injection,
            set_line_status: &self.set_line_status,
            switch_line_status: &self.switch_line_status,
            set_topo_vect: &self.set_topo_vect,
            change_bus_vect: &self.change_bus_vect,
            redispatch: &self.redispatch,
        })
    }

    /// Draws a random command.
    ///
    /// Not implemented at this layer: the action resets to neutral and is
    /// returned for call chaining, so callers get a well-defined (trivial)
    /// result rather than a partially random one.
    pub fn sample<R: EntropySource + ?Sized>(&mut self, _entropy: &R) -> &mut Self {
        self.reset()
    }

    /// True if every field is at its neutral value.
    pub fn is_neutral(&self) -> bool {
        self.set_line_status.iter().all(|&status| status == 0)
            && !self.switch_line_status.iter().any(|&toggled| toggled)
            && self.set_topo_vect.iter().all(|&bus| bus == 0)
            && !self.change_bus_vect.iter().any(|&toggled| toggled)
            && self.injection.is_empty()
            && self.redispatch.iter().all(|&amount| amount == 0.0)
    }

    fn note_unauthorized(&self, field: FieldKey, diagnostics: &mut Diagnostics) {
        if !self.capabilities.permits(field) {
            diagnostics.push(Diagnostic::UnauthorizedField {
                field,
                authorized: self.capabilities,
            });
        }
    }

    fn digest_injection(&mut self, map: &InjectionMap, diagnostics: &mut Diagnostics) {
        for (key, values) in map {
            if injection_expected_len(&self.layout, key).is_none() {
                diagnostics.push(Diagnostic::UnknownInjectionKey { key: key.clone() });
                continue;
            }
            self.injection.insert(key.clone(), values.clone());
        }
    }
}

fn digest_set<T: Copy>(
    target: &mut [T],
    field: FieldKey,
    update: &VectorUpdate<T>,
) -> Result<(), IllegalAction> {
    match update {
        VectorUpdate::Dense(values) => {
            if values.len() != target.len() {
                return Err(IllegalAction::LengthMismatch {
                    field,
                    expected: target.len(),
                    got: values.len(),
                });
            }
            target.copy_from_slice(values);
        }
        VectorUpdate::Sparse(entries) => {
            let len = target.len();
            for &(index, value) in entries {
                let slot = target
                    .get_mut(index)
                    .ok_or(IllegalAction::IndexOutOfRange { field, index, len })?;
                *slot = value;
            }
        }
    }
    Ok(())
}

fn digest_toggle(
    target: &mut [bool],
    field: FieldKey,
    update: &ToggleUpdate,
) -> Result<(), IllegalAction> {
    match update {
        ToggleUpdate::Mask(mask) => {
            if mask.len() != target.len() {
                return Err(IllegalAction::LengthMismatch {
                    field,
                    expected: target.len(),
                    got: mask.len(),
                });
            }
            for (slot, &toggled) in target.iter_mut().zip(mask) {
                *slot |= toggled;
            }
        }
        ToggleUpdate::Indices(indices) => {
            let len = target.len();
            for &index in indices {
                let slot = target
                    .get_mut(index)
                    .ok_or(IllegalAction::IndexOutOfRange { field, index, len })?;
                *slot = true;
            }
        }
    }
    Ok(())
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "This action will:")?;
        if self.is_neutral() {
            return write!(f, "\n\t- do nothing");
        }

        let connected = self.set_line_status.iter().filter(|&&s| s == 1).count();
        let disconnected = self.set_line_status.iter().filter(|&&s| s == -1).count();
        if connected > 0 {
            write!(f, "\n\t- force the connection of {connected} powerline(s)")?;
        }
        if disconnected > 0 {
            write!(f, "\n\t- force the disconnection of {disconnected} powerline(s)")?;
        }

        let switched = self.switch_line_status.iter().filter(|&&t| t).count();
        if switched > 0 {
            write!(f, "\n\t- switch the status of {switched} powerline(s)")?;
        }

        let assigned = self.set_topo_vect.iter().filter(|&&b| b >= 1).count();
        let cut = self.set_topo_vect.iter().filter(|&&b| b == -1).count();
        if assigned > 0 {
            write!(f, "\n\t- assign {assigned} connectivity slot(s) to a bus")?;
        }
        if cut > 0 {
            write!(f, "\n\t- disconnect {cut} connectivity slot(s)")?;
        }

        let changed = self.change_bus_vect.iter().filter(|&&t| t).count();
        if changed > 0 {
            write!(f, "\n\t- toggle the bus of {changed} connectivity slot(s)")?;
        }

        if !self.injection.is_empty() {
            let keys: Vec<&str> = self.injection.keys().map(String::as_str).collect();
            write!(f, "\n\t- modify the injections {keys:?}")?;
        }

        let redispatched = self.redispatch.iter().filter(|&&a| a != 0.0).count();
        if redispatched > 0 {
            write!(f, "\n\t- redispatch {redispatched} generator(s)")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::error::AmbiguousAction;

    // 2 lines, 2 loads, 1 generator; 7 connectivity slots over 2 substations.
    fn layout() -> Arc<GridLayout> {
        Arc::new(GridLayout::new(2, 2, 1, vec![4, 3], 2).unwrap())
    }

    fn injection(key: &str, values: &[f64]) -> InjectionMap {
        InjectionMap::from([(key.to_owned(), values.to_vec())])
    }

    #[test]
    fn fresh_action_materializes_all_neutral() {
        let action = Action::new(layout());
        let canonical = action.materialize().unwrap();
        assert_eq!(canonical.set_line_status, &[0, 0]);
        assert_eq!(canonical.switch_line_status, &[false, false]);
        assert_eq!(canonical.set_topo_vect, &[0; 7]);
        assert_eq!(canonical.change_bus_vect, &[false; 7]);
        assert!(canonical.injection.is_empty());
        assert_eq!(canonical.redispatch, &[0.0]);
    }

    #[test]
    fn empty_update_equals_reset() {
        let mut updated = Action::new(layout());
        updated
            .update(
                &ActionUpdate::new().with_set_line_status(VectorUpdate::Dense(vec![1, -1])),
            )
            .unwrap();
        let diagnostics = updated.update(&ActionUpdate::new()).unwrap();
        assert!(diagnostics.is_empty());

        let mut reset = Action::new(layout());
        reset
            .update(
                &ActionUpdate::new().with_set_line_status(VectorUpdate::Dense(vec![1, -1])),
            )
            .unwrap();
        reset.reset();

        assert_eq!(updated, reset);
        assert!(updated.is_neutral());
    }

    #[test]
    fn dense_values_come_back_unchanged() {
        let mut action = Action::new(layout());
        action
            .update(
                &ActionUpdate::new()
                    .with_set_line_status(VectorUpdate::Dense(vec![1, -1]))
                    .with_set_topo_vect(VectorUpdate::Dense(vec![2, 0, 0, 1, 0, -1, 0]))
                    .with_redispatch(VectorUpdate::Dense(vec![3.5])),
            )
            .unwrap();

        let canonical = action.materialize().unwrap();
        assert_eq!(canonical.set_line_status, &[1, -1]);
        assert_eq!(canonical.set_topo_vect, &[2, 0, 0, 1, 0, -1, 0]);
        assert_eq!(canonical.redispatch, &[3.5]);
    }

    #[test]
    fn sparse_entries_touch_only_addressed_slots() {
        let mut action = Action::new(layout());
        action
            .update(
                &ActionUpdate::new()
                    .with_set_topo_vect(VectorUpdate::Sparse(vec![(6, 2), (0, -1)]))
                    .with_switch_line_status(ToggleUpdate::Indices(vec![1])),
            )
            .unwrap();

        let canonical = action.materialize().unwrap();
        assert_eq!(canonical.set_topo_vect, &[-1, 0, 0, 0, 0, 0, 2]);
        assert_eq!(canonical.switch_line_status, &[false, true]);
    }

    #[test]
    fn update_is_not_incremental_across_calls() {
        let mut action = Action::new(layout());
        action
            .update(
                &ActionUpdate::new().with_set_line_status(VectorUpdate::Dense(vec![1, 0])),
            )
            .unwrap();
        action
            .update(
                &ActionUpdate::new().with_set_topo_vect(VectorUpdate::Sparse(vec![(2, 1)])),
            )
            .unwrap();

        let canonical = action.materialize().unwrap();
        assert_eq!(canonical.set_line_status, &[0, 0]);
        assert_eq!(canonical.set_topo_vect, &[0, 0, 1, 0, 0, 0, 0]);
    }

    #[test]
    fn dense_length_mismatch_fails_update_immediately() {
        let mut action = Action::new(layout());
        let err = action
            .update(
                &ActionUpdate::new().with_set_line_status(VectorUpdate::Dense(vec![1, 0, -1])),
            )
            .unwrap_err();
        assert_eq!(
            err,
            IllegalAction::LengthMismatch {
                field: FieldKey::SetLineStatus,
                expected: 2,
                got: 3,
            }
        );
    }

    #[test]
    fn sparse_index_out_of_range_fails_update_immediately() {
        let mut action = Action::new(layout());
        let err = action
            .update(
                &ActionUpdate::new().with_change_bus_vect(ToggleUpdate::Indices(vec![7])),
            )
            .unwrap_err();
        assert_eq!(
            err,
            IllegalAction::IndexOutOfRange {
                field: FieldKey::ChangeBusVect,
                index: 7,
                len: 7,
            }
        );
    }

    #[test]
    fn set_and_switch_on_one_line_is_ambiguous() {
        let mut action = Action::new(layout());
        action
            .update(
                &ActionUpdate::new()
                    .with_set_line_status(VectorUpdate::Sparse(vec![(1, 1)]))
                    .with_switch_line_status(ToggleUpdate::Indices(vec![1])),
            )
            .unwrap();

        let err = action.materialize().unwrap_err();
        assert_eq!(
            err,
            ActionError::Ambiguous(AmbiguousAction::LineStatusConflict { line: 1 })
        );
    }

    #[test]
    fn set_and_change_on_one_slot_is_ambiguous() {
        let mut action = Action::new(layout());
        action
            .update(
                &ActionUpdate::new()
                    .with_set_topo_vect(VectorUpdate::Sparse(vec![(3, 2)]))
                    .with_change_bus_vect(ToggleUpdate::Indices(vec![3])),
            )
            .unwrap();

        let err = action.materialize().unwrap_err();
        assert_eq!(
            err,
            ActionError::Ambiguous(AmbiguousAction::BusAssignmentConflict { slot: 3 })
        );
    }

    #[test]
    fn rejected_materialization_is_correctable() {
        let mut action = Action::new(layout());
        action
            .update(
                &ActionUpdate::new()
                    .with_set_line_status(VectorUpdate::Sparse(vec![(0, 1)]))
                    .with_switch_line_status(ToggleUpdate::Indices(vec![0])),
            )
            .unwrap();
        assert!(action.materialize().is_err());
        // Re-checked every call, nothing is cached.
        assert!(action.materialize().is_err());

        action
            .update(
                &ActionUpdate::new().with_set_line_status(VectorUpdate::Sparse(vec![(0, 1)])),
            )
            .unwrap();
        let canonical = action.materialize().unwrap();
        assert_eq!(canonical.set_line_status, &[1, 0]);
    }

    #[test]
    fn out_of_domain_status_is_reported_at_materialization() {
        let mut action = Action::new(layout());
        action
            .update(
                &ActionUpdate::new().with_set_line_status(VectorUpdate::Dense(vec![0, 5])),
            )
            .unwrap();
        let err = action.materialize().unwrap_err();
        assert_eq!(
            err,
            ActionError::Illegal(IllegalAction::LineStatusOutOfRange { line: 1, value: 5 })
        );
    }

    #[test]
    fn bus_below_minus_one_is_illegal() {
        let mut action = Action::new(layout());
        action
            .update(
                &ActionUpdate::new().with_set_topo_vect(VectorUpdate::Sparse(vec![(4, -3)])),
            )
            .unwrap();
        let err = action.materialize().unwrap_err();
        assert_eq!(
            err,
            ActionError::Illegal(IllegalAction::BusOutOfRange {
                slot: 4,
                value: -3,
                max_bus: 2,
            })
        );
    }

    #[test]
    fn bus_above_busbar_count_is_illegal() {
        let mut action = Action::new(layout());
        action
            .update(
                &ActionUpdate::new().with_set_topo_vect(VectorUpdate::Sparse(vec![(0, 3)])),
            )
            .unwrap();
        assert_eq!(
            action.materialize().unwrap_err(),
            ActionError::Illegal(IllegalAction::BusOutOfRange {
                slot: 0,
                value: 3,
                max_bus: 2,
            })
        );
    }

    #[test]
    fn unrestricted_action_returns_injection_unchanged() {
        let mut action = Action::new(layout());
        let diagnostics = action
            .update(&ActionUpdate::new().with_injection(injection("load_p", &[10.0, 20.0])))
            .unwrap();
        assert!(diagnostics.is_empty());

        let canonical = action.materialize().unwrap();
        assert_eq!(canonical.injection.get("load_p").unwrap(), &[10.0, 20.0]);
    }

    #[test]
    fn injection_sized_to_the_wrong_element_count_is_illegal() {
        let mut action = Action::new(layout());
        action
            .update(&ActionUpdate::new().with_injection(injection("prod_p", &[1.0, 2.0])))
            .unwrap();
        let err = action.materialize().unwrap_err();
        assert_eq!(
            err,
            ActionError::Illegal(IllegalAction::InjectionLengthMismatch {
                key: "prod_p".into(),
                expected: 1,
                got: 2,
            })
        );
    }

    #[test]
    fn unknown_injection_keys_are_dropped_with_a_diagnostic() {
        let mut action = Action::new(layout());
        let diagnostics = action
            .update(&ActionUpdate::new().with_injection(injection("load_v", &[1.0, 2.0])))
            .unwrap();
        assert_eq!(
            diagnostics.iter().next(),
            Some(&Diagnostic::UnknownInjectionKey {
                key: "load_v".into()
            })
        );
        assert!(action.materialize().unwrap().injection.is_empty());
    }

    #[test]
    fn non_finite_redispatch_is_illegal() {
        let mut action = Action::new(layout());
        action
            .update(
                &ActionUpdate::new().with_redispatch(VectorUpdate::Sparse(vec![(0, f64::NAN)])),
            )
            .unwrap();
        assert_eq!(
            action.materialize().unwrap_err(),
            ActionError::Illegal(IllegalAction::NonFiniteRedispatch { generator: 0 })
        );
    }

    #[test]
    fn sample_resets_to_neutral() {
        let mut action = Action::new(layout());
        action
            .update(
                &ActionUpdate::new().with_switch_line_status(ToggleUpdate::Indices(vec![0])),
            )
            .unwrap();
        action.sample(&crate::rng::PcgRng);
        assert!(action.is_neutral());
    }

    #[test]
    fn display_summarizes_the_command() {
        let mut action = Action::new(layout());
        assert_eq!(action.to_string(), "This action will:\n\t- do nothing");

        action
            .update(
                &ActionUpdate::new()
                    .with_set_line_status(VectorUpdate::Dense(vec![1, -1]))
                    .with_change_bus_vect(ToggleUpdate::Indices(vec![2])),
            )
            .unwrap();
        let rendered = action.to_string();
        assert!(rendered.contains("force the connection of 1 powerline(s)"));
        assert!(rendered.contains("force the disconnection of 1 powerline(s)"));
        assert!(rendered.contains("toggle the bus of 1 connectivity slot(s)"));
    }
}
