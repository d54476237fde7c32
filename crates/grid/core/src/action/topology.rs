//! Topology-restricted command configuration.
//!
//! A topology action may only alter powerline status and bus assignment:
//! the injection and redispatch capabilities are removed at construction.
//! There is no subtype — the restriction is a capability preset, and the
//! shared merge/validate machinery consults it like any other set.

use std::sync::Arc;

use crate::action::capability::Capabilities;
use crate::action::core::Action;
use crate::grid::GridLayout;

impl Action {
    /// Builds an action restricted to topology changes.
    ///
    /// Injection or redispatch content supplied to [`Action::update`] is
    /// reported as unauthorized, and [`Action::materialize`] refuses the
    /// instance while that content remains. The canonical view of a
    /// topology action therefore always carries an empty injection mapping
    /// and an all-zero redispatch vector.
    pub fn topology(layout: Arc<GridLayout>) -> Self {
        Self::with_capabilities(layout, Capabilities::topology())
    }
}
