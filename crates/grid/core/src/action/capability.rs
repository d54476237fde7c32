//! Capability set controlling which command fields may be written.

use bitflags::bitflags;

use crate::action::types::FieldKey;

bitflags! {
    /// The set of command fields an [`Action`](crate::action::Action)
    /// instance permits callers to populate.
    ///
    /// The set is computed once at construction and only ever narrowed:
    /// restricted configurations remove bits rather than overriding
    /// behavior, so `update` and `materialize` consult the same data
    /// regardless of which configuration built the instance.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        const SET_LINE_STATUS    = 1 << 0;
        const SWITCH_LINE_STATUS = 1 << 1;
        const SET_TOPO_VECT      = 1 << 2;
        const CHANGE_BUS_VECT    = 1 << 3;
        const INJECTION          = 1 << 4;
        const REDISPATCH         = 1 << 5;
    }
}

impl Capabilities {
    /// Capability set of a topology-only action: everything except
    /// injections and redispatch.
    pub const fn topology() -> Self {
        Self::all()
            .difference(Self::INJECTION)
            .difference(Self::REDISPATCH)
    }

    /// Returns true if `field` may be populated under this capability set.
    pub fn permits(self, field: FieldKey) -> bool {
        self.contains(field.capability())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topology_removes_injection_and_redispatch() {
        let caps = Capabilities::topology();
        assert!(!caps.permits(FieldKey::Injection));
        assert!(!caps.permits(FieldKey::Redispatch));
        assert!(caps.permits(FieldKey::SetLineStatus));
        assert!(caps.permits(FieldKey::SwitchLineStatus));
        assert!(caps.permits(FieldKey::SetTopoVect));
        assert!(caps.permits(FieldKey::ChangeBusVect));
    }
}
