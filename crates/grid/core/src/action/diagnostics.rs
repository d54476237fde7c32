//! Non-fatal diagnostics produced while merging a command.
//!
//! A dropped or unauthorized key never fails `update`; it is reported here
//! and the command stays usable. The collected list is returned to the
//! caller instead of being written to any global output, so the core stays
//! free of implicit side channels.

use std::fmt;

use strum::IntoEnumIterator;

use crate::action::capability::Capabilities;
use crate::action::types::FieldKey;

/// A single non-fatal finding from merging a command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Diagnostic {
    /// A loose entry key matched no known field; its data was dropped.
    UnknownKey { key: String },

    /// A recognized field is outside this instance's capability set.
    ///
    /// The content is still digested so that materialization can refuse it
    /// explicitly; it is never silently handed to the simulator.
    UnauthorizedField {
        field: FieldKey,
        authorized: Capabilities,
    },

    /// An injection entry used a non-canonical key; its data was dropped.
    UnknownInjectionKey { key: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownKey { key } => {
                write!(
                    f,
                    "the key \"{key}\" used to update an action will be ignored; known keys are "
                )?;
                write_keys(f, FieldKey::iter())
            }
            Self::UnauthorizedField { field, authorized } => {
                write!(
                    f,
                    "the field \"{field}\" is not authorized for this action; authorized fields are "
                )?;
                write_keys(f, FieldKey::iter().filter(|k| authorized.permits(*k)))
            }
            Self::UnknownInjectionKey { key } => {
                write!(f, "the injection key \"{key}\" is not recognized and will be ignored")
            }
        }
    }
}

fn write_keys(f: &mut fmt::Formatter<'_>, keys: impl Iterator<Item = FieldKey>) -> fmt::Result {
    write!(f, "[")?;
    for (i, key) in keys.enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{key}")?;
    }
    write!(f, "]")
}

/// The diagnostics collected by one merge or parse pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub(crate) fn push(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    /// True if the pass produced no findings.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of findings.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterates the findings in the order they were produced.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, diagnostic) in self.entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{diagnostic}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_key_message_lists_known_keys() {
        let diagnostic = Diagnostic::UnknownKey {
            key: "set_status".into(),
        };
        let message = diagnostic.to_string();
        assert!(message.contains("\"set_status\""));
        assert!(message.contains("set_line_status"));
        assert!(message.contains("redispatch"));
    }

    #[test]
    fn unauthorized_message_lists_only_authorized_keys() {
        let diagnostic = Diagnostic::UnauthorizedField {
            field: FieldKey::Injection,
            authorized: Capabilities::topology(),
        };
        let message = diagnostic.to_string();
        assert!(message.contains("\"injection\""));
        assert!(message.contains("change_bus_vect"));
        // The removed capabilities must not be advertised as valid.
        assert!(!message.contains("authorized fields are [injection"));
        assert!(!message.contains(", injection"));
    }
}
