//! Immutable description of the grid a command addresses.
//!
//! A [`GridLayout`] captures the element counts and substation geometry that
//! fix every command vector's length: one slot per powerline for the status
//! vectors, one slot per (element, substation) connection for the topology
//! vectors. Layouts are validated once at construction and then shared
//! read-only between any number of [`Action`](crate::action::Action)
//! instances.

use crate::error::{ErrorSeverity, GridError};

/// Element counts and substation geometry of a power grid.
///
/// Every load, generator, and powerline end occupies exactly one connectivity
/// slot at its substation, so the total slot count is
/// `n_load + n_gen + 2 * n_line`. Construction rejects layouts that violate
/// this accounting.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridLayout {
    n_line: usize,
    n_load: usize,
    n_gen: usize,
    sub_info: Vec<u32>,
    n_busbar: u32,
    dim_topo: usize,
}

impl GridLayout {
    /// Busbar count used by grids that do not specify one.
    pub const DEFAULT_N_BUSBAR: u32 = 2;

    /// Builds a layout from element counts and per-substation slot counts.
    ///
    /// `sub_info[s]` is the number of connectivity slots at substation `s`.
    /// The slot counts must add up to `n_load + n_gen + 2 * n_line`, and at
    /// least one busbar must exist per substation.
    pub fn new(
        n_line: usize,
        n_load: usize,
        n_gen: usize,
        sub_info: Vec<u32>,
        n_busbar: u32,
    ) -> Result<Self, LayoutError> {
        if n_busbar == 0 {
            return Err(LayoutError::NoBusbars);
        }

        let dim_topo: usize = sub_info.iter().map(|&slots| slots as usize).sum();
        let expected = n_load + n_gen + 2 * n_line;
        if dim_topo != expected {
            return Err(LayoutError::SlotCountMismatch {
                expected,
                got: dim_topo,
            });
        }

        Ok(Self {
            n_line,
            n_load,
            n_gen,
            sub_info,
            n_busbar,
            dim_topo,
        })
    }

    /// Number of powerlines.
    pub fn n_line(&self) -> usize {
        self.n_line
    }

    /// Number of loads.
    pub fn n_load(&self) -> usize {
        self.n_load
    }

    /// Number of generators.
    pub fn n_gen(&self) -> usize {
        self.n_gen
    }

    /// Number of substations.
    pub fn n_sub(&self) -> usize {
        self.sub_info.len()
    }

    /// Connectivity slots per substation.
    pub fn sub_info(&self) -> &[u32] {
        &self.sub_info
    }

    /// Highest assignable bus id at a substation.
    pub fn n_busbar(&self) -> u32 {
        self.n_busbar
    }

    /// Total number of connectivity slots across all substations.
    pub fn dim_topo(&self) -> usize {
        self.dim_topo
    }
}

/// Errors raised when a [`GridLayout`] cannot be constructed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LayoutError {
    /// Substation slot counts disagree with the element counts.
    #[error("substations expose {got} connectivity slots, element counts require {expected}")]
    SlotCountMismatch { expected: usize, got: usize },

    /// A grid needs at least one busbar per substation.
    #[error("a grid layout must have at least one busbar per substation")]
    NoBusbars,
}

impl GridError for LayoutError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::SlotCountMismatch { .. } => ErrorSeverity::Validation,
            Self::NoBusbars => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::SlotCountMismatch { .. } => "LAYOUT_SLOT_COUNT_MISMATCH",
            Self::NoBusbars => "LAYOUT_NO_BUSBARS",
        }
    }
}
