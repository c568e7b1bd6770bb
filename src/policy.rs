//! Quantity policy
//!
//! Pure checks of the per-line minimum/maximum rules. [`validate`] is the final gate
//! before an order is submitted.

use std::fmt;

use smallvec::SmallVec;

use crate::cart::{CartLine, ItemId};

/// Which bound a line breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// Fewer units than the minimum.
    BelowMinimum {
        /// Required minimum
        minimum: u32,
        /// Offending quantity
        quantity: u32,
    },

    /// More units than the maximum.
    AboveMaximum {
        /// Allowed maximum
        maximum: u32,
        /// Offending quantity
        quantity: u32,
    },
}

/// A quantity bound broken by a cart line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Line id
    pub id: ItemId,

    /// Line name, for messages
    pub name: String,

    /// The broken bound
    pub kind: ViolationKind,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ViolationKind::BelowMinimum { minimum, quantity } => write!(
                f,
                "{} requires at least {minimum} units (has {quantity})",
                self.name
            ),
            ViolationKind::AboveMaximum { maximum, quantity } => write!(
                f,
                "{} allows at most {maximum} units (has {quantity})",
                self.name
            ),
        }
    }
}

/// Violations found in a cart, in cart order.
pub type Violations = SmallVec<[Violation; 4]>;

/// Checks whether `line` may grow by `step` units.
///
/// # Errors
///
/// Returns the [`Violation`] the new quantity would cause.
pub fn check_increment(line: &CartLine, step: u32) -> Result<(), Violation> {
    let Some(maximum) = line.max_quantity() else {
        return Ok(());
    };

    let quantity = line.quantity().saturating_add(step);

    if quantity > maximum {
        return Err(Violation {
            id: line.id(),
            name: line.name().to_string(),
            kind: ViolationKind::AboveMaximum { maximum, quantity },
        });
    }

    Ok(())
}

/// True unless the line has a maximum and one more unit would exceed it.
pub fn can_increment(line: &CartLine) -> bool {
    check_increment(line, 1).is_ok()
}

/// True if one unit can be taken away without going below the minimum.
pub fn can_decrement_without_removal(line: &CartLine) -> bool {
    line.quantity()
        .checked_sub(1)
        .is_some_and(|quantity| quantity >= line.min_quantity())
}

/// Returns the bound broken by `line`, if any.
pub fn violation_for(line: &CartLine) -> Option<Violation> {
    let quantity = line.quantity();
    let minimum = line.min_quantity();

    let kind = if quantity < minimum {
        ViolationKind::BelowMinimum { minimum, quantity }
    } else {
        match line.max_quantity() {
            Some(maximum) if quantity > maximum => {
                ViolationKind::AboveMaximum { maximum, quantity }
            }
            _ => return None,
        }
    };

    Some(Violation {
        id: line.id(),
        name: line.name().to_string(),
        kind,
    })
}

/// Checks every line against its bounds. An empty result means the cart is valid.
pub fn validate(lines: &[CartLine]) -> Violations {
    lines.iter().filter_map(violation_for).collect()
}
