//! Cart
//!
//! The cart owns the authoritative list of lines for a browsing session. Every
//! mutation is applied to a copy of the lines, written to the snapshot store, and only
//! then committed, so the in-memory list never runs ahead of its persisted mirror.

use rust_decimal::Decimal;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};
use thiserror::Error;
use tracing::{debug, warn};

use crate::policy::{self, Violation};

pub mod snapshot;

pub use snapshot::{FileSnapshotStore, MemorySnapshotStore, SnapshotError, SnapshotStore};

/// Identifier of a menu item or combo.
pub type ItemId = u64;

/// Key the cart snapshot is stored under.
pub const SNAPSHOT_KEY: &str = "cart";

/// Errors related to the cart and its snapshot.
#[derive(Debug, Error)]
pub enum CartError {
    /// Combo bounds where the minimum is zero or the maximum is below the minimum.
    #[error("invalid combo bounds: minimum {min}, maximum {max:?}")]
    InvalidBounds {
        /// Configured minimum
        min: u32,
        /// Configured maximum
        max: Option<u32>,
    },

    /// A stored snapshot that does not describe a valid cart.
    #[error("corrupt cart snapshot: {0}")]
    CorruptSnapshot(String),

    /// The snapshot could not be encoded.
    #[error("failed to encode cart snapshot")]
    Encode(#[source] serde_json::Error),

    /// The snapshot store failed.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// Quantity bounds carried by a combo line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboBounds {
    min_quantity: u32,
    max_quantity: Option<u32>,
}

impl ComboBounds {
    /// Creates combo bounds.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidBounds`] if `min_quantity` is zero or `max_quantity`
    /// is below it.
    pub fn new(min_quantity: u32, max_quantity: Option<u32>) -> Result<Self, CartError> {
        let bounds = Self {
            min_quantity,
            max_quantity,
        };

        if bounds.is_consistent() {
            Ok(bounds)
        } else {
            Err(CartError::InvalidBounds {
                min: min_quantity,
                max: max_quantity,
            })
        }
    }

    /// Bounds with a minimum of one and no maximum.
    #[must_use]
    pub fn unbounded() -> Self {
        Self {
            min_quantity: 1,
            max_quantity: None,
        }
    }

    /// Minimum quantity of the combo.
    pub fn min_quantity(&self) -> u32 {
        self.min_quantity
    }

    /// Maximum quantity of the combo, if any.
    pub fn max_quantity(&self) -> Option<u32> {
        self.max_quantity
    }

    fn is_consistent(&self) -> bool {
        self.min_quantity >= 1
            && self
                .max_quantity
                .is_none_or(|max| max >= self.min_quantity)
    }
}

impl Default for ComboBounds {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// Kind of a cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LineKind {
    /// A regular menu item: minimum one, no maximum.
    Regular,

    /// A combo with its own bounds.
    Combo(ComboBounds),
}

impl LineKind {
    /// Minimum quantity while the line exists.
    pub fn min_quantity(&self) -> u32 {
        match self {
            Self::Regular => 1,
            Self::Combo(bounds) => bounds.min_quantity(),
        }
    }

    /// Maximum quantity, if bounded.
    pub fn max_quantity(&self) -> Option<u32> {
        match self {
            Self::Regular => None,
            Self::Combo(bounds) => bounds.max_quantity(),
        }
    }

    /// Quantity added when the item is added again: one for regular items, the
    /// minimum for combos.
    pub fn add_step(&self) -> u32 {
        self.min_quantity()
    }

    /// Returns true for combo lines.
    pub fn is_combo(&self) -> bool {
        matches!(self, Self::Combo(_))
    }
}

/// Something that can be put into the cart.
#[derive(Debug, Clone, PartialEq)]
pub struct Purchasable {
    /// Menu item or combo id
    pub id: ItemId,

    /// Display name
    pub name: String,

    /// Unit price
    pub unit_price: Decimal,

    /// Image URL
    pub image_url: Option<String>,

    /// Regular item or combo
    pub kind: LineKind,
}

impl Purchasable {
    /// A regular menu item.
    pub fn regular(id: ItemId, name: impl Into<String>, unit_price: Decimal) -> Self {
        Self {
            id,
            name: name.into(),
            unit_price,
            image_url: None,
            kind: LineKind::Regular,
        }
    }

    /// A combo with the given bounds.
    pub fn combo(
        id: ItemId,
        name: impl Into<String>,
        unit_price: Decimal,
        bounds: ComboBounds,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            unit_price,
            image_url: None,
            kind: LineKind::Combo(bounds),
        }
    }

    /// Sets the image URL.
    #[must_use]
    pub fn with_image(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }
}

/// One line of the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    id: ItemId,
    name: String,
    unit_price: Decimal,
    image_url: Option<String>,
    quantity: u32,
    kind: LineKind,
}

impl CartLine {
    /// Creates a line.
    pub fn new(
        id: ItemId,
        name: impl Into<String>,
        unit_price: Decimal,
        image_url: Option<String>,
        quantity: u32,
        kind: LineKind,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            unit_price,
            image_url,
            quantity,
            kind,
        }
    }

    fn first_insert(item: &Purchasable) -> Self {
        Self::new(
            item.id,
            item.name.clone(),
            item.unit_price,
            item.image_url.clone(),
            item.kind.min_quantity(),
            item.kind,
        )
    }

    /// Menu item or combo id.
    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unit price.
    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    /// Image URL.
    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    /// Quantity in the cart.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Regular item or combo.
    pub fn kind(&self) -> LineKind {
        self.kind
    }

    /// Minimum quantity while the line exists.
    pub fn min_quantity(&self) -> u32 {
        self.kind.min_quantity()
    }

    /// Maximum quantity, if bounded.
    pub fn max_quantity(&self) -> Option<u32> {
        self.kind.max_quantity()
    }

    /// Unit price times quantity.
    pub fn subtotal(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Whether the user has confirmed a destructive action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Confirmation {
    /// Not confirmed; destructive actions are reported back instead of applied.
    #[default]
    Unconfirmed,

    /// Confirmed by the user.
    Confirmed,
}

impl From<bool> for Confirmation {
    fn from(confirmed: bool) -> Self {
        if confirmed {
            Self::Confirmed
        } else {
            Self::Unconfirmed
        }
    }
}

/// Outcome of a cart operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartUpdate {
    /// A new line was inserted.
    Added {
        /// Line id
        id: ItemId,
        /// Quantity of the new line
        quantity: u32,
    },

    /// The quantity of an existing line changed.
    Updated {
        /// Line id
        id: ItemId,
        /// New quantity
        quantity: u32,
    },

    /// A line was removed.
    Removed {
        /// Line id
        id: ItemId,
    },

    /// Every line was removed.
    Cleared {
        /// Ids of the removed lines, in cart order
        ids: Vec<ItemId>,
    },

    /// The operation would break a quantity bound and was not applied.
    Rejected {
        /// The bound that would have been broken
        violation: Violation,
    },

    /// The operation removes data and needs the user to confirm it first.
    ///
    /// `id` is the line that would be removed, or `None` when clearing the cart.
    NeedsConfirmation {
        /// Line that would be removed
        id: Option<ItemId>,
    },

    /// Nothing to do (for example, the line does not exist).
    Unchanged,
}

impl CartUpdate {
    /// Returns true if the cart changed.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::Added { .. } | Self::Updated { .. } | Self::Removed { .. } | Self::Cleared { .. }
        )
    }

    /// Returns true if the caller must ask for confirmation and retry.
    pub fn requires_confirmation(&self) -> bool {
        matches!(self, Self::NeedsConfirmation { .. })
    }

    /// Ids of the lines whose on-screen controls may have changed.
    pub fn affected_ids(&self) -> SmallVec<[ItemId; 4]> {
        match self {
            Self::Added { id, .. } | Self::Updated { id, .. } | Self::Removed { id } => {
                smallvec![*id]
            }
            Self::Cleared { ids } => ids.iter().copied().collect(),
            Self::Rejected { violation } => smallvec![violation.id],
            Self::NeedsConfirmation { id } => id.iter().copied().collect(),
            Self::Unchanged => SmallVec::new(),
        }
    }
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    lines: &'a [CartLine],
}

#[derive(Deserialize)]
struct SnapshotOwned {
    lines: Vec<CartLine>,
}

/// Cart store backed by a [`SnapshotStore`].
#[derive(Debug)]
pub struct CartStore<S: SnapshotStore> {
    lines: Vec<CartLine>,
    store: S,
    initialized: bool,
}

impl<S: SnapshotStore> CartStore<S> {
    /// Creates an uninitialised cart over `store`.
    ///
    /// Call [`CartStore::initialize`] (or use [`CartStore::load`]) to seed it from the
    /// persisted snapshot. Mutations initialise the cart on demand.
    pub fn new(store: S) -> Self {
        Self {
            lines: Vec::new(),
            store,
            initialized: false,
        }
    }

    /// Creates a cart and seeds it from the persisted snapshot.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the snapshot store cannot be read.
    pub fn load(store: S) -> Result<Self, CartError> {
        let mut cart = Self::new(store);

        cart.initialize()?;

        Ok(cart)
    }

    /// Seeds the cart from the persisted snapshot, once.
    ///
    /// Later calls are no-ops. An unreadable snapshot is discarded and the cart starts
    /// empty.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the snapshot store cannot be read.
    pub fn initialize(&mut self) -> Result<(), CartError> {
        if self.initialized {
            return Ok(());
        }

        let lines = match self.store.get(SNAPSHOT_KEY)? {
            Some(raw) => decode_lines(&raw).unwrap_or_else(|error| {
                warn!(%error, "discarding unreadable cart snapshot");
                Vec::new()
            }),
            None => Vec::new(),
        };

        self.lines = lines;
        self.initialized = true;

        debug!(lines = self.lines.len(), "cart initialized");

        Ok(())
    }

    /// Adds an item.
    ///
    /// An existing line grows by one (regular) or by the combo minimum; a new line
    /// starts at one (regular) or at the combo minimum. The bounds of `item` replace the
    /// ones stored on the line. Growing past the combo maximum is rejected.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the snapshot cannot be persisted.
    pub fn add_item(&mut self, item: &Purchasable) -> Result<CartUpdate, CartError> {
        self.apply(|lines| {
            let Some(line) = lines.iter_mut().find(|line| line.id == item.id) else {
                let line = CartLine::first_insert(item);
                let quantity = line.quantity;

                lines.push(line);

                return CartUpdate::Added {
                    id: item.id,
                    quantity,
                };
            };

            line.kind = item.kind;

            grow(line, item.kind.add_step())
        })
    }

    /// Removes a line regardless of its quantity.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the snapshot cannot be persisted.
    pub fn remove_item(&mut self, id: ItemId) -> Result<CartUpdate, CartError> {
        self.apply(|lines| {
            let before = lines.len();

            lines.retain(|line| line.id != id);

            if lines.len() == before {
                CartUpdate::Unchanged
            } else {
                CartUpdate::Removed { id }
            }
        })
    }

    /// Increments a line by one, unless that breaks its maximum.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the snapshot cannot be persisted.
    pub fn increment(&mut self, id: ItemId) -> Result<CartUpdate, CartError> {
        self.apply(|lines| match lines.iter_mut().find(|line| line.id == id) {
            Some(line) => grow(line, 1),
            None => CartUpdate::Unchanged,
        })
    }

    /// Decrements a line by one.
    ///
    /// A regular line at quantity one is removed. A combo line at its minimum is only
    /// removed when `confirmation` is [`Confirmation::Confirmed`]; otherwise nothing
    /// changes and [`CartUpdate::NeedsConfirmation`] is returned.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the snapshot cannot be persisted.
    pub fn decrement(
        &mut self,
        id: ItemId,
        confirmation: Confirmation,
    ) -> Result<CartUpdate, CartError> {
        self.apply(|lines| {
            let Some(line) = lines.iter_mut().find(|line| line.id == id) else {
                return CartUpdate::Unchanged;
            };

            if policy::can_decrement_without_removal(line) {
                line.quantity -= 1;

                return CartUpdate::Updated {
                    id,
                    quantity: line.quantity,
                };
            }

            let confirmed = confirmation == Confirmation::Confirmed;

            if line.kind.is_combo() && !confirmed {
                return CartUpdate::NeedsConfirmation { id: Some(id) };
            }

            lines.retain(|line| line.id != id);

            CartUpdate::Removed { id }
        })
    }

    /// Empties the cart once the user has confirmed.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the snapshot cannot be persisted.
    pub fn clear(&mut self, confirmation: Confirmation) -> Result<CartUpdate, CartError> {
        self.apply(|lines| {
            if lines.is_empty() {
                return CartUpdate::Unchanged;
            }

            if confirmation == Confirmation::Unconfirmed {
                return CartUpdate::NeedsConfirmation { id: None };
            }

            let ids = lines.drain(..).map(|line| line.id).collect();

            CartUpdate::Cleared { ids }
        })
    }

    /// Quantity of a line, or zero if absent.
    pub fn quantity_of(&self, id: ItemId) -> u32 {
        self.line(id).map_or(0, CartLine::quantity)
    }

    /// Sum of all quantities, shown on the cart badge.
    pub fn total_item_count(&self) -> u64 {
        self.lines
            .iter()
            .map(|line| u64::from(line.quantity))
            .sum()
    }

    /// Looks up a line.
    pub fn line(&self, id: ItemId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.id == id)
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns true when the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Serialises the current lines. This is exactly what gets persisted.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Encode`] if serialisation fails.
    pub fn snapshot(&self) -> Result<String, CartError> {
        encode_lines(&self.lines)
    }

    /// The backing snapshot store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consumes the cart, returning the backing store.
    pub fn into_store(self) -> S {
        self.store
    }

    fn apply<F>(&mut self, operation: F) -> Result<CartUpdate, CartError>
    where
        F: FnOnce(&mut Vec<CartLine>) -> CartUpdate,
    {
        self.initialize()?;

        let mut next = self.lines.clone();
        let update = operation(&mut next);

        if update.is_mutation() {
            let snapshot = encode_lines(&next)?;

            self.store.set(SNAPSHOT_KEY, &snapshot)?;
            self.lines = next;

            debug!(?update, items = self.total_item_count(), "cart persisted");
        } else {
            debug!(?update, "cart unchanged");
        }

        Ok(update)
    }
}

fn grow(line: &mut CartLine, step: u32) -> CartUpdate {
    if let Err(violation) = policy::check_increment(line, step) {
        return CartUpdate::Rejected { violation };
    }

    line.quantity = line.quantity.saturating_add(step);

    CartUpdate::Updated {
        id: line.id,
        quantity: line.quantity,
    }
}

fn encode_lines(lines: &[CartLine]) -> Result<String, CartError> {
    serde_json::to_string(&SnapshotRef { lines }).map_err(CartError::Encode)
}

fn decode_lines(raw: &str) -> Result<Vec<CartLine>, CartError> {
    let snapshot: SnapshotOwned = serde_json::from_str(raw)
        .map_err(|error| CartError::CorruptSnapshot(error.to_string()))?;

    let mut seen = FxHashSet::default();

    for line in &snapshot.lines {
        if !seen.insert(line.id) {
            return Err(CartError::CorruptSnapshot(format!(
                "duplicate line {}",
                line.id
            )));
        }

        if line.quantity == 0 {
            return Err(CartError::CorruptSnapshot(format!(
                "line {} has zero quantity",
                line.id
            )));
        }

        if let LineKind::Combo(bounds) = line.kind
            && !bounds.is_consistent()
        {
            return Err(CartError::CorruptSnapshot(format!(
                "line {} has invalid bounds",
                line.id
            )));
        }

        if let Some(violation) = policy::violation_for(line) {
            return Err(CartError::CorruptSnapshot(violation.to_string()));
        }
    }

    Ok(snapshot.lines)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::policy::ViolationKind;

    use super::*;

    fn arroz() -> Purchasable {
        Purchasable::regular(7, "Arroz", Decimal::from(15_000))
    }

    fn combo(min: u32, max: Option<u32>) -> TestResult<Purchasable> {
        Ok(Purchasable::combo(
            20,
            "Combo Familiar",
            Decimal::from(42_000),
            ComboBounds::new(min, max)?,
        ))
    }

    fn cart() -> TestResult<CartStore<MemorySnapshotStore>> {
        Ok(CartStore::load(MemorySnapshotStore::new())?)
    }

    #[test]
    fn bounds_reject_zero_minimum_and_inverted_range() {
        assert!(matches!(
            ComboBounds::new(0, None),
            Err(CartError::InvalidBounds { min: 0, max: None })
        ));
        assert!(matches!(
            ComboBounds::new(3, Some(2)),
            Err(CartError::InvalidBounds {
                min: 3,
                max: Some(2)
            })
        ));
    }

    #[test]
    fn adding_twice_increments_single_line() -> TestResult {
        let mut cart = cart()?;

        assert_eq!(
            cart.add_item(&arroz())?,
            CartUpdate::Added { id: 7, quantity: 1 }
        );
        assert_eq!(
            cart.add_item(&arroz())?,
            CartUpdate::Updated { id: 7, quantity: 2 }
        );

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.quantity_of(7), 2);

        Ok(())
    }

    #[test]
    fn combo_starts_at_minimum_and_grows_by_minimum() -> TestResult {
        let mut cart = cart()?;
        let combo = combo(3, None)?;

        assert_eq!(
            cart.add_item(&combo)?,
            CartUpdate::Added {
                id: 20,
                quantity: 3
            }
        );
        assert_eq!(
            cart.add_item(&combo)?,
            CartUpdate::Updated {
                id: 20,
                quantity: 6
            }
        );

        Ok(())
    }

    #[test]
    fn adding_combo_past_maximum_is_rejected() -> TestResult {
        let mut cart = cart()?;
        let combo = combo(3, Some(5))?;

        cart.add_item(&combo)?;
        let update = cart.add_item(&combo)?;

        assert!(matches!(
            update,
            CartUpdate::Rejected {
                violation: Violation {
                    id: 20,
                    kind: ViolationKind::AboveMaximum {
                        maximum: 5,
                        quantity: 6
                    },
                    ..
                }
            }
        ));
        assert_eq!(cart.quantity_of(20), 3);

        Ok(())
    }

    #[test]
    fn re_adding_a_combo_uses_its_current_bounds() -> TestResult {
        let mut cart = cart()?;

        cart.add_item(&combo(3, Some(5))?)?;

        assert_eq!(
            cart.add_item(&combo(4, None)?)?,
            CartUpdate::Updated {
                id: 20,
                quantity: 7
            }
        );
        assert_eq!(cart.line(20).map(CartLine::min_quantity), Some(4));
        assert_eq!(cart.line(20).and_then(CartLine::max_quantity), None);

        let update = cart.add_item(&combo(2, Some(8))?)?;

        assert!(matches!(
            update,
            CartUpdate::Rejected {
                violation: Violation {
                    kind: ViolationKind::AboveMaximum {
                        maximum: 8,
                        quantity: 9
                    },
                    ..
                }
            }
        ));
        assert_eq!(cart.line(20).map(CartLine::min_quantity), Some(4));
        assert_eq!(cart.quantity_of(20), 7);

        Ok(())
    }

    #[test]
    fn increment_at_combo_maximum_is_rejected() -> TestResult {
        let mut cart = cart()?;

        cart.add_item(&combo(3, Some(5))?)?;
        cart.increment(20)?;
        cart.increment(20)?;

        assert_eq!(cart.quantity_of(20), 5);

        let update = cart.increment(20)?;

        assert!(matches!(update, CartUpdate::Rejected { .. }));
        assert_eq!(cart.quantity_of(20), 5);

        Ok(())
    }

    #[test]
    fn regular_increment_is_unbounded() -> TestResult {
        let mut cart = cart()?;

        cart.add_item(&arroz())?;

        for _ in 0..50 {
            cart.increment(7)?;
        }

        assert_eq!(cart.quantity_of(7), 51);

        Ok(())
    }

    #[test]
    fn decrementing_regular_at_one_removes_line() -> TestResult {
        let mut cart = cart()?;

        cart.add_item(&arroz())?;
        cart.add_item(&arroz())?;

        assert_eq!(
            cart.decrement(7, Confirmation::Unconfirmed)?,
            CartUpdate::Updated { id: 7, quantity: 1 }
        );
        assert_eq!(
            cart.decrement(7, Confirmation::Unconfirmed)?,
            CartUpdate::Removed { id: 7 }
        );
        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn decrementing_combo_at_minimum_needs_confirmation() -> TestResult {
        let mut cart = cart()?;

        cart.add_item(&combo(3, None)?)?;

        let update = cart.decrement(20, Confirmation::Unconfirmed)?;

        assert_eq!(update, CartUpdate::NeedsConfirmation { id: Some(20) });
        assert_eq!(cart.quantity_of(20), 3);

        let update = cart.decrement(20, Confirmation::Confirmed)?;

        assert_eq!(update, CartUpdate::Removed { id: 20 });
        assert_eq!(cart.quantity_of(20), 0);

        Ok(())
    }

    #[test]
    fn decrementing_combo_above_minimum_steps_down() -> TestResult {
        let mut cart = cart()?;

        cart.add_item(&combo(3, None)?)?;
        cart.increment(20)?;

        assert_eq!(
            cart.decrement(20, Confirmation::Unconfirmed)?,
            CartUpdate::Updated {
                id: 20,
                quantity: 3
            }
        );

        Ok(())
    }

    #[test]
    fn missing_lines_are_no_ops() -> TestResult {
        let mut cart = cart()?;

        assert_eq!(cart.remove_item(99)?, CartUpdate::Unchanged);
        assert_eq!(cart.increment(99)?, CartUpdate::Unchanged);
        assert_eq!(
            cart.decrement(99, Confirmation::Confirmed)?,
            CartUpdate::Unchanged
        );
        assert_eq!(cart.store().get(SNAPSHOT_KEY)?, None);

        Ok(())
    }

    #[test]
    fn remove_item_ignores_quantity() -> TestResult {
        let mut cart = cart()?;

        cart.add_item(&combo(4, None)?)?;

        assert_eq!(cart.remove_item(20)?, CartUpdate::Removed { id: 20 });
        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn clear_requires_confirmation() -> TestResult {
        let mut cart = cart()?;

        cart.add_item(&arroz())?;
        cart.add_item(&combo(3, None)?)?;

        assert_eq!(
            cart.clear(Confirmation::Unconfirmed)?,
            CartUpdate::NeedsConfirmation { id: None }
        );
        assert_eq!(cart.len(), 2);

        assert_eq!(
            cart.clear(Confirmation::Confirmed)?,
            CartUpdate::Cleared { ids: vec![7, 20] }
        );
        assert!(cart.is_empty());
        assert_eq!(
            cart.store().get(SNAPSHOT_KEY)?.as_deref(),
            Some(r#"{"lines":[]}"#)
        );

        Ok(())
    }

    #[test]
    fn clearing_empty_cart_is_unchanged() -> TestResult {
        let mut cart = cart()?;

        assert_eq!(cart.clear(Confirmation::Confirmed)?, CartUpdate::Unchanged);

        Ok(())
    }

    #[test]
    fn total_item_count_sums_quantities() -> TestResult {
        let mut cart = cart()?;

        cart.add_item(&arroz())?;
        cart.add_item(&arroz())?;
        cart.add_item(&combo(3, None)?)?;

        assert_eq!(cart.total_item_count(), 5);

        Ok(())
    }

    #[test]
    fn every_mutation_is_persisted_and_reloads() -> TestResult {
        let mut cart = cart()?;

        cart.add_item(&arroz().with_image("https://img.example/arroz.jpg"))?;
        cart.add_item(&combo(2, Some(6))?)?;
        cart.increment(20)?;

        assert_eq!(cart.store().get(SNAPSHOT_KEY)?, Some(cart.snapshot()?));

        let lines = cart.lines().to_vec();
        let reloaded = CartStore::load(cart.into_store())?;

        assert_eq!(reloaded.lines(), lines.as_slice());

        Ok(())
    }

    #[test]
    fn initialize_is_idempotent() -> TestResult {
        let mut seeded = cart()?;
        seeded.add_item(&arroz())?;

        let mut cart = CartStore::new(seeded.into_store());

        cart.initialize()?;
        cart.initialize()?;

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.quantity_of(7), 1);

        Ok(())
    }

    #[test]
    fn mutations_seed_from_snapshot_first() -> TestResult {
        let mut seeded = cart()?;
        seeded.add_item(&arroz())?;

        let mut cart = CartStore::new(seeded.into_store());

        cart.add_item(&arroz())?;

        assert_eq!(cart.quantity_of(7), 2);

        Ok(())
    }

    #[test]
    fn corrupt_snapshots_start_empty() -> TestResult {
        let duplicate = r#"{"lines":[
            {"id":1,"name":"A","unit_price":"100","image_url":null,"quantity":1,"kind":{"type":"regular"}},
            {"id":1,"name":"A","unit_price":"100","image_url":null,"quantity":1,"kind":{"type":"regular"}}
        ]}"#;

        let below_minimum = r#"{"lines":[
            {"id":20,"name":"Combo Familiar","unit_price":"42000","image_url":null,"quantity":1,
             "kind":{"type":"combo","min_quantity":3,"max_quantity":5}}
        ]}"#;
        let above_maximum = r#"{"lines":[
            {"id":20,"name":"Combo Familiar","unit_price":"42000","image_url":null,"quantity":9,
             "kind":{"type":"combo","min_quantity":3,"max_quantity":5}}
        ]}"#;

        for raw in ["not json", duplicate, below_minimum, above_maximum] {
            let cart = CartStore::load(MemorySnapshotStore::with_entry(SNAPSHOT_KEY, raw))?;

            assert!(cart.is_empty(), "expected {raw:?} to be discarded");
        }

        Ok(())
    }

    #[test]
    fn affected_ids_cover_update_targets() {
        assert_eq!(
            CartUpdate::Cleared { ids: vec![1, 2] }
                .affected_ids()
                .as_slice(),
            &[1, 2]
        );
        assert!(CartUpdate::Unchanged.affected_ids().is_empty());
        assert!(
            CartUpdate::NeedsConfirmation { id: None }
                .affected_ids()
                .is_empty()
        );
    }
}
