//! UI reconciler
//!
//! Projects cart state onto the per-item "add" button, the quantity control and the
//! cart badge. The projection is a pure function of the quantity, so replaying it from
//! a reloaded cart reproduces the same screen.

use rustc_hash::FxHashSet;

use crate::cart::{CartStore, CartUpdate, ItemId, SnapshotStore};

/// Visible state of one item's controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlState {
    /// The "add to cart" button is shown.
    pub add_visible: bool,

    /// The quantity control (remove, minus, count, plus) is shown.
    pub quantity_visible: bool,

    /// Quantity displayed in the control.
    pub quantity: u32,
}

impl ControlState {
    /// Projection for a quantity; zero means the item is not in the cart.
    pub fn for_quantity(quantity: u32) -> Self {
        Self {
            add_visible: quantity == 0,
            quantity_visible: quantity > 0,
            quantity,
        }
    }
}

/// Visible state of the cart badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeState {
    /// Total units in the cart
    pub count: u64,

    /// The badge is hidden when the cart is empty.
    pub visible: bool,
}

impl BadgeState {
    /// Projection for a total unit count.
    pub fn for_count(count: u64) -> Self {
        Self {
            count,
            visible: count > 0,
        }
    }
}

/// Projects the controls of item `id`.
pub fn project<S: SnapshotStore>(cart: &CartStore<S>, id: ItemId) -> ControlState {
    ControlState::for_quantity(cart.quantity_of(id))
}

/// Projects the cart badge.
pub fn badge<S: SnapshotStore>(cart: &CartStore<S>) -> BadgeState {
    BadgeState::for_count(cart.total_item_count())
}

/// Whatever renders the controls: a DOM, a terminal, a test recorder.
pub trait ControlSurface {
    /// Shows `state` for item `id`.
    fn show_controls(&mut self, id: ItemId, state: ControlState);

    /// Shows the cart badge.
    fn show_badge(&mut self, badge: BadgeState);
}

/// Keeps a [`ControlSurface`] in step with a cart.
#[derive(Debug)]
pub struct Reconciler<V: ControlSurface> {
    surface: V,
    rendered: Vec<ItemId>,
    registered: FxHashSet<ItemId>,
}

impl<V: ControlSurface> Reconciler<V> {
    /// Creates a reconciler with no rendered items.
    pub fn new(surface: V) -> Self {
        Self {
            surface,
            rendered: Vec::new(),
            registered: FxHashSet::default(),
        }
    }

    /// Records the items currently rendered on the page.
    pub fn register(&mut self, ids: impl IntoIterator<Item = ItemId>) {
        for id in ids {
            if self.registered.insert(id) {
                self.rendered.push(id);
            }
        }
    }

    /// Items currently rendered, in registration order.
    pub fn rendered(&self) -> &[ItemId] {
        &self.rendered
    }

    /// Projects every rendered item and the badge. Run once at startup.
    pub fn reconcile_all<S: SnapshotStore>(&mut self, cart: &CartStore<S>) {
        for &id in &self.rendered {
            self.surface.show_controls(id, project(cart, id));
        }

        self.surface.show_badge(badge(cart));
    }

    /// Projects the lines touched by `update`, then the badge. Run after every cart
    /// operation.
    pub fn apply<S: SnapshotStore>(&mut self, cart: &CartStore<S>, update: &CartUpdate) {
        if let CartUpdate::Cleared { .. } = update {
            self.reconcile_all(cart);
            return;
        }

        for id in update.affected_ids() {
            self.surface.show_controls(id, project(cart, id));
        }

        self.surface.show_badge(badge(cart));
    }

    /// The surface being driven.
    pub fn surface(&self) -> &V {
        &self.surface
    }

    /// Consumes the reconciler, returning its surface.
    pub fn into_surface(self) -> V {
        self.surface
    }
}
