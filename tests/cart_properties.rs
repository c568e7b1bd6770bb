//! Cart invariants over arbitrary operation sequences.

use proptest::prelude::*;
use rust_decimal::Decimal;
use rustc_hash::FxHashSet;
use sazon::{
    cart::{CartStore, ComboBounds, Confirmation, MemorySnapshotStore, Purchasable},
    policy,
    reconciler::{ControlState, project},
};

#[derive(Debug, Clone)]
enum Op {
    Add(usize),
    Increment(usize),
    Decrement(usize, bool),
    Remove(usize),
    Clear(bool),
}

fn menu() -> Result<Vec<Purchasable>, String> {
    let bounded = ComboBounds::new(3, Some(5)).map_err(|error| error.to_string())?;
    let open = ComboBounds::new(2, None).map_err(|error| error.to_string())?;

    Ok(vec![
        Purchasable::regular(7, "Arroz", Decimal::from(15_000)),
        Purchasable::regular(8, "Sopa del día", Decimal::from(9_500)),
        Purchasable::combo(20, "Combo Familiar", Decimal::from(42_000), bounded),
        Purchasable::combo(21, "Combo Pareja", Decimal::from(30_000), open),
    ])
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..4usize).prop_map(Op::Add),
        (0..4usize).prop_map(Op::Increment),
        (0..4usize, any::<bool>()).prop_map(|(idx, yes)| Op::Decrement(idx, yes)),
        (0..4usize).prop_map(Op::Remove),
        any::<bool>().prop_map(Op::Clear),
    ]
}

fn apply_all(ops: &[Op]) -> Result<(), String> {
    let menu = menu()?;
    let item = |idx: usize| {
        menu.get(idx)
            .ok_or_else(|| format!("no menu item at {idx}"))
    };

    let mut cart = CartStore::load(MemorySnapshotStore::new()).map_err(|e| e.to_string())?;

    for op in ops {
        let update = match op {
            Op::Add(idx) => cart.add_item(item(*idx)?),
            Op::Increment(idx) => cart.increment(item(*idx)?.id),
            Op::Decrement(idx, yes) => {
                cart.decrement(item(*idx)?.id, Confirmation::from(*yes))
            }
            Op::Remove(idx) => cart.remove_item(item(*idx)?.id),
            Op::Clear(yes) => cart.clear(Confirmation::from(*yes)),
        }
        .map_err(|e| e.to_string())?;

        let violations = policy::validate(cart.lines());
        if !violations.is_empty() {
            return Err(format!("{op:?} -> {update:?} left violations {violations:?}"));
        }

        let mut ids = FxHashSet::default();
        if !cart.lines().iter().all(|line| ids.insert(line.id())) {
            return Err(format!("{op:?} duplicated a line"));
        }

        let units: u64 = cart.lines().iter().map(|line| u64::from(line.quantity())).sum();
        if units != cart.total_item_count() {
            return Err(format!("badge count {} != {units}", cart.total_item_count()));
        }

        let reloaded =
            CartStore::load(cart.store().clone()).map_err(|e| e.to_string())?;

        if reloaded.lines() != cart.lines() {
            return Err(format!(
                "{op:?}: reloaded {:?} != {:?}",
                reloaded.lines(),
                cart.lines()
            ));
        }

        for product in &menu {
            let before = project(&cart, product.id);
            let after = project(&reloaded, product.id);

            if before != after
                || before != ControlState::for_quantity(cart.quantity_of(product.id))
            {
                return Err(format!("controls for {} diverged after reload", product.id));
            }
        }
    }

    Ok(())
}

proptest! {
    #[test]
    fn snapshots_reload_to_the_same_valid_cart(ops in prop::collection::vec(op(), 0..40)) {
        apply_all(&ops).map_err(TestCaseError::fail)?;
    }
}
