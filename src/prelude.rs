//! Sazón prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{
        CartError, CartLine, CartStore, CartUpdate, ComboBounds, Confirmation,
        FileSnapshotStore, ItemId, LineKind, MemorySnapshotStore, Purchasable, SnapshotError,
        SnapshotStore,
    },
    catalog::{
        Catalog, CatalogError, Combo, FixtureCatalog, GalleryImage, MenuItem, SupabaseCatalog,
    },
    config::{AppConfig, ConfigError},
    messaging::{ConversationLink, LogMessenger, Messenger, MessagingError},
    orders::{
        ComposeError, CustomerOrderForm, FieldError, FormField, FormRules, OrderComposer,
        OrderRecord, OrderStats, OrderStatus, OrderSubmitter, OrdersRepository,
        PersistenceError, SavedOrder, SubmissionError, SubmissionReceipt, SubmissionStage,
        SupabaseOrdersRepository,
    },
    policy::{Violation, ViolationKind},
    receipt::ReceiptError,
    reconciler::{BadgeState, ControlState, ControlSurface, Reconciler},
    supabase::{SupabaseClient, SupabaseError},
};
