//! Order submission
//!
//! One attempt walks `Idle → Validating → Persisting → Messaging → Done`. Validation
//! failures stop before any side effect; a persistence failure leaves the cart and the
//! form untouched for a retry; a messaging failure is reported alongside the stored
//! order.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use jiff::civil::Date;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::{
    cart::{CartError, CartStore, Confirmation, SnapshotStore},
    messaging::{ConversationLink, Messenger, MessagingError},
    orders::{
        ComposeError, CustomerOrderForm, OrderComposer, OrderRecord, OrdersRepository,
        PersistenceError, SavedOrder,
    },
};

/// Pause between opening the conversation and clearing the cart.
pub const DEFAULT_CLEAR_DELAY: Duration = Duration::from_millis(2_000);

/// Stage an attempt failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailedStage {
    /// Building the order
    Validating,
    /// Storing the order
    Persisting,
    /// Opening the conversation
    Messaging,
}

/// Progress of the current submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionStage {
    /// Nothing submitted yet
    #[default]
    Idle,
    /// Building and checking the order
    Validating,
    /// Storing the order
    Persisting,
    /// Opening the conversation
    Messaging,
    /// Order stored, cart cleared
    Done,
    /// The attempt stopped at the given stage
    Failed(FailedStage),
}

impl fmt::Display for SubmissionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Validating => f.write_str("validating"),
            Self::Persisting => f.write_str("persisting"),
            Self::Messaging => f.write_str("messaging"),
            Self::Done => f.write_str("done"),
            Self::Failed(stage) => write!(f, "failed while {}", Self::from(*stage)),
        }
    }
}

impl From<FailedStage> for SubmissionStage {
    fn from(stage: FailedStage) -> Self {
        match stage {
            FailedStage::Validating => Self::Validating,
            FailedStage::Persisting => Self::Persisting,
            FailedStage::Messaging => Self::Messaging,
        }
    }
}

/// Submission errors
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// Another submission is still running.
    #[error("an order is already being submitted")]
    InFlight,

    /// The order could not be built.
    #[error(transparent)]
    Compose(#[from] ComposeError),

    /// The conversation link could not be built.
    #[error(transparent)]
    Link(MessagingError),

    /// The order could not be stored.
    #[error("failed to store the order: {0}")]
    Persistence(#[from] PersistenceError),

    /// The cart could not be read.
    #[error(transparent)]
    Cart(#[from] CartError),
}

impl SubmissionError {
    /// Human-readable messages to show the customer.
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Compose(error) => error.messages(),
            other => vec![other.to_string()],
        }
    }
}

/// Outcome of a submission that stored its order.
#[derive(Debug)]
pub struct SubmissionReceipt {
    /// The stored order
    pub order: SavedOrder,

    /// The conversation that was opened
    pub link: ConversationLink,

    /// Why the conversation could not be opened, if it could not
    pub messaging_error: Option<MessagingError>,

    /// Whether the cart was emptied afterwards
    pub cart_cleared: bool,
}

struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Runs order submissions, one at a time.
pub struct OrderSubmitter {
    composer: OrderComposer,
    orders: Arc<dyn OrdersRepository>,
    messenger: Arc<dyn Messenger>,
    whatsapp_number: String,
    clear_delay: Duration,
    stage: watch::Sender<SubmissionStage>,
    in_flight: AtomicBool,
}

impl fmt::Debug for OrderSubmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderSubmitter")
            .field("composer", &self.composer)
            .field("whatsapp_number", &self.whatsapp_number)
            .field("clear_delay", &self.clear_delay)
            .field("stage", &*self.stage.borrow())
            .finish_non_exhaustive()
    }
}

impl OrderSubmitter {
    /// Creates a submitter sending conversations to `whatsapp_number`.
    pub fn new(
        composer: OrderComposer,
        orders: Arc<dyn OrdersRepository>,
        messenger: Arc<dyn Messenger>,
        whatsapp_number: impl Into<String>,
    ) -> Self {
        let (stage, _) = watch::channel(SubmissionStage::Idle);

        Self {
            composer,
            orders,
            messenger,
            whatsapp_number: whatsapp_number.into(),
            clear_delay: DEFAULT_CLEAR_DELAY,
            stage,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Sets the pause before the cart is cleared.
    #[must_use]
    pub fn with_clear_delay(mut self, clear_delay: Duration) -> Self {
        self.clear_delay = clear_delay;
        self
    }

    /// Current stage.
    pub fn stage(&self) -> SubmissionStage {
        *self.stage.borrow()
    }

    /// Watches stage changes.
    pub fn subscribe(&self) -> watch::Receiver<SubmissionStage> {
        self.stage.subscribe()
    }

    /// True while a submission is running.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Submits the cart.
    ///
    /// On success the cart is cleared and the form reset once the conversation has been
    /// opened and the clear delay has passed.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError::InFlight`] if another submission is running, and
    /// otherwise the error of the stage that failed before the order was stored.
    pub async fn submit<S: SnapshotStore>(
        &self,
        cart: &mut CartStore<S>,
        form: &mut CustomerOrderForm,
        today: Date,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        let Some(_guard) = InFlight::acquire(&self.in_flight) else {
            warn!("submission rejected: another one is in flight");
            return Err(SubmissionError::InFlight);
        };

        self.enter(SubmissionStage::Validating);

        let (record, link) = match self.prepare(cart, form, today) {
            Ok(prepared) => prepared,
            Err(error) => {
                warn!(%error, "order rejected");
                self.enter(SubmissionStage::Failed(FailedStage::Validating));
                return Err(error);
            }
        };

        self.enter(SubmissionStage::Persisting);

        let order = match self.orders.insert(&record).await {
            Ok(order) => order,
            Err(error) => {
                error!(%error, "order could not be stored");
                self.enter(SubmissionStage::Failed(FailedStage::Persisting));
                return Err(error.into());
            }
        };

        info!(order = %order.id, "order stored");

        self.enter(SubmissionStage::Messaging);

        let messaging_error = self.messenger.open(&link).await.err();

        if let Some(error) = &messaging_error {
            warn!(order = %order.id, %error, "conversation could not be opened");
            self.enter(SubmissionStage::Failed(FailedStage::Messaging));
        }

        if !self.clear_delay.is_zero() {
            tokio::time::sleep(self.clear_delay).await;
        }

        let cart_cleared = match cart.clear(Confirmation::Confirmed) {
            Ok(_) => true,
            Err(error) => {
                warn!(%error, "cart could not be cleared after checkout");
                false
            }
        };

        form.reset();

        if messaging_error.is_none() {
            self.enter(SubmissionStage::Done);
        }

        Ok(SubmissionReceipt {
            order,
            link,
            messaging_error,
            cart_cleared,
        })
    }

    fn prepare<S: SnapshotStore>(
        &self,
        cart: &mut CartStore<S>,
        form: &CustomerOrderForm,
        today: Date,
    ) -> Result<(OrderRecord, ConversationLink), SubmissionError> {
        cart.initialize()?;

        let record = self
            .composer
            .build_order_record(cart.lines(), form, today)?;

        let link = ConversationLink::whatsapp(
            &self.whatsapp_number,
            self.composer.build_message(&record),
        )
        .map_err(SubmissionError::Link)?;

        Ok((record, link))
    }

    fn enter(&self, stage: SubmissionStage) {
        info!(%stage, "submission stage");
        self.stage.send_replace(stage);
    }
}
