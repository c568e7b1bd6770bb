//! Customer order form

use std::{fmt, sync::OnceLock};

use jiff::{ToSpan, civil::Date};
use regex::Regex;

use crate::orders::Customer;

const MIN_NAME_CHARS: usize = 3;
const MIN_ADDRESS_CHARS: usize = 10;
const DEFAULT_MAX_ADVANCE_DAYS: u16 = 30;
const DEFAULT_ZONES: [&str; 5] = ["Norte", "Sur", "Este", "Oeste", "Centro"];

fn email_pattern() -> Option<&'static Regex> {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();

    EMAIL
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok())
        .as_ref()
}

/// Form fields, in the order they are shown and reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    /// Customer name
    Name,
    /// Email address
    Email,
    /// Delivery address
    Address,
    /// Delivery zone
    Zone,
    /// Delivery date
    DeliveryDate,
    /// Delivery time
    DeliveryTime,
    /// Contact phone
    Phone,
}

impl FormField {
    /// Machine name of the field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Address => "address",
            Self::Zone => "zone",
            Self::DeliveryDate => "delivery_date",
            Self::DeliveryTime => "delivery_time",
            Self::Phone => "phone",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field that failed its rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Offending field
    pub field: FormField,

    /// Message for the customer
    pub message: String,
}

impl FieldError {
    fn new(field: FormField, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Checkout form as entered. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerOrderForm {
    /// Full name
    pub name: String,

    /// Email address
    pub email: String,

    /// Delivery address
    pub address: String,

    /// Delivery zone
    pub zone: String,

    /// Delivery date, `YYYY-MM-DD`
    pub delivery_date: String,

    /// Delivery time
    pub delivery_time: String,

    /// Contact phone
    pub phone: Option<String>,
}

impl CustomerOrderForm {
    /// Clears every field.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Rules the checkout form is checked against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormRules {
    zones: Vec<String>,
    max_advance_days: u16,
}

impl Default for FormRules {
    fn default() -> Self {
        Self::new(
            DEFAULT_ZONES.iter().map(ToString::to_string).collect(),
            DEFAULT_MAX_ADVANCE_DAYS,
        )
    }
}

impl FormRules {
    /// Rules for the given delivery zones and booking horizon.
    pub fn new(zones: Vec<String>, max_advance_days: u16) -> Self {
        Self {
            zones,
            max_advance_days,
        }
    }

    /// Delivery zones on offer.
    pub fn zones(&self) -> &[String] {
        &self.zones
    }

    /// How many days ahead a delivery can be booked.
    pub fn max_advance_days(&self) -> u16 {
        self.max_advance_days
    }

    /// Last bookable delivery date, or `None` if it falls outside the calendar.
    pub fn last_delivery_date(&self, today: Date) -> Option<Date> {
        today
            .checked_add(i64::from(self.max_advance_days).days())
            .ok()
    }

    /// Checks every field and returns the trimmed customer details.
    ///
    /// # Errors
    ///
    /// Returns one [`FieldError`] per failing field, in field order.
    pub fn validate(
        &self,
        form: &CustomerOrderForm,
        today: Date,
    ) -> Result<Customer, Vec<FieldError>> {
        let mut errors = Vec::new();

        let name = form.name.trim();
        if name.chars().count() < MIN_NAME_CHARS {
            errors.push(FieldError::new(
                FormField::Name,
                format!("Name must be at least {MIN_NAME_CHARS} characters"),
            ));
        }

        let email = form.email.trim();
        if !email_pattern().is_some_and(|pattern| pattern.is_match(email)) {
            errors.push(FieldError::new(
                FormField::Email,
                "Enter a valid email address",
            ));
        }

        let address = form.address.trim();
        if address.chars().count() < MIN_ADDRESS_CHARS {
            errors.push(FieldError::new(
                FormField::Address,
                format!("Address must be at least {MIN_ADDRESS_CHARS} characters"),
            ));
        }

        let zone = self.check_zone(form.zone.trim(), &mut errors);
        let delivery_date = self.check_date(form.delivery_date.trim(), today, &mut errors);

        let delivery_time = form.delivery_time.trim();
        if delivery_time.is_empty() {
            errors.push(FieldError::new(
                FormField::DeliveryTime,
                "Choose a delivery time",
            ));
        }

        let phone = form
            .phone
            .as_deref()
            .map(str::trim)
            .filter(|phone| !phone.is_empty())
            .map(str::to_string);

        match (zone, delivery_date) {
            (Some(zone), Some(delivery_date)) if errors.is_empty() => Ok(Customer {
                name: name.to_string(),
                email: email.to_string(),
                address: address.to_string(),
                zone,
                delivery_date,
                delivery_time: delivery_time.to_string(),
                phone,
            }),
            _ => Err(errors),
        }
    }

    fn check_zone(&self, zone: &str, errors: &mut Vec<FieldError>) -> Option<String> {
        if zone.is_empty() {
            errors.push(FieldError::new(FormField::Zone, "Choose a delivery zone"));
            return None;
        }

        let known = self
            .zones
            .iter()
            .find(|candidate| candidate.eq_ignore_ascii_case(zone));

        if known.is_none() {
            errors.push(FieldError::new(
                FormField::Zone,
                format!("We do not deliver to {zone}"),
            ));
        }

        known.cloned()
    }

    fn check_date(&self, raw: &str, today: Date, errors: &mut Vec<FieldError>) -> Option<Date> {
        if raw.is_empty() {
            errors.push(FieldError::new(
                FormField::DeliveryDate,
                "Choose a delivery date",
            ));
            return None;
        }

        let Ok(date) = raw.parse::<Date>() else {
            errors.push(FieldError::new(
                FormField::DeliveryDate,
                format!("{raw} is not a date (YYYY-MM-DD)"),
            ));
            return None;
        };

        if date < today {
            errors.push(FieldError::new(
                FormField::DeliveryDate,
                "Delivery date cannot be in the past",
            ));
            return None;
        }

        if self
            .last_delivery_date(today)
            .is_some_and(|last| date > last)
        {
            errors.push(FieldError::new(
                FormField::DeliveryDate,
                format!(
                    "Delivery date must be within {} days",
                    self.max_advance_days
                ),
            ));
            return None;
        }

        Some(date)
    }
}
