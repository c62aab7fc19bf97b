//! Checkout Form

use std::fmt;

use thiserror::Error;

use crate::{
    checkout::order::{Customer, CustomerAddress, DeliveryMethod, PaymentMethod},
    users::User,
};

/// Card numbers are between 12 and 19 digits long.
const CARD_NUMBER_DIGITS: std::ops::RangeInclusive<usize> = 12..=19;

/// CVVs are 3 or 4 digits long.
const CVV_DIGITS: std::ops::RangeInclusive<usize> = 3..=4;

/// Form fields, in the order they appear on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FormField {
    /// Full name
    FullName,

    /// Phone number
    Phone,

    /// Street address
    AddressLine,

    /// City
    City,

    /// Postal code
    Zip,

    /// Card number
    CardNumber,

    /// Card expiry, `MM/YY`
    CardExpiry,

    /// Card security code
    CardCvv,
}

impl FormField {
    /// The field's element id.
    pub fn as_str(self) -> &'static str {
        match self {
            FormField::FullName => "fullName",
            FormField::Phone => "phone",
            FormField::AddressLine => "addressLine",
            FormField::City => "city",
            FormField::Zip => "zip",
            FormField::CardNumber => "cardNumber",
            FormField::CardExpiry => "cardExpiry",
            FormField::CardCvv => "cardCvv",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every invalid field of a submitted form, in form order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("invalid checkout fields: {}", field_list(.fields))]
pub struct ValidationErrors {
    fields: Vec<FormField>,
}

fn field_list(fields: &[FormField]) -> String {
    fields
        .iter()
        .copied()
        .map(FormField::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

impl ValidationErrors {
    /// The field to focus: the first invalid one.
    pub fn first_invalid(&self) -> Option<FormField> {
        self.fields.first().copied()
    }

    /// Invalid fields in form order.
    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    /// Whether `field` is invalid.
    pub fn contains(&self, field: FormField) -> bool {
        self.fields.contains(&field)
    }

    /// Number of invalid fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether every field is valid.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn check(&mut self, field: FormField, valid: bool) {
        if !valid {
            self.fields.push(field);
        }
    }
}

/// Card details, required when paying by card.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardDetails {
    /// Card number; spaces and dashes are ignored
    pub number: String,

    /// Expiry as `MM/YY`
    pub expiry: String,

    /// Security code
    pub cvv: String,
}

impl CardDetails {
    fn number_is_valid(&self) -> bool {
        let digits: String = self
            .number
            .chars()
            .filter(|c| !matches!(c, ' ' | '-'))
            .collect();

        CARD_NUMBER_DIGITS.contains(&digits.len()) && all_digits(&digits)
    }

    fn expiry_is_valid(&self) -> bool {
        let Some((month, year)) = self.expiry.trim().split_once('/') else {
            return false;
        };

        month.len() == 2
            && year.len() == 2
            && all_digits(year)
            && month
                .parse::<u8>()
                .is_ok_and(|month| (1..=12).contains(&month))
    }

    fn cvv_is_valid(&self) -> bool {
        let cvv = self.cvv.trim();

        CVV_DIGITS.contains(&cvv.len()) && all_digits(cvv)
    }
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

fn filled(s: &str) -> bool {
    !s.trim().is_empty()
}

/// Checkout Form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutForm {
    /// Recipient's full name
    pub full_name: String,

    /// Contact phone number
    pub phone: String,

    /// Street address
    pub address_line: String,

    /// City
    pub city: String,

    /// Postal code
    pub zip: String,

    /// Shipping option
    pub delivery: DeliveryMethod,

    /// Payment option
    pub payment: PaymentMethod,

    /// Card details, checked only when paying by card
    pub card: Option<CardDetails>,
}

impl CheckoutForm {
    /// A blank form, pre-filled from the user's default address when there is one.
    pub fn prefilled(user: Option<&User>) -> Self {
        let Some(address) = user.and_then(User::default_address) else {
            return Self::default();
        };

        CheckoutForm {
            full_name: address.name.clone(),
            phone: address.phone.clone(),
            address_line: address.line.clone(),
            city: address.city.clone(),
            zip: address.postal.clone(),
            ..Self::default()
        }
    }

    /// Check every field.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] listing every invalid field in form order.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        errors.check(FormField::FullName, filled(&self.full_name));
        errors.check(FormField::Phone, filled(&self.phone));
        errors.check(FormField::AddressLine, filled(&self.address_line));
        errors.check(FormField::City, filled(&self.city));
        errors.check(FormField::Zip, filled(&self.zip));

        if self.payment == PaymentMethod::Card {
            let card = self.card.as_ref();

            errors.check(
                FormField::CardNumber,
                card.is_some_and(CardDetails::number_is_valid),
            );
            errors.check(
                FormField::CardExpiry,
                card.is_some_and(CardDetails::expiry_is_valid),
            );
            errors.check(
                FormField::CardCvv,
                card.is_some_and(CardDetails::cvv_is_valid),
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// The contact snapshot recorded on an order.
    pub fn customer(&self) -> Customer {
        Customer {
            name: self.full_name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            address: CustomerAddress {
                line: self.address_line.trim().to_string(),
                city: self.city.trim().to_string(),
                postal: self.zip.trim().to_string(),
            },
        }
    }
}
