//! Submit-time checks on an invoice.
//!
//! Which header fields are mandatory is data (`ValidationRules`), item rules
//! and the Finnish banking checks are fixed.

use std::collections::{BTreeMap, HashSet};
use std::str::FromStr;
use anyhow::anyhow;
use chrono::NaiveDate;
use serde::Serialize;
use crate::server::document::layout;
use crate::server::model::invoice::Invoice;
use crate::server::util::banking;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Text fields of the invoice header, addressed by their JSON path
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HeaderField {
    SenderName,
    SenderAddress,
    SenderPostCodeAndCity,
    SenderBusinessId,
    SenderEmail,
    SenderPhone,
    SenderWebsite,
    SenderIban,
    SenderBic,
    SenderBank,
    RecipientName,
    RecipientContactPerson,
    RecipientAddress,
    RecipientPostCodeAndCity,
    InvoiceNumber,
    IssueDate,
    DueDate,
    Reference,
    Message,
}

impl HeaderField {
    pub const ALL: [HeaderField; 19] = [
        HeaderField::SenderName,
        HeaderField::SenderAddress,
        HeaderField::SenderPostCodeAndCity,
        HeaderField::SenderBusinessId,
        HeaderField::SenderEmail,
        HeaderField::SenderPhone,
        HeaderField::SenderWebsite,
        HeaderField::SenderIban,
        HeaderField::SenderBic,
        HeaderField::SenderBank,
        HeaderField::RecipientName,
        HeaderField::RecipientContactPerson,
        HeaderField::RecipientAddress,
        HeaderField::RecipientPostCodeAndCity,
        HeaderField::InvoiceNumber,
        HeaderField::IssueDate,
        HeaderField::DueDate,
        HeaderField::Reference,
        HeaderField::Message,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            HeaderField::SenderName => "sender.name",
            HeaderField::SenderAddress => "sender.address",
            HeaderField::SenderPostCodeAndCity => "sender.postCodeAndCity",
            HeaderField::SenderBusinessId => "sender.businessId",
            HeaderField::SenderEmail => "sender.email",
            HeaderField::SenderPhone => "sender.phone",
            HeaderField::SenderWebsite => "sender.website",
            HeaderField::SenderIban => "sender.iban",
            HeaderField::SenderBic => "sender.bic",
            HeaderField::SenderBank => "sender.bank",
            HeaderField::RecipientName => "recipient.name",
            HeaderField::RecipientContactPerson => "recipient.contactPerson",
            HeaderField::RecipientAddress => "recipient.address",
            HeaderField::RecipientPostCodeAndCity => "recipient.postCodeAndCity",
            HeaderField::InvoiceNumber => "details.invoiceNumber",
            HeaderField::IssueDate => "details.date",
            HeaderField::DueDate => "details.dueDate",
            HeaderField::Reference => "details.reference",
            HeaderField::Message => "details.message",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            HeaderField::SenderName => "Sender name",
            HeaderField::SenderAddress => "Sender address",
            HeaderField::SenderPostCodeAndCity => "Sender post code and city",
            HeaderField::SenderBusinessId => "Business ID",
            HeaderField::SenderEmail => "Sender email",
            HeaderField::SenderPhone => "Sender phone",
            HeaderField::SenderWebsite => "Sender website",
            HeaderField::SenderIban => "IBAN",
            HeaderField::SenderBic => "BIC",
            HeaderField::SenderBank => "Bank",
            HeaderField::RecipientName => "Recipient name",
            HeaderField::RecipientContactPerson => "Contact person",
            HeaderField::RecipientAddress => "Recipient address",
            HeaderField::RecipientPostCodeAndCity => "Recipient post code and city",
            HeaderField::InvoiceNumber => "Invoice number",
            HeaderField::IssueDate => "Invoice date",
            HeaderField::DueDate => "Due date",
            HeaderField::Reference => "Reference number",
            HeaderField::Message => "Message",
        }
    }

    fn value<'a>(&self, invoice: &'a Invoice) -> &'a str {
        let (sender, recipient, details) = (&invoice.sender, &invoice.recipient, &invoice.details);
        let value: &str = match self {
            HeaderField::SenderName => &sender.name,
            HeaderField::SenderAddress => &sender.address,
            HeaderField::SenderPostCodeAndCity => &sender.post_code_and_city,
            HeaderField::SenderBusinessId => &sender.business_id,
            HeaderField::SenderEmail => &sender.email,
            HeaderField::SenderPhone => &sender.phone,
            HeaderField::SenderWebsite => &sender.website,
            HeaderField::SenderIban => &sender.iban,
            HeaderField::SenderBic => &sender.bic,
            HeaderField::SenderBank => &sender.bank,
            HeaderField::RecipientName => &recipient.name,
            HeaderField::RecipientContactPerson => &recipient.contact_person,
            HeaderField::RecipientAddress => &recipient.address,
            HeaderField::RecipientPostCodeAndCity => &recipient.post_code_and_city,
            HeaderField::InvoiceNumber => &details.invoice_number,
            HeaderField::IssueDate => &details.date,
            HeaderField::DueDate => &details.due_date,
            HeaderField::Reference => &details.reference,
            HeaderField::Message => details.message.as_deref().unwrap_or_default(),
        };
        value.trim()
    }
}

impl FromStr for HeaderField {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HeaderField::ALL
            .into_iter()
            .find(|field| field.path() == s.trim())
            .ok_or_else(|| anyhow!("unknown invoice field: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Required,
    Optional,
}

/// Which header fields must be filled in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationRules {
    rules: BTreeMap<HeaderField, Requirement>,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self::optional()
            .with(HeaderField::SenderName, Requirement::Required)
            .with(HeaderField::RecipientName, Requirement::Required)
            .with(HeaderField::InvoiceNumber, Requirement::Required)
    }
}

impl ValidationRules {
    /// every header field optional
    pub fn optional() -> Self {
        Self {
            rules: HeaderField::ALL
                .into_iter()
                .map(|field| (field, Requirement::Optional))
                .collect(),
        }
    }

    /// Parse a comma separated list of required field paths, e.g.
    /// `sender.name,details.invoiceNumber`. Blank means nothing is required.
    pub fn from_required_list(list: &str) -> anyhow::Result<Self> {
        list.split(',')
            .filter(|s| !s.trim().is_empty())
            .try_fold(Self::optional(), |rules, path| {
                Ok::<_, anyhow::Error>(rules.with(path.parse::<HeaderField>()?, Requirement::Required))
            })
    }

    pub fn with(mut self, field: HeaderField, requirement: Requirement) -> Self {
        self.rules.insert(field, requirement);
        self
    }

    pub fn requirement(&self, field: HeaderField) -> Requirement {
        self.rules.get(&field).copied().unwrap_or(Requirement::Optional)
    }

    pub fn required_fields(&self) -> Vec<HeaderField> {
        self.rules
            .iter()
            .filter(|(_, requirement)| **requirement == Requirement::Required)
            .map(|(field, _)| *field)
            .collect()
    }

    /// Run every check, collecting all problems rather than stopping at the first.
    pub fn validate(&self, invoice: &Invoice) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        for field in self.required_fields() {
            if field.value(invoice).is_empty() {
                errors.insert(field.path(), format!("{} is required", field.label()));
            }
        }

        check_banking(invoice, &mut errors);
        check_dates(invoice, &mut errors);
        if invoice.details.interest_rate < 0.0 {
            errors.insert("details.interestRate", "Interest rate cannot be negative");
        }
        let message = HeaderField::Message.value(invoice);
        if layout::message_lines(message).len() > layout::MESSAGE_MAX_LINES {
            errors.insert(
                HeaderField::Message.path(),
                format!("Message must fit on {} lines", layout::MESSAGE_MAX_LINES),
            );
        }
        check_items(invoice, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn check_banking(invoice: &Invoice, errors: &mut ValidationErrors) {
    let reference = HeaderField::Reference.value(invoice);
    if !reference.is_empty() && !banking::is_valid_reference(reference) {
        errors.insert(HeaderField::Reference.path(), "Reference number is not valid");
    }
    let iban = HeaderField::SenderIban.value(invoice);
    if !iban.is_empty() && !banking::is_valid_iban(iban) {
        errors.insert(HeaderField::SenderIban.path(), "IBAN is not valid");
    }
}

fn check_dates(invoice: &Invoice, errors: &mut ValidationErrors) {
    let mut parse = |field: HeaderField| {
        let value = field.value(invoice);
        if value.is_empty() {
            return None;
        }
        let parsed = NaiveDate::parse_from_str(value, DATE_FORMAT).ok();
        if parsed.is_none() {
            errors.insert(field.path(), format!("{} must be a date (YYYY-MM-DD)", field.label()));
        }
        parsed
    };
    let issued = parse(HeaderField::IssueDate);
    let due = parse(HeaderField::DueDate);
    if let (Some(issued), Some(due)) = (issued, due) {
        if due < issued {
            errors.insert(HeaderField::DueDate.path(), "Due date cannot be before the invoice date");
        }
    }
}

fn check_items(invoice: &Invoice, errors: &mut ValidationErrors) {
    if invoice.items.is_empty() {
        errors.insert("items", "At least one item is required");
        return;
    }
    let mut seen = HashSet::new();
    for (index, item) in invoice.items.iter().enumerate() {
        let path = |field: &str| format!("items[{index}].{field}");
        if !seen.insert(item.id.as_str()) {
            errors.insert(path("id"), "Item id must be unique");
        }
        if item.description.trim().is_empty() {
            errors.insert(path("description"), "Description is required");
        }
        if !(item.quantity > 0.0) {
            errors.insert(path("quantity"), "Quantity must be greater than zero");
        }
        if !(item.price >= 0.0) {
            errors.insert(path("price"), "Price cannot be negative");
        }
        if !(item.tax_rate >= 0.0) {
            errors.insert(path("taxRate"), "Tax rate cannot be negative");
        }
    }
}

/// Field path -> message, e.g. `items[0].quantity`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    fn insert(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.0.entry(path.into()).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.0.get(path).map(String::as_str)
    }
}
