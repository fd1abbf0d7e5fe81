use serde::{Deserialize, Serialize};

/// One billable line of an invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItem {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub quantity: f64,
    /// unit price, gross when `tax_included` is set, net otherwise
    #[serde(default)]
    pub price: f64,
    /// percent, e.g. 25.5
    #[serde(default)]
    pub tax_rate: f64,
    #[serde(default)]
    pub tax_included: bool,
}

impl InvoiceItem {
    /// a blank line as the form shows it
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            quantity: 1.0,
            price: 0.0,
            tax_rate: 0.0,
            tax_included: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Sender {
    pub name: String,
    pub address: String,
    pub post_code_and_city: String,
    /// Y-tunnus
    #[serde(alias = "buisnessId")]
    pub business_id: String,
    pub email: String,
    pub phone: String,
    pub website: String,
    pub iban: String,
    pub bic: String,
    pub bank: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Recipient {
    pub name: String,
    pub contact_person: String,
    pub address: String,
    pub post_code_and_city: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvoiceDetails {
    pub invoice_number: String,
    /// issue date, `YYYY-MM-DD`
    pub date: String,
    pub due_date: String,
    /// Finnish payment reference (viitenumero)
    pub reference: String,
    /// late payment interest, percent per annum
    pub interest_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    #[serde(default)]
    pub sender: Sender,
    #[serde(default)]
    pub recipient: Recipient,
    #[serde(default)]
    pub details: InvoiceDetails,
    #[serde(default)]
    pub items: Vec<InvoiceItem>,
}

impl Invoice {
    /// Fresh invoice as the form starts it: empty header, one blank line.
    pub fn draft() -> Self {
        Self {
            items: vec![InvoiceItem::new("1")],
            ..Default::default()
        }
    }

    /// Append a blank line and return its id.
    ///
    /// The id is one past the largest numeric id present. Non-numeric ids do
    /// not take part, so the result is bumped until it collides with nothing.
    pub fn add_item(&mut self) -> String {
        let mut next = self
            .items
            .iter()
            .filter_map(|item| item.id.trim().parse::<u64>().ok())
            .max()
            .map_or(1, |max| max.saturating_add(1));
        while self.items.iter().any(|item| item.id == next.to_string()) {
            next = next.saturating_add(1);
        }
        let id = next.to_string();
        self.items.push(InvoiceItem::new(id.clone()));
        id
    }

    /// Remove the line with the given id, true if something was removed.
    pub fn remove_item(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    pub fn item_mut(&mut self, id: &str) -> Option<&mut InvoiceItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }
}
