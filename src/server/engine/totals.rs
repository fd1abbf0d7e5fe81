//! Line and invoice level tax arithmetic.
//!
//! Every function here is total: invalid input (negative quantity and the
//! like) yields whatever the arithmetic gives, validation is not our job.

use serde::Serialize;
use crate::server::model::invoice::InvoiceItem;

fn tax_factor(item: &InvoiceItem) -> f64 {
    1.0 + item.tax_rate / 100.0
}

fn price_times_quantity(item: &InvoiceItem) -> f64 {
    item.price * item.quantity
}

/// Line amount without tax
pub fn item_net_amount(item: &InvoiceItem) -> f64 {
    if item.tax_included {
        price_times_quantity(item) / tax_factor(item)
    } else {
        price_times_quantity(item)
    }
}

/// Line tax.
///
/// Tax-included lines use the residual `gross - net`, so that net + tax adds
/// back up to the price the user typed in.
pub fn item_tax_amount(item: &InvoiceItem) -> f64 {
    if item.tax_included {
        price_times_quantity(item) - item_net_amount(item)
    } else {
        price_times_quantity(item) * item.tax_rate / 100.0
    }
}

/// Line amount with tax
pub fn item_gross_amount(item: &InvoiceItem) -> f64 {
    if item.tax_included {
        price_times_quantity(item)
    } else {
        price_times_quantity(item) * tax_factor(item)
    }
}

// left-to-right fold keeps rounding reproducible
fn sum_by(items: &[InvoiceItem], amount: fn(&InvoiceItem) -> f64) -> f64 {
    items.iter().fold(0.0, |acc, item| acc + amount(item))
}

pub fn invoice_subtotal(items: &[InvoiceItem]) -> f64 {
    sum_by(items, item_net_amount)
}

pub fn invoice_tax_total(items: &[InvoiceItem]) -> f64 {
    sum_by(items, item_tax_amount)
}

pub fn invoice_grand_total(items: &[InvoiceItem]) -> f64 {
    sum_by(items, item_gross_amount)
}

/// Computed figures of one line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineFigures {
    pub id: String,
    pub net: f64,
    pub tax: f64,
    pub gross: f64,
}

impl LineFigures {
    pub fn of(item: &InvoiceItem) -> Self {
        Self {
            id: item.id.clone(),
            net: item_net_amount(item),
            tax: item_tax_amount(item),
            gross: item_gross_amount(item),
        }
    }
}

/// Net and tax collected under one VAT rate
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VatGroup {
    pub tax_rate: f64,
    pub net: f64,
    pub tax: f64,
}

/// Group lines by tax rate, ascending.
pub fn vat_breakdown(items: &[InvoiceItem]) -> Vec<VatGroup> {
    let mut groups: Vec<VatGroup> = Vec::new();
    for item in items {
        let (net, tax) = (item_net_amount(item), item_tax_amount(item));
        match groups.iter_mut().find(|g| g.tax_rate == item.tax_rate) {
            Some(group) => {
                group.net += net;
                group.tax += tax;
            }
            None => groups.push(VatGroup { tax_rate: item.tax_rate, net, tax }),
        }
    }
    groups.sort_by(|a, b| a.tax_rate.total_cmp(&b.tax_rate));
    groups
}

/// Everything the renderer needs, resolved up front.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceSummary {
    pub lines: Vec<LineFigures>,
    pub vat_breakdown: Vec<VatGroup>,
    pub subtotal: f64,
    pub tax_total: f64,
    pub grand_total: f64,
}

impl InvoiceSummary {
    pub fn compute(items: &[InvoiceItem]) -> Self {
        Self {
            lines: items.iter().map(LineFigures::of).collect(),
            vat_breakdown: vat_breakdown(items),
            subtotal: invoice_subtotal(items),
            tax_total: invoice_tax_total(items),
            grand_total: invoice_grand_total(items),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn item(price: f64, quantity: f64, tax_rate: f64, tax_included: bool) -> InvoiceItem {
        InvoiceItem {
            id: "1".to_string(),
            description: "line".to_string(),
            quantity,
            price,
            tax_rate,
            tax_included,
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    fn sample_items() -> Vec<InvoiceItem> {
        vec![
            item(100.0, 1.0, 24.0, false),
            item(124.0, 3.0, 24.0, true),
            item(9.99, 7.0, 25.5, false),
            item(0.1, 0.3, 14.0, true),
            item(19.9, 2.5, 10.0, false),
            item(42.0, 1.0, 0.0, true),
        ]
    }

    #[test]
    fn scenario_tax_exclusive_line() {
        let line = item(100.0, 1.0, 24.0, false);
        assert!(close(item_net_amount(&line), 100.0));
        assert!(close(item_tax_amount(&line), 24.0));
        assert!(close(item_gross_amount(&line), 124.0));
    }

    #[test]
    fn scenario_tax_inclusive_line() {
        let line = item(124.0, 1.0, 24.0, true);
        assert!(close(item_net_amount(&line), 100.0));
        assert!(close(item_tax_amount(&line), 24.0));
        assert!(close(item_gross_amount(&line), 124.0));
    }

    #[test]
    fn scenario_two_lines() {
        let items = vec![item(50.0, 2.0, 10.0, false), item(20.0, 1.0, 0.0, false)];
        assert!(close(invoice_subtotal(&items), 120.0));
        assert!(close(invoice_tax_total(&items), 10.0));
        assert!(close(invoice_grand_total(&items), 130.0));
    }

    #[test]
    fn scenario_fractional_rate() {
        let line = item(10.0, 1.0, 25.5, false);
        assert!(close(item_tax_amount(&line), 2.55));
        assert!(close(item_gross_amount(&line), 12.55));
    }

    #[test]
    fn scenario_empty_invoice() {
        assert_eq!(invoice_subtotal(&[]), 0.0);
        assert_eq!(invoice_tax_total(&[]), 0.0);
        assert_eq!(invoice_grand_total(&[]), 0.0);
        assert!(vat_breakdown(&[]).is_empty());
    }

    #[test]
    fn zero_rate_is_same_both_ways() {
        let excl = item(42.0, 3.0, 0.0, false);
        let incl = item(42.0, 3.0, 0.0, true);
        assert_eq!(item_net_amount(&excl), 126.0);
        assert_eq!(item_net_amount(&incl), 126.0);
        assert_eq!(item_tax_amount(&incl), 0.0);
        assert_eq!(item_gross_amount(&excl), item_gross_amount(&incl));
    }

    #[test]
    fn exclusive_gross_is_net_plus_tax() {
        for line in sample_items().iter().filter(|i| !i.tax_included) {
            assert!(close(
                item_gross_amount(line),
                item_net_amount(line) + item_tax_amount(line)
            ));
        }
    }

    #[test]
    fn inclusive_lines_back_out_net() {
        for line in sample_items().iter().filter(|i| i.tax_included) {
            let gross = item_gross_amount(line);
            assert_eq!(gross, line.price * line.quantity);
            assert!(close(item_net_amount(line), gross / (1.0 + line.tax_rate / 100.0)));
            assert!(close(item_tax_amount(line), item_net_amount(line) * line.tax_rate / 100.0));
        }
    }

    #[test]
    fn grand_total_is_subtotal_plus_tax() {
        let items = sample_items();
        assert!(close(
            invoice_grand_total(&items),
            invoice_subtotal(&items) + invoice_tax_total(&items)
        ));
    }

    #[test]
    fn repeated_calls_agree() {
        let items = sample_items();
        let before = items.clone();
        assert_eq!(InvoiceSummary::compute(&items), InvoiceSummary::compute(&items));
        assert_eq!(items, before);
    }

    #[test]
    fn order_does_not_matter() {
        let items = sample_items();
        let mut reversed = items.clone();
        reversed.reverse();
        let mut rotated = items.clone();
        rotated.rotate_left(2);
        for other in [reversed, rotated] {
            assert!(close(invoice_subtotal(&items), invoice_subtotal(&other)));
            assert!(close(invoice_tax_total(&items), invoice_tax_total(&other)));
            assert!(close(invoice_grand_total(&items), invoice_grand_total(&other)));
        }
    }

    #[test]
    fn negative_quantity_is_computed_not_rejected() {
        let line = item(10.0, -2.0, 24.0, false);
        assert!(close(item_net_amount(&line), -20.0));
        assert!(close(item_gross_amount(&line), -24.8));
    }

    #[test]
    fn breakdown_groups_by_rate() {
        let items = vec![
            item(100.0, 1.0, 25.5, false),
            item(50.0, 1.0, 0.0, false),
            item(125.5, 1.0, 25.5, true),
        ];
        let groups = vat_breakdown(&items);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].tax_rate, 0.0);
        assert!(close(groups[0].net, 50.0));
        assert_eq!(groups[1].tax_rate, 25.5);
        assert!(close(groups[1].net, 200.0));
        assert!(close(groups[1].tax, 51.0));
    }

    #[test]
    fn summary_has_one_figure_per_line() {
        let items = sample_items();
        let summary = InvoiceSummary::compute(&items);
        assert_eq!(summary.lines.len(), items.len());
        assert!(close(summary.lines[1].gross, 372.0));
        assert!(close(summary.grand_total, invoice_grand_total(&items)));
    }
}
