use std::io::BufWriter;
use anyhow::anyhow;
use printpdf::{BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point};
use crate::server::document::layout::{self, PageLayout};
use crate::server::engine::currency::CurrencyFormat;
use crate::server::engine::totals::InvoiceSummary;
use crate::server::model::invoice::Invoice;
use crate::server::util::banking;

const LAYER: &str = "Layer 1";
const TITLE_SIZE: f32 = 20.0;
const HEADING_SIZE: f32 = 11.0;
const TEXT_SIZE: f32 = 9.0;
const SMALL_SIZE: f32 = 8.0;
const BLOCK_LINE: f32 = 4.5;

const RIGHT_COLUMN: f32 = 120.0;
const COL_DESCRIPTION: f32 = layout::MARGIN_LEFT;
const DESCRIPTION_WIDTH: f32 = 78.0;
// right edges of the numeric columns
const COL_QUANTITY: f32 = 108.0;
const COL_UNIT_PRICE: f32 = 133.0;
const COL_TAX_RATE: f32 = 148.0;
const COL_TAX: f32 = 170.0;
const COL_TOTAL: f32 = layout::MARGIN_RIGHT;
const TOTALS_LABEL: f32 = 120.0;

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

/// one page being painted
struct Canvas<'a> {
    layer: PdfLayerReference,
    fonts: &'a Fonts,
}

impl Canvas<'_> {
    fn text(&self, text: &str, size: f32, x: f32, y: f32) {
        self.layer.use_text(text, size, Mm(x), Mm(y), &self.fonts.regular);
    }

    fn bold(&self, text: &str, size: f32, x: f32, y: f32) {
        self.layer.use_text(text, size, Mm(x), Mm(y), &self.fonts.bold);
    }

    fn text_right(&self, text: &str, size: f32, right_edge: f32, y: f32) {
        self.text(text, size, layout::right_aligned(text, right_edge, size), y);
    }

    fn bold_right(&self, text: &str, size: f32, right_edge: f32, y: f32) {
        self.bold(text, size, layout::right_aligned(text, right_edge, size), y);
    }

    fn rule(&self, y: f32) {
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(layout::MARGIN_LEFT), Mm(y)), false),
                (Point::new(Mm(layout::MARGIN_RIGHT), Mm(y)), false),
            ],
            is_closed: false,
        });
    }

    /// Bold heading followed by the non-empty lines
    fn block(&self, heading: &str, lines: &[String], x: f32, mut y: f32) {
        self.bold(heading, HEADING_SIZE, x, y);
        for line in lines.iter().filter(|l| !l.trim().is_empty()) {
            y -= BLOCK_LINE;
            self.text(line, TEXT_SIZE, x, y);
        }
    }

    /// `label: value` pairs, empty values skipped
    fn pairs(&self, pairs: &[(&str, String)], x: f32, mut y: f32) {
        for (label, value) in pairs.iter().filter(|(_, v)| !v.trim().is_empty()) {
            self.bold(&format!("{label}:"), TEXT_SIZE, x, y);
            self.text(value, TEXT_SIZE, x + 35.0, y);
            y -= BLOCK_LINE;
        }
    }
}

fn labelled(label: &str, value: &str) -> String {
    if value.trim().is_empty() {
        String::new()
    } else {
        format!("{label} {}", value.trim())
    }
}

/// One table row of the totals block
#[derive(Debug, Clone, PartialEq)]
enum TotalsLine {
    Breakdown(String),
    Footnote,
    Gap,
    Amount { label: &'static str, amount: String, bold: bool },
}

/// VAT breakdown, the footnote when a price includes VAT, then the totals.
fn totals_lines(invoice: &Invoice, summary: &InvoiceSummary, currency: &CurrencyFormat) -> Vec<TotalsLine> {
    let mut lines: Vec<TotalsLine> = summary
        .vat_breakdown
        .iter()
        .map(|group| {
            TotalsLine::Breakdown(format!(
                "VAT {}: base {}, tax {}",
                currency.format_percent(group.tax_rate),
                currency.format(group.net),
                currency.format(group.tax),
            ))
        })
        .collect();
    if invoice.items.iter().any(|item| item.tax_included) {
        lines.push(TotalsLine::Footnote);
    }
    lines.push(TotalsLine::Gap);
    for (label, amount, bold) in [
        ("Subtotal (excl. VAT)", summary.subtotal, false),
        ("VAT total", summary.tax_total, false),
        ("Total", summary.grand_total, true),
    ] {
        lines.push(TotalsLine::Amount { label, amount: currency.format(amount), bold });
    }
    lines
}

/// Totals lines and how they share pages with the item rows
fn page_plan(
    invoice: &Invoice,
    summary: &InvoiceSummary,
    currency: &CurrencyFormat,
) -> (Vec<TotalsLine>, Vec<PageLayout>) {
    let totals = totals_lines(invoice, summary, currency);
    let pages = layout::paginate(
        invoice.items.len(),
        layout::row_capacity(layout::TABLE_TOP_FIRST),
        layout::row_capacity(layout::TABLE_TOP_CONTINUED),
        totals.len(),
    );
    (totals, pages)
}

fn table_top(page_index: usize) -> f32 {
    if page_index == 0 {
        layout::TABLE_TOP_FIRST
    } else {
        layout::TABLE_TOP_CONTINUED
    }
}

/// Paint the invoice as A4 pages and return the PDF bytes.
pub fn render(
    invoice: &Invoice,
    summary: &InvoiceSummary,
    currency: &CurrencyFormat,
) -> anyhow::Result<Vec<u8>> {
    let number = invoice.details.invoice_number.trim();
    let title = format!("Invoice {number}");
    let (doc, first_page, first_layer) = PdfDocument::new(
        title.as_str(),
        Mm(layout::PAGE_WIDTH),
        Mm(layout::PAGE_HEIGHT),
        LAYER,
    );
    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| anyhow!("failed to load font, {e}"))?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| anyhow!("failed to load font, {e}"))?,
    };

    let (totals, pages) = page_plan(invoice, summary, currency);
    let page_count = pages.len();
    let mut first = Some((first_page, first_layer));

    for (index, page) in pages.iter().enumerate() {
        let (page_index, layer_index) = match first.take() {
            Some(indices) => indices,
            None => doc.add_page(Mm(layout::PAGE_WIDTH), Mm(layout::PAGE_HEIGHT), LAYER),
        };
        let layer = doc.get_page(page_index).get_layer(layer_index);
        let canvas = Canvas { layer, fonts: &fonts };

        if index == 0 {
            paint_header(&canvas, invoice, currency);
        } else {
            canvas.bold(&format!("{title} (continued)"), HEADING_SIZE, layout::MARGIN_LEFT, layout::TOP);
        }

        let top = table_top(index);
        debug_assert!(page.used() <= layout::row_capacity(top));
        paint_rows(&canvas, invoice, summary, currency, page, top);
        paint_totals(&canvas, &totals[page.totals.clone()], page.totals.start == 0, top, page.rows.len());
        paint_footer(&canvas, invoice, index + 1, page_count);
    }

    let mut writer = BufWriter::new(Vec::<u8>::new());
    doc.save(&mut writer)
        .map_err(|e| anyhow!("failed to write pdf, {e}"))?;
    writer
        .into_inner()
        .map_err(|e| anyhow!("failed to flush pdf, {e}"))
}

fn paint_header(canvas: &Canvas, invoice: &Invoice, currency: &CurrencyFormat) {
    let (sender, recipient, details) = (&invoice.sender, &invoice.recipient, &invoice.details);

    canvas.bold("INVOICE", TITLE_SIZE, layout::MARGIN_LEFT, layout::TOP);
    canvas.bold_right(details.invoice_number.trim(), HEADING_SIZE + 1.0, layout::MARGIN_RIGHT, layout::TOP);

    let top = layout::TOP - 14.0;
    canvas.block(
        &sender.name,
        &[
            sender.address.clone(),
            sender.post_code_and_city.clone(),
            labelled("Business ID", &sender.business_id),
            sender.email.clone(),
            sender.phone.clone(),
            sender.website.clone(),
        ],
        layout::MARGIN_LEFT,
        top,
    );

    let reference = if details.reference.trim().is_empty() {
        String::new()
    } else {
        banking::format_reference(&details.reference)
    };
    let interest = if details.interest_rate > 0.0 {
        currency.format_percent(details.interest_rate)
    } else {
        String::new()
    };
    canvas.pairs(
        &[
            ("Invoice number", details.invoice_number.clone()),
            ("Invoice date", details.date.clone()),
            ("Due date", details.due_date.clone()),
            ("Reference", reference),
            ("Late interest", interest),
        ],
        RIGHT_COLUMN,
        top,
    );

    let second_row = top - 42.0;
    canvas.block(
        "Bill to",
        &[
            recipient.name.clone(),
            labelled("Attn.", &recipient.contact_person),
            recipient.address.clone(),
            recipient.post_code_and_city.clone(),
        ],
        layout::MARGIN_LEFT,
        second_row,
    );

    let iban = if sender.iban.trim().is_empty() {
        String::new()
    } else {
        banking::format_iban(&sender.iban)
    };
    canvas.block(
        "Payment details",
        &[
            labelled("IBAN", &iban),
            labelled("BIC", &sender.bic),
            labelled("Bank", &sender.bank),
        ],
        RIGHT_COLUMN,
        second_row,
    );

    if let Some(message) = details.message.as_deref() {
        let mut y = layout::MESSAGE_TOP;
        // validation keeps longer messages out
        for line in layout::message_lines(message).iter().take(layout::MESSAGE_MAX_LINES) {
            canvas.text(line, layout::MESSAGE_FONT_SIZE, layout::MARGIN_LEFT, y);
            y -= layout::MESSAGE_LINE_HEIGHT;
        }
    }
}

/// Table header plus the page's rows
fn paint_rows(
    canvas: &Canvas,
    invoice: &Invoice,
    summary: &InvoiceSummary,
    currency: &CurrencyFormat,
    page: &PageLayout,
    table_top: f32,
) {
    canvas.bold("Description", TEXT_SIZE, COL_DESCRIPTION, table_top);
    canvas.bold_right("Qty", TEXT_SIZE, COL_QUANTITY, table_top);
    canvas.bold_right("Unit price", TEXT_SIZE, COL_UNIT_PRICE, table_top);
    canvas.bold_right("VAT %", TEXT_SIZE, COL_TAX_RATE, table_top);
    canvas.bold_right("VAT", TEXT_SIZE, COL_TAX, table_top);
    canvas.bold_right("Total", TEXT_SIZE, COL_TOTAL, table_top);
    canvas.rule(table_top - 2.0);

    for (slot, index) in page.rows.clone().enumerate() {
        let y = layout::row_baseline(table_top, slot);
        let (item, figures) = (&invoice.items[index], &summary.lines[index]);
        let description = layout::fit_text(&item.description, DESCRIPTION_WIDTH, TEXT_SIZE);
        let unit_price = if item.tax_included {
            format!("{} *", currency.format(item.price))
        } else {
            currency.format(item.price)
        };
        canvas.text(&description, TEXT_SIZE, COL_DESCRIPTION, y);
        canvas.text_right(&currency.format_decimal(item.quantity), TEXT_SIZE, COL_QUANTITY, y);
        canvas.text_right(&unit_price, TEXT_SIZE, COL_UNIT_PRICE, y);
        canvas.text_right(&currency.format_percent(item.tax_rate), TEXT_SIZE, COL_TAX_RATE, y);
        canvas.text_right(&currency.format(figures.tax), TEXT_SIZE, COL_TAX, y);
        canvas.text_right(&currency.format(figures.gross), TEXT_SIZE, COL_TOTAL, y);
    }
}

/// The page's share of the totals block, starting at table slot `first_slot`
fn paint_totals(canvas: &Canvas, lines: &[TotalsLine], opens_block: bool, table_top: f32, first_slot: usize) {
    if lines.is_empty() {
        return;
    }
    if opens_block {
        canvas.rule(layout::row_baseline(table_top, first_slot) + 3.0);
    }
    for (offset, line) in lines.iter().enumerate() {
        let y = layout::row_baseline(table_top, first_slot + offset);
        match line {
            TotalsLine::Breakdown(text) => canvas.text(text, SMALL_SIZE, layout::MARGIN_LEFT, y),
            TotalsLine::Footnote => canvas.text("* unit price includes VAT", SMALL_SIZE, layout::MARGIN_LEFT, y),
            TotalsLine::Gap => {}
            TotalsLine::Amount { label, amount, bold: true } => {
                canvas.bold(label, HEADING_SIZE, TOTALS_LABEL, y);
                canvas.bold_right(amount, HEADING_SIZE, COL_TOTAL, y);
            }
            TotalsLine::Amount { label, amount, bold: false } => {
                canvas.text(label, TEXT_SIZE, TOTALS_LABEL, y);
                canvas.text_right(amount, TEXT_SIZE, COL_TOTAL, y);
            }
        }
    }
}

fn paint_footer(canvas: &Canvas, invoice: &Invoice, page: usize, page_count: usize) {
    let sender = &invoice.sender;
    let left = [sender.name.trim(), sender.business_id.trim()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" / ");
    canvas.text(&left, SMALL_SIZE, layout::MARGIN_LEFT, layout::FOOTER_Y);
    canvas.text_right(&format!("Page {page} / {page_count}"), SMALL_SIZE, layout::MARGIN_RIGHT, layout::FOOTER_Y);
}
