//! Page geometry and pagination of the item table. Millimetres, origin bottom left.

use std::ops::Range;

pub const PAGE_WIDTH: f32 = 210.0;
pub const PAGE_HEIGHT: f32 = 297.0;
pub const MARGIN_LEFT: f32 = 15.0;
pub const MARGIN_RIGHT: f32 = PAGE_WIDTH - 15.0;
pub const TOP: f32 = 282.0;
/// rows never go below this line, the footer lives underneath
pub const BOTTOM: f32 = 25.0;
pub const FOOTER_Y: f32 = 12.0;

/// first page carries sender, recipient and metadata blocks above the table
pub const TABLE_TOP_FIRST: f32 = 187.0;
pub const TABLE_TOP_CONTINUED: f32 = 270.0;
pub const TABLE_HEADER_HEIGHT: f32 = 8.0;
pub const ROW_HEIGHT: f32 = 6.0;

const PT_TO_MM: f32 = 0.3528;
/// average Helvetica glyph width relative to the font size
const AVERAGE_GLYPH_WIDTH: f32 = 0.5;

/// Rows that fit between a table top and the bottom margin
pub fn row_capacity(table_top: f32) -> usize {
    let room = table_top - TABLE_HEADER_HEIGHT - BOTTOM;
    if room <= 0.0 {
        return 0;
    }
    (room / ROW_HEIGHT).floor() as usize
}

/// What one page holds: item rows and lines of the totals block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLayout {
    pub rows: Range<usize>,
    pub totals: Range<usize>,
}

impl PageLayout {
    /// Table slots taken on this page
    pub fn used(&self) -> usize {
        self.rows.len() + self.totals.len()
    }
}

/// Split `row_count` table rows and `totals_rows` totals lines over pages.
///
/// The first page has `first_capacity` rows of room, later pages `capacity`.
/// The totals block follows the last item. A block that fits on one page is
/// kept together and moves to a fresh page when the current one is too full.
/// A block taller than a page fills the room left and continues on the next
/// pages. Always returns at least one page.
pub fn paginate(
    row_count: usize,
    first_capacity: usize,
    capacity: usize,
    totals_rows: usize,
) -> Vec<PageLayout> {
    let capacity = capacity.max(1);
    let mut pages: Vec<PageLayout> = Vec::new();
    let (mut row, mut total) = (0, 0);
    loop {
        let room = if pages.is_empty() { first_capacity } else { capacity };
        let end = row_count.min(row + room);
        let left_over = room - (end - row);
        let rows = row..end;
        row = end;

        let mut totals = total..total;
        if row >= row_count {
            let pending = totals_rows - total;
            if pending <= left_over || pending > capacity {
                let taken = pending.min(left_over);
                totals = total..total + taken;
                total += taken;
            }
        }
        pages.push(PageLayout { rows, totals });
        if row >= row_count && total >= totals_rows {
            return pages;
        }
    }
}

/// Baseline of the table row in `slot`, counted from under the header
pub fn row_baseline(table_top: f32, slot: usize) -> f32 {
    table_top - TABLE_HEADER_HEIGHT - slot as f32 * ROW_HEIGHT
}

fn glyph_width(font_size: f32) -> f32 {
    font_size * AVERAGE_GLYPH_WIDTH * PT_TO_MM
}

/// Approximate printed width in mm
pub fn text_width(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * glyph_width(font_size)
}

/// x where `text` has to start to end at `right_edge`
pub fn right_aligned(text: &str, right_edge: f32, font_size: f32) -> f32 {
    right_edge - text_width(text, font_size)
}

/// Cut `text` to fit `width` mm, marking the cut with `...`
pub fn fit_text(text: &str, width: f32, font_size: f32) -> String {
    if text_width(text, font_size) <= width {
        return text.to_string();
    }
    let max_chars = (width / glyph_width(font_size)).floor() as usize;
    let kept = max_chars.saturating_sub(3);
    let mut out: String = text.chars().take(kept).collect();
    out.push_str("...");
    out
}

/// Break `text` into lines no wider than `width` mm.
///
/// Explicit line breaks are kept. Words are never split unless a single word
/// is wider than a whole line.
pub fn wrap_text(text: &str, width: f32, font_size: f32) -> Vec<String> {
    let max_chars = ((width / glyph_width(font_size)).floor() as usize).max(1);
    let mut lines = Vec::new();
    for paragraph in text.trim().lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > max_chars {
                if !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                }
                lines.push(word.drain(..max_chars).collect());
            }
            let word: String = word.into_iter().collect();
            let needed = line.chars().count() + usize::from(!line.is_empty()) + word.chars().count();
            if needed > max_chars && !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(&word);
        }
        lines.push(line);
    }
    lines
}

/// Free text printed above the item table on the first page
pub const MESSAGE_MAX_LINES: usize = 3;
pub const MESSAGE_FONT_SIZE: f32 = 9.0;
pub const MESSAGE_TOP: f32 = TABLE_TOP_FIRST + 14.0;
pub const MESSAGE_LINE_HEIGHT: f32 = 4.5;

/// The invoice message as printed lines
pub fn message_lines(message: &str) -> Vec<String> {
    wrap_text(message, MARGIN_RIGHT - MARGIN_LEFT, MESSAGE_FONT_SIZE)
}
