//! Product table builder for CLI output.
//!
//! Formats one page of products as the same columns the TUI table shows.

use crate::model::{enabled_label, Locale, PageInfo, Product};
use unicode_width::UnicodeWidthStr;

/// Pre-formatted lines for text output.
pub(crate) struct ProductTable {
    pub lines: Vec<String>,
}

pub(crate) fn headers(locale: Locale) -> [&'static str; 5] {
    match locale {
        Locale::ZhTw => ["分類", "產品名稱", "原價", "售價", "是否啟用"],
        Locale::En => ["Category", "Title", "Origin price", "Price", "Enabled"],
    }
}

/// One table row: category, title, origin price, price, enabled indicator.
pub(crate) fn row_cells(p: &Product, locale: Locale) -> [String; 5] {
    [
        p.category.clone(),
        p.title.clone(),
        p.origin_price.to_string(),
        p.price.to_string(),
        enabled_label(p.is_enabled, locale).to_string(),
    ]
}

pub(crate) fn page_label(info: &PageInfo, locale: Locale) -> String {
    let total = info.total_pages.max(1);
    match locale {
        Locale::ZhTw => format!("第 {} / {} 頁", info.refresh_page(), total),
        Locale::En => format!("Page {} of {}", info.refresh_page(), total),
    }
}

pub(crate) fn build_product_table(
    products: &[Product],
    info: &PageInfo,
    locale: Locale,
) -> ProductTable {
    let header: Vec<String> = headers(locale).iter().map(|h| h.to_string()).collect();
    let rows: Vec<[String; 5]> = products.iter().map(|p| row_cells(p, locale)).collect();

    let mut widths = [0usize; 5];
    for (i, h) in header.iter().enumerate() {
        widths[i] = h.width();
    }
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.width());
        }
    }

    // Terminal columns, so CJK text counts double.
    let mut lines = Vec::with_capacity(rows.len() + 3);
    lines.push(join_padded(&header, &widths));
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in &rows {
        lines.push(join_padded(row, &widths));
    }
    lines.push(page_label(info, locale));

    ProductTable { lines }
}

fn join_padded(cells: &[String], widths: &[usize; 5]) -> String {
    cells
        .iter()
        .zip(widths.iter())
        .map(|(c, w)| {
            let pad = w.saturating_sub(c.width());
            format!("{c}{}", " ".repeat(pad))
        })
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}
