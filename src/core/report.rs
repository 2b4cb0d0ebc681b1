//! Stock report generation.
//!
//! This module turns a catalog snapshot into the data behind the stock bar chart and
//! the low-stock list. All functions are pure and framework-agnostic; the bot layer
//! decides how to draw them.

use crate::core::{catalog::Snapshot, product::Product};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

/// Series for a bar chart of stock per product.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StockChart {
    /// Product names, in mirror order
    pub labels: Vec<String>,
    /// Units in stock, aligned with `labels`
    pub data: Vec<u32>,
}

impl StockChart {
    /// Largest value in the series, or 0 when empty.
    #[must_use]
    pub fn max(&self) -> u32 {
        self.data.iter().copied().max().unwrap_or(0)
    }

    /// Sum of all units in stock.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.data.iter().map(|&units| u64::from(units)).sum()
    }

    /// Iterates `(label, units)` pairs.
    pub fn rows(&self) -> impl Iterator<Item = (&str, u32)> {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.data.iter().copied())
    }
}

/// Builds the chart series from a snapshot.
#[must_use]
pub fn stock_chart(snapshot: &[Product]) -> StockChart {
    let (labels, data) = snapshot
        .iter()
        .map(|product| (product.name.clone(), product.stock))
        .unzip();
    StockChart { labels, data }
}

/// Products with `stock <= threshold`, lowest stock first. Ties keep mirror order.
#[must_use]
pub fn low_stock(snapshot: &[Product], threshold: u32) -> Vec<&Product> {
    let mut low: Vec<&Product> = snapshot.iter().filter(|p| p.stock <= threshold).collect();
    low.sort_by_key(|p| p.stock);
    low
}

/// Text bar scaled against `max`, like `████░░░░░░ 4`.
#[must_use]
pub fn format_stock_bar(units: u32, max: u32, bar_length: Option<usize>) -> String {
    let length = bar_length.unwrap_or(10);
    let filled = if max == 0 {
        0
    } else {
        // Cast safety: units <= max so the ratio is in [0, 1] and the result in [0, length].
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let filled = ((f64::from(units) / f64::from(max)) * length as f64).round() as usize;
        filled.min(length)
    };
    let empty = length.saturating_sub(filled);

    format!("{}{} {units}", "█".repeat(filled), "░".repeat(empty))
}

/// Logs the low-stock list every time the catalog changes, until the catalog
/// is dropped. Only logs when the set of low products differs from last time.
pub async fn watch_low_stock(mut changes: watch::Receiver<Snapshot>, threshold: u32) {
    let mut last: Vec<String> = Vec::new();
    while changes.changed().await.is_ok() {
        let snapshot = Arc::clone(&changes.borrow_and_update());
        let low: Vec<String> = low_stock(&snapshot, threshold)
            .into_iter()
            .map(|p| format!("{} ({})", p.name, p.stock))
            .collect();
        if low == last {
            continue;
        }
        if low.is_empty() {
            info!(threshold, "No products are low on stock");
        } else {
            warn!(threshold, count = low.len(), products = ?low, "Products running low on stock");
        }
        last = low;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::product;

    fn snapshot() -> Vec<Product> {
        vec![
            product("1", "Filtro", "", 10.0, 4),
            product("2", "Bujía", "", 25.0, 0),
            product("3", "Cadena", "", 80.0, 10),
            product("4", "Pastillas", "", 30.0, 2),
        ]
    }

    #[test]
    fn test_stock_chart_keeps_mirror_order() {
        let chart = stock_chart(&snapshot());

        assert_eq!(chart.labels, vec!["Filtro", "Bujía", "Cadena", "Pastillas"]);
        assert_eq!(chart.data, vec![4, 0, 10, 2]);
        assert_eq!(chart.max(), 10);
        assert_eq!(chart.total(), 16);
        assert_eq!(chart.rows().nth(1), Some(("Bujía", 0)));
    }

    #[test]
    fn test_empty_chart() {
        let chart = stock_chart(&[]);
        assert_eq!(chart, StockChart::default());
        assert_eq!(chart.max(), 0);
    }

    #[test]
    fn test_low_stock_sorted_ascending() {
        let products = snapshot();
        let low = low_stock(&products, 2);

        let names: Vec<&str> = low.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Bujía", "Pastillas"]);
    }

    #[test]
    fn test_format_stock_bar() {
        assert_eq!(format_stock_bar(10, 10, None), "██████████ 10");
        assert_eq!(format_stock_bar(5, 10, None), "█████░░░░░ 5");
        assert_eq!(format_stock_bar(0, 10, Some(4)), "░░░░ 0");
        assert_eq!(format_stock_bar(0, 0, Some(2)), "░░ 0");
    }

    #[tokio::test]
    async fn test_watch_low_stock_ends_with_the_catalog() {
        let (sender, receiver) = watch::channel(Arc::new(Vec::new()));
        let watcher = tokio::spawn(watch_low_stock(receiver, 2));

        sender.send_replace(Arc::new(snapshot()));
        drop(sender);

        assert!(watcher.await.is_ok());
    }
}
