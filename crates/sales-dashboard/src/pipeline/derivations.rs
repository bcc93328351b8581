//! Derived columns computed once from the detected source columns.
//!
//! A derived column is only appended when every column it reads from was
//! detected. Division guards differ on purpose: a zero-sales margin is 0,
//! a zero-quantity unit price is null.

use crate::error::{DashboardError, Result};
use crate::profiler::ColumnMapping;
use crate::utils::{numeric_values, string_values};
use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;
use tracing::debug;

pub const ORDER_MONTH: &str = "order_month";
pub const SHIP_DELAY_DAYS: &str = "ship_delay_days";
pub const PROFIT_MARGIN: &str = "profit_margin";
pub const PRICE_PER_UNIT: &str = "price_per_unit";

// Date shapes and the chrono formats tried for each, in order.
static DATE_PATTERNS: Lazy<Vec<(Regex, &'static [&'static str])>> = Lazy::new(|| {
    vec![
        (
            Regex::new(r"^\d{4}-\d{1,2}-\d{1,2}$").expect("Invalid regex: ISO date"),
            &["%Y-%m-%d"],
        ),
        (
            Regex::new(r"^\d{4}/\d{1,2}/\d{1,2}$").expect("Invalid regex: slashed ISO date"),
            &["%Y/%m/%d"],
        ),
        (
            Regex::new(r"^\d{1,2}/\d{1,2}/\d{4}$").expect("Invalid regex: slashed date"),
            &["%m/%d/%Y", "%d/%m/%Y"],
        ),
        (
            Regex::new(r"^\d{1,2}-\d{1,2}-\d{4}$").expect("Invalid regex: dashed date"),
            &["%m-%d-%Y", "%d-%m-%Y"],
        ),
        (
            Regex::new(r"^\d{1,2}\.\d{1,2}\.\d{4}$").expect("Invalid regex: dotted date"),
            &["%d.%m.%Y"],
        ),
    ]
});

static DATETIME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{1,2}-\d{1,2}[ T]\d{1,2}:\d{2}").expect("Invalid regex: ISO datetime")
});

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parse a date string; anything unrecognized becomes `None`.
///
/// Slashed and dashed day/month dates are read month-first, falling back
/// to day-first when the month-first reading is not a valid date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    if DATETIME_PATTERN.is_match(value) {
        return DATETIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
            .map(|dt| dt.date());
    }

    DATE_PATTERNS
        .iter()
        .find(|(pattern, _)| pattern.is_match(value))
        .and_then(|(_, formats)| {
            formats
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        })
}

/// Calendar-month label (`YYYY-MM`) for a date.
pub fn month_label(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Profit over sales; zero sales and non-finite results map to 0.
pub fn profit_margin(profit: Option<f64>, sales: Option<f64>) -> f64 {
    match (profit, sales) {
        (Some(p), Some(s)) if s != 0.0 => {
            let margin = p / s;
            if margin.is_finite() { margin } else { 0.0 }
        }
        _ => 0.0,
    }
}

/// Sales over quantity; zero quantity maps to null.
pub fn price_per_unit(sales: Option<f64>, quantity: Option<f64>) -> Option<f64> {
    match (sales, quantity) {
        (Some(s), Some(q)) if q != 0.0 => Some(s / q),
        _ => None,
    }
}

/// Appends the derived columns to a cleaned table.
pub struct DerivationStage;

impl DerivationStage {
    /// Compute every derived column whose sources were detected.
    ///
    /// Returns the names of the columns that were appended.
    pub fn derive(
        df: &mut DataFrame,
        mapping: &ColumnMapping,
        processing_steps: &mut Vec<String>,
    ) -> Result<Vec<String>> {
        let mut derived = Vec::new();

        let order_dates = match &mapping.order_date {
            Some(col) => Some(Self::parse_dates(df, col)?),
            None => None,
        };

        if let Some(order_dates) = &order_dates {
            let months: Vec<Option<String>> =
                order_dates.iter().map(|d| d.map(month_label)).collect();
            let unparsable = months.iter().filter(|m| m.is_none()).count();
            Self::append(df, Series::new(ORDER_MONTH.into(), months), &mut derived)?;
            processing_steps.push(format!(
                "Derived {} ({} unparsable order dates)",
                ORDER_MONTH, unparsable
            ));

            if let Some(ship_col) = &mapping.ship_date {
                let ship_dates = Self::parse_dates(df, ship_col)?;
                let delays: Vec<Option<i64>> = order_dates
                    .iter()
                    .zip(&ship_dates)
                    .map(|(order, ship)| match (order, ship) {
                        (Some(order), Some(ship)) => Some((*ship - *order).num_days()),
                        _ => None,
                    })
                    .collect();
                Self::append(df, Series::new(SHIP_DELAY_DAYS.into(), delays), &mut derived)?;
                processing_steps.push(format!("Derived {}", SHIP_DELAY_DAYS));
            }
        }

        if let (Some(sales_col), Some(profit_col)) = (&mapping.sales, &mapping.profit) {
            let sales = Self::numeric_source(df, sales_col, PROFIT_MARGIN)?;
            let profit = Self::numeric_source(df, profit_col, PROFIT_MARGIN)?;
            let margins: Vec<f64> = profit
                .iter()
                .zip(&sales)
                .map(|(p, s)| profit_margin(*p, *s))
                .collect();
            Self::append(df, Series::new(PROFIT_MARGIN.into(), margins), &mut derived)?;
            processing_steps.push(format!("Derived {}", PROFIT_MARGIN));
        }

        if let (Some(sales_col), Some(quantity_col)) = (&mapping.sales, &mapping.quantity) {
            let sales = Self::numeric_source(df, sales_col, PRICE_PER_UNIT)?;
            let quantity = Self::numeric_source(df, quantity_col, PRICE_PER_UNIT)?;
            let prices: Vec<Option<f64>> = sales
                .iter()
                .zip(&quantity)
                .map(|(s, q)| price_per_unit(*s, *q))
                .collect();
            let zero_quantity = prices.iter().filter(|p| p.is_none()).count();
            Self::append(df, Series::new(PRICE_PER_UNIT.into(), prices), &mut derived)?;
            processing_steps.push(format!(
                "Derived {} ({} rows without a unit price)",
                PRICE_PER_UNIT, zero_quantity
            ));
        }

        debug!("Derived columns: {:?}", derived);
        Ok(derived)
    }

    fn parse_dates(df: &DataFrame, column: &str) -> Result<Vec<Option<NaiveDate>>> {
        let dates: Vec<Option<NaiveDate>> = string_values(df, column)?
            .iter()
            .map(|v| v.as_deref().and_then(parse_date))
            .collect();
        Ok(dates)
    }

    fn numeric_source(df: &DataFrame, column: &str, target: &str) -> Result<Vec<Option<f64>>> {
        numeric_values(df, column).map_err(|e| DashboardError::DerivationFailed {
            column: target.to_string(),
            reason: e.to_string(),
        })
    }

    fn append(df: &mut DataFrame, series: Series, derived: &mut Vec<String>) -> Result<()> {
        let name = series.name().to_string();
        df.with_column(series)
            .map_err(|e| DashboardError::DerivationFailed {
                column: name.clone(),
                reason: e.to_string(),
            })?;
        derived.push(name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping_for(df: &DataFrame) -> ColumnMapping {
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        ColumnMapping::resolve(&names)
    }

    // ==================== parse_date tests ====================

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2017, 11, 8).unwrap();
        assert_eq!(parse_date("2017-11-08"), Some(expected));
        assert_eq!(parse_date("2017/11/08"), Some(expected));
        assert_eq!(parse_date("11/8/2017"), Some(expected));
        assert_eq!(parse_date("08.11.2017"), Some(expected));
        assert_eq!(parse_date("2017-11-08 13:45:00"), Some(expected));
        assert_eq!(parse_date("2017-11-08T13:45:00.000"), Some(expected));
    }

    #[test]
    fn test_parse_date_day_first_fallback() {
        // 25 cannot be a month, so the day-first reading is used
        let expected = NaiveDate::from_ymd_opt(2017, 11, 25).unwrap();
        assert_eq!(parse_date("25/11/2017"), Some(expected));
    }

    #[test]
    fn test_parse_date_unparsable() {
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("2017-13-45"), None);
    }

    // ==================== guard tests ====================

    #[test]
    fn test_profit_margin_guards() {
        assert_eq!(profit_margin(Some(5.0), Some(10.0)), 0.5);
        assert_eq!(profit_margin(Some(5.0), Some(0.0)), 0.0);
        assert_eq!(profit_margin(None, Some(10.0)), 0.0);
        assert_eq!(profit_margin(Some(f64::INFINITY), Some(1.0)), 0.0);
    }

    #[test]
    fn test_price_per_unit_guards() {
        assert_eq!(price_per_unit(Some(10.0), Some(4.0)), Some(2.5));
        assert_eq!(price_per_unit(Some(10.0), Some(0.0)), None);
        assert_eq!(price_per_unit(None, Some(2.0)), None);
    }

    // ==================== derive tests ====================

    #[test]
    fn test_derive_profit_margin_scenario() {
        let mut df = df![
            "Sales" => [10.0, 20.0, 0.0],
            "Profit" => [5.0, 0.0, 0.0],
        ]
        .unwrap();
        let mapping = mapping_for(&df);
        let mut steps = vec![];

        let derived = DerivationStage::derive(&mut df, &mapping, &mut steps).unwrap();

        assert_eq!(derived, vec![PROFIT_MARGIN]);
        let margins: Vec<Option<f64>> = df
            .column(PROFIT_MARGIN)
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(margins, vec![Some(0.5), Some(0.0), Some(0.0)]);
    }

    #[test]
    fn test_derive_price_per_unit_zero_quantity_is_null() {
        let mut df = df![
            "Sales" => [10.0, 20.0],
            "Quantity" => [2i64, 0],
        ]
        .unwrap();
        let mapping = mapping_for(&df);
        let mut steps = vec![];

        DerivationStage::derive(&mut df, &mapping, &mut steps).unwrap();

        let prices: Vec<Option<f64>> = df
            .column(PRICE_PER_UNIT)
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(prices, vec![Some(5.0), None]);
    }

    #[test]
    fn test_derive_dates() {
        let mut df = df![
            "Order_Date" => ["2017-11-08", "garbage", "2018-01-31"],
            "Ship_Date" => ["2017-11-11", "2017-11-11", "2018-02-02"],
        ]
        .unwrap();
        let mapping = mapping_for(&df);
        let mut steps = vec![];

        let derived = DerivationStage::derive(&mut df, &mapping, &mut steps).unwrap();
        assert_eq!(derived, vec![ORDER_MONTH, SHIP_DELAY_DAYS]);

        let months: Vec<Option<&str>> = df
            .column(ORDER_MONTH)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(months, vec![Some("2017-11"), None, Some("2018-01")]);

        let delays: Vec<Option<i64>> = df
            .column(SHIP_DELAY_DAYS)
            .unwrap()
            .i64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(delays, vec![Some(3), None, Some(2)]);
    }

    #[test]
    fn test_ship_delay_requires_order_date() {
        let mut df = df![
            "Ship_Date" => ["2017-11-11"],
        ]
        .unwrap();
        let mapping = mapping_for(&df);
        let mut steps = vec![];

        let derived = DerivationStage::derive(&mut df, &mapping, &mut steps).unwrap();
        assert!(derived.is_empty());
        assert!(df.column(SHIP_DELAY_DAYS).is_err());
    }
}
