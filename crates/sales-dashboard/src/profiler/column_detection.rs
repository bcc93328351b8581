//! Name-based detection of the columns the dashboard depends on.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The logical fields the dashboard looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalField {
    Sales,
    Profit,
    Quantity,
    OrderDate,
    ShipDate,
}

impl LogicalField {
    pub const ALL: [LogicalField; 5] = [
        LogicalField::Sales,
        LogicalField::Profit,
        LogicalField::Quantity,
        LogicalField::OrderDate,
        LogicalField::ShipDate,
    ];

    /// Lowercase fragment a column name must contain to match this field.
    pub fn needle(&self) -> &'static str {
        match self {
            Self::Sales => "sales",
            Self::Profit => "profit",
            Self::Quantity => "quantity",
            Self::OrderDate => "order_date",
            Self::ShipDate => "ship_date",
        }
    }
}

impl fmt::Display for LogicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.needle())
    }
}

/// Resolved column per logical field; `None` when nothing matched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub sales: Option<String>,
    pub profit: Option<String>,
    pub quantity: Option<String>,
    pub order_date: Option<String>,
    pub ship_date: Option<String>,
}

impl ColumnMapping {
    /// Resolve every logical field against the given column names.
    ///
    /// Each field takes the first column (in column order) whose lowercase
    /// name contains the field's fragment.
    pub fn resolve<S: AsRef<str>>(columns: &[S]) -> Self {
        Self {
            sales: first_match(columns, LogicalField::Sales),
            profit: first_match(columns, LogicalField::Profit),
            quantity: first_match(columns, LogicalField::Quantity),
            order_date: first_match(columns, LogicalField::OrderDate),
            ship_date: first_match(columns, LogicalField::ShipDate),
        }
    }

    pub fn get(&self, field: LogicalField) -> Option<&str> {
        match field {
            LogicalField::Sales => self.sales.as_deref(),
            LogicalField::Profit => self.profit.as_deref(),
            LogicalField::Quantity => self.quantity.as_deref(),
            LogicalField::OrderDate => self.order_date.as_deref(),
            LogicalField::ShipDate => self.ship_date.as_deref(),
        }
    }

    /// Fields that did not resolve to any column.
    pub fn missing_fields(&self) -> Vec<LogicalField> {
        LogicalField::ALL
            .into_iter()
            .filter(|field| self.get(*field).is_none())
            .collect()
    }
}

fn first_match<S: AsRef<str>>(columns: &[S], field: LogicalField) -> Option<String> {
    columns
        .iter()
        .map(|c| c.as_ref())
        .find(|name| name.to_lowercase().contains(field.needle()))
        .map(|name| name.to_string())
}
