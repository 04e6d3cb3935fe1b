//! # Sales Report
//!
//! Inputs for, and the expected shape of, the monthly sales report produced
//! by an external text generator.
//!
//! ```text
//! Snapshot ──► sales_report_input("May") ──► SalesReportInput ──► generator
//!                                                                     │
//!              SalesReport::validate() ◄──────────────── SalesReport ◄┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::analytics::{
    parse_month_label, sales_by_month, top_active_customers, top_products_sold, CustomerActivity,
    MonthlyRevenue, ProductSales, Snapshot,
};
use crate::error::{CoreResult, ValidationError};
use crate::DEFAULT_TOP_LIMIT;

/// Minimum entries per list in a generated report.
pub const REPORT_MIN_ENTRIES: usize = 2;

/// Maximum entries per list in a generated report.
pub const REPORT_MAX_ENTRIES: usize = 3;

/// Aggregates handed to the report generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SalesReportInput {
    /// Canonical month label, e.g. `May`.
    pub month: String,
    /// Revenue for `month`, or `None` when the month had no sales.
    pub month_total_cents: Option<i64>,
    pub sales_by_month: Vec<MonthlyRevenue>,
    pub top_products: Vec<ProductSales>,
    pub top_customers: Vec<CustomerActivity>,
}

/// Builds the report input for one month.
///
/// ## Errors
/// `InvalidFormat` if `month` is not one of `Jan`..`Dec` (case-insensitive).
pub fn sales_report_input(snapshot: &Snapshot, month: &str) -> CoreResult<SalesReportInput> {
    let month = parse_month_label(month).ok_or_else(|| ValidationError::InvalidFormat {
        field: "month".to_string(),
        reason: format!("expected one of Jan..Dec, got '{}'", month.trim()),
    })?;

    let by_month = sales_by_month(snapshot);
    let month_total_cents = by_month
        .iter()
        .find(|m| m.month == month)
        .map(|m| m.total_cents);

    Ok(SalesReportInput {
        month: month.to_string(),
        month_total_cents,
        sales_by_month: by_month,
        top_products: top_products_sold(snapshot, DEFAULT_TOP_LIMIT),
        top_customers: top_active_customers(snapshot, DEFAULT_TOP_LIMIT),
    })
}

/// Structured report returned by the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SalesReport {
    pub executive_summary: String,
    pub strengths: Vec<String>,
    pub areas_for_improvement: Vec<String>,
    pub recommendations: Vec<String>,
}

impl SalesReport {
    /// Checks the summary is present and each list has 2 or 3 non-blank entries.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.executive_summary.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "executiveSummary".to_string(),
            });
        }

        for (field, entries) in [
            ("strengths", &self.strengths),
            ("areasForImprovement", &self.areas_for_improvement),
            ("recommendations", &self.recommendations),
        ] {
            if !(REPORT_MIN_ENTRIES..=REPORT_MAX_ENTRIES).contains(&entries.len()) {
                return Err(ValidationError::OutOfRange {
                    field: field.to_string(),
                    min: REPORT_MIN_ENTRIES as i64,
                    max: REPORT_MAX_ENTRIES as i64,
                });
            }
            if entries.iter().any(|e| e.trim().is_empty()) {
                return Err(ValidationError::Required {
                    field: field.to_string(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CoreError, ErrorKind};
    use crate::types::Sale;
    use chrono::{TimeZone, Utc};

    fn sale(id: &str, month: u32, total_cents: i64) -> Sale {
        Sale {
            id: id.to_string(),
            customer_id: "c1".to_string(),
            date: Utc.with_ymd_and_hms(2024, month, 15, 10, 0, 0).unwrap(),
            total_cents,
            items: vec![],
        }
    }

    #[test]
    fn test_report_input_for_month() {
        let snapshot = Snapshot {
            sales: vec![sale("s1", 5, 1000), sale("s2", 5, 500), sale("s3", 6, 200)],
            ..Snapshot::default()
        };

        let input = sales_report_input(&snapshot, "may").unwrap();
        assert_eq!(input.month, "May");
        assert_eq!(input.month_total_cents, Some(1500));
        assert_eq!(input.sales_by_month.len(), 2);
        assert_eq!(input.top_customers[0].purchase_count, 3);

        let quiet = sales_report_input(&snapshot, "Dec").unwrap();
        assert_eq!(quiet.month_total_cents, None);
    }

    #[test]
    fn test_unknown_month_is_rejected() {
        let err = sales_report_input(&Snapshot::default(), "Maio").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(matches!(err, CoreError::Validation(ValidationError::InvalidFormat { .. })));
    }

    #[test]
    fn test_report_validate() {
        let mut report = SalesReport {
            executive_summary: "Revenue grew in May.".to_string(),
            strengths: vec!["Laptop sales".into(), "Repeat buyers".into()],
            areas_for_improvement: vec!["Webcam stock".into(), "June dip".into()],
            recommendations: vec!["Bundle peripherals".into(), "Email campaign".into(), "Restock".into()],
        };
        assert!(report.validate().is_ok());

        report.recommendations.push("One too many".into());
        assert!(matches!(report.validate(), Err(ValidationError::OutOfRange { .. })));

        report.recommendations.truncate(2);
        report.strengths[1] = "  ".into();
        assert!(matches!(report.validate(), Err(ValidationError::Required { .. })));
    }
}
