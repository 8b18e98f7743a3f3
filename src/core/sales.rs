//! Sales summaries by product, category, location, seller or month

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::core::group::group_by;
use crate::core::period::MonthKey;
use crate::core::rank::sort_desc_by;
use crate::core::ratio::{pct, safe_div};
use crate::core::types::SaleRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalesDimension {
    #[default]
    Product,
    Category,
    Location,
    SoldBy,
    Month,
}

impl SalesDimension {
    pub fn label(self) -> &'static str {
        match self {
            SalesDimension::Product => "Product",
            SalesDimension::Category => "Category",
            SalesDimension::Location => "Location",
            SalesDimension::SoldBy => "Sold By",
            SalesDimension::Month => "Month",
        }
    }

    pub fn key(self, sale: &SaleRecord) -> String {
        match self {
            SalesDimension::Product => sale.product.clone(),
            SalesDimension::Category => sale.category.clone(),
            SalesDimension::Location => sale.location.clone(),
            SalesDimension::SoldBy => sale.sold_by.clone(),
            SalesDimension::Month => sale
                .payment_date
                .map(|d| MonthKey::from_date(d).label())
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SalesSummary {
    pub key: String,
    pub transactions: usize,
    pub succeeded: usize,
    pub revenue: f64,
    pub unique_customers: usize,
    pub avg_transaction_value: f64,
    pub discount_total: f64,
    pub discounted_transactions: usize,
    pub discount_rate: f64,
    pub avg_discount_percent: f64,
    /// Share of the revenue of all returned groups
    pub revenue_share: f64,
}

/// Summaries per group, highest revenue first
pub fn summarize_sales(sales: &[SaleRecord], dimension: SalesDimension) -> Vec<SalesSummary> {
    let mut rows: Vec<SalesSummary> = group_by(sales, |s| dimension.key(s))
        .into_iter()
        .map(|group| {
            let mut succeeded = 0usize;
            let mut revenue = 0.0;
            let mut customers: HashSet<String> = HashSet::new();
            let mut discount_total = 0.0;
            let mut discounted = 0usize;
            let mut discount_percent_sum = 0.0;

            for sale in &group.records {
                if sale.is_succeeded() {
                    succeeded += 1;
                    revenue += sale.amount;
                }
                if let Some(customer) = sale.customer_key() {
                    customers.insert(customer);
                }
                if sale.is_discounted() {
                    discounted += 1;
                    discount_total += sale.discount_amount;
                    discount_percent_sum += sale.discount_percent;
                }
            }

            let transactions = group.len();
            SalesSummary {
                key: group.key,
                transactions,
                succeeded,
                revenue,
                unique_customers: customers.len(),
                avg_transaction_value: safe_div(revenue, succeeded as f64),
                discount_total,
                discounted_transactions: discounted,
                discount_rate: pct(discounted as f64, transactions as f64),
                avg_discount_percent: safe_div(discount_percent_sum, discounted as f64),
                revenue_share: 0.0,
            }
        })
        .collect();

    let total: f64 = rows.iter().map(|r| r.revenue).sum();
    for row in &mut rows {
        row.revenue_share = pct(row.revenue, total);
    }

    sort_desc_by(&mut rows, |r| r.revenue);
    rows
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sale(product: &str, member: &str, amount: f64, status: &str) -> SaleRecord {
        SaleRecord {
            product: product.into(),
            member_id: member.into(),
            amount,
            status: status.into(),
            payment_date: NaiveDate::from_ymd_opt(2025, 2, 3),
            ..Default::default()
        }
    }

    #[test]
    fn summarize_by_product_sorted_by_revenue() {
        let sales = vec![
            sale("10 Class Pack", "a", 100.0, "succeeded"),
            sale("Unlimited", "b", 300.0, "succeeded"),
            sale("10 Class Pack", "c", 100.0, "succeeded"),
            sale("10 Class Pack", "c", 100.0, "failed"),
        ];
        let rows = summarize_sales(&sales, SalesDimension::Product);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].key, "Unlimited");
        assert_eq!(rows[0].revenue_share, 60.0);
        let pack = &rows[1];
        assert_eq!(pack.transactions, 3);
        assert_eq!(pack.succeeded, 2);
        assert_eq!(pack.revenue, 200.0);
        assert_eq!(pack.unique_customers, 2);
        assert_eq!(pack.avg_transaction_value, 100.0);
        assert_eq!(pack.revenue_share, 40.0);
    }

    #[test]
    fn discount_rates() {
        let mut discounted = sale("Pack", "a", 80.0, "succeeded");
        discounted.discount_amount = 20.0;
        discounted.discount_percent = 20.0;
        let rows = summarize_sales(
            &[discounted, sale("Pack", "b", 100.0, "succeeded")],
            SalesDimension::Product,
        );
        assert_eq!(rows[0].discounted_transactions, 1);
        assert_eq!(rows[0].discount_rate, 50.0);
        assert_eq!(rows[0].avg_discount_percent, 20.0);
        assert_eq!(rows[0].discount_total, 20.0);
    }

    #[test]
    fn all_failed_payments_report_zero_ratios() {
        let rows = summarize_sales(&[sale("Pack", "a", 50.0, "failed")], SalesDimension::Product);
        assert_eq!(rows[0].revenue, 0.0);
        assert_eq!(rows[0].avg_transaction_value, 0.0);
        assert_eq!(rows[0].revenue_share, 0.0);
    }

    #[test]
    fn group_by_month_label() {
        let rows = summarize_sales(&[sale("Pack", "a", 50.0, "succeeded")], SalesDimension::Month);
        assert_eq!(rows[0].key, "Feb 2025");
    }
}
