//! UDI projection — year-by-year inflation-adjusted contribution table.
//!
//! The unit price path grows by a fixed annual rate; contributions are a
//! fixed number of units per payment period. All arithmetic runs at full
//! f64 precision; rounding to 2 decimals is for display only.

use serde::{Deserialize, Serialize};

use crate::types::PaymentFrequency;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UdiQuoteInput {
    /// Unit price in year 1.
    pub unit_price_today: f64,
    /// Annual inflation, percent (e.g. 3.0 for 3%).
    pub annual_inflation_pct: f64,
    pub years: u32,
    pub periodicity: PaymentFrequency,
    /// Units bought each payment period.
    pub units_per_period: f64,
    /// Discount rate for present value, percent. Zero or absent means
    /// present value equals nominal value.
    #[serde(default)]
    pub discount_rate_pct: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UdiYearRow {
    pub year: u32,
    pub unit_price: f64,
    pub annual_units: f64,
    pub cumulative_units: f64,
    /// Value of this year's contribution at this year's price.
    pub annual_value: f64,
    /// Value of everything accumulated so far at this year's price.
    pub value_at_year: f64,
    pub present_value: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UdiTotals {
    pub total_units_contributed: f64,
    pub final_cumulative_units: f64,
    pub final_value: f64,
    pub final_present_value: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UdiQuote {
    pub rows: Vec<UdiYearRow>,
    pub totals: UdiTotals,
}

/// Round to 2 decimals — display only, never fed back into the table.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn compute_udi_quote(input: &UdiQuoteInput) -> UdiQuote {
    let periods_per_year = input.periodicity.periods_per_year() as f64;
    let annual_units = input.units_per_period * periods_per_year;
    let growth = 1.0 + input.annual_inflation_pct / 100.0;
    let discount_rate = input.discount_rate_pct.unwrap_or(0.0);

    let mut rows = Vec::with_capacity(input.years as usize);
    let mut unit_price = input.unit_price_today;
    let mut cumulative_units = 0.0;

    for year in 1..=input.years {
        if year > 1 {
            unit_price *= growth;
        }
        cumulative_units += annual_units;
        let annual_value = annual_units * unit_price;
        let value_at_year = cumulative_units * unit_price;
        let present_value = if discount_rate == 0.0 {
            value_at_year
        } else {
            value_at_year / (1.0 + discount_rate / 100.0).powi(year as i32)
        };
        rows.push(UdiYearRow {
            year,
            unit_price,
            annual_units,
            cumulative_units,
            annual_value,
            value_at_year,
            present_value,
        });
    }

    let totals = match rows.last() {
        Some(last) => UdiTotals {
            total_units_contributed: annual_units * input.years as f64,
            final_cumulative_units: last.cumulative_units,
            final_value: last.value_at_year,
            final_present_value: last.present_value,
        },
        None => UdiTotals {
            total_units_contributed: 0.0,
            final_cumulative_units: 0.0,
            final_value: 0.0,
            final_present_value: 0.0,
        },
    };

    UdiQuote { rows, totals }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worked_example_three_years_monthly() {
        let quote = compute_udi_quote(&UdiQuoteInput {
            unit_price_today: 7.0,
            annual_inflation_pct: 3.0,
            years: 3,
            periodicity: PaymentFrequency::Monthly,
            units_per_period: 10.0,
            discount_rate_pct: None,
        });

        assert_eq!(quote.rows.len(), 3);

        let y1 = &quote.rows[0];
        assert_eq!(y1.unit_price, 7.0);
        assert_eq!(y1.annual_units, 120.0);
        assert_eq!(y1.cumulative_units, 120.0);
        assert_eq!(round2(y1.annual_value), 840.00);

        let y2 = &quote.rows[1];
        assert_eq!(round2(y2.unit_price), 7.21);
        assert_eq!(y2.cumulative_units, 240.0);
        assert_eq!(round2(y2.value_at_year), 1730.40);

        let y3 = &quote.rows[2];
        assert_eq!(round2(y3.cumulative_units), 360.0);
        assert!((y3.unit_price - 7.4263).abs() < 0.0001);
        assert_eq!(round2(y3.value_at_year), 2673.47);

        assert_eq!(quote.totals.total_units_contributed, 360.0);
        assert_eq!(quote.totals.final_cumulative_units, 360.0);
        assert_eq!(round2(quote.totals.final_value), 2673.47);
        // No discount rate: present value equals nominal.
        assert_eq!(quote.totals.final_present_value, quote.totals.final_value);
    }

    #[test]
    fn test_discount_rate_applied_per_year() {
        let quote = compute_udi_quote(&UdiQuoteInput {
            unit_price_today: 10.0,
            annual_inflation_pct: 0.0,
            years: 2,
            periodicity: PaymentFrequency::Annual,
            units_per_period: 1.0,
            discount_rate_pct: Some(10.0),
        });
        // Year 1: value 10, discounted once; year 2: value 20, discounted twice.
        assert_eq!(round2(quote.rows[0].present_value), round2(10.0 / 1.1));
        assert_eq!(round2(quote.rows[1].present_value), round2(20.0 / 1.21));
    }

    #[test]
    fn test_zero_years_is_empty() {
        let quote = compute_udi_quote(&UdiQuoteInput {
            unit_price_today: 7.0,
            annual_inflation_pct: 3.0,
            years: 0,
            periodicity: PaymentFrequency::Monthly,
            units_per_period: 10.0,
            discount_rate_pct: None,
        });
        assert!(quote.rows.is_empty());
        assert_eq!(quote.totals.total_units_contributed, 0.0);
        assert_eq!(quote.totals.final_value, 0.0);
    }

    #[test]
    fn test_periodicity_drives_annual_units() {
        for (periodicity, expected) in [
            (PaymentFrequency::Monthly, 120.0),
            (PaymentFrequency::Quarterly, 40.0),
            (PaymentFrequency::Semiannual, 20.0),
            (PaymentFrequency::Annual, 10.0),
        ] {
            let quote = compute_udi_quote(&UdiQuoteInput {
                unit_price_today: 7.0,
                annual_inflation_pct: 3.0,
                years: 1,
                periodicity,
                units_per_period: 10.0,
                discount_rate_pct: None,
            });
            assert_eq!(quote.rows[0].annual_units, expected);
        }
    }
}
