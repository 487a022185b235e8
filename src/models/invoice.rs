//! Modelo de Invoice
//!
//! Factura derivada de un Job. Los importes derivados (IVA, bruto) se
//! recalculan con aritmética decimal cada vez que cambia el neto o el tipo.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use uuid::Uuid;

/// Condiciones de pago ofrecidas en el formulario de factura
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentTerms {
    PayNow,
    Days14,
    Days30,
}

impl PaymentTerms {
    pub const ALL: [PaymentTerms; 3] = [PaymentTerms::PayNow, PaymentTerms::Days14, PaymentTerms::Days30];

    pub fn label(&self) -> &'static str {
        match self {
            PaymentTerms::PayNow => "Pay now",
            PaymentTerms::Days14 => "14 days",
            PaymentTerms::Days30 => "30 days",
        }
    }

    pub fn days(&self) -> i64 {
        match self {
            PaymentTerms::PayNow => 0,
            PaymentTerms::Days14 => 14,
            PaymentTerms::Days30 => 30,
        }
    }

    pub fn due_date(&self, issue_date: NaiveDate) -> NaiveDate {
        issue_date + Duration::days(self.days())
    }
}

impl FromStr for PaymentTerms {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pay now" | "pay_now" | "immediate" | "0" => Ok(PaymentTerms::PayNow),
            "14 days" | "14_days" | "14" => Ok(PaymentTerms::Days14),
            "30 days" | "30_days" | "30" => Ok(PaymentTerms::Days30),
            other => Err(format!("unknown payment terms '{}'", other)),
        }
    }
}

impl Serialize for PaymentTerms {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for PaymentTerms {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Estado de pago de la factura
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
    Overdue,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Overdue => "overdue",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unpaid" | "pending" => Ok(PaymentStatus::Unpaid),
            "paid" => Ok(PaymentStatus::Paid),
            "overdue" => Ok(PaymentStatus::Overdue),
            other => Err(format!("unknown payment status '{}'", other)),
        }
    }
}

fn pence(amount: Decimal) -> Decimal {
    let mut amount = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    amount.rescale(2);
    amount
}

/// Importes derivados de (neto, tipo de IVA)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub net_amount: Decimal,
    pub vat_rate: Decimal,
    pub vat_amount: Decimal,
    pub gross_amount: Decimal,
}

impl InvoiceTotals {
    /// `vat = round(net * rate) / 100`, redondeo a la mitad alejándose de cero.
    /// Todos los importes salen con dos decimales.
    pub fn compute(net_amount: Decimal, vat_rate: Decimal) -> Self {
        let net_amount = pence(net_amount);
        let vat_amount = pence(
            (net_amount * vat_rate).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                / Decimal::ONE_HUNDRED,
        );
        let mut gross_amount = net_amount + vat_amount;
        gross_amount.rescale(2);

        Self {
            net_amount,
            vat_rate,
            vat_amount,
            gross_amount,
        }
    }

    pub fn with_vat_rate(&self, vat_rate: Decimal) -> Self {
        Self::compute(self.net_amount, vat_rate)
    }
}

/// Invoice principal - mapea a la tabla invoices
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Invoice {
    pub id: Uuid,
    pub invoice_number: String,
    pub job_id: Option<Uuid>,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub customer_address: Option<String>,
    pub description: Option<String>,
    pub net_amount: Decimal,
    pub vat_rate: Decimal,
    pub vat_amount: Decimal,
    pub gross_amount: Decimal,
    pub payment_terms: PaymentTerms,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub payment_status: PaymentStatus,
    pub signature_url: Option<String>,
    pub photo_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    pub fn totals(&self) -> InvoiceTotals {
        InvoiceTotals {
            net_amount: self.net_amount,
            vat_rate: self.vat_rate,
            vat_amount: self.vat_amount,
            gross_amount: self.gross_amount,
        }
    }

    /// Aplicar totales y fecha de vencimiento recalculados
    pub fn apply_pricing(&mut self, totals: InvoiceTotals, terms: PaymentTerms) {
        self.net_amount = totals.net_amount;
        self.vat_rate = totals.vat_rate;
        self.vat_amount = totals.vat_amount;
        self.gross_amount = totals.gross_amount;
        self.payment_terms = terms;
        self.due_date = terms.due_date(self.issue_date);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_vat_at_twenty_percent() {
        let totals = InvoiceTotals::compute(dec("123.45"), dec("20"));
        assert_eq!(totals.vat_amount, dec("24.69"));
        assert_eq!(totals.gross_amount, dec("148.14"));
    }

    #[test]
    fn test_vat_rounds_half_away_from_zero() {
        // 10.10 * 5 = 50.5 -> 51 -> 0.51
        let totals = InvoiceTotals::compute(dec("10.10"), dec("5"));
        assert_eq!(totals.vat_amount, dec("0.51"));
        // 10.01 * 5 = 50.05 -> 50 -> 0.50
        let totals = InvoiceTotals::compute(dec("10.01"), dec("5"));
        assert_eq!(totals.vat_amount, dec("0.50"));
    }

    #[test]
    fn test_gross_is_net_plus_vat_for_many_amounts() {
        for cents in [1i64, 99, 1000, 33333, 45000, 123456789] {
            let net = Decimal::new(cents, 2);
            for rate in [0u32, 5, 20] {
                let rate = Decimal::from(rate);
                let totals = InvoiceTotals::compute(net, rate);
                let expected_vat = (net * rate)
                    .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                    / Decimal::ONE_HUNDRED;
                assert_eq!(totals.vat_amount, expected_vat);
                assert_eq!(totals.gross_amount, net + expected_vat);
            }
        }
    }

    #[test]
    fn test_amounts_always_carry_two_decimals() {
        let totals = InvoiceTotals::compute(dec("500"), dec("5"));
        assert_eq!(totals.net_amount.to_string(), "500.00");
        assert_eq!(totals.vat_amount.to_string(), "25.00");
        assert_eq!(totals.gross_amount.to_string(), "525.00");
        assert_eq!(serde_json::to_value(totals).unwrap()["vat_amount"], "25.00");
    }

    #[test]
    fn test_changing_rate_keeps_net() {
        let totals = InvoiceTotals::compute(dec("500.00"), dec("20"));
        let changed = totals.with_vat_rate(dec("5"));
        assert_eq!(changed.net_amount, dec("500.00"));
        assert_eq!(changed.vat_amount, dec("25"));
        assert_eq!(changed.gross_amount, dec("525.00"));
    }

    #[test]
    fn test_due_dates() {
        let issue = NaiveDate::from_ymd_opt(2024, 2, 20).unwrap();
        assert_eq!(PaymentTerms::PayNow.due_date(issue), issue);
        assert_eq!(PaymentTerms::Days14.due_date(issue), NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(PaymentTerms::Days30.due_date(issue), NaiveDate::from_ymd_opt(2024, 3, 21).unwrap());
    }

    #[test]
    fn test_terms_round_trip_labels() {
        for terms in PaymentTerms::ALL {
            assert_eq!(terms.label().parse::<PaymentTerms>(), Ok(terms));
        }
    }
}
