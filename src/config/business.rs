//! Constantes de negocio
//!
//! Identidad de la empresa, condiciones de pago, tipos de IVA y etiquetas
//! de estado. Sin comportamiento más allá de búsquedas.

use serde::Serialize;

use crate::models::bid::BidStatus;
use crate::models::invoice::PaymentTerms;
use crate::models::job::JobStatus;

pub const COMPANY_NAME: &str = "Freight Exchange Ltd";
pub const COMPANY_ADDRESS: &str = "Unit 4, Trafford Park Road, Manchester, M17 1HH";
pub const COMPANY_EMAIL: &str = "accounts@freightexchange.co.uk";
pub const COMPANY_PHONE: &str = "+44 161 555 0142";
pub const COMPANY_NUMBER: &str = "12345678";
pub const VAT_NUMBER: &str = "GB 123 4567 89";
pub const BANK_NAME: &str = "Barclays";
pub const BANK_SORT_CODE: &str = "20-00-00";
pub const BANK_ACCOUNT: &str = "55779911";

/// Tipos de IVA disponibles (porcentaje)
pub const VAT_RATES: [u32; 3] = [0, 5, 20];
pub const DEFAULT_VAT_RATE: u32 = 20;

/// Intervalo de refresco de la bolsa de cargas (segundos)
pub const JOB_BOARD_REFRESH_SECS: u64 = 30;

/// Bucket de object storage para pruebas de entrega
pub const JOB_PHOTOS_BUCKET: &str = "job-photos";

/// Tipos de vehículo ofertados en los formularios
pub const VEHICLE_TYPES: [&str; 7] = [
    "small_van",
    "swb_van",
    "lwb_van",
    "luton",
    "7.5t",
    "18t",
    "artic",
];

#[derive(Debug, Clone, Serialize)]
pub struct CompanyIdentity {
    pub name: &'static str,
    pub address: &'static str,
    pub email: &'static str,
    pub phone: &'static str,
    pub company_number: &'static str,
    pub vat_number: &'static str,
    pub bank_name: &'static str,
    pub sort_code: &'static str,
    pub account_number: &'static str,
}

pub fn company_identity() -> CompanyIdentity {
    CompanyIdentity {
        name: COMPANY_NAME,
        address: COMPANY_ADDRESS,
        email: COMPANY_EMAIL,
        phone: COMPANY_PHONE,
        company_number: COMPANY_NUMBER,
        vat_number: VAT_NUMBER,
        bank_name: BANK_NAME,
        sort_code: BANK_SORT_CODE,
        account_number: BANK_ACCOUNT,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusLabel {
    pub value: &'static str,
    pub label: &'static str,
}

pub fn job_status_labels() -> Vec<StatusLabel> {
    JobStatus::ALL
        .iter()
        .map(|s| StatusLabel { value: s.as_str(), label: s.label() })
        .collect()
}

pub fn bid_status_labels() -> Vec<StatusLabel> {
    BidStatus::ALL
        .iter()
        .map(|s| StatusLabel { value: s.as_str(), label: s.label() })
        .collect()
}

pub fn payment_terms_labels() -> Vec<&'static str> {
    PaymentTerms::ALL.iter().map(|t| t.label()).collect()
}

pub fn is_supported_vat_rate(rate: u32) -> bool {
    VAT_RATES.contains(&rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vat_rates() {
        assert!(is_supported_vat_rate(20));
        assert!(is_supported_vat_rate(0));
        assert!(!is_supported_vat_rate(17));
    }

    #[test]
    fn test_labels_cover_every_status() {
        assert_eq!(job_status_labels().len(), JobStatus::ALL.len());
        assert_eq!(bid_status_labels().len(), BidStatus::ALL.len());
        assert_eq!(payment_terms_labels(), vec!["Pay now", "14 days", "30 days"]);
    }
}
