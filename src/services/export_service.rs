//! Exportación CSV de jobs

use crate::models::job::Job;

const HEADER: [&str; 12] = [
    "id",
    "status",
    "pickup_location",
    "pickup_postcode",
    "delivery_location",
    "delivery_postcode",
    "pickup_at",
    "vehicle_type",
    "budget",
    "agreed_rate",
    "load_type",
    "created_at",
];

/// Campo CSV: entre comillas si contiene separador, comillas o saltos de línea
fn escape_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn row(fields: &[String]) -> String {
    fields.iter().map(|f| escape_field(f)).collect::<Vec<_>>().join(",")
}

pub fn jobs_to_csv(jobs: &[Job]) -> String {
    let mut out = HEADER.join(",");
    out.push_str("\r\n");

    for job in jobs {
        let fields = vec![
            job.id.to_string(),
            job.status.to_string(),
            job.pickup_location.clone(),
            job.pickup_postcode.clone().unwrap_or_default(),
            job.delivery_location.clone(),
            job.delivery_postcode.clone().unwrap_or_default(),
            job.pickup_at.to_rfc3339(),
            job.vehicle_type.clone(),
            job.budget.to_string(),
            job.agreed_rate.map(|r| r.to_string()).unwrap_or_default(),
            job.load_type.map(|t| t.as_str().to_string()).unwrap_or_default(),
            job.created_at.to_rfc3339(),
        ];
        out.push_str(&row(&fields));
        out.push_str("\r\n");
    }
    out
}

/// Nombre del fichero de descarga, con la fecha del día
pub fn export_filename(today: chrono::NaiveDate) -> String {
    format!("jobs-{}.csv", today.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::{JobStatus, NewJob};
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("Leeds"), "Leeds");
        assert_eq!(escape_field("Unit 4, Leeds"), "\"Unit 4, Leeds\"");
        assert_eq!(escape_field("the \"big\" one"), "\"the \"\"big\"\" one\"");
        assert_eq!(escape_field("line\nbreak"), "\"line\nbreak\"");
    }

    #[test]
    fn test_csv_has_header_and_row_per_job() {
        let job = NewJob {
            company_id: Uuid::new_v4(),
            pickup_location: "Dock 3, Hull".to_string(),
            pickup_postcode: Some("HU1 1AA".to_string()),
            pickup_city: None,
            delivery_location: "Derby".to_string(),
            delivery_postcode: None,
            delivery_city: None,
            pickup_at: Utc::now(),
            delivery_at: None,
            status: JobStatus::Open,
            budget: Decimal::new(50000, 2),
            vehicle_type: "artic".to_string(),
            weight_kg: None,
            pallets: None,
            dimensions: None,
            load_details: None,
            load_type: None,
            distance_miles: None,
        }
        .into_job(Utc::now());

        let csv = jobs_to_csv(&[job]);
        let lines: Vec<&str> = csv.split("\r\n").filter(|l| !l.is_empty()).collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("id,status,pickup_location"));
        assert!(lines[1].contains(",open,\"Dock 3, Hull\",HU1 1AA,Derby,"));
        assert!(lines[1].contains(",500.00,"));
    }

    #[test]
    fn test_filename() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 9).unwrap();
        assert_eq!(export_filename(day), "jobs-2024-05-09.csv");
    }
}
