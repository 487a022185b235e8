//! Filtrado y ordenación de la lista de jobs
//!
//! Se aplica en memoria sobre la lista completa, en este orden: pestaña,
//! estado, texto de origen y de destino, tipo de vehículo y fecha de recogida. Después
//! se ordena de forma estable con desempate por creación desc e id asc.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::models::job::{Job, JobStatus, LoadType};

/// Pestañas de la bolsa de cargas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tab {
    #[default]
    All,
    Live,
    OnDemand,
    Regular,
    DailyHire,
}

impl Tab {
    fn load_type(&self) -> Option<LoadType> {
        match self {
            Tab::OnDemand => Some(LoadType::OnDemand),
            Tab::Regular => Some(LoadType::Regular),
            Tab::DailyHire => Some(LoadType::DailyHire),
            Tab::All | Tab::Live => None,
        }
    }

    fn matches(&self, job: &Job) -> bool {
        match self {
            Tab::All => true,
            Tab::Live => job.status == JobStatus::Open,
            // load_type ausente aparece en todas las pestañas de tipo
            _ => {
                job.status == JobStatus::Open
                    && (job.load_type.is_none() || job.load_type == self.load_type())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sort {
    #[default]
    Newest,
    Distance,
    Budget,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobQuery {
    pub tab: Option<Tab>,
    pub status: Option<JobStatus>,
    /// Subcadena sobre la ubicación de recogida
    pub pickup: Option<String>,
    /// Subcadena sobre la ubicación de entrega
    pub delivery: Option<String>,
    pub vehicle_type: Option<String>,
    pub pickup_date: Option<NaiveDate>,
    pub sort: Option<Sort>,
}

impl JobQuery {
    /// Consulta de la bolsa pública: solo jobs abiertos
    pub fn board(mut self) -> Self {
        self.tab = Some(self.tab.unwrap_or(Tab::Live));
        if self.tab == Some(Tab::All) {
            self.tab = Some(Tab::Live);
        }
        self
    }

    pub fn matches(&self, job: &Job) -> bool {
        if !self.tab.unwrap_or_default().matches(job) {
            return false;
        }

        if let Some(status) = self.status {
            if job.status != status {
                return false;
            }
        }

        if !contains_term(&job.pickup_location, self.pickup.as_deref()) {
            return false;
        }

        if !contains_term(&job.delivery_location, self.delivery.as_deref()) {
            return false;
        }

        if let Some(vehicle_type) = self.vehicle_type.as_deref().filter(|v| !v.is_empty()) {
            if job.vehicle_type != vehicle_type {
                return false;
            }
        }

        if let Some(date) = self.pickup_date {
            if job.pickup_date() != date {
                return false;
            }
        }

        true
    }

    pub fn apply(&self, jobs: Vec<Job>) -> Vec<Job> {
        let mut jobs: Vec<Job> = jobs.into_iter().filter(|job| self.matches(job)).collect();
        let sort = self.sort.unwrap_or_default();
        jobs.sort_by(|a, b| compare(sort, a, b));
        jobs
    }
}

/// Sin término (o en blanco) no filtra
fn contains_term(field: &str, term: Option<&str>) -> bool {
    match term.map(str::trim).filter(|t| !t.is_empty()) {
        Some(term) => field.to_lowercase().contains(&term.to_lowercase()),
        None => true,
    }
}

fn tie_break(a: &Job, b: &Job) -> Ordering {
    b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id))
}

fn compare(sort: Sort, a: &Job, b: &Job) -> Ordering {
    let primary = match sort {
        Sort::Newest => Ordering::Equal,
        // Distancia desc, sin distancia al final
        Sort::Distance => match (a.distance_miles, b.distance_miles) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        Sort::Budget => b.budget.cmp(&a.budget),
    };
    primary.then_with(|| tie_break(a, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::NewJob;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn job(
        pickup: &str,
        delivery: &str,
        status: JobStatus,
        budget: i64,
        load_type: Option<LoadType>,
        minutes_ago: i64,
    ) -> Job {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut job = NewJob {
            company_id: Uuid::new_v4(),
            pickup_location: pickup.to_string(),
            pickup_postcode: None,
            pickup_city: None,
            delivery_location: delivery.to_string(),
            delivery_postcode: None,
            delivery_city: None,
            pickup_at: Utc.with_ymd_and_hms(2024, 5, 3, 8, 0, 0).unwrap(),
            delivery_at: None,
            status,
            budget: Decimal::from(budget),
            vehicle_type: "luton".to_string(),
            weight_kg: None,
            pallets: None,
            dimensions: None,
            load_details: None,
            load_type,
            distance_miles: None,
        }
        .into_job(now - Duration::minutes(minutes_ago));
        job.status = status;
        job
    }

    fn fixture() -> Vec<Job> {
        let mut jobs = vec![
            job("Leeds Depot", "York", JobStatus::Open, 500, None, 1),
            job("Manchester", "Leeds", JobStatus::Open, 300, Some(LoadType::Regular), 2),
            job("Bristol", "Bath", JobStatus::Assigned, 700, Some(LoadType::OnDemand), 3),
            job("London", "Dover", JobStatus::Open, 500, Some(LoadType::DailyHire), 4),
            job("Hull", "Leeds", JobStatus::Draft, 200, None, 5),
        ];
        jobs[1].vehicle_type = "artic".to_string();
        jobs[3].distance_miles = Some(Decimal::from(80));
        jobs[0].distance_miles = Some(Decimal::from(25));
        jobs
    }

    fn ids(jobs: &[Job]) -> Vec<Uuid> {
        jobs.iter().map(|j| j.id).collect()
    }

    #[test]
    fn test_default_is_all_newest_first() {
        let jobs = fixture();
        let result = JobQuery::default().apply(jobs.clone());
        assert_eq!(ids(&result), ids(&jobs));
    }

    #[test]
    fn test_load_type_tab_includes_untyped_open_jobs() {
        let jobs = fixture();
        let query = JobQuery { tab: Some(Tab::Regular), ..Default::default() };
        let result = query.apply(jobs.clone());
        assert_eq!(ids(&result), vec![jobs[0].id, jobs[1].id]);
    }

    #[test]
    fn test_live_tab_only_open() {
        let result = JobQuery { tab: Some(Tab::Live), ..Default::default() }.apply(fixture());
        assert!(result.iter().all(|j| j.status == JobStatus::Open));
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn test_pickup_filter_ignores_delivery_side() {
        let jobs = fixture();
        let query = JobQuery { pickup: Some("LEEDS".to_string()), ..Default::default() };
        assert_eq!(ids(&query.apply(jobs.clone())), vec![jobs[0].id]);
    }

    #[test]
    fn test_delivery_filter_ignores_pickup_side() {
        let jobs = fixture();
        let query = JobQuery { delivery: Some("leeds".to_string()), ..Default::default() };
        assert_eq!(ids(&query.apply(jobs.clone())), vec![jobs[1].id, jobs[4].id]);

        let both = JobQuery {
            pickup: Some("manch".to_string()),
            delivery: Some("Leeds".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&both.apply(jobs.clone())), vec![jobs[1].id]);

        let blank = JobQuery { delivery: Some("  ".to_string()), ..Default::default() };
        assert_eq!(blank.apply(jobs).len(), 5);
    }

    #[test]
    fn test_filtering_is_idempotent() {
        let query = JobQuery {
            tab: Some(Tab::Live),
            delivery: Some("leeds".to_string()),
            sort: Some(Sort::Budget),
            ..Default::default()
        };
        let once = query.apply(fixture());
        let twice = query.apply(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_independent_filters_commute() {
        let jobs = fixture();
        let by_status = JobQuery { status: Some(JobStatus::Open), ..Default::default() };
        let by_vehicle = JobQuery { vehicle_type: Some("luton".to_string()), ..Default::default() };

        let a = by_vehicle.apply(by_status.apply(jobs.clone()));
        let b = by_status.apply(by_vehicle.apply(jobs.clone()));
        assert_eq!(a, b);
        assert_eq!(a.len(), 2);

        let by_delivery = JobQuery { delivery: Some("leeds".to_string()), ..Default::default() };
        let c = by_delivery.apply(by_status.apply(jobs.clone()));
        let d = by_status.apply(by_delivery.apply(jobs.clone()));
        assert_eq!(c, d);
        assert_eq!(ids(&c), vec![jobs[1].id]);

        let by_pickup = JobQuery { pickup: Some("leeds".to_string()), ..Default::default() };
        let e = by_pickup.apply(by_status.apply(jobs.clone()));
        let f = by_status.apply(by_pickup.apply(jobs.clone()));
        assert_eq!(e, f);
        assert_eq!(ids(&e), vec![jobs[0].id]);
    }

    #[test]
    fn test_budget_sort_ties_break_on_creation_then_id() {
        let jobs = fixture();
        let result = JobQuery { sort: Some(Sort::Budget), ..Default::default() }.apply(jobs.clone());
        // 700, 500 (más reciente), 500, 300, 200
        assert_eq!(
            ids(&result),
            vec![jobs[2].id, jobs[0].id, jobs[3].id, jobs[1].id, jobs[4].id]
        );

        let mut twins = vec![jobs[0].clone(), jobs[0].clone()];
        twins[0].id = Uuid::from_u128(2);
        twins[1].id = Uuid::from_u128(1);
        let sorted = JobQuery { sort: Some(Sort::Budget), ..Default::default() }.apply(twins);
        assert_eq!(ids(&sorted), vec![Uuid::from_u128(1), Uuid::from_u128(2)]);
    }

    #[test]
    fn test_distance_sort_puts_missing_last() {
        let jobs = fixture();
        let result = JobQuery { sort: Some(Sort::Distance), ..Default::default() }.apply(jobs.clone());
        assert_eq!(result[0].id, jobs[3].id);
        assert_eq!(result[1].id, jobs[0].id);
        assert!(result[2..].iter().all(|j| j.distance_miles.is_none()));
    }

    #[test]
    fn test_pickup_date_filter() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 3).unwrap();
        let query = JobQuery { pickup_date: Some(date), ..Default::default() };
        assert_eq!(query.apply(fixture()).len(), 5);

        let other = JobQuery { pickup_date: NaiveDate::from_ymd_opt(2024, 5, 4), ..Default::default() };
        assert!(other.apply(fixture()).is_empty());
    }

    #[test]
    fn test_board_query_never_shows_closed_jobs() {
        let query = JobQuery { tab: Some(Tab::All), ..Default::default() }.board();
        assert_eq!(query.tab, Some(Tab::Live));
    }
}
