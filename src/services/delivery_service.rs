//! Servicio de entregas
//!
//! Flujo del conductor: recogida, entrega con prueba de entrega (firma,
//! nombre del receptor y fotos) y aviso de retraso por chat.

use chrono::Utc;
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::cache::JobBoardCache;
use crate::clients::storage_client::{decode_image, DecodedImage, PhotoStorage};
use crate::models::auth::{AuthUser, Role};
use crate::models::bid::BidStatus;
use crate::models::job::{Job, JobStatus, ProofOfDelivery, StatusChange};
use crate::repositories::{BidRepository, Repositories};
use crate::services::chat_link::build_chat_link;
use crate::services::job_service::JobService;
use crate::utils::errors::{forbidden_error, validation_error, AppError, AppResult};

/// Datos de entrega tal como llegan del móvil (imágenes en base64)
#[derive(Debug, Clone)]
pub struct DeliveryConfirmation {
    pub recipient_name: String,
    pub signature: String,
    pub photos: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DelayReport {
    pub reason: String,
    pub eta_minutes: Option<u32>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DelayNotice {
    pub job_id: Uuid,
    pub message: String,
    pub chat_link: String,
}

pub struct DeliveryService {
    jobs: JobService,
    bids: Arc<dyn BidRepository>,
    storage: Arc<dyn PhotoStorage>,
    dispatch_phone: Option<String>,
}

impl DeliveryService {
    pub fn new(
        repos: &Repositories,
        board_cache: Option<JobBoardCache>,
        storage: Arc<dyn PhotoStorage>,
        dispatch_phone: Option<String>,
    ) -> Self {
        Self {
            jobs: JobService::new(repos, board_cache),
            bids: repos.bids.clone(),
            storage,
            dispatch_phone,
        }
    }

    /// Admin y operadores móviles actúan sobre cualquier job; un conductor
    /// solo sobre los asignados a su empresa
    async fn ensure_carrier(&self, user: &AuthUser, job: &Job, operation: &str) -> AppResult<()> {
        if matches!(user.role, Role::Admin | Role::Mobile) || job.is_owned_by(user.company_id) {
            return Ok(());
        }

        let carrier = self
            .bids
            .list_by_job(job.id)
            .await?
            .into_iter()
            .find(|bid| bid.status == BidStatus::Accepted)
            .map(|bid| bid.bidder_company_id);

        if carrier.is_some() && carrier == user.company_id {
            Ok(())
        } else {
            Err(forbidden_error(operation, "this job is not assigned to your company"))
        }
    }

    pub async fn pickup(&self, user: &AuthUser, job_id: Uuid, vehicle_type: Option<String>) -> AppResult<Job> {
        let job = self.jobs.get(job_id).await?;
        self.ensure_carrier(user, &job, "mark pickup").await?;

        let mut change = StatusChange::to(JobStatus::InTransit);
        change.assigned_vehicle_type = vehicle_type
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .or_else(|| Some(job.vehicle_type.clone()));

        let job = self.jobs.transition(&job, change).await?;
        info!(job_id = %job.id, "🚚 Carga recogida en {}", job.pickup_location);
        Ok(job)
    }

    /// Completa la entrega; firma y nombre del receptor son obligatorios
    pub async fn complete(&self, user: &AuthUser, job_id: Uuid, confirmation: DeliveryConfirmation) -> AppResult<Job> {
        let recipient_name = confirmation.recipient_name.trim().to_string();
        if recipient_name.is_empty() {
            return Err(validation_error("recipient_name", "Recipient name is required"));
        }
        if confirmation.signature.trim().is_empty() {
            return Err(validation_error("signature", "A signature is required"));
        }

        let job = self.jobs.get(job_id).await?;
        self.ensure_carrier(user, &job, "complete delivery").await?;
        // Antes de subir nada, para no dejar objetos huérfanos
        if !job.status.can_transition_to(JobStatus::Completed) {
            return Err(AppError::Conflict(format!(
                "Job cannot move from {} to {}",
                job.status,
                JobStatus::Completed
            )));
        }

        if confirmation.photos.is_empty() {
            warn!(job_id = %job_id, "⚠️ Entrega sin fotos");
        }

        let signature = decode_image("signature", &confirmation.signature)?;
        let photos = confirmation
            .photos
            .iter()
            .map(|raw| decode_image("photos", raw))
            .collect::<AppResult<Vec<_>>>()?;

        let stamp = Utc::now().timestamp_millis();
        let signature_url = self
            .upload(format!("{}/signature-{}.{}", job_id, stamp, signature.extension), signature)
            .await?;

        let uploads = photos.into_iter().enumerate().map(|(i, photo)| {
            let path = format!("{}/photo-{}-{}.{}", job_id, stamp, i + 1, photo.extension);
            self.upload(path, photo)
        });
        let photo_urls = join_all(uploads).await.into_iter().collect::<AppResult<Vec<_>>>()?;

        let mut change = StatusChange::to(JobStatus::Completed);
        change.proof = Some(ProofOfDelivery {
            recipient_name,
            signature_url,
            photo_urls,
            delivered_at: Utc::now(),
        });

        let job = self.jobs.transition(&job, change).await?;
        info!(
            job_id = %job.id,
            photos = job.photo_urls.len(),
            "✅ Entrega completada en {}",
            job.delivery_location
        );
        Ok(job)
    }

    async fn upload(&self, path: String, image: DecodedImage) -> AppResult<String> {
        self.storage.upload(&path, &image.content_type, image.bytes).await
    }

    /// Prepara el aviso de retraso como enlace de chat
    pub async fn report_delay(&self, user: &AuthUser, job_id: Uuid, report: DelayReport) -> AppResult<DelayNotice> {
        let reason = report.reason.trim();
        if reason.is_empty() {
            return Err(validation_error("reason", "A reason for the delay is required"));
        }

        let job = self.jobs.get(job_id).await?;
        self.ensure_carrier(user, &job, "report delay").await?;
        if !matches!(job.status, JobStatus::Assigned | JobStatus::InTransit) {
            return Err(AppError::Conflict(format!("Job is {}; delays apply to active jobs", job.status)));
        }

        let phone = report
            .phone
            .or_else(|| self.dispatch_phone.clone())
            .ok_or_else(|| AppError::BadRequest("No dispatch phone configured".to_string()))?;

        let mut message = format!(
            "Delay on job {} ({} to {}): {}.",
            short_id(job.id),
            job.pickup_location,
            job.delivery_location,
            reason
        );
        if let Some(minutes) = report.eta_minutes {
            message.push_str(&format!(" New ETA in {} minutes.", minutes));
        }

        let chat_link = build_chat_link(&phone, &message)?;
        info!(job_id = %job.id, "⏰ Retraso notificado: {}", reason);

        Ok(DelayNotice { job_id: job.id, message, chat_link })
    }
}

fn short_id(id: Uuid) -> String {
    id.simple().to_string()[..8].to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::MemoryPhotoStorage;
    use crate::models::job::NewJob;
    use chrono::Duration;
    use rust_decimal::Decimal;

    const PNG: &str = "data:image/png;base64,aGVsbG8=";

    struct Fixture {
        service: DeliveryService,
        storage: MemoryPhotoStorage,
        driver: AuthUser,
        job: Job,
    }

    async fn in_transit_fixture() -> Fixture {
        let repos = Repositories::memory();
        let storage = MemoryPhotoStorage::new();
        let service = DeliveryService::new(
            &repos,
            None,
            Arc::new(storage.clone()),
            Some("+44 7700 900123".to_string()),
        );

        let job = NewJob {
            company_id: Uuid::new_v4(),
            pickup_location: "Bristol".to_string(),
            pickup_postcode: None,
            pickup_city: None,
            delivery_location: "Cardiff".to_string(),
            delivery_postcode: None,
            delivery_city: None,
            pickup_at: Utc::now() + Duration::hours(3),
            delivery_at: None,
            status: JobStatus::Open,
            budget: Decimal::from(300),
            vehicle_type: "lwb_van".to_string(),
            weight_kg: None,
            pallets: None,
            dimensions: None,
            load_details: None,
            load_type: None,
            distance_miles: None,
        }
        .into_job(Utc::now());
        let job = repos.jobs.insert(job).await.unwrap();
        let job = repos
            .jobs
            .change_status(job.id, StatusChange::to(JobStatus::Assigned))
            .await
            .unwrap()
            .unwrap();

        let driver = AuthUser {
            user_id: Uuid::new_v4(),
            session_id: Uuid::new_v4(),
            email: "driver@example.com".to_string(),
            role: Role::Mobile,
            company_id: None,
        };
        let job = service.pickup(&driver, job.id, None).await.unwrap();

        Fixture { service, storage, driver, job }
    }

    #[tokio::test]
    async fn test_pickup_records_vehicle() {
        let f = in_transit_fixture().await;
        assert_eq!(f.job.status, JobStatus::InTransit);
        assert_eq!(f.job.assigned_vehicle_type.as_deref(), Some("lwb_van"));
    }

    #[tokio::test]
    async fn test_delivery_requires_signature_and_recipient() {
        let f = in_transit_fixture().await;

        let missing_signature = DeliveryConfirmation {
            recipient_name: "J. Smith".to_string(),
            signature: String::new(),
            photos: vec![PNG.to_string()],
        };
        let err = f.service.complete(&f.driver, f.job.id, missing_signature).await.unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");

        let missing_name = DeliveryConfirmation {
            recipient_name: "  ".to_string(),
            signature: PNG.to_string(),
            photos: Vec::new(),
        };
        let err = f.service.complete(&f.driver, f.job.id, missing_name).await.unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert_eq!(f.storage.object_count().await, 0);
    }

    #[tokio::test]
    async fn test_delivery_uploads_and_stamps() {
        let f = in_transit_fixture().await;
        let confirmation = DeliveryConfirmation {
            recipient_name: "J. Smith".to_string(),
            signature: PNG.to_string(),
            photos: vec![PNG.to_string(), "aGVsbG8=".to_string()],
        };

        let job = f.service.complete(&f.driver, f.job.id, confirmation.clone()).await.unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert!(job.delivered_at.is_some());
        assert_eq!(job.recipient_name.as_deref(), Some("J. Smith"));
        assert_eq!(job.photo_urls.len(), 2);
        assert_eq!(f.storage.object_count().await, 3);

        // Segunda entrega: conflicto, sin subir nada más
        let err = f.service.complete(&f.driver, f.job.id, confirmation).await.unwrap_err();
        assert_eq!(err.code(), "CONFLICT");
        assert_eq!(f.storage.object_count().await, 3);
    }

    #[tokio::test]
    async fn test_unassigned_driver_forbidden() {
        let f = in_transit_fixture().await;
        let stranger = AuthUser {
            role: Role::Driver,
            company_id: Some(Uuid::new_v4()),
            ..f.driver.clone()
        };
        let confirmation = DeliveryConfirmation {
            recipient_name: "J. Smith".to_string(),
            signature: PNG.to_string(),
            photos: Vec::new(),
        };
        let err = f.service.complete(&stranger, f.job.id, confirmation).await.unwrap_err();
        assert_eq!(err.code(), "FORBIDDEN");
    }

    #[tokio::test]
    async fn test_delay_builds_chat_link() {
        let f = in_transit_fixture().await;
        let notice = f
            .service
            .report_delay(
                &f.driver,
                f.job.id,
                DelayReport {
                    reason: "Traffic on M4".to_string(),
                    eta_minutes: Some(20),
                    phone: None,
                },
            )
            .await
            .unwrap();

        assert!(notice.chat_link.starts_with("https://wa.me/447700900123?text="));
        assert!(notice.message.contains("Bristol to Cardiff"));
        assert!(notice.message.contains("20 minutes"));
    }
}
