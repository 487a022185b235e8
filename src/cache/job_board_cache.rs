//! Snapshot cacheado de la bolsa de cargas pública
//!
//! Cada consulta se guarda bajo `board:{generación}:{md5(query)}` durante el
//! intervalo de refresco. Cualquier escritura sobre jobs incrementa la
//! generación, lo que invalida de golpe todos los snapshots anteriores.
//!
//! La clave se resuelve una sola vez por consulta: la lectura y el guardado
//! posterior usan la misma generación, así un listado hecho antes de una
//! escritura nunca acaba guardado bajo la generación nueva.

use tracing::{debug, warn};

use super::{CacheOperations, RedisClient};
use crate::models::job::Job;
use crate::services::job_query::JobQuery;

/// Clave de snapshot fijada a la generación vigente al consultar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSnapshotKey(String);

#[derive(Clone)]
pub struct JobBoardCache {
    redis: RedisClient,
}

impl JobBoardCache {
    pub fn new(redis: RedisClient) -> Self {
        Self { redis }
    }

    fn generation_key(&self) -> String {
        self.redis.make_key("board", "generation")
    }

    pub async fn snapshot_key(&self, query: &JobQuery) -> BoardSnapshotKey {
        let generation = self.redis.counter(&self.generation_key()).await;
        BoardSnapshotKey(self.redis.make_key("board", &snapshot_suffix(generation, query)))
    }

    pub async fn get(&self, key: &BoardSnapshotKey) -> Option<Vec<Job>> {
        match self.redis.get::<Vec<Job>>(&key.0).await {
            Ok(jobs) => jobs,
            Err(e) => {
                warn!("⚠️ Snapshot de bolsa ilegible ({}): {}", key.0, e);
                None
            }
        }
    }

    pub async fn put(&self, key: &BoardSnapshotKey, jobs: &[Job]) {
        if let Err(e) = self.redis.set(&key.0, &jobs, self.redis.default_ttl()).await {
            warn!("⚠️ No se pudo cachear la bolsa de cargas: {}", e);
        }
    }

    pub async fn invalidate(&self) {
        match self.redis.incr(&self.generation_key()).await {
            Ok(generation) => debug!("🧹 Bolsa de cargas invalidada (generación {})", generation),
            Err(e) => warn!("⚠️ No se pudo invalidar la bolsa de cargas: {}", e),
        }
    }
}

fn snapshot_suffix(generation: i64, query: &JobQuery) -> String {
    format!("{}:{}", generation, query_fingerprint(query))
}

/// Huella estable de una consulta
pub fn query_fingerprint(query: &JobQuery) -> String {
    let canonical = serde_json::to_string(query).unwrap_or_default();
    format!("{:x}", md5::compute(canonical.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::job_query::Sort;

    #[test]
    fn test_fingerprint_depends_on_query() {
        let newest = JobQuery::default();
        let by_budget = JobQuery {
            sort: Some(Sort::Budget),
            ..JobQuery::default()
        };

        assert_eq!(query_fingerprint(&newest), query_fingerprint(&JobQuery::default()));
        assert_ne!(query_fingerprint(&newest), query_fingerprint(&by_budget));
        assert_eq!(query_fingerprint(&newest).len(), 32);
    }

    #[test]
    fn test_snapshot_suffix_pins_generation() {
        let query = JobQuery::default();
        let before_write = snapshot_suffix(7, &query);
        let after_write = snapshot_suffix(8, &query);

        assert!(before_write.starts_with("7:"));
        assert_ne!(before_write, after_write);
        assert_eq!(before_write, snapshot_suffix(7, &query));
    }
}
