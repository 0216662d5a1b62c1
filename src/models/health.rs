use serde::Serialize;
use chrono::{DateTime, Utc};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// "ok" ou "unavailable" selon le ping de la base
    pub database: &'static str,
    pub time: DateTime<Utc>,
}
