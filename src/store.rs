//! Persistence for vital-sign events.
//!
//! `PgVitalsStore` keeps only connect options. Each operation opens its own
//! connection, uses it, and closes it again; nothing is pooled or shared
//! between requests.

use async_trait::async_trait;
use futures::future::BoxFuture;
use sqlx::postgres::PgConnectOptions;
use sqlx::types::Json;
use sqlx::{Connection, PgConnection};

use crate::config::DatabaseConfig;
use crate::error::AppError;
use crate::vitals::VitalsEvent;

/// Single-row insert. `effective_ts` is stamped by the database.
pub const INSERT_VITALS_EVENT: &str = r#"
INSERT INTO public.vitals_events (
  event_id, patient_id, loinc_code, code_display,
  value_num, unit, effective_ts, source, raw
) VALUES ($1, $2, $3, $4, $5, $6, NOW(), $7, $8)
"#;

/// Somewhere a `VitalsEvent` can be written.
#[async_trait]
pub trait VitalsStore: Send + Sync {
    /// Persist one event, returning the number of rows written.
    async fn insert(&self, event: &VitalsEvent) -> Result<u64, AppError>;
}

/// PostgreSQL store reached over the Cloud SQL Unix socket.
#[derive(Clone)]
pub struct PgVitalsStore {
    options: PgConnectOptions,
}

impl PgVitalsStore {
    pub fn new(config: &DatabaseConfig) -> Self {
        let options = PgConnectOptions::new()
            .socket(config.socket_dir())
            .username(&config.user)
            .password(&config.password)
            .database(&config.name);

        Self { options }
    }

    pub fn options(&self) -> &PgConnectOptions {
        &self.options
    }

    /// Open a connection, hand it to `work`, then close it.
    ///
    /// The connection is closed after `work` finishes on both the success and
    /// the error path. If the returned future is dropped early, dropping the
    /// connection closes the socket. A failed close is logged and does not
    /// change the outcome of `work`.
    pub async fn with_connection<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: for<'c> FnOnce(&'c mut PgConnection) -> BoxFuture<'c, Result<T, E>> + Send,
        T: Send,
        E: From<sqlx::Error> + Send,
    {
        let mut conn = PgConnection::connect_with(&self.options).await?;
        tracing::debug!(database = ?self.options.get_database(), "Opened database connection");

        let result = work(&mut conn).await;

        match conn.close().await {
            Ok(()) => tracing::debug!("Closed database connection"),
            Err(e) => tracing::warn!(error = %e, "Failed to close database connection cleanly"),
        }

        result
    }

    /// Apply the embedded schema migrations.
    ///
    /// `Migrator::run` needs a connection it can acquire for any lifetime, so
    /// this opens and closes its own connection rather than going through
    /// `with_connection`.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        let mut conn = PgConnection::connect_with(&self.options).await?;
        tracing::debug!(database = ?self.options.get_database(), "Opened database connection");

        let result = sqlx::migrate!("./migrations").run(&mut conn).await;

        match conn.close().await {
            Ok(()) => tracing::debug!("Closed database connection"),
            Err(e) => tracing::warn!(error = %e, "Failed to close database connection cleanly"),
        }

        result
    }
}

#[async_trait]
impl VitalsStore for PgVitalsStore {
    #[tracing::instrument(name = "store::insert", skip(self, event), fields(event_id = %event.event_id))]
    async fn insert(&self, event: &VitalsEvent) -> Result<u64, AppError> {
        let raw = event.raw_json()?;
        let event = event.clone();

        self.with_connection(move |conn| {
            Box::pin(async move {
                let result = sqlx::query(INSERT_VITALS_EVENT)
                    .bind(event.event_id)
                    .bind(event.patient_id)
                    .bind(event.loinc_code)
                    .bind(event.code_display)
                    .bind(event.value_num)
                    .bind(event.unit)
                    .bind(event.source)
                    .bind(Json(raw))
                    .execute(&mut *conn)
                    .await?;
                Ok(result.rows_affected())
            })
        })
        .await
    }
}
