use anyhow::{Context, Result};

use super::config_model::{Audit, Database, DotEnvyConfig, Expiry, Internal, WorkerServer};

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let worker_server = WorkerServer {
        port: std::env::var("SERVER_PORT_WORKER")
            .expect("SERVER_PORT_WORKER is invalid")
            .parse()?,
        body_limit: std::env::var("SERVER_BODY_LIMIT")
            .expect("SERVER_BODY_LIMIT is invalid")
            .parse()?,
        timeout: std::env::var("SERVER_TIMEOUT")
            .expect("SERVER_TIMEOUT is invalid")
            .parse()?,
    };

    let database = Database {
        url: std::env::var("DATABASE_URL").expect("DATABASE_URL is invalid"),
    };

    let internal = Internal {
        token: std::env::var("INTERNAL_WORKER_TOKEN").ok().and_then(|v| {
            let trimmed = v.trim().to_string();
            (!trimmed.is_empty()).then_some(trimmed)
        }),
    };

    let expiry = Expiry {
        run_interval_secs: std::env::var("EXPIRY_RUN_INTERVAL_SECS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse()
            .context("EXPIRY_RUN_INTERVAL_SECS is invalid")?,
        notify: std::env::var("EXPIRY_NOTIFY_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse()
            .context("EXPIRY_NOTIFY_ENABLED is invalid")?,
        reminder_webhook_url: std::env::var("REMINDER_WEBHOOK_URL").ok().and_then(|v| {
            let trimmed = v.trim().to_string();
            (!trimmed.is_empty()).then_some(trimmed)
        }),
    };

    let audit = Audit {
        default_lookback_hours: std::env::var("PAYMENTS_AUDIT_LOOKBACK_HOURS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(24),
    };

    Ok(DotEnvyConfig {
        worker_server,
        database,
        internal,
        expiry,
        audit,
    })
}
