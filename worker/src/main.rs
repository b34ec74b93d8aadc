use anyhow::Result;
use application::usecases::{
    handle_expired_subscriptions::HandleExpiredSubscriptionsUseCase,
    payment_reconciliation::PaymentReconciliationUseCase,
};
use domain::repositories::{
    expiry_notifications::ExpiryNotifier, payments::PaymentRepository, plans::PlanRepository,
    subscriptions::SubscriptionRepository,
};
use infra::{
    notifications::webhook::{NoopExpiryNotifier, WebhookExpiryNotifier},
    postgres::{
        postgres_connection,
        repositories::{
            payments::PaymentPostgres, plans::PlanPostgres, subscriptions::SubscriptionPostgres,
        },
    },
};
use std::sync::Arc;
use tracing::{error, info, warn};
use url::Url;
use worker::{axum_http, config, services};

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(error) = run().await {
        error!("Worker exited with error: {}", error);
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    observability::init_observability("worker")?;

    let dotenvy_env = Arc::new(config::config_loader::load()?);
    info!("ENV has been loaded");

    let postgres_pool = postgres_connection::establish_connection(&dotenvy_env.database.url)?;
    info!("Postgres connection has been established");

    let db_pool_arc = Arc::new(postgres_pool);

    // Repositories share the DB pool.
    let subscription_repository: Arc<dyn SubscriptionRepository + Send + Sync> =
        Arc::new(SubscriptionPostgres::new(Arc::clone(&db_pool_arc)));
    let plan_repository: Arc<dyn PlanRepository + Send + Sync> =
        Arc::new(PlanPostgres::new(Arc::clone(&db_pool_arc)));
    let payment_repository: Arc<dyn PaymentRepository + Send + Sync> =
        Arc::new(PaymentPostgres::new(Arc::clone(&db_pool_arc)));

    let notifier: Arc<dyn ExpiryNotifier + Send + Sync> =
        match dotenvy_env.expiry.reminder_webhook_url.as_deref() {
            Some(raw) => match Url::parse(raw) {
                Ok(url) => Arc::new(WebhookExpiryNotifier::new(url)),
                Err(err) => {
                    // Keep the raw URL out of logs; it may embed a secret.
                    warn!(
                        error = %err,
                        "REMINDER_WEBHOOK_URL is invalid; renewal reminders disabled"
                    );
                    Arc::new(NoopExpiryNotifier)
                }
            },
            None => Arc::new(NoopExpiryNotifier),
        };

    let expiry_usecase = Arc::new(HandleExpiredSubscriptionsUseCase::new(
        Arc::clone(&subscription_repository),
        Arc::clone(&plan_repository),
        notifier,
    ));

    let reconciliation_usecase = Arc::new(PaymentReconciliationUseCase::new(
        payment_repository,
        plan_repository,
        subscription_repository,
    ));

    info!("Worker started");

    let loop_usecase = Arc::clone(&expiry_usecase);
    let expiry_config = dotenvy_env.expiry.clone();
    let expiry_loop = tokio::spawn(services::expiry_loop::run_expiry_loop(
        loop_usecase,
        expiry_config,
    ));

    let server_config = Arc::clone(&dotenvy_env);
    let http_server = tokio::spawn(async move {
        axum_http::http_serve::start(server_config, expiry_usecase, reconciliation_usecase).await
    });

    tokio::select! {
        result = expiry_loop => result??,
        result = http_server => result??,
    };

    Ok(())
}
