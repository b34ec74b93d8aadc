use anyhow::Result;
use application::usecases::handle_expired_subscriptions::{
    HandleExpiredSubscriptionsParams, HandleExpiredSubscriptionsUseCase,
};
use std::{sync::Arc, time::Duration};
use tracing::{error, info};

use crate::config::config_model::Expiry;

/// Periodic expiry sweep. A failed iteration is logged and the loop keeps
/// going; the next tick retries from scratch.
pub async fn run_expiry_loop(
    usecase: Arc<HandleExpiredSubscriptionsUseCase>,
    config: Expiry,
) -> Result<()> {
    info!(
        run_interval_secs = config.run_interval_secs,
        notify = config.notify,
        "expiry_loop: started"
    );

    loop {
        let params = HandleExpiredSubscriptionsParams {
            notify: config.notify,
            limit: None,
        };

        match usecase.run(params).await {
            Ok(result) => {
                info!(
                    total = result.total,
                    downgraded = result.downgraded,
                    failed = result.failed,
                    notified = result.notified,
                    notify_failed = result.notify_failed,
                    "expiry_loop: run completed"
                );
            }
            Err(err) => {
                error!("expiry_loop: run failed: {}", err);
            }
        }

        tokio::time::sleep(Duration::from_secs(config.run_interval_secs.max(1))).await;
    }
}
