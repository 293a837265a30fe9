//! Periodic expiry of lapsed vendor subscriptions.
//!
//! Active subscriptions whose `ends_at` has passed are flipped to `expired`.
//! Subscribing again expires the vendor's own lapsed row immediately, so this
//! sweep only keeps listings and reports current.

use std::time::Duration;

use marketplace_db::repositories::SubscriptionRepo;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

/// Run the expiry loop every `every` until `cancel` is triggered.
///
/// The first tick fires immediately, so anything that lapsed while the
/// server was down is expired at startup.
pub async fn run(pool: PgPool, every: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = every.as_secs(), "Subscription expiry job started");

    let mut interval = tokio::time::interval(every);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Subscription expiry job stopping");
                break;
            }
            _ = interval.tick() => {
                match SubscriptionRepo::expire_lapsed(&pool).await {
                    Ok(0) => tracing::debug!("Subscription expiry: nothing lapsed"),
                    Ok(expired) => {
                        tracing::info!(expired, "Subscription expiry: marked lapsed subscriptions");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Subscription expiry: sweep failed");
                    }
                }
            }
        }
    }
}
