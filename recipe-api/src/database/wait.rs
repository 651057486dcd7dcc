use std::{fmt::Display, future::Future, time::Duration};

/// Calls `connect` until it succeeds, sleeping `interval` between attempts.
/// Gives up after `attempts` tries (at least one) and returns the last error.
pub async fn wait_for_db<T, E, F, Fut>(
    attempts: u32,
    interval: Duration,
    mut connect: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let attempts = attempts.max(1);
    let mut attempt = 1;

    info!("Waiting for database...");
    loop {
        match connect().await {
            Ok(connection) => {
                info!("Database available after {attempt} attempt(s).");
                return Ok(connection);
            }
            Err(e) if attempt < attempts => {
                warn!("Database unavailable ({attempt}/{attempts}), waiting {interval:?}: {e}");
                rocket::tokio::time::sleep(interval).await;
                attempt += 1;
            }
            Err(e) => {
                error!("Database still unavailable after {attempts} attempt(s): {e}");
                return Err(e);
            }
        }
    }
}
