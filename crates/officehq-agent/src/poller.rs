//! Background status poller.
//!
//! Runs on its own task and never blocks the frame loop. Each result
//! overwrites the previous one on a `watch` channel, so the scene only ever
//! sees the latest status. Failed polls are logged at debug and dropped;
//! the next attempt happens on the normal schedule.

use std::time::Duration;

use officehq_logic::status::{Status, StatusBody};
use reqwest::header::CACHE_CONTROL;
use reqwest::Client;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

pub struct StatusPoller {
    client: Client,
    url: String,
    period: Duration,
}

impl StatusPoller {
    pub fn new(url: impl Into<String>, period: Duration, timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
            period,
        })
    }

    /// One GET against the status endpoint.
    pub async fn fetch(&self) -> reqwest::Result<Status> {
        let body: StatusBody = self
            .client
            .get(&self.url)
            .header(CACHE_CONTROL, "no-store")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(Status::from_body(&body))
    }

    /// Poll forever, publishing each successful result. Returns once every
    /// receiver has been dropped.
    pub async fn run(self, tx: watch::Sender<Option<Status>>) {
        info!(url = %self.url, period = ?self.period, "status poller started");
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match self.fetch().await {
                Ok(status) => {
                    if tx.send(Some(status)).is_err() {
                        debug!("status receiver gone, poller exiting");
                        return;
                    }
                }
                Err(e) => debug!(error = %e, "status poll failed"),
            }
        }
    }
}
