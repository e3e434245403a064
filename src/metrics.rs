//! Metric name constants.

use std::time::Duration;

use anyhow::Context;
use metrics::describe_counter;
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::config;

pub const SESSION_REGISTERED: &str = "komorebi.session.registered"; // Counter.
pub const SESSION_LOGIN_FAILED: &str = "komorebi.session.login_failed"; // Counter.

pub const WORKS_CREATED: &str = "komorebi.works.created"; // Counter.
pub const WORKS_PUBLISHED: &str = "komorebi.works.published"; // Counter.
pub const WORKS_REPORTED: &str = "komorebi.works.reported"; // Counter.
pub const WORKS_ARCHIVED: &str = "komorebi.works.archived"; // Counter.

pub const MESSAGES_SENT: &str = "komorebi.messages.sent"; // Counter.
pub const THREADS_CREATED: &str = "komorebi.threads.created"; // Counter.
pub const FOLDERS_CREATED: &str = "komorebi.folders.created"; // Counter.

/// Must be ran exactly once on startup. This will declare all of the instruments for `metrics`.
pub fn setup(config: &Option<config::MetricConfig>) -> anyhow::Result<()> {
    describe_counter!(SESSION_REGISTERED, "The number of accounts registered.");
    describe_counter!(
        SESSION_LOGIN_FAILED,
        "The number of failed login attempts."
    );

    describe_counter!(WORKS_CREATED, "The count of works uploaded.");
    describe_counter!(
        WORKS_PUBLISHED,
        "The count of works that entered PUBLISHED status."
    );
    describe_counter!(WORKS_REPORTED, "The count of reports filed against works.");
    describe_counter!(
        WORKS_ARCHIVED,
        "The count of works archived by the report threshold."
    );

    describe_counter!(MESSAGES_SENT, "The count of messages sent.");
    describe_counter!(THREADS_CREATED, "The count of chat threads opened.");
    describe_counter!(FOLDERS_CREATED, "The count of folders created.");

    if let Some(config) = config {
        match config {
            config::MetricConfig::PrometheusPush(prometheus_config) => {
                PrometheusBuilder::new()
                    .with_push_gateway(
                        prometheus_config.url.clone(),
                        Duration::from_secs(10),
                        None,
                        None,
                    )
                    .context("failed to set up push gateway")?
                    .install()
                    .context("failed to install metrics exporter")?;
            }
        }
    }

    Ok(())
}
