use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

mod types;
mod errors;
mod config;
mod parsing;
mod aws;
mod kubernetes;
mod collector;
mod aggregate;
mod report;
mod slack;

use aggregate::aggregate_cluster_data;
use aws::ensure_aws_session;
use collector::ClusterDataCollector;
use config::{load_config, CliArgs};
use kubernetes::build_client;
use report::build_report_table;
use slack::SlackClient;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = CliArgs::parse();
    let cfg = load_config(&args)?;

    // In-cluster runs rely on the pod's service account, not an AWS session.
    if !cfg.run_local {
        ensure_aws_session(cfg.aws_profile_name.as_deref()).await?;
    }

    let client = build_client(&cfg).await?;
    let collector = ClusterDataCollector::new(&client, cfg.label_selector.as_deref());

    info!("collecting node usage and status records");
    let usage = collector.collect_node_usage().await?;
    let statuses = collector.collect_node_status().await?;
    let node_count = usage.len();
    info!(node_count, "aggregating cluster data");

    let metrics = aggregate_cluster_data(&usage, &statuses)?;
    let table = build_report_table(&metrics, node_count);

    let slack = SlackClient::new(&cfg.slack_bot_token, &cfg.slack_channel_id);
    if let Some(cluster_name) = &cfg.cluster_name {
        let title = format!("{} EKS Cluster Data", cluster_name);
        if let Err(err) = slack.send_message(&title).await {
            error!("failed to send report title: {}", err);
        }
    }
    if let Err(err) = slack.send_table_message(&table).await {
        error!("failed to send report table: {}", err);
    } else {
        info!("report delivered");
    }

    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .try_init();
}
