use thiserror::Error;

/// Failures of the surrounding report flow: auth, configuration, data
/// retrieval and delivery. Aggregation has its own error type in
/// `crate::aggregate`.
#[derive(Debug, Error)]
pub enum ReporterError {
    #[error("failed to establish an AWS session: {0}")]
    AwsConnection(String),

    #[error("missing required configuration field: {0}")]
    ConfigFieldMissing(&'static str),

    #[error("failed to load kubeconfig: {0}")]
    Kubeconfig(#[from] kube::config::KubeconfigError),

    #[error("in-cluster configuration unavailable: {0}")]
    InClusterConfig(#[from] kube::config::InClusterError),

    #[error("failed to build kubernetes client: {0}")]
    ClientBuild(#[source] kube::Error),

    #[error("failed to retrieve cluster metrics: {0}")]
    MetricsRetrieval(String),

    #[error("failed to deliver report to Slack: {0}")]
    Delivery(String),
}
