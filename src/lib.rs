// Public modules
pub mod types;
pub mod errors;
pub mod config;
pub mod parsing;
pub mod aws;
pub mod kubernetes;
pub mod collector;
pub mod aggregate;
pub mod report;
pub mod slack;

// Re-export commonly used items
pub use types::*;
pub use errors::ReporterError;
pub use config::{load_config, load_config_with_env, CliArgs, EnvironmentProvider, SystemEnvironment, MockEnvironment};
pub use parsing::{
    parse_cpu_to_nanocores, parse_cpu_to_vcpus, parse_memory_to_kilobytes,
    kilobytes_to_gigabytes, nanocores_to_millicores, vcpu_to_millicores, QuantityParseError,
};
pub use aws::ensure_aws_session;
pub use kubernetes::build_client;
pub use collector::ClusterDataCollector;
pub use aggregate::{aggregate_cluster_data, AggregationError};
pub use report::build_report_table;
pub use slack::{render_markdown_table, SlackClient};
