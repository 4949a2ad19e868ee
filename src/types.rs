use std::fmt;

/// Resolved runtime configuration: CLI flags merged with Slack credentials
/// from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub aws_profile_name: Option<String>,
    pub label_selector: Option<String>,
    pub config_file: Option<String>,
    pub context: Option<String>,
    pub cluster_name: Option<String>,
    pub run_local: bool,
    pub slack_bot_token: String,
    pub slack_channel_id: String,
}

/// Instantaneous per-node usage as reported by the metrics.k8s.io API.
/// Quantities are kept as raw strings until the aggregator parses them.
#[derive(Debug, Clone)]
pub struct NodeUsageRecord {
    pub name: String,
    pub cpu: String,
    pub memory: String,
}

/// Raw cpu/memory quantity strings from a node status block.
#[derive(Debug, Clone, Default)]
pub struct NodeResources {
    pub cpu: String,
    pub memory: String,
}

/// Static per-node properties from the core node API.
#[derive(Debug, Clone)]
pub struct NodeStatusRecord {
    pub name: String,
    pub allocatable: NodeResources,
    pub capacity: NodeResources,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceUnit {
    Millicores,
    Gigabytes,
    Percent,
}

impl fmt::Display for ResourceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceUnit::Millicores => write!(f, "m"),
            ResourceUnit::Gigabytes => write!(f, "gi"),
            ResourceUnit::Percent => write!(f, "%"),
        }
    }
}

/// A single numeric cell of the report. `None` marks a value that could not
/// be derived (e.g. a percentage over a zero denominator).
#[derive(Debug, Clone, PartialEq)]
pub struct MetricValue {
    pub value: Option<f64>,
    pub unit: ResourceUnit,
}

impl MetricValue {
    pub fn new(value: f64, unit: ResourceUnit) -> Self {
        Self {
            value: Some(value),
            unit,
        }
    }

    pub fn unavailable(unit: ResourceUnit) -> Self {
        Self { value: None, unit }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Some(v) => {
                // Round to 3 decimals, drop trailing zeros.
                let rounded = format!("{:.3}", v);
                let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
                write!(f, "{} {}", trimmed, self.unit)
            }
            None => write!(f, "n/a"),
        }
    }
}

/// One named row of the aggregated cluster report.
#[derive(Debug, Clone)]
pub struct AggregateMetric {
    pub name: String,
    pub cpu: MetricValue,
    pub memory: MetricValue,
    pub description: String,
}

/// The headers/rows/footnote triple handed to the report sink.
#[derive(Debug, Clone)]
pub struct TableMessage {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub footnote: Option<String>,
}
