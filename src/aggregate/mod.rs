use thiserror::Error;
use tracing::warn;

use crate::parsing::{
    kilobytes_to_gigabytes, nanocores_to_millicores, parse_cpu_to_nanocores, parse_cpu_to_vcpus,
    parse_memory_to_kilobytes, vcpu_to_millicores, QuantityParseError,
};
use crate::types::{
    AggregateMetric, MetricValue, NodeStatusRecord, NodeUsageRecord, ResourceUnit,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregationError {
    #[error("cannot aggregate cluster data: {0} is zero")]
    DivisionByZero(&'static str),
    #[error("node {node}: {source}")]
    Quantity {
        node: String,
        source: QuantityParseError,
    },
}

#[derive(Debug, Default, Clone, Copy)]
struct ResourceTotals {
    cpu_millicores: f64,
    memory_gigabytes: f64,
}

/// Aggregate per-node usage and status records into the seven fixed report
/// rows: Capacity, Usage, Nodes Usage % (Out of Allocatable), Node Usage %
/// (Out of Capacity), Average Node Usage, Allocatable, Allocatable %.
///
/// Node counts across the two collections are expected to match; a mismatch
/// (e.g. a node joining between the two list calls) is logged and the
/// aggregation proceeds over what is present.
pub fn aggregate_cluster_data(
    usage: &[NodeUsageRecord],
    statuses: &[NodeStatusRecord],
) -> Result<Vec<AggregateMetric>, AggregationError> {
    let node_count = usage.len();
    if node_count == 0 {
        return Err(AggregationError::DivisionByZero("node count"));
    }
    if usage.len() != statuses.len() {
        warn!(
            usage_nodes = usage.len(),
            status_nodes = statuses.len(),
            "node counts differ between metrics and status sources; aggregates may be skewed"
        );
    }

    let total_usage = sum_usage(usage)?;
    let total_allocatable = sum_resources(statuses, |s| &s.allocatable)?;
    let total_capacity = sum_resources(statuses, |s| &s.capacity)?;

    let average_usage = ResourceTotals {
        cpu_millicores: total_usage.cpu_millicores / node_count as f64,
        memory_gigabytes: total_usage.memory_gigabytes / node_count as f64,
    };

    let usage_of_capacity = percentages(&total_usage, &total_capacity);
    let allocatable_of_capacity = percentages(&total_allocatable, &total_capacity);
    let usage_of_allocatable = percentages(&total_usage, &total_allocatable);

    Ok(vec![
        absolute_row(
            "Capacity",
            &total_capacity,
            "Computing resources available for running workloads",
        ),
        absolute_row(
            "Usage",
            &total_usage,
            "Real-time resource utilization statistics",
        ),
        percentage_row(
            "Nodes Usage % (Out of Allocatable)",
            usage_of_allocatable,
            "Nodes usage out of allocatable",
        ),
        percentage_row(
            "Node Usage % (Out of Capacity)",
            usage_of_capacity,
            "Node Usage out of total capacity",
        ),
        absolute_row("Average Node Usage", &average_usage, "Average usage per node"),
        absolute_row(
            "Allocatable",
            &total_allocatable,
            "Total capacity that can be utilized by Pods",
        ),
        percentage_row(
            "Allocatable %",
            allocatable_of_capacity,
            "Allocatable out of total capacity",
        ),
    ])
}

fn sum_usage(usage: &[NodeUsageRecord]) -> Result<ResourceTotals, AggregationError> {
    let mut cpu_nanocores: i64 = 0;
    let mut memory_kilobytes: i64 = 0;
    for record in usage {
        cpu_nanocores += parse_cpu_to_nanocores(&record.cpu).map_err(|source| {
            AggregationError::Quantity {
                node: record.name.clone(),
                source,
            }
        })?;
        memory_kilobytes += parse_memory_to_kilobytes(&record.memory).map_err(|source| {
            AggregationError::Quantity {
                node: record.name.clone(),
                source,
            }
        })?;
    }
    Ok(ResourceTotals {
        cpu_millicores: nanocores_to_millicores(cpu_nanocores),
        memory_gigabytes: kilobytes_to_gigabytes(memory_kilobytes),
    })
}

fn sum_resources<'a, F>(
    statuses: &'a [NodeStatusRecord],
    select: F,
) -> Result<ResourceTotals, AggregationError>
where
    F: Fn(&'a NodeStatusRecord) -> &'a crate::types::NodeResources,
{
    let mut vcpus: f64 = 0.0;
    let mut memory_kilobytes: i64 = 0;
    for status in statuses {
        let resources = select(status);
        vcpus += parse_cpu_to_vcpus(&resources.cpu).map_err(|source| {
            AggregationError::Quantity {
                node: status.name.clone(),
                source,
            }
        })?;
        memory_kilobytes += parse_memory_to_kilobytes(&resources.memory).map_err(|source| {
            AggregationError::Quantity {
                node: status.name.clone(),
                source,
            }
        })?;
    }
    Ok(ResourceTotals {
        cpu_millicores: vcpu_to_millicores(vcpus) as f64,
        memory_gigabytes: kilobytes_to_gigabytes(memory_kilobytes),
    })
}

/// Percentage pair over a denominator that may legitimately be zero (empty
/// selector match, nodes without reported capacity). Zero denominators give
/// `None` so the report shows an explicit marker instead of a numeric fault.
fn percentages(
    numerator: &ResourceTotals,
    denominator: &ResourceTotals,
) -> (Option<f64>, Option<f64>) {
    let cpu = if denominator.cpu_millicores == 0.0 {
        None
    } else {
        Some(numerator.cpu_millicores / denominator.cpu_millicores * 100.0)
    };
    let memory = if denominator.memory_gigabytes == 0.0 {
        None
    } else {
        Some(numerator.memory_gigabytes / denominator.memory_gigabytes * 100.0)
    };
    (cpu, memory)
}

fn absolute_row(name: &str, totals: &ResourceTotals, description: &str) -> AggregateMetric {
    AggregateMetric {
        name: name.to_string(),
        cpu: MetricValue::new(totals.cpu_millicores, ResourceUnit::Millicores),
        memory: MetricValue::new(totals.memory_gigabytes, ResourceUnit::Gigabytes),
        description: description.to_string(),
    }
}

fn percentage_row(
    name: &str,
    (cpu, memory): (Option<f64>, Option<f64>),
    description: &str,
) -> AggregateMetric {
    AggregateMetric {
        name: name.to_string(),
        cpu: MetricValue {
            value: cpu,
            unit: ResourceUnit::Percent,
        },
        memory: MetricValue {
            value: memory,
            unit: ResourceUnit::Percent,
        },
        description: description.to_string(),
    }
}
