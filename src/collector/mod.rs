use k8s_openapi::api::core::v1::Node;
use kube::core::Request as ApiRequest;
use kube::{api::ListParams, Api, Client};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::warn;

use crate::errors::ReporterError;
use crate::types::{NodeResources, NodeStatusRecord, NodeUsageRecord};

/// Fetches the raw per-node records the aggregator consumes: instantaneous
/// usage from metrics.k8s.io and allocatable/capacity from the node API.
pub struct ClusterDataCollector<'a> {
    client: &'a Client,
    label_selector: Option<&'a str>,
}

// The metrics API has no typed binding, so usage comes back as loose JSON.
#[derive(Debug, Deserialize)]
struct NodeMetricsItem {
    metadata: serde_json::Value,
    usage: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct NodeMetricsList {
    items: Vec<NodeMetricsItem>,
}

impl<'a> ClusterDataCollector<'a> {
    pub fn new(client: &'a Client, label_selector: Option<&'a str>) -> Self {
        Self {
            client,
            label_selector,
        }
    }

    /// One usage record per node, via GET /apis/metrics.k8s.io/v1beta1/nodes.
    pub async fn collect_node_usage(&self) -> Result<Vec<NodeUsageRecord>, ReporterError> {
        let req = node_metrics_request(self.label_selector)?;
        let list: NodeMetricsList = self
            .client
            .request(req)
            .await
            .map_err(|e| ReporterError::MetricsRetrieval(format!("list node metrics: {}", e)))?;

        Ok(usage_records_from_items(list.items))
    }

    /// One status record per node, via the typed node API.
    pub async fn collect_node_status(&self) -> Result<Vec<NodeStatusRecord>, ReporterError> {
        let node_api: Api<Node> = Api::all(self.client.clone());
        let nodes = node_api
            .list(&list_params(self.label_selector))
            .await
            .map_err(|e| ReporterError::MetricsRetrieval(format!("list nodes: {}", e)))?;

        Ok(status_records_from_nodes(nodes.items))
    }
}

fn list_params(label_selector: Option<&str>) -> ListParams {
    match label_selector {
        Some(selector) if !selector.is_empty() => ListParams::default().labels(selector),
        _ => ListParams::default(),
    }
}

/// Build the metrics list request through the kube request builder so the
/// label selector is query-encoded the same way the typed node list encodes
/// it (set-based selectors carry spaces and parentheses).
fn node_metrics_request(
    label_selector: Option<&str>,
) -> Result<http::Request<Vec<u8>>, ReporterError> {
    ApiRequest::new("/apis/metrics.k8s.io/v1beta1/nodes")
        .list(&list_params(label_selector))
        .map_err(|e| ReporterError::MetricsRetrieval(format!("build request: {}", e)))
}

fn usage_records_from_items(items: Vec<NodeMetricsItem>) -> Vec<NodeUsageRecord> {
    let mut records = Vec::with_capacity(items.len());
    for item in items {
        let name = item
            .metadata
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();
        if name.is_empty() {
            continue;
        }
        let cpu = item.usage.get("cpu").cloned().unwrap_or_else(|| "0".to_string());
        let memory = item
            .usage
            .get("memory")
            .cloned()
            .unwrap_or_else(|| "0".to_string());
        records.push(NodeUsageRecord { name, cpu, memory });
    }
    records
}

fn status_records_from_nodes(nodes: Vec<Node>) -> Vec<NodeStatusRecord> {
    let mut records = Vec::with_capacity(nodes.len());
    for node in nodes {
        let name = match node.metadata.name.as_ref() {
            Some(n) => n.clone(),
            None => continue,
        };
        let status = match node.status {
            Some(s) => s,
            None => {
                warn!(node = %name, "node has no status block, skipping");
                continue;
            }
        };
        let allocatable = extract_resources(status.allocatable.as_ref());
        let capacity = extract_resources(status.capacity.as_ref());
        records.push(NodeStatusRecord {
            name,
            allocatable,
            capacity,
        });
    }
    records
}

fn extract_resources(
    quantities: Option<
        &std::collections::BTreeMap<
            String,
            k8s_openapi::apimachinery::pkg::api::resource::Quantity,
        >,
    >,
) -> NodeResources {
    let get = |key: &str| {
        quantities
            .and_then(|q| q.get(key))
            .map(|q| q.0.clone())
            .unwrap_or_else(|| "0".to_string())
    };
    NodeResources {
        cpu: get("cpu"),
        memory: get("memory"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::NodeStatus;
    use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use std::collections::BTreeMap;

    fn quantities(cpu: &str, memory: &str) -> BTreeMap<String, Quantity> {
        let mut map = BTreeMap::new();
        map.insert("cpu".to_string(), Quantity(cpu.to_string()));
        map.insert("memory".to_string(), Quantity(memory.to_string()));
        map
    }

    #[test]
    fn test_metrics_request_encodes_set_based_selector() {
        let req = node_metrics_request(Some("env in (prod,stage)")).unwrap();
        let uri = req.uri().to_string();
        assert!(uri.starts_with("/apis/metrics.k8s.io/v1beta1/nodes?"));
        assert!(uri.contains("labelSelector="));
        // spaces and parens must not reach the wire unencoded
        assert!(!uri.contains(' '));
        assert!(!uri.contains('('));
    }

    #[test]
    fn test_metrics_request_equality_selector() {
        let req = node_metrics_request(Some("env=prod")).unwrap();
        let uri = req.uri().to_string();
        assert!(uri.contains("labelSelector=env%3Dprod"));
    }

    #[test]
    fn test_metrics_request_without_selector_has_no_selector_param() {
        for selector in [None, Some("")] {
            let req = node_metrics_request(selector).unwrap();
            let uri = req.uri().to_string();
            assert!(uri.starts_with("/apis/metrics.k8s.io/v1beta1/nodes"));
            assert!(!uri.contains("labelSelector"));
        }
    }

    #[test]
    fn test_usage_records_from_items() {
        let mut usage = HashMap::new();
        usage.insert("cpu".to_string(), "250000000n".to_string());
        usage.insert("memory".to_string(), "1048576Ki".to_string());
        let items = vec![
            NodeMetricsItem {
                metadata: serde_json::json!({"name": "node-a"}),
                usage,
            },
            // nameless item is dropped
            NodeMetricsItem {
                metadata: serde_json::json!({}),
                usage: HashMap::new(),
            },
        ];

        let records = usage_records_from_items(items);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "node-a");
        assert_eq!(records[0].cpu, "250000000n");
        assert_eq!(records[0].memory, "1048576Ki");
    }

    #[test]
    fn test_usage_records_default_missing_fields_to_zero() {
        let items = vec![NodeMetricsItem {
            metadata: serde_json::json!({"name": "node-a"}),
            usage: HashMap::new(),
        }];
        let records = usage_records_from_items(items);
        assert_eq!(records[0].cpu, "0");
        assert_eq!(records[0].memory, "0");
    }

    #[test]
    fn test_status_records_from_nodes() {
        let node = Node {
            metadata: ObjectMeta {
                name: Some("node-a".to_string()),
                ..Default::default()
            },
            status: Some(NodeStatus {
                allocatable: Some(quantities("1930m", "2097152Ki")),
                capacity: Some(quantities("2", "4194304Ki")),
                ..Default::default()
            }),
            ..Default::default()
        };

        let records = status_records_from_nodes(vec![node]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].allocatable.cpu, "1930m");
        assert_eq!(records[0].allocatable.memory, "2097152Ki");
        assert_eq!(records[0].capacity.cpu, "2");
        assert_eq!(records[0].capacity.memory, "4194304Ki");
    }

    #[test]
    fn test_statusless_nodes_are_skipped() {
        let node = Node {
            metadata: ObjectMeta {
                name: Some("node-a".to_string()),
                ..Default::default()
            },
            status: None,
            ..Default::default()
        };
        assert!(status_records_from_nodes(vec![node]).is_empty());
    }
}
