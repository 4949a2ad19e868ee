use crate::types::{AggregateMetric, TableMessage};

/// Turn the aggregated rows into the headers/rows/footnote triple the
/// delivery sink expects. Column order: Metric, CPU, Memory, Description.
pub fn build_report_table(metrics: &[AggregateMetric], node_count: usize) -> TableMessage {
    let headers = vec![
        "Metric".to_string(),
        "CPU".to_string(),
        "Memory".to_string(),
        "Description".to_string(),
    ];
    let rows = metrics
        .iter()
        .map(|m| {
            vec![
                m.name.clone(),
                m.cpu.to_string(),
                m.memory.to_string(),
                m.description.clone(),
            ]
        })
        .collect();
    TableMessage {
        headers,
        rows,
        footnote: Some(format!("Number of nodes - {}", node_count)),
    }
}
