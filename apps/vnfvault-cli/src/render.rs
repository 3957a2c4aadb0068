//! Fixed-width table rendering for run summaries.

use vnfvault_core::controller::SummaryRow;
use vnfvault_core::types::ClusterTopology;
use vnfvault_core::action::STORAGE_LOCATION_PREFIX;
use vnfvault_core::workflow::{ClusterRunReport, BACKUP_PACKAGES};

/// Render rows into a bordered fixed-width table.
fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let cols = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(cols) {
            widths[i] = widths[i].max(cell.len());
        }
    }

    let separator = {
        let inner: Vec<String> = widths.iter().map(|w| "-".repeat(w + 2)).collect();
        format!("+{}+", inner.join("+"))
    };
    let format_row = |cells: &[String]| {
        let inner: Vec<String> = cells
            .iter()
            .enumerate()
            .map(|(i, cell)| format!(" {:<width$} ", cell, width = widths[i]))
            .collect();
        format!("|{}|", inner.join("|"))
    };

    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    let mut lines = vec![separator.clone(), format_row(&header_cells), separator.clone()];
    for row in rows {
        lines.push(format_row(row));
    }
    lines.push(separator);
    lines.join("\n")
}

/// Summary table in Target / Resource / Status columns.
pub fn summary_table(rows: &[SummaryRow]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            vec![
                row.target.clone(),
                row.resource_name.clone(),
                row.status.to_string(),
            ]
        })
        .collect();
    table(&["Target", "Resource", "Status"], &cells)
}

/// Node / role grouping table.
pub fn topology_table(topology: &ClusterTopology) -> String {
    let cells: Vec<Vec<String>> = topology
        .nodes
        .iter()
        .map(|node| vec![node.id.clone(), node.role.to_string()])
        .collect();
    table(&["Node", "Role"], &cells)
}

/// Closing box for a cluster pass.
pub fn cluster_summary(report: &ClusterRunReport) -> String {
    let mut lines = vec![
        "+------------------------------+".to_string(),
        "| Backup and Restore Summary   |".to_string(),
        "+------------------------------+".to_string(),
        format!("Total nodes evaluated : {}", report.topology.nodes.len()),
        format!("Active nodes now      : {:?}", report.topology.active_nodes()),
        format!("Standby nodes now     : {:?}", report.topology.standby_nodes()),
        format!("Backups stored at     : {}", STORAGE_LOCATION_PREFIX),
        format!("Key packages          : {}", BACKUP_PACKAGES.join(", ")),
    ];
    match &report.faulted_node {
        Some(node) => lines.push(format!("Recovered host        : {}", node)),
        None => lines.push("Recovered host        : none".to_string()),
    }
    lines.push(String::new());
    lines.push(summary_table(&report.summary));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use vnfvault_core::types::ConditionStatus;

    #[test]
    fn test_summary_table_pads_columns_to_widest_cell() {
        let rows = vec![
            SummaryRow {
                target: "vim-a".to_string(),
                resource_name: "vnfbackup-vim-a-vnf-core-instance-01".to_string(),
                status: ConditionStatus::True,
            },
            SummaryRow {
                target: "vim-b".to_string(),
                resource_name: "short".to_string(),
                status: ConditionStatus::Unknown,
            },
        ];

        let rendered = summary_table(&rows);
        let widths: Vec<usize> = rendered.lines().map(str::len).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]));
        assert!(rendered.contains("vnfbackup-vim-a-vnf-core-instance-01"));
        assert!(rendered.contains("Unknown"));
    }

    #[test]
    fn test_empty_summary_renders_headers_only() {
        let rendered = summary_table(&[]);
        assert!(rendered.contains("Target"));
        assert_eq!(rendered.lines().count(), 4);
    }
}
