//! Rendering of final clusters

use crate::cluster::{Cluster, ClusterSet};
use crate::error::Result;
use crate::graph::{InteractionIndex, NodeId};
use itertools::Itertools;
use serde::Serialize;
use std::collections::BTreeSet;
use std::io::Write;

/// Renders a cluster set to an output stream
pub trait ReportWriter {
    fn write(&self, clusters: &ClusterSet, index: &InteractionIndex, out: &mut dyn Write)
        -> Result<()>;
}

/// Width of the line separating cluster blocks
const DELIMITER_WIDTH: usize = 30;

/// Human-readable report, one block per cluster
#[derive(Debug, Clone)]
pub struct TextReport {
    pub a_label: String,
    pub b_label: String,
}

impl Default for TextReport {
    fn default() -> Self {
        Self {
            a_label: "A".to_string(),
            b_label: "B".to_string(),
        }
    }
}

impl TextReport {
    pub fn new(a_label: impl Into<String>, b_label: impl Into<String>) -> Self {
        Self {
            a_label: a_label.into(),
            b_label: b_label.into(),
        }
    }
}

fn member_ids<'a>(members: &BTreeSet<NodeId>, index: &'a InteractionIndex) -> Vec<&'a str> {
    // Handles are in id order within a side
    members.iter().map(|&node| index.entity_id(node)).collect()
}

impl ReportWriter for TextReport {
    fn write(
        &self,
        clusters: &ClusterSet,
        index: &InteractionIndex,
        out: &mut dyn Write,
    ) -> Result<()> {
        for cluster in clusters.iter() {
            writeln!(
                out,
                "Cluster {} (anchor {}):",
                cluster.id,
                index.key(cluster.anchor)
            )?;
            writeln!(
                out,
                "  {}: {}",
                self.a_label,
                member_ids(&cluster.a_members, index).iter().join(", ")
            )?;
            writeln!(
                out,
                "  {}: {}",
                self.b_label,
                member_ids(&cluster.b_members, index).iter().join(", ")
            )?;
            writeln!(out, "{}", "-".repeat(DELIMITER_WIDTH))?;
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct ClusterRecord<'a> {
    id: u32,
    anchor: String,
    a_members: Vec<&'a str>,
    b_members: Vec<&'a str>,
}

impl<'a> ClusterRecord<'a> {
    fn new(cluster: &Cluster, index: &'a InteractionIndex) -> Self {
        Self {
            id: cluster.id.0,
            anchor: index.key(cluster.anchor).to_string(),
            a_members: member_ids(&cluster.a_members, index),
            b_members: member_ids(&cluster.b_members, index),
        }
    }
}

/// Structured report: a JSON array of cluster records
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReport;

impl ReportWriter for JsonReport {
    fn write(
        &self,
        clusters: &ClusterSet,
        index: &InteractionIndex,
        out: &mut dyn Write,
    ) -> Result<()> {
        let records: Vec<ClusterRecord<'_>> = clusters
            .iter()
            .map(|cluster| ClusterRecord::new(cluster, index))
            .collect();
        serde_json::to_writer_pretty(&mut *out, &records)?;
        writeln!(out)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::detection::find_core_clusters;

    fn clusters() -> (InteractionIndex, ClusterSet) {
        let index = InteractionIndex::from_interactions([("C2", "M1"), ("C1", "M1"), ("C3", "M3")]);
        let clusters = find_core_clusters(&index);
        (index, clusters)
    }

    #[test]
    fn text_blocks_are_sorted_and_delimited() {
        let (index, clusters) = clusters();
        let mut out = Vec::new();
        TextReport::new("Cardholders", "Merchants")
            .write(&clusters, &index, &mut out)
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        let expected = "\
Cluster 0 (anchor B:M1):
  Cardholders: C1, C2
  Merchants: M1
------------------------------
Cluster 1 (anchor A:C3):
  Cardholders: C3
  Merchants: M3
------------------------------
";
        assert_eq!(text, expected);
    }

    #[test]
    fn json_records() {
        let (index, clusters) = clusters();
        let mut out = Vec::new();
        JsonReport.write(&clusters, &index, &mut out).unwrap();

        let parsed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed[0]["a_members"], serde_json::json!(["C1", "C2"]));
        assert_eq!(parsed[1]["anchor"], "A:C3");
    }
}
