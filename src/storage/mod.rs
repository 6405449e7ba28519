//! Results persistence module

pub mod snapshot;

use crate::cluster::metrics::summarize;
use crate::cluster::ClusterSet;
use crate::config::Config;
use crate::error::Result;
use crate::graph::{InteractionIndex, Side};
use crate::report::{JsonReport, ReportWriter, TextReport};
use serde_json::{json, to_string_pretty};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

pub use snapshot::{CsvSnapshotStore, MemorySnapshotStore, SnapshotStore};

/// Save final clusters to the specified directory
pub fn save_results(
    clusters: &ClusterSet,
    index: &InteractionIndex,
    config: &Config,
    output_dir: &Path,
) -> Result<()> {
    log::info!("Saving {} clusters to {}", clusters.len(), output_dir.display());

    fs::create_dir_all(output_dir)?;

    let report = TextReport::new(config.a_label.as_str(), config.b_label.as_str());
    write_report(&report, clusters, index, &output_dir.join("final_clusters.txt"))?;
    write_report(&JsonReport, clusters, index, &output_dir.join("clusters.json"))?;

    save_summary(clusters, index, config, output_dir)?;

    log::info!("Results saved successfully");

    Ok(())
}

fn write_report(
    report: &dyn ReportWriter,
    clusters: &ClusterSet,
    index: &InteractionIndex,
    path: &Path,
) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    report.write(clusters, index, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Save run parameters, graph size and cluster statistics
fn save_summary(
    clusters: &ClusterSet,
    index: &InteractionIndex,
    config: &Config,
    output_dir: &Path,
) -> Result<()> {
    log::info!("Saving summary information");

    let path = output_dir.join("summary.json");
    let mut file = File::create(path)?;

    let summary = json!({
        "config": config,
        "graph_stats": {
            "a_count": index.side_count(Side::A),
            "b_count": index.side_count(Side::B),
            "interaction_count": index.interaction_count(),
        },
        "cluster_stats": summarize(index, clusters),
    });

    file.write_all(to_string_pretty(&summary)?.as_bytes())?;

    Ok(())
}
