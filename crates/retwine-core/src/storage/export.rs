//! Flat-file graph export and re-import.
//!
//! Two semicolon-delimited CSV files per graph, suitable for third-party
//! graph-visualization tools: a node list (`Id;Label;flagged`) and an edge
//! list (`Source;Target;Weight`). No binary state is persisted anywhere.

use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::engine::errors::BuildError;
use crate::engine::identity::{NodeId, NodeRecord};
use crate::engine::interaction::{DirectedGraph, WeightedEdge};

/// One row of an exported node list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRow {
    /// Node id (the array index in the owning graph).
    #[serde(rename = "Id")]
    pub id: u32,
    /// Display name for users, `post` for post nodes.
    #[serde(rename = "Label")]
    pub label: String,
    /// Flagged-dataset membership.
    #[serde(rename = "flagged")]
    pub flagged: bool,
}

/// One row of an exported edge list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRow {
    #[serde(rename = "Source")]
    pub source: u32,
    #[serde(rename = "Target")]
    pub target: u32,
    #[serde(rename = "Weight")]
    pub weight: u64,
}

fn writer<W: Write>(out: W) -> csv::Writer<W> {
    csv::WriterBuilder::new().delimiter(b';').from_writer(out)
}

fn reader<R: Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new().delimiter(b';').from_reader(input)
}

/// Writes the node list of a graph.
pub fn write_node_list<W: Write>(out: W, nodes: &[NodeRecord]) -> Result<(), BuildError> {
    let mut w = writer(out);
    for (index, node) in nodes.iter().enumerate() {
        w.serialize(NodeRow {
            id: index as u32,
            label: node.label().to_string(),
            flagged: node.flagged(),
        })?;
    }
    w.flush()?;
    Ok(())
}

/// Writes the edge list of a graph.
pub fn write_edge_list<W: Write>(out: W, edges: &[WeightedEdge]) -> Result<(), BuildError> {
    let mut w = writer(out);
    for edge in edges {
        w.serialize(EdgeRow {
            source: edge.src.0,
            target: edge.dst.0,
            weight: edge.weight,
        })?;
    }
    w.flush()?;
    Ok(())
}

/// Parses a node list back into rows.
pub fn read_node_list<R: Read>(input: R) -> Result<Vec<NodeRow>, BuildError> {
    let mut r = reader(input);
    let mut rows = Vec::new();
    for row in r.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

/// Parses an edge list back into weighted edges.
pub fn read_edge_list<R: Read>(input: R) -> Result<Vec<WeightedEdge>, BuildError> {
    let mut r = reader(input);
    let mut edges = Vec::new();
    for row in r.deserialize() {
        let row: EdgeRow = row?;
        edges.push(WeightedEdge {
            src: NodeId(row.source),
            dst: NodeId(row.target),
            weight: row.weight,
        });
    }
    Ok(edges)
}

/// Exports a directed graph as `<stem>_nodes.csv` and `<stem>_edges.csv`.
pub fn export_graph(dir: &Path, stem: &str, graph: &DirectedGraph) -> Result<(), BuildError> {
    export_lists(dir, stem, graph.nodes(), graph.edges())
}

/// Exports explicit node and edge lists under a directory.
pub fn export_lists(
    dir: &Path,
    stem: &str,
    nodes: &[NodeRecord],
    edges: &[WeightedEdge],
) -> Result<(), BuildError> {
    std::fs::create_dir_all(dir)?;
    let node_path = dir.join(format!("{stem}_nodes.csv"));
    let edge_path = dir.join(format!("{stem}_edges.csv"));
    write_node_list(std::fs::File::create(&node_path)?, nodes)?;
    write_edge_list(std::fs::File::create(&edge_path)?, edges)?;
    tracing::info!(
        nodes = %node_path.display(),
        edges = %edge_path.display(),
        "graph exported"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn user(name: &str, flagged: bool) -> NodeRecord {
        NodeRecord::User {
            external_id: Arc::from(name),
            screen_name: Arc::from(name),
            flagged,
        }
    }

    #[test]
    fn node_list_round_trip() {
        let nodes = vec![
            user("alice", true),
            user("bob", false),
            NodeRecord::Post {
                external_id: Arc::from("m1"),
            },
        ];
        let mut buf = Vec::new();
        write_node_list(&mut buf, &nodes).unwrap();
        let text = String::from_utf8(buf.clone()).unwrap();
        assert!(text.starts_with("Id;Label;flagged\n"));

        let rows = read_node_list(buf.as_slice()).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].id, 0);
        assert_eq!(rows[0].label, "alice");
        assert!(rows[0].flagged);
        assert_eq!(rows[2].label, "post");
        assert!(!rows[2].flagged);
    }

    #[test]
    fn edge_list_round_trip() {
        let edges = vec![
            WeightedEdge {
                src: NodeId(0),
                dst: NodeId(1),
                weight: 3,
            },
            WeightedEdge {
                src: NodeId(1),
                dst: NodeId(1),
                weight: 1,
            },
        ];
        let mut buf = Vec::new();
        write_edge_list(&mut buf, &edges).unwrap();
        let text = String::from_utf8(buf.clone()).unwrap();
        assert!(text.starts_with("Source;Target;Weight\n"));

        let parsed = read_edge_list(buf.as_slice()).unwrap();
        assert_eq!(parsed, edges);
    }
}
