//! Directed weighted interaction graph construction.
//!
//! From message rows, infers directed user→user edges representing retweet or
//! reply propagation. Each edge points from the original author (information
//! source) to the user who propagated it; repeated interactions between the
//! same ordered pair collapse into one edge with summed weight.
//!
//! Unresolvable rows are skipped silently, never raised as errors: a large
//! fraction of referenced content is external to the dataset and may not have
//! been recovered. The skip counts are an accepted recall limitation of the
//! method and are surfaced to the caller through [`SkipStats`].

use rustc_hash::FxHashMap;

use crate::engine::identity::{IdentityResolver, MsgMap, NodeId, NodeRecord};
use crate::engine::records::MessageRecord;

/// The interaction kind a graph was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionKind {
    /// Retweet propagation (author → retweeter).
    Retweet,
    /// Reply propagation (replied-to author → replier).
    Reply,
}

impl InteractionKind {
    /// Lowercase name used in logs and output file names.
    pub fn as_str(self) -> &'static str {
        match self {
            InteractionKind::Retweet => "retweet",
            InteractionKind::Reply => "reply",
        }
    }
}

impl std::fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed edge with an accumulated interaction count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeightedEdge {
    /// Source node (information origin).
    pub src: NodeId,
    /// Destination node (propagating user).
    pub dst: NodeId,
    /// Number of raw interactions collapsed onto this ordered pair.
    pub weight: u64,
}

/// A directed weighted graph over an index-addressed node array.
///
/// Edges are stored sorted by `(src, dst)`; the order is deterministic and
/// independent of input row order because weights accumulate associatively.
#[derive(Debug, Clone, Default)]
pub struct DirectedGraph {
    nodes: Vec<NodeRecord>,
    edges: Vec<WeightedEdge>,
}

impl DirectedGraph {
    /// Assembles a graph from a node array and an edge accumulator.
    pub(crate) fn from_accumulator(
        nodes: Vec<NodeRecord>,
        accumulator: FxHashMap<(NodeId, NodeId), u64>,
    ) -> Self {
        let mut edges: Vec<WeightedEdge> = accumulator
            .into_iter()
            .map(|((src, dst), weight)| WeightedEdge { src, dst, weight })
            .collect();
        edges.sort_unstable_by_key(|e| (e.src, e.dst));
        DirectedGraph { nodes, edges }
    }

    /// Builds a graph directly from pre-sorted unique edges.
    pub(crate) fn from_parts(nodes: Vec<NodeRecord>, edges: Vec<WeightedEdge>) -> Self {
        debug_assert!(edges.windows(2).all(|w| (w[0].src, w[0].dst) < (w[1].src, w[1].dst)));
        DirectedGraph { nodes, edges }
    }

    /// Node records, index-addressed by node id.
    pub fn nodes(&self) -> &[NodeRecord] {
        &self.nodes
    }

    /// The record for one node.
    pub fn node(&self, id: NodeId) -> &NodeRecord {
        &self.nodes[id.index()]
    }

    /// Edges sorted by `(src, dst)`.
    pub fn edges(&self) -> &[WeightedEdge] {
        &self.edges
    }

    /// Number of nodes (including isolated ones).
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of distinct directed edges.
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }
}

/// Aggregate row-resolution statistics for one builder invocation.
///
/// Unresolvable rows are a known recall limitation, not a bug; any pipeline
/// intended for production diagnostics should report these counts rather than
/// swallow them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipStats {
    /// Rows matching the interaction kind (retweet rows, or rows with a
    /// reply target).
    pub rows_considered: usize,
    /// Rows skipped because the original author could not be resolved
    /// (absent id and message not recovered).
    pub unresolved_source: usize,
    /// Rows skipped because the propagating user is unknown to the resolver.
    pub unknown_actor: usize,
    /// Rows that produced an edge contribution.
    pub rows_linked: usize,
}

impl SkipStats {
    /// Total skipped rows.
    pub fn rows_skipped(&self) -> usize {
        self.unresolved_source + self.unknown_actor
    }
}

/// Outcome of applying the source-resolution table to one message row.
pub(crate) enum SourceResolution<'a> {
    /// Row does not match the requested interaction kind.
    NotApplicable,
    /// Original author resolved; `message_id` is the propagated message when
    /// the row carries one (a retweet with a known author may not).
    Resolved {
        author: NodeId,
        message_id: Option<&'a str>,
    },
    /// Row matches the kind but the author cannot be resolved.
    Unresolvable,
}

/// Applies the per-kind edge-source resolution table to a row.
///
/// Retweets rely on presence/absence of `retweet_userid` (the dataset carries
/// an explicit original-author id when it is known), falling back to the
/// recovered-content map. Replies check flagged-set membership of
/// `in_reply_to_userid` before the recovered-content fallback. The asymmetry
/// is intentional; unifying the two paths would silently change which rows
/// are skipped.
pub(crate) fn resolve_source<'a>(
    row: &'a MessageRecord,
    kind: InteractionKind,
    resolver: &IdentityResolver,
    msgmap: &MsgMap,
) -> SourceResolution<'a> {
    match kind {
        InteractionKind::Retweet => {
            if !row.is_retweet {
                return SourceResolution::NotApplicable;
            }
            if let Some(author_id) = row.retweet_userid.as_deref() {
                return match resolver.resolve(author_id) {
                    Some(author) => SourceResolution::Resolved {
                        author,
                        message_id: row.retweet_tweetid.as_deref(),
                    },
                    None => SourceResolution::Unresolvable,
                };
            }
            match row.retweet_tweetid.as_deref() {
                Some(msg_id) => match msgmap.author(msg_id) {
                    Some(author) => SourceResolution::Resolved {
                        author,
                        message_id: Some(msg_id),
                    },
                    None => SourceResolution::Unresolvable,
                },
                None => SourceResolution::Unresolvable,
            }
        }
        InteractionKind::Reply => {
            let Some(msg_id) = row.in_reply_to_tweetid.as_deref() else {
                return SourceResolution::NotApplicable;
            };
            if let Some(author) = row
                .in_reply_to_userid
                .as_deref()
                .and_then(|uid| resolver.flagged_node(uid))
            {
                return SourceResolution::Resolved {
                    author,
                    message_id: Some(msg_id),
                };
            }
            match msgmap.author(msg_id) {
                Some(author) => SourceResolution::Resolved {
                    author,
                    message_id: Some(msg_id),
                },
                None => SourceResolution::Unresolvable,
            }
        }
    }
}

/// Builds the directed weighted propagation graph for one interaction kind.
///
/// The graph spans the full resolved user set (`Nu` nodes, attributes copied
/// from the resolver) regardless of which users appear in edges. Edge
/// insertion order does not affect the result; self-loops are kept.
pub fn build_interaction_graph(
    rows: &[MessageRecord],
    kind: InteractionKind,
    resolver: &IdentityResolver,
    msgmap: &MsgMap,
) -> (DirectedGraph, SkipStats) {
    let mut stats = SkipStats::default();
    let mut accumulator: FxHashMap<(NodeId, NodeId), u64> = FxHashMap::default();

    for row in rows {
        let resolution = resolve_source(row, kind, resolver, msgmap);
        let author = match resolution {
            SourceResolution::NotApplicable => continue,
            SourceResolution::Unresolvable => {
                stats.rows_considered += 1;
                stats.unresolved_source += 1;
                continue;
            }
            SourceResolution::Resolved { author, .. } => {
                stats.rows_considered += 1;
                author
            }
        };
        let Some(actor) = resolver.resolve(&row.userid) else {
            stats.unknown_actor += 1;
            continue;
        };
        *accumulator.entry((author, actor)).or_insert(0) += 1;
        stats.rows_linked += 1;
    }

    let graph = DirectedGraph::from_accumulator(resolver.nodes().to_vec(), accumulator);
    tracing::debug!(
        kind = %kind,
        nodes = graph.num_nodes(),
        edges = graph.num_edges(),
        considered = stats.rows_considered,
        skipped = stats.rows_skipped(),
        "interaction graph built"
    );
    (graph, stats)
}
