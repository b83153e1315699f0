//! Two-layer user↔post graph construction.
//!
//! The bipartite graph records authorship and propagation as separate
//! cross-layer edges: `author → post` when a user wrote a message that was
//! propagated, and `post → actor` for each user who retweeted or replied to
//! it. Post nodes are created lazily, the first time a message id turns out
//! to be resolvable, and their dense ids continue after the user layer.
//!
//! Every qualifying row contributes through the same source-resolution table
//! as the directed builder (`engine::interaction::resolve_source`);
//! unresolvable rows contribute no post node and no edges.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::engine::identity::{IdentityResolver, MsgMap, NodeId, NodeRecord};
use crate::engine::interaction::{
    resolve_source, InteractionKind, SkipStats, SourceResolution, WeightedEdge,
};
use crate::engine::records::MessageRecord;

/// A directed two-layer graph: user nodes `0..nu`, post nodes `nu..nu+np`.
///
/// Edges only cross layers. Each post has exactly one incoming authorship
/// edge (checked by `engine::coherence`) and one outgoing propagation edge
/// per distinct resharer/replier, with repeat interactions accumulated as
/// edge weight.
#[derive(Debug, Clone)]
pub struct BipartiteGraph {
    nodes: Vec<NodeRecord>,
    nu: usize,
    np: usize,
    kind: InteractionKind,
    edges: Vec<WeightedEdge>,
}

impl BipartiteGraph {
    /// All node records; indices `0..nu` are users, `nu..nu+np` are posts.
    pub fn nodes(&self) -> &[NodeRecord] {
        &self.nodes
    }

    /// The record for one node.
    pub fn node(&self, id: NodeId) -> &NodeRecord {
        &self.nodes[id.index()]
    }

    /// User-layer size (`Nu`).
    pub fn num_users(&self) -> usize {
        self.nu
    }

    /// Post-layer size (`Np`).
    pub fn num_posts(&self) -> usize {
        self.np
    }

    /// The interaction kind this graph was built from.
    pub fn kind(&self) -> InteractionKind {
        self.kind
    }

    /// Cross-layer edges sorted by `(src, dst)`.
    pub fn edges(&self) -> &[WeightedEdge] {
        &self.edges
    }

    /// True when the id belongs to the post layer.
    pub fn is_post(&self, id: NodeId) -> bool {
        id.index() >= self.nu
    }
}

/// Builds the bipartite user↔post graph for one interaction kind.
///
/// A post node is created the first time its message id resolves: either the
/// dataset knew the original author, or the recovery step identified one.
/// Later rows referencing the same message reuse the node and add (or
/// reweight) propagation edges; the authorship edge is added exactly once,
/// at creation. Rows whose author resolves but whose propagated message id
/// is absent cannot anchor a post and are counted as unresolved here.
pub fn build_bipartite_graph(
    rows: &[MessageRecord],
    kind: InteractionKind,
    resolver: &IdentityResolver,
    msgmap: &MsgMap,
) -> (BipartiteGraph, SkipStats) {
    let nu = resolver.num_users();
    let mut stats = SkipStats::default();
    let mut nodes = resolver.nodes().to_vec();
    let mut post_index: FxHashMap<Arc<str>, NodeId> = FxHashMap::default();
    let mut authorship: Vec<WeightedEdge> = Vec::new();
    let mut propagation: FxHashMap<(NodeId, NodeId), u64> = FxHashMap::default();

    for row in rows {
        let (author, message_id) = match resolve_source(row, kind, resolver, msgmap) {
            SourceResolution::NotApplicable => continue,
            SourceResolution::Unresolvable => {
                stats.rows_considered += 1;
                stats.unresolved_source += 1;
                continue;
            }
            SourceResolution::Resolved { author, message_id } => {
                stats.rows_considered += 1;
                match message_id {
                    Some(id) => (author, id),
                    None => {
                        // Known author but no propagated message id: nothing
                        // to anchor a post node on.
                        stats.unresolved_source += 1;
                        continue;
                    }
                }
            }
        };
        let Some(actor) = resolver.resolve(&row.userid) else {
            stats.unknown_actor += 1;
            continue;
        };

        let post = match post_index.get(message_id) {
            Some(&post) => post,
            None => {
                let post = NodeId((nodes.len()) as u32);
                let external_id: Arc<str> = Arc::from(message_id);
                nodes.push(NodeRecord::Post {
                    external_id: Arc::clone(&external_id),
                });
                post_index.insert(external_id, post);
                authorship.push(WeightedEdge {
                    src: author,
                    dst: post,
                    weight: 1,
                });
                post
            }
        };
        *propagation.entry((post, actor)).or_insert(0) += 1;
        stats.rows_linked += 1;
    }

    let np = nodes.len() - nu;
    let mut edges: Vec<WeightedEdge> = authorship;
    edges.extend(
        propagation
            .into_iter()
            .map(|((src, dst), weight)| WeightedEdge { src, dst, weight }),
    );
    edges.sort_unstable_by_key(|e| (e.src, e.dst));

    let graph = BipartiteGraph {
        nodes,
        nu,
        np,
        kind,
        edges,
    };
    tracing::debug!(
        kind = %kind,
        users = nu,
        posts = np,
        edges = graph.edges.len(),
        considered = stats.rows_considered,
        skipped = stats.rows_skipped(),
        "bipartite graph built"
    );
    (graph, stats)
}
