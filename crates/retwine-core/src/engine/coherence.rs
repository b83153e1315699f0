//! Structural invariant checks for constructed bipartite graphs.
//!
//! The checks validate properties that hold by construction when the builder
//! is correct; a failure signals a builder bug, not bad input. Reports are
//! informational: callers in a pipeline should stop consuming a graph that
//! fails, but checking never aborts the process.

use crate::engine::bipartite::BipartiteGraph;
use crate::engine::identity::NodeId;

/// Outcome of one invariant check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantCheck {
    /// True when the invariant held.
    pub passed: bool,
    /// Human-readable description of the first violations found, if any.
    pub violations: Vec<String>,
}

impl InvariantCheck {
    fn ok() -> Self {
        InvariantCheck {
            passed: true,
            violations: Vec::new(),
        }
    }

    fn failed(violations: Vec<String>) -> Self {
        InvariantCheck {
            passed: false,
            violations,
        }
    }
}

/// Coherence report for a bipartite graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoherenceReport {
    /// Every post node has in-degree exactly 1 (one authorship edge).
    pub post_in_degree: InvariantCheck,
    /// Total degree summed over user nodes equals total degree summed over
    /// post nodes (every edge crosses layers, so it is counted once from
    /// each side).
    pub degree_balance: InvariantCheck,
}

impl CoherenceReport {
    /// True when every invariant held.
    pub fn passed(&self) -> bool {
        self.post_in_degree.passed && self.degree_balance.passed
    }
}

/// Cap on per-invariant violation details kept in the report.
const MAX_REPORTED_VIOLATIONS: usize = 16;

/// Verifies the structural invariants of a constructed bipartite graph.
pub fn check_bipartite(graph: &BipartiteGraph) -> CoherenceReport {
    let nu = graph.num_users();
    let total = nu + graph.num_posts();

    // Edge-count degrees per node, split by endpoint role.
    let mut in_degree = vec![0u64; total];
    let mut out_degree = vec![0u64; total];
    for edge in graph.edges() {
        out_degree[edge.src.index()] += edge.weight;
        in_degree[edge.dst.index()] += edge.weight;
    }

    // (a) exactly one authorship edge per post, counted without weight.
    let mut authorship_count = vec![0u64; total];
    for edge in graph.edges() {
        if graph.is_post(edge.dst) {
            authorship_count[edge.dst.index()] += 1;
        }
    }
    let mut violations = Vec::new();
    for index in nu..total {
        if authorship_count[index] != 1 {
            if violations.len() < MAX_REPORTED_VIOLATIONS {
                let post = graph.node(NodeId(index as u32));
                violations.push(format!(
                    "post '{}' has in-degree {}, expected 1",
                    post.external_id(),
                    authorship_count[index]
                ));
            }
        }
    }
    let post_in_degree = if violations.is_empty() {
        InvariantCheck::ok()
    } else {
        InvariantCheck::failed(violations)
    };

    // (b) user-layer and post-layer degree sums must match.
    let user_degree: u64 = (0..nu).map(|i| in_degree[i] + out_degree[i]).sum();
    let post_degree: u64 = (nu..total).map(|i| in_degree[i] + out_degree[i]).sum();
    let degree_balance = if user_degree == post_degree {
        InvariantCheck::ok()
    } else {
        InvariantCheck::failed(vec![format!(
            "user-layer degree sum {user_degree} != post-layer degree sum {post_degree}"
        )])
    };

    let report = CoherenceReport {
        post_in_degree,
        degree_balance,
    };
    if !report.passed() {
        tracing::warn!(
            kind = %graph.kind(),
            post_in_degree = report.post_in_degree.passed,
            degree_balance = report.degree_balance.passed,
            "bipartite coherence check failed"
        );
    }
    report
}
