//! # Retwine Core
//!
//! Core engine for reconstructing social-network interaction structure from
//! partially-incomplete message datasets and extracting the statistically
//! significant backbone of user-to-user influence.
//!
//! The pipeline, leaves first:
//!
//! 1. **Identity resolution** ([`engine::identity`]) — dense integer node ids
//!    for users merged from the flagged dataset and externally recovered
//!    content.
//! 2. **Graph construction** ([`engine::interaction`], [`engine::bipartite`])
//!    — directed weighted user→user propagation graphs and two-layer
//!    user↔post graphs.
//! 3. **Backbone extraction** ([`engine::backbone`]) — sparse V-motif
//!    projection, configuration-model null, Poisson tail p-values, global
//!    Benjamini–Hochberg cut.
//! 4. **Coherence checking** ([`engine::coherence`]) — post-construction
//!    structural invariant reports.
//!
//! Raw CSV/NDJSON ingestion and flat-file export live in [`storage`]; batch
//! orchestration lives in the `retwine-cli` crate.

pub mod engine;
pub mod storage;

// Re-export commonly used types
pub use engine::backbone::{extract_backbone, BackboneArtifacts};
pub use engine::bipartite::{build_bipartite_graph, BipartiteGraph};
pub use engine::coherence::{check_bipartite, CoherenceReport};
pub use engine::errors::BuildError;
pub use engine::identity::{IdentityResolver, MsgMap, NodeId, NodeRecord};
pub use engine::interaction::{build_interaction_graph, DirectedGraph, InteractionKind, SkipStats};
