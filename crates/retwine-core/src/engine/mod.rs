//! The construction and projection engine for retwine graphs.
//!
//! This module provides:
//! - **errors**: Error types for construction and extraction failures
//! - **identity**: Node-id assignment and recovered-content identity maps
//! - **records**: Input record schemas (message rows, recovered content)
//! - **interaction**: Directed weighted user→user graph builder
//! - **bipartite**: Two-layer user↔post graph builder
//! - **coherence**: Structural invariant checks for bipartite graphs
//! - **sparse**: Compressed sparse row matrices for the projection
//! - **stats**: Poisson tail probabilities and Benjamini–Hochberg correction
//! - **backbone**: Statistical backbone extraction over the bipartite graph

pub mod backbone;
pub mod bipartite;
pub mod coherence;
pub mod errors;
pub mod identity;
pub mod interaction;
pub mod records;
pub mod sparse;
pub mod stats;
