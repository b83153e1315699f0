//! Identity resolution for users and recovered messages.
//!
//! This module assigns compact integer node identifiers to users, merging
//! identities discovered through direct dataset membership with identities
//! recovered from external content. The assignment order is a deliberate
//! tie-break (see [`IdentityResolver::from_sources`]): flagged identity wins
//! over externally-discovered identity, and retweet-discovered identity wins
//! over reply-discovered identity.
//!
//! Node ids are dense and 0-based: the id is the index into the resolver's
//! node array, so attribute lookups on the hot path are array loads rather
//! than dictionary probes.

use std::sync::Arc;

use rustc_hash::FxHashMap;

/// A unique identifier for a node in a constructed graph.
///
/// NodeId implements Ord/PartialOrd for stable, deterministic iteration.
/// Uses u32 internally for efficient storage and indexing; the value is the
/// index into the owning graph's node array.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The node id as an array index.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node in a constructed graph: either a resolved user or a post.
///
/// Stored in an index-addressed array; there are no runtime-typed property
/// bags. `Arc<str>` keeps clones cheap when node attribute arrays are copied
/// onto derived graphs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeRecord {
    /// A resolved user identity.
    User {
        /// External (platform) user identifier.
        external_id: Arc<str>,
        /// Display name at first sighting; later inconsistent names are kept
        /// out (first-seen wins).
        screen_name: Arc<str>,
        /// True if the user is part of the curated/flagged dataset, false if
        /// discovered only through recovered interactions.
        flagged: bool,
    },
    /// A message referenced by at least one resolvable interaction.
    Post {
        /// External message identifier.
        external_id: Arc<str>,
    },
}

impl NodeRecord {
    /// External identifier of the underlying entity.
    pub fn external_id(&self) -> &str {
        match self {
            NodeRecord::User { external_id, .. } | NodeRecord::Post { external_id } => external_id,
        }
    }

    /// Export label: the display name for users, the literal `post` for posts.
    pub fn label(&self) -> &str {
        match self {
            NodeRecord::User { screen_name, .. } => screen_name,
            NodeRecord::Post { .. } => "post",
        }
    }

    /// Whether the node is a flagged user. Posts are never flagged.
    pub fn flagged(&self) -> bool {
        match self {
            NodeRecord::User { flagged, .. } => *flagged,
            NodeRecord::Post { .. } => false,
        }
    }

    /// True for user-layer nodes.
    pub fn is_user(&self) -> bool {
        matches!(self, NodeRecord::User { .. })
    }
}

/// Owns the forward (id → record) and reverse (external id → id) user maps.
///
/// Construction is the only mutation point; afterwards the resolver is a
/// read-only lookup structure shared by both graph builders.
#[derive(Debug, Clone, Default)]
pub struct IdentityResolver {
    /// Forward map: index is the node id.
    nodes: Vec<NodeRecord>,
    /// Reverse map: external user id → node id.
    by_external: FxHashMap<Arc<str>, NodeId>,
    /// Number of flagged users (assigned ids `0..num_flagged`).
    num_flagged: usize,
}

impl IdentityResolver {
    /// Builds the resolver from the three identity sources.
    ///
    /// Assignment order:
    /// 1. `flagged` users, in input (dataset) order, ids `0..k`;
    /// 2. users newly seen in the retweet-recovery set;
    /// 3. users newly seen in the reply-recovery set.
    ///
    /// An external id appearing in more than one source keeps its earliest
    /// assignment, so flagged identity always wins over recovered identity
    /// and retweet-discovered identity wins over reply-discovered identity.
    /// Duplicates within a single source are deduplicated (first-seen display
    /// name kept); neither case is an error.
    pub fn from_sources<'a, F, R, P>(flagged: F, retweet_recovered: R, reply_recovered: P) -> Self
    where
        F: IntoIterator<Item = (&'a str, &'a str)>,
        R: IntoIterator<Item = (&'a str, &'a str)>,
        P: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut resolver = IdentityResolver::default();
        for (external_id, screen_name) in flagged {
            resolver.insert_user(external_id, screen_name, true);
        }
        resolver.num_flagged = resolver.nodes.len();
        for (external_id, screen_name) in retweet_recovered {
            resolver.insert_user(external_id, screen_name, false);
        }
        for (external_id, screen_name) in reply_recovered {
            resolver.insert_user(external_id, screen_name, false);
        }
        resolver
    }

    fn insert_user(&mut self, external_id: &str, screen_name: &str, flagged: bool) {
        if self.by_external.contains_key(external_id) {
            return;
        }
        let external_id: Arc<str> = Arc::from(external_id);
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeRecord::User {
            external_id: Arc::clone(&external_id),
            screen_name: Arc::from(screen_name),
            flagged,
        });
        self.by_external.insert(external_id, id);
    }

    /// Resolves an external user id to its node id, if known.
    #[inline]
    pub fn resolve(&self, external_id: &str) -> Option<NodeId> {
        self.by_external.get(external_id).copied()
    }

    /// Resolves an external user id only if it belongs to the flagged set.
    ///
    /// This is the membership test used by the reply-edge source table, which
    /// intentionally differs from the retweet table's presence/absence test.
    #[inline]
    pub fn flagged_node(&self, external_id: &str) -> Option<NodeId> {
        self.resolve(external_id)
            .filter(|id| id.index() < self.num_flagged)
    }

    /// Forward lookup: the record for a node id.
    #[inline]
    pub fn node(&self, id: NodeId) -> &NodeRecord {
        &self.nodes[id.index()]
    }

    /// All user records, index-addressed by node id.
    pub fn nodes(&self) -> &[NodeRecord] {
        &self.nodes
    }

    /// Total number of resolved user identities (`Nu`).
    pub fn num_users(&self) -> usize {
        self.nodes.len()
    }

    /// Number of flagged users (ids `0..num_flagged`).
    pub fn num_flagged(&self) -> usize {
        self.num_flagged
    }
}

/// Mapping from recovered message id to the authoring user's node id.
///
/// Built only from recovered content; absence of an entry means the message
/// could not be resolved through the recovery step.
#[derive(Debug, Clone, Default)]
pub struct MsgMap {
    inner: FxHashMap<Arc<str>, NodeId>,
}

impl MsgMap {
    /// Builds the map from `(message id, author external user id)` pairs.
    ///
    /// Pairs whose author is unknown to the resolver are dropped: such a
    /// message stays unresolvable, matching the recovery step's own recall
    /// limits. A message id recovered twice keeps its first author.
    pub fn from_recovered<'a, I>(pairs: I, resolver: &IdentityResolver) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut inner = FxHashMap::default();
        for (msg_id, author_external) in pairs {
            if let Some(author) = resolver.resolve(author_external) {
                inner.entry(Arc::from(msg_id)).or_insert(author);
            }
        }
        MsgMap { inner }
    }

    /// The authoring user of a recovered message, if it was resolvable.
    #[inline]
    pub fn author(&self, msg_id: &str) -> Option<NodeId> {
        self.inner.get(msg_id).copied()
    }

    /// Number of resolvable recovered messages.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// True when no recovered content resolved.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
