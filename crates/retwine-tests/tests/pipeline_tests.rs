//! End-to-end tests over the resolver → builders → backbone pipeline.

use retwine_core::engine::records::MessageRecord;
use retwine_core::storage::export::{
    read_edge_list, read_node_list, write_edge_list, write_node_list,
};
use retwine_core::{
    build_bipartite_graph, build_interaction_graph, check_bipartite, extract_backbone,
    BuildError, IdentityResolver, InteractionKind, MsgMap, NodeId,
};

fn retweet(userid: &str, rt_user: Option<&str>, rt_tweet: Option<&str>) -> MessageRecord {
    MessageRecord {
        tweetid: "t".into(),
        userid: userid.into(),
        is_retweet: true,
        retweet_userid: rt_user.map(Into::into),
        retweet_tweetid: rt_tweet.map(Into::into),
        ..MessageRecord::default()
    }
}

fn reply(userid: &str, to_user: Option<&str>, to_tweet: &str) -> MessageRecord {
    MessageRecord {
        tweetid: "t".into(),
        userid: userid.into(),
        in_reply_to_userid: to_user.map(Into::into),
        in_reply_to_tweetid: Some(to_tweet.into()),
        ..MessageRecord::default()
    }
}

/// Mixed dataset: flagged authors, a recovered external author, and rows
/// that must be skipped under both resolution tables.
fn mixed_fixture() -> (IdentityResolver, MsgMap, Vec<MessageRecord>) {
    let resolver = IdentityResolver::from_sources(
        vec![("u1", "alice"), ("u2", "bob"), ("u3", "carol")],
        vec![("x1", "external_rt")],
        vec![("x2", "external_rp")],
    );
    let msgmap = MsgMap::from_recovered(vec![("m_rt", "x1"), ("m_rp", "x2")], &resolver);
    let rows = vec![
        // direct retweet, author known in-dataset
        retweet("u2", Some("u1"), Some("m1")),
        // retweet resolved through recovery
        retweet("u3", None, Some("m_rt")),
        // retweet of unrecovered content: skipped
        retweet("u2", None, Some("m_lost")),
        // retweet with neither author nor message id: skipped
        retweet("u2", None, None),
        // reply to a flagged user
        reply("u3", Some("u1"), "m2"),
        // reply resolved through recovery (target not flagged)
        reply("u2", Some("x9"), "m_rp"),
        // unresolvable reply: skipped
        reply("u2", Some("x9"), "m_lost"),
    ];
    (resolver, msgmap, rows)
}

#[test]
fn directed_graphs_follow_the_resolution_tables() {
    let (resolver, msgmap, rows) = mixed_fixture();

    let (rt_graph, rt_stats) =
        build_interaction_graph(&rows, InteractionKind::Retweet, &resolver, &msgmap);
    assert_eq!(rt_stats.rows_considered, 4);
    assert_eq!(rt_stats.rows_skipped(), 2);
    let rt_edges: Vec<_> = rt_graph
        .edges()
        .iter()
        .map(|e| (e.src, e.dst, e.weight))
        .collect();
    let x1 = resolver.resolve("x1").unwrap();
    assert_eq!(
        rt_edges,
        vec![
            (NodeId(0), NodeId(1), 1), // u1 -> u2
            (x1, NodeId(2), 1),        // recovered author -> u3
        ]
    );

    let (rp_graph, rp_stats) =
        build_interaction_graph(&rows, InteractionKind::Reply, &resolver, &msgmap);
    assert_eq!(rp_stats.rows_considered, 3);
    assert_eq!(rp_stats.rows_skipped(), 1);
    let x2 = resolver.resolve("x2").unwrap();
    let rp_edges: Vec<_> = rp_graph
        .edges()
        .iter()
        .map(|e| (e.src, e.dst, e.weight))
        .collect();
    assert_eq!(
        rp_edges,
        vec![
            (NodeId(0), NodeId(2), 1), // u1 -> u3 (flagged membership)
            (x2, NodeId(1), 1),        // recovered author -> u2
        ]
    );
}

#[test]
fn bipartite_graphs_pass_coherence_on_the_mixed_fixture() {
    let (resolver, msgmap, rows) = mixed_fixture();
    for kind in [InteractionKind::Retweet, InteractionKind::Reply] {
        let (graph, _) = build_bipartite_graph(&rows, kind, &resolver, &msgmap);
        let report = check_bipartite(&graph);
        assert!(report.passed(), "{kind}: {report:?}");
        assert_eq!(graph.num_users(), resolver.num_users());
        assert_eq!(graph.num_posts(), 2);
    }
}

#[test]
fn unresolvable_rows_produce_no_artifacts_and_no_errors() {
    let resolver = IdentityResolver::from_sources(vec![("u1", "alice")], vec![], vec![]);
    let msgmap = MsgMap::from_recovered(vec![], &resolver);
    let rows = vec![retweet("u1", None, Some("m_lost"))];
    let (directed, stats) =
        build_interaction_graph(&rows, InteractionKind::Retweet, &resolver, &msgmap);
    assert_eq!(directed.num_edges(), 0);
    assert_eq!(stats.unresolved_source, 1);
    let (bipartite, _) = build_bipartite_graph(&rows, InteractionKind::Retweet, &resolver, &msgmap);
    assert_eq!(bipartite.num_posts(), 0);
    assert!(bipartite.edges().is_empty());
}

#[test]
fn backbone_on_empty_post_layer_fails_fast() {
    let resolver = IdentityResolver::from_sources(vec![("u1", "alice")], vec![], vec![]);
    let msgmap = MsgMap::from_recovered(vec![], &resolver);
    let (bipartite, _) = build_bipartite_graph(&[], InteractionKind::Retweet, &resolver, &msgmap);
    match extract_backbone(&bipartite, 0.05) {
        Err(BuildError::Domain(msg)) => assert!(msg.contains("zero posts")),
        other => panic!("expected a domain error, got {other:?}"),
    }
}

#[test]
fn backbone_artifacts_are_consistent_on_the_mixed_fixture() {
    let (resolver, msgmap, rows) = mixed_fixture();
    let (bipartite, _) =
        build_bipartite_graph(&rows, InteractionKind::Retweet, &resolver, &msgmap);
    let artifacts = extract_backbone(&bipartite, 0.05).unwrap();
    assert_eq!(
        artifacts.observed.shape(),
        (resolver.num_users(), resolver.num_users())
    );
    assert_eq!(artifacts.tested, artifacts.pvalues.nnz());
    // The filtered graph retains the full user node set with attributes.
    assert_eq!(artifacts.filtered.num_nodes(), resolver.num_users());
    assert!(artifacts.filtered.node(NodeId(0)).flagged());
}

#[test]
fn export_round_trip_recovers_attributes_and_weights() {
    let (resolver, msgmap, rows) = mixed_fixture();
    let (graph, _) = build_interaction_graph(&rows, InteractionKind::Retweet, &resolver, &msgmap);

    let mut node_buf = Vec::new();
    let mut edge_buf = Vec::new();
    write_node_list(&mut node_buf, graph.nodes()).unwrap();
    write_edge_list(&mut edge_buf, graph.edges()).unwrap();

    let node_rows = read_node_list(node_buf.as_slice()).unwrap();
    assert_eq!(node_rows.len(), graph.num_nodes());
    for (row, node) in node_rows.iter().zip(graph.nodes()) {
        assert_eq!(row.label, node.label());
        assert_eq!(row.flagged, node.flagged());
    }

    let edges = read_edge_list(edge_buf.as_slice()).unwrap();
    assert_eq!(edges, graph.edges());
}
