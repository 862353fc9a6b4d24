use socialgraph_core::{
    EdgeDirection, EdgeKind, EntityRef, ErrorKind, GraphConfig, GraphError, GraphSession,
    OpenAccountDirectory, Publisher,
};
use std::collections::BTreeSet;
use uuid::Uuid;

fn session() -> GraphSession<OpenAccountDirectory> {
    GraphSession::open(GraphConfig::default(), OpenAccountDirectory).unwrap()
}

fn publishers(session: &GraphSession<OpenAccountDirectory>, handles: &[&str]) -> Vec<Publisher> {
    let service = session.publishers().unwrap();
    handles
        .iter()
        .map(|handle| service.create(None, *handle).unwrap())
        .collect()
}

#[test]
fn self_follow_is_rejected_without_recording_an_edge() {
    let session = session();
    let p = publishers(&session, &["alice"]);
    let relationships = session.relationships().unwrap();

    let err = relationships
        .add_edge(EdgeKind::Follows, p[0].id, p[0].id)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidOperation);
    assert!(relationships.following(p[0].id).unwrap().is_empty());
    assert_eq!(relationships.follower_count(p[0].id).unwrap(), 0);
}

#[test]
fn adding_the_same_edge_twice_is_idempotent() {
    let session = session();
    let p = publishers(&session, &["alice", "bob"]);
    let relationships = session.relationships().unwrap();

    let first = relationships.follow(p[0].id, p[1].id).unwrap();
    let after_first = relationships.following(p[0].id).unwrap();
    let second = relationships.follow(p[0].id, p[1].id).unwrap();

    assert!(first.present && first.changed);
    assert!(second.present && !second.changed);
    assert_eq!(relationships.following(p[0].id).unwrap(), after_first);
    assert_eq!(relationships.follower_count(p[1].id).unwrap(), 1);
}

#[test]
fn remove_then_remove_again_is_a_no_op() {
    let session = session();
    let p = publishers(&session, &["alice", "bob"]);
    let relationships = session.relationships().unwrap();

    relationships.follow(p[0].id, p[1].id).unwrap();
    let removed = relationships.unfollow(p[0].id, p[1].id).unwrap();
    assert!(!removed.present && removed.changed);
    assert!(!relationships.following(p[0].id).unwrap().contains(&p[1].id));

    let again = relationships.unfollow(p[0].id, p[1].id).unwrap();
    assert!(!again.present && !again.changed);
}

#[test]
fn inverse_view_matches_forward_view() {
    let session = session();
    let p = publishers(&session, &["a", "b", "c", "d"]);
    let relationships = session.relationships().unwrap();

    let pairs = [(0, 1), (0, 2), (1, 2), (2, 0), (3, 2), (3, 0)];
    for (from, to) in pairs {
        relationships.follow(p[from].id, p[to].id).unwrap();
    }
    relationships.unfollow(p[3].id, p[0].id).unwrap();

    for target in &p {
        let expected: BTreeSet<Uuid> = p
            .iter()
            .filter(|source| {
                relationships
                    .neighbors(EdgeKind::Follows, source.id)
                    .unwrap()
                    .contains(&target.id)
            })
            .map(|source| source.id)
            .collect();
        let inverse = relationships
            .inverse_neighbors(EdgeKind::Follows, target.id)
            .unwrap();
        assert_eq!(inverse, expected, "followers of {}", target.handle);
        assert_eq!(
            relationships
                .degree(EdgeKind::Follows, target.id, EdgeDirection::Inbound)
                .unwrap(),
            expected.len() as u64
        );
    }
}

#[test]
fn follow_scenario_updates_both_directions() {
    let session = session();
    let p = publishers(&session, &["p1", "p2"]);
    let relationships = session.relationships().unwrap();

    relationships
        .add_edge(EdgeKind::Follows, p[0].id, p[1].id)
        .unwrap();

    assert_eq!(
        relationships.neighbors(EdgeKind::Follows, p[0].id).unwrap(),
        BTreeSet::from([p[1].id])
    );
    assert_eq!(
        relationships
            .inverse_neighbors(EdgeKind::Follows, p[1].id)
            .unwrap(),
        BTreeSet::from([p[0].id])
    );
    assert_eq!(
        relationships
            .degree(EdgeKind::Follows, p[1].id, EdgeDirection::Inbound)
            .unwrap(),
        1
    );
    assert_eq!(relationships.following_count(p[0].id).unwrap(), 1);
}

#[test]
fn like_then_delete_publication_scenario() {
    let session = session();
    let p = publishers(&session, &["p1", "p2"]);
    let publications = session.publications().unwrap();
    let relationships = session.relationships().unwrap();
    let x = publications.create(p[0].id, "post x").unwrap().publication;

    relationships.add_edge(EdgeKind::Likes, p[1].id, x.id).unwrap();
    assert_eq!(relationships.like_count(x.id).unwrap(), 1);
    assert_eq!(
        relationships.liked_by(x.id).unwrap(),
        BTreeSet::from([p[1].id])
    );

    publications.delete(x.id).unwrap();
    assert!(!relationships
        .neighbors(EdgeKind::Likes, p[1].id)
        .unwrap()
        .contains(&x.id));
    assert_eq!(relationships.like_count(x.id).unwrap(), 0);
}

#[test]
fn favourites_and_likes_are_independent_relations() {
    let session = session();
    let p = publishers(&session, &["alice", "bob"]);
    let publications = session.publications().unwrap();
    let relationships = session.relationships().unwrap();
    let post = publications.create(p[0].id, "post").unwrap().publication;

    relationships.favourite(p[1].id, post.id).unwrap();
    assert_eq!(
        relationships.favourites_of(p[1].id).unwrap(),
        BTreeSet::from([post.id])
    );
    assert_eq!(
        relationships.favourited_by(post.id).unwrap(),
        BTreeSet::from([p[1].id])
    );
    assert!(relationships.likes_of(p[1].id).unwrap().is_empty());

    relationships.like(p[1].id, post.id).unwrap();
    relationships.unfavourite(p[1].id, post.id).unwrap();
    assert!(relationships.favourited_by(post.id).unwrap().is_empty());
    assert_eq!(
        relationships.likes_of(p[1].id).unwrap(),
        BTreeSet::from([post.id])
    );

    relationships.unlike(p[1].id, post.id).unwrap();
    assert!(relationships.liked_by(post.id).unwrap().is_empty());
}

#[test]
fn manual_mentions_and_tags_use_the_same_edge_set() {
    let session = session();
    let p = publishers(&session, &["alice", "bob"]);
    let post = session
        .publications()
        .unwrap()
        .create(p[0].id, "no tokens here")
        .unwrap()
        .publication;
    let tag = session.tags().unwrap().get_or_create("misc").unwrap();
    let relationships = session.relationships().unwrap();

    relationships.mention(post.id, p[1].id).unwrap();
    relationships.tag_publication(post.id, tag.id).unwrap();

    assert_eq!(
        relationships.mentions_in(post.id).unwrap(),
        BTreeSet::from([p[1].id])
    );
    assert_eq!(
        relationships.publications_mentioning(p[1].id).unwrap(),
        BTreeSet::from([post.id])
    );
    assert_eq!(
        relationships.publications_with_tag(tag.id).unwrap(),
        BTreeSet::from([post.id])
    );

    relationships.untag_publication(post.id, tag.id).unwrap();
    assert!(relationships.tags_of(post.id).unwrap().is_empty());
}

#[test]
fn edges_require_endpoints_of_the_right_kind() {
    let session = session();
    let p = publishers(&session, &["alice", "bob"]);
    let post = session
        .publications()
        .unwrap()
        .create(p[0].id, "post")
        .unwrap()
        .publication;
    let relationships = session.relationships().unwrap();
    let ghost = Uuid::new_v4();

    match relationships.follow(p[0].id, ghost).unwrap_err() {
        GraphError::NotFound(EntityRef::Publisher(id)) => assert_eq!(id, ghost),
        other => panic!("unexpected error: {other}"),
    }
    match relationships.like(p[1].id, ghost).unwrap_err() {
        GraphError::NotFound(EntityRef::Publication(id)) => assert_eq!(id, ghost),
        other => panic!("unexpected error: {other}"),
    }
    // A publication id is not a publisher.
    match relationships.follow(p[0].id, post.id).unwrap_err() {
        GraphError::NotFound(EntityRef::Publisher(id)) => assert_eq!(id, post.id),
        other => panic!("unexpected error: {other}"),
    }
    match relationships.tag_publication(post.id, ghost).unwrap_err() {
        GraphError::NotFound(EntityRef::Tag(id)) => assert_eq!(id, ghost),
        other => panic!("unexpected error: {other}"),
    }

    assert!(relationships.following(p[0].id).unwrap().is_empty());
    assert!(relationships.likes_of(p[1].id).unwrap().is_empty());
}

#[test]
fn queries_on_unknown_ids_return_empty_results() {
    let session = session();
    let relationships = session.relationships().unwrap();
    let ghost = Uuid::new_v4();

    for kind in EdgeKind::ALL {
        assert!(relationships.neighbors(kind, ghost).unwrap().is_empty());
        assert!(relationships.inverse_neighbors(kind, ghost).unwrap().is_empty());
        assert_eq!(
            relationships
                .degree(kind, ghost, EdgeDirection::Outbound)
                .unwrap(),
            0
        );
    }
    assert!(!relationships
        .remove_edge(EdgeKind::Follows, ghost, Uuid::new_v4())
        .unwrap()
        .changed);
}

#[test]
fn edge_counts_cover_every_kind() {
    let session = session();
    let p = publishers(&session, &["alice", "bob"]);
    session
        .publications()
        .unwrap()
        .create(p[0].id, "hey @bob #intro")
        .unwrap();
    let relationships = session.relationships().unwrap();
    relationships.follow(p[1].id, p[0].id).unwrap();

    let counts = relationships.edge_counts().unwrap();
    assert_eq!(counts.len(), EdgeKind::ALL.len());
    let count_of = |kind: EdgeKind| {
        counts
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, n)| *n)
            .unwrap()
    };
    assert_eq!(count_of(EdgeKind::Follows), 1);
    assert_eq!(count_of(EdgeKind::Mentions), 1);
    assert_eq!(count_of(EdgeKind::HasTag), 1);
    assert_eq!(count_of(EdgeKind::Likes), 0);
    assert_eq!(count_of(EdgeKind::Favourites), 0);
}
