use serde_json::json;
use socialgraph_core::{
    EdgeDirection, EdgeKind, ErrorKind, GraphConfig, GraphPayload, GraphRequest, GraphResponse,
    GraphSession, OpenAccountDirectory, Publisher,
};
use uuid::Uuid;

fn session() -> GraphSession<OpenAccountDirectory> {
    GraphSession::open(GraphConfig::default(), OpenAccountDirectory).unwrap()
}

fn create_publisher(session: &GraphSession<OpenAccountDirectory>, handle: &str) -> Publisher {
    let response = session.handle(GraphRequest::CreatePublisher {
        account_ref: None,
        handle: handle.to_string(),
    });
    match response.payload {
        Some(GraphPayload::Publisher(publisher)) => publisher,
        other => panic!("unexpected payload: {other:?}"),
    }
}

#[test]
fn requests_deserialize_from_tagged_json() {
    let id = Uuid::new_v4();
    let request: GraphRequest = serde_json::from_value(json!({
        "op": "degree",
        "kind": "follows",
        "id": id.to_string(),
        "direction": "inbound",
    }))
    .unwrap();
    assert_eq!(
        request,
        GraphRequest::Degree {
            kind: EdgeKind::Follows,
            id,
            direction: EdgeDirection::Inbound,
        }
    );
    assert_eq!(request.op_name(), "degree");

    let list: GraphRequest = serde_json::from_value(json!({ "op": "list_tags" })).unwrap();
    assert_eq!(list, GraphRequest::ListTags);

    let create: GraphRequest =
        serde_json::from_value(json!({ "op": "create_publisher", "handle": "alice" })).unwrap();
    assert_eq!(
        create,
        GraphRequest::CreatePublisher {
            account_ref: None,
            handle: "alice".to_string(),
        }
    );
}

#[test]
fn successful_request_returns_payload_envelope() {
    let session = session();
    let alice = create_publisher(&session, "alice");
    let bob = create_publisher(&session, "bob");

    let response = session.handle(GraphRequest::AddEdge {
        kind: EdgeKind::Follows,
        from: alice.id,
        to: bob.id,
    });
    assert!(response.ok);
    assert!(response.error.is_none());
    match response.payload {
        Some(GraphPayload::Edge(state)) => {
            assert!(state.present);
            assert!(state.changed);
            assert_eq!(state.edge.to, bob.id);
        }
        other => panic!("unexpected payload: {other:?}"),
    }

    let followers = session.handle(GraphRequest::InverseNeighbors {
        kind: EdgeKind::Follows,
        to: bob.id,
    });
    match &followers.payload {
        Some(GraphPayload::Ids(ids)) => assert!(ids.contains(&alice.id)),
        other => panic!("unexpected payload: {other:?}"),
    }

    let value = serde_json::to_value(&followers).unwrap();
    assert_eq!(value["ok"], json!(true));
    assert_eq!(value["payload"]["type"], json!("ids"));
    assert!(value.get("error").is_none());
}

#[test]
fn failures_carry_stable_error_kinds() {
    let session = session();
    let alice = create_publisher(&session, "alice");

    let self_follow = session.handle(GraphRequest::AddEdge {
        kind: EdgeKind::Follows,
        from: alice.id,
        to: alice.id,
    });
    assert!(!self_follow.ok);
    assert!(self_follow.payload.is_none());
    assert_eq!(self_follow.error_kind(), Some(ErrorKind::InvalidOperation));

    let duplicate = session.handle(GraphRequest::CreatePublisher {
        account_ref: None,
        handle: "ALICE".to_string(),
    });
    assert_eq!(duplicate.error_kind(), Some(ErrorKind::Conflict));

    let missing = session.handle(GraphRequest::GetPublication { id: Uuid::new_v4() });
    assert_eq!(missing.error_kind(), Some(ErrorKind::NotFound));

    let blank = session.handle(GraphRequest::CreatePublication {
        author_id: alice.id,
        body: "  ".to_string(),
    });
    assert_eq!(blank.error_kind(), Some(ErrorKind::InvalidInput));

    let value = serde_json::to_value(&self_follow).unwrap();
    assert_eq!(value["ok"], json!(false));
    assert_eq!(value["error"]["kind"], json!("invalid_operation"));
    assert!(value["error"]["message"].as_str().unwrap().contains("follows"));
}

#[test]
fn created_publication_reports_derived_links() {
    let session = session();
    let alice = create_publisher(&session, "alice");
    let bob = create_publisher(&session, "bob");

    let response = session.handle(GraphRequest::CreatePublication {
        author_id: alice.id,
        body: "hello @bob #intro".to_string(),
    });
    let publication_id = match response.payload {
        Some(GraphPayload::CreatedPublication {
            publication,
            mentioned,
            tagged,
        }) => {
            assert_eq!(mentioned, vec![bob.id]);
            assert_eq!(tagged.len(), 1);
            publication.id
        }
        other => panic!("unexpected payload: {other:?}"),
    };

    let recent = session.handle(GraphRequest::RecentTags { days: 1 });
    match recent.payload {
        Some(GraphPayload::Tags(tags)) => {
            assert_eq!(tags.len(), 1);
            assert_eq!(tags[0].name, "intro");
        }
        other => panic!("unexpected payload: {other:?}"),
    }

    let deleted = session.handle(GraphRequest::DeletePublication { id: publication_id });
    assert_eq!(deleted.payload, Some(GraphPayload::Deleted));
    let count = session.handle(GraphRequest::Degree {
        kind: EdgeKind::Mentions,
        id: bob.id,
        direction: EdgeDirection::Inbound,
    });
    assert_eq!(count.payload, Some(GraphPayload::Count(0)));
}

#[test]
fn response_envelope_round_trips_through_json() {
    let session = session();
    let alice = create_publisher(&session, "alice");
    let response = session.handle(GraphRequest::GetPublisher { id: alice.id });

    let text = serde_json::to_string(&response).unwrap();
    let decoded: GraphResponse = serde_json::from_str(&text).unwrap();
    assert_eq!(decoded, response);
    assert_eq!(decoded.payload, Some(GraphPayload::Publisher(alice)));
}

#[test]
fn lookup_requests_reach_every_store() {
    let session = session();
    let linked = session.handle(GraphRequest::CreatePublisher {
        account_ref: Some("acct-7".to_string()),
        handle: "Émile".to_string(),
    });
    let emile = match linked.payload {
        Some(GraphPayload::Publisher(publisher)) => publisher,
        other => panic!("unexpected payload: {other:?}"),
    };
    let bob = create_publisher(&session, "bob");

    let by_account = session.handle(GraphRequest::FindPublisherByAccount {
        account_ref: "acct-7".to_string(),
    });
    assert_eq!(
        by_account.payload,
        Some(GraphPayload::MaybePublisher(Some(emile.clone())))
    );
    let unknown_account = session.handle(GraphRequest::FindPublisherByAccount {
        account_ref: "acct-404".to_string(),
    });
    assert_eq!(
        unknown_account.payload,
        Some(GraphPayload::MaybePublisher(None))
    );

    session.handle(GraphRequest::CreatePublication {
        author_id: bob.id,
        body: "thanks @émile #Merci".to_string(),
    });
    let tag = session.handle(GraphRequest::FindTagByName {
        name: "#MERCI".to_string(),
    });
    match &tag.payload {
        Some(GraphPayload::MaybeTag(Some(tag))) => assert_eq!(tag.name, "merci"),
        other => panic!("unexpected payload: {other:?}"),
    }
    let since = session.handle(GraphRequest::TagsUsedSince { since_epoch_ms: 0 });
    match since.payload {
        Some(GraphPayload::Tags(tags)) => assert_eq!(tags.len(), 1),
        other => panic!("unexpected payload: {other:?}"),
    }

    let mentioned = session.handle(GraphRequest::InverseNeighbors {
        kind: EdgeKind::Mentions,
        to: emile.id,
    });
    match mentioned.payload {
        Some(GraphPayload::Ids(ids)) => assert_eq!(ids.len(), 1),
        other => panic!("unexpected payload: {other:?}"),
    }

    session.handle(GraphRequest::AddEdge {
        kind: EdgeKind::Follows,
        from: bob.id,
        to: emile.id,
    });
    let contains = session.handle(GraphRequest::ContainsEdge {
        kind: EdgeKind::Follows,
        from: bob.id,
        to: emile.id,
    });
    assert_eq!(contains.payload, Some(GraphPayload::Contains(true)));
    let reverse = session.handle(GraphRequest::ContainsEdge {
        kind: EdgeKind::Follows,
        from: emile.id,
        to: bob.id,
    });
    assert_eq!(reverse.payload, Some(GraphPayload::Contains(false)));
}
