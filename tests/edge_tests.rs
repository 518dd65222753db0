use docgraph::driver::DriverCall;
use docgraph::schema::Schema;
use docgraph::{
    Document, DocumentType, EdgeEnd, EdgeType, EndpointRef, EntityError, EntityFactory,
    EntityOptions, MemoryDatabase, ModelConfig, StoreError, WriteOptions,
};
use serde_json::json;

struct Graph {
    db: MemoryDatabase,
    people: DocumentType,
    places: DocumentType,
    knows: EdgeType,
}

async fn graph_with(config: ModelConfig) -> Graph {
    let db = MemoryDatabase::new();
    let factory = EntityFactory::with_config(db.handle(), config);
    let people = factory.document_type(
        |t, _| Schema::new().field("name", t.string().required()),
        EntityOptions::new().name("people"),
    );
    let places = factory.document_type(
        |t, _| Schema::new().field("name", t.string().required()),
        EntityOptions::new().name("places"),
    );
    let knows = factory.edge_type(
        |t, _| Schema::new().field("since", t.integer()),
        EntityOptions::new().name("knows"),
    );
    people.setup().await.unwrap();
    places.setup().await.unwrap();
    knows.setup().await.unwrap();
    Graph {
        db,
        people,
        places,
        knows,
    }
}

async fn graph() -> Graph {
    graph_with(ModelConfig::default()).await
}

async fn stored(kind: &DocumentType, key: &str, name: &str) -> Document {
    let mut doc = kind.skeleton();
    doc.merge(json!({ "name": name, "_key": key }), false)
        .await
        .unwrap();
    doc.create(WriteOptions::default()).await.unwrap();
    doc
}

async fn link(graph: &Graph, from: &Document, to: &Document) {
    let mut edge = graph.knows.instantiate(json!({})).await.unwrap();
    edge.from(from).to(to);
    edge.create().await.unwrap();
}

fn names(docs: &[Document]) -> Vec<String> {
    docs.iter()
        .map(|doc| doc.get_as::<String>("name").unwrap().unwrap())
        .collect()
}

#[tokio::test]
async fn single_edge_is_keyed_by_its_endpoints() {
    let graph = graph().await;
    let x = stored(&graph.people, "x", "X").await;
    let y = stored(&graph.people, "y", "Y").await;

    let mut edge = graph.knows.instantiate(json!({ "since": 2020 })).await.unwrap();
    edge.from(&x).to(&y).single();

    let payload = edge.validated_data().unwrap();
    assert_eq!(payload["_key"], json!("x-y"));
    assert_eq!(payload["_from"], json!("people/x"));
    assert_eq!(payload["_to"], json!("people/y"));
    assert_eq!(payload["since"], json!(2020));

    edge.create().await.unwrap();
    assert_eq!(edge.key(), Some("x-y"));
    assert_eq!(edge.id().as_deref(), Some("knows/x-y"));

    let mut duplicate = graph.knows.instantiate(json!({})).await.unwrap();
    duplicate.from(&x).to(&y).single();
    let err = duplicate.create().await.unwrap_err();
    assert!(matches!(
        err,
        EntityError::Store(StoreError::UniqueConstraint(key)) if key == "x-y"
    ));
}

#[tokio::test]
async fn plain_edges_get_store_assigned_keys() {
    let graph = graph().await;
    let x = stored(&graph.people, "x", "X").await;
    let y = stored(&graph.people, "y", "Y").await;

    let mut edge = graph.knows.instantiate(json!({})).await.unwrap();
    edge.from(&x).to(EndpointRef::new("people", "y"));
    assert!(!edge.validated_data().unwrap().contains_key("_key"));

    edge.create().await.unwrap();
    assert!(edge.key().is_some());
    assert_eq!(edge.handle().from.as_deref(), Some("people/x"));
    assert_eq!(edge.handle().to.as_deref(), Some("people/y"));
    assert_eq!(edge.to_ref(), Some(&EndpointRef::from(&y)));
}

#[tokio::test]
async fn missing_endpoint_fails_before_the_store() {
    let graph = graph().await;
    let x = stored(&graph.people, "x", "X").await;
    graph.db.clear_operations().await;

    let mut edge = graph.knows.instantiate(json!({})).await.unwrap();
    edge.from(&x);
    let err = edge.create().await.unwrap_err();
    assert!(matches!(err, EntityError::MissingEndpoint(EdgeEnd::To)));

    let mut edge = graph.knows.instantiate(json!({})).await.unwrap();
    edge.to(&x);
    let err = edge.validated_data().unwrap_err();
    assert!(matches!(err, EntityError::MissingEndpoint(EdgeEnd::From)));

    assert!(graph.db.operations().await.is_empty());
}

#[tokio::test]
async fn unsaved_endpoint_is_unresolved() {
    let graph = graph().await;
    let x = stored(&graph.people, "x", "X").await;
    let draft = graph.people.instantiate(json!({ "name": "Draft" })).await.unwrap();

    let mut edge = graph.knows.instantiate(json!({})).await.unwrap();
    edge.from(&x).to(&draft);
    let err = edge.validated_data().unwrap_err();
    assert!(matches!(err, EntityError::UnresolvedEndpoint(EdgeEnd::To)));
}

#[tokio::test]
async fn remove_deletes_the_stored_edge() {
    let graph = graph().await;
    let x = stored(&graph.people, "x", "X").await;
    let y = stored(&graph.people, "y", "Y").await;

    let mut edge = graph.knows.instantiate(json!({})).await.unwrap();
    edge.from(&x).to(&y).single();
    edge.create().await.unwrap();
    assert_eq!(graph.db.documents("knows").await.unwrap().len(), 1);

    edge.remove().await.unwrap();
    assert!(graph.db.documents("knows").await.unwrap().is_empty());

    let mut unsaved = graph.knows.instantiate(json!({})).await.unwrap();
    unsaved.from(&x).to(&y);
    assert!(matches!(
        unsaved.remove().await.unwrap_err(),
        EntityError::MissingKey(_)
    ));
}

#[tokio::test]
async fn deep_tree_returns_reachable_vertices_of_the_origin_type() {
    let graph = graph().await;
    let a = stored(&graph.people, "a", "A").await;
    let b = stored(&graph.people, "b", "B").await;
    let c = stored(&graph.people, "c", "C").await;
    let d = stored(&graph.people, "d", "D").await;
    let hub = stored(&graph.places, "hub", "Hub").await;
    let _loner = stored(&graph.people, "e", "E").await;

    // a -> b -> c, a -> hub -> d, c -> a
    link(&graph, &a, &b).await;
    link(&graph, &b, &c).await;
    link(&graph, &a, &hub).await;
    link(&graph, &hub, &d).await;
    link(&graph, &c, &a).await;
    graph.db.clear_operations().await;

    let tree = graph.knows.build_deep_tree(&a).await.unwrap();

    assert_eq!(names(&tree), vec!["A", "B", "C", "D"]);
    assert!(tree.iter().all(|doc| doc.entity_type().name() == "people"));
    assert_eq!(tree[1].key(), Some("b"));
    assert_eq!(
        graph.db.operations().await,
        vec![DriverCall::Traversal {
            collection: "knows".to_string(),
            start: "people/a".to_string(),
        }]
    );
}

#[tokio::test]
async fn deep_tree_respects_the_configured_depth() {
    let graph = graph_with(ModelConfig::new().traversal_max_depth(1)).await;
    let a = stored(&graph.people, "a", "A").await;
    let b = stored(&graph.people, "b", "B").await;
    let c = stored(&graph.people, "c", "C").await;
    link(&graph, &a, &b).await;
    link(&graph, &b, &c).await;

    let tree = graph.knows.build_deep_tree(&a).await.unwrap();
    assert_eq!(names(&tree), vec!["A", "B"]);

    let from_leaf = graph.knows.build_deep_tree(&c).await.unwrap();
    assert_eq!(names(&from_leaf), vec!["C"]);
}

#[tokio::test]
async fn deep_tree_needs_a_stored_origin() {
    let graph = graph().await;
    let draft = graph.people.instantiate(json!({ "name": "Draft" })).await.unwrap();

    let err = graph.knows.build_deep_tree(&draft).await.unwrap_err();
    assert!(matches!(err, EntityError::MissingKey(collection) if collection == "people"));
}

#[tokio::test]
async fn deep_tree_finds_vertices_behind_a_shortcut() {
    let graph = graph_with(ModelConfig::new().traversal_max_depth(2)).await;
    let a = stored(&graph.people, "a", "A").await;
    let b = stored(&graph.people, "b", "B").await;
    let c = stored(&graph.people, "c", "C").await;
    let d = stored(&graph.people, "d", "D").await;
    link(&graph, &a, &b).await;
    link(&graph, &b, &c).await;
    link(&graph, &a, &c).await;
    link(&graph, &c, &d).await;

    let tree = graph.knows.build_deep_tree(&a).await.unwrap();
    assert_eq!(names(&tree), vec!["A", "B", "C", "D"]);
}
