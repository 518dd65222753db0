use docgraph::driver::DriverCall;
use docgraph::schema::Schema;
use docgraph::{
    DocumentType, EntityError, EntityFactory, EntityOptions, FindOptions, MemoryDatabase,
    StoreError, WriteOptions,
};
use serde_json::json;

async fn books(db: &MemoryDatabase) -> DocumentType {
    let factory = EntityFactory::new(db.handle());
    let books = factory.document_type(
        |t, _| {
            Schema::new()
                .field("title", t.string().required())
                .field("genre", t.string())
                .field("pages", t.integer().min(1))
        },
        EntityOptions::new().name("books"),
    );
    books.setup().await.unwrap();
    books
}

#[tokio::test]
async fn setup_creates_the_collection_once() {
    let db = MemoryDatabase::new();
    let books = books(&db).await;
    books.setup().await.unwrap();

    assert_eq!(
        db.operations().await,
        vec![
            DriverCall::GetCollection("books".to_string()),
            DriverCall::CreateCollection("books".to_string()),
            DriverCall::GetCollection("books".to_string()),
        ]
    );
}

#[tokio::test]
async fn save_creates_then_updates() {
    let db = MemoryDatabase::new();
    let books = books(&db).await;
    db.clear_operations().await;

    let mut book = books
        .instantiate(json!({ "title": "Dune", "pages": 412 }))
        .await
        .unwrap();
    book.save(WriteOptions::default()).await.unwrap();

    let key = book.key().unwrap().to_string();
    let first_rev = book.revision().unwrap().to_string();
    assert_eq!(book.id(), Some(format!("books/{}", key)));

    book.set("genre", "science fiction").unwrap();
    book.save(WriteOptions::default()).await.unwrap();

    assert_ne!(book.revision(), Some(first_rev.as_str()));
    assert_eq!(
        db.operations().await,
        vec![
            DriverCall::Save("books".to_string()),
            DriverCall::Update {
                collection: "books".to_string(),
                key: key.clone(),
            },
        ]
    );

    let stored = db.documents("books").await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0]["genre"], json!("science fiction"));
    assert_eq!(stored[0]["_key"], json!(key));
}

#[tokio::test]
async fn invalid_documents_never_reach_the_store() {
    let db = MemoryDatabase::new();
    let books = books(&db).await;
    db.clear_operations().await;

    let mut book = books.instantiate(json!({ "pages": 0 })).await.unwrap();
    let err = book.create(WriteOptions::default()).await.unwrap_err();

    assert!(matches!(err, EntityError::Validation(_)));
    assert!(db.operations().await.is_empty());
    assert_eq!(book.key(), None);
}

#[tokio::test]
async fn unknown_fields_are_not_stored() {
    let db = MemoryDatabase::new();
    let books = books(&db).await;

    let mut book = books
        .instantiate(json!({ "title": "Emma", "shelf": 4 }))
        .await
        .unwrap();
    book.create(WriteOptions::default()).await.unwrap();

    let stored = db.documents("books").await.unwrap();
    assert!(stored[0].get("shelf").is_none());
    assert_eq!(book.get("shelf"), Some(&json!(4)));
}

#[tokio::test]
async fn update_without_key_fails() {
    let db = MemoryDatabase::new();
    let books = books(&db).await;

    let mut book = books.instantiate(json!({ "title": "Emma" })).await.unwrap();
    let err = book.update(WriteOptions::default()).await.unwrap_err();

    assert!(matches!(err, EntityError::MissingKey(collection) if collection == "books"));
}

#[tokio::test]
async fn stale_revision_conflicts() {
    let db = MemoryDatabase::new();
    let books = books(&db).await;

    let mut book = books.instantiate(json!({ "title": "Emma" })).await.unwrap();
    book.create(WriteOptions::default()).await.unwrap();
    let key = book.key().unwrap().to_string();

    let mut stale = books.find_by_id(&key, None).await.unwrap();
    book.set("genre", "novel").unwrap();
    book.save(WriteOptions::default()).await.unwrap();

    stale.set("pages", 474).unwrap();
    let err = stale.save(WriteOptions::default()).await.unwrap_err();
    assert!(matches!(err, EntityError::Store(StoreError::Conflict(_))));
}

#[tokio::test]
async fn find_honours_offset_and_limit() {
    let db = MemoryDatabase::new();
    let books = books(&db).await;

    for title in ["A", "B", "C", "D"] {
        let mut book = books
            .instantiate(json!({ "title": title, "genre": "poetry" }))
            .await
            .unwrap();
        book.create(WriteOptions::default()).await.unwrap();
    }
    let mut other = books
        .instantiate(json!({ "title": "E", "genre": "drama" }))
        .await
        .unwrap();
    other.create(WriteOptions::default()).await.unwrap();

    let page = books
        .find(json!({ "genre": "poetry" }), FindOptions::default().offset(1).limit(2))
        .await
        .unwrap();
    let titles: Vec<_> = page
        .iter()
        .map(|book| book.get_as::<String>("title").unwrap().unwrap())
        .collect();
    assert_eq!(titles, vec!["B", "C"]);
    assert!(page.iter().all(|book| book.key().is_some()));

    let everything = books.find(json!({}), FindOptions::default()).await.unwrap();
    assert_eq!(everything.len(), 5);
    assert_eq!(books.count().await.unwrap(), 5);
}

#[tokio::test]
async fn find_by_id_and_revision() {
    let db = MemoryDatabase::new();
    let books = books(&db).await;

    let mut book = books.instantiate(json!({ "title": "Emma" })).await.unwrap();
    book.create(WriteOptions::default()).await.unwrap();
    let key = book.key().unwrap().to_string();
    let rev = book.revision().unwrap().to_string();

    let found = books.find_by_id(&key, Some(&rev)).await.unwrap();
    assert_eq!(found.get("title"), Some(&json!("Emma")));
    assert_eq!(found.revision(), Some(rev.as_str()));
    assert!(found.get("_key").is_none());

    let missing = books.find_by_id(&key, Some("_stale")).await.unwrap_err();
    assert!(matches!(
        missing,
        EntityError::Store(StoreError::DocumentNotFound(_))
    ));
}

#[tokio::test]
async fn find_one_miss_is_an_error() {
    let db = MemoryDatabase::new();
    let books = books(&db).await;

    let err = books.find_one(json!({ "title": "Nope" })).await.unwrap_err();
    assert!(matches!(err, EntityError::Store(StoreError::DocumentNotFound(_))));
}

#[tokio::test]
async fn count_of_empty_collection_is_zero() {
    let db = MemoryDatabase::new();
    let books = books(&db).await;

    assert_eq!(books.count().await.unwrap(), 0);
}

#[tokio::test]
async fn silent_writes_leave_identity_unset() {
    let db = MemoryDatabase::new();
    let books = books(&db).await;

    let mut book = books.instantiate(json!({ "title": "Emma" })).await.unwrap();
    book.create(WriteOptions::default().silent(true)).await.unwrap();

    assert_eq!(book.key(), None);
    assert_eq!(db.documents("books").await.unwrap().len(), 1);
}
