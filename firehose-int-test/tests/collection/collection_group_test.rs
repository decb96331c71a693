use firehose::collection::{
    no_cache, prime, CollectionGroup, DocumentLookup, FindOptions, QueryOptions,
};
use firehose::document::Document;
use firehose::errors::ErrorKind;
use firehose::filter::field;
use firehose_int_test::test_util::{
    cleanup, create_test_context, seed_posts, PostData, PostsCollectionGroup,
};
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[tokio::test]
async fn test_find_one_by_logical_id() {
    let ctx = create_test_context();
    seed_posts(&ctx).await.unwrap();
    let posts = ctx.posts_group().unwrap();

    let post = posts.find_one("p3", FindOptions::default()).await.unwrap();
    assert_eq!(post.locator().path(), "users/2/posts/a");
    assert_eq!(post.fields(), &PostData::new("p3", "third"));

    // physical ids are not keys
    let err = posts.find_one("a", FindOptions::default()).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(posts.find_one_by_id("nope", FindOptions::default()).await.is_none());

    cleanup(ctx);
}

#[tokio::test]
async fn test_group_lookup_is_cached() {
    let ctx = create_test_context();
    seed_posts(&ctx).await.unwrap();
    let posts = ctx.posts_group().unwrap();

    posts.find_one("p1", FindOptions::default()).await.unwrap();
    ctx.put("users/1/posts/a", json!({ "__id": "p1", "content": "edited" }))
        .await
        .unwrap();

    let cached = posts.find_one("p1", FindOptions::default()).await.unwrap();
    assert_eq!(cached.fields().content, "first");
    let fresh = posts.find_one("p1", no_cache()).await.unwrap();
    assert_eq!(fresh.fields().content, "edited");
    assert_eq!(ctx.store().queries(), 2);

    cleanup(ctx);
}

#[tokio::test]
async fn test_concurrent_group_lookups() {
    let ctx = create_test_context();
    seed_posts(&ctx).await.unwrap();
    let posts = ctx.posts_group().unwrap();

    let lookups = ["p1", "p2", "p1", "p1"]
        .into_iter()
        .map(|id| posts.find_one(id, FindOptions::default()));
    let results = join_all(lookups).await;
    assert!(results.iter().all(|r| r.is_ok()));
    // one query per distinct logical id
    assert_eq!(ctx.store().queries(), 2);

    cleanup(ctx);
}

#[tokio::test]
async fn test_primed_group_query_avoids_lookup_query() {
    let ctx = create_test_context();
    seed_posts(&ctx).await.unwrap();
    let posts = ctx.posts_group().unwrap();

    let found = posts
        .find_many_by_query(|q| q.filter(field("content").eq("second")), prime())
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(ctx.store().queries(), 1);

    let post = posts.find_one("p2", FindOptions::default()).await.unwrap();
    assert_eq!(post.locator().path(), "users/1/posts/b");
    assert_eq!(ctx.store().queries(), 1);

    // primed under the logical id, not the physical one
    assert!(!posts.clear("b"));
    assert!(posts.clear("p2"));

    cleanup(ctx);
}

#[tokio::test]
async fn test_unprimable_results_are_still_returned() {
    let ctx = create_test_context();
    seed_posts(&ctx).await.unwrap();
    ctx.put("users/3/posts/z", json!({ "__id": 7, "content": "numeric id" }))
        .await
        .unwrap();
    let raw = CollectionGroup::<PostData, serde_json::Value>::new(
        ctx.db().collection_group("posts").unwrap(),
        "__id",
        |snapshot| Ok(snapshot.get("content").cloned().unwrap_or_default()),
    )
    .unwrap();

    let all = raw.find_many_by_query(|q| q, prime()).await.unwrap();
    assert_eq!(all.len(), 4);
    assert_eq!(raw.cache().len(), 3);

    cleanup(ctx);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct AccountData {
    profile: Profile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Profile {
    ext_id: String,
}

#[tokio::test]
async fn test_nested_id_field() {
    let ctx = create_test_context();
    ctx.put("orgs/1/accounts/x", json!({ "profile": { "ext_id": "EXT-1" } }))
        .await
        .unwrap();
    ctx.put("orgs/2/accounts/x", json!({ "profile": { "ext_id": "EXT-2" } }))
        .await
        .unwrap();

    let accounts: CollectionGroup<AccountData, Document<AccountData>> = CollectionGroup::new(
        ctx.db().collection_group("accounts").unwrap(),
        "profile.ext_id",
        Document::hydrate,
    )
    .unwrap();
    let account = accounts.find_one("EXT-2", FindOptions::default()).await.unwrap();
    assert_eq!(account.locator().path(), "orgs/2/accounts/x");
    assert!(accounts.find_one("EXT-3", FindOptions::default()).await.is_err());

    cleanup(ctx);
}

#[tokio::test]
async fn test_invalid_id_field() {
    let ctx = create_test_context();
    for id_field in ["", "profile..ext_id", "__name__"] {
        let result: Result<PostsCollectionGroup, _> = CollectionGroup::new(
            ctx.db().collection_group("posts").unwrap(),
            id_field,
            Document::hydrate,
        );
        assert_eq!(result.unwrap_err().kind(), &ErrorKind::InvalidIdField);
    }
    cleanup(ctx);
}

#[tokio::test]
async fn test_query_options_default_does_not_prime() {
    let ctx = create_test_context();
    seed_posts(&ctx).await.unwrap();
    let posts = ctx.posts_group().unwrap();

    posts.find_many_by_query(|q| q, QueryOptions::default()).await.unwrap();
    assert!(posts.cache().is_empty());

    cleanup(ctx);
}
