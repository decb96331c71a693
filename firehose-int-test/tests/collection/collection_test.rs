use firehose::collection::{no_cache, prime, DocumentLookup, FindOptions, QueryOptions};
use firehose::filter::field;
use firehose::store::SortOrder;
use firehose_int_test::test_util::{cleanup, create_test_context, posts_of, seed_users, UserData};
use futures_util::future::join_all;
use serde_json::json;

#[tokio::test]
async fn test_find_one() {
    let ctx = create_test_context();
    seed_users(&ctx).await.unwrap();
    let users = ctx.users().unwrap();

    let user = users.find_one("1", FindOptions::default()).await.unwrap();
    assert_eq!(user.id(), "1");
    assert_eq!(user.locator(), &ctx.db().doc("users/1").unwrap());
    assert_eq!(
        serde_json::Value::Object(user.data().unwrap()),
        json!({ "name": "Ant Man" })
    );
    assert!(posts_of(&user).is_some());

    let err = users.find_one("1_000", FindOptions::default()).await.unwrap_err();
    assert!(err.is_not_found());

    cleanup(ctx);
}

#[tokio::test]
async fn test_cached_lookup_until_no_cache() {
    let ctx = create_test_context();
    seed_users(&ctx).await.unwrap();
    let users = ctx.users().unwrap();

    users.find_one("1", FindOptions::default()).await.unwrap();
    ctx.put("users/1", json!({ "name": "Ant Prince" })).await.unwrap();

    let user = users.find_one("1", FindOptions::default()).await.unwrap();
    assert_eq!(user.fields(), &UserData::new("Ant Man"));

    let user = users.find_one("1", no_cache()).await.unwrap();
    assert_eq!(user.fields(), &UserData::new("Ant Prince"));

    // the fresh read replaced the cached one
    let user = users.find_one("1", FindOptions::default()).await.unwrap();
    assert_eq!(user.fields(), &UserData::new("Ant Prince"));
    assert_eq!(ctx.store().gets("users/1"), 2);

    cleanup(ctx);
}

#[tokio::test]
async fn test_find_one_by_id_swallows_errors() {
    let ctx = create_test_context();
    seed_users(&ctx).await.unwrap();
    let users = ctx.users().unwrap();

    let found = users.find_one_by_id("2", FindOptions::default()).await;
    assert_eq!(found.map(|u| u.fields().name.clone()), Some("Bird Man".to_string()));
    assert!(users.find_one_by_id("1_000", FindOptions::default()).await.is_none());

    cleanup(ctx);
}

#[tokio::test]
async fn test_concurrent_lookups_fetch_once() {
    let ctx = create_test_context();
    seed_users(&ctx).await.unwrap();
    let users = ctx.users().unwrap();

    let lookups = (0..5).map(|_| users.find_one("1", FindOptions::default()));
    let results = join_all(lookups).await;
    assert!(results.iter().all(|r| r.is_ok()));
    assert_eq!(ctx.store().gets("users/1"), 1);

    let (a, b, c) = tokio::join!(
        users.find_one("2", FindOptions::default()),
        users.find_one("3", FindOptions::default()),
        users.find_one("2", FindOptions::default()),
    );
    assert_eq!(a.unwrap().fields().name, "Bird Man");
    assert_eq!(b.unwrap().fields().name, "Cat Man");
    assert_eq!(c.unwrap().fields().name, "Bird Man");
    assert_eq!(ctx.store().gets("users/2"), 1);
    assert_eq!(ctx.store().gets("users/3"), 1);

    cleanup(ctx);
}

#[tokio::test]
async fn test_missing_lookup_is_memoized() {
    let ctx = create_test_context();
    seed_users(&ctx).await.unwrap();
    let users = ctx.users().unwrap();

    assert!(users.find_one("9", FindOptions::default()).await.is_err());
    ctx.put("users/9", json!({ "name": "Late Man" })).await.unwrap();
    assert!(users.find_one("9", FindOptions::default()).await.is_err());
    assert_eq!(ctx.store().gets("users/9"), 1);

    assert!(users.clear("9"));
    let user = users.find_one("9", FindOptions::default()).await.unwrap();
    assert_eq!(user.fields().name, "Late Man");

    cleanup(ctx);
}

#[tokio::test]
async fn test_find_many_by_query() {
    let ctx = create_test_context();
    seed_users(&ctx).await.unwrap();
    let users = ctx.users().unwrap();

    let all = users.find_many_by_query(|q| q, QueryOptions::default()).await.unwrap();
    let ids: Vec<&str> = all.iter().map(|u| u.id()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);

    let after_ant = users
        .find_many_by_query(
            |q| q.filter(field("name").gt("Ant Man")).order_by("name", SortOrder::Descending),
            QueryOptions::default(),
        )
        .await
        .unwrap();
    let names: Vec<&str> = after_ant.iter().map(|u| u.fields().name.as_str()).collect();
    assert_eq!(names, vec!["Cat Man", "Bird Man"]);

    // nothing was primed
    assert!(users.cache().is_empty());
    users.find_one("2", FindOptions::default()).await.unwrap();
    assert_eq!(ctx.store().gets("users/2"), 1);

    cleanup(ctx);
}

#[tokio::test]
async fn test_primed_query_avoids_fetch() {
    let ctx = create_test_context();
    seed_users(&ctx).await.unwrap();
    ctx.put("users/5", json!({ "name": "Fox Man" })).await.unwrap();
    let users = ctx.users().unwrap();

    let found = users
        .find_many_by_query(|q| q.filter(field("name").eq("Fox Man")), prime())
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id(), "5");

    let user = users.find_one("5", FindOptions::default()).await.unwrap();
    assert_eq!(user.fields().name, "Fox Man");
    assert_eq!(ctx.store().gets("users/5"), 0);

    cleanup(ctx);
}

#[tokio::test]
async fn test_clones_share_cache() {
    let ctx = create_test_context();
    seed_users(&ctx).await.unwrap();
    let users = ctx.users().unwrap();
    let shared = users.clone();

    users.find_one("1", FindOptions::default()).await.unwrap();
    shared.find_one("1", FindOptions::default()).await.unwrap();
    assert_eq!(ctx.store().gets("users/1"), 1);

    // a separate instance has its own cache
    ctx.users()
        .unwrap()
        .find_one("1", FindOptions::default())
        .await
        .unwrap();
    assert_eq!(ctx.store().gets("users/1"), 2);

    users.clear_all();
    assert!(shared.cache().is_empty());

    cleanup(ctx);
}
