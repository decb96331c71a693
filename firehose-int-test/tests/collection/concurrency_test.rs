use firehose::collection::{DocumentLookup, FindOptions};
use firehose::loader::LoaderConfig;
use firehose::Collection;
use firehose_int_test::test_util::{
    cleanup, create_test_context, seed_users, user_transform, UsersCollection,
};
use futures_util::future::join_all;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_lookups_from_many_tasks() {
    let ctx = create_test_context();
    seed_users(&ctx).await.unwrap();
    let users = ctx.users().unwrap();
    users.find_one("1", FindOptions::default()).await.unwrap();

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let users = users.clone();
            tokio::spawn(async move {
                let id = if i % 2 == 0 { "1" } else { "2" };
                users
                    .find_one(id, FindOptions::default())
                    .await
                    .map(|user| user.fields().name.clone())
            })
        })
        .collect();

    for handle in handles {
        let name = handle.await.unwrap().unwrap();
        assert!(name == "Ant Man" || name == "Bird Man");
    }
    assert_eq!(ctx.store().gets("users/1"), 1);

    cleanup(ctx);
}

#[tokio::test]
async fn test_max_batch_size_still_answers_every_key() {
    let ctx = create_test_context();
    seed_users(&ctx).await.unwrap();
    let users: UsersCollection = Collection::with_config(
        ctx.db().collection("users").unwrap(),
        user_transform,
        LoaderConfig::new().with_max_batch_size(2),
    );

    let results = join_all(
        ["1", "2", "3", "4"]
            .into_iter()
            .map(|id| users.find_one(id, FindOptions::default())),
    )
    .await;
    assert!(results[0].is_ok());
    assert!(results[1].is_ok());
    assert!(results[2].is_ok());
    assert!(results[3].as_ref().unwrap_err().is_not_found());
    assert_eq!(ctx.store().total_gets(), 4);

    cleanup(ctx);
}

#[tokio::test]
async fn test_uncached_collection_reads_every_time() {
    let ctx = create_test_context();
    seed_users(&ctx).await.unwrap();
    let users: UsersCollection = Collection::with_config(
        ctx.db().collection("users").unwrap(),
        user_transform,
        LoaderConfig::new().with_cache(false),
    );

    users.find_one("1", FindOptions::default()).await.unwrap();
    users.find_one("1", FindOptions::default()).await.unwrap();
    assert_eq!(ctx.store().gets("users/1"), 2);

    cleanup(ctx);
}
