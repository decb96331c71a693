use firehose_int_test::test_util::{cleanup, create_test_context, create_user, UserData};
use serde_json::json;

#[tokio::test]
async fn test_batch_input() {
    let ctx = create_test_context();
    let users = ctx.users().unwrap();
    let user1 = create_user(&users, Some("1"), UserData::new("Taro")).unwrap();
    let user2 = create_user(&users, Some("2"), UserData::new("Masami")).unwrap();

    let mut batch = ctx.db().batch();
    batch
        .set(user1.batch_input().unwrap())
        .set(user2.batch_input().unwrap());
    batch.commit().await.unwrap();

    assert_eq!(
        ctx.stored("users/1").await.unwrap(),
        Some(json!({ "name": "Taro" }))
    );
    assert_eq!(
        ctx.stored("users/2").await.unwrap(),
        Some(json!({ "name": "Masami" }))
    );

    cleanup(ctx);
}

#[tokio::test]
async fn test_batch_mixes_sets_and_deletes() {
    let ctx = create_test_context();
    let users = ctx.users().unwrap();
    let mut user1 = create_user(&users, Some("1"), UserData::new("Taro")).unwrap();
    user1.save().await.unwrap();
    let user2 = create_user(&users, Some("2"), UserData::new("Masami")).unwrap();

    let mut batch = ctx.db().batch();
    batch
        .delete(user1.locator().clone())
        .set(user2.batch_input().unwrap());
    assert_eq!(batch.len(), 2);
    batch.commit().await.unwrap();

    assert_eq!(ctx.stored("users/1").await.unwrap(), None);
    assert!(ctx.stored("users/2").await.unwrap().is_some());
    assert_eq!(ctx.store().backing().len(), 1);

    cleanup(ctx);
}

#[tokio::test]
async fn test_failed_batch_writes_nothing() {
    let ctx = create_test_context();
    let users = ctx.users().unwrap();
    let user1 = create_user(&users, Some("1"), UserData::new("Taro")).unwrap();

    let mut batch = ctx.db().batch();
    batch.set(user1.batch_input().unwrap());
    ctx.store().backing().close();
    assert!(batch.commit().await.is_err());
    ctx.store().backing().reopen();

    assert!(ctx.store().backing().is_empty());
    cleanup(ctx);
}
