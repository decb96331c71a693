use firehose::collection::{no_cache, DocumentLookup, FindOptions};
use firehose::document::{Document, FieldValue, Patch, PersistState};
use firehose::errors::ErrorKind;
use firehose_int_test::test_util::{
    cleanup, create_test_context, create_user, posts_of, PostData, PostDoc, UserData,
};
use serde_json::json;

#[tokio::test]
async fn test_create_edit_save_and_delete() {
    let ctx = create_test_context();
    let users = ctx.users().unwrap();

    let mut user = create_user(&users, Some("1"), UserData::new("Taro")).unwrap();
    assert_eq!(ctx.stored("users/1").await.unwrap(), None);
    user.save().await.unwrap();
    assert_eq!(
        ctx.stored("users/1").await.unwrap(),
        Some(json!({ "name": "Taro" }))
    );

    user.edit(Patch::new().set("name", "Taro Yamada"))
        .unwrap()
        .save()
        .await
        .unwrap();
    assert_eq!(
        ctx.stored("users/1").await.unwrap(),
        Some(json!({ "name": "Taro Yamada" }))
    );
    let saved = users.find_one("1", no_cache()).await.unwrap();
    assert_eq!(saved.fields(), &UserData::new("Taro Yamada"));

    user.delete().await.unwrap();
    assert_eq!(user.state(), PersistState::Deleted);
    assert_eq!(ctx.stored("users/1").await.unwrap(), None);

    let err = users.find_one("1", no_cache()).await.unwrap_err();
    assert!(err.is_not_found());
    let fresh = ctx.users().unwrap();
    assert!(fresh.find_one("1", FindOptions::default()).await.unwrap_err().is_not_found());

    cleanup(ctx);
}

#[tokio::test]
async fn test_saved_document_round_trips() {
    let ctx = create_test_context();
    let users = ctx.users().unwrap();
    let mut user = create_user(&users, None, UserData::new("Masami")).unwrap();
    user.save().await.unwrap();

    // a fresh collection has an empty cache
    let found = ctx
        .users()
        .unwrap()
        .find_one(user.id(), FindOptions::default())
        .await
        .unwrap();
    assert_eq!(found.id(), user.id());
    assert_eq!(found.locator(), user.locator());
    assert_eq!(found.fields(), &UserData::new("Masami"));
    assert_eq!(found.state(), PersistState::Persisted);

    cleanup(ctx);
}

#[tokio::test]
async fn test_data_never_includes_children() {
    let ctx = create_test_context();
    let users = ctx.users().unwrap();
    let mut user = create_user(&users, Some("1"), UserData::new("Taro")).unwrap();

    let posts = posts_of(&user).unwrap();
    assert_eq!(posts.location().path(), "users/1/posts");
    assert_eq!(
        serde_json::Value::Object(user.data().unwrap()),
        json!({ "name": "Taro" })
    );

    user.save().await.unwrap();
    assert_eq!(
        ctx.stored("users/1").await.unwrap(),
        Some(json!({ "name": "Taro" }))
    );

    cleanup(ctx);
}

#[tokio::test]
async fn test_sub_collection_through_child_handle() {
    let ctx = create_test_context();
    let users = ctx.users().unwrap();
    let mut user = create_user(&users, Some("1"), UserData::new("Taro")).unwrap();
    user.save().await.unwrap();

    let posts = posts_of(&user).unwrap();
    let mut post: PostDoc =
        Document::create(posts, Some("a"), PostData::new("p1", "hello")).unwrap();
    post.save().await.unwrap();
    assert_eq!(
        ctx.stored("users/1/posts/a").await.unwrap(),
        Some(json!({ "__id": "p1", "content": "hello" }))
    );

    let found = users.find_one("1", FindOptions::default()).await.unwrap();
    let post = posts_of(&found)
        .unwrap()
        .find_one("a", FindOptions::default())
        .await
        .unwrap();
    assert_eq!(post.fields().content, "hello");

    cleanup(ctx);
}

#[tokio::test]
async fn test_edit_with_sentinels() {
    let ctx = create_test_context();
    let users = ctx.users().unwrap();
    let mut user = create_user(&users, Some("1"), UserData::new("Taro")).unwrap();

    user.edit(Patch::new().with("name", FieldValue::Unchanged)).unwrap();
    assert_eq!(user.fields().name, "Taro");

    // name is required, so deleting it cannot map back to UserData
    let err = user.edit(Patch::new().delete("name")).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::ObjectMapping);
    assert_eq!(user.fields().name, "Taro");

    cleanup(ctx);
}

#[tokio::test]
async fn test_save_after_delete_recreates() {
    let ctx = create_test_context();
    let users = ctx.users().unwrap();
    let mut user = create_user(&users, Some("1"), UserData::new("Taro")).unwrap();
    user.save().await.unwrap();
    user.delete().await.unwrap();
    user.save().await.unwrap();

    assert_eq!(user.state(), PersistState::Persisted);
    assert_eq!(
        ctx.stored("users/1").await.unwrap(),
        Some(json!({ "name": "Taro" }))
    );

    cleanup(ctx);
}

#[tokio::test]
async fn test_storage_failures_surface() {
    let ctx = create_test_context();
    let users = ctx.users().unwrap();
    let mut user = create_user(&users, Some("1"), UserData::new("Taro")).unwrap();

    ctx.store().backing().close();
    let err = user.save().await.unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::StorageWrite);
    let err = user.delete().await.unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::StorageWrite);
    let err = users.find_one("1", FindOptions::default()).await.unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::StorageRead);
    ctx.store().backing().reopen();

    cleanup(ctx);
}
