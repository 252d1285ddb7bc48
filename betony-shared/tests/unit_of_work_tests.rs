/// Integration tests for the Unit of Work and the stores bound to it

mod common;

use betony_shared::db::{StoreError, UnitOfWork};
use betony_shared::models::account::{Account, CreateAccount};
use betony_shared::models::comment::CreateComment;
use betony_shared::models::post::CreatePost;
use betony_shared::models::role::{DEFAULT_ROLE_ID, DEFAULT_ROLE_NAME};
use common::TestDb;

fn new_account(email: &str) -> CreateAccount {
    CreateAccount {
        name: "Tester".to_string(),
        email: email.to_string(),
        password_hash: "$argon2id$placeholder".to_string(),
        is_admin: false,
        role_id: DEFAULT_ROLE_ID,
    }
}

/// Commits one account and returns it
async fn seed_account(db: &TestDb, email: &str) -> Account {
    let mut uow = UnitOfWork::begin(&db.pool).await.unwrap();
    uow.roles().ensure_default_role().await.unwrap();
    let account = uow.accounts().insert(new_account(email)).await.unwrap();
    uow.commit().await.unwrap();
    account
}

#[tokio::test]
async fn test_commit_persists_changes() {
    let db = TestDb::new().await;
    let account = seed_account(&db, "alice@x.com").await;

    let mut uow = UnitOfWork::begin(&db.pool).await.unwrap();
    let found = uow.accounts().find_by_email("alice@x.com").await.unwrap();

    assert_eq!(found.map(|a| a.id), Some(account.id));
}

#[tokio::test]
async fn test_dropped_unit_rolls_back() {
    let db = TestDb::new().await;

    {
        let mut uow = UnitOfWork::begin(&db.pool).await.unwrap();
        uow.roles().ensure_default_role().await.unwrap();
        uow.accounts()
            .insert(new_account("ghost@x.com"))
            .await
            .expect("insert should succeed inside the unit");
        // dropped without commit
    }

    let mut later = UnitOfWork::begin(&db.pool).await.unwrap();
    assert!(later.accounts().find_by_email("ghost@x.com").await.unwrap().is_none());
    assert_eq!(later.accounts().count().await.unwrap(), 0);
    assert!(later.roles().list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_explicit_rollback() {
    let db = TestDb::new().await;

    let mut uow = UnitOfWork::begin(&db.pool).await.unwrap();
    uow.roles().ensure_default_role().await.unwrap();
    uow.accounts().insert(new_account("ghost@x.com")).await.unwrap();
    uow.rollback().await.expect("rollback should succeed");

    assert_eq!(db.count_accounts_with_email("ghost@x.com").await, 0);
}

#[tokio::test]
async fn test_early_return_rolls_back() {
    async fn register_then_fail(db: &TestDb) -> Result<(), StoreError> {
        let mut uow = UnitOfWork::begin(&db.pool).await?;
        uow.roles().ensure_default_role().await?;
        uow.accounts().insert(new_account("half@x.com")).await?;
        // Second insert of the same email fails before commit is reached
        uow.accounts().insert(new_account("half@x.com")).await?;
        uow.commit().await
    }

    let db = TestDb::new().await;
    let result = register_then_fail(&db).await;

    assert!(matches!(result, Err(StoreError::Duplicate)));
    assert_eq!(db.count_accounts_with_email("half@x.com").await, 0);
}

#[tokio::test]
async fn test_aborted_unit_leaves_no_rows_for_later_units() {
    let db = TestDb::new().await;

    let aborted = async {
        let mut uow = UnitOfWork::begin(&db.pool).await?;
        uow.roles().ensure_default_role().await?;
        uow.accounts().insert(new_account("carol@x.com")).await?;
        Err::<(), StoreError>(StoreError::Database(sqlx::Error::PoolTimedOut))
    }
    .await;
    assert!(aborted.is_err());

    assert_eq!(db.count_accounts_with_email("carol@x.com").await, 0);
}

#[tokio::test]
async fn test_uncommitted_writes_invisible_to_other_sessions() {
    let db = TestDb::new().await;
    seed_account(&db, "alice@x.com").await;

    let mut uow = UnitOfWork::begin(&db.pool).await.unwrap();
    uow.accounts().insert(new_account("bob@x.com")).await.unwrap();

    assert_eq!(db.count_accounts_with_email("bob@x.com").await, 0);

    uow.commit().await.unwrap();
    assert_eq!(db.count_accounts_with_email("bob@x.com").await, 1);
}

#[tokio::test]
async fn test_duplicate_email_is_store_duplicate() {
    let db = TestDb::new().await;
    seed_account(&db, "alice@x.com").await;

    let mut uow = UnitOfWork::begin(&db.pool).await.unwrap();
    let err = uow
        .accounts()
        .insert(new_account("alice@x.com"))
        .await
        .expect_err("second insert should fail");

    assert!(err.is_duplicate());
    drop(uow);
    assert_eq!(db.count_accounts_with_email("alice@x.com").await, 1);
}

#[tokio::test]
async fn test_ensure_default_role_is_idempotent() {
    let db = TestDb::new().await;

    for _ in 0..2 {
        let mut uow = UnitOfWork::begin(&db.pool).await.unwrap();
        let role = uow.roles().ensure_default_role().await.unwrap();
        assert_eq!(role.id, DEFAULT_ROLE_ID);
        assert_eq!(role.name, DEFAULT_ROLE_NAME);
        uow.commit().await.unwrap();
    }

    let mut uow = UnitOfWork::begin(&db.pool).await.unwrap();
    uow.roles().ensure_default_role().await.unwrap();
    let roles = uow.roles().list_all().await.unwrap();

    assert_eq!(roles.len(), 1);
    assert_eq!(roles[0].id, DEFAULT_ROLE_ID);
    assert_eq!(roles[0].description.as_deref(), Some("Default user role"));
    assert_eq!(uow.roles().find_by_id(2).await.unwrap(), None);
}

#[tokio::test]
async fn test_ensure_default_role_ignores_same_name_under_other_id() {
    let db = TestDb::new().await;

    sqlx::query("INSERT INTO roles (id, name) VALUES (7, ?)")
        .bind(DEFAULT_ROLE_NAME)
        .execute(&db.pool)
        .await
        .unwrap();

    let mut uow = UnitOfWork::begin(&db.pool).await.unwrap();
    let role = uow
        .roles()
        .ensure_default_role()
        .await
        .expect("default role should be created next to the other row");
    uow.commit().await.unwrap();

    assert_eq!(role.id, DEFAULT_ROLE_ID);

    let mut uow = UnitOfWork::begin(&db.pool).await.unwrap();
    let ids: Vec<i64> = uow.roles().list_all().await.unwrap().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![DEFAULT_ROLE_ID, 7]);
}

#[tokio::test]
async fn test_email_uniqueness_ignores_case() {
    let db = TestDb::new().await;
    seed_account(&db, "Mixed@X.com").await;

    let mut uow = UnitOfWork::begin(&db.pool).await.unwrap();
    let result = uow.accounts().insert(new_account("mixed@x.com")).await;

    assert!(matches!(result, Err(StoreError::Duplicate)));
}

#[tokio::test]
async fn test_account_store_count_list_and_set_admin() {
    let db = TestDb::new().await;
    let alice = seed_account(&db, "alice@x.com").await;
    let bob = seed_account(&db, "bob@x.com").await;

    let mut uow = UnitOfWork::begin(&db.pool).await.unwrap();
    assert_eq!(uow.accounts().count().await.unwrap(), 2);

    let ids: Vec<i64> = uow.accounts().list_all().await.unwrap().iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![alice.id, bob.id]);

    let promoted = uow.accounts().set_admin(bob.id, true).await.unwrap().unwrap();
    assert!(promoted.is_admin);
    assert!(uow.accounts().set_admin(9999, true).await.unwrap().is_none());
    uow.commit().await.unwrap();

    let mut uow = UnitOfWork::begin(&db.pool).await.unwrap();
    assert!(uow.accounts().find_by_id(bob.id).await.unwrap().unwrap().is_admin);
}

#[tokio::test]
async fn test_multi_store_changes_commit_together() {
    let db = TestDb::new().await;
    let alice = seed_account(&db, "alice@x.com").await;
    let bob = seed_account(&db, "bob@x.com").await;

    let mut uow = UnitOfWork::begin(&db.pool).await.unwrap();
    let post = uow
        .posts()
        .create(CreatePost {
            title: "Hello".to_string(),
            content: "First post".to_string(),
            user_id: alice.id,
        })
        .await
        .unwrap();
    uow.comments()
        .create(CreateComment {
            content: "Welcome".to_string(),
            user_id: bob.id,
            post_id: post.id,
        })
        .await
        .unwrap();
    uow.likes().create(bob.id, post.id).await.unwrap();
    uow.friendships().create(bob.id, alice.id).await.unwrap();
    uow.commit().await.unwrap();

    let mut uow = UnitOfWork::begin(&db.pool).await.unwrap();
    let stored = uow.posts().find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored.likes_count, 1);
    assert_eq!(uow.likes().count_for_post(post.id).await.unwrap(), 1);
    assert_eq!(uow.comments().list_for_post(post.id).await.unwrap().len(), 1);
    assert_eq!(uow.posts().list_by_user(alice.id).await.unwrap().len(), 1);
    assert!(uow.friendships().find(bob.id, alice.id).await.unwrap().is_some());
    assert!(uow.friendships().find(alice.id, bob.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_multi_store_changes_roll_back_together() {
    let db = TestDb::new().await;
    let alice = seed_account(&db, "alice@x.com").await;

    {
        let mut uow = UnitOfWork::begin(&db.pool).await.unwrap();
        let post = uow
            .posts()
            .create(CreatePost {
                title: "Draft".to_string(),
                content: "Never published".to_string(),
                user_id: alice.id,
            })
            .await
            .unwrap();
        uow.likes().create(alice.id, post.id).await.unwrap();
    }

    let mut uow = UnitOfWork::begin(&db.pool).await.unwrap();
    assert!(uow.posts().list_by_user(alice.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_like_and_friendship_constraints() {
    let db = TestDb::new().await;
    let alice = seed_account(&db, "alice@x.com").await;
    let bob = seed_account(&db, "bob@x.com").await;

    let mut uow = UnitOfWork::begin(&db.pool).await.unwrap();
    let post = uow
        .posts()
        .create(CreatePost {
            title: "Hello".to_string(),
            content: "Body".to_string(),
            user_id: alice.id,
        })
        .await
        .unwrap();

    uow.likes().create(bob.id, post.id).await.unwrap();
    let err = uow.likes().create(bob.id, post.id).await.unwrap_err();
    assert!(err.is_duplicate());

    uow.friendships().create(alice.id, bob.id).await.unwrap();
    assert!(uow.friendships().create(alice.id, bob.id).await.unwrap_err().is_duplicate());

    let self_friend = uow.friendships().create(alice.id, alice.id).await.unwrap_err();
    assert!(!self_friend.is_duplicate());

    assert!(uow.likes().delete_by_user_and_post(bob.id, post.id).await.unwrap());
    assert!(!uow.likes().delete_by_user_and_post(bob.id, post.id).await.unwrap());
    let stored = uow.posts().find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored.likes_count, 0);

    assert!(uow.friendships().delete_by_users(alice.id, bob.id).await.unwrap());
    assert!(uow.friendships().list_for_user(alice.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_deleting_post_removes_comments() {
    let db = TestDb::new().await;
    let alice = seed_account(&db, "alice@x.com").await;

    let mut uow = UnitOfWork::begin(&db.pool).await.unwrap();
    let post = uow
        .posts()
        .create(CreatePost {
            title: "Hello".to_string(),
            content: "Body".to_string(),
            user_id: alice.id,
        })
        .await
        .unwrap();
    let comment = uow
        .comments()
        .create(CreateComment {
            content: "First".to_string(),
            user_id: alice.id,
            post_id: post.id,
        })
        .await
        .unwrap();

    assert!(uow.posts().delete(post.id).await.unwrap());
    assert!(uow.comments().list_for_post(post.id).await.unwrap().is_empty());
    assert!(!uow.comments().delete(comment.id).await.unwrap());
    assert!(!uow.posts().delete(post.id).await.unwrap());
}
