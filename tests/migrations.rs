use album_server::test_support::TestDatabase;
use sqlx::migrate::Migrator;

static TEST_MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn table_count(pool: &sqlx::PgPool, table: &str) -> i64 {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = 'public' AND table_name = $1",
    )
    .bind(table)
    .fetch_one(pool)
    .await
    .expect("lookup succeeded")
}

#[tokio::test]
async fn migrations_apply_and_revert_cleanly() {
    let Some(test_db) = TestDatabase::provision_or_skip("migration revert test").await else {
        return;
    };

    let pool = test_db.pool_clone();

    TEST_MIGRATOR.run(&pool).await.expect("migrations run");

    TEST_MIGRATOR
        .undo(&pool, 0)
        .await
        .expect("migrations revert");

    for table in ["albums", "images", "album_image_relations", "users"] {
        assert_eq!(
            table_count(&pool, table).await,
            0,
            "{table} should be dropped after revert"
        );
    }

    TEST_MIGRATOR.run(&pool).await.expect("migrations rerun");

    assert_eq!(table_count(&pool, "album_image_relations").await, 1);
    assert_eq!(table_count(&pool, "users").await, 1);

    test_db.close().await.expect("failed to drop test database");
}

#[tokio::test]
async fn schema_enforces_album_and_image_uniqueness() {
    let Some(test_db) = TestDatabase::provision_or_skip("schema uniqueness test").await else {
        return;
    };
    let pool = test_db.pool_clone();

    sqlx::query("INSERT INTO albums (name) VALUES ('golang')")
        .execute(&pool)
        .await
        .expect("first album");
    let duplicate = sqlx::query("INSERT INTO albums (name) VALUES ('golang')")
        .execute(&pool)
        .await;
    assert!(duplicate.is_err());

    let empty_name = sqlx::query("INSERT INTO albums (name) VALUES ('')")
        .execute(&pool)
        .await;
    assert!(empty_name.is_err());

    sqlx::query("INSERT INTO images (image_url, image_file) VALUES ('http://x/a.jpg', 'uploads/a.jpg')")
        .execute(&pool)
        .await
        .expect("first image");
    let duplicate_image = sqlx::query(
        "INSERT INTO images (image_url, image_file) VALUES ('http://x/a.jpg', 'uploads/other.jpg')",
    )
    .execute(&pool)
    .await;
    assert!(duplicate_image.is_err());

    test_db.close().await.expect("failed to drop test database");
}
