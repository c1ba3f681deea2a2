
use std::env;

use gallery_backend::db::postgres::{checked_schema, create_pool, ensure_schema, PostgresRepository};
use gallery_backend::entities::image::Image;
use gallery_backend::entities::thumbnail::Thumbnail;

/// Needs a live server: `TEST_DATABASE_URL=postgres://... cargo test -- --ignored`
#[actix_rt::test]
#[ignore]
async fn postgres_backend_honours_the_contract() {
    let url = env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");
    let pool = create_pool(&url).await.expect("database reachable");
    ensure_schema(&pool, "gallery_test").await.expect("schema created");

    let images = PostgresRepository::<Image>::new(pool.clone(), "gallery_test").unwrap();
    let thumbnails = PostgresRepository::<Thumbnail>::new(pool, "gallery_test").unwrap();
    repository_contract::run_all(&images, &thumbnails).await;
}

#[test]
fn schema_names_are_checked() {
    assert!(checked_schema("gallery").is_ok());
    assert!(checked_schema("_gallery_2").is_ok());
    assert!(checked_schema("2gallery").is_err());
    assert!(checked_schema("gallery; DROP TABLE images").is_err());
    assert!(checked_schema("").is_err());
}
