use fotolog::db;
use fotolog::db::photos::{self, FeedFilter, NewPost};
use fotolog::db::users;
use fotolog::state::DbPool;
use rusqlite::params;
use tempfile::TempDir;

fn setup() -> (TempDir, DbPool) {
    let tmp = TempDir::new().unwrap();
    let pool = db::create_pool(&tmp.path().join("test.db")).expect("Failed to create test database");
    db::run_migrations(&pool).expect("Failed to run migrations");
    (tmp, pool)
}

fn add_post(pool: &DbPool, user_id: &str, category_id: &str, title: &str) -> String {
    photos::insert(
        pool,
        &NewPost {
            user_id,
            category_id,
            title,
            comment: "a comment",
            image1: "a.jpg",
            image2: None,
        },
    )
    .unwrap()
}

#[test]
fn deleting_a_user_deletes_their_posts() {
    let (_tmp, pool) = setup();
    let alice = users::create(&pool, "alice", "hash").unwrap().unwrap();
    let bob = users::create(&pool, "bob", "hash").unwrap().unwrap();
    add_post(&pool, &alice, "other", "alice 1");
    add_post(&pool, &alice, "food", "alice 2");
    let bobs = add_post(&pool, &bob, "other", "bob 1");

    let conn = pool.get().unwrap();
    conn.execute("DELETE FROM users WHERE id = ?1", params![alice])
        .unwrap();

    let remaining: i64 = conn
        .query_row("SELECT COUNT(*) FROM photo_posts", [], |row| row.get(0))
        .unwrap();
    assert_eq!(remaining, 1);
    assert!(photos::get(&pool, &bobs).unwrap().is_some());
}

#[test]
fn deleting_a_user_deletes_their_sessions() {
    let (_tmp, pool) = setup();
    let alice = users::create(&pool, "alice", "hash").unwrap().unwrap();
    fotolog::auth::session::create_session(&pool, &alice, 1).unwrap();

    let conn = pool.get().unwrap();
    conn.execute("DELETE FROM users WHERE id = ?1", params![alice])
        .unwrap();

    let sessions: i64 = conn
        .query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get(0))
        .unwrap();
    assert_eq!(sessions, 0);
}

#[test]
fn referenced_category_cannot_be_deleted() {
    let (_tmp, pool) = setup();
    let alice = users::create(&pool, "alice", "hash").unwrap().unwrap();
    let post_id = add_post(&pool, &alice, "food", "lunch");

    let conn = pool.get().unwrap();
    let result = conn.execute("DELETE FROM categories WHERE id = 'food'", []);
    assert!(result.is_err(), "delete of a referenced category must fail");

    // Once no posts reference it, the delete goes through
    conn.execute("DELETE FROM photo_posts WHERE id = ?1", params![post_id])
        .unwrap();
    conn.execute("DELETE FROM categories WHERE id = 'food'", [])
        .unwrap();
}

#[test]
fn feed_across_users_is_newest_first() {
    let (_tmp, pool) = setup();
    let alice = users::create(&pool, "alice", "hash").unwrap().unwrap();
    let bob = users::create(&pool, "bob", "hash").unwrap().unwrap();

    let old = add_post(&pool, &alice, "other", "old");
    let new = add_post(&pool, &bob, "other", "new");
    let conn = pool.get().unwrap();
    conn.execute(
        "UPDATE photo_posts SET posted_at = '2026-01-01 00:00:00.000' WHERE id = ?1",
        params![old],
    )
    .unwrap();
    conn.execute(
        "UPDATE photo_posts SET posted_at = '2026-02-01 00:00:00.000' WHERE id = ?1",
        params![new],
    )
    .unwrap();

    let page = photos::list_page(&pool, &FeedFilter::All, 1, 9).unwrap();
    assert_eq!(page.posts[0].title, "new");
    assert_eq!(page.posts[1].title, "old");
    for pair in page.posts.windows(2) {
        assert!(pair[0].posted_at >= pair[1].posted_at);
    }
}
