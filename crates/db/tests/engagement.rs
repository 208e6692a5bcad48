//! Integration tests for the engagement sets: likes, ratings, comments,
//! favorites, views, and the delete cascade contract.

use sqlx::PgPool;

use peerhub_db::models::comment::CreateComment;
use peerhub_db::models::project::CreateProject;
use peerhub_db::models::user::VerifiedIdentity;
use peerhub_db::repositories::{CommentRepo, ProjectRepo, UserRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn identity(subject: &str, name: &str) -> VerifiedIdentity {
    VerifiedIdentity {
        subject: subject.to_string(),
        email: format!("{subject}@example.com"),
        display_name: name.to_string(),
        photo_url: String::new(),
    }
}

fn new_project(title: &str, tags: &[&str]) -> CreateProject {
    CreateProject {
        title: title.to_string(),
        description: "A description long enough to be realistic.".to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        github_url: "https://github.com/example/demo".to_string(),
        live_url: String::new(),
        image_url: String::new(),
    }
}

async fn seed_user(pool: &PgPool, subject: &str, name: &str) -> i64 {
    UserRepo::upsert_identity(pool, &identity(subject, name))
        .await
        .unwrap()
        .id
}

async fn seed_project(pool: &PgPool, author_id: i64, title: &str) -> i64 {
    ProjectRepo::create(pool, author_id, &new_project(title, &["rust"]))
        .await
        .unwrap()
        .id
}

// ---------------------------------------------------------------------------
// Test: Like toggling alternates state
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_like_toggle_alternates(pool: PgPool) {
    let author = seed_user(&pool, "author", "Author").await;
    let liker = seed_user(&pool, "liker", "Liker").await;
    let project = seed_project(&pool, author, "Toggle Me").await;

    assert!(ProjectRepo::toggle_like(&pool, project, liker).await.unwrap());
    assert_eq!(ProjectRepo::count_likes(&pool, project).await.unwrap(), 1);

    assert!(!ProjectRepo::toggle_like(&pool, project, liker).await.unwrap());
    assert_eq!(ProjectRepo::count_likes(&pool, project).await.unwrap(), 0);

    assert!(ProjectRepo::toggle_like(&pool, project, liker).await.unwrap());
    assert_eq!(ProjectRepo::count_likes(&pool, project).await.unwrap(), 1);
}

// ---------------------------------------------------------------------------
// Test: Concurrent likes by different users both persist
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_concurrent_likes_by_different_users(pool: PgPool) {
    let author = seed_user(&pool, "author", "Author").await;
    let alice = seed_user(&pool, "alice", "Alice").await;
    let bob = seed_user(&pool, "bob", "Bob").await;
    let project = seed_project(&pool, author, "Popular").await;

    let (a, b) = tokio::join!(
        ProjectRepo::toggle_like(&pool, project, alice),
        ProjectRepo::toggle_like(&pool, project, bob),
    );
    assert!(a.unwrap());
    assert!(b.unwrap());

    assert_eq!(ProjectRepo::count_likes(&pool, project).await.unwrap(), 2);
}

// ---------------------------------------------------------------------------
// Test: Rating upsert replaces, never duplicates
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_rating_upsert_replaces(pool: PgPool) {
    let author = seed_user(&pool, "author", "Author").await;
    let rater = seed_user(&pool, "rater", "Rater").await;
    let project = seed_project(&pool, author, "Rate Me").await;

    ProjectRepo::upsert_rating(&pool, project, rater, 4).await.unwrap();
    ProjectRepo::upsert_rating(&pool, project, rater, 5).await.unwrap();

    let ratings = ProjectRepo::ratings_for(&pool, &[project]).await.unwrap();
    assert_eq!(ratings.len(), 1, "Re-rating must replace the previous entry");
    assert_eq!(ratings[0].rating, 5);
}

// ---------------------------------------------------------------------------
// Test: Ratings from multiple users accumulate per user
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_ratings_one_entry_per_user(pool: PgPool) {
    let author = seed_user(&pool, "author", "Author").await;
    let alice = seed_user(&pool, "alice", "Alice").await;
    let bob = seed_user(&pool, "bob", "Bob").await;
    let project = seed_project(&pool, author, "Rated").await;

    ProjectRepo::upsert_rating(&pool, project, alice, 4).await.unwrap();
    ProjectRepo::upsert_rating(&pool, project, bob, 5).await.unwrap();

    let ratings = ProjectRepo::ratings_for(&pool, &[project]).await.unwrap();
    assert_eq!(ratings.len(), 2);
    let sum: i64 = ratings.iter().map(|r| i64::from(r.rating)).sum();
    assert_eq!(sum, 9);
}

// ---------------------------------------------------------------------------
// Test: Rating outside 1-5 is rejected by the store
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_rating_range_enforced_by_check(pool: PgPool) {
    let author = seed_user(&pool, "author", "Author").await;
    let rater = seed_user(&pool, "rater", "Rater").await;
    let project = seed_project(&pool, author, "Strict").await;

    let result = ProjectRepo::upsert_rating(&pool, project, rater, 6).await;
    assert!(result.is_err(), "Rating of 6 should violate the CHECK");
}

// ---------------------------------------------------------------------------
// Test: View increments are atomic under concurrency
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_concurrent_view_increments(pool: PgPool) {
    let author = seed_user(&pool, "author", "Author").await;
    let project = seed_project(&pool, author, "Watched").await;

    let (a, b) = tokio::join!(
        ProjectRepo::increment_views(&pool, project),
        ProjectRepo::increment_views(&pool, project),
    );
    a.unwrap();
    b.unwrap();

    let row = ProjectRepo::find_by_id(&pool, project).await.unwrap().unwrap();
    assert_eq!(row.views, 2, "Both increments must land");
}

// ---------------------------------------------------------------------------
// Test: Deleting a project cascades likes/ratings but not comments
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_cascade_contract(pool: PgPool) {
    let author = seed_user(&pool, "author", "Author").await;
    let fan = seed_user(&pool, "fan", "Fan").await;
    let project = seed_project(&pool, author, "Doomed").await;

    ProjectRepo::toggle_like(&pool, project, fan).await.unwrap();
    ProjectRepo::upsert_rating(&pool, project, fan, 5).await.unwrap();
    CommentRepo::create(
        &pool,
        &CreateComment {
            project_id: project,
            author_id: fan,
            content: "So long".to_string(),
            parent_comment_id: None,
        },
    )
    .await
    .unwrap();

    assert!(ProjectRepo::delete(&pool, project).await.unwrap());

    // Likes and ratings live on the project row; they go with it.
    assert!(ProjectRepo::likes_for(&pool, &[project]).await.unwrap().is_empty());
    assert!(ProjectRepo::ratings_for(&pool, &[project]).await.unwrap().is_empty());

    // Comments are removed in a separate step.
    let orphans = CommentRepo::list_for_project(&pool, project).await.unwrap();
    assert_eq!(orphans.len(), 1, "Comment cleanup is the caller's job");

    let removed = CommentRepo::delete_for_project(&pool, project).await.unwrap();
    assert_eq!(removed, 1);
    assert!(CommentRepo::list_for_project(&pool, project).await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Test: Deleting a parent comment clears the child's reference
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_parent_comment_delete_sets_null(pool: PgPool) {
    let author = seed_user(&pool, "author", "Author").await;
    let project = seed_project(&pool, author, "Threaded").await;

    let parent = CommentRepo::create(
        &pool,
        &CreateComment {
            project_id: project,
            author_id: author,
            content: "Top level".to_string(),
            parent_comment_id: None,
        },
    )
    .await
    .unwrap();

    let child = CommentRepo::create(
        &pool,
        &CreateComment {
            project_id: project,
            author_id: author,
            content: "A reply".to_string(),
            parent_comment_id: Some(parent.id),
        },
    )
    .await
    .unwrap();
    assert_eq!(child.parent_comment_id, Some(parent.id));

    sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(parent.id)
        .execute(&pool)
        .await
        .unwrap();

    let remaining = CommentRepo::find_with_author(&pool, child.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(remaining.parent_comment_id, None);
}

// ---------------------------------------------------------------------------
// Test: Comments list newest first with author summary
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_comments_newest_first_with_author(pool: PgPool) {
    let author = seed_user(&pool, "author", "Author").await;
    let commenter = seed_user(&pool, "commenter", "Commenter").await;
    let project = seed_project(&pool, author, "Discussed").await;

    for text in ["first", "second", "third"] {
        CommentRepo::create(
            &pool,
            &CreateComment {
                project_id: project,
                author_id: commenter,
                content: text.to_string(),
                parent_comment_id: None,
            },
        )
        .await
        .unwrap();
    }

    let comments = CommentRepo::list_for_project(&pool, project).await.unwrap();
    assert_eq!(comments.len(), 3);
    assert_eq!(comments[0].content, "third");
    assert_eq!(comments[2].content, "first");
    assert_eq!(comments[0].author_display_name, "Commenter");
}

// ---------------------------------------------------------------------------
// Test: Favorites toggle and read-side filtering
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_favorites_toggle_and_filtering(pool: PgPool) {
    let author = seed_user(&pool, "author", "Author").await;
    let fan = seed_user(&pool, "fan", "Fan").await;
    let keeper = seed_project(&pool, author, "Keeper").await;
    let doomed = seed_project(&pool, author, "Doomed").await;

    assert!(UserRepo::toggle_favorite(&pool, fan, keeper).await.unwrap());
    assert!(UserRepo::toggle_favorite(&pool, fan, doomed).await.unwrap());

    let favorites = ProjectRepo::favorites_of(&pool, fan).await.unwrap();
    assert_eq!(favorites.len(), 2);

    // Deleting a favorited project leaves the raw id behind but the
    // joined read drops it.
    ProjectRepo::delete(&pool, doomed).await.unwrap();

    let ids = UserRepo::favorite_project_ids(&pool, fan).await.unwrap();
    assert_eq!(ids.len(), 2, "Raw favorites keep the dangling id");

    let favorites = ProjectRepo::favorites_of(&pool, fan).await.unwrap();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].id, keeper);

    // Toggling off removes the row.
    assert!(!UserRepo::toggle_favorite(&pool, fan, keeper).await.unwrap());
    assert!(ProjectRepo::favorites_of(&pool, fan).await.unwrap().is_empty());
}
