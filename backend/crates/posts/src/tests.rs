//! Use-case tests for the posts crate
//!
//! Exercise the post lifecycle against an in-memory store that mirrors
//! the repository contracts, including place coalescing and the
//! reaction uniqueness invariant.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use crate::application::{
    AnonymizePostUseCase, CreatePostInput, CreatePostUseCase, DeletePostUseCase, ListPostsUseCase,
    PostDetailUseCase, ToggleReactionUseCase,
};
use crate::domain::entity::{genre::Genre, place::Place, post::Post};
use crate::domain::repository::{
    GenreRepository, NewPost, PlaceRepository, PostRecord, PostRepository, ReactionRepository,
    ToggleOutcome,
};
use crate::domain::value_object::coordinates::Coordinates;
use crate::error::{PostError, PostResult};
use kernel::ANONYMIZED_SENTINEL;
use kernel::error::kind::ErrorKind;
use kernel::id::{GenreId, PlaceId, PostId};

// ============================================================================
// In-memory fake store
// ============================================================================

#[derive(Default)]
struct FakeStore {
    posts: Mutex<HashMap<i64, Post>>,
    places: Mutex<Vec<Place>>,
    genres: Mutex<Vec<Genre>>,
    reactions: Mutex<HashSet<(String, i64)>>,
    next_post_id: AtomicI64,
    next_place_id: AtomicI64,
    /// Seconds offset so creation timestamps are strictly increasing
    clock: AtomicI64,
    fail_view_increment: AtomicBool,
}

impl FakeStore {
    fn new() -> Arc<Self> {
        let store = Self::default();
        store.next_post_id.store(1, Ordering::SeqCst);
        store.next_place_id.store(1, Ordering::SeqCst);
        store.genres.lock().unwrap().push(Genre {
            id: GenreId::from_i64(1),
            name: "グルメ".to_string(),
        });
        store.genres.lock().unwrap().push(Genre {
            id: GenreId::from_i64(2),
            name: "イベント".to_string(),
        });
        Arc::new(store)
    }

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    fn next_created_at(&self) -> DateTime<Utc> {
        let offset = self.clock.fetch_add(1, Ordering::SeqCst);
        Self::base_time() + Duration::seconds(offset)
    }

    fn set_created_at(&self, post_id: PostId, at: DateTime<Utc>) {
        self.posts
            .lock()
            .unwrap()
            .get_mut(&post_id.as_i64())
            .expect("post exists")
            .created_at = at;
    }

    fn place_count(&self) -> usize {
        self.places.lock().unwrap().len()
    }

    fn place_post_count(&self, id: PlaceId) -> i64 {
        self.places
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .expect("place exists")
            .post_count
    }

    fn coalesce(&self, coordinates: &Coordinates) -> PlaceId {
        let mut places = self.places.lock().unwrap();
        let matched = places
            .iter_mut()
            .filter(|p| {
                Coordinates::new(p.latitude, p.longitude)
                    .expect("stored coordinates valid")
                    .is_near(coordinates)
            })
            .min_by_key(|p| p.id);

        if let Some(place) = matched {
            place.post_count += 1;
            return place.id;
        }

        let id = PlaceId::from_i64(self.next_place_id.fetch_add(1, Ordering::SeqCst));
        places.push(Place {
            id,
            latitude: coordinates.latitude(),
            longitude: coordinates.longitude(),
            post_count: 1,
        });
        id
    }

    fn record_for(&self, post: &Post) -> PostRecord {
        let genre_name = self
            .genres
            .lock()
            .unwrap()
            .iter()
            .find(|g| g.id == post.genre_id)
            .map(|g| g.name.clone())
            .unwrap_or_default();

        let places = self.places.lock().unwrap();
        let place = places.iter().find(|p| p.id == post.place_id);

        PostRecord {
            post: post.clone(),
            genre_name,
            latitude: place.map(|p| p.latitude).unwrap_or_default(),
            longitude: place.map(|p| p.longitude).unwrap_or_default(),
            place_post_count: place.map(|p| p.post_count).unwrap_or_default(),
        }
    }

    fn records_sorted_desc(&self, mut records: Vec<PostRecord>) -> Vec<PostRecord> {
        records.sort_by(|a, b| b.post.created_at.cmp(&a.post.created_at));
        records
    }
}

impl PostRepository for FakeStore {
    async fn create(&self, new_post: NewPost) -> PostResult<PostId> {
        let place_id = self.coalesce(&new_post.coordinates);
        let id = PostId::from_i64(self.next_post_id.fetch_add(1, Ordering::SeqCst));

        let post = Post {
            id,
            author_external_id: new_post.author_external_id,
            place_id,
            genre_id: new_post.genre_id,
            title: new_post.title,
            body: new_post.body,
            image: new_post.image.map(|i| i.into_bytes()),
            view_count: 0,
            reaction_count: 0,
            created_at: self.next_created_at(),
            anonymized_at: None,
        };

        self.posts.lock().unwrap().insert(id.as_i64(), post);
        Ok(id)
    }

    async fn find_detail(&self, id: PostId) -> PostResult<Option<PostRecord>> {
        let posts = self.posts.lock().unwrap();
        Ok(posts.get(&id.as_i64()).map(|p| self.record_for(p)))
    }

    async fn increment_view_count(&self, id: PostId) -> PostResult<()> {
        if self.fail_view_increment.load(Ordering::SeqCst) {
            return Err(PostError::Internal("injected increment failure".to_string()));
        }
        let mut posts = self.posts.lock().unwrap();
        let post = posts
            .get_mut(&id.as_i64())
            .ok_or_else(|| PostError::NotFound(format!("Post not found: {id}")))?;
        post.view_count += 1;
        Ok(())
    }

    async fn list_all(&self) -> PostResult<Vec<PostRecord>> {
        let posts = self.posts.lock().unwrap();
        let records = posts.values().map(|p| self.record_for(p)).collect();
        Ok(self.records_sorted_desc(records))
    }

    async fn search_by_keyword(&self, keyword: &str) -> PostResult<Vec<PostRecord>> {
        let posts = self.posts.lock().unwrap();
        let records = posts
            .values()
            .filter(|p| p.title.as_str().contains(keyword) || p.body.as_str().contains(keyword))
            .map(|p| self.record_for(p))
            .collect();
        Ok(self.records_sorted_desc(records))
    }

    async fn search_by_genre(&self, genre_id: GenreId) -> PostResult<Vec<PostRecord>> {
        let posts = self.posts.lock().unwrap();
        let records = posts
            .values()
            .filter(|p| p.genre_id == genre_id)
            .map(|p| self.record_for(p))
            .collect();
        Ok(self.records_sorted_desc(records))
    }

    async fn search_by_period(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> PostResult<Vec<PostRecord>> {
        let posts = self.posts.lock().unwrap();
        let records = posts
            .values()
            .filter(|p| p.created_at >= start && p.created_at < end)
            .map(|p| self.record_for(p))
            .collect();
        Ok(self.records_sorted_desc(records))
    }

    async fn history(&self, author_external_id: &str) -> PostResult<Vec<PostRecord>> {
        let posts = self.posts.lock().unwrap();
        let records = posts
            .values()
            .filter(|p| p.author_external_id == author_external_id)
            .map(|p| self.record_for(p))
            .collect();
        Ok(self.records_sorted_desc(records))
    }

    async fn delete(&self, id: PostId) -> PostResult<()> {
        let mut posts = self.posts.lock().unwrap();
        posts
            .remove(&id.as_i64())
            .ok_or_else(|| PostError::NotFound(format!("Post not found: {id}")))?;
        // Reactions cascade like the database foreign key would
        self.reactions
            .lock()
            .unwrap()
            .retain(|(_, post_id)| *post_id != id.as_i64());
        Ok(())
    }

    async fn anonymize(&self, id: PostId) -> PostResult<()> {
        let mut posts = self.posts.lock().unwrap();
        let post = posts
            .get_mut(&id.as_i64())
            .ok_or_else(|| PostError::NotFound(format!("Post not found: {id}")))?;
        post.anonymize();
        Ok(())
    }
}

impl PlaceRepository for FakeStore {
    async fn find_or_create(&self, coordinates: &Coordinates) -> PostResult<PlaceId> {
        Ok(self.coalesce(coordinates))
    }

    async fn get(&self, id: PlaceId) -> PostResult<Option<Place>> {
        Ok(self.places.lock().unwrap().iter().find(|p| p.id == id).cloned())
    }
}

impl GenreRepository for FakeStore {
    async fn exists(&self, id: GenreId) -> PostResult<bool> {
        Ok(self.genres.lock().unwrap().iter().any(|g| g.id == id))
    }

    async fn list(&self) -> PostResult<Vec<Genre>> {
        Ok(self.genres.lock().unwrap().clone())
    }
}

impl ReactionRepository for FakeStore {
    async fn toggle(&self, user_external_id: &str, post_id: PostId) -> PostResult<ToggleOutcome> {
        let mut posts = self.posts.lock().unwrap();
        let post = posts
            .get_mut(&post_id.as_i64())
            .ok_or_else(|| PostError::NotFound(format!("Post not found: {post_id}")))?;

        let key = (user_external_id.to_string(), post_id.as_i64());
        let mut reactions = self.reactions.lock().unwrap();

        let reacted = if reactions.remove(&key) {
            post.reaction_count -= 1;
            false
        } else {
            reactions.insert(key);
            post.reaction_count += 1;
            true
        };

        Ok(ToggleOutcome {
            reacted,
            reaction_count: post.reaction_count,
        })
    }

    async fn is_reacted(&self, user_external_id: &str, post_id: PostId) -> PostResult<bool> {
        Ok(self
            .reactions
            .lock()
            .unwrap()
            .contains(&(user_external_id.to_string(), post_id.as_i64())))
    }

    async fn reaction_count(&self, post_id: PostId) -> PostResult<i64> {
        self.posts
            .lock()
            .unwrap()
            .get(&post_id.as_i64())
            .map(|p| p.reaction_count)
            .ok_or_else(|| PostError::NotFound(format!("Post not found: {post_id}")))
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn create_input(title: &str, lat: f64, lon: f64) -> CreatePostInput {
    CreatePostInput {
        author_external_id: "u1".to_string(),
        genre_id: GenreId::from_i64(1),
        latitude: lat,
        longitude: lon,
        title: title.to_string(),
        body: "x".to_string(),
        image: None,
    }
}

fn jpeg_bytes(extra: usize) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xD8, 0xFF];
    bytes.extend(std::iter::repeat(0u8).take(extra));
    bytes
}

async fn create(store: &Arc<FakeStore>, input: CreatePostInput) -> PostId {
    CreatePostUseCase::new(store.clone(), store.clone())
        .execute(input)
        .await
        .unwrap()
}

// ============================================================================
// Create + list
// ============================================================================

#[tokio::test]
async fn create_then_list_returns_newest_first_with_zero_views() {
    let store = FakeStore::new();
    let first = create(&store, create_input("first", 35.68, 139.76)).await;
    let second = create(&store, create_input("second", 35.70, 139.70)).await;

    let records = ListPostsUseCase::new(store.clone()).list_all().await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].post.id, second);
    assert_eq!(records[1].post.id, first);
    assert_eq!(records[0].post.view_count, 0);
    assert_eq!(records[0].genre_name, "グルメ");
}

#[tokio::test]
async fn create_validation_errors() {
    let store = FakeStore::new();
    let use_case = CreatePostUseCase::new(store.clone(), store.clone());

    // Title bounds
    let mut input = create_input("", 35.68, 139.76);
    assert_eq!(
        use_case.execute(input).await.unwrap_err().kind(),
        ErrorKind::ValidationFailed
    );
    input = create_input(&"x".repeat(51), 35.68, 139.76);
    assert_eq!(
        use_case.execute(input).await.unwrap_err().kind(),
        ErrorKind::ValidationFailed
    );

    // Body bounds
    input = create_input("ok", 35.68, 139.76);
    input.body = "y".repeat(2001);
    assert_eq!(
        use_case.execute(input).await.unwrap_err().kind(),
        ErrorKind::ValidationFailed
    );

    // Image sniffing and size
    input = create_input("ok", 35.68, 139.76);
    input.image = Some(b"GIF89a....".to_vec());
    assert_eq!(
        use_case.execute(input).await.unwrap_err().kind(),
        ErrorKind::InvalidImage
    );
    input = create_input("ok", 35.68, 139.76);
    input.image = Some(jpeg_bytes(5 * 1024 * 1024 - 2));
    assert_eq!(
        use_case.execute(input).await.unwrap_err().kind(),
        ErrorKind::ImageTooLarge
    );

    // Unknown genre
    input = create_input("ok", 35.68, 139.76);
    input.genre_id = GenreId::from_i64(999);
    assert_eq!(
        use_case.execute(input).await.unwrap_err().kind(),
        ErrorKind::ValidationFailed
    );

    // Nothing was persisted
    assert!(store.posts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn create_accepts_exactly_five_mebibyte_image() {
    let store = FakeStore::new();
    let mut input = create_input("ok", 35.68, 139.76);
    input.image = Some(jpeg_bytes(5 * 1024 * 1024 - 3));

    let id = create(&store, input).await;
    let record = store.find_detail(id).await.unwrap().unwrap();
    assert_eq!(record.post.image.unwrap().len(), 5 * 1024 * 1024);
}

// ============================================================================
// Place coalescence
// ============================================================================

#[tokio::test]
async fn nearby_posts_share_one_place() {
    let store = FakeStore::new();
    let a = create(&store, create_input("a", 35.68000, 139.76000)).await;
    let b = create(&store, create_input("b", 35.68005, 139.76005)).await;

    let record_a = store.find_detail(a).await.unwrap().unwrap();
    let record_b = store.find_detail(b).await.unwrap().unwrap();
    assert_eq!(record_a.post.place_id, record_b.post.place_id);
    assert_eq!(store.place_post_count(record_a.post.place_id), 2);
    assert_eq!(store.place_count(), 1);

    // A clearly distinct location starts a new place
    let c = create(&store, create_input("c", 35.69000, 139.76000)).await;
    let record_c = store.find_detail(c).await.unwrap().unwrap();
    assert_ne!(record_c.post.place_id, record_a.post.place_id);
    assert_eq!(store.place_count(), 2);
}

#[tokio::test]
async fn place_post_count_is_a_lifetime_counter() {
    // Policy: the counter only grows; neither delete nor anonymize
    // decrements it
    let store = FakeStore::new();
    let a = create(&store, create_input("a", 35.68, 139.76)).await;
    let b = create(&store, create_input("b", 35.68, 139.76)).await;
    let place_id = store.find_detail(a).await.unwrap().unwrap().post.place_id;
    assert_eq!(store.place_post_count(place_id), 2);

    DeletePostUseCase::new(store.clone())
        .execute(a, "u1")
        .await
        .unwrap();
    assert_eq!(store.place_post_count(place_id), 2);

    AnonymizePostUseCase::new(store.clone())
        .execute(b)
        .await
        .unwrap();
    assert_eq!(store.place_post_count(place_id), 2);
}

// ============================================================================
// Detail / view counting
// ============================================================================

#[tokio::test]
async fn detail_read_increments_view_count() {
    let store = FakeStore::new();
    let id = create(&store, create_input("post", 35.68, 139.76)).await;

    let use_case = PostDetailUseCase::new(store.clone());
    let first = use_case.execute(id).await.unwrap();
    assert_eq!(first.post.view_count, 1);

    let second = use_case.execute(id).await.unwrap();
    assert_eq!(second.post.view_count, 2);
}

#[tokio::test]
async fn detail_of_missing_post_is_not_found() {
    let store = FakeStore::new();
    let result = PostDetailUseCase::new(store.clone())
        .execute(PostId::from_i64(404))
        .await;
    assert!(matches!(result, Err(PostError::NotFound(_))));
}

#[tokio::test]
async fn view_increment_failure_does_not_fail_the_read() {
    let store = FakeStore::new();
    let id = create(&store, create_input("post", 35.68, 139.76)).await;

    store.fail_view_increment.store(true, Ordering::SeqCst);
    let record = PostDetailUseCase::new(store.clone()).execute(id).await.unwrap();
    assert_eq!(record.post.view_count, 0);

    // Once the increment works again the count resumes from where it was
    store.fail_view_increment.store(false, Ordering::SeqCst);
    let record = PostDetailUseCase::new(store.clone()).execute(id).await.unwrap();
    assert_eq!(record.post.view_count, 1);
}

// ============================================================================
// Reactions
// ============================================================================

#[tokio::test]
async fn toggle_reaction_roundtrip() {
    let store = FakeStore::new();
    let id = create(&store, create_input("post", 35.68, 139.76)).await;
    let use_case = ToggleReactionUseCase::new(store.clone());

    let on = use_case.toggle("u2", id).await.unwrap();
    assert!(on.reacted);
    assert_eq!(on.reaction_count, 1);

    let status = use_case.status("u2", id).await.unwrap();
    assert!(status.reacted);
    assert_eq!(status.reaction_count, 1);

    let off = use_case.toggle("u2", id).await.unwrap();
    assert!(!off.reacted);
    assert_eq!(off.reaction_count, 0);

    let status = use_case.status("u2", id).await.unwrap();
    assert!(!status.reacted);
    assert_eq!(status.reaction_count, 0);
}

#[tokio::test]
async fn double_toggle_leaves_state_unchanged() {
    let store = FakeStore::new();
    let id = create(&store, create_input("post", 35.68, 139.76)).await;
    let use_case = ToggleReactionUseCase::new(store.clone());

    // Start from a reacted state by another user
    use_case.toggle("u3", id).await.unwrap();
    let before_count = store.reaction_count(id).await.unwrap();
    let before_rows = store.reactions.lock().unwrap().len();

    use_case.toggle("u2", id).await.unwrap();
    use_case.toggle("u2", id).await.unwrap();

    assert_eq!(store.reaction_count(id).await.unwrap(), before_count);
    assert_eq!(store.reactions.lock().unwrap().len(), before_rows);
}

#[tokio::test]
async fn reaction_count_matches_row_count() {
    let store = FakeStore::new();
    let id = create(&store, create_input("post", 35.68, 139.76)).await;
    let use_case = ToggleReactionUseCase::new(store.clone());

    for user in ["u2", "u3", "u4"] {
        use_case.toggle(user, id).await.unwrap();
    }
    use_case.toggle("u3", id).await.unwrap();

    let rows = store.reactions.lock().unwrap().len() as i64;
    assert_eq!(store.reaction_count(id).await.unwrap(), rows);
    assert_eq!(rows, 2);
}

#[tokio::test]
async fn toggle_on_missing_post_is_not_found() {
    let store = FakeStore::new();
    let result = ToggleReactionUseCase::new(store.clone())
        .toggle("u2", PostId::from_i64(404))
        .await;
    assert!(matches!(result, Err(PostError::NotFound(_))));
}

// ============================================================================
// Delete
// ============================================================================

#[tokio::test]
async fn only_the_author_may_delete() {
    let store = FakeStore::new();
    let id = create(&store, create_input("post", 35.68, 139.76)).await;
    let use_case = DeletePostUseCase::new(store.clone());

    let result = use_case.execute(id, "someone-else").await;
    assert!(matches!(result, Err(PostError::Forbidden(_))));
    assert!(store.find_detail(id).await.unwrap().is_some());

    use_case.execute(id, "u1").await.unwrap();
    assert!(store.find_detail(id).await.unwrap().is_none());

    let result = use_case.execute(id, "u1").await;
    assert!(matches!(result, Err(PostError::NotFound(_))));
}

// ============================================================================
// Anonymize
// ============================================================================

#[tokio::test]
async fn anonymize_preserves_keys_and_counters() {
    let store = FakeStore::new();
    let id = create(&store, create_input("original title", 35.68, 139.76)).await;

    // Accumulate some state first
    ToggleReactionUseCase::new(store.clone())
        .toggle("u2", id)
        .await
        .unwrap();
    PostDetailUseCase::new(store.clone()).execute(id).await.unwrap();

    AnonymizePostUseCase::new(store.clone()).execute(id).await.unwrap();

    let record = store.find_detail(id).await.unwrap().unwrap();
    assert_eq!(record.post.title.as_str(), ANONYMIZED_SENTINEL);
    assert_eq!(record.post.body.as_str(), ANONYMIZED_SENTINEL);
    assert_eq!(record.post.author_external_id, "u1");
    assert_eq!(record.post.reaction_count, 1);
    assert_eq!(record.post.view_count, 1);
    assert!(record.post.is_anonymized());
}

#[tokio::test]
async fn anonymize_twice_is_indistinguishable_from_once() {
    let store = FakeStore::new();
    let id = create(&store, create_input("post", 35.68, 139.76)).await;
    let use_case = AnonymizePostUseCase::new(store.clone());

    use_case.execute(id).await.unwrap();
    let stamp = store.find_detail(id).await.unwrap().unwrap().post.anonymized_at;

    use_case.execute(id).await.unwrap();
    let again = store.find_detail(id).await.unwrap().unwrap().post.anonymized_at;
    assert_eq!(stamp, again);
}

// ============================================================================
// Search / history
// ============================================================================

#[tokio::test]
async fn keyword_search_matches_title_or_body() {
    let store = FakeStore::new();
    let hit_title = create(&store, create_input("かき氷はじめました", 35.68, 139.76)).await;

    let mut input = create_input("something else", 35.70, 139.70);
    input.body = "本文にかき氷".to_string();
    let hit_body = create(&store, input).await;

    create(&store, create_input("unrelated", 35.72, 139.72)).await;

    let use_case = ListPostsUseCase::new(store.clone());
    let records = use_case.by_keyword("かき氷").await.unwrap();
    let ids: Vec<_> = records.iter().map(|r| r.post.id).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&hit_title));
    assert!(ids.contains(&hit_body));

    assert!(use_case.by_keyword("").await.is_err());
}

#[tokio::test]
async fn genre_search_is_exact() {
    let store = FakeStore::new();
    create(&store, create_input("genre one", 35.68, 139.76)).await;
    let mut input = create_input("genre two", 35.70, 139.70);
    input.genre_id = GenreId::from_i64(2);
    let other = create(&store, input).await;

    let records = ListPostsUseCase::new(store.clone())
        .by_genre(GenreId::from_i64(2))
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].post.id, other);
}

#[tokio::test]
async fn period_search_includes_end_date_and_stays_half_open() {
    let store = FakeStore::new();
    let in_range = create(&store, create_input("in", 35.68, 139.76)).await;
    let on_end_date = create(&store, create_input("end day", 35.70, 139.70)).await;
    let after = create(&store, create_input("after", 35.72, 139.72)).await;

    store.set_created_at(in_range, Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap());
    // Last instant of the end date stays inside the interval
    store.set_created_at(
        on_end_date,
        Utc.with_ymd_and_hms(2024, 3, 15, 23, 59, 59).unwrap(),
    );
    // Midnight after the end date is outside
    store.set_created_at(after, Utc.with_ymd_and_hms(2024, 3, 16, 0, 0, 0).unwrap());

    let records = ListPostsUseCase::new(store.clone())
        .by_period(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        )
        .await
        .unwrap();

    let ids: Vec<_> = records.iter().map(|r| r.post.id).collect();
    assert!(ids.contains(&in_range));
    assert!(ids.contains(&on_end_date));
    assert!(!ids.contains(&after));
}

#[tokio::test]
async fn history_filters_by_author() {
    let store = FakeStore::new();
    let mine = create(&store, create_input("mine", 35.68, 139.76)).await;
    let mut input = create_input("theirs", 35.70, 139.70);
    input.author_external_id = "u9".to_string();
    create(&store, input).await;

    let records = ListPostsUseCase::new(store.clone()).history("u1").await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].post.id, mine);
}
