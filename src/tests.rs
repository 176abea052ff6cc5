//! Integration tests for the rotor backend HTTP surface.

use std::sync::Arc;

use reqwest::Client;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::db::{init_database, Repository};
use crate::engine::Engine;
use crate::{create_router, AppState};

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.sqlite");

        let pool = init_database(&db_path, 5)
            .await
            .expect("Failed to init DB");
        let repo = Arc::new(Repository::new(pool));

        let state = AppState {
            engine: Engine::new(repo),
        };

        let app = create_router(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        TestFixture {
            client: Client::new(),
            base_url,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> (u16, Value) {
        let resp = self.client.get(self.url(path)).send().await.unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }

    async fn post(&self, path: &str, body: Value) -> (u16, Value) {
        let resp = self
            .client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }

    async fn put(&self, path: &str, body: Value) -> (u16, Value) {
        let resp = self
            .client
            .put(self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }

    async fn delete(&self, path: &str) -> (u16, Value) {
        let resp = self.client.delete(self.url(path)).send().await.unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }

    async fn create_rotor(&self, class_type_id: &str, name: &str) -> String {
        let (status, body) = self
            .post(
                &format!("/api/class-types/{}/rotors", class_type_id),
                json!({ "name": name, "createdBy": "coach-1" }),
            )
            .await;
        assert_eq!(status, 200);
        body["data"]["id"].as_str().unwrap().to_string()
    }

    async fn create_theme(&self, rotor_id: &str, name: &str, position: i64) -> String {
        let (status, body) = self
            .post(
                &format!("/api/rotors/{}/themes", rotor_id),
                json!({ "name": name, "position": position }),
            )
            .await;
        assert_eq!(status, 200);
        body["data"]["id"].as_str().unwrap().to_string()
    }

    async fn create_topic(&self, theme_id: &str, name: &str, weeks: i64, position: i64) -> String {
        let (status, body) = self
            .post(
                &format!("/api/themes/{}/topics", theme_id),
                json!({ "name": name, "durationWeeks": weeks, "position": position }),
            )
            .await;
        assert_eq!(status, 200);
        body["data"]["id"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_rotor_lifecycle() {
    let fixture = TestFixture::new().await;

    let first = fixture.create_rotor("adults", "Winter").await;
    let second = fixture.create_rotor("adults", "Spring").await;

    let (status, body) = fixture.get("/api/class-types/adults/rotors").await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    let rotors = body["data"].as_array().unwrap();
    assert_eq!(rotors.len(), 2);
    // Newest version first
    assert_eq!(rotors[0]["id"], second.as_str());
    assert_eq!(rotors[0]["version"], 2);
    assert_eq!(rotors[1]["status"], "draft");

    let (status, body) = fixture
        .post(&format!("/api/rotors/{}/activate", first), json!({}))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["status"], "active");
    assert!(body["data"]["activatedAt"].is_string());

    let (_, body) = fixture
        .post(&format!("/api/rotors/{}/activate", second), json!({}))
        .await;
    assert_eq!(body["data"]["status"], "active");

    let (_, body) = fixture.get(&format!("/api/rotors/{}", first)).await;
    assert_eq!(body["data"]["status"], "archived");

    let (_, body) = fixture.get("/api/class-types/adults/active-rotor").await;
    assert_eq!(body["data"]["id"], second.as_str());

    // Active rotors cannot be deleted
    let (status, body) = fixture.delete(&format!("/api/rotors/{}", second)).await;
    assert_eq!(status, 409);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "CONFLICT");

    let (status, _) = fixture.delete(&format!("/api/rotors/{}", first)).await;
    assert_eq!(status, 200);
    let (status, body) = fixture.get(&format!("/api/rotors/{}", first)).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_rename_and_preview() {
    let fixture = TestFixture::new().await;
    let rotor = fixture.create_rotor("kids", "Draft").await;

    let (status, body) = fixture
        .put(&format!("/api/rotors/{}", rotor), json!({ "name": "Autumn" }))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["name"], "Autumn");

    let (status, body) = fixture
        .put(&format!("/api/rotors/{}", rotor), json!({ "name": "  " }))
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (_, body) = fixture
        .post(&format!("/api/rotors/{}/preview", rotor), json!({}))
        .await;
    assert_eq!(body["data"]["previewOn"], true);
    assert_eq!(body["data"]["status"], "draft");
}

#[tokio::test]
async fn test_themes_only_on_draft_rotors() {
    let fixture = TestFixture::new().await;
    let rotor = fixture.create_rotor("kids", "Spring").await;
    let theme = fixture.create_theme(&rotor, "Guard", 0).await;

    let (_, body) = fixture
        .put(&format!("/api/themes/{}", theme), json!({ "hidden": true }))
        .await;
    assert_eq!(body["data"]["hidden"], true);
    assert_eq!(body["data"]["name"], "Guard");

    fixture
        .post(&format!("/api/rotors/{}/activate", rotor), json!({}))
        .await;

    let (status, body) = fixture
        .post(
            &format!("/api/rotors/{}/themes", rotor),
            json!({ "name": "Late Addition" }),
        )
        .await;
    assert_eq!(status, 409);
    assert_eq!(body["error"]["code"], "CONFLICT");

    let (_, body) = fixture.get(&format!("/api/rotors/{}/themes", rotor)).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_topic_crud_and_reorder() {
    let fixture = TestFixture::new().await;
    let rotor = fixture.create_rotor("kids", "Spring").await;
    let theme = fixture.create_theme(&rotor, "Guard", 0).await;
    let t1 = fixture.create_topic(&theme, "Armbar", 0, 0).await;
    let t2 = fixture.create_topic(&theme, "Triangle", 2, 1).await;

    let (_, body) = fixture.get(&format!("/api/topics/{}", t1)).await;
    assert_eq!(body["data"]["durationWeeks"], 1);

    let (status, body) = fixture
        .put(
            &format!("/api/topics/{}", t1),
            json!({ "description": "From closed guard" }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["description"], "From closed guard");
    assert_eq!(body["data"]["name"], "Armbar");

    let (status, body) = fixture
        .put(
            &format!("/api/themes/{}/topics/order", theme),
            json!({ "topicIds": [t2.clone(), t1.clone()] }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"][0]["id"], t2.as_str());
    assert_eq!(body["data"][1]["position"], 1);

    let (status, _) = fixture
        .put(
            &format!("/api/themes/{}/topics/order", theme),
            json!({ "topicIds": [] }),
        )
        .await;
    assert_eq!(status, 400);

    let (status, _) = fixture.delete(&format!("/api/topics/{}", t1)).await;
    assert_eq!(status, 200);
    let (_, body) = fixture.get(&format!("/api/themes/{}/topics", theme)).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_schedule_actions() {
    let fixture = TestFixture::new().await;
    let rotor = fixture.create_rotor("kids", "Spring").await;
    let theme = fixture.create_theme(&rotor, "Guard", 0).await;
    let t1 = fixture.create_topic(&theme, "T1", 2, 0).await;
    let t2 = fixture.create_topic(&theme, "T2", 3, 1).await;
    let schedule_path = format!("/api/themes/{}/schedule", theme);

    // Activate requires a topic
    let (status, body) = fixture
        .post(&schedule_path, json!({ "action": "activate" }))
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, body) = fixture
        .post(&schedule_path, json!({ "action": "activate", "topicId": t1 }))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["active"]["topicId"], t1.as_str());
    assert_eq!(body["data"]["active"]["status"], "active");
    assert!(body["data"]["ended"].is_null());

    let (status, body) = fixture
        .post(&schedule_path, json!({ "action": "extend", "weeks": 1 }))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["active"]["topicId"], t1.as_str());

    fixture
        .post(&format!("/api/topics/{}/votes", t1), json!({ "accountId": "a1" }))
        .await;

    let (status, body) = fixture
        .post(&schedule_path, json!({ "action": "complete" }))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["ended"]["topicId"], t1.as_str());
    assert_eq!(body["data"]["ended"]["status"], "completed");
    assert_eq!(body["data"]["active"]["topicId"], t2.as_str());

    // Completion starts a fresh voting round and stamps the topic
    let (_, body) = fixture.get(&format!("/api/topics/{}/votes", t1)).await;
    assert_eq!(body["data"]["votes"], 0);
    let (_, body) = fixture.get(&format!("/api/topics/{}", t1)).await;
    assert!(body["data"]["lastCovered"].is_string());

    let (status, body) = fixture
        .post(&schedule_path, json!({ "action": "skip" }))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["ended"]["status"], "skipped");
    assert!(body["data"]["active"].is_null());

    // Nothing running after a skip
    let (status, body) = fixture
        .post(&schedule_path, json!({ "action": "complete" }))
        .await;
    assert_eq!(status, 404);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (_, body) = fixture.get(&format!("/api/themes/{}/schedules", theme)).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_bump_topic() {
    let fixture = TestFixture::new().await;
    let rotor = fixture.create_rotor("kids", "Spring").await;
    let theme = fixture.create_theme(&rotor, "Guard", 0).await;
    let t1 = fixture.create_topic(&theme, "T1", 1, 0).await;
    let t3 = fixture.create_topic(&theme, "T3", 1, 2).await;

    fixture
        .post(
            &format!("/api/themes/{}/schedule", theme),
            json!({ "action": "activate", "topicId": t1 }),
        )
        .await;
    fixture
        .post(&format!("/api/topics/{}/votes", t3), json!({ "accountId": "a1" }))
        .await;

    let (status, body) = fixture
        .post(&format!("/api/themes/{}/bump", theme), json!({ "topicId": t3 }))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["ended"]["topicId"], t1.as_str());
    assert_eq!(body["data"]["ended"]["status"], "completed");
    assert_eq!(body["data"]["active"]["topicId"], t3.as_str());

    let (_, body) = fixture.get(&format!("/api/topics/{}/votes", t3)).await;
    assert_eq!(body["data"]["votes"], 0);

    let (status, _) = fixture
        .post(
            &format!("/api/themes/{}/bump", theme),
            json!({ "topicId": "missing" }),
        )
        .await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_double_vote_is_already_voted() {
    let fixture = TestFixture::new().await;
    let rotor = fixture.create_rotor("kids", "Spring").await;
    let theme = fixture.create_theme(&rotor, "Guard", 0).await;
    let topic = fixture.create_topic(&theme, "Armbar", 1, 0).await;
    let votes_path = format!("/api/topics/{}/votes", topic);

    let (status, body) = fixture
        .post(&votes_path, json!({ "accountId": "acct-1" }))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["votes"], 1);

    let (status, body) = fixture
        .post(&votes_path, json!({ "accountId": "acct-1" }))
        .await;
    assert_eq!(status, 409);
    assert_eq!(body["error"]["code"], "ALREADY_VOTED");
    assert_eq!(body["error"]["details"]["accountId"], "acct-1");

    let (_, body) = fixture.get(&votes_path).await;
    assert_eq!(body["data"]["votes"], 1);
}

#[tokio::test]
async fn test_curriculum_views() {
    let fixture = TestFixture::new().await;
    let rotor = fixture.create_rotor("kids", "Spring").await;
    let theme = fixture.create_theme(&rotor, "Guard", 0).await;
    let (_, body) = fixture
        .post(
            &format!("/api/rotors/{}/themes", rotor),
            json!({ "name": "Coaches Only", "position": 1, "hidden": true }),
        )
        .await;
    assert_eq!(body["data"]["hidden"], true);
    let t1 = fixture.create_topic(&theme, "T1", 1, 0).await;
    let t2 = fixture.create_topic(&theme, "T2", 1, 1).await;

    // No active rotor yet
    let (status, body) = fixture.get("/api/curriculum/kids").await;
    assert_eq!(status, 200);
    assert!(body["data"]["rotor"].is_null());
    assert_eq!(body["data"]["themes"].as_array().unwrap().len(), 0);

    fixture
        .post(&format!("/api/rotors/{}/activate", rotor), json!({}))
        .await;
    fixture
        .post(
            &format!("/api/themes/{}/schedule", theme),
            json!({ "action": "activate", "topicId": t1 }),
        )
        .await;
    fixture
        .post(&format!("/api/topics/{}/votes", t2), json!({ "accountId": "a1" }))
        .await;

    let (status, body) = fixture.get("/api/curriculum/kids?accountId=a1").await;
    assert_eq!(status, 200);
    let themes = body["data"]["themes"].as_array().unwrap();
    assert_eq!(themes.len(), 1);
    assert_eq!(themes[0]["activeSchedule"]["topicId"], t1.as_str());
    assert_eq!(themes[0]["topics"][0]["isActive"], true);
    assert_eq!(themes[0]["topics"][1]["votes"], 1);
    assert_eq!(themes[0]["topics"][1]["hasVoted"], true);

    let (_, body) = fixture.get("/api/curriculum/kids?role=coach").await;
    assert_eq!(body["data"]["themes"].as_array().unwrap().len(), 2);

    let (status, body) = fixture.get("/api/curriculum").await;
    assert_eq!(status, 200);
    let entries = body["data"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["classTypeId"], "kids");
    assert_eq!(entries[0]["activeRotor"]["id"], rotor.as_str());
}

#[tokio::test]
async fn test_revision_increases_on_writes() {
    let fixture = TestFixture::new().await;

    let (_, before) = fixture.get("/api/class-types/kids/rotors").await;
    let rev_before = before["revisionId"].as_i64().unwrap();

    fixture.create_rotor("kids", "Spring").await;

    let (_, after) = fixture.get("/api/class-types/kids/rotors").await;
    assert!(after["revisionId"].as_i64().unwrap() > rev_before);
}

#[tokio::test]
async fn test_malformed_body_uses_error_envelope() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture
        .post("/api/class-types/kids/rotors", json!({ "title": "No name" }))
        .await;
    assert!(status == 400 || status == 422);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_active_schedule_and_vote_reset() {
    let fixture = TestFixture::new().await;
    let rotor = fixture.create_rotor("kids", "Spring").await;
    let theme = fixture.create_theme(&rotor, "Guard", 0).await;
    let topic = fixture.create_topic(&theme, "Armbar", 1, 0).await;
    let schedule_path = format!("/api/themes/{}/schedule", theme);

    let (status, body) = fixture.get(&schedule_path).await;
    assert_eq!(status, 200);
    assert!(body["data"].is_null());

    fixture
        .post(&schedule_path, json!({ "action": "activate", "topicId": topic }))
        .await;
    let (_, body) = fixture.get(&schedule_path).await;
    assert_eq!(body["data"]["topicId"], topic.as_str());

    let votes_path = format!("/api/topics/{}/votes", topic);
    fixture.post(&votes_path, json!({ "accountId": "a1" })).await;
    let (_, body) = fixture.get(&format!("{}?accountId=a1", votes_path)).await;
    assert_eq!(body["data"]["hasVoted"], true);

    let (status, body) = fixture.delete(&votes_path).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"], 1);
    let (_, body) = fixture.get(&format!("{}?accountId=a1", votes_path)).await;
    assert_eq!(body["data"]["votes"], 0);
    assert_eq!(body["data"]["hasVoted"], false);
}

#[tokio::test]
async fn test_oversized_durations_are_rejected() {
    let fixture = TestFixture::new().await;
    let rotor = fixture.create_rotor("kids", "Spring").await;
    let theme = fixture.create_theme(&rotor, "Guard", 0).await;
    let topic = fixture.create_topic(&theme, "Armbar", 1, 0).await;

    let (status, body) = fixture
        .post(
            &format!("/api/themes/{}/topics", theme),
            json!({ "name": "Forever", "durationWeeks": 100_000_000 }),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let schedule_path = format!("/api/themes/{}/schedule", theme);
    fixture
        .post(&schedule_path, json!({ "action": "activate", "topicId": topic }))
        .await;
    let (status, body) = fixture
        .post(&schedule_path, json!({ "action": "extend", "weeks": 100_000_000 }))
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    // The running schedule is untouched and still reachable
    let (status, body) = fixture.get(&schedule_path).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["topicId"], topic.as_str());
}
