use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use doctor_cell::router::doctor_routes;
use doctor_cell::store::{InMemoryStore, UserRepository};
use doctor_cell::{DoctorCellState, UserRecord};

fn create_test_app(store: Arc<InMemoryStore>) -> Router {
    doctor_routes(Arc::new(DoctorCellState::with_memory_store(store)))
}

async fn seed_user(store: &InMemoryStore, id: &str, is_doctor: bool) {
    store.insert_user(UserRecord {
        id: id.to_string(),
        email: Some(format!("{}@example.com", id)),
        username: Some(format!("{}-name", id)),
        is_doctor,
        ..Default::default()
    }).await;
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, json)
}

fn perera_body(user_id: &str) -> Value {
    json!({
        "userId": user_id,
        "name": "A. Perera",
        "specialization": "Cardiology",
        "hospital": "General Hospital",
        "location": "Colombo",
        "experience": 5,
        "consultationFee": 3000
    })
}

async fn create_perera(app: &Router, user_id: &str) -> Value {
    let (status, json) = send(app, "POST", "/create", Some(perera_body(user_id))).await;
    assert_eq!(status, StatusCode::CREATED);
    json["data"].clone()
}

#[tokio::test]
async fn test_provision_creates_exactly_once() {
    let store = Arc::new(InMemoryStore::new());
    seed_user(&store, "u1", true).await;
    let app = create_test_app(store.clone());

    let (status, first) = send(&app, "GET", "/user/u1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["success"], true);

    let doctor = &first["data"];
    assert_eq!(doctor["userId"], "u1");
    assert_eq!(doctor["name"], "u1-name");
    assert_eq!(doctor["specialization"], "General Practitioner");
    assert_eq!(doctor["location"], "Sri Lanka");
    assert_eq!(doctor["experience"], 1);
    assert_eq!(doctor["consultationFee"], 2000.0);
    assert_eq!(doctor["image"], "https://s3.amazonaws.com/images/doctor.png");

    let availability = doctor["availability"].as_array().unwrap();
    assert_eq!(availability.len(), 7);
    assert_eq!(availability[0], json!({"day": "Monday", "slots": [{"startTime": "08:00", "endTime": "17:00"}]}));
    assert_eq!(availability[5], json!({"day": "Saturday", "slots": [{"startTime": "08:00", "endTime": "13:00"}]}));
    assert_eq!(availability[6], json!({"day": "Sunday", "slots": []}));

    let (status, second) = send(&app, "GET", "/user/u1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["data"]["_id"], doctor["_id"]);
    assert_eq!(second["data"]["userId"], json!({"_id": "u1", "email": "u1@example.com"}));
    assert_eq!(store.doctor_count().await, 1);
}

#[tokio::test]
async fn test_provision_requires_doctor_account() {
    let store = Arc::new(InMemoryStore::new());
    seed_user(&store, "patient", false).await;
    let app = create_test_app(store.clone());

    let (status, json) = send(&app, "GET", "/user/patient", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json, json!({"success": false, "error": "Doctor not found"}));

    let (status, _) = send(&app, "GET", "/user/nobody", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(store.doctor_count().await, 0);
}

#[tokio::test]
async fn test_create_then_lookup_by_user_returns_same_record() {
    let store = Arc::new(InMemoryStore::new());
    seed_user(&store, "u1", false).await;
    let app = create_test_app(store.clone());

    let (status, json) = send(&app, "POST", "/create", Some(perera_body("u1"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["message"], "Doctor profile created successfully");
    let created = &json["data"];
    assert_eq!(created["name"], "A. Perera");
    assert_eq!(created["userId"], "u1");
    assert_eq!(created["image"], "https://s3.amazonaws.com/images/doctor.png");
    assert_eq!(created["availability"], json!([]));

    let user = store.find_by_id("u1").await.unwrap().unwrap();
    assert!(user.is_doctor);
    assert!(user.cimage.is_none());

    let (status, json) = send(&app, "GET", "/user/u1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["_id"], created["_id"]);
    assert_eq!(json["data"]["name"], "A. Perera");
    assert_eq!(json["data"]["specialization"], "Cardiology");
    assert_eq!(json["data"]["availability"], json!([]));
    assert_eq!(store.doctor_count().await, 1);
}

#[tokio::test]
async fn test_create_duplicate_is_rejected() {
    let store = Arc::new(InMemoryStore::new());
    seed_user(&store, "u1", false).await;
    let app = create_test_app(store.clone());
    let original = create_perera(&app, "u1").await;

    let mut second = perera_body("u1");
    second["name"] = json!("Someone Else");
    let (status, json) = send(&app, "POST", "/create", Some(second)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json, json!({"success": false, "error": "Doctor profile already exists"}));

    let id = original["_id"].as_str().unwrap();
    let (_, json) = send(&app, "GET", &format!("/{}", id), None).await;
    assert_eq!(json["data"]["name"], "A. Perera");
    assert_eq!(store.doctor_count().await, 1);
}

#[tokio::test]
async fn test_create_for_missing_user() {
    let store = Arc::new(InMemoryStore::new());
    let app = create_test_app(store.clone());

    let (status, json) = send(&app, "POST", "/create", Some(perera_body("ghost"))).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "User not found");
    assert_eq!(store.doctor_count().await, 0);
}

#[tokio::test]
async fn test_create_mirrors_image_to_user() {
    let store = Arc::new(InMemoryStore::new());
    seed_user(&store, "u1", false).await;
    let app = create_test_app(store.clone());

    let mut body = perera_body("u1");
    body["image"] = json!("https://img.example/perera.png");
    body["languages"] = json!(["English", "Sinhala"]);
    let (status, json) = send(&app, "POST", "/create", Some(body)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"]["image"], "https://img.example/perera.png");
    assert_eq!(json["data"]["languages"], json!(["English", "Sinhala"]));

    let user = store.find_by_id("u1").await.unwrap().unwrap();
    assert_eq!(user.cimage.as_deref(), Some("https://img.example/perera.png"));
}

#[tokio::test]
async fn test_create_with_missing_fields_is_bad_request() {
    let store = Arc::new(InMemoryStore::new());
    seed_user(&store, "u1", false).await;
    let app = create_test_app(store.clone());

    let (status, json) = send(&app, "POST", "/create", Some(json!({"userId": "u1", "name": "A"}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert_eq!(store.doctor_count().await, 0);
}

#[tokio::test]
async fn test_create_accepts_numeric_text() {
    let store = Arc::new(InMemoryStore::new());
    seed_user(&store, "u1", false).await;
    let app = create_test_app(store.clone());

    let mut body = perera_body("u1");
    body["experience"] = json!("5");
    body["consultationFee"] = json!("3000");
    let (status, json) = send(&app, "POST", "/create", Some(body)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"]["experience"], 5);
    assert_eq!(json["data"]["consultationFee"], 3000.0);
}

#[tokio::test]
async fn test_get_by_id_expands_user() {
    let store = Arc::new(InMemoryStore::new());
    seed_user(&store, "u1", false).await;
    let app = create_test_app(store.clone());
    let created = create_perera(&app, "u1").await;

    let id = created["_id"].as_str().unwrap();
    let (status, json) = send(&app, "GET", &format!("/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["userId"], json!({"_id": "u1", "email": "u1@example.com"}));

    let (status, json) = send(&app, "GET", "/does-not-exist", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Doctor not found");
}

#[tokio::test]
async fn test_update_with_empty_body_changes_nothing() {
    let store = Arc::new(InMemoryStore::new());
    seed_user(&store, "u1", false).await;
    let app = create_test_app(store.clone());
    let created = create_perera(&app, "u1").await;
    let id = created["_id"].as_str().unwrap();

    let (status, json) = send(&app, "PUT", &format!("/{}", id), Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Doctor profile updated successfully");

    let (status, bare) = send(&app, "PUT", &format!("/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);

    for field in ["name", "specialization", "hospital", "location", "experience", "consultationFee", "image", "bio"] {
        assert_eq!(json["data"][field], created[field], "field {}", field);
        assert_eq!(bare["data"][field], created[field], "field {}", field);
    }
}

#[tokio::test]
async fn test_update_ignores_falsy_values() {
    let store = Arc::new(InMemoryStore::new());
    seed_user(&store, "u1", false).await;
    let app = create_test_app(store.clone());
    let created = create_perera(&app, "u1").await;
    let id = created["_id"].as_str().unwrap();

    let (status, json) = send(&app, "PUT", &format!("/{}", id), Some(json!({
        "name": "",
        "experience": 0,
        "hospital": "Lanka Hospital",
        "availability": [{"day": "Tuesday", "slots": [{"startTime": "09:00", "endTime": "12:00"}]}]
    }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["name"], "A. Perera");
    assert_eq!(json["data"]["experience"], 5);
    assert_eq!(json["data"]["hospital"], "Lanka Hospital");
    assert_eq!(json["data"]["availability"][0]["day"], "Tuesday");
    assert_eq!(json["data"]["userId"], "u1");
}

#[tokio::test]
async fn test_update_accepts_numeric_text() {
    let store = Arc::new(InMemoryStore::new());
    seed_user(&store, "u1", false).await;
    let app = create_test_app(store.clone());
    let created = create_perera(&app, "u1").await;
    let id = created["_id"].as_str().unwrap();

    let (status, json) = send(&app, "PUT", &format!("/{}", id), Some(json!({"experience": "7"}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["experience"], 7);
    assert_eq!(json["data"]["consultationFee"], 3000.0);
}

#[tokio::test]
async fn test_update_image_mirrors_to_user() {
    let store = Arc::new(InMemoryStore::new());
    seed_user(&store, "u1", false).await;
    let app = create_test_app(store.clone());
    let created = create_perera(&app, "u1").await;
    let id = created["_id"].as_str().unwrap();

    let (status, json) = send(&app, "PUT", &format!("/{}", id), Some(json!({"image": "https://img.example/new.png"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["image"], "https://img.example/new.png");

    let user = store.find_by_id("u1").await.unwrap().unwrap();
    assert_eq!(user.cimage.as_deref(), Some("https://img.example/new.png"));
}

#[tokio::test]
async fn test_update_image_without_user_still_succeeds() {
    let store = Arc::new(InMemoryStore::new());
    seed_user(&store, "u1", false).await;
    let app = create_test_app(store.clone());
    let created = create_perera(&app, "u1").await;
    store.remove_user("u1").await;

    let id = created["_id"].as_str().unwrap();
    let (status, json) = send(&app, "PUT", &format!("/{}", id), Some(json!({"image": "https://img.example/new.png"}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["image"], "https://img.example/new.png");
}

#[tokio::test]
async fn test_update_missing_doctor() {
    let app = create_test_app(Arc::new(InMemoryStore::new()));

    let (status, json) = send(&app, "PUT", "/missing", Some(json!({"name": "X"}))).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Doctor not found");
}

#[tokio::test]
async fn test_delete_unlinks_user() {
    let store = Arc::new(InMemoryStore::new());
    seed_user(&store, "u1", true).await;
    let app = create_test_app(store.clone());

    let (_, provisioned) = send(&app, "GET", "/user/u1", None).await;
    let id = provisioned["data"]["_id"].as_str().unwrap().to_string();

    let (status, json) = send(&app, "DELETE", &format!("/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"success": true, "message": "Doctor profile deleted successfully"}));

    let user = store.find_by_id("u1").await.unwrap().unwrap();
    assert!(!user.is_doctor);
    assert_eq!(store.doctor_count().await, 0);

    let (status, _) = send(&app, "GET", &format!("/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", &format!("/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_with_missing_user_succeeds() {
    let store = Arc::new(InMemoryStore::new());
    seed_user(&store, "u1", false).await;
    let app = create_test_app(store.clone());
    let created = create_perera(&app, "u1").await;
    store.remove_user("u1").await;

    let id = created["_id"].as_str().unwrap();
    let (status, _) = send(&app, "GET", &format!("/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send(&app, "DELETE", &format!("/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(store.doctor_count().await, 0);
}

#[tokio::test]
async fn test_search_without_filters_matches_list_all() {
    let store = Arc::new(InMemoryStore::new());
    for (user, specialization, location) in [
        ("u1", "Cardiology", "Colombo"),
        ("u2", "Dermatology", "Kandy"),
        ("u3", "Cardiology", "Kandy"),
    ] {
        seed_user(&store, user, false).await;
        let mut body = perera_body(user);
        body["specialization"] = json!(specialization);
        body["location"] = json!(location);
        let app = create_test_app(store.clone());
        let (status, _) = send(&app, "POST", "/create", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let app = create_test_app(store.clone());

    let (status, all) = send(&app, "GET", "/all", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all["data"].as_array().unwrap().len(), 3);

    let (status, search) = send(&app, "GET", "/search", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(search["data"], all["data"]);

    let (_, blank) = send(&app, "GET", "/search?specialization=&location=", None).await;
    assert_eq!(blank["data"], all["data"]);

    let (_, cardiology) = send(&app, "GET", "/search?specialization=Cardiology", None).await;
    assert_eq!(cardiology["data"].as_array().unwrap().len(), 2);

    let (_, kandy_cardiology) = send(&app, "GET", "/search?specialization=Cardiology&location=Kandy", None).await;
    let matches = kandy_cardiology["data"].as_array().unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0]["userId"], json!({"_id": "u3", "email": "u3@example.com"}));

    let (_, none) = send(&app, "GET", "/search?hospital=Nowhere", None).await;
    assert_eq!(none["data"], json!([]));
}

#[tokio::test]
async fn test_search_with_repeated_filter_is_bad_request() {
    let store = Arc::new(InMemoryStore::new());
    let app = create_test_app(store);

    let (status, json) = send(&app, "GET", "/search?hospital=H&hospital=X", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert!(json["error"].is_string());
}
