//! Surface tests for the market node: health, accounts, and listings.

use platter_node_integration::{
    make_dummy_food, make_dummy_purchase, make_dummy_user, spawn_node, spawn_node_with_dir,
};
use serde_json::{json, Value};

#[tokio::test]
async fn test_health_reports_counts() {
    let node = spawn_node().await;

    let resp = node.get("/health").await;
    assert_eq!(resp.status().as_u16(), 200);
    let health: Value = resp.json().await.unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["users"], 0);
    assert_eq!(health["foods"], 0);
    assert_eq!(health["purchases"], 0);

    node.post("/users", &make_dummy_user("Alice")).await;
    node.post("/foods", &make_dummy_food("Haloumi", "Gary", 10, 12.5))
        .await;

    let health: Value = node.get("/health").await.json().await.unwrap();
    assert_eq!(health["users"], 1);
    assert_eq!(health["foods"], 1);
}

#[tokio::test]
async fn test_user_registration_round_trip() {
    let node = spawn_node().await;

    let resp = node.post("/users", &make_dummy_user("Alice")).await;
    assert_eq!(resp.status().as_u16(), 201);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["userId"], "u-1");
    assert_eq!(body["message"], "User registered successfully");

    let users: Value = node.get("/users").await.json().await.unwrap();
    let users = users.as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["email"], "alice@example.com");
    assert_eq!(users[0]["photoUrl"], "https://example.com/alice.png");

    // Credentials never come back out.
    assert!(users[0].get("password").is_none());
    assert!(users[0].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_duplicate_email_conflicts() {
    let node = spawn_node().await;

    assert_eq!(
        node.post("/users", &make_dummy_user("Alice"))
            .await
            .status()
            .as_u16(),
        201
    );
    let resp = node.post("/users", &make_dummy_user("Alice")).await;
    assert_eq!(resp.status().as_u16(), 409);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("alice@example.com"));
}

#[tokio::test]
async fn test_registration_requires_all_fields() {
    let node = spawn_node().await;

    let mut body = make_dummy_user("Alice");
    body.as_object_mut().unwrap().remove("email");
    let resp = node.post("/users", &body).await;
    assert_eq!(resp.status().as_u16(), 400);
    let err: Value = resp.json().await.unwrap();
    assert!(err["error"].as_str().unwrap().contains("email"));

    assert_eq!(node.get("/users").await.json::<Value>().await.unwrap(), json!([]));
}

#[tokio::test]
async fn test_wrong_typed_fields_are_bad_requests() {
    let node = spawn_node().await;

    let mut food = make_dummy_food("Haloumi", "Gary", 10, 12.5);
    food["quantity"] = json!("three");
    let resp = node.post("/foods", &food).await;
    assert_eq!(resp.status().as_u16(), 400);
    let err: Value = resp.json().await.unwrap();
    assert!(err["error"].as_str().unwrap().contains("body"));

    let mut user = make_dummy_user("Alice");
    user["name"] = json!(7);
    assert_eq!(node.post("/users", &user).await.status().as_u16(), 400);

    assert_eq!(
        node.post("/session", &json!({"email": 3}))
            .await
            .status()
            .as_u16(),
        400
    );

    let health: Value = node.get("/health").await.json().await.unwrap();
    assert_eq!(health["users"], 0);
    assert_eq!(health["foods"], 0);
}

#[tokio::test]
async fn test_food_listing_crud() {
    let node = spawn_node().await;

    let resp = node
        .post("/foods", &make_dummy_food("Haloumi", "Gary", 10, 12.5))
        .await;
    assert_eq!(resp.status().as_u16(), 201);
    let created: Value = resp.json().await.unwrap();
    assert_eq!(created["id"], "f-1");
    assert_eq!(created["quantity"], 10);
    assert_eq!(created["purchaseCount"], 0);
    assert_eq!(created["addedBy"], "gary@example.com");
    assert!(created["createdAt"].is_string());

    let listed: Value = node.get("/foods").await.json().await.unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let fetched: Value = node.get("/foods/f-1").await.json().await.unwrap();
    assert_eq!(fetched["name"], "Haloumi");

    let resp = node
        .put("/foods/f-1", &make_dummy_food("Smoked Haloumi", "Gary", 20, 15.0))
        .await;
    assert_eq!(resp.status().as_u16(), 200);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["name"], "Smoked Haloumi");
    assert_eq!(updated["quantity"], 20);
    assert_eq!(updated["price"], 15.0);
    assert_eq!(updated["purchaseCount"], 0);
    assert_eq!(updated["createdAt"], created["createdAt"]);
}

#[tokio::test]
async fn test_food_name_collisions_conflict() {
    let node = spawn_node().await;

    node.post("/foods", &make_dummy_food("Haloumi", "Gary", 10, 12.5))
        .await;
    node.post("/foods", &make_dummy_food("Feta", "Gary", 4, 8.0))
        .await;

    let resp = node
        .post("/foods", &make_dummy_food("Haloumi", "Emma", 3, 9.0))
        .await;
    assert_eq!(resp.status().as_u16(), 409);

    let resp = node
        .put("/foods/f-2", &make_dummy_food("Haloumi", "Gary", 4, 8.0))
        .await;
    assert_eq!(resp.status().as_u16(), 409);
}

#[tokio::test]
async fn test_listing_requires_all_fields() {
    let node = spawn_node().await;

    let mut body = make_dummy_food("Haloumi", "Gary", 10, 12.5);
    body.as_object_mut().unwrap().remove("origin");
    let resp = node.post("/foods", &body).await;
    assert_eq!(resp.status().as_u16(), 400);
    let err: Value = resp.json().await.unwrap();
    assert!(err["error"].as_str().unwrap().contains("origin"));
}

#[tokio::test]
async fn test_unknown_ids_are_not_found() {
    let node = spawn_node().await;

    assert_eq!(node.get("/foods/f-99").await.status().as_u16(), 404);
    assert_eq!(node.get("/purchases/p-99").await.status().as_u16(), 404);
    assert_eq!(node.delete("/purchases/p-99").await.status().as_u16(), 404);
    assert_eq!(
        node.put("/foods/f-99", &make_dummy_food("Haloumi", "Gary", 1, 1.0))
            .await
            .status()
            .as_u16(),
        404
    );
}

#[tokio::test]
async fn test_snapshot_survives_restart() {
    let dir = tempfile::tempdir().unwrap();

    let node = spawn_node_with_dir(dir.path()).await;
    node.post("/foods", &make_dummy_food("Haloumi", "Gary", 10, 12.5))
        .await;
    let resp = node
        .post(
            "/purchases",
            &make_dummy_purchase("Haloumi", "Alice", 4, 12.5),
        )
        .await;
    assert_eq!(resp.status().as_u16(), 201);
    node.shutdown();

    let reopened = spawn_node_with_dir(dir.path()).await;
    let foods: Value = reopened.get("/foods").await.json().await.unwrap();
    assert_eq!(foods[0]["quantity"], 6);
    assert_eq!(foods[0]["purchaseCount"], 4);

    let purchases: Value = reopened.get("/purchases").await.json().await.unwrap();
    assert_eq!(purchases.as_array().unwrap().len(), 1);
    assert_eq!(purchases[0]["id"], "p-1");
}
