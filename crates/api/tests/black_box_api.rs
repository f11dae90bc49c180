use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::json;
use sweetshop_api::AppConfig;
use sweetshop_auth::{JwtClaims, Role};
use sweetshop_core::UserId;

const JWT_SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(config: AppConfig) -> Self {
        // Same router as prod, in-memory stores, ephemeral port.
        let app = sweetshop_api::app::build_app(&config)
            .await
            .expect("failed to build app");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    async fn default() -> Self {
        Self::spawn(AppConfig::new(JWT_SECRET)).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(secret: &str, role: Role, issued_at: chrono::DateTime<Utc>, ttl: ChronoDuration) -> String {
    let claims = JwtClaims {
        sub: UserId::new(),
        email: format!("{}@shop.test", role.as_str().to_lowercase()),
        role,
        issued_at,
        expires_at: issued_at + ttl,
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

fn token(role: Role) -> String {
    mint_jwt(JWT_SECRET, role, Utc::now(), ChronoDuration::minutes(10))
}

async fn create_sweet(
    client: &reqwest::Client,
    srv: &TestServer,
    admin: &str,
    body: serde_json::Value,
) -> serde_json::Value {
    let res = client
        .post(srv.url("/api/sweets"))
        .bearer_auth(admin)
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json().await.unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::default().await;
    let res = reqwest::get(srv.url("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::default().await;
    let client = reqwest::Client::new();

    for path in ["/api/sweets", "/api/auth/me"] {
        let res = client.get(srv.url(path)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{path}");
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body["error"], "unauthorized");
    }

    let res = client
        .get(srv.url("/api/sweets"))
        .header("Authorization", "Basic Zm9vOmJhcg==")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Writes are rejected before any body or id handling.
    let res = client
        .post(srv.url("/api/sweets"))
        .json(&json!({ "name": "Peda", "category": "Milk", "price": 20, "quantity": 3 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .post(srv.url(&format!("/api/sweets/{}/restock", UserId::new())))
        .json(&json!({ "quantity": 5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn expired_or_foreign_tokens_are_rejected() {
    let srv = TestServer::default().await;
    let client = reqwest::Client::new();

    let expired = mint_jwt(
        JWT_SECRET,
        Role::Admin,
        Utc::now() - ChronoDuration::hours(2),
        ChronoDuration::minutes(10),
    );
    let foreign = mint_jwt("other-secret", Role::Admin, Utc::now(), ChronoDuration::minutes(10));

    for t in [expired, foreign] {
        let res = client
            .get(srv.url("/api/sweets"))
            .bearer_auth(&t)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn register_login_and_me() {
    let srv = TestServer::default().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/api/auth/register"))
        .json(&json!({ "email": "Alice@Example.com", "password": "sugar-rush-1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let registered: serde_json::Value = res.json().await.unwrap();
    assert_eq!(registered["user"]["email"], "alice@example.com");
    assert_eq!(registered["user"]["role"], "USER");
    assert!(registered["user"].get("password_hash").is_none());

    let res = client
        .post(srv.url("/api/auth/login"))
        .json(&json!({ "email": "alice@example.com", "password": "sugar-rush-1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let login: serde_json::Value = res.json().await.unwrap();
    let token = login["token"].as_str().unwrap().to_string();
    assert_eq!(login["token_type"], "Bearer");

    let res = client
        .get(srv.url("/api/auth/me"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let me: serde_json::Value = res.json().await.unwrap();
    assert_eq!(me["id"], registered["user"]["id"]);
    assert_eq!(me["role"], "USER");
}

#[tokio::test]
async fn registration_validation_and_duplicates() {
    let srv = TestServer::default().await;
    let client = reqwest::Client::new();

    let register = |body: serde_json::Value| {
        let client = client.clone();
        let url = srv.url("/api/auth/register");
        async move { client.post(url).json(&body).send().await.unwrap() }
    };

    let res = register(json!({ "email": "bob@example.com", "password": "password123" })).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = register(json!({ "email": "BOB@example.com", "password": "password456" })).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = register(json!({ "email": "not-an-email", "password": "password123" })).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = register(json!({ "email": "carol@example.com", "password": "short" })).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = register(json!({ "email": "dave@example.com" })).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_body");
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let srv = TestServer::default().await;
    let client = reqwest::Client::new();

    client
        .post(srv.url("/api/auth/register"))
        .json(&json!({ "email": "erin@example.com", "password": "password123" }))
        .send()
        .await
        .unwrap();

    let wrong_password = client
        .post(srv.url("/api/auth/login"))
        .json(&json!({ "email": "erin@example.com", "password": "password999" }))
        .send()
        .await
        .unwrap();
    let unknown_email = client
        .post(srv.url("/api/auth/login"))
        .json(&json!({ "email": "nobody@example.com", "password": "password123" }))
        .send()
        .await
        .unwrap();

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    let a: serde_json::Value = wrong_password.json().await.unwrap();
    let b: serde_json::Value = unknown_email.json().await.unwrap();
    assert_eq!(a, b);
}

#[tokio::test]
async fn seeded_admin_can_log_in_and_manage_catalogue() {
    let srv = TestServer::spawn(
        AppConfig::new(JWT_SECRET).with_admin("owner@shop.test", "candy-admin-1"),
    )
    .await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/api/auth/login"))
        .json(&json!({ "email": "owner@shop.test", "password": "candy-admin-1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let login: serde_json::Value = res.json().await.unwrap();
    assert_eq!(login["user"]["role"], "ADMIN");
    let admin = login["token"].as_str().unwrap().to_string();

    let sweet = create_sweet(
        &client,
        &srv,
        &admin,
        json!({ "name": "Kaju Katli", "category": "Nut", "price": 450, "quantity": 12 }),
    )
    .await;
    assert_eq!(sweet["name"], "Kaju Katli");
    assert_eq!(sweet["quantity"], 12);
}

#[tokio::test]
async fn only_admins_create_update_and_restock() {
    let srv = TestServer::default().await;
    let client = reqwest::Client::new();
    let admin = token(Role::Admin);
    let user = token(Role::User);

    let res = client
        .post(srv.url("/api/sweets"))
        .bearer_auth(&user)
        .json(&json!({ "name": "Peda", "category": "Milk", "price": 20, "quantity": 3 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // A non-admin gets 403 even with an invalid body.
    let res = client
        .post(srv.url("/api/sweets"))
        .bearer_auth(&user)
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let sweet = create_sweet(
        &client,
        &srv,
        &admin,
        json!({ "name": "Peda", "category": "Milk", "price": 20, "quantity": 3 }),
    )
    .await;
    let id = sweet["id"].as_str().unwrap().to_string();

    let res = client
        .post(srv.url(&format!("/api/sweets/{id}/restock")))
        .bearer_auth(&user)
        .json(&json!({ "quantity": 5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .put(srv.url(&format!("/api/sweets/{id}")))
        .bearer_auth(&user)
        .json(&json!({ "price": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .put(srv.url(&format!("/api/sweets/{id}")))
        .bearer_auth(&admin)
        .json(&json!({ "price": 25, "category": "Milk Based" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: serde_json::Value = res.json().await.unwrap();
    assert_eq!(updated["price"], 25);
    assert_eq!(updated["category"], "Milk Based");
    assert_eq!(updated["quantity"], 3);
}

#[tokio::test]
async fn purchase_and_restock_move_stock() {
    let srv = TestServer::default().await;
    let client = reqwest::Client::new();
    let admin = token(Role::Admin);
    let user = token(Role::User);

    let sweet = create_sweet(
        &client,
        &srv,
        &admin,
        json!({ "name": "Ladoo", "category": "Traditional", "price": 30, "quantity": 5 }),
    )
    .await;
    let id = sweet["id"].as_str().unwrap().to_string();

    // Explicit quantity.
    let res = client
        .post(srv.url(&format!("/api/sweets/{id}/purchase")))
        .bearer_auth(&user)
        .json(&json!({ "quantity": 3 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["quantity"], 2);

    // Empty body buys one.
    let res = client
        .post(srv.url(&format!("/api/sweets/{id}/purchase")))
        .bearer_auth(&user)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["quantity"], 1);

    // Over-purchase is rejected and leaves stock untouched.
    let res = client
        .post(srv.url(&format!("/api/sweets/{id}/purchase")))
        .bearer_auth(&user)
        .json(&json!({ "quantity": 2 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invariant_violation");

    let res = client
        .post(srv.url(&format!("/api/sweets/{id}/purchase")))
        .bearer_auth(&user)
        .json(&json!({ "quantity": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .post(srv.url(&format!("/api/sweets/{id}/restock")))
        .bearer_auth(&admin)
        .json(&json!({ "quantity": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .post(srv.url(&format!("/api/sweets/{id}/restock")))
        .bearer_auth(&admin)
        .json(&json!({ "quantity": 10 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["quantity"], 11);

    let res = client
        .get(srv.url(&format!("/api/sweets/{id}")))
        .bearer_auth(&user)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["quantity"], 11);
}

#[tokio::test]
async fn listing_filters_by_name_category_and_price() {
    let srv = TestServer::default().await;
    let client = reqwest::Client::new();
    let admin = token(Role::Admin);
    let user = token(Role::User);

    for (name, category, price) in [
        ("Dark Chocolate", "Chocolate", 300),
        ("Milk Chocolate", "Chocolate", 250),
        ("Rasgulla", "Syrup", 40),
    ] {
        create_sweet(
            &client,
            &srv,
            &admin,
            json!({ "name": name, "category": category, "price": price, "quantity": 1 }),
        )
        .await;
    }

    let names = |v: serde_json::Value| -> Vec<String> {
        v.as_array()
            .unwrap()
            .iter()
            .map(|s| s["name"].as_str().unwrap().to_string())
            .collect()
    };

    let all: serde_json::Value = client
        .get(srv.url("/api/sweets"))
        .bearer_auth(&user)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(names(all), vec!["Dark Chocolate", "Milk Chocolate", "Rasgulla"]);

    let choc: serde_json::Value = client
        .get(srv.url("/api/sweets?name=choc&max_price=260"))
        .bearer_auth(&user)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(names(choc), vec!["Milk Chocolate"]);

    let syrup: serde_json::Value = client
        .get(srv.url("/api/sweets/search?category=syrup"))
        .bearer_auth(&user)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(names(syrup), vec!["Rasgulla"]);

    let res = client
        .get(srv.url("/api/sweets?min_price=10&max_price=1"))
        .bearer_auth(&user)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .get(srv.url("/api/sweets?min_price=cheap"))
        .bearer_auth(&user)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_query");
}

#[tokio::test]
async fn unknown_and_malformed_ids() {
    let srv = TestServer::default().await;
    let client = reqwest::Client::new();
    let user = token(Role::User);

    let res = client
        .get(srv.url(&format!("/api/sweets/{}", UserId::new())))
        .bearer_auth(&user)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .post(srv.url("/api/sweets/not-a-uuid/purchase"))
        .bearer_auth(&user)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_id");

    // Not valid UTF-8 once percent-decoded: rejected by the path extractor.
    let res = client
        .get(srv.url("/api/sweets/%FF"))
        .bearer_auth(&user)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_id");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn duplicate_sweet_names_conflict() {
    let srv = TestServer::default().await;
    let client = reqwest::Client::new();
    let admin = token(Role::Admin);

    create_sweet(
        &client,
        &srv,
        &admin,
        json!({ "name": "Jalebi", "category": "Fried", "price": 15 }),
    )
    .await;

    let res = client
        .post(srv.url("/api/sweets"))
        .bearer_auth(&admin)
        .json(&json!({ "name": "jalebi", "category": "Fried", "price": 15 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn concurrent_purchases_sell_exactly_the_stock() {
    let srv = TestServer::default().await;
    let client = reqwest::Client::new();
    let admin = token(Role::Admin);
    let user = token(Role::User);

    let sweet = create_sweet(
        &client,
        &srv,
        &admin,
        json!({ "name": "Barfi", "category": "Milk", "price": 35, "quantity": 5 }),
    )
    .await;
    let url = srv.url(&format!("/api/sweets/{}/purchase", sweet["id"].as_str().unwrap()));

    let mut handles = Vec::new();
    for _ in 0..12 {
        let client = client.clone();
        let url = url.clone();
        let user = user.clone();
        handles.push(tokio::spawn(async move {
            client
                .post(url)
                .bearer_auth(user)
                .json(&json!({ "quantity": 1 }))
                .send()
                .await
                .unwrap()
                .status()
        }));
    }

    let mut ok = 0;
    let mut rejected = 0;
    for h in handles {
        match h.await.unwrap() {
            StatusCode::OK => ok += 1,
            StatusCode::UNPROCESSABLE_ENTITY => rejected += 1,
            other => panic!("unexpected status {other}"),
        }
    }
    assert_eq!((ok, rejected), (5, 7));
}
