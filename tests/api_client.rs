mod common;

use serde_json::json;
use wiremock::matchers::{body_json, body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{client, mint_token, stock_json, sweet_json, sweets_json, NoAuthorization};
use sweetshop_lib::api::{ApiError, SearchFilter, SweetForm, SweetUpdate};
use sweetshop_lib::session::Session;

#[tokio::test]
async fn login_then_list_sends_bearer_from_that_token() {
    let server = MockServer::start().await;
    let token = mint_token("alice", 3600, None);

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string("username=alice&password=s3cret"))
        .and(NoAuthorization)
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": token,
            "token_type": "bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/sweets"))
        .and(header("authorization", format!("Bearer {}", token).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(sweets_json()))
        .expect(1)
        .mount(&server)
        .await;

    let session = Session::in_memory();
    let api = client(&server, session.clone());

    let auth = api.login("alice", "s3cret").await.unwrap();
    assert_eq!(auth.token_type, "bearer");
    session.store(&auth.access_token).unwrap();
    assert_eq!(session.current_username().as_deref(), Some("alice"));
    assert!(session.is_authenticated());

    let sweets = api.list_all().await.unwrap();
    assert_eq!(sweets.len(), 2);
    assert_eq!(sweets[0].name, "Fudge");
    assert_eq!(sweets[1].quantity, 0);
}

#[tokio::test]
async fn no_token_means_no_authorization_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/sweets"))
        .and(NoAuthorization)
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server, Session::in_memory());
    assert!(api.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn empty_stored_token_is_not_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/sweets"))
        .and(NoAuthorization)
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let session = Session::in_memory();
    session.store("").unwrap();
    client(&server, session).list_all().await.unwrap();
}

#[tokio::test]
async fn search_sends_only_the_set_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/sweets/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([sweet_json(1, "Fudge", 5)])))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server, Session::in_memory());
    let filter = SearchFilter {
        category: Some("Chocolate".to_string()),
        min_price: Some(10.0),
        ..Default::default()
    };
    let found = api.search(&filter).await.unwrap();
    assert_eq!(found.len(), 1);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.query(), Some("category=Chocolate&min_price=10"));
}

#[tokio::test]
async fn search_with_empty_filter_still_hits_search() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/sweets/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server, Session::in_memory());
    api.search(&SearchFilter::default()).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), None);
}

#[tokio::test]
async fn create_update_delete_use_the_right_routes() {
    let server = MockServer::start().await;
    let token = mint_token("root", 3600, Some(true));

    Mock::given(method("POST"))
        .and(path("/api/sweets"))
        .and(body_json(json!({
            "name": "Fudge", "category": "Chocolate", "price": 2.5, "quantity": 5
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(sweet_json(7, "Fudge", 5)))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/api/sweets/7"))
        .and(body_json(json!({ "quantity": 9 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(sweet_json(7, "Fudge", 9)))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/sweets/7"))
        .and(header("authorization", format!("Bearer {}", token).as_str()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "message": "Sweet deleted successfully" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let session = Session::in_memory();
    session.store(&token).unwrap();
    let api = client(&server, session);

    let created = api
        .create(&SweetForm {
            name: "Fudge".to_string(),
            category: "Chocolate".to_string(),
            price: 2.5,
            quantity: 5,
        })
        .await
        .unwrap();
    assert_eq!(created.id, 7);

    let updated = api
        .update(
            7,
            &SweetUpdate {
                quantity: Some(9),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.quantity, 9);

    api.delete(7).await.unwrap();
}

#[tokio::test]
async fn purchase_and_restock_post_quantity() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/sweets/1/purchase"))
        .and(body_json(json!({ "quantity": 2 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(stock_json("Purchase", 1, 3, 2)))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/sweets/1/restock"))
        .and(body_json(json!({ "quantity": 10 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(stock_json("Restock", 1, 13, 10)))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server, Session::in_memory());

    let bought = api.purchase(1, 2).await.unwrap();
    assert_eq!(bought.quantity, 3);
    assert_eq!(bought.changed_by, 2);

    let restocked = api.restock(1, 10).await.unwrap();
    assert_eq!(restocked.quantity, 13);
    assert_eq!(restocked.changed_by, 10);
}

#[tokio::test]
async fn server_detail_is_surfaced_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/sweets/1/purchase"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "detail": "Insufficient stock. Only 5 available."
        })))
        .mount(&server)
        .await;

    let api = client(&server, Session::in_memory());
    let err = api.purchase(1, 6).await.unwrap_err();
    match err {
        ApiError::Server { status, ref detail } => {
            assert_eq!(status.as_u16(), 400);
            assert_eq!(detail, "Insufficient stock. Only 5 available.");
        }
        other => panic!("expected server error, got {:?}", other),
    }
}

#[tokio::test]
async fn unauthorized_is_its_own_variant() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/sweets"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Could not validate credentials"
        })))
        .mount(&server)
        .await;

    let api = client(&server, Session::in_memory());
    let err = api.list_all().await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.to_string(), "Could not validate credentials");
}

#[tokio::test]
async fn malformed_success_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/sweets"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let api = client(&server, Session::in_memory());
    let err = api.list_all().await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
    assert_eq!(err.user_message("Failed to load sweets"), "Failed to load sweets");
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    // Bind then drop so nothing is listening on the port.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let uri = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let api = sweetshop_lib::api::ApiClient::new(&uri, Session::in_memory());
    let err = api.list_all().await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
    assert_eq!(err.user_message("Operation failed"), "Operation failed");
}

#[tokio::test]
async fn register_posts_json_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .and(body_json(json!({
            "email": "alice@example.com",
            "username": "alice",
            "password": "s3cret"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1, "email": "alice@example.com", "username": "alice", "is_admin": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server, Session::in_memory());
    let created = api
        .register("alice@example.com", "alice", "s3cret")
        .await
        .unwrap();
    assert_eq!(created["username"], "alice");
}
