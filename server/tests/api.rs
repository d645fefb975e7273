use jirai_common::protocol::{ErrorKind, ErrorResponse, MineFieldSummary, SessionView};
use jirai_server::{
    build,
    config::{Config, DataSourceConfig, RandomFieldConfig, SessionConfig},
    error::Error,
};
use rocket::{
    http::{ContentType, Status},
    local::asynchronous::Client,
};
use serde_json::{Value, json};

async fn client(config: Config) -> Client {
    Client::tracked(build(&config).unwrap()).await.unwrap()
}

async fn create(client: &Client, field_id: &str) -> SessionView {
    let response = client
        .post("/sessions")
        .header(ContentType::JSON)
        .body(json!({ "field_id": field_id }).to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    response.into_json().await.unwrap()
}

async fn touch(client: &Client, session_id: &str, position: Value) -> (Status, Value) {
    let response = client
        .put(format!("/sessions/{session_id}/touch"))
        .header(ContentType::JSON)
        .body(json!({ "position": position }).to_string())
        .dispatch()
        .await;
    let status = response.status();
    (status, response.into_json().await.unwrap())
}

#[tokio::test]
async fn lists_fields_without_mine_positions() {
    let client = client(Config::default()).await;

    let response = client.get("/minefields").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(
        body,
        json!([{ "id": "sample-id", "name": "sample", "field_size": [8, 8], "num_of_mines": 20 }])
    );

    let response = client.get("/minefields/sample-id").dispatch().await;
    let field: MineFieldSummary = response.into_json().await.unwrap();
    assert_eq!(field.num_of_mines, 20);

    let response = client.get("/minefields/missing").dispatch().await;
    assert_eq!(response.status(), Status::BadRequest);
    let error: ErrorResponse = response.into_json().await.unwrap();
    assert_eq!(error.error, ErrorKind::BadRequest);
}

#[tokio::test]
async fn plays_until_a_mine_is_hit() {
    let client = client(Config::default()).await;
    let session = create(&client, "sample-id").await;
    assert_eq!(session.field_id, "sample-id");
    assert_eq!(session.status.code, 1);
    assert_eq!(session.state, vec![vec![-1; 8]; 8]);

    let (status, body) = touch(&client, &session.session_id, json!([7, 0])).await;
    assert_eq!(status, Status::Ok);
    assert_eq!(body["state"][0][7], 0);
    assert_eq!(body["status"], json!({ "code": 1, "text": "still alive" }));
    assert!(body["state"].to_string().contains("-1"));
    assert!(!body["state"].to_string().contains("-2"));

    let (status, body) = touch(&client, &session.session_id, json!([7, 0])).await;
    assert_eq!(status, Status::BadRequest);
    assert_eq!(body["error"], "BadRequest");

    let (status, _) = touch(&client, &session.session_id, json!([8, 0])).await;
    assert_eq!(status, Status::BadRequest);

    let (status, body) = touch(&client, &session.session_id, json!([0, 0])).await;
    assert_eq!(status, Status::Ok);
    assert_eq!(body["status"], json!({ "code": -1, "text": "game over" }));
    assert_eq!(body["state"][0][0], -2);

    let response = client
        .get(format!("/sessions/{}", session.session_id))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
}

#[tokio::test]
async fn malformed_positions_are_bad_requests() {
    let client = client(Config::default()).await;
    let session = create(&client, "sample-id").await;

    for position in [json!("a1"), json!([1]), json!([1, 2, 3]), json!(["1", 2]), json!([1.5, 2])] {
        let (status, body) = touch(&client, &session.session_id, position.clone()).await;
        assert_eq!(status, Status::BadRequest, "{position}");
        assert_eq!(body["error"], "BadRequest");
    }

    let response = client
        .get(format!("/sessions/{}", session.session_id))
        .dispatch()
        .await;
    let view: SessionView = response.into_json().await.unwrap();
    assert_eq!(view.state, vec![vec![-1; 8]; 8]);
}

#[tokio::test]
async fn unknown_sessions_and_fields_are_bad_requests() {
    let client = client(Config::default()).await;

    let (status, _) = touch(&client, "no-such-session", json!([0, 0])).await;
    assert_eq!(status, Status::BadRequest);

    let response = client
        .post("/sessions")
        .header(ContentType::JSON)
        .body(r#"{"field_id": "missing"}"#)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);

    let response = client
        .post("/sessions")
        .header(ContentType::JSON)
        .body("{}")
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
}

#[tokio::test]
async fn delete_is_idempotent() {
    let client = client(Config::default()).await;
    let session = create(&client, "sample-id").await;
    let path = format!("/sessions/{}", session.session_id);

    assert_eq!(client.delete(path.as_str()).dispatch().await.status(), Status::NoContent);
    assert_eq!(client.delete(path.as_str()).dispatch().await.status(), Status::NoContent);
    assert_eq!(client.get(path.as_str()).dispatch().await.status(), Status::BadRequest);
}

#[tokio::test]
async fn capacity_exhaustion_is_a_server_error() {
    let config = Config {
        sessions: SessionConfig {
            capacity: 2,
            ..SessionConfig::default()
        },
        ..Config::default()
    };
    let client = client(config).await;
    create(&client, "sample-id").await;
    create(&client, "sample-id").await;

    let response = client
        .post("/sessions")
        .header(ContentType::JSON)
        .body(r#"{"field_id": "sample-id"}"#)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::InternalServerError);
    let error: ErrorResponse = response.into_json().await.unwrap();
    assert_eq!(error.error, ErrorKind::ServerError);
}

#[tokio::test]
async fn unknown_routes_render_json_errors() {
    let client = client(Config::default()).await;

    let response = client.get("/nowhere").dispatch().await;
    assert_eq!(response.status(), Status::NotFound);
    let error: ErrorResponse = response.into_json().await.unwrap();
    assert_eq!(error.error, ErrorKind::BadRequest);
}

#[tokio::test]
async fn random_datasource_serves_generated_fields() {
    let config = Config {
        datasource: DataSourceConfig {
            kind: Some("random".to_string()),
            seed: Some(42),
            fields: vec![RandomFieldConfig {
                name: "open".to_string(),
                width: 6,
                height: 4,
                mines: 0,
            }],
            path: None,
        },
        ..Config::default()
    };
    let client = client(config).await;

    let session = create(&client, "random-0").await;
    assert_eq!(session.state.len(), 4);
    assert_eq!(session.state[0].len(), 6);

    let (status, body) = touch(&client, &session.session_id, json!([5, 3])).await;
    assert_eq!(status, Status::Ok);
    assert_eq!(body["status"], json!({ "code": 2, "text": "cleared" }));
}

#[test]
fn unsupported_datasource_fails_to_build() {
    let config = Config {
        datasource: DataSourceConfig {
            kind: Some("mysql".to_string()),
            ..DataSourceConfig::default()
        },
        ..Config::default()
    };

    assert!(matches!(build(&config), Err(Error::Unavailable { .. })));
}
