//! Commands against a mock backend.

use std::sync::Arc;

use ecotachos_ai_client::{AiClient, AiClientConfig};
use ecotachos_api_client::{ApiClient, ApiConfig, Session, TokenStore};
use ecotachos_cli::{run, ClassifyArgs, Command, Context};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn context(server: &MockServer, session: Arc<Session>) -> Context {
    Context {
        api: ApiClient::new(ApiConfig::default().with_base_url(server.uri()), session.clone()).unwrap(),
        ai: AiClient::new(AiClientConfig::default().with_base_url(server.uri()))
            .unwrap()
            .with_token_provider(session),
    }
}

fn classify_args(path: std::path::PathBuf) -> ClassifyArgs {
    ClassifyArgs {
        path,
        retries: Some(1),
        json: false,
        save: false,
        tacho: None,
        log_serverless: false,
    }
}

#[tokio::test]
async fn test_classify_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ia/health/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"engine": "roboflow"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/ia/detect/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "clasificacion_principal": {"categoria": "organico", "confianza": 93}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("cascara.jpg");
    std::fs::write(&image, [0xff, 0xd8, 0xff, 0xe0, 0, 0]).unwrap();

    let ctx = context(&server, Arc::new(Session::in_memory()));
    let ok = run(Command::Classify(classify_args(image)), &ctx).await.unwrap();
    assert!(ok);
}

#[tokio::test]
async fn test_classify_rejects_non_image_without_calling_ai() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ia/health/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"engine": "roboflow"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/ia/detect/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let notes = dir.path().join("notas.txt");
    std::fs::write(&notes, "hola").unwrap();

    let ctx = context(&server, Arc::new(Session::in_memory()));
    let ok = run(Command::Classify(classify_args(notes)), &ctx).await.unwrap();
    assert!(!ok);
}

#[tokio::test]
async fn test_classify_stops_when_local_weights_missing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ia/health/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"engine": "local", "weights_exists": false})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/ia/detect/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("foto.png");
    std::fs::write(&image, [0x89, b'P', b'N', b'G']).unwrap();

    let ctx = context(&server, Arc::new(Session::in_memory()));
    let ok = run(Command::Classify(classify_args(image)), &ctx).await.unwrap();
    assert!(!ok);
}

#[tokio::test]
async fn test_stats_requires_session() {
    let server = MockServer::start().await;
    let ctx = context(&server, Arc::new(Session::in_memory()));
    assert!(run(Command::Stats, &ctx).await.is_err());
}

#[tokio::test]
async fn test_login_then_tachos() {
    let server = MockServer::start().await;
    let user = json!({"id": 5, "nombre": "Ana", "email": "ana@example.com", "rol": "user"});

    Mock::given(method("POST"))
        .and(path("/usuarios/auth/login/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "t-1", "user": user})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/usuarios/auth/profile/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user.clone()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tachos/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "codigo": "T-1", "nombre": "Parque", "propietario": 5}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = TokenStore::new(dir.path().join("session.json"));
    let session = Arc::new(Session::open(store.clone()));
    let ctx = context(&server, session);

    let login = Command::Login {
        email: "ana@example.com".into(),
        password: "Secreta123".into(),
    };
    assert!(run(login, &ctx).await.unwrap());
    assert_eq!(store.load().as_deref(), Some("t-1"));

    assert!(run(Command::Tachos { json: true }, &ctx).await.unwrap());
}
