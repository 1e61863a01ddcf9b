//! Backend client behavior against a mock server.

use std::sync::Arc;

use ecotachos_api_client::{ApiClient, ApiConfig, ApiError, CantonForm, DetectionImage, Session, TokenStore};
use ecotachos_models::{LoginRequest, NewDeteccion, WasteCategory};
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn user_json(id: i64, rol: &str) -> serde_json::Value {
    json!({"id": id, "nombre": "Ana", "email": "ana@example.com", "rol": rol})
}

fn client_with_session(server: &MockServer, session: Arc<Session>) -> ApiClient {
    ApiClient::new(ApiConfig::default().with_base_url(server.uri()), session).unwrap()
}

fn tacho_json(id: i64, nombre: &str, propietario: i64) -> serde_json::Value {
    json!({"id": id, "codigo": format!("T-{}", id), "nombre": nombre, "propietario": propietario})
}

#[tokio::test]
async fn test_login_persists_token() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let path_ = dir.path().join("session.json");

    Mock::given(method("POST"))
        .and(path("/usuarios/auth/login/"))
        .and(body_json(json!({"email": "ana@example.com", "password": "Secreta123"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"token": "tok-9", "user": user_json(9, "admin")})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let session = Arc::new(Session::open(TokenStore::new(&path_)));
    let client = client_with_session(&server, session.clone());
    let user = client
        .login(&LoginRequest {
            email: "ana@example.com".into(),
            password: "Secreta123".into(),
        })
        .await
        .unwrap();

    assert_eq!(user.id, 9);
    assert!(session.is_admin());
    assert_eq!(TokenStore::new(&path_).load().as_deref(), Some("tok-9"));
}

#[tokio::test]
async fn test_invalid_login_payload_is_rejected_locally() {
    let server = MockServer::start().await;
    let client = client_with_session(&server, Arc::new(Session::in_memory()));

    let err = client
        .login(&LoginRequest {
            email: "not-an-email".into(),
            password: "x".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_401_invalidates_session() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let store = TokenStore::new(dir.path().join("session.json"));
    store.save("expired").unwrap();

    Mock::given(method("GET"))
        .and(path("/tachos/"))
        .and(header("authorization", "Bearer expired"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Token inválido."})))
        .expect(1)
        .mount(&server)
        .await;

    let session = Arc::new(Session::open(store.clone()));
    let client = client_with_session(&server, session.clone());

    let err = client.list_tachos().await.unwrap_err();
    assert!(err.is_unauthorized());
    assert!(!session.is_authenticated());
    assert_eq!(store.load(), None);
}

#[tokio::test]
async fn test_restore_session_on_startup() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let store = TokenStore::new(dir.path().join("session.json"));
    store.save("good").unwrap();

    Mock::given(method("GET"))
        .and(path("/usuarios/auth/profile/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json(3, "user")))
        .mount(&server)
        .await;

    let session = Arc::new(Session::open(store));
    let client = client_with_session(&server, session.clone());
    let user = client.restore_session().await.unwrap();
    assert_eq!(user.id, 3);
    assert_eq!(session.current_user().map(|u| u.id), Some(3));
}

#[tokio::test]
async fn test_restore_session_failure_clears_token() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let store = TokenStore::new(dir.path().join("session.json"));
    store.save("stale").unwrap();

    Mock::given(method("GET"))
        .and(path("/usuarios/auth/profile/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let session = Arc::new(Session::open(store.clone()));
    let client = client_with_session(&server, session.clone());
    assert!(client.restore_session().await.is_none());
    assert!(!session.is_authenticated());
    assert_eq!(store.load(), None);
}

#[tokio::test]
async fn test_list_accepts_paginated_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ubicacion/provincias/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1,
            "next": null,
            "results": [{"id": 1, "nombre": "Azuay"}]
        })))
        .mount(&server)
        .await;

    let client = client_with_session(&server, Arc::new(Session::in_memory()));
    let provincias = client.list_provincias().await.unwrap();
    assert_eq!(provincias.len(), 1);
    assert_eq!(provincias[0].nombre, "Azuay");
}

#[tokio::test]
async fn test_dashboard_stats_and_user_tachos() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tachos/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            tacho_json(1, "Zona Norte", 5),
            tacho_json(2, "Avenida", 5),
            tacho_json(3, "Parque", 8)
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/detecciones/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "tacho": 1, "clasificacion": "organico", "confianza_ia": "80.00"},
            {"id": 2, "tacho": 3, "clasificacion": "reciclable", "confianza_ia": 60}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/usuarios/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([user_json(5, "user")])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ubicacion/cantones/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": [
            {"id": 1, "nombre": "Cuenca", "ciudad": 1},
            {"id": 2, "nombre": "Gualaceo", "ciudad": 1}
        ]})))
        .mount(&server)
        .await;

    let client = client_with_session(&server, Arc::new(Session::in_memory()));

    let stats = client.dashboard_stats().await.unwrap();
    assert_eq!(stats.total_tachos, 3);
    assert_eq!(stats.total_detecciones, 2);
    assert_eq!(stats.total_usuarios, 1);
    assert_eq!(stats.total_ubicaciones, 2);

    let owner: ecotachos_models::Usuario = serde_json::from_value(user_json(5, "user")).unwrap();
    let mine = client.user_tachos(&owner).await.unwrap();
    let names: Vec<&str> = mine.iter().map(|t| t.nombre.as_str()).collect();
    assert_eq!(names, vec!["Avenida", "Zona Norte"]);

    let detecciones = client.user_detecciones(&owner).await.unwrap();
    assert_eq!(detecciones.len(), 1);
    assert_eq!(detecciones[0].id, 1);

    let det_stats = client.detection_stats().await.unwrap();
    assert_eq!(det_stats.total, 2);
    assert!((det_stats.confianza_promedio - 70.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_save_canton_creates_missing_hierarchy() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ubicacion/provincias/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1, "nombre": "Azuay"}])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ubicacion/ciudades/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/ubicacion/provincias/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 99, "nombre": "x"})))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/ubicacion/ciudades/"))
        .and(body_json(json!({"nombre": "Cuenca", "provincia": 1})))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"id": 4, "nombre": "Cuenca", "provincia": 1})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/ubicacion/cantones/"))
        .and(body_json(json!({"nombre": "El Vecino", "ciudad": 4})))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"id": 12, "nombre": "El Vecino", "ciudad": 4})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_with_session(&server, Arc::new(Session::in_memory()));
    let canton = client
        .save_canton_with_hierarchy(
            &CantonForm {
                provincia: "AZUAY".into(),
                ciudad: " cUENCA ".into(),
                canton: " El Vecino ".into(),
            },
            None,
        )
        .await
        .unwrap();
    assert_eq!(canton.id, 12);
}

#[tokio::test]
async fn test_create_deteccion_multipart_and_iot() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/detecciones/"))
        .and(body_string_contains("name=\"clasificacion\""))
        .and(body_string_contains("filename=\"deteccion.jpg\""))
        .and(body_string_contains("jpeg-placeholder"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 41, "tacho": 2, "clasificacion": "reciclable", "confianza_ia": "87.50"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/iot/esp32/detect/"))
        .and(body_json(json!({"tacho_id": 2, "clasificacion": "reciclable"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_with_session(&server, Arc::new(Session::in_memory()));
    let record = NewDeteccion::new(5, Some((2, None)), WasteCategory::Reciclable, 0.875, &[]);
    let saved = client
        .create_deteccion(
            &record,
            DetectionImage {
                file_name: "deteccion.jpg".into(),
                mime: "image/jpeg".into(),
                bytes: b"jpeg-placeholder".to_vec(),
            },
        )
        .await
        .unwrap();
    assert_eq!(saved.id, 41);
    assert_eq!(saved.confianza_ia, 87.5);

    client.notify_iot(2, WasteCategory::Reciclable).await.unwrap();
}

#[tokio::test]
async fn test_logout_clears_even_if_backend_fails() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/usuarios/auth/logout/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let session = Arc::new(Session::in_memory());
    session
        .login(serde_json::from_value(user_json(1, "user")).unwrap(), "t".into())
        .unwrap();
    let client = client_with_session(&server, session.clone());

    client.logout().await.unwrap();
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn test_delete_accepts_empty_body() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/tachos/7/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_with_session(&server, Arc::new(Session::in_memory()));
    client.delete_tacho(7).await.unwrap();
}
