//! HTTP-level tests for the layer and upload routes

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use pasargis_api::{create_router, AppState};
use pasargis_core::error::Result;
use pasargis_core::models::{LayerType, NewLayer};
use pasargis_core::ports::LayerStore;
use pasargis_ingest::{GdbConverter, IngestPipeline, ToolOutput};
use pasargis_store::MemoryLayerStore;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "pasargis-test-boundary";

/// Converter whose list mode prints two layers and whose convert mode fails
/// on a missing Python module
struct StubConverter;

#[async_trait]
impl GdbConverter for StubConverter {
    async fn convert(&self, _gdb: &Path, _out: &Path, _layer: Option<&str>) -> Result<ToolOutput> {
        Ok(ToolOutput {
            exit_code: Some(1),
            output: "ModuleNotFoundError: No module named 'geopandas'".to_string(),
        })
    }

    async fn list_layers(&self, _gdb: &Path) -> Result<ToolOutput> {
        Ok(ToolOutput {
            exit_code: Some(0),
            output: "Layers in x.gdb:\n   1. KiosRejomulyo\n   2. BatasPasar".to_string(),
        })
    }
}

struct TestApp {
    router: Router,
    store: Arc<MemoryLayerStore>,
    _workspace_root: TempDir,
}

fn test_app(max_upload_bytes: usize) -> TestApp {
    let workspace_root = TempDir::new().unwrap();
    let store = Arc::new(MemoryLayerStore::new());
    let pipeline = IngestPipeline::new(Arc::new(StubConverter), workspace_root.path());
    let state = Arc::new(AppState::new(store.clone(), pipeline, max_upload_bytes));

    TestApp {
        router: create_router(state),
        store,
        _workspace_root: workspace_root,
    }
}

async fn create_kios_layer(store: &MemoryLayerStore) -> u64 {
    store
        .create_layer(NewLayer {
            pasar_id: 1,
            name: "Kios".to_string(),
            layer_type: LayerType::Polygon,
            geojson: None,
            color: None,
            opacity: None,
            is_active: true,
            sort_order: 0,
        })
        .await
        .unwrap()
        .id
        .0
}

fn multipart_body(filename: &str, content: &[u8], layer_name: Option<&str>) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(b"\r\n");
    if let Some(layer) = layer_name {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"layer_name\"\r\n\r\n{layer}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn gdb_zip() -> Vec<u8> {
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    writer
        .start_file("PasarRejomulyo.gdb/a00000001.gdbtable", options)
        .unwrap();
    writer.write_all(b"gdb").unwrap();
    writer.finish().unwrap().into_inner()
}

#[tokio::test]
async fn test_health() {
    let app = test_app(1024 * 1024);
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let (status, body) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_upload_wgs84_geojson() {
    let app = test_app(1024 * 1024);
    let layer_id = create_kios_layer(&app.store).await;
    let geojson = json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {"nama": "Kios A1"},
            "geometry": {"type": "Point", "coordinates": [110.4221, -6.9388]}
        }]
    });

    let body = multipart_body("pasar.geojson", geojson.to_string().as_bytes(), None);
    let (status, response) = send(
        &app.router,
        upload_request(&format!("/api/admin/layers/{}/upload", layer_id), body),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["reprojected"], false);
    assert!(response.get("converted_file").is_none());

    let stored: Value =
        serde_json::from_str(response["layer"]["geojson"].as_str().unwrap()).unwrap();
    assert_eq!(stored["features"][0]["properties"]["nama"], "Kios A1");
}

#[tokio::test]
async fn test_upload_mercator_geojson_is_reprojected() {
    let app = test_app(1024 * 1024);
    let layer_id = create_kios_layer(&app.store).await;
    let geojson = json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {},
            "geometry": {"type": "Point", "coordinates": [12292000.0, -772000.0]}
        }]
    });

    let body = multipart_body("pasar.json", geojson.to_string().as_bytes(), None);
    let (status, response) = send(
        &app.router,
        upload_request(&format!("/api/admin/layers/{}/upload", layer_id), body),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["reprojected"], true);

    let stored: Value =
        serde_json::from_str(response["layer"]["geojson"].as_str().unwrap()).unwrap();
    let coords = stored["features"][0]["geometry"]["coordinates"].as_array().unwrap();
    let lon = coords[0].as_f64().unwrap();
    let lat = coords[1].as_f64().unwrap();
    assert!((-180.0..=180.0).contains(&lon));
    assert!((-90.0..=90.0).contains(&lat));
}

#[tokio::test]
async fn test_failed_upload_keeps_previous_payload() {
    let app = test_app(1024 * 1024);
    let layer_id = create_kios_layer(&app.store).await;
    let uri = format!("/api/admin/layers/{}/upload", layer_id);

    let valid = json!({"type": "FeatureCollection", "features": []}).to_string();
    let (status, _) = send(
        &app.router,
        upload_request(&uri, multipart_body("a.geojson", valid.as_bytes(), None)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, response) = send(
        &app.router,
        upload_request(&uri, multipart_body("b.geojson", b"{broken", None)),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response["message"].as_str().unwrap().contains("Invalid GeoJSON"));

    let (status, response) = send(
        &app.router,
        upload_request(&uri, multipart_body("Pasar.zip", &gdb_zip(), Some("KiosRejomulyo"))),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response["detail"].as_str().unwrap().contains("geopandas"));

    let layer = app
        .store
        .get_layer(pasargis_core::models::LayerId(layer_id))
        .await
        .unwrap()
        .unwrap();
    let stored: Value = serde_json::from_str(layer.geojson.as_deref().unwrap()).unwrap();
    assert_eq!(stored, serde_json::from_str::<Value>(&valid).unwrap());
}

#[tokio::test]
async fn test_upload_unsupported_format() {
    let app = test_app(1024 * 1024);
    let layer_id = create_kios_layer(&app.store).await;

    let (status, response) = send(
        &app.router,
        upload_request(
            &format!("/api/admin/layers/{}/upload", layer_id),
            multipart_body("kios.shp", b"shapefile", None),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response["help"].is_string());
}

#[tokio::test]
async fn test_upload_zip_without_gdb() {
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;

    let app = test_app(1024 * 1024);
    let layer_id = create_kios_layer(&app.store).await;

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("readme.txt", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(b"nothing here").unwrap();
    let data = writer.finish().unwrap().into_inner();

    let (status, response) = send(
        &app.router,
        upload_request(
            &format!("/api/admin/layers/{}/upload", layer_id),
            multipart_body("upload.zip", &data, None),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response["zip_entries"], json!(["readme.txt"]));
    assert_eq!(response["extracted_items"], json!(["[FILE] readme.txt"]));
}

#[tokio::test]
async fn test_upload_to_missing_layer() {
    let app = test_app(1024 * 1024);

    let (status, _) = send(
        &app.router,
        upload_request(
            "/api/admin/layers/42/upload",
            multipart_body("pasar.geojson", b"{}", None),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_without_file_part() {
    let app = test_app(1024 * 1024);
    let layer_id = create_kios_layer(&app.store).await;
    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"layer_name\"\r\n\r\nKios\r\n--{BOUNDARY}--\r\n"
    );

    let (status, response) = send(
        &app.router,
        upload_request(
            &format!("/api/admin/layers/{}/upload", layer_id),
            body.into_bytes(),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response["message"], "No file provided");
}

#[tokio::test]
async fn test_upload_over_limit_is_rejected() {
    let app = test_app(1024);
    let layer_id = create_kios_layer(&app.store).await;

    let response = app
        .router
        .clone()
        .oneshot(upload_request(
            &format!("/api/admin/layers/{}/upload", layer_id),
            multipart_body("big.geojson", &vec![b' '; 4096], None),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_list_gdb_layers() {
    let app = test_app(1024 * 1024);

    let (status, response) = send(
        &app.router,
        upload_request("/api/admin/gdb/layers", multipart_body("Pasar.zip", &gdb_zip(), None)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["gdb_name"], "PasarRejomulyo.gdb");
    assert_eq!(response["layers"], json!(["KiosRejomulyo", "BatasPasar"]));
}

#[tokio::test]
async fn test_layer_crud() {
    let app = test_app(1024 * 1024);

    let (status, created) = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/admin/layers",
            json!({"pasar_id": 3, "name": "Zonasi", "type": "polygon", "color": "#FF8800", "opacity": 0.4, "sort_order": 2}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_u64().unwrap();

    send(
        &app.router,
        json_request(
            Method::POST,
            "/api/admin/layers",
            json!({"pasar_id": 3, "name": "Batas", "type": "line"}),
        ),
    )
    .await;

    let request = Request::builder()
        .uri("/api/admin/layers?pasar_id=3")
        .body(Body::empty())
        .unwrap();
    let (status, listed) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Batas", "Zonasi"]);

    let (status, updated) = send(
        &app.router,
        json_request(
            Method::PUT,
            &format!("/api/admin/layers/{}", id),
            json!({"is_active": false}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["is_active"], false);
    assert_eq!(updated["color"], "#FF8800");

    let request = Request::builder()
        .method(Method::DELETE)
        .uri(format!("/api/admin/layers/{}", id))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.store.len(), 1);
}

#[tokio::test]
async fn test_layer_validation() {
    let app = test_app(1024 * 1024);

    let (status, response) = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/admin/layers",
            json!({"pasar_id": 1, "name": "Kios", "type": "polygon", "opacity": 2.0}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response["message"].as_str().unwrap().contains("opacity"));
}
