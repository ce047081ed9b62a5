//! `/blob` endpoint tests.

mod common;

use common::TestServer;
use rand::Rng;
use serde_json::Value;

async fn upload(server: &TestServer, name: &str, content_type: &str, body: &'static [u8]) -> Value {
    let response = server
        .client
        .post(server.url("/blob"))
        .query(&[("blobName", name)])
        .header("Content-Type", content_type)
        .body(body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    response.json().await.unwrap()
}

#[tokio::test]
async fn test_upload_and_download_blob() {
    let server = TestServer::start().await;
    let content = b"Hello, Blob Storage!";

    let json = upload(&server, "hello.txt", "text/plain", content).await;
    assert_eq!(json["message"], "Blob uploaded successfully");
    assert_eq!(json["blobName"], "hello.txt");
    assert!(json["requestId"].is_string());
    assert!(json["etag"].is_string());
    assert!(json["lastModified"].is_string());
    assert!(json["url"].as_str().unwrap().ends_with("documents/hello.txt"));

    let response = server
        .client
        .get(server.url("/blob?blobName=hello.txt"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["content-type"], "text/plain");
    assert_eq!(
        response.headers()["content-length"],
        content.len().to_string().as_str()
    );
    assert_eq!(response.bytes().await.unwrap().as_ref(), content);
}

#[tokio::test]
async fn test_upload_defaults_content_type() {
    let server = TestServer::start().await;

    let response = server
        .client
        .post(server.url("/blob?blobName=raw.bin"))
        .body(vec![0u8, 1, 2, 255])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);

    let response = server
        .client
        .get(server.url("/blob?blobName=raw.bin"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.headers()["content-type"], "application/octet-stream");
    assert_eq!(response.bytes().await.unwrap().as_ref(), &[0u8, 1, 2, 255]);
}

#[tokio::test]
async fn test_large_blob_round_trip() {
    let server = TestServer::start().await;
    let mut data = vec![0u8; 300_000];
    rand::thread_rng().fill(&mut data[..]);

    let response = server
        .client
        .post(server.url("/blob?blobName=large.bin"))
        .body(data.clone())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);

    let response = server
        .client
        .get(server.url("/blob?blobName=large.bin"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.bytes().await.unwrap().to_vec(), data);
}

#[tokio::test]
async fn test_upload_overwrites() {
    let server = TestServer::start().await;
    upload(&server, "notes.txt", "text/plain", b"first").await;
    upload(&server, "notes.txt", "text/markdown", b"second version").await;

    let response = server
        .client
        .get(server.url("/blob?blobName=notes.txt"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.headers()["content-type"], "text/markdown");
    assert_eq!(response.text().await.unwrap(), "second version");
}

#[tokio::test]
async fn test_download_missing_blob() {
    let server = TestServer::start().await;

    let response = server
        .client
        .get(server.url("/blob?blobName=missing.txt"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["error"], "Blob not found");
}

#[tokio::test]
async fn test_list_blobs() {
    let server = TestServer::start().await;
    let names = ["a.txt", "reports/b.csv", "c.json"];
    for name in names {
        upload(&server, name, "text/plain", b"data").await;
    }

    let response = server.client.get(server.url("/blob")).send().await.unwrap();
    assert_eq!(response.status(), 200);
    let json: Value = response.json().await.unwrap();

    let blobs = json["blobs"].as_array().unwrap();
    assert!(json["count"].as_u64().unwrap() >= names.len() as u64);
    assert_eq!(json["count"].as_u64().unwrap(), blobs.len() as u64);
    for name in names {
        let blob = blobs.iter().find(|b| b["name"] == name).unwrap();
        assert_eq!(blob["size"], 4);
        assert_eq!(blob["contentType"], "text/plain");
        assert!(blob["lastModified"].is_string());
    }
}

#[tokio::test]
async fn test_list_empty_container() {
    let server = TestServer::start().await;

    let json: Value = server
        .client
        .get(server.url("/blob?blobName="))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(json["count"], 0);
    assert_eq!(json["blobs"], Value::Array(vec![]));
}

#[tokio::test]
async fn test_delete_blob() {
    let server = TestServer::start().await;
    upload(&server, "doomed.txt", "text/plain", b"bye").await;

    let response = server
        .client
        .delete(server.url("/blob?blobName=doomed.txt"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["message"], "Blob deleted successfully");
    assert_eq!(json["blobName"], "doomed.txt");
    assert!(json["requestId"].is_string());

    let response = server
        .client
        .get(server.url("/blob?blobName=doomed.txt"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    let response = server
        .client
        .delete(server.url("/blob?blobName=doomed.txt"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["error"], "Blob not found");
}

#[tokio::test]
async fn test_blob_name_required() {
    let server = TestServer::start().await;

    for request in [
        server.client.post(server.url("/blob")).body("data"),
        server.client.delete(server.url("/blob")),
    ] {
        let response = request.send().await.unwrap();
        assert_eq!(response.status(), 400);
        let json: Value = response.json().await.unwrap();
        assert_eq!(json["error"], "blobName query parameter is required");
    }
}

#[tokio::test]
async fn test_unsupported_method() {
    let server = TestServer::start().await;

    let response = server
        .client
        .put(server.url("/blob?blobName=a.txt"))
        .body("data")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 405);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["error"], "Method not allowed");
}

#[tokio::test]
async fn test_api_prefix() {
    let server = TestServer::start().await;

    let response = server
        .client
        .post(server.url("/api/blob?blobName=prefixed.txt"))
        .body("via api")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);

    let response = server
        .client
        .get(server.url("/blob?blobName=prefixed.txt"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.text().await.unwrap(), "via api");
}

#[tokio::test]
async fn test_unconfigured_storage() {
    let server = TestServer::start_unconfigured().await;

    for request in [
        server.client.get(server.url("/blob")),
        server.client.post(server.url("/blob?blobName=a.txt")).body("x"),
        server.client.patch(server.url("/blob")),
    ] {
        let response = request.send().await.unwrap();
        assert_eq!(response.status(), 500);
        let json: Value = response.json().await.unwrap();
        assert_eq!(json["error"], "Storage connection string not configured");
    }
}

#[tokio::test]
async fn test_dot_segment_blob_names_rejected() {
    let server = TestServer::start().await;
    upload(&server, "kept.txt", "text/plain", b"kept").await;

    for name in ["..", "../private/secret.txt", "a/../../x", "./kept.txt"] {
        for request in [
            server.client.get(server.url("/blob")).query(&[("blobName", name)]),
            server
                .client
                .post(server.url("/blob"))
                .query(&[("blobName", name)])
                .body("overwrite"),
            server.client.delete(server.url("/blob")).query(&[("blobName", name)]),
        ] {
            let response = request.send().await.unwrap();
            assert_eq!(response.status(), 400, "{}", name);
            assert_eq!(response.headers()["x-error-code"], "InvalidBlobName");
            let json: Value = response.json().await.unwrap();
            assert_eq!(
                json["error"],
                "blobName must not contain '.' or '..' path segments"
            );
        }
    }

    let json: Value = server
        .client
        .get(server.url("/blob"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(json["count"], 1);
    assert_eq!(json["blobs"][0]["name"], "kept.txt");
}
