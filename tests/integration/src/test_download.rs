//! Download tests: round trips, HEAD and missing objects.

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use crate::TestServer;

    #[tokio::test]
    async fn test_should_round_trip_uploaded_bytes() {
        let server = TestServer::start().await;
        let payload: &'static [u8] = b"\x00\x01binary\xffpayload";

        let resp = server.put_v1("/files/blob.bin", payload).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let resp = server
            .client()
            .get(server.url("/files/blob.bin"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok()),
            Some("application/octet-stream")
        );
        assert_eq!(resp.bytes().await.unwrap().as_ref(), payload);
    }

    #[tokio::test]
    async fn test_should_serve_percent_encoded_names() {
        let server = TestServer::start().await;
        let token = server.sign_v1("/my photo.png", 3);

        let resp = server
            .client()
            .put(server.url(&format!("/my%20photo.png?v={token}")))
            .body(&b"png"[..])
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert!(server.root().join("my photo.png").is_file());

        let resp = server
            .client()
            .get(server.url("/my%20photo.png"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok()),
            Some("image/png")
        );
    }

    #[tokio::test]
    async fn test_should_answer_head_with_length_only() {
        let server = TestServer::start().await;
        server.put_v1("/doc.txt", b"hello").await;

        let resp = server
            .client()
            .head(server.url("/doc.txt"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()
                .get("content-length")
                .and_then(|v| v.to_str().ok()),
            Some("5")
        );
        assert!(resp.headers().contains_key("last-modified"));
    }

    #[tokio::test]
    async fn test_should_serve_byte_range_for_seeking() {
        let server = TestServer::start().await;
        server.put_v1("/media/clip.mp4", b"0123456789").await;

        let resp = server
            .client()
            .get(server.url("/media/clip.mp4"))
            .header("range", "bytes=4-6")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(
            resp.headers()
                .get("content-range")
                .and_then(|v| v.to_str().ok()),
            Some("bytes 4-6/10")
        );
        assert_eq!(resp.bytes().await.unwrap().as_ref(), b"456");

        let resp = server
            .client()
            .get(server.url("/media/clip.mp4"))
            .header("range", "bytes=10-")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::RANGE_NOT_SATISFIABLE);
    }

    #[tokio::test]
    async fn test_should_return_404_for_missing_object_and_root() {
        let server = TestServer::start().await;
        for path in ["/missing.txt", "/"] {
            let resp = server.client().get(server.url(path)).send().await.unwrap();
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{path}");
            assert!(resp.headers().contains_key("x-request-id"));
        }
    }
}
