//! Upload tests: signed PUTs, write-once semantics and rejections.

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    use crate::TestServer;

    /// Send a raw HTTP/1.1 request so the path reaches the server unnormalized.
    async fn raw_put(server: &TestServer, target: &str, body: &[u8]) -> String {
        let addr = server.url("");
        let host = addr.trim_start_matches("http://");
        let mut stream = TcpStream::connect(host).await.unwrap();
        let head = format!(
            "PUT {target} HTTP/1.1\r\nHost: {host}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        stream.write_all(head.as_bytes()).await.unwrap();
        stream.write_all(body).await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn test_should_create_then_conflict() {
        let server = TestServer::start().await;

        let resp = server.put_v1("/a/b.png", b"0123456789").await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(
            resp.headers().get("server").and_then(|v| v.to_str().ok()),
            Some("httpup")
        );

        let resp = server.put_v1("/a/b.png", b"9876543210").await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let stored = std::fs::read(server.root().join("a/b.png")).unwrap();
        assert_eq!(stored, b"0123456789");
    }

    #[tokio::test]
    async fn test_should_bind_v2_token_to_content_type() {
        let server = TestServer::start().await;
        let token = server.sign_v2("/a/b.png", 10, Some("image/png"));
        let url = server.url(&format!("/a/b.png?v2={token}"));

        let resp = server
            .client()
            .put(&url)
            .header("content-type", "image/jpeg")
            .body(&b"0123456789"[..])
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let resp = server
            .client()
            .put(&url)
            .header("content-type", "image/png")
            .body(&b"0123456789"[..])
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_should_not_fall_back_to_v1_when_v2_fails() {
        let server = TestServer::start().await;
        let v1 = server.sign_v1("/a/b.png", 10);

        let resp = server
            .client()
            .put(server.url(&format!("/a/b.png?v={v1}&v2=00")))
            .body(&b"0123456789"[..])
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert!(!server.root().join("a/b.png").exists());
    }

    #[tokio::test]
    async fn test_should_reject_token_for_other_length() {
        let server = TestServer::start().await;
        let token = server.sign_v1("/a/b.png", 11);

        let resp = server
            .client()
            .put(server.url(&format!("/a/b.png?v={token}")))
            .body(&b"0123456789"[..])
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_should_reject_missing_token() {
        let server = TestServer::start().await;
        let resp = server
            .client()
            .put(server.url("/a/b.png"))
            .body(&b"0123456789"[..])
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_should_return_400_for_malformed_query() {
        let server = TestServer::start().await;
        let resp = server
            .client()
            .put(server.url("/a/b.png?v=%zz"))
            .body(&b"x"[..])
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_should_return_405_for_post() {
        let server = TestServer::start().await;
        let token = server.sign_v1("/a/b.png", 1);
        let resp = server
            .client()
            .post(server.url(&format!("/a/b.png?v={token}")))
            .body(&b"x"[..])
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_should_confine_dot_dot_to_storage_root() {
        let server = TestServer::start().await;
        let token = server.sign_v1("/../../escape.txt", 2);

        let response = raw_put(&server, &format!("/../../escape.txt?v={token}"), b"hi").await;
        assert!(response.starts_with("HTTP/1.1 201"), "{response}");
        assert!(server.root().join("escape.txt").is_file());
    }

    #[tokio::test]
    async fn test_should_refuse_path_normalizing_to_root() {
        let server = TestServer::start().await;
        let token = server.sign_v1("/a/..", 2);

        let response = raw_put(&server, &format!("/a/..?v={token}"), b"hi").await;
        assert!(response.starts_with("HTTP/1.1 403"), "{response}");
    }

    #[tokio::test]
    async fn test_should_create_exactly_once_under_concurrency() {
        let server = TestServer::start().await;

        let requests = (0..8).map(|_| server.put_v1("/race.bin", b"payload"));
        let statuses: Vec<StatusCode> = futures::future::join_all(requests)
            .await
            .iter()
            .map(reqwest::Response::status)
            .collect();

        let created = statuses.iter().filter(|s| **s == StatusCode::CREATED);
        let conflicts = statuses.iter().filter(|s| **s == StatusCode::CONFLICT);
        assert_eq!(created.count(), 1);
        assert_eq!(conflicts.count(), 7);
    }
}
