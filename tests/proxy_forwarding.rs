//! End-to-end tests for the reverse proxy against mock upstreams.

use axum::http::StatusCode;
use proxybench::ProxyConfig;

mod common;

fn config_for(backend: std::net::SocketAddr) -> ProxyConfig {
    ProxyConfig::for_target(format!("http://{backend}"))
}

#[tokio::test]
async fn forwards_path_query_and_body() {
    let (backend, mut seen) = common::start_mock_backend("hello from backend").await;
    let (proxy, shutdown) = common::start_proxy(config_for(backend)).await;

    let res = common::test_client()
        .put(format!("http://{proxy}/foo/bar?x=1&y=two"))
        .body("payload")
        .send()
        .await
        .expect("Proxy unreachable");

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "hello from backend");

    let request = seen.recv().await.unwrap();
    assert_eq!(request.method, "PUT");
    assert_eq!(request.target, "/foo/bar?x=1&y=two");
    assert_eq!(request.body, b"payload");

    shutdown.trigger();
}

#[tokio::test]
async fn keeps_target_base_path_prefix() {
    let (backend, mut seen) = common::start_mock_backend("ok").await;
    let config = ProxyConfig::for_target(format!("http://{backend}/api/"));
    let (proxy, shutdown) = common::start_proxy(config).await;

    let res = common::test_client()
        .get(format!("http://{proxy}/v1/items?page=2"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(seen.recv().await.unwrap().target, "/api/v1/items?page=2");

    shutdown.trigger();
}

#[tokio::test]
async fn strips_hop_by_hop_and_accept_encoding() {
    let (backend, mut seen) = common::start_mock_backend("ok").await;
    let (proxy, shutdown) = common::start_proxy(config_for(backend)).await;

    let res = common::test_client()
        .get(format!("http://{proxy}/"))
        .header("Connection", "keep-alive")
        .header("Keep-Alive", "timeout=5")
        .header("Proxy-Authorization", "Basic Zm9vOmJhcg==")
        .header("TE", "trailers")
        .header("Accept-Encoding", "gzip, br")
        .header("X-Custom", "kept")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let request = seen.recv().await.unwrap();
    for name in ["connection", "keep-alive", "proxy-authorization", "te", "accept-encoding"] {
        assert!(!request.has_header(name), "{name} reached the upstream");
    }
    assert_eq!(request.header("x-custom"), Some("kept"));

    shutdown.trigger();
}

#[tokio::test]
async fn rewrites_host_when_enabled() {
    let (backend, mut seen) = common::start_mock_backend("ok").await;
    let (proxy, shutdown) = common::start_proxy(config_for(backend)).await;

    common::test_client()
        .get(format!("http://{proxy}/"))
        .header("Host", "inbound.test")
        .send()
        .await
        .unwrap();

    let expected = backend.to_string();
    assert_eq!(seen.recv().await.unwrap().header("host"), Some(expected.as_str()));

    shutdown.trigger();
}

#[tokio::test]
async fn keeps_inbound_host_when_rewrite_disabled() {
    let (backend, mut seen) = common::start_mock_backend("ok").await;
    let mut config = config_for(backend);
    config.rewrite_host = false;
    let (proxy, shutdown) = common::start_proxy(config).await;

    common::test_client()
        .get(format!("http://{proxy}/"))
        .header("Host", "inbound.test")
        .send()
        .await
        .unwrap();

    assert_eq!(seen.recv().await.unwrap().header("host"), Some("inbound.test"));

    shutdown.trigger();
}

#[tokio::test]
async fn relays_status_and_filters_response_headers() {
    let (backend, _seen) = common::start_raw_backend(
        "HTTP/1.1 404 Not Found\r\n\
         Content-Length: 7\r\n\
         Keep-Alive: timeout=5\r\n\
         X-Upstream: yes\r\n\
         Set-Cookie: a=1\r\n\
         Set-Cookie: b=2\r\n\
         Connection: close\r\n\r\n\
         missing",
    )
    .await;
    let (proxy, shutdown) = common::start_proxy(config_for(backend)).await;

    let res = common::test_client()
        .get(format!("http://{proxy}/nothing-here"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.headers()["x-upstream"], "yes");
    assert!(!res.headers().contains_key("keep-alive"));
    assert_eq!(res.headers().get_all("set-cookie").iter().count(), 2);
    assert!(res.headers().contains_key("x-request-id"));
    assert_eq!(res.text().await.unwrap(), "missing");

    shutdown.trigger();
}

#[tokio::test]
async fn passes_redirects_through_unfollowed() {
    let (backend, mut seen) = common::start_raw_backend(
        "HTTP/1.1 302 Found\r\n\
         Location: /elsewhere\r\n\
         Content-Length: 0\r\n\
         Connection: close\r\n\r\n",
    )
    .await;
    let (proxy, shutdown) = common::start_proxy(config_for(backend)).await;

    let res = common::test_client()
        .get(format!("http://{proxy}/start"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(res.headers()["location"], "/elsewhere");
    assert_eq!(seen.recv().await.unwrap().target, "/start");
    // Only the original request reached the upstream.
    assert!(seen.try_recv().is_err());

    shutdown.trigger();
}

#[tokio::test]
async fn connection_error_yields_502() {
    // Bind then drop to get a port nothing listens on.
    let dead = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let (proxy, shutdown) = common::start_proxy(config_for(dead)).await;

    let res = common::test_client()
        .post(format!("http://{proxy}/anything"))
        .body("data")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    assert!(res.text().await.unwrap().starts_with("Bad gateway:"));

    shutdown.trigger();
}

#[tokio::test]
async fn forwards_request_id_upstream() {
    let (backend, mut seen) = common::start_mock_backend("ok").await;
    let (proxy, shutdown) = common::start_proxy(config_for(backend)).await;

    let res = common::test_client()
        .get(format!("http://{proxy}/"))
        .header("x-request-id", "trace-me")
        .send()
        .await
        .unwrap();

    assert_eq!(res.headers()["x-request-id"], "trace-me");
    assert_eq!(seen.recv().await.unwrap().header("x-request-id"), Some("trace-me"));

    shutdown.trigger();
}
