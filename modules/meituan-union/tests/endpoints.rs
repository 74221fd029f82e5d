//! Endpoint calls against a local mock of the vendor API.

use async_trait::async_trait;
use httpmock::prelude::*;
use meituan_union::{Client, Params, SecretString, Signing, UnionError, sign};
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use union_apilog::{ApiLogError, ApiLogRecord, ApiLogSink};
use union_http::{HttpClientBuilder, HttpClientConfig};

const APP_KEY: &str = "appkey-1";
const SECRET: &str = "secret-1";

fn client(base_url: &str) -> Client {
    Client::builder()
        .credentials(APP_KEY, SecretString::from(SECRET.to_owned()))
        .base_url(base_url)
        .http_client(
            HttpClientBuilder::with_config(HttpClientConfig::for_testing())
                .build()
                .unwrap(),
        )
        .build()
        .unwrap()
}

struct ChannelSink(mpsc::UnboundedSender<ApiLogRecord>);

#[async_trait]
impl ApiLogSink for ChannelSink {
    async fn record(&self, record: &ApiLogRecord) -> Result<(), ApiLogError> {
        self.0.send(record.clone()).map_err(ApiLogError::sink)
    }
}

/// Slow and then failing, like a database that is down.
struct BrokenSink(Arc<AtomicUsize>);

#[async_trait]
impl ApiLogSink for BrokenSink {
    async fn record(&self, _record: &ApiLogRecord) -> Result<(), ApiLogError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(5)).await;
        Err(ApiLogError::sink("connection refused"))
    }
}

#[tokio::test]
async fn generate_link_success() {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(GET)
            .path("/api/generateLink")
            .header("content-type", "application/json")
            .query_param("appkey", APP_KEY)
            .query_param("actId", "33")
            .query_param("sid", "sid01")
            .query_param("linkType", "1")
            .query_param("shortLink", "1")
            .query_param_exists("sign");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({"status": 0, "data": "https://dpurl.cn/abc"}));
    });

    let result = client(&server.base_url())
        .generate_link(33, "sid01", 1, 1)
        .await
        .unwrap();

    m.assert();
    assert!(result.is_success());
    assert_eq!(result.result.data, "https://dpurl.cn/abc");
    assert_eq!(result.http.status, 200);
    assert_eq!(result.http.trace_id.len(), 32);
    assert!(!result.http.params.contains_key("ts"));

    let sent_sign = result.http.params.get("sign").unwrap().as_str().unwrap();
    assert_eq!(sent_sign, sign(&result.http.params, SECRET));
    assert!(result.http.uri.query().unwrap().contains(sent_sign));
    assert!(!result.body.is_empty());
}

#[tokio::test]
async fn mini_code_is_signed_without_timestamp() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/miniCode")
            .query_param("actId", "7")
            .query_param_exists("sign");
        then.status(200)
            .json_body(json!({"status": 0, "des": "", "data": "https://img.meituan.net/qr.png"}));
    });

    let result = client(&server.base_url()).mini_code(7, "sid01").await.unwrap();
    assert_eq!(result.result.data, "https://img.meituan.net/qr.png");
    assert_eq!(result.http.params.len(), 4);
}

#[tokio::test]
async fn timestamped_endpoints_send_ts() {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(GET)
            .path("/api/getqualityscorebysid")
            .query_param("sid", "sid01")
            .query_param_exists("ts")
            .query_param_exists("sign");
        then.status(200).json_body(json!({
            "status": 0,
            "des": "success",
            "data": {
                "dataList": [{
                    "appkey": APP_KEY,
                    "sid": "sid01",
                    "date": "2024-05-01",
                    "qualityGrade": "A",
                    "repurchaseRate": "0.31"
                }],
                "total": 1
            }
        }));
    });

    let result = client(&server.base_url())
        .quality_score_by_sid(Params::new().with("sid", "sid01"))
        .await
        .unwrap();

    m.assert();
    let page = &result.result.data;
    assert_eq!(page.total, 1);
    assert_eq!(page.data_list[0].quality_grade, "A");
}

#[tokio::test]
async fn vendor_error_yields_default_payload() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/getcity");
        then.status(200)
            .json_body(json!({"code": 1001, "msg": "invalid sign", "data": null}));
    });

    let result = client(&server.base_url())
        .mt_union_city(Params::new())
        .await
        .unwrap();

    assert!(!result.is_success());
    assert_eq!(result.result.msg, "invalid sign");
    assert!(result.result.data.data_list.is_empty());

    match result.error_for_status() {
        Err(UnionError::Vendor { code, message }) => {
            assert_eq!(code, 1001);
            assert_eq!(message, "invalid sign");
        }
        other => panic!("expected vendor error, got ok={}", other.is_ok()),
    }
}

#[tokio::test]
async fn sku_list_decodes() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/getskulist")
            .query_param("pageNo", "1");
        then.status(200).json_body(json!({
            "code": 0,
            "msg": "ok",
            "data": {
                "dataList": [{
                    "skuId": "1001",
                    "skuName": "Latte",
                    "price": "1800",
                    "pic": "https://p0.meituan.net/latte.jpg",
                    "categoryId": 3.0,
                    "categoryName": "Coffee",
                    "salesVolume": 12
                }],
                "total": 1
            }
        }));
    });

    let skus = client(&server.base_url())
        .mt_union_sku(Params::new().with("pageNo", 1))
        .await
        .unwrap()
        .into_result()
        .unwrap();

    assert_eq!(skus.data.data_list[0].category_id, 3);
    assert_eq!(skus.data.data_list[0].pic, "https://p0.meituan.net/latte.jpg");
}

#[tokio::test]
async fn poi_endpoints_are_unsigned() {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(GET)
            .path("/poi/category")
            .query_param("cityid", "10");
        then.status(200).json_body(json!({
            "code": 0,
            "data": [{"name": "Food", "id": 1, "subcate": [{"name": "Hotpot", "id": 17}]}]
        }));
    });

    let result = client(&server.base_url())
        .poi_category(10, Params::new().with("cityid", 99))
        .await
        .unwrap();

    m.assert();
    assert!(!result.http.params.contains_key("sign"));
    assert!(!result.http.params.contains_key("appkey"));
    assert_eq!(result.result.data[0].subcate[0].name, "Hotpot");
}

#[tokio::test]
async fn undecodable_body_is_decode_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.path("/poi/city");
        then.status(502).body("<html>Bad Gateway</html>");
    });

    let err = client(&server.base_url())
        .poi_city(Params::new())
        .await
        .unwrap_err();

    match err {
        UnionError::Decode { status, body, .. } => {
            assert_eq!(status, 502);
            assert_eq!(body.as_ref(), b"<html>Bad Gateway</html>");
        }
        other => panic!("expected decode error, got {other}"),
    }
}

#[tokio::test]
async fn transport_failure_skips_decode_and_log() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}/", listener.local_addr().unwrap());
    drop(listener);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let client = client(&base_url).with_log_sink(Arc::new(ChannelSink(tx)));

    let err = client.poi_city(Params::new()).await.unwrap_err();
    assert!(err.is_transport(), "unexpected error: {err}");
    assert!(err.status().is_none());

    drop(client);
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn every_call_is_logged_with_trace_id() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.path("/poi/district");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({"code": 0, "data": [{"name": "Chaoyang", "id": 14}]}));
    });

    let (tx, mut rx) = mpsc::unbounded_channel();
    let client = client(&server.base_url())
        .with_log_sink(Arc::new(ChannelSink(tx)))
        .with_client_ip("198.51.100.4");

    let result = client.poi_district(1, Params::new()).await.unwrap();
    let record = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(record.trace_id, result.http.trace_id);
    assert_eq!(record.request_api, "/poi/district");
    assert_eq!(record.request_method, "GET");
    assert_eq!(record.request_ip, "198.51.100.4");
    assert_eq!(record.request_params["cityid"], 1);
    assert_eq!(record.response_status_code, 200);
    assert!(record.response_body.contains("Chaoyang"));
    assert_eq!(record.host.os, std::env::consts::OS);
    assert!(record.host.runtime_version.starts_with("rust/"));
    assert_eq!(record.sdk_version, meituan_union::SDK_VERSION);
}

#[tokio::test]
async fn broken_sink_does_not_delay_call() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.path("/poi/city");
        then.status(200).json_body(json!({"code": 0, "data": []}));
    });

    let calls = Arc::new(AtomicUsize::new(0));
    let client = client(&server.base_url()).with_log_sink(Arc::new(BrokenSink(calls.clone())));

    let result = tokio::time::timeout(Duration::from_secs(2), client.poi_city(Params::new()))
        .await
        .expect("call must not wait for the log sink")
        .unwrap();
    assert!(result.is_success());

    for _ in 0..50 {
        if calls.load(Ordering::SeqCst) == 1 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("log sink was never invoked");
}

#[tokio::test]
async fn raw_post_sends_json_body() {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(POST)
            .path("/api/order/list")
            .header("content-type", "application/json")
            .body_includes(r#""page":2"#)
            .body_includes(r#""appkey":"appkey-1""#);
        then.status(200).body(r#"{"code":0,"data":{"orders":[]}}"#);
    });

    let raw = client(&server.base_url())
        .request(
            http::Method::POST,
            "/api/order/list",
            Signing::Signed,
            Params::new().with("page", 2),
        )
        .await
        .unwrap();

    m.assert();
    assert_eq!(raw.http.method, http::Method::POST);
    let body: serde_json::Value = raw.json().unwrap();
    assert_eq!(body["code"], 0);
}

#[tokio::test]
async fn catalogue_lookups_use_distinct_paths() {
    let server = MockServer::start();
    let mocks = ["/api/getcity", "/api/getcategory", "/api/getskulist"].map(|path| {
        server.mock(|when, then| {
            when.method(GET)
                .path(path)
                .query_param("appkey", APP_KEY)
                .query_param_exists("ts")
                .query_param_exists("sign");
            then.status(200)
                .json_body(json!({"code": 0, "msg": "ok", "data": {"dataList": [], "total": 0}}));
        })
    });

    let client = client(&server.base_url());
    assert!(client.mt_union_city(Params::new()).await.unwrap().is_success());
    assert!(client.mt_union_category(Params::new()).await.unwrap().is_success());
    assert!(client.mt_union_sku(Params::new()).await.unwrap().is_success());

    for mock in &mocks {
        mock.assert();
    }
}

#[tokio::test]
async fn stalled_response_body_is_a_transport_timeout() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}/", listener.local_addr().unwrap());
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 2048];
        socket.read(&mut buf).await.unwrap();
        socket
            .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 100\r\n\r\n{\"code\":")
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
        drop(socket);
    });

    let (tx, mut rx) = mpsc::unbounded_channel();
    let client = Client::builder()
        .credentials(APP_KEY, SecretString::from(SECRET.to_owned()))
        .base_url(base_url)
        .log_sink(Arc::new(ChannelSink(tx)))
        .http_client(
            HttpClientBuilder::with_config(HttpClientConfig::for_testing())
                .timeout(Duration::from_millis(300))
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();

    let err = tokio::time::timeout(Duration::from_secs(5), client.poi_city(Params::new()))
        .await
        .expect("call must give up on its own")
        .unwrap_err();

    assert!(err.is_transport());
    assert!(matches!(
        err,
        UnionError::Transport(union_http::HttpError::Timeout(_))
    ));
    assert!(rx.try_recv().is_err());
}
