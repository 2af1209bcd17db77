//! Hyperliquid client against a scripted local HTTP server.
//!
//! Each scripted response is served on its own connection (`Connection:
//! close`), so the number of recorded requests is the number of attempts the
//! client made.

use chrono::NaiveDate;
use dailybars_core::data::{
    Backoff, CircuitBreaker, FetchError, HyperliquidConfig, HyperliquidProvider,
    MarketDataProvider, RetryPolicy,
};
use dailybars_core::domain::Asset;
use serde_json::Value;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

struct Reply {
    status: u16,
    headers: Vec<(&'static str, String)>,
    body: String,
}

fn reply(status: u16, body: &str) -> Reply {
    Reply {
        status,
        headers: Vec::new(),
        body: body.to_string(),
    }
}

#[derive(Debug, Clone)]
struct Recorded {
    request_line: String,
    body: Value,
}

struct StubServer {
    url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl StubServer {
    fn start(script: Vec<Reply>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);

        thread::spawn(move || {
            for reply in script {
                let Ok((mut stream, _)) = listener.accept() else {
                    return;
                };
                if let Some(recorded) = read_request(&mut stream) {
                    seen.lock().unwrap().push(recorded);
                }
                write_reply(&mut stream, &reply);
            }
        });

        Self {
            url: format!("http://{addr}/info"),
            requests,
        }
    }

    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

fn read_request(stream: &mut TcpStream) -> Option<Recorded> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let body = &buf[header_end..(header_end + content_length).min(buf.len())];
    Some(Recorded {
        request_line: head.lines().next().unwrap_or_default().to_string(),
        body: serde_json::from_slice(body).unwrap_or(Value::Null),
    })
}

fn write_reply(stream: &mut TcpStream, reply: &Reply) {
    let mut out = format!(
        "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n",
        reply.status,
        reply.body.len()
    );
    for (name, value) in &reply.headers {
        out.push_str(&format!("{name}: {value}\r\n"));
    }
    out.push_str("\r\n");
    out.push_str(&reply.body);
    let _ = stream.write_all(out.as_bytes());
    let _ = stream.flush();
}

fn no_wait_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy::new(
        max_attempts,
        Backoff {
            base: Duration::ZERO,
            factor: 1.0,
            max: Duration::ZERO,
            jitter: false,
        },
    )
}

fn provider(server: &StubServer, retry: RetryPolicy, breaker: Arc<CircuitBreaker>) -> HyperliquidProvider {
    let config = HyperliquidConfig {
        base_url: server.url.clone(),
        timeout: Duration::from_secs(5),
        request_interval: Duration::ZERO,
        retry,
        ..HyperliquidConfig::default()
    };
    HyperliquidProvider::new(config, breaker).unwrap()
}

fn breaker_opening_after(n: u32) -> Arc<CircuitBreaker> {
    Arc::new(CircuitBreaker::new(n, Duration::from_secs(60)))
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

const TWO_CANDLES: &str = r#"[
  {"t":1704067200000,"T":1704153599999,"s":"BTC","i":"1d","o":"42283.0","c":"44185.0","h":"44240.0","l":"42180.0","v":"1521.37","n":18211},
  {"t":1704153600000,"T":1704239999999,"s":"BTC","i":"1d","o":"44185.0","c":"44960.0","h":"45900.0","l":"44150.0","v":"2984.11","n":30552}
]"#;

fn fetch_btc(provider: &HyperliquidProvider) -> Result<dailybars_core::data::FetchResult, FetchError> {
    provider.fetch_daily(&Asset::new("BTC"), date(2024, 1, 1), date(2024, 1, 2))
}

#[test]
fn candle_snapshot_request_and_response() {
    let server = StubServer::start(vec![reply(200, TWO_CANDLES)]);
    let hl = provider(&server, no_wait_retry(3), breaker_opening_after(5));

    let result = fetch_btc(&hl).unwrap();
    assert_eq!(result.symbol, "BTC");
    assert_eq!(result.candles.len(), 2);
    assert_eq!(result.candles[0].open_time_ms, Some(1_704_067_200_000));
    assert_eq!(result.candles[1].open_time_ms, Some(1_704_153_600_000));

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].request_line.starts_with("POST /info "));
    let body = &requests[0].body;
    assert_eq!(body["type"], "candleSnapshot");
    assert_eq!(body["req"]["coin"], "BTC");
    assert_eq!(body["req"]["interval"], "1d");
    assert_eq!(body["req"]["startTime"], 1_704_067_200_000i64);
    assert_eq!(body["req"]["endTime"], 1_704_239_999_999i64);
}

#[test]
fn rate_limit_is_retried_then_succeeds() {
    let server = StubServer::start(vec![reply(429, "{}"), reply(200, TWO_CANDLES)]);
    let breaker = breaker_opening_after(5);
    let hl = provider(&server, no_wait_retry(3), Arc::clone(&breaker));

    let result = fetch_btc(&hl).unwrap();
    assert_eq!(result.candles.len(), 2);
    assert_eq!(server.request_count(), 2);
    assert!(hl.is_available());
}

#[test]
fn retry_after_header_is_carried_on_rate_limit() {
    let server = StubServer::start(vec![Reply {
        status: 429,
        headers: vec![("Retry-After", "7".to_string())],
        body: "{}".to_string(),
    }]);
    let hl = provider(&server, no_wait_retry(1), breaker_opening_after(5));

    match fetch_btc(&hl) {
        Err(FetchError::RateLimited { retry_after }) => {
            assert_eq!(retry_after, Some(Duration::from_secs(7)));
        }
        other => panic!("expected RateLimited, got {other:?}"),
    }
    assert_eq!(server.request_count(), 1);
}

#[test]
fn unauthorized_is_not_retried() {
    let server = StubServer::start(vec![reply(401, "{}"), reply(200, TWO_CANDLES)]);
    let hl = provider(&server, no_wait_retry(3), breaker_opening_after(5));

    let err = fetch_btc(&hl).unwrap_err();
    assert!(matches!(err, FetchError::Auth(_)), "got {err:?}");
    assert!(err.is_skippable());
    assert_eq!(server.request_count(), 1);
    // Auth errors say nothing about provider health.
    assert!(hl.is_available());
}

#[test]
fn server_errors_exhaust_the_retry_budget() {
    let server = StubServer::start(vec![reply(500, ""), reply(502, ""), reply(503, "")]);
    let hl = provider(&server, no_wait_retry(3), breaker_opening_after(10));

    let err = fetch_btc(&hl).unwrap_err();
    assert!(matches!(err, FetchError::TransientNetwork(_)), "got {err:?}");
    assert_eq!(server.request_count(), 3);
}

#[test]
fn repeated_failures_open_the_circuit() {
    let server = StubServer::start(vec![reply(500, ""), reply(500, "")]);
    let breaker = breaker_opening_after(2);
    let hl = provider(&server, no_wait_retry(3), Arc::clone(&breaker));

    let err = fetch_btc(&hl).unwrap_err();
    assert!(matches!(err, FetchError::CircuitOpen), "got {err:?}");
    assert_eq!(server.request_count(), 2);
    assert!(!hl.is_available());

    // No request reaches the server while the circuit is open.
    let again = fetch_btc(&hl).unwrap_err();
    assert!(matches!(again, FetchError::CircuitOpen));
    assert_eq!(server.request_count(), 2);
}

#[test]
fn empty_snapshot_is_not_found() {
    let server = StubServer::start(vec![reply(200, "[]")]);
    let hl = provider(&server, no_wait_retry(3), breaker_opening_after(5));

    let err = fetch_btc(&hl).unwrap_err();
    assert!(matches!(err, FetchError::NotFound { ref symbol } if symbol == "BTC"), "got {err:?}");
    assert_eq!(server.request_count(), 1);
}

#[test]
fn unparseable_body_is_malformed_and_not_retried() {
    let server = StubServer::start(vec![reply(200, "<html>maintenance</html>"), reply(200, TWO_CANDLES)]);
    let hl = provider(&server, no_wait_retry(3), breaker_opening_after(5));

    let err = fetch_btc(&hl).unwrap_err();
    assert!(matches!(err, FetchError::MalformedResponse(_)), "got {err:?}");
    assert_eq!(server.request_count(), 1);
}

#[test]
fn meta_lists_the_universe() {
    let server = StubServer::start(vec![reply(
        200,
        r#"{"universe":[{"name":"BTC","szDecimals":5},{"name":"ETH","szDecimals":4},{"name":"MATIC","szDecimals":1,"isDelisted":true}]}"#,
    )]);
    let hl = provider(&server, no_wait_retry(3), breaker_opening_after(5));

    let assets = hl.list_assets().unwrap();
    let listed: Vec<(&str, bool)> = assets.iter().map(|a| (a.symbol.as_str(), a.active)).collect();
    assert_eq!(listed, vec![("BTC", true), ("ETH", true), ("MATIC", false)]);
    assert_eq!(server.requests()[0].body["type"], "meta");
}
