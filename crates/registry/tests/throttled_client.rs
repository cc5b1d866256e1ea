use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use registry::{
    FetchError, RegistryConfig, RequestPolicy, ThrottledClient, Transport, TransportError,
    TransportResponse,
};

const SITE: &str = "0a1b2c3d-0000-4000-8000-000000000001";

/// Replays a script of outcomes and records when each call arrived.
struct ScriptedTransport {
    script: Mutex<Vec<Result<TransportResponse, TransportError>>>,
    fallback: Result<TransportResponse, TransportError>,
    delay: Option<Duration>,
    latencies: Mutex<Vec<Duration>>,
    calls: Mutex<Vec<(Instant, String)>>,
}

impl ScriptedTransport {
    fn always(status: u16, body: &str) -> Self {
        Self::scripted(Vec::new(), ok(status, body))
    }

    fn scripted(
        script: Vec<Result<TransportResponse, TransportError>>,
        fallback: Result<TransportResponse, TransportError>,
    ) -> Self {
        let mut script = script;
        script.reverse();
        Self {
            script: Mutex::new(script),
            fallback,
            delay: None,
            latencies: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::always(200, "{}")
        }
    }

    /// Per-call latencies in order; later calls answer immediately.
    fn with_latencies(latencies: Vec<Duration>) -> Self {
        let mut latencies = latencies;
        latencies.reverse();
        Self {
            latencies: Mutex::new(latencies),
            ..Self::always(200, "{}")
        }
    }

    fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(t, _)| *t).collect()
    }

    fn urls(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(_, u)| u.clone()).collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(
        &self,
        url: &str,
        _params: &[(String, String)],
    ) -> Result<TransportResponse, TransportError> {
        self.calls.lock().unwrap().push((Instant::now(), url.to_string()));
        let latency = self.latencies.lock().unwrap().pop().or(self.delay);
        if let Some(delay) = latency {
            tokio::time::sleep(delay).await;
        }
        let next = self.script.lock().unwrap().pop();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}

fn ok(status: u16, body: &str) -> Result<TransportResponse, TransportError> {
    Ok(TransportResponse {
        status,
        body: body.to_string(),
    })
}

fn fast_policy() -> RequestPolicy {
    RequestPolicy {
        max_requests_per_second: 1000,
        max_attempts: 3,
        initial_backoff_ms: 1,
        max_backoff_ms: 4,
        request_timeout_secs: 1,
    }
}

fn client(transport: Arc<ScriptedTransport>, policy: &RequestPolicy) -> ThrottledClient {
    ThrottledClient::with_transport(RegistryConfig::default(), policy, transport).unwrap()
}

#[tokio::test]
async fn burst_never_exceeds_the_rate_ceiling() {
    let transport = Arc::new(ScriptedTransport::always(200, r#"{"@graph": []}"#));
    let policy = RequestPolicy {
        max_requests_per_second: 5,
        ..fast_policy()
    };
    let client = client(transport.clone(), &policy);

    for _ in 0..20 {
        client.fetch_record(SITE).await.unwrap();
    }

    let times = transport.call_times();
    assert_eq!(times.len(), 20);
    // six calls inside one second would need call[i + 5] - call[i] < 1s
    for window in times.windows(6) {
        let span = window[5].duration_since(window[0]);
        assert!(
            span >= Duration::from_millis(980),
            "six calls within {span:?}"
        );
    }
}

#[tokio::test]
async fn completions_stay_under_the_ceiling_after_a_slow_call() {
    let transport = Arc::new(ScriptedTransport::with_latencies(vec![Duration::from_millis(190)]));
    let policy = RequestPolicy {
        max_requests_per_second: 5,
        ..fast_policy()
    };
    let client = client(transport.clone(), &policy);

    let mut completed = Vec::new();
    for _ in 0..20 {
        client.fetch_record(SITE).await.unwrap();
        completed.push(Instant::now());
    }

    assert_eq!(transport.call_times().len(), 20);
    for window in completed.windows(6) {
        let span = window[5].duration_since(window[0]);
        assert!(
            span >= Duration::from_millis(980),
            "six completions within {span:?}"
        );
    }
}

#[tokio::test]
async fn retried_attempts_pay_the_rate_budget() {
    let transport = Arc::new(ScriptedTransport::scripted(
        vec![ok(503, ""), ok(502, "")],
        ok(200, "{}"),
    ));
    let policy = RequestPolicy {
        max_requests_per_second: 5,
        ..fast_policy()
    };
    let client = client(transport.clone(), &policy);

    client.fetch_record(SITE).await.unwrap();

    let times = transport.call_times();
    assert_eq!(times.len(), 3);
    assert!(times[2].duration_since(times[0]) >= Duration::from_millis(380));
}

#[tokio::test]
async fn transient_failures_exhaust_into_an_error() {
    let transport = Arc::new(ScriptedTransport::scripted(
        vec![Err(TransportError::Connect("reset".into()))],
        ok(500, ""),
    ));
    let client = client(transport.clone(), &fast_policy());

    let err = client.fetch_record(SITE).await.unwrap_err();

    assert!(err.is_transient());
    assert_eq!(transport.call_times().len(), 3);
}

#[tokio::test]
async fn not_found_is_not_retried() {
    let transport = Arc::new(ScriptedTransport::always(404, ""));
    let client = client(transport.clone(), &fast_policy());

    let err = client.fetch_record(SITE).await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(transport.call_times().len(), 1);
}

#[tokio::test]
async fn unexpected_status_is_surfaced_not_parsed() {
    let transport = Arc::new(ScriptedTransport::always(403, r#"{"@graph": []}"#));
    let client = client(transport.clone(), &fast_policy());

    let err = client.fetch_record(SITE).await.unwrap_err();

    assert!(matches!(err, FetchError::UnexpectedStatus { status: 403, .. }));
    assert_eq!(transport.call_times().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn slow_calls_time_out_as_transient() {
    let transport = Arc::new(ScriptedTransport::slow(Duration::from_secs(60)));
    let policy = RequestPolicy {
        max_attempts: 2,
        ..fast_policy()
    };
    let client = client(transport.clone(), &policy);

    let err = client.fetch_record(SITE).await.unwrap_err();

    assert!(err.is_transient());
    assert_eq!(transport.call_times().len(), 2);
}

#[tokio::test]
async fn record_path_uses_the_resource_namespace() {
    let transport = Arc::new(ScriptedTransport::always(200, "{}"));
    let client = client(transport.clone(), &fast_policy());

    client.fetch_record(&SITE.to_uppercase()).await.unwrap();

    assert_eq!(
        transport.urls(),
        vec![format!("https://kulturarvsdata.se/raa/lamning/{SITE}")]
    );
}

#[tokio::test]
async fn invalid_reference_makes_no_call() {
    let transport = Arc::new(ScriptedTransport::always(200, "{}"));
    let client = client(transport.clone(), &fast_policy());

    let err = client.fetch_record("not-a-uuid").await.unwrap_err();

    assert!(matches!(err, FetchError::InvalidReference(_)));
    assert!(transport.call_times().is_empty());
}
