use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use url::Url;
use webmail::api::models::{Folder, LetterDraft, LetterPatch};
use webmail::api::{LetterClient, RemoteStore};
use webmail::config::EndpointTemplates;
use webmail::error::StoreError;
use webmail::facade::{FacadeConfig, LetterFacade};

#[derive(Debug, Clone)]
struct Recorded {
    method: String,
    target: String,
    body: String,
}

struct Reply {
    status: u16,
    body: String,
    delay: Duration,
}

impl Reply {
    fn json(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

type Route = dyn Fn(&Recorded) -> Reply + Send + Sync;

struct Stub {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl Stub {
    async fn start(route: impl Fn(&Recorded) -> Reply + Send + Sync + 'static) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub");
        let addr = listener.local_addr().expect("stub addr");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let route: Arc<Route> = Arc::new(route);

        let log = Arc::clone(&requests);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let route = Arc::clone(&route);
                let log = Arc::clone(&log);
                tokio::spawn(async move {
                    serve(stream, route, log).await;
                });
            }
        });

        Self { addr, requests }
    }

    fn client(&self, timeout: Duration) -> LetterClient {
        let base_url = Url::parse(&format!("http://{}/api", self.addr)).expect("base url");
        LetterClient::new(base_url, EndpointTemplates::default(), timeout)
    }

    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().expect("lock").clone()
    }
}

async fn serve(mut stream: TcpStream, route: Arc<Route>, log: Arc<Mutex<Vec<Recorded>>>) {
    let mut raw = Vec::new();
    let mut buffer = [0_u8; 4096];

    let header_end = loop {
        let Ok(read) = stream.read(&mut buffer).await else {
            return;
        };
        if read == 0 {
            return;
        }
        raw.extend_from_slice(&buffer[..read]);
        if let Some(position) = raw.windows(4).position(|window| window == b"\r\n\r\n") {
            break position + 4;
        }
    };

    let head = String::from_utf8_lossy(&raw[..header_end]).to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while raw.len() < header_end + content_length {
        let Ok(read) = stream.read(&mut buffer).await else {
            return;
        };
        if read == 0 {
            break;
        }
        raw.extend_from_slice(&buffer[..read]);
    }

    let mut request_line = head.lines().next().unwrap_or_default().split_whitespace();
    let recorded = Recorded {
        method: request_line.next().unwrap_or_default().to_string(),
        target: request_line.next().unwrap_or_default().to_string(),
        body: String::from_utf8_lossy(&raw[header_end..]).to_string(),
    };
    log.lock().expect("lock").push(recorded.clone());

    let reply = route(&recorded);
    if !reply.delay.is_zero() {
        tokio::time::sleep(reply.delay).await;
    }

    let response = format!(
        "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        reply.status,
        reply.body.len(),
        reply.body
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

const INBOX: &str = r#"{"success":true,"message":"found 2 letters","count":2,"data":[
    {"id":1,"user_id":1,"folder":"Inbox","from_email":"mentor@college.ru","to_email":"student@college.ru","subject":"Practice task","body":"Finish the API","is_read":0,"date":"2024-05-24T10:30:00.000Z"},
    {"id":2,"user_id":1,"folder":"Входящие","from_email":"admin@college.ru","to_email":"student@college.ru","subject":"Maintenance","body":"Servers go down at 23:00","is_read":1,"date":"2024-05-23T14:15:00.000Z"}
]}"#;

#[tokio::test]
async fn lists_letters_with_folder_filter() {
    let stub = Stub::start(|_| Reply::json(200, INBOX)).await;
    let client = stub.client(Duration::from_secs(5));

    let letters = client.list(Some(&Folder::Inbox)).await.expect("list");

    assert_eq!(letters.len(), 2);
    assert_eq!(letters[1].folder, Folder::Inbox);
    assert!(letters[1].is_read);

    let requests = stub.requests();
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].target, "/api/letters?folder=Inbox");
}

#[tokio::test]
async fn folder_listing_uses_folder_endpoint() {
    let stub = Stub::start(|_| Reply::json(200, INBOX)).await;
    let client = stub.client(Duration::from_secs(5));

    let letters = client
        .list_by_folder(&Folder::parse("Входящие"))
        .await
        .expect("folder listing");

    assert_eq!(letters.len(), 2);
    let requests = stub.requests();
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].target, "/api/folders/Inbox");
}

#[tokio::test]
async fn missing_letter_maps_to_not_found() {
    let stub = Stub::start(|_| {
        Reply::json(404, r#"{"success":false,"error":"letter 99999 is not in the database"}"#)
    })
    .await;
    let letters = LetterFacade::new(stub.client(Duration::from_secs(5)), FacadeConfig::default());

    let error = letters.get(99999).await.expect_err("missing letter");

    assert_eq!(
        error,
        StoreError::NotFound("letter 99999 is not in the database".to_string())
    );
    assert_eq!(letters.cached_entries(), 0);
    assert_eq!(stub.requests()[0].target, "/api/letters/99999");
}

#[tokio::test]
async fn rejected_envelope_becomes_remote_error() {
    let stub = Stub::start(|_| Reply::json(200, r#"{"success":false,"error":"nothing to update"}"#))
        .await;
    let client = stub.client(Duration::from_secs(5));

    let error = client
        .update(4, &LetterPatch::Read(true))
        .await
        .expect_err("rejected update");

    assert_eq!(error, StoreError::remote(Some(200), "nothing to update"));
}

#[tokio::test]
async fn server_error_keeps_status_and_message() {
    let stub = Stub::start(|_| {
        Reply::json(500, r#"{"success":false,"error":"cannot read database","details":"SQLITE_BUSY"}"#)
    })
    .await;
    let client = stub.client(Duration::from_secs(5));

    match client.list(None).await {
        Err(StoreError::Remote { status, message }) => {
            assert_eq!(status, Some(500));
            assert!(message.contains("cannot read database"));
        }
        other => panic!("expected remote error, got {other:?}"),
    }
}

#[tokio::test]
async fn slow_store_times_out_without_leaving_state() {
    let stub = Stub::start(|_| Reply::json(200, INBOX).delayed(Duration::from_secs(2))).await;
    let letters = LetterFacade::new(
        stub.client(Duration::from_millis(100)),
        FacadeConfig::default(),
    );

    let error = letters.list(None).await.expect_err("request should time out");

    assert_eq!(error, StoreError::Timeout);
    assert_eq!(letters.cached_entries(), 0);
    assert_eq!(letters.pending_requests(), 0);
}

#[tokio::test]
async fn unreachable_store_is_network_unavailable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let client = LetterClient::new(
        Url::parse(&format!("http://{addr}/api")).expect("url"),
        EndpointTemplates::default(),
        Duration::from_secs(5),
    );

    let error = client.get(1).await.expect_err("nothing is listening");
    assert!(matches!(error, StoreError::NetworkUnavailable(_)));
    assert!(!client.health().await);
}

#[tokio::test]
async fn mutations_send_expected_requests() {
    let stub = Stub::start(|request| match request.method.as_str() {
        "POST" => Reply::json(
            200,
            r#"{"success":true,"data":{"id":12,"to_email":"a@b.com","subject":"Hi","body":"Hello there","folder":"Sent"}}"#,
        ),
        "PATCH" => Reply::json(200, r#"{"success":true,"data":{"updated":true,"changes":1}}"#),
        "DELETE" => Reply::json(200, r#"{"success":true,"data":{"deleted":true,"changes":1}}"#),
        _ => Reply::json(405, r#"{"success":false,"error":"unexpected method"}"#),
    })
    .await;
    let client = stub.client(Duration::from_secs(5));

    let created = client
        .create(&LetterDraft::new("a@b.com", "Hi", "Hello there"))
        .await
        .expect("create");
    let moved = client
        .update(12, &LetterPatch::Move(Folder::Drafts))
        .await
        .expect("move");
    let deleted = client.soft_delete(12).await.expect("delete");

    assert_eq!(created.id, 12);
    assert_eq!(created.folder, Folder::Sent);
    assert!(moved.updated);
    assert!(deleted.deleted);

    let requests = stub.requests();
    let create_body: serde_json::Value =
        serde_json::from_str(&requests[0].body).expect("create body");
    assert_eq!(requests[0].target, "/api/letters");
    assert_eq!(create_body["folder"], "Sent");
    assert_eq!(create_body["to_email"], "a@b.com");

    let patch_body: serde_json::Value =
        serde_json::from_str(&requests[1].body).expect("patch body");
    assert_eq!(requests[1].target, "/api/letters/12");
    assert_eq!(patch_body, serde_json::json!({ "folder": "Drafts" }));

    assert_eq!(requests[2].method, "DELETE");
    assert_eq!(requests[2].target, "/api/letters/12");
}

#[tokio::test]
async fn health_probes_server_root() {
    let stub = Stub::start(|_| Reply::json(200, "")).await;
    let client = stub.client(Duration::from_secs(5));

    assert!(client.health().await);
    let requests = stub.requests();
    assert_eq!(requests[0].method, "HEAD");
    assert_eq!(requests[0].target, "/");
}
