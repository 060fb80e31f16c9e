//! End-to-end: HTTP front end → datagram → listener → libSQL.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use formcast::record::{DATE_FIELD, DATE_FORMAT};
use formcast::{
    Component, Config, DatagramListener, DocumentStore, Error, LibsqlStore, MemoryStore,
    Persister, Server, app, supervisor,
};
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, UdpSocket};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const COLLECTION: &str = "messages";

struct Harness {
    http: SocketAddr,
    datagram: SocketAddr,
    store: LibsqlStore,
    shutdown: CancellationToken,
    _dir: tempfile::TempDir,
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

fn write_site(root: &Path) {
    std::fs::write(root.join("index.html"), "<h1>home</h1>").unwrap();
    std::fs::write(root.join("error.html"), "<h1>lost</h1>").unwrap();
}

async fn start() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    write_site(dir.path());
    let store = LibsqlStore::new(dir.path().join("data/formcast.db"));
    let shutdown = CancellationToken::new();

    let listener = DatagramListener::bind("127.0.0.1:0".parse().unwrap(), 1024).await.unwrap();
    let datagram = listener.local_addr().unwrap();
    let persister = Persister::new(Arc::new(store.clone()), COLLECTION);
    let token = shutdown.clone();
    tokio::spawn(async move { listener.run(&persister, token).await });

    let config = Config {
        http_addr: "127.0.0.1:0".parse().unwrap(),
        datagram_addr: datagram,
        site_root: dir.path().to_path_buf(),
        ..Config::default()
    };
    let server = Server::bind(config.http_addr).await.unwrap();
    let http = server.local_addr();
    tokio::spawn(server.serve(app::router(&config), shutdown.clone()));

    Harness { http, datagram, store, shutdown, _dir: dir }
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

async fn wait_for_documents(store: &LibsqlStore, expected: usize) -> Vec<Value> {
    for _ in 0..250 {
        let docs = store.documents(COLLECTION).await.unwrap();
        if docs.len() >= expected {
            return docs;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    store.documents(COLLECTION).await.unwrap()
}

#[tokio::test]
async fn get_root_serves_the_index_page() {
    let h = start().await;
    let res = client().get(format!("http://{}/", h.http)).send().await.unwrap();
    assert_eq!(res.status().as_u16(), 200);
    assert_eq!(res.text().await.unwrap(), "<h1>home</h1>");
}

#[tokio::test]
async fn unknown_path_serves_the_error_page_with_404() {
    let h = start().await;
    let res = client()
        .get(format!("http://{}/nonexistent-path", h.http))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 404);
    assert_eq!(res.text().await.unwrap(), "<h1>lost</h1>");
}

#[tokio::test]
async fn healthz_answers_ok() {
    let h = start().await;
    let res = client().get(format!("http://{}/healthz", h.http)).send().await.unwrap();
    assert_eq!(res.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn submitted_form_is_persisted_with_a_date() {
    let h = start().await;
    let res = client()
        .post(format!("http://{}/message", h.http))
        .header("content-type", "application/x-www-form-urlencoded")
        .body("username=Alice&message=Hello+there%21")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 302);
    assert_eq!(res.headers()["location"], "/");

    let docs = wait_for_documents(&h.store, 1).await;
    assert_eq!(docs.len(), 1);
    let doc = docs[0].as_object().unwrap();
    assert_eq!(doc.len(), 3);
    assert_eq!(doc["username"], "Alice");
    assert_eq!(doc["message"], "Hello there!");
    let date = doc[DATE_FIELD].as_str().unwrap();
    assert!(NaiveDateTime::parse_from_str(date, DATE_FORMAT).is_ok());
}

#[tokio::test]
async fn post_redirects_even_when_the_listener_is_gone() {
    let dir = tempfile::tempdir().unwrap();
    write_site(dir.path());
    let dead = {
        let vacated = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        vacated.local_addr().unwrap()
    };
    let config = Config {
        http_addr: "127.0.0.1:0".parse().unwrap(),
        datagram_addr: dead,
        site_root: dir.path().to_path_buf(),
        ..Config::default()
    };
    let server = Server::bind(config.http_addr).await.unwrap();
    let http = server.local_addr();
    let shutdown = CancellationToken::new();
    tokio::spawn(server.serve(app::router(&config), shutdown.clone()));

    let res = client().post(format!("http://{http}/")).body("a=1").send().await.unwrap();
    assert_eq!(res.status().as_u16(), 302);
    assert_eq!(res.headers()["location"], "/");
    shutdown.cancel();
}

#[tokio::test]
async fn post_without_content_length_is_411() {
    let h = start().await;
    let mut stream = TcpStream::connect(h.http).await.unwrap();
    stream
        .write_all(b"POST / HTTP/1.1\r\nhost: localhost\r\nconnection: close\r\n\r\n")
        .await
        .unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    let head = String::from_utf8_lossy(&raw);
    assert!(head.starts_with("HTTP/1.1 411"), "unexpected response: {head}");
}

#[tokio::test]
async fn direct_datagram_creates_exactly_one_document() {
    let h = start().await;
    let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    sender.send_to(b"name=Alice&msg=Hi", h.datagram).await.unwrap();

    let docs = wait_for_documents(&h.store, 1).await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(h.store.count(COLLECTION).await.unwrap(), 1);
    assert_eq!(docs[0]["name"], "Alice");
    assert_eq!(docs[0]["msg"], "Hi");
}

#[tokio::test]
async fn malformed_datagram_never_reaches_storage() {
    let h = start().await;
    let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    sender.send_to(b"name=Mallory&junk", h.datagram).await.unwrap();
    sender.send_to(b"name=Bob&a=1&a=2", h.datagram).await.unwrap();

    let docs = wait_for_documents(&h.store, 1).await;
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0]["name"], "Bob");
    assert_eq!(docs[0]["a"], "2");
}

/// Refuses the first `failures` inserts, then stores in memory.
struct Flaky {
    failures: usize,
    attempts: AtomicUsize,
    inner: MemoryStore,
}

#[async_trait]
impl DocumentStore for Flaky {
    async fn insert(&self, collection: &str, document: &Value) -> formcast::Result<()> {
        if self.attempts.fetch_add(1, Ordering::SeqCst) < self.failures {
            return Err(Error::Storage("connection refused".into()));
        }
        self.inner.insert(collection, document).await
    }
}

#[tokio::test]
async fn listener_keeps_running_after_storage_failures() {
    let store = Arc::new(Flaky { failures: 2, attempts: AtomicUsize::new(0), inner: MemoryStore::new() });
    let persister = Persister::new(store.clone(), COLLECTION);
    let listener = DatagramListener::bind("127.0.0.1:0".parse().unwrap(), 1024).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = CancellationToken::new();
    let token = shutdown.clone();
    let task: JoinHandle<formcast::Result<()>> =
        tokio::spawn(async move { listener.run(&persister, token).await });

    let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    for body in ["n=1", "n=2", "n=3"] {
        sender.send_to(body.as_bytes(), addr).await.unwrap();
    }

    let mut docs = Vec::new();
    for _ in 0..250 {
        docs = store.inner.documents(COLLECTION);
        if !docs.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0]["n"], "3");
    assert!(!task.is_finished());

    shutdown.cancel();
    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn unreachable_database_drops_records_without_stopping_the_listener() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"").unwrap();
    let persister = Persister::new(Arc::new(LibsqlStore::new(blocker.join("db"))), COLLECTION);

    let listener = DatagramListener::bind("127.0.0.1:0".parse().unwrap(), 1024).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = CancellationToken::new();
    let token = shutdown.clone();
    let task = tokio::spawn(async move { listener.run(&persister, token).await });

    let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    sender.send_to(b"a=1", addr).await.unwrap();
    sender.send_to(b"a=2", addr).await.unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!task.is_finished());

    shutdown.cancel();
    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn supervisor_stops_when_cancelled() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        datagram_addr: "127.0.0.1:0".parse().unwrap(),
        database_path: dir.path().join("formcast.db"),
        ..Config::default()
    };
    let shutdown = CancellationToken::new();
    let run = tokio::spawn(supervisor::run_until(config, Component::Listener, shutdown.clone()));

    tokio::time::sleep(Duration::from_millis(50)).await;
    shutdown.cancel();
    run.await.unwrap().unwrap();
}

#[tokio::test]
async fn supervisor_rejects_bad_collection_names() {
    let config = Config {
        datagram_addr: "127.0.0.1:0".parse().unwrap(),
        collection: "no spaces".into(),
        ..Config::default()
    };
    let err = supervisor::run_until(config, Component::Listener, CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Storage(_)));
}
