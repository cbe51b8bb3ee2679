// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.
//!
//! `StaticServer` serves a directory over HTTP/1.1 from a background thread
//! (GET and HEAD, 404 for anything missing) so remote repositories can be
//! exercised without network access.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use stencil::{EngineConfig, TemplateManager};
use tempfile::TempDir;

/// Static file server rooted at a temporary directory
pub struct StaticServer {
    root: TempDir,
    port: u16,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StaticServer {
    pub fn start() -> Self {
        let root = tempfile::tempdir().unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let serve_root = root.path().to_path_buf();
        let log = Arc::clone(&requests);
        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                let root = serve_root.clone();
                let log = Arc::clone(&log);
                std::thread::spawn(move || handle(stream, &root, &log));
            }
        });

        Self {
            root,
            port,
            requests,
        }
    }

    /// Directory whose files are served
    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// URL of `path` relative to the served root
    pub fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}/{}", self.port, path.trim_start_matches('/'))
    }

    /// Request lines received so far, e.g. `GET /repo/a%20b.json`
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

fn handle(stream: TcpStream, root: &Path, log: &Mutex<Vec<String>>) {
    let mut reader = BufReader::new(stream.try_clone().unwrap());
    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    loop {
        let mut header = String::new();
        match reader.read_line(&mut header) {
            Ok(0) => break,
            Ok(_) if header == "\r\n" || header == "\n" => break,
            Ok(_) => continue,
            Err(_) => return,
        }
    }

    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let raw_path = parts.next().unwrap_or("/").to_string();
    log.lock().unwrap().push(format!("{method} {raw_path}"));

    let decoded = urlencoding::decode(raw_path.trim_start_matches('/'))
        .map(|p| p.into_owned())
        .unwrap_or_default();
    let body = if decoded.split('/').any(|segment| segment == "..") {
        None
    } else {
        fs::read(root.join(&decoded)).ok()
    };

    let mut stream = stream;
    let (status, body) = match body {
        Some(body) => ("200 OK", body),
        None => ("404 Not Found", b"not found".to_vec()),
    };
    let head = format!(
        "HTTP/1.1 {status}\r\nContent-Length: {}\r\nContent-Type: application/octet-stream\r\nConnection: close\r\n\r\n",
        body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    if method != "HEAD" {
        let _ = stream.write_all(&body);
    }
    let _ = stream.flush();
}

/// Engine configuration for an isolated root with fast failure
pub fn test_config(root: &Path) -> EngineConfig {
    let mut config = EngineConfig::with_root(root);
    config.use_system_proxy = false;
    config.max_retries = 1;
    config.connect_timeout_secs = 2;
    config.request_timeout_secs = 10;
    config
}

/// Manager rooted at a fresh temporary directory
pub fn open_manager() -> (TempDir, TemplateManager) {
    let dir = tempfile::tempdir().unwrap();
    let manager = TemplateManager::open(test_config(dir.path())).unwrap();
    (dir, manager)
}

/// A template file's JSON with the given dependencies
pub fn template_json(id: &str, version: &str, dependencies: &[(&str, &str, &str)]) -> String {
    let deps: Vec<serde_json::Value> = dependencies
        .iter()
        .map(|(name, version, url)| serde_json::json!({ "name": name, "version": version, "url": url }))
        .collect();
    serde_json::json!({
        "id": id,
        "version": version,
        "description": format!("{id} template"),
        "changes": "",
        "author": "tests",
        "url": "",
        "groups": [],
        "dependencies": deps,
    })
    .to_string()
}

/// Write a repository named `name` into `dir`
///
/// Returns the catalog path. Every version gets a template file without
/// dependencies; callers overwrite individual files when they need more.
pub fn write_repository(dir: &Path, name: &str, templates: &[(&str, &[&str])]) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let mut catalog = BTreeMap::new();
    for (id, versions) in templates {
        catalog.insert(id.to_string(), serde_json::json!({ "versions": versions }));
        for version in *versions {
            fs::write(
                dir.join(format!("{id}-{version}-template.json")),
                template_json(id, version, &[]),
            )
            .unwrap();
        }
    }
    let path = dir.join(format!("{name}-repository.json"));
    fs::write(&path, serde_json::to_vec_pretty(&catalog).unwrap()).unwrap();
    path
}

/// Every file under `dir` with its content, keyed by relative path
pub fn snapshot_tree(dir: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    let mut files = BTreeMap::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        for entry in fs::read_dir(&current).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                pending.push(path);
            } else {
                let relative = path.strip_prefix(dir).unwrap().to_path_buf();
                files.insert(relative, fs::read(&path).unwrap());
            }
        }
    }
    files
}
