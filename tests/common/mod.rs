// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

#![allow(dead_code)]

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

use quickledger::config::Config;
use quickledger::db::init_schema;
use quickledger::session::AppContext;
use rusqlite::Connection;

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub target: String,
    pub body: String,
}

impl Recorded {
    pub fn path(&self) -> &str {
        self.target.split('?').next().unwrap_or("")
    }

    pub fn query(&self) -> &str {
        self.target.split_once('?').map(|(_, q)| q).unwrap_or("")
    }
}

/// `(method, path, status, body)`. A path ending in `*` matches by prefix;
/// a path containing `?` is compared with the full request target.
/// The first matching route wins; anything unmatched gets a 404.
pub type Route = (&'static str, &'static str, u16, String);

pub struct StubServer {
    pub url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl StubServer {
    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, method: &str, path_prefix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.path().starts_with(path_prefix))
            .count()
    }
}

pub fn serve(routes: Vec<Route>) -> StubServer {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let requests = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&requests);
    let routes = Arc::new(routes);
    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(stream) = stream else { break };
            let routes = Arc::clone(&routes);
            let log = Arc::clone(&log);
            thread::spawn(move || respond(stream, &routes, &log));
        }
    });
    StubServer { url, requests }
}

fn respond(stream: TcpStream, routes: &[Route], log: &Mutex<Vec<Recorded>>) {
    let mut reader = BufReader::new(stream.try_clone().unwrap());
    let mut request_line = String::new();
    if reader.read_line(&mut request_line).unwrap_or(0) == 0 {
        return;
    }
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or("").to_string();
    let target = parts.next().unwrap_or("").to_string();
    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).unwrap_or(0) == 0 || line == "\r\n" {
            break;
        }
        if let Some((k, v)) = line.split_once(':') {
            if k.trim().eq_ignore_ascii_case("content-length") {
                content_length = v.trim().parse().unwrap_or(0);
            }
        }
    }
    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body).unwrap();
    let rec = Recorded {
        method,
        target,
        body: String::from_utf8_lossy(&body).to_string(),
    };
    log.lock().unwrap().push(rec.clone());

    let (status, payload) = routes
        .iter()
        .find(|(m, p, _, _)| {
            let subject = if p.contains('?') { rec.target.as_str() } else { rec.path() };
            *m == rec.method
                && match p.strip_suffix('*') {
                    Some(prefix) => subject.starts_with(prefix),
                    None => subject == *p,
                }
        })
        .map(|(_, _, s, b)| (*s, b.clone()))
        .unwrap_or((404, r#"{"detail":"Not Found"}"#.to_string()));

    let reason = if status < 300 { "OK" } else { "Error" };
    let mut out = stream;
    let _ = write!(
        out,
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason,
        payload.len(),
        payload
    );
    let _ = out.flush();
}

/// An address nothing is listening on.
pub fn dead_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

pub fn store() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    init_schema(&conn).unwrap();
    conn
}

pub fn config(url: &str) -> Config {
    Config {
        api_url: url.to_string(),
        timeout_secs: 5,
        ..Config::default()
    }
}

pub fn context(url: &str) -> AppContext {
    AppContext::new(config(url), store()).unwrap()
}

pub fn expenses_body(items: &[(&str, &str, f64, usize)]) -> String {
    expenses_page(items, 0, items.len(), false)
}

/// One page of `GET /expenses` starting at `offset` out of `total` records.
pub fn expenses_page(
    items: &[(&str, &str, f64, usize)],
    offset: usize,
    total: usize,
    has_more: bool,
) -> String {
    let list: Vec<serde_json::Value> = items
        .iter()
        .map(|(date, name, amount, index)| {
            serde_json::json!({"date": date, "expense": name, "amount": amount, "index": index})
        })
        .collect();
    serde_json::json!({
        "expenses": list,
        "total": total,
        "limit": 1000,
        "offset": offset,
        "has_more": has_more,
        "returned": items.len()
    })
    .to_string()
}
