#![allow(dead_code)]

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::{Duration, Instant};

/// One request as seen by the test server.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("request body is JSON")
    }
}

fn read_request(stream: &mut TcpStream) -> std::io::Result<RecordedRequest> {
    let mut reader = BufReader::new(stream);

    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let target = parts.next().unwrap_or_default().to_string();

    let mut headers = Vec::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((key, value)) = line.split_once(':') {
            headers.push((key.trim().to_string(), value.trim().to_string()));
        }
    }

    let length = headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = vec![0u8; length];
    reader.read_exact(&mut body)?;

    Ok(RecordedRequest {
        method,
        target,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

/// Serve `responses` in order, one connection each, then return what was requested.
pub fn start_test_server(
    responses: Vec<(u16, String)>,
) -> (String, thread::JoinHandle<Vec<RecordedRequest>>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind test server");
    listener.set_nonblocking(true).expect("set nonblocking");
    let addr = listener.local_addr().expect("server addr");

    let handle = thread::spawn(move || {
        let mut recorded = Vec::new();
        let start = Instant::now();
        let mut pending = responses.into_iter();
        let mut next = pending.next();

        while let Some((status, body)) = next.take() {
            match listener.accept() {
                Ok((mut stream, _)) => {
                    stream.set_nonblocking(false).expect("blocking stream");
                    stream
                        .set_read_timeout(Some(Duration::from_secs(2)))
                        .expect("read timeout");
                    if let Ok(request) = read_request(&mut stream) {
                        recorded.push(request);
                    }
                    let reason = if (200..300).contains(&status) { "OK" } else { "Error" };
                    let response = if status == 204 {
                        "HTTP/1.1 204 No Content\r\nConnection: close\r\n\r\n".to_string()
                    } else {
                        format!(
                            "HTTP/1.1 {} {}\r\nContent-Type: application/fhir+json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status,
                            reason,
                            body.len(),
                            body
                        )
                    };
                    let _ = stream.write_all(response.as_bytes());
                    let _ = stream.flush();
                    next = pending.next();
                }
                Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                    if start.elapsed() > Duration::from_secs(5) {
                        break;
                    }
                    thread::sleep(Duration::from_millis(10));
                    next = Some((status, body));
                }
                Err(_) => break,
            }
        }

        recorded
    });

    (format!("http://{}/fhir", addr), handle)
}

/// A base URL nothing is listening on.
pub fn closed_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{}/fhir", addr)
}

pub fn bundle(resources: &[&str]) -> String {
    let entries = resources
        .iter()
        .map(|resource| format!(r#"{{"resource":{resource}}}"#))
        .collect::<Vec<_>>()
        .join(",");
    format!(r#"{{"resourceType":"Bundle","type":"searchset","entry":[{entries}]}}"#)
}

pub const PATIENT_ADA: &str = r#"{"resourceType":"Patient","id":"1","name":[{"family":"Lovelace","given":["Ada"]}],"telecom":[{"system":"phone","value":"555-0101"},{"system":"email","value":"ada@example.org"}]}"#;
pub const PATIENT_ALAN: &str = r#"{"resourceType":"Patient","id":"2","name":[{"family":"Turing","given":["Alan"]}],"address":[{"line":["Bletchley Park"]}]}"#;
pub const PRACTITIONER_HOUSE: &str = r#"{"resourceType":"Practitioner","id":"42","name":[{"family":"House","given":["Greg"]}]}"#;
