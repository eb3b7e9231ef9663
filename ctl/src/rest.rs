// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Declarative encoding: one REST request per call

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::{Map, Value};
#[allow(unused)]
use tracing::{debug, error, info, warn};

use crate::call::{CtlCall, Payload, Verb};
use crate::client::ControlPlane;
use crate::errors::CtlError;

/// Issues [`CtlCall`]s as requests against the daemon REST API
#[derive(Debug, Clone)]
pub struct RestCtl {
    client: Client,
    base_url: String,
}

/// Field values that look like integers are sent as JSON numbers
fn field_value(value: &str) -> Value {
    value
        .parse::<i64>()
        .map_or_else(|_| Value::String(value.to_owned()), Value::from)
}

impl RestCtl {
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        let base_url = if base_url.ends_with('/') {
            base_url.to_owned()
        } else {
            format!("{base_url}/")
        };
        Self {
            client: Client::new(),
            base_url,
        }
    }

    fn method(verb: Verb) -> (Method, &'static str) {
        match verb {
            Verb::Add | Verb::Attach => (Method::POST, "POST"),
            Verb::Del => (Method::DELETE, "DELETE"),
            Verb::Set => (Method::PATCH, "PATCH"),
            Verb::Show => (Method::GET, "GET"),
        }
    }

    /// Resource URL: the path then the keys, one segment each
    #[must_use]
    pub fn url(&self, call: &CtlCall) -> String {
        if call.verb() == Verb::Attach {
            return format!("{}attach/", self.base_url);
        }
        let mut url = self.base_url.clone();
        for segment in call.path().iter().chain(call.keys()) {
            url += segment.replace('/', "%2F").as_str();
            url.push('/');
        }
        url
    }

    /// Request body, if any
    #[must_use]
    pub fn body(call: &CtlCall) -> Option<Value> {
        match call.payload() {
            Payload::Batch(records) => Some(Value::Array(records.clone())),
            Payload::Fields(fields) => {
                let mut object = Map::new();
                if call.verb() == Verb::Attach {
                    let mut keys = call.keys().iter();
                    if let Some(cube) = keys.next() {
                        object.insert("cube".into(), Value::String(cube.clone()));
                    }
                    if let Some(port) = keys.next() {
                        object.insert("port".into(), Value::String(port.clone()));
                    }
                }
                for (name, value) in fields {
                    object.insert(name.clone(), field_value(value));
                }
                (!object.is_empty()).then_some(Value::Object(object))
            }
        }
    }
}

#[async_trait]
impl ControlPlane for RestCtl {
    async fn apply(&self, call: &CtlCall) -> Result<(), CtlError> {
        let (method, method_name) = Self::method(call.verb());
        let url = self.url(call);
        debug!("{method_name} {url} ({call})");

        let mut request = self.client.request(method, &url);
        if let Some(body) = Self::body(call) {
            request = request.json(&body);
        }
        let response = request.send().await.map_err(|e| {
            error!("{method_name} {url} failed: {e}");
            CtlError::Transport {
                method: method_name,
                url: url.clone(),
                reason: e.to_string(),
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(CtlError::Rejected {
            method: method_name,
            url,
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// A one-shot HTTP server answering with `status` and handing back the raw request
    async fn fake_daemon(status: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}/polycube/v1/", listener.local_addr().unwrap());
        let task = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = sock.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request).to_string();
                if let Some((head, body)) = text.split_once("\r\n\r\n") {
                    let length = head
                        .lines()
                        .find_map(|l| {
                            l.to_ascii_lowercase()
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap())
                        })
                        .unwrap_or(0);
                    if body.len() >= length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }
            let reply = format!("HTTP/1.1 {status}\r\ncontent-length: 4\r\nconnection: close\r\n\r\nnope");
            sock.write_all(reply.as_bytes()).await.unwrap();
            String::from_utf8_lossy(&request).to_string()
        });
        (base, task)
    }

    #[test]
    fn urls_and_bodies() {
        let ctl = RestCtl::new("http://localhost:8000/polycube/v1");
        let call = CtlCall::new(["r1", "route"], Verb::Del)
            .key("3.0.0.1/32")
            .key("1.1.0.1");
        assert_eq!(
            ctl.url(&call),
            "http://localhost:8000/polycube/v1/r1/route/3.0.0.1%2F32/1.1.0.1/"
        );
        assert_eq!(RestCtl::body(&call), None);

        let call = CtlCall::new(["p1", "contract"], Verb::Add)
            .key(5)
            .field("action", "limit")
            .field("rate-limit", 100);
        assert_eq!(
            RestCtl::body(&call),
            Some(json!({"action": "limit", "rate-limit": 100}))
        );

        let call = CtlCall::new(Vec::<String>::new(), Verb::Attach)
            .key("c1")
            .key("r1:dport")
            .field("position", "first");
        assert_eq!(ctl.url(&call), "http://localhost:8000/polycube/v1/attach/");
        assert_eq!(
            RestCtl::body(&call),
            Some(json!({"cube": "c1", "port": "r1:dport", "position": "first"}))
        );
    }

    #[tokio::test]
    async fn batch_is_one_request() {
        let (base, server) = fake_daemon("201 Created").await;
        let ctl = RestCtl::new(&base);
        let records = vec![
            json!({"address": "1.1.0.1", "mac": "aa:bb:cc:00:00:01", "interface": "dport"}),
            json!({"address": "1.1.0.2", "mac": "aa:bb:cc:00:00:02", "interface": "dport"}),
        ];
        ctl.apply(&CtlCall::batch(["r1", "arp-table"], Verb::Add, records))
            .await
            .unwrap();
        let request = server.await.unwrap();
        assert!(request.starts_with("POST /polycube/v1/r1/arp-table/ HTTP/1.1"));
        assert!(request.contains(r#"[{"address":"1.1.0.1""#));
    }

    #[tokio::test]
    async fn rejection_is_an_error() {
        let (base, server) = fake_daemon("409 Conflict").await;
        let ctl = RestCtl::new(&base);
        let err = ctl
            .apply(&CtlCall::new(["gh1", "user-equipment"], Verb::Add).key("3.0.0.1"))
            .await
            .unwrap_err();
        assert!(matches!(err, CtlError::Rejected { status: 409, ref body, .. } if body == "nope"));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn unreachable_daemon() {
        let ctl = RestCtl::new("http://127.0.0.1:1/polycube/v1/");
        let err = ctl
            .apply(&CtlCall::new(["r1"], Verb::Show))
            .await
            .unwrap_err();
        assert!(matches!(err, CtlError::Transport { method: "GET", .. }));
    }
}
