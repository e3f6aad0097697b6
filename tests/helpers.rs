/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use async_trait::async_trait;
use flickr::rest::{
    check_response, signing, AppCreds, Completion, Completions, FlickrError, Params, Transport,
};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

pub const API_KEY: &str = "test-key";
pub const API_SECRET: &str = "test-secret";
pub const AUTH_URL: &str = "https://auth.example.test/services/auth/";

/// How the mock answers a method
#[derive(Clone, Debug)]
#[allow(dead_code)]
pub enum Reply {
    Doc(Value),
    Fail(u32, String),
    Panic,
}

/// Transport that answers from a script and records everything sent.
///
/// `flickr.auth.getFrob` hands out `frob-1`, `frob-2`, ... and `flickr.auth.getToken`
/// issues a credential with whatever permission the approval URL for that frob asked
/// for, unless a method has been scripted with [`MockTransport::on`].
/// `flickr.test.echo` replies with the parameters it was sent. A `delay_ms` parameter
/// holds the reply back that long.
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    replies: Mutex<HashMap<String, Reply>>,
    sent: Mutex<Vec<Params>>,
    approvals: Mutex<HashMap<String, String>>,
    frobs: Mutex<u32>,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&self, method: &str, reply: Reply) -> &Self {
        self.inner
            .replies
            .lock()
            .unwrap()
            .insert(method.to_string(), reply);
        self
    }

    pub fn sent(&self) -> Vec<Params> {
        self.inner.sent.lock().unwrap().clone()
    }

    pub fn sent_methods(&self) -> Vec<String> {
        self.sent()
            .iter()
            .filter_map(|p| p.get("method").map(str::to_string))
            .collect()
    }

    fn default_reply(&self, params: &Params) -> Reply {
        match params.get("method").unwrap_or_default() {
            "flickr.auth.getFrob" => {
                let mut n = self.inner.frobs.lock().unwrap();
                *n += 1;
                Reply::Doc(json!({"frob": {"_content": format!("frob-{}", *n)}, "stat": "ok"}))
            }
            "flickr.auth.getToken" => {
                let frob = params.get("frob").unwrap_or_default();
                match self.inner.approvals.lock().unwrap().get(frob) {
                    Some(perms) => Reply::Doc(auth_doc(&format!("token-for-{frob}"), perms)),
                    None => Reply::Fail(108, "Invalid frob".to_string()),
                }
            }
            "flickr.test.echo" => {
                let mut echoed = Map::new();
                for (k, v) in params.present() {
                    echoed.insert(k.to_string(), json!({"_content": v}));
                }
                echoed.insert("stat".to_string(), json!("ok"));
                Reply::Doc(Value::Object(echoed))
            }
            _ => Reply::Fail(112, "Method not found".to_string()),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn sign_and_send(
        &self,
        secret: Option<&str>,
        params: &Params,
    ) -> Result<Value, FlickrError> {
        self.inner.sent.lock().unwrap().push(params.clone());
        if secret.is_some_and(|s| s != API_SECRET) {
            return Err(FlickrError::ApiResponse(96, "Invalid signature".to_string()));
        }
        if let Some(ms) = params.get("delay_ms").and_then(|v| v.parse::<u64>().ok()) {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }

        let method = params.get("method").unwrap_or_default().to_string();
        let scripted = self.inner.replies.lock().unwrap().get(&method).cloned();
        match scripted.unwrap_or_else(|| self.default_reply(params)) {
            Reply::Doc(doc) => check_response(doc),
            Reply::Fail(code, message) => {
                check_response(json!({"stat": "fail", "code": code, "message": message}))
            }
            Reply::Panic => panic!("transport blew up on {method}"),
        }
    }

    fn build_approval_url(&self, secret: &str, params: &Params) -> Result<Url, FlickrError> {
        if let (Some(frob), Some(perms)) = (params.get("frob"), params.get("perms")) {
            self.inner
                .approvals
                .lock()
                .unwrap()
                .insert(frob.to_string(), perms.to_string());
        }
        let sig = signing::signature(secret, params.present())?;
        let mut query: Vec<(&str, &str)> = params.present().collect();
        query.push(("api_sig", sig.as_str()));
        Ok(Url::parse_with_params(AUTH_URL, &query)?)
    }
}

#[allow(dead_code)]
pub fn app_creds() -> AppCreds {
    AppCreds::from_tokens(API_KEY, Some(API_SECRET))
}

#[allow(dead_code)]
pub fn auth_doc(token: &str, perms: &str) -> Value {
    json!({
        "auth": {
            "token": {"_content": token},
            "perms": {"_content": perms},
            "user": {"nsid": "35468159852@N01", "username": "testuser", "fullname": "Test User"}
        },
        "stat": "ok"
    })
}

/// Next completion, failing the test if none shows up in time
#[allow(dead_code)]
pub async fn next<T>(completions: &mut Completions<T>) -> Completion<T> {
    tokio::time::timeout(Duration::from_secs(5), completions.recv())
        .await
        .expect("timed out waiting for a completion")
        .expect("completion channel closed")
}

#[allow(dead_code)]
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[allow(dead_code)]
pub(crate) fn get_live_creds() -> anyhow::Result<AppCreds> {
    dotenvy::dotenv().ok();
    Ok(AppCreds::from_env()?)
}
