//! In-memory [`RemoteApi`] for tests.

use std::cell::RefCell;
use std::collections::HashMap;

use mcstats_common::PlayerUuid;

use crate::api::RemoteApi;
use crate::error::CacheError;

enum Reply {
    Ok(String),
    Status(u16, String),
}

/// Serves canned bodies per endpoint and records every request.
#[derive(Default)]
pub struct MockApi {
    replies: RefCell<HashMap<String, Reply>>,
    calls: RefCell<Vec<String>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, endpoint: impl Into<String>, body: &str) -> Self {
        self.set(endpoint, body);
        self
    }

    pub fn set(&self, endpoint: impl Into<String>, body: &str) {
        self.replies
            .borrow_mut()
            .insert(endpoint.into(), Reply::Ok(body.to_string()));
    }

    pub fn fail(&self, endpoint: impl Into<String>, status: u16, body: &str) {
        self.replies
            .borrow_mut()
            .insert(endpoint.into(), Reply::Status(status, body.to_string()));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn reset_calls(&self) {
        self.calls.borrow_mut().clear();
    }
}

impl RemoteApi for MockApi {
    async fn get(&self, endpoint: &str) -> Result<String, CacheError> {
        self.calls.borrow_mut().push(endpoint.to_string());
        match self.replies.borrow().get(endpoint) {
            Some(Reply::Ok(body)) => Ok(body.clone()),
            Some(Reply::Status(status, body)) => Err(CacheError::Api {
                endpoint: endpoint.to_string(),
                status: *status,
                body: body.clone(),
            }),
            None => Err(CacheError::Api {
                endpoint: endpoint.to_string(),
                status: 404,
                body: "not found".into(),
            }),
        }
    }
}

/// Deterministic uuid `0000...000n`.
pub fn uuid_n(n: u128) -> PlayerUuid {
    PlayerUuid::parse(&format!("{n:032x}")).expect("32 hex digits form a uuid")
}
