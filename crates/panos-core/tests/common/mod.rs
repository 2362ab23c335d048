//! Test doubles and common utilities for module contract tests
//!
//! [`MockXmlApi`] keeps a map of xpath → response body, counts every call
//! and records every write, so tests can assert exactly which requests a
//! procedure made.

#![allow(dead_code)]

use async_trait::async_trait;
use panos_core::error::{Error, Result};
use panos_core::traits::{CommitResult, XmlApi};
use panos_core::xml::ConfigDocument;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Kind of request made to the mock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Get,
    Set,
    Edit,
    Commit,
}

/// A write received by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Write {
    pub call: Call,
    pub xpath: String,
    pub element: String,
}

/// An in-memory device that tracks calls
#[derive(Clone, Default)]
pub struct MockXmlApi {
    /// Response body per xpath
    config: Arc<Mutex<HashMap<String, String>>>,
    /// Every call in order, with its xpath (empty for commit)
    calls: Arc<Mutex<Vec<(Call, String)>>>,
    /// Writes in order
    writes: Arc<Mutex<Vec<Write>>>,
    /// Call counter for commit()
    commit_call_count: Arc<AtomicUsize>,
    /// Fail the first call of this kind on this xpath
    fail_on: Arc<Mutex<Option<(Call, String)>>>,
    /// Fail commit with this message
    commit_failure: Arc<Mutex<Option<String>>>,
    /// Result returned by the last commit()
    last_commit: Arc<Mutex<Option<CommitResult>>>,
    /// Check mode: reads are served, writes and commits are dropped
    dry_run: bool,
}

impl MockXmlApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the leaf `tag` at `xpath` with `value`
    pub fn with_leaf(self, xpath: &str, tag: &str, value: &str) -> Self {
        self.config.lock().unwrap().insert(
            xpath.to_string(),
            envelope(&format!("<{tag}>{value}</{tag}>")),
        );
        self
    }

    /// Seed an arbitrary response body at `xpath`
    pub fn with_response(self, xpath: &str, body: &str) -> Self {
        self.config
            .lock()
            .unwrap()
            .insert(xpath.to_string(), body.to_string());
        self
    }

    /// Make the first `call` on `xpath` fail with an API error
    pub fn failing_on(self, call: Call, xpath: &str) -> Self {
        *self.fail_on.lock().unwrap() = Some((call, xpath.to_string()));
        self
    }

    /// Make commit fail with `message`
    pub fn failing_commit(self, message: &str) -> Self {
        *self.commit_failure.lock().unwrap() = Some(message.to_string());
        self
    }

    /// Behave like a check-mode session
    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    /// Number of calls of the given kind
    pub fn count(&self, call: Call) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| *c == call)
            .count()
    }

    /// Xpaths read, in order
    pub fn reads(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| *c == Call::Get)
            .map(|(_, xpath)| xpath.clone())
            .collect()
    }

    /// Writes received, in order
    pub fn writes(&self) -> Vec<Write> {
        self.writes.lock().unwrap().clone()
    }

    /// Get the number of times commit() was called
    pub fn commit_call_count(&self) -> usize {
        self.commit_call_count.load(Ordering::SeqCst)
    }

    /// What the last commit() returned
    pub fn last_commit(&self) -> Option<CommitResult> {
        self.last_commit.lock().unwrap().clone()
    }

    fn record(&self, call: Call, xpath: &str) -> Result<()> {
        self.calls.lock().unwrap().push((call, xpath.to_string()));

        let mut fail_on = self.fail_on.lock().unwrap();
        if fail_on
            .as_ref()
            .is_some_and(|(c, x)| *c == call && x == xpath)
        {
            *fail_on = None;
            return Err(Error::api(Some(400), format!("injected failure on {xpath}")));
        }
        Ok(())
    }

    fn write(&self, call: Call, xpath: &str, element: &str, stored: String) -> Result<()> {
        self.record(call, xpath)?;
        if self.dry_run {
            return Ok(());
        }
        self.writes.lock().unwrap().push(Write {
            call,
            xpath: xpath.to_string(),
            element: element.to_string(),
        });
        self.config
            .lock()
            .unwrap()
            .insert(xpath.to_string(), envelope(&stored));
        Ok(())
    }
}

#[async_trait]
impl XmlApi for MockXmlApi {
    async fn get(&self, xpath: &str) -> Result<ConfigDocument> {
        self.record(Call::Get, xpath)?;
        let body = self
            .config
            .lock()
            .unwrap()
            .get(xpath)
            .cloned()
            .unwrap_or_else(empty_response);
        ConfigDocument::parse(body)
    }

    async fn set(&self, xpath: &str, element: &str) -> Result<()> {
        // A set at an entry path creates the entry around the fragment.
        self.write(Call::Set, xpath, element, format!("<entry>{element}</entry>"))
    }

    async fn edit(&self, xpath: &str, element: &str) -> Result<()> {
        self.write(Call::Edit, xpath, element, element.to_string())
    }

    async fn commit(&self, _poll_interval: Duration) -> Result<CommitResult> {
        self.commit_call_count.fetch_add(1, Ordering::SeqCst);
        self.record(Call::Commit, "")?;
        if let Some(message) = self.commit_failure.lock().unwrap().clone() {
            return Err(Error::commit(message));
        }

        let result = if self.dry_run {
            CommitResult::Skipped
        } else {
            CommitResult::Completed {
                job_id: 1,
                details: vec!["Configuration committed successfully".to_string()],
            }
        };
        *self.last_commit.lock().unwrap() = Some(result.clone());
        Ok(result)
    }

    fn hostname(&self) -> &str {
        "mock-firewall"
    }
}

/// Wrap a result body in a success envelope
pub fn envelope(inner: &str) -> String {
    format!(r#"<response status="success"><result total-count="1" count="1">{inner}</result></response>"#)
}

/// Response for a path that matches nothing
pub fn empty_response() -> String {
    r#"<response status="success"><result total-count="0" count="0"/></response>"#.to_string()
}

/// Parameters for the management configuration module with nothing requested
pub fn mgtconfig_params() -> panos_core::MgtConfigParams {
    panos_core::MgtConfigParams {
        connection: panos_core::ConnectionConfig::new("192.168.1.1", "admin"),
        dns_server_primary: None,
        dns_server_secondary: None,
        panorama_primary: None,
        panorama_secondary: None,
        commit: true,
        check_mode: false,
    }
}

/// Parameters for the dynamic address group module
pub fn dag_params(name: &str, filter: &str) -> panos_core::DagParams {
    panos_core::DagParams {
        connection: panos_core::ConnectionConfig::new("192.168.1.1", "admin"),
        dag_name: name.to_string(),
        dag_filter: filter.to_string(),
        commit: true,
        check_mode: false,
    }
}
