// # PAN-OS XML API Session
//
// This crate provides the HTTPS XML API session used by the PAN-OS modules.
//
// ## Scope
//
// Only the calls the modules need:
//
// - `type=keygen`: exchange user/password for an API key
// - `type=config&action=get|set|edit`: read and write candidate configuration
// - `type=commit`: commit, then poll the job with `type=op` until it finishes
//
// Every request is a form-encoded POST to `https://<host>/api/`, so neither
// the password nor the API key ever appears in a URL.
//
// ## Constraints
//
// - One request per call (plus job polling for commit)
// - No retry, no backoff: errors go straight back to the module
// - Password and API key never appear in logs or `Debug` output
//
// ## Response Envelope
//
// ```xml
// <response status="success"><result>...</result></response>
// <response status="error" code="403"><result><msg>Invalid credentials.</msg></result></response>
// ```

use async_trait::async_trait;
use panos_core::config::ConnectionConfig;
use panos_core::traits::{CommitResult, XmlApi, XmlApiFactory};
use panos_core::xml::ConfigDocument;
use panos_core::{Error, Result};
use std::time::Duration;
use tokio::sync::Mutex;

/// Path of the XML API endpoint on the device
const API_PATH: &str = "/api/";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Commit command sent with `type=commit`
const COMMIT_CMD: &str = "<commit></commit>";

/// Response code the device uses for bad credentials or key
const CODE_UNAUTHORIZED: u32 = 403;

/// PAN-OS XML API session
///
/// The API key is generated lazily on the first request and reused for the
/// rest of the session.
///
/// # Check Mode
///
/// When `dry_run` is true, the session will:
/// - Perform keygen and all `get` requests
/// - Log the intended `set`/`edit` payloads and the commit
/// - **NOT** modify the device
pub struct PanXapi {
    /// Device address as given by the caller
    hostname: String,

    /// Endpoint URL
    url: String,

    /// API user
    username: String,

    /// API password
    /// ⚠️ NEVER log this value
    password: String,

    /// API key obtained by keygen
    /// ⚠️ NEVER log this value
    api_key: Mutex<Option<String>>,

    /// Verify the device's TLS certificate
    validate_certs: bool,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Check mode: if true, perform reads but skip writes and commits
    dry_run: bool,
}

// Custom Debug implementation that hides the credentials
impl std::fmt::Debug for PanXapi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PanXapi")
            .field("hostname", &self.hostname)
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"<REDACTED>")
            .field("api_key", &"<REDACTED>")
            .field("validate_certs", &self.validate_certs)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl PanXapi {
    /// Open a session to the device described by `connection`
    ///
    /// No request is made until the first call.
    ///
    /// # Parameters
    ///
    /// - `connection`: device address, credentials and TLS policy
    /// - `dry_run`: if true, perform reads but skip writes and commits
    pub fn new(connection: &ConnectionConfig, dry_run: bool) -> Result<Self> {
        connection.validate()?;

        let client = build_client(connection.validate_certs, true)?;

        Ok(Self {
            hostname: connection.ip_address.clone(),
            url: format!("https://{}{}", connection.ip_address, API_PATH),
            username: connection.username.clone(),
            password: connection.password.clone(),
            api_key: Mutex::new(None),
            validate_certs: connection.validate_certs,
            client,
            dry_run,
        })
    }

    /// Talk to an explicit endpoint URL instead of `https://<host>/api/`
    ///
    /// Used for local tunnels and plain-HTTP responders; requests to an
    /// explicit endpoint bypass the system proxy settings.
    pub fn with_url(mut self, url: impl Into<String>) -> Result<Self> {
        self.url = url.into();
        self.client = build_client(self.validate_certs, false)?;
        Ok(self)
    }

    /// Return the session's API key, generating it on first use
    ///
    /// # API Call
    ///
    /// ```http
    /// POST /api/
    /// type=keygen&user=<user>&password=<password>
    /// ```
    async fn api_key(&self) -> Result<String> {
        let mut guard = self.api_key.lock().await;
        if let Some(ref key) = *guard {
            return Ok(key.clone());
        }

        tracing::debug!("Generating API key for {}@{}", self.username, self.hostname);

        let form = [
            ("type", "keygen"),
            ("user", self.username.as_str()),
            ("password", self.password.as_str()),
        ];
        let body = self.post(&form).await.map_err(|e| match e {
            Error::Api { message, .. } => Error::auth(message),
            other => other,
        })?;

        let key = ConfigDocument::parse(body)?
            .element_text("key")
            .filter(|key| !key.is_empty())
            .ok_or_else(|| Error::auth("keygen response carried no key"))?;

        *guard = Some(key.clone());
        Ok(key)
    }

    /// POST an authenticated request and return the success envelope
    async fn request(&self, params: &[(&str, &str)]) -> Result<String> {
        let key = self.api_key().await?;

        let mut form = Vec::with_capacity(params.len() + 1);
        form.extend_from_slice(params);
        form.push(("key", key.as_str()));

        self.post(&form).await
    }

    /// POST a form and check the response envelope
    async fn post(&self, form: &[(&str, &str)]) -> Result<String> {
        let response = self
            .client
            .post(&self.url)
            .form(form)
            .send()
            .await
            .map_err(|e| {
                Error::http(format!(
                    "Request to {} failed: {}",
                    self.hostname,
                    e.without_url()
                ))
            })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| Error::http(format!("Failed to read response: {}", e.without_url())))?;

        check_response(status, &body)?;
        Ok(body)
    }

    /// Run a config action
    async fn config(&self, action: &str, xpath: &str, element: Option<&str>) -> Result<String> {
        tracing::debug!("config action={} xpath={}", action, xpath);

        let mut params = vec![("type", "config"), ("action", action), ("xpath", xpath)];
        if let Some(element) = element {
            params.push(("element", element));
        }
        self.request(&params).await
    }

    /// Write unless in check mode
    async fn write(&self, action: &str, xpath: &str, element: &str) -> Result<()> {
        if self.dry_run {
            tracing::info!(
                "[CHECK-MODE] Would {} {} on {} with element: {}",
                action,
                xpath,
                self.hostname,
                element
            );
            return Ok(());
        }

        self.config(action, xpath, Some(element)).await?;
        Ok(())
    }

    /// Poll a commit job until the device reports it finished
    ///
    /// # API Call
    ///
    /// ```http
    /// POST /api/
    /// type=op&cmd=<show><jobs><id>N</id></jobs></show>
    /// ```
    async fn wait_for_job(&self, job_id: u64, poll_interval: Duration) -> Result<Vec<String>> {
        let cmd = format!("<show><jobs><id>{}</id></jobs></show>", job_id);

        loop {
            let body = self.request(&[("type", "op"), ("cmd", cmd.as_str())]).await?;
            let job = JobState::parse(&body)?;

            if !job.is_finished() {
                tracing::debug!(
                    "Commit job {} on {}: status {}",
                    job_id,
                    self.hostname,
                    job.status
                );
                tokio::time::sleep(poll_interval).await;
                continue;
            }

            if job.result != "OK" {
                let reason = if job.details.is_empty() {
                    format!("job {} finished with result {}", job_id, job.result)
                } else {
                    job.details.join("; ")
                };
                return Err(Error::commit(reason));
            }

            return Ok(job.details);
        }
    }
}

#[async_trait]
impl XmlApi for PanXapi {
    /// # API Call
    ///
    /// ```http
    /// POST /api/
    /// type=config&action=get&xpath=<xpath>
    /// ```
    async fn get(&self, xpath: &str) -> Result<ConfigDocument> {
        let body = self.config("get", xpath, None).await?;
        ConfigDocument::parse(body)
    }

    async fn set(&self, xpath: &str, element: &str) -> Result<()> {
        self.write("set", xpath, element).await
    }

    async fn edit(&self, xpath: &str, element: &str) -> Result<()> {
        self.write("edit", xpath, element).await
    }

    /// # API Call
    ///
    /// ```http
    /// POST /api/
    /// type=commit&cmd=<commit></commit>
    /// ```
    async fn commit(&self, poll_interval: Duration) -> Result<CommitResult> {
        if self.dry_run {
            tracing::info!("[CHECK-MODE] Would commit on {}", self.hostname);
            return Ok(CommitResult::Skipped);
        }

        tracing::info!("Committing on {}", self.hostname);
        let body = self
            .request(&[("type", "commit"), ("cmd", COMMIT_CMD)])
            .await
            .map_err(|e| match e {
                Error::Api { message, .. } => Error::commit(message),
                other => other,
            })?;

        let Some(job) = ConfigDocument::parse(body)?.element_text("job") else {
            return Ok(CommitResult::NoChanges);
        };
        let job_id = job
            .trim()
            .parse::<u64>()
            .map_err(|_| Error::commit(format!("Invalid job id in commit response: {}", job)))?;

        tracing::info!("Commit job {} enqueued on {}", job_id, self.hostname);
        let details = self.wait_for_job(job_id, poll_interval).await?;

        Ok(CommitResult::Completed { job_id, details })
    }

    fn hostname(&self) -> &str {
        &self.hostname
    }
}

fn build_client(validate_certs: bool, use_system_proxy: bool) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .timeout(DEFAULT_HTTP_TIMEOUT)
        .danger_accept_invalid_certs(!validate_certs);
    if !use_system_proxy {
        builder = builder.no_proxy();
    }

    builder
        .build()
        .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))
}

/// Factory for opening PAN-OS XML API sessions
pub struct PanXapiFactory;

impl XmlApiFactory for PanXapiFactory {
    fn create(&self, connection: &ConnectionConfig, check_mode: bool) -> Result<Box<dyn XmlApi>> {
        if check_mode {
            tracing::warn!("XML API session running in CHECK mode - no changes will be made");
        }

        Ok(Box::new(PanXapi::new(connection, check_mode)?))
    }
}

/// State of a commit job as reported by `show jobs id`
#[derive(Debug, Clone, PartialEq, Eq)]
struct JobState {
    status: String,
    result: String,
    details: Vec<String>,
}

impl JobState {
    fn parse(body: &str) -> Result<Self> {
        let doc = roxmltree::Document::parse(body)?;
        let job = doc
            .descendants()
            .find(|n| n.has_tag_name("job"))
            .ok_or_else(|| Error::commit("job status response carried no job"))?;

        let child_text = |tag: &str| {
            job.children()
                .find(|n| n.has_tag_name(tag))
                .and_then(|n| n.text())
                .map(|t| t.trim().to_string())
                .unwrap_or_default()
        };

        let details = job
            .children()
            .find(|n| n.has_tag_name("details"))
            .map(|details| {
                details
                    .descendants()
                    .filter(|n| n.has_tag_name("line"))
                    .filter_map(|n| n.text())
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            status: child_text("status"),
            result: child_text("result"),
            details,
        })
    }

    fn is_finished(&self) -> bool {
        self.status == "FIN"
    }
}

/// Check an XML API response
///
/// A `status="success"` envelope passes. An error envelope becomes
/// [`Error::Authentication`] for code 403 and [`Error::Api`] otherwise.
/// Bodies that are not an envelope are judged by the HTTP status.
fn check_response(http_status: u16, body: &str) -> Result<()> {
    let doc = match roxmltree::Document::parse(body) {
        Ok(doc) if doc.root_element().has_tag_name("response") => doc,
        _ => return Err(status_error(http_status, body)),
    };

    let root = doc.root_element();
    if root.attribute("status") == Some("success") {
        return Ok(());
    }

    let code = root.attribute("code").and_then(|c| c.parse::<u32>().ok());
    let message = response_message(&doc).unwrap_or_else(|| {
        let code = code.map_or_else(|| "none".to_string(), |c| c.to_string());
        format!("XML API error (code {})", code)
    });

    if code == Some(CODE_UNAUTHORIZED) || root.attribute("status") == Some("unauth") {
        return Err(Error::auth(message));
    }
    Err(Error::api(code, message))
}

/// Text of the envelope's `msg` element, joining its `line` children
fn response_message(doc: &roxmltree::Document<'_>) -> Option<String> {
    let msg = doc.descendants().find(|n| n.has_tag_name("msg"))?;

    let lines = msg
        .descendants()
        .filter(|n| n.has_tag_name("line"))
        .filter_map(|n| n.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>();

    if !lines.is_empty() {
        return Some(lines.join(" "));
    }

    msg.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Map an HTTP status without a usable envelope to an error
fn status_error(http_status: u16, body: &str) -> Error {
    match http_status {
        200..=299 => Error::xml(format!(
            "Unexpected response (not an XML API envelope): {}",
            truncate(body)
        )),
        401 | 403 => Error::auth(format!(
            "Invalid credentials or insufficient permissions. Status: {}",
            http_status
        )),
        404 => Error::http(format!("XML API endpoint not found. Status: {}", http_status)),
        500..=599 => Error::http(format!(
            "Device server error: {} - {}",
            http_status,
            truncate(body)
        )),
        _ => Error::http(format!("Request failed: {} - {}", http_status, truncate(body))),
    }
}

fn truncate(body: &str) -> &str {
    let end = body
        .char_indices()
        .nth(200)
        .map_or(body.len(), |(idx, _)| idx);
    &body[..end]
}
