//! REST client for hierarchical storage accounts
//!
//! Speaks the DFS filesystem/path surface directly:
//! - uploads as create + append + flush
//! - server-side renames via `x-ms-rename-source`
//! - directory creation and (recursive) deletes
//!
//! Every call is a single logical operation against one object; deletes
//! treat a missing target as success.

use bytes::Bytes;
use chrono::Utc;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::{Client, ClientBuilder, Method, Response};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

use naskh_core::{Error, Result};

use crate::connection::ConnectionString;
use crate::sign::{CanonicalRequest, SharedKeySigner};

/// Service version sent as `x-ms-version`
const API_VERSION: &str = "2023-11-03";

const OCTET_STREAM: &str = "application/octet-stream";

/// Timeouts for the outbound connection pool
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Client for one storage account's DFS endpoint
pub struct DataLakeClient {
    http: Client,
    endpoint: String,
    signer: SharedKeySigner,
}

impl DataLakeClient {
    pub fn new(conn: &ConnectionString, config: ClientConfig) -> Result<Self> {
        let http = ClientBuilder::new()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| Error::Transport(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: conn.dfs_endpoint.clone(),
            signer: SharedKeySigner::new(&conn.account_name, conn.account_key.clone()),
        })
    }

    pub fn from_connection_string(raw: &str, config: ClientConfig) -> Result<Self> {
        let conn = ConnectionString::parse(raw)?;
        Self::new(&conn, config)
    }

    /// Create or overwrite the file at `path` with `data`.
    pub async fn upload(
        &self,
        filesystem: &str,
        path: &str,
        data: Bytes,
        overwrite: bool,
    ) -> Result<()> {
        let wire = wire_path(filesystem, path);

        let if_none_match = if overwrite { "" } else { "*" };
        let create = self
            .request(Request {
                method: Method::PUT,
                path: &wire,
                query: &[("resource".into(), "file".into())],
                ms_headers: &[],
                if_none_match,
                body: None,
                content_type: "",
            })
            .await?;
        expect_success(create).await?;

        if !data.is_empty() {
            let len = data.len();

            let append = self
                .request(Request {
                    method: Method::PATCH,
                    path: &wire,
                    query: &[
                        ("action".into(), "append".into()),
                        ("position".into(), "0".into()),
                    ],
                    ms_headers: &[],
                    if_none_match: "",
                    body: Some(data),
                    content_type: OCTET_STREAM,
                })
                .await?;
            expect_success(append).await?;

            let flush = self
                .request(Request {
                    method: Method::PATCH,
                    path: &wire,
                    query: &[
                        ("action".into(), "flush".into()),
                        ("position".into(), len.to_string()),
                        ("close".into(), "true".into()),
                    ],
                    ms_headers: &[],
                    if_none_match: "",
                    body: None,
                    content_type: "",
                })
                .await?;
            expect_success(flush).await?;
        }

        debug!(filesystem, path, "uploaded file");
        Ok(())
    }

    /// Read the object at `path` (filesystem segment included). Returns
    /// `None` if the object does not exist.
    pub async fn read(&self, path: &str) -> Result<Option<Bytes>> {
        let wire = encode_path(path);

        let response = self
            .request(Request {
                method: Method::GET,
                path: &wire,
                query: &[],
                ms_headers: &[],
                if_none_match: "",
                body: None,
                content_type: "",
            })
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = expect_success(response).await?;
        let data = response
            .bytes()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        debug!(path, len = data.len(), "read object");
        Ok(Some(data))
    }

    pub async fn rename_file(
        &self,
        filesystem: &str,
        source: &str,
        destination: &str,
    ) -> Result<()> {
        self.rename(filesystem, source, destination).await?;
        debug!(filesystem, source, destination, "renamed file");
        Ok(())
    }

    pub async fn rename_directory(
        &self,
        filesystem: &str,
        source: &str,
        destination: &str,
    ) -> Result<()> {
        self.rename(filesystem, source, destination).await?;
        debug!(filesystem, source, destination, "renamed directory");
        Ok(())
    }

    pub async fn create_directory(&self, filesystem: &str, path: &str) -> Result<()> {
        let wire = wire_path(filesystem, path);

        let response = self
            .request(Request {
                method: Method::PUT,
                path: &wire,
                query: &[("resource".into(), "directory".into())],
                ms_headers: &[],
                if_none_match: "",
                body: None,
                content_type: "",
            })
            .await?;
        expect_success(response).await?;

        debug!(filesystem, path, "created directory");
        Ok(())
    }

    pub async fn delete_file(&self, filesystem: &str, path: &str) -> Result<()> {
        self.delete(filesystem, path, false).await?;
        debug!(filesystem, path, "deleted file");
        Ok(())
    }

    pub async fn delete_directory(&self, filesystem: &str, path: &str) -> Result<()> {
        self.delete(filesystem, path, true).await?;
        debug!(filesystem, path, "deleted directory");
        Ok(())
    }

    /// Server-side rename. Files and directories share the same wire
    /// operation; the source is passed as a slash-prefixed header value.
    async fn rename(&self, filesystem: &str, source: &str, destination: &str) -> Result<()> {
        let wire = wire_path(filesystem, destination);
        let rename_source = wire_path(filesystem, source);

        let response = self
            .request(Request {
                method: Method::PUT,
                path: &wire,
                query: &[],
                ms_headers: &[("x-ms-rename-source", rename_source)],
                if_none_match: "",
                body: None,
                content_type: "",
            })
            .await?;
        expect_success(response).await?;
        Ok(())
    }

    async fn delete(&self, filesystem: &str, path: &str, recursive: bool) -> Result<()> {
        let wire = wire_path(filesystem, path);

        let response = self
            .request(Request {
                method: Method::DELETE,
                path: &wire,
                query: &[("recursive".into(), recursive.to_string())],
                ms_headers: &[],
                if_none_match: "",
                body: None,
                content_type: "",
            })
            .await?;

        // Delete-if-exists: a target that is already gone is success
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(());
        }
        expect_success(response).await?;
        Ok(())
    }

    async fn request(&self, req: Request<'_>) -> Result<Response> {
        let mut ms_headers = BTreeMap::new();
        ms_headers.insert(
            "x-ms-date".to_string(),
            SharedKeySigner::format_date(Utc::now()),
        );
        ms_headers.insert("x-ms-version".to_string(), API_VERSION.to_string());
        for (name, value) in req.ms_headers {
            ms_headers.insert(name.to_string(), value.clone());
        }

        let content_length = req.body.as_ref().map(|b| b.len()).unwrap_or(0);
        let authorization = self.signer.authorization(&CanonicalRequest {
            method: req.method.as_str(),
            path: req.path,
            query: req.query,
            ms_headers: &ms_headers,
            content_length,
            content_type: req.content_type,
            if_none_match: req.if_none_match,
        });

        let mut url = format!("{}{}", self.endpoint, req.path);
        if !req.query.is_empty() {
            url.push('?');
            let pairs: Vec<String> = req
                .query
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect();
            url.push_str(&pairs.join("&"));
        }

        let mut builder = self
            .http
            .request(req.method, &url)
            .header("Authorization", authorization);
        for (name, value) in &ms_headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !req.content_type.is_empty() {
            builder = builder.header("Content-Type", req.content_type);
        }
        if !req.if_none_match.is_empty() {
            builder = builder.header("If-None-Match", req.if_none_match);
        }
        if let Some(body) = req.body {
            builder = builder.header("Content-Length", content_length).body(body);
        }

        builder
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))
    }
}

impl std::fmt::Debug for DataLakeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataLakeClient")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

struct Request<'a> {
    method: Method,
    /// Encoded wire path, leading slash
    path: &'a str,
    query: &'a [(String, String)],
    ms_headers: &'a [(&'a str, String)],
    if_none_match: &'a str,
    body: Option<Bytes>,
    content_type: &'a str,
}

async fn expect_success(response: Response) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    Err(Error::TransferFailed { status, message })
}

/// Encode a logical path for the wire, segment by segment
fn encode_path(path: &str) -> String {
    let mut out = String::new();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        out.push('/');
        out.push_str(&encode_segment(segment));
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}

fn wire_path(filesystem: &str, path: &str) -> String {
    format!("/{}{}", encode_segment(filesystem), encode_path(path))
}

fn encode_segment(segment: &str) -> String {
    // NON_ALPHANUMERIC also hits the unreserved marks; put those back
    utf8_percent_encode(segment, NON_ALPHANUMERIC)
        .to_string()
        .replace("%2E", ".")
        .replace("%2D", "-")
        .replace("%5F", "_")
        .replace("%7E", "~")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_path_plain() {
        assert_eq!(encode_path("/container/dir/file.txt"), "/container/dir/file.txt");
    }

    #[test]
    fn test_encode_path_special_chars() {
        assert_eq!(encode_path("/c/dir one/bé.txt"), "/c/dir%20one/b%C3%A9.txt");
    }

    #[test]
    fn test_encode_path_root() {
        assert_eq!(encode_path("/"), "/");
        assert_eq!(encode_path(""), "/");
    }

    #[test]
    fn test_wire_path_prefixes_filesystem() {
        assert_eq!(wire_path("backup", "/c/a.txt"), "/backup/c/a.txt");
    }

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
    }
}
