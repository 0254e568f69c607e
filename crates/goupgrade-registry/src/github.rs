use anyhow::{anyhow, Context, Result};
use goupgrade_core::TreeEntry;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::ReleaseListing;

pub const GITHUB_API_BASE: &str = "https://api.github.com";
pub const GOLANG_DL_OWNER: &str = "golang";
pub const GOLANG_DL_REPO: &str = "dl";
pub const GOLANG_DL_BRANCH: &str = "master";

const GITHUB_ACCEPT: &str = "application/vnd.github+json";

#[derive(Debug, Deserialize)]
struct GitRefResponse {
    object: GitRefObject,
}

#[derive(Debug, Deserialize)]
struct GitRefObject {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct GitTreeResponse {
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

/// Reads the shallow tree at the head of a branch through the GitHub git
/// data API.
#[derive(Debug, Clone)]
pub struct GithubTreeClient {
    client: Client,
    owner: String,
    repo: String,
    branch: String,
    token: Option<String>,
}

impl GithubTreeClient {
    pub fn new(
        client: Client,
        owner: impl Into<String>,
        repo: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        Self {
            client,
            owner: owner.into(),
            repo: repo.into(),
            branch: branch.into(),
            token: None,
        }
    }

    /// Client for `github.com/golang/dl`, whose top-level folders are named
    /// after every published release.
    pub fn golang_dl(client: Client) -> Self {
        Self::new(client, GOLANG_DL_OWNER, GOLANG_DL_REPO, GOLANG_DL_BRANCH)
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|value| !value.trim().is_empty());
        self
    }

    pub fn ref_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/git/ref/heads/{}",
            GITHUB_API_BASE, self.owner, self.repo, self.branch
        )
    }

    pub fn tree_url(&self, sha: &str) -> String {
        format!(
            "{}/repos/{}/{}/git/trees/{}",
            GITHUB_API_BASE, self.owner, self.repo, sha
        )
    }

    fn repository(&self) -> String {
        format!("github.com/{}/{}", self.owner, self.repo)
    }

    pub fn head_commit_sha(&self) -> Result<String> {
        let body = self.get_text(&self.ref_url()).with_context(|| {
            format!(
                "error getting `refs/heads/{}` from `{}`",
                self.branch,
                self.repository()
            )
        })?;
        parse_ref_response(&body).with_context(|| {
            format!(
                "error reading `refs/heads/{}` from `{}`",
                self.branch,
                self.repository()
            )
        })
    }

    pub fn tree(&self, sha: &str) -> Result<Vec<TreeEntry>> {
        self.get_text(&self.tree_url(sha))
            .and_then(|body| parse_tree_response(&body))
            .with_context(|| format!("error reading tree from `{}`", self.repository()))
    }

    fn get_text(&self, url: &str) -> Result<String> {
        debug!(url, "requesting");
        let mut request = self.client.get(url).header(ACCEPT, GITHUB_ACCEPT);
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        let response = request
            .send()
            .with_context(|| format!("request to {url} failed"))?;
        let status = response.status();
        let body = response
            .text()
            .with_context(|| format!("failed reading response body from {url}"))?;
        if !status.is_success() {
            return Err(anyhow!(
                "{url} answered with http status {status}: {}",
                body.trim()
            ));
        }
        Ok(body)
    }
}

impl ReleaseListing for GithubTreeClient {
    fn list_entries(&self) -> Result<Vec<TreeEntry>> {
        let sha = self.head_commit_sha()?;
        debug!(sha = %sha, branch = %self.branch, "resolved branch head");
        self.tree(&sha)
    }
}

pub fn parse_ref_response(body: &str) -> Result<String> {
    let parsed: GitRefResponse = parse_json(body, "git reference")?;
    let sha = parsed.object.sha.trim();
    if sha.is_empty() {
        return Err(anyhow!("git reference points at an empty sha"));
    }
    Ok(sha.to_string())
}

pub fn parse_tree_response(body: &str) -> Result<Vec<TreeEntry>> {
    let parsed: GitTreeResponse = parse_json(body, "git tree")?;
    if parsed.truncated {
        warn!("tree listing was truncated by the server; some versions may be missing");
    }
    Ok(parsed.tree)
}

fn parse_json<T: DeserializeOwned>(body: &str, what: &str) -> Result<T> {
    serde_json::from_str(body).with_context(|| format!("failed to parse {what} response"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> GithubTreeClient {
        GithubTreeClient::golang_dl(Client::new())
    }

    #[test]
    fn builds_git_data_urls() {
        let client = test_client();
        assert_eq!(
            client.ref_url(),
            "https://api.github.com/repos/golang/dl/git/ref/heads/master"
        );
        assert_eq!(
            client.tree_url("abc123"),
            "https://api.github.com/repos/golang/dl/git/trees/abc123"
        );
    }

    #[test]
    fn blank_token_is_ignored() {
        let client = test_client().with_token(Some("  ".to_string()));
        assert!(client.token.is_none());
        let client = test_client().with_token(Some("ghp_x".to_string()));
        assert_eq!(client.token.as_deref(), Some("ghp_x"));
    }

    #[test]
    fn parses_ref_object_sha() {
        let body = r#"{
  "ref": "refs/heads/master",
  "node_id": "MDM6UmVmcmVmcy9oZWFkcy9tYXN0ZXI=",
  "url": "https://api.github.com/repos/golang/dl/git/refs/heads/master",
  "object": {
    "sha": "7e4bd8f0b8e1b6d1b2d3c4e5f60718293a4b5c6d",
    "type": "commit",
    "url": "https://api.github.com/repos/golang/dl/git/commits/7e4bd8f0"
  }
}"#;
        let sha = parse_ref_response(body).expect("ref must parse");
        assert_eq!(sha, "7e4bd8f0b8e1b6d1b2d3c4e5f60718293a4b5c6d");
    }

    #[test]
    fn rejects_ref_without_sha() {
        let err = parse_ref_response(r#"{"object":{"sha":""}}"#).expect_err("empty sha");
        assert!(err.to_string().contains("empty sha"));

        parse_ref_response(r#"{"message":"Not Found"}"#).expect_err("missing object");
    }

    #[test]
    fn parses_tree_entries() {
        let body = r#"{
  "sha": "7e4bd8f0",
  "tree": [
    {"path": ".gitignore", "mode": "100644", "type": "blob", "sha": "a1"},
    {"path": "go1.21.0", "mode": "040000", "type": "tree", "sha": "b2"},
    {"path": "gotip", "mode": "040000", "type": "tree", "sha": "c3"}
  ],
  "truncated": false
}"#;
        let entries = parse_tree_response(body).expect("tree must parse");
        assert_eq!(
            entries,
            vec![
                TreeEntry::new(".gitignore", "blob"),
                TreeEntry::directory("go1.21.0"),
                TreeEntry::directory("gotip"),
            ]
        );
    }

    #[test]
    fn rejects_malformed_tree() {
        let err = parse_tree_response("not json").expect_err("must fail");
        assert!(err.to_string().contains("git tree"));
    }
}
