//! The outbound HTTP seam.
//!
//! Adapters only ever issue GETs and look at the status, a header or two, and
//! the body text, so the client is reduced to exactly that. [`ReqwestClient`]
//! is the production implementation.

use std::{future::Future, time::Duration};

use reqwest::Client;

use crate::{
  config::HttpSettings,
  error::{Error, FetchError, Result},
};

// ─── Request / response ──────────────────────────────────────────────────────

/// A GET request: URL, query pairs and extra headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpRequest {
  pub url:     String,
  pub query:   Vec<(String, String)>,
  pub headers: Vec<(String, String)>,
}

impl HttpRequest {
  pub fn get(url: impl Into<String>) -> Self {
    Self { url: url.into(), ..Default::default() }
  }

  pub fn query(mut self, name: &str, value: impl ToString) -> Self {
    self.query.push((name.to_owned(), value.to_string()));
    self
  }

  pub fn header(mut self, name: &str, value: impl ToString) -> Self {
    self.headers.push((name.to_owned(), value.to_string()));
    self
  }

  /// The value of query parameter `name`, if set.
  pub fn query_value(&self, name: &str) -> Option<&str> {
    self
      .query
      .iter()
      .find(|(n, _)| n == name)
      .map(|(_, v)| v.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
  pub status:  u16,
  /// Header names are lowercase.
  pub headers: Vec<(String, String)>,
  pub body:    String,
}

impl HttpResponse {
  pub fn new(status: u16, body: impl Into<String>) -> Self {
    Self { status, headers: Vec::new(), body: body.into() }
  }

  pub fn with_header(mut self, name: &str, value: &str) -> Self {
    self.headers.push((name.to_ascii_lowercase(), value.to_owned()));
    self
  }

  pub fn header(&self, name: &str) -> Option<&str> {
    self
      .headers
      .iter()
      .find(|(n, _)| n.eq_ignore_ascii_case(name))
      .map(|(_, v)| v.as_str())
  }

  pub fn is_success(&self) -> bool { (200..300).contains(&self.status) }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Issue a GET and hand back status, headers, and body.
///
/// Only transport failures are errors here; a 500 is a successful exchange
/// whose status the adapter inspects.
pub trait HttpClient: Send + Sync {
  fn get<'a>(
    &'a self,
    request: &'a HttpRequest,
  ) -> impl Future<Output = Result<HttpResponse, FetchError>> + Send + 'a;
}

// ─── reqwest ─────────────────────────────────────────────────────────────────

/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ReqwestClient {
  client: Client,
}

impl ReqwestClient {
  pub fn new(settings: &HttpSettings) -> Result<Self> {
    let client = Client::builder()
      .user_agent(&settings.user_agent)
      .timeout(Duration::from_secs(settings.timeout_secs))
      .build()
      .map_err(|e| Error::configuration(format!("failed to build HTTP client: {e}")))?;
    Ok(Self { client })
  }
}

impl HttpClient for ReqwestClient {
  async fn get(&self, request: &HttpRequest) -> Result<HttpResponse, FetchError> {
    let mut builder = self.client.get(&request.url).query(&request.query);
    for (name, value) in &request.headers {
      builder = builder.header(name.as_str(), value.as_str());
    }

    let resp = builder
      .send()
      .await
      .map_err(|e| FetchError::transport(&request.url, e))?;

    let status = resp.status().as_u16();
    let headers = resp
      .headers()
      .iter()
      .filter_map(|(name, value)| {
        value
          .to_str()
          .ok()
          .map(|v| (name.as_str().to_owned(), v.to_owned()))
      })
      .collect();
    let body = resp
      .text()
      .await
      .map_err(|e| FetchError::transport(&request.url, e))?;

    Ok(HttpResponse { status, headers, body })
  }
}

// ─── Test double ─────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod stub {
  use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
  };

  use super::*;

  #[derive(Default)]
  struct State {
    responses: VecDeque<Result<HttpResponse, FetchError>>,
    requests:  Vec<HttpRequest>,
  }

  /// Replays queued responses in order and records every request.
  ///
  /// Clones share the same queue, so a test can keep one handle while the
  /// adapter owns another.
  #[derive(Clone, Default)]
  pub struct StubClient {
    state: Arc<Mutex<State>>,
  }

  impl StubClient {
    pub fn new() -> Self { Self::default() }

    pub fn respond(&self, status: u16, body: impl Into<String>) -> &Self {
      self.respond_with(HttpResponse::new(status, body))
    }

    pub fn respond_with(&self, response: HttpResponse) -> &Self {
      self.state.lock().unwrap().responses.push_back(Ok(response));
      self
    }

    pub fn fail(&self, error: FetchError) -> &Self {
      self.state.lock().unwrap().responses.push_back(Err(error));
      self
    }

    pub fn requests(&self) -> Vec<HttpRequest> { self.state.lock().unwrap().requests.clone() }
  }

  impl HttpClient for StubClient {
    async fn get(&self, request: &HttpRequest) -> Result<HttpResponse, FetchError> {
      let mut state = self.state.lock().unwrap();
      state.requests.push(request.clone());
      state
        .responses
        .pop_front()
        .unwrap_or_else(|| Err(FetchError::transport(&request.url, "no response stubbed")))
    }
  }
}
