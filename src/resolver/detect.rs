// src/resolver/detect.rs
// =============================================================================
// Resolves one absolute URL to the file type that is really behind it.
//
// How it works:
// 1. GET the URL, read only the first few hundred bytes, match signatures
// 2. Known type? Done.
// 3. Otherwise assume we hit a "redirecting, please wait" page: GET it again
//    (joined against the portal host), look for
//        window.parent.location.href='<target>';
//    and sniff <target> the same way.
// 4. Anything going wrong ends in FileType::Unknown with an error message.
//
// Only ONE client-side hop is followed. A target that is itself a shim comes
// back as unknown.
// =============================================================================

use std::sync::LazyLock;

use regex::Regex;
use reqwest::{Client, Response};
use tracing::{debug, warn};
use url::Url;

use super::link::Detection;
use super::signature::FileType;
use crate::config::ScrapeConfig;
use crate::error::ResolveError;

// Narrow heuristic: matches the one snippet the portal's shim pages use.
static CLIENT_REDIRECT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"window\.parent\.location\.href='(.*?)';").unwrap());

/// A failed second stage, with the furthest URL we got to.
struct ShimFailure {
    url: Url,
    error: ResolveError,
}

/// Classifies links by content, following one level of client-side redirect.
#[derive(Debug, Clone)]
pub struct LinkResolver {
    client: Client,
    fallback_host: Url,
    sniff_len: usize,
}

impl LinkResolver {
    pub fn new(client: Client, config: &ScrapeConfig) -> Self {
        Self {
            client,
            fallback_host: config.fallback_host.clone(),
            sniff_len: config.sniff_len,
        }
    }

    // Detects the file type behind a link
    //
    // Parameters:
    //   url: absolute URL of the link
    //
    // Returns: a Detection with the type and the URL the type was found at.
    // Never fails: every problem ends up in Detection::error with an
    // Unknown type.
    pub async fn detect(&self, url: &Url) -> Detection {
        // Step 1: the link itself
        match self.sniff(url).await {
            Ok(file_type) if file_type.is_known() => {
                debug!(%url, %file_type, "classified directly");
                return Detection::found(file_type, url);
            }
            Ok(_) => debug!(%url, "no signature match, trying redirect page"),
            Err(e) => warn!("first request failed for {}: {}", url, e),
        }

        // Step 2: maybe it was a redirect page
        match self.follow_client_redirect(url).await {
            Ok((file_type, target)) => {
                debug!(%url, %target, %file_type, "classified through client redirect");
                Detection::found(file_type, &target)
            }
            Err(failure) => {
                debug!(%url, error = %failure.error, "giving up");
                Detection::failed(&failure.url, failure.error)
            }
        }
    }

    /// GETs `url` and classifies the first `sniff_len` bytes of the body.
    async fn sniff(&self, url: &Url) -> Result<FileType, ResolveError> {
        let response = self.get(url).await?;
        let head = read_prefix(response, self.sniff_len)
            .await
            .map_err(|e| ResolveError::network(url, e))?;
        Ok(FileType::sniff(&head))
    }

    async fn follow_client_redirect(&self, url: &Url) -> Result<(FileType, Url), ShimFailure> {
        let shim_url = self.fallback_host.join(url.as_str()).map_err(|source| ShimFailure {
            url: url.clone(),
            error: ResolveError::InvalidUrl {
                url: url.to_string(),
                source,
            },
        })?;

        let response = self.get(&shim_url).await.map_err(|error| ShimFailure {
            url: shim_url.clone(),
            error,
        })?;
        // Join against where HTTP redirects left us, not where we started
        let current = response.url().clone();
        let body = response.text().await.map_err(|e| ShimFailure {
            url: current.clone(),
            error: ResolveError::network(&current, e),
        })?;

        let Some(target) = CLIENT_REDIRECT_RE.captures(&body).and_then(|c| c.get(1)) else {
            return Err(ShimFailure {
                error: ResolveError::RedirectNotFound {
                    url: current.to_string(),
                },
                url: current,
            });
        };

        let target = current.join(target.as_str()).map_err(|source| ShimFailure {
            url: current.clone(),
            error: ResolveError::InvalidUrl {
                url: target.as_str().to_string(),
                source,
            },
        })?;
        debug!(%shim_url, %target, "found client redirect");

        match self.sniff(&target).await {
            Ok(file_type) if file_type.is_known() => Ok((file_type, target)),
            Ok(_) => Err(ShimFailure {
                error: ResolveError::ClassificationUnknown {
                    url: target.to_string(),
                },
                url: target,
            }),
            Err(error) => {
                warn!("failed to fetch redirected URL {}: {}", target, error);
                Err(ShimFailure { url: target, error })
            }
        }
    }

    async fn get(&self, url: &Url) -> Result<Response, ResolveError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ResolveError::network(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::status(url, status));
        }
        Ok(response)
    }
}

/// Reads at most `limit` bytes of the body, then drops the response so the
/// rest of a large document is never downloaded.
async fn read_prefix(mut response: Response, limit: usize) -> Result<Vec<u8>, reqwest::Error> {
    let mut head = Vec::with_capacity(limit);
    while head.len() < limit {
        match response.chunk().await? {
            Some(chunk) => head.extend_from_slice(&chunk),
            None => break,
        }
    }
    head.truncate(limit);
    Ok(head)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PDF_BYTES: &[u8] = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n1 0 obj";

    fn resolver_for(server: &MockServer) -> LinkResolver {
        let config = ScrapeConfig::default()
            .with_fallback_host(&server.uri())
            .unwrap();
        LinkResolver::new(config.build_client().unwrap(), &config)
    }

    // Lower-case doctype: matches no signature, like the portal's shim pages
    fn shim_page(target: &str) -> String {
        format!(
            "<!doctype html><html><head><script>window.parent.location.href='{}';</script></head>\
             <body>Please wait...</body></html>",
            target
        )
    }

    async fn mount_body(server: &MockServer, route: &str, body: impl AsRef<[u8]>) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.as_ref().to_vec()))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_detects_pdf_directly() {
        let server = MockServer::start().await;
        mount_body(&server, "/doc.pdf", PDF_BYTES).await;
        let url = Url::parse(&format!("{}/doc.pdf", server.uri())).unwrap();

        let detection = resolver_for(&server).detect(&url).await;

        assert_eq!(detection.file_type, FileType::Pdf);
        assert_eq!(detection.file_url, url.to_string());
        assert!(detection.error.is_none());
    }

    #[tokio::test]
    async fn test_signature_beats_content_type_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/download"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_bytes(PDF_BYTES.to_vec()),
            )
            .mount(&server)
            .await;
        let url = Url::parse(&format!("{}/download", server.uri())).unwrap();

        let detection = resolver_for(&server).detect(&url).await;
        assert_eq!(detection.file_type, FileType::Pdf);
    }

    #[tokio::test]
    async fn test_follows_one_client_redirect() {
        let server = MockServer::start().await;
        mount_body(&server, "/FileDownload", shim_page("/files/real.pdf")).await;
        mount_body(&server, "/files/real.pdf", PDF_BYTES).await;
        let url = Url::parse(&format!("{}/FileDownload", server.uri())).unwrap();

        let detection = resolver_for(&server).detect(&url).await;

        assert_eq!(detection.file_type, FileType::Pdf);
        assert_eq!(detection.file_url, format!("{}/files/real.pdf", server.uri()));
        assert!(detection.error.is_none());
    }

    #[tokio::test]
    async fn test_second_shim_is_not_followed() {
        let server = MockServer::start().await;
        mount_body(&server, "/first", shim_page("/second")).await;
        mount_body(&server, "/second", shim_page("/files/real.pdf")).await;
        mount_body(&server, "/files/real.pdf", PDF_BYTES).await;
        let url = Url::parse(&format!("{}/first", server.uri())).unwrap();

        let detection = resolver_for(&server).detect(&url).await;

        assert_eq!(detection.file_type, FileType::Unknown);
        assert_eq!(detection.file_url, format!("{}/second", server.uri()));
        assert!(detection.error.is_some());
    }

    #[tokio::test]
    async fn test_page_without_redirect_is_unknown() {
        let server = MockServer::start().await;
        mount_body(&server, "/about", "<!doctype html><p>About us</p>").await;
        let url = Url::parse(&format!("{}/about", server.uri())).unwrap();

        let detection = resolver_for(&server).detect(&url).await;

        assert_eq!(detection.file_type, FileType::Unknown);
        assert_eq!(detection.file_url, url.to_string());
        let error = detection.error.unwrap();
        assert!(error.contains("no client-side redirect"), "{error}");
    }

    #[tokio::test]
    async fn test_not_found_is_unknown_with_error() {
        let server = MockServer::start().await;
        let url = Url::parse(&format!("{}/missing.pdf", server.uri())).unwrap();

        let detection = resolver_for(&server).detect(&url).await;

        assert_eq!(detection.file_type, FileType::Unknown);
        assert!(detection.error.unwrap().contains("404"));
    }

    #[tokio::test]
    async fn test_connection_failure_is_unknown_with_error() {
        let server = MockServer::start().await;
        let resolver = resolver_for(&server);
        // Nothing listens on port 1
        let url = Url::parse("http://127.0.0.1:1/doc.pdf").unwrap();

        let detection = resolver.detect(&url).await;

        assert_eq!(detection.file_type, FileType::Unknown);
        assert_eq!(detection.file_url, url.to_string());
        assert!(detection.error.is_some());
    }

    #[tokio::test]
    async fn test_redirect_target_failure_keeps_target_url() {
        let server = MockServer::start().await;
        mount_body(&server, "/FileDownload", shim_page("/gone.pdf")).await;
        let url = Url::parse(&format!("{}/FileDownload", server.uri())).unwrap();

        let detection = resolver_for(&server).detect(&url).await;

        assert_eq!(detection.file_type, FileType::Unknown);
        assert_eq!(detection.file_url, format!("{}/gone.pdf", server.uri()));
        assert!(detection.error.unwrap().contains("404"));
    }

    #[tokio::test]
    async fn test_detect_is_idempotent() {
        let server = MockServer::start().await;
        mount_body(&server, "/FileDownload", shim_page("/files/real.pdf")).await;
        mount_body(&server, "/files/real.pdf", PDF_BYTES).await;
        let url = Url::parse(&format!("{}/FileDownload", server.uri())).unwrap();
        let resolver = resolver_for(&server);

        let first = resolver.detect(&url).await;
        let second = resolver.detect(&url).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_only_prefix_is_inspected() {
        let server = MockServer::start().await;
        let mut body = vec![b' '; 600];
        body.extend_from_slice(PDF_BYTES);
        mount_body(&server, "/padded", body).await;
        let url = Url::parse(&format!("{}/padded", server.uri())).unwrap();

        let detection = resolver_for(&server).detect(&url).await;
        assert_eq!(detection.file_type, FileType::Unknown);
    }
}
