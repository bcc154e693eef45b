use crate::path::{path_variants, permutation_candidates, permutation_dir, HEADER_SUFFIX};
use crate::roots::FixtureRoots;
use crate::sidecar;
use bytes::Bytes;
use futures::future::BoxFuture;
use http::HeaderMap;
use restclient_core::{Backend, BackendKind, Context, DaoError, Request, Response};
use std::path::{Path, PathBuf};

/// Directory under `<root>/<service>/` that holds fixture files.
pub const NAMESPACE: &str = "file";

/// Answers requests from recorded files.
///
/// Files live at `<root>/<service>/file/<url-path>`, searched across the
/// registered roots first and then the service's own roots. The first root
/// giving a non-404 answer wins. Results (including misses) are memoized in
/// the context's request-scoped cache under `"{service}-{url}"`.
#[derive(Debug, Clone)]
pub struct FixtureBackend {
    service: String,
    roots: FixtureRoots,
    service_paths: Vec<PathBuf>,
}

impl FixtureBackend {
    pub fn new(service: impl Into<String>, roots: FixtureRoots, service_paths: Vec<PathBuf>) -> Self {
        Self {
            service: service.into(),
            roots,
            service_paths,
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Registered roots followed by the service's own roots.
    pub fn search_paths(&self) -> Vec<PathBuf> {
        let mut paths = self.roots.snapshot();
        paths.extend(self.service_paths.iter().cloned());
        paths
    }

    /// Resolves `url` against every search path.
    pub async fn load_url(&self, ctx: &Context, url: &str) -> Result<Response, DaoError> {
        let memo_key = format!("{}-{}", self.service, url);
        if let Some(response) = ctx.local_cache().get(&memo_key) {
            tracing::trace!(service = %self.service, url, "fixture memo hit");
            return Ok(response);
        }

        for root in self.search_paths() {
            if let Some(response) = self.load_from_root(&root, url).await? {
                if response.status != 404 {
                    ctx.local_cache().insert(memo_key, response.clone());
                    return Ok(response);
                }
            }
        }

        tracing::debug!(service = %self.service, url, "no fixture found");
        let response = Response::not_found();
        ctx.local_cache().insert(memo_key, response.clone());
        Ok(response)
    }

    /// Resolves `url` under one root. `None` means no body file exists there.
    async fn load_from_root(&self, root: &Path, url: &str) -> Result<Option<Response>, DaoError> {
        let url = if url.starts_with('/') {
            url.to_string()
        } else {
            format!("/{url}")
        };
        let base = format!(
            "{}/{}/{}",
            root.to_string_lossy().trim_end_matches('/'),
            self.service,
            NAMESPACE
        );

        let mut body = read_first(&base, &url).await;
        let mut headers = None;
        let mut status = None;
        if let Some(data) = read_first(&base, &format!("{url}{HEADER_SUFFIX}")).await {
            if let Some((parsed, parsed_status)) = self.read_sidecar(&data) {
                headers = Some(parsed);
                status = parsed_status;
            }
        }

        // Permutations are searched even after a literal hit so that
        // ambiguous fixture trees always fail.
        if url.contains('?') {
            let dir = PathBuf::from(format!("{base}{}", permutation_dir(&url)));
            let names = list_files(&dir).await;

            // A unique permutation replaces a missing body or a literal 404.
            let permuted = unique_match(&url, &names, false)?;
            if body.is_none() || status == Some(404) {
                if let Some(name) = permuted {
                    if let Some(data) = read(&dir.join(name)).await {
                        body = Some(data);
                        status = None;
                    }
                }
            }

            let permuted_headers = unique_match(&url, &names, true)?;
            if headers.is_none() {
                if let Some(name) = permuted_headers {
                    if let Some(data) = read(&dir.join(name)).await {
                        if let Some((parsed, parsed_status)) = self.read_sidecar(&data) {
                            headers = Some(parsed);
                            status = parsed_status.or(status);
                        }
                    }
                }
            }
        }

        let Some(body) = body else {
            return Ok(None);
        };
        Ok(Some(Response {
            status: status.unwrap_or(200),
            headers: headers.unwrap_or_default(),
            body,
            ..Response::default()
        }))
    }

    fn read_sidecar(&self, data: &[u8]) -> Option<(HeaderMap, Option<u16>)> {
        match sidecar::parse(&self.service, data) {
            Ok(parsed) => Some((parsed.headers, parsed.status)),
            Err(e) => {
                tracing::debug!(service = %self.service, error = %e, "ignoring unreadable header sidecar");
                None
            }
        }
    }
}

fn unique_match<'a>(url: &str, names: &'a [String], headers: bool) -> Result<Option<&'a str>, DaoError> {
    let candidates = permutation_candidates(url, names, headers);
    match candidates.as_slice() {
        [] => Ok(None),
        [only] => Ok(Some(*only)),
        _ => Err(DaoError::AmbiguousFixture {
            url: url.to_string(),
        }),
    }
}

async fn read(path: &Path) -> Option<Bytes> {
    tokio::fs::read(path).await.ok().map(Bytes::from)
}

async fn read_first(base: &str, url: &str) -> Option<Bytes> {
    for variant in path_variants(url) {
        if let Some(data) = read(Path::new(&format!("{base}{variant}"))).await {
            return Some(data);
        }
    }
    None
}

async fn list_files(dir: &Path) -> Vec<String> {
    let Ok(mut entries) = tokio::fs::read_dir(dir).await else {
        return Vec::new();
    };
    let mut names = Vec::new();
    while let Ok(Some(entry)) = entries.next_entry().await {
        let is_file = tokio::fs::metadata(entry.path())
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        if let (true, Some(name)) = (is_file, entry.file_name().to_str()) {
            names.push(name.to_string());
        }
    }
    names
}

impl Backend for FixtureBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Mock
    }

    fn load<'a>(
        &'a self,
        ctx: &'a Context,
        request: &'a Request,
    ) -> BoxFuture<'a, Result<Response, DaoError>> {
        Box::pin(self.load_url(ctx, &request.url))
    }
}
