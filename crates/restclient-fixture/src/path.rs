//! Pure URL-to-filename rules for fixture lookup.
//!
//! Everything here works on the URL portion of a fixture path only. The
//! root directory, service name and namespace are joined on afterwards.

/// Characters that cannot appear in fixture filenames on every platform.
const RESERVED: &[char] = &[
    '?', '|', '<', '>', '=', ':', '*', ',', ';', '+', '&', '"', '@', '$',
];

/// Suffix of header sidecar files.
pub const HEADER_SUFFIX: &str = ".http-headers";

/// Replaces reserved characters with `_`.
pub fn platform_safe(s: &str) -> String {
    s.chars()
        .map(|c| if RESERVED.contains(&c) { '_' } else { c })
        .collect()
}

/// Percent-decodes `s`. Invalid escapes are kept; invalid UTF-8 is replaced.
pub fn unquote(s: &str) -> String {
    String::from_utf8_lossy(&urlencoding::decode_binary(s.as_bytes())).into_owned()
}

/// The eight candidate spellings of `url`, in lookup order: safe, safe +
/// `index.html`, raw, raw + `index.html`, then the same four after decoding.
pub fn path_variants(url: &str) -> Vec<String> {
    let decoded = unquote(url);
    let mut variants: Vec<String> = Vec::with_capacity(8);
    for spelling in [platform_safe(url), url.to_string(), platform_safe(&decoded), decoded] {
        let index = format!("{spelling}/index.html");
        for candidate in [spelling, index] {
            if !variants.contains(&candidate) {
                variants.push(candidate);
            }
        }
    }
    variants
}

/// The directory (relative to the namespace root) searched for query
/// permutations, ending in `/`.
pub fn permutation_dir(url: &str) -> String {
    let safe = platform_safe(url);
    match safe.rfind('/') {
        Some(idx) => safe[..=idx].to_string(),
        None => "/".to_string(),
    }
}

/// The final path segment before `?` and its decoded, made-safe parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTarget {
    pub base: String,
    pub params: Vec<String>,
}

impl QueryTarget {
    /// Returns `None` when the last path segment has no query string.
    pub fn parse(url: &str) -> Option<Self> {
        let last = url.rsplit('/').next().unwrap_or(url);
        let mut parts = last.split('?');
        let base = parts.next()?.to_string();
        let query = parts.next()?;
        let params = query
            .split('&')
            .map(|param| platform_safe(&unquote(param)))
            .collect();
        Some(Self { base, params })
    }
}

fn char_len(s: &str) -> i64 {
    unquote(s).chars().count() as i64
}

/// Selects the directory entries that could answer `url`.
///
/// A name qualifies when it is (or is not, per `headers`) a sidecar, has
/// the exact length left after removing the directory from the requested
/// path, starts with the final path segment and contains every parameter.
pub fn permutation_candidates<'a>(url: &str, names: &'a [String], headers: bool) -> Vec<&'a str> {
    let Some(target) = QueryTarget::parse(url) else {
        return Vec::new();
    };
    let requested = if headers {
        format!("{url}{HEADER_SUFFIX}")
    } else {
        url.to_string()
    };
    let expected_len = char_len(&requested) - char_len(&permutation_dir(url));

    names
        .iter()
        .map(String::as_str)
        .filter(|name| name.contains(HEADER_SUFFIX) == headers)
        .filter(|name| char_len(name) == expected_len)
        .filter(|name| name.starts_with(&target.base))
        .filter(|name| target.params.iter().all(|param| name.contains(param.as_str())))
        .collect()
}
