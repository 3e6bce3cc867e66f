//! Locating companion resources: local paths, `file:` URLs and http(s) URLs.

use std::{
    ffi::OsString,
    fmt,
    fs::File,
    io::Read,
    path::{Component, Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use tracing::debug;
use url::Url;

use crate::error::ResourceError;

/// Where a resource lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceLocator {
    Path(PathBuf),
    Url(Url),
}

impl ResourceLocator {
    /// `file:` URLs become local paths; only http(s) stay as URLs.
    pub fn from_url(url: Url) -> Result<Self, ResourceError> {
        match url.scheme() {
            "file" => url
                .to_file_path()
                .map(Self::Path)
                .map_err(|_| ResourceError::invalid_locator(url.as_str(), "not a local file URL")),
            "http" | "https" => Ok(Self::Url(url)),
            scheme => Err(ResourceError::UnsupportedScheme {
                locator: url.to_string(),
                scheme: scheme.to_string(),
            }),
        }
    }

    /// The companion resource `<self>.<suffix>`.
    pub fn with_suffix(&self, suffix: &str) -> Self {
        let suffix = suffix.trim_start_matches('.');
        match self {
            Self::Path(path) => {
                let mut name: OsString = path.clone().into_os_string();
                name.push(".");
                name.push(suffix);
                Self::Path(PathBuf::from(name))
            }
            Self::Url(url) => {
                let mut url = url.clone();
                let path = format!("{}.{}", url.path(), suffix);
                url.set_path(&path);
                Self::Url(url)
            }
        }
    }

    /// Resolve a local path below `root`. URLs are returned unchanged; paths
    /// that would leave `root` (absolute, rooted, or with `..`) are rejected.
    pub fn resolve_against(self, root: &Path) -> Result<Self, ResourceError> {
        match self {
            Self::Path(path) => {
                let escapes = path.components().any(|c| {
                    matches!(
                        c,
                        Component::RootDir | Component::Prefix(_) | Component::ParentDir
                    )
                });
                if escapes {
                    return Err(ResourceError::invalid_locator(
                        path.display().to_string(),
                        format!("path escapes resource root {}", root.display()),
                    ));
                }
                Ok(Self::Path(root.join(path)))
            }
            url => Ok(url),
        }
    }

    /// Open the resource for reading. Blocks until the file is opened or the
    /// HTTP response headers arrive; `timeout` bounds the whole HTTP exchange.
    pub fn open(&self, timeout: Option<Duration>) -> Result<Box<dyn Read + Send>, ResourceError> {
        match self {
            Self::Path(path) => {
                let file = File::open(path).map_err(|e| ResourceError::io(self.to_string(), e))?;
                Ok(Box::new(file))
            }
            Self::Url(url) => {
                debug!("fetching {url}");
                let mut builder = reqwest::blocking::Client::builder();
                if let Some(timeout) = timeout {
                    builder = builder.timeout(timeout);
                }
                let client = builder
                    .build()
                    .map_err(|e| ResourceError::http(url.as_str(), e))?;
                let response = client
                    .get(url.clone())
                    .send()
                    .and_then(|r| r.error_for_status())
                    .map_err(|e| ResourceError::http(url.as_str(), e))?;
                Ok(Box::new(response))
            }
        }
    }
}

impl FromStr for ResourceLocator {
    type Err = ResourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ResourceError::invalid_locator(s, "empty locator"));
        }

        // `file:relative/path` is accepted as a relative local path; the url
        // crate would otherwise anchor it at the filesystem root.
        if let Some(rest) = s.strip_prefix("file:") {
            if !rest.starts_with('/') {
                return Ok(Self::Path(PathBuf::from(rest)));
            }
            let url = Url::parse(s).map_err(|e| ResourceError::invalid_locator(s, e))?;
            return Self::from_url(url);
        }

        if s.contains("://") {
            let url = Url::parse(s).map_err(|e| ResourceError::invalid_locator(s, e))?;
            return Self::from_url(url);
        }

        Ok(Self::Path(PathBuf::from(s)))
    }
}

impl From<PathBuf> for ResourceLocator {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for ResourceLocator {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl fmt::Display for ResourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{url}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_path() {
        let loc: ResourceLocator = "voices/DE_1234".parse().unwrap();
        assert_eq!(loc, ResourceLocator::Path(PathBuf::from("voices/DE_1234")));
    }

    #[test]
    fn test_parse_relative_file_url() {
        let loc: ResourceLocator = "file:src/test/DE_1234".parse().unwrap();
        assert_eq!(loc, ResourceLocator::Path(PathBuf::from("src/test/DE_1234")));
    }

    #[cfg(unix)]
    #[test]
    fn test_parse_absolute_file_url() {
        let loc: ResourceLocator = "file:///tmp/DE_1234".parse().unwrap();
        assert_eq!(loc, ResourceLocator::Path(PathBuf::from("/tmp/DE_1234")));
    }

    #[test]
    fn test_parse_http_url() {
        let loc: ResourceLocator = "https://example.org/corpus/DE_1234".parse().unwrap();
        assert!(matches!(loc, ResourceLocator::Url(_)));
        assert_eq!(loc.to_string(), "https://example.org/corpus/DE_1234");
    }

    #[test]
    fn test_parse_rejects_unsupported_scheme_and_empty() {
        let err = "ftp://example.org/DE_1234".parse::<ResourceLocator>().unwrap_err();
        assert!(matches!(err, ResourceError::UnsupportedScheme { ref scheme, .. } if scheme == "ftp"));

        let err = "   ".parse::<ResourceLocator>().unwrap_err();
        assert!(matches!(err, ResourceError::InvalidLocator { .. }));
    }

    #[test]
    fn test_with_suffix() {
        let path: ResourceLocator = "corpus/DE_1234".parse().unwrap();
        assert_eq!(
            path.with_suffix("cmp"),
            ResourceLocator::Path(PathBuf::from("corpus/DE_1234.cmp"))
        );
        assert_eq!(
            path.with_suffix(".json"),
            ResourceLocator::Path(PathBuf::from("corpus/DE_1234.json"))
        );

        let url: ResourceLocator = "http://example.org/a/DE_1234".parse().unwrap();
        assert_eq!(url.with_suffix("cmp").to_string(), "http://example.org/a/DE_1234.cmp");
    }

    #[test]
    fn test_resolve_against_root() {
        let root = Path::new("/srv/corpus");
        let loc: ResourceLocator = "DE_1234".parse().unwrap();
        assert_eq!(
            loc.resolve_against(root).unwrap(),
            ResourceLocator::Path(PathBuf::from("/srv/corpus/DE_1234"))
        );

        let url: ResourceLocator = "http://example.org/DE_1234".parse().unwrap();
        assert_eq!(url.clone().resolve_against(root).unwrap(), url);
    }

    #[test]
    fn test_resolve_against_root_rejects_escapes() {
        let root = Path::new("/srv/corpus");
        for id in ["/etc/passwd", "file:///etc/passwd", "corpus/../../etc/passwd"] {
            let loc: ResourceLocator = id.parse().unwrap();
            let err = loc.resolve_against(root).unwrap_err();
            assert!(matches!(err, ResourceError::InvalidLocator { .. }), "{id}: {err}");
        }
    }

    #[test]
    fn test_open_missing_file_is_io_error() {
        let loc = ResourceLocator::Path(PathBuf::from("does/not/exist.cmp"));
        let err = loc.open(None).err().unwrap();
        assert!(matches!(err, ResourceError::Io { .. }));
    }
}
