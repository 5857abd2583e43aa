//! Worker endpoint resolution
//!
//! Users paste the worker URL with or without the trailing `/run` segment.
//! [`Endpoints::resolve`] normalizes that string once, and every later call
//! for an execution derives its URL from the resolved root.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const RUN_SEGMENT: &str = "/run";

/// URL-template generation of the remote API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiVariant {
    /// `{root}/run/{id}`, `{root}/run/{id}/files`, `{root}/run/{id}/files/{name}`
    #[default]
    Legacy,
    /// `{root}/runs/{id}/detail`, `{root}/runs/{id}/file/listed`, `{root}/runs/{id}/file/{name}`
    Detail,
}

#[derive(Debug, Error)]
#[error("unknown API variant '{0}', expected 'legacy' or 'detail'")]
pub struct UnknownVariant(pub String);

impl FromStr for ApiVariant {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "legacy" | "a" => Ok(ApiVariant::Legacy),
            "detail" | "b" => Ok(ApiVariant::Detail),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

impl fmt::Display for ApiVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiVariant::Legacy => f.write_str("legacy"),
            ApiVariant::Detail => f.write_str("detail"),
        }
    }
}

/// Resolved endpoint set for one worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    variant: ApiVariant,
    root: String,
    submit: String,
}

impl Endpoints {
    /// Normalize a user-supplied worker URL.
    ///
    /// Exactly one trailing slash is stripped. A trailing `/run` marks the
    /// string as the submit endpoint itself. The URL is not validated here;
    /// a malformed value fails on first use in the transport.
    pub fn resolve(raw_url: &str, variant: ApiVariant) -> Self {
        let url = raw_url.strip_suffix('/').unwrap_or(raw_url);

        let (root, submit) = match url.strip_suffix(RUN_SEGMENT) {
            Some(root) => (root.to_string(), url.to_string()),
            None => (url.to_string(), format!("{}{}", url, RUN_SEGMENT)),
        };

        Self {
            variant,
            root,
            submit,
        }
    }

    pub fn variant(&self) -> ApiVariant {
        self.variant
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn submit(&self) -> &str {
        &self.submit
    }

    pub fn status(&self, execution_id: &str) -> String {
        match self.variant {
            ApiVariant::Legacy => format!("{}/run/{}", self.root, execution_id),
            ApiVariant::Detail => format!("{}/runs/{}/detail", self.root, execution_id),
        }
    }

    pub fn list_files(&self, execution_id: &str) -> String {
        match self.variant {
            ApiVariant::Legacy => format!("{}/run/{}/files", self.root, execution_id),
            ApiVariant::Detail => {
                format!("{}/runs/{}/file/listed?limit=100", self.root, execution_id)
            }
        }
    }

    /// File names are embedded as-is; reserved characters are left to the transport.
    pub fn download_file(&self, execution_id: &str, file_name: &str) -> String {
        match self.variant {
            ApiVariant::Legacy => {
                format!("{}/run/{}/files/{}", self.root, execution_id, file_name)
            }
            ApiVariant::Detail => {
                format!("{}/runs/{}/file/{}", self.root, execution_id, file_name)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Case {
        raw: &'static str,
        root: &'static str,
        submit: &'static str,
    }

    const CASES: &[Case] = &[
        Case {
            raw: "https://api.example.com/w/abc",
            root: "https://api.example.com/w/abc",
            submit: "https://api.example.com/w/abc/run",
        },
        Case {
            raw: "https://api.example.com/w/abc/",
            root: "https://api.example.com/w/abc",
            submit: "https://api.example.com/w/abc/run",
        },
        Case {
            raw: "https://api.example.com/w/abc/run",
            root: "https://api.example.com/w/abc",
            submit: "https://api.example.com/w/abc/run",
        },
        Case {
            raw: "https://api.example.com/w/abc/run/",
            root: "https://api.example.com/w/abc",
            submit: "https://api.example.com/w/abc/run",
        },
        Case {
            raw: "https://api.example.com/w/runner",
            root: "https://api.example.com/w/runner",
            submit: "https://api.example.com/w/runner/run",
        },
        Case {
            raw: "api.example.com",
            root: "api.example.com",
            submit: "api.example.com/run",
        },
    ];

    #[test]
    fn test_resolve_table() {
        for variant in [ApiVariant::Legacy, ApiVariant::Detail] {
            for case in CASES {
                let endpoints = Endpoints::resolve(case.raw, variant);
                assert_eq!(endpoints.root(), case.root, "root for {}", case.raw);
                assert_eq!(endpoints.submit(), case.submit, "submit for {}", case.raw);
            }
        }
    }

    #[test]
    fn test_run_suffix_is_idempotent() {
        for root in ["https://x.io/worker", "https://x.io/worker/"] {
            let stripped = root.strip_suffix('/').unwrap_or(root);
            let with_run = format!("{}/run", stripped);
            let with_run_slash = format!("{}/run/", stripped);

            for variant in [ApiVariant::Legacy, ApiVariant::Detail] {
                assert_eq!(
                    Endpoints::resolve(&with_run, variant),
                    Endpoints::resolve(root, variant)
                );
                assert_eq!(
                    Endpoints::resolve(&with_run_slash, variant),
                    Endpoints::resolve(root, variant)
                );
            }
        }
    }

    #[test]
    fn test_only_one_trailing_slash_is_stripped() {
        let endpoints = Endpoints::resolve("https://x.io/w//", ApiVariant::Legacy);
        assert_eq!(endpoints.root(), "https://x.io/w/");
        assert_eq!(endpoints.submit(), "https://x.io/w//run");
    }

    #[test]
    fn test_legacy_paths() {
        let endpoints = Endpoints::resolve("https://x.io/w/run", ApiVariant::Legacy);
        assert_eq!(endpoints.status("E1"), "https://x.io/w/run/E1");
        assert_eq!(endpoints.list_files("E1"), "https://x.io/w/run/E1/files");
        assert_eq!(
            endpoints.download_file("E1", "out.pdf"),
            "https://x.io/w/run/E1/files/out.pdf"
        );
    }

    #[test]
    fn test_detail_paths() {
        let endpoints = Endpoints::resolve("https://x.io/w", ApiVariant::Detail);
        assert_eq!(endpoints.submit(), "https://x.io/w/run");
        assert_eq!(endpoints.status("E1"), "https://x.io/w/runs/E1/detail");
        assert_eq!(
            endpoints.list_files("E1"),
            "https://x.io/w/runs/E1/file/listed?limit=100"
        );
        assert_eq!(
            endpoints.download_file("E1", "out.pdf"),
            "https://x.io/w/runs/E1/file/out.pdf"
        );
    }

    #[test]
    fn test_variant_from_str() {
        assert_eq!("legacy".parse::<ApiVariant>().unwrap(), ApiVariant::Legacy);
        assert_eq!(" Detail ".parse::<ApiVariant>().unwrap(), ApiVariant::Detail);
        assert!("v3".parse::<ApiVariant>().is_err());
    }
}
