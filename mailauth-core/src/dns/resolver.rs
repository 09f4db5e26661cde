//! Resolver seam and the hickory-backed implementation.

use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::{
    config::{ResolverConfig, ResolverOpts},
    name_server::TokioConnectionProvider,
    proto::rr::RecordType,
    ResolveError, TokioResolver,
};
use thiserror::Error;

/// Why a lookup produced no answer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupError {
    /// NXDOMAIN or no data of the requested type. A normal negative answer.
    #[error("no such record")]
    NotFound,
    #[error("lookup timed out")]
    Timeout,
    #[error("{0}")]
    Failed(String),
}

/// DNS queries needed by the checkers.
#[async_trait]
pub trait DnsResolver: Send + Sync {
    /// TXT records at `name`, one string per record with its chunks concatenated.
    async fn lookup_txt(&self, name: &str) -> Result<Vec<String>, LookupError>;

    /// CNAME target of `name`, without trailing dot.
    async fn lookup_cname(&self, name: &str) -> Result<String, LookupError>;
}

/// Recursive lookups through the host's resolver configuration.
pub struct HickoryResolver {
    inner: TokioResolver,
    timeout: Duration,
}

impl HickoryResolver {
    /// Resolver built from the system configuration, falling back to hickory's defaults.
    pub fn from_system(timeout: Duration) -> Self {
        Self {
            inner: build_system_resolver(timeout),
            timeout,
        }
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T, LookupError>
    where
        F: std::future::Future<Output = Result<T, ResolveError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) if e.is_no_records_found() || e.is_nx_domain() => Err(LookupError::NotFound),
            Ok(Err(e)) => Err(LookupError::Failed(e.to_string())),
            Err(_) => Err(LookupError::Timeout),
        }
    }
}

fn build_system_resolver(timeout: Duration) -> TokioResolver {
    #[cfg(any(unix, target_os = "windows"))]
    {
        match TokioResolver::builder_tokio() {
            Ok(mut builder) => {
                builder.options_mut().timeout = timeout;
                return builder.build();
            }
            Err(e) => {
                log::warn!("Failed to load system DNS configuration, falling back to defaults: {e}");
            }
        }
    }

    let mut opts = ResolverOpts::default();
    opts.timeout = timeout;
    TokioResolver::builder_with_config(ResolverConfig::default(), TokioConnectionProvider::default())
        .with_options(opts)
        .build()
}

/// Absolute query name, so search domains are never appended.
fn absolute(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{name}.")
    }
}

#[async_trait]
impl DnsResolver for HickoryResolver {
    async fn lookup_txt(&self, name: &str) -> Result<Vec<String>, LookupError> {
        let response = self.bounded(self.inner.txt_lookup(absolute(name))).await?;
        let records: Vec<String> = response
            .iter()
            .map(|txt| {
                txt.iter()
                    .map(|data| String::from_utf8_lossy(data).to_string())
                    .collect::<String>()
            })
            .collect();
        log::debug!("TXT {name}: {} record(s)", records.len());
        Ok(records)
    }

    async fn lookup_cname(&self, name: &str) -> Result<String, LookupError> {
        let response = self
            .bounded(self.inner.lookup(absolute(name), RecordType::CNAME))
            .await?;
        response
            .record_iter()
            .find_map(|record| {
                record
                    .data()
                    .as_cname()
                    .map(|cname| cname.0.to_string().trim_end_matches('.').to_string())
            })
            .ok_or(LookupError::NotFound)
    }
}
