//! Ready-to-use client wired from [`ClientConfig`]

use std::sync::Arc;

use callwire_common::auth::TokenProvider;
use callwire_common::resilience::RetryPolicy;
use callwire_core::{Endpoint, Executor, PagedEndpoint, Paginator};
use callwire_domain::config::ClientConfig;
use callwire_domain::{PageResult, PageWindow, Result};
use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::auth::OAuthTokenClient;
use crate::config;
use crate::http::ReqwestTransport;

/// An [`Executor`] over reqwest with credentials from the OAuth token endpoint
#[derive(Debug, Clone)]
pub struct Client {
    executor: Executor,
}

impl Client {
    /// # Errors
    /// Returns [`CallwireError::Config`](callwire_domain::CallwireError::Config)
    /// if the configuration is invalid or an HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let transport = ReqwestTransport::builder()
            .timeout(config.api.timeout())
            .user_agent(config.api.user_agent.clone())
            .build()?;
        let token_client = OAuthTokenClient::with_client(transport.client().clone(), config.oauth.clone());
        let tokens = TokenProvider::new(Arc::new(token_client), config.token.skew());

        let executor = Executor::new(
            Arc::new(transport),
            tokens,
            RetryPolicy::from_config(&config.retry),
            config.api.clone(),
        )
        .with_max_pages(config.pagination.max_pages);

        info!(base_url = %config.api.base_url, "client ready");
        Ok(Self { executor })
    }

    /// Load configuration (`.env`, environment, then files) and build a client.
    ///
    /// # Errors
    /// As [`config::load`] and [`Client::from_config`].
    pub fn from_env() -> Result<Self> {
        Self::from_config(&config::load()?)
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    /// # Errors
    /// As [`Executor::call`].
    pub async fn call<E: Endpoint>(&self, endpoint: &E, cancel: &CancellationToken) -> Result<E::Output> {
        self.executor.call(endpoint, cancel).await
    }

    /// Page through `endpoint` with `page_size` records per page.
    ///
    /// # Errors
    /// Returns a validation error for `page_size` outside `[1, 100]`; no
    /// request is made in that case.
    pub fn paginate<E>(
        &self,
        endpoint: E,
        page_size: u32,
        cancel: &CancellationToken,
    ) -> Result<Paginator<E::Record, impl FnMut(PageWindow) -> BoxFuture<'static, Result<PageResult<E::Record>>>>>
    where
        E: PagedEndpoint + Send + Sync + 'static,
        E::Record: Send + 'static,
    {
        let first = PageWindow::new(page_size)?;
        Ok(self.executor.paginate(endpoint, first, cancel))
    }
}
