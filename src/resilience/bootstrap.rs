use crate::fetcher::DocumentFetcher;
use crate::render::PageRenderer;
use crate::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::Instrument;

/// A collaborator that tries to make a missing fetch backend available
///
/// The engine invokes it at most once, in the background, the first time
/// an operation degrades. The operation that triggered it still answers
/// from the degraded tier; on success the returned backend replaces the
/// missing one and later operations take the primary path.
#[async_trait]
pub trait Bootstrap: Send + Sync {
    async fn install(&self) -> Result<Arc<dyn DocumentFetcher>>;
}

/// One-shot guard around an optional bootstrapper
#[derive(Default)]
pub(crate) struct BootstrapOnce {
    bootstrap: Option<Arc<dyn Bootstrap>>,
    attempted: AtomicBool,
}

impl BootstrapOnce {
    pub(crate) fn new(bootstrap: Option<Arc<dyn Bootstrap>>) -> Self {
        Self {
            bootstrap,
            attempted: AtomicBool::new(false),
        }
    }

    /// Starts the bootstrapper unless it was already started
    ///
    /// A backend it produces is installed into `renderer`.
    pub(crate) fn attempt(&self, renderer: &PageRenderer) {
        if self.attempted.swap(true, Ordering::SeqCst) {
            tracing::debug!("Bootstrap already attempted");
            return;
        }

        let Some(bootstrap) = self.bootstrap.clone() else {
            tracing::info!("No bootstrapper configured; staying degraded");
            return;
        };

        tracing::info!("Attempting fetch backend bootstrap");
        let renderer = renderer.clone();
        tokio::spawn(
            async move {
                match bootstrap.install().await {
                    Ok(fetcher) => {
                        renderer.replace_fetcher(fetcher).await;
                        tracing::info!("Fetch backend bootstrap succeeded, backend installed");
                    }
                    Err(e) => tracing::warn!("Fetch backend bootstrap failed: {}", e),
                }
            }
            .in_current_span(),
        );
    }
}
