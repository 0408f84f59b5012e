//! The ordered fallback pipeline shared by every operation
//!
//! Stages run in tier order and each one yields a complete envelope:
//!
//! 1. `primary` - the real work, usually a plain primary envelope
//! 2. `degraded` - only when the primary failed with
//!    `DependencyUnavailable`; may itself fail
//! 3. `placeholder` - any remaining failure; never fails

use crate::envelope::ResponseEnvelope;
use crate::{Result, ScribeError};
use std::future::Future;

pub(crate) async fn run_chain<T, P, D, DF, H, HF>(
    primary: P,
    degraded: D,
    placeholder: H,
) -> ResponseEnvelope<T>
where
    P: Future<Output = Result<ResponseEnvelope<T>>>,
    D: FnOnce(ScribeError) -> DF,
    DF: Future<Output = Result<ResponseEnvelope<T>>>,
    H: FnOnce(ScribeError) -> HF,
    HF: Future<Output = ResponseEnvelope<T>>,
{
    let failure = match primary.await {
        Ok(envelope) => return envelope,
        Err(e) => e,
    };

    let failure = if failure.is_dependency_unavailable() {
        tracing::warn!("Fetch backend unavailable, degrading: {}", failure);
        match degraded(failure).await {
            Ok(envelope) => return envelope,
            Err(e) => e,
        }
    } else {
        failure
    };

    tracing::error!("Operation failed, returning placeholder: {}", failure);
    placeholder(failure).await
}
