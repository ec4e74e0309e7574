//! Dispatch port: delivers the drafted response.

use std::future::Future;
use std::sync::Arc;

use crisiswatch_domain::error::DispatchError;

/// Sends a response message to the crisis sender.
pub trait ResponseDispatcher {
    /// Deliver `content` to `recipient` under `subject`.
    ///
    /// A delivery the backend refuses is reported as
    /// [`DispatchError::Rejected`] carrying the backend's explanation.
    fn send_response(
        &self,
        content: &str,
        recipient: &str,
        subject: &str,
    ) -> impl Future<Output = Result<(), DispatchError>> + Send;
}

impl<T: ResponseDispatcher + Send + Sync> ResponseDispatcher for Arc<T> {
    fn send_response(
        &self,
        content: &str,
        recipient: &str,
        subject: &str,
    ) -> impl Future<Output = Result<(), DispatchError>> + Send {
        (**self).send_response(content, recipient, subject)
    }
}
