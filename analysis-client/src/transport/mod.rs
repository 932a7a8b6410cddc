pub mod http;

use crate::error::Result;
use crate::form::FormData;
use async_trait::async_trait;
use bytes::Bytes;

pub use self::http::HttpTransport;

/// Sends a form somewhere and hands back the raw response body.
///
/// Implementations must not interpret the status code: any response that
/// arrives is returned as-is and decoded by the caller.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_form(&self, path: &str, form: FormData) -> Result<Bytes>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn post_form(&self, path: &str, form: FormData) -> Result<Bytes> {
        (**self).post_form(path, form).await
    }
}
