//! Error interception wrapper
//!
//! [`intercept`] binds an [`Operation`] to a shared handler and turns it into
//! an axum-compatible callback. Whatever goes wrong inside, a body that fails
//! to parse, an `Err` from the handler or a panic, is forwarded once to the
//! terminal [`ErrorHandler`] instead of escaping to the server.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::{
    extract::Request,
    response::{IntoResponse, Response},
};
use futures::future::{BoxFuture, FutureExt};

use crate::handler::{HandlerError, HandlerResult, Operation, ResourceHandler};
use crate::request::ResourceRequest;
use crate::terminal::ErrorHandler;

/// Wrap `operation` on `handler` so every failure reaches `errors`
///
/// The returned callback always invokes the method on the `Arc<H>` it was
/// given, so the receiver is the controller's own handler no matter how the
/// route table stored the reference. Each invocation yields exactly one
/// response: the handler's reply, or the terminal handler's answer.
pub fn intercept<H: ResourceHandler>(
    handler: Arc<H>,
    errors: Arc<dyn ErrorHandler>,
    operation: Operation,
    body_limit: usize,
) -> impl Fn(Request) -> BoxFuture<'static, Response> + Clone + Send + Sync + 'static {
    move |request: Request| {
        let handler = Arc::clone(&handler);
        let errors = Arc::clone(&errors);
        async move {
            let outcome = AssertUnwindSafe(dispatch(handler, operation, request, body_limit))
                .catch_unwind()
                .await;
            match outcome {
                Ok(Ok(reply)) => reply.into_response(),
                Ok(Err(error)) => errors.handle(error),
                Err(payload) => errors.handle(HandlerError::from_panic(operation, payload)),
            }
        }
        .boxed()
    }
}

async fn dispatch<H: ResourceHandler>(
    handler: Arc<H>,
    operation: Operation,
    request: Request,
    body_limit: usize,
) -> HandlerResult {
    let req = ResourceRequest::from_http(request, operation, body_limit).await?;
    operation.invoke(handler.as_ref(), req).await
}
