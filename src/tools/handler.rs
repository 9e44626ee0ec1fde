use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::context::ToolContext;
use crate::error::ToolError;

/// A tool's execution handler. Input and output are JSON text so that
/// handlers of any shape can sit side by side in one registry.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn handle(&self, ctx: &ToolContext, input: &str) -> Result<String, ToolError>;
}

#[async_trait]
impl<H: ToolHandler + ?Sized> ToolHandler for Arc<H> {
    async fn handle(&self, ctx: &ToolContext, input: &str) -> Result<String, ToolError> {
        (**self).handle(ctx, input).await
    }
}

#[async_trait]
impl<H: ToolHandler + ?Sized> ToolHandler for Box<H> {
    async fn handle(&self, ctx: &ToolContext, input: &str) -> Result<String, ToolError> {
        (**self).handle(ctx, input).await
    }
}

/// Lets a plain async function stand in as a handler.
pub struct FuncHandler<F> {
    func: F,
}

impl<F, Fut> FuncHandler<F>
where
    F: Fn(ToolContext, String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<String, ToolError>> + Send + 'static,
{
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

#[async_trait]
impl<F, Fut> ToolHandler for FuncHandler<F>
where
    F: Fn(ToolContext, String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<String, ToolError>> + Send + 'static,
{
    async fn handle(&self, ctx: &ToolContext, input: &str) -> Result<String, ToolError> {
        (self.func)(ctx.clone(), input.to_owned()).await
    }
}

/// Decodes the JSON input into `I`, runs the wrapped function and encodes
/// its `O` back to JSON.
///
/// Decode failures return [`ToolError::Decode`] before the function runs.
/// Errors from the function come back untouched.
pub struct TypedHandler<I, O, F> {
    func: F,
    _types: PhantomData<fn(I) -> O>,
}

impl<I, O, F, Fut> TypedHandler<I, O, F>
where
    I: DeserializeOwned + Send,
    O: Serialize + Send,
    F: Fn(ToolContext, I) -> Fut + Send + Sync,
    Fut: Future<Output = Result<O, ToolError>> + Send + 'static,
{
    pub fn new(func: F) -> Self {
        Self {
            func,
            _types: PhantomData,
        }
    }
}

#[async_trait]
impl<I, O, F, Fut> ToolHandler for TypedHandler<I, O, F>
where
    I: DeserializeOwned + Send,
    O: Serialize + Send,
    F: Fn(ToolContext, I) -> Fut + Send + Sync,
    Fut: Future<Output = Result<O, ToolError>> + Send + 'static,
{
    async fn handle(&self, ctx: &ToolContext, input: &str) -> Result<String, ToolError> {
        let args: I = serde_json::from_str(input).map_err(ToolError::Decode)?;
        let output = (self.func)(ctx.clone(), args).await?;
        serde_json::to_string(&output).map_err(ToolError::Encode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Deserialize)]
    struct Person {
        name: String,
        age: u32,
    }

    #[derive(Debug, Serialize)]
    struct Greeting {
        message: String,
    }

    async fn greet(_ctx: ToolContext, person: Person) -> Result<Greeting, ToolError> {
        Ok(Greeting {
            message: format!("Hello {}, you are {} years old", person.name, person.age),
        })
    }

    #[tokio::test]
    async fn typed_handler_decodes_calls_and_encodes() {
        let handler = TypedHandler::new(greet);
        let out = handler
            .handle(&ToolContext::new(), r#"{"name":"Alice","age":30}"#)
            .await
            .unwrap();
        assert_eq!(out, r#"{"message":"Hello Alice, you are 30 years old"}"#);
    }

    #[tokio::test]
    async fn typed_handler_rejects_invalid_json_without_calling() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let handler = TypedHandler::new(move |_ctx, _p: Person| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, ToolError>(Greeting {
                    message: "test".into(),
                })
            }
        });

        let err = handler
            .handle(&ToolContext::new(), "invalid json")
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Decode(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn typed_handler_rejects_wrong_shape() {
        let handler = TypedHandler::new(greet);
        let err = handler
            .handle(&ToolContext::new(), r#"{"name":"Alice","age":"thirty"}"#)
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Decode(_)));
    }

    #[tokio::test]
    async fn typed_handler_passes_function_errors_through() {
        let handler = TypedHandler::new(|_ctx, _p: Person| async {
            Err::<Greeting, _>(ToolError::handler("lookup failed"))
        });
        let err = handler
            .handle(&ToolContext::new(), r#"{"name":"Bob","age":1}"#)
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Handler(_)));
        assert_eq!(err.to_string(), "lookup failed");

        let cancelled = TypedHandler::new(|ctx: ToolContext, _p: Person| async move {
            ctx.check()?;
            Ok::<_, ToolError>(Greeting {
                message: "late".into(),
            })
        });
        let ctx = ToolContext::new();
        ctx.cancellation_token().cancel();
        let err = cancelled
            .handle(&ctx, r#"{"name":"Bob","age":1}"#)
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Cancelled));
    }

    #[tokio::test]
    async fn typed_handler_reports_unencodable_output() {
        // Maps with non-string keys have no JSON representation.
        let handler = TypedHandler::new(|_ctx, _p: Person| async {
            let mut out = BTreeMap::new();
            out.insert((1u8, 2u8), "pair");
            Ok::<_, ToolError>(out)
        });
        let err = handler
            .handle(&ToolContext::new(), r#"{"name":"Bob","age":1}"#)
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Encode(_)));
    }

    #[tokio::test]
    async fn typed_handler_round_trips_plain_data() {
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        struct Point {
            x: i64,
            y: i64,
            label: Option<String>,
        }

        let echo = TypedHandler::new(|_ctx, p: Point| async move { Ok::<_, ToolError>(p) });
        let original = Point {
            x: -3,
            y: 7,
            label: Some("origin-ish".into()),
        };
        let input = serde_json::to_string(&original).unwrap();
        let out = echo.handle(&ToolContext::new(), &input).await.unwrap();
        let back: Point = serde_json::from_str(&out).unwrap();
        assert_eq!(back, original);
    }

    #[tokio::test]
    async fn func_handler_delegates_verbatim() {
        let handler = FuncHandler::new(|_ctx, input: String| async move {
            Ok::<_, ToolError>(format!("processed: {input}"))
        });
        let out = handler.handle(&ToolContext::new(), "test").await.unwrap();
        assert_eq!(out, "processed: test");

        // Not JSON, and nobody complains: the function adapter does no decoding.
        let out = handler.handle(&ToolContext::new(), "{{{").await.unwrap();
        assert_eq!(out, "processed: {{{");
    }

    #[tokio::test]
    async fn func_handler_propagates_errors() {
        let handler = FuncHandler::new(|_ctx, _input: String| async {
            Err::<String, _>(ToolError::handler("boom"))
        });
        let err = handler.handle(&ToolContext::new(), "x").await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[tokio::test]
    async fn func_handler_sees_call_id() {
        let handler = FuncHandler::new(|ctx: ToolContext, _input: String| async move {
            Ok::<_, ToolError>(ctx.call_id().unwrap_or("none").to_string())
        });
        let ctx = ToolContext::new().with_call_id("call_42");
        assert_eq!(handler.handle(&ctx, "").await.unwrap(), "call_42");
    }

    struct Prefix(&'static str);

    #[async_trait]
    impl ToolHandler for Prefix {
        async fn handle(&self, _ctx: &ToolContext, input: &str) -> Result<String, ToolError> {
            Ok(format!("{}{input}", self.0))
        }
    }

    #[tokio::test]
    async fn boxed_and_shared_handlers_forward() {
        let boxed: Box<dyn ToolHandler> = Box::new(Prefix("custom: "));
        assert_eq!(
            boxed.handle(&ToolContext::new(), "a").await.unwrap(),
            "custom: a"
        );

        let shared: Arc<dyn ToolHandler> = Arc::new(Prefix("shared: "));
        let again = shared.clone();
        assert_eq!(
            again.handle(&ToolContext::new(), "b").await.unwrap(),
            "shared: b"
        );
    }

    #[tokio::test]
    async fn typed_handler_is_safe_to_call_concurrently() {
        let handler = Arc::new(TypedHandler::new(greet));
        let mut tasks = Vec::new();
        for age in 0..8u32 {
            let handler = handler.clone();
            tasks.push(tokio::spawn(async move {
                let input = format!(r#"{{"name":"N","age":{age}}}"#);
                handler.handle(&ToolContext::new(), &input).await
            }));
        }
        for (age, task) in tasks.into_iter().enumerate() {
            let out = task.await.unwrap().unwrap();
            assert_eq!(
                out,
                format!(r#"{{"message":"Hello N, you are {age} years old"}}"#)
            );
        }
    }
}
