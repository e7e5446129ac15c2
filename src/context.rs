//! Carrying a logger through request-scoped context
//!
//! A [`Context`] is an immutable chain of typed values. Adding a value
//! returns a new context whose parent is the old one, so a context can be
//! handed to other threads and extended independently on each.

use crate::facade::Logger;
use crate::global::default_logger;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

struct Node {
    parent: Option<Arc<Node>>,
    key: TypeId,
    value: Arc<dyn Any + Send + Sync>,
}

/// Immutable, cheaply cloneable bag of request-scoped values
///
/// # Examples
///
/// ```
/// use rust_leveled_logger::context::{from_context, with_logger, Context};
/// use rust_leveled_logger::prelude::*;
/// use std::sync::Arc;
///
/// let request_logger = Arc::new(Logger::new(Output::stderr(), LogLevel::Debug));
/// let ctx = with_logger(&Context::background(), Arc::clone(&request_logger));
///
/// let child = ctx.with_value(42u32);
/// assert!(Arc::ptr_eq(&from_context(&child), &request_logger));
/// assert_eq!(child.value::<u32>().as_deref(), Some(&42));
/// ```
#[derive(Clone, Default)]
pub struct Context {
    head: Option<Arc<Node>>,
}

impl Context {
    /// The empty root context
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a context carrying `value`, keyed by its type
    #[must_use]
    pub fn with_value<T: Any + Send + Sync>(&self, value: T) -> Self {
        Self {
            head: Some(Arc::new(Node {
                parent: self.head.clone(),
                key: TypeId::of::<T>(),
                value: Arc::new(value),
            })),
        }
    }

    /// The nearest value of type `T`, if any
    pub fn value<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        let key = TypeId::of::<T>();
        let mut node = self.head.as_ref();
        while let Some(current) = node {
            if current.key == key {
                return Arc::clone(&current.value).downcast::<T>().ok();
            }
            node = current.parent.as_ref();
        }
        None
    }

    /// Number of values along the chain
    pub fn depth(&self) -> usize {
        std::iter::successors(self.head.as_ref(), |n| n.parent.as_ref()).count()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("depth", &self.depth())
            .finish()
    }
}

/// Private key type so a bound logger never collides with user values
struct LoggerBinding(Arc<Logger>);

/// Derive a context that carries `logger`
pub fn with_logger(ctx: &Context, logger: Arc<Logger>) -> Context {
    ctx.with_value(LoggerBinding(logger))
}

/// The logger bound nearest to `ctx`, or the process-wide default
pub fn from_context(ctx: &Context) -> Arc<Logger> {
    match ctx.value::<LoggerBinding>() {
        Some(binding) => Arc::clone(&binding.0),
        None => default_logger(),
    }
}
