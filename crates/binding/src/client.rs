//! The method registry: one forwarding closure per route, callable by name.
//!
//! [`ApiClient::install`] walks a built [`RouteTable`] and captures each
//! route in a closure that hands the call to the shared [`Dispatcher`].
//! Installation performs no I/O. After it, the registry is never mutated, so
//! clones of the client can be used from any number of tasks at once.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{CallArgs, CallError, Dispatcher, MethodName, PlatformName, RouteEntry, RouteTable};

type Forwarder =
    Arc<dyn Fn(CallArgs) -> BoxFuture<'static, Result<Value, CallError>> + Send + Sync>;

struct InstalledMethod {
    route: Arc<RouteEntry>,
    forward: Forwarder,
}

/// A client whose methods come from a route table.
#[derive(Clone)]
pub struct ApiClient {
    dispatcher: Arc<Dispatcher>,
    methods: Arc<HashMap<MethodName, InstalledMethod>>,
    order: Arc<Vec<MethodName>>,
}

impl ApiClient {
    /// Installs a forwarding method for every route in `table`.
    pub fn install(table: &RouteTable, dispatcher: Dispatcher) -> Self {
        let dispatcher = Arc::new(dispatcher);
        let mut methods = HashMap::with_capacity(table.len());
        let mut order = Vec::with_capacity(table.len());

        for route in table.iter() {
            let forward: Forwarder = {
                let dispatcher = Arc::clone(&dispatcher);
                let route = Arc::clone(route);
                Arc::new(move |args: CallArgs| {
                    let dispatcher = Arc::clone(&dispatcher);
                    let route = Arc::clone(&route);
                    async move { dispatcher.dispatch(&route, args).await }.boxed()
                })
            };
            order.push(route.method().clone());
            methods.insert(
                route.method().clone(),
                InstalledMethod {
                    route: Arc::clone(route),
                    forward,
                },
            );
        }

        tracing::debug!(
            platform = %dispatcher.policy().platform(),
            methods = order.len(),
            "installed route methods"
        );

        Self {
            dispatcher,
            methods: Arc::new(methods),
            order: Arc::new(order),
        }
    }

    /// Calls the method named `method`.
    pub async fn call(&self, method: &str, args: CallArgs) -> Result<Value, CallError> {
        let installed = self.installed(method)?;
        (installed.forward)(args).await
    }

    /// Calls `method` and deserializes its result into `T`.
    pub async fn call_as<T: DeserializeOwned>(
        &self,
        method: &str,
        args: CallArgs,
    ) -> Result<T, CallError> {
        let installed = self.installed(method)?;
        let value = (installed.forward)(args).await?;
        serde_json::from_value(value).map_err(|source| CallError::Decode {
            method: installed.route.method().clone(),
            source,
        })
    }

    fn installed(&self, method: &str) -> Result<&InstalledMethod, CallError> {
        self.methods
            .get(method)
            .ok_or_else(|| CallError::UnknownMethod(method.to_string()))
    }

    /// Installed method names in route-table order.
    pub fn methods(&self) -> impl Iterator<Item = &MethodName> {
        self.order.iter()
    }

    /// The route captured by `method`.
    pub fn route(&self, method: &str) -> Option<&RouteEntry> {
        self.methods.get(method).map(|m| m.route.as_ref())
    }

    pub fn platform(&self) -> &PlatformName {
        self.dispatcher.policy().platform()
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("dispatcher", &self.dispatcher)
            .field("methods", &self.order)
            .finish()
    }
}
