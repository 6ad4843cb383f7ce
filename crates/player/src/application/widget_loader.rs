//! Widget Loader - loads the third-party widget script exactly once.
//!
//! Any number of mount sites may call [`WidgetLoader::ensure_loaded`], in any
//! interleaving. The first call asks the [`WidgetScriptHost`] to inject the
//! script; every later call awaits the same in-flight request, and once the
//! script is ready they all receive the same shared [`WidgetFactory`].
//!
//! A failed load is reported to everyone waiting on it and is not retried.
//! The loader returns to idle, so the next explicit call (a new selection or
//! re-enlarge) starts a fresh attempt.

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use futures_util::future::{self, Either, FutureExt, LocalBoxFuture, Shared};

use crate::application::error::WidgetLoadError;
use crate::ports::outbound::{WidgetFactory, WidgetScriptHost};

pub type LoadResult = Result<Rc<dyn WidgetFactory>, WidgetLoadError>;

type SharedLoad = Shared<LocalBoxFuture<'static, LoadResult>>;

enum LoaderState {
    Idle,
    Loading(SharedLoad),
    Ready(Rc<dyn WidgetFactory>),
}

struct LoaderInner {
    host: Rc<dyn WidgetScriptHost>,
    script_url: String,
    state: LoaderState,
    script_requests: usize,
}

impl LoaderInner {
    fn settle(&mut self, result: &LoadResult) {
        match result {
            Ok(factory) => {
                tracing::info!(url = %self.script_url, "Widget API loaded");
                self.state = LoaderState::Ready(Rc::clone(factory));
            }
            Err(e) => {
                tracing::error!(url = %self.script_url, error = %e, "Failed to load widget API");
                self.state = LoaderState::Idle;
            }
        }
    }
}

thread_local! {
    static PROCESS_LOADER: RefCell<Option<WidgetLoader>> = const { RefCell::new(None) };
}

/// Shared handle to the widget script loader. Clones share one loader.
#[derive(Clone)]
pub struct WidgetLoader {
    inner: Rc<RefCell<LoaderInner>>,
}

impl WidgetLoader {
    pub fn new(host: Rc<dyn WidgetScriptHost>, script_url: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(LoaderInner {
                host,
                script_url: script_url.into(),
                state: LoaderState::Idle,
                script_requests: 0,
            })),
        }
    }

    /// The loader shared by every view on this (UI) thread.
    ///
    /// `init` runs only for the first caller; later callers get the same
    /// loader regardless of what they pass.
    pub fn process_wide(init: impl FnOnce() -> WidgetLoader) -> WidgetLoader {
        PROCESS_LOADER.with(|slot| {
            let mut slot = slot.borrow_mut();
            match slot.as_ref() {
                Some(loader) => loader.clone(),
                None => {
                    let loader = init();
                    *slot = Some(loader.clone());
                    loader
                }
            }
        })
    }

    /// Resolve to the widget factory, requesting the script if nobody has yet.
    pub fn ensure_loaded(&self) -> impl Future<Output = LoadResult> + 'static {
        let mut inner = self.inner.borrow_mut();
        match &inner.state {
            LoaderState::Ready(factory) => {
                return Either::Left(future::ready(Ok(Rc::clone(factory))));
            }
            LoaderState::Loading(in_flight) => return Either::Right(in_flight.clone()),
            LoaderState::Idle => {}
        }

        inner.script_requests += 1;
        tracing::debug!(
            url = %inner.script_url,
            attempt = inner.script_requests,
            "Requesting widget script"
        );

        let request = inner.host.load(&inner.script_url);
        let weak = Rc::downgrade(&self.inner);
        let load = async move {
            let result = request.await;
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().settle(&result);
            }
            result
        }
        .boxed_local()
        .shared();

        inner.state = LoaderState::Loading(load.clone());
        Either::Right(load)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.inner.borrow().state, LoaderState::Ready(_))
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.inner.borrow().state, LoaderState::Loading(_))
    }

    /// How many times the script host was asked to load the script.
    pub fn script_requests(&self) -> usize {
        self.inner.borrow().script_requests
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::testing::{ManualScriptHost, ScriptedWidgetFactory};

    fn loader_with_host() -> (WidgetLoader, Rc<ManualScriptHost>) {
        let host = Rc::new(ManualScriptHost::default());
        let loader = WidgetLoader::new(host.clone(), "https://widgets.test/api.js");
        (loader, host)
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_request_and_one_factory() {
        let (loader, host) = loader_with_host();

        let first = loader.ensure_loaded();
        let second = loader.ensure_loaded();
        let third = loader.clone().ensure_loaded();

        assert_eq!(host.requests(), 1);
        assert_eq!(host.last_url().as_deref(), Some("https://widgets.test/api.js"));
        assert!(loader.is_loading());

        let factory: Rc<dyn WidgetFactory> = Rc::new(ScriptedWidgetFactory::default());
        host.resolve(Rc::clone(&factory));

        let (a, b, c) = futures_util::join!(first, second, third);
        let (a, b, c) = (a.expect("loaded"), b.expect("loaded"), c.expect("loaded"));
        assert!(Rc::ptr_eq(&a, &factory));
        assert!(Rc::ptr_eq(&a, &b));
        assert!(Rc::ptr_eq(&b, &c));
        assert!(loader.is_ready());
    }

    #[tokio::test]
    async fn sequential_callers_reuse_the_loaded_factory() {
        let (loader, host) = loader_with_host();
        let pending = loader.ensure_loaded();
        host.resolve(Rc::new(ScriptedWidgetFactory::default()));
        let first = pending.await.expect("loaded");

        let again = loader.ensure_loaded().await.expect("still loaded");
        assert!(Rc::ptr_eq(&first, &again));
        assert_eq!(host.requests(), 1);
        assert_eq!(loader.script_requests(), 1);
    }

    #[tokio::test]
    async fn failure_reaches_every_waiter_and_is_not_retried_automatically() {
        let (loader, host) = loader_with_host();
        let first = loader.ensure_loaded();
        let second = loader.ensure_loaded();

        host.fail(WidgetLoadError::script_failed("https://widgets.test/api.js", "404"));

        let (a, b) = futures_util::join!(first, second);
        assert!(matches!(a, Err(WidgetLoadError::ScriptFailed { .. })));
        assert_eq!(a.err(), b.err());
        assert_eq!(host.requests(), 1);
        assert!(!loader.is_loading());
        assert!(!loader.is_ready());
    }

    #[tokio::test]
    async fn explicit_call_after_failure_starts_a_new_attempt() {
        let (loader, host) = loader_with_host();
        let failed = loader.ensure_loaded();
        host.fail(WidgetLoadError::ApiUnavailable("timeout".into()));
        assert!(failed.await.is_err());

        let retry = loader.ensure_loaded();
        assert_eq!(host.requests(), 2);
        host.resolve(Rc::new(ScriptedWidgetFactory::default()));
        assert!(retry.await.is_ok());
    }

    #[test]
    fn process_wide_loader_is_initialised_once() {
        let (first, _host) = loader_with_host();
        let shared = WidgetLoader::process_wide(|| first.clone());
        let again = WidgetLoader::process_wide(|| panic!("initialiser must not run twice"));
        assert!(Rc::ptr_eq(&shared.inner, &again.inner));
        assert!(Rc::ptr_eq(&first.inner, &again.inner));
    }
}
