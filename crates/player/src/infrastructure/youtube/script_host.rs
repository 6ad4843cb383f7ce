//! Injects the IFrame API script and waits for `YT.Player`.

use std::cell::RefCell;
use std::rc::Rc;

use futures_channel::oneshot;
use futures_util::future::{FutureExt, LocalBoxFuture};
use gloo_timers::future::TimeoutFuture;
use js_sys::{Function, Reflect};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::HtmlScriptElement;

use super::widget::YoutubeWidgetFactory;
use crate::application::error::WidgetLoadError;
use crate::application::widget_loader::LoadResult;
use crate::ports::outbound::{WidgetFactory, WidgetScriptHost};

pub struct YoutubeScriptHost {
    probe_ms: u32,
    probe_limit: u32,
}

impl YoutubeScriptHost {
    pub fn new(probe_ms: u32, probe_limit: u32) -> Self {
        Self {
            probe_ms,
            probe_limit,
        }
    }
}

impl WidgetScriptHost for YoutubeScriptHost {
    fn load(&self, script_url: &str) -> LocalBoxFuture<'static, LoadResult> {
        let url = script_url.to_string();
        let (probe_ms, probe_limit) = (self.probe_ms, self.probe_limit);
        async move {
            let factory = load_player_api(&url, probe_ms, probe_limit).await?;
            Ok(Rc::new(factory) as Rc<dyn WidgetFactory>)
        }
        .boxed_local()
    }
}

async fn load_player_api(
    url: &str,
    probe_ms: u32,
    probe_limit: u32,
) -> Result<YoutubeWidgetFactory, WidgetLoadError> {
    // A previous page state (or another embed) may already have it.
    if let Some(ctor) = player_constructor() {
        return Ok(YoutubeWidgetFactory::new(ctor));
    }

    inject_script(url).await?;

    for _ in 0..probe_limit {
        if let Some(ctor) = player_constructor() {
            return Ok(YoutubeWidgetFactory::new(ctor));
        }
        TimeoutFuture::new(probe_ms).await;
    }
    player_constructor()
        .map(YoutubeWidgetFactory::new)
        .ok_or_else(|| {
            WidgetLoadError::ApiUnavailable(format!(
                "YT.Player missing {} ms after the script loaded",
                u64::from(probe_ms) * u64::from(probe_limit)
            ))
        })
}

async fn inject_script(url: &str) -> Result<(), WidgetLoadError> {
    let fail = |reason: &str| WidgetLoadError::script_failed(url, reason);

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| fail("no document"))?;
    let body = document.body().ok_or_else(|| fail("document has no body"))?;
    let script: HtmlScriptElement = document
        .create_element("script")
        .map_err(|e| fail(&describe(&e)))?
        .dyn_into()
        .map_err(|_| fail("created element is not a script"))?;

    let (tx, rx) = oneshot::channel::<Result<(), String>>();
    let tx = Rc::new(RefCell::new(Some(tx)));

    let onload = {
        let tx = Rc::clone(&tx);
        Closure::<dyn FnMut()>::new(move || {
            if let Some(tx) = tx.borrow_mut().take() {
                let _ = tx.send(Ok(()));
            }
        })
    };
    let onerror = {
        let tx = Rc::clone(&tx);
        Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
            if let Some(tx) = tx.borrow_mut().take() {
                let _ = tx.send(Err(format!("script error event ({})", event.type_())));
            }
        })
    };

    script.set_src(url);
    script.set_async(true);
    script.set_onload(Some(onload.as_ref().unchecked_ref()));
    script.set_onerror(Some(onerror.as_ref().unchecked_ref()));
    body.append_child(&script).map_err(|e| fail(&describe(&e)))?;
    tracing::debug!(url, "Widget script injected");

    let outcome = rx.await;
    script.set_onload(None);
    script.set_onerror(None);
    drop((onload, onerror));

    match outcome {
        Ok(Ok(())) => Ok(()),
        Ok(Err(reason)) => Err(fail(&reason)),
        Err(_) => Err(fail("load listener dropped")),
    }
}

/// `window.YT.Player`, once the script has defined it.
fn player_constructor() -> Option<Function> {
    let window = web_sys::window()?;
    let yt = Reflect::get(&window, &JsValue::from_str("YT")).ok()?;
    if !yt.is_object() {
        return None;
    }
    Reflect::get(&yt, &JsValue::from_str("Player"))
        .ok()?
        .dyn_into::<Function>()
        .ok()
}

pub(super) fn describe(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| format!("{value:?}"))
}
