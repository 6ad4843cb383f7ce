//! `YT.Player` instances behind the [`VideoWidget`] port.

use js_sys::{Array, Function, Object, Reflect};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use waymark_domain::{WidgetErrorCode, WidgetPlayerState};

use super::script_host::describe;
use crate::application::error::AdapterConstructionError;
use crate::ports::outbound::{
    VideoWidget, WidgetEvent, WidgetEventSink, WidgetFactory, WidgetParams,
};

type EventClosure = Closure<dyn FnMut(JsValue)>;

pub struct YoutubeWidgetFactory {
    ctor: Function,
}

impl YoutubeWidgetFactory {
    pub fn new(ctor: Function) -> Self {
        Self { ctor }
    }
}

impl WidgetFactory for YoutubeWidgetFactory {
    fn construct(
        &self,
        params: WidgetParams,
        events: WidgetEventSink,
    ) -> Result<Box<dyn VideoWidget>, AdapterConstructionError> {
        let reject = |reason: String| AdapterConstructionError::new(params.video_id.clone(), reason);

        // The player replaces its element with an iframe; give it a child of
        // the render target so the view keeps the node it created.
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| reject("no document".to_string()))?;
        let target = document
            .get_element_by_id(&params.target_id)
            .ok_or_else(|| reject(format!("render target #{} not found", params.target_id)))?;
        let host = document
            .create_element("div")
            .map_err(|e| reject(describe(&e)))?;
        target
            .append_child(&host)
            .map_err(|e| reject(describe(&e)))?;

        let closures = WidgetClosures::new(events);
        let options = player_options(&params, &closures).map_err(|e| reject(describe(&e)))?;
        let args = Array::of2(&host, &options);

        match Reflect::construct(&self.ctor, &args) {
            Ok(player) => Ok(Box::new(YoutubeWidget {
                player,
                target,
                _closures: closures,
            })),
            Err(e) => {
                target.set_inner_html("");
                Err(reject(describe(&e)))
            }
        }
    }
}

fn player_options(params: &WidgetParams, closures: &WidgetClosures) -> Result<Object, JsValue> {
    let flag = |on: bool| JsValue::from_f64(if on { 1.0 } else { 0.0 });

    let vars = Object::new();
    Reflect::set(&vars, &"playsinline".into(), &flag(params.plays_inline))?;
    Reflect::set(&vars, &"autoplay".into(), &flag(params.autoplay))?;
    Reflect::set(&vars, &"controls".into(), &flag(params.controls))?;
    Reflect::set(
        &vars,
        &"start".into(),
        &JsValue::from_f64(f64::from(params.start_seconds())),
    )?;

    let handlers = Object::new();
    Reflect::set(&handlers, &"onReady".into(), closures.ready.as_ref())?;
    Reflect::set(&handlers, &"onStateChange".into(), closures.state.as_ref())?;
    Reflect::set(&handlers, &"onError".into(), closures.error.as_ref())?;

    let options = Object::new();
    Reflect::set(&options, &"videoId".into(), &params.video_id.as_str().into())?;
    Reflect::set(&options, &"playerVars".into(), &vars)?;
    Reflect::set(&options, &"events".into(), &handlers)?;
    Ok(options)
}

/// JS callbacks handed to the player. Kept alive as long as the widget.
struct WidgetClosures {
    ready: EventClosure,
    state: EventClosure,
    error: EventClosure,
}

impl WidgetClosures {
    fn new(events: WidgetEventSink) -> Self {
        let ready = {
            let events = events.clone();
            Closure::<dyn FnMut(JsValue)>::new(move |_event: JsValue| events(WidgetEvent::Ready))
        };
        let state = {
            let events = events.clone();
            Closure::<dyn FnMut(JsValue)>::new(move |event: JsValue| {
                match event_code(&event).and_then(WidgetPlayerState::from_code) {
                    Some(state) => events(WidgetEvent::StateChanged(state)),
                    None => tracing::debug!(event = ?event, "Unknown widget state"),
                }
            })
        };
        let error = Closure::<dyn FnMut(JsValue)>::new(move |event: JsValue| {
            let code = event_code(&event).unwrap_or(-1);
            events(WidgetEvent::Error(WidgetErrorCode::from_code(code)))
        });
        Self {
            ready,
            state,
            error,
        }
    }
}

fn event_code(event: &JsValue) -> Option<i32> {
    Reflect::get(event, &"data".into())
        .ok()
        .and_then(|data| data.as_f64())
        .map(|code| code as i32)
}

pub struct YoutubeWidget {
    player: JsValue,
    target: web_sys::Element,
    _closures: WidgetClosures,
}

impl YoutubeWidget {
    fn call(&self, method: &str, args: &[JsValue]) -> Option<JsValue> {
        // Methods only exist once the player has attached to its iframe.
        let function = Reflect::get(&self.player, &JsValue::from_str(method))
            .ok()?
            .dyn_into::<Function>()
            .ok()?;
        let args: Array = args.iter().collect();
        match function.apply(&self.player, &args) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(method, error = %describe(&e), "Widget call failed");
                None
            }
        }
    }
}

impl VideoWidget for YoutubeWidget {
    fn play(&self) {
        self.call("playVideo", &[]);
    }

    fn pause(&self) {
        self.call("pauseVideo", &[]);
    }

    fn seek_to(&self, seconds: f64, allow_seek_ahead: bool) {
        self.call(
            "seekTo",
            &[JsValue::from_f64(seconds), JsValue::from_bool(allow_seek_ahead)],
        );
    }

    fn current_time(&self) -> Option<f64> {
        self.call("getCurrentTime", &[]).and_then(|v| v.as_f64())
    }

    fn destroy(&self) {
        self.call("destroy", &[]);
        self.target.set_inner_html("");
    }
}
