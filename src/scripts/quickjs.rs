//! JavaScript scripts via QuickJS
//!
//! Each run gets a fresh runtime and context with one global, `api`:
//!
//! ```js
//! api.registerTextModificationHandler(function (prev, cur) {
//!     api.replaceText(":-)", "\u{1F60A}");
//! });
//! api.registerOnFunctionKeyEvent("F5", function () { api.insertText("!"); });
//! ```
//!
//! Offsets are numbers; negative values clamp to 0. A cancelled prompt and a
//! deletion that did nothing return `null`. `console.log/warn/error`
//! go to the log under the `script` target.

use std::sync::Arc;

use parking_lot::Mutex;
use rquickjs::convert::Coerced;
use rquickjs::function::{Opt, Rest};
use rquickjs::{Array, Context, Ctx, Exception, Function, IntoJs, Object, Runtime, Value};

use super::{Script, ScriptEngine, ScriptError};
use crate::api::{EditorApi, FunctionKey};

/// The QuickJS script engine (`.js` files)
#[derive(Debug, Default)]
pub struct QuickJsEngine;

impl QuickJsEngine {
    pub fn new() -> Self {
        Self
    }
}

impl ScriptEngine for QuickJsEngine {
    fn extension(&self) -> &str {
        "js"
    }

    fn execute(&self, script: &Script, api: Arc<dyn EditorApi>) -> Result<(), ScriptError> {
        let runtime = Runtime::new().map_err(|e| ScriptError::Interpreter(e.to_string()))?;
        let context =
            Context::full(&runtime).map_err(|e| ScriptError::Interpreter(e.to_string()))?;
        let slot: ContextSlot = Arc::new(Mutex::new(Some(context.clone())));

        let (result, registered) = context.with(|ctx| {
            if let Err(e) = install_api(&ctx, &script.name, api, slot.clone()) {
                let error = ScriptError::Runtime {
                    script: script.name.clone(),
                    message: format_js_error(&ctx, e),
                };
                return (Err(error), 0);
            }

            let result = ctx
                .eval::<(), _>(script.source.as_bytes())
                .map_err(|e| ScriptError::Runtime {
                    script: script.name.clone(),
                    message: format_js_error(&ctx, e),
                });
            run_pending_jobs(&ctx);
            (result, registered_callbacks(&ctx))
        });

        // Nothing can call back in, so let the runtime go with this run
        if registered == 0 {
            slot.lock().take();
        }
        result
    }
}

/// Handle the `api` functions use to reach their own context
///
/// Emptied once a run ends without registering callbacks. Dropping a
/// `Context` takes the runtime lock, so that must happen outside `with`.
type ContextSlot = Arc<Mutex<Option<Context>>>;

/// Global array holding every function a script handed to the editor
const CALLBACKS: &str = "__callbacks";

fn registered_callbacks(ctx: &Ctx<'_>) -> usize {
    ctx.globals()
        .get::<_, Array>(CALLBACKS)
        .map(|callbacks| callbacks.len())
        .unwrap_or(0)
}

/// A JS function the editor calls after the script body returned
///
/// The function itself stays inside the runtime, in `__callbacks`; this only
/// keeps the context and the index.
struct JsCallback {
    context: Context,
    id: usize,
    script: String,
}

impl JsCallback {
    fn register<'js>(
        ctx: &Ctx<'js>,
        slot: &ContextSlot,
        function: Function<'js>,
        script: &str,
    ) -> rquickjs::Result<Self> {
        let context = slot
            .lock()
            .clone()
            .ok_or_else(|| Exception::throw_message(ctx, "script context is closed"))?;
        let callbacks: Array<'js> = ctx.globals().get(CALLBACKS)?;
        let id = callbacks.len();
        callbacks.set(id, function)?;
        Ok(Self {
            context,
            id,
            script: script.to_string(),
        })
    }

    fn function<'js>(&self, ctx: &Ctx<'js>) -> rquickjs::Result<Function<'js>> {
        let callbacks: Array<'js> = ctx.globals().get(CALLBACKS)?;
        callbacks.get(self.id)
    }

    fn call0(&self) {
        self.context.with(|ctx| {
            let result = self.function(&ctx).and_then(|f| f.call::<_, ()>(()));
            self.report(&ctx, result);
        });
    }

    fn call2(&self, first: &str, second: &str) {
        self.context.with(|ctx| {
            let result = self
                .function(&ctx)
                .and_then(|f| f.call::<_, ()>((first.to_string(), second.to_string())));
            self.report(&ctx, result);
        });
    }

    fn report(&self, ctx: &Ctx<'_>, result: rquickjs::Result<()>) {
        if let Err(e) = result {
            tracing::error!(
                "Callback {} from script '{}' failed: {}",
                self.id,
                self.script,
                format_js_error(ctx, e)
            );
        }
        run_pending_jobs(ctx);
    }
}

fn run_pending_jobs(ctx: &Ctx<'_>) {
    while ctx.execute_pending_job() {}
}

/// JS number to buffer offset; negatives and NaN become 0
fn to_offset(n: f64) -> usize {
    if n > 0.0 {
        n as usize
    } else {
        0
    }
}

fn to_js_number(n: usize) -> f64 {
    n as f64
}

/// `null` for a cancelled prompt or a failed deletion
fn nullable<'js>(ctx: &Ctx<'js>, value: Option<String>) -> rquickjs::Result<Value<'js>> {
    match value {
        Some(s) => s.into_js(ctx),
        None => Ok(Value::new_null(ctx.clone())),
    }
}

/// Error message with the JS exception's message and stack when available
fn format_js_error(ctx: &Ctx<'_>, err: rquickjs::Error) -> String {
    if err.is_exception() {
        let exc = ctx.catch();
        if let Some(obj) = exc.as_object() {
            let message: String = obj
                .get::<_, String>("message")
                .unwrap_or_else(|_| "Unknown error".to_string());
            let stack: String = obj.get::<_, String>("stack").unwrap_or_default();
            return if stack.is_empty() {
                message
            } else {
                format!("{}\n{}", message, stack)
            };
        }
        if let Some(s) = exc.as_string().and_then(|s| s.to_string().ok()) {
            return s;
        }
    }
    err.to_string()
}

fn install_api<'js>(
    ctx: &Ctx<'js>,
    script_name: &str,
    api: Arc<dyn EditorApi>,
    slot: ContextSlot,
) -> rquickjs::Result<()> {
    let globals = ctx.globals();
    globals.set(CALLBACKS, Array::new(ctx.clone())?)?;
    let obj = Object::new(ctx.clone())?;

    {
        let api = api.clone();
        let name = script_name.to_string();
        let slot = slot.clone();
        obj.set(
            "registerButton",
            Function::new(
                ctx.clone(),
                move |ctx: Ctx<'js>, label: String, func: Function<'js>| -> rquickjs::Result<()> {
                    let callback = JsCallback::register(&ctx, &slot, func, &name)?;
                    api.register_button(&label, Arc::new(move || callback.call0()));
                    Ok(())
                },
            )?,
        )?;
    }

    {
        let api = api.clone();
        let name = script_name.to_string();
        let slot = slot.clone();
        obj.set(
            "registerOnFunctionKeyEvent",
            Function::new(
                ctx.clone(),
                move |ctx: Ctx<'js>, key: String, func: Function<'js>| -> rquickjs::Result<bool> {
                    let key: FunctionKey = key
                        .parse()
                        .map_err(|e: String| Exception::throw_message(&ctx, &e))?;
                    let callback = JsCallback::register(&ctx, &slot, func, &name)?;
                    Ok(api
                        .register_on_function_key(key, Arc::new(move || callback.call0()))
                        .is_ok())
                },
            )?,
        )?;
    }

    {
        let api = api.clone();
        let name = script_name.to_string();
        let slot = slot.clone();
        obj.set(
            "registerTextModificationHandler",
            Function::new(
                ctx.clone(),
                move |ctx: Ctx<'js>, func: Function<'js>| -> rquickjs::Result<()> {
                    let callback = JsCallback::register(&ctx, &slot, func, &name)?;
                    api.register_text_modification_handler(Arc::new(
                        move |prev: &str, cur: &str| callback.call2(prev, cur),
                    ));
                    Ok(())
                },
            )?,
        )?;
    }

    {
        let api = api.clone();
        obj.set(
            "promptUser",
            Function::new(ctx.clone(), move |ctx: Ctx<'js>, prompt: String| {
                nullable(&ctx, api.prompt_user(&prompt))
            })?,
        )?;
    }

    {
        let api = api.clone();
        obj.set(
            "getLocale",
            Function::new(ctx.clone(), move || api.locale().to_string())?,
        )?;
    }

    {
        let api = api.clone();
        obj.set(
            "getCaretPosition",
            Function::new(ctx.clone(), move || to_js_number(api.caret_position()))?,
        )?;
    }

    {
        let api = api.clone();
        obj.set(
            "setCaretPosition",
            Function::new(ctx.clone(), move |pos: f64| {
                api.set_caret_position(to_offset(pos))
            })?,
        )?;
    }

    {
        let api = api.clone();
        obj.set(
            "getText",
            Function::new(ctx.clone(), move |start: Opt<f64>, end: Opt<f64>| {
                match (start.0, end.0) {
                    (Some(start), Some(end)) => api.text_range(to_offset(start), to_offset(end)),
                    (Some(start), None) => {
                        api.text_range(to_offset(start), api.text_length())
                    }
                    _ => api.text(),
                }
            })?,
        )?;
    }

    {
        let api = api.clone();
        obj.set(
            "getTextLength",
            Function::new(ctx.clone(), move || to_js_number(api.text_length()))?,
        )?;
    }

    {
        let api = api.clone();
        obj.set(
            "insertText",
            Function::new(ctx.clone(), move |text: String| api.insert_text(&text))?,
        )?;
    }

    {
        let api = api.clone();
        obj.set(
            "insertTextAt",
            Function::new(ctx.clone(), move |idx: f64, text: String| {
                api.insert_text_at(to_offset(idx), &text)
            })?,
        )?;
    }

    {
        let api = api.clone();
        obj.set(
            "deleteText",
            Function::new(ctx.clone(), move |ctx: Ctx<'js>, text: String| {
                nullable(&ctx, api.delete_text(&text))
            })?,
        )?;
    }

    {
        let api = api.clone();
        obj.set(
            "deleteRange",
            Function::new(ctx.clone(), move |ctx: Ctx<'js>, start: f64, end: f64| {
                nullable(&ctx, api.delete_range(to_offset(start), to_offset(end)))
            })?,
        )?;
    }

    {
        let api = api.clone();
        obj.set(
            "replaceText",
            Function::new(ctx.clone(), move |find: String, replace: String| {
                api.replace_text(&find, &replace)
            })?,
        )?;
    }

    obj.set(
        "highlightText",
        Function::new(ctx.clone(), move |start: f64, end: f64| {
            api.highlight_text(to_offset(start), to_offset(end))
        })?,
    )?;

    globals.set("api", obj)?;

    let console = Object::new(ctx.clone())?;
    for level in ["log", "warn", "error"] {
        let name = script_name.to_string();
        console.set(
            level,
            Function::new(ctx.clone(), move |args: Rest<Coerced<String>>| {
                let line = args
                    .0
                    .iter()
                    .map(|part| part.0.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                match level {
                    "error" => tracing::error!(target: "script", "{}: {}", name, line),
                    "warn" => tracing::warn!(target: "script", "{}: {}", name, line),
                    _ => tracing::info!(target: "script", "{}: {}", name, line),
                }
            })?,
        )?;
    }
    globals.set("console", console)?;

    Ok(())
}
