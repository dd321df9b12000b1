//! Offline cache worker for the taskdeck client.
//!
//! Static assets are served cache-first with a network fallback; API
//! requests always go to the network and synthesize a 503 JSON body when
//! the network is unreachable. The routing decisions live in plain
//! functions so they can be tested off-browser; the wasm glue that binds
//! them to the service-worker events is gated below.

/// Bump the suffix whenever the precached asset set changes; activation
/// drops every cache that does not carry the current name.
pub const CACHE_NAME: &str = "taskdeck-static-v1";

pub const API_PREFIX: &str = "/api/";

pub const OFFLINE_ERROR_MESSAGE: &str = "Offline - Please check your connection";

pub const PRECACHE_URLS: [&str; 6] = [
    "/",
    "/static/index.html",
    "/static/manifest.json",
    "/static/css/taskdeck.css",
    "/static/taskdeck_ui.js",
    "/static/taskdeck_ui_bg.wasm",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchDecision {
    /// Let the browser handle it (non-GET traffic).
    Ignore,
    /// Always hit the network; never serve or store a cached copy.
    NetworkOnly,
    /// Serve from cache, fall back to network, store good responses.
    CacheFirst,
}

pub fn classify_request(method: &str, url: &str) -> FetchDecision {
    if !method.eq_ignore_ascii_case("GET") {
        return FetchDecision::Ignore;
    }
    if url.contains(API_PREFIX) {
        return FetchDecision::NetworkOnly;
    }
    FetchDecision::CacheFirst
}

/// Only successful same-origin ("basic") responses are worth keeping; an
/// opaque or error response would poison the cache.
pub fn should_cache(status: u16, is_basic: bool) -> bool {
    status == 200 && is_basic
}

pub fn is_stale_cache(name: &str) -> bool {
    name != CACHE_NAME
}

pub fn offline_body() -> String {
    serde_json::json!({ "error": OFFLINE_ERROR_MESSAGE }).to_string()
}

#[cfg(target_arch = "wasm32")]
mod worker {
    use js_sys::{Array, Promise};
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::{future_to_promise, JsFuture};
    use web_sys::{
        Cache, CacheStorage, ExtendableEvent, FetchEvent, Headers, Request, RequestDestination,
        Response, ResponseInit, ResponseType, ServiceWorkerGlobalScope,
    };

    use crate::{
        classify_request, is_stale_cache, offline_body, should_cache, FetchDecision, CACHE_NAME,
        PRECACHE_URLS,
    };

    fn scope() -> Result<ServiceWorkerGlobalScope, JsValue> {
        js_sys::global()
            .dyn_into::<ServiceWorkerGlobalScope>()
            .map_err(|_| JsValue::from_str("global scope is not a service worker"))
    }

    fn caches() -> Result<CacheStorage, JsValue> {
        scope()?.caches()
    }

    async fn open_cache() -> Result<Cache, JsValue> {
        let opened = JsFuture::from(caches()?.open(CACHE_NAME)).await?;
        opened.dyn_into::<Cache>()
    }

    async fn precache() -> Result<JsValue, JsValue> {
        let cache = open_cache().await?;
        let urls = Array::new();
        for url in PRECACHE_URLS {
            urls.push(&JsValue::from_str(url));
        }
        JsFuture::from(cache.add_all_with_str_sequence(&urls)).await?;
        web_sys::console::log_1(&JsValue::from_str("taskdeck-sw: precache complete"));
        Ok(JsValue::UNDEFINED)
    }

    async fn drop_stale_caches() -> Result<JsValue, JsValue> {
        let storage = caches()?;
        let names = JsFuture::from(storage.keys()).await?;
        let names: Array = names.dyn_into()?;
        for name in names.iter() {
            if let Some(name) = name.as_string()
                && is_stale_cache(&name)
            {
                web_sys::console::log_1(&JsValue::from_str(&format!(
                    "taskdeck-sw: deleting stale cache {name}"
                )));
                JsFuture::from(storage.delete(&name)).await?;
            }
        }
        Ok(JsValue::UNDEFINED)
    }

    fn offline_response() -> Result<Response, JsValue> {
        let headers = Headers::new()?;
        headers.set("Content-Type", "application/json")?;
        let init = ResponseInit::new();
        init.set_status(503);
        init.set_headers(headers.as_ref());
        let body = offline_body();
        Response::new_with_opt_str_and_init(Some(body.as_str()), &init)
    }

    async fn network_only(request: Request) -> Result<JsValue, JsValue> {
        match JsFuture::from(scope()?.fetch_with_request(&request)).await {
            Ok(response) => Ok(response),
            Err(_) => offline_response().map(JsValue::from),
        }
    }

    async fn cache_first(request: Request) -> Result<JsValue, JsValue> {
        let storage = caches()?;
        let cached = JsFuture::from(storage.match_with_request(&request)).await?;
        if !cached.is_undefined() {
            return Ok(cached);
        }

        let destination = request.destination();
        let fetched = match JsFuture::from(scope()?.fetch_with_request(&request)).await {
            Ok(fetched) => fetched,
            Err(error) => {
                // Navigation requests fall back to the cached shell.
                if destination == RequestDestination::Document {
                    let shell = JsFuture::from(storage.match_with_str("/")).await?;
                    if !shell.is_undefined() {
                        return Ok(shell);
                    }
                }
                return Err(error);
            }
        };

        let response: Response = fetched.dyn_into()?;
        if should_cache(response.status(), response.type_() == ResponseType::Basic) {
            let copy = response.clone()?;
            let cache = open_cache().await?;
            JsFuture::from(cache.put_with_request(&request, &copy)).await?;
        }

        Ok(JsValue::from(response))
    }

    fn handle_fetch(event: FetchEvent) {
        let request = event.request();
        match classify_request(&request.method(), &request.url()) {
            FetchDecision::Ignore => {}
            FetchDecision::NetworkOnly => {
                let _ = event.respond_with(&future_to_promise(network_only(request)));
            }
            FetchDecision::CacheFirst => {
                let _ = event.respond_with(&future_to_promise(cache_first(request)));
            }
        }
    }

    #[wasm_bindgen(start)]
    pub fn register_handlers() -> Result<(), JsValue> {
        let scope = scope()?;

        let on_install = Closure::<dyn FnMut(ExtendableEvent)>::new(|event: ExtendableEvent| {
            let work: Promise = future_to_promise(precache());
            let _ = event.wait_until(&work);
        });
        scope.set_oninstall(Some(on_install.as_ref().unchecked_ref()));
        on_install.forget();

        let on_activate = Closure::<dyn FnMut(ExtendableEvent)>::new(|event: ExtendableEvent| {
            let work: Promise = future_to_promise(drop_stale_caches());
            let _ = event.wait_until(&work);
        });
        scope.set_onactivate(Some(on_activate.as_ref().unchecked_ref()));
        on_activate.forget();

        let on_fetch = Closure::<dyn FnMut(FetchEvent)>::new(handle_fetch);
        scope.set_onfetch(Some(on_fetch.as_ref().unchecked_ref()));
        on_fetch.forget();

        Ok(())
    }
}

#[cfg(test)]
mod routing_tests {
    use super::*;

    #[test]
    fn api_gets_always_bypass_the_cache() {
        assert_eq!(
            classify_request("GET", "https://app.example.com/api/todos/"),
            FetchDecision::NetworkOnly
        );
        assert_eq!(
            classify_request("GET", "https://app.example.com/api/stats/"),
            FetchDecision::NetworkOnly
        );
    }

    #[test]
    fn static_assets_are_cache_first() {
        assert_eq!(
            classify_request("GET", "https://app.example.com/static/taskdeck_ui.js"),
            FetchDecision::CacheFirst
        );
        assert_eq!(
            classify_request("GET", "https://app.example.com/"),
            FetchDecision::CacheFirst
        );
    }

    #[test]
    fn non_get_requests_are_never_intercepted() {
        assert_eq!(
            classify_request("POST", "https://app.example.com/api/todos/"),
            FetchDecision::Ignore
        );
        assert_eq!(
            classify_request("PUT", "https://app.example.com/static/index.html"),
            FetchDecision::Ignore
        );
        // HTTP methods compare case-insensitively.
        assert_eq!(
            classify_request("get", "https://app.example.com/static/index.html"),
            FetchDecision::CacheFirst
        );
    }

    #[test]
    fn only_basic_200_responses_are_cached() {
        assert!(should_cache(200, true));
        assert!(!should_cache(200, false));
        assert!(!should_cache(304, true));
        assert!(!should_cache(404, true));
        assert!(!should_cache(500, true));
    }

    #[test]
    fn stale_caches_are_everything_but_the_current_version() {
        assert!(is_stale_cache("taskdeck-static-v0"));
        assert!(is_stale_cache("some-other-app"));
        assert!(!is_stale_cache(CACHE_NAME));
    }

    #[test]
    fn offline_body_matches_the_wire_contract() {
        assert_eq!(
            offline_body(),
            r#"{"error":"Offline - Please check your connection"}"#
        );
    }
}
