use std::collections::HashMap;

use log::debug;
use wasm_bindgen::JsValue;

use crate::url_state::{QueryString, UrlStateAdapter};

/// The real address bar: reads `location.search`, writes through
/// `history.replaceState` so no navigation entry is added.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserUrl;

impl BrowserUrl {
    fn search() -> Option<String> {
        web_sys::window()?.location().search().ok()
    }
}

impl UrlStateAdapter for BrowserUrl {
    fn read(&self) -> HashMap<String, String> {
        Self::search()
            .map(|search| QueryString::parse(&search).to_map())
            .unwrap_or_default()
    }

    fn write(&self, key: &str, value: &str) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let location = window.location();
        let mut query = QueryString::parse(&location.search().unwrap_or_default());
        query.set(key, value);
        let path = location.pathname().unwrap_or_default();
        let hash = location.hash().unwrap_or_default();
        let new_url = format!("{path}?{}{hash}", query.encode());
        let written = window
            .history()
            .and_then(|history| history.replace_state_with_url(&JsValue::NULL, "", Some(&new_url)));
        if let Err(e) = written {
            debug!("url write {}={} failed: {:?}", key, value, e);
        }
    }
}
