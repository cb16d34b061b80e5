//! WASM bindings for the radial-core library.
//!
//! All functions exposed to JavaScript via wasm-bindgen are defined here.
//! Everything crosses the boundary as JSON strings; failures come back as
//! `{ "error": { "kind", "message", "node_id" } }`.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use wasm_bindgen::prelude::*;

use crate::error::LayoutError;
use crate::hierarchy::{sample, VisibilityState, WeightedNode};
use crate::layout::{self, ChartSize, LayoutConfig};
use crate::output::{ChartOutput, ErrorInfo};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console, js_name = log)]
    pub fn console_log(s: &str);

    #[wasm_bindgen(js_namespace = console, js_name = error)]
    pub fn console_error(s: &str);
}

/// Compute a full chart layout.
///
/// `visibility_json` and `config_json` may be empty: every segment is then
/// visible, and the default configuration is used.
#[wasm_bindgen]
pub fn layout_chart(
    data_json: &str,
    visibility_json: &str,
    width: f64,
    height: f64,
    config_json: &str,
) -> String {
    let result = (|| -> Result<ChartOutput, LayoutError> {
        let raw: WeightedNode = serde_json::from_str(data_json)?;
        let visibility = if visibility_json.trim().is_empty() {
            VisibilityState::all_visible(&raw)
        } else {
            parse(visibility_json)?
        };
        let config: LayoutConfig = if config_json.trim().is_empty() {
            LayoutConfig::default()
        } else {
            parse(config_json)?
        };
        let size = ChartSize::Dimensions { width, height };
        let chart = layout::layout_chart(&raw, &visibility, size, &config)?;
        if chart.fit_exhausted() {
            console_log("layout: some circles could not be fitted within the iteration cap");
        }
        Ok(ChartOutput::from(chart))
    })();

    match result {
        Ok(output) => to_json(&output),
        Err(e) => {
            console_error(&format!("Error computing layout: {}", e));
            to_json(&ChartOutput::from_error(&e))
        }
    }
}

/// Initial visibility for a dataset: all top-level segments, none expanded.
#[wasm_bindgen]
pub fn initial_visibility(data_json: &str) -> String {
    match parse::<WeightedNode>(data_json) {
        Ok(raw) => to_json(&VisibilityState::all_visible(&raw)),
        Err(e) => error_json(&e),
    }
}

/// Show or hide a segment. Hiding also collapses it.
#[wasm_bindgen]
pub fn set_visible(visibility_json: &str, id: &str, visible: bool) -> String {
    match parse::<VisibilityState>(visibility_json) {
        Ok(state) => to_json(&state.with_visible(id, visible)),
        Err(e) => error_json(&e),
    }
}

/// Expand a collapsed segment into its sub-segments, or collapse it back.
#[wasm_bindgen]
pub fn toggle_expanded(visibility_json: &str, id: &str) -> String {
    match parse::<VisibilityState>(visibility_json) {
        Ok(state) => to_json(&state.toggle_expanded(id)),
        Err(e) => error_json(&e),
    }
}

/// The built-in demo dataset.
#[wasm_bindgen]
pub fn sample_data() -> String {
    to_json(&sample::segment_tree())
}

fn parse<T: DeserializeOwned>(input: &str) -> Result<T, LayoutError> {
    Ok(serde_json::from_str(input)?)
}

fn error_json(e: &LayoutError) -> String {
    console_error(&format!("Error: {}", e));
    json!({ "error": ErrorInfo::from(e) }).to_string()
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        console_error(&format!("Error serializing output: {}", e));
        json!({ "error": { "kind": "invalid_input", "message": e.to_string() } }).to_string()
    })
}
