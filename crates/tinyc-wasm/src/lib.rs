//! tinyc compiler as a WASM module for browser environments.
//!
//! This crate exposes the compilation pipeline via `wasm-bindgen`, suitable
//! for running in a browser Web Worker.
//!
//! # Usage (JavaScript)
//!
//! ```js
//! import init, { compile } from 'tinyc-wasm';
//!
//! await init();
//!
//! const result = JSON.parse(compile("int main() { return 7; }", "main.c"));
//! const { instance } = await WebAssembly.instantiate(new Uint8Array(result.wasm));
//! console.log(instance.exports.main()); // 7
//! ```

use wasm_bindgen::prelude::*;

/// Compile a tinyc source file to WASM.
///
/// Returns a JSON string containing a `CompileResult`:
/// ```json
/// {
///   "success": true,
///   "wasm": [0, 97, 115, 109, ...],
///   "errors": { "errors": [], "total_errors": 0 },
///   "source_hash": "…",
///   "wasm_hash": "…"
/// }
/// ```
///
/// On failure, `success` is `false`, `wasm` is `null`, and `errors` contains
/// structured error information.
#[wasm_bindgen]
pub fn compile(source: &str, filename: &str) -> String {
    let result = tinyc_compiler::compile_to_result(source, filename);
    serde_json::to_string(&result).unwrap_or_else(|e| {
        format!(
            r#"{{"success":false,"wasm":null,"errors":{{"errors":[{{"message":"Serialization error: {}"}}],"total_errors":1}}}}"#,
            e
        )
    })
}

/// Like [`compile`], but hands the result over as a JS object instead of
/// JSON text.
#[wasm_bindgen(js_name = compileToObject)]
pub fn compile_to_object(source: &str, filename: &str) -> Result<JsValue, JsValue> {
    let result = tinyc_compiler::compile_to_result(source, filename);
    serde_wasm_bindgen::to_value(&result).map_err(JsValue::from)
}

/// Lex and parse a source file without generating WASM.
///
/// Returns a JSON string containing structured errors. Faster than full
/// compilation when only diagnostics are needed (e.g., editor integration).
#[wasm_bindgen]
pub fn check(source: &str, filename: &str) -> String {
    let errors = tinyc_compiler::check(source, filename);
    serde_json::to_string(&errors).unwrap_or_else(|e| {
        format!(
            r#"{{"errors":[{{"message":"Serialization error: {}"}}],"total_errors":1}}"#,
            e
        )
    })
}

/// Return the compiler version string.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
