//! Browser adapter: DOM surface, `localStorage`, `setTimeout` and the
//! JavaScript-facing [`WebBoard`].

pub mod bindings;
pub mod dom;
pub mod local_storage;
pub mod timer;

pub use bindings::WebBoard;
pub use dom::DomSurface;
pub use local_storage::LocalStorage;
pub use timer::WindowTimer;

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

/// CSS class names the board reads and writes.
///
/// Every field has a default, so a host only overrides what its stylesheet
/// names differently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DomClasses {
    pub column: String,
    pub card: String,
    pub dragged: String,
    pub placeholder: String,
    pub delete: String,
    pub add_link: String,
    pub add_button: String,
    pub input: String,
    pub input_container: String,
}

impl Default for DomClasses {
    fn default() -> Self {
        Self {
            column: "column".to_string(),
            card: "newCard".to_string(),
            dragged: "dragged".to_string(),
            placeholder: "placeholder".to_string(),
            delete: "deleteBtn".to_string(),
            add_link: "addLink".to_string(),
            add_button: "addBtn".to_string(),
            input: "input-title".to_string(),
            input_container: "inputContainer".to_string(),
        }
    }
}

impl DomClasses {
    /// Class selector for a configured class name
    pub fn selector(class: &str) -> String {
        format!(".{}", class)
    }
}

/// Routes `tracing` output to the browser console and installs the panic hook
#[wasm_bindgen(js_name = initLogging)]
pub fn init_web_logging() {
    console_error_panic_hook::set_once();
    // Keep a subscriber the host page installed first
    let _ = tracing_wasm::try_set_as_global_default();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_class_override() {
        let classes: DomClasses = serde_json::from_str(r#"{"card": "ticket"}"#).unwrap();
        assert_eq!(classes.card, "ticket");
        assert_eq!(classes.column, "column");
        assert_eq!(classes.input_container, "inputContainer");
    }
}
