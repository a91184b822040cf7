//! Page and wiring handlers

use crate::ui::{EventBinding, BINDINGS};
use axum::{response::Html, Json};

const INDEX_HTML: &str = include_str!("../../../../assets/index.html");

/// Serve the research desk page
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Event binding table the page wires its buttons from
pub async fn ui_bindings() -> Json<&'static [EventBinding]> {
    Json(BINDINGS)
}
