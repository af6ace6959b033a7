use axum::response::Html;

/// Static upload page; everything else is fetch calls against the API.
pub async fn index_page() -> Html<&'static str> {
    Html(include_str!("../../static/index.html"))
}
