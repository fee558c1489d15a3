use axum::response::IntoResponse;

/// Undocumented landing route; useful as a liveness probe that skips the
/// database.
pub async fn root() -> impl IntoResponse {
    concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::to_bytes, response::IntoResponse};

    #[tokio::test]
    async fn root_reports_name_and_version() {
        let response = root().await.into_response();
        let bytes = to_bytes(response.into_body(), 1024).await.unwrap();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(body.starts_with(env!("CARGO_PKG_NAME")));
        assert!(body.ends_with(env!("CARGO_PKG_VERSION")));
    }
}
