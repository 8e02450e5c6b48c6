pub async fn health() -> &'static str {
    tracing::debug!("health was called");
    "health is good"
}
