use crate::config::Config;

/// Look up an illustration for a mood keyword. Best-effort: any failure
/// (missing key, network, empty result set) resolves to None and the entry
/// is saved without an image.
pub async fn fetch_mood_image(config: &Config, query: &str) -> Option<String> {
    if config.pixabay_api_key.is_empty() {
        return None;
    }

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .ok()?;

    let response = client
        .get("https://pixabay.com/api/")
        .query(&[
            ("q", query),
            ("key", config.pixabay_api_key.as_str()),
            ("min_width", "1280"),
            ("min_height", "720"),
            ("image_type", "photo"),
            ("orientation", "horizontal"),
        ])
        .send()
        .await
        .ok()?;

    if !response.status().is_success() {
        tracing::warn!(status = %response.status(), "Pixabay lookup failed");
        return None;
    }

    let body: serde_json::Value = response.json().await.ok()?;
    body["hits"][0]["largeImageURL"]
        .as_str()
        .map(|url| url.to_string())
}
