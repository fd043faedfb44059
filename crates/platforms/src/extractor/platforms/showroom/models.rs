use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct StreamingUrlResponse {
    #[serde(default)]
    pub streaming_url_list: Vec<StreamingUrl>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StreamingUrl {
    pub url: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(rename = "type", default)]
    pub stream_type: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub quality: Option<u32>,
}
