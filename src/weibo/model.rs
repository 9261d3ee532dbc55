use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Mblog {
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub id: i64,
    #[serde(default, rename = "mblogid")]
    pub mblog_id: String,
    #[serde(default)]
    pub text_raw: String,
    #[serde(default, rename = "isLongText")]
    pub is_long_text: bool,
    #[serde(skip)]
    pub long_text: Option<String>,
}

impl Mblog {
    /// Canonical text of the post: the expanded long text when it was
    /// fetched, otherwise `text_raw`.
    pub fn the_text(&self) -> &str {
        self.long_text.as_deref().unwrap_or(&self.text_raw)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiEnvelope<T> {
    #[serde(default)]
    pub ok: i64,
    #[serde(default)]
    pub msg: String,
    pub data: Option<T>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TimelinePage {
    #[serde(default)]
    pub list: Vec<Mblog>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LongText {
    #[serde(default, rename = "longTextContent")]
    pub long_text_content: String,
}
