use serde::Deserialize;

/// Browse API `item_summary/search` response. Only the fields we map.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPagedCollection {
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub item_summaries: Vec<ItemSummary>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSummary {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub price: Option<ConvertedAmount>,
    #[serde(default)]
    pub item_web_url: Option<String>,
    #[serde(default)]
    pub image: Option<Image>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConvertedAmount {
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
}

impl ConvertedAmount {
    /// `"USD 24.99"`, or just the value when the currency is missing.
    pub fn display(&self) -> Option<String> {
        let value = self.value.as_deref().map(str::trim).filter(|v| !v.is_empty())?;
        match self.currency.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            Some(currency) => Some(format!("{} {}", currency, value)),
            None => Some(value.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    #[serde(default)]
    pub image_url: Option<String>,
}
