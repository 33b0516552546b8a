use serde::{Deserialize, Deserializer, de::Error};

/// Trimmed string that must not be blank.
pub fn deserialize_non_empty_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(D::Error::custom("value must not be blank"));
    }
    Ok(trimmed.to_string())
}

/// Optional string where a blank value counts as absent.
pub fn deserialize_optional_non_blank<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = Option::<String>::deserialize(deserializer)?;
    Ok(s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
}
