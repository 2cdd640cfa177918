use serde::{Deserialize, Deserializer};

/// Query parameters opcionales del endpoint de bootstrap.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct BootstrapQuery {
    /// Forzar refresh del cache (bypass de ambas capas).
    #[serde(rename = "forceRefresh", deserialize_with = "flag")]
    pub force_refresh: bool,

    /// Agrega el objeto `_debug` al body.
    #[serde(deserialize_with = "flag")]
    pub debug: bool,
}

/// Acepta `1`, `true`, `yes` y `on` (sin distinguir mayusculas); un valor vacio
/// (`?debug`) tambien cuenta como activado.
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "" | "1" | "true" | "yes" | "on"
    ))
}
