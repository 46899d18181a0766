use std::{collections::HashMap, fs, path::Path};

use chrono::{
    Locale,
    format::{Item, StrftimeItems},
};
use color_eyre::eyre::{self, WrapErr as _, bail, ensure, eyre};
use serde::Deserialize;

/// Everything the report needs to know besides the input rows.
///
/// Every field has a default, so an empty TOML document is a valid config.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    pub input_date_format: String,
    pub period_format: String,
    pub locale: Option<String>,
    pub decimals: i16,
    /// Fields that make up the classification path, outermost first.
    pub nesting: Vec<String>,
    pub date_field: String,
    pub amount_field: String,
    pub price_field: String,
    /// field -> raw value -> display label
    pub aliases: HashMap<String, HashMap<String, String>>,
    /// field -> label used when the field is empty
    pub placeholders: HashMap<String, String>,
    pub layout: LayoutConfig,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    pub aside_width: usize,
    pub aside_max_width: usize,
    pub column_width: usize,
    pub total_caption: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            input_date_format: "%Y-%m-%d".to_owned(),
            period_format: "%b %Y".to_owned(),
            locale: Some("ru_RU".to_owned()),
            decimals: 2,
            nesting: ["type", "shop", "category", "name"]
                .map(str::to_owned)
                .to_vec(),
            date_field: "date".to_owned(),
            amount_field: "amount".to_owned(),
            price_field: "price".to_owned(),
            aliases: HashMap::from([(
                "type".to_owned(),
                HashMap::from([
                    ("sale".to_owned(), "Продажи".to_owned()),
                    ("buy".to_owned(), "Покупки".to_owned()),
                ]),
            )]),
            placeholders: HashMap::from([("category".to_owned(), "Без категории".to_owned())]),
            layout: LayoutConfig::default(),
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            aside_width: 4,
            aside_max_width: 60,
            column_width: 12,
            total_caption: "итог".to_owned(),
        }
    }
}

impl ReportConfig {
    pub fn from_toml(source: &str) -> eyre::Result<Self> {
        let config: Self = toml::from_str(source).wrap_err("Invalid report config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> eyre::Result<Self> {
        let source = fs::read_to_string(path)
            .wrap_err_with(|| format!("Cannot read config file {}", path.display()))?;
        Self::from_toml(&source).wrap_err_with(|| format!("In config file {}", path.display()))
    }

    pub fn validate(&self) -> eyre::Result<()> {
        ensure!(!self.nesting.is_empty(), "`nesting` must name at least one field");

        for (i, field) in self.nesting.iter().enumerate() {
            if self.nesting[..i].contains(field) {
                bail!("`nesting` lists field '{field}' more than once");
            }
        }

        ensure!(
            (0..=18).contains(&self.decimals),
            "`decimals` must be between 0 and 18, got {}",
            self.decimals
        );
        ensure!(
            self.layout.column_width > 0,
            "`layout.column_width` must be positive"
        );

        for (key, format) in [
            ("input_date_format", &self.input_date_format),
            ("period_format", &self.period_format),
        ] {
            ensure!(
                !StrftimeItems::new(format).any(|item| matches!(item, Item::Error)),
                "`{key}` is not a valid date pattern: '{format}'"
            );
        }

        self.chrono_locale()?;
        Ok(())
    }

    /// The locale period labels are rendered in. An empty name turns
    /// localization off.
    pub fn chrono_locale(&self) -> eyre::Result<Option<Locale>> {
        self.locale
            .as_deref()
            .filter(|name| !name.is_empty())
            .map(|name| Locale::try_from(name).map_err(|_| eyre!("Unknown locale '{name}'")))
            .transpose()
    }
}
