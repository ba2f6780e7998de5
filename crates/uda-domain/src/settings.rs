use std::{fs, io, path::Path};

use anyhow::{Context, Result};
use serde::Serialize;
use toml_edit::{value, DocumentMut, Item, Table};

/// The `[mirror]` table of `config.toml`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MirrorPreference {
    pub url: String,
    pub name: String,
    pub priority: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub mirror: Option<MirrorPreference>,
}

impl Settings {
    /// Reads `config.toml`; a missing file is an empty configuration.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => {
                return Err(err).with_context(|| format!("failed to read {}", path.display()))
            }
        };
        Self::parse(&contents).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let doc: DocumentMut = contents.parse()?;
        let mirror = doc.get("mirror").and_then(Item::as_table).map(|table| {
            let text = |key: &str| {
                table
                    .get(key)
                    .and_then(Item::as_str)
                    .map(ToOwned::to_owned)
                    .unwrap_or_default()
            };
            MirrorPreference {
                url: text("url"),
                name: text("name"),
                priority: table
                    .get("priority")
                    .and_then(Item::as_integer)
                    .unwrap_or_default(),
            }
        });
        Ok(Self { mirror })
    }

    /// Mirror URL when one is configured and non-empty.
    pub fn mirror_url(&self) -> Option<&str> {
        self.mirror
            .as_ref()
            .map(|mirror| mirror.url.trim())
            .filter(|url| !url.is_empty())
    }
}

/// Writes `preference` into `config.toml`, keeping unrelated keys intact.
pub fn save_mirror(path: &Path, preference: &MirrorPreference) -> Result<()> {
    let mut doc = match fs::read_to_string(path) {
        Ok(contents) => contents
            .parse::<DocumentMut>()
            .with_context(|| format!("failed to parse {}", path.display()))?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => DocumentMut::new(),
        Err(err) => return Err(err).with_context(|| format!("failed to read {}", path.display())),
    };
    let mut table = Table::new();
    table["url"] = value(preference.url.as_str());
    table["name"] = value(preference.name.as_str());
    table["priority"] = value(preference.priority);
    doc["mirror"] = Item::Table(table);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, doc.to_string()).with_context(|| format!("failed to write {}", path.display()))
}
