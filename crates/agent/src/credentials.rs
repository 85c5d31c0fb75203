use std::path::Path;

use anyhow::{bail, Context, Result};

/// Telegram web-app init data used to authenticate against the game API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitData {
    pairs: Vec<(String, String)>,
}

impl InitData {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read credentials {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("parse credentials {}", path.display()))
    }

    /// Decode a URL-encoded init-data string.
    ///
    /// Everything after the `hash` key is dropped; the server rejects
    /// signatures over extra keys.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            bail!("init data is empty");
        }
        let decoded = urlencoding::decode(raw).context("percent-decode init data")?;
        let mut pairs: Vec<(String, String)> = url::form_urlencoded::parse(decoded.as_bytes())
            .into_owned()
            .filter(|(_, v)| !v.is_empty())
            .collect();

        let Some(hash_at) = pairs.iter().position(|(k, _)| k == "hash") else {
            bail!("init data has no hash");
        };
        pairs.truncate(hash_at + 1);
        Ok(Self { pairs })
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_keys_after_hash() {
        let data = InitData::parse(
            "query_id%3DAAH1%26user%3D%257B%2522id%2522%253A1%257D%26auth_date%3D1700000000%26hash%3Dabc123%26tgWebAppVersion%3D7.0",
        )
        .unwrap();
        let keys: Vec<_> = data.pairs().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["query_id", "user", "auth_date", "hash"]);
        assert_eq!(data.get("hash"), Some("abc123"));
        assert_eq!(data.get("user"), Some(r#"{"id":1}"#));
        assert_eq!(data.get("tgWebAppVersion"), None);
    }

    #[test]
    fn plain_query_string_is_accepted() {
        let data = InitData::parse("auth_date=1&hash=ff\n").unwrap();
        assert_eq!(data.pairs().len(), 2);
    }

    #[test]
    fn rejects_missing_hash_and_empty_input() {
        assert!(InitData::parse("auth_date=1&user=x").is_err());
        assert!(InitData::parse("   ").is_err());
    }
}
