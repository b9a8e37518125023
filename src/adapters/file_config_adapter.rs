//! INI file configuration adapter.

use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut config = Ini::new();
        config.load(path).map_err(std::io::Error::other)?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn sections(&self) -> Vec<String> {
        let mut sections = self.config.sections();
        sections.sort();
        sections
    }

    fn keys(&self, section: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .config
            .get_map_ref()
            .get(section)
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_config() {
        let content = r#"
[store]
backend = json
path = /tmp/stratbuilder.json

[backtest]
ticker = AAPL
days = 250

[buy.1.1]
kind = Rsi
timeperiod = 14
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(
            adapter.get_string("store", "path"),
            Some("/tmp/stratbuilder.json".to_string())
        );
        assert_eq!(adapter.get_string("buy.1.1", "kind"), Some("Rsi".to_string()));
        assert_eq!(adapter.get_int("backtest", "days", 100), 250);
    }

    #[test]
    fn values_keep_their_case() {
        let adapter = FileConfigAdapter::from_string("[buy.1.1]\nkind = HeikenAshi\n").unwrap();
        assert_eq!(
            adapter.get_string("buy.1.1", "kind"),
            Some("HeikenAshi".to_string())
        );
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string("[backtest]\ndays = 100\n").unwrap();
        assert_eq!(adapter.get_string("backtest", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn get_int_returns_default_for_missing_or_non_numeric() {
        let adapter = FileConfigAdapter::from_string("[backtest]\ndays = abc\n").unwrap();
        assert_eq!(adapter.get_int("backtest", "days", 42), 42);
        assert_eq!(adapter.get_int("backtest", "missing", 7), 7);
    }

    #[test]
    fn sections_are_sorted() {
        let adapter = FileConfigAdapter::from_string(
            "[sell.1.1]\nkind = Sma\n[buy.2.1]\nkind = Rsi\n[buy.1.1]\nkind = Macd\n",
        )
        .unwrap();
        assert_eq!(adapter.sections(), vec!["buy.1.1", "buy.2.1", "sell.1.1"]);
    }

    #[test]
    fn keys_are_sorted_and_missing_section_is_empty() {
        let adapter = FileConfigAdapter::from_string(
            "[buy.1.1]\ntrend = below\nkind = Macd\nslowperiod = 26\n",
        )
        .unwrap();
        assert_eq!(adapter.keys("buy.1.1"), vec!["kind", "slowperiod", "trend"]);
        assert!(adapter.keys("sell.1.1").is_empty());
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[store]\nbackend = memory\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("store", "backend"),
            Some("memory".to_string())
        );
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/strategy.ini");
        assert!(result.is_err());
    }
}
