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

    fn parse_bool(value: &str) -> Option<bool> {
        match value.to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        }
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

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
            .as_ref()
            .and_then(|v| Self::parse_bool(v))
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn from_string_parses_sections() {
        let content = r#"
[data]
path = ./data

[backtest]
ticker = AAPL
fee_rate = 0.0005
cooldown = 2

[strategy]
kind = sma_crossover
fast = 5
slow = 20
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(
            adapter.get_string("data", "path"),
            Some("./data".to_string())
        );
        assert_eq!(
            adapter.get_string("backtest", "ticker"),
            Some("AAPL".to_string())
        );
        assert_eq!(adapter.get_int("backtest", "cooldown", 0), 2);
        assert_eq!(adapter.get_double("backtest", "fee_rate", 0.0), 0.0005);
        assert_eq!(adapter.get_int("strategy", "fast", 0), 5);
    }

    #[test]
    fn missing_keys_return_none_or_default() {
        let adapter = FileConfigAdapter::from_string("[backtest]\nticker = AAPL\n").unwrap();
        assert_eq!(adapter.get_string("backtest", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
        assert_eq!(adapter.get_int("backtest", "cooldown", 7), 7);
        assert_eq!(adapter.get_double("backtest", "fee_rate", 0.5), 0.5);
    }

    #[test]
    fn non_numeric_values_fall_back_to_default() {
        let adapter =
            FileConfigAdapter::from_string("[backtest]\ncooldown = soon\nfee_rate = cheap\n")
                .unwrap();
        assert_eq!(adapter.get_int("backtest", "cooldown", 3), 3);
        assert_eq!(adapter.get_double("backtest", "fee_rate", 0.1), 0.1);
    }

    #[test]
    fn bool_parsing_variants() {
        let adapter = FileConfigAdapter::from_string(
            "[flags]\na = true\nb = yes\nc = 1\nd = false\ne = no\nf = 0\n",
        )
        .unwrap();
        assert!(adapter.get_bool("flags", "a", false));
        assert!(adapter.get_bool("flags", "b", false));
        assert!(adapter.get_bool("flags", "c", false));
        assert!(!adapter.get_bool("flags", "d", true));
        assert!(!adapter.get_bool("flags", "e", true));
        assert!(!adapter.get_bool("flags", "f", true));
        assert!(adapter.get_bool("flags", "missing", true));
    }

    #[test]
    fn from_file_reads_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[storage]\nledger_path = ./assets/trades.csv\n").unwrap();
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("storage", "ledger_path"),
            Some("./assets/trades.csv".to_string())
        );
    }

    #[test]
    fn from_file_missing_file_is_an_error() {
        assert!(FileConfigAdapter::from_file("/nonexistent/config.ini").is_err());
    }
}
