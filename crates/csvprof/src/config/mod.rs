//! Run configuration loaded from TOML.
//!
//! ```toml
//! [files]
//! csv_file = "data/input.csv"
//! param_file = "params.csv"
//! error_csv_file = "out/errors.csv"
//!
//! [dialect]
//! delimiter = ","
//! quoting = "QUOTE_MINIMAL"
//! has_header = true
//!
//! [output]
//! output_error_csv = true
//! error_limit = 100
//!
//! [user]
//! lookup_states = ["AK", "AL"]
//! lookup_codes = "import codes lookup"
//! regex_sku = "[A-Z]{3}-[0-9]{4}"
//! ```

pub mod params;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use encoding_rs::Encoding;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ProfilerError, Result};
use crate::external::ExternalFiles;

pub use params::{read_params, parse_params, CategoryLimits, ColumnConfig, ProfileMode};

/// Complete configuration for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Directory of the configuration file; relative paths resolve here.
    pub base_dir: PathBuf,
    pub files: FilesConfig,
    pub dialect: Dialect,
    pub output: OutputConfig,
    pub user: UserItems,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    files: FilesConfig,
    #[serde(default)]
    dialect: Dialect,
    #[serde(default)]
    output: OutputConfig,
    #[serde(default)]
    user: IndexMap<String, RawUserValue>,
}

/// Input and output file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilesConfig {
    pub csv_file: PathBuf,
    pub param_file: PathBuf,
    #[serde(default)]
    pub report_file: Option<PathBuf>,
    #[serde(default)]
    pub error_csv_file: Option<PathBuf>,
    #[serde(default)]
    pub error_log_file: Option<PathBuf>,
}

/// Python-style quoting modes. Reading treats every mode except
/// `QUOTE_NONE` alike; writing maps onto [`csv::QuoteStyle`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuotingMode {
    #[default]
    #[serde(rename = "QUOTE_MINIMAL")]
    Minimal,
    #[serde(rename = "QUOTE_ALL")]
    All,
    #[serde(rename = "QUOTE_NONNUMERIC")]
    NonNumeric,
    #[serde(rename = "QUOTE_NONE")]
    None,
}

impl QuotingMode {
    pub fn quote_style(&self) -> csv::QuoteStyle {
        match self {
            QuotingMode::Minimal => csv::QuoteStyle::Necessary,
            QuotingMode::All => csv::QuoteStyle::Always,
            QuotingMode::NonNumeric => csv::QuoteStyle::NonNumeric,
            QuotingMode::None => csv::QuoteStyle::Never,
        }
    }
}

/// How rows of the input file are framed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Dialect {
    #[serde(deserialize_with = "de_char")]
    pub delimiter: char,
    #[serde(deserialize_with = "de_opt_char")]
    pub quotechar: Option<char>,
    #[serde(deserialize_with = "de_opt_char")]
    pub escapechar: Option<char>,
    pub doublequote: bool,
    pub quoting: QuotingMode,
    pub has_header: bool,
    pub encoding: String,
}

impl Default for Dialect {
    fn default() -> Self {
        Self {
            delimiter: ',',
            quotechar: Some('"'),
            escapechar: None,
            doublequote: true,
            quoting: QuotingMode::Minimal,
            has_header: true,
            encoding: "utf-8".to_string(),
        }
    }
}

impl Dialect {
    pub fn delimiter_byte(&self) -> Result<u8> {
        ascii_byte("delimiter", self.delimiter)
    }

    /// `None` when quoting is disabled.
    pub fn quote_byte(&self) -> Result<Option<u8>> {
        if self.quoting == QuotingMode::None {
            return Ok(None);
        }
        self.quotechar.map(|c| ascii_byte("quotechar", c)).transpose()
    }

    pub fn escape_byte(&self) -> Result<Option<u8>> {
        self.escapechar.map(|c| ascii_byte("escapechar", c)).transpose()
    }

    pub fn encoding(&self) -> Result<&'static Encoding> {
        Encoding::for_label(self.encoding.trim().as_bytes()).ok_or_else(|| {
            ProfilerError::Config(format!("unknown encoding '{}'", self.encoding))
        })
    }

    fn validate(&self) -> Result<()> {
        self.delimiter_byte()?;
        self.quote_byte()?;
        self.escape_byte()?;
        self.encoding()?;
        Ok(())
    }
}

fn ascii_byte(name: &str, c: char) -> Result<u8> {
    if c.is_ascii() {
        Ok(c as u8)
    } else {
        Err(ProfilerError::Config(format!("{name} must be a single ASCII character, got '{c}'")))
    }
}

fn de_char<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<char, D::Error> {
    let s = String::deserialize(deserializer)?;
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(serde::de::Error::custom(format!("expected a single character, got \"{s}\""))),
    }
}

fn de_opt_char<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<char>, D::Error> {
    let s = String::deserialize(deserializer)?;
    if s.is_empty() || s == "None" {
        return Ok(None);
    }
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(Some(c)),
        _ => Err(serde::de::Error::custom(format!("expected a single character or \"None\", got \"{s}\""))),
    }
}

/// Error artifact and reporting switches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub output_error_csv: bool,
    pub output_error_log: bool,
    /// Column whose raw value keys log lines; 0 uses the record number.
    pub key_colnum: usize,
    /// Records for which error output may be written; `None` is unlimited.
    #[serde(deserialize_with = "de_limit")]
    pub error_limit: Option<u64>,
    pub verbose: bool,
}

impl OutputConfig {
    /// Whether any error artifact can be produced at all.
    pub fn writes_artifacts(&self) -> bool {
        self.error_limit != Some(0) && (self.output_error_csv || self.output_error_log)
    }
}

fn de_limit<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<u64>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Limit {
        Count(u64),
        Text(String),
    }

    match Limit::deserialize(deserializer)? {
        Limit::Count(n) => Ok(Some(n)),
        Limit::Text(s) if s.trim().is_empty() => Ok(None),
        Limit::Text(s) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("error_limit must be a count, got \"{s}\""))),
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawUserValue {
    Text(String),
    List(Vec<String>),
    File { file: PathBuf },
}

/// A user-defined `lookup_*`, `regex_*` or `xcheck_*` entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UserItem {
    /// `import <module> <function>`: bind a registered lookup provider.
    Import { module: String, function: String },
    /// Inline regex pattern.
    Pattern(String),
    /// Inline lookup values.
    List(Vec<String>),
    /// External file location overriding `<name>.txt`/`<name>.csv`.
    File(PathBuf),
}

impl fmt::Display for UserItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserItem::Import { module, function } => write!(f, "import {module} {function}"),
            UserItem::Pattern(p) => write!(f, "{p}"),
            UserItem::List(values) => write!(f, "[{}]", values.join(", ")),
            UserItem::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// User-defined items keyed by test identifier, in file order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserItems(IndexMap<String, UserItem>);

impl UserItems {
    pub fn get(&self, name: &str) -> Option<&UserItem> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &UserItem)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn insert(&mut self, name: impl Into<String>, item: UserItem) {
        self.0.insert(name.into(), item);
    }

    fn from_raw(raw: IndexMap<String, RawUserValue>, base_dir: &Path) -> Result<Self> {
        let mut items = IndexMap::new();
        for (name, value) in raw {
            let family = ["lookup_", "regex_", "xcheck_"]
                .into_iter()
                .find(|prefix| name.starts_with(prefix) && name.len() > prefix.len())
                .ok_or_else(|| {
                    ProfilerError::Config(format!(
                        "user item '{name}' must be named lookup_<name>, regex_<name> or xcheck_<name>"
                    ))
                })?;

            let item = match value {
                RawUserValue::Text(text) if text.trim().is_empty() => continue,
                RawUserValue::Text(text) if text.starts_with("import ") => {
                    let parts: Vec<&str> = text.split_whitespace().collect();
                    match (family, parts.as_slice()) {
                        ("lookup_", [_, module, function]) => UserItem::Import {
                            module: module.to_string(),
                            function: function.to_string(),
                        },
                        ("lookup_", _) => {
                            return Err(ProfilerError::Config(format!(
                                "{name}: expected \"import <module> <function>\", got \"{text}\""
                            )))
                        }
                        _ => {
                            return Err(ProfilerError::Config(format!(
                                "{name}: import directives are only valid for lookup_ items"
                            )))
                        }
                    }
                }
                RawUserValue::Text(text) if family == "regex_" => UserItem::Pattern(text),
                RawUserValue::Text(text) => UserItem::File(base_dir.join(text.trim())),
                RawUserValue::File { file } => UserItem::File(base_dir.join(file)),
                RawUserValue::List(values) if family != "regex_" => UserItem::List(values),
                RawUserValue::List(_) => {
                    return Err(ProfilerError::Config(format!(
                        "{name}: value lists are only valid for lookup_ and xcheck_ items"
                    )))
                }
            };
            items.insert(name, item);
        }
        Ok(Self(items))
    }
}

impl RunConfig {
    /// Load a configuration file; relative paths resolve against its directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ProfilerError::io(path, e))?;
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self::from_toml(&contents, base_dir)
    }

    /// Parse configuration text.
    pub fn from_toml(contents: &str, base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        let raw: RawConfig = toml::from_str(contents)?;

        let mut files = raw.files;
        files.csv_file = base_dir.join(&files.csv_file);
        files.param_file = base_dir.join(&files.param_file);
        for path in [
            &mut files.report_file,
            &mut files.error_csv_file,
            &mut files.error_log_file,
        ]
        .into_iter()
        .flatten()
        {
            *path = base_dir.join(&*path);
        }

        raw.dialect.validate()?;
        let user = UserItems::from_raw(raw.user, &base_dir)?;

        let config = Self {
            base_dir,
            files,
            dialect: raw.dialect,
            output: raw.output,
            user,
        };
        config.validate_outputs()?;
        Ok(config)
    }

    fn validate_outputs(&self) -> Result<()> {
        if self.output.output_error_csv && self.files.error_csv_file.is_none() {
            return Err(ProfilerError::Config(
                "output_error_csv requires files.error_csv_file".to_string(),
            ));
        }
        if self.output.output_error_log && self.files.error_log_file.is_none() {
            return Err(ProfilerError::Config(
                "output_error_log requires files.error_log_file".to_string(),
            ));
        }
        Ok(())
    }

    /// Directory external lookup, regex and xcheck files are read from.
    pub fn param_dir(&self) -> PathBuf {
        self.files
            .param_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.base_dir.clone())
    }

    /// External file loader honoring `{ file = ... }` overrides.
    pub fn external_files(&self) -> Result<ExternalFiles> {
        let mut files = ExternalFiles::new(self.param_dir(), self.dialect.encoding()?);
        for (name, item) in self.user.iter() {
            if let UserItem::File(path) = item {
                files = files.with_override(name, path);
            }
        }
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[files]
csv_file = "input.csv"
param_file = "params/params.csv"
"#;

    #[test]
    fn test_minimal_config_defaults() {
        let config = RunConfig::from_toml(MINIMAL, "/work").unwrap();
        assert_eq!(config.files.csv_file, PathBuf::from("/work/input.csv"));
        assert_eq!(config.param_dir(), PathBuf::from("/work/params"));
        assert_eq!(config.dialect.delimiter, ',');
        assert_eq!(config.dialect.quote_byte().unwrap(), Some(b'"'));
        assert!(config.dialect.has_header);
        assert_eq!(config.output.error_limit, None);
        assert!(!config.output.writes_artifacts());
        assert!(config.user.is_empty());
    }

    #[test]
    fn test_full_config() {
        let text = r#"
[files]
csv_file = "input.csv"
param_file = "params.csv"
error_csv_file = "out/errors.csv"
error_log_file = "out/errors.log"

[dialect]
delimiter = "|"
quotechar = "None"
escapechar = "\\"
doublequote = false
quoting = "QUOTE_NONE"
has_header = false
encoding = "latin1"

[output]
output_error_csv = true
output_error_log = true
key_colnum = 2
error_limit = 50
verbose = true

[user]
lookup_states = ["AK", "AL"]
lookup_codes = "import codes lookup"
lookup_zips = "zips.list"
regex_sku = "[A-Z]{3}-[0-9]{4}"
regex_blank = ""
xcheck_geo = { file = "geo.csv" }
"#;
        let config = RunConfig::from_toml(text, "/work").unwrap();
        assert_eq!(config.dialect.delimiter_byte().unwrap(), b'|');
        assert_eq!(config.dialect.quote_byte().unwrap(), None);
        assert_eq!(config.dialect.escape_byte().unwrap(), Some(b'\\'));
        assert_eq!(config.dialect.quoting.quote_style(), csv::QuoteStyle::Never);
        assert_eq!(config.dialect.encoding().unwrap(), encoding_rs::WINDOWS_1252);
        assert_eq!(config.output.error_limit, Some(50));
        assert!(config.output.writes_artifacts());

        assert_eq!(
            config.user.get("lookup_states"),
            Some(&UserItem::List(vec!["AK".into(), "AL".into()]))
        );
        assert_eq!(
            config.user.get("lookup_codes"),
            Some(&UserItem::Import {
                module: "codes".into(),
                function: "lookup".into()
            })
        );
        assert_eq!(
            config.user.get("lookup_zips"),
            Some(&UserItem::File(PathBuf::from("/work/zips.list")))
        );
        assert_eq!(
            config.user.get("regex_sku"),
            Some(&UserItem::Pattern("[A-Z]{3}-[0-9]{4}".into()))
        );
        assert_eq!(config.user.get("regex_blank"), None);
        assert_eq!(
            config.user.get("xcheck_geo"),
            Some(&UserItem::File(PathBuf::from("/work/geo.csv")))
        );
    }

    #[test]
    fn test_blank_error_limit_is_unlimited() {
        let text = format!("{MINIMAL}\n[output]\nerror_limit = \"\"\n");
        let config = RunConfig::from_toml(&text, "/work").unwrap();
        assert_eq!(config.output.error_limit, None);

        let text = format!("{MINIMAL}\n[output]\nerror_limit = 0\noutput_error_log = true\n");
        assert!(RunConfig::from_toml(&text, "/work").is_err());
    }

    #[test]
    fn test_zero_limit_disables_artifacts() {
        let text = format!(
            "{MINIMAL}error_log_file = \"e.log\"\n[output]\nerror_limit = 0\noutput_error_log = true\n"
        );
        let config = RunConfig::from_toml(&text, "/work").unwrap();
        assert!(!config.output.writes_artifacts());
    }

    #[test]
    fn test_rejects_bad_user_items() {
        let bad = [
            "[user]\nstates = [\"AK\"]\n",
            "[user]\nlookup_ = [\"AK\"]\n",
            "[user]\nregex_x = \"import a b\"\n",
            "[user]\nlookup_x = \"import a\"\n",
            "[user]\nregex_x = [\"a\", \"b\"]\n",
        ];
        for user in bad {
            let text = format!("{MINIMAL}{user}");
            assert!(
                matches!(RunConfig::from_toml(&text, "/work"), Err(ProfilerError::Config(_))),
                "accepted {user}"
            );
        }
    }

    #[test]
    fn test_xcheck_test_list() {
        let text = format!("{MINIMAL}[user]\nxcheck_geo = [\"US\", \"CA\"]\n");
        let config = RunConfig::from_toml(&text, "/work").unwrap();
        assert_eq!(
            config.user.get("xcheck_geo"),
            Some(&UserItem::List(vec!["US".into(), "CA".into()]))
        );
    }

    #[test]
    fn test_rejects_bad_dialect() {
        let text = format!("{MINIMAL}[dialect]\ndelimiter = \"::\"\n");
        assert!(matches!(RunConfig::from_toml(&text, "/work"), Err(ProfilerError::Toml(_))));

        let text = format!("{MINIMAL}[dialect]\nencoding = \"klingon\"\n");
        assert!(matches!(RunConfig::from_toml(&text, "/work"), Err(ProfilerError::Config(_))));
    }

    #[test]
    fn test_missing_required_file_key() {
        let text = "[files]\ncsv_file = \"input.csv\"\n";
        assert!(matches!(RunConfig::from_toml(text, "/work"), Err(ProfilerError::Toml(_))));
    }
}
