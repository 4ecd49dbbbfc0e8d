use std::{collections::BTreeSet, fs, ops::Range, path::Path, path::PathBuf};

use anyhow::{Context, Result};
use owo_colors::AnsiColors;
use serde::Deserialize;

/// Everything a sweep or a chart needs to know, loaded from a TOML file or
/// taken from the defaults below.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
  /// Interpreters under test, in sweep order.
  pub languages: Vec<Language>,
  /// Program run by the sizes sweep.
  pub program: PathBuf,
  /// Input sizes of the sizes sweep, passed as the program's argument.
  pub sizes: Range<u64>,
  /// Repetitions per (language, size).
  pub trials: usize,
  /// Directory holding the named benchmarks.
  pub benchmark_dir: PathBuf,
  /// File extension of the named benchmarks.
  pub extension: String,
  /// Named benchmarks, in sweep order.
  pub benchmarks: Vec<String>,
  /// Benchmarks left out of the bar chart.
  pub excluded: Vec<String>,
  pub chart: ChartConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Language {
  pub name: String,
  /// Command prefix, e.g. `["bundle", "exec", "rubylox"]`. The program path
  /// (and the size, if any) is appended to it.
  pub command: Vec<String>,
  #[serde(default)]
  pub color: Option<Color>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChartConfig {
  /// Columns used by the bars of a chart.
  pub width: usize,
  pub trend_title: String,
  pub bars_title: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
  Red,
  Blue,
  Green,
  Yellow,
  Magenta,
  Cyan,
}

const PALETTE: [Color; 6] = [
  Color::Red,
  Color::Blue,
  Color::Green,
  Color::Yellow,
  Color::Magenta,
  Color::Cyan,
];

impl From<Color> for AnsiColors {
  fn from(color: Color) -> Self {
    match color {
      Color::Red => AnsiColors::BrightRed,
      Color::Blue => AnsiColors::BrightBlue,
      Color::Green => AnsiColors::BrightGreen,
      Color::Yellow => AnsiColors::BrightYellow,
      Color::Magenta => AnsiColors::BrightMagenta,
      Color::Cyan => AnsiColors::BrightCyan,
    }
  }
}

impl Default for Config {
  fn default() -> Self {
    Self {
      languages: vec![
        Language {
          name: "rubylox".to_string(),
          command: vec!["bundle".to_string(), "exec".to_string(), "rubylox".to_string()],
          color: Some(Color::Red),
        },
        Language {
          name: "jlox".to_string(),
          command: vec!["../../craftinginterpreters/jlox".to_string()],
          color: Some(Color::Blue),
        },
      ],
      program: PathBuf::from("../lox_programs/benchmark.lox"),
      sizes: 10..35,
      trials: 5,
      benchmark_dir: PathBuf::from("../../craftinginterpreters/test/benchmark"),
      extension: "lox".to_string(),
      benchmarks: [
        "binary_trees",
        "equality",
        "instantiation",
        "invocation",
        "method_call",
        "properties",
        "string_equality",
        "trees",
        "zoo_batch",
        "zoo",
      ]
      .map(String::from)
      .to_vec(),
      excluded: vec!["trees".to_string(), "binary_trees".to_string()],
      chart: ChartConfig::default(),
    }
  }
}

impl Default for ChartConfig {
  fn default() -> Self {
    Self {
      width: 50,
      trend_title: "Fibonacci(n) execution time".to_string(),
      bars_title: "Benchmark times".to_string(),
    }
  }
}

impl Config {
  /// Loads the config at `path`, or the defaults when there is none.
  pub fn load(path: Option<&Path>) -> Result<Self> {
    let config = match path {
      Some(path) => {
        let text = fs::read_to_string(path).with_context(|| format!("read {path:?}"))?;
        toml::from_str(&text).with_context(|| format!("parse {path:?}"))?
      }
      None => Config::default(),
    };

    config.validate().context("validate config")?;

    Ok(config)
  }

  pub fn validate(&self) -> Result<()> {
    if self.languages.is_empty() {
      anyhow::bail!("no languages configured");
    }

    let mut names = BTreeSet::new();
    for language in &self.languages {
      if language.command.is_empty() {
        anyhow::bail!("language {:?} has an empty command", language.name);
      }
      if !names.insert(language.name.as_str()) {
        anyhow::bail!("language {:?} is configured twice", language.name);
      }
    }

    if self.sizes.is_empty() {
      anyhow::bail!("size range {:?} is empty", self.sizes);
    }

    if self.chart.width == 0 {
      anyhow::bail!("chart width must be positive");
    }

    Ok(())
  }

  /// Path of the named benchmark `name`.
  pub fn benchmark_path(&self, name: &str) -> PathBuf {
    self.benchmark_dir.join(format!("{name}.{}", self.extension))
  }

  /// Color of `lang`: its configured one, otherwise picked from a fixed
  /// palette by `index`.
  pub fn color_of(&self, lang: &str, index: usize) -> Color {
    self
      .languages
      .iter()
      .find(|language| language.name == lang)
      .and_then(|language| language.color)
      .unwrap_or(PALETTE[index % PALETTE.len()])
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_are_valid() {
    let config = Config::default();
    config.validate().unwrap();

    assert_eq!(config.sizes, 10..35);
    assert_eq!(config.trials, 5);
    assert_eq!(config.benchmarks.len(), 10);
    assert_eq!(
      config.benchmark_path("zoo"),
      PathBuf::from("../../craftinginterpreters/test/benchmark/zoo.lox")
    );
  }

  #[test]
  fn partial_toml_keeps_defaults() {
    let config: Config = toml::from_str(
      r#"
        trials = 2
        sizes = { start = 3, end = 5 }

        [[languages]]
        name = "clox"
        command = ["./clox"]
        color = "green"
      "#,
    )
    .unwrap();

    assert_eq!(config.trials, 2);
    assert_eq!(config.sizes, 3..5);
    assert_eq!(config.languages.len(), 1);
    assert_eq!(config.color_of("clox", 1), Color::Green);
    assert_eq!(config.excluded, ["trees", "binary_trees"]);
    assert_eq!(config.chart.width, 50);
  }

  #[test]
  fn unknown_language_falls_back_to_palette() {
    let config = Config::default();

    assert_eq!(config.color_of("clox", 2), Color::Green);
    assert_eq!(config.color_of("clox", 8), Color::Green);
  }

  #[test]
  fn rejects_bad_languages() {
    let mut config = Config::default();
    config.languages[0].command.clear();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.languages[1].name = "rubylox".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.languages.clear();
    assert!(config.validate().is_err());
  }

  #[test]
  fn rejects_empty_sizes() {
    for sizes in [Range { start: 5, end: 3 }, Range { start: 10, end: 10 }] {
      let config = Config {
        sizes: sizes.clone(),
        ..Config::default()
      };

      assert!(config.validate().is_err(), "{sizes:?}");
    }

    let config = Config {
      sizes: 10..11,
      ..Config::default()
    };
    config.validate().unwrap();
  }
}
