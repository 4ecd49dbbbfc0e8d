//! Terminal charts of a dataset.
//!
//! Both charts lay the measured time out horizontally, one row per plotted
//! point, and are colored per language when stdout supports it.

use std::{collections::BTreeSet, fmt};

use owo_colors::{AnsiColors, OwoColorize, Stream};

use crate::{
  config::{Color, Config},
  dataset::{Param, Trial},
  stats::{Aggregate, Stats},
};

const MARKERS: [char; 4] = ['●', '■', '▲', '◆'];
const STEMS: [char; 4] = ['━', '╍', '┅', '┉'];
const BAR: char = '█';

const X_LABEL: &str = "n";
const CATEGORY_LABEL: &str = "benchmark";
const VALUE_LABEL: &str = "Time (s)";

fn paint(text: &str, color: Color) -> String {
  text
    .if_supports_color(Stream::Stdout, |s| s.color(AnsiColors::from(color)))
    .to_string()
}

/// Cell of `value` on an axis of `width` cells ending at `scale`.
fn cell(value: f64, scale: f64, width: usize) -> usize {
  if scale <= 0.0 {
    return 0;
  }

  let last = (width - 1) as f64;
  ((value / scale) * last).round().clamp(0.0, last) as usize
}

/// Largest value plotted, used as the end of the value axis.
fn scale<I: IntoIterator<Item = f64>>(values: I) -> f64 {
  values.into_iter().fold(0.0, f64::max)
}

/// Writes the value axis under the plot area, which starts at column
/// `indent`.
fn write_axis(f: &mut fmt::Formatter<'_>, indent: usize, width: usize, scale: f64) -> fmt::Result {
  let end = format!("{scale:.3}");
  writeln!(f, "{:indent$}└{}", "", "─".repeat(width))?;
  writeln!(
    f,
    "{:indent$} 0{VALUE_LABEL:^mid$}{end}",
    "",
    mid = width.saturating_sub(1 + end.len()),
  )
}

/// One language's line in the trend chart.
#[derive(Debug)]
pub struct Series {
  pub lang: String,
  pub color: Color,
  pub marker: char,
  pub stem: char,
  /// Aggregates by input size, ascending.
  pub points: Vec<(u64, Aggregate)>,
}

/// Mean time against input size, with a ±1 standard deviation whisker per
/// point and one series per language.
#[derive(Debug)]
pub struct TrendChart {
  pub title: String,
  pub width: usize,
  pub series: Vec<Series>,
}

impl TrendChart {
  /// Builds the chart of a sizes dataset, leaving out sizes below `min_size`.
  pub fn new(config: &Config, trials: &[Trial], min_size: Option<u64>) -> Self {
    let trials: Vec<Trial> = trials
      .iter()
      .filter(|trial| match (&trial.param, min_size) {
        (Param::Size(n), Some(min)) => *n >= min,
        _ => true,
      })
      .cloned()
      .collect();
    let stats = Stats::from_trials(&trials);

    let series = stats
      .languages()
      .into_iter()
      .enumerate()
      .map(|(i, lang)| Series {
        lang: lang.to_string(),
        color: config.color_of(lang, i),
        marker: MARKERS[i % MARKERS.len()],
        stem: STEMS[i % STEMS.len()],
        points: stats
          .of(lang)
          .filter_map(|(param, aggregate)| match param {
            Param::Size(n) => Some((*n, *aggregate)),
            Param::Benchmark(_) => None,
          })
          .collect(),
      })
      .collect();

    Self {
      title: config.chart.trend_title.clone(),
      width: config.chart.width,
      series,
    }
  }

  fn whisker(&self, series: &Series, aggregate: &Aggregate, scale: f64) -> String {
    let low = cell((aggregate.mean - aggregate.stddev).max(0.0), scale, self.width);
    let mid = cell(aggregate.mean, scale, self.width);
    let high = cell(aggregate.mean + aggregate.stddev, scale, self.width);

    let mut cells = vec![' '; self.width];
    cells[..low].fill(series.stem);
    cells[low..=high].fill('─');
    cells[low] = '├';
    cells[high] = '┤';
    cells[mid] = series.marker;

    cells.into_iter().collect::<String>().trim_end().to_string()
  }
}

impl fmt::Display for TrendChart {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let points = || self.series.iter().flat_map(|series| &series.points);
    let scale = scale(points().map(|(_, aggregate)| aggregate.mean + aggregate.stddev));
    let sizes: BTreeSet<u64> = points().map(|(n, _)| *n).collect();

    let x_width = sizes.iter().map(|n| n.to_string().len()).chain([X_LABEL.len()]).max().unwrap_or(0);
    let lang_width = self.series.iter().map(|series| series.lang.len()).max().unwrap_or(0);

    writeln!(f, "{}", self.title)?;
    writeln!(f)?;
    writeln!(f, "{X_LABEL:>x_width$} {:lang_width$} │", "")?;

    for n in &sizes {
      for series in &self.series {
        let Some((_, aggregate)) = series.points.iter().find(|(x, _)| x == n) else {
          continue;
        };

        let whisker = self.whisker(series, aggregate, scale);
        let row = format!(
          "{lang:<lang_width$} │{whisker} {mean:.4} ± {stddev:.4}",
          lang = series.lang,
          mean = aggregate.mean,
          stddev = aggregate.stddev,
        );
        writeln!(f, "{n:>x_width$} {}", paint(&row, series.color))?;
      }
    }

    write_axis(f, x_width + lang_width + 2, self.width, scale)?;
    writeln!(f)?;

    for series in &self.series {
      let key = format!("{}{}{} {}", series.stem, series.marker, series.stem, series.lang);
      writeln!(f, "  {}", paint(&key, series.color))?;
    }

    Ok(())
  }
}

/// One language's bars in the bar chart.
#[derive(Debug)]
pub struct BarSeries {
  pub lang: String,
  pub color: Color,
  /// Mean time per category, `None` where the language has no trial.
  pub values: Vec<Option<f64>>,
}

/// One group of adjacent bars per benchmark, one bar per language.
#[derive(Debug)]
pub struct BarChart {
  pub title: String,
  pub width: usize,
  pub categories: Vec<Param>,
  pub series: Vec<BarSeries>,
}

impl BarChart {
  /// Builds the chart of a benchmarks dataset without the configured
  /// exclusions. Categories and languages keep the order they first appear in
  /// `trials`.
  pub fn new(config: &Config, trials: &[Trial]) -> Self {
    let trials: Vec<Trial> = trials
      .iter()
      .filter(|trial| match &trial.param {
        Param::Benchmark(name) => !config.excluded.contains(name),
        Param::Size(_) => true,
      })
      .cloned()
      .collect();
    let stats = Stats::from_trials(&trials);

    let mut categories: Vec<Param> = Vec::new();
    let mut languages: Vec<&str> = Vec::new();
    for trial in &trials {
      if !categories.contains(&trial.param) {
        categories.push(trial.param.clone());
      }
      if !languages.contains(&trial.lang.as_str()) {
        languages.push(&trial.lang);
      }
    }

    let series = languages
      .into_iter()
      .enumerate()
      .map(|(i, lang)| BarSeries {
        lang: lang.to_string(),
        color: config.color_of(lang, i),
        values: categories
          .iter()
          .map(|param| stats.get(lang, param).map(|aggregate| aggregate.mean))
          .collect(),
      })
      .collect();

    Self {
      title: config.chart.bars_title.clone(),
      width: config.chart.width,
      categories,
      series,
    }
  }

  pub fn category_names(&self) -> Vec<String> {
    self.categories.iter().map(Param::to_string).collect()
  }
}

impl fmt::Display for BarChart {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let names = self.category_names();
    let scale = scale(self.series.iter().flat_map(|series| series.values.iter().flatten().copied()));

    let name_width = names.iter().map(String::len).chain([CATEGORY_LABEL.len()]).max().unwrap_or(0);
    let lang_width = self.series.iter().map(|series| series.lang.len()).max().unwrap_or(0);

    writeln!(f, "{}", self.title)?;
    writeln!(f)?;
    writeln!(f, "{CATEGORY_LABEL:<name_width$} {:lang_width$} │", "")?;

    for (c, name) in names.iter().enumerate() {
      for (i, series) in self.series.iter().enumerate() {
        let label = if i == 0 { name.as_str() } else { "" };
        let bar = match series.values[c] {
          Some(value) => {
            let len = cell(value, scale, self.width + 1);
            let len = if value > 0.0 { len.max(1) } else { len };
            format!("{} {value:.4}", BAR.to_string().repeat(len))
          }
          None => "-".to_string(),
        };
        let row = format!("{lang:<lang_width$} │{bar}", lang = series.lang);

        writeln!(f, "{label:<name_width$} {}", paint(&row, series.color))?;
      }

      if c + 1 < names.len() {
        writeln!(f, "{:name_width$} {:lang_width$} │", "", "")?;
      }
    }

    write_axis(f, name_width + lang_width + 2, self.width, scale)?;
    writeln!(f)?;

    for series in &self.series {
      let key = format!("{BAR}{BAR} {}", series.lang);
      writeln!(f, "  {}", paint(&key, series.color))?;
    }

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn trial(lang: &str, param: Param, time: f64) -> Trial {
    Trial {
      lang: lang.to_string(),
      param,
      time,
    }
  }

  fn benchmark(lang: &str, name: &str, time: f64) -> Trial {
    trial(lang, Param::Benchmark(name.to_string()), time)
  }

  #[test]
  fn bars_drop_excluded_benchmarks() {
    let trials = [
      benchmark("jlox", "trees", 1.0),
      benchmark("rubylox", "trees", 9.0),
      benchmark("jlox", "binary_trees", 2.0),
      benchmark("rubylox", "binary_trees", 8.0),
      benchmark("jlox", "zoo", 0.5),
      benchmark("rubylox", "zoo", 4.0),
    ];

    let chart = BarChart::new(&Config::default(), &trials);

    assert_eq!(chart.category_names(), ["zoo"]);
    assert_eq!(chart.series.len(), 2);
    assert_eq!(chart.series[0].values, [Some(0.5)]);
    assert_eq!(chart.series[1].values, [Some(4.0)]);

    let rendered = chart.to_string();
    assert!(rendered.contains("zoo"));
    assert!(!rendered.contains("trees"));
  }

  #[test]
  fn bars_keep_appearance_order() {
    let trials = [
      benchmark("rubylox", "zoo", 4.0),
      benchmark("jlox", "zoo", 0.5),
      benchmark("rubylox", "equality", 3.0),
      benchmark("jlox", "equality", 1.5),
      benchmark("jlox", "equality", 2.5),
    ];

    let chart = BarChart::new(&Config::default(), &trials);

    assert_eq!(chart.category_names(), ["zoo", "equality"]);
    assert_eq!(chart.series[0].lang, "rubylox");
    assert_eq!(chart.series[0].color, Color::Red);
    assert_eq!(chart.series[1].lang, "jlox");
    assert_eq!(chart.series[1].color, Color::Blue);
    assert_eq!(chart.series[1].values, [Some(0.5), Some(2.0)]);
  }

  #[test]
  fn bars_mark_missing_values() {
    let trials = [benchmark("jlox", "zoo", 1.0), benchmark("rubylox", "equality", 1.0)];

    let chart = BarChart::new(&Config::default(), &trials);

    assert_eq!(chart.series[0].values, [Some(1.0), None]);
    assert!(chart.to_string().contains("│-"));
  }

  #[test]
  fn longest_bar_fills_the_width() {
    let config = Config::default();
    let trials = [benchmark("jlox", "zoo", 2.0), benchmark("rubylox", "zoo", 1.0)];

    let rendered = BarChart::new(&config, &trials).to_string();
    let bars: Vec<usize> = rendered
      .lines()
      .filter(|line| line.contains(BAR) && line.contains('│'))
      .map(|line| line.chars().filter(|c| *c == BAR).count())
      .collect();

    assert_eq!(bars, [config.chart.width, config.chart.width / 2]);
  }

  #[test]
  fn trend_series_per_language() {
    let trials = [
      trial("rubylox", Param::Size(10), 1.0),
      trial("rubylox", Param::Size(10), 2.0),
      trial("rubylox", Param::Size(10), 3.0),
      trial("rubylox", Param::Size(11), 5.0),
      trial("jlox", Param::Size(10), 0.5),
    ];

    let chart = TrendChart::new(&Config::default(), &trials, None);

    assert_eq!(chart.series.len(), 2);
    assert_eq!(chart.series[0].lang, "jlox");
    assert_eq!(chart.series[0].points.len(), 1);

    let rubylox = &chart.series[1];
    assert_eq!(rubylox.color, Color::Red);
    assert_ne!(rubylox.marker, chart.series[0].marker);
    assert_eq!(rubylox.points[0].0, 10);
    assert_eq!(rubylox.points[0].1.mean, 2.0);
    assert_eq!(rubylox.points[0].1.stddev, 1.0);
    assert_eq!(rubylox.points[1].0, 11);

    let rendered = chart.to_string();
    assert!(rendered.starts_with("Fibonacci(n) execution time"));
    assert!(rendered.contains("2.0000 ± 1.0000"));
    assert!(rendered.contains(VALUE_LABEL));
  }

  #[test]
  fn trend_min_size() {
    let trials = [
      trial("jlox", Param::Size(24), 1.0),
      trial("jlox", Param::Size(25), 2.0),
      trial("jlox", Param::Size(26), 3.0),
    ];

    let chart = TrendChart::new(&Config::default(), &trials, Some(25));

    let sizes: Vec<u64> = chart.series[0].points.iter().map(|(n, _)| *n).collect();
    assert_eq!(sizes, [25, 26]);
  }

  #[test]
  fn whisker_spans_stddev() {
    let config = Config {
      chart: crate::config::ChartConfig {
        width: 11,
        ..Default::default()
      },
      ..Config::default()
    };
    let trials = [
      trial("jlox", Param::Size(1), 4.0),
      trial("jlox", Param::Size(1), 6.0),
    ];

    let chart = TrendChart::new(&config, &trials, None);
    let series = &chart.series[0];
    let scale = 5.0 + 2f64.sqrt();

    assert_eq!(chart.whisker(series, &series.points[0].1, scale), "━━━━━━├─●─┤");
  }
}
