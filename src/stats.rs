use std::collections::BTreeMap;

use crate::dataset::{Param, Trial};

/// A configuration whose trials are repeated measurements of the same thing.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey {
  pub lang: String,
  pub param: Param,
}

/// Mean and sample standard deviation of one group's times.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aggregate {
  pub samples: usize,
  pub mean: f64,
  /// Sample (n - 1) standard deviation; `0.0` for a single sample.
  pub stddev: f64,
}

impl Aggregate {
  /// Returns `None` for an empty slice.
  pub fn from_samples(samples: &[f64]) -> Option<Self> {
    if samples.is_empty() {
      return None;
    }

    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let stddev = if samples.len() == 1 {
      0.0
    } else {
      let squares = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>();
      (squares / (n - 1.0)).sqrt()
    };

    Some(Self {
      samples: samples.len(),
      mean,
      stddev,
    })
  }
}

/// Aggregates of a whole dataset, ordered by language, then parameter.
#[derive(Debug, Default)]
pub struct Stats {
  pub groups: BTreeMap<GroupKey, Aggregate>,
}

impl Stats {
  pub fn from_trials(trials: &[Trial]) -> Self {
    let groups = group(trials)
      .into_iter()
      .filter_map(|(key, times)| Some((key, Aggregate::from_samples(&times)?)))
      .collect();

    Self { groups }
  }

  /// Languages in the dataset, in key order.
  pub fn languages(&self) -> Vec<&str> {
    let mut languages: Vec<&str> = self.groups.keys().map(|key| key.lang.as_str()).collect();
    languages.dedup();
    languages
  }

  /// Aggregates of `lang`, ordered by parameter.
  pub fn of<'a>(&'a self, lang: &'a str) -> impl Iterator<Item = (&'a Param, &'a Aggregate)> + 'a {
    self
      .groups
      .iter()
      .filter(move |(key, _)| key.lang == lang)
      .map(|(key, aggregate)| (&key.param, aggregate))
  }

  pub fn get(&self, lang: &str, param: &Param) -> Option<&Aggregate> {
    self.groups.get(&GroupKey {
      lang: lang.to_string(),
      param: param.clone(),
    })
  }
}

/// Partitions trial times by (language, parameter), keeping trial order
/// within each group.
pub fn group(trials: &[Trial]) -> BTreeMap<GroupKey, Vec<f64>> {
  let mut groups: BTreeMap<GroupKey, Vec<f64>> = BTreeMap::new();
  for trial in trials {
    groups
      .entry(GroupKey {
        lang: trial.lang.clone(),
        param: trial.param.clone(),
      })
      .or_default()
      .push(trial.time);
  }

  groups
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::dataset::{self, DatasetWriter, Kind};

  fn trial(lang: &str, n: u64, time: f64) -> Trial {
    Trial {
      lang: lang.to_string(),
      param: Param::Size(n),
      time,
    }
  }

  #[test]
  fn mean_and_sample_stddev() {
    let aggregate = Aggregate::from_samples(&[1.0, 2.0, 3.0]).unwrap();

    assert_eq!(aggregate.samples, 3);
    assert_eq!(aggregate.mean, 2.0);
    assert_eq!(aggregate.stddev, 1.0);
  }

  #[test]
  fn single_sample_has_zero_stddev() {
    let aggregate = Aggregate::from_samples(&[5.0]).unwrap();

    assert_eq!(aggregate.mean, 5.0);
    assert_eq!(aggregate.stddev, 0.0);
  }

  #[test]
  fn no_samples_no_aggregate() {
    assert_eq!(Aggregate::from_samples(&[]), None);
  }

  #[test]
  fn groups_in_natural_order() {
    let stats = Stats::from_trials(&[
      trial("rubylox", 10, 4.0),
      trial("jlox", 11, 1.0),
      trial("jlox", 9, 2.0),
      trial("jlox", 11, 3.0),
    ]);

    let keys: Vec<(&str, &Param)> = stats.groups.keys().map(|key| (key.lang.as_str(), &key.param)).collect();
    assert_eq!(
      keys,
      [
        ("jlox", &Param::Size(9)),
        ("jlox", &Param::Size(11)),
        ("rubylox", &Param::Size(10)),
      ]
    );
    assert_eq!(stats.languages(), ["jlox", "rubylox"]);
    assert_eq!(stats.get("jlox", &Param::Size(11)).unwrap().mean, 2.0);
    assert_eq!(stats.of("jlox").count(), 2);
  }

  #[test]
  fn dataset_round_trip_keeps_every_sample() {
    let trials = vec![
      trial("rubylox", 10, 0.5),
      trial("rubylox", 10, 0.75),
      trial("rubylox", 11, 1.25),
      trial("jlox", 10, 0.01),
      trial("jlox", 10, 0.01),
      trial("jlox", 11, 0.03),
    ];

    let mut writer = DatasetWriter::new(Vec::new(), Kind::Sizes).unwrap();
    for trial in &trials {
      writer.write(trial).unwrap();
    }
    let bytes = writer.into_inner().unwrap();

    let read = dataset::from_reader(bytes.as_slice(), Kind::Sizes).unwrap();

    assert_eq!(group(&read), group(&trials));
    assert_eq!(group(&read).values().map(Vec::len).sum::<usize>(), trials.len());
  }
}
