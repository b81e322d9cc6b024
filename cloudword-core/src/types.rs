use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Number of rows returned by the `/top` views.
pub const TOP_TERMS_LIMIT: usize = 50;

/// A snapshot of one Reddit submission, reduced to what the pipeline needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub subreddit: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub num_comments: u64,
    #[serde(default)]
    pub selftext: String,
}

impl Post {
    /// Title and body joined the way the aggregator reads them.
    pub fn text(&self) -> String {
        format!("{} {}", self.title, self.selftext)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermCount {
    pub term: String,
    pub count: u64,
}

/// Term to count mapping that remembers the order terms were first seen in.
///
/// Every stored count is at least 1. Ranking sorts by count descending and
/// keeps first-seen order among equal counts.
#[derive(Debug, Clone, Default)]
pub struct TermFrequency {
    index: HashMap<String, usize>,
    entries: Vec<(String, u64)>,
}

impl TermFrequency {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, term: impl Into<String>) {
        self.add_count(term, 1);
    }

    pub fn add_count(&mut self, term: impl Into<String>, count: u64) {
        if count == 0 {
            return;
        }
        let term = term.into();
        match self.index.get(&term) {
            Some(&slot) => {
                let total = &mut self.entries[slot].1;
                *total = total.saturating_add(count);
            }
            None => {
                self.index.insert(term.clone(), self.entries.len());
                self.entries.push((term, count));
            }
        }
    }

    pub fn merge(&mut self, other: &TermFrequency) {
        for (term, count) in other.iter() {
            self.add_count(term, count);
        }
    }

    pub fn get(&self, term: &str) -> Option<u64> {
        self.index.get(term).map(|&slot| self.entries[slot].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.entries
            .iter()
            .fold(0u64, |sum, (_, count)| sum.saturating_add(*count))
    }

    /// Terms in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.entries
            .iter()
            .map(|(term, count)| (term.as_str(), *count))
    }

    pub fn ranked(&self) -> Vec<TermCount> {
        let mut ranked: Vec<TermCount> = self
            .entries
            .iter()
            .map(|(term, count)| TermCount {
                term: term.clone(),
                count: *count,
            })
            .collect();
        // sort_by is stable, so ties stay in first-seen order
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        ranked
    }

    pub fn top_n(&self, n: usize) -> Vec<TermCount> {
        let mut ranked = self.ranked();
        ranked.truncate(n);
        ranked
    }
}

impl<S: Into<String>> FromIterator<S> for TermFrequency {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut frequency = TermFrequency::new();
        frequency.extend(iter);
        frequency
    }
}

impl<S: Into<String>> Extend<S> for TermFrequency {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for term in iter {
            self.add(term);
        }
    }
}

impl Serialize for TermFrequency {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let ranked = self.ranked();
        let mut map = serializer.serialize_map(Some(ranked.len()))?;
        for row in &ranked {
            map.serialize_entry(&row.term, &row.count)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for TermFrequency {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TermFrequencyVisitor;

        impl<'de> Visitor<'de> for TermFrequencyVisitor {
            type Value = TermFrequency;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of term to count")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut frequency = TermFrequency::new();
                while let Some((term, count)) = access.next_entry::<String, u64>()? {
                    frequency.add_count(term, count);
                }
                Ok(frequency)
            }
        }

        deserializer.deserialize_map(TermFrequencyVisitor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Hot,
    New,
    Top,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Hot => "hot",
            SortOrder::New => "new",
            SortOrder::Top => "top",
        }
    }
}

impl FromStr for SortOrder {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hot" => Ok(SortOrder::Hot),
            "new" => Ok(SortOrder::New),
            "top" => Ok(SortOrder::Top),
            other => Err(CoreError::invalid_input(format!(
                "sort must be one of hot, new, top (got '{}')",
                other
            ))),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Time window for the `top` listing. Reddit ignores it for other sorts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFilter {
    Hour,
    #[default]
    Day,
    Week,
    Month,
    Year,
    All,
}

impl TimeFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFilter::Hour => "hour",
            TimeFilter::Day => "day",
            TimeFilter::Week => "week",
            TimeFilter::Month => "month",
            TimeFilter::Year => "year",
            TimeFilter::All => "all",
        }
    }
}

impl FromStr for TimeFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hour" => Ok(TimeFilter::Hour),
            "day" => Ok(TimeFilter::Day),
            "week" => Ok(TimeFilter::Week),
            "month" => Ok(TimeFilter::Month),
            "year" => Ok(TimeFilter::Year),
            "all" => Ok(TimeFilter::All),
            other => Err(CoreError::invalid_input(format!(
                "time_filter must be one of hour, day, week, month, year, all (got '{}')",
                other
            ))),
        }
    }
}

impl fmt::Display for TimeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Word cloud rendering parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    /// Color name (`white`, `black`, ...) or `#rrggbb`.
    pub background: String,
    pub max_words: usize,
    pub colormap: String,
    /// Probability of drawing a word horizontally.
    pub prefer_horizontal: f32,
    pub min_font_size: u32,
    /// Largest font size; derived from the canvas height when unset.
    pub max_font_size: Option<u32>,
    /// How much a word's weight (vs. its rank) drives its size, 0.0..=1.0.
    pub relative_scaling: f32,
    pub margin: u32,
    pub random_seed: Option<u64>,
}

impl RenderConfig {
    /// Canvas used for free-text clouds.
    pub fn text_default() -> Self {
        Self {
            width: 1000,
            height: 700,
            ..Self::default()
        }
    }

    /// Canvas used for pre-aggregated category clouds.
    pub fn category_default() -> Self {
        Self {
            width: 1100,
            height: 800,
            prefer_horizontal: 0.9,
            ..Self::default()
        }
    }

    pub fn with_max_words(mut self, max_words: usize) -> Self {
        self.max_words = max_words;
        self
    }

    pub fn with_colormap(mut self, colormap: impl Into<String>) -> Self {
        self.colormap = colormap.into();
        self
    }

    pub fn with_background(mut self, background: impl Into<String>) -> Self {
        self.background = background.into();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 400,
            height: 200,
            background: "white".to_string(),
            max_words: 300,
            colormap: "viridis".to_string(),
            prefer_horizontal: 0.9,
            min_font_size: 4,
            max_font_size: None,
            relative_scaling: 0.5,
            margin: 2,
            random_seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_frequency_counts() {
        let mut tf = TermFrequency::new();
        tf.add("cat");
        tf.add("dog");
        tf.add("cat");
        tf.add_count("bird", 0);

        assert_eq!(tf.get("cat"), Some(2));
        assert_eq!(tf.get("dog"), Some(1));
        assert_eq!(tf.get("bird"), None);
        assert_eq!(tf.len(), 2);
        assert_eq!(tf.total(), 3);
    }

    #[test]
    fn test_ranked_ties_keep_first_seen_order() {
        let tf: TermFrequency = ["zebra", "apple", "mango", "apple", "zebra"]
            .into_iter()
            .collect();

        let ranked = tf.ranked();
        let terms: Vec<&str> = ranked.iter().map(|r| r.term.as_str()).collect();
        assert_eq!(terms, vec!["zebra", "apple", "mango"]);
    }

    #[test]
    fn test_top_n_truncates() {
        let tf: TermFrequency = (0..80).map(|i| format!("term{i}")).collect();
        let top = tf.top_n(TOP_TERMS_LIMIT);
        assert_eq!(top.len(), TOP_TERMS_LIMIT);
        assert_eq!(top[0].term, "term0");
    }

    #[test]
    fn test_term_frequency_json_keeps_file_order() {
        let tf: TermFrequency =
            serde_json::from_str(r#"{"beta": 3, "alpha": 3, "gamma": 5, "zero": 0}"#).unwrap();
        assert_eq!(tf.len(), 3);
        let top = tf.top_n(3);
        assert_eq!(top[0].term, "gamma");
        assert_eq!(top[1].term, "beta");
        assert_eq!(top[2].term, "alpha");

        let json = serde_json::to_string(&tf).unwrap();
        assert_eq!(json, r#"{"gamma":5,"beta":3,"alpha":3}"#);
    }

    #[test]
    fn test_counts_saturate_instead_of_overflowing() {
        let tf: TermFrequency =
            serde_json::from_str(r#"{"a": 18446744073709551615, "a": 1, "b": 2}"#).unwrap();
        assert_eq!(tf.get("a"), Some(u64::MAX));
        assert_eq!(tf.total(), u64::MAX);

        let mut tf = TermFrequency::new();
        tf.add_count("engine", u64::MAX - 1);
        tf.add_count("engine", 5);
        assert_eq!(tf.get("engine"), Some(u64::MAX));
    }

    #[test]
    fn test_merge() {
        let mut a: TermFrequency = ["cat", "dog"].into_iter().collect();
        let b: TermFrequency = ["dog", "fish"].into_iter().collect();
        a.merge(&b);
        assert_eq!(a.get("dog"), Some(2));
        assert_eq!(a.get("fish"), Some(1));
    }

    #[test]
    fn test_sort_order_parsing() {
        assert_eq!("hot".parse::<SortOrder>().unwrap(), SortOrder::Hot);
        assert_eq!("TOP".parse::<SortOrder>().unwrap(), SortOrder::Top);
        assert!("best".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_time_filter_parsing() {
        assert_eq!("week".parse::<TimeFilter>().unwrap(), TimeFilter::Week);
        assert_eq!(TimeFilter::default(), TimeFilter::Day);
        assert!("decade".parse::<TimeFilter>().is_err());
    }

    #[test]
    fn test_post_json_shape() {
        let post: Post = serde_json::from_str(
            r#"{"id":"abc","subreddit":"cars","title":"Fast cars","score":10,"num_comments":2,"selftext":""}"#,
        )
        .unwrap();
        assert_eq!(post.text(), "Fast cars ");

        let value = serde_json::to_value(&post).unwrap();
        for field in ["id", "subreddit", "title", "score", "num_comments", "selftext"] {
            assert!(value.get(field).is_some(), "missing {field}");
        }
    }

    #[test]
    fn test_render_presets() {
        let text = RenderConfig::text_default();
        assert_eq!((text.width, text.height), (1000, 700));
        assert_eq!(text.max_words, 300);

        let category = RenderConfig::category_default();
        assert_eq!((category.width, category.height), (1100, 800));
        assert!((category.prefer_horizontal - 0.9).abs() < f32::EPSILON);
    }
}
