// analysis/timeline.rs
// Monthly availability histogram over the datasets' temporal coverage

use crate::catalog::models::{MetadataRecord, SchemaId};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineBucket {
    /// `YYYY-MM`
    pub month_key: String,
    pub active_count: usize,
    pub active_schema_names: Vec<SchemaId>,
}

/// The records driving the timeline: a selection with both bounds on its own, otherwise the whole catalog.
pub fn active_set<'a>(catalog: &'a [MetadataRecord], selection: Option<&'a MetadataRecord>) -> Vec<&'a MetadataRecord> {
    match selection {
        Some(s) if s.temporal_start.is_some() && s.temporal_end.is_some() => vec![s],
        _ => catalog.iter().collect(),
    }
}

/// First and last month covered by any parseable range in `records`.
pub fn month_span<'a, I>(records: I) -> Option<(YearMonth, YearMonth)>
where
    I: IntoIterator<Item = &'a MetadataRecord>,
{
    records
        .into_iter()
        .filter_map(MetadataRecord::temporal_range)
        .map(|(start, end)| (YearMonth::of(start), YearMonth::of(end)))
        .reduce(|(lo, hi), (start, end)| (lo.min(start), hi.max(end)))
}

/// Buckets one month at a time across the full catalog's span, so selecting a
/// single record never rescales the axis. `None` when nothing in the active set
/// has a usable range or the span is empty.
pub fn build_timeline(catalog: &[MetadataRecord], selection: Option<&MetadataRecord>) -> Option<Vec<TimelineBucket>> {
    let ranges: Vec<(&str, YearMonth, YearMonth)> = active_set(catalog, selection)
        .into_iter()
        .filter_map(|r| {
            let (start, end) = r.temporal_range()?;
            Some((r.schema_name.as_str(), YearMonth::of(start), YearMonth::of(end)))
        })
        .collect();
    if ranges.is_empty() {
        return None;
    }

    let (first, last) = month_span(catalog.iter().chain(selection))?;
    if first > last {
        return None;
    }
    let mut buckets = Vec::new();
    let mut month = first;
    while month <= last {
        let active_schema_names: Vec<SchemaId> = ranges
            .iter()
            .filter(|(_, start, end)| *start <= month && month <= *end)
            .map(|(name, _, _)| name.to_string())
            .collect();
        buckets.push(TimelineBucket {
            month_key: month.to_string(),
            active_count: active_schema_names.len(),
            active_schema_names,
        });
        month = month.next();
    }
    Some(buckets)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranged(name: &str, start: &str, end: &str) -> MetadataRecord {
        MetadataRecord {
            schema_name: name.into(),
            temporal_start: Some(start.into()),
            temporal_end: Some(end.into()),
            ..Default::default()
        }
    }

    fn bucket<'a>(buckets: &'a [TimelineBucket], key: &str) -> &'a TimelineBucket {
        buckets.iter().find(|b| b.month_key == key).unwrap()
    }

    #[test]
    fn overlapping_ranges_share_months() {
        let catalog = vec![ranged("A", "2020-01-01", "2020-06-30"), ranged("B", "2020-05-01", "2020-09-30")];
        let buckets = build_timeline(&catalog, None).unwrap();
        assert_eq!(buckets.len(), 9);
        assert_eq!(buckets.first().unwrap().month_key, "2020-01");
        assert_eq!(buckets.last().unwrap().month_key, "2020-09");

        let may = bucket(&buckets, "2020-05");
        assert_eq!(may.active_count, 2);
        assert_eq!(may.active_schema_names, vec!["A", "B"]);
        let july = bucket(&buckets, "2020-07");
        assert_eq!(july.active_count, 1);
        assert_eq!(july.active_schema_names, vec!["B"]);
    }

    #[test]
    fn gap_months_are_kept_with_zero_count() {
        let catalog = vec![ranged("A", "2020-01-01", "2020-01-31"), ranged("B", "2020-04-01", "2020-04-30")];
        let buckets = build_timeline(&catalog, None).unwrap();
        let counts: Vec<usize> = buckets.iter().map(|b| b.active_count).collect();
        assert_eq!(counts, vec![1, 0, 0, 1]);
    }

    #[test]
    fn span_crosses_year_boundary() {
        let catalog = vec![ranged("A", "2019-11-15", "2020-02-01 00:00:00")];
        let keys: Vec<String> = build_timeline(&catalog, None).unwrap().into_iter().map(|b| b.month_key).collect();
        assert_eq!(keys, vec!["2019-11", "2019-12", "2020-01", "2020-02"]);
    }

    #[test]
    fn selection_keeps_full_span() {
        let catalog = vec![ranged("A", "2020-01-01", "2020-06-30"), ranged("B", "2020-05-01", "2020-09-30")];
        let full = build_timeline(&catalog, None).unwrap();
        let focused = build_timeline(&catalog, Some(&catalog[0])).unwrap();
        assert_eq!(full.len(), focused.len());
        assert_eq!(bucket(&focused, "2020-05").active_schema_names, vec!["A"]);
        assert_eq!(bucket(&focused, "2020-08").active_count, 0);
    }

    #[test]
    fn selection_without_bounds_falls_back_to_catalog() {
        let catalog = vec![ranged("A", "2020-01-01", "2020-02-01"), MetadataRecord {
            schema_name: "plain".into(),
            ..Default::default()
        }];
        let with_plain = build_timeline(&catalog, Some(&catalog[1])).unwrap();
        assert_eq!(with_plain, build_timeline(&catalog, None).unwrap());
    }

    #[test]
    fn unparseable_ranges_are_skipped() {
        let catalog = vec![ranged("bad", "soon", "later"), ranged("A", "2021-03-01", "2021-03-31")];
        let buckets = build_timeline(&catalog, None).unwrap();
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].active_schema_names, vec!["A"]);
    }

    #[test]
    fn inverted_range_alone_means_no_chart() {
        let catalog = vec![ranged("inverted", "2021-05-01", "2020-01-01")];
        assert!(build_timeline(&catalog, None).is_none());
    }

    #[test]
    fn no_ranges_means_no_chart() {
        let catalog = vec![ranged("bad", "soon", "later")];
        assert!(build_timeline(&catalog, None).is_none());
        assert!(build_timeline(&[], None).is_none());
    }
}
