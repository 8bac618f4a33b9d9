use crate::model::{GuidelineRecord, MatchKey, NormKey, Sample, SampleResult};
use std::collections::HashMap;

/// The guideline columns pulled into a joined row.
#[derive(Debug, Clone, PartialEq)]
pub struct GuidelineMatch {
    pub guideline_value: String,
    pub units: String,
    pub notes: String,
}

/// A result row after the sample and guideline left joins.
///
/// `sample_name`/`land_use` are `None` when no sample matched, and
/// `guideline` is `None` when no guideline matched. `parameter` and
/// `soil_type` are read through accessors so they stay in step with the
/// cached parameter key.
#[derive(Debug, Clone)]
pub struct JoinedRow {
    pub sample_id: String,
    pub sample_name: Option<String>,
    parameter: String,
    soil_type: String,
    pub land_use: Option<String>,
    pub concentration_value: f64,
    pub guideline: Option<GuidelineMatch>,
    parameter_key: NormKey,
}

impl JoinedRow {
    /// Build a row that has already been joined elsewhere (e.g. read back
    /// from an exported CSV).
    pub fn new(
        sample_id: impl Into<String>,
        sample_name: Option<String>,
        parameter: impl Into<String>,
        soil_type: impl Into<String>,
        land_use: Option<String>,
        concentration_value: f64,
        guideline: Option<GuidelineMatch>,
    ) -> Self {
        let parameter = parameter.into();
        JoinedRow {
            sample_id: sample_id.into(),
            sample_name,
            parameter_key: NormKey::new(&parameter),
            parameter,
            soil_type: soil_type.into(),
            land_use,
            concentration_value,
            guideline,
        }
    }

    pub fn parameter(&self) -> &str {
        &self.parameter
    }

    pub fn soil_type(&self) -> &str {
        &self.soil_type
    }

    pub fn parameter_key(&self) -> &NormKey {
        &self.parameter_key
    }

    pub fn guideline_value(&self) -> Option<&str> {
        self.guideline.as_ref().map(|g| g.guideline_value.as_str())
    }
}

/// Counters describing how the joins went.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinStats {
    pub results: usize,
    pub rows: usize,
    pub missing_sample: usize,
    pub missing_guideline: usize,
    /// Guideline keys that occur more than once; each causes fan-out.
    pub duplicate_guideline_keys: usize,
}

/// A result paired with the sample it belongs to, if any.
#[derive(Debug, Clone, Copy)]
pub struct SampleJoin<'a> {
    pub result: &'a SampleResult,
    pub sample: Option<&'a Sample>,
}

/// Left-join results to samples on `sample_id`.
///
/// Results without a sample are kept with `sample: None`. A duplicated
/// `sample_id` in `samples` fans the result out, as any left equi-join does.
pub fn join_samples<'a>(results: &'a [SampleResult], samples: &'a [Sample]) -> Vec<SampleJoin<'a>> {
    let mut by_id: HashMap<&str, Vec<&Sample>> = HashMap::new();
    for sample in samples {
        by_id.entry(sample.sample_id.as_str()).or_default().push(sample);
    }

    let duplicated = by_id.values().filter(|v| v.len() > 1).count();
    if duplicated > 0 {
        log::warn!("{duplicated} sample_id(s) appear more than once in samples");
    }

    let mut joined = Vec::with_capacity(results.len());
    for result in results {
        match by_id.get(result.sample_id.as_str()) {
            Some(matches) => {
                for &sample in matches {
                    joined.push(SampleJoin {
                        result,
                        sample: Some(sample),
                    });
                }
            }
            None => joined.push(SampleJoin {
                result,
                sample: None,
            }),
        }
    }
    joined
}

/// Left-join sample-joined results to guidelines on the normalized
/// (parameter, soil type, land use) key.
///
/// Duplicate guideline keys are not collapsed: a result matching `n`
/// guidelines produces `n` rows. Results without a land use never match.
pub fn join_guidelines(
    joined: &[SampleJoin<'_>],
    guidelines: &[GuidelineRecord],
) -> (Vec<JoinedRow>, JoinStats) {
    let mut index: HashMap<&MatchKey, Vec<&GuidelineRecord>> = HashMap::new();
    for g in guidelines {
        index.entry(g.key()).or_default().push(g);
    }

    let mut stats = JoinStats {
        results: joined.len(),
        duplicate_guideline_keys: index.values().filter(|v| v.len() > 1).count(),
        ..Default::default()
    };

    let mut rows = Vec::with_capacity(joined.len());
    for sj in joined {
        let result = sj.result;
        let sample_name = sj.sample.and_then(|s| s.sample_name.clone());
        let land_use = sj.sample.and_then(Sample::land_use).map(str::to_string);
        if sj.sample.is_none() {
            stats.missing_sample += 1;
        }

        let matches = sj.sample.and_then(Sample::land_use_key).and_then(|land_use_key| {
            let key = MatchKey {
                parameter: result.parameter_key().clone(),
                soil_type: result.soil_key().clone(),
                land_use: land_use_key.clone(),
            };
            index.get(&key)
        });

        let base = |guideline: Option<GuidelineMatch>| JoinedRow {
            sample_id: result.sample_id.clone(),
            sample_name: sample_name.clone(),
            parameter: result.parameter().to_string(),
            soil_type: result.soil_type().to_string(),
            land_use: land_use.clone(),
            concentration_value: result.concentration_value,
            guideline,
            parameter_key: result.parameter_key().clone(),
        };

        match matches {
            Some(found) => {
                for g in found {
                    rows.push(base(Some(GuidelineMatch {
                        guideline_value: g.guideline_value.clone(),
                        units: g.units.clone(),
                        notes: g.notes.clone(),
                    })));
                }
            }
            None => {
                stats.missing_guideline += 1;
                rows.push(base(None));
            }
        }
    }

    stats.rows = rows.len();
    (rows, stats)
}

/// Run both joins: results -> samples -> guidelines.
pub fn join_all(
    results: &[SampleResult],
    samples: &[Sample],
    guidelines: &[GuidelineRecord],
) -> Vec<JoinedRow> {
    let with_samples = join_samples(results, samples);
    let (rows, stats) = join_guidelines(&with_samples, guidelines);

    log::info!(
        "joined {} result(s) into {} row(s): {} without sample, {} without guideline",
        stats.results,
        stats.rows,
        stats.missing_sample,
        stats.missing_guideline
    );
    if stats.duplicate_guideline_keys > 0 {
        log::warn!(
            "{} guideline key(s) are duplicated; matching results fan out to one row per guideline",
            stats.duplicate_guideline_keys
        );
    }
    rows
}
