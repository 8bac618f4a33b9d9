use crate::parsing::normalize::normalize_key;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Units of every guideline value in the Tier 1 soil tables.
pub const DEFAULT_UNITS: &str = "mg/kg";

/// A trimmed, lower-cased key component used for matching.
///
/// Only constructible through [`NormKey::new`], so every key compared by the
/// join engine has been through the same normalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NormKey(String);

impl NormKey {
    pub fn new(raw: &str) -> Self {
        NormKey(normalize_key(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Composite natural key of a guideline: (parameter, soil type, land use).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MatchKey {
    pub parameter: NormKey,
    pub soil_type: NormKey,
    pub land_use: NormKey,
}

impl MatchKey {
    pub fn new(parameter: &str, soil_type: &str, land_use: &str) -> Self {
        MatchKey {
            parameter: NormKey::new(parameter),
            soil_type: NormKey::new(soil_type),
            land_use: NormKey::new(land_use),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoilType {
    Fine,
    Coarse,
}

impl fmt::Display for SoilType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SoilType::Fine => write!(f, "Fine"),
            SoilType::Coarse => write!(f, "Coarse"),
        }
    }
}

/// Regulatory land-use category. Guideline columns appear in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LandUse {
    NaturalArea,
    Agricultural,
    ResidentialParkland,
    Commercial,
    Industrial,
}

/// Column order of land-use categories in the guideline tables.
pub const LAND_USE_ORDER: [LandUse; 5] = [
    LandUse::NaturalArea,
    LandUse::Agricultural,
    LandUse::ResidentialParkland,
    LandUse::Commercial,
    LandUse::Industrial,
];

impl LandUse {
    pub fn label(&self) -> &'static str {
        match self {
            LandUse::NaturalArea => "Natural Area",
            LandUse::Agricultural => "Agricultural",
            LandUse::ResidentialParkland => "Residential/Parkland",
            LandUse::Commercial => "Commercial",
            LandUse::Industrial => "Industrial",
        }
    }
}

impl fmt::Display for LandUse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One measured value for one sample/parameter pair.
///
/// `parameter` and `soil_type` are fixed at construction so they cannot
/// drift from their match keys.
#[derive(Debug, Clone)]
pub struct SampleResult {
    pub sample_id: String,
    parameter: String,
    soil_type: String,
    /// NaN when the stored value was missing or non-numeric.
    pub concentration_value: f64,
    parameter_key: NormKey,
    soil_key: NormKey,
}

impl SampleResult {
    pub fn new(
        sample_id: impl Into<String>,
        parameter: impl Into<String>,
        soil_type: impl Into<String>,
        concentration_value: f64,
    ) -> Self {
        let parameter = parameter.into();
        let soil_type = soil_type.into();
        SampleResult {
            sample_id: sample_id.into(),
            parameter_key: NormKey::new(&parameter),
            soil_key: NormKey::new(&soil_type),
            parameter,
            soil_type,
            concentration_value,
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

    pub fn soil_key(&self) -> &NormKey {
        &self.soil_key
    }
}

/// One physical sample. `sample_id` is the join key into [`SampleResult`].
#[derive(Debug, Clone)]
pub struct Sample {
    pub sample_id: String,
    pub sample_name: Option<String>,
    land_use: Option<String>,
    land_use_key: Option<NormKey>,
}

impl Sample {
    pub fn new(
        sample_id: impl Into<String>,
        sample_name: Option<String>,
        land_use: Option<String>,
    ) -> Self {
        Sample {
            sample_id: sample_id.into(),
            land_use_key: land_use.as_deref().map(NormKey::new),
            sample_name,
            land_use,
        }
    }

    pub fn land_use(&self) -> Option<&str> {
        self.land_use.as_deref()
    }

    pub fn land_use_key(&self) -> Option<&NormKey> {
        self.land_use_key.as_ref()
    }
}

/// A guideline row as extracted from the guideline document or loaded
/// from the `guidelines` table. `guideline_value` is unparsed text.
#[derive(Debug, Clone, Serialize)]
pub struct GuidelineRecord {
    parameter: String,
    soil_type: String,
    land_use: String,
    pub guideline_value: String,
    pub units: String,
    pub notes: String,
    #[serde(skip)]
    key: MatchKey,
}

impl GuidelineRecord {
    pub fn new(
        parameter: impl Into<String>,
        soil_type: impl Into<String>,
        land_use: impl Into<String>,
        guideline_value: impl Into<String>,
        units: impl Into<String>,
        notes: impl Into<String>,
    ) -> Self {
        let parameter = parameter.into();
        let soil_type = soil_type.into();
        let land_use = land_use.into();
        GuidelineRecord {
            key: MatchKey::new(&parameter, &soil_type, &land_use),
            parameter,
            soil_type,
            land_use,
            guideline_value: guideline_value.into(),
            units: units.into(),
            notes: notes.into(),
        }
    }

    pub fn parameter(&self) -> &str {
        &self.parameter
    }

    pub fn soil_type(&self) -> &str {
        &self.soil_type
    }

    pub fn land_use(&self) -> &str {
        &self.land_use
    }

    pub fn key(&self) -> &MatchKey {
        &self.key
    }
}

impl PartialEq for GuidelineRecord {
    fn eq(&self, other: &Self) -> bool {
        self.parameter == other.parameter
            && self.soil_type == other.soil_type
            && self.land_use == other.land_use
            && self.guideline_value == other.guideline_value
            && self.units == other.units
            && self.notes == other.notes
    }
}

/// Guideline threshold parsed from a guideline value string.
///
/// Both bounds absent means the guideline could not be evaluated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Threshold {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Threshold {
    pub const ABSENT: Threshold = Threshold {
        min: None,
        max: None,
    };

    pub fn upper(max: f64) -> Self {
        Threshold {
            min: None,
            max: Some(max),
        }
    }

    pub fn range(min: f64, max: f64) -> Self {
        Threshold {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn is_evaluable(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }
}
