use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::pdf::image::PreparedImage;

/// A personnel questionnaire as submitted by the form layer.
///
/// Only the names and the date of birth are required; the date stays a raw
/// string so that malformed input reaches the formatter untouched.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Record {
    #[serde(default)]
    pub user_id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: String,

    #[serde(default)]
    pub birth_name: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub marital_status: Option<String>,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub place_of_birth: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub house_number: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub employment_types: Vec<String>,
    #[serde(default)]
    pub weekly_hours: Option<String>,
    #[serde(default)]
    pub additional_wishes: Vec<String>,

    #[serde(default)]
    pub has_additional_employment: bool,
    #[serde(default)]
    pub additional_employments: Vec<AdditionalEmployment>,

    #[serde(default)]
    pub iban: Option<String>,
    #[serde(default)]
    pub bic: Option<String>,
    #[serde(default)]
    pub bank_name: Option<String>,
    #[serde(default)]
    pub account_holder: Option<String>,

    #[serde(default)]
    pub school_education: Option<String>,
    #[serde(default)]
    pub vocational_education: Option<String>,

    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub tax_class: Option<String>,
    #[serde(default)]
    pub denomination: Option<String>,
    #[serde(default)]
    pub child_allowance: Option<String>,

    #[serde(default)]
    pub social_security_number: Option<String>,
    #[serde(default)]
    pub health_insurance: Option<String>,
    #[serde(default)]
    pub insurance_type: Option<String>,

    /// Signature image as a `data:` URL or bare base64.
    #[serde(default)]
    pub signature: Option<String>,
    #[serde(default)]
    pub signature_date: Option<String>,

    #[serde(default)]
    pub is_complete: bool,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct AdditionalEmployment {
    #[serde(default)]
    pub employer: Option<String>,
    #[serde(default)]
    pub employment_type: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub weekly_hours: Option<String>,
    #[serde(default)]
    pub monthly_income: Option<String>,
}

impl Record {
    pub fn from_path(path: &Path) -> Result<Record, Error> {
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Trimmed, non-empty value of an optional field.
pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// One unit of document content consumed by the paginator.
#[derive(Clone, Debug)]
pub enum Block {
    SectionHeader {
        title: String,
    },
    LabelValue {
        label: String,
        value: String,
    },
    TwoColumnPair {
        label1: String,
        value1: String,
        label2: String,
        value2: String,
    },
    BulletList {
        items: Vec<String>,
    },
    Image {
        image: Arc<PreparedImage>,
        width: f32,  // document units
        height: f32, // document units
        caption: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockKind {
    SectionHeader,
    LabelValue,
    TwoColumnPair,
    BulletItem,
    Image,
}

/// Where a block (or a single bullet item) ended up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub page: u32,
    pub kind: BlockKind,
    pub top: f32,
    pub bottom: f32,
}
