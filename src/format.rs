//! Display formatting for record fields.
//!
//! Code domains are closed enums; a code outside the domain is kept as
//! [`Coded::Other`] and displayed verbatim. Nothing in here fails.

use chrono::{DateTime, NaiveDate};

pub const LIST_SEPARATOR: &str = ", ";
pub const DISPLAY_DATE_FORMAT: &str = "%d.%m.%Y";

/// A closed set of codes with canonical display labels.
pub trait CodeTable: Sized + Copy {
    fn from_code(code: &str) -> Option<Self>;
    fn label(self) -> &'static str;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Coded<T> {
    Known(T),
    Other(String),
}

impl<T: CodeTable> Coded<T> {
    pub fn parse(raw: &str) -> Self {
        let code = raw.trim().to_ascii_lowercase();
        match T::from_code(&code) {
            Some(known) => Coded::Known(known),
            None => Coded::Other(raw.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Coded::Known(known) => known.label(),
            Coded::Other(raw) => raw,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    Diverse,
    Unspecified,
}

impl CodeTable for Gender {
    fn from_code(code: &str) -> Option<Self> {
        match code {
            "male" | "m" => Some(Gender::Male),
            "female" | "f" | "w" => Some(Gender::Female),
            "diverse" | "d" => Some(Gender::Diverse),
            "unspecified" | "x" => Some(Gender::Unspecified),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Gender::Male => "männlich",
            Gender::Female => "weiblich",
            Gender::Diverse => "divers",
            Gender::Unspecified => "keine Angabe",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MaritalStatus {
    Single,
    Married,
    CivilPartnership,
    Separated,
    Divorced,
    Widowed,
}

impl CodeTable for MaritalStatus {
    fn from_code(code: &str) -> Option<Self> {
        match code {
            "single" => Some(MaritalStatus::Single),
            "married" => Some(MaritalStatus::Married),
            "civil_partnership" => Some(MaritalStatus::CivilPartnership),
            "separated" => Some(MaritalStatus::Separated),
            "divorced" => Some(MaritalStatus::Divorced),
            "widowed" => Some(MaritalStatus::Widowed),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            MaritalStatus::Single => "ledig",
            MaritalStatus::Married => "verheiratet",
            MaritalStatus::CivilPartnership => "eingetragene Lebenspartnerschaft",
            MaritalStatus::Separated => "getrennt lebend",
            MaritalStatus::Divorced => "geschieden",
            MaritalStatus::Widowed => "verwitwet",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmploymentType {
    FullTime,
    PartTime,
    MiniJob,
    WorkingStudent,
    Internship,
    Apprenticeship,
    FixedTerm,
}

impl CodeTable for EmploymentType {
    fn from_code(code: &str) -> Option<Self> {
        match code {
            "full_time" | "fulltime" => Some(EmploymentType::FullTime),
            "part_time" | "parttime" => Some(EmploymentType::PartTime),
            "mini_job" | "minijob" => Some(EmploymentType::MiniJob),
            "working_student" => Some(EmploymentType::WorkingStudent),
            "internship" => Some(EmploymentType::Internship),
            "apprenticeship" => Some(EmploymentType::Apprenticeship),
            "fixed_term" => Some(EmploymentType::FixedTerm),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            EmploymentType::FullTime => "Vollzeit",
            EmploymentType::PartTime => "Teilzeit",
            EmploymentType::MiniJob => "Minijob",
            EmploymentType::WorkingStudent => "Werkstudent",
            EmploymentType::Internship => "Praktikum",
            EmploymentType::Apprenticeship => "Ausbildung",
            EmploymentType::FixedTerm => "befristet",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchoolEducation {
    None,
    LowerSecondary,
    Intermediate,
    Abitur,
}

impl CodeTable for SchoolEducation {
    fn from_code(code: &str) -> Option<Self> {
        match code {
            "none" => Some(SchoolEducation::None),
            "lower_secondary" => Some(SchoolEducation::LowerSecondary),
            "intermediate" => Some(SchoolEducation::Intermediate),
            "abitur" => Some(SchoolEducation::Abitur),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            SchoolEducation::None => "ohne Schulabschluss",
            SchoolEducation::LowerSecondary => "Haupt-/Volksschulabschluss",
            SchoolEducation::Intermediate => "Mittlere Reife oder gleichwertig",
            SchoolEducation::Abitur => "Abitur/Fachabitur",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VocationalEducation {
    None,
    Apprenticeship,
    MasterCraftsman,
    Bachelor,
    Diploma,
    Doctorate,
}

impl CodeTable for VocationalEducation {
    fn from_code(code: &str) -> Option<Self> {
        match code {
            "none" => Some(VocationalEducation::None),
            "apprenticeship" => Some(VocationalEducation::Apprenticeship),
            "master_craftsman" => Some(VocationalEducation::MasterCraftsman),
            "bachelor" => Some(VocationalEducation::Bachelor),
            "diploma" | "master" => Some(VocationalEducation::Diploma),
            "doctorate" => Some(VocationalEducation::Doctorate),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            VocationalEducation::None => "ohne beruflichen Ausbildungsabschluss",
            VocationalEducation::Apprenticeship => "anerkannte Berufsausbildung",
            VocationalEducation::MasterCraftsman => "Meister/Techniker",
            VocationalEducation::Bachelor => "Bachelor",
            VocationalEducation::Diploma => "Diplom/Magister/Master/Staatsexamen",
            VocationalEducation::Doctorate => "Promotion",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaxClass {
    I,
    II,
    III,
    IV,
    V,
    VI,
}

impl CodeTable for TaxClass {
    fn from_code(code: &str) -> Option<Self> {
        match code {
            "1" | "i" => Some(TaxClass::I),
            "2" | "ii" => Some(TaxClass::II),
            "3" | "iii" => Some(TaxClass::III),
            "4" | "iv" => Some(TaxClass::IV),
            "5" | "v" => Some(TaxClass::V),
            "6" | "vi" => Some(TaxClass::VI),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            TaxClass::I => "Steuerklasse I",
            TaxClass::II => "Steuerklasse II",
            TaxClass::III => "Steuerklasse III",
            TaxClass::IV => "Steuerklasse IV",
            TaxClass::V => "Steuerklasse V",
            TaxClass::VI => "Steuerklasse VI",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Denomination {
    None,
    RomanCatholic,
    Protestant,
    OldCatholic,
    Jewish,
}

impl CodeTable for Denomination {
    fn from_code(code: &str) -> Option<Self> {
        match code {
            "none" | "vd" => Some(Denomination::None),
            "rk" | "roman_catholic" => Some(Denomination::RomanCatholic),
            "ev" | "protestant" => Some(Denomination::Protestant),
            "ak" | "old_catholic" => Some(Denomination::OldCatholic),
            "jd" | "jewish" => Some(Denomination::Jewish),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Denomination::None => "keine",
            Denomination::RomanCatholic => "römisch-katholisch",
            Denomination::Protestant => "evangelisch",
            Denomination::OldCatholic => "altkatholisch",
            Denomination::Jewish => "jüdisch",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsuranceType {
    Statutory,
    Private,
    Voluntary,
}

impl CodeTable for InsuranceType {
    fn from_code(code: &str) -> Option<Self> {
        match code {
            "statutory" => Some(InsuranceType::Statutory),
            "private" => Some(InsuranceType::Private),
            "voluntary" => Some(InsuranceType::Voluntary),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            InsuranceType::Statutory => "gesetzlich versichert",
            InsuranceType::Private => "privat versichert",
            InsuranceType::Voluntary => "freiwillig gesetzlich versichert",
        }
    }
}

/// Which formatting rule applies to a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKey {
    Gender,
    MaritalStatus,
    EmploymentType,
    SchoolEducation,
    VocationalEducation,
    TaxClass,
    Denomination,
    InsuranceType,
    Date,
    Text,
}

#[derive(Clone, Copy, Debug)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Date(NaiveDate),
    List(&'a [String]),
    Flag(bool),
}

pub fn format(key: FieldKey, value: FieldValue<'_>) -> String {
    match value {
        FieldValue::Text(raw) => format_text(key, raw),
        FieldValue::Date(date) => date.format(DISPLAY_DATE_FORMAT).to_string(),
        FieldValue::List(items) => items
            .iter()
            .map(|item| format_text(key, item))
            .collect::<Vec<_>>()
            .join(LIST_SEPARATOR),
        FieldValue::Flag(flag) => format_flag(flag).to_string(),
    }
}

fn format_text(key: FieldKey, raw: &str) -> String {
    match key {
        FieldKey::Gender => Coded::<Gender>::parse(raw).label().to_string(),
        FieldKey::MaritalStatus => Coded::<MaritalStatus>::parse(raw).label().to_string(),
        FieldKey::EmploymentType => Coded::<EmploymentType>::parse(raw).label().to_string(),
        FieldKey::SchoolEducation => Coded::<SchoolEducation>::parse(raw).label().to_string(),
        FieldKey::VocationalEducation => {
            Coded::<VocationalEducation>::parse(raw).label().to_string()
        }
        FieldKey::TaxClass => Coded::<TaxClass>::parse(raw).label().to_string(),
        FieldKey::Denomination => Coded::<Denomination>::parse(raw).label().to_string(),
        FieldKey::InsuranceType => Coded::<InsuranceType>::parse(raw).label().to_string(),
        FieldKey::Date => format_date(raw),
        FieldKey::Text => raw.to_string(),
    }
}

/// Parse the date shapes the form layer produces.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
        .or_else(|| NaiveDate::parse_from_str(raw, DISPLAY_DATE_FORMAT).ok())
}

/// `DD.MM.YYYY`, or the raw string when it is not a date.
pub fn format_date(raw: &str) -> String {
    match parse_date(raw) {
        Some(date) => date.format(DISPLAY_DATE_FORMAT).to_string(),
        None => raw.to_string(),
    }
}

pub fn format_flag(flag: bool) -> &'static str {
    if flag { "Ja" } else { "Nein" }
}
