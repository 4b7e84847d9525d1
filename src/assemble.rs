//! Walks a record in the fixed section order and emits the block stream.
//!
//! Empty values are passed through as empty strings; the layout draws the
//! placeholder. Optional sections vanish entirely when nothing backs them.

use std::sync::Arc;

use crate::format::{self, FieldKey, FieldValue};
use crate::model::{AdditionalEmployment, Block, Record, present};
use crate::pdf::image::PreparedImage;

const SIGNATURE_MAX_WIDTH: f32 = 60.0;
const SIGNATURE_MAX_HEIGHT: f32 = 25.0;

pub(crate) fn build_blocks(record: &Record) -> Vec<Block> {
    let mut blocks = Vec::new();
    personal(&mut blocks, record);
    employment(&mut blocks, record);
    additional_employments(&mut blocks, record);
    banking(&mut blocks, record);
    education(&mut blocks, record);
    tax(&mut blocks, record);
    social_insurance(&mut blocks, record);
    signature(&mut blocks, record);
    log::debug!("Assembled {} blocks", blocks.len());
    blocks
}

fn header(blocks: &mut Vec<Block>, title: &str) {
    blocks.push(Block::SectionHeader {
        title: title.to_string(),
    });
}

fn pair(blocks: &mut Vec<Block>, left: (&str, String), right: (&str, String)) {
    blocks.push(Block::TwoColumnPair {
        label1: left.0.to_string(),
        value1: left.1,
        label2: right.0.to_string(),
        value2: right.1,
    });
}

fn single(blocks: &mut Vec<Block>, label: &str, value: String) {
    blocks.push(Block::LabelValue {
        label: label.to_string(),
        value,
    });
}

fn text(value: &Option<String>) -> String {
    present(value).unwrap_or_default().to_string()
}

fn coded(key: FieldKey, value: &Option<String>) -> String {
    present(value)
        .map(|raw| format::format(key, FieldValue::Text(raw)))
        .unwrap_or_default()
}

fn date(value: &Option<String>) -> String {
    coded(FieldKey::Date, value)
}

fn any_present(values: &[&Option<String>]) -> bool {
    values.iter().any(|v| present(v).is_some())
}

/// `Street 12, 12345 City`, dropping whatever parts are missing.
fn address(record: &Record) -> String {
    let line1 = [present(&record.street), present(&record.house_number)]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");
    let line2 = [present(&record.postal_code), present(&record.city)]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");
    [line1, line2]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

fn personal(blocks: &mut Vec<Block>, record: &Record) {
    header(blocks, "Persönliche Daten");
    pair(
        blocks,
        ("Vorname", record.first_name.trim().to_string()),
        ("Nachname", record.last_name.trim().to_string()),
    );
    pair(
        blocks,
        ("Geburtsdatum", format::format_date(&record.date_of_birth)),
        ("Geburtsname", text(&record.birth_name)),
    );
    pair(
        blocks,
        ("Geburtsort", text(&record.place_of_birth)),
        ("Staatsangehörigkeit", text(&record.nationality)),
    );
    pair(
        blocks,
        ("Geschlecht", coded(FieldKey::Gender, &record.gender)),
        ("Familienstand", coded(FieldKey::MaritalStatus, &record.marital_status)),
    );
    single(blocks, "Anschrift", address(record));
    pair(
        blocks,
        ("Telefon", text(&record.phone)),
        ("E-Mail", text(&record.email)),
    );
    single(
        blocks,
        "Fragebogen vollständig",
        format::format(FieldKey::Text, FieldValue::Flag(record.is_complete)),
    );
}

fn employment(blocks: &mut Vec<Block>, record: &Record) {
    header(blocks, "Beschäftigung");
    pair(
        blocks,
        ("Eintrittsdatum", date(&record.start_date)),
        ("Tätigkeit", text(&record.job_title)),
    );
    pair(
        blocks,
        (
            "Beschäftigungsart",
            format::format(
                FieldKey::EmploymentType,
                FieldValue::List(&record.employment_types),
            ),
        ),
        ("Wochenarbeitszeit", text(&record.weekly_hours)),
    );

    let wishes: Vec<String> = record
        .additional_wishes
        .iter()
        .map(|w| w.trim())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect();
    if !wishes.is_empty() {
        header(blocks, "Weitere Wünsche");
        blocks.push(Block::BulletList { items: wishes });
    }
}

fn additional_employments(blocks: &mut Vec<Block>, record: &Record) {
    if !record.has_additional_employment || record.additional_employments.is_empty() {
        return;
    }
    header(blocks, "Weitere Beschäftigungen");
    for job in &record.additional_employments {
        additional_employment(blocks, job);
    }
}

fn additional_employment(blocks: &mut Vec<Block>, job: &AdditionalEmployment) {
    pair(
        blocks,
        ("Arbeitgeber", text(&job.employer)),
        (
            "Beschäftigungsart",
            coded(FieldKey::EmploymentType, &job.employment_type),
        ),
    );
    pair(
        blocks,
        ("Beginn", date(&job.start_date)),
        ("Wochenarbeitszeit", text(&job.weekly_hours)),
    );
    single(blocks, "Monatliches Einkommen", text(&job.monthly_income));
}

fn banking(blocks: &mut Vec<Block>, record: &Record) {
    header(blocks, "Bankverbindung");
    pair(
        blocks,
        ("IBAN", text(&record.iban)),
        ("BIC", text(&record.bic)),
    );
    pair(
        blocks,
        ("Kreditinstitut", text(&record.bank_name)),
        ("Kontoinhaber", text(&record.account_holder)),
    );
}

fn education(blocks: &mut Vec<Block>, record: &Record) {
    if !any_present(&[&record.school_education, &record.vocational_education]) {
        return;
    }
    header(blocks, "Ausbildung");
    pair(
        blocks,
        (
            "Schulabschluss",
            coded(FieldKey::SchoolEducation, &record.school_education),
        ),
        (
            "Berufsausbildung",
            coded(FieldKey::VocationalEducation, &record.vocational_education),
        ),
    );
}

fn tax(blocks: &mut Vec<Block>, record: &Record) {
    if !any_present(&[
        &record.tax_id,
        &record.tax_class,
        &record.denomination,
        &record.child_allowance,
    ]) {
        return;
    }
    header(blocks, "Steuerdaten");
    pair(
        blocks,
        ("Steuer-ID", text(&record.tax_id)),
        ("Steuerklasse", coded(FieldKey::TaxClass, &record.tax_class)),
    );
    pair(
        blocks,
        ("Konfession", coded(FieldKey::Denomination, &record.denomination)),
        ("Kinderfreibeträge", text(&record.child_allowance)),
    );
}

fn social_insurance(blocks: &mut Vec<Block>, record: &Record) {
    if !any_present(&[
        &record.social_security_number,
        &record.health_insurance,
        &record.insurance_type,
    ]) {
        return;
    }
    header(blocks, "Sozialversicherung");
    pair(
        blocks,
        (
            "Sozialversicherungsnummer",
            text(&record.social_security_number),
        ),
        ("Krankenkasse", text(&record.health_insurance)),
    );
    single(
        blocks,
        "Versicherungsart",
        coded(FieldKey::InsuranceType, &record.insurance_type),
    );
}

fn signature_image(source: &str) -> Option<Arc<PreparedImage>> {
    match PreparedImage::from_source(source) {
        Ok(img) => {
            log::debug!("Prepared signature {img:?}");
            Some(Arc::new(img))
        }
        Err(e) => {
            log::warn!("Signature image dropped: {e}");
            None
        }
    }
}

fn signature(blocks: &mut Vec<Block>, record: &Record) {
    let image = present(&record.signature).and_then(signature_image);
    let signed_on = present(&record.signature_date).map(format::format_date);

    match (image, signed_on) {
        (Some(image), caption) => {
            let (width, height) = image.fit_within(SIGNATURE_MAX_WIDTH, SIGNATURE_MAX_HEIGHT);
            header(blocks, "Unterschrift");
            blocks.push(Block::Image {
                image,
                width,
                height,
                caption: caption.map(|d| format!("Datum: {d}")),
            });
        }
        (None, Some(signed_on)) => {
            header(blocks, "Unterschrift");
            single(blocks, "Datum", signed_on);
        }
        (None, None) => {}
    }
}
