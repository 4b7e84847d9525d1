mod assemble;
pub mod config;
mod error;
pub mod format;
mod fonts;
pub mod model;
pub mod naming;
pub mod pdf;

pub use config::RenderConfig;
pub use error::Error;
pub use model::{AdditionalEmployment, Block, BlockKind, Placement, Record};
pub use pdf::{CONTENT_TOP, Rendered, render_blocks, render_record};

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::NaiveDate;

/// Render the JSON record at `input` into `output_dir`, dated today.
pub fn convert_record_to_pdf(
    input: &Path,
    output_dir: &Path,
    config: &RenderConfig,
) -> Result<PathBuf, Error> {
    convert_record_to_pdf_on(input, output_dir, config, chrono::Local::now().date_naive())
}

/// Like [`convert_record_to_pdf`] with an explicit generation date, which
/// determines the file name prefix and the footer.
pub fn convert_record_to_pdf_on(
    input: &Path,
    output_dir: &Path,
    config: &RenderConfig,
    today: NaiveDate,
) -> Result<PathBuf, Error> {
    let t0 = Instant::now();

    let record = Record::from_path(input)?;
    let t_parse = t0.elapsed();

    let rendered = render_record(&record, config, today)?;
    let t_render = t0.elapsed();

    let output = output_dir.join(&rendered.file_name);
    std::fs::write(&output, &rendered.pdf)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: parse={:.1}ms, render={:.1}ms, write={:.1}ms, total={:.1}ms (output {} bytes)",
        t_parse.as_secs_f64() * 1000.0,
        (t_render - t_parse).as_secs_f64() * 1000.0,
        (t_total - t_render).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        rendered.pdf.len(),
    );

    Ok(output)
}
