//! The Summariser's output sink: five formats consuming a finished
//! [`Summary`] — tabular, wide tabular, JSON, CSV and CLOC-compatible YAML.
//! An external collaborator per spec §1; it only reads the finished
//! aggregate, it never touches pipeline invariants.

use crate::stats::{FileSummary, LanguageSummary, Summary};
use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, ContentArrangement, Table};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Tabular,
    Wide,
    Json,
    Csv,
    ClocYaml,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "tabular" => OutputFormat::Tabular,
            "wide" => OutputFormat::Wide,
            "json" => OutputFormat::Json,
            "csv" => OutputFormat::Csv,
            "cloc-yml" => OutputFormat::ClocYaml,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub by_file: bool,
}

pub fn render(summary: &Summary, config: &OutputConfig, out: &mut impl Write) -> io::Result<()> {
    match config.format {
        OutputFormat::Tabular => render_tabular(summary, config, out, false),
        OutputFormat::Wide => render_tabular(summary, config, out, true),
        OutputFormat::Json => render_json(summary, config, out),
        OutputFormat::Csv => render_csv(summary, config, out),
        OutputFormat::ClocYaml => render_cloc_yaml(summary, out),
    }
}

fn render_tabular(
    summary: &Summary,
    config: &OutputConfig,
    out: &mut impl Write,
    wide: bool,
) -> io::Result<()> {
    if config.by_file {
        render_file_table(summary, out, wide)?;
        writeln!(out)?;
    }
    render_language_table(summary, out, wide)
}

fn render_language_table(summary: &Summary, out: &mut impl Write, wide: bool) -> io::Result<()> {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED).set_content_arrangement(ContentArrangement::Dynamic);

    let mut headers = vec![
        Cell::new("Language").add_attribute(Attribute::Bold),
        Cell::new("Files").add_attribute(Attribute::Bold),
        Cell::new("Blank").add_attribute(Attribute::Bold),
        Cell::new("Comment").add_attribute(Attribute::Bold),
        Cell::new("Code").add_attribute(Attribute::Bold),
    ];
    if wide {
        headers.push(Cell::new("Complexity").add_attribute(Attribute::Bold));
        headers.push(Cell::new("Weighted Complexity").add_attribute(Attribute::Bold));
    }
    table.set_header(headers);

    for lang in &summary.languages {
        let mut row = vec![
            Cell::new(&lang.name),
            Cell::new(lang.files),
            Cell::new(lang.blank),
            Cell::new(lang.comment),
            Cell::new(lang.code).fg(Color::Green),
        ];
        if wide {
            row.push(Cell::new(lang.complexity));
            row.push(Cell::new(format!("{:.2}", lang.weighted_complexity)));
        }
        table.add_row(row);
    }

    let mut sum_row = vec![
        Cell::new("SUM").add_attribute(Attribute::Bold),
        Cell::new(summary.total_files).add_attribute(Attribute::Bold),
        Cell::new(summary.total_blank).add_attribute(Attribute::Bold),
        Cell::new(summary.total_comment).add_attribute(Attribute::Bold),
        Cell::new(summary.total_code).add_attribute(Attribute::Bold).fg(Color::Green),
    ];
    if wide {
        sum_row.push(Cell::new(summary.total_complexity).add_attribute(Attribute::Bold));
        sum_row.push(Cell::new("").add_attribute(Attribute::Bold));
    }
    table.add_row(sum_row);

    writeln!(out)?;
    writeln!(out, "{table}")?;
    write!(out, "{} files processed in {:.3}s", summary.total_files, summary.elapsed.as_secs_f64())?;
    writeln!(out)
}

fn render_file_table(summary: &Summary, out: &mut impl Write, wide: bool) -> io::Result<()> {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED).set_content_arrangement(ContentArrangement::Dynamic);

    let mut headers = vec![
        Cell::new("File").add_attribute(Attribute::Bold),
        Cell::new("Language").add_attribute(Attribute::Bold),
        Cell::new("Blank").add_attribute(Attribute::Bold),
        Cell::new("Comment").add_attribute(Attribute::Bold),
        Cell::new("Code").add_attribute(Attribute::Bold),
    ];
    if wide {
        headers.push(Cell::new("Complexity").add_attribute(Attribute::Bold));
    }
    table.set_header(headers);

    for lang in &summary.languages {
        for file in &lang.file_summaries {
            let mut row = vec![
                Cell::new(&file.name),
                Cell::new(&file.language),
                Cell::new(file.blank),
                Cell::new(file.comment),
                Cell::new(file.code).fg(Color::Green),
            ];
            if wide {
                row.push(Cell::new(file.complexity));
            }
            table.add_row(row);
        }
    }

    writeln!(out)?;
    write!(out, "{table}")
}

#[derive(Debug, Serialize)]
struct JsonLanguage<'a> {
    #[serde(rename = "Name")]
    name: &'a str,
    #[serde(rename = "Bytes")]
    bytes: u64,
    #[serde(rename = "Lines")]
    lines: u64,
    #[serde(rename = "Code")]
    code: u64,
    #[serde(rename = "Comment")]
    comment: u64,
    #[serde(rename = "Blank")]
    blank: u64,
    #[serde(rename = "Complexity")]
    complexity: u64,
    #[serde(rename = "WeightedComplexity")]
    weighted_complexity: f64,
    #[serde(rename = "Count")]
    count: u64,
    #[serde(rename = "Files", skip_serializing_if = "Option::is_none")]
    files: Option<Vec<JsonFile<'a>>>,
}

#[derive(Debug, Serialize)]
struct JsonFile<'a> {
    #[serde(rename = "Location")]
    location: &'a str,
    #[serde(rename = "Bytes")]
    bytes: u64,
    #[serde(rename = "Lines")]
    lines: u64,
    #[serde(rename = "Code")]
    code: u64,
    #[serde(rename = "Comment")]
    comment: u64,
    #[serde(rename = "Blank")]
    blank: u64,
    #[serde(rename = "Complexity")]
    complexity: u64,
    #[serde(rename = "WeightedComplexity")]
    weighted_complexity: f64,
}

impl<'a> From<&'a FileSummary> for JsonFile<'a> {
    fn from(f: &'a FileSummary) -> Self {
        JsonFile {
            location: &f.name,
            bytes: f.bytes,
            lines: f.lines,
            code: f.code,
            comment: f.comment,
            blank: f.blank,
            complexity: f.complexity,
            weighted_complexity: f.weighted_complexity,
        }
    }
}

impl<'a> From<(&'a LanguageSummary, bool)> for JsonLanguage<'a> {
    fn from((lang, by_file): (&'a LanguageSummary, bool)) -> Self {
        JsonLanguage {
            name: &lang.name,
            bytes: lang.bytes,
            lines: lang.lines,
            code: lang.code,
            comment: lang.comment,
            blank: lang.blank,
            complexity: lang.complexity,
            weighted_complexity: lang.weighted_complexity,
            count: lang.files,
            files: by_file.then(|| lang.file_summaries.iter().map(JsonFile::from).collect()),
        }
    }
}

fn render_json(summary: &Summary, config: &OutputConfig, out: &mut impl Write) -> io::Result<()> {
    let languages: Vec<JsonLanguage> =
        summary.languages.iter().map(|l| JsonLanguage::from((l, config.by_file))).collect();
    let json = serde_json::to_string_pretty(&languages).map_err(io::Error::other)?;
    writeln!(out, "{json}")
}

fn render_csv(summary: &Summary, config: &OutputConfig, out: &mut impl Write) -> io::Result<()> {
    let mut writer = csv::Writer::from_writer(out);

    if config.by_file {
        writer.write_record(["File", "Language", "Blank", "Comment", "Code", "Complexity"])?;
        for lang in &summary.languages {
            for file in &lang.file_summaries {
                writer.write_record([
                    &file.name,
                    &file.language,
                    &file.blank.to_string(),
                    &file.comment.to_string(),
                    &file.code.to_string(),
                    &file.complexity.to_string(),
                ])?;
            }
        }
    } else {
        writer.write_record(["Language", "Files", "Blank", "Comment", "Code", "Complexity"])?;
        for lang in &summary.languages {
            writer.write_record([
                &lang.name,
                &lang.files.to_string(),
                &lang.blank.to_string(),
                &lang.comment.to_string(),
                &lang.code.to_string(),
                &lang.complexity.to_string(),
            ])?;
        }
        writer.write_record([
            "SUM",
            &summary.total_files.to_string(),
            &summary.total_blank.to_string(),
            &summary.total_comment.to_string(),
            &summary.total_code.to_string(),
            &summary.total_complexity.to_string(),
        ])?;
    }

    writer.flush()
}

/// The `cloc --yaml` layout: a `sum` block, a `header` block, then one block
/// per language keyed by language name. Field order within each block
/// matches `cloc`'s own output so existing tooling that scrapes it by
/// position keeps working.
#[derive(Debug, Serialize)]
struct ClocLanguageBlock {
    code: u64,
    comment: u64,
    blank: u64,
    #[serde(rename = "nFiles")]
    n_files: u64,
}

#[derive(Debug, Serialize)]
struct ClocHeader {
    version: String,
    elapsed_seconds: f64,
    #[serde(rename = "nFiles")]
    n_files: u64,
    #[serde(rename = "nLines")]
    n_lines: u64,
}

#[derive(Debug, Serialize)]
struct ClocYaml {
    sum: ClocLanguageBlock,
    header: ClocHeader,
    #[serde(flatten)]
    languages: BTreeMap<String, ClocLanguageBlock>,
}

fn render_cloc_yaml(summary: &Summary, out: &mut impl Write) -> io::Result<()> {
    let sum = ClocLanguageBlock {
        code: summary.total_code,
        comment: summary.total_comment,
        blank: summary.total_blank,
        n_files: summary.total_files,
    };
    let header = ClocHeader {
        version: env!("CARGO_PKG_VERSION").to_string(),
        elapsed_seconds: summary.elapsed.as_secs_f64(),
        n_files: summary.total_files,
        n_lines: summary.total_lines,
    };
    let languages = summary
        .languages
        .iter()
        .map(|lang| {
            (
                lang.name.clone(),
                ClocLanguageBlock { code: lang.code, comment: lang.comment, blank: lang.blank, n_files: lang.files },
            )
        })
        .collect();

    let doc = ClocYaml { sum, header, languages };
    let yaml = serde_yaml::to_string(&doc).map_err(io::Error::other)?;
    write!(out, "{yaml}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::FileJob;
    use std::path::PathBuf;
    use std::time::Duration;

    fn sample_summary() -> Summary {
        let mut job = FileJob::new(PathBuf::from("main.rs"), "main.rs".into(), "rs".into(), vec!["Rust"]);
        job.language = Some("Rust");
        job.code = 100;
        job.comment = 20;
        job.blank = 10;
        job.lines = 130;
        job.bytes = 2000;
        Summary::from_jobs(&[job], Duration::default(), true)
    }

    #[test]
    fn json_output_has_name_and_scalar_fields() {
        let summary = sample_summary();
        let mut output = Vec::new();
        render_json(&summary, &OutputConfig { format: OutputFormat::Json, by_file: false }, &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("\"Name\": \"Rust\""));
        assert!(text.contains("\"Code\": 100"));
    }

    #[test]
    fn csv_output_has_header_and_sum_row() {
        let summary = sample_summary();
        let mut output = Vec::new();
        render_csv(&summary, &OutputConfig { format: OutputFormat::Csv, by_file: false }, &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("Language,Files,Blank,Comment,Code,Complexity"));
        assert!(text.contains("SUM"));
    }

    #[test]
    fn cloc_yaml_has_sum_and_header_blocks() {
        let summary = sample_summary();
        let mut output = Vec::new();
        render_cloc_yaml(&summary, &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("sum:"));
        assert!(text.contains("header:"));
        assert!(text.contains("nFiles: 1"));
        assert!(text.contains("Rust:"));
    }
}
