use serde::Serialize;
use std::fs::File;
use std::io::{
    self,
    BufWriter,
    Write,
};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use rawscan::{
    DataPointList,
    ImportConfig,
    ImportTask,
    ImportedRawData,
    Project,
    RawDataFilesSelection,
    Scan,
    ScanInfo,
    TupleRange,
    import_files,
};
use tracing::{
    info,
    instrument,
    warn,
};

use crate::cli::{
    ExtractArgs,
    ImportArgs,
    SerializationFormat,
    WriteTemplateArgs,
};
use crate::config::resolve_import_config;
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct ScanSummary<'a> {
    spectrum_id: &'a str,
    #[serde(flatten)]
    info: &'a ScanInfo,
}

#[derive(Debug, Serialize)]
struct FileSummary<'a> {
    name: &'a str,
    path: Option<&'a Path>,
    format: &'static str,
    num_scans: usize,
    scans: Vec<ScanSummary<'a>>,
}

#[derive(Debug, Serialize)]
struct ExtractedScan<'a> {
    title: String,
    spectrum_id: &'a str,
    #[serde(flatten)]
    info: &'a ScanInfo,
    num_points: usize,
    points: &'a DataPointList,
}

/// Main function for the 'import' subcommand.
#[instrument(skip_all)]
pub fn main_import(args: ImportArgs) -> Result<(), CliError> {
    let config = resolve_import_config(&args.import)?;
    info!("Using import configuration: {:?}", config);

    let project = Project::new();
    let mut num_failed = 0;
    let cancelled = Arc::new(AtomicBool::new(false));
    for res in import_files(&args.files, &config, &cancelled)? {
        match res {
            Ok(data) => project.add(data),
            Err(e) => {
                warn!("Skipping file: {}", e);
                num_failed += 1;
            }
        }
    }
    info!(
        "Imported {} files ({} failed)",
        project.len(),
        num_failed
    );

    let selection = match args.name_pattern {
        Some(pattern) => RawDataFilesSelection::NamePattern(pattern),
        None => RawDataFilesSelection::All,
    };
    let files = selection.matching_files(&project)?;
    let scans_per_file: Vec<Vec<Scan>> = files
        .iter()
        .map(|f| project.scans(f.name()).unwrap_or_default())
        .collect();

    let summaries: Vec<FileSummary<'_>> = files
        .iter()
        .zip(scans_per_file.iter())
        .map(|(file, scans)| FileSummary {
            name: file.name(),
            path: file.path(),
            format: file.format_name(),
            num_scans: scans.len(),
            scans: scans
                .iter()
                .map(|s| ScanSummary {
                    spectrum_id: s.spectrum_id(),
                    info: s.info(),
                })
                .collect(),
        })
        .collect();

    write_json(&summaries, args.output_path.as_deref(), args.output_format)?;

    for file in project.raw_data_files() {
        file.dispose();
    }
    Ok(())
}

/// Main function for the 'extract' subcommand.
#[instrument(skip_all, fields(path = %args.raw_file_path.display()))]
pub fn main_extract(args: ExtractArgs) -> Result<(), CliError> {
    let config = resolve_import_config(&args.import)?;
    let mz_range = parse_range(args.mz_range.as_deref(), "m/z")?;
    let intensity_range = parse_range(args.intensity_range.as_deref(), "intensity")?;

    let data = ImportTask::new(args.raw_file_path.clone(), ImportConfig {
        show_progress: false,
        ..config
    })
    .run()?;

    let scan = find_scan(&data, args.scan_number, args.spectrum_id.as_deref())?;
    let mut points = DataPointList::new();
    match (mz_range, intensity_range) {
        (None, None) => scan.extract_all(&mut points)?,
        (mz, intensity) => scan.extract_filtered(
            &mut points,
            &mz.unwrap_or_else(TupleRange::<f64>::unbounded),
            &intensity.unwrap_or_else(TupleRange::<f32>::unbounded),
        )?,
    }
    info!("Extracted {} points from {}", points.len(), scan.display_title());

    let out = ExtractedScan {
        title: scan.display_title(),
        spectrum_id: scan.spectrum_id(),
        info: scan.info(),
        num_points: points.len(),
        points: &points,
    };
    write_json(&out, args.output_path.as_deref(), args.output_format)?;

    data.file.dispose();
    Ok(())
}

pub fn main_write_template(args: WriteTemplateArgs) -> Result<(), CliError> {
    let path = args.output_path;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let template = serde_json::to_string_pretty(&ImportConfig::default())?;
    std::fs::write(&path, template)?;
    println!("Wrote import configuration template to: {}", path.display());
    Ok(())
}

fn find_scan<'a>(
    data: &'a ImportedRawData,
    scan_number: Option<u32>,
    spectrum_id: Option<&str>,
) -> Result<&'a Scan, CliError> {
    let found = match (scan_number, spectrum_id) {
        (_, Some(id)) => data.scans.iter().find(|s| s.spectrum_id() == id),
        (Some(number), None) => data.scans.iter().find(|s| s.scan_number() == number),
        (None, None) => {
            return Err(CliError::InvalidArgument(
                "either a scan number or a spectrum id is required".to_string(),
            ));
        }
    };
    found.ok_or_else(|| CliError::ScanNotFound {
        file: data.file.name().to_string(),
        scan: spectrum_id
            .map(str::to_string)
            .or_else(|| scan_number.map(|n| n.to_string()))
            .unwrap_or_default(),
    })
}

fn parse_range<T>(values: Option<&[T]>, what: &str) -> Result<Option<TupleRange<T>>, CliError>
where
    T: Copy + PartialOrd + std::fmt::Debug,
{
    match values {
        None => Ok(None),
        Some([low, high]) => TupleRange::try_new(*low, *high)
            .map(Some)
            .map_err(|e| CliError::InvalidArgument(format!("{} range: {:?}", what, e))),
        Some(other) => Err(CliError::InvalidArgument(format!(
            "{} range needs exactly 2 values, got {}",
            what,
            other.len()
        ))),
    }
}

fn write_json<T: Serialize>(
    value: &T,
    output_path: Option<&Path>,
    format: SerializationFormat,
) -> Result<(), CliError> {
    let mut writer: Box<dyn Write> = match output_path {
        Some(path) => {
            info!("Writing output to {}", path.display());
            Box::new(BufWriter::new(File::create(path)?))
        }
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    match format {
        SerializationFormat::Json => serde_json::to_writer(&mut writer, value)?,
        SerializationFormat::PrettyJson => serde_json::to_writer_pretty(&mut writer, value)?,
    }
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
