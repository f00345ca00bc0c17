use crate::archive::{extract_gzip, SourceCatalog, SourceFile};
use crate::cli::args::{Cli, Commands};
use crate::config::PipelineConfig;
use crate::error::{ProcessingError, Result};
use crate::models::{DayTable, WeatherField};
use crate::processors::{FieldReducer, WindPipeline};
use crate::utils::filename::{
    generate_default_day_table_filename, generate_default_histogram_filename, reduced_file_name,
};
use crate::utils::progress::ProgressReporter;
use crate::writers::{HistogramWriter, ParquetWriter};
use std::fs::File;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, Level};

fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let builder = tracing_subscriber::fmt().with_max_level(level).with_target(false);

    let installed = match log_file {
        Some(path) => builder
            .with_ansi(false)
            .with_writer(Mutex::new(File::create(path)?))
            .try_init(),
        None => builder.with_writer(std::io::stderr).try_init(),
    };

    installed.map_err(|e| ProcessingError::Config(format!("Logging setup failed: {}", e)))
}

fn scan_sources(input_dir: &Path, file_pattern: &str) -> Result<SourceCatalog> {
    let catalog = SourceCatalog::scan(input_dir, Some(file_pattern))?;
    if catalog.is_empty() {
        return Err(ProcessingError::MissingData(format!(
            "No CSV files found in {}",
            input_dir.display()
        )));
    }
    Ok(catalog)
}

/// Pair every source with its reduced output, refusing two sources that reduce to the
/// same file (e.g. `synop.202001.csv` next to `synop.202001.csv.gz`).
fn plan_reduction(catalog: &SourceCatalog, output_dir: &Path) -> Result<Vec<(SourceFile, String)>> {
    let mut claimed: HashMap<String, &Path> = HashMap::new();
    let mut plan = Vec::with_capacity(catalog.len());

    for source in catalog.files() {
        let name = reduced_file_name(&source.path).ok_or_else(|| {
            ProcessingError::InvalidFormat(format!("Invalid file name: {}", source.path.display()))
        })?;
        if let Some(previous) = claimed.insert(name.clone(), &source.path) {
            return Err(ProcessingError::InvalidFormat(format!(
                "{} and {} both reduce to {}",
                previous.display(),
                source.path.display(),
                output_dir.join(&name).display()
            )));
        }
        plan.push((source.clone(), name));
    }

    Ok(plan)
}

pub async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;
    let overrides = cli.command.config_overrides();

    match cli.command {
        Commands::Reduce {
            input_dir,
            output_dir,
            file_pattern,
            extract_dir,
            max_workers,
        } => {
            println!("Reducing SYNOP exports...");
            println!("Input directory: {}", input_dir.display());
            println!("Output directory: {}", output_dir.display());

            let catalog = scan_sources(&input_dir, &file_pattern)?;
            println!("{}", catalog.display_summary());
            let plan = plan_reduction(&catalog, &output_dir)?;

            // Every header must resolve before any reduced file is written.
            let checking = ProgressReporter::new_spinner("Checking headers...", false);
            let reducer = FieldReducer::new();
            for source in catalog.files() {
                checking.set_message(&format!("Checking {}", source.path.display()));
                reducer.check_schema(&source.path)?;
            }
            checking.finish_with_message("All headers resolved");

            let progress = Arc::new(ProgressReporter::new(
                catalog.len() as u64,
                "Reducing archives...",
                false,
            ));
            let semaphore = Arc::new(Semaphore::new(max_workers.max(1)));
            let mut tasks = JoinSet::new();

            for (source, name) in plan {
                let output = output_dir.join(&name);
                let extracted = extract_dir
                    .as_ref()
                    .filter(|_| source.compressed)
                    .map(|dir| dir.join(&name));

                let permit = semaphore
                    .clone()
                    .acquire_owned()
                    .await
                    .map_err(|e| ProcessingError::Config(e.to_string()))?;
                let progress = progress.clone();

                tasks.spawn_blocking(move || {
                    let _permit = permit;
                    if let Some(extracted) = extracted {
                        extract_gzip(&source.path, &extracted, false)?;
                    }
                    let summary = FieldReducer::new().reduce_file(&source.path, &output);
                    progress.increment(1);
                    summary
                });
            }

            let mut total_rows = 0;
            let mut files = 0;
            while let Some(joined) = tasks.join_next().await {
                let summary = joined??;
                progress.println(&format!(
                    "{}: {} rows",
                    summary.source.display(),
                    summary.rows
                ));
                total_rows += summary.rows;
                files += 1;
            }

            progress.finish_with_message(&format!("Reduced {} files", files));
            println!("Wrote {} rows into {}", total_rows, output_dir.display());
        }

        Commands::Pivot {
            input_dir,
            station_id,
            output_file,
            compression,
            file_pattern,
            strict,
            mmap,
            max_workers,
        } => {
            let output_file =
                output_file.unwrap_or_else(|| generate_default_day_table_filename(station_id));
            println!("Pivoting station {}...", station_id);
            println!("Input directory: {}", input_dir.display());
            println!("Output file: {}", output_file.display());

            let writer = ParquetWriter::new().with_compression(&compression)?;
            let catalog = scan_sources(&input_dir, &file_pattern)?;
            let paths = catalog.paths();
            let progress = ProgressReporter::new(paths.len() as u64, "Scanning files...", false);
            let pipeline = WindPipeline::new(PipelineConfig::for_station(station_id))
                .with_max_workers(max_workers)
                .with_strict(strict)
                .with_mmap(mmap);

            let (table, report) = tokio::task::spawn_blocking(move || {
                let result = pipeline.build_day_table(&paths, Some(&progress));
                progress.finish_with_message("Extraction complete");
                result
            })
            .await??;

            println!("\n{}", report.generate_summary());
            println!("{}", table.summary());

            writer.write_day_table(&table, &output_file)?;
            let file_info = writer.get_file_info(&output_file)?;
            println!("\n{}", file_info.summary());
            println!("Processing complete!");
        }

        Commands::Correlate {
            input_dir,
            config,
            output_file,
            day_table,
            file_pattern,
            strict,
            mmap,
            max_workers,
            ..
        } => {
            let config = PipelineConfig::load(config.as_deref())?.with_overrides(&overrides)?;
            info!("Pipeline configuration: {:?}", config);
            let output_file = output_file.unwrap_or_else(|| {
                generate_default_histogram_filename(config.station_id, config.hour_a, config.hour_b)
            });

            println!(
                "Correlating wind direction at {:02}h and {:02}h for station {}...",
                config.hour_a, config.hour_b, config.station_id
            );
            println!("Input directory: {}", input_dir.display());

            let catalog = scan_sources(&input_dir, &file_pattern)?;
            let paths = catalog.paths();
            let progress = ProgressReporter::new(paths.len() as u64, "Scanning files...", false);
            let pipeline = WindPipeline::new(config)
                .with_max_workers(max_workers)
                .with_strict(strict)
                .with_mmap(mmap);

            let output =
                tokio::task::spawn_blocking(move || pipeline.run(&paths, Some(&progress)))
                    .await??;

            println!("\n{}", output.report.generate_summary());
            println!("{}", output.table.summary());
            println!("\n{}", output.histogram.summary());

            HistogramWriter::new().write(&output.histogram, &output_file)?;
            println!("\nHistogram written to {}", output_file.display());

            if let Some(path) = day_table {
                write_day_table(&output.table, &path)?;
            }
        }

        Commands::Info { file, sample } => {
            println!("Analyzing day table: {}", file.display());

            let writer = ParquetWriter::new();
            let file_info = writer.get_file_info(&file)?;
            println!("\n{}", file_info.summary());

            let table = writer.read_day_table(&file, sample)?;
            println!("\n{}", table.summary());

            if sample > 0 {
                println!("\nSample days (showing up to {}):", sample);
                for (i, row) in table.rows.iter().enumerate() {
                    let speeds: Vec<String> = row
                        .field_values(WeatherField::WindSpeed)
                        .iter()
                        .map(|v| v.map_or("-".to_string(), |s| format!("{:.1}", s)))
                        .collect();
                    println!(
                        "{}. {} ({} hours): wind speed {}",
                        i + 1,
                        row.date,
                        row.hours_with_data(),
                        speeds.join(" ")
                    );
                }
            }
        }
    }

    Ok(())
}

fn write_day_table(table: &DayTable, path: &Path) -> Result<()> {
    let writer = ParquetWriter::new();
    writer.write_day_table(table, path)?;
    println!("Day table written to {}", path.display());
    Ok(())
}
