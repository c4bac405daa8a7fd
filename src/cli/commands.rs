use crate::cli::args::{Cli, Commands, FetchArgs, PathArgs};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::fetch::FetchClient;
use crate::processors::{AnalysisOutcome, Pipeline, TransformSummary};
use crate::utils::progress::ProgressReporter;
use crate::writers::{DatasetFormat, ParquetWriter};
use tracing::{info, warn};

pub async fn run(cli: Cli) -> Result<()> {
    let mut config = PipelineConfig::load(cli.config.as_deref())?;
    let quiet = cli.quiet;

    match cli.command {
        Commands::Extract { fetch, paths } => {
            configure(&mut config, &paths, Some(&fetch))?;
            extract(&config, quiet).await?;

            let pipeline = Pipeline::new(config);
            audit(&pipeline, quiet)?;
        }

        Commands::Audit { paths } => {
            configure(&mut config, &paths, None)?;
            audit(&Pipeline::new(config), quiet)?;
        }

        Commands::Transform { paths } => {
            configure(&mut config, &paths, None)?;
            let pipeline = Pipeline::new(config);

            let progress = ProgressReporter::spinner("Transforming...", quiet);
            let summary = pipeline.transform(Some(&progress))?;
            progress.finish_with_message("Transformation complete");

            print_transform(&summary)?;
        }

        Commands::Analyze { paths } => {
            configure(&mut config, &paths, None)?;
            let pipeline = Pipeline::new(config);

            let progress = ProgressReporter::spinner("Analyzing...", quiet);
            let outcome = pipeline.analyze(Some(&progress))?;
            progress.finish_with_message("Analysis complete");

            print_analysis(&outcome);
        }

        Commands::Run {
            fetch,
            fetch_args,
            paths,
        } => {
            configure(&mut config, &paths, Some(&fetch_args))?;
            if fetch {
                extract(&config, quiet).await?;
            }

            let pipeline = Pipeline::new(config);
            let progress = ProgressReporter::spinner("Running pipeline...", quiet);
            let summary = pipeline.run(Some(&progress))?;
            progress.finish_with_message("Pipeline finished");

            println!("\n{}", summary.quality.summary());
            match (&summary.transform, &summary.analysis) {
                (Some(transform), Some(analysis)) => {
                    print_transform(transform)?;
                    print_analysis(analysis);
                }
                _ => println!("No batches passed the quality gate; transformation skipped"),
            }
        }
    }

    Ok(())
}

fn configure(config: &mut PipelineConfig, paths: &PathArgs, fetch: Option<&FetchArgs>) -> Result<()> {
    paths.apply(config);
    if let Some(fetch) = fetch {
        fetch.apply(config);
    }
    config.validate()
}

async fn extract(config: &PipelineConfig, quiet: bool) -> Result<()> {
    let client = FetchClient::new(config.fetch.clone())?;
    info!(
        "Fetching {} station-years into {}",
        client.task_count(),
        config.raw_data_dir.display()
    );

    let progress = ProgressReporter::bar(client.task_count() as u64, "Fetching raw batches...", quiet);
    let summary = client.fetch_all(&config.raw_data_dir, &progress).await?;
    progress.finish_with_message(&format!(
        "Fetched {} batches ({} failed)",
        summary.saved.len(),
        summary.failed.len()
    ));

    for (key, message) in &summary.failed {
        warn!("{} was not extracted: {}", key, message);
    }
    Ok(())
}

fn audit(pipeline: &Pipeline, quiet: bool) -> Result<()> {
    let progress = ProgressReporter::spinner("Auditing...", quiet);
    let report = pipeline.audit(Some(&progress))?;
    progress.finish_with_message("Audit complete");

    println!("\n{}", report.summary());
    println!(
        "Quality report written to {}",
        pipeline.config().quality_report_path().display()
    );
    Ok(())
}

fn print_transform(summary: &TransformSummary) -> Result<()> {
    println!(
        "\nProcessed {} observations from {} batches into {} monthly rows",
        summary.observations, summary.batches, summary.monthly_rows
    );
    println!("Dataset written to {}", summary.output_path.display());

    if DatasetFormat::from_path(&summary.output_path) == DatasetFormat::Parquet {
        let info = ParquetWriter::new().get_file_info(&summary.output_path)?;
        println!("\n{}", info.summary());
    }
    Ok(())
}

fn print_analysis(outcome: &AnalysisOutcome) {
    for table in outcome.results.tables() {
        println!("\n{}", table.render());
    }
    println!("Analysis results written to {}", outcome.artifact_path.display());
}
