/// Text/JSON report over a survey CSV export: the presentation wrapper around
/// the analysis pipeline. Everything it prints comes out of `SurveyPipeline`;
/// nothing here feeds back into the core.
use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use survey_analytics::domain::{CompField, FilterTally, GroupAggregate};
use survey_analytics::fields;
use survey_analytics::gateway::{CsvFileSource, ResponseSource};
use survey_analytics::logging;
use survey_analytics::{SurveyConfig, SurveyPipeline};

#[derive(Parser)]
#[command(name = "survey-report")]
#[command(about = "Aggregated compensation views over a survey CSV export")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the survey CSV export
    #[arg(long)]
    data: PathBuf,

    /// Reference tables and thresholds
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Emit JSON instead of text
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Overall income distribution and medians
    Incomes {
        /// Use the base salary instead of total compensation
        #[arg(long)]
        base: bool,
    },
    /// Median income per group of a question (e.g. gender, country, degree)
    Groups {
        #[arg(long)]
        by: String,
    },
    /// Bucketed categorical breakdown, optionally split per group
    Breakdown {
        #[arg(long)]
        field: String,
        #[arg(long)]
        group_by: Option<String>,
    },
    /// Share of respondents abroad per graduation year
    Abroad,
}

/// Maps the user-facing question names to the verbatim survey headers.
fn field_by_name(name: &str) -> Option<&'static str> {
    match name {
        "country" => Some(fields::COUNTRY),
        "gender" => Some(fields::GENDER),
        "degree" => Some(fields::DEGREE),
        "profession" => Some(fields::PROFESSION),
        "education" => Some(fields::HIGHEST_EDUCATION),
        "employment" => Some(fields::EMPLOYMENT_KIND),
        "graduation-year" => Some(fields::GRADUATION_YEAR),
        "satisfaction" => Some(fields::SATISFACTION),
        "company-size" => Some(fields::COMPANY_SIZE),
        "city-size" => Some(fields::CITY_SIZE),
        _ => None,
    }
}

const KNOWN_FIELDS: &str =
    "country, gender, degree, profession, education, employment, graduation-year, satisfaction, company-size, city-size";

fn resolve_field(name: &str) -> anyhow::Result<&'static str> {
    match field_by_name(name) {
        Some(field) => Ok(field),
        None => bail!("unknown question '{}'; available: {}", name, KNOWN_FIELDS),
    }
}

fn print_tally(tally: &FilterTally) {
    println!(
        "{} of {} responses usable for income statistics ({} without income or comparability data, {} below minimum wage, {} not in the labor force)",
        tally.retained, tally.total, tally.empty, tally.below_minimum, tally.ineligible
    );
}

fn print_groups(groups: &[GroupAggregate]) {
    for group in groups {
        println!(
            "{:<40} n={:<4} median {:>8.3} (-{:.3}/+{:.3}) tys. PLN nominal, {:>8.3} (-{:.3}/+{:.3}) tys. PLN PPP",
            group.display_label,
            group.samples,
            group.nominal.median,
            group.nominal.spread_below,
            group.nominal.spread_above,
            group.ppp.median,
            group.ppp.spread_below,
            group.ppp.spread_above,
        );
    }
}

fn main() -> anyhow::Result<()> {
    logging::init_logging();
    let cli = Cli::parse();

    let config = SurveyConfig::load(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    let raw = CsvFileSource::new(&cli.data)
        .fetch()
        .with_context(|| format!("reading survey export {}", cli.data.display()))?;
    let pipeline = SurveyPipeline::from_raw(config, &raw)?;

    match cli.command {
        Commands::Incomes { base } => {
            let field = if base { CompField::Base } else { CompField::Total };
            let (distribution, tally) = pipeline.income_distribution(field)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&distribution)?);
            } else {
                print_tally(&tally);
                if let (Some(nominal), Some(ppp)) =
                    (distribution.median_nominal, distribution.median_ppp)
                {
                    println!(
                        "median {:.3} tys. PLN nominal, {:.3} tys. PLN after PPP",
                        nominal, ppp
                    );
                } else {
                    println!("no usable income responses");
                }
            }
        }
        Commands::Groups { by } => {
            let field = resolve_field(&by)?;
            let (groups, tally) = pipeline.median_by_group(field)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&groups)?);
            } else {
                print_tally(&tally);
                print_groups(&groups);
            }
        }
        Commands::Breakdown { field, group_by } => {
            let field = resolve_field(&field)?;
            match group_by {
                Some(group_by) => {
                    let group_field = resolve_field(&group_by)?;
                    let result = pipeline.categorical_breakdown_by_group(field, group_field);
                    if cli.json {
                        println!("{}", serde_json::to_string_pretty(&result)?);
                    } else {
                        println!("ogółem:");
                        for entry in &result.overall.entries {
                            println!("  {:<40} {}", entry.category, entry.count);
                        }
                        for (label, dist) in &result.per_group {
                            println!("{}:", label);
                            for entry in &dist.entries {
                                println!("  {:<40} {}", entry.category, entry.count);
                            }
                        }
                    }
                }
                None => {
                    let dist = pipeline.categorical_breakdown(field);
                    if cli.json {
                        println!("{}", serde_json::to_string_pretty(&dist)?);
                    } else {
                        for entry in &dist.entries {
                            println!("{:<40} {}", entry.category, entry.count);
                        }
                    }
                }
            }
        }
        Commands::Abroad => {
            let shares = pipeline.abroad_share_by_graduation_year();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&shares)?);
            } else {
                for share in &shares {
                    println!(
                        "{:<6} {:>5.1}% abroad (n={})",
                        share.graduation_year,
                        share.share_abroad * 100.0,
                        share.samples
                    );
                }
            }
        }
    }

    Ok(())
}
