use crate::infra::{
    load_statistics, parse_framework, parse_taxonomy, weight_resolver, OfflineGenerator,
};
use chrono::SecondsFormat;
use clap::Args;
use climate_risk::assessment::{
    AssessmentOrchestrator, AssessmentRun, CompositeBasis, FrameworkKind, Orientation,
    RetryPolicy, Subject, Taxonomy,
};
use climate_risk::error::AppError;
use climate_risk::scoring::{residual_risk, SectorCode, WeightingTriple};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Company name to assess
    #[arg(long, default_value = "Prairie Power Cooperative")]
    pub(crate) company: String,
    /// Free-form industry description, mapped onto a weighting sector
    #[arg(long, default_value = "Electric utilities")]
    pub(crate) industry: String,
    /// Category taxonomy (transition, opportunity, tcfd, tnfd, ecological)
    #[arg(long, default_value = "transition", value_parser = parse_taxonomy)]
    pub(crate) taxonomy: Taxonomy,
    /// Scoring framework (standard or advanced)
    #[arg(long, default_value = "standard", value_parser = parse_framework)]
    pub(crate) framework: FrameworkKind,
    /// Carbon intensity hint passed to the generator
    #[arg(long, default_value = "medium")]
    pub(crate) carbon_intensity: String,
    /// Optional sector profile CSV
    #[arg(long)]
    pub(crate) profiles_csv: Option<PathBuf>,
    /// Optional scenario impact CSV
    #[arg(long)]
    pub(crate) scenarios_csv: Option<PathBuf>,
    /// Print the full run as JSON instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct WeightsArgs {
    /// Sector code or industry label, e.g. `food_beverage` or "Food & Beverage"
    pub(crate) sector: String,
    /// Category label to resolve; omit to print the sector summary
    #[arg(long)]
    pub(crate) category: Option<String>,
    /// Subcategory label to resolve within the category
    #[arg(long, default_value = "")]
    pub(crate) subcategory: String,
}

#[derive(Args, Debug)]
pub(crate) struct ClassifyArgs {
    pub(crate) category: String,
    #[arg(default_value = "")]
    pub(crate) subcategory: String,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        company,
        industry,
        taxonomy,
        framework,
        carbon_intensity,
        profiles_csv,
        scenarios_csv,
        json,
    } = args;

    let statistics = load_statistics(profiles_csv.as_deref(), scenarios_csv.as_deref())?;
    let orchestrator = AssessmentOrchestrator::new(
        Arc::new(OfflineGenerator),
        Arc::new(statistics),
        weight_resolver()?,
    )
    .with_retry_policy(RetryPolicy::no_retry());

    let mut subject = Subject::new(company, industry);
    subject.carbon_intensity = carbon_intensity;

    let run = orchestrator.run(&subject, taxonomy, framework).await;
    if json {
        match serde_json::to_string_pretty(&run) {
            Ok(rendered) => println!("{rendered}"),
            Err(err) => eprintln!("unable to render run as JSON: {err}"),
        }
        return Ok(());
    }

    render_run(&run);
    Ok(())
}

fn render_run(run: &AssessmentRun) {
    println!("=== Climate Risk Assessment ===");
    println!("Subject: {}", run.subject);
    println!("Sector: {}", run.sector);
    println!(
        "Taxonomy: {} | Framework: {:?} | Weights: {}",
        run.taxonomy.code(),
        run.framework,
        run.weight_table_version
    );
    println!(
        "Generated: {}",
        run.generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    );
    println!(
        "Sector context: {}",
        if run.sector_context_available {
            "available"
        } else {
            "not loaded"
        }
    );

    println!("\nRecords:");
    for record in run.records() {
        let marker = match record.orientation {
            Orientation::Risk => "R",
            Orientation::Opportunity => "O",
        };
        let basis = match &record.composite_basis {
            CompositeBasis::Weighted(resolution) => format!(
                "weighted {} ({:?})",
                format_triple(&resolution.weights),
                resolution.source
            ),
            CompositeBasis::Reported => "reported".to_string(),
        };
        println!(
            "  [{marker}] {:<40} {:<48} {:>5.2}  {basis}",
            record.category, record.subcategory, record.composite_score
        );
        let scores: Vec<_> = run
            .framework
            .metrics(record.orientation)
            .iter()
            .filter_map(|metric| {
                record
                    .sub_scores
                    .get(*metric)
                    .map(|score| format!("{metric:?}={score}"))
            })
            .collect();
        println!("      {}", scores.join(" "));
    }

    let failures: Vec<_> = run.failures().collect();
    if failures.is_empty() {
        println!("\nAll {} pairs assessed.", run.outcomes.len());
    } else {
        println!("\nFailures ({} of {}):", failures.len(), run.outcomes.len());
        for failure in failures {
            println!(
                "  - {} / {} after {} attempt(s): {}",
                failure.pair.category, failure.pair.subcategory, failure.attempts, failure.error
            );
        }
    }
}

pub(crate) fn run_weights(args: WeightsArgs) -> Result<(), AppError> {
    let resolver = weight_resolver()?;
    let sector = SectorCode::from_code(&args.sector);

    match args.category {
        Some(category) => {
            let resolution = resolver.explain(&args.sector, &category, &args.subcategory);
            println!(
                "{} / {} -> {} ({:?}, {:?})",
                category,
                if args.subcategory.is_empty() {
                    "<category default>"
                } else {
                    args.subcategory.as_str()
                },
                resolution.group,
                resolution.classification,
                resolution.source
            );
            println!("  weights: {}", format_triple(&resolution.weights));
            println!(
                "  all-threes composite: {:.2}",
                residual_risk(3, 3, 3, &resolution.weights)
            );
            if let Some(sector) = sector {
                let cell = resolver.table().category(sector, resolution.group);
                for (subcategory, weights) in &cell.subcategories {
                    println!("    {:<48} {}", subcategory, format_triple(weights));
                }
            }
        }
        None => {
            match sector {
                Some(sector) => println!("Sector: {sector}"),
                None => println!("Sector: {} (unknown, global defaults)", args.sector),
            }
            println!("Weight table: {}", resolver.table().version());
            for (group, weights) in resolver.table().summary(sector) {
                println!("  {:<16} {}", group.to_string(), format_triple(&weights));
            }
        }
    }

    Ok(())
}

pub(crate) fn run_classify(args: ClassifyArgs) -> Result<(), AppError> {
    let resolver = weight_resolver()?;
    let classification = resolver
        .classifier()
        .explain(&args.category, &args.subcategory);
    println!(
        "{} / {} -> {} via {:?}",
        args.category, args.subcategory, classification.group, classification.route
    );
    Ok(())
}

fn format_triple(weights: &WeightingTriple) -> String {
    format!(
        "L {:.2} / I {:.2} / V {:.2}",
        weights.likelihood, weights.impact, weights.vulnerability
    )
}
