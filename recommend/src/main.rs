use anyhow::Result;
use catalog::{Catalog, CourseType, IndexOptions, LevelChoice, QueryForm, Recommendation};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "recommend")]
#[command(about = "Recommend courses from a CSV catalog by keyword", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CatalogArgs {
    /// Course catalog CSV
    #[arg(long, default_value = "udemy_course_data.csv")]
    catalog: String,
    /// Reduce title and query terms to their English stem
    #[arg(long, default_value_t = false)]
    stem: bool,
    /// Use ln(N/df) + 1 instead of the smoothed ln((1 + N)/(1 + df)) + 1
    #[arg(long, default_value_t = false)]
    no_smooth_idf: bool,
    /// Use 1 + ln(tf) instead of raw term counts
    #[arg(long, default_value_t = false)]
    sublinear_tf: bool,
}

impl CatalogArgs {
    fn options(&self) -> IndexOptions {
        IndexOptions { smooth_idf: !self.no_smooth_idf, sublinear_tf: self.sublinear_tf, stem: self.stem }
    }

    fn open(&self) -> Result<Catalog> {
        Ok(Catalog::open(&self.catalog, self.options())?)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Rank the catalog against a keyword and print the top courses
    Query {
        #[command(flatten)]
        catalog: CatalogArgs,
        /// Keyword to search for, e.g. "web development"
        #[arg(long, default_value = "")]
        keyword: String,
        /// Hours available per day
        #[arg(long, default_value_t = 2.0)]
        daily_hours: f64,
        /// Number of days available
        #[arg(long, default_value_t = 5.0)]
        num_days: f64,
        /// Both, Paid or Free
        #[arg(long, default_value = "Both")]
        course_type: CourseType,
        /// All Levels, Beginner Level, Intermediate Level or Expert Level
        #[arg(long, default_value = "All Levels")]
        level: LevelChoice,
        /// Print the outcome as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Load the catalog and report what was indexed
    Inspect {
        #[command(flatten)]
        catalog: CatalogArgs,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Query { catalog, keyword, daily_hours, num_days, course_type, level, json } => {
            let form = QueryForm { keyword, daily_hours, num_days, course_type, level };
            run_query(&catalog, form, json)
        }
        Commands::Inspect { catalog } => inspect(&catalog),
    }
}

fn run_query(args: &CatalogArgs, form: QueryForm, json: bool) -> Result<()> {
    let keyword = form.keyword.clone();
    let max_duration_hours = form.max_duration_hours();
    let catalog = args.open()?;
    let recommendation = catalog.recommend_form(form)?;

    if json {
        let out = serde_json::json!({
            "keyword": keyword,
            "max_duration_hours": max_duration_hours,
            "recommendation": recommendation,
            "warnings": catalog.schema().skipped_filters(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    for warning in catalog.schema().skipped_filters() {
        eprintln!("warning: {warning}");
    }
    match &recommendation {
        Recommendation::Results(results) => {
            println!("Top Recommended Courses:");
            for (rank, r) in results.iter().enumerate() {
                let paid = match r.is_paid {
                    Some(true) => "paid",
                    Some(false) => "free",
                    None => "-",
                };
                println!(
                    "{:>2}. {} [{} | {} | {}] ({:.3})",
                    rank + 1,
                    r.title,
                    r.duration_raw,
                    paid,
                    r.level.as_deref().unwrap_or("-"),
                    r.score
                );
                if !r.url.is_empty() {
                    println!("    {}", r.url);
                }
            }
        }
        other => {
            if let Some(message) = other.message() {
                println!("{message}");
            }
        }
    }
    Ok(())
}

fn inspect(args: &CatalogArgs) -> Result<()> {
    let catalog = args.open()?;
    let summary = catalog.summary();
    println!("{}", serde_json::to_string_pretty(&summary)?);
    tracing::info!(courses = summary.courses, num_terms = summary.num_terms, "inspection complete");
    Ok(())
}
