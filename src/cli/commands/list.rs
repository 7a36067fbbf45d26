//! `craftdex list` command - filtered, sorted craft listing

use clap::ValueEnum;
use console::style;
use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::cli::args::{GlobalOpts, OutputFormat};
use crate::cli::helpers::{
    format_amount, format_flag, load_config, open_collection, truncate_str, CraftView,
};
use crate::core::collection::CraftCollection;
use crate::core::config::Config;
use crate::core::criteria::{FilterCriteria, SortKey, TagMode};
use crate::entities::craft::CraftData;

#[derive(clap::Args, Debug, Default)]
pub struct ListArgs {
    /// Only crafts in this save folder
    #[arg(long, short = 'g')]
    pub group: Option<String>,

    /// Case-insensitive search in craft names
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Construction types to include (repeatable or comma separated)
    #[arg(long = "type", short = 't', value_delimiter = ',')]
    pub types: Vec<TypeFilter>,

    /// Required tags; a craft must carry all of them unless --any-tag is set
    #[arg(long = "tag", id = "tag_filter", value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Match crafts carrying at least one of the --tag values
    #[arg(long, requires = "tag_filter")]
    pub any_tag: bool,

    /// Sort by field (default: configured default_sort, else scan order)
    #[arg(long)]
    pub sort: Option<SortColumn>,

    /// Reverse sort order
    #[arg(long, short = 'r')]
    pub reverse: bool,

    /// Limit number of results
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

/// Construction type filter values
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum TypeFilter {
    Vab,
    Sph,
    #[value(alias = "subassemblies")]
    Subassembly,
}

impl TypeFilter {
    /// Label as shown in the type selector
    fn label(self) -> &'static str {
        match self {
            TypeFilter::Vab => "VAB",
            TypeFilter::Sph => "SPH",
            TypeFilter::Subassembly => "Subassemblies",
        }
    }
}

/// Sortable list columns
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum SortColumn {
    Name,
    PartCount,
    StageCount,
    Mass,
    Created,
    Updated,
}

impl From<SortColumn> for SortKey {
    fn from(column: SortColumn) -> Self {
        match column {
            SortColumn::Name => SortKey::Name,
            SortColumn::PartCount => SortKey::PartCount,
            SortColumn::StageCount => SortKey::StageCount,
            SortColumn::Mass => SortKey::Mass,
            SortColumn::Created => SortKey::CreatedAt,
            SortColumn::Updated => SortKey::UpdatedAt,
        }
    }
}

/// Translate list flags into collection criteria
pub fn criteria(args: &ListArgs, config: &Config) -> FilterCriteria {
    let mut criteria = FilterCriteria::new();
    criteria.group = args.group.clone();
    criteria.search = args.search.clone();

    for t in &args.types {
        criteria = criteria.with_type(t.label());
    }

    if !args.tags.is_empty() {
        let mode = if args.any_tag {
            TagMode::Union
        } else {
            TagMode::Reduce
        };
        criteria = criteria.tags(args.tags.iter().cloned(), mode);
    }

    criteria.sort = args.sort.map(SortKey::from).or_else(|| config.default_sort());
    criteria.reverse_sort = args.reverse;
    criteria
}

pub fn run(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global);
    let mut collection = open_collection(&config)?;
    let stats = collection.load_all()?;
    if stats.skipped > 0 && !global.quiet {
        eprintln!(
            "{} {} craft file(s) could not be loaded",
            style("!").yellow(),
            stats.skipped
        );
    }

    collection.filter(&criteria(&args, &config));

    let mut crafts: Vec<&CraftData> = collection.filtered().collect();
    if let Some(limit) = args.limit {
        crafts.truncate(limit);
    }

    if args.count {
        println!("{}", crafts.len());
        return Ok(());
    }

    output_crafts(&collection, &crafts, global.format)
}

const HEADERS: [&str; 9] = [
    "NAME", "TYPE", "GROUP", "PARTS", "STAGES", "COST", "MASS", "MISSING", "LOCKED",
];

fn row(craft: &CraftData) -> [String; 9] {
    [
        craft.name().to_string(),
        craft.info.construction_type.to_string(),
        craft.group.clone(),
        craft.info.part_count.to_string(),
        craft.info.stage_count.to_string(),
        format_amount(craft.info.cost.total),
        format_amount(craft.info.mass.total),
        format_flag(craft.info.missing_parts).to_string(),
        format_flag(craft.info.locked_parts).to_string(),
    ]
}

fn output_crafts(
    collection: &CraftCollection,
    crafts: &[&CraftData],
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Auto => {
            if crafts.is_empty() {
                println!("No crafts found.");
                return Ok(());
            }
            println!(
                "{:<28} {:<12} {:<14} {:>6} {:>6} {:>12} {:>10}  {}",
                style("NAME").bold(),
                style("TYPE").bold(),
                style("GROUP").bold(),
                style("PARTS").bold(),
                style("STAGES").bold(),
                style("COST").bold(),
                style("MASS").bold(),
                style("FLAGS").bold()
            );
            println!("{}", "-".repeat(100));
            for craft in crafts {
                let mut flags = Vec::new();
                if craft.info.missing_parts {
                    flags.push(style("missing").red().to_string());
                }
                if craft.info.locked_parts {
                    flags.push(style("locked").yellow().to_string());
                }
                println!(
                    "{:<28} {:<12} {:<14} {:>6} {:>6} {:>12} {:>10}  {}",
                    style(truncate_str(craft.name(), 26)).cyan(),
                    craft.info.construction_type,
                    truncate_str(&craft.group, 12),
                    craft.info.part_count,
                    craft.info.stage_count,
                    format_amount(craft.info.cost.total),
                    format_amount(craft.info.mass.total),
                    flags.join(",")
                );
            }
            println!();
            println!("{} craft(s) found.", style(crafts.len()).cyan());
        }
        OutputFormat::Tsv => {
            println!("{}", HEADERS.join("\t"));
            for craft in crafts {
                println!("{}", row(craft).join("\t"));
            }
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(std::io::stdout());
            writer
                .write_record(HEADERS.iter().map(|h| h.to_lowercase()))
                .into_diagnostic()?;
            for craft in crafts {
                writer.write_record(row(craft)).into_diagnostic()?;
            }
            writer.flush().into_diagnostic()?;
        }
        OutputFormat::Md => {
            let mut builder = Builder::default();
            builder.push_record(HEADERS);
            for craft in crafts {
                builder.push_record(row(craft));
            }
            println!("{}", builder.build().with(Style::markdown()));
        }
        OutputFormat::Json => {
            let views: Vec<CraftView> = crafts
                .iter()
                .map(|craft| CraftView::new(collection, craft))
                .collect();
            println!("{}", serde_json::to_string_pretty(&views).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            let views: Vec<CraftView> = crafts
                .iter()
                .map(|craft| CraftView::new(collection, craft))
                .collect();
            print!("{}", serde_yml::to_string(&views).into_diagnostic()?);
        }
        OutputFormat::Path => {
            for craft in crafts {
                println!("{}", craft.path.display());
            }
        }
    }
    Ok(())
}
