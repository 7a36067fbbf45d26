//! `craftdex show` command - detail view of one craft

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::args::{GlobalOpts, OutputFormat};
use crate::cli::helpers::{format_amount, load_config, open_collection, CraftView};
use crate::core::criteria::FilterCriteria;

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Craft path or name (names match case-insensitively as a fallback)
    pub reference: String,

    /// Restrict the lookup to one save folder
    #[arg(long, short = 'g')]
    pub group: Option<String>,
}

pub fn run(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global);
    let mut collection = open_collection(&config)?;
    collection.load_all()?;

    let mut criteria = FilterCriteria::new();
    criteria.group = args.group.clone();
    collection.filter(&criteria);

    let path = collection
        .find(&args.reference)
        .map(|craft| craft.path.clone())
        .ok_or_else(|| miette::miette!("No craft found matching '{}'", args.reference))?;
    collection.select(&path);

    let craft = collection
        .selected()
        .ok_or_else(|| miette::miette!("No craft found matching '{}'", args.reference))?;
    let view = CraftView::new(&collection, craft);

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&view).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&view).into_diagnostic()?);
        }
        OutputFormat::Path => {
            println!("{}", craft.path.display());
        }
        _ => {
            let info = &craft.info;
            println!("{}", style("─".repeat(60)).dim());
            println!("{}: {}", style("Name").bold(), style(craft.name()).cyan());
            if !info.alt_name.is_empty() && info.alt_name != craft.name() {
                println!("{}: {}", style("Ship").bold(), info.alt_name);
            }
            println!("{}: {}", style("Type").bold(), info.construction_type);
            println!("{}: {}", style("Group").bold(), craft.group);
            println!("{}: {}", style("Path").bold(), craft.path.display());
            println!("{}", style("─".repeat(60)).dim());
            println!("{}: {}", style("Parts").bold(), info.part_count);
            println!("{}: {}", style("Stages").bold(), info.stage_count);
            println!(
                "{}: {} (dry {}, fuel {})",
                style("Cost").bold(),
                format_amount(info.cost.total),
                format_amount(info.cost.dry),
                format_amount(info.cost.fuel)
            );
            println!(
                "{}: {} (dry {}, fuel {})",
                style("Mass").bold(),
                format_amount(info.mass.total),
                format_amount(info.mass.dry),
                format_amount(info.mass.fuel)
            );
            if info.missing_parts {
                println!("{}", style("Contains parts missing from the part catalog").red());
            }
            if info.locked_parts {
                println!("{}", style("Contains parts that are not yet researched").yellow());
            }
            if !view.tags.is_empty() {
                println!("{}: {}", style("Tags").bold(), view.tags.join(", "));
            }
            if let Some(thumb) = &craft.thumbnail {
                println!("{}: {}", style("Thumbnail").bold(), thumb.display());
            }
            println!(
                "{}: {}",
                style("Created").bold(),
                craft.created_at.format("%Y-%m-%d %H:%M")
            );
            println!(
                "{}: {}",
                style("Updated").bold(),
                craft.updated_at.format("%Y-%m-%d %H:%M")
            );
            if !info.description.is_empty() {
                println!("{}", style("─".repeat(60)).dim());
                println!("{}", info.description);
            }
            println!("{}", style("─".repeat(60)).dim());
        }
    }
    Ok(())
}
