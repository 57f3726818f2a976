use std::collections::BTreeMap;

use anyhow::Context;
use casediff_catalog::Catalog;
use casediff_diff::{Grid, GridOptions, GridRow};
use casediff_namelist::{parse_mom_params, parse_namelist};
use casediff_session::CompareSession;
use casediff_types::{CaseId, CaseSelection, Component};
use colored::Colorize;

use crate::cli::*;
use crate::config::BoardConfig;

pub async fn run_command(cli: Cli, config: BoardConfig) -> anyhow::Result<()> {
    match cli.command {
        Command::Catalog => cmd_catalog(&config, cli.format),
        Command::Compare(args) => cmd_compare(&config, args, cli.format).await,
        Command::Parse(args) => cmd_parse(args),
    }
}

fn cmd_catalog(config: &BoardConfig, format: OutputFormat) -> anyhow::Result<()> {
    let catalog = Catalog::load(&config.catalog_path())?;
    let availability = catalog.availability();

    if format == OutputFormat::Json {
        let report: BTreeMap<&str, Vec<String>> = Component::ALL
            .into_iter()
            .map(|c| {
                let cases = catalog.eligible_cases(c).iter().map(ToString::to_string).collect();
                (c.tag(), cases)
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{} cases in {}", catalog.len().to_string().bold(), config.catalog_path().display());
    for (component, count) in availability.iter() {
        let label = format!("{:<4}{:>4} cases", component.tag(), count);
        if availability.is_comparable(component, CaseSelection::MIN) {
            println!("  {}  {}", label.green(), component.label().dimmed());
        } else {
            println!("  {}  {}", label.dimmed(), "not comparable".red());
        }
    }
    Ok(())
}

async fn cmd_compare(
    config: &BoardConfig,
    args: CompareArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let component: Component = args.component.parse()?;
    let cases = args
        .cases
        .into_iter()
        .map(CaseId::new)
        .collect::<Result<Vec<_>, _>>()?;

    let session = CompareSession::open(
        &config.data_dir,
        &config.catalog_file,
        config.fetch_timeout(),
    )?;
    let table = session.compare(component, cases).await?;
    let grid = Grid::from_table(
        &table,
        GridOptions {
            only_divergent: args.only_diff,
        },
    );

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&grid)?);
        return Ok(());
    }

    println!(
        "{} {}: {} keys, {} differ, {} overridden",
        component.label().bold(),
        format!("({})", component.tag()).dimmed(),
        grid.summary.rows,
        grid.summary.divergent.to_string().yellow(),
        grid.summary.overridden,
    );
    if grid.rows.is_empty() {
        println!("{}", "No differences.".green());
        return Ok(());
    }
    print_grid(&grid);
    Ok(())
}

fn print_grid(grid: &Grid) {
    if !colored::control::SHOULD_COLORIZE.should_colorize() {
        print!("{}", grid.render_text());
        return;
    }
    let widths = grid.column_widths();
    println!("{}", grid.header_line(&widths).bold());
    println!("{}", grid.rule_line(&widths).dimmed());

    for row in &grid.rows {
        let line = Grid::format_row(row, &widths);
        match row {
            GridRow::Section { .. } => println!("{}", line.cyan().bold()),
            GridRow::Group { .. } => println!("{}", line.blue()),
            GridRow::Entry(entry) if entry.divergent => println!("{}", line.yellow()),
            GridRow::Entry(entry) if entry.note.is_some() => println!("{}", line.dimmed()),
            GridRow::Entry(_) => println!("{line}"),
        }
    }
}

fn cmd_parse(args: ParseArgs) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    let json = if args.mom {
        serde_json::to_string_pretty(&parse_mom_params(&text)?)?
    } else {
        serde_json::to_string_pretty(&parse_namelist(&text)?)?
    };
    println!("{json}");
    Ok(())
}
