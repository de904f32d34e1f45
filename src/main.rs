extern crate env_logger;
#[macro_use]
extern crate log;
use std::{
    fs::File,
    io::{prelude::*, stdout, BufWriter},
    path::Path,
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde_json::json;

use platekey::{layout, occupancy, report, rotate, sheet, well};
use platekey::resolve::ExpandingResolver;

mod cli;

use cli::{Cli, Commands};

/// Creates a `BufWriter` for the given output option. This allows for an output file to be passed
/// or otherwise will default to using standard output.
fn get_writer(output: &Option<String>) -> Result<impl Write> {
    // get output as a BufWriter - equal to stdout if None
    let writer = BufWriter::new(match output {
        Some(ref x) => {
            let file = File::create(Path::new(x))
                .with_context(|| format!("Unable to create output file {x}"))?;
            Box::new(file) as Box<dyn Write + Send>
        }
        None => Box::new(stdout()) as Box<dyn Write + Send>,
    });
    Ok(writer)
}

/// Parses a command-line position, which may be a well name or a linear index.
fn parse_position(text: &str) -> Result<well::WellPosition> {
    let position = match text.parse::<usize>() {
        Ok(n) => well::locate(n)?,
        Err(_) => well::parse(text)?,
    };
    Ok(position)
}

fn try_main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .init();

    let cli = Cli::parse();

    info!("platekey v{}", cli::VERSION);

    match &cli.command {
        Commands::Locate { positions } => {
            let mut writer = get_writer(&None)?;
            for text in positions {
                let position = parse_position(text)?;
                writeln!(writer, "{}\t{}", position, position.index())?;
            }
            writer.flush()?;
        }
        Commands::Layout { offset, output } => {
            let rows = layout::barcode_layout(*offset)?;
            layout::write_tsv(get_writer(output)?, &rows)?;
            info!("Wrote barcode layout with p7 offset {offset}");
        }
        Commands::Indices { p5_start, output } => {
            let rows = layout::index_layout(*p5_start)?;
            layout::write_tsv(get_writer(output)?, &rows)?;
            info!("Wrote index layout starting at p5 index {p5_start}");
        }
        Commands::Rotate {
            layout: layout_path,
            name,
            rotated,
            output,
        } => {
            let mut batch = rotate::PlateBatch {
                name: name.clone(),
                rotated: *rotated,
                occupants: layout::read_occupants(layout_path)?,
            };
            batch.rotate();

            match batch.counterpart_name() {
                Some(pair) => info!("Rotated {name}; counterpart batch is {pair}"),
                None => warn!("Rotated {name}; the name has no rotated counterpart"),
            }
            layout::write_occupants(get_writer(output)?, &batch.occupants)?;
        }
        Commands::PairName { name } => match rotate::rotated_pair_name(name) {
            Some(pair) => println!("{pair}"),
            None => warn!("`{name}` is not a batch name; it has no rotated counterpart"),
        },
        Commands::Check { layout: layout_path } => {
            let occupants = layout::read_occupants(layout_path)?;
            let conflicts = occupancy::find_conflicts(&occupants);
            let tally = occupancy::tally(&occupants);

            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "conflicts": conflicts,
                    "tally": tally,
                }))?
            );

            info!(
                "{} occupied wells, {} holding samples",
                tally.occupied, tally.samples
            );
            if !conflicts.is_empty() {
                for conflict in conflicts.iter() {
                    error!(
                        "{} is claimed by {}",
                        conflict.position,
                        conflict.ids.join(", ")
                    );
                }
                bail!(indoc::formatdoc! {"
                    {} wells have more than one occupant
                    suggestion: move or remove the occupants listed above, then check the layout again",
                    conflicts.len()
                });
            }
        }
        Commands::Resolve {
            sheet: sheet_path,
            keys,
            output,
        } => {
            let sample_sheet = sheet::SampleSheet::from_path(sheet_path)
                .with_context(|| format!("Could not load sample sheet {sheet_path}"))?;
            let keys = report::read_keys(keys)?;

            let resolver = ExpandingResolver::new(&sample_sheet);
            let mut report = report::resolve_all(&resolver, &keys);
            report.metadata.sheet_path = sheet_path.clone();
            report.metadata.sheet_entries = sample_sheet.len();

            report.write_tsv(get_writer(output)?)?;

            if !report.ambiguous.is_empty() {
                warn!(
                    "{} keys could not be disambiguated and need manual review",
                    report.ambiguous.len()
                );
            }
            info!("Completed successfully.")
        }
    };
    Ok(())
}

fn main() {
    if let Err(err) = try_main() {
        error!("{}", err);

        // report any errors that are produced
        err.chain()
            .skip(1)
            .for_each(|cause| error!("  because: {}", cause));

        std::process::exit(1);
    }
}
