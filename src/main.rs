use clap::{Arg, ArgAction, Command as ClapCommand};
use log::error;
use std::process;

use zonalstack::commands::{CommandFactory, ZonalCommandFactory};
use zonalstack::utils::logger::Logger;

fn main() {
    let matches = ClapCommand::new("ZonalStack")
        .version("0.1")
        .about("Per-polygon band means over temporal GeoTIFF stacks")
        .arg(
            Arg::new("input")
                .help("Directory holding the raster stack")
                .required(false)
                .index(1),
        )
        .arg(
            Arg::new("polygons")
                .short('p')
                .long("polygons")
                .help("GeoJSON file with the zones to aggregate over")
                .value_name("FILE")
                .required(false),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Output table file (default: data_mean_by_polygon_S1.csv in the raster directory)")
                .value_name("FILE")
                .required(false),
        )
        .arg(
            Arg::new("extension")
                .long("extension")
                .help("Raster file extension to match, without the dot")
                .value_name("EXT")
                .required(false),
        )
        .arg(
            Arg::new("nodata")
                .long("nodata")
                .help("Nodata sentinel, overriding raster metadata (default 0)")
                .value_name("VALUE")
                .required(false),
        )
        .arg(
            Arg::new("bands")
                .short('b')
                .long("bands")
                .help("1-based band selection, e.g. '1,2' (default: all bands)")
                .value_name("LIST")
                .required(false),
        )
        .arg(
            Arg::new("label-field")
                .long("label-field")
                .help("Feature property used as the zone label")
                .value_name("NAME")
                .required(false),
        )
        .arg(
            Arg::new("date-pattern")
                .long("date-pattern")
                .help("Pattern capturing an 8-digit YYYYMMDD token in the file basename")
                .value_name("REGEX")
                .required(false),
        )
        .arg(
            Arg::new("date-from-metadata")
                .long("date-from-metadata")
                .help("Derive acquisition dates from the TIFF DateTime tag")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("jobs")
                .short('j')
                .long("jobs")
                .help("Worker pool size (default: one per CPU)")
                .value_name("N")
                .required(false),
        )
        .arg(
            Arg::new("scan")
                .long("scan")
                .help("List the catalog and derived dates without extracting")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("TOML config file; command-line flags take precedence")
                .value_name("FILE")
                .required(false),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose output")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    if let Err(e) = Logger::init_global_logger("zonalstack.log", matches.get_flag("verbose")) {
        eprintln!("Error setting up logger: {}", e);
        process::exit(1);
    }

    let factory = ZonalCommandFactory::new();
    match factory.create_command(&matches) {
        Ok(command) => {
            if let Err(e) = command.execute() {
                error!("Command execution error: {}", e);
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        }
        Err(e) => {
            error!("Failed to create command: {}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
