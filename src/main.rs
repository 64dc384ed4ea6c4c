mod args;
mod split;

use clap::Parser;
use log::{debug, info};
use snafu::ErrorCompat;
use std::error::Error;

use crate::args::Args;

fn main() {
    let args = Args::parse();

    if args.verbose {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::init();
    }
    debug!("args: {:?}", args);

    if args.list_columns {
        match split::list_columns(&args) {
            Ok(lines) => {
                for l in lines {
                    println!("{}", l);
                }
                return;
            }
            Err(e) => exit_with_error(&e),
        }
    }

    match split::run_survey_split(&args) {
        Ok(report) => {
            let failed = report.failures().count();
            let total = report.documents.len();
            for f in report.failures() {
                if let Err(e) = &f.result {
                    eprintln!("Respondent {}: {}", f.respondent + 1, e);
                }
            }
            if failed > 0 {
                eprintln!(
                    "Structured table saved, but {} of {} documents could not be written",
                    failed, total
                );
                std::process::exit(1);
            }
            info!("Done");
            println!(
                "Saved the structured table ({} rows) and {} documents",
                report.structured_rows, total
            );
        }
        Err(e) => exit_with_error(&e),
    }
}

fn exit_with_error(e: &split::QualsplitError) -> ! {
    eprintln!("An error occured: {}", e);
    let mut last = e.to_string();
    let mut source = e.source();
    while let Some(s) = source {
        let msg = s.to_string();
        if msg != last {
            eprintln!("  caused by: {}", msg);
        }
        last = msg;
        source = s.source();
    }
    if let Some(bt) = ErrorCompat::backtrace(e) {
        eprintln!("trace: {}", bt);
    }
    std::process::exit(1)
}
