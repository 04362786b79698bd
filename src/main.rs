#[macro_use]
extern crate slog;

use anyhow::Context;
use clap::clap_app;
use colour_mitsuba_rs::*;
use slog::Drain;
use std::path::PathBuf;

fn new_drain(level: slog::Level) -> slog::Fuse<slog::LevelFilter<slog::Fuse<slog_async::Async>>> {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    drain.filter_level(level).fuse()
}

fn main() -> anyhow::Result<()> {
    let matches = clap_app!(colour_mitsuba_rs =>
        (version: "0.1")
        (author: "Eric F. <eric1221bday@gmail.com>")
        (about: "Exports spectral datasets as Mitsuba 2 scene includes")
        (@arg DATASETS: +required "Sets the directory holding the JSON datasets")
        (@arg output: -o --output +takes_value default_value("include") "Sets the directory for bsdf and emitter documents")
        (@arg colorchecker: -c --colorchecker +takes_value default_value("colorchecker_classic/include") "Sets the directory for colour checker documents")
        (@arg verbose: -v --verbose "Print debug information")
    )
    .get_matches();

    let level = if matches.is_present("verbose") {
        slog::Level::Debug
    } else {
        slog::Level::Info
    };
    let log = slog::Logger::root(new_drain(level), o!());

    // arguments are either required or defaulted
    let dataset_root = PathBuf::from(matches.value_of("DATASETS").unwrap_or_default());
    let directories = export::OutputDirectories {
        include: PathBuf::from(matches.value_of("output").unwrap_or_default()),
        colour_checker: PathBuf::from(matches.value_of("colorchecker").unwrap_or_default()),
    };

    let repository = dataset::JsonRepository::new(&dataset_root);
    let generator = colorimetry::OhnoLed::default();
    let photometer = colorimetry::PhotopicPhotometer;
    let minimizer = common::math::NelderMead::default();
    let kf_family = normalize::KfFamily::mitsuba().context("could not derive K_f")?;
    info!(log, "loading datasets"; "root" => %dataset_root.display(), "k_f" => kf_family.base());

    let ctx = export::ExportContext::new(
        &log,
        &repository,
        &generator,
        &photometer,
        &minimizer,
        kf_family,
    );
    let written = export::export_all(&ctx, &directories).context("export aborted")?;

    info!(log, "export finished"; "documents" => written.len());
    Ok(())
}
