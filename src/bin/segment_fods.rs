use fod_lobes::config::segment_fods;
use fod_lobes::diagnostics::{CollectionSummary, RunReport};
use fod_lobes::directions::DirectionSource;
use fod_lobes::io::{read_json_file, write_json_file};
use fod_lobes::pipeline::{CoefficientVolume, CollectingSink, Pipeline};
use fod_lobes::{AmplitudeSampler, Segmenter, SegmentError};
use std::env;
use std::path::Path;
use std::time::Instant;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), SegmentError> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = segment_fods::load_config(Path::new(&config_path))?;
    let mut report = RunReport::default();

    let t0 = Instant::now();
    let (kind, dirs) = DirectionSource::resolve_first(&config.directions).ok_or_else(|| {
        SegmentError::Directions("none of the configured direction sources is usable".to_string())
    })?;
    let rows: Vec<Vec<f32>> = read_json_file(&config.transform)?;
    let sampler = AmplitudeSampler::from_rows(&rows)?;
    let volume: CoefficientVolume = read_json_file(&config.input)?;
    report.push_stage("load", elapsed_ms(t0));
    report.direction_source = format!("{kind:?}");
    report.direction_count = dirs.len();
    report.lmax = sampler.lmax();

    let segmenter = Segmenter::new(&dirs, config.segmenter)?;
    let pipeline = Pipeline::new(&sampler, &segmenter, config.pipeline)?;
    let mut sink = CollectingSink::new();
    let t1 = Instant::now();
    report.pipeline = pipeline.run(volume.source(), &mut sink)?;
    report.push_stage("segment", elapsed_ms(t1));

    if !config.output.summary_only {
        report.voxels = sink
            .into_sorted()
            .iter()
            .map(CollectionSummary::from)
            .collect();
    }
    write_json_file(&config.output.report_json, &report)?;

    println!(
        "Segmented {} of {} voxels into {} lobes using {} directions ({:?})",
        report.pipeline.voxels_segmented,
        volume.voxel_count(),
        report.pipeline.lobes_emitted,
        report.direction_count,
        kind
    );
    println!("Report written to {}", config.output.report_json.display());
    Ok(())
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

fn usage() -> SegmentError {
    SegmentError::Stage {
        stage: "cli",
        message: "Usage: segment_fods <config.json>".to_string(),
    }
}
