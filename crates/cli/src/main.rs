mod batch_file;
mod report;

use std::collections::HashSet;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use metadata_core::metadata::domain::face_object::FaceId;
use metadata_core::metadata::domain::metadata_object::MetadataObject;
use metadata_core::metadata::domain::metadata_object_builder::MetadataObjectBuilder;
use metadata_core::metadata::domain::object_type::ObjectType;
use metadata_core::tracking::face_tracker::{FaceTracker, DEFAULT_MAX_LOST};

use batch_file::BatchFile;
use report::{InspectionReport, ObjectReport};

/// Inspect recorded face and machine-readable code detections.
#[derive(Parser)]
#[command(name = "metadata-inspect")]
struct Cli {
    /// Detection batch file (JSON).
    input: PathBuf,

    /// Only report objects with this type tag (e.g. face, org.iso.QRCode).
    #[arg(long = "type")]
    object_type: Option<String>,

    /// Assign face ids with the tracker for face records that have none.
    #[arg(long)]
    track: bool,

    /// Frames a tracked face may go undetected before it counts as gone.
    #[arg(long, default_value_t = DEFAULT_MAX_LOST)]
    max_lost: usize,

    /// Print a JSON report instead of one line per object.
    #[arg(long)]
    json: bool,
}

struct InspectOptions {
    object_type: Option<ObjectType>,
    track: bool,
    max_lost: usize,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let batch = BatchFile::load(&cli.input)?;
    let options = InspectOptions {
        object_type: cli.object_type.as_deref().map(ObjectType::from),
        track: cli.track,
        max_lost: cli.max_lost,
    };
    let report = inspect(&batch, &options);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for object in &report.objects {
            println!("{}", object.to_line());
        }
    }
    log::info!("{}", report.summary());
    Ok(())
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.input.exists() {
        return Err(format!("Input file not found: {}", cli.input.display()).into());
    }
    if cli.object_type.as_deref() == Some("") {
        return Err("--type must not be empty".into());
    }
    if cli.max_lost > 0 && !cli.track {
        return Err("--max-lost only applies with --track".into());
    }
    Ok(())
}

/// Builds every frame of the batch; invalid records are counted and skipped.
///
/// Objects are reported in record order. With tracking on, tracker ids are
/// issued above every explicit id in the batch, and a face id may appear
/// only once per frame.
fn inspect(batch: &BatchFile, options: &InspectOptions) -> InspectionReport {
    let builder = MetadataObjectBuilder::new(batch.coordinate_space.into());
    let mut tracker = FaceTracker::new(options.max_lost);
    if options.track {
        if let Some(highest) = batch.frames.iter().flatten().filter_map(|r| r.face_id).max() {
            tracker.reserve_through(FaceId(highest));
        }
    }
    let mut report = InspectionReport {
        frames: batch.frames.len(),
        ..Default::default()
    };

    for (frame_index, records) in batch.frames.iter().enumerate() {
        let mut slots: Vec<Option<MetadataObject>> = Vec::with_capacity(records.len());
        let mut observations = Vec::new();
        let mut observed_slots = Vec::new();

        for spec in records {
            let record = spec.to_record();
            if options.track && spec.is_untracked_face() {
                match builder.build_observation(&record, spec.score()) {
                    Ok(observation) => {
                        observed_slots.push(slots.len());
                        observations.push(observation);
                        slots.push(None);
                    }
                    Err(e) => {
                        log::warn!(
                            "frame {frame_index}: skipping '{}' record: {e}",
                            spec.object_type
                        );
                        report.rejected += 1;
                    }
                }
                continue;
            }
            match builder.build(&record) {
                Ok(object) => slots.push(Some(object)),
                Err(e) => {
                    log::warn!("frame {frame_index}: skipping '{}' record: {e}", spec.object_type);
                    report.rejected += 1;
                }
            }
        }

        if options.track {
            match tracker.identify(&observations) {
                Ok(faces) => {
                    for (&slot, face) in observed_slots.iter().zip(faces) {
                        slots[slot] = face.map(MetadataObject::from);
                    }
                }
                Err(e) => {
                    log::warn!("frame {frame_index}: skipping tracked faces: {e}");
                    report.rejected += observations.len();
                }
            }
        }

        let mut frame_ids = HashSet::new();
        for object in slots.into_iter().flatten() {
            if let Some(face) = object.as_face() {
                if !frame_ids.insert(face.face_id()) {
                    log::warn!(
                        "frame {frame_index}: skipping face with duplicate id {}",
                        face.face_id()
                    );
                    report.rejected += 1;
                    continue;
                }
            }
            if options.object_type.as_ref().map_or(true, |t| object.object_type() == t) {
                report.objects.push(ObjectReport::new(frame_index, &object));
            }
        }
    }

    report.faces_issued = tracker.issued_count();
    report
}
