use std::collections::BTreeSet;
use std::error::Error;
use std::fs;
use std::path::Path;
use std::process::ExitCode;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use breadboard_core::{
    Composition, Grid, GridSpec, PlateId, PlateLayer, PlatePrototype, PlateSpec, RandomConfig,
    SerializedPlate, match_compositions,
};

use crate::cli::{CheckArgs, CompareArgs, EXIT_ERROR, GenerateArgs};

type CommandResult = Result<ExitCode, Box<dyn Error>>;

/// Either a full composition file or just its plate list.
#[derive(Deserialize)]
#[serde(untagged)]
enum PlateFile {
    Plates(Vec<SerializedPlate>),
    Composition(Composition),
}

impl PlateFile {
    fn into_plates(self) -> Vec<SerializedPlate> {
        match self {
            PlateFile::Plates(plates) => plates,
            PlateFile::Composition(c) => c.plates,
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, Box<dyn Error>> {
    let text = fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
    let value = serde_json::from_str(&text).map_err(|e| format!("{}: {e}", path.display()))?;
    Ok(value)
}

fn write_json<T: Serialize>(output: Option<&Path>, value: &T) -> Result<(), Box<dyn Error>> {
    let text = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            fs::write(path, text + "\n").map_err(|e| format!("{}: {e}", path.display()))?;
            info!(path = %path.display(), "wrote composition");
        }
        None => println!("{text}"),
    }
    Ok(())
}

pub fn generate(args: &GenerateArgs) -> CommandResult {
    let prototypes: Vec<PlatePrototype> = read_json(&args.prototypes)?;
    let mut config = match &args.config {
        Some(path) => read_json(path)?,
        None => RandomConfig::default(),
    };
    if let Some(v) = args.size_mid {
        config.size_mid = v;
    }
    if let Some(v) = args.size_deviation {
        config.size_deviation = v;
    }
    if let Some(v) = args.attempts {
        config.attempts_max = v;
    }

    let spec = GridSpec { cols: args.cols, rows: args.rows, ..GridSpec::default() };
    let mut layer = PlateLayer::new(Grid::from_spec(&spec)?);
    let mut rng = match args.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_os_rng(),
    };
    let placed = layer.set_random(&mut rng, &prototypes, &config)?;
    info!(placed, target = config.size_mid, "generated composition");

    let composition = Composition { grid: spec, plates: layer.get_serialized_plates() };
    write_json(args.output.as_deref(), &composition)?;
    Ok(ExitCode::SUCCESS)
}

fn describe(p: &SerializedPlate) -> String {
    format!(
        "#{} {} at ({}, {}) {}",
        p.id,
        p.kind,
        p.position.cell.x,
        p.position.cell.y,
        p.position.orientation.as_str()
    )
}

pub fn compare(args: &CompareArgs) -> CommandResult {
    let reference = read_json::<PlateFile>(&args.reference)?.into_plates();
    let solution = read_json::<PlateFile>(&args.solution)?.into_plates();
    let report = match_compositions(&reference, &solution)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("matched {} of {} plates", report.matched.len(), reference.len());
        for p in &report.missing {
            println!("missing: {}", describe(p));
        }
        for p in &report.extra {
            println!("extra:   {}", describe(p));
        }
    }
    Ok(if report.is_exact() { ExitCode::SUCCESS } else { ExitCode::from(EXIT_ERROR) })
}

#[derive(Debug, Default, Serialize)]
struct CheckReport {
    plates: usize,
    /// Plates that do not fit the grid or have unusable properties.
    unplaced: Vec<PlateId>,
    /// Ids used by more than one plate in the file.
    duplicate_ids: Vec<PlateId>,
    overlaps: Vec<(PlateId, PlateId)>,
}

impl CheckReport {
    fn is_clean(&self) -> bool {
        self.unplaced.is_empty() && self.duplicate_ids.is_empty() && self.overlaps.is_empty()
    }
}

pub fn check(args: &CheckArgs) -> CommandResult {
    let composition: Composition = read_json(&args.composition)?;
    let mut layer = PlateLayer::new(Grid::from_spec(&composition.grid)?);
    let mut report = CheckReport { plates: composition.plates.len(), ..CheckReport::default() };

    let mut seen = BTreeSet::new();
    for plate in &composition.plates {
        if !seen.insert(plate.id) {
            report.duplicate_ids.push(plate.id);
            continue;
        }
        if layer.add_plate(&PlateSpec::from(plate).quiet())?.is_none() {
            debug!(id = plate.id, kind = %plate.kind, "plate does not fit");
            report.unplaced.push(plate.id);
        }
    }
    report.overlaps = layer.intersections();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let by_id = |id: PlateId| composition.plates.iter().find(|p| p.id == id);
        for &id in &report.unplaced {
            if let Some(p) = by_id(id) {
                println!("does not fit: {}", describe(p));
            }
        }
        for id in &report.duplicate_ids {
            println!("duplicate id: #{id}");
        }
        for (a, b) in &report.overlaps {
            println!("overlap: #{a} and #{b}");
        }
        if report.is_clean() {
            println!("{} plates, no problems", report.plates);
        }
    }
    Ok(if report.is_clean() { ExitCode::SUCCESS } else { ExitCode::from(EXIT_ERROR) })
}
