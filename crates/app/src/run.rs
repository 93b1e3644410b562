use std::path::PathBuf;
use std::process;

use serde::Serialize;
use sweep_core::{with_profile, without_profile, ExportMesh, GeometryData};
use tracing_subscriber::filter::LevelFilter;

use crate::logging::level_from_flags;
use crate::plan::{default_plan, load_plan, SweepPlan};

pub(crate) struct RunArgs {
    pub plan_path: Option<PathBuf>,
    pub level: LevelFilter,
    pub pretty: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct SweepSummary {
    pub path_points: usize,
    pub profile_points: usize,
    pub vertices: usize,
    pub edges: usize,
    pub faces: usize,
    pub boundary_edges: usize,
    pub closed_manifold: bool,
    pub submeshes: Vec<usize>,
    pub bounds: Option<Bounds>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Bounds {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

pub(crate) fn parse_args(args: &[String]) -> Result<RunArgs, String> {
    let mut plan_path = None;
    let mut verbose = false;
    let mut quiet = false;
    let mut pretty = false;
    let mut iter = args.iter().skip(1);

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--plan" => {
                let value = iter
                    .next()
                    .ok_or_else(|| "--plan requires a path".to_string())?;
                plan_path = Some(PathBuf::from(value));
            }
            "--verbose" | "-v" => verbose = true,
            "--quiet" | "-q" => quiet = true,
            "--pretty" => pretty = true,
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            other => return Err(format!("unknown argument {other:?}")),
        }
    }

    Ok(RunArgs {
        plan_path,
        level: level_from_flags(verbose, quiet),
        pretty,
    })
}

fn print_help() {
    println!(
        "Sweeps a profile curve along a path and prints a JSON summary.\n  --plan <path>   JSON sweep plan (built-in tube when omitted)\n  --pretty        pretty-print the summary\n  --verbose | -v  debug logging\n  --quiet | -q    warnings only"
    );
}

pub(crate) fn run(args: &RunArgs) -> Result<(), String> {
    let plan = match &args.plan_path {
        Some(path) => {
            tracing::info!("loading plan {:?}", path);
            load_plan(path)?
        }
        None => default_plan(),
    };

    let summary = sweep_plan(&plan);
    if summary.vertices == 0 {
        tracing::warn!("sweep produced empty geometry");
    }
    let json = if args.pretty {
        serde_json::to_string_pretty(&summary)
    } else {
        serde_json::to_string(&summary)
    }
    .map_err(|err| err.to_string())?;
    println!("{json}");
    tracing::info!("sweep completed");
    Ok(())
}

pub(crate) fn sweep_plan(plan: &SweepPlan) -> SweepSummary {
    let path = plan.path.build();
    let profile = plan.profile.as_ref().map(|profile| profile.build());
    tracing::debug!(
        path_points = path.points(),
        profile_points = profile.as_ref().map_or(0, |p| p.points()),
        "curves built"
    );

    let geometry = match &profile {
        Some(profile) => with_profile(&path, profile, &plan.settings),
        None => without_profile(&path),
    };
    summarize(
        &geometry,
        path.points(),
        profile.as_ref().map_or(0, |p| p.points()),
    )
}

fn summarize(geometry: &GeometryData, path_points: usize, profile_points: usize) -> SweepSummary {
    let export = ExportMesh::from_geometry(geometry);
    SweepSummary {
        path_points,
        profile_points,
        vertices: geometry.vertices().len(),
        edges: geometry.edges().len(),
        faces: geometry.faces().len(),
        boundary_edges: geometry.boundary_edge_count(),
        closed_manifold: geometry.is_closed_manifold(),
        submeshes: export
            .submeshes
            .iter()
            .map(|indices| indices.len() / 3)
            .collect(),
        bounds: bounds(geometry.positions()),
    }
}

fn bounds(positions: &[[f32; 3]]) -> Option<Bounds> {
    let first = *positions.first()?;
    let mut min = first;
    let mut max = first;
    for position in positions {
        for axis in 0..3 {
            min[axis] = min[axis].min(position[axis]);
            max[axis] = max[axis].max(position[axis]);
        }
    }
    Some(Bounds { min, max })
}
