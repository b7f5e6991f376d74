//! wallplan CLI
//!
//! Usage:
//!   wallplan [OPTIONS] [SCENE]
//!
//! Loads a TOML scene, applies the requested edits through the full
//! resolution pipeline, and prints the resulting layout table. Rejected
//! edits are reported but do not abort the run.

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::Parser;

use wallplan::{Catalog, Planner, Point, Scene, UnitId};

#[derive(Parser)]
#[command(name = "wallplan")]
#[command(about = "Parametric layout engine for modular furniture along a wall")]
struct Cli {
    /// Scene file in TOML format (reads from stdin if not provided)
    scene: Option<PathBuf>,

    /// Catalog file with product dimension metadata (TOML format)
    #[arg(short, long)]
    catalog: Option<PathBuf>,

    /// Resize a unit: UNIT=WIDTH (repeatable, applied in order)
    #[arg(short, long = "resize", value_name = "UNIT=WIDTH")]
    resize: Vec<String>,

    /// Drag a unit through the snap resolver: UNIT=X,Y (repeatable)
    #[arg(short, long = "drag", value_name = "UNIT=X,Y")]
    drag: Vec<String>,

    /// Mark a unit as selected before applying edits (repeatable)
    #[arg(short, long = "select", value_name = "UNIT")]
    select: Vec<String>,

    /// Run a formula recalculation after the edits
    #[arg(long)]
    recalc: bool,

    /// Show the scene file format reference
    #[arg(short, long)]
    format: bool,

    /// Verbose logging (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    if cli.format {
        print_format();
        return;
    }

    if cli.scene.is_none() && io::stdin().is_terminal() {
        print_intro();
        return;
    }

    let source = match &cli.scene {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading scene '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => buffer,
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    let scene: Scene = match toml::from_str(&source) {
        Ok(scene) => scene,
        Err(e) => {
            eprintln!("Error parsing scene: {}", e);
            std::process::exit(1);
        }
    };

    let catalog = match &cli.catalog {
        Some(path) => match Catalog::from_file(path) {
            Ok(catalog) => catalog,
            Err(e) => {
                eprintln!("Error loading catalog '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => Catalog::default(),
    };

    let mut planner = Planner::new(scene).with_catalog(catalog);

    for id in &cli.select {
        planner.scene.select(id.as_str());
    }

    for spec in &cli.resize {
        let Some((unit, width)) = parse_resize(spec) else {
            eprintln!("Invalid --resize '{}', expected UNIT=WIDTH", spec);
            std::process::exit(2);
        };
        match planner.resize(&unit, width) {
            Ok(applied) => {
                if !applied.repositioned.is_empty() {
                    println!(
                        "resized {} to {:.0} (repositioned {})",
                        applied.unit,
                        applied.width,
                        applied
                            .repositioned
                            .iter()
                            .map(|id| id.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    );
                } else {
                    println!("resized {} to {:.0}", applied.unit, applied.width);
                }
            }
            Err(rejection) => println!("rejected: {}", rejection),
        }
    }

    for spec in &cli.drag {
        let Some((unit, x, y)) = parse_drag(spec) else {
            eprintln!("Invalid --drag '{}', expected UNIT=X,Y", spec);
            std::process::exit(2);
        };
        let result = planner.drag(&unit, x, y, &[]);
        if result.snapped {
            println!(
                "dragged {} to ({:.0}, {:.0}), snapped on {} point(s)",
                unit,
                result.position.x,
                result.position.y,
                result.points.len()
            );
        } else {
            println!(
                "dragged {} to ({:.0}, {:.0}), no snap",
                unit, result.position.x, result.position.y
            );
        }
        planner.place(&unit, Point::new(result.position.x, result.position.y));
    }

    if cli.recalc {
        if let Some(summary) = planner.recalculate_now() {
            println!(
                "recalculated: {} pass(es), {} applied, {} rejected, {} skipped",
                summary.passes, summary.applied, summary.rejected, summary.skipped
            );
        }
    }

    print_table(&planner.scene);
}

fn parse_resize(spec: &str) -> Option<(UnitId, f64)> {
    let (unit, width) = spec.split_once('=')?;
    Some((UnitId::new(unit.trim()), width.trim().parse().ok()?))
}

fn parse_drag(spec: &str) -> Option<(UnitId, f64, f64)> {
    let (unit, rest) = spec.split_once('=')?;
    let (x, y) = rest.split_once(',')?;
    Some((
        UnitId::new(unit.trim()),
        x.trim().parse().ok()?,
        y.trim().parse().ok()?,
    ))
}

fn print_table(scene: &Scene) {
    println!(
        "{:<12} {:<14} {:>9} {:>9} {:>8} {:>8} {:>9}",
        "id", "kind", "x", "y", "width", "height", "right"
    );
    for unit in &scene.units {
        println!(
            "{:<12} {:<14} {:>9.1} {:>9.1} {:>8.1} {:>8.1} {:>9.1}",
            unit.id.as_str(),
            unit.kind.as_str(),
            unit.position.x,
            unit.position.y,
            unit.width,
            unit.height,
            unit.right_edge()
        );
    }
}

fn print_intro() {
    println!(
        r#"wallplan - parametric layout engine for modular furniture

USAGE:
    wallplan [OPTIONS] [SCENE]
    cat scene.toml | wallplan --resize b1=700

OPTIONS:
    -r, --resize UNIT=WIDTH   Commit a width edit (repeatable)
    -d, --drag UNIT=X,Y       Drag through the snap resolver (repeatable)
    -s, --select UNIT         Select a unit (enables sync-group resizes)
    -c, --catalog FILE        Product catalog TOML
        --recalc              Run formula recalculation after the edits
    -f, --format              Show the scene file format reference
    -v, --verbose             Verbose logging

QUICK START:
    wallplan demos/kitchen.toml --resize base1=700 --recalc

Run --format for the scene file layout."#
    );
}

fn print_format() {
    println!(
        r#"SCENE FILE FORMAT
=================

A scene is a TOML document with one [[units]] table per placed unit:

    [[units]]
    id = "base1"
    kind = "base"            # base | tall | overhead | appliance | worktop
                             # filler | closure-panel | kicker | soffit
                             # under-panel
    width = 600.0
    height = 720.0
    depth = 560.0
    position = {{ x = 0.0, y = 150.0, z = 0.0 }}
    left_lock = false
    right_lock = false
    view = "main"            # optional row scope for repositioning
    product_id = "base-600"  # optional catalog reference

Attached filler/closure-panel children:

    [units.attachment]
    parent = "base1"
    side = "left"            # left | right
    extends_footprint = true

Accessories owned by a furniture unit:

    [units.accessory]
    owner = "base1"
    role = "kicker"          # kicker | worktop | under-panel | soffit
                             # soffit-return-left | soffit-return-right

Group memberships:

    [units.pair]
    group = "run1"
    weight = 50.0            # percent of a width delta this member absorbs

    sync_group = "bank"      # resizes together when 2+ members selected

Formulas (dimension id -> expression):

    [units.formulas]
    width = "cab(base1, width) + 50"
    shelf_pitch = "cab(base2, height) / 4"

Expressions support + - * /, min(a, b), max(a, b), cab(unit, field) for
geometry (x, y, z, width, height, depth, left, right, top, bottom,
visual_width, left_gap, right_gap) and dim(unit, dimension) for named
dimensions (persisted override, then computed value, then catalog default)."#
    );
}
