//! kaleido - Coxeter group and uniform polytope explorer
//!
//! Closes a reflection group from its Coxeter matrix, traces a uniform
//! polytope over it and reports the topology and mesh summary.
//!
//! Usage:
//!   kaleido group 3,5
//!   kaleido polytope 3,4 --selector snub --fill even-odd --json
//!   kaleido polytope 3,3,3 --origin 1,0,0,0 --config engine.json

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kaleido_core::{
    build_mesh, CoxeterGroup, CoxeterMatrix, EngineConfig, FillMode, Mesh, MeshInput,
    MeshOptions, Polychoron, Polyhedron, Result, SelectorKind, Topology,
};

#[derive(Parser, Debug)]
#[command(name = "kaleido")]
#[command(about = "Explore Coxeter groups and the uniform polytopes they generate")]
#[command(version)]
struct Args {
    /// Engine configuration file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Close a group and report its order and layers
    Group {
        /// Linear Coxeter diagram labels, e.g. "3,5" or "5/2,3"
        matrix: String,
    },

    /// Trace a polytope and build its mesh
    Polytope {
        /// Linear Coxeter diagram labels, e.g. "3,5" or "5/2,3"
        matrix: String,

        /// Selector: omnitruncate, snub or wireframe
        #[arg(short, long, default_value = "omnitruncate")]
        selector: String,

        /// Seed point, comma separated (3 or 4 coordinates)
        #[arg(short, long)]
        origin: Option<String>,

        /// Fill rule: non-zero, even-odd or global-even-odd
        #[arg(short, long)]
        fill: Option<String>,
    },
}

#[derive(Serialize)]
struct GroupOutput {
    matrix: String,
    rank: usize,
    order: usize,
    is_limit_over: bool,
    space_type: Option<String>,
    layer_sizes: Vec<usize>,
}

#[derive(Serialize)]
struct PolytopeOutput {
    matrix: String,
    selector: String,
    order: usize,
    vertexes: usize,
    edges: usize,
    faces: usize,
    cells: usize,
    components: usize,
    fill: String,
    triangles: usize,
    stencil_triangles: usize,
    stencil_batches: usize,
    points: usize,
    lines: usize,
    digest: String,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kaleido=info,kaleido_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => match EngineConfig::from_path(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
        None => EngineConfig::default(),
    };

    let result = match &args.command {
        Command::Group { matrix } => run_group(&config, matrix, args.json),
        Command::Polytope {
            matrix,
            selector,
            origin,
            fill,
        } => run_polytope(
            &config,
            matrix,
            selector,
            origin.as_deref(),
            fill.as_deref(),
            args.json,
        ),
    };

    if let Err(e) = result {
        if args.json {
            output_json(&e.to_response());
        } else {
            eprintln!("Error [{}]: {}", e.error_code(), e);
        }
        process::exit(1);
    }
}

fn run_group(config: &EngineConfig, text: &str, json: bool) -> Result<()> {
    let matrix: CoxeterMatrix = text.parse()?;
    let limits = config.closure.limits_for(matrix.rank());
    let space_type = matrix.space_type().map(|s| format!("{:?}", s).to_lowercase());
    let group = CoxeterGroup::with_limits(matrix, limits)?;

    let output = GroupOutput {
        matrix: text.to_string(),
        rank: group.rank(),
        order: group.order(),
        is_limit_over: group.is_limit_over(),
        space_type,
        layer_sizes: group.layer_sizes(),
    };

    if json {
        output_json(&output);
    } else {
        println!("Coxeter group [{}]", output.matrix);
        println!("  Rank:   {}", output.rank);
        if output.is_limit_over {
            println!("  Order:  {} (limit reached, group is infinite)", output.order);
        } else {
            println!("  Order:  {}", output.order);
        }
        if let Some(space) = &output.space_type {
            println!("  Space:  {}", space);
        }
        println!("  Layers: {:?}", output.layer_sizes);
    }
    Ok(())
}

fn run_polytope(
    config: &EngineConfig,
    text: &str,
    selector: &str,
    origin: Option<&str>,
    fill: Option<&str>,
    json: bool,
) -> Result<()> {
    let matrix: CoxeterMatrix = text.parse()?;
    let selector: SelectorKind = selector.parse()?;
    let origin = origin.map(parse_origin).transpose()?;

    let mut options = MeshOptions::from(&config.mesh);
    if let Some(fill) = fill {
        options.fill = fill.parse::<FillMode>()?;
    }

    let limits = config.closure.limits_for(matrix.rank());
    let (topology, input, order) = if matrix.rank() == 4 {
        let mut polychoron = Polychoron::from_matrix(matrix, limits, selector)?;
        if let Some(o) = origin {
            polychoron.set_origin(vector_of::<4>(&o)?);
        }
        let input = polychoron.mesh_input(config.mesh.projection_distance);
        let order = polychoron.symmetry().order();
        (polychoron.topology().clone(), input, order)
    } else {
        let mut polyhedron = Polyhedron::from_matrix(matrix, limits, selector)?;
        if let Some(o) = origin {
            polyhedron.set_origin(vector_of::<3>(&o)?);
        }
        let input = polyhedron.mesh_input();
        let order = polyhedron.symmetry().order();
        (polyhedron.topology().clone(), input, order)
    };

    tracing::info!(
        order,
        vertexes = topology.vertex_count(),
        faces = topology.faces().len(),
        fill = %options.fill,
        "Traced polytope"
    );

    let mesh = build_mesh(&input, &options);
    report(text, selector, options.fill, &topology, &input, &mesh, order, json);
    Ok(())
}

fn parse_origin(text: &str) -> Result<Vec<f64>> {
    text.split(',')
        .map(|s| {
            s.trim()
                .parse::<f64>()
                .map_err(|e| kaleido_core::KaleidoError::Config {
                    reason: format!("bad origin coordinate '{}': {}", s.trim(), e),
                })
        })
        .collect()
}

fn vector_of<const N: usize>(coords: &[f64]) -> Result<[f64; N]> {
    coords
        .try_into()
        .map_err(|_| kaleido_core::KaleidoError::Config {
            reason: format!("origin needs {} coordinates, got {}", N, coords.len()),
        })
}

#[allow(clippy::too_many_arguments)]
fn report(
    matrix: &str,
    selector: SelectorKind,
    fill: FillMode,
    topology: &Topology,
    input: &MeshInput,
    mesh: &Mesh,
    order: usize,
    json: bool,
) {
    let output = PolytopeOutput {
        matrix: matrix.to_string(),
        selector: selector.id().to_string(),
        order,
        vertexes: input.positions.len(),
        edges: topology.edges().len(),
        faces: topology.faces().len(),
        cells: topology.cells().len(),
        components: topology.component_count(),
        fill: fill.as_str().to_string(),
        triangles: mesh.triangle_count(),
        stencil_triangles: mesh.stencil_triangle_count(),
        stencil_batches: mesh.stencil_checkpoints.len(),
        points: mesh.point_count(),
        lines: mesh.line_count(),
        digest: mesh.digest(),
    };

    if json {
        output_json(&output);
        return;
    }

    println!("Polytope [{}] {}", output.matrix, output.selector);
    println!("  Group order: {}", output.order);
    println!("  Vertexes:    {}", output.vertexes);
    println!("  Edges:       {}", output.edges);
    println!("  Faces:       {}", output.faces);
    if output.cells > 0 {
        println!("  Cells:       {}", output.cells);
    }
    println!("  Components:  {}", output.components);
    println!();
    println!("Mesh ({})", output.fill);
    println!("  Triangles:   {}", output.triangles);
    if output.stencil_triangles > 0 {
        println!(
            "  Stencil:     {} in {} batches",
            output.stencil_triangles, output.stencil_batches
        );
    }
    println!("  Points:      {}", output.points);
    println!("  Lines:       {}", output.lines);
    println!("  Digest:      {}", output.digest);
}

fn output_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => {
            eprintln!("Error: failed to serialize output: {}", e);
            process::exit(1);
        }
    }
}
