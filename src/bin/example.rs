//! FD Solver Example - Hypar cable net and membrane

use anyhow::Context;
use fd_solver::math::Vec3;
use fd_solver::prelude::*;

/// Nodes per side of the grid
const SIZE: usize = 7;

/// Height of the hyperbolic paraboloid over the unit square
fn hypar(x: f64, y: f64) -> f64 {
    4.0 * (x - 0.5) * (y - 0.5)
}

/// Grid of nodes over the unit square with hypar boundary anchors
///
/// With `sliding_edge`, the inner nodes of the y = 0 boundary are free but
/// held on the straight boundary line.
fn hypar_grid(sliding_edge: bool) -> anyhow::Result<(Network, Vec<Vec<usize>>)> {
    let mut net = Network::new();
    let step = 1.0 / (SIZE - 1) as f64;
    let mut ids = vec![vec![0; SIZE]; SIZE];

    for (i, row) in ids.iter_mut().enumerate() {
        for (j, id) in row.iter_mut().enumerate() {
            let (x, y) = (i as f64 * step, j as f64 * step);
            let on_boundary = i == 0 || j == 0 || i == SIZE - 1 || j == SIZE - 1;
            let corner = (i == 0 || i == SIZE - 1) && (j == 0 || j == SIZE - 1);
            *id = if on_boundary && !(sliding_edge && j == 0 && !corner) {
                net.add_anchor([x, y, hypar(x, y)])
            } else {
                net.add_node([x, y, 0.0])
            };
        }
    }

    if sliding_edge {
        let line = Line::new(
            Vec3::new(0.0, 0.0, hypar(0.0, 0.0)),
            Vec3::new(1.0, 0.0, hypar(1.0, 0.0)),
        );
        for row in &ids[1..SIZE - 1] {
            net.constrain(row[0], Geometry::Line(line))?;
        }
    }
    Ok((net, ids))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("=== FD Solver Example: Hypar Cable Net ===\n");

    let (mut net, ids) = hypar_grid(false)?;
    for i in 0..SIZE {
        for j in 0..SIZE {
            if i + 1 < SIZE {
                net.add_edge(ids[i][j], ids[i + 1][j], Some(EdgeGoal::ForceDensity(1.0)))?;
            }
            if j + 1 < SIZE {
                net.add_edge(ids[i][j], ids[i][j + 1], Some(EdgeGoal::ForceDensity(1.0)))?;
            }
        }
    }
    let free: Vec<usize> = (0..net.node_count())
        .filter(|n| !net.anchors().contains(n))
        .collect();

    println!("Running linear force density solve...\n");
    let result = net.solve_linear().context("linear solve failed")?;
    let centre = ids[SIZE / 2][SIZE / 2];
    println!("  Nodes: {}, edges: {}", net.node_count(), net.edge_count());
    println!("  Centre node: {:?}", result.positions[centre]);
    println!("  Max free residual: {:.3e}", result.max_residual(&free));
    println!(
        "  Max edge force: {:.4}",
        result.forces.iter().cloned().fold(0.0, f64::max)
    );

    println!("\n=== Sliding Boundary ===\n");

    let (mut net, ids) = hypar_grid(true)?;
    for i in 0..SIZE {
        for j in 0..SIZE {
            if i + 1 < SIZE {
                net.add_edge(ids[i][j], ids[i + 1][j], Some(EdgeGoal::ForceDensity(1.0)))?;
            }
            if j + 1 < SIZE {
                net.add_edge(ids[i][j], ids[i][j + 1], Some(EdgeGoal::ForceDensity(2.0)))?;
            }
        }
    }
    let options = ConstrainedOptions::default()
        .with_damping(0.5)
        .with_max_iter(200);
    let result = net
        .solve_constrained(options, None)
        .context("constrained solve failed")?;
    let report = result.convergence.as_ref().context("missing convergence report")?;
    println!(
        "  Converged: {} after {} iterations (tangent residual {:.3e})",
        report.converged, report.iterations, report.residual
    );
    for row in &ids[1..SIZE - 1] {
        println!("  Sliding node {:>2}: {:?}", row[0], result.positions[row[0]]);
    }

    println!("\n=== Natural Force Density Membrane ===\n");

    let (mut net, ids) = hypar_grid(false)?;
    let mut faces = Vec::new();
    for i in 0..SIZE - 1 {
        for j in 0..SIZE - 1 {
            let quad = [ids[i][j], ids[i + 1][j], ids[i + 1][j + 1], ids[i][j + 1]];
            faces.push(net.add_face(&quad, StressGoal::isotropic(1.0))?);
        }
    }
    for &face in &faces {
        net.add_face_load(face, FaceLoad::Normal(0.05))?;
    }
    let options = NfdOptions::default()
        .with_max_iter(30)
        .with_tolerances(1e-4, 1e-5)
        .with_stress_mode(StressMode::PrincipalLocal);
    let result = net.solve_nfd(options).context("membrane solve failed")?;

    if let Some(report) = &result.convergence {
        println!(
            "  Converged: {} after {} iterations (stress residual {:.3e})",
            report.converged, report.iterations, report.residual
        );
    }
    if let Some(FaceStresses::Principal { values, .. }) = &result.stresses {
        let (lo, hi) = values
            .iter()
            .flatten()
            .fold((f64::MAX, f64::MIN), |(lo, hi), &s| (lo.min(s), hi.max(s)));
        println!("  Principal stress range: {lo:.4} .. {hi:.4}");
    }
    println!("  Centre node: {:?}", result.positions[ids[SIZE / 2][SIZE / 2]]);

    println!("\n=== JSON Result ===\n");
    println!("{}", result.to_json()?);

    Ok(())
}
