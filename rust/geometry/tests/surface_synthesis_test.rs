// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use approx::assert_relative_eq;
use putt_lite_geometry::shape::{circle_contour, signed_area};
use putt_lite_geometry::{
    extrude_walls, union_contours, CsgSubtractor, Cutter, Mesh, Point2, Point3, SurfaceOutline,
    SurfaceParams, SurfaceSynthesizer, WallParams,
};

fn course_outline() -> SurfaceOutline {
    SurfaceOutline::Polygon(vec![
        Point2::new(-4.0, -8.0),
        Point2::new(-4.0, 8.0),
        Point2::new(4.0, 8.0),
        Point2::new(4.0, -8.0),
    ])
}

fn analyze_mesh(mesh: &Mesh, name: &str) {
    let (min, max) = mesh.bounds();
    println!("\n=== {} Mesh Analysis ===", name);
    println!("  Triangles: {}", mesh.triangle_count());
    println!("  Vertices: {}", mesh.vertex_count());
    println!(
        "  Bounds: min=({:.2}, {:.2}, {:.2}), max=({:.2}, {:.2}, {:.2})",
        min.x, min.y, min.z, max.x, max.y, max.z
    );
}

/// Top-face triangles whose centroid falls inside the circle
fn top_triangles_inside(mesh: &Mesh, center: Point2<f64>, radius: f64) -> usize {
    mesh.triangles()
        .filter(|[a, b, c]| a.y.abs() < 1e-4 && b.y.abs() < 1e-4 && c.y.abs() < 1e-4)
        .filter(|[a, b, c]| {
            let cx = (a.x + b.x + c.x) / 3.0;
            let cz = (a.z + b.z + c.z) / 3.0;
            (Point2::new(cx, cz) - center).norm() < radius * 0.9
        })
        .count()
}

#[test]
fn test_green_with_cup_and_sand() {
    let subtractor = CsgSubtractor::new();
    let synth = SurfaceSynthesizer::new(&subtractor, SurfaceParams::default());

    let cup = Cutter::Circle {
        center: Point2::new(2.0, -6.0),
        radius: 0.35,
    };
    let sand = Cutter::Circle {
        center: Point2::new(-1.0, -1.0),
        radius: 2.5,
    };

    let mesh = synth
        .synthesize_surface(&course_outline(), &cup, &[sand])
        .unwrap();
    analyze_mesh(&mesh, "Green");

    let (min, max) = mesh.bounds();
    assert_relative_eq!(min.x, -4.0, epsilon = 1e-4);
    assert_relative_eq!(max.x, 4.0, epsilon = 1e-4);
    assert_relative_eq!(min.z, -8.0, epsilon = 1e-4);
    assert_relative_eq!(max.z, 8.0, epsilon = 1e-4);

    // The top face is open over both cutouts
    assert_eq!(top_triangles_inside(&mesh, Point2::new(2.0, -6.0), 0.35), 0);
    assert_eq!(top_triangles_inside(&mesh, Point2::new(-1.0, -1.0), 2.5), 0);
    // but still covers solid ground
    assert!(top_triangles_inside(&mesh, Point2::new(0.0, 5.0), 2.0) > 0);
}

#[test]
fn test_surface_synthesis_is_idempotent() {
    let subtractor = CsgSubtractor::new();
    let synth = SurfaceSynthesizer::new(&subtractor, SurfaceParams::default());
    let cup = Cutter::Circle {
        center: Point2::new(0.0, 6.0),
        radius: 0.35,
    };
    let hazards = vec![
        Cutter::Rect {
            center: Point2::new(0.0, 0.0),
            width: 3.0,
            length: 1.0,
        },
        Cutter::Circle {
            center: Point2::new(-2.0, -5.0),
            radius: 1.0,
        },
    ];

    let first = synth
        .synthesize_surface(&course_outline(), &cup, &hazards)
        .unwrap();
    let second = synth
        .synthesize_surface(&course_outline(), &cup, &hazards)
        .unwrap();

    assert_eq!(first.vertex_count(), second.vertex_count());
    assert_eq!(first.triangle_count(), second.triangle_count());
    assert_eq!(first.bounds(), second.bounds());
}

#[test]
fn test_fused_compound_cutter() {
    let subtractor = CsgSubtractor::new();
    let synth = SurfaceSynthesizer::new(&subtractor, SurfaceParams::default());

    // Two overlapping circles fuse into one footprint before subtraction
    let footprints = union_contours(&[
        circle_contour(Point2::new(-1.0, 0.0), 1.0, 24),
        circle_contour(Point2::new(0.0, 0.0), 1.0, 24),
    ]);
    assert_eq!(footprints.len(), 1);

    let cutters: Vec<Cutter> = footprints.into_iter().map(Cutter::Profile).collect();
    let cup = Cutter::Circle {
        center: Point2::new(2.0, -6.0),
        radius: 0.35,
    };

    let mesh = synth
        .synthesize_surface(&course_outline(), &cup, &cutters)
        .unwrap();
    assert!(mesh.is_finite());
    assert_eq!(top_triangles_inside(&mesh, Point2::new(-0.5, 0.0), 1.0), 0);
}

/// Area of top-face triangles whose centroid lies within `radius` of `center`
fn top_area_within(mesh: &Mesh, center: Point2<f64>, radius: f64) -> f64 {
    mesh.triangles()
        .filter(|[a, b, c]| a.y.abs() < 1e-4 && b.y.abs() < 1e-4 && c.y.abs() < 1e-4)
        .filter(|[a, b, c]| {
            let cx = (a.x + b.x + c.x) / 3.0;
            let cz = (a.z + b.z + c.z) / 3.0;
            (Point2::new(cx, cz) - center).norm() < radius
        })
        .map(|[a, b, c]| (b - a).cross(&(c - a)).norm() / 2.0)
        .sum()
}

#[test]
fn test_ring_compound_keeps_enclosed_green() {
    let subtractor = CsgSubtractor::new();
    let synth = SurfaceSynthesizer::new(&subtractor, SurfaceParams::default());

    let center = Point2::new(0.0, 2.0);
    let ring: Vec<Vec<Point2<f64>>> = (0..8)
        .map(|i| {
            let a = i as f64 * std::f64::consts::FRAC_PI_4;
            circle_contour(Point2::new(center.x + 1.5 * a.cos(), center.y + 1.5 * a.sin()), 0.7, 24)
        })
        .collect();
    let footprints = union_contours(&ring);
    assert_eq!(footprints.len(), 1);
    assert_eq!(footprints[0].holes.len(), 1);
    let island = signed_area(&footprints[0].holes[0]).abs();

    let cutters: Vec<Cutter> = footprints.into_iter().map(Cutter::Profile).collect();
    let cup = Cutter::Circle {
        center: Point2::new(2.0, -6.0),
        radius: 0.35,
    };
    let mesh = synth
        .synthesize_surface(&course_outline(), &cup, &cutters)
        .unwrap();
    analyze_mesh(&mesh, "Ring compound");

    // Green inside the ring survives the cut
    let kept = top_area_within(&mesh, center, 1.2);
    assert!(island > 1.0);
    assert_relative_eq!(kept, island, max_relative = 0.05);
    // while the ring itself is open
    assert_eq!(top_triangles_inside(&mesh, Point2::new(center.x + 1.5, center.y), 0.7), 0);
}

#[test]
fn test_walls_follow_boundary() {
    let boundary = vec![
        Point2::new(0.0, 0.0),
        Point2::new(6.0, 0.0),
        Point2::new(6.0, 4.0),
        Point2::new(3.0, 7.0),
        Point2::new(0.0, 4.0),
    ];
    let walls = extrude_walls(&boundary, &WallParams::default());
    assert_eq!(walls.len(), boundary.len());

    for (i, wall) in walls.iter().enumerate() {
        let start = boundary[i];
        let end = boundary[(i + 1) % boundary.len()];
        let iso = wall.transform.isometry();

        let a = iso.transform_point(&Point3::new(-wall.half_extents.x, -wall.half_extents.y, 0.0));
        let b = iso.transform_point(&Point3::new(wall.half_extents.x, -wall.half_extents.y, 0.0));
        assert_relative_eq!(a, Point3::new(start.x, 0.0, start.y), epsilon = 1e-9);
        assert_relative_eq!(b, Point3::new(end.x, 0.0, end.y), epsilon = 1e-9);
    }
}
