//! Housing construction: a solid box with a rounded-rectangle screen cutout
//! carved through it.
//!
//! The subtraction is specialized to this shape rather than going through a
//! general CSG engine: the cutout prism is deeper than the housing, so the
//! result decomposes into a front ring, a 45-degree bevel ring around the
//! rim, the tunnel walls of the cutout, a back ring, and the four outer
//! shell faces. Ring bands are triangulated between the rounded outline and
//! its central projection onto the outer rectangle.

use crate::{
    layout::{GeometryLayout, MIN_GEOMETRY_SIZE, MonitorStyle},
    mesh::MeshData,
};

/// Arc samples per cutout corner.
const CORNER_SEGMENTS: u32 = 8;

/// A sampled point of the rounded-rectangle outline with its outward normal.
#[derive(Debug, Clone, Copy)]
struct OutlinePoint {
    pos: [f32; 2],
    normal: [f32; 2],
}

/// Builds the housing mesh for a computed layout.
pub fn housing_mesh(layout: &GeometryLayout, style: &MonitorStyle) -> MeshData {
    carve_housing(
        layout.housing_size.0,
        layout.housing_size.1,
        layout.housing_depth,
        layout.screen_world.0,
        layout.screen_world.1,
        style.cutout_radius,
        style.bevel_size,
    )
}

/// Carves a centered rounded-rectangle through-cutout of `cutout_w x
/// cutout_h` out of an `outer_w x outer_h x depth` box, with a bevel on the
/// front rim.
///
/// The cutout corner radius and bevel are clamped so the rounded rectangle
/// stays well-defined: radius at most half the smaller cutout dimension,
/// bevel constrained by the remaining frame and the housing depth. Degenerate
/// inputs are clamped, never rejected.
pub fn carve_housing(
    outer_w: f32,
    outer_h: f32,
    depth: f32,
    cutout_w: f32,
    cutout_h: f32,
    corner_radius: f32,
    bevel: f32,
) -> MeshData {
    let outer_hw = (outer_w * 0.5).max(MIN_GEOMETRY_SIZE);
    let outer_hh = (outer_h * 0.5).max(MIN_GEOMETRY_SIZE);
    let half_d = (depth * 0.5).max(MIN_GEOMETRY_SIZE);

    // cutout must stay strictly inside the outer box
    let cut_hw = (cutout_w * 0.5)
        .max(MIN_GEOMETRY_SIZE)
        .min(outer_hw - MIN_GEOMETRY_SIZE);
    let cut_hh = (cutout_h * 0.5)
        .max(MIN_GEOMETRY_SIZE)
        .min(outer_hh - MIN_GEOMETRY_SIZE);

    let radius = corner_radius.clamp(0.0, cut_hw.min(cut_hh));
    let bevel = bevel
        .clamp(0.0, half_d)
        .min(outer_hw - cut_hw - MIN_GEOMETRY_SIZE)
        .min(outer_hh - cut_hh - MIN_GEOMETRY_SIZE)
        .max(0.0);

    let nominal = rounded_rect_outline(cut_hw, cut_hh, radius, CORNER_SEGMENTS);
    let expanded = rounded_rect_outline(cut_hw + bevel, cut_hh + bevel, radius + bevel, CORNER_SEGMENTS);

    let mut mesh = MeshData::default();

    front_ring(&mut mesh, &expanded, outer_hw, outer_hh, half_d);
    bevel_ring(&mut mesh, &expanded, &nominal, half_d, bevel);
    tunnel_walls(&mut mesh, &nominal, half_d, bevel);
    back_ring(&mut mesh, &nominal, outer_hw, outer_hh, half_d);
    outer_shell(&mut mesh, outer_hw, outer_hh, half_d);

    mesh
}

/// Samples the rounded-rectangle outline counter-clockwise, corner arcs
/// first-to-last: bottom-right, top-right, top-left, bottom-left.
fn rounded_rect_outline(half_w: f32, half_h: f32, radius: f32, segments: u32) -> Vec<OutlinePoint> {
    let centers = [
        [half_w - radius, -(half_h - radius)],
        [half_w - radius, half_h - radius],
        [-(half_w - radius), half_h - radius],
        [-(half_w - radius), -(half_h - radius)],
    ];
    let start_angles = [-90.0f32, 0.0, 90.0, 180.0];

    let mut points = Vec::with_capacity(4 * (segments as usize + 1));
    for (center, start) in centers.iter().zip(start_angles) {
        for i in 0..=segments {
            let angle = (start + 90.0 * i as f32 / segments as f32).to_radians();
            let normal = [angle.cos(), angle.sin()];
            points.push(OutlinePoint {
                pos: [center[0] + radius * normal[0], center[1] + radius * normal[1]],
                normal,
            });
        }
    }
    points
}

/// Central projection of an outline point onto the outer rectangle boundary.
fn project_to_rect(p: [f32; 2], half_w: f32, half_h: f32) -> [f32; 2] {
    let sx = if p[0].abs() > 1e-6 { half_w / p[0].abs() } else { f32::INFINITY };
    let sy = if p[1].abs() > 1e-6 { half_h / p[1].abs() } else { f32::INFINITY };
    let s = sx.min(sy);
    if s.is_finite() { [p[0] * s, p[1] * s] } else { [half_w, 0.0] }
}

fn planar_uv(p: [f32; 2], half_w: f32, half_h: f32) -> [f32; 2] {
    [p[0] / (2.0 * half_w) + 0.5, p[1] / (2.0 * half_h) + 0.5]
}

/// Band of quads between two vertex loops of equal length.
fn band(mesh: &mut MeshData, inner_start: u32, outer_start: u32, len: u32) {
    for i in 0..len {
        let j = (i + 1) % len;
        mesh.push_quad(
            outer_start + i,
            outer_start + j,
            inner_start + j,
            inner_start + i,
        );
    }
}

fn front_ring(
    mesh: &mut MeshData,
    outline: &[OutlinePoint],
    outer_hw: f32,
    outer_hh: f32,
    half_d: f32,
) {
    let normal = [0.0, 0.0, 1.0];
    let len = outline.len() as u32;

    let inner_start = mesh.vertex_count() as u32;
    for p in outline {
        mesh.push_vertex(
            [p.pos[0], p.pos[1], half_d],
            normal,
            planar_uv(p.pos, outer_hw, outer_hh),
        );
    }
    let outer_start = mesh.vertex_count() as u32;
    for p in outline {
        let rect = project_to_rect(p.pos, outer_hw, outer_hh);
        mesh.push_vertex([rect[0], rect[1], half_d], normal, planar_uv(rect, outer_hw, outer_hh));
    }
    band(mesh, inner_start, outer_start, len);
}

fn bevel_ring(
    mesh: &mut MeshData,
    expanded: &[OutlinePoint],
    nominal: &[OutlinePoint],
    half_d: f32,
    bevel: f32,
) {
    if bevel <= 0.0 {
        return;
    }
    let len = expanded.len() as u32;
    let inv_sqrt2 = std::f32::consts::FRAC_1_SQRT_2;

    let deep_start = mesh.vertex_count() as u32;
    for (i, p) in nominal.iter().enumerate() {
        // 45-degree bevel: halfway between the inward wall and the front face
        let n = [-p.normal[0] * inv_sqrt2, -p.normal[1] * inv_sqrt2, inv_sqrt2];
        mesh.push_vertex(
            [p.pos[0], p.pos[1], half_d - bevel],
            n,
            [i as f32 / len as f32, 0.0],
        );
    }
    let rim_start = mesh.vertex_count() as u32;
    for (i, p) in expanded.iter().enumerate() {
        let n = [-p.normal[0] * inv_sqrt2, -p.normal[1] * inv_sqrt2, inv_sqrt2];
        mesh.push_vertex([p.pos[0], p.pos[1], half_d], n, [i as f32 / len as f32, 1.0]);
    }
    band(mesh, deep_start, rim_start, len);
}

fn tunnel_walls(mesh: &mut MeshData, outline: &[OutlinePoint], half_d: f32, bevel: f32) {
    let len = outline.len() as u32;

    let back_start = mesh.vertex_count() as u32;
    for (i, p) in outline.iter().enumerate() {
        mesh.push_vertex(
            [p.pos[0], p.pos[1], -half_d],
            [-p.normal[0], -p.normal[1], 0.0],
            [i as f32 / len as f32, 0.0],
        );
    }
    let front_start = mesh.vertex_count() as u32;
    for (i, p) in outline.iter().enumerate() {
        mesh.push_vertex(
            [p.pos[0], p.pos[1], half_d - bevel],
            [-p.normal[0], -p.normal[1], 0.0],
            [i as f32 / len as f32, 1.0],
        );
    }
    band(mesh, back_start, front_start, len);
}

fn back_ring(
    mesh: &mut MeshData,
    outline: &[OutlinePoint],
    outer_hw: f32,
    outer_hh: f32,
    half_d: f32,
) {
    let normal = [0.0, 0.0, -1.0];
    let len = outline.len() as u32;

    let inner_start = mesh.vertex_count() as u32;
    for p in outline {
        mesh.push_vertex(
            [p.pos[0], p.pos[1], -half_d],
            normal,
            planar_uv(p.pos, outer_hw, outer_hh),
        );
    }
    let outer_start = mesh.vertex_count() as u32;
    for p in outline {
        let rect = project_to_rect(p.pos, outer_hw, outer_hh);
        mesh.push_vertex(
            [rect[0], rect[1], -half_d],
            normal,
            planar_uv(rect, outer_hw, outer_hh),
        );
    }
    band(mesh, outer_start, inner_start, len);
}

fn outer_shell(mesh: &mut MeshData, hw: f32, hh: f32, hd: f32) {
    let faces: [([f32; 3], [[f32; 3]; 4]); 4] = [
        // +X
        ([1.0, 0.0, 0.0], [[hw, -hh, -hd], [hw, hh, -hd], [hw, hh, hd], [hw, -hh, hd]]),
        // -X
        ([-1.0, 0.0, 0.0], [[-hw, -hh, hd], [-hw, hh, hd], [-hw, hh, -hd], [-hw, -hh, -hd]]),
        // +Y
        ([0.0, 1.0, 0.0], [[-hw, hh, -hd], [hw, hh, -hd], [hw, hh, hd], [-hw, hh, hd]]),
        // -Y
        ([0.0, -1.0, 0.0], [[-hw, -hh, hd], [hw, -hh, hd], [hw, -hh, -hd], [-hw, -hh, -hd]]),
    ];
    let uv = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

    for (normal, corners) in faces {
        let start = mesh.vertex_count() as u32;
        for (corner, uv) in corners.iter().zip(uv) {
            mesh.push_vertex(*corner, normal, uv);
        }
        mesh.push_quad(start, start + 1, start + 2, start + 3);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn carve_default() -> MeshData {
        carve_housing(3.0, 2.0, 0.6, 2.4, 1.4, 0.05, 0.01)
    }

    #[test]
    fn housing_mesh_is_well_formed() {
        let mesh = carve_default();
        assert!(mesh.is_well_formed());
        assert!(mesh.triangle_count() > 0);
    }

    #[test]
    fn front_ring_vertices_sit_on_the_front_face() {
        let mesh = carve_default();
        // front ring is emitted first: 2 loops of 4 * (CORNER_SEGMENTS + 1)
        let loop_len = 4 * (CORNER_SEGMENTS as usize + 1);
        for p in &mesh.positions[..2 * loop_len] {
            assert!((p[2] - 0.3).abs() < 1e-6);
        }
    }

    #[test]
    fn no_vertex_escapes_the_outer_box() {
        let mesh = carve_default();
        for p in &mesh.positions {
            assert!(p[0].abs() <= 1.5 + 1e-4);
            assert!(p[1].abs() <= 1.0 + 1e-4);
            assert!(p[2].abs() <= 0.3 + 1e-4);
        }
    }

    #[test]
    fn cutout_interior_is_open() {
        // no triangle may span the cutout interior on the front face: every
        // front-face vertex lies on or outside the expanded outline
        let mesh = carve_default();
        for p in &mesh.positions {
            if (p[2] - 0.3).abs() < 1e-6 {
                let inside_x = p[0].abs() < 1.2 - 0.06;
                let inside_y = p[1].abs() < 0.7 - 0.06;
                assert!(
                    !(inside_x && inside_y),
                    "front-face vertex {p:?} inside the cutout"
                );
            }
        }
    }

    #[test]
    fn oversized_radius_and_bevel_are_clamped() {
        let mesh = carve_housing(1.0, 1.0, 0.6, 0.9, 0.9, 10.0, 10.0);
        assert!(mesh.is_well_formed());
    }

    #[test]
    fn degenerate_extents_do_not_panic() {
        for (w, h, cw, ch) in [
            (0.0, 0.0, 0.0, 0.0),
            (1e-3, 1e-3, 1e-3, 1e-3),
            (5.0, 0.001, 4.0, 0.0005),
        ] {
            let mesh = carve_housing(w, h, 0.6, cw, ch, 0.05, 0.01);
            assert!(mesh.is_well_formed(), "{w}x{h} cut {cw}x{ch}");
        }
    }

    #[test]
    fn outline_normals_are_unit_length() {
        for p in rounded_rect_outline(1.0, 0.5, 0.1, 8) {
            let len = (p.normal[0] * p.normal[0] + p.normal[1] * p.normal[1]).sqrt();
            assert!((len - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn projection_lands_on_the_rect_boundary() {
        for p in rounded_rect_outline(1.0, 0.5, 0.1, 8) {
            let q = project_to_rect(p.pos, 1.5, 1.0);
            let on_x = (q[0].abs() - 1.5).abs() < 1e-5;
            let on_y = (q[1].abs() - 1.0).abs() < 1e-5;
            assert!(on_x || on_y, "projected point {q:?} not on boundary");
        }
    }
}
