//! Wireframe helper showing the directional cone of a positional sound.
//!
//! The helper is a flat fan in the XZ plane. Three angular segments are written
//! back to back into one fixed-size buffer:
//!
//! 1. outer band on the left, `[-outer/2, -inner/2]`, material 0
//! 2. inner cone, `[-inner/2, +inner/2]`, material 1
//! 3. outer band on the right, `[+inner/2, +outer/2]`, material 0
//!
//! Every segment starts with one origin vertex. Each angular step then adds a
//! wedge `(edge a, edge b, origin)`, so the line strip traces the rim and
//! returns to the apex after every step.

use glam::Vec3;
use soundstage_core::{Color, ConeAngles, Error, Result};
use tracing::debug;

use crate::line::{LineGeometry, LineMaterial};

/// Material slot used by the outer (falloff) bands.
pub const MATERIAL_OUTER: usize = 0;
/// Material slot used by the inner cone.
pub const MATERIAL_INNER: usize = 1;

/// Number of vertices a helper with the given divisions allocates.
pub fn cone_vertex_count(divisions_inner: u32, divisions_outer: u32) -> usize {
    let divisions = divisions_inner as usize + divisions_outer as usize * 2;
    divisions * 3 + 3
}

/// Build the cone fan for `angles` without materials.
///
/// Fails with [`Error::InvalidParameter`] when `range` is negative or not finite.
pub fn build_cone(
    angles: ConeAngles,
    range: f32,
    divisions_inner: u32,
    divisions_outer: u32,
) -> Result<LineGeometry> {
    validate_range(range)?;
    let mut geometry =
        LineGeometry::with_vertex_count(cone_vertex_count(divisions_inner, divisions_outer));
    write_cone(
        &mut geometry,
        angles,
        range,
        divisions_inner,
        divisions_outer,
    );
    Ok(geometry)
}

/// Cone visualization owned by a sound control.
#[derive(Debug, Clone, PartialEq)]
pub struct ConeHelper {
    range: f32,
    divisions_inner: u32,
    divisions_outer: u32,
    angles: ConeAngles,
    geometry: LineGeometry,
    materials: [LineMaterial; 2],
}

impl ConeHelper {
    /// Build a helper for `angles`.
    pub fn new(
        angles: ConeAngles,
        range: f32,
        divisions_inner: u32,
        divisions_outer: u32,
        color_inner: Color,
        color_outer: Color,
    ) -> Result<Self> {
        validate_range(range)?;

        let mut helper = Self {
            range,
            divisions_inner,
            divisions_outer,
            angles,
            geometry: LineGeometry::with_vertex_count(cone_vertex_count(
                divisions_inner,
                divisions_outer,
            )),
            materials: [LineMaterial::new(color_outer), LineMaterial::new(color_inner)],
        };
        helper.update(angles);
        Ok(helper)
    }

    /// Rebuild the whole buffer for new cone angles. No-op once disposed.
    pub fn update(&mut self, angles: ConeAngles) {
        if self.is_disposed() {
            debug!("cone helper update after dispose ignored");
            return;
        }
        self.angles = angles;
        write_cone(
            &mut self.geometry,
            angles,
            self.range,
            self.divisions_inner,
            self.divisions_outer,
        );
        self.materials[MATERIAL_OUTER].visible = !angles.has_no_falloff();
        debug!(
            inner = angles.inner_deg,
            outer = angles.outer_deg,
            range = self.range,
            "cone helper rebuilt"
        );
    }

    /// Angles of the last build.
    pub fn angles(&self) -> ConeAngles {
        self.angles
    }

    /// Rim distance from the apex.
    pub fn range(&self) -> f32 {
        self.range
    }

    /// Line geometry.
    pub fn geometry(&self) -> &LineGeometry {
        &self.geometry
    }

    /// Materials, indexed by [`MATERIAL_OUTER`] and [`MATERIAL_INNER`].
    pub fn materials(&self) -> &[LineMaterial; 2] {
        &self.materials
    }

    /// Whether the outer bands are drawn.
    pub fn outer_visible(&self) -> bool {
        self.materials[MATERIAL_OUTER].visible
    }

    /// Release geometry and both materials.
    pub fn dispose(&mut self) {
        self.geometry.dispose();
        for material in &mut self.materials {
            material.dispose();
        }
    }

    /// Whether [`ConeHelper::dispose`] has been called.
    pub fn is_disposed(&self) -> bool {
        self.geometry.is_disposed()
    }
}

fn validate_range(range: f32) -> Result<()> {
    if !range.is_finite() || range < 0.0 {
        return Err(Error::invalid(format!(
            "cone helper range must be a finite non-negative number, got {range}"
        )));
    }
    Ok(())
}

fn write_cone(
    geometry: &mut LineGeometry,
    angles: ConeAngles,
    range: f32,
    divisions_inner: u32,
    divisions_outer: u32,
) {
    let half_inner = angles.half_inner_rad();
    let half_outer = angles.half_outer_rad();

    geometry.reset_positions();
    geometry.clear_groups();

    let mut writer = SegmentWriter {
        geometry,
        range,
        start: 0,
    };
    writer.segment(-half_outer, -half_inner, divisions_outer, MATERIAL_OUTER);
    writer.segment(-half_inner, half_inner, divisions_inner, MATERIAL_INNER);
    writer.segment(half_inner, half_outer, divisions_outer, MATERIAL_OUTER);
}

struct SegmentWriter<'a> {
    geometry: &'a mut LineGeometry,
    range: f32,
    start: usize,
}

impl SegmentWriter<'_> {
    fn segment(&mut self, from: f32, to: f32, divisions: u32, material_index: usize) {
        self.geometry.set_xyz(self.start, Vec3::ZERO);
        let mut count = 1;

        if divisions > 0 && to > from {
            let step = (to - from) / divisions as f32;
            for k in 0..divisions {
                let a = from + step * k as f32;
                // Clamp so the last edge lands exactly on `to`.
                let b = (a + step).min(to);
                let stride = self.start + count;
                self.geometry.set_xyz(stride, self.rim(a));
                self.geometry.set_xyz(stride + 1, self.rim(b));
                self.geometry.set_xyz(stride + 2, Vec3::ZERO);
                count += 3;
            }
        }

        self.geometry.add_group(self.start, count, material_index);
        self.start += count;
    }

    fn rim(&self, angle: f32) -> Vec3 {
        Vec3::new(angle.sin() * self.range, 0.0, angle.cos() * self.range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::DrawGroup;
    use approx::assert_relative_eq;

    fn helper(inner: f32, outer: f32) -> ConeHelper {
        ConeHelper::new(
            ConeAngles::clamped(inner, outer),
            5.0,
            10,
            10,
            Color::RED,
            Color::GREEN,
        )
        .unwrap()
    }

    #[test]
    fn buffer_has_fixed_length() {
        let helper = helper(10.0, 100.0);
        assert_eq!(helper.geometry().vertex_count(), 93);
        assert_eq!(helper.geometry().positions().len(), 3 * 93);
    }

    #[test]
    fn groups_cover_three_segments() {
        let helper = helper(10.0, 100.0);
        assert_eq!(
            helper.geometry().groups(),
            &[
                DrawGroup {
                    start: 0,
                    count: 31,
                    material_index: MATERIAL_OUTER
                },
                DrawGroup {
                    start: 31,
                    count: 31,
                    material_index: MATERIAL_INNER
                },
                DrawGroup {
                    start: 62,
                    count: 31,
                    material_index: MATERIAL_OUTER
                },
            ]
        );
    }

    #[test]
    fn segment_starts_at_origin_and_ends_on_rim() {
        let helper = helper(90.0, 180.0);
        let v = helper.geometry().vertices();

        // Outer-left segment: origin, then the first edge at -outer/2.
        assert_eq!(v[0].position, [0.0, 0.0, 0.0]);
        let half_outer = 90f32.to_radians();
        assert_relative_eq!(v[1].position[0], -half_outer.sin() * 5.0, epsilon = 1e-5);
        assert_relative_eq!(v[1].position[2], half_outer.cos() * 5.0, epsilon = 1e-5);
        assert_eq!(v[3].position, [0.0, 0.0, 0.0]);

        // Last wedge of the inner segment ends exactly at +inner/2.
        let last_inner_b = &v[31 + 29];
        let half_inner = 45f32.to_radians();
        assert_relative_eq!(last_inner_b.position[0], half_inner.sin() * 5.0, epsilon = 1e-5);
        assert_relative_eq!(last_inner_b.position[2], half_inner.cos() * 5.0, epsilon = 1e-5);
    }

    #[test]
    fn all_rim_vertices_sit_at_range() {
        let helper = helper(30.0, 270.0);
        for vertex in helper.geometry().vertices() {
            let p = Vec3::from_array(vertex.position);
            assert_eq!(p.y, 0.0);
            let len = p.length();
            assert!(len == 0.0 || (len - 5.0).abs() < 1e-4, "unexpected length {len}");
        }
    }

    #[test]
    fn equal_angles_hide_outer_material() {
        assert!(!helper(60.0, 60.0).outer_visible());
        assert!(helper(60.0, 61.0).outer_visible());
    }

    #[test]
    fn update_toggles_outer_visibility() {
        let mut helper = helper(60.0, 60.0);
        helper.update(ConeAngles::clamped(30.0, 90.0));
        assert!(helper.outer_visible());
        helper.update(ConeAngles::OMNI);
        assert!(!helper.outer_visible());
    }

    #[test]
    fn zero_angles_produce_all_origin_buffer() {
        let geometry = build_cone(ConeAngles::clamped(0.0, 0.0), 3.0, 4, 2).unwrap();
        assert_eq!(geometry.positions().len(), 3 * cone_vertex_count(4, 2));
        assert!(geometry.positions().iter().all(|c| *c == 0.0));
    }

    #[test]
    fn zero_divisions_leave_only_origin() {
        let geometry = build_cone(ConeAngles::clamped(20.0, 80.0), 3.0, 0, 1).unwrap();
        assert_eq!(geometry.vertex_count(), 9);
        let counts: Vec<usize> = geometry.groups().iter().map(|g| g.count).collect();
        assert_eq!(counts, vec![4, 1, 4]);
    }

    #[test]
    fn inverted_angles_skip_outer_bands() {
        let geometry = build_cone(ConeAngles::clamped(120.0, 30.0), 1.0, 2, 2).unwrap();
        let counts: Vec<usize> = geometry.groups().iter().map(|g| g.count).collect();
        assert_eq!(counts, vec![1, 7, 1]);
    }

    #[test]
    fn negative_range_is_rejected() {
        let err = build_cone(ConeAngles::OMNI, -1.0, 10, 10).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
        assert!(ConeHelper::new(ConeAngles::OMNI, f32::NAN, 1, 1, Color::RED, Color::GREEN).is_err());
    }

    #[test]
    fn dispose_releases_everything() {
        let mut helper = helper(10.0, 100.0);
        helper.dispose();
        assert!(helper.is_disposed());
        assert!(helper.materials().iter().all(LineMaterial::is_disposed));
    }

    #[test]
    fn update_after_dispose_leaves_geometry_untouched() {
        let mut helper = helper(10.0, 100.0);
        helper.dispose();

        helper.update(ConeAngles::clamped(40.0, 40.0));

        assert!(helper.geometry().groups().is_empty());
        assert_eq!(helper.geometry().vertex_count(), 0);
        assert_eq!(helper.angles(), ConeAngles::clamped(10.0, 100.0));
    }
}
