use std::sync::Arc;

use glam::{Vec3, Vec4};

use crate::errors::{PrismError, Result};
use crate::material::Material;
use crate::objects::manual_object::{COLOR_LOCATION, NORMAL_LOCATION, POSITION_LOCATION};
use crate::render::pipeline::{InputLayoutDesc, LayoutElement, RasterizerStateDesc};
use crate::render::{BufferDesc, BufferUsage, RenderDevice};
use crate::scene::renderable::Renderable;

/// Indexed triangle geometry with per-vertex positions and normals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometry {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl Geometry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Axis-aligned box centered at the origin, 4 vertices per face, with
    /// counter-clockwise front faces.
    #[must_use]
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        let half = Vec3::new(width, height, depth) * 0.5;
        let mut geometry = Self::new();

        for normal in [Vec3::X, Vec3::NEG_X, Vec3::Y, Vec3::NEG_Y, Vec3::Z, Vec3::NEG_Z] {
            // (u, v, normal) is right-handed so the winding faces outwards.
            let u = normal.any_orthonormal_vector();
            let v = normal.cross(u);
            let base = geometry.positions.len() as u32;

            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                geometry.positions.push((normal + u * su + v * sv) * half);
                geometry.normals.push(normal);
            }
            geometry
                .indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        geometry
    }

    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len().max(self.normals.len())
    }
}

/// Builds a [`Renderable`] from a [`Geometry`].
///
/// The vertex buffer interleaves position, normal and (optionally) color,
/// the inputs [`DiffuseMaterial`](crate::material::DiffuseMaterial) reads.
/// Back faces are culled; front faces wind counter-clockwise.
pub struct GeometryObject;

impl GeometryObject {
    pub fn build(
        device: &mut dyn RenderDevice,
        geometry: &Geometry,
        colors: Option<&[Vec4]>,
        material: Arc<dyn Material>,
    ) -> Result<Renderable> {
        let vertex_count = geometry.vertex_count();
        check_count("position", vertex_count, geometry.positions.len())?;
        check_count("normal", vertex_count, geometry.normals.len())?;
        if let Some(colors) = colors {
            check_count("color", vertex_count, colors.len())?;
        }

        let mut elements = vec![
            LayoutElement::new(POSITION_LOCATION, wgpu::VertexFormat::Float32x3),
            LayoutElement::new(NORMAL_LOCATION, wgpu::VertexFormat::Float32x3),
        ];
        if colors.is_some() {
            elements.push(LayoutElement::new(COLOR_LOCATION, wgpu::VertexFormat::Float32x4));
        }
        let input_layout = InputLayoutDesc { elements };

        let floats_per_vertex = input_layout.packed_stride() as usize / std::mem::size_of::<f32>();
        let mut vertices = Vec::with_capacity(vertex_count * floats_per_vertex);
        for i in 0..vertex_count {
            vertices.extend_from_slice(&geometry.positions[i].to_array());
            vertices.extend_from_slice(&geometry.normals[i].to_array());
            if let Some(colors) = colors {
                vertices.extend_from_slice(&colors[i].to_array());
            }
        }

        let vertex_buffer = device.create_buffer(
            &BufferDesc {
                name: "GeometryObject vertex buffer".into(),
                size: std::mem::size_of_val(vertices.as_slice()) as u64,
                usage: BufferUsage::Immutable,
                bind_flags: wgpu::BufferUsages::VERTEX,
            },
            Some(bytemuck::cast_slice(&vertices)),
        )?;
        let index_buffer = device.create_buffer(
            &BufferDesc {
                name: "GeometryObject index buffer".into(),
                size: std::mem::size_of_val(geometry.indices.as_slice()) as u64,
                usage: BufferUsage::Immutable,
                bind_flags: wgpu::BufferUsages::INDEX,
            },
            Some(bytemuck::cast_slice(&geometry.indices)),
        )?;

        let mut renderable = Renderable::new();
        renderable.set_material(material);
        renderable.set_input_layout(input_layout);
        renderable.set_rasterizer(RasterizerStateDesc {
            cull_mode: Some(wgpu::Face::Back),
            front_counter_clockwise: true,
            ..RasterizerStateDesc::default()
        });
        renderable.set_vertex_buffer(vertex_buffer);
        renderable.set_index_buffer(index_buffer, geometry.indices.len() as u32);
        Ok(renderable)
    }
}

fn check_count(attribute: &'static str, expected: usize, actual: usize) -> Result<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(PrismError::VertexCountMismatch {
            attribute,
            expected,
            actual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cuboid_faces_wind_outwards() {
        let cube = Geometry::cuboid(2.0, 4.0, 6.0);
        assert_eq!(cube.positions.len(), 24);
        assert_eq!(cube.indices.len(), 36);

        for tri in cube.indices.chunks_exact(3) {
            let [a, b, c] = [0, 1, 2].map(|k| cube.positions[tri[k] as usize]);
            let face_normal = (b - a).cross(c - a).normalize();
            let expected = cube.normals[tri[0] as usize];
            assert!(face_normal.abs_diff_eq(expected, 1e-5), "{face_normal} vs {expected}");
        }
    }

    #[test]
    fn cuboid_extents() {
        let cube = Geometry::cuboid(2.0, 4.0, 6.0);
        let max = cube.positions.iter().fold(Vec3::splat(f32::MIN), |m, p| m.max(*p));
        let min = cube.positions.iter().fold(Vec3::splat(f32::MAX), |m, p| m.min(*p));
        assert!(max.abs_diff_eq(Vec3::new(1.0, 2.0, 3.0), 1e-6));
        assert!(min.abs_diff_eq(Vec3::new(-1.0, -2.0, -3.0), 1e-6));
    }
}
