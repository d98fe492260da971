//! WGSL sources for the scene pipelines.
//!
//! All three share the same uniform block at group 0, binding 0 and the same
//! fog function. Instance layouts match [`crate::scene::Instance`] and
//! [`crate::scene::StarInstance`].

use bytemuck::{Pod, Zeroable};

/// Uniform block shared by every scene pipeline.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SceneUniforms {
    pub view_proj: [[f32; 4]; 4],
    /// xyz: camera position.
    pub camera_pos: [f32; 4],
    /// xyz: camera right vector, for billboards.
    pub camera_right: [f32; 4],
    /// xyz: camera up vector, for billboards.
    pub camera_up: [f32; 4],
    /// xyz: light position, w: intensity.
    pub light: [f32; 4],
    /// rgb: ambient light color.
    pub ambient: [f32; 4],
    /// rgb: fog color, w: exp2 density.
    pub fog: [f32; 4],
}

const COMMON: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
    camera_right: vec4<f32>,
    camera_up: vec4<f32>,
    light: vec4<f32>,
    ambient: vec4<f32>,
    fog: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

fn apply_fog(color: vec3<f32>, world_pos: vec3<f32>) -> vec3<f32> {
    let dist = length(uniforms.camera_pos.xyz - world_pos);
    let density = uniforms.fog.w;
    let factor = 1.0 - exp(-density * density * dist * dist);
    return mix(color, uniforms.fog.rgb, clamp(factor, 0.0, 1.0));
}

struct InstanceInput {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) color: vec4<f32>,
    @location(7) params: vec4<f32>,
};

fn instance_model(instance: InstanceInput) -> mat4x4<f32> {
    return mat4x4<f32>(instance.model_0, instance.model_1, instance.model_2, instance.model_3);
}
"#;

const SPHERE_BODY: &str = r#"
struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) color: vec4<f32>,
    @location(3) params: vec4<f32>,
};

@vertex
fn vs_main(@location(0) position: vec3<f32>, instance: InstanceInput) -> VertexOutput {
    let model = instance_model(instance);
    let world = model * vec4<f32>(position, 1.0);

    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * world;
    out.world_pos = world.xyz;
    out.normal = (model * vec4<f32>(position, 0.0)).xyz;
    out.color = instance.color;
    out.params = instance.params;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    var rgb = in.color.rgb;

    // params.x > 0.5: Phong lit, params.y: shininess
    if in.params.x > 0.5 {
        let n = normalize(in.normal);
        let l = normalize(uniforms.light.xyz - in.world_pos);
        let v = normalize(uniforms.camera_pos.xyz - in.world_pos);
        let r = reflect(-l, n);
        let intensity = uniforms.light.w;

        let diffuse = max(dot(n, l), 0.0) * intensity;
        let specular = pow(max(dot(r, v), 0.0), max(in.params.y, 1.0)) * 0.2 * intensity;
        rgb = rgb * (uniforms.ambient.rgb + vec3<f32>(diffuse)) + vec3<f32>(specular);
    }

    return vec4<f32>(apply_fog(rgb, in.world_pos), in.color.a);
}
"#;

const RING_BODY: &str = r#"
struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) color: vec4<f32>,
};

@vertex
fn vs_main(
    @location(0) direction: vec2<f32>,
    @location(1) edge: f32,
    instance: InstanceInput,
) -> VertexOutput {
    let radius = mix(instance.params.x, instance.params.y, edge);
    let world = instance_model(instance) * vec4<f32>(direction * radius, 0.0, 1.0);

    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * world;
    out.world_pos = world.xyz;
    out.color = instance.color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(apply_fog(in.color.rgb, in.world_pos), in.color.a);
}
"#;

const STAR_BODY: &str = r#"
struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) uv: vec2<f32>,
};

@vertex
fn vs_main(
    @builtin(vertex_index) vertex_index: u32,
    @location(0) star_pos: vec3<f32>,
    @location(1) size: f32,
) -> VertexOutput {
    var quad_vertices = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
    );
    let quad_pos = quad_vertices[vertex_index];

    let half_size = size * 0.5;
    let world_pos = star_pos
        + uniforms.camera_right.xyz * quad_pos.x * half_size
        + uniforms.camera_up.xyz * quad_pos.y * half_size;

    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * vec4<f32>(world_pos, 1.0);
    out.world_pos = world_pos;
    out.uv = quad_pos;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let dist = length(in.uv);
    if dist > 1.0 {
        discard;
    }
    let alpha = 1.0 - smoothstep(0.6, 1.0, dist);
    return vec4<f32>(apply_fog(vec3<f32>(1.0), in.world_pos), alpha);
}
"#;

pub fn sphere_shader() -> String {
    format!("{}{}", COMMON, SPHERE_BODY)
}

pub fn ring_shader() -> String {
    format!("{}{}", COMMON, RING_BODY)
}

pub fn star_shader() -> String {
    format!("{}{}", COMMON, STAR_BODY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use naga::front::wgsl;
    use naga::valid::{Capabilities, ValidationFlags, Validator};

    fn validate(name: &str, source: &str) {
        let module = match wgsl::parse_str(source) {
            Ok(module) => module,
            Err(err) => panic!("{} shader failed to parse:\n{}", name, err.emit_to_string(source)),
        };
        let mut validator = Validator::new(ValidationFlags::all(), Capabilities::all());
        if let Err(err) = validator.validate(&module) {
            panic!("{} shader failed validation: {}", name, err);
        }
    }

    #[test]
    fn test_sphere_shader_valid() {
        validate("sphere", &sphere_shader());
    }

    #[test]
    fn test_ring_shader_valid() {
        validate("ring", &ring_shader());
    }

    #[test]
    fn test_star_shader_valid() {
        validate("star", &star_shader());
    }

    #[test]
    fn test_uniform_size_matches_wgsl() {
        // mat4 + six vec4
        assert_eq!(std::mem::size_of::<SceneUniforms>(), 64 + 6 * 16);
    }
}
