//! Built-in programs for drawing [objects](super::Object) loaded from OBJ files.
//!
//! All of them expect the OBJ vertex layout (position, uv, normal at locations 0, 1, 2), the
//! [model](super::MODEL_UNIFORM) uniform and the [view-projection](crate::render::shader::VIEW_PROJECTION_UNIFORM)
//! uniform. Matrices are multiplied on the right of row vectors.

use crate::render::shader::Shader;

const OBJECT_VERTEX: &str = r#"
#version 330 core

layout (location = 0) in vec3 vertex;
layout (location = 1) in vec2 uv;
layout (location = 2) in vec3 normal;

uniform mat4 M;
uniform mat4 VP;

out vec3 Normal;
out vec2 UV;

void main()
{
    gl_Position = vec4(vertex.xyz, 1.0) * M * VP;

    Normal = normal * mat3(transpose(inverse(M)));
    UV = vec2(uv.x, 1.f - uv.y);
}
"#;

const NORMAL_FRAGMENT: &str = r#"
#version 330 core

in vec3 Normal;
in vec2 UV;

out vec4 FragColor;

void main()
{
    FragColor = vec4((Normal + vec3(1.f, 1.f, 1.f)) * .5f, 1.f);
}
"#;

const TEXTURED_FRAGMENT: &str = r#"
#version 330 core

uniform sampler2D tex2D;

in vec3 Normal;
in vec2 UV;

out vec4 FragColor;

void main()
{
    FragColor = texture(tex2D, UV);
}
"#;

const MATT_VERTEX: &str = r#"
#version 330 core

layout (location = 0) in vec3 vertex;
layout (location = 1) in vec2 uv;
layout (location = 2) in vec3 normal;

uniform mat4 M;
uniform mat4 VP;

out vec3 Normal;
out vec3 Position;

void main()
{
    vec4 world = vec4(vertex.xyz, 1.0) * M;
    gl_Position = world * VP;

    Position = world.xyz / world.w;
    Normal = normal * mat3(transpose(inverse(M)));
}
"#;

const MATT_FRAGMENT: &str = r#"
#version 330 core

uniform vec3 camPosition;

in vec3 Normal;
in vec3 Position;

out vec4 FragColor;

void main()
{
    float diffuse = .45 + dot(normalize(camPosition - Position), normalize(Normal)) / 3;
    FragColor = vec4(diffuse, diffuse, diffuse, 1.f);
}
"#;

/// Name of the eye position uniform used by [matt]
pub const CAMERA_POSITION_UNIFORM: &str = "camPosition";

/// Colours each fragment by its normal
pub fn normal() -> Shader { Shader::new(OBJECT_VERTEX, NORMAL_FRAGMENT) }

/// Samples the object's texture
pub fn textured() -> Shader { Shader::new(OBJECT_VERTEX, TEXTURED_FRAGMENT) }

/// Flat grey shading lit from the camera; needs [CAMERA_POSITION_UNIFORM] to be set
pub fn matt() -> Shader { Shader::new(MATT_VERTEX, MATT_FRAGMENT) }
