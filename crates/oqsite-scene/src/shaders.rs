//! GLSL programs for the hero scene and their uniform wiring.
//!
//! Sources are complete WebGL1 programs: they declare their own attributes
//! and matrices so the browser runtime can compile them without a scene-graph
//! library injecting a prelude.

use serde::Serialize;

/// Uniform value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UniformKind {
    Float,
    Mat4,
    Sampler2d,
}

/// A uniform the runtime must bind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Uniform {
    pub name: &'static str,
    pub kind: UniformKind,
}

/// How fragments combine with the framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Blending {
    Additive,
    Normal,
}

/// A shader program with its render state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShaderProgram {
    pub vertex: &'static str,
    pub fragment: &'static str,
    pub attributes: Vec<&'static str>,
    pub uniforms: Vec<Uniform>,
    pub blending: Blending,
    pub depth_test: bool,
    pub depth_write: bool,
    pub transparent: bool,
    pub double_sided: bool,
}

const fn uniform(name: &'static str, kind: UniformKind) -> Uniform {
    Uniform { name, kind }
}

/// Point-sprite program for the starfield.
pub fn star_program() -> ShaderProgram {
    ShaderProgram {
        vertex: STAR_VERTEX,
        fragment: STAR_FRAGMENT,
        attributes: vec!["position", "color"],
        uniforms: vec![
            uniform("modelViewMatrix", UniformKind::Mat4),
            uniform("projectionMatrix", UniformKind::Mat4),
            uniform("pointTexture", UniformKind::Sampler2d),
        ],
        blending: Blending::Additive,
        depth_test: true,
        depth_write: false,
        transparent: true,
        double_sided: false,
    }
}

/// Plasma program for the ribbon.
pub fn ribbon_program() -> ShaderProgram {
    ShaderProgram {
        vertex: RIBBON_VERTEX,
        fragment: RIBBON_FRAGMENT,
        attributes: vec!["position", "normal"],
        uniforms: vec![
            uniform("modelViewMatrix", UniformKind::Mat4),
            uniform("projectionMatrix", UniformKind::Mat4),
            uniform("uTime", UniformKind::Float),
        ],
        blending: Blending::Normal,
        depth_test: true,
        depth_write: true,
        transparent: true,
        double_sided: true,
    }
}

pub const STAR_VERTEX: &str = r#"precision highp float;
attribute vec3 position;
attribute vec3 color;
uniform mat4 modelViewMatrix;
uniform mat4 projectionMatrix;
varying vec3 vColor;

void main() {
  vColor = color;
  vec4 mvPosition = modelViewMatrix * vec4(position, 1.0);
  gl_PointSize = 1.5 * (300.0 / -mvPosition.z);
  gl_Position = projectionMatrix * mvPosition;
}
"#;

pub const STAR_FRAGMENT: &str = r#"precision mediump float;
uniform sampler2D pointTexture;
varying vec3 vColor;

void main() {
  vec4 texColor = texture2D(pointTexture, gl_PointCoord);
  gl_FragColor = vec4(vColor * texColor.rgb, texColor.a);
}
"#;

pub const RIBBON_VERTEX: &str = r#"precision highp float;
attribute vec3 position;
attribute vec3 normal;
uniform mat4 modelViewMatrix;
uniform mat4 projectionMatrix;
varying vec3 vPosition;
varying vec3 vNormal;

void main() {
  vPosition = position;
  vNormal = normal;
  gl_Position = projectionMatrix * modelViewMatrix * vec4(position, 1.0);
}
"#;

pub const RIBBON_FRAGMENT: &str = r#"precision highp float;
uniform float uTime;
varying vec3 vPosition;
varying vec3 vNormal;

vec3 palette(float t) {
  vec3 a = vec3(0.2, 0.5, 0.8);
  vec3 b = vec3(0.5, 0.3, 0.6);
  vec3 c = vec3(1.0, 1.0, 1.0);
  vec3 d = vec3(0.0, 0.33, 0.67);
  return a + b * cos(6.28318 * (c * t + d));
}

void main() {
  float time = uTime * 0.5;
  float plasma1 = sin(vPosition.x * 3.0 + time);
  float plasma2 = sin(vPosition.y * 3.0 + time * 1.3);
  float plasma3 = sin((vPosition.x + vPosition.y) * 2.0 + time * 0.7);
  float plasma = (plasma1 + plasma2 + plasma3) / 3.0;
  vec3 color = palette(plasma * 0.5 + 0.5);
  float fresnel = pow(1.0 - abs(dot(vNormal, vec3(0.0, 0.0, 1.0))), 2.0);
  color += fresnel * vec3(0.3, 0.5, 0.8);
  float pulse = sin(time * 2.0) * 0.1 + 0.75;
  color *= pulse;
  gl_FragColor = vec4(color, 0.9);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_uniforms_appear_in_sources() {
        for program in [star_program(), ribbon_program()] {
            let source = format!("{}{}", program.vertex, program.fragment);
            for uniform in &program.uniforms {
                assert!(
                    source.contains(&format!("uniform {} {}", glsl_type(uniform.kind), uniform.name)),
                    "missing uniform {}",
                    uniform.name
                );
            }
            for attribute in &program.attributes {
                assert!(program.vertex.contains(&format!("attribute vec3 {attribute};")));
            }
        }
    }

    fn glsl_type(kind: UniformKind) -> &'static str {
        match kind {
            UniformKind::Float => "float",
            UniformKind::Mat4 => "mat4",
            UniformKind::Sampler2d => "sampler2D",
        }
    }

    #[test]
    fn stars_blend_additively_without_depth_writes() {
        let stars = star_program();

        assert_eq!(stars.blending, Blending::Additive);
        assert!(!stars.depth_write);
        assert!(ribbon_program().double_sided);
    }
}
