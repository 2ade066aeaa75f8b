//! Asset pipeline for the generated stylesheet and scene runtime.

use std::fs;
use std::path::Path;

use walkdir::WalkDir;

/// Asset pipeline utilities.
pub struct AssetPipeline;

impl AssetPipeline {
    /// Generate the site stylesheet.
    pub fn generate_css() -> String {
        SITE_CSS.to_string()
    }

    /// Generate the browser runtime that draws `hero-scene.json`.
    pub fn generate_scene_js() -> String {
        HERO_SCENE_JS.to_string()
    }

    /// Minify CSS using lightningcss.
    pub fn minify_css(css: &str) -> Result<String, String> {
        use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

        let stylesheet = StyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| format!("CSS parse error: {}", e))?;

        let minified = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..Default::default()
            })
            .map_err(|e| format!("CSS minify error: {}", e))?;

        Ok(minified.code)
    }

    /// Copy a file or directory tree byte-for-byte. Returns the number of files copied.
    pub fn copy_tree(from: &Path, to: &Path) -> std::io::Result<usize> {
        if from.is_file() {
            if let Some(parent) = to.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(from, to)?;
            return Ok(1);
        }

        let mut copied = 0;
        for entry in WalkDir::new(from).follow_links(true) {
            let entry = entry.map_err(std::io::Error::other)?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry.path().strip_prefix(from).unwrap_or(entry.path());
            let target = to.join(relative);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }

        Ok(copied)
    }
}

const SITE_CSS: &str = r#"/* OpenQuality site theme */

:root {
  --bg: #05060f;
  --bg-alt: #0b0e1f;
  --fg: #e6e9f5;
  --muted: #9aa3c7;
  --accent: #7c5cff;
  --accent-2: #2ec5ff;
  --border: rgba(255, 255, 255, 0.08);
  --radius: 14px;
  --container: 1120px;
  --font: "Inter", system-ui, -apple-system, "Segoe UI", sans-serif;
  --mono: "JetBrains Mono", ui-monospace, SFMono-Regular, monospace;
}

*,
*::before,
*::after {
  box-sizing: border-box;
}

html {
  scroll-behavior: smooth;
}

body {
  margin: 0;
  background: var(--bg);
  color: var(--fg);
  font-family: var(--font);
  line-height: 1.6;
}

a {
  color: var(--accent-2);
  text-decoration: none;
}

a:hover {
  text-decoration: underline;
}

.container {
  max-width: var(--container);
  margin: 0 auto;
  padding: 0 1.5rem;
}

/* Navigation */
.nav {
  position: sticky;
  top: 0;
  z-index: 10;
  background: rgba(5, 6, 15, 0.8);
  backdrop-filter: blur(12px);
  border-bottom: 1px solid var(--border);
}

.nav-content {
  display: flex;
  align-items: center;
  justify-content: space-between;
  height: 64px;
}

.logo {
  display: flex;
  align-items: center;
  gap: 0.6rem;
  color: var(--fg);
  font-weight: 700;
}

.logo img {
  width: 28px;
  height: 28px;
}

.nav-links {
  display: flex;
  gap: 1.5rem;
}

.nav-links a {
  color: var(--muted);
}

.nav-links a.active,
.nav-links a:hover {
  color: var(--fg);
  text-decoration: none;
}

/* Hero */
.hero {
  position: relative;
  min-height: 80vh;
  display: flex;
  align-items: center;
  overflow: hidden;
}

.hero-3d {
  position: absolute;
  inset: 0;
  z-index: 0;
}

.hero-3d canvas {
  display: block;
  width: 100%;
  height: 100%;
}

.hero-content {
  position: relative;
  z-index: 1;
  max-width: 720px;
}

.hero-content h1 {
  font-size: clamp(2.5rem, 6vw, 4.25rem);
  line-height: 1.1;
  margin: 0 0 1rem;
}

.hero-subtitle {
  font-size: 1.25rem;
  color: var(--muted);
}

.hero-buttons,
.cta-buttons {
  display: flex;
  flex-wrap: wrap;
  gap: 1rem;
  margin-top: 2rem;
}

.btn {
  display: inline-block;
  padding: 0.75rem 1.5rem;
  border-radius: 999px;
  font-weight: 600;
  transition: transform 0.2s ease, box-shadow 0.2s ease;
}

.btn:hover {
  transform: translateY(-2px);
  text-decoration: none;
}

.btn-primary {
  background: linear-gradient(135deg, var(--accent), var(--accent-2));
  color: #fff;
  box-shadow: 0 10px 30px rgba(124, 92, 255, 0.35);
}

.btn-secondary {
  border: 1px solid var(--border);
  color: var(--fg);
}

/* Sections */
.section {
  padding: 5rem 0;
}

.section-dark {
  background: var(--bg-alt);
}

.section-title {
  text-align: center;
  font-size: 2.25rem;
  margin: 0 0 3rem;
}

.text-large {
  font-size: 1.15rem;
  color: var(--muted);
}

.grid-2,
.grid-3 {
  display: grid;
  gap: 1.5rem;
}

.grid-2 {
  grid-template-columns: repeat(auto-fit, minmax(320px, 1fr));
}

.grid-3 {
  grid-template-columns: repeat(auto-fit, minmax(280px, 1fr));
}

.feature-list {
  padding-left: 1.2rem;
}

.feature-list li {
  margin-bottom: 0.5rem;
}

.feature-card,
.use-case-card,
.audience-card,
.docs-card,
.article-card {
  padding: 1.75rem;
  border: 1px solid var(--border);
  border-radius: var(--radius);
  background: rgba(255, 255, 255, 0.02);
  animation: rise 0.6s ease both;
  animation-delay: calc(var(--delay, 0) * 80ms);
}

.feature-icon {
  font-size: 2rem;
}

.benefit {
  margin-top: 1rem;
  color: var(--accent-2);
  font-weight: 600;
}

.tech-stack {
  display: flex;
  flex-wrap: wrap;
  justify-content: center;
  gap: 1rem;
}

.tech-item {
  padding: 0.75rem 1.25rem;
  border: 1px solid var(--border);
  border-radius: 999px;
}

.code-block pre {
  margin: 0;
  padding: 1.5rem;
  overflow-x: auto;
  background: #000;
  border: 1px solid var(--border);
  border-radius: var(--radius);
  font-family: var(--mono);
  font-size: 0.9rem;
}

/* Markdown content */
.content img {
  max-width: 100%;
}

.content pre {
  padding: 1rem;
  overflow-x: auto;
  background: #000;
  border-radius: 8px;
}

.content code {
  font-family: var(--mono);
}

.content table {
  width: 100%;
  border-collapse: collapse;
}

.content th,
.content td {
  padding: 0.5rem;
  border: 1px solid var(--border);
}

.article-source {
  color: var(--muted);
  font-size: 0.85rem;
}

/* Footer */
.footer {
  padding: 3rem 0;
  border-top: 1px solid var(--border);
}

.footer-content {
  display: flex;
  flex-wrap: wrap;
  justify-content: space-between;
  gap: 1.5rem;
}

.footer-logo {
  display: flex;
  align-items: center;
  gap: 0.6rem;
  font-weight: 700;
}

.footer-logo img {
  width: 24px;
  height: 24px;
}

.footer-links {
  display: flex;
  gap: 1.5rem;
}

.footer-links a {
  color: var(--muted);
}

.footer-bottom {
  margin-top: 2rem;
  color: var(--muted);
  font-size: 0.85rem;
}

@keyframes rise {
  from {
    opacity: 0;
    transform: translateY(20px);
  }
  to {
    opacity: 1;
    transform: translateY(0);
  }
}

@media (prefers-reduced-motion: reduce) {
  .feature-card,
  .use-case-card,
  .audience-card,
  .docs-card,
  .article-card {
    animation: none;
  }
}

@media (max-width: 720px) {
  .nav-links {
    display: none;
  }

  .section {
    padding: 3.5rem 0;
  }
}
"#;

// Draws the precomputed scene bundle with raw WebGL.
const HERO_SCENE_JS: &str = r#"// OpenQuality hero scene runtime
(function () {
  'use strict';

  const container = document.querySelector('[data-hero-canvas]');
  if (!container) {
    console.warn('Hero canvas container not found, skipping scene');
    return;
  }

  const src = container.getAttribute('data-scene-src') || '/assets/hero-scene.json';

  function compile(gl, type, source) {
    const shader = gl.createShader(type);
    gl.shaderSource(shader, source);
    gl.compileShader(shader);
    if (!gl.getShaderParameter(shader, gl.COMPILE_STATUS)) {
      throw new Error(gl.getShaderInfoLog(shader));
    }
    return shader;
  }

  function link(gl, program) {
    const handle = gl.createProgram();
    gl.attachShader(handle, compile(gl, gl.VERTEX_SHADER, program.vertex));
    gl.attachShader(handle, compile(gl, gl.FRAGMENT_SHADER, program.fragment));
    gl.linkProgram(handle);
    if (!gl.getProgramParameter(handle, gl.LINK_STATUS)) {
      throw new Error(gl.getProgramInfoLog(handle));
    }
    const uniforms = {};
    for (const uniform of program.uniforms) {
      uniforms[uniform.name] = gl.getUniformLocation(handle, uniform.name);
    }
    const attributes = {};
    for (const name of program.attributes) {
      attributes[name] = gl.getAttribLocation(handle, name);
    }
    return { handle, uniforms, attributes, spec: program };
  }

  function buffer(gl, target, data, usage) {
    const handle = gl.createBuffer();
    gl.bindBuffer(target, handle);
    gl.bufferData(target, data, usage);
    return handle;
  }

  function bindAttribute(gl, location, handle) {
    if (location < 0) return;
    gl.bindBuffer(gl.ARRAY_BUFFER, handle);
    gl.enableVertexAttribArray(location);
    gl.vertexAttribPointer(location, 3, gl.FLOAT, false, 0, 0);
  }

  function applyState(gl, spec) {
    if (spec.blending === 'additive') {
      gl.blendFunc(gl.SRC_ALPHA, gl.ONE);
    } else {
      gl.blendFunc(gl.SRC_ALPHA, gl.ONE_MINUS_SRC_ALPHA);
    }
    if (spec.depth_test) gl.enable(gl.DEPTH_TEST); else gl.disable(gl.DEPTH_TEST);
    gl.depthMask(spec.depth_write);
    if (spec.double_sided) gl.disable(gl.CULL_FACE); else gl.enable(gl.CULL_FACE);
  }

  // Column-major 4x4 matrices
  function multiply(a, b) {
    const out = new Float32Array(16);
    for (let col = 0; col < 4; col++) {
      for (let row = 0; row < 4; row++) {
        let sum = 0;
        for (let k = 0; k < 4; k++) sum += a[k * 4 + row] * b[col * 4 + k];
        out[col * 4 + row] = sum;
      }
    }
    return out;
  }

  function perspective(fov, aspect, near, far) {
    const top = near * Math.tan((fov * Math.PI) / 360);
    const height = 2 * top;
    const width = aspect * height;
    const c = -(far + near) / (far - near);
    const d = (-2 * far * near) / (far - near);
    return new Float32Array([
      (2 * near) / width, 0, 0, 0,
      0, (2 * near) / height, 0, 0,
      0, 0, c, -1,
      0, 0, d, 0,
    ]);
  }

  function lookAtOrigin(eye) {
    let zx = eye.x, zy = eye.y, zz = eye.z;
    const zl = Math.hypot(zx, zy, zz) || 1;
    zx /= zl; zy /= zl; zz /= zl;
    let xx = zz, xy = 0, xz = -zx;
    const xl = Math.hypot(xx, xy, xz) || 1;
    xx /= xl; xy /= xl; xz /= xl;
    const yx = zy * xz - zz * xy;
    const yy = zz * xx - zx * xz;
    const yz = zx * xy - zy * xx;
    return new Float32Array([
      xx, yx, zx, 0,
      xy, yy, zy, 0,
      xz, yz, zz, 0,
      -(xx * eye.x + xy * eye.y + xz * eye.z),
      -(yx * eye.x + yy * eye.y + yz * eye.z),
      -(zx * eye.x + zy * eye.y + zz * eye.z),
      1,
    ]);
  }

  function rotationXY(rx, ry) {
    const cx = Math.cos(rx), sx = Math.sin(rx);
    const cy = Math.cos(ry), sy = Math.sin(ry);
    return new Float32Array([
      cy, sx * sy, -cx * sy, 0,
      0, cx, sx, 0,
      sy, -sx * cy, cx * cy, 0,
      0, 0, 0, 1,
    ]);
  }

  function start(data) {
    const canvas = document.createElement('canvas');
    container.appendChild(canvas);

    const gl = canvas.getContext('webgl', { antialias: true, alpha: true, premultipliedAlpha: false });
    if (!gl) {
      console.warn('WebGL unavailable, skipping scene');
      return;
    }

    const stars = link(gl, data.star_program);
    const ribbon = link(gl, data.ribbon_program);

    const basePositions = new Float32Array(data.stars.base_positions);
    const starPositions = new Float32Array(basePositions);
    const starPositionBuffer = buffer(gl, gl.ARRAY_BUFFER, starPositions, gl.DYNAMIC_DRAW);
    const starColorBuffer = buffer(gl, gl.ARRAY_BUFFER, new Float32Array(data.stars.colors), gl.STATIC_DRAW);
    const starCount = basePositions.length / 3;

    const ribbonPositions = buffer(gl, gl.ARRAY_BUFFER, new Float32Array(data.ribbon.positions), gl.STATIC_DRAW);
    const ribbonNormals = buffer(gl, gl.ARRAY_BUFFER, new Float32Array(data.ribbon.normals), gl.STATIC_DRAW);
    const ribbonIndices = buffer(gl, gl.ELEMENT_ARRAY_BUFFER, new Uint16Array(data.ribbon.indices), gl.STATIC_DRAW);
    const indexCount = data.ribbon.indices.length;

    const texture = gl.createTexture();
    gl.bindTexture(gl.TEXTURE_2D, texture);
    gl.texImage2D(gl.TEXTURE_2D, 0, gl.RGBA, data.sprite.size, data.sprite.size, 0,
      gl.RGBA, gl.UNSIGNED_BYTE, new Uint8Array(data.sprite.pixels));
    gl.texParameteri(gl.TEXTURE_2D, gl.TEXTURE_MIN_FILTER, gl.LINEAR);
    gl.texParameteri(gl.TEXTURE_2D, gl.TEXTURE_WRAP_S, gl.CLAMP_TO_EDGE);
    gl.texParameteri(gl.TEXTURE_2D, gl.TEXTURE_WRAP_T, gl.CLAMP_TO_EDGE);

    const camera = data.camera;
    let projection = perspective(camera.fov, 1, camera.near, camera.far);

    function resize() {
      const ratio = Math.min(window.devicePixelRatio || 1, 2);
      const width = container.clientWidth;
      const height = container.clientHeight;
      if (width === 0 || height === 0) return;
      canvas.width = Math.floor(width * ratio);
      canvas.height = Math.floor(height * ratio);
      canvas.style.width = width + 'px';
      canvas.style.height = height + 'px';
      gl.viewport(0, 0, canvas.width, canvas.height);
      projection = perspective(camera.fov, width / height, camera.near, camera.far);
    }

    resize();
    window.addEventListener('resize', resize);

    gl.enable(gl.BLEND);
    gl.clearColor(0, 0, 0, 0);

    const radius = Math.hypot(camera.position.x, camera.position.z);
    const theta0 = Math.atan2(camera.position.x, camera.position.z);
    const started = performance.now();
    let frame = 0;

    function tick(now) {
      const elapsed = (now - started) / 1000;

      const theta = theta0 - ((2 * Math.PI) / 60) * camera.auto_rotate_speed * elapsed;
      const view = lookAtOrigin({ x: radius * Math.sin(theta), y: camera.position.y, z: radius * Math.cos(theta) });

      for (let i = 0; i < starCount; i++) {
        starPositions[i * 3 + 2] = basePositions[i * 3 + 2] + Math.sin(elapsed + i) * data.stars.wobble;
      }

      gl.clear(gl.COLOR_BUFFER_BIT | gl.DEPTH_BUFFER_BIT);

      gl.useProgram(ribbon.handle);
      applyState(gl, ribbon.spec);
      const model = rotationXY(Math.cos(elapsed * 0.2) * 0.1, Math.sin(elapsed * 0.3) * 0.3);
      gl.uniformMatrix4fv(ribbon.uniforms.modelViewMatrix, false, multiply(view, model));
      gl.uniformMatrix4fv(ribbon.uniforms.projectionMatrix, false, projection);
      gl.uniform1f(ribbon.uniforms.uTime, elapsed);
      bindAttribute(gl, ribbon.attributes.position, ribbonPositions);
      bindAttribute(gl, ribbon.attributes.normal, ribbonNormals);
      gl.bindBuffer(gl.ELEMENT_ARRAY_BUFFER, ribbonIndices);
      gl.drawElements(gl.TRIANGLES, indexCount, gl.UNSIGNED_SHORT, 0);

      gl.useProgram(stars.handle);
      applyState(gl, stars.spec);
      gl.bindBuffer(gl.ARRAY_BUFFER, starPositionBuffer);
      gl.bufferSubData(gl.ARRAY_BUFFER, 0, starPositions);
      gl.uniformMatrix4fv(stars.uniforms.modelViewMatrix, false, view);
      gl.uniformMatrix4fv(stars.uniforms.projectionMatrix, false, projection);
      gl.activeTexture(gl.TEXTURE0);
      gl.bindTexture(gl.TEXTURE_2D, texture);
      gl.uniform1i(stars.uniforms.pointTexture, 0);
      bindAttribute(gl, stars.attributes.position, starPositionBuffer);
      bindAttribute(gl, stars.attributes.color, starColorBuffer);
      gl.drawArrays(gl.POINTS, 0, starCount);

      frame = requestAnimationFrame(tick);
    }

    frame = requestAnimationFrame(tick);

    window.oqHeroScene = {
      stop() {
        cancelAnimationFrame(frame);
        window.removeEventListener('resize', resize);
      },
    };
  }

  fetch(src)
    .then((response) => {
      if (!response.ok) throw new Error('HTTP ' + response.status);
      return response.json();
    })
    .then(start)
    .catch((err) => console.warn('Hero scene unavailable:', err));
})();
"#;
