use glam::Mat4;
use web_sys::{
    WebGl2RenderingContext as Gl, WebGlBuffer, WebGlFramebuffer, WebGlProgram, WebGlShader,
    WebGlUniformLocation, WebGlVertexArrayObject,
};

use crate::error::AppError;
use crate::model::Scene;
use crate::utils::{Mesh, Vertex};

const VERTEX_SHADER: &str = r#"#version 300 es
layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_normal;

uniform mat4 u_view_proj;
uniform mat4 u_model;

out vec3 v_normal;

void main() {
    // Boxes are only translated and scaled, so the model matrix keeps normals axis aligned
    v_normal = normalize(mat3(u_model) * a_normal);
    gl_Position = u_view_proj * u_model * vec4(a_position, 1.0);
}
"#;

const FRAGMENT_SHADER: &str = r#"#version 300 es
precision mediump float;

in vec3 v_normal;

uniform vec3 u_diffuse;
uniform vec3 u_light_dir;
uniform vec3 u_light_diffuse;
uniform vec3 u_light_ground;
uniform float u_light_intensity;

out vec4 frag_color;

void main() {
    float hemi = 0.5 + 0.5 * dot(normalize(v_normal), u_light_dir);
    vec3 light = mix(u_light_ground, u_light_diffuse, hemi) * u_light_intensity;
    frag_color = vec4(u_diffuse * light, 1.0);
}
"#;

struct Uniforms {
    view_proj: Option<WebGlUniformLocation>,
    model: Option<WebGlUniformLocation>,
    diffuse: Option<WebGlUniformLocation>,
    light_dir: Option<WebGlUniformLocation>,
    light_diffuse: Option<WebGlUniformLocation>,
    light_ground: Option<WebGlUniformLocation>,
    light_intensity: Option<WebGlUniformLocation>,
}

/// GPU resources for drawing the scene's boxes with hemispheric lighting
pub struct RenderState {
    program: WebGlProgram,
    vao: WebGlVertexArrayObject,
    _vertex_buffer: WebGlBuffer,
    _index_buffer: WebGlBuffer,
    index_count: i32,
    uniforms: Uniforms,
    clear_color: [f32; 4],
}

impl RenderState {
    pub fn new(gl: &Gl, mesh: &Mesh, clear_color: [f32; 4]) -> Result<Self, AppError> {
        let vs = compile_shader(gl, Gl::VERTEX_SHADER, VERTEX_SHADER)?;
        let fs = compile_shader(gl, Gl::FRAGMENT_SHADER, FRAGMENT_SHADER)?;
        let program = link_program(gl, &vs, &fs)?;
        gl.delete_shader(Some(&vs));
        gl.delete_shader(Some(&fs));

        let vao = gl
            .create_vertex_array()
            .ok_or_else(|| AppError::Gl("failed to create vertex array".to_string()))?;
        gl.bind_vertex_array(Some(&vao));

        let vertex_buffer = create_buffer(gl, Gl::ARRAY_BUFFER, mesh.vertex_bytes())?;
        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_with_i32(0, 3, Gl::FLOAT, false, Vertex::STRIDE, 0);
        gl.enable_vertex_attrib_array(1);
        gl.vertex_attrib_pointer_with_i32(1, 3, Gl::FLOAT, false, Vertex::STRIDE, Vertex::NORMAL_OFFSET);

        let index_buffer = create_buffer(gl, Gl::ELEMENT_ARRAY_BUFFER, mesh.index_bytes())?;
        gl.bind_vertex_array(None);

        let uniforms = Uniforms {
            view_proj: gl.get_uniform_location(&program, "u_view_proj"),
            model: gl.get_uniform_location(&program, "u_model"),
            diffuse: gl.get_uniform_location(&program, "u_diffuse"),
            light_dir: gl.get_uniform_location(&program, "u_light_dir"),
            light_diffuse: gl.get_uniform_location(&program, "u_light_diffuse"),
            light_ground: gl.get_uniform_location(&program, "u_light_ground"),
            light_intensity: gl.get_uniform_location(&program, "u_light_intensity"),
        };

        Ok(Self {
            program,
            vao,
            _vertex_buffer: vertex_buffer,
            _index_buffer: index_buffer,
            index_count: mesh.indices.len() as i32,
            uniforms,
            clear_color,
        })
    }

    /// Bind `framebuffer` (the canvas when `None`) and clear it.
    pub fn begin_frame(&self, gl: &Gl, framebuffer: Option<&WebGlFramebuffer>, width: i32, height: i32) {
        gl.bind_framebuffer(Gl::FRAMEBUFFER, framebuffer);
        gl.viewport(0, 0, width, height);
        let [r, g, b, a] = self.clear_color;
        gl.clear_color(r, g, b, a);
        gl.clear(Gl::COLOR_BUFFER_BIT | Gl::DEPTH_BUFFER_BIT);
    }

    /// Draw every mesh of `scene` into the given viewport.
    pub fn draw_scene(&self, gl: &Gl, scene: &Scene, view_proj: Mat4, viewport: [i32; 4]) {
        let [x, y, w, h] = viewport;
        gl.viewport(x, y, w, h);
        gl.use_program(Some(&self.program));
        gl.bind_vertex_array(Some(&self.vao));

        let u = &self.uniforms;
        gl.uniform_matrix4fv_with_f32_array(u.view_proj.as_ref(), false, &view_proj.to_cols_array());

        if let Some(light) = scene.lights.first() {
            let dir = light.direction.normalize_or_zero();
            gl.uniform3fv_with_f32_array(u.light_dir.as_ref(), &dir.to_array());
            gl.uniform3fv_with_f32_array(u.light_diffuse.as_ref(), &light.diffuse.to_array());
            gl.uniform3fv_with_f32_array(u.light_ground.as_ref(), &light.ground_color.to_array());
            gl.uniform1f(u.light_intensity.as_ref(), light.intensity);
        } else {
            // Unlit scenes still show their diffuse colors
            gl.uniform3fv_with_f32_array(u.light_dir.as_ref(), &[0.0, 1.0, 0.0]);
            gl.uniform3fv_with_f32_array(u.light_diffuse.as_ref(), &[1.0, 1.0, 1.0]);
            gl.uniform3fv_with_f32_array(u.light_ground.as_ref(), &[1.0, 1.0, 1.0]);
            gl.uniform1f(u.light_intensity.as_ref(), 1.0);
        }

        for (_, mesh) in scene.meshes() {
            let model = Mat4::from_translation(mesh.position) * Mat4::from_scale(mesh.size);
            gl.uniform_matrix4fv_with_f32_array(u.model.as_ref(), false, &model.to_cols_array());
            gl.uniform3fv_with_f32_array(u.diffuse.as_ref(), &mesh.material.diffuse_color.to_array());
            gl.draw_elements_with_i32(Gl::TRIANGLES, self.index_count, Gl::UNSIGNED_SHORT, 0);
        }

        gl.bind_vertex_array(None);
    }
}

fn create_buffer(gl: &Gl, target: u32, data: &[u8]) -> Result<WebGlBuffer, AppError> {
    let buffer = gl
        .create_buffer()
        .ok_or_else(|| AppError::Gl("failed to create buffer".to_string()))?;
    gl.bind_buffer(target, Some(&buffer));
    gl.buffer_data_with_u8_array(target, data, Gl::STATIC_DRAW);
    Ok(buffer)
}

fn compile_shader(gl: &Gl, kind: u32, source: &str) -> Result<WebGlShader, AppError> {
    let shader = gl
        .create_shader(kind)
        .ok_or_else(|| AppError::Shader("failed to create shader".to_string()))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    if gl
        .get_shader_parameter(&shader, Gl::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(shader)
    } else {
        let log = gl.get_shader_info_log(&shader).unwrap_or_default();
        gl.delete_shader(Some(&shader));
        Err(AppError::Shader(log))
    }
}

fn link_program(gl: &Gl, vs: &WebGlShader, fs: &WebGlShader) -> Result<WebGlProgram, AppError> {
    let program = gl
        .create_program()
        .ok_or_else(|| AppError::Shader("failed to create program".to_string()))?;
    gl.attach_shader(&program, vs);
    gl.attach_shader(&program, fs);
    gl.link_program(&program);

    if gl
        .get_program_parameter(&program, Gl::LINK_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(program)
    } else {
        let log = gl.get_program_info_log(&program).unwrap_or_default();
        gl.delete_program(Some(&program));
        Err(AppError::Shader(log))
    }
}
