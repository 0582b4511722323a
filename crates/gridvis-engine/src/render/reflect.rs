//! WGSL front-end shared by every backend.
//!
//! `compile` parses and validates a single stage with naga; `link` checks that
//! two stages fit together and reflects the program's attribute and uniform
//! tables. Backends call these so compile/link failures look the same whether
//! or not a GPU is present.

use naga::{AddressSpace, Binding, BuiltIn, Handle, Module, Type, TypeInner, VectorSize};

use super::types::{AttributeLocation, ShaderStage, UniformLocation};

/// A parsed and validated shader stage.
#[derive(Debug)]
pub struct CompiledStage {
    pub stage: ShaderStage,
    /// Original WGSL, handed to the GPU driver by the wgpu backend.
    pub source: String,
    pub entry_point: String,
    module: Module,
}

/// Vertex input reflected from the vertex entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeInfo {
    pub name: String,
    pub location: AttributeLocation,
    pub components: u8,
}

/// A `var<uniform>` of type `mat4x4<f32>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformInfo {
    pub name: String,
    pub location: UniformLocation,
}

/// What a linked program exposes.
#[derive(Debug, Clone)]
pub struct ProgramInterface {
    pub vertex_entry: String,
    pub fragment_entry: String,
    pub attributes: Vec<AttributeInfo>,
    /// Sorted by binding.
    pub uniforms: Vec<UniformInfo>,
}

impl ProgramInterface {
    pub fn attribute(&self, name: &str) -> Option<&AttributeInfo> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn uniform(&self, name: &str) -> Option<&UniformInfo> {
        self.uniforms.iter().find(|u| u.name == name)
    }
}

/// Bytes of a `mat4x4<f32>` uniform.
pub const MAT4_UNIFORM_SIZE: u64 = 64;

/// Parses and validates `source` as a single `stage`.
pub fn compile(stage: ShaderStage, source: &str) -> Result<CompiledStage, String> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| e.emit_to_string(source))?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::default(),
    );
    validator
        .validate(&module)
        .map_err(|e| format!("validation error: {e}"))?;

    let wanted = naga_stage(stage);
    let entry_point = module
        .entry_points
        .iter()
        .find(|ep| ep.stage == wanted)
        .map(|ep| ep.name.clone())
        .ok_or_else(|| format!("no @{stage} entry point in {stage} source"))?;

    Ok(CompiledStage {
        stage,
        source: source.to_string(),
        entry_point,
        module,
    })
}

/// Checks the stage interface and reflects the program tables.
///
/// Every problem found is reported, one per line.
pub fn link(vertex: &CompiledStage, fragment: &CompiledStage) -> Result<ProgramInterface, String> {
    if vertex.stage != ShaderStage::Vertex || fragment.stage != ShaderStage::Fragment {
        return Err(format!(
            "expected a vertex and a fragment stage, got {} and {}",
            vertex.stage, fragment.stage
        ));
    }

    let mut errors = Vec::new();

    let vs_entry = vertex.entry();
    let fs_entry = fragment.entry();

    // Vertex outputs feed fragment inputs.
    let mut outputs = Vec::new();
    let mut writes_position = false;
    if let Some(result) = &vs_entry.function.result {
        collect_io(&vertex.module, result.binding.as_ref(), None, result.ty, &mut outputs, &mut writes_position);
    }
    if !writes_position {
        errors.push("vertex stage does not write @builtin(position)".to_string());
    }

    let mut inputs = Vec::new();
    let mut unused = false;
    for arg in &fs_entry.function.arguments {
        collect_io(&fragment.module, arg.binding.as_ref(), arg.name.as_deref(), arg.ty, &mut inputs, &mut unused);
    }
    for input in &inputs {
        match outputs.iter().find(|o| o.location == input.location) {
            None => errors.push(format!(
                "fragment input @location({}) is not written by the vertex stage",
                input.location
            )),
            Some(output) if output.ty != input.ty => errors.push(format!(
                "@location({}) type mismatch: vertex writes {:?}, fragment reads {:?}",
                input.location, output.ty, input.ty
            )),
            Some(_) => {}
        }
    }

    // Vertex inputs become attributes.
    let mut vs_inputs = Vec::new();
    for arg in &vs_entry.function.arguments {
        collect_io(&vertex.module, arg.binding.as_ref(), arg.name.as_deref(), arg.ty, &mut vs_inputs, &mut unused);
    }
    let mut attributes = Vec::new();
    for input in vs_inputs {
        let Some(name) = input.name else { continue };
        match components(&input.ty) {
            Some(components) => attributes.push(AttributeInfo {
                name,
                location: AttributeLocation(input.location),
                components,
            }),
            None => errors.push(format!(
                "vertex input `{name}` has unsupported type {:?}",
                input.ty
            )),
        }
    }

    let mut uniforms: Vec<UniformInfo> = Vec::new();
    for stage in [vertex, fragment] {
        for found in stage.uniforms(&mut errors) {
            match uniforms.iter().find(|u| u.name == found.name) {
                Some(existing) if existing.location != found.location => errors.push(format!(
                    "uniform `{}` is bound at {:?} in one stage and {:?} in another",
                    found.name, existing.location, found.location
                )),
                Some(_) => {}
                None => {
                    if let Some(clash) = uniforms.iter().find(|u| u.location == found.location) {
                        errors.push(format!(
                            "uniforms `{}` and `{}` share {:?}",
                            clash.name, found.name, found.location
                        ));
                    } else {
                        uniforms.push(found);
                    }
                }
            }
        }
    }
    uniforms.sort_by_key(|u| u.location);

    if !errors.is_empty() {
        return Err(errors.join("\n"));
    }

    Ok(ProgramInterface {
        vertex_entry: vertex.entry_point.clone(),
        fragment_entry: fragment.entry_point.clone(),
        attributes,
        uniforms,
    })
}

impl CompiledStage {
    fn entry(&self) -> &naga::EntryPoint {
        let wanted = naga_stage(self.stage);
        // `compile` rejects modules without a matching entry point.
        self.module
            .entry_points
            .iter()
            .find(|ep| ep.stage == wanted && ep.name == self.entry_point)
            .unwrap_or(&self.module.entry_points[0])
    }

    fn uniforms(&self, errors: &mut Vec<String>) -> Vec<UniformInfo> {
        let mut out = Vec::new();
        for (_, var) in self.module.global_variables.iter() {
            if var.space != AddressSpace::Uniform {
                continue;
            }
            let name = var.name.clone().unwrap_or_default();
            let Some(rb) = &var.binding else { continue };

            if rb.group != 0 {
                errors.push(format!("uniform `{name}` must live in @group(0), found @group({})", rb.group));
                continue;
            }
            if !is_mat4(&self.module.types[var.ty].inner) {
                errors.push(format!("uniform `{name}` must be mat4x4<f32>"));
                continue;
            }

            out.push(UniformInfo {
                name,
                location: UniformLocation {
                    group: rb.group,
                    binding: rb.binding,
                },
            });
        }
        out
    }
}

/// A user-defined (`@location`) stage input or output.
struct Varying {
    name: Option<String>,
    location: u32,
    ty: TypeInner,
}

/// Flattens entry-point arguments/results, descending into structs.
fn collect_io(
    module: &Module,
    binding: Option<&Binding>,
    name: Option<&str>,
    ty: Handle<Type>,
    out: &mut Vec<Varying>,
    writes_position: &mut bool,
) {
    match binding {
        Some(Binding::Location { location, .. }) => out.push(Varying {
            name: name.map(str::to_string),
            location: *location,
            ty: module.types[ty].inner.clone(),
        }),
        Some(Binding::BuiltIn(BuiltIn::Position { .. })) => *writes_position = true,
        Some(Binding::BuiltIn(_)) => {}
        None => {
            if let TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for m in members {
                    collect_io(module, m.binding.as_ref(), m.name.as_deref(), m.ty, out, writes_position);
                }
            }
        }
    }
}

fn components(ty: &TypeInner) -> Option<u8> {
    match ty {
        TypeInner::Scalar(s) if s.kind == naga::ScalarKind::Float && s.width == 4 => Some(1),
        TypeInner::Vector { size, scalar } if scalar.kind == naga::ScalarKind::Float && scalar.width == 4 => {
            Some(match size {
                VectorSize::Bi => 2,
                VectorSize::Tri => 3,
                VectorSize::Quad => 4,
            })
        }
        _ => None,
    }
}

fn is_mat4(ty: &TypeInner) -> bool {
    matches!(
        ty,
        TypeInner::Matrix {
            columns: VectorSize::Quad,
            rows: VectorSize::Quad,
            scalar,
        } if scalar.kind == naga::ScalarKind::Float && scalar.width == 4
    )
}

fn naga_stage(stage: ShaderStage) -> naga::ShaderStage {
    match stage {
        ShaderStage::Vertex => naga::ShaderStage::Vertex,
        ShaderStage::Fragment => naga::ShaderStage::Fragment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VS: &str = include_str!("shaders/flat_color.vert.wgsl");
    const FS: &str = include_str!("shaders/flat_color.frag.wgsl");

    fn linked(vs: &str, fs: &str) -> Result<ProgramInterface, String> {
        let vs = compile(ShaderStage::Vertex, vs)?;
        let fs = compile(ShaderStage::Fragment, fs)?;
        link(&vs, &fs)
    }

    // ── compile ───────────────────────────────────────────────────────────

    #[test]
    fn flat_color_stages_compile() {
        let vs = compile(ShaderStage::Vertex, VS).unwrap();
        let fs = compile(ShaderStage::Fragment, FS).unwrap();
        assert_eq!(vs.entry_point, "vs_main");
        assert_eq!(fs.entry_point, "fs_main");
    }

    #[test]
    fn unbalanced_braces_fail_to_parse() {
        let broken = VS.replacen('}', "", 1);
        assert!(compile(ShaderStage::Vertex, &broken).is_err());
    }

    #[test]
    fn missing_entry_point_for_stage_is_rejected() {
        let err = compile(ShaderStage::Vertex, FS).unwrap_err();
        assert!(err.contains("no @vertex entry point"), "{err}");
    }

    // ── link ──────────────────────────────────────────────────────────────

    #[test]
    fn flat_color_program_reflects_tables() {
        let program = linked(VS, FS).unwrap();

        let position = program.attribute("vertexPosition").unwrap();
        assert_eq!(position.location, AttributeLocation(0));
        assert_eq!(position.components, 3);

        let color = program.attribute("vertexColor").unwrap();
        assert_eq!(color.location, AttributeLocation(1));
        assert_eq!(color.components, 4);

        let names: Vec<&str> = program.uniforms.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, ["projectionMatrix", "modelViewMatrix"]);
        assert_eq!(program.uniform("modelViewMatrix").unwrap().location.binding, 1);
    }

    #[test]
    fn fragment_input_without_vertex_output_fails() {
        let fs = "@fragment fn fs_main(@location(3) c: vec4<f32>) -> @location(0) vec4<f32> { return c; }";
        let err = linked(VS, fs).unwrap_err();
        assert!(err.contains("@location(3)"), "{err}");
    }

    #[test]
    fn varying_type_mismatch_fails() {
        let fs = "@fragment fn fs_main(@location(0) c: vec2<f32>) -> @location(0) vec4<f32> { return vec4<f32>(c, 0.0, 1.0); }";
        let err = linked(VS, fs).unwrap_err();
        assert!(err.contains("type mismatch"), "{err}");
    }

    #[test]
    fn uniform_binding_disagreement_fails() {
        let fs = "
            @group(0) @binding(5) var<uniform> projectionMatrix: mat4x4<f32>;
            @fragment fn fs_main(@location(0) c: vec4<f32>) -> @location(0) vec4<f32> {
                return projectionMatrix * c;
            }";
        let err = linked(VS, fs).unwrap_err();
        assert!(err.contains("projectionMatrix"), "{err}");
    }

    #[test]
    fn vertex_stage_without_position_is_rejected() {
        let vs = "
            struct Out { @location(0) color: vec4<f32> };
            @vertex fn vs_main(@location(0) p: vec3<f32>) -> Out {
                var o: Out;
                o.color = vec4<f32>(p, 1.0);
                return o;
            }";
        assert!(linked(vs, FS).is_err());
    }

    #[test]
    fn stages_in_wrong_order_fail_to_link() {
        let vs = compile(ShaderStage::Vertex, VS).unwrap();
        let fs = compile(ShaderStage::Fragment, FS).unwrap();
        let err = link(&fs, &vs).unwrap_err();
        assert!(err.contains("expected a vertex and a fragment stage"), "{err}");
    }
}
