use anyhow::{Context, Result};
use glam::Vec3;
use winit::dpi::LogicalSize;

use gridvis_engine::core::{App, AppControl, FrameCtx};
use gridvis_engine::device::GpuInit;
use gridvis_engine::drawing::{Diagram, DiagramConfig, DiagramError, LinesObject, ObjectId, WireBoxObject};
use gridvis_engine::input::InputEvent;
use gridvis_engine::logging::{init_logging, LoggingConfig};
use gridvis_engine::paint::Color;
use gridvis_engine::render::WgpuDevice;
use gridvis_engine::window::{Runtime, RuntimeConfig};
use gridvis_ui::{CanvasConfig, MenuEvent, MenuId, MenuItem, MenuStyle, MenuTree, UiManager};

// ── menu ids ──────────────────────────────────────────────────────────────

const SELECT: u32 = 0;
const SHOW: u32 = 1;
const SHOW_LINES: u32 = 2;
const SHOW_BOX: u32 = 3;

fn build_menu() -> Result<MenuTree> {
    let tree = MenuTree::build(vec![
        MenuItem::root(SELECT, 0, "Select").with_description("selection mode"),
        MenuItem::root(SHOW, 0, "Show"),
        MenuItem::child(SHOW_LINES, 0, "Lines", SHOW).with_description("toggle the line set"),
        MenuItem::child(SHOW_BOX, 1, "Box", SHOW).with_description("toggle the wire box"),
    ])?;
    Ok(tree)
}

// ── diagram ───────────────────────────────────────────────────────────────

struct Scene {
    diagram: Diagram<WgpuDevice>,
    lines: ObjectId,
    wire_box: ObjectId,
}

impl Scene {
    fn new(device: WgpuDevice) -> Result<Self, DiagramError> {
        let mut diagram = Diagram::new(device, DiagramConfig::default())?;

        let lines = diagram.add_object(Box::new(LinesObject::new()))?;
        let wire_box = diagram.add_object(Box::new(WireBoxObject::new(
            Vec3::new(0.5, 0.0, 0.5),
            Vec3::new(4.0, 3.0, 2.0),
            Color::from_rgba_u8(51, 204, 102, 255),
        )))?;

        diagram.init()?;
        Ok(Self {
            diagram,
            lines,
            wire_box,
        })
    }

    fn toggle(&mut self, id: ObjectId) {
        if let Some(object) = self.diagram.object_mut(id) {
            let visible = !object.is_visible();
            object.set_visible(visible);
            log::info!("`{}` {}", object.label(), if visible { "shown" } else { "hidden" });
        }
    }
}

// ── app ───────────────────────────────────────────────────────────────────

struct Studio {
    ui: UiManager,
    scene: Option<Scene>,
}

impl Studio {
    fn on_menu(&mut self, event: MenuEvent) {
        log::debug!("menu: {event:?}");

        let MenuEvent::Activated(MenuId(id)) = event else {
            return;
        };
        let Some(scene) = self.scene.as_mut() else {
            return;
        };

        match id {
            SHOW_LINES => scene.toggle(scene.lines),
            SHOW_BOX => scene.toggle(scene.wire_box),
            SELECT => log::info!("select mode"),
            other => log::warn!("menu item {other} has no action"),
        }
    }
}

impl App for Studio {
    fn on_input(&mut self, event: &InputEvent) -> AppControl {
        if let Some(menu_event) = self.ui.handle_input(event) {
            self.on_menu(menu_event);
        }
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if self.scene.is_none() {
            match Scene::new(ctx.create_device()) {
                Ok(scene) => self.scene = Some(scene),
                Err(e) => {
                    log::error!("failed to build diagram: {e}");
                    return AppControl::Exit;
                }
            }
        }
        let Some(scene) = self.scene.as_mut() else {
            return AppControl::Exit;
        };

        let diagram = &mut scene.diagram;
        diagram.device_mut().set_canvas_size(ctx.canvas_size());

        if let Err(e) = diagram.update().and_then(|()| diagram.draw()) {
            log::error!("frame {}: {e}", ctx.frame_index);
            if matches!(e, DiagramError::DeviceUnavailable) {
                return AppControl::Exit;
            }
        }

        ctx.present(diagram.device_mut())
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    log::info!("Grid Visualizer v{}", env!("CARGO_PKG_VERSION"));
    log::info!("right-click the canvas for the menu; Escape closes it");

    let canvas = CanvasConfig::default();
    let tree = build_menu().context("invalid menu definition")?;
    let ui = UiManager::new(canvas.clone(), tree, MenuStyle::default());

    let config = RuntimeConfig {
        title: "Grid Visualizer".to_string(),
        initial_size: LogicalSize::new(f64::from(canvas.width), f64::from(canvas.height)),
    };
    let gpu_init = GpuInit {
        present_mode: wgpu::PresentMode::AutoVsync,
        ..GpuInit::default()
    };

    Runtime::run(config, gpu_init, Studio { ui, scene: None })
}
