//! Frame driving and the winit application loop.
//!
//! [`FrameDriver`] owns the loaded scene and its GPU handles and knows how to
//! draw one frame through any [`Renderer`]. [`run`] wires it to a window, a
//! [`WgpuRenderer`] and the keyboard.
//!
//! # Lifecycle
//!
//! 1. `resumed` creates the window and GPU context, then uploads the scene once
//! 2. `RedrawRequested` draws a frame and requests the next one
//! 3. `Resized` reconfigures the surface and updates the viewport aspect
//! 4. `Q` toggles between the first two cameras
//! 5. `CloseRequested` releases GPU resources and exits

use std::{path::PathBuf, sync::Arc};

use log::{debug, error, info};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

use crate::{
    config::{Config, LightParams, MaterialParams},
    context::{Context, WgpuRenderer},
    data_structures::{
        camera::{FallbackCamera, ResolvedCamera},
        scene_graph::SceneDocument,
    },
    render::{GpuScene, MeshDrawer, Renderer},
    resources::load_gltf,
};

/// Scene, GPU handles and per-frame render state.
#[derive(Debug)]
pub struct FrameDriver {
    document: SceneDocument,
    gpu: GpuScene,
    active_camera: usize,
    camera: ResolvedCamera,
    viewport_aspect: f32,
    light: LightParams,
    material: MaterialParams,
    fallback: FallbackCamera,
}

impl FrameDriver {
    /// Uploads the document's resources through `renderer`.
    pub fn new<R: Renderer>(
        document: SceneDocument,
        renderer: &mut R,
        config: &Config,
    ) -> anyhow::Result<Self> {
        let gpu = GpuScene::upload(&document, renderer)?;
        Ok(Self {
            document,
            gpu,
            active_camera: 0,
            camera: config.fallback_camera.resolve(),
            viewport_aspect: config.window.width as f32 / config.window.height.max(1) as f32,
            light: config.light,
            material: config.material,
            fallback: config.fallback_camera,
        })
    }

    /// Resolves the active camera, then draws every scene.
    pub fn render_frame<R: Renderer>(&mut self, renderer: &mut R) -> anyhow::Result<()> {
        self.camera =
            self.document
                .resolve_camera(self.active_camera, self.viewport_aspect, &self.fallback)?;

        renderer.begin_frame();
        let mut drawer = MeshDrawer {
            renderer: &mut *renderer,
            gpu: &self.gpu,
            camera: &self.camera,
            light: &self.light,
            material: &self.material,
        };
        self.document.traverse(&mut drawer)?;
        renderer.end_frame()
    }

    /// Flips between camera 0 and 1. Scenes with fewer than two cameras stay on 0.
    pub fn toggle_camera(&mut self) -> usize {
        self.active_camera = if self.document.cameras.len() >= 2 && self.active_camera == 0 {
            1
        } else {
            0
        };
        self.active_camera
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.viewport_aspect = width as f32 / height as f32;
        }
    }

    pub fn active_camera(&self) -> usize {
        self.active_camera
    }

    /// Camera of the most recent [`Self::render_frame`].
    pub fn camera(&self) -> &ResolvedCamera {
        &self.camera
    }

    pub fn document(&self) -> &SceneDocument {
        &self.document
    }

    pub fn gpu(&self) -> &GpuScene {
        &self.gpu
    }
}

struct AppState {
    renderer: WgpuRenderer,
    driver: FrameDriver,
}

impl AppState {
    fn new(window: Arc<Window>, document: SceneDocument, config: &Config) -> anyhow::Result<Self> {
        let ctx = futures::executor::block_on(Context::new(window))?;
        let mut renderer = WgpuRenderer::new(ctx, config.clear_colour());
        let mut driver = FrameDriver::new(document, &mut renderer, config)?;
        let size = renderer.ctx.window.inner_size();
        driver.set_viewport(size.width, size.height);
        Ok(Self { renderer, driver })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if self.renderer.resize(width, height) {
            self.driver.set_viewport(width, height);
        }
    }
}

pub struct App {
    config: Config,
    // Taken once the window exists.
    document: Option<SceneDocument>,
    state: Option<AppState>,
    result: anyhow::Result<()>,
}

impl App {
    pub fn new(config: Config, document: SceneDocument) -> Self {
        Self {
            config,
            document: Some(document),
            state: None,
            result: Ok(()),
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        error!("{err:#}");
        self.result = Err(err);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(document) = self.document.take() else {
            return;
        };
        let window_attributes = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(winit::dpi::PhysicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, e.into()),
        };

        match AppState::new(window.clone(), document, &self.config) {
            Ok(state) => {
                self.state = Some(state);
                window.request_redraw();
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = &mut self.state else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                state.renderer.release();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::KeyQ),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                let camera = state.driver.toggle_camera();
                debug!("Active camera is now {camera}");
                state.renderer.ctx.window.request_redraw();
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = state.driver.render_frame(&mut state.renderer) {
                    return self.fail(event_loop, e);
                }
                state.renderer.ctx.window.request_redraw();
            }
            _ => {}
        }
    }
}

/// Loads `scene_path` and runs the window until it is closed.
pub fn run(config: Config, scene_path: PathBuf) -> anyhow::Result<()> {
    let document = load_gltf(&scene_path)?;
    info!("Rendering {}", scene_path.display());

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config, document);
    event_loop.run_app(&mut app)?;

    app.result
}
