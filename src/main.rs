use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sphere_tracer::{
    application::{AppState, Application, Layer, Screen},
    backend::{Backend, BackendKind},
    camera::CameraController,
    description::{load_scene, load_scene_str},
    display::QuadBlit,
    output,
    texture::Texture,
    Error, RenderConfig, Scene,
};
use wgpu::{CommandEncoderDescriptor, TextureViewDescriptor};
use winit::{
    dpi::PhysicalSize,
    event::Event,
};

/// Render a JSON sphere scene to a PNG or into a live window
#[derive(Parser, Debug)]
#[command(name = "sphere_tracer", version)]
struct Cli {
    /// Scene description file, or the JSON itself with --inline
    scene: String,

    /// Treat SCENE as a JSON document instead of a path
    #[arg(long)]
    inline: bool,

    #[command(subcommand)]
    mode: Mode,

    #[command(flatten)]
    render: RenderArgs,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Render one antialiased frame and save it as PNG
    Image {
        /// Output file
        output: PathBuf,
    },
    /// Open a window and re-render every frame
    Live,
}

/// Overrides for the scene file's `render` block.
#[derive(clap::Args, Debug)]
struct RenderArgs {
    #[arg(short = 'W', long, global = true)]
    width: Option<u32>,

    #[arg(short = 'H', long, global = true)]
    height: Option<u32>,

    /// Four samples per pixel (always on in image mode)
    #[arg(short, long, global = true)]
    antialiasing: bool,

    /// Reflection recursion depth
    #[arg(long, global = true)]
    max_depth: Option<u32>,

    /// Minimum hit distance along a ray
    #[arg(long, global = true)]
    epsilon: Option<f32>,

    #[arg(short, long, value_enum, global = true, default_value_t = CliBackend::Cpu)]
    backend: CliBackend,

    /// WGSL compute pass run over the traced samples (GPU backend only)
    #[arg(long, global = true, value_name = "FILE")]
    postprocess: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliBackend {
    /// Sequential reference renderer
    Cpu,
    /// wgpu compute shader
    Gpu,
}

impl From<CliBackend> for BackendKind {
    fn from(backend: CliBackend) -> Self {
        match backend {
            CliBackend::Cpu => BackendKind::Cpu,
            CliBackend::Gpu => BackendKind::Gpu,
        }
    }
}

impl RenderArgs {
    fn apply(&self, mut config: RenderConfig) -> RenderConfig {
        config.width = self.width.unwrap_or(config.width);
        config.height = self.height.unwrap_or(config.height);
        config.antialiasing |= self.antialiasing;
        config.max_depth = self.max_depth.unwrap_or(config.max_depth);
        config.hit_epsilon = self.epsilon.unwrap_or(config.hit_epsilon);
        config
    }
}

struct LiveView {
    scene: Scene,
    config: RenderConfig,
    backend: Box<dyn Backend>,
    camera_controller: CameraController,
    texture: Texture,
    blit: QuadBlit,
}

struct LiveContext {
    scene: Scene,
    config: RenderConfig,
    backend: BackendKind,
    postprocess: Option<String>,
}

impl Layer for LiveView {
    type Context = LiveContext;
    type LayerErr = Error;

    fn start(
        screen: &mut Screen,
        _app: &AppState,
        context: LiveContext,
    ) -> sphere_tracer::Result<Self> {
        let LiveContext {
            scene,
            config,
            backend,
            postprocess,
        } = context;
        let texture = Texture::new(
            &screen.device,
            config.width,
            config.height,
            Some("Frame texture"),
        );
        let blit = QuadBlit::new(&screen.device, screen.config.format, &texture);

        Ok(Self {
            scene,
            config,
            backend: backend.create(postprocess.as_deref())?,
            camera_controller: CameraController::default(),
            texture,
            blit,
        })
    }

    fn process_event(&mut self, event: &Event<()>, _screen: &mut Screen) {
        if let Event::WindowEvent { event, .. } = event {
            self.camera_controller.process_events(&mut self.scene, event);
        }
    }

    fn update(&mut self, app: &AppState, screen: &mut Screen) -> Result<(), Error> {
        self.scene.tick();
        let frame = self.backend.render(&self.scene, &self.config)?;
        self.texture
            .update_data(&screen.queue, &output::to_rgba_bytes(&frame));
        tracing::trace!(
            frame = app.frame_count(),
            seconds = app.elapsed_time(),
            "frame presented"
        );
        Ok(())
    }

    fn render(&mut self, _app: &AppState, screen: &mut Screen) -> Result<(), wgpu::SurfaceError> {
        let output = screen.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&TextureViewDescriptor::default());
        let mut encoder = screen
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        self.blit.draw(&mut encoder, &view);

        screen.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    fn shutdown(&mut self, app: &AppState, _screen: &mut Screen) -> Result<(), Error> {
        tracing::info!(frames = app.frame_count(), "exiting");
        Ok(())
    }
}

fn run(cli: Cli) -> sphere_tracer::Result<()> {
    let (scene, file_config) = if cli.inline {
        load_scene_str(&cli.scene)?
    } else {
        load_scene(&cli.scene)?
    };
    let config = cli.render.apply(file_config.unwrap_or_default());
    config.validate()?;
    let backend = BackendKind::from(cli.render.backend);
    let postprocess = cli
        .render
        .postprocess
        .as_deref()
        .map(std::fs::read_to_string)
        .transpose()?;

    match cli.mode {
        Mode::Image { output: path } => {
            let config = RenderConfig {
                antialiasing: true,
                ..config
            };
            let frame = backend
                .create(postprocess.as_deref())?
                .render(&scene, &config)?;
            output::save_png(&frame, path)
        }
        Mode::Live => {
            tracing::info!(
                width = config.width,
                height = config.height,
                antialiasing = config.antialiasing,
                backend = backend.as_str(),
                "starting live view"
            );
            pollster::block_on(Application::<LiveView>::init(
                "sphere_tracer",
                PhysicalSize::new(config.width, config.height),
                LiveContext {
                    scene,
                    config,
                    backend,
                    postprocess,
                },
            ))
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        tracing::error!("{err}");
        return Err(err.into());
    }
    Ok(())
}
