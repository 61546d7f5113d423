use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use rastr::export;
use rastr::prelude::*;

/// rastr - CPU triangle rasterizer demo
#[derive(Parser, Debug)]
#[command(name = "rastr", version, about = "Render a small scene with the CPU rasterizer")]
struct Args {
    /// Where to write the rendered PNG
    #[arg(default_value = "output.png")]
    output: PathBuf,

    /// Width and height of the square frame in pixels
    #[arg(short, long, default_value_t = 700)]
    size: u32,

    /// Rotation of the model about the z axis, in degrees
    #[arg(short, long, default_value_t = 0.0, allow_negative_numbers = true)]
    angle: f32,

    /// Render one sample per pixel instead of 2x2 supersampling
    #[arg(long)]
    no_ssaa: bool,

    /// Blend vertex colours across each triangle
    #[arg(long)]
    gouraud: bool,

    /// Render an OBJ mesh instead of the built-in scene
    #[arg(long)]
    obj: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Open a window and rotate with A/D instead of writing a file
    #[cfg(feature = "window")]
    #[arg(short, long)]
    interactive: bool,
}

const EYE: Vec3 = Vec3::new(0.0, 0.0, 5.0);
const FALLBACK_COLOR: Vec3 = Vec3::new(200.0, 200.0, 200.0);
#[cfg(feature = "window")]
const ROTATION_STEP: f32 = 10.0;

/// Two overlapping triangles at different depths.
fn load_scene(r: &mut Rasterizer) -> MeshHandles {
    let positions = r.load_positions(vec![
        Vec3::new(2.0, 0.0, -2.0),
        Vec3::new(0.0, 2.0, -2.0),
        Vec3::new(-2.0, 0.0, -2.0),
        Vec3::new(3.5, -1.0, -5.0),
        Vec3::new(2.5, 1.5, -5.0),
        Vec3::new(-1.0, 0.5, -5.0),
    ]);
    let indices = r.load_indices(vec![Face::new(0, 1, 2), Face::new(3, 4, 5)]);

    let near = Vec3::new(217.0, 238.0, 185.0);
    let far = Vec3::new(185.0, 217.0, 238.0);
    let colors = r.load_colors(vec![near, near, near, far, far, far]);

    MeshHandles {
        positions,
        indices,
        colors,
    }
}

fn render(r: &mut Rasterizer, mesh: MeshHandles, angle: f32) -> Result<DrawStats> {
    r.clear(Buffers::COLOR | Buffers::DEPTH);
    r.set_model(Mat4::rotation_z_degrees(angle));
    let stats = r.draw(mesh.positions, mesh.indices, mesh.colors, Primitive::Triangle)?;
    Ok(stats)
}

#[cfg(feature = "window")]
fn run_interactive(r: &mut Rasterizer, mesh: MeshHandles, mut angle: f32) -> Result<()> {
    let mut window = Window::new("rastr", r.width(), r.height())
        .map_err(|e| anyhow::anyhow!("SDL2 window: {}", e))?;
    let creator = window.texture_creator();
    let mut texture = FrameTexture::new(&creator, window.width(), window.height())
        .map_err(|e| anyhow::anyhow!("SDL2 texture: {}", e))?;
    let mut limiter = FrameLimiter::new(&window);

    loop {
        match window.poll_events() {
            WindowEvent::Quit => break,
            WindowEvent::RotateLeft => angle += ROTATION_STEP,
            WindowEvent::RotateRight => angle -= ROTATION_STEP,
            WindowEvent::None => {}
        }

        render(r, mesh, angle)?;
        window
            .present(&mut texture, r.frame_buffer())
            .map_err(|e| anyhow::anyhow!("present: {}", e))?;
        limiter.wait_and_get_delta(&window);
    }

    info!("Closed at angle {:.1}", angle);
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp_millis()
        .init();

    let ssaa = !args.no_ssaa;
    let mut r = Rasterizer::new(args.size, args.size, ssaa)?;
    if args.gouraud {
        r.set_shading_mode(ShadingMode::Gouraud);
    }
    info!(
        "{}x{} frame, ssaa {}, {} shading",
        args.size,
        args.size,
        if ssaa { "on" } else { "off" },
        r.shading_mode()
    );

    let mesh = match &args.obj {
        Some(path) => {
            info!("Loading mesh from: {}", path.display());
            r.load_obj(path, FALLBACK_COLOR)
                .with_context(|| format!("failed to load {}", path.display()))?
        }
        None => load_scene(&mut r),
    };

    r.set_view(Mat4::view_from_eye(EYE));
    r.set_perspective(&Projection::from_degrees(45.0, 1.0, 0.1, 50.0));

    #[cfg(feature = "window")]
    if args.interactive {
        return run_interactive(&mut r, mesh, args.angle);
    }

    let stats = render(&mut r, mesh, args.angle)?;
    info!(
        "Drew {} triangles ({} clipped away, {} degenerate), {} samples written",
        stats.triangles, stats.clipped_away, stats.degenerate, stats.samples_written
    );

    export::save_png(r.frame_buffer(), r.width(), r.height(), &args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    info!("Wrote {}", args.output.display());

    Ok(())
}
