#[cfg(all(target_arch = "wasm32", feature = "csr"))]
fn configure_tracing() -> anyhow::Result<()> {
	Ok(tracing_wasm::try_set_as_global_default()?)
}

/// Logs go to stderr so stdout carries only the SVG.
#[cfg(not(all(target_arch = "wasm32", feature = "csr")))]
fn configure_tracing() -> anyhow::Result<()> {
	let max_level = match cfg!(debug_assertions) {
		true => tracing::Level::TRACE,
		false => tracing::Level::INFO,
	};
	let subscriber = tracing_subscriber::fmt()
		.with_max_level(max_level)
		.with_target(false)
		.with_writer(std::io::stderr)
		.finish();
	Ok(tracing::subscriber::set_global_default(subscriber)?)
}

fn configure_logging() -> anyhow::Result<()> {
	configure_tracing()?;

	// Redirect `log` to `tracing`, so dependencies that log still reach our subscriber.
	#[cfg(feature = "log")]
	tracing_log::LogTracer::init()?;

	Ok(())
}

#[cfg(not(all(target_arch = "wasm32", feature = "csr")))]
mod replay {
	use canvas_brush::input::{self, ReplayHost, SampleSource};
	use canvas_brush::render::{self, RecordingSurface, Strategy, StrokeRenderer};
	use canvas_brush::geom::AABox;
	use canvas_brush::{ControllerConfig, PaintController, Point};
	use clap::{Parser, ValueEnum};
	use glam::DVec2;
	use std::cell::{Cell, RefCell};
	use std::io::{BufRead, Write};
	use std::rc::Rc;

	#[derive(Clone, Copy, Debug, ValueEnum)]
	enum Renderer {
		/// Dots joined by fixed-width segments, redrawn on every sample.
		Polyline,
		/// Velocity-tapered quads, one per sample.
		Ribbon,
	}

	/// Replays `x y t` samples from stdin as one stroke and writes the drawing to stdout as SVG.
	#[derive(Parser, Debug)]
	#[command(name = "canvas-brush", version, about, long_about = None)]
	struct Cli {
		#[arg(short, long, value_enum, default_value_t = Renderer::Ribbon)]
		renderer: Renderer,

		/// Horizontal position of the surface's top-left corner in sample space.
		#[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
		origin_x: f64,

		/// Vertical position of the surface's top-left corner in sample space.
		#[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
		origin_y: f64,

		#[arg(long, default_value_t = 640.0)]
		width: f64,

		#[arg(long, default_value_t = 480.0)]
		height: f64,

		/// CSS colour for the stroke.
		#[arg(long)]
		color: Option<String>,
	}

	impl Cli {
		fn strategy(&self) -> anyhow::Result<Strategy> {
			Ok(match (self.renderer, &self.color) {
				(Renderer::Polyline, None) => Strategy::Polyline(Default::default()),
				(Renderer::Polyline, Some(color)) => {
					Strategy::Polyline(render::PolylineRenderer::default().with_css_color(color)?)
				}
				(Renderer::Ribbon, None) => Strategy::Ribbon(Default::default()),
				(Renderer::Ribbon, Some(color)) => {
					Strategy::Ribbon(render::RibbonRenderer::default().with_css_color(color)?)
				}
			})
		}
	}

	fn read_samples(input: impl BufRead) -> anyhow::Result<Vec<Point>> {
		use canvas_brush::util::ResultExt;

		let mut samples = Vec::new();
		for (number, line) in input.lines().enumerate() {
			let line = line?;
			let what = format!("skipping line {}", number + 1);
			if let Some(Some(sample)) = input::parse_sample(&line).ok_or_warn(&what) {
				samples.push(sample);
			}
		}
		Ok(samples)
	}

	pub fn run() -> anyhow::Result<()> {
		let cli = Cli::parse();
		let strategy = cli.strategy()?;
		let samples = read_samples(std::io::stdin().lock())?;
		tracing::info!(samples = samples.len(), renderer = ?cli.renderer, "replaying stroke");

		let surface = Rc::new(RefCell::new(RecordingSurface::new(cli.width, cli.height)));
		render::clear_surface(&mut *surface.borrow_mut());
		let drawn = Rc::new(Cell::new(AABox::empty()));
		let config = {
			let surface = surface.clone();
			let drawn = drawn.clone();
			ControllerConfig::new()
				.on_move(move |node| {
					if let Some(bounds) = strategy.render(&mut *surface.borrow_mut(), node) {
						tracing::trace!(node = %node.id(), ?bounds, "painted");
						drawn.set(drawn.get().union(bounds));
					}
				})
				.on_end(|stroke| tracing::info!(points = stroke.len(), "stroke finished"))
		};
		let origin = DVec2::new(cli.origin_x, cli.origin_y);
		let mut controller =
			PaintController::new(ReplayHost::default(), SampleSource, origin, config);
		input::replay(&mut controller, &samples);
		controller.dispose();

		let drawn = drawn.get();
		let visible = AABox::new(DVec2::ZERO, DVec2::new(cli.width, cli.height));
		if !visible.contains_box(&drawn) {
			tracing::warn!(
				min = %drawn.min(),
				max = %drawn.max(),
				"stroke extends past the surface, try --origin-x/--origin-y"
			);
		}

		let svg = surface.borrow().to_svg();
		std::io::stdout().lock().write_all(svg.as_bytes())?;
		Ok(())
	}
}

fn main() {
	#[cfg(all(target_arch = "wasm32", feature = "csr"))]
	console_error_panic_hook::set_once();

	if let Err(error) = configure_logging() {
		// We can technically continue without logging.
		tracing::error!(error = error.to_string());
	}

	#[cfg(all(target_arch = "wasm32", feature = "csr"))]
	{
		match canvas_brush::web::mount_demo() {
			// The page owns the canvas for the rest of its life.
			Ok(controller) => std::mem::forget(controller),
			Err(error) => tracing::error!(%error, "failed to mount demo"),
		}
	}

	#[cfg(not(all(target_arch = "wasm32", feature = "csr")))]
	{
		if let Err(error) = replay::run() {
			tracing::error!(%error, "replay failed");
			std::process::exit(1);
		}
	}
}
