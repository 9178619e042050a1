use crate::engine::NodeRef;
use crate::geom::{AABox, Point};
use bon::builder;
use csscolorparser::Color;
use glam::DVec2;

mod recording;
pub use recording::*;

#[derive(Clone, Debug, thiserror::Error)]
pub enum StyleError {
	#[error("invalid color {0:?}: {1}")]
	InvalidColor(String, String),
}

static_assertions::assert_impl_all!(StyleError: std::error::Error, Send, Sync);

pub fn parse_color(css: &str) -> Result<Color, StyleError> {
	csscolorparser::parse(css).map_err(|e| StyleError::InvalidColor(css.to_owned(), e.to_string()))
}

/// Formats `color` as a CSS `rgba()` string.
pub fn css_color(color: &Color) -> String {
	let [r, g, b, _] = color.to_rgba8();
	format!("rgba({r}, {g}, {b}, {})", color.a)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, derive_more::Display)]
pub enum LineCap {
	#[display("butt")]
	Butt,
	#[default]
	#[display("round")]
	Round,
	#[display("square")]
	Square,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, derive_more::Display)]
pub enum LineJoin {
	#[display("miter")]
	Miter,
	#[default]
	#[display("round")]
	Round,
	#[display("bevel")]
	Bevel,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LineStyle {
	pub width: f64,
	pub color: Color,
	pub cap: LineCap,
	pub join: LineJoin,
}

/// The 2D drawing context a stroke is rasterized into.
pub trait Surface {
	/// Width and height of the drawable region.
	fn size(&self) -> DVec2;
	fn clear(&mut self);
	fn fill_circle(&mut self, center: DVec2, radius: f64, color: &Color);
	fn stroke_line(&mut self, from: DVec2, to: DVec2, style: &LineStyle);
	fn fill_polygon(&mut self, points: &[DVec2], color: &Color);
}

pub fn clear_surface<S: Surface + ?Sized>(surface: &mut S) {
	surface.clear();
}

/// A way of painting the node most recently added to a stroke.
pub trait StrokeRenderer {
	/// Paints `node`, returning the bounds of whatever was drawn.
	fn render<S: Surface + ?Sized>(&self, surface: &mut S, node: NodeRef<'_>) -> Option<AABox>;

	/// Like [`StrokeRenderer::render`], but does nothing when no drawing context is attached.
	fn render_if_attached<S: Surface + ?Sized>(
		&self,
		surface: Option<&mut S>,
		node: NodeRef<'_>,
	) -> Option<AABox> {
		let Some(surface) = surface else {
			tracing::trace!(node = %node.id(), "no drawing context");
			return None;
		};
		self.render(surface, node)
	}
}

/// Redraws the whole point sequence as dots joined by line segments.
#[derive(Clone, Debug, PartialEq)]
pub struct PolylineRenderer {
	pub radius: f64,
	pub line: LineStyle,
	pub dot_color: Color,
}

#[builder(finish_fn = build)]
pub fn polyline(
	#[builder(default = 3.0)] radius: f64,
	#[builder(default = 2.0)] line_width: f64,
	#[builder(default = Color::new(0.0, 0.0, 0.0, 1.0))] color: Color,
	#[builder(default)] cap: LineCap,
	#[builder(default)] join: LineJoin,
) -> PolylineRenderer {
	PolylineRenderer {
		radius,
		line: LineStyle {
			width: line_width,
			color: color.clone(),
			cap,
			join,
		},
		dot_color: color,
	}
}

impl Default for PolylineRenderer {
	fn default() -> Self {
		polyline().build()
	}
}

impl PolylineRenderer {
	pub fn with_css_color(mut self, css: &str) -> Result<Self, StyleError> {
		let color = parse_color(css)?;
		self.line.color = color.clone();
		self.dot_color = color;
		Ok(self)
	}

	/// Clears `surface` and draws every point in order. Does nothing for an empty sequence.
	pub fn render_points<S: Surface + ?Sized>(
		&self,
		surface: &mut S,
		points: impl IntoIterator<Item = Point>,
	) -> Option<AABox> {
		let mut points = points.into_iter().map(|p| p.position()).peekable();
		points.peek()?;
		surface.clear();
		let mut bounds = AABox::empty();
		let mut previous = None;
		for point in points {
			if let Some(previous) = previous {
				surface.stroke_line(previous, point, &self.line);
			}
			surface.fill_circle(point, self.radius, &self.dot_color);
			bounds = bounds
				.expanded_to_contain(point - self.radius)
				.expanded_to_contain(point + self.radius);
			previous = Some(point);
		}
		Some(bounds)
	}
}

impl StrokeRenderer for PolylineRenderer {
	fn render<S: Surface + ?Sized>(&self, surface: &mut S, node: NodeRef<'_>) -> Option<AABox> {
		self.render_points(surface, node.chain().points())
	}
}

/// Fills one velocity-tapered quadrilateral between each node and its predecessor. Never
/// clears, so successive quads accumulate into the stroke.
#[derive(Clone, Debug, PartialEq)]
pub struct RibbonRenderer {
	pub scale: f64,
	pub unit: f64,
	pub fill: Color,
}

#[builder(finish_fn = build)]
pub fn ribbon(
	#[builder(default = 30.0)] scale: f64,
	#[builder(default = 3.0)] unit: f64,
	#[builder(default = Color::new(0.0, 0.0, 0.0, 0.5))] fill: Color,
) -> RibbonRenderer {
	RibbonRenderer { scale, unit, fill }
}

impl Default for RibbonRenderer {
	fn default() -> Self {
		ribbon().build()
	}
}

impl RibbonRenderer {
	pub fn with_css_color(mut self, css: &str) -> Result<Self, StyleError> {
		self.fill = parse_color(css)?;
		Ok(self)
	}

	/// Corners of the quad joining `node` to its predecessor: current-left, current-right,
	/// previous-right, previous-left.
	pub fn quad(&self, node: NodeRef<'_>) -> Option<[DVec2; 4]> {
		let previous = node.previous()?;
		let current = node.velo_cross(self.scale, self.unit);
		let previous = previous.velo_cross(self.scale, self.unit);
		Some([current.left, current.right, previous.right, previous.left])
	}
}

impl StrokeRenderer for RibbonRenderer {
	fn render<S: Surface + ?Sized>(&self, surface: &mut S, node: NodeRef<'_>) -> Option<AABox> {
		let quad = self.quad(node)?;
		surface.fill_polygon(&quad, &self.fill);
		Some(AABox::containing(quad))
	}
}

/// Either built-in strategy, chosen at runtime.
#[derive(Clone, Debug, PartialEq)]
pub enum Strategy {
	Polyline(PolylineRenderer),
	Ribbon(RibbonRenderer),
}

impl Default for Strategy {
	fn default() -> Self {
		Self::Ribbon(RibbonRenderer::default())
	}
}

impl StrokeRenderer for Strategy {
	fn render<S: Surface + ?Sized>(&self, surface: &mut S, node: NodeRef<'_>) -> Option<AABox> {
		match self {
			Self::Polyline(renderer) => renderer.render(surface, node),
			Self::Ribbon(renderer) => renderer.render(surface, node),
		}
	}
}
