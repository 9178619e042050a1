//! DOM bindings: mouse and touch listeners feeding a [`PaintController`], and a
//! [`Surface`] backed by a canvas 2D context.

use crate::geom::Point;
use crate::input::{
	ControllerConfig, EventKind, InputHost, PaintController, Phase, PositionSource, SharedController,
};
use crate::render::{css_color, clear_surface, LineStyle, RibbonRenderer, StrokeRenderer, Surface};
use crate::util::ResultExt;
use csscolorparser::Color;
use glam::DVec2;
use std::f64::consts::TAU;
use std::rc::{Rc, Weak};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

#[derive(thiserror::Error, Debug)]
#[error("javascript error: {0}")]
pub struct JsError(String);

impl From<JsValue> for JsError {
	fn from(value: JsValue) -> Self {
		JsError(format!("{:?}", value))
	}
}

impl From<&str> for JsError {
	fn from(value: &str) -> Self {
		JsError(value.to_owned())
	}
}

static_assertions::assert_impl_all!(JsError: std::error::Error, Send, Sync);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EventNames {
	pub start: &'static str,
	pub r#move: &'static str,
	pub end: &'static str,
}

impl EventNames {
	pub const MOUSE: Self = Self {
		start: "mousedown",
		r#move: "mousemove",
		end: "mouseup",
	};

	pub const TOUCH: Self = Self {
		start: "touchstart",
		r#move: "touchmove",
		end: "touchend",
	};

	pub fn name(&self, kind: EventKind) -> &'static str {
		match kind {
			EventKind::Start => self.start,
			EventKind::Move => self.r#move,
			EventKind::End => self.end,
		}
	}
}

/// Reads positions from `MouseEvent`s. Presses of any button but the primary one have no
/// position, so they never start a stroke.
#[derive(Clone, Copy, Debug, Default)]
pub struct MouseSource;

impl PositionSource for MouseSource {
	type Event = web_sys::Event;

	fn position(&self, event: &web_sys::Event) -> Option<Point> {
		let event = event.dyn_ref::<web_sys::MouseEvent>()?;
		if event.type_() == EventNames::MOUSE.start && event.button() != 0 {
			return None;
		}
		Some(Point::new(
			event.client_x() as f64,
			event.client_y() as f64,
			event.time_stamp(),
		))
	}
}

/// Reads the first active touch from `TouchEvent`s.
#[derive(Clone, Copy, Debug, Default)]
pub struct TouchSource;

impl PositionSource for TouchSource {
	type Event = web_sys::Event;

	fn position(&self, event: &web_sys::Event) -> Option<Point> {
		let event = event.dyn_ref::<web_sys::TouchEvent>()?;
		let touch = event.touches().get(0)?;
		Some(Point::new(
			touch.client_x() as f64,
			touch.client_y() as f64,
			event.time_stamp(),
		))
	}
}

/// The position source matching the device, chosen once per controller.
#[derive(Clone, Copy, Debug)]
pub enum DomSource {
	Mouse(MouseSource),
	Touch(TouchSource),
}

impl DomSource {
	pub fn detect(window: &web_sys::Window) -> Self {
		if window.navigator().max_touch_points() > 0 {
			Self::Touch(TouchSource)
		} else {
			Self::Mouse(MouseSource)
		}
	}

	pub fn event_names(&self) -> EventNames {
		match self {
			Self::Mouse(_) => EventNames::MOUSE,
			Self::Touch(_) => EventNames::TOUCH,
		}
	}
}

impl PositionSource for DomSource {
	type Event = web_sys::Event;

	fn position(&self, event: &web_sys::Event) -> Option<Point> {
		match self {
			Self::Mouse(source) => source.position(event),
			Self::Touch(source) => source.position(event),
		}
	}
}

type Handler = Closure<dyn FnMut(web_sys::Event)>;
type WebController = SharedController<DomHost, DomSource>;

struct Handlers {
	start: Handler,
	r#move: Handler,
	end: Handler,
}

impl Handlers {
	fn new(controller: Weak<WebController>) -> Self {
		let handler = |kind: EventKind| {
			let controller = controller.clone();
			Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
				if let Some(controller) = controller.upgrade() {
					controller.dispatch(kind, &event);
				}
			})
		};
		Self {
			start: handler(EventKind::Start),
			r#move: handler(EventKind::Move),
			end: handler(EventKind::End),
		}
	}

	fn get(&self, kind: EventKind) -> &Handler {
		match kind {
			EventKind::Start => &self.start,
			EventKind::Move => &self.r#move,
			EventKind::End => &self.end,
		}
	}
}

/// Attaches start listeners to the canvas and move/end listeners to the document, so a
/// stroke keeps tracking after the pointer leaves the canvas.
pub struct DomHost {
	canvas: web_sys::HtmlCanvasElement,
	document: web_sys::Document,
	names: EventNames,
	handlers: Handlers,
}

impl DomHost {
	fn target(&self, kind: EventKind) -> &web_sys::EventTarget {
		match kind {
			EventKind::Start => self.canvas.as_ref(),
			EventKind::Move | EventKind::End => self.document.as_ref(),
		}
	}
}

impl InputHost for DomHost {
	fn listen(&mut self, kind: EventKind) {
		self
			.target(kind)
			.add_event_listener_with_callback(
				self.names.name(kind),
				self.handlers.get(kind).as_ref().unchecked_ref(),
			)
			.map_err(JsError::from)
			.ok_or_warn("failed to add event listener");
	}

	fn unlisten(&mut self, kind: EventKind) {
		self
			.target(kind)
			.remove_event_listener_with_callback(
				self.names.name(kind),
				self.handlers.get(kind).as_ref().unchecked_ref(),
			)
			.map_err(JsError::from)
			.ok_or_warn("failed to remove event listener");
	}
}

/// A controller listening to a canvas. Dropping it removes its listeners.
pub struct WebPaintController {
	inner: Rc<WebController>,
}

impl WebPaintController {
	/// From inside a stroke callback, takes effect once the current event is handled.
	pub fn dispose(&self) {
		self.inner.dispose();
	}

	pub fn phase(&self) -> Option<Phase> {
		self.inner.phase()
	}
}

pub fn create_paint_controller(
	canvas: &web_sys::HtmlCanvasElement,
	config: ControllerConfig,
) -> Result<WebPaintController, JsError> {
	let window = web_sys::window().ok_or("no window")?;
	let document = window.document().ok_or("no document")?;
	let source = DomSource::detect(&window);
	let rect = canvas.get_bounding_client_rect();
	let origin = DVec2::new(rect.left(), rect.top());
	tracing::info!(?source, ?origin, "creating paint controller");

	let inner = Rc::new_cyclic(|weak| {
		let host = DomHost {
			canvas: canvas.clone(),
			document,
			names: source.event_names(),
			handlers: Handlers::new(weak.clone()),
		};
		SharedController::new(PaintController::new(host, source, origin, config))
	});
	Ok(WebPaintController { inner })
}

pub struct CanvasSurface {
	canvas: web_sys::HtmlCanvasElement,
	context: web_sys::CanvasRenderingContext2d,
}

impl CanvasSurface {
	/// `None` if the canvas has no 2D context.
	pub fn new(canvas: &web_sys::HtmlCanvasElement) -> Option<Self> {
		let context = canvas
			.get_context("2d")
			.map_err(JsError::from)
			.ok_or_warn("failed to get 2d context")
			.flatten()?
			.dyn_into::<web_sys::CanvasRenderingContext2d>()
			.ok()?;
		Some(Self {
			canvas: canvas.clone(),
			context,
		})
	}

	#[allow(deprecated)]
	fn set_fill(&self, color: &Color) {
		self
			.context
			.set_fill_style(&JsValue::from_str(&css_color(color)));
	}
}

impl Surface for CanvasSurface {
	fn size(&self) -> DVec2 {
		DVec2::new(self.canvas.width() as f64, self.canvas.height() as f64)
	}

	fn clear(&mut self) {
		let size = self.size();
		self.context.clear_rect(0.0, 0.0, size.x, size.y);
	}

	fn fill_circle(&mut self, center: DVec2, radius: f64, color: &Color) {
		self.context.begin_path();
		if self
			.context
			.arc(center.x, center.y, radius, 0.0, TAU)
			.map_err(JsError::from)
			.ok_or_warn("arc failed")
			.is_none()
		{
			return;
		}
		self.set_fill(color);
		self.context.fill();
	}

	#[allow(deprecated)]
	fn stroke_line(&mut self, from: DVec2, to: DVec2, style: &LineStyle) {
		let context = &self.context;
		context.begin_path();
		context.move_to(from.x, from.y);
		context.line_to(to.x, to.y);
		context.set_line_width(style.width);
		context.set_line_cap(&style.cap.to_string());
		context.set_line_join(&style.join.to_string());
		context.set_stroke_style(&JsValue::from_str(&css_color(&style.color)));
		context.stroke();
	}

	fn fill_polygon(&mut self, points: &[DVec2], color: &Color) {
		let Some((first, rest)) = points.split_first() else {
			return;
		};
		self.context.begin_path();
		self.context.move_to(first.x, first.y);
		for point in rest {
			self.context.line_to(point.x, point.y);
		}
		self.context.close_path();
		self.set_fill(color);
		self.context.fill();
	}
}

/// Appends a 640x480 canvas to the page and paints velocity-tapered ribbons on it.
pub fn mount_demo() -> Result<WebPaintController, JsError> {
	let document = web_sys::window()
		.and_then(|w| w.document())
		.ok_or("no document")?;
	let body = document.body().ok_or("no body")?;
	let canvas = document
		.create_element("canvas")?
		.dyn_into::<web_sys::HtmlCanvasElement>()
		.map_err(|_| JsError::from("created element is not a canvas"))?;
	canvas.set_class_name("canvas-brush");
	canvas.set_width(640);
	canvas.set_height(480);
	body.append_child(&canvas)?;

	let mut surface = CanvasSurface::new(&canvas);
	if let Some(surface) = surface.as_mut() {
		clear_surface(surface);
	}
	let renderer = RibbonRenderer::default();
	let config = ControllerConfig::new().on_move(move |node| {
		if let Some(bounds) = renderer.render_if_attached(surface.as_mut(), node) {
			tracing::trace!(node = %node.id(), ?bounds, "painted");
		}
	});
	create_paint_controller(&canvas, config)
}
