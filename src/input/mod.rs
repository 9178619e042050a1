use crate::engine::{ActiveStroke, NodeRef, Stroke};
use crate::geom::Point;
use glam::DVec2;
use std::fmt;

mod replay;
pub use replay::*;
mod shared;
pub use shared::*;

/// The three logical event classes, independent of whether they come from a mouse or a touch
/// screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, derive_more::Display)]
pub enum EventKind {
	#[display("start")]
	Start,
	#[display("move")]
	Move,
	#[display("end")]
	End,
}

/// Extracts a client-space sample from a host event. Implementations are picked once, when
/// the controller is built, rather than inspecting each event's type.
pub trait PositionSource {
	type Event;

	/// `None` when the event carries no usable position, e.g. a touch end with no remaining
	/// touches.
	fn position(&self, event: &Self::Event) -> Option<Point>;
}

/// Routes host events to the controller. The controller asks for move and end events only
/// while a stroke is in progress.
pub trait InputHost {
	fn listen(&mut self, kind: EventKind);
	fn unlisten(&mut self, kind: EventKind);
}

type NodeCallback = Box<dyn FnMut(NodeRef<'_>)>;
type StrokeCallback = Box<dyn FnMut(&Stroke)>;

/// Optional callbacks invoked as a stroke progresses.
#[derive(Default)]
pub struct ControllerConfig {
	on_start: Option<NodeCallback>,
	on_move: Option<NodeCallback>,
	on_end: Option<StrokeCallback>,
}

impl fmt::Debug for ControllerConfig {
	fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
		fmt
			.debug_struct("ControllerConfig")
			.field("on_start", &self.on_start.is_some())
			.field("on_move", &self.on_move.is_some())
			.field("on_end", &self.on_end.is_some())
			.finish()
	}
}

impl ControllerConfig {
	pub fn new() -> Self {
		Self::default()
	}

	/// Called with the first node of each stroke.
	pub fn on_start(mut self, f: impl FnMut(NodeRef<'_>) + 'static) -> Self {
		self.on_start = Some(Box::new(f));
		self
	}

	/// Called with every new node, including the first. The node gives access to its
	/// predecessor and the whole history.
	pub fn on_move(mut self, f: impl FnMut(NodeRef<'_>) + 'static) -> Self {
		self.on_move = Some(Box::new(f));
		self
	}

	/// Called with the finished stroke, which may be empty.
	pub fn on_end(mut self, f: impl FnMut(&Stroke) + 'static) -> Self {
		self.on_end = Some(Box::new(f));
		self
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, derive_more::Display)]
pub enum Phase {
	#[display("idle")]
	Idle,
	#[display("active")]
	Active,
	#[display("disposed")]
	Disposed,
}

/// Turns start/move/end events into a growing [`PointChain`](crate::engine::PointChain) for one
/// stroke at a time.
pub struct PaintController<H: InputHost, P: PositionSource> {
	host: H,
	source: P,
	origin: DVec2,
	config: ControllerConfig,
	phase: Phase,
	stroke: Option<ActiveStroke>,
}

impl<H: InputHost, P: PositionSource> fmt::Debug for PaintController<H, P> {
	fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
		fmt
			.debug_struct("PaintController")
			.field("origin", &self.origin)
			.field("config", &self.config)
			.field("phase", &self.phase)
			.field("stroke", &self.stroke)
			.finish_non_exhaustive()
	}
}

impl<H: InputHost, P: PositionSource> PaintController<H, P> {
	/// Starts listening for strokes. `origin` is the surface's top-left corner in the same
	/// space the host reports positions in.
	pub fn new(mut host: H, source: P, origin: DVec2, config: ControllerConfig) -> Self {
		host.listen(EventKind::Start);
		tracing::debug!(?origin, "listening for strokes");
		Self {
			host,
			source,
			origin,
			config,
			phase: Phase::Idle,
			stroke: None,
		}
	}

	pub fn phase(&self) -> Phase {
		self.phase
	}

	/// The stroke in progress, if any.
	pub fn stroke(&self) -> Option<&ActiveStroke> {
		self.stroke.as_ref()
	}

	pub fn host(&self) -> &H {
		&self.host
	}

	pub fn host_mut(&mut self) -> &mut H {
		&mut self.host
	}

	pub fn source(&self) -> &P {
		&self.source
	}

	fn sample(&self, event: &P::Event) -> Option<Point> {
		let point = self.source.position(event)?;
		Some(point.relative_to(self.origin))
	}

	#[tracing::instrument(skip_all, fields(phase = %self.phase))]
	pub fn handle_start(&mut self, event: &P::Event) {
		if self.phase == Phase::Disposed {
			return;
		}
		let Some(point) = self.sample(event) else {
			tracing::trace!("start event without a position");
			return;
		};
		if self.phase == Phase::Active {
			// The end event for the previous press was never delivered.
			tracing::warn!("stroke already active, abandoning it");
		}

		let mut stroke = ActiveStroke::new();
		let id = stroke.add_point(point);
		let stroke = self.stroke.insert(stroke);
		let Some(node) = stroke.chain().get(id) else {
			return;
		};
		if let Some(on_start) = self.config.on_start.as_mut() {
			on_start(node);
		}
		if let Some(on_move) = self.config.on_move.as_mut() {
			on_move(node);
		}

		if self.phase == Phase::Idle {
			self.host.listen(EventKind::Move);
			self.host.listen(EventKind::End);
		}
		self.phase = Phase::Active;
		tracing::debug!(%point, "stroke started");
	}

	#[tracing::instrument(skip_all, fields(phase = %self.phase))]
	pub fn handle_move(&mut self, event: &P::Event) {
		if self.phase != Phase::Active {
			return;
		}
		let Some(point) = self.sample(event) else {
			tracing::trace!("move event without a position");
			return;
		};
		let Some(stroke) = self.stroke.as_mut() else {
			return;
		};
		let id = stroke.add_point(point);
		let Some(node) = stroke.chain().get(id) else {
			return;
		};
		tracing::trace!(%point, velocity = node.velocity(), "stroke moved");
		if let Some(on_move) = self.config.on_move.as_mut() {
			on_move(node);
		}
	}

	/// Finishes the current stroke. End events never need a position.
	#[tracing::instrument(skip_all, fields(phase = %self.phase))]
	pub fn handle_end(&mut self, _event: &P::Event) {
		match self.phase {
			Phase::Disposed => {}
			Phase::Idle => {
				if let Some(on_end) = self.config.on_end.as_mut() {
					on_end(&Stroke::empty());
				}
			}
			Phase::Active => {
				let stroke = self.stroke.take().map(ActiveStroke::finish).unwrap_or_default();
				tracing::debug!(points = stroke.len(), "stroke ended");
				if let Some(on_end) = self.config.on_end.as_mut() {
					on_end(&stroke);
				}
				self.host.unlisten(EventKind::Move);
				self.host.unlisten(EventKind::End);
				self.phase = Phase::Idle;
			}
		}
	}

	pub fn handle(&mut self, kind: EventKind, event: &P::Event) {
		match kind {
			EventKind::Start => self.handle_start(event),
			EventKind::Move => self.handle_move(event),
			EventKind::End => self.handle_end(event),
		}
	}

	/// Detaches every listener. Any stroke in progress is dropped without calling `on_end`.
	/// Safe to call repeatedly.
	pub fn dispose(&mut self) {
		if self.phase == Phase::Disposed {
			return;
		}
		self.host.unlisten(EventKind::Start);
		if self.phase == Phase::Active {
			self.host.unlisten(EventKind::Move);
			self.host.unlisten(EventKind::End);
		}
		self.stroke = None;
		self.phase = Phase::Disposed;
		tracing::debug!("disposed");
	}
}

impl<H: InputHost, P: PositionSource> Drop for PaintController<H, P> {
	fn drop(&mut self) {
		self.dispose();
	}
}
