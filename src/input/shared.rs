use super::{EventKind, InputHost, PaintController, Phase, PositionSource};
use std::cell::{Cell, RefCell};

/// A [`PaintController`] reachable from both host event handlers and its owner.
///
/// Stroke callbacks run while the controller is borrowed, so a callback that disposes the
/// controller only records the request. The dispose happens once the event that ran the
/// callback has been handled.
pub struct SharedController<H: InputHost, P: PositionSource> {
	controller: RefCell<PaintController<H, P>>,
	dispose_requested: Cell<bool>,
}

impl<H: InputHost, P: PositionSource> SharedController<H, P> {
	pub fn new(controller: PaintController<H, P>) -> Self {
		Self {
			controller: RefCell::new(controller),
			dispose_requested: Cell::new(false),
		}
	}

	/// Events that arrive from inside a stroke callback are dropped.
	pub fn dispatch(&self, kind: EventKind, event: &P::Event) {
		let Ok(mut controller) = self.controller.try_borrow_mut() else {
			tracing::warn!(%kind, "controller busy, dropping event");
			return;
		};
		controller.handle(kind, event);
		if self.dispose_requested.get() {
			controller.dispose();
		}
	}

	pub fn dispose(&self) {
		match self.controller.try_borrow_mut() {
			Ok(mut controller) => controller.dispose(),
			Err(_) => {
				tracing::debug!("dispose requested from a stroke callback, deferring");
				self.dispose_requested.set(true);
			}
		}
	}

	/// `None` while a stroke callback is running.
	pub fn with<R>(&self, f: impl FnOnce(&PaintController<H, P>) -> R) -> Option<R> {
		let controller = self.controller.try_borrow().ok()?;
		Some(f(&controller))
	}

	/// `None` while a stroke callback is running.
	pub fn phase(&self) -> Option<Phase> {
		self.with(PaintController::phase)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::geom::Point;
	use crate::input::{ControllerConfig, ReplayHost, SampleSource};
	use glam::DVec2;
	use std::rc::Rc;

	type Shared = SharedController<ReplayHost, SampleSource>;

	fn shared(config: impl FnOnce(std::rc::Weak<Shared>) -> ControllerConfig) -> Rc<Shared> {
		Rc::new_cyclic(|weak| {
			let config = config(weak.clone());
			SharedController::new(PaintController::new(
				ReplayHost::default(),
				SampleSource,
				DVec2::ZERO,
				config,
			))
		})
	}

	#[test]
	fn test_dispose_outside_callbacks_is_immediate() {
		let shared = shared(|_| ControllerConfig::new());
		shared.dispatch(EventKind::Start, &Some(Point::new(0.0, 0.0, 0.0)));
		assert_eq!(shared.phase(), Some(Phase::Active));
		shared.dispose();
		assert_eq!(shared.phase(), Some(Phase::Disposed));
		assert_eq!(shared.with(|c| c.host().listening().is_empty()), Some(true));
	}

	#[test]
	fn test_dispose_from_callback_is_deferred() {
		let shared = shared(|weak| {
			ControllerConfig::new().on_move(move |node| {
				if node.previous().is_some() {
					if let Some(shared) = weak.upgrade() {
						shared.dispose();
					}
				}
			})
		});
		shared.dispatch(EventKind::Start, &Some(Point::new(0.0, 0.0, 0.0)));
		assert_eq!(shared.phase(), Some(Phase::Active));

		shared.dispatch(EventKind::Move, &Some(Point::new(5.0, 0.0, 10.0)));
		assert_eq!(shared.phase(), Some(Phase::Disposed));
		assert_eq!(shared.with(|c| c.host().listening().is_empty()), Some(true));

		shared.dispatch(EventKind::Start, &Some(Point::new(1.0, 1.0, 20.0)));
		assert_eq!(shared.phase(), Some(Phase::Disposed));
	}

	#[test]
	fn test_reentrant_events_are_dropped() {
		let shared = shared(|weak| {
			ControllerConfig::new().on_start(move |_| {
				if let Some(shared) = weak.upgrade() {
					assert_eq!(shared.phase(), None);
					shared.dispatch(EventKind::Move, &Some(Point::new(9.0, 9.0, 1.0)));
				}
			})
		});
		shared.dispatch(EventKind::Start, &Some(Point::new(0.0, 0.0, 0.0)));
		assert_eq!(shared.with(|c| c.stroke().map(|s| s.chain().len())), Some(Some(1)));
	}
}
