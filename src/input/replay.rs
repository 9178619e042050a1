use super::{EventKind, InputHost, PaintController, PositionSource};
use crate::geom::Point;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum SampleParseError {
	#[error("expected 3 fields (x y t), found {0}")]
	FieldCount(usize),

	#[error("invalid number {0:?}")]
	InvalidNumber(String),

	#[error("non-finite number {0:?}")]
	NonFinite(String),
}

static_assertions::assert_impl_all!(SampleParseError: std::error::Error, Send, Sync);

/// Parses one `x y t` line, accepting whitespace or commas as separators. Blank lines and
/// `#` comments yield `Ok(None)`.
pub fn parse_sample(line: &str) -> Result<Option<Point>, SampleParseError> {
	let line = line.split('#').next().unwrap_or_default().trim();
	if line.is_empty() {
		return Ok(None);
	}
	let fields: Vec<_> = line
		.split(|c: char| c == ',' || c.is_whitespace())
		.filter(|f| !f.is_empty())
		.collect();
	let &[x, y, t] = fields.as_slice() else {
		return Err(SampleParseError::FieldCount(fields.len()));
	};
	let number = |field: &str| match field.parse::<f64>() {
		Ok(value) if value.is_finite() => Ok(value),
		Ok(_) => Err(SampleParseError::NonFinite(field.to_owned())),
		Err(_) => Err(SampleParseError::InvalidNumber(field.to_owned())),
	};
	Ok(Some(Point::new(number(x)?, number(y)?, number(t)?)))
}

/// Events are the sample itself, or `None` for an event without a position.
#[derive(Clone, Copy, Debug, Default)]
pub struct SampleSource;

impl PositionSource for SampleSource {
	type Event = Option<Point>;

	fn position(&self, event: &Option<Point>) -> Option<Point> {
		*event
	}
}

/// An [`InputHost`] for recorded input. It only tracks which event kinds the controller has
/// asked for, so [`replay`] can deliver events the way a live host would.
#[derive(Debug, Default)]
pub struct ReplayHost {
	listening: Rc<RefCell<HashSet<EventKind>>>,
	listen_counts: HashMap<EventKind, usize>,
}

impl ReplayHost {
	pub fn is_listening(&self, kind: EventKind) -> bool {
		self.listening.borrow().contains(&kind)
	}

	pub fn listening(&self) -> HashSet<EventKind> {
		self.listening.borrow().clone()
	}

	/// A handle that outlives the host, for observing subscriptions after it is dropped.
	pub fn shared_listening(&self) -> Rc<RefCell<HashSet<EventKind>>> {
		self.listening.clone()
	}

	/// How many times `kind` has been subscribed.
	pub fn listen_count(&self, kind: EventKind) -> usize {
		self.listen_counts.get(&kind).copied().unwrap_or_default()
	}
}

impl InputHost for ReplayHost {
	fn listen(&mut self, kind: EventKind) {
		self.listening.borrow_mut().insert(kind);
		*self.listen_counts.entry(kind).or_default() += 1;
	}

	fn unlisten(&mut self, kind: EventKind) {
		self.listening.borrow_mut().remove(&kind);
	}
}

/// Delivers `samples` as one press: the first sample starts the stroke, the rest move it,
/// and a position-less event releases it. Events are dropped while the controller is not
/// subscribed to them.
pub fn replay(controller: &mut PaintController<ReplayHost, SampleSource>, samples: &[Point]) {
	let Some((first, rest)) = samples.split_first() else {
		return;
	};
	if controller.host().is_listening(EventKind::Start) {
		controller.handle_start(&Some(*first));
	}
	for sample in rest {
		if controller.host().is_listening(EventKind::Move) {
			controller.handle_move(&Some(*sample));
		}
	}
	if controller.host().is_listening(EventKind::End) {
		controller.handle_end(&None);
	}
}
