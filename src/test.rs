use crate::engine::PointChain;
use crate::geom::Point;
use std::sync::{Arc, Mutex};

/// Three samples moving right at 0.1 units per millisecond.
pub fn horizontal_samples() -> Vec<Point> {
	vec![
		Point::new(0.0, 0.0, 0.0),
		Point::new(10.0, 0.0, 100.0),
		Point::new(20.0, 0.0, 200.0),
	]
}

pub fn horizontal_stroke() -> PointChain {
	let mut chain = PointChain::new();
	for sample in horizontal_samples() {
		chain.attach(sample);
	}
	chain
}

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for SharedBuffer {
	fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
		self.0.lock().unwrap().extend_from_slice(buf);
		Ok(buf.len())
	}

	fn flush(&mut self) -> std::io::Result<()> {
		Ok(())
	}
}

/// Runs `f` with a thread-local subscriber and returns the warnings and errors it logged.
pub fn capture_warnings(f: impl FnOnce()) -> String {
	let buffer = SharedBuffer::default();
	let subscriber = tracing_subscriber::fmt()
		.with_max_level(tracing::Level::WARN)
		.with_ansi(false)
		.with_writer({
			let buffer = buffer.clone();
			move || buffer.clone()
		})
		.finish();
	tracing::subscriber::with_default(subscriber, f);
	let bytes = buffer.0.lock().unwrap().clone();
	String::from_utf8_lossy(&bytes).into_owned()
}
