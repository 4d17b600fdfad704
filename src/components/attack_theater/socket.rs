use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use log::{error, info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CloseEvent, Event, MessageEvent, WebSocket};

use crate::config::ReconnectPolicy;
use crate::error::{DashboardError, Result};

use super::stream::{AttackStream, StreamObserver};

/// Keeps the socket callbacks alive while attached.
struct Handlers {
	_open: Closure<dyn FnMut(Event)>,
	_message: Closure<dyn FnMut(MessageEvent)>,
	_error: Closure<dyn FnMut(Event)>,
	_close: Closure<dyn FnMut(CloseEvent)>,
}

struct Inner {
	url: String,
	policy: ReconnectPolicy,
	stream: RefCell<AttackStream>,
	observer: RefCell<Box<dyn StreamObserver>>,
	socket: RefCell<Option<WebSocket>>,
	handlers: RefCell<Option<Handlers>>,
	retry_timer: Cell<Option<i32>>,
	retry_cb: RefCell<Option<Closure<dyn FnMut()>>>,
	closed: Cell<bool>,
}

/// Browser WebSocket feeding an [`AttackStream`].
///
/// The socket is closed when [`AttackSocket::close`] is called or the value
/// is dropped, whatever phase the stream is in.
pub struct AttackSocket {
	inner: Rc<Inner>,
}

impl AttackSocket {
	pub fn connect(
		url: String,
		policy: ReconnectPolicy,
		observer: Box<dyn StreamObserver>,
	) -> Result<Self> {
		let inner = Rc::new(Inner {
			url,
			policy,
			stream: RefCell::new(AttackStream::new()),
			observer: RefCell::new(observer),
			socket: RefCell::new(None),
			handlers: RefCell::new(None),
			retry_timer: Cell::new(None),
			retry_cb: RefCell::new(None),
			closed: Cell::new(false),
		});
		open(&inner)?;
		Ok(Self { inner })
	}

	pub fn close(&self) {
		let inner = &self.inner;
		if inner.closed.replace(true) {
			return;
		}
		if let (Some(id), Some(window)) = (inner.retry_timer.take(), web_sys::window()) {
			window.clear_timeout_with_handle(id);
		}
		detach(inner);
		info!("Closed simulation stream {}", inner.url);
	}
}

impl Drop for AttackSocket {
	fn drop(&mut self) {
		self.close();
	}
}

fn open(inner: &Rc<Inner>) -> Result<()> {
	let socket = WebSocket::new(&inner.url)
		.map_err(|err| DashboardError::Socket(DashboardError::browser(err).to_string()))?;
	info!("Opening simulation stream {}", inner.url);

	let weak = Rc::downgrade(inner);
	let on_open = Closure::<dyn FnMut(Event)>::new({
		let weak = weak.clone();
		move |_: Event| {
			if let Some(inner) = weak.upgrade() {
				let mut observer = inner.observer.borrow_mut();
				inner.stream.borrow_mut().opened(&mut **observer);
			}
		}
	});
	let on_message = Closure::<dyn FnMut(MessageEvent)>::new({
		let weak = weak.clone();
		move |ev: MessageEvent| {
			let Some(inner) = weak.upgrade() else {
				return;
			};
			let Some(text) = ev.data().as_string() else {
				warn!("Ignoring non-text simulation frame");
				return;
			};
			let mut observer = inner.observer.borrow_mut();
			if let Err(err) = inner.stream.borrow_mut().handle_text(&text, &mut **observer) {
				error!("Dropping simulation frame: {err}");
			}
		}
	});
	let on_error = Closure::<dyn FnMut(Event)>::new({
		let weak = weak.clone();
		move |_: Event| {
			if let Some(inner) = weak.upgrade() {
				error!("Simulation socket error on {}", inner.url);
			}
		}
	});
	let on_close = Closure::<dyn FnMut(CloseEvent)>::new(move |ev: CloseEvent| {
		let Some(inner) = weak.upgrade() else {
			return;
		};
		if inner.closed.get() {
			return;
		}
		let reason = format!("closed with code {}", ev.code());
		let failed = {
			let mut observer = inner.observer.borrow_mut();
			inner.stream.borrow_mut().fail(&reason, &mut **observer)
		};
		if failed {
			schedule_reconnect(&inner);
		}
	});

	socket.set_onopen(Some(on_open.as_ref().unchecked_ref()));
	socket.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
	socket.set_onerror(Some(on_error.as_ref().unchecked_ref()));
	socket.set_onclose(Some(on_close.as_ref().unchecked_ref()));

	*inner.socket.borrow_mut() = Some(socket);
	*inner.handlers.borrow_mut() = Some(Handlers {
		_open: on_open,
		_message: on_message,
		_error: on_error,
		_close: on_close,
	});
	Ok(())
}

/// Unhook and close the current socket. Handlers are dropped after the
/// current task so one can safely trigger this from inside a callback.
fn detach(inner: &Inner) {
	if let Some(socket) = inner.socket.borrow_mut().take() {
		socket.set_onopen(None);
		socket.set_onmessage(None);
		socket.set_onerror(None);
		socket.set_onclose(None);
		let _ = socket.close();
	}
	if let Some(handlers) = inner.handlers.borrow_mut().take() {
		wasm_bindgen_futures::spawn_local(async move { drop(handlers) });
	}
}

fn schedule_reconnect(inner: &Rc<Inner>) {
	let next = inner.stream.borrow().reconnect_attempts() + 1;
	let Some(delay) = inner.policy.delay_for(next) else {
		warn!("Simulation stream {} lost; not reconnecting", inner.url);
		return;
	};
	let Some(window) = web_sys::window() else {
		return;
	};
	{
		let mut observer = inner.observer.borrow_mut();
		inner.stream.borrow_mut().begin_reconnect(&mut **observer);
	}
	detach(inner);
	info!("Reconnecting to {} in {delay} ms (attempt {next})", inner.url);

	let weak = Rc::downgrade(inner);
	let retry = Closure::<dyn FnMut()>::new(move || {
		let Some(inner) = weak.upgrade() else {
			return;
		};
		inner.retry_timer.set(None);
		if inner.closed.get() {
			return;
		}
		if let Err(err) = open(&inner) {
			error!("Reconnect failed: {err}");
			let failed = {
				let mut observer = inner.observer.borrow_mut();
				inner.stream.borrow_mut().fail(&err.to_string(), &mut **observer)
			};
			if failed {
				schedule_reconnect(&inner);
			}
		}
	});
	match window.set_timeout_with_callback_and_timeout_and_arguments_0(
		retry.as_ref().unchecked_ref(),
		delay as i32,
	) {
		Ok(id) => inner.retry_timer.set(Some(id)),
		Err(err) => error!("Could not schedule reconnect: {}", DashboardError::browser(err)),
	}
	if let Some(previous) = inner.retry_cb.borrow_mut().replace(retry) {
		wasm_bindgen_futures::spawn_local(async move { drop(previous) });
	}
}
