//! Behaviour-driven tests for message dispatch.

use std::cell::RefCell;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use crate::dispatch::{Dispatcher, HandlerContext, HandlerResult, Message, Reply, TYPE_FIELD};
use crate::transcode;

use super::{echo, failing};

// ---------------------------------------------------------------------------
// Test world
// ---------------------------------------------------------------------------

#[derive(Default)]
struct DispatchWorld {
    dispatcher: Dispatcher,
    reply: Option<Reply>,
}

impl DispatchWorld {
    fn dispatch(&mut self, message: Message) {
        self.reply = Some(self.dispatcher.dispatch(message));
    }

    fn reply(&self) -> &Reply {
        self.reply.as_ref().expect("no reply captured")
    }
}

#[fixture]
fn world() -> RefCell<DispatchWorld> {
    RefCell::new(DispatchWorld::default())
}

/// Strips surrounding double quotes from a string if present.
fn strip_quotes(s: &str) -> &str {
    s.trim_matches('"')
}

// ---------------------------------------------------------------------------
// Given steps
// ---------------------------------------------------------------------------

#[given("a dispatcher with an echo handler")]
fn given_echo_dispatcher(world: &RefCell<DispatchWorld>) {
    world.borrow_mut().dispatcher.register("echo", echo);
}

#[given(r#"a handler "{name}" that fails with "{message}""#)]
fn given_failing_handler(world: &RefCell<DispatchWorld>, name: String, message: String) {
    world
        .borrow_mut()
        .dispatcher
        .register(strip_quotes(&name), failing(strip_quotes(&message)));
}

#[given(r#"a handler "{name}" that panics"#)]
fn given_panicking_handler(world: &RefCell<DispatchWorld>, name: String) {
    world.borrow_mut().dispatcher.register(
        strip_quotes(&name),
        |_: &HandlerContext| -> HandlerResult { panic!("conversion table corrupted") },
    );
}

// ---------------------------------------------------------------------------
// When steps
// ---------------------------------------------------------------------------

#[when(r#"a message of type "{message_type}" with payload "{payload}" is dispatched"#)]
fn when_message_dispatched(world: &RefCell<DispatchWorld>, message_type: String, payload: String) {
    let encoded = transcode::encode(strip_quotes(&payload).as_bytes()).expect("encode");
    world
        .borrow_mut()
        .dispatch(Message::new(strip_quotes(&message_type), encoded));
}

#[when(r#"a message of type "{message_type}" with raw payload "{payload}" is dispatched"#)]
fn when_raw_message_dispatched(
    world: &RefCell<DispatchWorld>,
    message_type: String,
    payload: String,
) {
    world.borrow_mut().dispatch(Message::new(
        strip_quotes(&message_type),
        strip_quotes(&payload),
    ));
}

#[when(r#"a message of type "{message_type}" without a payload is dispatched"#)]
fn when_message_without_payload(world: &RefCell<DispatchWorld>, message_type: String) {
    let message = Message::default().with_field(TYPE_FIELD, strip_quotes(&message_type));
    world.borrow_mut().dispatch(message);
}

#[when(r#"the line "{line}" is dispatched"#)]
fn when_line_dispatched(world: &RefCell<DispatchWorld>, line: String) {
    let mut state = world.borrow_mut();
    let reply = state.dispatcher.dispatch_line(strip_quotes(&line).as_bytes());
    state.reply = Some(reply);
}

// ---------------------------------------------------------------------------
// Then steps
// ---------------------------------------------------------------------------

#[then(r#"the reply status is "{status}""#)]
fn then_status(world: &RefCell<DispatchWorld>, status: String) {
    let state = world.borrow();
    assert_eq!(
        state.reply().status().as_str(),
        strip_quotes(&status),
        "unexpected reply: {:?}",
        state.reply()
    );
}

#[then(r#"the reply payload decodes to "{expected}""#)]
fn then_payload_decodes(world: &RefCell<DispatchWorld>, expected: String) {
    let state = world.borrow();
    let decoded = transcode::decode(state.reply().payload()).expect("payload is base64");
    assert_eq!(decoded, strip_quotes(&expected).as_bytes());
}

#[then(r#"the reply diagnostic is "{expected}""#)]
fn then_diagnostic_is(world: &RefCell<DispatchWorld>, expected: String) {
    assert_eq!(world.borrow().reply().payload(), strip_quotes(&expected));
}

#[then(r#"the reply diagnostic starts with "{prefix}""#)]
fn then_diagnostic_starts_with(world: &RefCell<DispatchWorld>, prefix: String) {
    let state = world.borrow();
    let payload = state.reply().payload();
    assert!(
        payload.starts_with(strip_quotes(&prefix)),
        "expected prefix {prefix:?}, got {payload:?}"
    );
}

// ---------------------------------------------------------------------------
// Scenario registration
// ---------------------------------------------------------------------------

#[scenario(path = "tests/features/message_dispatch.feature", index = 0)]
fn echo_round_trip(#[from(world)] world: RefCell<DispatchWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/message_dispatch.feature", index = 1)]
fn unregistered_type(#[from(world)] world: RefCell<DispatchWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/message_dispatch.feature", index = 2)]
fn missing_payload(#[from(world)] world: RefCell<DispatchWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/message_dispatch.feature", index = 3)]
fn invalid_encoding(#[from(world)] world: RefCell<DispatchWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/message_dispatch.feature", index = 4)]
fn handler_failure(#[from(world)] world: RefCell<DispatchWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/message_dispatch.feature", index = 5)]
fn handler_panic(#[from(world)] world: RefCell<DispatchWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/message_dispatch.feature", index = 6)]
fn malformed_line(#[from(world)] world: RefCell<DispatchWorld>) {
    drop(world);
}
