//! Crate-level test doubles and behaviour tests.

use std::fmt;

use mockall::mock;

use crate::dispatch::{Dispatcher, Handler, HandlerContext, HandlerResult, Message, ReplyStatus};
use crate::transcode;

mod behaviour;

mock! {
    pub TestHandler {}

    impl Handler for TestHandler {
        fn handle(&self, context: &HandlerContext) -> HandlerResult;
    }
}

/// Error type standing in for an arbitrary handler fault.
#[derive(Debug)]
pub(crate) struct HandlerFault(pub(crate) String);

impl fmt::Display for HandlerFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for HandlerFault {}

/// Handler returning its decoded payload unchanged.
pub(crate) fn echo(context: &HandlerContext) -> HandlerResult {
    Ok(context.payload().to_vec())
}

/// Handler that always fails with `message`.
pub(crate) fn failing(message: impl Into<String>) -> impl Handler + 'static {
    let message = message.into();
    move |_: &HandlerContext| -> HandlerResult { Err(Box::new(HandlerFault(message.clone()))) }
}

#[test]
fn end_to_end_echo_over_json_lines() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.register("echo", echo);

    let payload = transcode::encode(b"hello").expect("encode");
    let line = serde_json::to_vec(&Message::new("echo", payload.clone())).expect("serialise");
    let reply = dispatcher.dispatch_line(&line);

    assert_eq!(reply.status(), ReplyStatus::Ok);
    let decoded = transcode::decode(reply.payload()).expect("reply payload is base64");
    assert_eq!(decoded, b"hello");
    let json = reply.to_json_line().expect("serialise reply");
    assert_eq!(
        json,
        format!("{{\"status\":\"ok\",\"payload\":\"{payload}\"}}\n")
    );
}
