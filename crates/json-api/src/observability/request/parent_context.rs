//! W3C trace context from inbound request headers.

use opentelemetry::{
    Context,
    propagation::{Extractor, TextMapPropagator as _},
    trace::TraceContextExt as _,
};
use opentelemetry_sdk::propagation::TraceContextPropagator;
use salvo::http::HeaderMap;

const TRACEPARENT: &str = "traceparent";
const TRACESTATE: &str = "tracestate";

/// The caller's span context, if it sent a valid `traceparent`.
///
/// Only the two trace headers are exposed to the propagator, so bearer
/// tokens and webhook signatures never reach it.
pub(super) fn extract_parent_context(headers: &HeaderMap) -> Option<Context> {
    let carrier = TraceHeaders {
        traceparent: header(headers, TRACEPARENT)?,
        tracestate: header(headers, TRACESTATE),
    };

    let context = TraceContextPropagator::new().extract_with_context(&Context::new(), &carrier);

    context.span().span_context().is_valid().then_some(context)
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name)?.to_str().ok()
}

#[derive(Debug)]
struct TraceHeaders<'a> {
    traceparent: &'a str,
    tracestate: Option<&'a str>,
}

impl Extractor for TraceHeaders<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        match key {
            TRACEPARENT => Some(self.traceparent),
            TRACESTATE => self.tracestate,
            _ => None,
        }
    }

    fn keys(&self) -> Vec<&str> {
        let mut keys = vec![TRACEPARENT];

        if self.tracestate.is_some() {
            keys.push(TRACESTATE);
        }

        keys
    }
}
