//! In-memory event capture for logging assertions
//!
//! `init_test_capture` installs, once per test binary, a global subscriber
//! whose only layer stores every event with its fields rendered as strings.
//! Tests in one binary share the capture, so assertions should narrow on
//! something unique to the test: an order uid or an op name.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};

use ordervault_core_types::schema::{FIELD_EVENT, FIELD_OP, FIELD_ORDER_UID};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// One recorded event
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    pub fields: BTreeMap<String, String>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn op(&self) -> Option<&str> {
        self.field(FIELD_OP)
    }

    pub fn event(&self) -> Option<&str> {
        self.field(FIELD_EVENT)
    }

    /// True for the `event` boundary of operation `op`
    pub fn is_boundary(&self, op: &str, event: &str) -> bool {
        self.op() == Some(op) && self.event() == Some(event)
    }
}

/// Renders every field; integers and bools arrive through `record_debug`
struct Recorder<'a>(&'a mut BTreeMap<String, String>);

impl Visit for Recorder<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_owned(), value.to_owned());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_owned(), format!("{:?}", value));
    }
}

type Sink = Arc<Mutex<Vec<CapturedEvent>>>;

struct CaptureLayer {
    sink: Sink,
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = BTreeMap::new();
        event.record(&mut Recorder(&mut fields));

        let captured = CapturedEvent {
            level: *event.metadata().level(),
            fields,
        };
        if let Ok(mut events) = self.sink.lock() {
            events.push(captured);
        }
    }
}

/// Read side of the process-wide capture
#[derive(Clone)]
pub struct TestCapture {
    sink: Sink,
}

impl TestCapture {
    /// Everything captured so far, oldest first
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.sink
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Events whose `field` renders as `value`
    pub fn events_with(&self, field: &str, value: &str) -> Vec<CapturedEvent> {
        let mut events = self.events();
        events.retain(|e| e.field(field) == Some(value));
        events
    }

    /// Events tagged with `order_uid`
    pub fn for_order(&self, order_uid: &str) -> Vec<CapturedEvent> {
        self.events_with(FIELD_ORDER_UID, order_uid)
    }

    /// How many `event` boundaries of `op` were logged
    pub fn boundary_count(&self, op: &str, event: &str) -> usize {
        self.events()
            .iter()
            .filter(|e| e.is_boundary(op, event))
            .count()
    }

    /// # Panics
    ///
    /// Panics unless at least one `event` boundary of `op` was logged
    pub fn assert_boundary(&self, op: &str, event: &str) {
        let count = self.boundary_count(op, event);
        assert!(
            count > 0,
            "no {}/{} event among {} captured",
            op,
            event,
            self.events().len()
        );
    }
}

static CAPTURE: OnceLock<TestCapture> = OnceLock::new();

/// Install (once) and return the process-wide capture
///
/// If another global subscriber was installed first, the capture stays
/// empty.
///
/// # Example
///
/// ```
/// use ordervault_core::logging_facility::test_capture::init_test_capture;
/// use ordervault_core::log_op_start;
///
/// let capture = init_test_capture();
/// log_op_start!("doc_capture_op");
/// capture.assert_boundary("doc_capture_op", "start");
/// ```
pub fn init_test_capture() -> TestCapture {
    CAPTURE
        .get_or_init(|| {
            let sink = Sink::default();
            let layer = CaptureLayer {
                sink: Arc::clone(&sink),
            };
            tracing_subscriber::registry().with(layer).try_init().ok();
            TestCapture { sink }
        })
        .clone()
}
