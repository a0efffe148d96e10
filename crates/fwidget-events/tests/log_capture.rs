//! Failures are reported through `tracing` as well as the last-error slot.

use std::rc::Rc;
use std::sync::{Arc, Mutex};

use fwidget_dom::{DeterministicClock, Document, EventType, Tag, share};
use fwidget_events::{EventBus, EventBusConfig, Listener};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

#[derive(Default)]
struct Captured {
    warnings: Vec<String>,
}

struct Capture {
    state: Arc<Mutex<Captured>>,
}

struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

impl<S: Subscriber> Layer<S> for Capture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::WARN {
            let mut visitor = MessageVisitor(String::new());
            event.record(&mut visitor);
            self.state
                .lock()
                .expect("capture lock")
                .warnings
                .push(visitor.0);
        }
    }
}

#[test]
fn failed_subscribe_logs_a_warning() {
    let state = Arc::new(Mutex::new(Captured::default()));
    let subscriber = tracing_subscriber::registry().with(Capture {
        state: Arc::clone(&state),
    });
    let _guard = tracing::subscriber::set_default(subscriber);

    let mut doc = Document::new();
    let gone = doc.create_element(Tag::Div);
    doc.destroy(gone).expect("destroy");
    let bus = EventBus::new(
        share(doc),
        Rc::new(DeterministicClock::new()),
        EventBusConfig::default(),
    );
    assert!(!bus.subscribe(gone, EventType::Click, &Listener::new(|_, _| {})));

    let captured = state.lock().expect("capture lock");
    assert_eq!(captured.warnings.len(), 1);
    assert!(captured.warnings[0].contains("event bus operation failed"));
}
