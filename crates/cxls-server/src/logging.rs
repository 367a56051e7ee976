//! Tracing setup: a rotating log file plus a layer that mirrors events into
//! the host's output channel.
//!
//! The `HostLayer` filters events by level:
//! - ERROR, WARN, INFO, DEBUG → forwarded to the sink (subject to the
//!   layer's own filter)
//! - TRACE → file only

use std::sync::Arc;

use camino::Utf8Path;
use tower_lsp_server::ls_types::MessageType;
use tracing::field::Visit;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::Registry;

/// A tracing Layer that forwards events to the host.
pub struct HostLayer {
    send_message: Arc<dyn Fn(MessageType, String) + Send + Sync>,
}

impl HostLayer {
    pub fn new<F>(send_message: F) -> Self
    where
        F: Fn(MessageType, String) + Send + Sync + 'static,
    {
        Self {
            send_message: Arc::new(send_message),
        }
    }
}

/// Visitor that extracts the message field from tracing events.
struct MessageVisitor {
    message: Option<String>,
}

impl MessageVisitor {
    fn new() -> Self {
        Self { message: None }
    }
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{value:?}"));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        }
    }
}

impl<S> Layer<S> for HostLayer
where
    S: tracing::Subscriber,
{
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let message_type = match *event.metadata().level() {
            Level::ERROR => MessageType::ERROR,
            Level::WARN => MessageType::WARNING,
            Level::INFO => MessageType::INFO,
            Level::DEBUG => MessageType::LOG,
            Level::TRACE => return,
        };

        let mut visitor = MessageVisitor::new();
        event.record(&mut visitor);

        if let Some(message) = visitor.message {
            (self.send_message)(message_type, message);
        }
    }
}

/// Initialize the dual-layer tracing subscriber.
///
/// Sets up:
/// - File layer: writes `cxls.log` under `log_dir` with daily rotation
/// - Host layer: forwards events at or above `host_level` to `send_message`
/// - `EnvFilter`: respects `RUST_LOG` for the file, defaults to "info"
///
/// Returns a `WorkerGuard` that must be kept alive for the file logging to work.
pub fn init_tracing<F>(log_dir: &Utf8Path, host_level: Level, send_message: F) -> WorkerGuard
where
    F: Fn(MessageType, String) + Send + Sync + 'static,
{
    let file_appender = tracing_appender::rolling::daily(log_dir, "cxls.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_filter(env_filter);

    let host_layer = HostLayer::new(send_message)
        .with_filter(tracing_subscriber::filter::LevelFilter::from_level(host_level));

    Registry::default().with(file_layer).with(host_layer).init();

    guard
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn test_host_layer_forwards_by_level() {
        let received: Arc<Mutex<Vec<(MessageType, String)>>> = Arc::default();
        let sink = Arc::clone(&received);
        let layer = HostLayer::new(move |typ, message| {
            sink.lock().unwrap().push((typ, message));
        });

        let subscriber = Registry::default().with(layer);
        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("session went away");
            tracing::debug!(uri = "file:///a.cpp", "tracking document");
            tracing::trace!("too chatty");
        });

        let received = received.lock().unwrap();
        assert_eq!(
            *received,
            vec![
                (MessageType::WARNING, "session went away".to_string()),
                (MessageType::LOG, "tracking document".to_string()),
            ]
        );
    }
}
