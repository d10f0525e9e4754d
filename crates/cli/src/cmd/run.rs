//! Drive a throttle from stdin

use crate::script::{parse_line, Line};
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use parking_lot::{Condvar, Mutex};
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;
use throttle::{
    Batch, Dispatcher, DispatchMode, GroupThrottle, ThreadDispatcher, ThrottleConfig,
    TokioDispatcher,
};
use tracing::{debug, info};

/// Upper bound on waiting for in-flight batches at exit
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Counts batches handed off versus batches printed
#[derive(Default)]
struct InFlight {
    counts: Mutex<(u64, u64)>,
    done: Condvar,
}

impl InFlight {
    fn started(&self) {
        self.counts.lock().0 += 1;
    }

    fn finished(&self) {
        let mut counts = self.counts.lock();
        counts.1 += 1;
        if counts.0 == counts.1 {
            self.done.notify_all();
        }
    }

    /// Wait until every started batch has finished; false on timeout
    fn wait_idle(&self, timeout: Duration) -> bool {
        let mut counts = self.counts.lock();
        while counts.0 != counts.1 {
            if self.done.wait_for(&mut counts, timeout).timed_out() {
                return counts.0 == counts.1;
            }
        }
        true
    }
}

/// Render one batch as a JSON line with items sorted for stable output
fn render_batch(mut items: Vec<String>) -> String {
    items.sort();
    serde_json::json!({ "size": items.len(), "items": items }).to_string()
}

fn print_batch(items: Vec<String>) {
    let line = render_batch(items);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    // Closed stdout is not worth failing a dispatch thread over
    let _ = writeln!(out, "{}", line);
    let _ = out.flush();
}

fn build_throttle(config: &ThrottleConfig, in_flight: Arc<InFlight>) -> Result<GroupThrottle<String>> {
    let tracker = Arc::clone(&in_flight);
    let callback = move |items: Vec<String>| {
        print_batch(items);
        tracker.finished();
    };

    let inner: Box<dyn Dispatcher<String>> = match config.dispatch {
        DispatchMode::Thread => Box::new(ThreadDispatcher::new(callback)),
        DispatchMode::Tokio => {
            let runtime = tokio::runtime::Handle::try_current()
                .context("Tokio dispatch requested outside a runtime")?;
            Box::new(TokioDispatcher::new(callback, runtime))
        }
    };

    let dispatcher = move |batch: Batch<String>| {
        in_flight.started();
        inner.dispatch(batch);
    };

    GroupThrottle::with_dispatcher(dispatcher, config.delay())
        .context("Failed to start throttle")
}

/// Feed stdin lines into a throttle until end of input
pub fn run(config: &ThrottleConfig, flush_on_exit: bool) -> Result<()> {
    let in_flight = Arc::new(InFlight::default());
    let throttle = build_throttle(config, Arc::clone(&in_flight))?;
    info!("Throttling stdin (delay: {:?}, dispatch: {:?})", config.delay(), config.dispatch);

    let stdin = io::stdin();
    for (index, line) in stdin.lock().lines().enumerate() {
        let line = line.context("Failed to read stdin")?;
        match parse_line(&line) {
            Ok(Line::Add { key, value }) => throttle.add(key, value)?,
            Ok(Line::Remove(key)) => throttle.remove(&key)?,
            Ok(Line::Flush) => throttle.flush()?,
            Ok(Line::Skip) => {}
            Err(e) => eprintln!("{} line {}: {}", "warning:".yellow(), index + 1, e),
        }
    }

    if flush_on_exit {
        debug!("Flushing pending items at end of input");
        throttle.flush()?;
    }
    throttle.close();

    if !in_flight.wait_idle(DRAIN_TIMEOUT) {
        anyhow::bail!("Timed out waiting for in-flight batches");
    }
    Ok(())
}
