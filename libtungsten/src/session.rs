//! Sessions: per-topic pipelines and in-order result delivery.
//!
//! Each session owns a whole pipeline instance (scanner, parser, translator, evaluator context
//! chain) plus its sequence space; distinct sessions share only the process-wide grammar,
//! predict table, and builtin definitions, all read-only. Submissions run synchronously on the
//! submitting thread and publish a completion to the session's channel; completions pass through
//! a reorder buffer on the receiving side, so callers observe results in submission order no
//! matter what order completions arrive in.

use crate::diagnostics::Diagnostic;
use crate::emit::Emit;
use crate::eval::{EvalOptions, Evaluator};
use crate::grammar::heads;
use crate::parser::parse_statements;
use crate::scanner::{scan, strip};
use crate::translator::translate;

use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

/// Default rewrite-step budget for session evaluations: generous for real programs, finite so a
/// divergent definition produces a diagnostic completion instead of a hung session.
pub const SESSION_STEP_BUDGET: usize = 100_000;

/// Whether a completion carries a value or a diagnostic.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum OutputKind {
    /// A successfully evaluated result.
    Value,
    /// The submission failed; `print_content` carries the rendered diagnostic.
    Diagnostic,
}

/// One completion delivered to a session caller.
#[derive(Clone, Debug)]
pub struct EvalOutput {
    pub topic_id: String,
    /// Full-form rendering of the result value; empty for diagnostic completions.
    pub expr_content: String,
    /// Display text: the rendered value, or the diagnostic message.
    pub print_content: String,
    pub seq_num: u64,
    pub kind: OutputKind,
}

/// A fresh session's correlation key and starting sequence number.
pub struct SessionHandle {
    pub topic_id: String,
    pub initial_seq_num: u64,
}

/// Restores submission order over out-of-order completions.
///
/// Completions are buffered by sequence number; whenever the next expected number is present,
/// the buffer drains in ascending order and the expectation advances past everything drained.
/// Completions at or below an already-delivered number are duplicates and are discarded.
pub struct ReorderBuffer {
    next: u64,
    pending: BTreeMap<u64, EvalOutput>,
}

impl ReorderBuffer {
    pub fn new(first: u64) -> ReorderBuffer {
        ReorderBuffer {
            next: first,
            pending: BTreeMap::new(),
        }
    }

    /// Accepts one completion, returning every completion that is now deliverable, in order.
    pub fn insert(&mut self, output: EvalOutput) -> Vec<EvalOutput> {
        if output.seq_num < self.next || self.pending.contains_key(&output.seq_num) {
            return Vec::new();
        }
        self.pending.insert(output.seq_num, output);

        let mut ready = Vec::new();
        while let Some(output) = self.pending.remove(&self.next) {
            ready.push(output);
            self.next += 1;
        }
        ready
    }
}

/// The pipeline stages owned by one session.
struct Pipeline {
    evaluator: Evaluator,
}

impl Pipeline {
    fn run(&mut self, topic_id: &str, input: &str, seq_num: u64) -> EvalOutput {
        let source = collapse_whitespace(input);
        let (trees, diagnostics) = parse_statements(strip(scan(source)));
        if let Some(diagnostic) = diagnostics.into_iter().next() {
            return diagnostic_output(topic_id, seq_num, &diagnostic);
        }

        let mut value = heads::null();
        for tree in &trees {
            let expr = match translate(tree) {
                Ok(expr) => expr,
                Err(internal) => return diagnostic_output(topic_id, seq_num, &internal.diagnostic()),
            };
            match self.evaluator.evaluate(&expr) {
                Ok(result) => value = result,
                Err(err) => return diagnostic_output(topic_id, seq_num, &err.diagnostic()),
            }
        }

        let rendered = value.emit_fullform();
        EvalOutput {
            topic_id: topic_id.into(),
            expr_content: rendered.clone(),
            print_content: rendered,
            seq_num,
            kind: OutputKind::Value,
        }
    }
}

/// Whitespace runs collapse to single spaces before tokenization.
fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn diagnostic_output(topic_id: &str, seq_num: u64, diagnostic: &Diagnostic) -> EvalOutput {
    let code = diagnostic.code.unwrap_or("tungsten");
    let text = match &diagnostic.msg {
        Some(msg) => format!("{}: {}: {}", code, diagnostic.title, msg),
        None => format!("{}: {}", code, diagnostic.title),
    };
    EvalOutput {
        topic_id: topic_id.into(),
        expr_content: String::new(),
        print_content: text,
        seq_num,
        kind: OutputKind::Diagnostic,
    }
}

struct Session {
    pipeline: Mutex<Pipeline>,
    // mpsc senders are not sharable across threads directly; clones are cheap, so publishers
    // take one out under the lock.
    completions: Mutex<Sender<EvalOutput>>,
    inbox: Mutex<Inbox>,
}

struct Inbox {
    receiver: Receiver<EvalOutput>,
    reorder: ReorderBuffer,
    ready: VecDeque<EvalOutput>,
}

/// The process-wide registry of sessions, keyed by topic id.
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, Arc<Session>>>,
    next_topic: AtomicU64,
    options: EvalOptions,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRegistry {
    /// A registry whose sessions evaluate under the [default budget](SESSION_STEP_BUDGET).
    pub fn new() -> SessionRegistry {
        Self::with_options(EvalOptions {
            step_budget: Some(SESSION_STEP_BUDGET),
        })
    }

    pub fn with_options(options: EvalOptions) -> SessionRegistry {
        SessionRegistry {
            sessions: Mutex::new(HashMap::new()),
            next_topic: AtomicU64::new(0),
            options,
        }
    }

    /// Creates a session, returning its topic id and starting sequence number.
    pub fn create_session(&self) -> SessionHandle {
        let n = self.next_topic.fetch_add(1, Ordering::Relaxed);
        let topic_id = format!("topic-{}", n);

        let (sender, receiver) = channel();
        let session = Session {
            pipeline: Mutex::new(Pipeline {
                evaluator: Evaluator::with_options(self.options.clone()),
            }),
            completions: Mutex::new(sender),
            inbox: Mutex::new(Inbox {
                receiver,
                reorder: ReorderBuffer::new(0),
                ready: VecDeque::new(),
            }),
        };
        self.sessions.lock().insert(topic_id.clone(), Arc::new(session));

        SessionHandle {
            topic_id,
            initial_seq_num: 0,
        }
    }

    /// Submits one input into a session's pipeline, fire-and-forget. `seq_num` is
    /// caller-assigned and decides where in the session's output order the completion lands.
    /// Submissions to unknown topics are dropped.
    pub fn submit(&self, topic_id: &str, input: &str, seq_num: u64) {
        let session = match self.session(topic_id) {
            Some(session) => session,
            None => return,
        };
        let output = session.pipeline.lock().run(topic_id, input, seq_num);
        let sender = session.completions.lock().clone();
        // Sending fails only if the session's inbox is gone, in which case there is nobody to
        // deliver to anyway.
        let _ = sender.send(output);
    }

    /// Resolves the next in-order completion for a session, blocking until one is available.
    /// Returns `None` for an unknown topic; a topic with no pending submission blocks
    /// indefinitely.
    pub fn await_result(&self, topic_id: &str) -> Option<EvalOutput> {
        let session = self.session(topic_id)?;
        let mut inbox = session.inbox.lock();
        loop {
            if let Some(output) = inbox.ready.pop_front() {
                return Some(output);
            }
            let arrived = match inbox.receiver.recv() {
                Ok(output) => output,
                Err(_) => return None,
            };
            let ready = inbox.reorder.insert(arrived);
            inbox.ready.extend(ready);
        }
    }

    fn session(&self, topic_id: &str) -> Option<Arc<Session>> {
        self.sessions.lock().get(topic_id).cloned()
    }
}
