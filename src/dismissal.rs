//! Script-reading dismissal - feeds recognizer transcripts through the
//! matcher until every script of a ringing alarm has been read aloud

use tracing::{debug, info};

use crate::fuzzy::normalize;
use crate::matcher::{MatchPolicy, MatchResult, evaluate};

/// Events from the speech recognizer
#[derive(Debug, Clone)]
pub enum TranscriptEvent {
    /// Partial hypothesis while the user is still speaking
    Preview(String),
    /// Recognizer settled on an utterance
    Final(String),
}

/// Outcome of handling one transcript event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DismissalEvent {
    /// Nothing changed (non-matching preview, or already dismissed)
    Ignored,
    /// Final transcript did not match the current script
    Rejected {
        script_index: usize,
        result: MatchResult,
    },
    /// Current script read; move on to `next_index`
    Advanced { next_index: usize },
    /// Last script read, alarm can stop ringing
    Dismissed { attempts: usize },
}

#[derive(Debug)]
pub struct Dismissal {
    scripts: Vec<String>,
    policy: MatchPolicy,
    current: usize,
    attempts: usize,
    /// Script advanced by a preview whose final result has not arrived yet
    awaiting_final: Option<usize>,
}

impl Dismissal {
    /// Scripts that normalize to nothing cannot be spoken and are skipped.
    pub fn new(scripts: &[String], policy: MatchPolicy) -> Self {
        let scripts: Vec<String> = scripts
            .iter()
            .filter(|s| !normalize(s).is_empty())
            .cloned()
            .collect();
        Self {
            scripts,
            policy,
            current: 0,
            attempts: 0,
            awaiting_final: None,
        }
    }

    pub fn current_script(&self) -> Option<&str> {
        self.scripts.get(self.current).map(String::as_str)
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn script_count(&self) -> usize {
        self.scripts.len()
    }

    /// Failed final attempts so far
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    pub fn is_dismissed(&self) -> bool {
        self.current >= self.scripts.len()
    }

    pub fn handle(&mut self, event: TranscriptEvent) -> DismissalEvent {
        // The final result of an utterance already accepted from its preview
        // belongs to the previous script, not the current one.
        if let TranscriptEvent::Final(text) = &event {
            if let Some(read) = self.awaiting_final.take() {
                if evaluate(&self.scripts[read], text, &self.policy).accepted {
                    debug!(index = read, "final confirms previewed script");
                    return DismissalEvent::Ignored;
                }
            }
        }

        let Some(script) = self.current_script() else {
            return DismissalEvent::Ignored;
        };

        match event {
            TranscriptEvent::Preview(text) => {
                let result = evaluate(script, &text, &self.policy);
                if result.accepted {
                    debug!(index = self.current, "preview matched script");
                    self.awaiting_final = Some(self.current);
                    self.advance()
                } else {
                    DismissalEvent::Ignored
                }
            }
            TranscriptEvent::Final(text) => {
                let result = evaluate(script, &text, &self.policy);
                if result.accepted {
                    self.advance()
                } else {
                    self.attempts += 1;
                    debug!(
                        index = self.current,
                        distance = result.distance,
                        allowed = result.allowed,
                        "transcript rejected"
                    );
                    DismissalEvent::Rejected {
                        script_index: self.current,
                        result,
                    }
                }
            }
        }
    }

    fn advance(&mut self) -> DismissalEvent {
        self.current += 1;
        if self.is_dismissed() {
            info!(attempts = self.attempts, "alarm dismissed");
            DismissalEvent::Dismissed {
                attempts: self.attempts,
            }
        } else {
            DismissalEvent::Advanced {
                next_index: self.current,
            }
        }
    }
}
