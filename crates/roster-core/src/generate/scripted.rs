//! In-process generators: canned replies for tests and a naive round-robin
//! layout for offline runs.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use super::{GeneratedSession, GenerationError, RosterGenerator, parse_sessions};
use crate::request::RosterRequest;
use crate::view::WEEKDAYS;

/// Replays queued results in order; once the queue is drained the last
/// result repeats.
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<Result<Vec<GeneratedSession>, GenerationError>>>,
    last: Mutex<Option<Result<Vec<GeneratedSession>, GenerationError>>>,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new(replies: Vec<Result<Vec<GeneratedSession>, GenerationError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            last: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always succeed with `sessions`.
    pub fn succeeding(sessions: Vec<GeneratedSession>) -> Self {
        Self::new(vec![Ok(sessions)])
    }

    /// Always fail with `error`.
    pub fn failing(error: GenerationError) -> Self {
        Self::new(vec![Err(error)])
    }

    /// Parse `text` as if it were a model reply.
    pub fn from_reply(text: &str) -> Self {
        Self::new(vec![parse_sessions(text)])
    }

    /// Number of `generate` calls served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RosterGenerator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(
        &self,
        _request: &RosterRequest,
    ) -> Result<Vec<GeneratedSession>, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let next = self
            .replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        match next {
            Some(reply) => {
                *last = Some(reply.clone());
                reply
            }
            None => last
                .clone()
                .unwrap_or_else(|| Err(GenerationError::Transport("no scripted reply".to_owned()))),
        }
    }
}

/// Offline stand-in for the remote scheduler.
///
/// Lays out one session per starter per module in hourly slots from Monday
/// 09:00, skipping the 12:00 lunch hour, with mentors assigned round-robin.
/// Expertise requirements and double-booking are not considered.
#[derive(Debug, Clone, Copy, Default)]
pub struct NaiveGenerator;

#[async_trait]
impl RosterGenerator for NaiveGenerator {
    fn name(&self) -> &str {
        "offline"
    }

    async fn generate(
        &self,
        request: &RosterRequest,
    ) -> Result<Vec<GeneratedSession>, GenerationError> {
        Ok(naive_sessions(request))
    }
}

/// Slots per day: 09, 10, 11, 13, 14, 15, 16.
const SLOTS_PER_DAY: usize = 7;

pub fn naive_sessions(request: &RosterRequest) -> Vec<GeneratedSession> {
    let mut sessions = Vec::with_capacity(request.expected_sessions());
    let mut slot = 0usize;
    for starter in &request.starters {
        for module in &request.modules {
            let day = WEEKDAYS[(slot / SLOTS_PER_DAY) % 5];
            let n = slot % SLOTS_PER_DAY;
            let hour = 9 + n + usize::from(n >= 3);
            let mentor = request
                .mentors
                .get(slot % request.mentors.len().max(1))
                .map(|m| m.name.clone())
                .unwrap_or_default();
            sessions.push(GeneratedSession {
                day: day.to_owned(),
                time: format!("{hour:02}:00 - {:02}:00", hour + 1),
                starter_name: starter.name.clone(),
                mentor_name: mentor,
                module_name: module.name.clone(),
                location: None,
            });
            slot += 1;
        }
    }
    sessions
}
