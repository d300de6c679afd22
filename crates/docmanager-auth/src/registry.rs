//! Explicit voter registry and access decision.

use std::collections::BTreeMap;

use docmanager_core::models::user::User;
use tracing::warn;

use crate::error::AuthError;
use crate::voter::{ResourceVoter, RoleVoter, Subject, Vote, Voter};

/// Maps a family tag to the voter that owns it.
///
/// A concrete subject is dispatched only to the voter of its family.
/// Collection-level checks consult every voter. One grant suffices;
/// when every voter abstains the answer is deny.
#[derive(Default)]
pub struct VoterRegistry {
    voters: BTreeMap<&'static str, Box<dyn Voter>>,
}

impl VoterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Client, document and role voters.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(ResourceVoter::clients());
        registry.register(ResourceVoter::documents());
        registry.register(RoleVoter);
        registry
    }

    /// Register `voter` under its family tag, replacing any previous one.
    pub fn register<V: Voter + 'static>(&mut self, voter: V) {
        self.voters.insert(voter.family(), Box::new(voter));
    }

    pub fn voter(&self, family: &str) -> Option<&dyn Voter> {
        self.voters.get(family).map(|v| v.as_ref())
    }

    pub fn families(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.voters.keys().copied()
    }

    pub fn decide(&self, attribute: &str, subject: &Subject, actor: Option<&User>) -> Vote {
        let votes: Vec<Vote> = match subject.family() {
            Some(family) => self
                .voter(family)
                .map(|v| v.vote(attribute, subject, actor))
                .into_iter()
                .collect(),
            None => self
                .voters
                .values()
                .map(|v| v.vote(attribute, subject, actor))
                .collect(),
        };

        if votes.contains(&Vote::Grant) {
            Vote::Grant
        } else {
            Vote::Deny
        }
    }

    pub fn is_granted(&self, attribute: &str, subject: &Subject, actor: Option<&User>) -> bool {
        self.decide(attribute, subject, actor) == Vote::Grant
    }

    /// Unauthenticated callers fail with [`AuthError::Unauthenticated`],
    /// authenticated ones with [`AuthError::AccessDenied`].
    pub fn deny_access_unless_granted(
        &self,
        attribute: &str,
        subject: &Subject,
        actor: Option<&User>,
    ) -> Result<(), AuthError> {
        if self.is_granted(attribute, subject, actor) {
            return Ok(());
        }
        match actor {
            None => Err(AuthError::Unauthenticated),
            Some(user) => {
                warn!(user_id = %user.id, attribute, "Access denied");
                Err(AuthError::AccessDenied(attribute.to_string()))
            }
        }
    }
}
