//! Authorization units ("voters").
//!
//! Each voter owns one resource family. Evaluation is purely role and
//! permission based: a concrete subject only selects which attributes
//! apply, its identity is never inspected.

use docmanager_core::catalog::{
    CLIENTS_CREATE, CLIENTS_DELETE, CLIENTS_EDIT, CLIENTS_VIEW_ACTIONS_COLUMN, CLIENTS_VIEW_BUTTON,
    CLIENTS_VIEW_DETAILS, CLIENTS_VIEW_DOCUMENTS_COLUMN, CLIENTS_VIEW_LIST, DOCUMENTS_CREATE_UPLOAD,
    DOCUMENTS_DELETE, DOCUMENTS_DOWNLOAD, DOCUMENTS_EDIT, DOCUMENTS_VIEW_DETAILS,
    DOCUMENTS_VIEW_LIST,
};
use docmanager_core::models::user::User;
use uuid::Uuid;

pub const CLIENT_FAMILY: &str = "client";
pub const DOCUMENT_FAMILY: &str = "document";
pub const ROLE_FAMILY: &str = "role";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vote {
    Grant,
    Deny,
    Abstain,
}

/// What an attribute is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    /// Collection-level check (list view, create action).
    None,
    Client(Uuid),
    Document(Uuid),
    /// A resource of a family no voter owns.
    Other(&'static str),
}

impl Subject {
    /// Family tag of a concrete subject.
    pub fn family(&self) -> Option<&'static str> {
        match self {
            Subject::None => None,
            Subject::Client(_) => Some(CLIENT_FAMILY),
            Subject::Document(_) => Some(DOCUMENT_FAMILY),
            Subject::Other(tag) => Some(*tag),
        }
    }
}

/// Admin bypass, evaluated before any permission lookup.
pub fn is_privileged(actor: &User) -> bool {
    actor.is_admin()
}

pub trait Voter: Send + Sync {
    /// Registry key of the family this voter owns.
    fn family(&self) -> &'static str;

    fn supports(&self, attribute: &str, subject: &Subject) -> bool;

    /// Decide for a non-privileged, authenticated actor.
    fn vote_on_attribute(&self, attribute: &str, subject: &Subject, actor: &User) -> bool;

    fn vote(&self, attribute: &str, subject: &Subject, actor: Option<&User>) -> Vote {
        if !self.supports(attribute, subject) {
            return Vote::Abstain;
        }
        let Some(actor) = actor else {
            return Vote::Deny;
        };
        if is_privileged(actor) || self.vote_on_attribute(attribute, subject, actor) {
            Vote::Grant
        } else {
            Vote::Deny
        }
    }
}

/// Table-driven voter for one resource family.
#[derive(Debug, Clone)]
pub struct ResourceVoter {
    family: &'static str,
    /// Attributes that apply to a concrete instance.
    item_attributes: &'static [&'static str],
    /// Canonical keys that apply when there is no instance.
    collection_attributes: &'static [&'static str],
    /// Legacy attribute → canonical key. Collection checks only.
    aliases: &'static [(&'static str, &'static str)],
}

static CLIENT_ITEM: &[&str] = &[CLIENTS_VIEW_DETAILS, CLIENTS_EDIT, CLIENTS_DELETE];

static CLIENT_COLLECTION: &[&str] = &[
    CLIENTS_VIEW_LIST,
    CLIENTS_VIEW_DETAILS,
    CLIENTS_CREATE,
    CLIENTS_EDIT,
    CLIENTS_DELETE,
    CLIENTS_VIEW_DOCUMENTS_COLUMN,
    CLIENTS_VIEW_ACTIONS_COLUMN,
    CLIENTS_VIEW_BUTTON,
];

static CLIENT_ALIASES: &[(&str, &str)] = &[
    ("CLIENT_VIEW", CLIENTS_VIEW_LIST),
    ("CLIENT_CREATE", CLIENTS_CREATE),
    ("CLIENT_EDIT", CLIENTS_EDIT),
    ("CLIENT_DELETE", CLIENTS_DELETE),
];

static DOCUMENT_ITEM: &[&str] = &[
    DOCUMENTS_VIEW_DETAILS,
    DOCUMENTS_EDIT,
    DOCUMENTS_DELETE,
    DOCUMENTS_DOWNLOAD,
];

static DOCUMENT_COLLECTION: &[&str] = &[
    DOCUMENTS_VIEW_LIST,
    DOCUMENTS_VIEW_DETAILS,
    DOCUMENTS_CREATE_UPLOAD,
    DOCUMENTS_EDIT,
    DOCUMENTS_DELETE,
    DOCUMENTS_DOWNLOAD,
];

static DOCUMENT_ALIASES: &[(&str, &str)] = &[
    ("DOCUMENT_VIEW", DOCUMENTS_VIEW_LIST),
    ("DOCUMENT_DOWNLOAD", DOCUMENTS_DOWNLOAD),
    ("DOCUMENT_UPLOAD", DOCUMENTS_CREATE_UPLOAD),
    ("DOCUMENT_EDIT", DOCUMENTS_EDIT),
    ("DOCUMENT_DELETE", DOCUMENTS_DELETE),
    ("DOCUMENT_MANAGE", DOCUMENTS_EDIT),
];

impl ResourceVoter {
    pub fn clients() -> Self {
        Self {
            family: CLIENT_FAMILY,
            item_attributes: CLIENT_ITEM,
            collection_attributes: CLIENT_COLLECTION,
            aliases: CLIENT_ALIASES,
        }
    }

    pub fn documents() -> Self {
        Self {
            family: DOCUMENT_FAMILY,
            item_attributes: DOCUMENT_ITEM,
            collection_attributes: DOCUMENT_COLLECTION,
            aliases: DOCUMENT_ALIASES,
        }
    }

    /// Translate a legacy attribute into its permission key.
    pub fn canonical<'a>(&self, attribute: &'a str) -> &'a str {
        self.aliases
            .iter()
            .find(|(legacy, _)| *legacy == attribute)
            .map(|(_, key)| *key)
            .unwrap_or(attribute)
    }
}

impl Voter for ResourceVoter {
    fn family(&self) -> &'static str {
        self.family
    }

    fn supports(&self, attribute: &str, subject: &Subject) -> bool {
        match subject.family() {
            Some(family) if family == self.family => self.item_attributes.contains(&attribute),
            Some(_) => false,
            None => {
                self.collection_attributes.contains(&attribute)
                    || self.aliases.iter().any(|(legacy, _)| *legacy == attribute)
            }
        }
    }

    fn vote_on_attribute(&self, attribute: &str, _subject: &Subject, actor: &User) -> bool {
        actor.has_permission(self.canonical(attribute))
    }
}

/// Grants `ROLE_*` attributes held by the actor.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleVoter;

impl Voter for RoleVoter {
    fn family(&self) -> &'static str {
        ROLE_FAMILY
    }

    fn supports(&self, attribute: &str, subject: &Subject) -> bool {
        *subject == Subject::None && attribute.starts_with("ROLE_")
    }

    fn vote_on_attribute(&self, attribute: &str, _subject: &Subject, actor: &User) -> bool {
        actor.has_role(attribute)
    }
}
