//! Puzzle content lookup.
//!
//! A [`ContentRegistry`] is the static contact-id -> bundle mapping the
//! resolver reads. It can be built in code or loaded from a content
//! directory laid out as:
//!
//! ```text
//! content/
//!   registry.json          [ { "id": "c1", "file": "c1_informant.json", ... }, ... ]
//!   contacts/
//!     c1_informant.json    { "puzzles": [ ... ] }
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use detective_types::{Contact, ContactBundle, ContactId, PuzzleDefinition, TurnId};

const REGISTRY_FILE: &str = "registry.json";
const CONTACTS_DIR: &str = "contacts";

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("contact {0} is registered twice")]
    DuplicateContact(ContactId),
}

/// An authoring problem found by [`ContentRegistry::lint`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentIssue {
    pub contact: ContactId,
    pub turn: TurnId,
    pub problem: IssueKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    /// No solution keywords: any well-formed input solves the puzzle.
    EmptySolution,
    /// Another puzzle of the same contact already uses this turn; it shadows this one.
    DuplicateTurn,
    /// `showNotification` without a contact or message.
    IncompleteNotification(&'static str),
    /// The notification targets a contact that has no bundle.
    UnknownNotificationContact(ContactId),
}

impl fmt::Display for ContentIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} turn {}: ", self.contact, self.turn)?;
        match &self.problem {
            IssueKind::EmptySolution => f.write_str("solution has no keywords"),
            IssueKind::DuplicateTurn => f.write_str("turn is declared more than once"),
            IssueKind::IncompleteNotification(missing) => {
                write!(f, "notification enabled without {missing}")
            }
            IssueKind::UnknownNotificationContact(target) => {
                write!(f, "notification targets unknown contact {target}")
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContentRegistry {
    bundles: BTreeMap<ContactId, ContactBundle>,
    contacts: Vec<Contact>,
}

impl ContentRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with_bundle(mut self, contact: impl Into<ContactId>, bundle: ContactBundle) -> Self {
        self.insert(contact, bundle);
        self
    }

    /// Register `bundle` for `contact`, replacing any previous bundle.
    pub fn insert(&mut self, contact: impl Into<ContactId>, bundle: ContactBundle) {
        self.bundles.insert(contact.into(), bundle);
    }

    #[must_use]
    pub fn bundle(&self, contact: &ContactId) -> Option<&ContactBundle> {
        self.bundles.get(contact)
    }

    #[must_use]
    pub fn puzzle(&self, contact: &ContactId, turn: TurnId) -> Option<&PuzzleDefinition> {
        self.bundle(contact)?.puzzle(turn)
    }

    #[must_use]
    pub fn has_contact(&self, contact: &ContactId) -> bool {
        self.bundles.contains_key(contact)
    }

    /// Registry metadata, in registry order.
    #[must_use]
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    #[must_use]
    pub fn contact(&self, id: &ContactId) -> Option<&Contact> {
        self.contacts.iter().find(|c| &c.id == id)
    }

    /// Contacts the player can see at `turn`.
    pub fn visible_contacts(&self, turn: TurnId) -> impl Iterator<Item = &Contact> {
        self.contacts
            .iter()
            .filter(move |c| c.visible_at_turn <= turn)
    }

    /// Load `registry.json` and every bundle it references from `dir`.
    pub fn load_dir(dir: &Path) -> Result<Self, ContentError> {
        let contacts: Vec<Contact> = read_json(&dir.join(REGISTRY_FILE))?;
        let mut registry = Self::new();
        let mut seen = BTreeSet::new();

        for contact in contacts {
            if !seen.insert(contact.id.clone()) {
                return Err(ContentError::DuplicateContact(contact.id));
            }
            let bundle: ContactBundle = read_json(&dir.join(CONTACTS_DIR).join(&contact.file))?;
            tracing::debug!(
                contact = %contact.id,
                puzzles = bundle.puzzles.len(),
                "Loaded contact bundle"
            );
            registry.bundles.insert(contact.id.clone(), bundle);
            registry.contacts.push(contact);
        }

        for issue in registry.lint() {
            tracing::warn!("Content issue: {issue}");
        }
        Ok(registry)
    }

    /// Authoring problems that would surface as broken puzzles at play time.
    #[must_use]
    pub fn lint(&self) -> Vec<ContentIssue> {
        let mut issues = Vec::new();
        for (contact, bundle) in &self.bundles {
            let mut turns = BTreeSet::new();
            for puzzle in &bundle.puzzles {
                let issue = |problem| ContentIssue {
                    contact: contact.clone(),
                    turn: puzzle.turn_id,
                    problem,
                };
                if !turns.insert(puzzle.turn_id) {
                    issues.push(issue(IssueKind::DuplicateTurn));
                }
                if puzzle.solution.keywords.is_empty() {
                    issues.push(issue(IssueKind::EmptySolution));
                }
                match puzzle.notification().map(|n| n.payload()) {
                    Some(Err(e)) => {
                        issues.push(issue(IssueKind::IncompleteNotification(e.missing)));
                    }
                    Some(Ok(Some(payload))) if !self.has_contact(&payload.contact) => {
                        issues.push(issue(IssueKind::UnknownNotificationContact(
                            payload.contact,
                        )));
                    }
                    _ => {}
                }
            }
        }
        issues
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ContentError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ContentError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ContentError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use detective_types::NotificationSpec;

    use super::*;

    fn write(dir: &Path, rel: &str, body: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    #[test]
    fn lookup_by_contact_and_turn() {
        let registry = ContentRegistry::new().with_bundle(
            "c1",
            ContactBundle {
                puzzles: vec![PuzzleDefinition::new(TurnId::new(2), &["x"], "ok")],
            },
        );
        let c1 = ContactId::new("c1");
        assert!(registry.has_contact(&c1));
        assert!(registry.puzzle(&c1, TurnId::new(2)).is_some());
        assert!(registry.puzzle(&c1, TurnId::new(1)).is_none());
        assert!(registry.puzzle(&ContactId::new("c9"), TurnId::new(2)).is_none());
    }

    #[test]
    fn load_dir_reads_registry_and_bundles() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "registry.json",
            r#"[
                { "id": "c1", "file": "c1.json", "name": "Marco", "visibleAtTurn": 1 },
                { "id": "c2", "file": "c2.json", "name": "Giulia", "visibleAtTurn": 3 }
            ]"#,
        );
        write(
            dir.path(),
            "contacts/c1.json",
            r#"{ "puzzles": [ { "turnId": 1, "solution": { "keywords": ["porto"] } } ] }"#,
        );
        write(dir.path(), "contacts/c2.json", r#"{ "puzzles": [] }"#);

        let registry = ContentRegistry::load_dir(dir.path()).unwrap();
        assert_eq!(registry.contacts().len(), 2);
        assert_eq!(
            registry.contact(&ContactId::new("c2")).unwrap().name,
            "Giulia"
        );
        let visible: Vec<_> = registry
            .visible_contacts(TurnId::new(2))
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(visible, vec!["c1"]);
        assert!(
            registry
                .puzzle(&ContactId::new("c1"), TurnId::new(1))
                .is_some()
        );
    }

    #[test]
    fn load_dir_reports_missing_bundle() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "registry.json",
            r#"[ { "id": "c1", "file": "missing.json" } ]"#,
        );
        let err = ContentRegistry::load_dir(dir.path()).unwrap_err();
        assert!(matches!(err, ContentError::Read { .. }));
    }

    #[test]
    fn load_dir_rejects_duplicate_contacts() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "registry.json",
            r#"[ { "id": "c1", "file": "a.json" }, { "id": "c1", "file": "a.json" } ]"#,
        );
        write(dir.path(), "contacts/a.json", "{}");
        let err = ContentRegistry::load_dir(dir.path()).unwrap_err();
        assert!(matches!(err, ContentError::DuplicateContact(_)));
    }

    #[test]
    fn load_dir_reports_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "registry.json", "[ { ");
        let err = ContentRegistry::load_dir(dir.path()).unwrap_err();
        assert!(matches!(err, ContentError::Parse { .. }));
    }

    #[test]
    fn lint_flags_authoring_problems() {
        let mut broken = PuzzleDefinition::new(TurnId::new(1), &[], "never");
        broken.notification = Some(NotificationSpec {
            show_notification: true,
            notification_contact: None,
            notification_message: Some("hey".to_owned()),
        });
        let registry = ContentRegistry::new().with_bundle(
            "c1",
            ContactBundle {
                puzzles: vec![
                    broken,
                    PuzzleDefinition::new(TurnId::new(1), &["ok"], "shadowed"),
                ],
            },
        );

        let issues = registry.lint();
        let kinds: Vec<_> = issues.iter().map(|i| i.problem.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                IssueKind::EmptySolution,
                IssueKind::IncompleteNotification("notificationContact"),
                IssueKind::DuplicateTurn,
            ]
        );
        assert_eq!(issues[0].to_string(), "c1 turn 1: solution has no keywords");
    }

    #[test]
    fn lint_flags_notification_to_unknown_contact() {
        let mut puzzle = PuzzleDefinition::new(TurnId::new(1), &["porto"], "ok");
        puzzle.solution.response.notification = Some(NotificationSpec {
            show_notification: true,
            notification_contact: Some(ContactId::new("ghost")),
            notification_message: Some("Ciao".to_owned()),
        });
        let registry = ContentRegistry::new().with_bundle(
            "c1",
            ContactBundle {
                puzzles: vec![puzzle],
            },
        );

        let issues = registry.lint();
        assert_eq!(issues.len(), 1);
        assert_eq!(
            issues[0].problem,
            IssueKind::UnknownNotificationContact(ContactId::new("ghost"))
        );
        assert_eq!(
            issues[0].to_string(),
            "c1 turn 1: notification targets unknown contact ghost"
        );
    }
}
