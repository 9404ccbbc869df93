//! The kernel - pure functional core of `Archivist`.
//!
//! The kernel applies commands to produce new state and effects. It is
//! completely pure: no IO, no clocks, no randomness. Timestamps arrive on
//! the command, ids are allocated from counters held in the state.
//!
//! # Example
//!
//! ```ignore
//! let state = State::new();
//! let cmd = Command::create_collection(draft, Timestamp::now());
//!
//! let (new_state, effects) = apply_committed(state, cmd)?;
//! // Runtime commits the storage effects, then swaps in new_state...
//! ```

use archivist_types::{AuditAction, CollectionId, EditionNumber, TAG_NAME_MAX_LEN};

use crate::command::Command;
use crate::effects::Effect;
use crate::state::State;

/// Applies a command to the state, producing new state and effects.
///
/// Takes ownership of state, returns new state. On error the state is
/// dropped; callers that need to keep it pass a clone.
pub fn apply_committed(state: State, cmd: Command) -> Result<(State, Vec<Effect>), KernelError> {
    let mut effects = Vec::new();

    match cmd {
        // ====================================================================
        // Collection Commands
        // ====================================================================
        Command::CreateCollection { draft, at } => {
            let expected_id = state.next_collection_id();
            let user = draft.user;

            let (new_state, header, record) = state.with_new_collection(draft, at);

            // Postcondition: ids come from the counters
            assert_eq!(
                header.collection_id, expected_id,
                "collection id must be allocated from the counter"
            );
            // Postcondition: a new collection starts at the first edition
            debug_assert_eq!(header.current_edition, EditionNumber::FIRST);
            debug_assert_eq!(record.edition, EditionNumber::FIRST);
            // Postcondition: creation and modification dates agree
            debug_assert_eq!(header.creation_date, header.modified_date);

            let collection_id = header.collection_id;
            let record_id = record.record_id;
            effects.push(Effect::CollectionHeaderWrite(header));
            effects.push(Effect::RecordWrite {
                collection_id,
                record,
            });
            effects.push(Effect::AuditLogAppend(AuditAction::CollectionCreated {
                collection_id,
                record_id,
                user,
            }));

            // Postcondition: header write + record write + audit
            debug_assert_eq!(effects.len(), 3);

            Ok((new_state, effects))
        }

        Command::AppendEdition {
            collection_id,
            draft,
            at,
        } => {
            // Precondition: collection must exist
            let collection = state
                .get_collection(&collection_id)
                .ok_or(KernelError::CollectionNotFound(collection_id))?;

            let previous = collection.current_edition();
            let edition = previous
                .next()
                .ok_or(KernelError::EditionOverflow(collection_id))?;
            let previous_count = collection.edition_count();
            let user = draft.user;

            let (new_state, written) =
                state.with_appended_edition(collection_id, edition, draft, at);
            let (header, record) = written.ok_or(KernelError::CollectionNotFound(collection_id))?;

            // Postcondition: the pointer moved forward by exactly one
            assert_eq!(
                header.current_edition, edition,
                "current edition of collection {collection_id} must advance to {edition}"
            );
            // Postcondition: the new record is the current record
            debug_assert_eq!(
                new_state
                    .get_collection(&collection_id)
                    .and_then(|c| c.current_record())
                    .map(|r| r.record_id),
                Some(record.record_id)
            );
            // Postcondition: one more edition than before
            debug_assert_eq!(
                new_state
                    .get_collection(&collection_id)
                    .map(|c| c.edition_count()),
                Some(previous_count + 1)
            );
            // Postcondition: modifier is the appending user
            debug_assert_eq!(header.modified_user, user);

            let record_id = record.record_id;
            effects.push(Effect::CollectionHeaderWrite(header));
            effects.push(Effect::RecordWrite {
                collection_id,
                record,
            });
            effects.push(Effect::AuditLogAppend(AuditAction::EditionAppended {
                collection_id,
                record_id,
                edition,
                user,
            }));

            debug_assert_eq!(effects.len(), 3);

            Ok((new_state, effects))
        }

        // ====================================================================
        // Tag Commands
        // ====================================================================
        Command::CreateTag { name } => {
            // Precondition: name fits the column
            let length = name.chars().count();
            if length > TAG_NAME_MAX_LEN {
                return Err(KernelError::TagNameTooLong {
                    length,
                    max: TAG_NAME_MAX_LEN,
                });
            }

            // Precondition: name is unique (case-sensitive)
            if state.tag_name_exists(&name) {
                return Err(KernelError::TagNameUniqueConstraint(name));
            }

            let expected_id = state.next_tag_id();
            let (new_state, tag) = state.with_new_tag(name);

            // Postcondition: tag is registered under its name
            assert_eq!(tag.tag_id, expected_id);
            debug_assert_eq!(
                new_state.tag_by_name(&tag.name).map(|t| t.tag_id),
                Some(tag.tag_id)
            );

            let audit = AuditAction::TagCreated {
                tag_id: tag.tag_id,
                name: tag.name.clone(),
            };
            effects.push(Effect::TagWrite(tag));
            effects.push(Effect::AuditLogAppend(audit));

            debug_assert_eq!(effects.len(), 2);

            Ok((new_state, effects))
        }

        Command::TagCollection {
            collection_id,
            tag_name,
        } => {
            // Precondition: collection must exist
            let collection = state
                .get_collection(&collection_id)
                .ok_or(KernelError::CollectionNotFound(collection_id))?;

            // Precondition: tag must exist
            let tag_id = state
                .tag_by_name(&tag_name)
                .map(|tag| tag.tag_id)
                .ok_or(KernelError::TagNotFound(tag_name))?;

            // Tagging twice is a no-op
            if collection.tags().contains(&tag_id) {
                return Ok((state, effects));
            }

            let (new_state, header) = state.with_collection_tag(collection_id, tag_id);
            let header = header.ok_or(KernelError::CollectionNotFound(collection_id))?;

            // Postcondition: the association exists
            debug_assert!(header.tags.contains(&tag_id));

            effects.push(Effect::CollectionHeaderWrite(header));
            effects.push(Effect::AuditLogAppend(AuditAction::CollectionTagged {
                collection_id,
                tag_id,
            }));

            Ok((new_state, effects))
        }
    }
}

/// Errors that can occur when applying commands to the kernel.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum KernelError {
    // Collection errors
    #[error("Unknown collection {0}")]
    CollectionNotFound(CollectionId),

    #[error("collection {0} has reached the maximum edition number")]
    EditionOverflow(CollectionId),

    // Tag errors
    #[error("Tag {0} already exists")]
    TagNameUniqueConstraint(String),

    #[error("Tag name exceeds {max} characters")]
    TagNameTooLong { length: usize, max: usize },

    #[error("Unknown tag {0}")]
    TagNotFound(String),

    // Recovery errors
    #[error("corrupt catalog image: {0}")]
    CorruptImage(String),
}
