//! Draft workflow state.
//!
//! A draft's whole workflow position lives in one tagged value, and every
//! change goes through a pure transition function. Clearing a draft resets
//! the entire value at once, so no piece of workflow state can survive a
//! reset on its own.

use crate::models::description::DescriptionDocument;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Workflow state of a listing draft.
///
/// `Uploading`, `Generating`, `Enhancing`, and `Exporting` mark operations
/// in flight; the document-carrying states own the current description.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "phase", rename_all = "camelCase")]
pub enum DraftState {
    /// Form captured, no description yet. Images may be added or removed.
    Idle,

    /// Image intake in flight.
    Uploading,

    /// Generation call in flight. No document exists yet.
    Generating,

    /// A document is available for review, editing, and export.
    Reviewing { document: DescriptionDocument },

    /// Enhancement call in flight; `document` is the accepted original.
    Enhancing { document: DescriptionDocument },

    /// Enhancement finished; the caller chooses between the two versions.
    Comparing {
        original: DescriptionDocument,
        enhanced: DescriptionDocument,
    },

    /// Export rendering in flight for `document`.
    Exporting { document: DescriptionDocument },
}

#[derive(Debug, Error, PartialEq)]
pub enum TransitionError {
    #[error("cannot {action} while draft is {phase}")]
    Invalid {
        phase: &'static str,
        action: &'static str,
    },
}

impl DraftState {
    /// Short name of the current phase, for errors and logs.
    pub fn phase(&self) -> &'static str {
        match self {
            DraftState::Idle => "idle",
            DraftState::Uploading => "uploading",
            DraftState::Generating => "generating",
            DraftState::Reviewing { .. } => "reviewing",
            DraftState::Enhancing { .. } => "enhancing",
            DraftState::Comparing { .. } => "comparing",
            DraftState::Exporting { .. } => "exporting",
        }
    }

    /// The document the current state carries, if any.
    pub fn document(&self) -> Option<&DescriptionDocument> {
        match self {
            DraftState::Reviewing { document }
            | DraftState::Enhancing { document }
            | DraftState::Exporting { document } => Some(document),
            DraftState::Comparing { original, .. } => Some(original),
            _ => None,
        }
    }

    fn invalid(&self, action: &'static str) -> TransitionError {
        TransitionError::Invalid {
            phase: self.phase(),
            action,
        }
    }

    /// Idle → Uploading. Images change only before generation.
    pub fn begin_upload(self) -> Result<Self, TransitionError> {
        match self {
            DraftState::Idle => Ok(DraftState::Uploading),
            other => Err(other.invalid("upload images")),
        }
    }

    /// Uploading → Idle, whether intake succeeded or not.
    pub fn finish_upload(self) -> Result<Self, TransitionError> {
        match self {
            DraftState::Uploading => Ok(DraftState::Idle),
            other => Err(other.invalid("finish upload")),
        }
    }

    /// Idle → Generating.
    pub fn begin_generation(self) -> Result<Self, TransitionError> {
        match self {
            DraftState::Idle => Ok(DraftState::Generating),
            other => Err(other.invalid("generate a description")),
        }
    }

    /// Generating → Reviewing with the parsed document.
    pub fn complete_generation(
        self,
        document: DescriptionDocument,
    ) -> Result<Self, TransitionError> {
        match self {
            DraftState::Generating => Ok(DraftState::Reviewing { document }),
            other => Err(other.invalid("complete generation")),
        }
    }

    /// Generating → Idle, so the caller may retry. No document state is
    /// touched because none exists yet.
    pub fn fail_generation(self) -> Result<Self, TransitionError> {
        match self {
            DraftState::Generating => Ok(DraftState::Idle),
            other => Err(other.invalid("fail generation")),
        }
    }

    /// Reviewing → Enhancing, carrying the current document along.
    pub fn begin_enhancement(self) -> Result<Self, TransitionError> {
        match self {
            DraftState::Reviewing { document } => Ok(DraftState::Enhancing { document }),
            other => Err(other.invalid("enhance the description")),
        }
    }

    /// Enhancing → Comparing with both versions available.
    pub fn complete_enhancement(
        self,
        enhanced: DescriptionDocument,
    ) -> Result<Self, TransitionError> {
        match self {
            DraftState::Enhancing { document } => Ok(DraftState::Comparing {
                original: document,
                enhanced,
            }),
            other => Err(other.invalid("complete enhancement")),
        }
    }

    /// Enhancing → Reviewing with the original document intact.
    pub fn fail_enhancement(self) -> Result<Self, TransitionError> {
        match self {
            DraftState::Enhancing { document } => Ok(DraftState::Reviewing { document }),
            other => Err(other.invalid("fail enhancement")),
        }
    }

    /// Comparing → Reviewing, keeping the enhanced version.
    pub fn accept_enhanced(self) -> Result<Self, TransitionError> {
        match self {
            DraftState::Comparing { enhanced, .. } => {
                Ok(DraftState::Reviewing { document: enhanced })
            }
            other => Err(other.invalid("accept the enhanced version")),
        }
    }

    /// Comparing → Reviewing, keeping the original version.
    pub fn reject_enhanced(self) -> Result<Self, TransitionError> {
        match self {
            DraftState::Comparing { original, .. } => {
                Ok(DraftState::Reviewing { document: original })
            }
            other => Err(other.invalid("reject the enhanced version")),
        }
    }

    /// Reviewing → Exporting.
    pub fn begin_export(self) -> Result<Self, TransitionError> {
        match self {
            DraftState::Reviewing { document } => Ok(DraftState::Exporting { document }),
            other => Err(other.invalid("export the description")),
        }
    }

    /// Exporting → Reviewing.
    pub fn finish_export(self) -> Result<Self, TransitionError> {
        match self {
            DraftState::Exporting { document } => Ok(DraftState::Reviewing { document }),
            other => Err(other.invalid("finish export")),
        }
    }

    /// Any state → Idle. Infallible: "start over" always lands on a clean
    /// slate with no residue from the previous workflow.
    pub fn clear(self) -> Self {
        DraftState::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_document(title: &str) -> DescriptionDocument {
        DescriptionDocument {
            title: title.into(),
            ..Default::default()
        }
    }

    #[test]
    fn happy_path_walks_every_phase() {
        let state = DraftState::Idle
            .begin_upload()
            .unwrap()
            .finish_upload()
            .unwrap()
            .begin_generation()
            .unwrap()
            .complete_generation(sample_document("v1"))
            .unwrap()
            .begin_enhancement()
            .unwrap()
            .complete_enhancement(sample_document("v2"))
            .unwrap()
            .accept_enhanced()
            .unwrap()
            .begin_export()
            .unwrap()
            .finish_export()
            .unwrap();
        assert_eq!(state.document().unwrap().title, "v2");
    }

    #[test]
    fn failed_generation_resets_to_idle_with_no_document() {
        let state = DraftState::Idle
            .begin_generation()
            .unwrap()
            .fail_generation()
            .unwrap();
        assert_eq!(state, DraftState::Idle);
        assert!(state.document().is_none());
    }

    #[test]
    fn failed_enhancement_keeps_the_original_document() {
        let state = DraftState::Reviewing {
            document: sample_document("v1"),
        }
        .begin_enhancement()
        .unwrap()
        .fail_enhancement()
        .unwrap();
        assert_eq!(state.document().unwrap().title, "v1");
    }

    #[test]
    fn reject_enhanced_restores_the_original() {
        let state = DraftState::Comparing {
            original: sample_document("v1"),
            enhanced: sample_document("v2"),
        }
        .reject_enhanced()
        .unwrap();
        assert_eq!(state.document().unwrap().title, "v1");
    }

    #[test]
    fn generation_is_rejected_outside_idle() {
        let err = DraftState::Reviewing {
            document: sample_document("v1"),
        }
        .begin_generation()
        .unwrap_err();
        assert_eq!(
            err,
            TransitionError::Invalid {
                phase: "reviewing",
                action: "generate a description",
            }
        );
    }

    #[test]
    fn clear_resets_from_any_phase() {
        let states = [
            DraftState::Idle,
            DraftState::Generating,
            DraftState::Comparing {
                original: sample_document("v1"),
                enhanced: sample_document("v2"),
            },
        ];
        for state in states {
            assert_eq!(state.clear(), DraftState::Idle);
        }
    }

    #[test]
    fn state_serializes_with_a_phase_tag() {
        let json = serde_json::to_value(DraftState::Reviewing {
            document: sample_document("v1"),
        })
        .unwrap();
        assert_eq!(json["phase"], "reviewing");
        assert_eq!(json["document"]["title"], "v1");
    }
}
