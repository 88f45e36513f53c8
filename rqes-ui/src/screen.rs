//! # Screens
//!
//! One [`Workflow`](crate::workflow::Workflow) per SDK screen, plus the view
//! components they share. Screens describe what to render; the rendering
//! layer decides how.

pub mod document_viewer;
pub mod options_selection;
pub mod success;

use rqes_core::{LocalizableKey, Localizer, UiError};
use serde::{Deserialize, Serialize};

/// Icons shown on selection items.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub enum Icon {
    /// First step marker.
    StepOne,

    /// Second step marker.
    StepTwo,

    /// Third step marker.
    StepThree,

    /// A signed, verified document.
    Verified,

    /// Step complete.
    Check,

    /// Step can be opened.
    ArrowRight,
}

/// Colour role for an icon.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum Tint {
    /// Active step.
    #[default]
    Primary,

    /// Completed step.
    Success,

    /// Step not yet available.
    Disabled,
}

/// A row in a step list.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct SelectionItem {
    /// Main text.
    pub title: String,

    /// Secondary text.
    pub subtitle: Option<String>,

    /// Label of the inline action, e.g. "VIEW".
    pub action: Option<String>,

    /// Leading icon.
    pub leading_icon: Icon,

    /// Colour of the leading icon.
    pub leading_tint: Tint,

    /// Trailing icon.
    pub trailing_icon: Option<Icon>,

    /// Whether the row responds to presses.
    pub enabled: bool,
}

impl SelectionItem {
    /// A step that cannot be opened yet.
    pub fn pending(title: impl Into<String>, icon: Icon) -> Self {
        Self {
            title: title.into(),
            subtitle: None,
            action: None,
            leading_icon: icon,
            leading_tint: Tint::Disabled,
            trailing_icon: None,
            enabled: false,
        }
    }

    /// A step the user can open.
    pub fn available(title: impl Into<String>, icon: Icon) -> Self {
        Self {
            leading_tint: Tint::Primary,
            trailing_icon: Some(Icon::ArrowRight),
            enabled: true,
            ..Self::pending(title, icon)
        }
    }

    /// A step with a committed choice.
    pub fn completed(title: impl Into<String>, icon: Icon) -> Self {
        Self {
            leading_tint: Tint::Success,
            trailing_icon: Some(Icon::Check),
            enabled: true,
            ..Self::pending(title, icon)
        }
    }
}

/// A failure shown to the user, with the intents to submit when they choose
/// to retry or cancel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorView<I> {
    /// Short title.
    pub title: String,

    /// Explanation.
    pub message: String,

    /// Submitted on retry. No retry is offered when `None`.
    pub on_retry: Option<I>,

    /// Submitted on cancel.
    pub on_cancel: I,
}

impl<I> ErrorView<I> {
    /// Present `error`.
    pub fn new(error: UiError, on_retry: Option<I>, on_cancel: I) -> Self {
        Self {
            title: error.title,
            message: error.message,
            on_retry,
            on_cancel,
        }
    }
}

/// Text of a confirmation bottom sheet.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct SheetText {
    /// Sheet title.
    pub title: String,

    /// Sheet body.
    pub message: String,

    /// Label of the positive button.
    pub positive: String,

    /// Label of the negative button.
    pub negative: String,
}

impl SheetText {
    /// The "cancel signing?" confirmation.
    #[must_use]
    pub fn cancellation(localizer: &Localizer) -> Self {
        Self {
            title: localizer.text(LocalizableKey::CancelSigningProcessTitle),
            message: localizer.text(LocalizableKey::CancelSigningProcessSubtitle),
            positive: localizer.text(LocalizableKey::CancelSigning),
            negative: localizer.text(LocalizableKey::ContinueSigning),
        }
    }

    /// The "share signed document" prompt.
    #[must_use]
    pub fn share(localizer: &Localizer) -> Self {
        Self {
            title: localizer.text(LocalizableKey::ShareDocumentTitle),
            message: localizer.text(LocalizableKey::ShareDocumentSubtitle),
            positive: localizer.text(LocalizableKey::Share),
            negative: localizer.text(LocalizableKey::Close),
        }
    }
}

/// A single-choice list shown in a bottom sheet.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ListSheet {
    /// Sheet title.
    pub title: String,

    /// Option labels, in index order.
    pub options: Vec<String>,

    /// Label of the confirm button.
    pub done: String,
}

/// Buttons on a confirmation bottom sheet.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub enum SheetAction {
    /// Abandon the flow.
    CancelSigning,

    /// Dismiss the cancellation prompt.
    ContinueSigning,

    /// Share the signed document.
    Share,

    /// Dismiss the share prompt and leave.
    Close,
}
