use crate::AppStep;
use firmaos_pdf::SignError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No document loaded")]
    NoDocument,

    #[error("Operation not allowed in step {0:?}")]
    WrongStep(AppStep),

    #[error("Page {0} is out of range")]
    PageOutOfRange(usize),

    #[error("Attestation content has not been prepared")]
    AttestationMissing,

    #[error("A signing commit is already in flight")]
    CommitInFlight,

    #[error(transparent)]
    Sign(#[from] SignError),
}
