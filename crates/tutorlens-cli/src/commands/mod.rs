pub mod dashboard;
pub mod history;
pub mod init;
pub mod predict;
pub mod quiz;
pub mod reset;

use tutorlens_store::StoreError;

/// Attach the recovery hint to store errors that only a reset can fix.
pub(crate) fn store_error(e: StoreError) -> anyhow::Error {
    if e.is_corrupt() {
        anyhow::Error::new(e).context(
            "the prediction log cannot be read; run `tutorlens reset --yes` to start a new one \
             (this deletes all recorded predictions)",
        )
    } else {
        anyhow::Error::new(e)
    }
}

pub(crate) fn warn_skipped(skipped: usize) {
    if skipped > 0 {
        eprintln!("Warning: {skipped} unreadable row(s) in the prediction log were skipped.");
    }
}
