//! Reconcile command

use anyhow::{Context, Result};
use std::path::Path;

use crate::cli::ReconcileArgs;
use crate::context::AppContext;
use crate::output;

pub async fn run(_args: ReconcileArgs, config: Option<&Path>) -> Result<()> {
    let ctx = AppContext::load(config)?;

    let outcome = ctx.reconciler().reconcile().context("Reconcile failed")?;

    if outcome.adopted + outcome.evicted == 0 {
        output::info("Registry and backup directory already agree");
    } else {
        output::success(&format!(
            "Reconciled: {} file(s) adopted, {} record(s) evicted",
            outcome.adopted, outcome.evicted
        ));
    }
    Ok(())
}
