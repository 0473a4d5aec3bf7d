//! Static catalog of bundle lifecycles: which states each bundle kind walks
//! through, and a one-line explanation of each state.

use crate::model::{BundleState, BundleType};

/// One rung of the state ladder shown in the bundle state tooltip.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rung {
    Step(BundleState),
    /// Mutually exclusive outcomes, e.g. `{ready | failed}`.
    OneOf(&'static [BundleState]),
    /// Reachable sideways from any non-final state of the previous rungs.
    Lateral(BundleState),
}

impl Rung {
    pub fn contains(&self, state: BundleState) -> bool {
        match self {
            Rung::Step(s) | Rung::Lateral(s) => *s == state,
            Rung::OneOf(states) => states.contains(&state),
        }
    }

    pub fn label(&self) -> String {
        match self {
            Rung::Step(s) => s.as_str().to_string(),
            Rung::OneOf(states) => {
                let names: Vec<&str> = states.iter().map(|s| s.as_str()).collect();
                format!("{{{}}}", names.join(" | "))
            }
            Rung::Lateral(s) => format!("{}*", s.as_str()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LadderRung {
    pub rung: Rung,
    /// Set only in the merged ladder, naming the kind the rung applies to.
    pub qualifier: Option<&'static str>,
}

const UPLOAD_FINAL: &[BundleState] = &[BundleState::Ready, BundleState::Failed];
const RUN_FINAL: &[BundleState] = &[BundleState::Ready, BundleState::Failed, BundleState::Killed];

fn rung(rung: Rung) -> LadderRung {
    LadderRung {
        rung,
        qualifier: None,
    }
}

fn qualified(rung: Rung, qualifier: &'static str) -> LadderRung {
    LadderRung {
        rung,
        qualifier: Some(qualifier),
    }
}

/// Ordered ladder for `kind`; `None` yields the merged ladder of all kinds.
pub fn states(kind: Option<BundleType>) -> Vec<LadderRung> {
    use BundleState::*;
    match kind {
        Some(BundleType::Dataset) => vec![
            rung(Rung::Step(Created)),
            rung(Rung::Step(Uploading)),
            rung(Rung::OneOf(UPLOAD_FINAL)),
        ],
        Some(BundleType::Make) => vec![
            rung(Rung::Step(Created)),
            rung(Rung::Step(Making)),
            rung(Rung::OneOf(UPLOAD_FINAL)),
        ],
        Some(BundleType::Run) => vec![
            rung(Rung::Step(Created)),
            rung(Rung::Step(Staged)),
            rung(Rung::Step(Starting)),
            rung(Rung::Step(Preparing)),
            rung(Rung::Step(Running)),
            rung(Rung::Step(Finalizing)),
            rung(Rung::OneOf(RUN_FINAL)),
            rung(Rung::Lateral(WorkerOffline)),
        ],
        None => vec![
            rung(Rung::Step(Created)),
            qualified(Rung::Step(Uploading), "upload"),
            qualified(Rung::Step(Making), "make"),
            qualified(Rung::Step(Staged), "run"),
            qualified(Rung::Step(Starting), "run"),
            qualified(Rung::Step(Preparing), "run"),
            qualified(Rung::Step(Running), "run"),
            qualified(Rung::Step(Finalizing), "run"),
            rung(Rung::OneOf(RUN_FINAL)),
            qualified(Rung::Lateral(WorkerOffline), "run"),
        ],
    }
}

/// Index of the rung to highlight for a bundle currently in `state`.
pub fn highlight(ladder: &[LadderRung], state: BundleState) -> Option<usize> {
    ladder.iter().position(|r| r.rung.contains(state))
}

/// Human-readable sentence for `state`; empty when the state does not belong
/// to the kind's ladder.
pub fn explain(kind: Option<BundleType>, state: BundleState) -> &'static str {
    use BundleState::*;
    if !states(kind).iter().any(|r| r.rung.contains(state)) {
        return "";
    }
    match (kind, state) {
        (Some(BundleType::Dataset), Created) => {
            "Bundle has been created but its contents have not been uploaded yet."
        }
        (_, Created) => "Bundle has been created but its contents have not been populated yet.",
        (_, Uploading) => "Bundle contents are being uploaded.",
        (_, Making) => "Bundle contents are being assembled from its dependencies.",
        (_, Staged) => {
            "Bundle's dependencies are all ready. Waiting for the bundle to be assigned to a worker."
        }
        (_, Starting) => "Bundle has been assigned to a worker. Waiting for the worker to start it.",
        (_, Preparing) => {
            "Waiting for the worker to download the dependencies and the container image."
        }
        (_, Running) => "Bundle command is running.",
        (_, Finalizing) => "Bundle command has finished executing. Cleaning up on the worker.",
        (Some(BundleType::Run), Ready) => "Bundle command has finished successfully.",
        (_, Ready) => "Bundle contents are ready.",
        (Some(BundleType::Run), Failed) => "Bundle command has failed.",
        (_, Failed) => "Bundle could not be created.",
        (_, Killed) => "Bundle was killed before it finished.",
        (_, WorkerOffline) => {
            "The worker running this bundle is offline and may or may not come back online."
        }
    }
}

/// String-keyed variant of [`explain`]. An empty `kind` means unspecified.
pub fn explain_str(kind: &str, state: &str) -> &'static str {
    let kind = if kind.trim().is_empty() {
        None
    } else {
        match BundleType::parse(kind) {
            Some(k) => Some(k),
            None => return "",
        }
    };
    match BundleState::parse(state) {
        Some(state) => explain(kind, state),
        None => "",
    }
}

#[cfg(test)]
#[path = "tests/bundle_states_tests.rs"]
mod tests;
