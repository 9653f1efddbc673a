//! Influence reconciliation.
//!
//! Matches the influences saved in a document against the current scene and
//! produces a resolved name for every saved column. Resolution per influence,
//! in priority order:
//!
//! 1. **Target list**: a caller-supplied list of the same length replaces the
//!    saved names by position, with no existence checks. This applies to the
//!    whole document and skips the remaining steps.
//! 2. **Direct**: the saved name exists in the scene.
//! 3. **Renamed**: the rename rule turns the name into a different, existing
//!    name.
//! 4. **Ancestor** (opt-in): the nearest ancestor in the saved full path that
//!    exists as a joint, after applying the rename rule to it.
//!
//! Anything left over is missing, and the pass fails listing all of them.
//! Resolution never touches the scene: influences that have to be added to the
//! binding are collected in [`Reconciliation::to_register`] and registered by
//! [`Reconciliation::register`] once the pass has succeeded.

use log::{info, warn};

use crate::error::{SkinError, SkinResult};
use crate::influence::InfluenceRef;
use crate::rename::RenameRule;
use crate::scene::Scene;

/// Options controlling reconciliation.
#[derive(Debug, Clone, Default)]
pub struct ReconcileOptions {
    /// Rename rule tried when a saved name does not exist.
    pub rename: Option<RenameRule>,
    /// Replacement names, by position. An empty list counts as absent.
    pub target_list: Option<Vec<String>>,
    /// Fall back to the nearest existing ancestor joint.
    pub allow_ancestor_fallback: bool,
}

/// How a saved influence was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Replaced by the caller's target list.
    Target,
    /// Found under its saved name.
    Direct,
    /// Found after applying the rename rule.
    Renamed,
    /// Replaced by an existing ancestor joint.
    Ancestor,
}

impl Resolution {
    /// Returns the string identifier for this resolution.
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Target => "target",
            Resolution::Direct => "direct",
            Resolution::Renamed => "renamed",
            Resolution::Ancestor => "ancestor",
        }
    }
}

/// One saved influence and the scene name it resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInfluence {
    /// Name stored in the document.
    pub saved: String,
    /// Name to use in the current scene.
    pub resolved: String,
    /// Which rule produced `resolved`.
    pub resolution: Resolution,
}

/// Outcome of a successful reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// One entry per saved column, in saved order.
    pub influences: Vec<ResolvedInfluence>,
    /// Resolved names not yet part of the live binding, in first-seen order.
    pub to_register: Vec<String>,
}

impl Reconciliation {
    /// Saved names, in saved order.
    pub fn saved_names(&self) -> Vec<String> {
        self.influences.iter().map(|i| i.saved.clone()).collect()
    }

    /// Resolved names, aligned with the saved weight columns.
    pub fn resolved_names(&self) -> Vec<String> {
        self.influences.iter().map(|i| i.resolved.clone()).collect()
    }

    /// Entries whose resolved name differs from the saved one.
    pub fn substitutions(&self) -> impl Iterator<Item = &ResolvedInfluence> {
        self.influences.iter().filter(|i| i.saved != i.resolved)
    }

    /// Adds every pending influence to `skin` with zero weight.
    pub fn register<S: Scene + ?Sized>(&self, scene: &mut S, skin: &str) -> SkinResult<()> {
        for name in &self.to_register {
            info!("Adding influence {} to {} with zero weight", name, skin);
            scene.add_influence(skin, name)?;
        }
        Ok(())
    }
}

/// Resolves every saved influence against the scene.
///
/// `live` holds the partial names currently bound to the skin. Fails with
/// [`SkinError::MissingInfluence`] naming every unresolved influence, or with
/// [`SkinError::TargetListMismatch`] when a target list of the wrong length is
/// given.
pub fn reconcile<S: Scene + ?Sized>(
    scene: &S,
    saved: &[InfluenceRef],
    live: &[String],
    options: &ReconcileOptions,
) -> SkinResult<Reconciliation> {
    if let Some(targets) = options.target_list.as_ref().filter(|t| !t.is_empty()) {
        return reconcile_with_targets(scene, saved, live, targets);
    }

    let mut influences = Vec::with_capacity(saved.len());
    let mut missing = Vec::new();

    for inf in saved {
        match resolve_one(scene, inf, options) {
            Some((resolved, resolution)) => {
                if resolution != Resolution::Direct {
                    info!(
                        "Substituting {} for {} ({})",
                        inf.partial_name,
                        resolved,
                        resolution.as_str()
                    );
                }
                influences.push(ResolvedInfluence {
                    saved: inf.partial_name.clone(),
                    resolved,
                    resolution,
                });
            }
            None => missing.push(inf.partial_name.clone()),
        }
    }

    if !missing.is_empty() {
        return Err(SkinError::MissingInfluence { names: missing });
    }

    let to_register = unbound(influences.iter().map(|i| i.resolved.as_str()), live);
    log::debug!(
        "reconciled {} influences, {} substituted, {} to register",
        influences.len(),
        influences.iter().filter(|i| i.saved != i.resolved).count(),
        to_register.len()
    );

    Ok(Reconciliation {
        influences,
        to_register,
    })
}

fn reconcile_with_targets<S: Scene + ?Sized>(
    scene: &S,
    saved: &[InfluenceRef],
    live: &[String],
    targets: &[String],
) -> SkinResult<Reconciliation> {
    if targets.len() != saved.len() {
        return Err(SkinError::TargetListMismatch {
            expected: saved.len(),
            actual: targets.len(),
        });
    }

    info!("Mapping {} influences to target list", targets.len());

    let influences = saved
        .iter()
        .zip(targets)
        .map(|(inf, target)| ResolvedInfluence {
            saved: inf.partial_name.clone(),
            resolved: target.clone(),
            resolution: Resolution::Target,
        })
        .collect();

    let mut to_register = Vec::new();
    for name in unbound(targets.iter().map(String::as_str), live) {
        if scene.object_exists(&name) {
            to_register.push(name);
        } else {
            warn!(
                "Target influence {} does not exist; its weights will be dropped",
                name
            );
        }
    }

    Ok(Reconciliation {
        influences,
        to_register,
    })
}

fn resolve_one<S: Scene + ?Sized>(
    scene: &S,
    inf: &InfluenceRef,
    options: &ReconcileOptions,
) -> Option<(String, Resolution)> {
    let name = inf.partial_name.as_str();

    if scene.object_exists(name) {
        return Some((name.to_string(), Resolution::Direct));
    }

    if let Some(renamed) = rename_existing(scene, options.rename.as_ref(), name) {
        return Some((renamed, Resolution::Renamed));
    }

    if options.allow_ancestor_fallback {
        for ancestor in inf.ancestors() {
            let candidate = rename_existing(scene, options.rename.as_ref(), ancestor)
                .unwrap_or_else(|| ancestor.to_string());
            if scene.is_joint(&candidate) {
                return Some((candidate, Resolution::Ancestor));
            }
        }
        warn!("{} and its ancestors are missing", name);
    }

    None
}

/// The renamed form of `name` when it differs from `name` and exists.
fn rename_existing<S: Scene + ?Sized>(
    scene: &S,
    rule: Option<&RenameRule>,
    name: &str,
) -> Option<String> {
    let renamed = rule?.apply(name);
    if renamed != name && scene.object_exists(&renamed) {
        Some(renamed.into_owned())
    } else {
        None
    }
}

/// Names not in `live`, deduplicated, in first-seen order.
fn unbound<'a>(names: impl Iterator<Item = &'a str>, live: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in names {
        if !live.iter().any(|l| l == name) && !out.iter().any(|o| o == name) {
            out.push(name.to_string());
        }
    }
    out
}
