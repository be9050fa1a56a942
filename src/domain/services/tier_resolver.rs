//! Tier Resolver Service
//!
//! Pure domain logic for turning a (tier, use case) request into an
//! ordered candidate sequence. No I/O happens here.

use crate::domain::entities::BackendConfig;
use crate::domain::value_objects::Tier;

/// Resolver that orders candidate backends for a request.
///
/// Ordering rules:
/// 1. Configs in the requested tier come before configs in the other tier
/// 2. Within each tier bucket, use-case precedence: exact tag > "all" > general
/// 3. Within a bucket, the incoming priority order is preserved
///
/// The result is never empty while at least one active config exists.
pub struct TierResolver;

impl TierResolver {
    /// Resolve the ordered candidates for a request.
    ///
    /// # Arguments
    /// * `active` - Active configs, already in descending priority order
    /// * `tier` - Requested tier
    /// * `use_case` - Optional use-case tag
    ///
    /// # Example
    /// ```ignore
    /// let candidates = TierResolver::resolve(&active, Tier::Lightweight, Some("report"));
    /// ```
    pub fn resolve(
        active: &[BackendConfig],
        tier: Tier,
        use_case: Option<&str>,
    ) -> Vec<BackendConfig> {
        let (primary, secondary): (Vec<&BackendConfig>, Vec<&BackendConfig>) =
            active.iter().partition(|c| c.tier == tier);

        let mut resolved: Vec<BackendConfig> = Self::filter_by_use_case(&primary, use_case)
            .into_iter()
            .chain(Self::filter_by_use_case(&secondary, use_case))
            .cloned()
            .collect();

        // Only reachable when `active` itself is empty, which yields empty again.
        if resolved.is_empty() {
            resolved = active.to_vec();
        }

        tracing::debug!(
            "resolved tier={} use_case={:?} -> [{}]",
            tier,
            use_case,
            resolved
                .iter()
                .map(|c| c.id.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        resolved
    }

    /// Narrow one tier bucket to the configs that best match a use case.
    ///
    /// Precedence: configs tagged with the use case, then configs tagged
    /// "all", then general (untagged or tagged "general"). When none of the
    /// three match, the whole bucket is returned rather than nothing.
    fn filter_by_use_case<'a>(
        bucket: &[&'a BackendConfig],
        use_case: Option<&str>,
    ) -> Vec<&'a BackendConfig> {
        let Some(use_case) = use_case else {
            return bucket.to_vec();
        };

        let specific: Vec<&BackendConfig> =
            bucket.iter().copied().filter(|c| c.has_tag(use_case)).collect();
        if !specific.is_empty() {
            return specific;
        }

        let all: Vec<&BackendConfig> = bucket.iter().copied().filter(|c| c.is_for_all()).collect();
        if !all.is_empty() {
            return all;
        }

        let general: Vec<&BackendConfig> =
            bucket.iter().copied().filter(|c| c.is_general()).collect();
        if !general.is_empty() {
            return general;
        }

        bucket.to_vec()
    }
}
